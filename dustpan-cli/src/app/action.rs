/// User actions that can be performed in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move selection up
    MoveUp,
    /// Move selection down
    MoveDown,
    /// Move selection up by a page
    PageUp,
    /// Move selection down by a page
    PageDown,
    /// Go to first item
    GoToFirst,
    /// Go to last item
    GoToLast,
    /// Expand selected directory
    Expand,
    /// Collapse selected directory
    Collapse,
    /// Toggle expand/collapse
    Toggle,
    /// Drill down into selected directory
    DrillDown,
    /// Go back to parent
    GoBack,
    /// Toggle the cursor row in or out of the multi-selection
    ToggleSelect,
    /// Extend the multi-selection upwards
    SelectUp,
    /// Extend the multi-selection downwards
    SelectDown,
    /// Drop the multi-selection
    ClearSelection,
    /// Show help overlay
    ShowHelp,
    /// Hide help overlay
    HideHelp,
    /// Request delete (show confirmation dialog)
    Delete,
    /// Confirm delete operation
    ConfirmDelete,
    /// Cancel delete operation
    CancelDelete,
    /// Hide the deletion overlay, the run keeps going
    HideDeleteProgress,
    /// Dismiss the error banner
    DismissError,
    /// Quit the application
    Quit,
    /// No action (for tick events)
    Tick,
}

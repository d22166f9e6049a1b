use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{Action, AppMode};

/// Map key events to actions based on current mode
pub fn handle_key(key: KeyEvent, mode: AppMode) -> Action {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    match mode {
        AppMode::Help => handle_key_help(key),
        AppMode::Scanning | AppMode::Finalizing => handle_key_scanning(key),
        AppMode::ConfirmDelete => handle_key_confirm(key),
        AppMode::Deleting => handle_key_deleting(key),
        AppMode::Browsing => handle_key_browsing(key),
    }
}

fn handle_key_help(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Action::HideHelp,
        _ => Action::Tick,
    }
}

fn handle_key_scanning(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        _ => Action::Tick,
    }
}

fn handle_key_confirm(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Action::ConfirmDelete,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
            Action::CancelDelete
        }
        _ => Action::Tick,
    }
}

fn handle_key_deleting(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => Action::HideDeleteProgress,
        KeyCode::Char('q') => Action::Quit,
        _ => Action::Tick,
    }
}

fn handle_key_browsing(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Home | KeyCode::Char('g') => Action::GoToFirst,
        KeyCode::End | KeyCode::Char('G') => Action::GoToLast,

        // Expand/Collapse
        KeyCode::Right | KeyCode::Char('l') => Action::Expand,
        KeyCode::Left | KeyCode::Char('h') => Action::Collapse,
        KeyCode::Tab => Action::Toggle,

        // Drill down / back
        KeyCode::Enter => Action::DrillDown,
        KeyCode::Backspace => Action::GoBack,
        KeyCode::Esc => Action::ClearSelection,

        // Multi-selection
        KeyCode::Char('v') | KeyCode::Char(' ') => Action::ToggleSelect,
        KeyCode::Char('K') => Action::SelectUp,
        KeyCode::Char('J') => Action::SelectDown,

        // Deletion
        KeyCode::Char('d') | KeyCode::Delete => Action::Delete,
        KeyCode::Char('x') => Action::DismissError,

        KeyCode::Char('?') => Action::ShowHelp,

        _ => Action::Tick,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_ctrl_c_quits_everywhere() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for mode in [
            AppMode::Scanning,
            AppMode::Browsing,
            AppMode::Help,
            AppMode::ConfirmDelete,
            AppMode::Deleting,
        ] {
            assert_eq!(handle_key(ctrl_c, mode), Action::Quit);
        }
    }

    #[test]
    fn test_delete_flow_keys() {
        assert_eq!(handle_key(press(KeyCode::Char('d')), AppMode::Browsing), Action::Delete);
        assert_eq!(
            handle_key(press(KeyCode::Char('y')), AppMode::ConfirmDelete),
            Action::ConfirmDelete
        );
        assert_eq!(
            handle_key(press(KeyCode::Esc), AppMode::ConfirmDelete),
            Action::CancelDelete
        );
        // Only the overlay goes away; navigation keys do nothing
        assert_eq!(
            handle_key(press(KeyCode::Esc), AppMode::Deleting),
            Action::HideDeleteProgress
        );
        assert_eq!(handle_key(press(KeyCode::Down), AppMode::Deleting), Action::Tick);
    }

    #[test]
    fn test_selection_keys() {
        assert_eq!(
            handle_key(press(KeyCode::Char('v')), AppMode::Browsing),
            Action::ToggleSelect
        );
        assert_eq!(
            handle_key(press(KeyCode::Char('J')), AppMode::Browsing),
            Action::SelectDown
        );
        assert_eq!(
            handle_key(press(KeyCode::Esc), AppMode::Browsing),
            Action::ClearSelection
        );
    }
}

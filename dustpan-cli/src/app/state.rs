use std::collections::HashSet;
use std::path::{Path, PathBuf};

use dustpan_core::{
    DeleteHandle, DeletionRequest, DeletionResult, DiskTree, NodeId, ProgressCounter, RefreshHint,
    ScanConfig, ScanProgress, spawn_delete,
};
use tracing::{info, warn};

use super::scan::{ScanJob, ScanPurpose, ScanUpdate, nested_config};

/// Statistics tracked during the session
#[derive(Debug, Default, Clone)]
pub struct SessionStats {
    /// Bytes of deleted roots that reported no error
    pub bytes_freed: u64,
    /// Files removed, failed runs included
    pub files_removed: u64,
    /// Deletion runs that have completed
    pub runs: u32,
}

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Scanning filesystem
    Scanning,
    /// Finalizing scan (aggregating sizes)
    Finalizing,
    /// Browsing results
    Browsing,
    /// Showing help overlay
    Help,
    /// Showing delete confirmation dialog
    ConfirmDelete,
    /// Deletion running with the progress overlay shown
    Deleting,
}

/// One row picked for deletion
#[derive(Debug, Clone)]
pub struct DeleteTarget {
    pub id: NodeId,
    pub path: PathBuf,
    pub size: u64,
}

/// A deletion dispatched to the background
struct InFlightDelete {
    handle: DeleteHandle,
    /// Path and size of every root, in dispatch order
    targets: Vec<(PathBuf, u64)>,
    roots: usize,
}

/// Node ids the UI keeps, remembered by path across a tree rebuild
struct Anchors {
    view_root: Option<PathBuf>,
    history: Vec<PathBuf>,
    selected: Vec<PathBuf>,
}

/// Application state
pub struct AppState {
    /// Current mode
    pub mode: AppMode,
    /// Root path being browsed
    pub root_path: PathBuf,
    /// Options every scan of this session runs with
    pub scan_config: ScanConfig,
    /// Disk tree (None until the first scan completes)
    pub tree: Option<DiskTree>,
    /// Current scan progress
    pub progress: ScanProgress,
    /// Currently selected node index in visible list
    pub selected_index: usize,
    /// Current view root (for drill-down)
    pub view_root: NodeId,
    /// Navigation history (for going back)
    pub history: Vec<NodeId>,
    /// Scroll offset for tree view
    pub scroll_offset: usize,
    /// Visible area height (set by UI)
    pub visible_height: usize,
    /// Whether app should quit
    pub should_quit: bool,
    /// Quit was asked for while a deletion ran; leave once it completes
    pub quit_after_delete: bool,
    /// Spinner frame for animation
    pub spinner_frame: usize,
    /// Error banner shown above the footer
    pub error_message: Option<String>,
    /// Rows waiting for the user to confirm deletion
    pub pending_delete: Vec<DeleteTarget>,
    /// Session statistics (removed files, freed space)
    pub session_stats: SessionStats,
    /// Multi-selected nodes (stable arena indices)
    pub selected_nodes: HashSet<NodeId>,
    scan: Option<ScanJob>,
    delete: Option<InFlightDelete>,
}

impl AppState {
    pub fn new(root_path: PathBuf, scan_config: ScanConfig) -> Self {
        Self {
            mode: AppMode::Scanning,
            root_path,
            scan_config,
            tree: None,
            progress: ScanProgress::default(),
            selected_index: 0,
            view_root: NodeId::ROOT,
            history: Vec::new(),
            scroll_offset: 0,
            visible_height: 20,
            should_quit: false,
            quit_after_delete: false,
            spinner_frame: 0,
            error_message: None,
            pending_delete: Vec::new(),
            session_stats: SessionStats::default(),
            selected_nodes: HashSet::new(),
            scan: None,
            delete: None,
        }
    }

    // --- Scanning ---

    /// Kick off the first scan of the browsed root
    pub fn start_scan(&mut self) {
        self.mode = AppMode::Scanning;
        self.scan = Some(ScanJob::start(
            self.scan_config.clone(),
            &self.root_path,
            ScanPurpose::Initial,
        ));
    }

    /// True while a reload triggered by a deletion is running
    pub fn is_refreshing(&self) -> bool {
        self.scan
            .as_ref()
            .is_some_and(|job| *job.purpose() != ScanPurpose::Initial)
    }

    /// Drain scanner messages and apply a finished tree
    pub fn poll_scan(&mut self) {
        let Some(job) = self.scan.as_mut() else {
            return;
        };
        let purpose = job.purpose().clone();

        for update in job.poll() {
            match update {
                ScanUpdate::Progress(progress) => {
                    if purpose == ScanPurpose::Initial {
                        self.progress = progress;
                    }
                }
                ScanUpdate::Finalizing => {
                    if purpose == ScanPurpose::Initial {
                        self.mode = AppMode::Finalizing;
                    }
                }
                ScanUpdate::Finished(tree) => {
                    self.scan = None;
                    self.apply_scan(purpose, tree);
                    return;
                }
                ScanUpdate::Cancelled => {
                    self.scan = None;
                    if purpose == ScanPurpose::Initial {
                        self.quit();
                    }
                    return;
                }
            }
        }
    }

    fn apply_scan(&mut self, purpose: ScanPurpose, fresh: DiskTree) {
        match purpose {
            ScanPurpose::Initial => self.set_tree(fresh),
            ScanPurpose::Directory(dir) => {
                let target = self.tree.as_ref().and_then(|t| t.find_by_path(&dir));
                if target.is_none() {
                    self.start_refresh(ScanPurpose::Full);
                    return;
                }
                // Grafting may renumber the arena
                let anchors = self.anchors();
                if let (Some(tree), Some(id)) = (self.tree.as_mut(), target) {
                    tree.replace_children(id, &fresh);
                }
                self.restore_anchors(anchors);
            }
            ScanPurpose::Full => {
                let anchors = self.anchors();
                self.tree = Some(fresh);
                self.restore_anchors(anchors);
            }
        }
    }

    /// Set the tree after the first scan completes
    pub fn set_tree(&mut self, tree: DiskTree) {
        self.tree = Some(tree);
        self.mode = AppMode::Browsing;
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.view_root = NodeId::ROOT;
        self.history.clear();
    }

    /// Paths behind every node id the UI holds on to
    fn anchors(&self) -> Anchors {
        let path_of = |id: NodeId| {
            self.tree
                .as_ref()
                .and_then(|t| t.get(id))
                .map(|n| n.path.clone())
        };
        Anchors {
            view_root: path_of(self.view_root),
            history: self.history.iter().filter_map(|&id| path_of(id)).collect(),
            selected: self.selected_nodes.iter().filter_map(|&id| path_of(id)).collect(),
        }
    }

    /// Resolve remembered paths against the current tree; whatever no
    /// longer exists is dropped, a lost view root falls back to the root
    fn restore_anchors(&mut self, anchors: Anchors) {
        let Some(tree) = &self.tree else {
            return;
        };

        self.view_root = anchors
            .view_root
            .and_then(|p| tree.find_by_path(&p))
            .unwrap_or(NodeId::ROOT);
        self.history = anchors
            .history
            .iter()
            .filter_map(|p| tree.find_by_path(p))
            .collect();
        self.selected_nodes = anchors
            .selected
            .iter()
            .filter_map(|p| tree.find_by_path(p))
            .collect();
        self.pending_delete.retain_mut(|target| match tree.find_by_path(&target.path) {
            Some(id) => {
                target.id = id;
                true
            }
            None => false,
        });
        if self.mode == AppMode::ConfirmDelete && self.pending_delete.is_empty() {
            self.mode = AppMode::Browsing;
        }
        self.clamp_selection();
    }

    /// Rescan in the background; a newer request supersedes a running one
    fn start_refresh(&mut self, purpose: ScanPurpose) {
        if let Some(job) = self.scan.take() {
            job.cancel();
        }

        let job = match &purpose {
            ScanPurpose::Directory(dir) => {
                let depth = self
                    .tree
                    .as_ref()
                    .and_then(|t| t.find_by_path(dir))
                    .and_then(|id| self.tree.as_ref()?.get(id))
                    .map(|n| n.depth)
                    .unwrap_or(0);
                ScanJob::start(nested_config(&self.scan_config, depth), dir, purpose.clone())
            }
            _ => ScanJob::start(self.scan_config.clone(), &self.root_path, purpose),
        };
        self.scan = Some(job);
    }

    /// Reload the directory holding `root`, or everything if that directory
    /// is not part of the browsed tree
    fn refresh_parent_of(&mut self, root: &Path) {
        let parent = root.parent().filter(|p| p.is_dir());
        let known = parent.is_some_and(|p| {
            self.tree
                .as_ref()
                .is_some_and(|t| t.find_by_path(p).is_some())
        });

        match parent {
            Some(parent) if known => {
                self.start_refresh(ScanPurpose::Directory(parent.to_path_buf()))
            }
            _ => self.start_refresh(ScanPurpose::Full),
        }
    }

    /// Cancel any running scan (on quit)
    pub fn cancel_scan(&mut self) {
        if let Some(job) = self.scan.take() {
            job.cancel();
        }
    }

    /// Advance spinner animation
    pub fn tick_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % 10;
    }

    // --- Navigation ---

    /// Get visible nodes in current view
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        match &self.tree {
            Some(tree) => tree.visible_nodes(self.view_root),
            None => Vec::new(),
        }
    }

    /// Get currently selected node ID
    pub fn selected_node(&self) -> Option<NodeId> {
        self.visible_nodes().get(self.selected_index).copied()
    }

    fn ensure_visible(&mut self) {
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + self.visible_height {
            self.scroll_offset = self.selected_index + 1 - self.visible_height.max(1);
        }
    }

    pub fn move_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
        self.ensure_visible();
    }

    pub fn move_down(&mut self) {
        let count = self.visible_nodes().len();
        if self.selected_index + 1 < count {
            self.selected_index += 1;
        }
        self.ensure_visible();
    }

    pub fn page_up(&mut self) {
        let page = self.visible_height.saturating_sub(2).max(1);
        self.selected_index = self.selected_index.saturating_sub(page);
        self.ensure_visible();
    }

    pub fn page_down(&mut self) {
        let page = self.visible_height.saturating_sub(2).max(1);
        let last = self.visible_nodes().len().saturating_sub(1);
        self.selected_index = (self.selected_index + page).min(last);
        self.ensure_visible();
    }

    pub fn go_to_first(&mut self) {
        self.selected_index = 0;
        self.ensure_visible();
    }

    pub fn go_to_last(&mut self) {
        self.selected_index = self.visible_nodes().len().saturating_sub(1);
        self.ensure_visible();
    }

    pub fn toggle_selected(&mut self) {
        if let Some(node_id) = self.selected_node()
            && let Some(tree) = &mut self.tree
        {
            tree.toggle_expanded(node_id);
        }
    }

    pub fn expand_selected(&mut self) {
        if let Some(node_id) = self.selected_node()
            && let Some(tree) = &mut self.tree
        {
            tree.set_expanded(node_id, true);
        }
    }

    /// Collapse the selected directory, or jump to and collapse its parent
    pub fn collapse_selected(&mut self) {
        let Some(node_id) = self.selected_node() else {
            return;
        };
        let Some(tree) = &mut self.tree else {
            return;
        };
        let Some(node) = tree.get(node_id) else {
            return;
        };

        if node.is_expanded {
            tree.set_expanded(node_id, false);
        } else if let Some(parent) = node.parent {
            tree.set_expanded(parent, false);
            let nodes = tree.visible_nodes(self.view_root);
            if let Some(idx) = nodes.iter().position(|&id| id == parent) {
                self.selected_index = idx;
                self.ensure_visible();
            }
        }
    }

    /// Drill down into selected directory
    pub fn drill_down(&mut self) {
        if let Some(node_id) = self.selected_node()
            && node_id != self.view_root
            && let Some(tree) = &self.tree
            && let Some(node) = tree.get(node_id)
            && node.kind.is_directory()
            && node.has_children()
        {
            self.history.push(self.view_root);
            self.view_root = node_id;
            self.selected_index = 0;
            self.scroll_offset = 0;
        }
    }

    /// Go back to the previous view root
    pub fn go_back(&mut self) {
        if let Some(prev_root) = self.history.pop() {
            self.view_root = prev_root;
            self.selected_index = 0;
            self.scroll_offset = 0;
        }
    }

    /// Keep cursor, scroll and view root valid after the tree changed
    fn clamp_selection(&mut self) {
        let view_alive = self
            .tree
            .as_ref()
            .is_some_and(|t| t.get(self.view_root).is_some());
        if !view_alive {
            self.view_root = NodeId::ROOT;
            self.history.clear();
        }

        let count = self.visible_nodes().len();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
        if self.scroll_offset > self.selected_index {
            self.scroll_offset = self.selected_index;
        }

        if let Some(tree) = &self.tree {
            self.selected_nodes.retain(|&id| tree.get(id).is_some());
        }
    }

    // --- Overlays ---

    pub fn show_help(&mut self) {
        self.mode = AppMode::Help;
    }

    pub fn hide_help(&mut self) {
        self.mode = AppMode::Browsing;
    }

    /// Leave now, or once the running deletion has completed. A deletion
    /// is never cut short.
    pub fn quit(&mut self) {
        if self.delete.is_some() {
            self.quit_after_delete = true;
            self.mode = AppMode::Deleting;
            return;
        }
        self.should_quit = true;
    }

    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    // --- Selection ---

    /// Toggle the cursor row in or out of the multi-selection
    pub fn toggle_select(&mut self) {
        let Some(node_id) = self.selected_node() else {
            return;
        };
        if node_id == NodeId::ROOT {
            return;
        }
        if !self.selected_nodes.remove(&node_id) {
            self.selected_nodes.insert(node_id);
        }
    }

    fn add_to_selection(&mut self, node_id: NodeId) {
        if node_id != NodeId::ROOT {
            self.selected_nodes.insert(node_id);
        }
    }

    /// Add the cursor row, move up, add the new row
    pub fn select_move_up(&mut self) {
        if let Some(node_id) = self.selected_node() {
            self.add_to_selection(node_id);
        }
        self.move_up();
        if let Some(node_id) = self.selected_node() {
            self.add_to_selection(node_id);
        }
    }

    /// Add the cursor row, move down, add the new row
    pub fn select_move_down(&mut self) {
        if let Some(node_id) = self.selected_node() {
            self.add_to_selection(node_id);
        }
        self.move_down();
        if let Some(node_id) = self.selected_node() {
            self.add_to_selection(node_id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_nodes.clear();
    }

    pub fn selection_count(&self) -> usize {
        self.selected_nodes.len()
    }

    /// Selected nodes minus those whose ancestor is also selected
    fn dedup_selected_nodes(&self) -> Vec<NodeId> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };

        let mut result: Vec<NodeId> = self
            .selected_nodes
            .iter()
            .copied()
            .filter(|&id| {
                let mut current = tree.get(id).and_then(|n| n.parent);
                while let Some(parent) = current {
                    if self.selected_nodes.contains(&parent) {
                        return false;
                    }
                    current = tree.get(parent).and_then(|n| n.parent);
                }
                true
            })
            .collect();

        // Largest first, the order the tree shows them in
        result.sort_by_key(|&id| std::cmp::Reverse(tree.get(id).map(|n| n.size).unwrap_or(0)));
        result
    }

    // --- Deletion ---

    /// True while a deletion runs in the background
    pub fn delete_in_flight(&self) -> bool {
        self.delete.is_some()
    }

    /// Files removed so far by the running deletion
    pub fn delete_progress(&self) -> u64 {
        self.delete
            .as_ref()
            .map(|d| d.handle.removed_so_far())
            .unwrap_or(0)
    }

    /// Number of roots in the running deletion
    pub fn delete_roots(&self) -> usize {
        self.delete.as_ref().map(|d| d.roots).unwrap_or(0)
    }

    /// Open the confirmation dialog for the multi-selection or, without
    /// one, the cursor row
    pub fn request_delete(&mut self) {
        if self.delete.is_some() {
            self.set_error("A deletion is already running".to_string());
            return;
        }
        let Some(tree) = &self.tree else {
            return;
        };

        let ids = if self.selected_nodes.is_empty() {
            self.selected_node().into_iter().collect()
        } else {
            self.dedup_selected_nodes()
        };

        let targets: Vec<DeleteTarget> = ids
            .into_iter()
            .filter(|&id| id != NodeId::ROOT)
            .filter_map(|id| {
                let node = tree.get(id)?;
                Some(DeleteTarget {
                    id,
                    path: node.path.clone(),
                    size: node.size,
                })
            })
            .collect();

        if targets.is_empty() {
            return;
        }
        self.pending_delete = targets;
        self.mode = AppMode::ConfirmDelete;
    }

    /// Dispatch the confirmed deletion and drop the rows from the tree
    /// right away
    pub fn confirm_delete(&mut self) {
        if self.delete.is_some() {
            self.cancel_delete();
            return;
        }
        let targets = std::mem::take(&mut self.pending_delete);
        if targets.is_empty() {
            self.mode = AppMode::Browsing;
            return;
        }

        if let Some(tree) = &mut self.tree {
            for target in &targets {
                tree.remove_node(target.id);
            }
        }
        self.selected_nodes.clear();
        self.clamp_selection();

        let bytes: u64 = targets.iter().map(|t| t.size).sum();
        let targets: Vec<(PathBuf, u64)> = targets.into_iter().map(|t| (t.path, t.size)).collect();
        info!(roots = targets.len(), bytes, "deletion confirmed");

        let roots = targets.iter().map(|(path, _)| path.clone()).collect();
        let request = DeletionRequest::multiple(roots).with_progress(ProgressCounter::new());
        self.delete = Some(InFlightDelete {
            handle: spawn_delete(request),
            roots: targets.len(),
            targets,
        });
        self.error_message = None;
        self.mode = AppMode::Deleting;
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete.clear();
        self.mode = AppMode::Browsing;
    }

    /// Hide the overlay; the run keeps going and completes in the background
    pub fn hide_delete_progress(&mut self) {
        if self.mode == AppMode::Deleting {
            self.mode = AppMode::Browsing;
        }
    }

    /// Check once whether the background deletion has finished
    pub fn poll_delete(&mut self) {
        let Some(in_flight) = self.delete.as_mut() else {
            return;
        };

        match in_flight.handle.try_result() {
            Ok(None) => {}
            Ok(Some(result)) => {
                if let Some(in_flight) = self.delete.take() {
                    self.finish_delete(result, &in_flight.targets);
                }
            }
            Err(err) => {
                warn!("deletion worker lost: {}", err);
                self.delete = None;
                self.set_error(err.to_string());
                self.hide_delete_progress();
                self.start_refresh(ScanPurpose::Full);
            }
        }

        if self.quit_after_delete && self.delete.is_none() {
            self.should_quit = true;
        }
    }

    /// Block until the running deletion, if any, has completed
    pub fn wait_for_delete(&mut self) {
        let Some(in_flight) = self.delete.take() else {
            return;
        };
        info!(roots = in_flight.roots, "waiting for deletion before exit");
        match in_flight.handle.wait() {
            Ok(result) => self.record_delete(&result, &in_flight.targets),
            Err(err) => warn!("deletion worker lost: {}", err),
        }
    }

    fn finish_delete(&mut self, result: DeletionResult, targets: &[(PathBuf, u64)]) {
        self.record_delete(&result, targets);

        if let Some(err) = &result.error {
            self.set_error(format!("Delete failed: {}", err));
        }
        self.hide_delete_progress();

        match &result.refresh {
            RefreshHint::Parent(root) => self.refresh_parent_of(root),
            RefreshHint::Full => self.start_refresh(ScanPurpose::Full),
        }
    }

    /// Fold a completed run into the session stats. Only roots that
    /// reported no error count towards freed bytes.
    fn record_delete(&mut self, result: &DeletionResult, targets: &[(PathBuf, u64)]) {
        self.session_stats.runs += 1;
        self.session_stats.files_removed += result.count;
        self.session_stats.bytes_freed += targets
            .iter()
            .filter(|(path, _)| !result.failed_roots.contains(path))
            .map(|(_, size)| size)
            .sum::<u64>();
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{Duration, Instant};

    use dustpan_core::NodeKind;
    use tempfile::TempDir;

    use super::*;

    /// Browsing state over a tree built by hand:
    /// root/{big/{inner.bin}, small.txt}
    fn browsing(root: &Path) -> AppState {
        let mut tree = DiskTree::new(root.to_path_buf());
        let big = tree.add_node("big".into(), NodeKind::Directory, root.join("big"), NodeId::ROOT);
        let inner =
            tree.add_node("inner.bin".into(), NodeKind::File, root.join("big/inner.bin"), big);
        let small =
            tree.add_node("small.txt".into(), NodeKind::File, root.join("small.txt"), NodeId::ROOT);
        tree.set_size(inner, 300);
        tree.set_size(small, 100);
        tree.aggregate_sizes();
        tree.sort_by_size();

        let mut state = AppState::new(root.to_path_buf(), ScanConfig::default());
        state.set_tree(tree);
        state
    }

    fn wait_for_delete(state: &mut AppState) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while state.delete_in_flight() {
            assert!(Instant::now() < deadline, "deletion did not complete");
            state.poll_delete();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_root_is_never_a_delete_target() {
        let mut state = browsing(Path::new("/nowhere"));
        state.selected_index = 0;
        state.request_delete();
        assert_eq!(state.mode, AppMode::Browsing);
        assert!(state.pending_delete.is_empty());
    }

    #[test]
    fn test_selected_descendants_are_folded_into_ancestor() {
        let mut state = browsing(Path::new("/nowhere"));
        let tree = state.tree.as_ref().unwrap();
        let big = tree.find_by_path(Path::new("/nowhere/big")).unwrap();
        let inner = tree.find_by_path(Path::new("/nowhere/big/inner.bin")).unwrap();
        let small = tree.find_by_path(Path::new("/nowhere/small.txt")).unwrap();
        state.selected_nodes.extend([big, inner, small]);

        state.request_delete();

        assert_eq!(state.mode, AppMode::ConfirmDelete);
        let paths: Vec<_> = state.pending_delete.iter().map(|t| t.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("/nowhere/big"), PathBuf::from("/nowhere/small.txt")]
        );
    }

    #[test]
    fn test_confirmed_delete_removes_rows_and_completes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        fs::create_dir(root.join("big")).unwrap();
        fs::write(root.join("big/inner.bin"), b"inner").unwrap();
        fs::write(root.join("small.txt"), b"small").unwrap();

        let mut state = browsing(&root);
        state.selected_index = 1;
        state.request_delete();
        assert_eq!(state.pending_delete.len(), 1);
        assert_eq!(state.pending_delete[0].path, root.join("big"));

        state.confirm_delete();
        assert_eq!(state.mode, AppMode::Deleting);
        assert!(state.tree.as_ref().unwrap().find_by_path(&root.join("big")).is_none());
        assert_eq!(state.tree.as_ref().unwrap().total_size(), 100);

        wait_for_delete(&mut state);

        assert_eq!(state.mode, AppMode::Browsing);
        assert!(state.error_message.is_none());
        assert_eq!(state.session_stats.files_removed, 1);
        assert_eq!(state.session_stats.bytes_freed, 300);
        assert!(!root.join("big").exists());
        // Single root: the root's parent (the browsed root) is reloaded
        assert!(state.is_refreshing());
        state.cancel_scan();
    }

    #[test]
    fn test_second_delete_rejected_while_in_flight() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        fs::create_dir(root.join("big")).unwrap();
        fs::write(root.join("big/inner.bin"), b"inner").unwrap();
        fs::write(root.join("small.txt"), b"small").unwrap();

        let mut state = browsing(&root);
        state.selected_index = 1;
        state.request_delete();
        state.confirm_delete();
        state.hide_delete_progress();

        if state.delete_in_flight() {
            state.selected_index = 1;
            state.request_delete();
            assert_eq!(state.mode, AppMode::Browsing);
            assert!(state.pending_delete.is_empty());
            assert!(state.error_message.is_some());
        }

        wait_for_delete(&mut state);
        state.cancel_scan();
    }

    #[test]
    fn test_failed_delete_shows_banner_and_full_refresh() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();

        // Neither entry exists on disk, so both roots fail
        let mut state = browsing(&root);
        let tree = state.tree.as_ref().unwrap();
        let big = tree.find_by_path(&root.join("big")).unwrap();
        let small = tree.find_by_path(&root.join("small.txt")).unwrap();
        state.selected_nodes.extend([big, small]);
        state.request_delete();
        state.confirm_delete();

        wait_for_delete(&mut state);

        let banner = state.error_message.clone().unwrap();
        assert!(banner.starts_with("Delete failed: "));
        assert!(banner.contains("; "));
        assert_eq!(state.session_stats.files_removed, 0);
        assert_eq!(state.session_stats.bytes_freed, 0);
        assert!(state.is_refreshing());
        state.cancel_scan();
    }

    /// `count` files under `dir`, enough to keep a deletion busy for a moment
    fn fill(dir: &Path, count: usize) {
        fs::create_dir_all(dir).unwrap();
        for i in 0..count {
            fs::write(dir.join(format!("f{:05}", i)), b"x").unwrap();
        }
    }

    #[test]
    fn test_quit_during_delete_waits_for_completion() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        fill(&root.join("big"), 2_000);
        fs::write(root.join("small.txt"), b"small").unwrap();

        let mut state = browsing(&root);
        state.selected_index = 1;
        state.request_delete();
        state.confirm_delete();
        state.hide_delete_progress();

        state.quit();
        if state.delete_in_flight() {
            assert!(!state.should_quit);
            assert!(state.quit_after_delete);
            assert_eq!(state.mode, AppMode::Deleting);
        }

        let deadline = Instant::now() + Duration::from_secs(10);
        while !state.should_quit {
            assert!(Instant::now() < deadline, "quit never went through");
            state.poll_delete();
            std::thread::sleep(Duration::from_millis(5));
        }

        assert!(!state.delete_in_flight());
        assert!(!root.join("big").exists());
        assert_eq!(state.session_stats.files_removed, 2_000);
        state.cancel_scan();
    }

    #[test]
    fn test_wait_for_delete_finishes_the_run() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        fill(&root.join("big"), 2_000);
        fs::write(root.join("small.txt"), b"small").unwrap();

        let mut state = browsing(&root);
        state.selected_index = 1;
        state.request_delete();
        state.confirm_delete();

        // The exit path of the event loop
        state.wait_for_delete();

        assert!(!state.delete_in_flight());
        assert!(!root.join("big").exists());
        assert_eq!(state.session_stats.runs, 1);
        assert_eq!(state.session_stats.files_removed, 2_000);
    }

    #[test]
    fn test_partial_failure_still_counts_freed_bytes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        // small.txt exists on disk, big/ does not
        fs::write(root.join("small.txt"), b"small").unwrap();

        let mut state = browsing(&root);
        let tree = state.tree.as_ref().unwrap();
        let big = tree.find_by_path(&root.join("big")).unwrap();
        let small = tree.find_by_path(&root.join("small.txt")).unwrap();
        state.selected_nodes.extend([big, small]);
        state.request_delete();
        state.confirm_delete();

        wait_for_delete(&mut state);

        assert!(state.error_message.is_some());
        assert_eq!(state.session_stats.files_removed, 1);
        assert_eq!(state.session_stats.bytes_freed, 100);
        state.cancel_scan();
    }

    #[test]
    fn test_directory_refresh_keeps_view_and_selection_by_path() {
        let root = PathBuf::from("/nowhere");
        let mut state = browsing(&root);
        let tree = state.tree.as_ref().unwrap();
        let big = tree.find_by_path(&root.join("big")).unwrap();
        let inner = tree.find_by_path(&root.join("big/inner.bin")).unwrap();
        state.view_root = big;
        state.history.push(NodeId::ROOT);
        state.selected_nodes.insert(inner);

        for _ in 0..5 {
            let fresh = browsing(&root).tree.unwrap();
            state.apply_scan(ScanPurpose::Directory(root.clone()), fresh);
        }

        let tree = state.tree.as_ref().unwrap();
        assert!(tree.len() <= 2 * tree.live_count());
        assert_eq!(tree.get(state.view_root).unwrap().path, root.join("big"));
        assert_eq!(state.history, vec![NodeId::ROOT]);
        let selected: Vec<_> = state.selected_nodes.iter().copied().collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(tree.get(selected[0]).unwrap().path, root.join("big/inner.bin"));
        assert_eq!(tree.total_size(), 400);
    }
}

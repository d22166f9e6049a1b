use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::error::AggregateError;
use super::progress::ProgressCounter;
use super::walker::delete_path_from;

/// What the UI should reload once a deletion completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshHint {
    /// Exactly one root was requested: reload the listing of its parent
    Parent(PathBuf),
    /// Several roots were touched: reload everything
    Full,
}

/// Completion message of one deletion run.
///
/// A value only exists once the run has finished, cleanup included.
#[derive(Debug, Clone)]
pub struct DeletionResult {
    /// Entries removed across all roots, regardless of failures
    pub count: u64,
    /// Per-root failure messages, `None` if every root was removed cleanly
    pub error: Option<AggregateError>,
    /// Roots that reported an error, in request order
    pub failed_roots: Vec<PathBuf>,
    pub refresh: RefreshHint,
}

impl DeletionResult {
    pub fn is_clean(&self) -> bool {
        self.error.is_none()
    }

    /// Path whose parent should be reloaded, `None` for a full refresh
    pub fn refresh_path(&self) -> Option<&Path> {
        match &self.refresh {
            RefreshHint::Parent(path) => Some(path),
            RefreshHint::Full => None,
        }
    }
}

/// Delete every root in order, one fully finished before the next starts.
///
/// Sequencing is what keeps the counter single-writer: each root publishes
/// the running total of the roots before it plus its own tally.
pub fn delete_all(roots: &[PathBuf], progress: Option<&ProgressCounter>) -> DeletionResult {
    let mut total = 0u64;
    let mut messages = Vec::new();
    let mut failed_roots = Vec::new();

    for root in roots {
        let outcome = delete_path_from(root, progress, total);
        total += outcome.count;

        if let Some(err) = outcome.error {
            warn!(root = %root.display(), kind = ?err.kind(), "deletion incomplete: {}", err);
            messages.push(err.to_string());
            failed_roots.push(root.clone());
        }
    }

    info!(
        roots = roots.len(),
        removed = total,
        failed_roots = messages.len(),
        "deletion finished"
    );

    let error = if messages.is_empty() {
        None
    } else {
        Some(AggregateError::new(messages))
    };

    let refresh = match roots {
        [only] => RefreshHint::Parent(only.clone()),
        _ => RefreshHint::Full,
    };

    DeletionResult {
        count: total,
        error,
        failed_roots,
        refresh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_no_roots() {
        let result = delete_all(&[], None);
        assert_eq!(result.count, 0);
        assert!(result.is_clean());
        assert_eq!(result.refresh, RefreshHint::Full);
    }

    #[test]
    fn test_single_root_keeps_its_path() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("one");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("f"), b"f").unwrap();

        let result = delete_all(&[root.clone()], None);

        assert_eq!(result.count, 1);
        assert_eq!(result.refresh_path(), Some(root.as_path()));
    }

    #[test]
    fn test_two_clean_roots_still_request_full_refresh() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let result = delete_all(&[a, b], None);

        assert_eq!(result.count, 2);
        assert!(result.is_clean());
        assert!(result.failed_roots.is_empty());
        assert_eq!(result.refresh, RefreshHint::Full);
    }

    #[test]
    fn test_failed_roots_are_named() {
        let temp = TempDir::new().unwrap();
        let kept = temp.path().join("kept");
        let gone = temp.path().join("gone");
        fs::write(&kept, b"k").unwrap();

        let result = delete_all(&[gone.clone(), kept], None);

        assert_eq!(result.count, 1);
        assert_eq!(result.failed_roots, vec![gone]);
    }
}

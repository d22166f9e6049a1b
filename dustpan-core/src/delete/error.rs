use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Number of messages shown when an [`AggregateError`] is rendered
pub const DISPLAYED_ERRORS: usize = 3;

/// Classification of a single-root deletion failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteErrorKind {
    /// Traversal or removal denied by the OS
    Permission,
    /// Traversal failure other than permission denied
    Walk,
    /// Removing a single entry failed
    Removal,
    /// Closing recursive removal of the root failed
    Cleanup,
}

/// First failure recorded while deleting one root
#[derive(Error, Debug)]
pub enum DeleteError {
    #[error("permission denied: {}: {source}", .path.display())]
    Permission { path: PathBuf, source: io::Error },

    #[error("cannot read {}: {source}", .path.display())]
    Walk { path: PathBuf, source: io::Error },

    #[error("cannot remove {}: {source}", .path.display())]
    Removal { path: PathBuf, source: io::Error },

    #[error("cannot clean up {}: {source}", .path.display())]
    Cleanup { path: PathBuf, source: io::Error },
}

impl DeleteError {
    pub fn kind(&self) -> DeleteErrorKind {
        match self {
            DeleteError::Permission { .. } => DeleteErrorKind::Permission,
            DeleteError::Walk { .. } => DeleteErrorKind::Walk,
            DeleteError::Removal { .. } => DeleteErrorKind::Removal,
            DeleteError::Cleanup { .. } => DeleteErrorKind::Cleanup,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            DeleteError::Permission { path, .. }
            | DeleteError::Walk { path, .. }
            | DeleteError::Removal { path, .. }
            | DeleteError::Cleanup { path, .. } => path,
        }
    }

    /// Classify a traversal error. `root` is used when walkdir has no path.
    pub(crate) fn from_walk(root: &Path, err: walkdir::Error) -> Self {
        let path = err.path().unwrap_or(root).to_path_buf();
        let source = match err.into_io_error() {
            Some(source) => source,
            // Only filesystem loops come without an io::Error
            None => io::Error::other("filesystem loop"),
        };
        if source.kind() == io::ErrorKind::PermissionDenied {
            DeleteError::Permission { path, source }
        } else {
            DeleteError::Walk { path, source }
        }
    }

    /// Classify a failed single-entry removal
    pub(crate) fn from_removal(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        if source.kind() == io::ErrorKind::PermissionDenied {
            DeleteError::Permission { path, source }
        } else {
            DeleteError::Removal { path, source }
        }
    }
}

/// Every per-root failure message of a multi-root run, in root order.
///
/// All messages are kept; only the `Display` rendering is limited to the
/// first [`DISPLAYED_ERRORS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateError {
    messages: Vec<String>,
}

impl AggregateError {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [only] = self.messages.as_slice() {
            return f.write_str(only);
        }
        let shown = self.messages.len().min(DISPLAYED_ERRORS);
        f.write_str(&self.messages[..shown].join("; "))
    }
}

impl std::error::Error for AggregateError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("error {}", i)).collect()
    }

    #[test]
    fn test_single_message_rendered_verbatim() {
        let err = AggregateError::new(messages(1));
        assert_eq!(err.to_string(), "error 1");
    }

    #[test]
    fn test_display_truncates_but_keeps_all() {
        let err = AggregateError::new(messages(5));
        assert_eq!(err.to_string(), "error 1; error 2; error 3");
        assert_eq!(err.len(), 5);
        assert_eq!(err.messages()[4], "error 5");
    }

    #[test]
    fn test_removal_permission_is_classified() {
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        let err = DeleteError::from_removal(Path::new("/tmp/x"), denied);
        assert_eq!(err.kind(), DeleteErrorKind::Permission);

        let busy = io::Error::other("busy");
        let err = DeleteError::from_removal(Path::new("/tmp/x"), busy);
        assert_eq!(err.kind(), DeleteErrorKind::Removal);
        assert_eq!(err.path(), Path::new("/tmp/x"));
    }
}

pub mod delete;
pub mod error;
pub mod scanner;
pub mod size;
pub mod status;
pub mod text;
pub mod tree;

pub use delete::{
    AggregateError, DeleteError, DeleteErrorKind, DeleteHandle, DeletionRequest, DeletionResult,
    ProgressCounter, RefreshHint, WalkOutcome, delete_all, delete_path, spawn_delete,
};
pub use error::{DustpanError, Result};
pub use scanner::{CancellationToken, ScanConfig, ScanMessage, ScanProgress, Scanner, validate_root};
pub use size::{format_count, format_rate, format_size, format_size_compact, size_percentage};
pub use text::{shorten, truncate_path_start};
pub use tree::{DiskTree, NodeId, NodeKind, TreeNode};

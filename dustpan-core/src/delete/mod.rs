//! Best-effort bulk deletion with live progress.
//!
//! [`delete_path`] removes one root, [`delete_all`] sequences several and
//! aggregates their outcome, [`spawn_delete`] runs that on a worker thread so
//! the render loop can keep polling a [`ProgressCounter`] until the single
//! [`DeletionResult`] arrives.

mod error;
mod orchestrator;
mod progress;
mod task;
mod walker;

pub use error::{AggregateError, DISPLAYED_ERRORS, DeleteError, DeleteErrorKind};
pub use orchestrator::{DeletionResult, RefreshHint, delete_all};
pub use progress::ProgressCounter;
pub use task::{DeleteHandle, DeletionRequest, spawn_delete};
pub use walker::{WalkOutcome, delete_path};

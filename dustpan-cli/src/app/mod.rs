mod action;
mod scan;
mod state;

pub use action::Action;
pub use state::{AppMode, AppState, DeleteTarget, SessionStats};

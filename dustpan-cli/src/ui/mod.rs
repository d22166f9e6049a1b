pub mod bar_chart;
mod confirm;
mod delete_progress;
mod footer;
mod header;
mod help;
mod layout;
mod progress;
mod status_view;
mod theme;
mod tree_view;

pub use confirm::ConfirmDeleteView;
pub use delete_progress::DeleteProgressView;
pub use footer::{ErrorBanner, Footer};
pub use header::Header;
pub use help::HelpView;
pub use layout::AppLayout;
pub use progress::ProgressView;
pub use status_view::StatusView;
pub use theme::Theme;
pub use tree_view::TreeView;

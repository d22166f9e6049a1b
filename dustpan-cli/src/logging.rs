use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the filter directives, e.g. `DUSTPAN_LOG=debug`
const LOG_ENV: &str = "DUSTPAN_LOG";

/// Directory the log files are written to.
///
/// Linux: `~/.cache/dustpan/`, macOS: `~/Library/Caches/dustpan/`.
pub fn log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dustpan")
}

/// Initialize file logging.
///
/// The terminal belongs to the TUI, so nothing is written to stdout or
/// stderr. Logs rotate daily. The default level is `info`; set `DUSTPAN_LOG`
/// to override.
///
/// Returns a guard that must stay alive until exit, dropping it stops the
/// background writer. `None` if the log directory cannot be created.
pub fn init_logging() -> Option<WorkerGuard> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir).ok()?;

    let appender = RollingFileAppender::new(Rotation::DAILY, dir, "dustpan.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false);

    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be set (tests); keep it
    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .ok()?;

    Some(guard)
}

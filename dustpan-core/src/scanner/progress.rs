use std::path::PathBuf;

/// Message from a background scan to the render loop
#[derive(Debug, Clone)]
pub enum ScanMessage {
    /// Walk started at this root
    Started(PathBuf),
    /// Periodic heartbeat
    Progress(ScanProgress),
    /// Walk done, sizes are being aggregated
    Finalizing,
    Completed,
    Cancelled,
}

/// Running totals of a scan
#[derive(Debug, Clone, Default)]
pub struct ScanProgress {
    pub files_scanned: u64,
    pub dirs_scanned: u64,
    pub bytes_scanned: u64,
    /// Entries that could not be read
    pub errors: u64,
    /// Most recently visited path
    pub current_path: Option<PathBuf>,
}

impl ScanProgress {
    pub fn total_entries(&self) -> u64 {
        self.files_scanned + self.dirs_scanned
    }
}

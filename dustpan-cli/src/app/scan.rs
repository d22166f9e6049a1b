use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use dustpan_core::{CancellationToken, DiskTree, ScanConfig, ScanMessage, ScanProgress, Scanner};
use tracing::{debug, warn};

/// Why a scan was started, which decides where its tree ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPurpose {
    /// First scan of the browsed root, shown full screen
    Initial,
    /// Reload of one directory, grafted into the existing tree
    Directory(PathBuf),
    /// Reload of the whole browsed root, replacing the tree
    Full,
}

/// Progress of a scan since the last poll
#[derive(Debug)]
pub enum ScanUpdate {
    Progress(ScanProgress),
    Finalizing,
    Finished(DiskTree),
    Cancelled,
}

/// A scanner running in the background plus what to do with its result
pub struct ScanJob {
    purpose: ScanPurpose,
    receiver: Receiver<ScanMessage>,
    handle: Option<JoinHandle<DiskTree>>,
    cancel: CancellationToken,
}

impl ScanJob {
    pub fn start(config: ScanConfig, root: &Path, purpose: ScanPurpose) -> Self {
        debug!(root = %root.display(), ?purpose, "starting scan");
        let cancel = CancellationToken::new();
        let scanner = Scanner::new(config).with_cancellation(cancel.clone());
        let (receiver, handle) = scanner.scan(root.to_path_buf());
        Self {
            purpose,
            receiver,
            handle: Some(handle),
            cancel,
        }
    }

    pub fn purpose(&self) -> &ScanPurpose {
        &self.purpose
    }

    /// Drain everything the scanner sent since the last call
    pub fn poll(&mut self) -> Vec<ScanUpdate> {
        let mut updates = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            match message {
                ScanMessage::Progress(progress) => updates.push(ScanUpdate::Progress(progress)),
                ScanMessage::Finalizing => updates.push(ScanUpdate::Finalizing),
                ScanMessage::Completed => {
                    if let Some(tree) = self.join() {
                        updates.push(ScanUpdate::Finished(tree));
                    }
                    break;
                }
                ScanMessage::Cancelled => {
                    updates.push(ScanUpdate::Cancelled);
                    break;
                }
                ScanMessage::Started(_) => {}
            }
        }
        updates
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    fn join(&mut self) -> Option<DiskTree> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(tree) => Some(tree),
            Err(_) => {
                warn!("scanner thread panicked");
                None
            }
        }
    }
}

/// Config for reloading `dir`, which sits `depth` levels below the browsed
/// root: the depth limit stays anchored at the browsed root.
pub fn nested_config(config: &ScanConfig, depth: u16) -> ScanConfig {
    ScanConfig {
        max_depth: config
            .max_depth
            .map(|max| max.saturating_sub(depth as usize)),
        ..config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_config_keeps_depth_anchored() {
        let config = ScanConfig {
            max_depth: Some(5),
            ..ScanConfig::default()
        };
        assert_eq!(nested_config(&config, 2).max_depth, Some(3));
        assert_eq!(nested_config(&config, 9).max_depth, Some(0));

        let unlimited = ScanConfig::default();
        assert_eq!(nested_config(&unlimited, 2).max_depth, None);
    }
}

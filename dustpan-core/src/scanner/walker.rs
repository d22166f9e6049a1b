use std::collections::HashMap;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use crossbeam_channel::{Receiver, Sender};
use jwalk::WalkDir;
use tracing::{debug, info};

use super::progress::{ScanMessage, ScanProgress};
use crate::error::{DustpanError, Result};
use crate::tree::{DiskTree, NodeId, NodeKind};

const HEARTBEAT: Duration = Duration::from_millis(100);

/// Scanner configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub follow_symlinks: bool,
    /// Maximum depth to scan (None = unlimited)
    pub max_depth: Option<usize>,
    /// Don't cross mount points
    pub same_filesystem: bool,
    /// Walker threads (0 = let jwalk decide)
    pub num_threads: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            max_depth: None,
            same_filesystem: true,
            num_threads: 0,
        }
    }
}

/// Cooperative stop flag for a running scan
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Resolve and check a directory the user asked to browse
pub fn validate_root(path: &Path) -> Result<PathBuf> {
    let resolved = path.canonicalize().map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            DustpanError::PathNotFound(path.to_path_buf())
        } else {
            DustpanError::Io(err)
        }
    })?;
    if !resolved.is_dir() {
        return Err(DustpanError::NotADirectory(resolved));
    }
    Ok(resolved)
}

/// Counters shared between the walk and its heartbeat thread
#[derive(Default)]
struct Tally {
    files: AtomicU64,
    dirs: AtomicU64,
    bytes: AtomicU64,
    errors: AtomicU64,
    current: Mutex<Option<PathBuf>>,
    done: AtomicBool,
}

impl Tally {
    fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            files_scanned: self.files.load(Ordering::Relaxed),
            dirs_scanned: self.dirs.load(Ordering::Relaxed),
            bytes_scanned: self.bytes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            current_path: self.current.lock().ok().and_then(|g| g.clone()),
        }
    }
}

/// Pseudo and volume paths that make a walk crawl or hang
const SLOW_PATTERNS: &[&str] = &[
    "/Volumes/",
    "/.Spotlight-V100",
    "/.fseventsd",
    "/.DocumentRevisions-V100",
    "CoreSimulator/Volumes",
    "/.MobileBackups",
    ".timemachine",
    "/dev/",
    "/proc/",
    "/sys/",
    "/private/var/folders",
];

/// A slow path is skipped unless the scan itself started inside it
fn is_slow_path(path: &Path, root: &Path) -> bool {
    if path == root || root.starts_with(path) {
        return false;
    }
    let path_str = path.to_string_lossy();
    let root_str = root.to_string_lossy();
    SLOW_PATTERNS
        .iter()
        .any(|pattern| path_str.contains(pattern) && !root_str.contains(pattern))
}

/// Background filesystem scanner producing a [`DiskTree`]
pub struct Scanner {
    config: ScanConfig,
    cancel_token: CancellationToken,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    /// Scan `root` on a worker thread. Messages stream through the receiver;
    /// the tree is returned by the join handle.
    pub fn scan(self, root: PathBuf) -> (Receiver<ScanMessage>, JoinHandle<DiskTree>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = std::thread::spawn(move || self.run(root, tx));
        (rx, handle)
    }

    fn run(self, root: PathBuf, tx: Sender<ScanMessage>) -> DiskTree {
        let root = root.canonicalize().unwrap_or(root);
        let mut tree = DiskTree::new(root.clone());
        let mut dir_ids: HashMap<PathBuf, NodeId> = HashMap::new();
        dir_ids.insert(root.clone(), NodeId::ROOT);

        let root_dev = std::fs::metadata(&root).map(|m| device_id(&m)).unwrap_or(0);

        info!(root = %root.display(), "scan started");

        let tally = Arc::new(Tally::default());
        let heartbeat = {
            let tally = Arc::clone(&tally);
            let tx = tx.clone();
            let cancel = self.cancel_token.clone();
            std::thread::spawn(move || {
                while !tally.done.load(Ordering::Relaxed) && !cancel.is_cancelled() {
                    std::thread::sleep(HEARTBEAT);
                    let _ = tx.send(ScanMessage::Progress(tally.snapshot()));
                }
            })
        };

        let _ = tx.send(ScanMessage::Started(root.clone()));

        let same_fs = self.config.same_filesystem;
        let filter_root = root.clone();
        let mut walker = WalkDir::new(&root)
            .skip_hidden(false)
            .follow_links(self.config.follow_symlinks)
            .sort(false)
            .process_read_dir(move |_depth, dir, _state, children| {
                if is_slow_path(dir, &filter_root) {
                    children.clear();
                    return;
                }
                children.retain(|child| match child {
                    Ok(entry) => {
                        if is_slow_path(&entry.path(), &filter_root) {
                            return false;
                        }
                        !(same_fs
                            && entry
                                .metadata()
                                .map(|m| device_id(&m) != root_dev)
                                .unwrap_or(false))
                    }
                    Err(_) => true,
                });
            });

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }
        if self.config.num_threads > 0 {
            walker = walker.parallelism(jwalk::Parallelism::RayonNewPool(self.config.num_threads));
        }

        for entry in walker {
            if self.cancel_token.is_cancelled() {
                tally.done.store(true, Ordering::Relaxed);
                let _ = heartbeat.join();
                debug!(root = %root.display(), "scan cancelled");
                let _ = tx.send(ScanMessage::Cancelled);
                return tree;
            }

            let Ok(entry) = entry else {
                tally.errors.fetch_add(1, Ordering::Relaxed);
                continue;
            };

            let path = entry.path();
            if path == root {
                continue;
            }

            let Ok(metadata) = entry.metadata() else {
                tally.errors.fetch_add(1, Ordering::Relaxed);
                continue;
            };

            let Some(&parent_id) = path.parent().and_then(|p| dir_ids.get(p)) else {
                continue;
            };

            let file_type = entry.file_type();
            let kind = if file_type.is_dir() {
                NodeKind::Directory
            } else if file_type.is_symlink() {
                NodeKind::Symlink
            } else {
                NodeKind::File
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let id = tree.add_node(name, kind, path.clone(), parent_id);

            let size = disk_usage(&metadata);
            tree.set_size(id, size);
            tally.bytes.fetch_add(size, Ordering::Relaxed);

            if kind == NodeKind::Directory {
                dir_ids.insert(path.clone(), id);
                tally.dirs.fetch_add(1, Ordering::Relaxed);
            } else {
                tally.files.fetch_add(1, Ordering::Relaxed);
            }

            if let Ok(mut current) = tally.current.lock() {
                *current = Some(path);
            }
        }

        tally.done.store(true, Ordering::Relaxed);
        let _ = heartbeat.join();

        let _ = tx.send(ScanMessage::Finalizing);
        tree.aggregate_sizes();
        tree.sort_by_size();

        let progress = tally.snapshot();
        info!(
            root = %root.display(),
            files = progress.files_scanned,
            dirs = progress.dirs_scanned,
            errors = progress.errors,
            "scan completed"
        );
        let _ = tx.send(ScanMessage::Progress(progress));
        let _ = tx.send(ScanMessage::Completed);

        tree
    }
}

/// Allocated size (st_blocks is in 512-byte units)
#[cfg(unix)]
fn disk_usage(metadata: &Metadata) -> u64 {
    metadata.blocks() * 512
}

#[cfg(not(unix))]
fn disk_usage(metadata: &Metadata) -> u64 {
    metadata.len()
}

#[cfg(unix)]
fn device_id(metadata: &Metadata) -> u64 {
    metadata.dev()
}

#[cfg(not(unix))]
fn device_id(_metadata: &Metadata) -> u64 {
    0
}

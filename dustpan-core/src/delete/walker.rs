use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use super::error::{DeleteError, DeleteErrorKind};
use super::progress::ProgressCounter;

/// What deleting one root achieved
#[derive(Debug)]
pub struct WalkOutcome {
    /// Non-directory entries actually removed, even when `error` is set
    pub count: u64,
    /// First failure recorded, `None` if the whole root is gone
    pub error: Option<DeleteError>,
}

/// Delete one root (file or directory subtree), best-effort.
///
/// Every non-directory entry is removed individually and counted. Failures
/// never abort the walk: an unreadable directory is skipped, anything else
/// is stepped over. A closing recursive removal then clears the directories
/// left behind. Only the first failure is reported, and a failure of the
/// closing removal never replaces an earlier one.
pub fn delete_path(root: &Path, progress: Option<&ProgressCounter>) -> WalkOutcome {
    delete_path_from(root, progress, 0)
}

/// Like [`delete_path`], publishing `base + local tally` to the counter so a
/// multi-root run keeps the displayed value non-decreasing.
pub(crate) fn delete_path_from(
    root: &Path,
    progress: Option<&ProgressCounter>,
    base: u64,
) -> WalkOutcome {
    let mut walk = RootWalk {
        progress,
        base,
        count: 0,
        first_error: None,
    };

    debug!(root = %root.display(), "deleting root");

    // walkdir always follows a symlinked root; remove the link itself instead
    let root_is_link = fs::symlink_metadata(root)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);

    if root_is_link {
        walk.remove_entry(root);
    } else {
        walk.remove_entries(root);
    }

    if let Err(source) = remove_all(root) {
        walk.record(DeleteError::Cleanup {
            path: root.to_path_buf(),
            source,
        });
    }

    debug!(
        root = %root.display(),
        removed = walk.count,
        failed = walk.first_error.is_some(),
        "root finished"
    );

    WalkOutcome {
        count: walk.count,
        error: walk.first_error,
    }
}

struct RootWalk<'a> {
    progress: Option<&'a ProgressCounter>,
    base: u64,
    count: u64,
    first_error: Option<DeleteError>,
}

impl RootWalk<'_> {
    fn remove_entries(&mut self, root: &Path) {
        let mut entries = WalkDir::new(root).follow_links(false).into_iter();

        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let err = DeleteError::from_walk(root, err);
                    let denied = err.kind() == DeleteErrorKind::Permission;
                    self.record(err);
                    if denied {
                        // Drops the unreadable directory, not its siblings
                        entries.skip_current_dir();
                    }
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                self.remove_entry(entry.path());
            }
        }
    }

    fn remove_entry(&mut self, path: &Path) {
        match fs::remove_file(path) {
            Ok(()) => {
                self.count += 1;
                if let Some(progress) = self.progress {
                    progress.publish(self.base + self.count);
                }
            }
            Err(source) => self.record(DeleteError::from_removal(path, source)),
        }
    }

    /// First error wins
    fn record(&mut self, err: DeleteError) {
        if self.first_error.is_none() {
            self.first_error = Some(err);
        }
    }
}

/// Best-effort recursive removal, children before their directory.
///
/// Keeps going past entries it cannot remove so every emptied directory
/// still goes, and returns the first failure. Already missing paths count
/// as removed.
fn remove_all(root: &Path) -> io::Result<()> {
    // walkdir would descend into a symlinked root's target
    match fs::symlink_metadata(root) {
        Ok(meta) if !meta.is_dir() => return ignore_missing(fs::remove_file(root)),
        Err(err) => return ignore_missing(Err(err)),
        Ok(_) => {}
    }

    let mut first_error = None;

    for entry in WalkDir::new(root).follow_links(false).contents_first(true) {
        let result = match entry {
            Ok(entry) if entry.file_type().is_dir() => fs::remove_dir(entry.path()),
            Ok(entry) => fs::remove_file(entry.path()),
            Err(err) => Err(err
                .into_io_error()
                .unwrap_or_else(|| io::Error::other("filesystem loop"))),
        };

        if let Err(err) = ignore_missing(result) {
            first_error.get_or_insert(err);
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn ignore_missing(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

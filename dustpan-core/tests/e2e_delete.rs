//! End-to-end deletion tests against real temporary trees.
//!
//! The permission tests return early when the current user bypasses file
//! modes (root, CAP_DAC_OVERRIDE). Run them unprivileged to exercise them,
//! e.g. `setpriv --reuid=65534 --regid=65534 --clear-groups` on the built
//! test binary with a writable `TMPDIR`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use dustpan_core::{
    DeleteErrorKind, DeletionRequest, ProgressCounter, RefreshHint, delete_all, delete_path,
    spawn_delete,
};
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// ```text
/// root/
///   alpha/
///     a.txt
///     nested/
///       b.txt
///       c.txt
///   beta/
///     d.txt
///   e.txt
/// ```
fn build_tree(root: &Path) -> u64 {
    fs::create_dir_all(root.join("alpha/nested")).unwrap();
    fs::create_dir_all(root.join("beta")).unwrap();
    for file in ["alpha/a.txt", "alpha/nested/b.txt", "alpha/nested/c.txt", "beta/d.txt", "e.txt"] {
        fs::write(root.join(file), file.as_bytes()).unwrap();
    }
    5
}

fn build_flat(root: &Path, files: usize) {
    fs::create_dir_all(root).unwrap();
    for i in 0..files {
        fs::write(root.join(format!("f{:04}", i)), b"x").unwrap();
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

/// Make a directory unreadable. Returns false when the OS still lets us in
/// (running as root), in which case the caller skips the test.
#[cfg(unix)]
fn lock_dir(path: &Path) -> bool {
    set_mode(path, 0o000);
    if fs::read_dir(path).is_ok() {
        set_mode(path, 0o755);
        return false;
    }
    true
}

/// Root with an unreadable `locked/` next to readable siblings. Returns the
/// locked dir, or None if permissions cannot be enforced here.
#[cfg(unix)]
fn build_tree_with_locked_subtree(root: &Path) -> Option<PathBuf> {
    fs::create_dir_all(root.join("a")).unwrap();
    fs::create_dir_all(root.join("locked/deep")).unwrap();
    fs::create_dir_all(root.join("z")).unwrap();
    fs::write(root.join("a/1.txt"), b"1").unwrap();
    fs::write(root.join("locked/x.txt"), b"x").unwrap();
    fs::write(root.join("locked/deep/y.txt"), b"y").unwrap();
    fs::write(root.join("z/2.txt"), b"2").unwrap();
    fs::write(root.join("3.txt"), b"3").unwrap();

    let locked = root.join("locked");
    lock_dir(&locked).then_some(locked)
}

// ── Single root ──────────────────────────────────────────────────────────────

#[test]
fn clean_tree_is_fully_removed() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("root");
    let expected = build_tree(&root);

    let outcome = delete_path(&root, None);

    assert_eq!(outcome.count, expected);
    assert!(outcome.error.is_none());
    assert!(!root.exists());
}

#[test]
fn empty_directory_is_removed_with_narrow_refresh() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("empty");
    fs::create_dir(&root).unwrap();

    let result = delete_all(&[root.clone()], None);

    assert_eq!(result.count, 0);
    assert!(result.error.is_none());
    assert!(!root.exists());
    assert_eq!(result.refresh, RefreshHint::Parent(root));
}

#[test]
fn missing_root_reports_error_without_count() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("never-existed");

    let outcome = delete_path(&root, None);

    assert_eq!(outcome.count, 0);
    let err = outcome.error.expect("missing root must be reported");
    assert_eq!(err.kind(), DeleteErrorKind::Walk);
}

#[test]
fn deleting_twice_fails_the_second_time() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("root");
    build_tree(&root);

    assert!(delete_path(&root, None).error.is_none());

    let again = delete_path(&root, None);
    assert_eq!(again.count, 0);
    assert!(again.error.is_some());
}

#[cfg(unix)]
#[test]
fn unreadable_subtree_is_skipped_and_siblings_still_deleted() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("root");
    let Some(locked) = build_tree_with_locked_subtree(&root) else {
        return;
    };

    let outcome = delete_path(&root, None);
    set_mode(&locked, 0o755);

    // a/1.txt, z/2.txt and 3.txt; nothing under locked/
    assert_eq!(outcome.count, 3);
    // Emptied siblings are cleaned up whatever order they are listed in
    assert!(!root.join("a").exists());
    assert!(!root.join("z").exists());
    assert!(!root.join("3.txt").exists());
    assert!(locked.join("x.txt").exists());
    assert!(locked.join("deep/y.txt").exists());

    let err = outcome.error.expect("permission failure must be reported");
    assert_eq!(err.kind(), DeleteErrorKind::Permission);
}

#[cfg(unix)]
#[test]
fn permission_error_wins_over_cleanup_error() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("root");
    let Some(locked) = build_tree_with_locked_subtree(&root) else {
        return;
    };

    let outcome = delete_path(&root, None);
    // The closing removal could not get rid of the root either
    assert!(root.exists());
    set_mode(&locked, 0o755);

    let err = outcome.error.expect("an error must be reported");
    assert_eq!(err.kind(), DeleteErrorKind::Permission);
    assert_eq!(err.path(), locked.as_path());
}

#[cfg(unix)]
#[test]
fn file_in_read_only_directory_is_a_removal_failure() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("root");
    let sealed = root.join("sealed");
    fs::create_dir_all(&sealed).unwrap();
    fs::write(sealed.join("stuck.txt"), b"s").unwrap();
    fs::write(root.join("free.txt"), b"f").unwrap();

    // Readable and listable, but entries cannot be unlinked
    set_mode(&sealed, 0o555);
    if fs::write(sealed.join("canary"), b"c").is_ok() {
        set_mode(&sealed, 0o755);
        return;
    }

    let outcome = delete_path(&root, None);
    set_mode(&sealed, 0o755);

    assert_eq!(outcome.count, 1);
    assert!(sealed.join("stuck.txt").exists());
    let err = outcome.error.expect("removal failure must be reported");
    assert_eq!(err.kind(), DeleteErrorKind::Permission);
    assert_eq!(err.path(), sealed.join("stuck.txt").as_path());
}

// ── Multiple roots ───────────────────────────────────────────────────────────

#[test]
fn missing_middle_root_is_aggregated_and_forces_full_refresh() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("first");
    let missing = temp.path().join("second");
    let third = temp.path().join("third");
    let first_count = build_tree(&first);
    build_flat(&third, 4);

    let result = delete_all(&[first.clone(), missing.clone(), third.clone()], None);

    assert_eq!(result.count, first_count + 4);
    assert_eq!(result.refresh, RefreshHint::Full);
    assert!(!first.exists());
    assert!(!third.exists());

    let err = result.error.expect("missing root must be reported");
    assert_eq!(err.len(), 1);
    assert!(err.to_string().contains(&missing.display().to_string()));
}

#[test]
fn every_failed_root_is_kept_but_display_shows_three() {
    let temp = TempDir::new().unwrap();
    let roots: Vec<PathBuf> = (0..5).map(|i| temp.path().join(format!("gone{}", i))).collect();

    let result = delete_all(&roots, None);

    let err = result.error.expect("all roots are missing");
    assert_eq!(err.len(), 5);
    assert_eq!(err.to_string().matches("; ").count(), 2);
    assert!(err.messages()[4].contains("gone4"));
}

// ── Progress ─────────────────────────────────────────────────────────────────

/// Sample the counter from this thread while the worker deletes
fn sample_until_done(request: DeletionRequest) -> (Vec<u64>, u64) {
    let counter = request.progress.clone().expect("request carries a counter");
    let mut handle = spawn_delete(request);
    let deadline = Instant::now() + Duration::from_secs(30);
    let mut samples = Vec::new();

    let result = loop {
        assert!(Instant::now() < deadline, "deletion did not finish within 30 seconds");
        samples.push(counter.get());
        if let Some(result) = handle.try_result().unwrap() {
            break result;
        }
        std::thread::sleep(Duration::from_micros(200));
    };
    samples.push(counter.get());
    (samples, result.count)
}

#[test]
fn published_progress_is_non_decreasing_and_ends_at_count() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("many");
    build_flat(&root, 300);

    let request = DeletionRequest::single(root).with_progress(ProgressCounter::new());
    let (samples, count) = sample_until_done(request);

    assert_eq!(count, 300);
    assert!(samples.windows(2).all(|w| w[0] <= w[1]), "samples went backwards");
    assert_eq!(*samples.last().unwrap(), count);
}

#[test]
fn progress_keeps_climbing_across_roots() {
    let temp = TempDir::new().unwrap();
    let roots: Vec<PathBuf> = (0..3)
        .map(|i| {
            let root = temp.path().join(format!("r{}", i));
            build_flat(&root, 100);
            root
        })
        .collect();

    let request = DeletionRequest::multiple(roots).with_progress(ProgressCounter::new());
    let (samples, count) = sample_until_done(request);

    assert_eq!(count, 300);
    assert!(samples.windows(2).all(|w| w[0] <= w[1]), "samples went backwards");
    assert_eq!(*samples.last().unwrap(), 300);
}

#[test]
fn stale_counter_is_reset_on_dispatch() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("empty");
    fs::create_dir(&root).unwrap();

    let counter = ProgressCounter::new();
    counter.publish(1_000);
    let handle = spawn_delete(DeletionRequest::single(root).with_progress(counter.clone()));
    let result = handle.wait().unwrap();

    assert_eq!(result.count, 0);
    assert_eq!(counter.get(), 0);
}

use std::path::PathBuf;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, TryRecvError};
use tracing::debug;

use super::orchestrator::{DeletionResult, delete_all};
use super::progress::ProgressCounter;
use crate::error::{DustpanError, Result};

/// Roots to delete plus an optional counter for live feedback
#[derive(Debug, Clone)]
pub struct DeletionRequest {
    pub roots: Vec<PathBuf>,
    pub progress: Option<ProgressCounter>,
}

impl DeletionRequest {
    pub fn single(root: PathBuf) -> Self {
        Self::multiple(vec![root])
    }

    pub fn multiple(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressCounter) -> Self {
        self.progress = Some(progress);
        self
    }
}

/// Handle to a deletion running on a background thread.
///
/// Progress is pulled from [`DeleteHandle::progress`]; completion arrives
/// exactly once through [`DeleteHandle::try_result`] or [`DeleteHandle::wait`].
pub struct DeleteHandle {
    receiver: Receiver<DeletionResult>,
    progress: Option<ProgressCounter>,
    worker: Option<JoinHandle<()>>,
    finished: bool,
}

/// Start deleting in the background. The counter, if any, is zeroed first.
pub fn spawn_delete(request: DeletionRequest) -> DeleteHandle {
    let (tx, rx) = crossbeam_channel::bounded(1);

    if let Some(progress) = &request.progress {
        progress.reset();
    }
    let progress = request.progress.clone();

    debug!(roots = request.roots.len(), "dispatching deletion");

    let worker = std::thread::spawn(move || {
        let result = delete_all(&request.roots, request.progress.as_ref());
        let _ = tx.send(result);
    });

    DeleteHandle {
        receiver: rx,
        progress,
        worker: Some(worker),
        finished: false,
    }
}

impl DeleteHandle {
    /// Counter the worker writes to, if one was supplied
    pub fn progress(&self) -> Option<&ProgressCounter> {
        self.progress.as_ref()
    }

    /// Files removed so far (0 without a counter)
    pub fn removed_so_far(&self) -> u64 {
        self.progress.as_ref().map(ProgressCounter::get).unwrap_or(0)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Non-blocking poll. Yields the result once, then `Ok(None)` forever.
    pub fn try_result(&mut self) -> Result<Option<DeletionResult>> {
        if self.finished {
            return Ok(None);
        }
        match self.receiver.try_recv() {
            Ok(result) => {
                self.finish();
                Ok(Some(result))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                self.finish();
                Err(DustpanError::DeleteWorkerLost)
            }
        }
    }

    /// Block until the run completes
    pub fn wait(mut self) -> Result<DeletionResult> {
        let result = self
            .receiver
            .recv()
            .map_err(|_| DustpanError::DeleteWorkerLost);
        self.finish();
        result
    }

    fn finish(&mut self) {
        self.finished = true;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    #[test]
    fn test_result_is_delivered_once() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("tree");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a"), b"a").unwrap();

        let counter = ProgressCounter::new();
        counter.publish(99);
        let mut handle = spawn_delete(DeletionRequest::single(root.clone()).with_progress(counter));

        let deadline = Instant::now() + Duration::from_secs(10);
        let result = loop {
            assert!(Instant::now() < deadline, "deletion did not finish");
            if let Some(result) = handle.try_result().unwrap() {
                break result;
            }
            std::thread::sleep(Duration::from_millis(5));
        };

        assert_eq!(result.count, 1);
        assert_eq!(handle.removed_so_far(), 1);
        assert!(handle.is_finished());
        assert!(handle.try_result().unwrap().is_none());
        assert!(!root.exists());
    }

    #[test]
    fn test_wait_without_counter() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("f");
        fs::write(&file, b"f").unwrap();

        let handle = spawn_delete(DeletionRequest::single(file));
        assert!(handle.progress().is_none());

        let result = handle.wait().unwrap();
        assert_eq!(result.count, 1);
        assert!(result.is_clean());
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crate::assets::source::{LoadedScene, SceneSource};
use crate::errors::{Result, StageError};

/// Shared interruption flag polled by a load run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Runs scene loads on a background thread, one run at a time.
///
/// A new [`request`](Self::request) interrupts and joins the run in flight
/// before the next one starts. Dropping the pipeline does the same.
pub struct LoadPipeline {
    source: Arc<dyn SceneSource>,
    worker: Option<JoinHandle<()>>,
    token: CancelToken,
    runs: u64,
}

impl LoadPipeline {
    pub fn new(source: Arc<dyn SceneSource>) -> Self {
        Self {
            source,
            worker: None,
            token: CancelToken::new(),
            runs: 0,
        }
    }

    /// Starts loading `uri` on a fresh worker thread.
    ///
    /// `on_loaded` runs on that thread with the source's result, unless the
    /// run was cancelled while the source was busy. It receives the run's
    /// token so it can re-check it once it holds whatever lock it needs.
    pub fn request<F>(&mut self, uri: &str, on_loaded: F) -> Result<()>
    where
        F: FnOnce(Result<LoadedScene>, &CancelToken) + Send + 'static,
    {
        self.cancel();

        let token = CancelToken::new();
        self.token = token.clone();
        self.runs += 1;

        let source = Arc::clone(&self.source);
        let uri = uri.to_string();
        let run = self.runs;

        let handle = std::thread::Builder::new()
            .name(format!("stage-loader-{run}"))
            .spawn(move || {
                log::info!("Loading scene '{uri}' (run {run})");
                let result = source.load(&uri);

                if token.is_cancelled() {
                    log::debug!("Load run {run} for '{uri}' superseded, result dropped");
                    return;
                }
                on_loaded(result, &token);
            })
            .map_err(|e| StageError::Thread(e.to_string()))?;

        self.worker = Some(handle);
        Ok(())
    }

    /// Interrupts the run in flight and waits for its thread to exit.
    pub fn cancel(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.worker.take()
            && handle.join().is_err()
        {
            log::error!("Load worker panicked");
        }
    }

    /// `true` while a worker thread is still executing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Blocks until the current run has finished, without cancelling it.
    pub fn wait(&mut self) {
        if let Some(handle) = self.worker.take()
            && handle.join().is_err()
        {
            log::error!("Load worker panicked");
        }
    }

    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs
    }
}

impl Drop for LoadPipeline {
    fn drop(&mut self) {
        self.cancel();
    }
}

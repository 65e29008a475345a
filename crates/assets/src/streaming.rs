//! Asynchronous piece loading on a tokio runtime.
//!
//! Bridges the synchronous session tick with async loads: every request is
//! a spawned task that reports back over an unbounded channel, drained with
//! `try_recv` from [`PieceProvider::poll_completed`].

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::{Handle, Runtime};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::catalog::load_entry;
use crate::core::{AssetError, LevelConfig, LoadCompletion, LoadPoll, LoadToken, PieceProvider};

enum Executor {
    Owned(Runtime),
    Shared(Handle),
}

impl Executor {
    fn handle(&self) -> &Handle {
        match self {
            Executor::Owned(rt) => rt.handle(),
            Executor::Shared(handle) => handle,
        }
    }
}

/// Loads pieces on background tasks; results arrive on a later tick
pub struct StreamingLoader {
    executor: Executor,
    latency: Duration,
    level: Option<Arc<LevelConfig>>,
    tasks: Vec<JoinHandle<()>>,
    done_tx: mpsc::UnboundedSender<LoadCompletion>,
    done_rx: mpsc::UnboundedReceiver<LoadCompletion>,
}

impl StreamingLoader {
    /// Loader with its own multi-threaded runtime.
    ///
    /// Must not be dropped from inside an async context; use
    /// [`StreamingLoader::with_handle`] there.
    pub fn new(latency: Duration) -> std::io::Result<Self> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("blockfit-assets")
            .enable_time()
            .build()?;
        Ok(Self::with_executor(Executor::Owned(rt), latency))
    }

    /// Loader spawning onto an existing runtime
    pub fn with_handle(handle: Handle, latency: Duration) -> Self {
        Self::with_executor(Executor::Shared(handle), latency)
    }

    fn with_executor(executor: Executor, latency: Duration) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            executor,
            latency,
            level: None,
            tasks: Vec::new(),
            done_tx,
            done_rx,
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Requests whose task has not finished yet
    pub fn in_flight(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_finished()).count()
    }
}

impl PieceProvider for StreamingLoader {
    fn on_level_loaded(&mut self, level: &LevelConfig) -> Result<(), AssetError> {
        self.level = Some(Arc::new(level.clone()));
        Ok(())
    }

    fn request(&mut self, token: LoadToken) -> LoadPoll {
        let Some(level) = self.level.clone() else {
            return LoadPoll::Ready(Err(AssetError::UnknownType {
                index: token.type_index,
                count: 0,
            }));
        };
        if token.type_index >= level.piece_count() {
            return LoadPoll::Ready(Err(AssetError::UnknownType {
                index: token.type_index,
                count: level.piece_count(),
            }));
        }

        let tx = self.done_tx.clone();
        let latency = self.latency;
        let task = self.executor.handle().spawn(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            let index = token.type_index;
            let result = match tokio::task::spawn_blocking(move || load_entry(&level, index)).await {
                Ok(result) => result,
                Err(_) => Err(AssetError::Cancelled),
            };
            let _ = tx.send(LoadCompletion { token, result });
        });

        self.tasks.retain(|task| !task.is_finished());
        self.tasks.push(task);
        debug!(
            request = token.request_id,
            index = token.type_index,
            in_flight = self.tasks.len(),
            "piece_load_spawned"
        );
        LoadPoll::Pending
    }

    fn poll_completed(&mut self) -> Vec<LoadCompletion> {
        let mut done = Vec::new();
        while let Ok(completion) = self.done_rx.try_recv() {
            done.push(completion);
        }
        done
    }

    fn release_all(&mut self) {
        let aborted = self.tasks.len();
        for task in self.tasks.drain(..) {
            task.abort();
        }
        while self.done_rx.try_recv().is_ok() {}
        self.level = None;
        debug!(aborted, "piece_loads_released");
    }
}

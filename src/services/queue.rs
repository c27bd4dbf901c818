use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::codeforces::CodeforcesClient;
use crate::services::sync_service::SyncService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTask {
    pub student_id: String,
    pub handle: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnqueueError {
    #[error("sync queue is full")]
    Full,
    #[error("sync worker is not running")]
    Closed,
}

#[derive(Debug, Default)]
struct Counters {
    enqueued: AtomicU64,
    rejected: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    last_error: Mutex<Option<String>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub enqueued: u64,
    pub rejected: u64,
    pub completed: u64,
    pub failed: u64,
    pub last_error: Option<String>,
}

/// Producer side of the background sync queue. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct SyncQueue {
    sender: mpsc::Sender<SyncTask>,
    counters: Arc<Counters>,
}

/// Consumer side, handed to a [`SyncWorker`].
pub struct SyncQueueReceiver {
    receiver: mpsc::Receiver<SyncTask>,
    counters: Arc<Counters>,
}

pub fn channel(capacity: usize) -> (SyncQueue, SyncQueueReceiver) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let counters = Arc::new(Counters::default());
    (
        SyncQueue { sender, counters: counters.clone() },
        SyncQueueReceiver { receiver, counters },
    )
}

impl SyncQueue {
    /// Queues a sync without waiting for it to run.
    pub fn enqueue(&self, student_id: &str, handle: Option<&str>) -> Result<(), EnqueueError> {
        let task = SyncTask {
            student_id: student_id.to_string(),
            handle: handle.map(str::to_string),
        };
        match self.sender.try_send(task) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                Err(match e {
                    mpsc::error::TrySendError::Full(_) => EnqueueError::Full,
                    mpsc::error::TrySendError::Closed(_) => EnqueueError::Closed,
                })
            }
        }
    }

    pub fn stats(&self) -> QueueStats {
        self.counters.snapshot()
    }
}

impl Counters {
    fn snapshot(&self) -> QueueStats {
        let last_error = self
            .last_error
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        QueueStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            last_error,
        }
    }
}

pub struct SyncWorker {
    sync: SyncService,
    queue: SyncQueueReceiver,
}

impl SyncWorker {
    pub fn new(db: SqlitePool, codeforces: Arc<dyn CodeforcesClient>, queue: SyncQueueReceiver) -> Self {
        Self {
            sync: SyncService::new(db, codeforces),
            queue,
        }
    }

    /// Processes tasks in arrival order until every [`SyncQueue`] is dropped.
    pub async fn run(mut self) {
        info!("Sync worker started");
        while let Some(task) = self.queue.receiver.recv().await {
            let counters = &self.queue.counters;
            match self.sync.sync_student(&task.student_id, task.handle.as_deref()).await {
                Ok(_) => {
                    counters.completed.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    error!("Queued sync for student {} failed: {}", task.student_id, e);
                    if let Ok(mut last) = counters.last_error.lock() {
                        *last = Some(format!("{}: {}", task.student_id, e));
                    }
                }
            }
        }
        info!("Sync worker stopped");
    }
}

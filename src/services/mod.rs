pub mod analytics;
pub mod batch;
pub mod queue;
pub mod reminder;
pub mod scheduler;
pub mod sync_service;

pub use batch::{BatchOutcome, BatchSync};
pub use queue::{QueueStats, SyncQueue, SyncWorker};
pub use reminder::ReminderService;
pub use scheduler::SyncScheduler;
pub use sync_service::{SyncOutcome, SyncService};

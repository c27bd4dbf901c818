use std::sync::Arc;

use sqlx::SqlitePool;

use crate::codeforces::CodeforcesClient;
use crate::mailer::Mailer;
use crate::services::SyncQueue;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub codeforces: Arc<dyn CodeforcesClient>,
    pub mailer: Arc<dyn Mailer>,
    pub sync_queue: SyncQueue,
    /// Bearer token required by `POST /sync/all`; open when `None`.
    pub sync_api_key: Option<String>,
}

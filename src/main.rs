use std::sync::Arc;

use progress_tracker::api::router;
use progress_tracker::codeforces::{CodeforcesClient, CodeforcesHttpClient};
use progress_tracker::config::AppConfig;
use progress_tracker::db;
use progress_tracker::mailer::{LogMailer, Mailer, SmtpMailer};
use progress_tracker::services::{SyncScheduler, SyncWorker, queue};
use progress_tracker::state::AppState;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "progress_tracker=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let pool = db::connect(&config.database_url).await?;
    db::migrate(&pool).await?;

    let codeforces: Arc<dyn CodeforcesClient> =
        Arc::new(CodeforcesHttpClient::new(config.codeforces_api_url.clone())?);

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
        None => {
            warn!("SMTP_PASS is not set; emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let (sync_queue, sync_receiver) = queue::channel(config.sync_queue_capacity);
    tokio::spawn(SyncWorker::new(pool.clone(), codeforces.clone(), sync_receiver).run());

    if config.sync_interval_secs > 0 {
        let scheduler = SyncScheduler::new(
            pool.clone(),
            codeforces.clone(),
            mailer.clone(),
            config.sync_interval_secs,
        );
        tokio::spawn(scheduler.start());
    }

    let state = AppState {
        db: pool.clone(),
        codeforces,
        mailer,
        sync_queue,
        sync_api_key: config.sync_api_key.clone(),
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

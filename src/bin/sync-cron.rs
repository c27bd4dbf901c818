//! One-shot trigger for `POST /sync/all`, meant to be run from cron or CI.

use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_APP_URL: &str = "http://localhost:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "sync_cron=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_url = std::env::var("APP_URL").unwrap_or_else(|_| DEFAULT_APP_URL.to_string());
    let url = format!("{}/sync/all", app_url.trim_end_matches('/'));

    info!("Starting Codeforces data sync via {}", url);

    let mut request = reqwest::Client::new().post(&url);
    if let Ok(key) = std::env::var("SYNC_API_KEY") {
        if !key.is_empty() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", key));
        }
    }

    let response = request.send().await?;
    let status = response.status();
    let body: Value = response.json().await?;

    if !status.is_success() {
        error!("Sync failed with status {}: {}", status, body);
        return Err(format!("sync request returned {}", status).into());
    }

    info!(
        "Sync completed: {}/{} students synced, {} reminders sent",
        body["syncedCount"], body["totalStudents"], body["emailsSent"]
    );
    Ok(())
}

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use backend::api::router;
use backend::lms::{LmsConfig, LmsHttpClient};
use backend::services::CourseCacheRefresher;
use backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "backend=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = LmsConfig::new_from_env()?;
    let lms = Arc::new(LmsHttpClient::new(config)?);
    let state = AppState::new(lms);

    if let Ok(interval) = std::env::var("CACHE_REFRESH_SECS") {
        let interval: u64 = interval
            .parse()
            .map_err(|_| "CACHE_REFRESH_SECS must be a number of seconds")?;
        let refresher =
            CourseCacheRefresher::new(state.lms.clone(), state.courses.clone(), interval);
        tokio::spawn(refresher.start());
    }

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

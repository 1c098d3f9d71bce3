use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use tokio::net::TcpListener;
use tokio::time::interval;
use tracing_subscriber::EnvFilter;

use attendance_codes::{
    app::{
        api::{AppContext, create_api_router},
        state::AppState,
    },
    clock::SystemClock,
    config::GlobalConfig,
    stores::InMemoryUserDirectory,
    utils::rate_limiter::RateLimiter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting attendance code service");

    let config = GlobalConfig::from_env()?;

    let directory = match &config.directory.seed_path {
        Some(path) => {
            let directory = InMemoryUserDirectory::from_json_file(path)?;
            tracing::info!("Loaded {} users from {}", directory.len(), path);
            directory
        }
        None => {
            tracing::warn!("USER_DIRECTORY_PATH not set, user directory is empty");
            InMemoryUserDirectory::new()
        }
    };

    let state = AppState::in_memory(
        &config.attendance,
        Arc::new(directory),
        Arc::new(SystemClock),
    );
    let rate_limiter = RateLimiter::per_minute(config.rate_limit.requests_per_minute);

    let sweep_state = state.clone();
    let sweep_limiter = rate_limiter.clone();
    let sweep_every = Duration::from_secs(config.attendance.expiry_sweep_interval_secs.max(1));

    tokio::spawn(async move {
        let mut interval = interval(sweep_every);

        loop {
            interval.tick().await;

            match sweep_state.sweep_expired_sessions() {
                Ok(expired) if !expired.is_empty() => {
                    tracing::info!("Deactivated {} expired sessions", expired.len());
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Expiry sweep failed: {}", e),
            }

            sweep_limiter.prune();
        }
    });

    let context = AppContext {
        state,
        config: config.clone(),
        rate_limiter,
    };

    let app: Router = create_api_router(context);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!("Attendance service running on http://{}", addr);
    tracing::info!(
        "Lateness threshold: {} min, session length: {}-{} min",
        config.attendance.lateness_threshold_minutes,
        config.attendance.min_session_minutes,
        config.attendance.max_session_minutes
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

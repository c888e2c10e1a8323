use threadcard_core::{AppConfig, ErrorExt};
use tracing_subscriber::EnvFilter;
use web::AppState;

const DEFAULT_LOG_FILTER: &str =
    "threadcard=debug,web=debug,threads_client=info,card_renderer=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    tracing::info!("Starting Threadcard - top engaged friends on Threads");

    let config = AppConfig::load().map_err(|e| {
        e.log_error();
        anyhow::anyhow!(e.user_friendly_message())
    })?;
    let addr = config.server.bind_address();

    let state = AppState::new(config)?;
    let app = web::router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

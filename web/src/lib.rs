pub mod error;
pub mod handlers;
pub mod pages;
pub mod service;

use axum::routing::get;
use axum::Router;
use card_renderer::{CardRenderer, HttpAvatarSource};
use std::sync::Arc;
use threadcard_core::{AppConfig, CoreError};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared by every request; nothing in here is mutated after start-up.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub renderer: CardRenderer,
    pub avatars: HttpAvatarSource,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, CoreError> {
        let avatars = HttpAvatarSource::new(&config.threads.user_agent, config.threads.timeout())?;
        let renderer = CardRenderer::new(config.card.clone());
        Ok(Self {
            config: Arc::new(config),
            renderer,
            avatars,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.card.output_dir);

    Router::new()
        .route("/", get(handlers::index).post(handlers::lookup))
        .route("/health", get(handlers::health_check))
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

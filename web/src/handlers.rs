use crate::error::PageError;
use crate::{pages, service, AppState};
use axum::extract::{Form, State};
use axum::response::Html;
use serde::Deserialize;
use threadcard_core::validate_username;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct LookupForm {
    #[serde(default)]
    pub username: String,
}

pub async fn index() -> Html<String> {
    Html(pages::index_page(None, None))
}

pub async fn lookup(
    State(state): State<AppState>,
    Form(form): Form<LookupForm>,
) -> Result<Html<String>, PageError> {
    debug!("Lookup requested for {:?}", form.username);
    let username = validate_username(&form.username)
        .map_err(|e| PageError::new(form.username.trim(), e))?;

    let outcome = service::run_lookup(&state, username)
        .await
        .map_err(|e| PageError::new(username, e))?;

    info!(
        "Lookup for {} done: {} threads, {} friends, card {}",
        username,
        outcome.data.threads.len(),
        outcome.data.top_friends.len(),
        if outcome.image_url.is_some() { "rendered" } else { "skipped" }
    );
    Ok(Html(pages::result_page(username, &outcome, &state.config.threads)))
}

pub async fn health_check() -> &'static str {
    "OK"
}

use reqwest::Client;
use std::time::Duration;
use threadcard_core::{CoreError, RenderError};
use tracing::debug;

/// Where avatar image bytes come from.
pub trait AvatarSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, RenderError>;
}

/// Downloads avatars from the CDN URLs the API hands out.
#[derive(Debug, Clone)]
pub struct HttpAvatarSource {
    http_client: Client,
}

impl HttpAvatarSource {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { http_client })
    }
}

impl AvatarSource for HttpAvatarSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, RenderError> {
        let unavailable = |reason: String| RenderError::AvatarUnavailable {
            url: url.to_string(),
            reason,
        };

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| unavailable(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        debug!("Downloaded {} avatar bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

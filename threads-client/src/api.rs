use crate::metrics::{MetricsCollector, RequestMetrics, SessionMetrics};
use crate::ThreadsApi;
use regex::Regex;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::time::Instant;
use threadcard_core::{
    CoreError, Liker, PostId, Profile, Thread, ThreadsApiError, ThreadsConfig, UserId,
};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

const USER_ID_PATTERN: &str = r#""user_id":"(\d+)""#;
const POST_ID_PATTERN: &str = r#"\{"post_id":"(\d+)"\}"#;
const LSD_TOKEN_PATTERN: &str = r#""LSD",\[\],\{"token":"([\w-]+)"\}"#;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Identifiers arrive as strings on some endpoints and numbers on others.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(u64),
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireId::Text(id) => f.write_str(id),
            WireId::Number(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserDataEnvelope {
    #[serde(rename = "userData")]
    pub user_data: UserEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub user: ThreadsUserData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadsUserData {
    pub pk: WireId,
    pub username: String,
    pub full_name: Option<String>,
    pub biography: Option<String>,
    pub follower_count: Option<u64>,
    pub profile_pic_url: Option<String>,
    pub is_verified: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaDataEnvelope {
    #[serde(rename = "mediaData")]
    pub media_data: MediaData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaData {
    #[serde(default)]
    pub threads: Vec<ThreadData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadData {
    #[serde(default)]
    pub thread_items: Vec<ThreadItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadItem {
    pub post: PostData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostData {
    pub pk: Option<WireId>,
    pub code: String,
    pub caption: Option<Caption>,
    #[serde(default)]
    pub like_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Caption {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikersEnvelope {
    pub likers: LikersData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikersData {
    #[serde(default)]
    pub users: Vec<LikerData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikerData {
    pub username: String,
    pub profile_pic_url: Option<String>,
}

#[derive(Debug)]
struct ScrapePatterns {
    user_id: Regex,
    post_id: Regex,
    lsd_token: Regex,
}

impl ScrapePatterns {
    fn compile() -> Result<Self, CoreError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| CoreError::Internal {
                message: format!("Invalid scrape pattern {}: {}", pattern, e),
            })
        };

        Ok(Self {
            user_id: compile(USER_ID_PATTERN)?,
            post_id: compile(POST_ID_PATTERN)?,
            lsd_token: compile(LSD_TOKEN_PATTERN)?,
        })
    }

    fn first_capture(pattern: &Regex, haystack: &str) -> Option<String> {
        pattern
            .captures(haystack)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// HTTP session against the Threads web API.
#[derive(Debug)]
pub struct ThreadsApiClient {
    http_client: Client,
    config: ThreadsConfig,
    lsd_token: OnceCell<String>,
    patterns: ScrapePatterns,
    metrics: MetricsCollector,
}

impl ThreadsApiClient {
    pub fn new(config: ThreadsConfig) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http_client,
            config,
            lsd_token: OnceCell::new(),
            patterns: ScrapePatterns::compile()?,
            metrics: MetricsCollector::new(),
        })
    }

    fn base_url(&self) -> &str {
        self.config.base_url()
    }

    async fn make_request(
        &self,
        operation: &str,
        resource: &str,
        request: RequestBuilder,
    ) -> Result<Response, CoreError> {
        let start_time = Instant::now();

        debug!("Making Threads request: {} {}", operation, resource);
        let result = match request.send().await {
            Ok(response) => Self::check_status(resource, response),
            Err(e) => {
                error!("Network error for {} {}: {}", operation, resource, e);
                Err(if e.is_timeout() {
                    CoreError::ThreadsApi(ThreadsApiError::RequestTimeout)
                } else {
                    CoreError::Network(e)
                })
            }
        };

        self.metrics
            .record_request(RequestMetrics {
                operation: operation.to_string(),
                response_time: start_time.elapsed(),
                success: result.is_ok(),
            })
            .await;

        result
    }

    fn check_status(resource: &str, response: Response) -> Result<Response, CoreError> {
        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, resource);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, resource);
        let err = match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!("Rate limited, retry after {} seconds", retry_after);
                ThreadsApiError::RateLimitExceeded { retry_after }
            }
            401 | 403 => ThreadsApiError::Forbidden {
                resource: resource.to_string(),
            },
            404 => ThreadsApiError::NotFound {
                resource: resource.to_string(),
            },
            code if status.is_server_error() => ThreadsApiError::ServerError { status_code: code },
            code => ThreadsApiError::InvalidResponse {
                details: format!("Unexpected status {} for {}", code, resource),
            },
        };
        Err(err.into())
    }

    async fn fetch_page(&self, operation: &str, url: &str) -> Result<String, CoreError> {
        let request = self
            .http_client
            .get(url)
            .header(ACCEPT, HTML_ACCEPT)
            .header("Sec-Fetch-Site", "same-origin");

        let response = self.make_request(operation, url, request).await?;
        Ok(response.text().await?)
    }

    /// Like [`Self::fetch_page`], but a 404 means "nothing there" instead of an error.
    async fn fetch_optional_page(
        &self,
        operation: &str,
        url: &str,
    ) -> Result<Option<String>, CoreError> {
        match self.fetch_page(operation, url).await {
            Ok(page) => Ok(Some(page)),
            Err(CoreError::ThreadsApi(ThreadsApiError::NotFound { .. })) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch_lsd_token(&self) -> Result<String, CoreError> {
        let url = &self.config.token_url;
        let page = self.fetch_page("lsd_token", url).await?;

        ScrapePatterns::first_capture(&self.patterns.lsd_token, &page).ok_or_else(|| {
            CoreError::ThreadsApi(ThreadsApiError::TokenUnavailable { url: url.clone() })
        })
    }

    /// The anonymous token is fetched on first use and reused for the session.
    async fn lsd_token(&self) -> Result<&str, CoreError> {
        let token = self
            .lsd_token
            .get_or_try_init(|| self.fetch_lsd_token())
            .await?;
        Ok(token.as_str())
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        operation: &str,
        doc_id: &str,
        variables: serde_json::Value,
    ) -> Result<T, CoreError> {
        let token = self.lsd_token().await?;
        let url = format!("{}/api/graphql", self.base_url());
        let variables = variables.to_string();
        let form = [
            ("lsd", token),
            ("variables", variables.as_str()),
            ("doc_id", doc_id),
        ];

        let request = self
            .http_client
            .post(&url)
            .header("X-IG-App-ID", self.config.app_id.as_str())
            .header("X-FB-LSD", token)
            .header("Sec-Fetch-Site", "same-origin")
            .form(&form);

        let response = self.make_request(operation, &url, request).await?;
        let envelope: GraphqlResponse<T> = response.json().await.map_err(|e| {
            error!("Failed to parse {} response: {}", operation, e);
            ThreadsApiError::InvalidResponse {
                details: format!("Failed to parse {} response", operation),
            }
        })?;

        if let Some(graphql_error) = envelope.errors.first() {
            error!("GraphQL error for {}: {}", operation, graphql_error.message);
            return Err(ThreadsApiError::InvalidResponse {
                details: graphql_error.message.clone(),
            }
            .into());
        }

        envelope.data.ok_or_else(|| {
            CoreError::ThreadsApi(ThreadsApiError::InvalidResponse {
                details: format!("Empty {} response", operation),
            })
        })
    }

    pub async fn get_metrics(&self) -> SessionMetrics {
        self.metrics.get_metrics().await
    }
}

impl ThreadsApi for ThreadsApiClient {
    async fn get_user_id_from_username(
        &self,
        username: &str,
    ) -> Result<Option<UserId>, CoreError> {
        let url = format!("{}/@{}", self.base_url(), username);
        let Some(page) = self.fetch_optional_page("user_id", &url).await? else {
            info!("No Threads profile page for {}", username);
            return Ok(None);
        };

        let compact: String = page.split_whitespace().collect();
        let user_id = ScrapePatterns::first_capture(&self.patterns.user_id, &compact);
        match &user_id {
            Some(id) => debug!("Resolved {} to user ID {}", username, id),
            None => info!("No user ID found on profile page of {}", username),
        }
        Ok(user_id)
    }

    async fn get_user_profile(&self, user_id: &str) -> Result<Profile, CoreError> {
        let envelope: UserDataEnvelope = self
            .graphql(
                "user_profile",
                &self.config.profile_doc_id,
                json!({ "userID": user_id }),
            )
            .await?;

        let profile: Profile = envelope.user_data.user.into();
        debug!(
            "Retrieved profile for {} ({} followers)",
            profile.username, profile.follower_count
        );
        Ok(profile)
    }

    async fn get_user_threads(&self, user_id: &str) -> Result<Vec<Thread>, CoreError> {
        let envelope: MediaDataEnvelope = self
            .graphql(
                "user_threads",
                &self.config.threads_doc_id,
                json!({ "userID": user_id }),
            )
            .await?;

        let threads: Vec<Thread> = envelope
            .media_data
            .threads
            .into_iter()
            .filter_map(ThreadData::into_thread)
            .collect();

        info!("Retrieved {} threads for user {}", threads.len(), user_id);
        Ok(threads)
    }

    async fn get_post_id_from_url(&self, post_url: &str) -> Result<Option<PostId>, CoreError> {
        let Some(page) = self.fetch_optional_page("post_id", post_url).await? else {
            return Ok(None);
        };

        Ok(ScrapePatterns::first_capture(&self.patterns.post_id, &page))
    }

    async fn get_post_likes(&self, post_id: &str) -> Result<Vec<Liker>, CoreError> {
        let envelope: LikersEnvelope = self
            .graphql(
                "post_likes",
                &self.config.likers_doc_id,
                json!({ "mediaID": post_id }),
            )
            .await?;

        let likers: Vec<Liker> = envelope.likers.users.into_iter().map(Liker::from).collect();
        debug!("Retrieved {} likers for post {}", likers.len(), post_id);
        Ok(likers)
    }

    fn post_url(&self, code: &str) -> String {
        self.config.post_url(code)
    }

    async fn close_gracefully(self) {
        let metrics = self.metrics.get_metrics().await;
        info!(
            "Closing Threads session after {} requests ({} failed, avg {:?})",
            metrics.total_requests,
            metrics.failed_requests,
            metrics.average_response_time()
        );
        for (operation, stats) in &metrics.requests_by_operation {
            debug!(
                "  {}: {} requests, {} errors, slowest {:?}",
                operation, stats.request_count, stats.error_count, stats.max_response_time
            );
        }
    }
}

impl From<ThreadsUserData> for Profile {
    fn from(user: ThreadsUserData) -> Self {
        Self {
            user_id: user.pk.to_string(),
            username: user.username,
            full_name: user.full_name.filter(|name| !name.is_empty()),
            biography: user.biography.filter(|bio| !bio.is_empty()),
            follower_count: user.follower_count.unwrap_or(0),
            profile_pic_url: user.profile_pic_url,
            is_verified: user.is_verified.unwrap_or(false),
        }
    }
}

impl ThreadData {
    /// The thread's root post; threads without items are dropped.
    fn into_thread(self) -> Option<Thread> {
        let post = self.thread_items.into_iter().next()?.post;
        Some(Thread {
            code: post.code,
            post_id: post.pk.map(|pk| pk.to_string()),
            caption: post.caption.map(|caption| caption.text),
            like_count: post.like_count,
            likes: Vec::new(),
        })
    }
}

impl From<LikerData> for Liker {
    fn from(liker: LikerData) -> Self {
        Self {
            username: liker.username,
            profile_pic_url: liker.profile_pic_url,
        }
    }
}

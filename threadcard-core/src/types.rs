use crate::error::CoreError;
use serde::{Deserialize, Serialize};

pub const MAX_USERNAME_LEN: usize = 30;

pub type UserId = String;
pub type PostId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub username: String,
    pub full_name: Option<String>,
    pub biography: Option<String>,
    pub follower_count: u64,
    pub profile_pic_url: Option<String>,
    pub is_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liker {
    pub username: String,
    pub profile_pic_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub code: String,
    pub post_id: Option<PostId>,
    pub caption: Option<String>,
    pub like_count: u64,
    pub likes: Vec<Liker>,
}

impl Thread {
    /// Short code of the post, tolerating a full `/t/<code>` URL.
    pub fn post_code(&self) -> &str {
        post_code_from_url(&self.code)
    }
}

pub fn post_code_from_url(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

/// Trims `raw` and checks it is a plausible Threads handle. The result ends
/// up in URLs and in the card's file name, so nothing else gets through.
pub fn validate_username(raw: &str) -> Result<&str, CoreError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(CoreError::InvalidInput {
            message: "username must not be empty".to_string(),
        });
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(CoreError::InvalidInput {
            message: format!("username is longer than {} characters", MAX_USERNAME_LEN),
        });
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
    {
        return Err(CoreError::InvalidInput {
            message: "username may only contain letters, digits, '.' and '_'".to_string(),
        });
    }
    Ok(username)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedFriend {
    pub username: String,
    pub profile_pic_url: Option<String>,
    pub like_count: usize,
}

/// Everything one lookup produces, handed from the pipeline to the pages.
#[derive(Debug, Clone, Default)]
pub struct UserData {
    pub user_id: Option<UserId>,
    pub profile: Option<Profile>,
    pub threads: Vec<Thread>,
    pub top_friends: Vec<RankedFriend>,
}

impl UserData {
    pub fn has_threads(&self) -> bool {
        !self.threads.is_empty()
    }
}

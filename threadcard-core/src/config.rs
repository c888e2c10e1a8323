use crate::error::{ConfigError, CoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const CONFIG_PATH_ENV: &str = "THREADCARD_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "threadcard.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub threads: ThreadsConfig,
    pub card: CardConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Endpoints and query identifiers of the Threads web API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadsConfig {
    pub web_base_url: String,
    /// Page whose markup carries the anonymous LSD token.
    pub token_url: String,
    pub app_id: String,
    pub profile_doc_id: String,
    pub threads_doc_id: String,
    pub likers_doc_id: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub likes_per_thread: usize,
    pub top_friends: usize,
}

impl Default for ThreadsConfig {
    fn default() -> Self {
        Self {
            web_base_url: "https://www.threads.net".to_string(),
            token_url: "https://www.instagram.com/instagram".to_string(),
            app_id: "238260118697367".to_string(),
            profile_doc_id: "23996318473300828".to_string(),
            threads_doc_id: "6232751443445612".to_string(),
            likers_doc_id: "9360915773983802".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) threadcard/0.1".to_string(),
            timeout_secs: 30,
            likes_per_thread: 50,
            top_friends: crate::ranking::TOP_FRIENDS_LIMIT,
        }
    }
}

impl ThreadsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        self.web_base_url.trim_end_matches('/')
    }

    /// Public permalink of the post with short code `code`.
    pub fn post_url(&self, code: &str) -> String {
        format!("{}/t/{}", self.base_url(), code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    pub background_path: PathBuf,
    pub font_path: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            background_path: PathBuf::from("background.png"),
            font_path: PathBuf::from("arial.ttf"),
            output_dir: PathBuf::from("static"),
        }
    }
}

impl AppConfig {
    /// Loads `$THREADCARD_CONFIG` (or `threadcard.toml`) when present, then
    /// applies `THREADCARD_HOST` / `THREADCARD_PORT`.
    pub fn load() -> Result<Self, CoreError> {
        let (path, explicit) = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => (path, true),
            Err(_) => (DEFAULT_CONFIG_PATH.to_string(), false),
        };

        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else if explicit {
            return Err(ConfigError::FileNotFound { path }.into());
        } else {
            debug!("No configuration file at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        info!("Configuration loaded, serving on {}", config.server.bind_address());
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CoreError> {
        let config: AppConfig = toml::from_str(raw).map_err(ConfigError::from)?;
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("THREADCARD_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("THREADCARD_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                field: "server.port".to_string(),
                value: port.clone(),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                value: "0".to_string(),
            });
        }
        if self.threads.likes_per_thread == 0 {
            return Err(ConfigError::InvalidValue {
                field: "threads.likes_per_thread".to_string(),
                value: "0".to_string(),
            });
        }
        if !(1..=crate::ranking::TOP_FRIENDS_LIMIT).contains(&self.threads.top_friends) {
            return Err(ConfigError::InvalidValue {
                field: "threads.top_friends".to_string(),
                value: self.threads.top_friends.to_string(),
            });
        }
        Ok(())
    }
}

use crate::error::*;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
    /// HTTP status the web layer answers with when this error ends a request.
    fn status_code(&self) -> u16;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::ThreadsApi(e) => {
                error!("Threads API error details: {:?}", e);
            }
            CoreError::Render(e) => {
                error!("Render error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::ThreadsApi(e) => e.user_friendly_message(),
            CoreError::Render(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Could not reach Threads. Please check your internet connection.".to_string()
            }
            CoreError::InvalidInput { message } => format!("Invalid input: {}", message),
            CoreError::Internal { .. } => {
                "An unexpected error occurred. Please try again later.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::ThreadsApi(_) => "THREADS_API".to_string(),
            CoreError::Render(_) => "RENDER".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }

    fn status_code(&self) -> u16 {
        match self {
            CoreError::ThreadsApi(e) => e.status_code(),
            CoreError::Network(_) => 502,
            CoreError::InvalidInput { .. } => 400,
            _ => 500,
        }
    }
}

impl ErrorExt for ThreadsApiError {
    fn log_error(&self) -> &Self {
        error!("ThreadsApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ThreadsApiError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ThreadsApiError::TokenUnavailable { .. } => {
                "Threads refused to start a session. Please try again later.".to_string()
            }
            ThreadsApiError::Forbidden { .. } => {
                "Threads denied access to this profile. It may be private.".to_string()
            }
            ThreadsApiError::NotFound { .. } => {
                "The requested profile or post could not be found.".to_string()
            }
            ThreadsApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests. Please wait {} seconds before trying again.",
                retry_after
            ),
            ThreadsApiError::RequestTimeout => {
                "Request to Threads timed out. Please try again.".to_string()
            }
            _ => "Threads API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ThreadsApiError::TokenUnavailable { .. } => "THREADS_TOKEN_UNAVAILABLE".to_string(),
            ThreadsApiError::Forbidden { .. } => "THREADS_FORBIDDEN".to_string(),
            ThreadsApiError::NotFound { .. } => "THREADS_NOT_FOUND".to_string(),
            ThreadsApiError::RateLimitExceeded { .. } => "THREADS_RATE_LIMIT".to_string(),
            ThreadsApiError::RequestTimeout => "THREADS_TIMEOUT".to_string(),
            ThreadsApiError::InvalidResponse { .. } => "THREADS_INVALID_RESPONSE".to_string(),
            ThreadsApiError::ServerError { .. } => "THREADS_SERVER_ERROR".to_string(),
        }
    }

    fn status_code(&self) -> u16 {
        match self {
            ThreadsApiError::NotFound { .. } => 404,
            ThreadsApiError::RateLimitExceeded { .. } => 429,
            ThreadsApiError::RequestTimeout => 504,
            _ => 502,
        }
    }
}

impl ErrorExt for RenderError {
    fn log_error(&self) -> &Self {
        error!("RenderError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("RenderError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RenderError::BackgroundUnavailable { .. } => {
                "The card background is missing on the server.".to_string()
            }
            RenderError::OutputUnavailable { .. } => {
                "The result card could not be saved.".to_string()
            }
            _ => "The result card could not be drawn.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RenderError::BackgroundUnavailable { .. } => "RENDER_BACKGROUND_UNAVAILABLE".to_string(),
            RenderError::AvatarUnavailable { .. } => "RENDER_AVATAR_UNAVAILABLE".to_string(),
            RenderError::OutputUnavailable { .. } => "RENDER_OUTPUT_UNAVAILABLE".to_string(),
            RenderError::Image(_) => "RENDER_IMAGE".to_string(),
        }
    }

    fn status_code(&self) -> u16 {
        500
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' could not be read.", path)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::Parse(_) => {
                "Configuration file is not valid TOML. Please check your settings.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }

    fn status_code(&self) -> u16 {
        500
    }
}

/// Logs failures that reach the presentation layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {}", error.error_code());
        info!("User message: {}", error.user_friendly_message());
    }

    pub fn report_warning(&self, error: &CoreError) {
        error.log_warn();
    }
}

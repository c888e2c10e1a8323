use threadcard_core::{
    ConfigError, CoreError, ErrorExt, ErrorReporter, RenderError, ThreadsApiError,
};

#[test]
fn test_error_codes() {
    let api_error = CoreError::ThreadsApi(ThreadsApiError::RequestTimeout);
    assert_eq!(api_error.error_code(), "THREADS_API");

    let render_error = CoreError::Render(RenderError::BackgroundUnavailable {
        path: "background.png".to_string(),
    });
    assert_eq!(render_error.error_code(), "RENDER");

    let config_error = CoreError::Config(ConfigError::InvalidValue {
        field: "server.port".to_string(),
        value: "0".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");

    let input_error = CoreError::InvalidInput {
        message: "username".to_string(),
    };
    assert_eq!(input_error.error_code(), "INVALID_INPUT");
}

#[test]
fn test_status_codes() {
    let input_error = CoreError::InvalidInput {
        message: "username must not be empty".to_string(),
    };
    assert_eq!(input_error.status_code(), 400);

    let rate_limited =
        CoreError::ThreadsApi(ThreadsApiError::RateLimitExceeded { retry_after: 60 });
    assert_eq!(rate_limited.status_code(), 429);

    let upstream = CoreError::ThreadsApi(ThreadsApiError::ServerError { status_code: 503 });
    assert_eq!(upstream.status_code(), 502);

    let render_error = CoreError::Render(RenderError::OutputUnavailable {
        path: "static/x.png".to_string(),
    });
    assert_eq!(render_error.status_code(), 500);

    let internal = CoreError::Internal {
        message: "Card rendering task failed".to_string(),
    };
    assert_eq!(internal.status_code(), 500);
    assert_eq!(internal.error_code(), "INTERNAL");
}

#[test]
fn test_user_friendly_messages() {
    let api_error = CoreError::ThreadsApi(ThreadsApiError::RateLimitExceeded { retry_after: 60 });
    let message = api_error.user_friendly_message();
    assert!(message.contains("60 seconds"));

    let config_error = CoreError::Config(ConfigError::InvalidValue {
        field: "threads.top_friends".to_string(),
        value: "42".to_string(),
    });
    let message = config_error.user_friendly_message();
    assert!(message.contains("threads.top_friends"));

    let input_error = CoreError::InvalidInput {
        message: "username must not be empty".to_string(),
    };
    assert!(input_error
        .user_friendly_message()
        .contains("username must not be empty"));
}

#[test]
fn test_error_reporter() {
    let reporter = ErrorReporter::new();
    let error = CoreError::ThreadsApi(ThreadsApiError::RequestTimeout);

    // This test just ensures the methods don't panic
    reporter.report_error(&error);
    reporter.report_warning(&error);
}

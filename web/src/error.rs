use crate::pages;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use threadcard_core::{CoreError, ErrorExt, ErrorReporter};

/// A failed lookup. Answers with the form again, carrying the message.
#[derive(Debug)]
pub struct PageError {
    pub username: String,
    pub error: CoreError,
}

impl PageError {
    pub fn new(username: impl Into<String>, error: CoreError) -> Self {
        Self {
            username: username.into(),
            error,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            ErrorReporter::new().report_error(&self.error);
        } else {
            ErrorReporter::new().report_warning(&self.error);
        }

        let message = self.error.user_friendly_message();
        let body = pages::index_page(Some(self.username.as_str()), Some(message.as_str()));
        (status, Html(body)).into_response()
    }
}

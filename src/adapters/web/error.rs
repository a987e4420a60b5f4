//! HTTP error responses for web adapter.

use askama::Template;
use axum::{
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::domain::error::StockpulseError;

use super::is_htmx_request;
use super::templates::{BasePage, ErrorTemplate};

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
    /// Render only the error fragment, without the page shell.
    pub fragment: bool,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fragment: false,
        }
    }

    /// Marks the error as a fragment when the request came from HTMX.
    pub fn for_request(mut self, headers: &HeaderMap) -> Self {
        self.fragment = is_htmx_request(headers);
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &StockpulseError) -> StatusCode {
    match err {
        StockpulseError::ConfigMissing { .. }
        | StockpulseError::ConfigInvalid { .. }
        | StockpulseError::ConfigParse { .. } => StatusCode::BAD_REQUEST,
        StockpulseError::NoData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        StockpulseError::Provider { .. } => StatusCode::BAD_GATEWAY,
        StockpulseError::Database { .. }
        | StockpulseError::DatabaseQuery { .. }
        | StockpulseError::Chart { .. }
        | StockpulseError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<StockpulseError> for WebError {
    fn from(err: StockpulseError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl From<askama::Error> for WebError {
    fn from(err: askama::Error) -> Self {
        Self::internal(format!("template error: {}", err))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let fragment = ErrorTemplate {
            message: &self.message,
            status: self.status.as_u16(),
        };
        let content = match fragment.render() {
            Ok(html) => html,
            Err(_) => return (self.status, self.message).into_response(),
        };
        if self.fragment {
            return (self.status, Html(content)).into_response();
        }
        let page = BasePage {
            title: "Error",
            content: &content,
        };
        match page.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(_) => (self.status, Html(content)).into_response(),
        }
    }
}

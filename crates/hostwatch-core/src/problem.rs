//! RFC 7807 Problem Details responses for HTTP handlers
//!
//! All request-time errors are surfaced to the client as
//! `application/problem+json` bodies with a machine-readable type URI.

use std::collections::BTreeMap;

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

/// Representation of a Problem error to return to the client.
/// Follows RFC 7807 - Problem Details for HTTP APIs
#[derive(Debug, Clone)]
pub struct Problem {
    /// The status code of the problem.
    pub status_code: StatusCode,
    /// The actual body of the problem.
    pub body: BTreeMap<String, Value>,
}

impl Problem {
    /// Create a new `Problem` response with an empty body.
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            body: BTreeMap::new(),
        }
    }

    /// Specify the "type" URI of the problem.
    pub fn with_type<S: Into<String>>(self, value: S) -> Self {
        self.with_value("type", value.into())
    }

    /// Specify the "title" of the problem.
    pub fn with_title<S: Into<String>>(self, value: S) -> Self {
        self.with_value("title", value.into())
    }

    /// Specify the "detail" of the problem.
    pub fn with_detail<S: Into<String>>(self, value: S) -> Self {
        self.with_value("detail", value.into())
    }

    /// Specify an arbitrary extension value to include in the problem.
    pub fn with_value<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.body.insert(key.to_owned(), value.into());
        self
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> axum::response::Response {
        if self.body.is_empty() {
            self.status_code.into_response()
        } else {
            let mut response = (self.status_code, Json(self.body)).into_response();
            response
                .headers_mut()
                .insert(CONTENT_TYPE, "application/problem+json".parse().unwrap());
            response
        }
    }
}

/// Result type where the error is always a `Problem`.
pub type Result<T> = std::result::Result<T, Problem>;

fn base(status: StatusCode, type_url: &str, title: &str) -> Problem {
    Problem::new(status)
        .with_type(type_url)
        .with_title(title)
        .with_value("timestamp", chrono::Utc::now().to_rfc3339())
}

/// 400 response for malformed request parameters.
pub fn bad_request() -> Problem {
    base(
        StatusCode::BAD_REQUEST,
        "https://hostwatch.dev/probs/bad-request",
        "Bad Request",
    )
}

/// 500 response for failures while servicing an otherwise valid request.
pub fn internal_server_error() -> Problem {
    base(
        StatusCode::INTERNAL_SERVER_ERROR,
        "https://hostwatch.dev/probs/internal-server-error",
        "Internal Server Error",
    )
}

//! Error definitions for the client and generator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP client error: {source}")]
    HttpClient {
        #[from]
        source: reqwest::Error,
    },

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("No image data found in response{detail}")]
    NoImage { detail: String },
}

impl Error {
    /// 由 HTTP 状态码与响应体构造 API 错误。
    pub(crate) fn api(status: http::StatusCode, body: String) -> Self {
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            body
        };
        Self::ApiError {
            status: status.as_u16(),
            message,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

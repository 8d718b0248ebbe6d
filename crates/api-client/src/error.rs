//! Error types for the API client

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Uniform error for every remote operation
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response
    #[error("Request failed: {0}")]
    Transport(String),

    /// The server rejected the session (401/403)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-2xx response, with the server's message when the
    /// error body carried one
    #[error("{message}")]
    Server { status: u16, message: String },
}

impl ApiError {
    /// True when the failure means the session is invalid or expired
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

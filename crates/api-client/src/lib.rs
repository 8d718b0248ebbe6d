//! HTTP client for the remote task API
//!
//! One method per remote operation. Every failure is normalized into
//! [`ApiError`] before it reaches a caller; no raw transport error
//! escapes this crate.

mod client;
mod error;
mod types;

pub use client::{ApiClient, ApiConfig, TaskApi, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
pub use types::{AuthResponse, Credentials};

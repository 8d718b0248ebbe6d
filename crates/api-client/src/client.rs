//! Task API client
//!
//! Talks to the remote task service. The current session token is read
//! from the shared [`SessionStore`] and attached verbatim as the
//! `Authorization` header; a request without a token is still sent and
//! left for the server to reject. Login returns the token to the caller
//! and never persists it itself.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::debug;
use uuid::Uuid;

use td_core::session::SessionStore;
use td_core::task::{Task, TaskPatch};

use crate::error::{ApiError, Result};
use crate::types::{AuthResponse, CreateTaskRequest, Credentials, ErrorBody};

/// API endpoint used when no other base URL is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Remote operations the view layer depends on
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Create an account
    async fn register(&self, credentials: &Credentials) -> Result<()>;

    /// Exchange credentials for a session token
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse>;

    /// Fetch the full task list
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Create a task with the given title
    async fn create_task(&self, title: &str) -> Result<Task>;

    /// Apply a partial update to an existing task
    async fn update_task(&self, id: Uuid, patch: &TaskPatch) -> Result<Task>;

    /// Delete a task by id
    async fn delete_task(&self, id: Uuid) -> Result<()>;
}

/// HTTP implementation of [`TaskApi`]
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: ApiConfig, session: SessionStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url,
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the current token, when present, as a raw header value
    async fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.session.token().await {
            Some(token) => req.header(reqwest::header::AUTHORIZATION, token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let res = req
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if res.status().is_success() {
            Ok(res)
        } else {
            Err(error_from_response(res).await)
        }
    }

    async fn json<T: serde::de::DeserializeOwned>(res: Response) -> Result<T> {
        res.json().await.map_err(|e| ApiError::Transport(e.to_string()))
    }
}

/// Read a failed response into the uniform error shape.
///
/// The message is taken from the error body's `error` or `msg` field when
/// present, else the raw body text, else a generic description.
async fn error_from_response(res: Response) -> ApiError {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.error.or(parsed.msg))
        .or_else(|| {
            let text = body.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
        .unwrap_or_else(|| format!("Request failed with status {}", status));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
        _ => ApiError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl TaskApi for ApiClient {
    async fn register(&self, credentials: &Credentials) -> Result<()> {
        debug!("POST /auth/register");
        let req = self.http.post(self.url("/auth/register")).json(credentials);
        self.send(self.authorize(req).await).await?;
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        debug!("POST /auth/login");
        let req = self.http.post(self.url("/auth/login")).json(credentials);
        let res = self.send(self.authorize(req).await).await?;
        Self::json(res).await
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        debug!("GET /tasks");
        let req = self.http.get(self.url("/tasks"));
        let res = self.send(self.authorize(req).await).await?;
        Self::json(res).await
    }

    async fn create_task(&self, title: &str) -> Result<Task> {
        debug!("POST /tasks");
        let body = CreateTaskRequest {
            title: title.to_string(),
        };
        let req = self.http.post(self.url("/tasks")).json(&body);
        let res = self.send(self.authorize(req).await).await?;
        Self::json(res).await
    }

    async fn update_task(&self, id: Uuid, patch: &TaskPatch) -> Result<Task> {
        debug!("PUT /tasks/{}", id);
        let req = self.http.put(self.url(&format!("/tasks/{}", id))).json(patch);
        let res = self.send(self.authorize(req).await).await?;
        Self::json(res).await
    }

    async fn delete_task(&self, id: Uuid) -> Result<()> {
        debug!("DELETE /tasks/{}", id);
        let req = self.http.delete(self.url(&format!("/tasks/{}", id)));
        self.send(self.authorize(req).await).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_strips_trailing_slash() {
        let config = ApiConfig::new("http://localhost:5000/");
        assert_eq!(config.base_url, "http://localhost:5000");
    }

    #[test]
    fn test_default_config_uses_local_endpoint() {
        assert_eq!(ApiConfig::default().base_url, DEFAULT_BASE_URL);
    }
}

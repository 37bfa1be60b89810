//! Typed HTTP client for the sdoc-server REST surface

use serde::Deserialize;
use thiserror::Error;

use sdoc_common::db::models::{Project, ProjectDetail};

/// Client-side errors for API calls
#[derive(Debug, Error)]
pub enum WatchError {
    /// Transport-level failure (connect, timeout, decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error status and an error body
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Error body shape used by the server for every failure response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Typed client over the project lifecycle API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// GET /health
    pub async fn health(&self) -> Result<(), WatchError> {
        let response = self.http.get(format!("{}/health", self.base_url)).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// GET /projects
    pub async fn list_projects(&self) -> Result<Vec<Project>, WatchError> {
        let response = self.http.get(format!("{}/projects", self.base_url)).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// GET /projects/{id}
    pub async fn get_project(&self, id: &str) -> Result<ProjectDetail, WatchError> {
        let response = self
            .http
            .get(format!("{}/projects/{}", self.base_url, id))
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// DELETE /projects/{id}
    pub async fn delete_project(&self, id: &str) -> Result<(), WatchError> {
        let response = self
            .http
            .delete(format!("{}/projects/{}", self.base_url, id))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, WatchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|b| b.error)
            .unwrap_or_else(|_| status.to_string());

        Err(WatchError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

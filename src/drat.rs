//! DRAT action client.
//!
//! [`DratClient`] implements [`ActionBackend`]: `POST <base>/<action>` with
//! the repository record as JSON, and `POST <base>/reset` with an empty
//! body. Any status other than 200 is a failure.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use proteus_core::backend::{ActionBackend, BackendError};
use proteus_core::models::ActionRequest;

pub struct DratClient {
    client: reqwest::Client,
    base_url: String,
}

impl DratClient {
    /// Create a client for the action endpoints under `base_url`
    /// (e.g. `http://localhost:8080/proteus/drat`).
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}", self.base_url, action)
    }

    async fn post(&self, request: reqwest::RequestBuilder) -> Result<(), BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        match response.status().as_u16() {
            200 => Ok(()),
            other => Err(BackendError::Status(other)),
        }
    }
}

#[async_trait]
impl ActionBackend for DratClient {
    async fn submit(&self, request: &ActionRequest) -> Result<(), BackendError> {
        let url = self.endpoint(request.action.as_str());
        tracing::info!(%url, repo = %request.repo, "submitting action");
        self.post(self.client.post(&url).json(&request.data)).await
    }

    async fn reset(&self) -> Result<(), BackendError> {
        let url = self.endpoint("reset");
        tracing::info!(%url, "submitting reset");
        self.post(self.client.post(&url).body("")).await
    }
}

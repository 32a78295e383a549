//! Statistics index client.
//!
//! [`SolrClient`] implements [`SearchBackend`] over HTTP: one `GET` per
//! select with the query rendered by [`SolrQuery::params`]. Only a 200 with
//! a well-formed `{ response: { numFound, docs } }` body is a success.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use proteus_core::backend::{parse_envelope, BackendError, SearchBackend, SelectResponse, SolrQuery};

pub struct SolrClient {
    client: reqwest::Client,
    url: String,
}

impl SolrClient {
    /// Create a client for the select handler at `url`
    /// (e.g. `http://localhost:8983/solr/statistics/select`).
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SearchBackend for SolrClient {
    async fn select(&self, query: &SolrQuery) -> Result<SelectResponse, BackendError> {
        tracing::debug!(url = %self.url, q = %query.q, rows = query.rows, "select");

        let response = self
            .client
            .get(&self.url)
            .query(&query.params())
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(BackendError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::Envelope(e.to_string()))?;
        parse_envelope(body)
    }
}

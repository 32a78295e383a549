//! Backend abstraction for Proteus.
//!
//! Two collaborators sit behind traits so the fetch and action layers can
//! run against the real services, an offline fixture, or a scripted fake:
//!
//! | Trait | Real service | Contract |
//! |-------|--------------|----------|
//! | [`SearchBackend`] | Solr `statistics/select` | `GET ?q&fl&rows&wt=json&sort` → `{ response: { numFound, docs } }` |
//! | [`ActionBackend`] | DRAT `/proteus/drat` | `POST /<action>` with a repository record, `POST /reset` with no body; success iff 200 |
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{ActionRequest, Document};

/// Rows requested by a query unless told otherwise.
pub const DEFAULT_ROWS: usize = 10;

/// Failure talking to a backend. Every variant is retryable by the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Connection, DNS, timeout, or body read failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The backend answered with a status other than 200.
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    /// A 200 response whose body is not the expected envelope.
    #[error("malformed response envelope: {0}")]
    Envelope(String),
}

/// A select query against the statistics index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolrQuery {
    pub q: String,
    /// Field list, e.g. `mime_*` or `id,license_*`.
    pub fl: Option<String>,
    pub rows: usize,
    /// Field to sort ascending by.
    pub sort: Option<String>,
}

impl SolrQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            fl: None,
            rows: DEFAULT_ROWS,
            sort: None,
        }
    }

    /// Documents whose `parent` is the given repository.
    pub fn parent(repo: &str) -> Self {
        Self::new(format!("parent:\"{}\"", repo.replace('"', "\\\"")))
    }

    pub fn fields(mut self, fl: impl Into<String>) -> Self {
        self.fl = Some(fl.into());
        self
    }

    pub fn sort_asc(mut self, field: impl Into<String>) -> Self {
        self.sort = Some(field.into());
        self
    }

    pub fn with_rows(&self, rows: usize) -> Self {
        Self {
            rows,
            ..self.clone()
        }
    }

    /// Query-string pairs in wire order.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", self.q.clone())];
        if let Some(fl) = &self.fl {
            params.push(("fl", fl.clone()));
        }
        params.push(("rows", self.rows.to_string()));
        params.push(("wt", "json".to_string()));
        if let Some(sort) = &self.sort {
            params.push(("sort", format!("{} asc", sort)));
        }
        params
    }
}

/// Parsed select envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectResponse {
    pub num_found: u64,
    pub docs: Vec<Document>,
}

#[derive(Deserialize)]
struct Envelope {
    response: EnvelopeBody,
}

#[derive(Deserialize)]
struct EnvelopeBody {
    #[serde(rename = "numFound")]
    num_found: u64,
    docs: Vec<Document>,
}

/// Parse a `{ response: { numFound, docs } }` body.
///
/// A missing `response`, `numFound`, or `docs`, or a document without an
/// `id`, is an [`BackendError::Envelope`] error.
pub fn parse_envelope(body: serde_json::Value) -> Result<SelectResponse, BackendError> {
    let envelope: Envelope =
        serde_json::from_value(body).map_err(|e| BackendError::Envelope(e.to_string()))?;
    Ok(SelectResponse {
        num_found: envelope.response.num_found,
        docs: envelope.response.docs,
    })
}

/// Read access to the statistics index.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one select query.
    async fn select(&self, query: &SolrQuery) -> Result<SelectResponse, BackendError>;
}

/// Command submission to the DRAT backend.
#[async_trait]
pub trait ActionBackend: Send + Sync {
    /// Submit `request.data` to the endpoint named by `request.action`.
    async fn submit(&self, request: &ActionRequest) -> Result<(), BackendError>;

    /// Send the payload-free reset command.
    async fn reset(&self) -> Result<(), BackendError>;
}

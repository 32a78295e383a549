//! In-memory backend for offline dashboards and tests.
//!
//! Serves a fixed document set with just enough of the select syntax for
//! the dashboard's queries: `*:*`, `field:value` and `field:"value"`
//! filters, `fl` patterns with a trailing `*`, ascending sort, and `rows`
//! truncation with an accurate `numFound`. Submitted actions are recorded
//! instead of executed.

use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::{ActionBackend, BackendError, SearchBackend, SelectResponse, SolrQuery};
use crate::models::{ActionKind, ActionRequest, Document, RepositoryRecord};

/// One action received by the in-memory backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAction {
    pub action: ActionKind,
    /// `None` for reset.
    pub data: Option<RepositoryRecord>,
}

/// In-memory backend holding a document set.
pub struct InMemoryBackend {
    docs: Vec<Document>,
    queries: RwLock<Vec<SolrQuery>>,
    actions: RwLock<Vec<RecordedAction>>,
}

impl InMemoryBackend {
    pub fn new(docs: Vec<Document>) -> Self {
        Self {
            docs,
            queries: RwLock::new(Vec::new()),
            actions: RwLock::new(Vec::new()),
        }
    }

    /// Build from fixture JSON: either an array of documents or a full
    /// select envelope.
    pub fn from_json(value: Value) -> Result<Self> {
        let docs = match value {
            Value::Array(_) => serde_json::from_value(value)?,
            Value::Object(_) => super::parse_envelope(value)?.docs,
            _ => bail!("fixture must be a document array or a select response"),
        };
        Ok(Self::new(docs))
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Queries received so far, in order.
    pub fn queries(&self) -> Vec<SolrQuery> {
        self.queries.read().unwrap().clone()
    }

    /// Actions received so far, in order.
    pub fn actions(&self) -> Vec<RecordedAction> {
        self.actions.read().unwrap().clone()
    }
}

/// Split `field:value`, unquoting the value.
fn parse_filter(q: &str) -> Option<(&str, String)> {
    let (field, raw) = q.split_once(':')?;
    let value = raw
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .map(|v| v.replace("\\\"", "\""))
        .unwrap_or_else(|| raw.to_string());
    Some((field, value))
}

fn matches(doc: &Document, q: &str) -> bool {
    let q = q.trim();
    if q.is_empty() || q == "*:*" {
        return true;
    }
    match parse_filter(q) {
        Some(("id", value)) => doc.id == value,
        Some((field, value)) => value == "*" || doc.text(field) == Some(value.as_str()),
        None => false,
    }
}

fn project(doc: &Document, fl: &str) -> Document {
    let patterns: Vec<&str> = fl.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
    if patterns.iter().any(|p| *p == "*") {
        return doc.clone();
    }
    let keep = |name: &str| {
        patterns.iter().any(|p| match p.strip_suffix('*') {
            Some(prefix) => name.starts_with(prefix),
            None => name == *p,
        })
    };
    Document {
        id: doc.id.clone(),
        fields: doc
            .fields
            .iter()
            .filter(|(k, _)| keep(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

fn sort_key<'a>(doc: &'a Document, field: &str) -> &'a str {
    if field == "id" {
        &doc.id
    } else {
        doc.text(field).unwrap_or_default()
    }
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    async fn select(&self, query: &SolrQuery) -> Result<SelectResponse, BackendError> {
        self.queries.write().unwrap().push(query.clone());

        let mut hits: Vec<&Document> = self.docs.iter().filter(|d| matches(d, &query.q)).collect();
        if let Some(field) = &query.sort {
            hits.sort_by(|a, b| sort_key(a, field).cmp(sort_key(b, field)));
        }
        let num_found = hits.len() as u64;
        let docs = hits
            .into_iter()
            .take(query.rows)
            .map(|d| match &query.fl {
                Some(fl) => project(d, fl),
                None => d.clone(),
            })
            .collect();

        Ok(SelectResponse { num_found, docs })
    }
}

#[async_trait]
impl ActionBackend for InMemoryBackend {
    async fn submit(&self, request: &ActionRequest) -> Result<(), BackendError> {
        self.actions.write().unwrap().push(RecordedAction {
            action: request.action,
            data: Some(request.data.clone()),
        });
        Ok(())
    }

    async fn reset(&self) -> Result<(), BackendError> {
        self.actions.write().unwrap().push(RecordedAction {
            action: ActionKind::Reset,
            data: None,
        });
        Ok(())
    }
}

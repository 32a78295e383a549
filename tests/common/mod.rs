//! Scripted backends shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

use proteus_core::backend::{
    ActionBackend, BackendError, SearchBackend, SelectResponse, SolrQuery,
};
use proteus_core::models::{ActionRequest, Document};

pub type Reply = Result<SelectResponse, BackendError>;

/// Search backend whose responses are released by the test, one per call,
/// in call order.
#[derive(Default)]
pub struct ScriptedSearch {
    calls: Mutex<Vec<SolrQuery>>,
    gates: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
}

impl ScriptedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a gate for the next call; send on the returned sender to
    /// release that call.
    pub fn gate(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    /// Queue an immediate reply for the next call.
    pub fn reply(&self, reply: Reply) {
        let _ = self.gate().send(reply);
    }

    pub fn calls(&self) -> Vec<SolrQuery> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait until `n` calls have been made.
    pub async fn wait_for_calls(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.calls.lock().unwrap().len() < n {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("backend was never called");
    }
}

#[async_trait]
impl SearchBackend for ScriptedSearch {
    async fn select(&self, query: &SolrQuery) -> Reply {
        self.calls.lock().unwrap().push(query.clone());
        let gate = self.gates.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(BackendError::Transport("gate dropped".into()))),
            None => Err(BackendError::Transport("no scripted reply".into())),
        }
    }
}

/// Action backend that records calls and answers with a fixed result.
pub struct RecordingActions {
    pub submitted: Mutex<Vec<ActionRequest>>,
    pub resets: Mutex<usize>,
    pub fail_with: Option<BackendError>,
}

impl RecordingActions {
    pub fn ok() -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            resets: Mutex::new(0),
            fail_with: None,
        }
    }

    pub fn failing(err: BackendError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::ok()
        }
    }

    pub fn total_calls(&self) -> usize {
        self.submitted.lock().unwrap().len() + *self.resets.lock().unwrap()
    }
}

#[async_trait]
impl ActionBackend for RecordingActions {
    async fn submit(&self, request: &ActionRequest) -> Result<(), BackendError> {
        self.submitted.lock().unwrap().push(request.clone());
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn reset(&self) -> Result<(), BackendError> {
        *self.resets.lock().unwrap() += 1;
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// `count` project documents with ids `p00`, `p01`, ...
pub fn projects(count: usize) -> Vec<Document> {
    (0..count)
        .map(|i| Document::new(format!("p{:02}", i)).with("type", "project"))
        .collect()
}

pub fn page(docs: Vec<Document>, num_found: u64) -> Reply {
    Ok(SelectResponse { num_found, docs })
}

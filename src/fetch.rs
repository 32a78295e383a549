//! Fetch coordination.
//!
//! A [`FetchCoordinator`] belongs to one view. It runs the two-phase load
//! against the statistics index:
//!
//! 1. request the query with `rows = page_rows`;
//! 2. if `numFound` exceeds the page, request again with `rows = numFound`.
//!
//! Only the latest load of a coordinator can deliver a result. Starting a
//! new load cancels the one in flight, and [`FetchCoordinator::cancel`]
//! (called when the view unmounts) cancels it without replacement. A
//! cancelled load resolves to `None` and its late responses are dropped.
//!
//! Failures are logged with their cause and surfaced to the view as the
//! generic [`FETCH_ERROR_MESSAGE`].

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use proteus_core::backend::{BackendError, SearchBackend, SolrQuery};
use proteus_core::models::{Document, FetchResult};

use crate::progress::{FetchProgressEvent, FetchProgressReporter, NoProgress};

/// Message shown in place of a chart when a load fails.
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching data";

#[derive(Default)]
struct InFlight {
    generation: u64,
    token: Option<CancellationToken>,
}

pub struct FetchCoordinator {
    view: String,
    backend: Arc<dyn SearchBackend>,
    page_rows: usize,
    reporter: Arc<dyn FetchProgressReporter>,
    in_flight: Mutex<InFlight>,
}

impl FetchCoordinator {
    pub fn new(view: &str, backend: Arc<dyn SearchBackend>, page_rows: usize) -> Self {
        Self {
            view: view.to_string(),
            backend,
            page_rows: page_rows.max(1),
            reporter: Arc::new(NoProgress),
            in_flight: Mutex::new(InFlight::default()),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn FetchProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    /// Whether a load is currently running.
    pub fn is_loading(&self) -> bool {
        self.in_flight.lock().unwrap().token.is_some()
    }

    /// Load every document matching `query`.
    ///
    /// Returns `None` when this load was superseded by a newer one or
    /// cancelled; the caller must not touch view state in that case.
    pub async fn load(&self, query: &SolrQuery) -> Option<FetchResult> {
        let (generation, token) = self.begin();

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = self.fetch_all(query) => Some(result),
        };

        self.finish(generation);

        if token.is_cancelled() {
            tracing::debug!(view = %self.view, q = %query.q, "load cancelled");
            return None;
        }

        match outcome? {
            Ok(docs) => Some(FetchResult::Success(docs)),
            Err(e) => {
                tracing::warn!(
                    view = %self.view,
                    q = %query.q,
                    error = %e,
                    "load failed"
                );
                Some(FetchResult::Error(FETCH_ERROR_MESSAGE.to_string()))
            }
        }
    }

    /// Cancel the load in flight, if any. Its result will never be delivered.
    pub fn cancel(&self) {
        let mut slot = self.in_flight.lock().unwrap();
        if let Some(token) = slot.token.take() {
            token.cancel();
        }
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let mut slot = self.in_flight.lock().unwrap();
        if let Some(previous) = slot.token.take() {
            tracing::debug!(view = %self.view, "superseding previous load");
            previous.cancel();
        }
        slot.generation += 1;
        let token = CancellationToken::new();
        slot.token = Some(token.clone());
        (slot.generation, token)
    }

    fn finish(&self, generation: u64) {
        let mut slot = self.in_flight.lock().unwrap();
        if slot.generation == generation {
            slot.token = None;
        }
    }

    async fn fetch_all(&self, query: &SolrQuery) -> Result<Vec<Document>, BackendError> {
        self.reporter.report(FetchProgressEvent::Requesting {
            view: self.view.clone(),
            rows: self.page_rows,
        });
        let page = self.backend.select(&query.with_rows(self.page_rows)).await?;

        if page.num_found <= self.page_rows as u64 {
            self.report_loaded(page.docs.len());
            return Ok(page.docs);
        }

        self.reporter.report(FetchProgressEvent::Expanding {
            view: self.view.clone(),
            num_found: page.num_found,
        });
        let all = self
            .backend
            .select(&query.with_rows(page.num_found as usize))
            .await?;
        self.report_loaded(all.docs.len());
        Ok(all.docs)
    }

    fn report_loaded(&self, docs: usize) {
        self.reporter.report(FetchProgressEvent::Loaded {
            view: self.view.clone(),
            docs,
        });
    }
}

//! View controllers.
//!
//! A [`ViewController`] drives one dashboard panel through its lifecycle:
//!
//! ```text
//! mount ──▶ Loading ──▶ Ready { docs, data }
//!              │
//!              └──────▶ Failed { message } ──retry──▶ Loading
//! ```
//!
//! The panel (a [`Panel`] implementation) owns the UI parameters (search
//! text, top-N count, selected row) and knows how to turn documents into
//! its chart data. The controller owns the fetch and the state, and tells
//! its [`ViewObserver`] about every state change.
//!
//! Two rules keep updates honest:
//!
//! - after [`ViewController::unmount`] no state change is applied, even if
//!   a response arrives later;
//! - a new state equal to the current one is not applied, so identical
//!   data never re-renders.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use proteus_core::backend::SolrQuery;
use proteus_core::models::{Document, FetchResult};

use crate::fetch::FetchCoordinator;

/// A dashboard panel: what to query and how to chart the result.
pub trait Panel: Send + Sync + 'static {
    type Output: Clone + PartialEq + Serialize + Send + Sync + 'static;

    /// Short name used in logs, progress lines and error messages.
    fn name(&self) -> &'static str;

    /// The query for the panel's current parameters.
    fn query(&self) -> SolrQuery;

    /// Derive chart data from the loaded documents.
    fn build(&self, docs: &[Document]) -> Self::Output;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "status")]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready { docs: Vec<Document>, data: T },
    Failed { message: String },
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Ready { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Receives every applied state change. Renderers implement this.
pub trait ViewObserver<T>: Send + Sync {
    fn on_update(&self, view: &str, state: &ViewState<T>);
}

/// Observer that ignores updates; callers read [`ViewController::state`].
pub struct NoObserver;

impl<T> ViewObserver<T> for NoObserver {
    fn on_update(&self, _view: &str, _state: &ViewState<T>) {}
}

pub struct ViewController<P: Panel> {
    panel: Mutex<P>,
    fetch: FetchCoordinator,
    state: Mutex<ViewState<P::Output>>,
    mounted: AtomicBool,
    observer: Arc<dyn ViewObserver<P::Output>>,
}

impl<P: Panel> ViewController<P> {
    pub fn new(panel: P, fetch: FetchCoordinator) -> Self {
        Self {
            panel: Mutex::new(panel),
            fetch,
            state: Mutex::new(ViewState::Idle),
            mounted: AtomicBool::new(false),
            observer: Arc::new(NoObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ViewObserver<P::Output>>) -> Self {
        self.observer = observer;
        self
    }

    /// Mark the view live and run its initial load.
    pub async fn mount(&self) {
        self.mounted.store(true, Ordering::SeqCst);
        self.refresh().await;
    }

    /// Stop delivering updates and cancel the load in flight.
    pub fn unmount(&self) {
        {
            // Held so no `apply` can store between its mounted check and write.
            let _state = self.state.lock().unwrap();
            self.mounted.store(false, Ordering::SeqCst);
        }
        self.fetch.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Enter `Loading` and load with the current parameters. A load already
    /// in flight is superseded.
    pub async fn refresh(&self) {
        self.apply(ViewState::Loading);
        self.load_and_apply().await;
    }

    /// Re-issue the last query after a failure.
    pub async fn retry(&self) {
        self.refresh().await;
    }

    /// Reload in place without passing through `Loading`. Used by watch
    /// mode, where an unchanged result must not produce an update.
    pub async fn poll(&self) {
        self.load_and_apply().await;
    }

    /// Change the panel's parameters and reload.
    pub async fn reconfigure(&self, change: impl FnOnce(&mut P)) {
        {
            let mut panel = self.panel.lock().unwrap();
            change(&mut panel);
        }
        self.refresh().await;
    }

    /// Change the panel's parameters without reloading. Use this for
    /// parameters that only affect [`Panel::build`]; the current documents
    /// are re-derived.
    pub fn rebuild(&self, change: impl FnOnce(&mut P)) {
        let next = {
            let mut panel = self.panel.lock().unwrap();
            change(&mut panel);
            match &*self.state.lock().unwrap() {
                ViewState::Ready { docs, .. } => ViewState::Ready {
                    data: panel.build(docs),
                    docs: docs.clone(),
                },
                _ => return,
            }
        };
        self.apply(next);
    }

    pub fn state(&self) -> ViewState<P::Output> {
        self.state.lock().unwrap().clone()
    }

    /// Read the panel's current parameters.
    pub fn panel<R>(&self, read: impl FnOnce(&P) -> R) -> R {
        read(&self.panel.lock().unwrap())
    }

    async fn load_and_apply(&self) {
        let query = self.panel.lock().unwrap().query();
        let Some(result) = self.fetch.load(&query).await else {
            return;
        };
        let next = match result {
            FetchResult::Success(docs) => {
                let data = self.panel.lock().unwrap().build(&docs);
                ViewState::Ready { docs, data }
            }
            FetchResult::Error(message) => ViewState::Failed { message },
            FetchResult::Loading => ViewState::Loading,
        };
        self.apply(next);
    }

    /// Store `next` and notify the observer. Returns whether anything changed.
    fn apply(&self, next: ViewState<P::Output>) -> bool {
        {
            let mut state = self.state.lock().unwrap();
            if !self.is_mounted() || *state == next {
                return false;
            }
            *state = next.clone();
        }
        self.observer.on_update(self.fetch.view(), &next);
        true
    }
}

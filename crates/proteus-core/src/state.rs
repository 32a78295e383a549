//! Session-wide application state.
//!
//! [`SharedState`] is an explicit container handed to every consumer that
//! needs cross-view context (which view is current, which repository is
//! being processed, whether a backend job is in progress). Its setters are
//! the only mutation surface; writes are last-writer-wins.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, RwLock};

use crate::models::ActionKind;

/// Top-level dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrentView {
    Summary,
    Analyze,
}

/// Snapshot of the shared state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppState {
    pub current_view: CurrentView,
    pub current_repo: Option<String>,
    pub current_action: Option<ActionKind>,
    pub progress: bool,
    /// Time of the last setter call.
    pub updated_at: DateTime<Utc>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            current_view: CurrentView::Summary,
            current_repo: None,
            current_action: None,
            progress: false,
            updated_at: Utc::now(),
        }
    }
}

/// Cheaply clonable handle to the state of one session.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<RwLock<AppState>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> AppState {
        self.inner.read().unwrap().clone()
    }

    pub fn set_current_view(&self, view: CurrentView) {
        self.update(|s| s.current_view = view);
    }

    /// An empty repository string clears the current repository.
    pub fn set_current_repo(&self, repo: &str) {
        let repo = (!repo.trim().is_empty()).then(|| repo.to_string());
        self.update(|s| s.current_repo = repo);
    }

    pub fn set_current_action(&self, action: ActionKind) {
        self.update(|s| s.current_action = Some(action));
    }

    pub fn set_progress(&self, progress: bool) {
        self.update(|s| s.progress = progress);
    }

    fn update(&self, f: impl FnOnce(&mut AppState)) {
        let mut state = self.inner.write().unwrap();
        f(&mut state);
        state.updated_at = Utc::now();
    }
}

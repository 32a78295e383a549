//! Action submission.
//!
//! The action dialog collects a repository descriptor and a command. On
//! submit:
//!
//! - `reset` sends exactly one payload-free reset request and skips
//!   validation;
//! - every other action requires a non-empty repository, otherwise nothing
//!   is sent and the dialog shows the validation error;
//! - on success the shared state switches to the analyze view for the
//!   submitted repository with progress on, the form is cleared and the
//!   dialog closes;
//! - on failure the form is kept and the error is shown inline.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use proteus_core::backend::{ActionBackend, BackendError};
use proteus_core::models::{ActionKind, ActionRequest};
use proteus_core::state::{CurrentView, SharedState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("repository path or URL is required")]
    MissingRepo,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("action request failed: {0}")]
    Backend(#[from] BackendError),
}

/// User-entered fields of the action dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionForm {
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_action")]
    pub action: ActionKind,
}

fn default_action() -> ActionKind {
    ActionKind::Go
}

impl Default for ActionForm {
    fn default() -> Self {
        Self {
            repo: String::new(),
            name: String::new(),
            description: String::new(),
            action: default_action(),
        }
    }
}

impl ActionForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.repo.trim().is_empty() {
            return Err(ValidationError::MissingRepo);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Sends actions to the backend and records the outcome in shared state.
#[derive(Clone)]
pub struct ActionSubmitter {
    backend: Arc<dyn ActionBackend>,
    state: SharedState,
}

impl ActionSubmitter {
    pub fn new(backend: Arc<dyn ActionBackend>, state: SharedState) -> Self {
        Self { backend, state }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub async fn submit(&self, form: &ActionForm) -> Result<(), SubmitError> {
        if form.action.is_reset() {
            self.backend.reset().await?;
        } else {
            form.validate()?;
            let request = ActionRequest::new(
                form.action,
                form.repo.trim(),
                &form.name,
                &form.description,
            );
            self.backend.submit(&request).await?;
        }

        tracing::info!(action = %form.action, repo = %form.repo, "action accepted");
        self.state.set_current_view(CurrentView::Analyze);
        self.state.set_current_repo(&form.repo);
        self.state.set_current_action(form.action);
        self.state.set_progress(true);
        Ok(())
    }
}

/// The modal dialog: form contents, visibility and the inline error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionDialog {
    pub form: ActionForm,
    pub open: bool,
    pub error: Option<String>,
}

impl ActionDialog {
    /// Open the dialog with `repo` prefilled.
    pub fn open_for(repo: &str) -> Self {
        Self {
            form: ActionForm {
                repo: repo.to_string(),
                ..ActionForm::default()
            },
            open: true,
            error: None,
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.error = None;
    }

    pub async fn submit(&mut self, submitter: &ActionSubmitter) -> Result<(), SubmitError> {
        match submitter.submit(&self.form).await {
            Ok(()) => {
                self.form.clear();
                self.close();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(action = %self.form.action, error = %e, "action not submitted");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

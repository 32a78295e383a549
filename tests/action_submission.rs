mod common;

use std::sync::Arc;

use common::RecordingActions;
use proteus::action::{ActionDialog, ActionForm, ActionSubmitter, SubmitError, ValidationError};
use proteus_core::backend::BackendError;
use proteus_core::models::ActionKind;
use proteus_core::state::{CurrentView, SharedState};

fn form(repo: &str, action: ActionKind) -> ActionForm {
    ActionForm {
        repo: repo.to_string(),
        name: "Tika".to_string(),
        description: "content detection".to_string(),
        action,
    }
}

#[tokio::test]
async fn empty_repo_sends_nothing() {
    let backend = Arc::new(RecordingActions::ok());
    let state = SharedState::new();
    let submitter = ActionSubmitter::new(backend.clone(), state.clone());

    let mut dialog = ActionDialog::open_for("");
    dialog.form.action = ActionKind::Go;
    let err = dialog.submit(&submitter).await.unwrap_err();

    assert_eq!(err, SubmitError::Validation(ValidationError::MissingRepo));
    assert_eq!(backend.total_calls(), 0);
    assert!(dialog.open);
    assert!(dialog.error.is_some());
    assert_eq!(state.snapshot().current_view, CurrentView::Summary);
}

#[tokio::test]
async fn reset_sends_exactly_one_reset() {
    let backend = Arc::new(RecordingActions::ok());
    let submitter = ActionSubmitter::new(backend.clone(), SharedState::new());

    submitter.submit(&form("", ActionKind::Reset)).await.unwrap();

    assert_eq!(*backend.resets.lock().unwrap(), 1);
    assert!(backend.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn accepted_action_updates_shared_state() {
    let backend = Arc::new(RecordingActions::ok());
    let state = SharedState::new();
    let submitter = ActionSubmitter::new(backend.clone(), state.clone());

    let mut dialog = ActionDialog::open_for("/data/tika");
    dialog.form.action = ActionKind::Crawl;
    dialog.form.name = "Tika".into();
    dialog.submit(&submitter).await.unwrap();

    let snapshot = state.snapshot();
    assert_eq!(snapshot.current_view, CurrentView::Analyze);
    assert_eq!(snapshot.current_repo.as_deref(), Some("/data/tika"));
    assert_eq!(snapshot.current_action, Some(ActionKind::Crawl));
    assert!(snapshot.progress);

    assert!(!dialog.open);
    assert_eq!(dialog.form, ActionForm::default());

    let sent = backend.submitted.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].action, ActionKind::Crawl);
    assert_eq!(sent[0].data.repo, "/data/tika");
    assert_eq!(sent[0].data.name, "Tika");
    assert!(!sent[0].data.id.is_empty());
}

#[tokio::test]
async fn backend_failure_keeps_the_form() {
    let backend = Arc::new(RecordingActions::failing(BackendError::Status(500)));
    let state = SharedState::new();
    let submitter = ActionSubmitter::new(backend.clone(), state.clone());

    let mut dialog = ActionDialog::open_for("/data/tika");
    dialog.form.action = ActionKind::Index;
    let err = dialog.submit(&submitter).await.unwrap_err();

    assert_eq!(err, SubmitError::Backend(BackendError::Status(500)));
    assert!(dialog.open);
    assert_eq!(dialog.form.repo, "/data/tika");
    assert!(dialog.error.as_deref().unwrap().contains("500"));
    assert!(!state.snapshot().progress);
    assert_eq!(backend.total_calls(), 1);
}

#[tokio::test]
async fn each_request_gets_a_fresh_id() {
    let backend = Arc::new(RecordingActions::ok());
    let submitter = ActionSubmitter::new(backend.clone(), SharedState::new());

    submitter.submit(&form("/a", ActionKind::Map)).await.unwrap();
    submitter.submit(&form("/a", ActionKind::Reduce)).await.unwrap();

    let sent = backend.submitted.lock().unwrap();
    assert_ne!(sent[0].data.id, sent[1].data.id);
}

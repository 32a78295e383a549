mod common;

use std::sync::{Arc, Mutex};

use common::{page, projects, ScriptedSearch};
use proteus::fetch::{FetchCoordinator, FETCH_ERROR_MESSAGE};
use proteus::panels::{ProjectsTable, TopMimeChart, TopMimeTypes};
use proteus::view::{Panel, ViewController, ViewObserver, ViewState};
use proteus_core::backend::{BackendError, SolrQuery};
use proteus_core::chart::TopN;
use proteus_core::models::{Document, LICENSE_PREFIX};

/// Records every update the view delivers.
struct Spy<T> {
    updates: Mutex<Vec<ViewState<T>>>,
}

impl<T> Spy<T> {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            updates: Mutex::new(Vec::new()),
        })
    }
}

impl<T: Clone> Spy<T> {
    fn updates(&self) -> Vec<ViewState<T>> {
        self.updates.lock().unwrap().clone()
    }
}

impl<T: Clone + Send + Sync> ViewObserver<T> for Spy<T> {
    fn on_update(&self, _view: &str, state: &ViewState<T>) {
        self.updates.lock().unwrap().push(state.clone());
    }
}

/// Number of documents with at least one license field.
struct Licensed;

impl Panel for Licensed {
    type Output = usize;

    fn name(&self) -> &'static str {
        "licensed"
    }

    fn query(&self) -> SolrQuery {
        SolrQuery::new("type:project").fields(format!("{}*", LICENSE_PREFIX))
    }

    fn build(&self, docs: &[Document]) -> usize {
        docs.iter()
            .filter(|d| !d.categories(LICENSE_PREFIX).is_empty())
            .count()
    }
}

fn view_with<P: Panel>(
    panel: P,
    backend: &Arc<ScriptedSearch>,
) -> (Arc<ViewController<P>>, Arc<Spy<P::Output>>) {
    let spy = Spy::new();
    let fetch = FetchCoordinator::new(panel.name(), backend.clone(), 10);
    let view = ViewController::new(panel, fetch).with_observer(spy.clone());
    (Arc::new(view), spy)
}

#[tokio::test]
async fn mount_goes_loading_then_ready() {
    let backend = Arc::new(ScriptedSearch::new());
    backend.reply(page(projects(3), 3));
    let (view, spy) = view_with(Licensed, &backend);

    view.mount().await;

    let updates = spy.updates();
    assert_eq!(updates.len(), 2);
    assert!(updates[0].is_loading());
    assert_eq!(updates[1].data(), Some(&0));
}

#[tokio::test]
async fn unmount_mid_fetch_delivers_nothing_more() {
    let backend = Arc::new(ScriptedSearch::new());
    let gate = backend.gate();
    let (view, spy) = view_with(Licensed, &backend);

    let mount = tokio::spawn({
        let view = view.clone();
        async move { view.mount().await }
    });
    backend.wait_for_calls(1).await;
    assert_eq!(spy.updates().len(), 1);

    view.unmount();
    let _ = gate.send(page(projects(3), 3));
    mount.await.unwrap();

    assert_eq!(spy.updates().len(), 1);
    assert!(view.state().is_loading());
}

#[tokio::test]
async fn identical_results_do_not_rerender() {
    let backend = Arc::new(ScriptedSearch::new());
    backend.reply(page(projects(3), 3));
    backend.reply(page(projects(3), 3));
    backend.reply(page(projects(4), 4));
    let (view, spy) = view_with(Licensed, &backend);

    view.mount().await;
    assert_eq!(spy.updates().len(), 2);

    view.poll().await;
    assert_eq!(spy.updates().len(), 2);

    // Same derived count, different documents: still an update.
    view.poll().await;
    assert_eq!(spy.updates().len(), 3);
    assert_eq!(backend.calls().len(), 3);
}

#[tokio::test]
async fn failure_then_retry_with_same_query() {
    let backend = Arc::new(ScriptedSearch::new());
    backend.reply(Err(BackendError::Transport("connection refused".into())));
    backend.reply(page(projects(2), 2));
    let (view, spy) = view_with(Licensed, &backend);

    view.mount().await;
    assert_eq!(view.state().error(), Some(FETCH_ERROR_MESSAGE));

    view.retry().await;
    assert_eq!(view.state().data(), Some(&0));

    let calls = backend.calls();
    assert_eq!(calls[0], calls[1]);

    let statuses: Vec<bool> = spy.updates().iter().map(|s| s.is_loading()).collect();
    assert_eq!(statuses, vec![true, false, true, false]);
}

#[tokio::test]
async fn parameter_change_supersedes_in_flight_load() {
    let backend = Arc::new(ScriptedSearch::new());
    let first_gate = backend.gate();
    let second_gate = backend.gate();

    let docs = vec![
        Document::new("a").with("type", "project").with("mime_text/plain", 5),
        Document::new("b").with("type", "project").with("mime_image/png", 2),
    ];
    let (view, spy) = view_with(TopMimeTypes { count: TopN::Count(10) }, &backend);

    let mount = tokio::spawn({
        let view = view.clone();
        async move { view.mount().await }
    });
    backend.wait_for_calls(1).await;

    let change = tokio::spawn({
        let view = view.clone();
        async move { view.reconfigure(|p| p.count = TopN::Count(1)).await }
    });
    backend.wait_for_calls(2).await;

    let _ = second_gate.send(page(docs.clone(), 2));
    change.await.unwrap();
    let _ = first_gate.send(page(docs, 2));
    mount.await.unwrap();

    match view.state().data() {
        Some(TopMimeChart::Pie(pie)) => {
            assert_eq!(pie.slices.len(), 1);
            assert_eq!(pie.slices[0].key, "text/plain");
        }
        other => panic!("expected a one-slice pie, got {:?}", other),
    }
    // Loading once (the second Loading is identical and suppressed), then
    // the newer result only.
    assert_eq!(spy.updates().len(), 2);
}

#[tokio::test]
async fn rebuild_filters_without_refetching() {
    let backend = Arc::new(ScriptedSearch::new());
    let docs = vec![
        Document::new("1")
            .with("type", "project")
            .with("repo", "/r/tika")
            .with("name", "Tika"),
        Document::new("2")
            .with("type", "project")
            .with("repo", "/r/oodt")
            .with("name", "OODT"),
    ];
    backend.reply(page(docs, 2));
    let (view, _spy) = view_with(ProjectsTable::default(), &backend);

    view.mount().await;
    assert_eq!(view.state().data().map(|v| v.rows.len()), Some(2));

    view.rebuild(|p| p.search = "TIKA".into());
    let rows = view.state().data().map(|v| v.rows.clone()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].repo, "/r/tika");
    assert_eq!(backend.calls().len(), 1);
}

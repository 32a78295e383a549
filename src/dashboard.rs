//! CLI command implementations.
//!
//! Every panel command mounts one [`ViewController`], waits for its load,
//! prints the result and unmounts. A failed view prints its inline error
//! and exits non-zero; running the same command again is the retry.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::Serialize;

use proteus_core::chart::TopNPolicy;
use proteus_core::models::{ActionKind, FileRecord};
use proteus_core::state::SharedState;

use crate::action::{ActionForm, ActionSubmitter};
use crate::backends::{self, Backends};
use crate::config::Config;
use crate::fetch::FetchCoordinator;
use crate::panels::{
    AllMimeTypes, AuditSummary, LicenseTypes, ProjectFiles, ProjectsTable, TopMimeTypes,
};
use crate::progress::FetchProgressReporter;
use crate::render;
use crate::view::{Panel, ViewController, ViewObserver, ViewState};

/// Everything a command needs: backends, progress and output mode.
pub struct Dashboard {
    backends: Backends,
    page_rows: usize,
    top_n: TopNPolicy,
    reporter: Arc<dyn FetchProgressReporter>,
    json: bool,
}

impl Dashboard {
    pub fn new(
        config: &Config,
        reporter: Arc<dyn FetchProgressReporter>,
        json: bool,
    ) -> Result<Self> {
        Ok(Self {
            backends: backends::connect(config)?,
            page_rows: config.backend.page_rows,
            top_n: config.dashboard.top_n_policy(),
            reporter,
            json,
        })
    }

    fn controller<P: Panel>(&self, panel: P) -> ViewController<P> {
        let fetch = FetchCoordinator::new(panel.name(), self.backends.search.clone(), self.page_rows)
            .with_reporter(self.reporter.clone());
        ViewController::new(panel, fetch)
    }

    fn print<T: Serialize>(&self, data: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(data)?);
        } else {
            print!("{}", text(data));
        }
        Ok(())
    }

    /// Mount `panel`, wait for the load and print the outcome.
    async fn show<P: Panel>(&self, panel: P, text: impl FnOnce(&P::Output) -> String) -> Result<()> {
        let view = self.controller(panel);
        view.mount().await;
        let state = view.state();
        view.unmount();

        match state {
            ViewState::Ready { data, .. } => self.print(&data, text),
            ViewState::Failed { message } => {
                bail!("{}: {}. Run the command again to retry.", view.panel(|p| p.name()), message)
            }
            ViewState::Idle | ViewState::Loading => {
                bail!("{}: load did not complete", view.panel(|p| p.name()))
            }
        }
    }

    pub async fn run_projects(&self, search: Option<String>, select: Option<String>) -> Result<()> {
        let panel = ProjectsTable {
            search: search.unwrap_or_default(),
            selected: select,
        };
        self.show(panel, render::render_projects).await
    }

    pub async fn run_licenses(&self) -> Result<()> {
        self.show(LicenseTypes, |pie| render::render_pie("License types", pie))
            .await
    }

    /// `count` is raw user input; it goes through the same top-N rules as
    /// the dashboard's count field.
    pub async fn run_mime_top(&self, count: Option<String>) -> Result<()> {
        let count = match count {
            Some(raw) => self.top_n.parse(&raw),
            None => self.top_n.initial(),
        };
        self.show(TopMimeTypes { count }, render::render_top_mime)
            .await
    }

    pub async fn run_mime_all(&self) -> Result<()> {
        self.show(AllMimeTypes, render::render_bubbles).await
    }

    pub async fn run_audit(&self) -> Result<()> {
        self.show(AuditSummary::default(), render::render_audit)
            .await
    }

    pub async fn run_files(&self, repo: &str, search: Option<String>) -> Result<()> {
        let panel = ProjectFiles {
            repo: repo.to_string(),
            search: search.unwrap_or_default(),
        };
        self.show(panel, |files| render::render_files(repo, files))
            .await
    }

    /// Keep the files panel live, reloading every `every` until Ctrl-C.
    /// Only changed results are printed.
    pub async fn watch_files(&self, repo: &str, search: Option<String>, every: Duration) -> Result<()> {
        let panel = ProjectFiles {
            repo: repo.to_string(),
            search: search.unwrap_or_default(),
        };
        let observer = Arc::new(FilesPrinter {
            repo: repo.to_string(),
            json: self.json,
        });
        let view = self.controller(panel).with_observer(observer);

        view.mount().await;

        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => break,
                _ = async {
                    ticker.tick().await;
                    view.poll().await;
                } => {}
            }
        }

        view.unmount();
        tracing::debug!(%repo, "stopped watching");
        Ok(())
    }

    pub async fn run_submit(&self, form: ActionForm) -> Result<()> {
        let submitter = ActionSubmitter::new(self.backends.actions.clone(), SharedState::new());
        submitter.submit(&form).await?;

        let state = submitter.state().snapshot();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&state)?);
        } else {
            if form.action.is_reset() {
                println!("Reset accepted.");
            } else {
                println!("Action '{}' accepted for {}.", form.action, form.repo.trim());
            }
            print!("{}", render::render_state(&state));
        }
        Ok(())
    }

    pub async fn run_reset(&self) -> Result<()> {
        self.run_submit(ActionForm {
            action: ActionKind::Reset,
            ..ActionForm::default()
        })
        .await
    }
}

/// Prints each state change of the watched files panel.
struct FilesPrinter {
    repo: String,
    json: bool,
}

impl ViewObserver<Vec<FileRecord>> for FilesPrinter {
    fn on_update(&self, view: &str, state: &ViewState<Vec<FileRecord>>) {
        match state {
            ViewState::Ready { data, .. } => {
                if self.json {
                    if let Ok(line) = serde_json::to_string(data) {
                        println!("{}", line);
                    }
                } else {
                    print!("{}", render::render_files(&self.repo, data));
                    println!();
                }
            }
            ViewState::Failed { message } => eprintln!("{}: {}", view, message),
            ViewState::Idle | ViewState::Loading => {}
        }
    }
}

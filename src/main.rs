//! # Proteus CLI (`proteus`)
//!
//! Terminal front end for the DRAT audit dashboard.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `proteus projects` | List projects, optionally filtered |
//! | `proteus licenses` | License totals across all projects |
//! | `proteus mime top` | Top-N MIME types |
//! | `proteus mime all` | Every MIME type with its count |
//! | `proteus audit` | License breakdown per audited project |
//! | `proteus files <repo>` | Files of one repository, optionally watched |
//! | `proteus submit` | Submit a repository action to DRAT |
//! | `proteus reset` | Reset DRAT |
//! | `proteus serve` | Start the JSON HTTP API |
//! | `proteus completions <shell>` | Print shell completions |
//!
//! ## Examples
//!
//! ```bash
//! proteus projects --search tika
//! proteus mime top --count 5 --json
//! proteus submit --repo /data/tika --action crawl
//! proteus files /data/tika --watch 1
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use proteus::action::ActionForm;
use proteus::config;
use proteus::dashboard::Dashboard;
use proteus::logging;
use proteus::progress::ProgressMode;
use proteus::server;
use proteus_core::models::ActionKind;

/// Proteus: audit dashboard for Apache DRAT.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Without one, `./config/proteus.toml` is used if present and built-in
/// defaults otherwise.
#[derive(Parser)]
#[command(
    name = "proteus",
    about = "Proteus: audit dashboard for Apache DRAT",
    version,
    long_about = "Proteus reads per-project MIME and license statistics from the DRAT \
    Solr index, aggregates them into charts, and submits crawl, index, map, reduce and \
    reset actions to the DRAT server."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/proteus.toml")]
    config: PathBuf,

    /// Fetch progress on stderr: off, human or json.
    /// Defaults to human when stderr is a terminal.
    #[arg(long, global = true)]
    progress: Option<ProgressMode>,

    /// Print chart data as JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects known to the statistics index.
    Projects {
        /// Case-insensitive filter on repository, name or description.
        #[arg(long)]
        search: Option<String>,

        /// Show details for the project with this repository.
        #[arg(long)]
        select: Option<String>,
    },

    /// License totals across all projects.
    Licenses,

    /// MIME type charts.
    Mime {
        #[command(subcommand)]
        chart: MimeChart,
    },

    /// License breakdown per audited project.
    Audit,

    /// Files of one repository.
    Files {
        repo: String,

        /// Filter on location, MIME type or license.
        #[arg(long)]
        search: Option<String>,

        /// Reload every SECS seconds until Ctrl-C, printing only changes.
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },

    /// Submit a repository action to DRAT.
    Submit {
        /// Repository path or URL. Required unless the action is reset.
        #[arg(long, default_value = "")]
        repo: String,

        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// go, crawl, index, map, reduce or reset.
        #[arg(long, default_value = "go")]
        action: ActionKind,
    },

    /// Reset DRAT. Removes all crawled and indexed data.
    Reset,

    /// Start the JSON HTTP API.
    Serve,

    /// Print shell completions.
    Completions { shell: Shell },
}

#[derive(Subcommand)]
enum MimeChart {
    /// The N most frequent MIME types.
    Top {
        /// How many types to show (1 to the configured maximum). An invalid
        /// count falls back to the configured fallback.
        #[arg(long)]
        count: Option<String>,
    },
    /// Every MIME type.
    All,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Completions { shell } = cli.command {
        let mut command = Cli::command();
        generate(shell, &mut command, "proteus", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        config::Config::minimal()
    };
    logging::init(&cfg.logging.filter);

    if let Commands::Serve = cli.command {
        return server::run_server(&cfg).await;
    }

    let progress = cli.progress.unwrap_or_else(ProgressMode::default_for_tty);
    let dashboard = Dashboard::new(&cfg, Arc::from(progress.reporter()), cli.json)?;

    match cli.command {
        Commands::Projects { search, select } => dashboard.run_projects(search, select).await?,
        Commands::Licenses => dashboard.run_licenses().await?,
        Commands::Mime { chart } => match chart {
            MimeChart::Top { count } => dashboard.run_mime_top(count).await?,
            MimeChart::All => dashboard.run_mime_all().await?,
        },
        Commands::Audit => dashboard.run_audit().await?,
        Commands::Files {
            repo,
            search,
            watch,
        } => match watch {
            Some(secs) => {
                dashboard
                    .watch_files(&repo, search, Duration::from_secs(secs.max(1)))
                    .await?
            }
            None => dashboard.run_files(&repo, search).await?,
        },
        Commands::Submit {
            repo,
            name,
            description,
            action,
        } => {
            let form = ActionForm {
                repo,
                name,
                description,
                action,
            };
            dashboard.run_submit(form).await?
        }
        Commands::Reset => dashboard.run_reset().await?,
        Commands::Serve | Commands::Completions { .. } => {
            // Handled above
            unreachable!()
        }
    }

    Ok(())
}

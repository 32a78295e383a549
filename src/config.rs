use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use proteus_core::chart::TopNPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_solr_url")]
    pub solr_url: String,
    #[serde(default = "default_drat_url")]
    pub drat_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Rows asked for by the first phase of every load.
    #[serde(default = "default_page_rows")]
    pub page_rows: usize,
    /// Serve queries from a JSON fixture instead of the network.
    #[serde(default)]
    pub fixture: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            solr_url: default_solr_url(),
            drat_url: default_drat_url(),
            timeout_secs: default_timeout_secs(),
            page_rows: default_page_rows(),
            fixture: None,
        }
    }
}

fn default_solr_url() -> String {
    "http://localhost:8983/solr/statistics/select".to_string()
}
fn default_drat_url() -> String {
    "http://localhost:8080/proteus/drat".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_page_rows() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_top_n_fallback")]
    pub top_n_fallback: usize,
    #[serde(default = "default_top_n_max")]
    pub top_n_max: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            top_n_fallback: default_top_n_fallback(),
            top_n_max: default_top_n_max(),
        }
    }
}

fn default_top_n() -> usize {
    10
}
fn default_top_n_fallback() -> usize {
    25
}
fn default_top_n_max() -> usize {
    50
}

impl DashboardConfig {
    pub fn top_n_policy(&self) -> TopNPolicy {
        TopNPolicy {
            default: self.top_n,
            fallback: self.top_n_fallback,
            max: self.top_n_max,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing` filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

impl Config {
    /// All defaults; used when no config file exists.
    pub fn minimal() -> Self {
        Self {
            backend: BackendConfig::default(),
            dashboard: DashboardConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Resolve a relative fixture path against the config file's directory.
    fn resolve_paths(&mut self, config_path: &Path) {
        if let Some(fixture) = &self.backend.fixture {
            if fixture.is_relative() {
                if let Some(dir) = config_path.parent() {
                    self.backend.fixture = Some(dir.join(fixture));
                }
            }
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.resolve_paths(path);

    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    // Validate backend
    if config.backend.fixture.is_none() {
        if config.backend.solr_url.trim().is_empty() {
            anyhow::bail!("backend.solr_url must not be empty");
        }
        if config.backend.drat_url.trim().is_empty() {
            anyhow::bail!("backend.drat_url must not be empty");
        }
    }
    if config.backend.page_rows < 1 {
        anyhow::bail!("backend.page_rows must be >= 1");
    }
    if config.backend.timeout_secs == 0 {
        anyhow::bail!("backend.timeout_secs must be > 0");
    }

    // Validate dashboard
    let d = &config.dashboard;
    if d.top_n_max < 1 {
        anyhow::bail!("dashboard.top_n_max must be >= 1");
    }
    if !(1..=d.top_n_max).contains(&d.top_n) {
        anyhow::bail!("dashboard.top_n must be in [1, {}]", d.top_n_max);
    }
    if !(1..=d.top_n_max).contains(&d.top_n_fallback) {
        anyhow::bail!("dashboard.top_n_fallback must be in [1, {}]", d.top_n_max);
    }

    Ok(())
}

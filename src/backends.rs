use anyhow::{Context, Result};
use std::sync::Arc;

use proteus_core::backend::memory::InMemoryBackend;
use proteus_core::backend::{ActionBackend, SearchBackend};

use crate::config::Config;
use crate::drat::DratClient;
use crate::solr::SolrClient;

/// The two collaborators every command talks to.
#[derive(Clone)]
pub struct Backends {
    pub search: Arc<dyn SearchBackend>,
    pub actions: Arc<dyn ActionBackend>,
}

pub fn connect(config: &Config) -> Result<Backends> {
    let backend = &config.backend;

    // Offline: one in-memory backend answers both roles
    if let Some(path) = &backend.fixture {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture: {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fixture: {}", path.display()))?;
        let memory = Arc::new(InMemoryBackend::from_json(value)?);
        tracing::info!(fixture = %path.display(), docs = memory.len(), "using fixture backend");
        return Ok(Backends {
            search: memory.clone(),
            actions: memory,
        });
    }

    Ok(Backends {
        search: Arc::new(SolrClient::new(&backend.solr_url, backend.timeout_secs)?),
        actions: Arc::new(DratClient::new(&backend.drat_url, backend.timeout_secs)?),
    })
}

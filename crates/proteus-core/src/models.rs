//! Core data models used throughout Proteus.
//!
//! These types represent the audit documents returned by the statistics
//! index, the repository records and action requests sent to the DRAT
//! backend, and the tri-state result of a data load.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Field-name prefix for per-license counts (`license_Apache`, ...).
pub const LICENSE_PREFIX: &str = "license_";
/// Field-name prefix for per-MIME-type counts (`mime_text/plain`, ...).
pub const MIME_PREFIX: &str = "mime_";

/// A flat record from the statistics index.
///
/// Besides `id`, every field is dynamically named. Count fields share a
/// prefix (see [`LICENSE_PREFIX`] and [`MIME_PREFIX`]); descriptive fields
/// (`repo`, `name`, `mimetype`, ...) are plain strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter, mostly for fixtures and tests.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// Numeric value of a field. Absent, null, and non-numeric values are `None`.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(Value::as_f64)
    }

    /// String value of a field.
    ///
    /// Multi-valued fields (JSON arrays) yield their first string element.
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.fields.get(field)? {
            Value::String(s) => Some(s.as_str()),
            Value::Array(items) => items.iter().find_map(Value::as_str),
            _ => None,
        }
    }

    /// Extract the typed `category → value` mapping for one prefix family.
    ///
    /// This is the only place field names are parsed. Fields whose value is
    /// not a number, and a bare prefix with no category suffix, are skipped.
    pub fn categories(&self, prefix: &str) -> CategoryFields {
        let entries = self
            .fields
            .iter()
            .filter_map(|(name, value)| {
                let category = name.strip_prefix(prefix)?;
                if category.is_empty() {
                    return None;
                }
                value.as_f64().map(|v| (category.to_string(), v))
            })
            .collect();
        CategoryFields(entries)
    }
}

/// Numeric category fields of a single document, prefix already stripped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFields(Vec<(String, f64)>);

impl CategoryFields {
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A category/value pair ordered for top-N display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub key: String,
    pub value: f64,
}

impl RankedEntry {
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A project under audit.
///
/// Created when a repository is submitted for processing; read back from
/// `type:project` documents by the projects table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: String,
    pub repo: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "loc_url", default)]
    pub location_url: String,
}

impl RepositoryRecord {
    /// Read a record from a `type:project` document. Documents without a
    /// `repo` field are not projects and yield `None`.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let repo = doc.text("repo")?;
        Some(Self {
            id: doc.id.clone(),
            repo: repo.to_string(),
            name: doc.text("name").unwrap_or_default().to_string(),
            description: doc.text("description").unwrap_or_default().to_string(),
            location_url: doc.text("loc_url").unwrap_or_default().to_string(),
        })
    }
}

/// One file row of a project's detail listing (`parent:"<repo>"` documents).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    /// File location; the document id.
    pub location: String,
    pub mime_type: String,
    pub license: String,
    pub header: String,
}

impl FileRecord {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            location: doc.id.clone(),
            mime_type: doc.text("mimetype").unwrap_or_default().to_string(),
            license: doc.text("license").unwrap_or_default().to_string(),
            header: doc.text("header").unwrap_or_default().to_string(),
        }
    }
}

/// Commands the DRAT backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Go,
    Crawl,
    Index,
    Map,
    Reduce,
    Reset,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        ActionKind::Go,
        ActionKind::Crawl,
        ActionKind::Index,
        ActionKind::Map,
        ActionKind::Reduce,
        ActionKind::Reset,
    ];

    /// Path segment and wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Go => "go",
            ActionKind::Crawl => "crawl",
            ActionKind::Index => "index",
            ActionKind::Map => "map",
            ActionKind::Reduce => "reduce",
            ActionKind::Reset => "reset",
        }
    }

    /// `reset` wipes backend state and carries no payload.
    pub fn is_reset(&self) -> bool {
        matches!(self, ActionKind::Reset)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ActionKind::ALL
            .into_iter()
            .find(|a| a.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown action '{}'. Must be one of: go, crawl, index, map, reduce, reset",
                    s
                )
            })
    }
}

/// A one-shot command for the DRAT backend.
///
/// `data` is the repository record sent as the request body. A fresh
/// UUID is generated for every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRequest {
    pub action: ActionKind,
    pub repo: String,
    pub data: RepositoryRecord,
}

impl ActionRequest {
    pub fn new(action: ActionKind, repo: &str, name: &str, description: &str) -> Self {
        Self {
            action,
            repo: repo.to_string(),
            data: RepositoryRecord {
                id: uuid::Uuid::new_v4().to_string(),
                repo: repo.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                location_url: String::new(),
            },
        }
    }
}

/// Tri-state outcome of a data load.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Loading,
    Success(Vec<Document>),
    Error(String),
}

impl FetchResult {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchResult::Loading)
    }

    pub fn docs(&self) -> Option<&[Document]> {
        match self {
            FetchResult::Success(docs) => Some(docs),
            _ => None,
        }
    }
}

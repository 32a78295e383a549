//! Aggregation of flat audit documents into grouped totals.
//!
//! Two aggregations feed the charts:
//!
//! 1. [`total_by_category`] sums every prefixed count field across a
//!    document set (`license_*` or `mime_*`) into a [`CategoryTotals`].
//! 2. [`group_by_project`] sums a fixed list of series per project, where
//!    the project name is derived from the document id.
//!
//! Totals are order-independent: any permutation of the input yields the
//! same per-category sums. Only the first-appearance order of categories
//! (used to break ties when ranking) depends on input order.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{Document, RankedEntry};

/// License series shown by the audit summary, in legend order.
pub const LICENSE_SERIES: [&str; 7] = [
    "Standards",
    "Apache",
    "Binaries",
    "Generated",
    "Unknown",
    "Archives",
    "Notes",
];

/// Per-category sums, remembering the order categories were first seen.
#[derive(Debug, Clone, Default)]
pub struct CategoryTotals {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `value` into `category`.
    ///
    /// An unseen category starts at the first observed value.
    pub fn add(&mut self, category: &str, value: f64) {
        match self.index.get(category) {
            Some(&i) => self.entries[i].1 += value,
            None => {
                self.index.insert(category.to_string(), self.entries.len());
                self.entries.push((category.to_string(), value));
            }
        }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.index.get(category).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Categories in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// All categories sorted by descending value.
    ///
    /// The sort is stable, so equal values keep first-appearance order.
    pub fn ranked(&self) -> Vec<RankedEntry> {
        let mut ranked: Vec<RankedEntry> = self
            .entries
            .iter()
            .map(|(k, v)| RankedEntry::new(k.clone(), *v))
            .collect();
        ranked.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
        ranked
    }
}

impl<'a> FromIterator<(&'a str, f64)> for CategoryTotals {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        let mut totals = CategoryTotals::new();
        for (k, v) in iter {
            totals.add(k, v);
        }
        totals
    }
}

/// Equal when both hold the same categories with the same sums,
/// regardless of first-appearance order.
impl PartialEq for CategoryTotals {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Serialize for CategoryTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Sum every `<prefix><category>` count field across `docs`.
///
/// Non-numeric and absent values never increment a category. Empty input
/// yields empty totals.
pub fn total_by_category(docs: &[Document], prefix: &str) -> CategoryTotals {
    let mut totals = CategoryTotals::new();
    for doc in docs {
        for (category, value) in doc.categories(prefix).iter() {
            totals.add(category, value);
        }
    }
    totals
}

/// Project name derived from a document id.
///
/// The last `/`-separated segment, unless it starts with `part` (a split
/// archive chunk), in which case the segment before it.
pub fn project_name(id: &str) -> &str {
    let mut segments = id.rsplit('/');
    let last = segments.next().unwrap_or(id);
    if last.starts_with("part") {
        segments.next().unwrap_or(last)
    } else {
        last
    }
}

/// One named series of per-project values.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

/// Per-project, per-series sums. `series[s].values[p]` belongs to
/// `labels[p]`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ProjectBreakdown {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl ProjectBreakdown {
    fn with_series(series: &[&str]) -> Self {
        Self {
            labels: Vec::new(),
            series: series
                .iter()
                .map(|label| Series {
                    label: label.to_string(),
                    values: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }
}

/// Group consecutive documents sharing a project name, summing the
/// `<prefix><series>` fields of each group in lockstep.
///
/// Grouping is adjacency-based: `docs` must already be sorted by `id`
/// ascending or a project split across the input shows up as several
/// groups. [`group_by_project`] sorts first.
pub fn group_adjacent_by_project(
    docs: &[&Document],
    prefix: &str,
    series: &[&str],
) -> ProjectBreakdown {
    let mut out = ProjectBreakdown::with_series(series);
    let fields: Vec<String> = series.iter().map(|s| format!("{}{}", prefix, s)).collect();

    for doc in docs {
        let name = project_name(&doc.id);
        let continues_group = out.labels.last().map(String::as_str) == Some(name);

        if !continues_group {
            out.labels.push(name.to_string());
            for s in &mut out.series {
                s.values.push(0.0);
            }
        }

        for (s, field) in out.series.iter_mut().zip(&fields) {
            if let (Some(v), Some(last)) = (doc.number(field), s.values.last_mut()) {
                *last += v;
            }
        }
    }

    out
}

/// Sort `docs` by id, then group adjacent documents by project.
pub fn group_by_project(docs: &[Document], prefix: &str, series: &[&str]) -> ProjectBreakdown {
    let mut sorted: Vec<&Document> = docs.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));
    group_adjacent_by_project(&sorted, prefix, series)
}

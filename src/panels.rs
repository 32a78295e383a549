//! Dashboard panels.
//!
//! Each panel pairs a statistics query with the chart it feeds:
//!
//! | Panel | Query | Output |
//! |-------|-------|--------|
//! | [`ProjectsTable`] | `type:project` | filtered [`RepositoryRecord`] rows |
//! | [`LicenseTypes`] | `type:project`, `fl=license_*` | [`PieChart`] of non-zero licenses |
//! | [`TopMimeTypes`] | `type:project`, `fl=mime_*` | top-N [`PieChart`] or empty |
//! | [`AllMimeTypes`] | `type:project`, `fl=mime_*` | [`BubbleTree`] |
//! | [`AuditSummary`] | `type:software`, `fl=id,license_*`, sorted by id | [`GroupedBarChart`] |
//! | [`ProjectFiles`] | `parent:"<repo>"` | [`FileRecord`] rows |

use serde::Serialize;

use proteus_core::aggregate::{group_by_project, total_by_category, LICENSE_SERIES};
use proteus_core::backend::SolrQuery;
use proteus_core::chart::{
    bubble_hierarchy, non_zero_ranked, top_n, zip_series, BarLayout, BubbleTree,
    GroupedBarChart, PieChart, TopN, TopNView,
};
use proteus_core::models::{Document, FileRecord, RepositoryRecord, LICENSE_PREFIX, MIME_PREFIX};

use crate::view::Panel;

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

// ============ Projects ============

#[derive(Debug, Clone, Default)]
pub struct ProjectsTable {
    pub search: String,
    /// Repository of the selected row.
    pub selected: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectsView {
    pub rows: Vec<RepositoryRecord>,
    pub selected: Option<RepositoryRecord>,
}

impl ProjectsTable {
    pub fn matches(&self, record: &RepositoryRecord) -> bool {
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || contains_ci(&record.repo, &needle)
            || contains_ci(&record.name, &needle)
            || contains_ci(&record.description, &needle)
    }
}

impl Panel for ProjectsTable {
    type Output = ProjectsView;

    fn name(&self) -> &'static str {
        "projects"
    }

    fn query(&self) -> SolrQuery {
        SolrQuery::new("type:project")
    }

    fn build(&self, docs: &[Document]) -> ProjectsView {
        let rows: Vec<RepositoryRecord> = docs
            .iter()
            .filter_map(RepositoryRecord::from_document)
            .filter(|r| self.matches(r))
            .collect();
        let selected = self
            .selected
            .as_deref()
            .and_then(|repo| rows.iter().find(|r| r.repo == repo).cloned());
        ProjectsView { rows, selected }
    }
}

// ============ Licenses ============

#[derive(Debug, Clone, Default)]
pub struct LicenseTypes;

impl Panel for LicenseTypes {
    type Output = PieChart;

    fn name(&self) -> &'static str {
        "licenses"
    }

    fn query(&self) -> SolrQuery {
        SolrQuery::new("type:project").fields(format!("{}*", LICENSE_PREFIX))
    }

    fn build(&self, docs: &[Document]) -> PieChart {
        let totals = total_by_category(docs, LICENSE_PREFIX);
        PieChart::from_entries(&non_zero_ranked(&totals))
    }
}

// ============ MIME types ============

#[derive(Debug, Clone)]
pub struct TopMimeTypes {
    pub count: TopN,
}

/// The top MIME types chart, or nothing while the count field is blank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "chart")]
pub enum TopMimeChart {
    Empty,
    Pie(PieChart),
}

impl TopMimeChart {
    pub fn is_empty(&self) -> bool {
        matches!(self, TopMimeChart::Empty)
    }
}

impl Panel for TopMimeTypes {
    type Output = TopMimeChart;

    fn name(&self) -> &'static str {
        "mime-top"
    }

    fn query(&self) -> SolrQuery {
        SolrQuery::new("type:project").fields(format!("{}*", MIME_PREFIX))
    }

    fn build(&self, docs: &[Document]) -> TopMimeChart {
        let totals = total_by_category(docs, MIME_PREFIX);
        match top_n(&totals, self.count) {
            TopNView::Empty => TopMimeChart::Empty,
            TopNView::Ranked(entries) => TopMimeChart::Pie(PieChart::from_entries(&entries)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AllMimeTypes;

impl Panel for AllMimeTypes {
    type Output = BubbleTree;

    fn name(&self) -> &'static str {
        "mime-all"
    }

    fn query(&self) -> SolrQuery {
        SolrQuery::new("type:project").fields(format!("{}*", MIME_PREFIX))
    }

    fn build(&self, docs: &[Document]) -> BubbleTree {
        bubble_hierarchy(&total_by_category(docs, MIME_PREFIX))
    }
}

// ============ Audit ============

#[derive(Debug, Clone, Default)]
pub struct AuditSummary {
    pub layout: BarLayout,
}

impl Panel for AuditSummary {
    type Output = GroupedBarChart;

    fn name(&self) -> &'static str {
        "audit"
    }

    fn query(&self) -> SolrQuery {
        SolrQuery::new("type:software")
            .fields(format!("id,{}*", LICENSE_PREFIX))
            .sort_asc("id")
    }

    fn build(&self, docs: &[Document]) -> GroupedBarChart {
        let breakdown = group_by_project(docs, LICENSE_PREFIX, &LICENSE_SERIES);
        self.layout.layout(zip_series(&breakdown))
    }
}

// ============ Project files ============

#[derive(Debug, Clone, Default)]
pub struct ProjectFiles {
    pub repo: String,
    pub search: String,
}

impl ProjectFiles {
    pub fn new(repo: &str) -> Self {
        Self {
            repo: repo.to_string(),
            search: String::new(),
        }
    }

    fn matches(&self, file: &FileRecord) -> bool {
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || contains_ci(&file.location, &needle)
            || contains_ci(&file.mime_type, &needle)
            || contains_ci(&file.license, &needle)
    }
}

impl Panel for ProjectFiles {
    type Output = Vec<FileRecord>;

    fn name(&self) -> &'static str {
        "files"
    }

    fn query(&self) -> SolrQuery {
        SolrQuery::parent(&self.repo)
    }

    fn build(&self, docs: &[Document]) -> Vec<FileRecord> {
        docs.iter()
            .map(FileRecord::from_document)
            .filter(|f| self.matches(f))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, repo: &str, name: &str, description: &str) -> Document {
        Document::new(id)
            .with("type", "project")
            .with("repo", repo)
            .with("name", name)
            .with("description", description)
    }

    #[test]
    fn projects_filter_is_case_insensitive() {
        let docs = vec![
            project("1", "/repos/tika", "Tika", "content detection"),
            project("2", "/repos/oodt", "OODT", "Data management"),
            Document::new("3").with("type", "project"),
        ];
        let mut panel = ProjectsTable {
            search: "DATA".into(),
            selected: Some("/repos/oodt".into()),
        };
        let view = panel.build(&docs);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].name, "OODT");
        assert_eq!(view.selected.as_ref().map(|r| r.id.as_str()), Some("2"));

        panel.search = "tika".into();
        let view = panel.build(&docs);
        assert_eq!(view.rows.len(), 1);
        assert!(view.selected.is_none());
    }

    #[test]
    fn license_pie_drops_zero_categories() {
        let docs = vec![
            Document::new("a").with("license_Apache", 4).with("license_GPL", 0),
            Document::new("b").with("license_Apache", 1).with("license_MIT", 2),
        ];
        let pie = LicenseTypes.build(&docs);
        let keys: Vec<&str> = pie.slices.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["Apache", "MIT"]);
        assert_eq!(pie.total, 7.0);
    }

    #[test]
    fn top_mime_respects_count_and_blank() {
        let docs = vec![Document::new("p")
            .with("mime_a", 5)
            .with("mime_b", 1)
            .with("mime_c", 9)
            .with("mime_d", 0)];
        let chart = TopMimeTypes { count: TopN::Count(3) }.build(&docs);
        match chart {
            TopMimeChart::Pie(pie) => {
                let keys: Vec<&str> = pie.slices.iter().map(|s| s.key.as_str()).collect();
                assert_eq!(keys, vec!["c", "a", "b"]);
            }
            TopMimeChart::Empty => panic!("expected a pie"),
        }
        assert!(TopMimeTypes { count: TopN::Blank }.build(&docs).is_empty());
    }

    #[test]
    fn audit_query_is_sorted_software() {
        let q = AuditSummary::default().query();
        assert_eq!(q.q, "type:software");
        assert_eq!(q.fl.as_deref(), Some("id,license_*"));
        assert_eq!(q.sort.as_deref(), Some("id"));
    }

    #[test]
    fn audit_groups_by_project() {
        let docs = vec![
            Document::new("/r/tika/part0").with("license_Apache", 3),
            Document::new("/r/oodt").with("license_Apache", 1),
            Document::new("/r/tika/part1").with("license_Apache", 2),
        ];
        let chart = AuditSummary::default().build(&docs);
        assert_eq!(chart.data.labels, vec!["oodt", "tika"]);
        assert_eq!(chart.data.max, 5.0);
    }

    #[test]
    fn files_query_targets_parent() {
        let q = ProjectFiles::new("/repos/tika").query();
        assert_eq!(q.q, "parent:\"/repos/tika\"");

        let docs = vec![
            Document::new("/repos/tika/a.txt").with("mimetype", "text/plain"),
            Document::new("/repos/tika/b.png").with("mimetype", "image/png"),
        ];
        let panel = ProjectFiles {
            repo: "/repos/tika".into(),
            search: "IMAGE".into(),
        };
        let files = panel.build(&docs);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].location, "/repos/tika/b.png");
    }
}

//! Terminal rendering of panel output.
//!
//! Each `render_*` function returns the full text for one panel so the CLI
//! can print it and tests can inspect it. Counts use thousands grouping.
//! `--json` output bypasses these and prints the chart structures as-is.

use std::fmt::Write as _;

use proteus_core::chart::{format_count, BubbleTree, GroupedBarChart, PieChart};
use proteus_core::models::FileRecord;
use proteus_core::state::AppState;

use crate::panels::{ProjectsView, TopMimeChart};

/// Width of the widest bar in the audit chart, in characters.
const BAR_COLUMNS: f64 = 40.0;

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

pub fn render_projects(view: &ProjectsView) -> String {
    let mut out = String::new();
    heading(&mut out, "Projects");
    if view.rows.is_empty() {
        out.push_str("  No projects.\n");
        return out;
    }
    let _ = writeln!(out, "  {:<32} {:<24} {}", "REPO", "NAME", "DESCRIPTION");
    let _ = writeln!(out, "  {}", "-".repeat(88));
    for r in &view.rows {
        let _ = writeln!(
            out,
            "  {:<32} {:<24} {}",
            truncate(&r.repo, 32),
            truncate(&r.name, 24),
            truncate(&r.description, 40)
        );
    }
    let _ = writeln!(out, "\n  {} projects", format_count(view.rows.len() as f64));

    if let Some(selected) = &view.selected {
        out.push('\n');
        let _ = writeln!(out, "  Selected:    {}", selected.repo);
        let _ = writeln!(out, "  Name:        {}", selected.name);
        let _ = writeln!(out, "  Description: {}", selected.description);
        if !selected.location_url.is_empty() {
            let _ = writeln!(out, "  Location:    {}", selected.location_url);
        }
    }
    out
}

pub fn render_pie(title: &str, pie: &PieChart) -> String {
    let mut out = String::new();
    heading(&mut out, title);
    if pie.slices.is_empty() {
        out.push_str("  No data.\n");
        return out;
    }
    let _ = writeln!(out, "  {:<40} {:>12} {:>7}", "CATEGORY", "COUNT", "SHARE");
    let _ = writeln!(out, "  {}", "-".repeat(61));
    for s in &pie.slices {
        let _ = writeln!(
            out,
            "  {:<40} {:>12} {:>6.1}%",
            truncate(&s.key, 40),
            format_count(s.value),
            s.fraction * 100.0
        );
    }
    let _ = writeln!(out, "  {}", "-".repeat(61));
    let _ = writeln!(out, "  {:<40} {:>12}", "TOTAL", format_count(pie.total));
    out
}

pub fn render_top_mime(chart: &TopMimeChart) -> String {
    match chart {
        TopMimeChart::Pie(pie) => render_pie("Top MIME types", pie),
        TopMimeChart::Empty => {
            let mut out = String::new();
            heading(&mut out, "Top MIME types");
            out.push_str("  Enter a count to show the top MIME types.\n");
            out
        }
    }
}

pub fn render_bubbles(tree: &BubbleTree) -> String {
    let mut out = String::new();
    heading(&mut out, "All MIME types");
    let mut leaves = tree.leaves();
    if leaves.is_empty() {
        out.push_str("  No data.\n");
        return out;
    }
    leaves.sort_by(|a, b| b.value.total_cmp(&a.value));
    let _ = writeln!(out, "  {:<48} {:>12}", "MIME TYPE", "COUNT");
    let _ = writeln!(out, "  {}", "-".repeat(61));
    for leaf in &leaves {
        let _ = writeln!(
            out,
            "  {:<48} {:>12}",
            truncate(&leaf.class, 48),
            format_count(leaf.value)
        );
    }
    out
}

pub fn render_audit(chart: &GroupedBarChart) -> String {
    let mut out = String::new();
    heading(&mut out, "Audit summary");
    if chart.bars.is_empty() {
        out.push_str("  No audited software.\n");
        return out;
    }
    let full_width = chart
        .bars
        .iter()
        .map(|b| b.width)
        .fold(0.0_f64, f64::max)
        .max(1.0);

    for bar in &chart.bars {
        if let Some(label) = &bar.label {
            let _ = writeln!(out, "  {}", label);
        }
        let series = chart
            .data
            .series
            .get(bar.series)
            .map(String::as_str)
            .unwrap_or_default();
        let cells = (bar.width / full_width * BAR_COLUMNS).round() as usize;
        let _ = writeln!(
            out,
            "    {:<16} {:>10} {}",
            series,
            format_count(bar.value),
            "█".repeat(cells)
        );
    }
    out
}

pub fn render_files(repo: &str, files: &[FileRecord]) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("Files in {}", repo));
    if files.is_empty() {
        out.push_str("  No files.\n");
        return out;
    }
    let _ = writeln!(out, "  {:<48} {:<24} {}", "LOCATION", "MIME TYPE", "LICENSE");
    let _ = writeln!(out, "  {}", "-".repeat(92));
    for f in files {
        let _ = writeln!(
            out,
            "  {:<48} {:<24} {}",
            truncate(&f.location, 48),
            truncate(&f.mime_type, 24),
            f.license
        );
    }
    let _ = writeln!(out, "\n  {} files", format_count(files.len() as f64));
    out
}

pub fn render_state(state: &AppState) -> String {
    let mut out = String::new();
    let view = serde_json::to_value(state.current_view)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let _ = writeln!(out, "  View:        {}", view);
    let _ = writeln!(
        out,
        "  Repository:  {}",
        state.current_repo.as_deref().unwrap_or("-")
    );
    let _ = writeln!(
        out,
        "  Action:      {}",
        state
            .current_action
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    let _ = writeln!(out, "  Progress:    {}", if state.progress { "on" } else { "off" });
    let _ = writeln!(out, "  Updated:     {}", state.updated_at.to_rfc3339());
    out
}

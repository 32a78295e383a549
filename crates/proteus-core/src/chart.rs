//! Chart data builders.
//!
//! Turns aggregator output into the shapes a chart renderer consumes:
//!
//! - **Top-N pie**: [`top_n`] ranks a [`CategoryTotals`] and
//!   [`PieChart::from_entries`] lays the entries out as angular slices.
//! - **Bubble hierarchy**: [`bubble_hierarchy`] wraps each category as a
//!   single-leaf subtree under a synthetic root, ready for circle packing.
//! - **Grouped bars**: [`zip_series`] interleaves per-project series into
//!   one `project × series` sequence; [`BarLayout`] computes bar geometry
//!   and legend rows for it.
//!
//! All values are non-negative counts. Builders never filter zero values
//! except where a ranked view explicitly drops them.

use serde::Serialize;
use std::f64::consts::TAU;

use crate::aggregate::{CategoryTotals, ProjectBreakdown};
use crate::models::RankedEntry;

// ============ Top-N ============

/// Bounds and defaults for the user-adjustable top-N count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopNPolicy {
    /// Count shown before the user edits anything.
    pub default: usize,
    /// Count used when the input is out of range or not a number.
    pub fallback: usize,
    /// Largest accepted count. The smallest is 1.
    pub max: usize,
}

impl Default for TopNPolicy {
    fn default() -> Self {
        Self {
            default: 10,
            fallback: 25,
            max: 50,
        }
    }
}

/// Requested top-N count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "count")]
pub enum TopN {
    /// The input field is empty (edit in progress).
    Blank,
    Count(usize),
}

impl TopNPolicy {
    pub fn initial(&self) -> TopN {
        TopN::Count(self.default)
    }

    /// Interpret raw user input.
    ///
    /// Blank input stays [`TopN::Blank`]. Anything outside `1..=max` or
    /// not a whole number resets to `fallback`.
    pub fn parse(&self, input: &str) -> TopN {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return TopN::Blank;
        }
        match trimmed.parse::<usize>() {
            Ok(n) if (1..=self.max).contains(&n) => TopN::Count(n),
            _ => TopN::Count(self.fallback),
        }
    }
}

/// Result of a top-N request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "entries")]
pub enum TopNView {
    /// Nothing to draw; the caller shows an empty-state placeholder.
    Empty,
    Ranked(Vec<RankedEntry>),
}

/// Ranked entries with the zero-valued tail dropped.
pub fn non_zero_ranked(totals: &CategoryTotals) -> Vec<RankedEntry> {
    totals
        .ranked()
        .into_iter()
        .take_while(|e| e.value > 0.0)
        .collect()
}

/// The `n` largest non-zero categories in descending order.
pub fn top_n(totals: &CategoryTotals, n: TopN) -> TopNView {
    match n {
        TopN::Blank => TopNView::Empty,
        TopN::Count(count) => {
            TopNView::Ranked(non_zero_ranked(totals).into_iter().take(count).collect())
        }
    }
}

// ============ Pie ============

/// One slice of a pie, angles in radians clockwise from 12 o'clock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub key: String,
    pub value: f64,
    pub fraction: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub total: f64,
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    /// Lay out slices in input order. An all-zero input produces
    /// zero-width slices rather than NaN angles.
    pub fn from_entries(entries: &[RankedEntry]) -> Self {
        let total: f64 = entries.iter().map(|e| e.value).sum();
        let mut angle = 0.0;
        let slices = entries
            .iter()
            .map(|e| {
                let fraction = if total > 0.0 { e.value / total } else { 0.0 };
                let start_angle = angle;
                angle += fraction * TAU;
                PieSlice {
                    key: e.key.clone(),
                    value: e.value,
                    fraction,
                    start_angle,
                    end_angle: angle,
                }
            })
            .collect();
        Self { total, slices }
    }
}

// ============ Bubble ============

/// Name of the synthetic root of a bubble hierarchy.
pub const BUBBLE_ROOT: &str = "root";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleLeaf {
    pub name: String,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleGroup {
    pub name: String,
    pub children: Vec<BubbleLeaf>,
}

/// Three-level tree: root → one group per category → one leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleTree {
    pub name: String,
    pub children: Vec<BubbleGroup>,
}

/// Flattened leaf as fed to a circle-packing layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleClass {
    pub package: String,
    pub class: String,
    pub value: f64,
}

impl BubbleTree {
    pub fn leaves(&self) -> Vec<BubbleClass> {
        self.children
            .iter()
            .flat_map(|group| {
                group.children.iter().map(move |leaf| BubbleClass {
                    package: group.name.clone(),
                    class: leaf.name.clone(),
                    value: leaf.size,
                })
            })
            .collect()
    }
}

/// Wrap every category as a single-leaf subtree. Sizes are passed through
/// untouched; callers filter zeros beforehand if they want to.
pub fn bubble_hierarchy(totals: &CategoryTotals) -> BubbleTree {
    BubbleTree {
        name: BUBBLE_ROOT.to_string(),
        children: totals
            .iter()
            .map(|(name, size)| BubbleGroup {
                name: name.to_string(),
                children: vec![BubbleLeaf {
                    name: name.to_string(),
                    size,
                }],
            })
            .collect(),
    }
}

// ============ Grouped bars ============

/// Series values interleaved as `project × series`.
///
/// `zipped[p * series.len() + s]` is series `s` of project `p`, so every
/// run of `series.len()` values is one project group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedBars {
    pub labels: Vec<String>,
    pub series: Vec<String>,
    pub zipped: Vec<f64>,
    pub max: f64,
}

impl GroupedBars {
    pub fn group_of(&self, i: usize) -> usize {
        i / self.series.len().max(1)
    }

    pub fn series_of(&self, i: usize) -> usize {
        i % self.series.len().max(1)
    }
}

pub fn zip_series(breakdown: &ProjectBreakdown) -> GroupedBars {
    let mut zipped = Vec::with_capacity(breakdown.labels.len() * breakdown.series.len());
    for p in 0..breakdown.labels.len() {
        for s in &breakdown.series {
            zipped.push(s.values.get(p).copied().unwrap_or(0.0));
        }
    }
    let max = zipped.iter().copied().fold(0.0, f64::max);
    GroupedBars {
        labels: breakdown.labels.clone(),
        series: breakdown.series.iter().map(|s| s.label.clone()).collect(),
        zipped,
        max,
    }
}

/// Geometry constants for the horizontal grouped bar chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarLayout {
    pub bar_height: f64,
    pub gap_between_groups: f64,
    pub chart_width: f64,
    pub legend_rect_size: f64,
    pub legend_spacing: f64,
}

impl Default for BarLayout {
    fn default() -> Self {
        Self {
            bar_height: 25.0,
            gap_between_groups: 25.0,
            chart_width: 600.0,
            legend_rect_size: 18.0,
            legend_spacing: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub value: f64,
    pub group: usize,
    /// Series index; also the legend colour index.
    pub series: usize,
    pub y: f64,
    pub width: f64,
    /// Project label, set on the first bar of each group only.
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendRow {
    pub label: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedBarChart {
    pub data: GroupedBars,
    pub bars: Vec<Bar>,
    pub legend: Vec<LegendRow>,
    pub height: f64,
}

impl BarLayout {
    pub fn layout(&self, data: GroupedBars) -> GroupedBarChart {
        let per_group = data.series.len().max(1);
        let bars = data
            .zipped
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let group = data.group_of(i);
                let series = data.series_of(i);
                let width = if data.max > 0.0 {
                    (value / data.max * self.chart_width).max(0.0)
                } else {
                    0.0
                };
                Bar {
                    value,
                    group,
                    series,
                    y: i as f64 * self.bar_height
                        + self.gap_between_groups * (0.5 + (i / per_group) as f64),
                    width,
                    label: (series == 0).then(|| data.labels.get(group).cloned()).flatten(),
                }
            })
            .collect();

        let row = self.legend_rect_size + self.legend_spacing;
        let legend = data
            .series
            .iter()
            .enumerate()
            .map(|(i, label)| LegendRow {
                label: label.clone(),
                y: i as f64 * row + self.gap_between_groups / 2.0,
            })
            .collect();

        let height = self.bar_height * data.zipped.len() as f64
            + self.gap_between_groups * data.labels.len() as f64;

        GroupedBarChart {
            data,
            bars,
            legend,
            height,
        }
    }
}

// ============ Formatting ============

/// Render a count with thousands grouping (`1234567` → `"1,234,567"`).
pub fn format_count(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut result = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    if rounded < 0.0 {
        result.insert(0, '-');
    }
    result
}

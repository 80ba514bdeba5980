// src/chart.rs

//! Bar chart data for the crop ranking.
//!
//! Produces labels, percentage values, per-bar colors and the fixed chart
//! titles; drawing is left to whatever front end consumes [`ChartData`].

use serde::Serialize;

use crate::models::RankedCrop;

pub const CHART_TITLE: &str = "Top Crop Recommendations";
pub const DATASET_LABEL: &str = "Confidence (%)";
pub const X_AXIS_TITLE: &str = "Crops";
pub const Y_AXIS_TITLE: &str = "Confidence (%)";
/// The y axis always spans `0..=Y_AXIS_MAX`.
pub const Y_AXIS_MAX: f64 = 100.0;

/// Fill and border color of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BarColor {
    pub fill: &'static str,
    pub border: &'static str,
}

const PALETTE: [BarColor; 3] = [
    BarColor {
        fill: "rgba(75, 192, 192, 0.6)",
        border: "rgba(75, 192, 192, 1)",
    },
    BarColor {
        fill: "rgba(54, 162, 235, 0.6)",
        border: "rgba(54, 162, 235, 1)",
    },
    BarColor {
        fill: "rgba(255, 206, 86, 0.6)",
        border: "rgba(255, 206, 86, 1)",
    },
];

/// Color for the bar at rank `index` (0-based), cycling through the palette.
pub fn palette_color(index: usize) -> BarColor {
    PALETTE[index % PALETTE.len()]
}

/// Series data and display metadata for a single-dataset bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub title: &'static str,
    pub dataset_label: &'static str,
    pub x_axis_title: &'static str,
    pub y_axis_title: &'static str,
    /// Upper bound of the y axis, which starts at 0
    pub y_max: f64,
    pub labels: Vec<String>,
    /// Confidence percentages, one decimal
    pub values: Vec<f64>,
    pub colors: Vec<BarColor>,
}

impl ChartData {
    /// `(label, value, color)` per bar in rank order.
    pub fn bars(&self) -> impl Iterator<Item = (&str, f64, BarColor)> + '_ {
        self.labels
            .iter()
            .zip(&self.values)
            .zip(&self.colors)
            .map(|((label, value), color)| (label.as_str(), *value, *color))
    }
}

/// Confidence in `0..=1` as a percentage rounded to one decimal.
pub fn confidence_percent(confidence: f64) -> f64 {
    (confidence * 100.0 * 10.0).round() / 10.0
}

/// Build chart data from a ranking; `None` when there is nothing to plot.
pub fn build_chart(ranking: &[RankedCrop]) -> Option<ChartData> {
    if ranking.is_empty() {
        return None;
    }

    Some(ChartData {
        title: CHART_TITLE,
        dataset_label: DATASET_LABEL,
        x_axis_title: X_AXIS_TITLE,
        y_axis_title: Y_AXIS_TITLE,
        y_max: Y_AXIS_MAX,
        labels: ranking.iter().map(|r| r.crop().to_string()).collect(),
        values: ranking
            .iter()
            .map(|r| confidence_percent(r.confidence()))
            .collect(),
        colors: (0..ranking.len()).map(palette_color).collect(),
    })
}

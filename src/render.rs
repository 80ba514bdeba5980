// src/render.rs

//! Plain-text views of the form state.
//!
//! Every function returns a `String` so the terminal front end only prints.

use std::fmt::Write;

use crate::chart::{ChartData, build_chart};
use crate::controller::{AppState, Banner, ResultsPanel};
use crate::models::{
    CropCatalog, CropInfo, HealthStatus, InputModel, RecommendationResult, SensorReading,
    ServiceStats,
};

const RULE_WIDTH: usize = 60;

fn header(out: &mut String, title: &str) {
    let border = "═".repeat(RULE_WIDTH);
    let _ = writeln!(out, "{border}");
    let _ = writeln!(out, "  {title}");
    let _ = writeln!(out, "{border}");
}

fn separator(out: &mut String) {
    let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));
}

/// The seven inputs with their current text and range hints.
pub fn render_form(input: &InputModel) -> String {
    let mut out = String::new();
    header(&mut out, "Enter Soil & Climate Parameters");
    for (field, value) in input.iter() {
        let shown = if value.is_empty() { "—" } else { value };
        let _ = writeln!(
            out,
            "  {:<12} {:<22} {:>10}   {}",
            field.name(),
            field.label(),
            shown,
            field.hint()
        );
    }
    out
}

pub fn render_banner(banner: Banner) -> String {
    format!("⚠️  {banner}")
}

/// Button captions, reflecting which channel is busy.
pub fn render_controls(state: &AppState) -> String {
    let submit = if state.is_submitting() {
        "🔄 Getting Recommendation..."
    } else {
        "🌱 Get Crop Recommendation"
    };
    let sensor = if state.is_fetching_sensor() {
        "🔄 Fetching Sensor Data..."
    } else {
        "📡 Fetch Sensor Data"
    };
    format!("  [submit] {submit}    [sensor] {sensor}")
}

pub fn render_sensor(reading: &SensorReading) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📊 Current Sensor Data");
    let _ = writeln!(out, "    Soil Moisture: {}", reading.soil_moisture);
    let _ = writeln!(out, "    Temperature: {}°C", reading.temperature);
    let _ = writeln!(out, "    Humidity: {}%", reading.humidity);
    let _ = writeln!(out, "    Rain Value: {}", reading.rain_value);
    let _ = writeln!(
        out,
        "    Timestamp: {}",
        reading.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    out
}

fn render_crop_info(out: &mut String, info: &CropInfo) {
    let rows = info.rows();
    if rows.is_empty() {
        return;
    }
    let _ = writeln!(out, "🌱 Crop Information");
    for (label, value) in rows {
        let _ = writeln!(out, "    {label:<20} {value}");
    }
}

/// Horizontal text bars, `bar_width` characters for 100%.
pub fn render_chart(chart: &ChartData, bar_width: usize) -> String {
    let mut out = String::new();
    let label_width = chart
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);

    let _ = writeln!(out, "{}", chart.title);
    let _ = writeln!(out, "  {:<label_width$}  █ {}", "", chart.dataset_label);
    for (label, value, _) in chart.bars() {
        let filled = ((value / chart.y_max) * bar_width as f64).round() as usize;
        let filled = filled.min(bar_width);
        let _ = writeln!(
            out,
            "  {label:<label_width$} │{}{} {value:.1}%",
            "█".repeat(filled),
            " ".repeat(bar_width - filled),
        );
    }
    let _ = writeln!(
        out,
        "  {:<label_width$}  {} vs {}, 0-{}",
        "",
        chart.x_axis_title,
        chart.y_axis_title,
        chart.y_max
    );
    out
}

/// Result card: top crop, its reference info, ranking and chart.
pub fn render_result(result: &RecommendationResult, bar_width: usize) -> String {
    let mut out = String::new();
    header(&mut out, "Recommended Crop");
    let _ = writeln!(out, "  {}", result.recommendation);
    let _ = writeln!(out, "  Confidence: {:.1}%", result.confidence * 100.0);

    if let Some(info) = result.top_crop_info() {
        separator(&mut out);
        render_crop_info(&mut out, info);
    }

    let ranking = result.ranking();
    if ranking.len() > 1 {
        separator(&mut out);
        let _ = writeln!(out, "Top {} Recommendations", ranking.len());
        for (rank, entry) in ranking.iter().enumerate() {
            let _ = writeln!(
                out,
                "    #{} {:<16} {:.1}%",
                rank + 1,
                entry.crop(),
                entry.confidence() * 100.0
            );
        }
        if let Some(chart) = build_chart(ranking) {
            let _ = writeln!(out);
            out.push_str(&render_chart(&chart, bar_width));
        }
    }
    out
}

/// Whole screen for the current state.
pub fn render_state(state: &AppState, bar_width: usize) -> String {
    let mut out = render_form(state.input());
    if let Some(banner) = state.banner() {
        let _ = writeln!(out, "{}", render_banner(banner));
    }
    let _ = writeln!(out, "{}", render_controls(state));

    if let Some(reading) = state.sensor() {
        separator(&mut out);
        out.push_str(&render_sensor(reading));
    }

    let _ = writeln!(out);
    match state.results_panel() {
        ResultsPanel::Loading => {
            let _ = writeln!(out, "  Analyzing your data...");
        }
        ResultsPanel::Result(result) => out.push_str(&render_result(result, bar_width)),
        ResultsPanel::Placeholder => {
            let _ = writeln!(
                out,
                "  Enter soil and climate parameters to get crop recommendations"
            );
        }
    }
    out
}

pub fn render_health(health: &HealthStatus) -> String {
    let mut out = String::new();
    let mark = if health.success { "✓" } else { "✗" };
    let _ = writeln!(out, "{mark} {}", health.message);
    if let Some(status) = &health.model_status {
        let _ = writeln!(out, "    Model: {status}");
    }
    if let Some(ts) = &health.timestamp {
        let _ = writeln!(out, "    Server time: {ts}");
    }
    out
}

pub fn render_stats(stats: &ServiceStats) -> String {
    let mut out = String::new();
    header(&mut out, "Service statistics");
    if let Some(model) = &stats.model_type {
        let _ = writeln!(out, "  Model:    {model}");
    }
    let _ = writeln!(out, "  Features: {}", stats.features.join(", "));
    let _ = writeln!(out, "  Crops:    {}", stats.total_crops);
    for crop in &stats.crops {
        let _ = writeln!(out, "    - {crop}");
    }
    out
}

pub fn render_catalog(catalog: &CropCatalog) -> String {
    let mut out = String::new();
    header(&mut out, &format!("{} crops", catalog.crops.len()));
    for crop in &catalog.crops {
        let _ = writeln!(out, "  {crop}");
        if let Some(info) = catalog.crop_info.get(crop) {
            for (label, value) in info.rows() {
                let _ = writeln!(out, "      {label:<20} {value}");
            }
        }
    }
    out
}

//! Plain-text rendering of metric summaries for the terminal

use std::fmt::Write;

use crate::services::dashboard::{DashboardView, Section};
use crate::services::{LoadResult, Provenance, RecordIssue};
use crate::types::{CategoryCount, Counters, DailyDetail, Dimension, Leaderboard, MetricSummary, Trend};

const BAR_WIDTH: usize = 30;
const LABEL_WIDTH: usize = 24;

/// One-line note about where the records came from (empty for live data)
pub fn provenance_note(loaded: &LoadResult) -> String {
    match loaded.provenance {
        Provenance::Live => String::new(),
        Provenance::Snapshot => format!(
            "! {} unavailable, showing last saved snapshot ({} records)\n\n",
            loaded.source,
            loaded.records.len()
        ),
        Provenance::Placeholder => format!(
            "! {} unavailable, showing placeholder data\n\n",
            loaded.source
        ),
    }
}

pub fn render_counters(counters: &Counters) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total records      {:>8}", counters.total);
    let _ = writeln!(out, "Power GO add-ons   {:>8}", counters.add_on_count);
    let _ = writeln!(out, "With router        {:>8}", counters.router_count);
    let _ = writeln!(out, "New services       {:>8}", counters.new_service_count);
    let _ = writeln!(out, "Days worked        {:>8}", counters.days_worked);
    out
}

pub fn render_leaderboard(dimension: Dimension, leaderboard: &Leaderboard) -> String {
    format!(
        "Top {}: {} ({})\n",
        dimension, leaderboard.label, leaderboard.count
    )
}

pub fn render_trend(trend: &Trend) -> String {
    match (trend.current_month, trend.previous_month) {
        (Some(current), Some(previous)) => format!(
            "Trend: {} {} vs {} {} → {:+}%\n",
            current,
            trend.current_count,
            previous,
            trend.previous_count,
            trend.percentage_change
        ),
        (Some(current), None) => format!(
            "Trend: {} {} (no previous month) → {:+}%\n",
            current, trend.current_count, trend.percentage_change
        ),
        _ => "Trend: no data\n".to_string(),
    }
}

/// Label/count table with proportional bars; `limit` keeps the first rows
pub fn render_breakdown(dimension: Dimension, rows: &[CategoryCount], limit: Option<usize>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "By {}", dimension);
    if rows.is_empty() {
        let _ = writeln!(out, "  (no records)");
        return out;
    }

    let max = rows.iter().map(|r| r.count).max().unwrap_or(1).max(1);
    let shown = limit.unwrap_or(rows.len()).min(rows.len());

    for row in &rows[..shown] {
        let bar_len = ((row.count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
        let _ = writeln!(
            out,
            "  {:<width$} {:>6}  {}",
            truncate(&row.label, LABEL_WIDTH),
            row.count,
            "█".repeat(bar_len.max(1)),
            width = LABEL_WIDTH
        );
    }
    if shown < rows.len() {
        let _ = writeln!(out, "  … {} more", rows.len() - shown);
    }
    out
}

pub fn render_daily(rows: &[DailyDetail]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>11} {:>13}  {:<20} {:<16}",
        "Date", "Requests", "Installations", "Top advisor", "Top sector"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<12} {:>11} {:>13}  {:<20} {:<16}",
            row.date,
            row.requests,
            row.installations,
            truncate(&row.top_advisor, 20),
            truncate(&row.top_sector, 16)
        );
    }
    out
}

pub fn render_summary(summary: &MetricSummary, leaderboard_dimension: Dimension) -> String {
    let mut out = String::new();
    out.push_str(&render_counters(&summary.counters));
    out.push('\n');
    out.push_str(&render_leaderboard(leaderboard_dimension, &summary.leaderboard));
    out.push_str(&render_trend(&summary.trend));
    for dimension in [
        Dimension::Month,
        Dimension::Status,
        Dimension::Zone,
        Dimension::Advisor,
        Dimension::Technician,
    ] {
        out.push('\n');
        out.push_str(&render_breakdown(
            dimension,
            summary.breakdowns.get(dimension),
            Some(10),
        ));
    }
    out
}

pub fn render_issues(issues: &[RecordIssue]) -> String {
    if issues.is_empty() {
        return "All records valid\n".to_string();
    }
    let mut out = String::new();
    for issue in issues {
        let _ = writeln!(out, "{}", issue);
    }
    let _ = writeln!(out, "\n{} issue(s)", issues.len());
    out
}

pub fn render_dashboard(view: &DashboardView, leaderboard_dimension: Dimension) -> String {
    let mut out = format!("Dashboard for {}\n\n", view.user);
    if view.is_empty() {
        out.push_str("No panels available for this user\n");
        return out;
    }
    for section in &view.sections {
        match section {
            Section::Counters(counters) => out.push_str(&render_counters(counters)),
            Section::Leaderboard(leaderboard) => {
                out.push_str(&render_leaderboard(leaderboard_dimension, leaderboard))
            }
            Section::Trend(trend) => out.push_str(&render_trend(trend)),
            Section::Breakdown { dimension, rows } => {
                out.push_str(&render_breakdown(*dimension, rows, Some(10)))
            }
            Section::Daily { rows } => out.push_str(&render_daily(rows)),
        }
        out.push('\n');
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

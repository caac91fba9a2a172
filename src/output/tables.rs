use chrono::TimeDelta;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::models::BuildStatus;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

pub fn status_cell(status: BuildStatus) -> Cell {
    let cell = Cell::new(status.as_str());
    match status {
        BuildStatus::Success => cell.fg(TableColor::Green),
        BuildStatus::Failed => cell.fg(TableColor::Red),
        BuildStatus::Cancelled => cell.fg(TableColor::DarkGrey),
        BuildStatus::Pending => cell.fg(TableColor::Yellow),
        BuildStatus::Unknown => cell,
    }
}

pub fn color_coded_success_cell(rate: f64) -> Cell {
    let text = format!("{rate:.1}%");
    if rate > 80.0 {
        Cell::new(text).fg(TableColor::Green)
    } else if rate >= 50.0 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Red)
    }
}

/// Formats a build duration as `HH:MM:SS`. Negative spans render as zero.
pub fn format_duration(duration: TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Abbreviates a download count: `1.23m`, `4.5k`, or the plain number
/// below a thousand.
#[allow(clippy::cast_precision_loss)]
pub fn format_downloads(downloads: u64) -> String {
    const MILLION: u64 = 1_000_000;
    const THOUSAND: u64 = 1_000;

    let value = downloads as f64;

    if downloads >= MILLION {
        format!("{}m", (value / MILLION as f64 * 100.0).round() / 100.0)
    } else if downloads >= THOUSAND {
        format!("{}k", (value / THOUSAND as f64 * 10.0).round() / 10.0)
    } else {
        downloads.to_string()
    }
}

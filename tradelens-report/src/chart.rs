//! Plain-text cumulative-profit chart for embedding in exported reports.
//!
//! Coarse by intent: each column is one trade, each row one step of the value
//! range, and a marker is drawn where the cumulative value snaps to the
//! nearest row (within half a row unit). Output is deterministic for a given
//! input and configuration.

use tradelens_core::config::ChartConfig;
use tradelens_core::domain::Trade;

use crate::metrics::cumulative_profit;

/// Glyph drawn at a plotted point.
pub const MARKER: char = '●';

/// Width of the right-justified value label column.
const LABEL_WIDTH: usize = 6;

/// Render the first `config.max_width` trades as an ASCII chart.
///
/// Always produces `config.height + 1` value rows followed by one axis row,
/// regardless of how many trades there are.
pub fn render_cumulative_chart(trades: &[Trade], config: &ChartConfig) -> String {
    let height = config.height;
    // Row scale for the labels; a zero height collapses every point onto the single row.
    let steps = height.max(1) as f64;
    let width = trades.len().min(config.max_width);
    let series = cumulative_profit(&trades[..width]);

    // The range always includes zero so the baseline is visible.
    let max = series.iter().copied().fold(0.0_f64, f64::max);
    let min = series.iter().copied().fold(0.0_f64, f64::min);
    let range = if max - min == 0.0 { 1.0 } else { max - min };

    let mut chart = String::new();
    for row in (0..=height).rev() {
        let value = min + range * row as f64 / steps;
        chart.push_str(&format!("{:>LABEL_WIDTH$} |", axis_label(value)));
        for &cum in &series {
            let normalized = (cum - min) / range * height as f64;
            chart.push(if (normalized - row as f64).abs() < 0.5 { MARKER } else { ' ' });
        }
        chart.push('\n');
    }

    chart.push_str(&" ".repeat(LABEL_WIDTH + 1));
    chart.push('+');
    chart.push_str(&"-".repeat(series.len()));
    if !series.is_empty() {
        chart.push_str(&format!(" {}", series.len()));
    }
    chart
}

/// Integer label with "-0" folded to "0".
fn axis_label(value: f64) -> String {
    let rounded = value.round();
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.0}")
}

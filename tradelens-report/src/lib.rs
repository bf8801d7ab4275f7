//! TradeLens Report: the report aggregator.
//!
//! A stateless pipeline over an in-memory trade list:
//! - Summary statistics (`metrics::summarize`)
//! - Cumulative-profit ASCII chart (`chart::render_cumulative_chart`)
//! - Markdown report composition (`reporting::render_markdown_report`)
//! - Artifact export: Markdown, strategy source, CSV, JSON
//! - Money and N/A formatting shared with the CLI and TUI (`format`)
//!
//! Nothing in here performs network I/O or validates raw records; trades are
//! expected to have passed `tradelens_core::ingest` already.

pub mod chart;
pub mod format;
pub mod metrics;
pub mod reporting;

pub use chart::render_cumulative_chart;
pub use format::{money, optional_money, or_not_applicable, NOT_APPLICABLE};
pub use metrics::{summarize, AvgDuration, ReportSummary};
pub use reporting::{
    export_summary_json, export_trades_csv, render_markdown_report, save_report,
    save_strategy_code, ReportMeta,
};

//! Reporting and artifact export pipeline.

pub mod export;
pub mod markdown;

pub use export::{export_summary_json, export_trades_csv, save_report, save_strategy_code};
pub use markdown::{render_markdown_report, ReportMeta};

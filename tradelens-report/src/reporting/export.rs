//! Export: write reports, strategy code and trade tapes to disk.
//!
//! Formats:
//! - **Markdown**: the rendered report (`strategy_report.md` by default)
//! - **Source**: one strategy-code template as `strategy.<ext>`
//! - **CSV**: trade tape with a cumulative-profit column
//! - **JSON**: the computed `ReportSummary`

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tradelens_core::domain::{CodeLanguage, StrategyCode, Trade};

use crate::metrics::{cumulative_profit, ReportSummary};

/// Write `contents` to `dir/name`, creating `dir` if needed. Returns the path written.
pub fn write_artifact(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    if name.trim().is_empty() || name.contains(['/', '\\']) {
        bail!("invalid artifact file name '{name}'");
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "artifact written");
    Ok(path)
}

/// Save a rendered Markdown report.
pub fn save_report(dir: &Path, file_name: &str, report: &str) -> Result<PathBuf> {
    write_artifact(dir, file_name, report)
}

/// Save one language of a strategy-code bundle as `strategy.<ext>`.
pub fn save_strategy_code(dir: &Path, code: &StrategyCode, language: CodeLanguage) -> Result<PathBuf> {
    let source = code.source(language);
    if source.trim().is_empty() {
        bail!("backend returned no {language} template");
    }
    write_artifact(dir, &language.file_name(), source)
}

/// Trade tape as CSV.
///
/// Columns: ticket, symbol, direction, volume, price_open, profit,
/// cumulative_profit, time
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "ticket",
        "symbol",
        "direction",
        "volume",
        "price_open",
        "profit",
        "cumulative_profit",
        "time",
    ])?;

    let cumulative = cumulative_profit(trades);
    for (t, cum) in trades.iter().zip(cumulative) {
        wtr.write_record([
            &t.ticket.to_string(),
            &t.symbol,
            t.direction.as_str(),
            &format!("{:.2}", t.volume),
            &format!("{:.5}", t.price_open),
            &format!("{:.2}", t.profit),
            &format!("{:.2}", cum),
            &t.time.to_rfc3339(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Pretty JSON of the computed summary.
pub fn export_summary_json(summary: &ReportSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("failed to serialize ReportSummary to JSON")
}

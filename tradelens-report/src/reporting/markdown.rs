//! Markdown report generator.
//!
//! Pure string composition: backend summary, indicator list, ASCII chart,
//! trade table, local statistics and static guidance. The generation time is
//! passed in so the same inputs always produce the same document.

use chrono::{DateTime, Utc};
use tradelens_core::config::ChartConfig;
use tradelens_core::domain::{AnalysisSummary, Trade};

use crate::chart::render_cumulative_chart;
use crate::format::{money, optional_money, or_not_applicable};
use crate::metrics::ReportSummary;

/// Everything the report needs besides the trades and their summary.
#[derive(Debug, Clone)]
pub struct ReportMeta<'a> {
    pub analysis: &'a AnalysisSummary,
    /// Explanation from a fetched strategy-code bundle, if any.
    pub code_explanation: Option<&'a str>,
    pub generated_at: DateTime<Utc>,
    pub chart: ChartConfig,
}

/// Compose the full Markdown document.
pub fn render_markdown_report(summary: &ReportSummary, trades: &[Trade], meta: &ReportMeta<'_>) -> String {
    let analysis = meta.analysis;
    let chart = render_cumulative_chart(trades, &meta.chart);

    let mut report = format!(
        "# MT5 Strategy Analysis Report\n\n\
## 📊 Summary\n\n\
**Strategy:** {}\n\
**Description:** {}\n\
**Timeframe:** {}\n\
**Total Trades:** {}\n\
**Net Profit:** {}\n\
**Average Profit:** {}\n",
        analysis.strategy,
        analysis.strategy_description,
        analysis.timeframe,
        analysis.total_trades,
        money(analysis.net_profit),
        money(analysis.avg_profit),
    );

    report.push_str(&format!("\n## 🎯 Strategy Analysis\n\n{}\n", analysis.explanation));

    report.push_str("\n## 📈 Recommended Indicators\n\n");
    if analysis.indicators.is_empty() {
        report.push_str("- None reported\n");
    }
    for indicator in &analysis.indicators {
        report.push_str(&format!("- {indicator}\n"));
    }

    report.push_str("\n---\n\n## 💹 Profit Evolution (ASCII Chart)\n\n```\n");
    report.push_str(&chart);
    report.push_str("\n```\n");
    if trades.len() > meta.chart.max_width {
        report.push_str(&format!(
            "\n_Showing the first {} of {} trades._\n",
            meta.chart.max_width,
            trades.len()
        ));
    }

    report.push_str("\n---\n\n## 📋 Detailed Trades\n\n");
    report.push_str("| # | Symbol | Type | Volume | Price | Profit | Time |\n");
    report.push_str("|---|--------|------|--------|-------|--------|------|\n");
    for (i, t) in trades.iter().enumerate() {
        report.push_str(&format!(
            "| {} | {} | {} | {:.2} | {:.5} | {} | {} |\n",
            i + 1,
            t.symbol,
            t.direction,
            t.volume,
            t.price_open,
            money(t.profit),
            t.time.format("%Y-%m-%d %H:%M:%S"),
        ));
    }

    report.push_str("\n---\n\n## 📊 Statistics\n\n");
    report.push_str(&format!("- **Winning Trades:** {}\n", summary.winning_trades));
    report.push_str(&format!("- **Losing Trades:** {}\n", summary.losing_trades));
    report.push_str(&format!("- **Win Rate:** {:.1}%\n", summary.win_rate));
    report.push_str(&format!("- **Largest Win:** {}\n", optional_money(summary.largest_win)));
    report.push_str(&format!("- **Largest Loss:** {}\n", optional_money(summary.largest_loss)));
    report.push_str(&format!(
        "- **Profit Factor:** {}\n",
        or_not_applicable(summary.profit_factor, |pf| format!("{pf:.2}"))
    ));
    report.push_str(&format!(
        "- **Average Trade Duration:** {}\n",
        or_not_applicable(summary.avg_duration, |d| d.to_string())
    ));
    report.push_str(&format!("- **Total Volume Traded:** {:.2} lots\n", summary.total_volume));
    if !summary.chronological {
        report.push_str(
            "\n> ⚠️ Trades were not in chronological order; duration and profit evolution follow the order received.\n",
        );
    }

    report.push_str("\n---\n\n## 🤖 Strategy Implementation Guide\n\n");
    match meta.code_explanation {
        Some(explanation) => report.push_str(explanation),
        None => report.push_str(&implementation_notes(analysis)),
    }
    report.push('\n');

    report.push_str(&format!(
        "\n---\n\n## 🎓 Educational Resources\n\n\
### Understanding {}\n\n\
**Best Practices:**\n\
- Always use proper risk management (1-2% per trade)\n\
- Test strategies on demo accounts extensively\n\
- Monitor market conditions and adjust parameters\n\
- Keep a trading journal to track performance\n\
- Use stop losses to protect capital\n\n\
**When to Use This Strategy:**\n\
- Market volatility: {}\n\
- Best market conditions: {}\n\n\
**Risk Warnings:**\n\
⚠️ Trading involves substantial risk of loss\n\
⚠️ Past performance does not guarantee future results\n\
⚠️ Only trade with capital you can afford to lose\n\
⚠️ Always use proper position sizing and risk management\n",
        analysis.strategy,
        market_volatility(&analysis.timeframe),
        market_conditions(&analysis.strategy),
    ));

    report.push_str(&format!(
        "\n---\n\n*Generated by TradeLens on {}*\n\
*Total Trades Analyzed: {} | Net P/L: {}*\n",
        meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        analysis.total_trades,
        money(analysis.net_profit),
    ));

    report
}

/// Fallback guide when no strategy code has been fetched.
fn implementation_notes(analysis: &AnalysisSummary) -> String {
    format!(
        "### Implementation Notes\n\n\
This strategy was detected based on the trading patterns in your MT5 account.\n\
To implement it:\n\n\
1. **Analyze the pattern**: {}\n\
2. **Use the recommended indicators**: {}\n\
3. **Set appropriate timeframe**: {}\n\
4. **Test on demo account first** before going live\n\
5. **Monitor risk management** and adjust lot sizes accordingly\n\n\
Fetch the strategy code to get the complete implementation in MQL4, MQL5, Python or TypeScript.",
        analysis.explanation,
        analysis.indicators.join(", "),
        analysis.timeframe,
    )
}

pub fn market_volatility(timeframe: &str) -> &'static str {
    match timeframe {
        "M1-M5" => "High frequency/scalping",
        "H1-H4" => "Medium-term swing",
        _ => "Long-term position trading",
    }
}

pub fn market_conditions(strategy: &str) -> &'static str {
    if strategy.contains("Grid") {
        "Ranging/sideways markets"
    } else if strategy.contains("Trend") {
        "Strong trending markets"
    } else {
        "Adaptive to various conditions"
    }
}

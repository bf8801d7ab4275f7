//! TradeLens CLI: trading-history analysis from the terminal.
//!
//! Commands:
//! - `analyze`: fetch an analysis and print the summary and profit chart
//! - `report`: render the Markdown report (optionally CSV/JSON/strategy code too)
//! - `chart`: print only the cumulative-profit chart
//! - `code`: download a strategy implementation template
//! - `breakdown`: risk profile plus session and symbol performance
//! - `history`: recent closed deals with commission and swap totals

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tradelens_core::client::parse_analysis;
use tradelens_core::{
    ingest_trades, AnalysisResult, AnalysisSource, AnalyzerError, Breakdown, CircuitBreaker,
    CodeLanguage, DashboardConfig, DemoSource, HistoryQuery, HttpAnalyzer, RawTrade, RiskAnalysis,
    Trade, TradeHistory,
};
use tradelens_report::{
    export_summary_json, export_trades_csv, money, optional_money, or_not_applicable,
    render_cumulative_chart, render_markdown_report, save_report, save_strategy_code, summarize,
    ReportMeta, ReportSummary,
};

#[derive(Parser)]
#[command(
    name = "tradelens",
    about = "TradeLens CLI: MT5 trading history analysis and strategy reports"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an analysis and print the summary and profit chart.
    Analyze {
        /// Use generated demonstration data instead of the backend.
        #[arg(long, default_value_t = false)]
        demo: bool,

        /// Seed for demonstration data. Defaults to the current time.
        #[arg(long)]
        seed: Option<u64>,

        /// Fail if any trade record is malformed instead of skipping it.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Render the Markdown strategy report and write it to disk.
    Report {
        /// Read a saved `/analyze` response instead of calling the backend.
        #[arg(long, conflicts_with = "demo")]
        input: Option<PathBuf>,

        /// Use generated demonstration data instead of the backend.
        #[arg(long, default_value_t = false)]
        demo: bool,

        /// Seed for demonstration data.
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory. Defaults to `report.output_dir` from the config.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Report file name. Defaults to `report.file_name` from the config.
        #[arg(long)]
        name: Option<String>,

        /// Also fetch the strategy code, embed its explanation and save every template.
        #[arg(long, default_value_t = false)]
        with_code: bool,

        /// Also write the trade tape as `trades.csv`.
        #[arg(long, default_value_t = false)]
        csv: bool,

        /// Also write the computed statistics as `summary.json`.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Fail if any trade record is malformed instead of skipping it.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Print the cumulative-profit chart only.
    Chart {
        /// Read a saved `/analyze` response instead of calling the backend.
        #[arg(long, conflicts_with = "demo")]
        input: Option<PathBuf>,

        /// Use generated demonstration data instead of the backend.
        #[arg(long, default_value_t = false)]
        demo: bool,

        /// Seed for demonstration data.
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum number of trades plotted (1-50).
        #[arg(long)]
        width: Option<usize>,

        /// Number of row steps.
        #[arg(long)]
        height: Option<usize>,
    },
    /// Download a strategy implementation template.
    Code {
        /// Strategy name as reported by the analysis (e.g. "Grid/Scalping").
        #[arg(long)]
        strategy: String,

        /// mql4, mql5, python or typescript.
        #[arg(long, default_value = "mql5")]
        language: String,

        /// Output directory. Defaults to `report.output_dir` from the config.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Use the offline demo template instead of the backend.
        #[arg(long, default_value_t = false)]
        demo: bool,
    },
    /// Print the risk profile and per-session / per-symbol performance.
    Breakdown {
        /// Use generated demonstration data instead of the backend.
        #[arg(long, default_value_t = false)]
        demo: bool,

        /// Seed for demonstration data.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List recent closed deals, newest first.
    History {
        /// Use generated demonstration data instead of the backend.
        #[arg(long, default_value_t = false)]
        demo: bool,

        /// Seed for demonstration data.
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum number of deals.
        #[arg(long, default_value_t = 100)]
        limit: u32,

        /// How many days back to look.
        #[arg(long, default_value_t = 30)]
        days_back: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze { demo, seed, strict } => run_analyze(&config, demo, seed, strict),
        Commands::Report {
            input,
            demo,
            seed,
            output_dir,
            name,
            with_code,
            csv,
            json,
            strict,
        } => run_report(
            &config,
            ReportArgs {
                input,
                demo,
                seed,
                output_dir,
                name,
                with_code,
                csv,
                json,
                strict,
            },
        ),
        Commands::Chart {
            input,
            demo,
            seed,
            width,
            height,
        } => run_chart(config, input, demo, seed, width, height),
        Commands::Code {
            strategy,
            language,
            output_dir,
            demo,
        } => run_code(&config, &strategy, &language, output_dir, demo),
        Commands::Breakdown { demo, seed } => run_breakdown(&config, demo, seed),
        Commands::History {
            demo,
            seed,
            limit,
            days_back,
        } => run_history(&config, demo, seed, HistoryQuery { limit, days_back }),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    match path {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => {
            let config = DashboardConfig::from_env();
            config.validate().context("invalid configuration from environment")?;
            Ok(config)
        }
    }
}

fn build_source(config: &DashboardConfig, demo: bool, seed: Option<u64>) -> Result<Box<dyn AnalysisSource>> {
    if demo {
        let seed = seed.unwrap_or_else(|| Utc::now().timestamp_millis().unsigned_abs());
        tracing::info!(seed, "using demonstration data");
        return Ok(Box::new(DemoSource::new(seed)));
    }
    let circuit_breaker = Arc::new(CircuitBreaker::default_backend());
    let analyzer = HttpAnalyzer::new(&config.api, circuit_breaker)?;
    tracing::debug!(base_url = analyzer.base_url(), "using HTTP backend");
    Ok(Box::new(analyzer))
}

/// Attach a demo-data hint to connectivity failures.
fn backend_error(err: AnalyzerError) -> anyhow::Error {
    if err.is_connectivity() {
        anyhow::Error::new(err).context("could not get an analysis from the backend (pass --demo to use demonstration data)")
    } else {
        err.into()
    }
}

fn load_analysis(
    config: &DashboardConfig,
    input: Option<&Path>,
    demo: bool,
    seed: Option<u64>,
) -> Result<AnalysisResult> {
    if let Some(path) = input {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return parse_analysis(&body).with_context(|| format!("failed to parse {}", path.display()));
    }
    let source = build_source(config, demo, seed)?;
    source.fetch_analysis().map_err(backend_error)
}

/// Validate, then order per config. Lenient unless `strict`.
fn prepare_trades(config: &DashboardConfig, result: &AnalysisResult, strict: bool) -> Result<Vec<Trade>> {
    let outcome = ingest_trades(&result.trades);
    let trades = if strict {
        outcome.into_strict()?
    } else {
        if !outcome.is_clean() {
            eprintln!(
                "WARNING: skipped {} malformed trade record(s) (run with -v for details)",
                outcome.rejected.len()
            );
        }
        outcome.trades
    };
    Ok(config.report.ordering.apply(trades))
}

fn run_analyze(config: &DashboardConfig, demo: bool, seed: Option<u64>, strict: bool) -> Result<()> {
    let result = load_analysis(config, None, demo, seed)?;
    let trades = prepare_trades(config, &result, strict)?;
    let summary = summarize(&trades);

    print_summary(&result, &summary);
    println!("--- Profit Evolution ---");
    println!("{}", render_cumulative_chart(&trades, &config.chart));
    println!();
    Ok(())
}

struct ReportArgs {
    input: Option<PathBuf>,
    demo: bool,
    seed: Option<u64>,
    output_dir: Option<PathBuf>,
    name: Option<String>,
    with_code: bool,
    csv: bool,
    json: bool,
    strict: bool,
}

fn run_report(config: &DashboardConfig, args: ReportArgs) -> Result<()> {
    if args.with_code && args.input.is_some() {
        bail!("--with-code needs a live source; use it with the backend or --demo");
    }

    let result = load_analysis(config, args.input.as_deref(), args.demo, args.seed)?;
    let trades = prepare_trades(config, &result, args.strict)?;
    let summary = summarize(&trades);

    let output_dir = args.output_dir.unwrap_or_else(|| config.report.output_dir.clone());
    let file_name = args.name.unwrap_or_else(|| config.report.file_name.clone());

    let code = if args.with_code {
        let source = build_source(config, args.demo, args.seed)?;
        let code = source
            .fetch_strategy_code(&result.summary.strategy)
            .map_err(backend_error)?;
        for language in CodeLanguage::ALL {
            match save_strategy_code(&output_dir, &code, language) {
                Ok(path) => println!("Saved {language} template: {}", path.display()),
                Err(e) => eprintln!("WARNING: {e:#}"),
            }
        }
        Some(code)
    } else {
        None
    };

    let meta = ReportMeta {
        analysis: &result.summary,
        code_explanation: code
            .as_ref()
            .map(|c| c.explanation.as_str())
            .filter(|e| !e.trim().is_empty()),
        generated_at: Utc::now(),
        chart: config.chart,
    };
    let report = render_markdown_report(&summary, &trades, &meta);
    let path = save_report(&output_dir, &file_name, &report)?;
    println!("Report saved to: {}", path.display());

    if args.csv {
        let csv = export_trades_csv(&trades)?;
        let path = save_report(&output_dir, "trades.csv", &csv)?;
        println!("Trades saved to: {}", path.display());
    }
    if args.json {
        let json = export_summary_json(&summary)?;
        let path = save_report(&output_dir, "summary.json", &json)?;
        println!("Summary saved to: {}", path.display());
    }

    Ok(())
}

fn run_chart(
    mut config: DashboardConfig,
    input: Option<PathBuf>,
    demo: bool,
    seed: Option<u64>,
    width: Option<usize>,
    height: Option<usize>,
) -> Result<()> {
    if let Some(width) = width {
        config.chart.max_width = width;
    }
    if let Some(height) = height {
        config.chart.height = height;
    }
    config.validate()?;

    let result = load_analysis(&config, input.as_deref(), demo, seed)?;
    let trades = prepare_trades(&config, &result, false)?;
    println!("{}", render_cumulative_chart(&trades, &config.chart));
    Ok(())
}

fn run_code(
    config: &DashboardConfig,
    strategy: &str,
    language: &str,
    output_dir: Option<PathBuf>,
    demo: bool,
) -> Result<()> {
    let Some(language) = CodeLanguage::parse(language) else {
        bail!("unknown language '{language}'. Valid: mql4, mql5, python, typescript");
    };
    if strategy.trim().is_empty() {
        bail!("--strategy must not be empty");
    }

    let source = build_source(config, demo, Some(0))?;
    let code = source.fetch_strategy_code(strategy).map_err(backend_error)?;

    let output_dir = output_dir.unwrap_or_else(|| config.report.output_dir.clone());
    let path = save_strategy_code(&output_dir, &code, language)?;
    println!("Saved {language} template to: {}", path.display());
    if !code.explanation.trim().is_empty() {
        println!();
        println!("{}", code.explanation);
    }
    Ok(())
}

fn print_summary(result: &AnalysisResult, summary: &ReportSummary) {
    let analysis = &result.summary;
    println!();
    println!("=== Strategy Analysis ===");
    println!("Strategy:       {}", analysis.strategy);
    println!("Description:    {}", analysis.strategy_description);
    println!("Timeframe:      {}", analysis.timeframe);
    if !analysis.indicators.is_empty() {
        println!("Indicators:     {}", analysis.indicators.join(", "));
    }
    if let Some(balance) = analysis.account_balance {
        println!("Balance:        ${balance:.2}");
    }
    println!();
    println!("--- Trades ---");
    println!("Total:          {}", summary.total_trades);
    println!(
        "Won / Lost:     {} / {} ({} breakeven)",
        summary.winning_trades, summary.losing_trades, summary.breakeven_trades
    );
    println!("Win Rate:       {:.1}%", summary.win_rate);
    println!("Net Profit:     {}", money(summary.net_profit));
    println!("Avg Profit:     {}", money(summary.avg_profit));
    println!("Largest Win:    {}", optional_money(summary.largest_win));
    println!("Largest Loss:   {}", optional_money(summary.largest_loss));
    println!(
        "Profit Factor:  {}",
        or_not_applicable(summary.profit_factor, |pf| format!("{pf:.2}"))
    );
    println!(
        "Avg Duration:   {}",
        or_not_applicable(summary.avg_duration, |d| d.to_string())
    );
    println!("Total Volume:   {:.2} lots", summary.total_volume);
    if !summary.chronological {
        println!();
        println!("WARNING: trades are not in chronological order; set report.ordering = \"chronological\" to sort them");
    }
    println!();
}

fn run_breakdown(config: &DashboardConfig, demo: bool, seed: Option<u64>) -> Result<()> {
    let source = build_source(config, demo, seed)?;
    let risk = source.fetch_risk().map_err(backend_error)?;
    let sessions = source.fetch_sessions().map_err(backend_error)?;
    let symbols = source.fetch_symbols().map_err(backend_error)?;

    print_risk(&risk);
    print_breakdown("Sessions", &sessions);
    print_breakdown("Symbols", &symbols);
    Ok(())
}

fn print_risk(risk: &RiskAnalysis) {
    println!();
    println!("=== Risk ===");
    println!(
        "Risk/Trade:     {:.2}% ({})",
        risk.risk_percent(),
        risk.risk_level().label()
    );
    println!(
        "Reward:Risk:    1:{:.2} ({})",
        risk.reward_ratio(),
        risk.reward_quality().label()
    );
    println!("Avg Win:        {}", money(risk.avg_win));
    println!("Avg Loss:       {}", money(risk.avg_loss));
}

fn print_breakdown(title: &str, breakdown: &Breakdown) {
    println!();
    println!("--- {title} ---");
    if breakdown.is_empty() {
        println!("No data");
        return;
    }
    println!("{:<12} {:>11} {:>7} {:>8} {:>11}", "Name", "Profit", "Trades", "Win %", "Avg");
    for group in &breakdown.groups {
        let s = &group.stats;
        println!(
            "{:<12} {:>11} {:>7} {:>7.1}% {:>11}",
            group.name,
            money(s.total_profit),
            s.trade_count,
            s.win_rate,
            money(s.average())
        );
    }
    if let Some(best) = &breakdown.best {
        println!("Best:  {best}");
    }
    if let Some(worst) = &breakdown.worst {
        println!("Worst: {worst}");
    }
}

fn run_history(
    config: &DashboardConfig,
    demo: bool,
    seed: Option<u64>,
    query: HistoryQuery,
) -> Result<()> {
    if query.limit == 0 {
        bail!("--limit must be at least 1");
    }
    let source = build_source(config, demo, seed)?;
    let history = source.fetch_trade_history(query).map_err(backend_error)?;
    print_history(&history);
    Ok(())
}

fn print_history(history: &TradeHistory) {
    println!();
    match history.days_back {
        Some(days) => println!("=== {} closed deal(s), last {days} days ===", history.total),
        None => println!("=== {} closed deal(s) ===", history.total),
    }
    println!(
        "{:>10} {:<8} {:<4} {:>6} {:>10} {:>10} {:>9}  {}",
        "Ticket", "Symbol", "Type", "Lots", "Price", "Profit", "Comm.", "Time"
    );
    for trade in &history.trades {
        println!("{}", history_row(trade));
    }
    println!();
    println!("Commission:     {}", money(history.total_commission()));
    println!("Swap:           {}", money(history.total_swap()));
}

/// One table row; fields the backend left out print as `-`.
fn history_row(trade: &RawTrade) -> String {
    let num = |v: Option<f64>, precision: usize| {
        v.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
    };
    format!(
        "{:>10} {:<8} {:<4} {:>6} {:>10} {:>10} {:>9}  {}",
        trade.ticket.map_or_else(|| "-".to_string(), |t| t.to_string()),
        trade.symbol.as_deref().unwrap_or("-"),
        trade.kind.as_deref().unwrap_or("-"),
        num(trade.volume, 2),
        num(trade.price_open, 5),
        num(trade.profit, 2),
        num(trade.commission, 2),
        trade.time.as_deref().unwrap_or("-"),
    )
}

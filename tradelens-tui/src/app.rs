//! Application state: single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};

use anyhow::Result;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use tradelens_core::{ingest_trades, AnalysisResult, CodeLanguage, DashboardConfig, StrategyCode, Trade};
use tradelens_core::domain::AnalysisSummary;
use tradelens_report::{
    render_markdown_report, save_report, save_strategy_code, summarize, ReportMeta, ReportSummary,
};

use crate::worker::{Breakdowns, WorkerCommand, WorkerResponse};

const ERROR_HISTORY_CAP: usize = 50;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Summary,
    Chart,
    Trades,
    Breakdown,
    Help,
}

impl Panel {
    pub const COUNT: usize = 5;

    pub fn index(self) -> usize {
        match self {
            Panel::Summary => 0,
            Panel::Chart => 1,
            Panel::Trades => 2,
            Panel::Breakdown => 3,
            Panel::Help => 4,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Summary),
            1 => Some(Panel::Chart),
            2 => Some(Panel::Trades),
            3 => Some(Panel::Breakdown),
            4 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Summary => "Summary",
            Panel::Chart => "Chart",
            Panel::Trades => "Trades",
            Panel::Breakdown => "Breakdown",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % Self::COUNT).unwrap_or(Panel::Summary)
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + Self::COUNT - 1) % Self::COUNT).unwrap_or(Panel::Summary)
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Backend unreachable or refused.
    Network,
    /// Backend answered with an error or unusable payload.
    Backend,
    /// Malformed trade records.
    Data,
    /// Writing a report or code file failed.
    Export,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "NET",
            ErrorCategory::Backend => "API",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Export => "FILE",
        }
    }
}

/// A validated analysis ready for display.
#[derive(Debug, Clone)]
pub struct LoadedAnalysis {
    pub source: String,
    pub backend: AnalysisSummary,
    pub trades: Vec<Trade>,
    pub summary: ReportSummary,
    pub rejected: usize,
}

/// Trades panel scroll state.
#[derive(Debug, Clone, Default)]
pub struct TradesPanelState {
    pub cursor: usize,
    pub scroll_offset: usize,
}

impl TradesPanelState {
    pub fn down(&mut self, len: usize) {
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Keep the cursor inside a window of `visible` rows.
    pub fn follow(&mut self, visible: usize) {
        if visible == 0 {
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + visible {
            self.scroll_offset = self.cursor + 1 - visible;
        }
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Welcome,
    ErrorHistory,
    /// Backend unreachable: offer retry or demo data.
    ConnectionError(String),
}

/// Top-level application state.
pub struct AppState {
    // Navigation
    pub active_panel: Panel,
    pub running: bool,

    // Data
    pub analysis: Option<LoadedAnalysis>,
    pub trades: TradesPanelState,
    pub code_language: CodeLanguage,
    pub last_code: Option<StrategyCode>,
    pub breakdowns: Option<Breakdowns>,
    pub breakdown_scroll: u16,
    pub loading: bool,
    pub config: DashboardConfig,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        config: DashboardConfig,
    ) -> Self {
        Self {
            active_panel: Panel::Summary,
            running: true,
            analysis: None,
            trades: TradesPanelState::default(),
            code_language: CodeLanguage::default(),
            last_code: None,
            breakdowns: None,
            breakdown_scroll: 0,
            loading: false,
            config,
            worker_tx,
            worker_rx,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
        }
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    /// Ask the worker for a fresh analysis.
    pub fn request_analysis(&mut self, demo: bool) {
        if self.loading {
            self.set_warning("A request is already in progress");
            return;
        }
        self.overlay = Overlay::None;
        self.loading = true;
        self.set_status(if demo {
            "Generating demo data..."
        } else {
            "Analyzing MT5 account..."
        });
        self.dispatch(WorkerCommand::FetchAnalysis { demo }, "analyze account");
    }

    /// Ask the worker for the strategy code of the loaded analysis.
    pub fn request_code(&mut self) {
        let language = self.code_language;
        let Some(command) = self.analysis.as_ref().map(|a| WorkerCommand::FetchStrategyCode {
            strategy: a.backend.strategy.clone(),
            demo: a.source == "demo",
            language,
        }) else {
            self.set_warning("Load an analysis first (a: analyze, d: demo)");
            return;
        };
        if self.loading {
            self.set_warning("A request is already in progress");
            return;
        }
        self.loading = true;
        self.set_status(format!("Fetching {language} code..."));
        self.dispatch(command, "fetch strategy code");
    }

    /// Ask the worker for risk, session, symbol and history breakdowns
    /// from the same source as the loaded analysis.
    pub fn request_breakdowns(&mut self) {
        let Some(demo) = self.analysis.as_ref().map(|a| a.source == "demo") else {
            self.set_warning("Load an analysis first (a: analyze, d: demo)");
            return;
        };
        if self.loading {
            self.set_warning("A request is already in progress");
            return;
        }
        self.loading = true;
        self.set_status("Fetching breakdowns...");
        self.dispatch(WorkerCommand::FetchBreakdowns { demo }, "fetch breakdowns");
    }

    fn dispatch(&mut self, command: WorkerCommand, context: &str) {
        if self.worker_tx.send(command).is_err() {
            tracing::error!(context, "worker channel closed");
            self.loading = false;
            self.push_error(
                ErrorCategory::Backend,
                "Background worker is not running; restart the dashboard".into(),
                context.into(),
            );
        }
    }

    pub fn load_breakdowns(&mut self, breakdowns: Breakdowns) {
        for error in &breakdowns.errors {
            self.push_error(ErrorCategory::Backend, error.clone(), "fetch breakdowns".into());
        }
        if breakdowns.errors.is_empty() {
            self.set_status(format!("Breakdowns loaded from {}", breakdowns.source));
        } else {
            self.set_warning(format!(
                "Breakdowns loaded from {} with {} failed view(s)",
                breakdowns.source,
                breakdowns.errors.len()
            ));
        }
        self.breakdown_scroll = 0;
        self.breakdowns = Some(breakdowns);
    }

    /// Validate, order and summarize a backend result, replacing the current analysis.
    pub fn load_analysis(&mut self, result: AnalysisResult, source: String) {
        let outcome = ingest_trades(&result.trades);
        let rejected = outcome.rejected.len();
        for rejection in &outcome.rejected {
            self.push_error(
                ErrorCategory::Data,
                format!("Skipped {}: {}", rejection.label(), rejection.reason),
                format!("record #{}", rejection.index),
            );
        }

        let trades = self.config.report.ordering.apply(outcome.trades);
        let summary = summarize(&trades);

        if rejected > 0 {
            self.set_warning(format!(
                "Loaded {} trades from {source}, skipped {rejected} malformed",
                trades.len()
            ));
        } else {
            self.set_status(format!(
                "Loaded {} trades from {source} ({})",
                trades.len(),
                result.summary.strategy
            ));
        }

        self.trades = TradesPanelState::default();
        self.last_code = None;
        self.breakdowns = None;
        self.analysis = Some(LoadedAnalysis {
            source,
            backend: result.summary,
            trades,
            summary,
            rejected,
        });
    }

    /// Render the Markdown report and write it to the configured location.
    pub fn save_report(&self) -> Result<Option<PathBuf>> {
        let Some(analysis) = &self.analysis else {
            return Ok(None);
        };
        let meta = ReportMeta {
            analysis: &analysis.backend,
            code_explanation: self
                .last_code
                .as_ref()
                .map(|c| c.explanation.as_str())
                .filter(|e| !e.trim().is_empty()),
            generated_at: Utc::now(),
            chart: self.config.chart,
        };
        let report = render_markdown_report(&analysis.summary, &analysis.trades, &meta);
        let path = save_report(
            &self.config.report.output_dir,
            &self.config.report.file_name,
            &report,
        )?;
        Ok(Some(path))
    }

    /// Store fetched code and write `language` to disk.
    pub fn save_code(&mut self, code: StrategyCode, language: CodeLanguage) -> Result<PathBuf> {
        let path = save_strategy_code(&self.config.report.output_dir, &code, language);
        self.last_code = Some(code);
        path
    }

    pub fn cycle_language(&mut self) {
        self.code_language = self.code_language.next();
        self.set_status(format!("Code language: {}", self.code_language));
    }

    pub fn trade_count(&self) -> usize {
        self.analysis.as_ref().map_or(0, |a| a.trades.len())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tradelens_core::domain::RawTrade;

    pub(crate) fn test_app() -> (AppState, std::sync::mpsc::Receiver<WorkerCommand>) {
        let (tx, cmd_rx) = std::sync::mpsc::channel();
        let (_resp_tx, resp_rx) = std::sync::mpsc::channel();
        let app = AppState::new(tx, resp_rx, DashboardConfig::default());
        (app, cmd_rx)
    }

    fn raw(ticket: i64, kind: &str, profit: f64, time: &str) -> RawTrade {
        RawTrade::new(ticket, "EURUSD", kind, 0.1, 1.1, profit, time)
    }

    #[test]
    fn panel_cycle() {
        assert_eq!(Panel::Summary.next(), Panel::Chart);
        assert_eq!(Panel::Help.next(), Panel::Summary);
        assert_eq!(Panel::Summary.prev(), Panel::Help);
        assert_eq!(Panel::Chart.prev(), Panel::Summary);
    }

    #[test]
    fn panel_from_index() {
        for i in 0..Panel::COUNT {
            let p = Panel::from_index(i).unwrap();
            assert_eq!(p.index(), i);
        }
        assert!(Panel::from_index(Panel::COUNT).is_none());
    }

    #[test]
    fn error_history_caps_at_50() {
        let (mut app, _rx) = test_app();
        for i in 0..60 {
            app.push_error(ErrorCategory::Backend, format!("error {i}"), String::new());
        }
        assert_eq!(app.error_history.len(), 50);
        assert!(app.error_history[0].message.contains("59"));
    }

    #[test]
    fn load_analysis_skips_malformed_records() {
        let (mut app, _rx) = test_app();
        let result = AnalysisResult {
            trades: vec![
                raw(1, "BUY", 10.0, "2024-01-01T10:00:00"),
                raw(2, "HEDGE", 5.0, "2024-01-01T11:00:00"),
                raw(3, "SELL", -4.0, "2024-01-01T12:00:00"),
            ],
            ..Default::default()
        };
        app.load_analysis(result, "backend".into());

        let loaded = app.analysis.as_ref().unwrap();
        assert_eq!(loaded.trades.len(), 2);
        assert_eq!(loaded.rejected, 1);
        assert_eq!(loaded.summary.winning_trades, 1);
        assert_eq!(app.error_history.len(), 1);
        assert_eq!(app.error_history[0].category, ErrorCategory::Data);
        assert!(matches!(app.status_message, Some((_, StatusLevel::Warning))));
    }

    #[test]
    fn request_analysis_sends_once_while_loading() {
        let (mut app, rx) = test_app();
        app.request_analysis(true);
        app.request_analysis(false);
        assert!(matches!(rx.try_recv(), Ok(WorkerCommand::FetchAnalysis { demo: true })));
        assert!(rx.try_recv().is_err());
        assert!(app.loading);
    }

    #[test]
    fn closed_worker_channel_clears_loading() {
        let (mut app, rx) = test_app();
        drop(rx);
        app.request_analysis(true);
        assert!(!app.loading);
        assert_eq!(app.error_history.len(), 1);
        assert_eq!(app.error_history[0].category, ErrorCategory::Backend);
        assert_eq!(app.error_history[0].context, "analyze account");
        assert!(matches!(app.status_message, Some((_, StatusLevel::Error))));

        // Not stuck: the next request is attempted again rather than refused as in progress.
        app.request_analysis(false);
        assert_eq!(app.error_history.len(), 2);
    }

    #[test]
    fn code_request_carries_selected_language() {
        let (mut app, rx) = test_app();
        app.load_analysis(
            AnalysisResult {
                trades: vec![raw(1, "BUY", 3.0, "2024-01-01T10:00:00")],
                ..Default::default()
            },
            "demo".into(),
        );
        app.code_language = CodeLanguage::TypeScript;
        app.request_code();
        app.code_language = CodeLanguage::Python;
        match rx.try_recv() {
            Ok(WorkerCommand::FetchStrategyCode { demo, language, .. }) => {
                assert!(demo);
                assert_eq!(language, CodeLanguage::TypeScript);
            }
            other => panic!("expected FetchStrategyCode, got {other:?}"),
        }
    }

    #[test]
    fn breakdowns_follow_the_analysis_source() {
        let (mut app, rx) = test_app();
        app.request_breakdowns();
        assert!(rx.try_recv().is_err());

        app.load_analysis(
            AnalysisResult {
                trades: vec![raw(1, "BUY", 3.0, "2024-01-01T10:00:00")],
                ..Default::default()
            },
            "backend".into(),
        );
        app.request_breakdowns();
        assert!(matches!(rx.try_recv(), Ok(WorkerCommand::FetchBreakdowns { demo: false })));
        app.loading = false;

        app.load_breakdowns(Breakdowns {
            source: "backend".into(),
            errors: vec!["history: HTTP 500 from http://localhost:8000/trades/history".into()],
            ..Breakdowns::default()
        });
        assert!(app.breakdowns.is_some());
        assert_eq!(app.error_history.len(), 1);
        assert!(matches!(app.status_message, Some((_, StatusLevel::Warning))));

        // A fresh analysis drops breakdowns from the previous one.
        app.load_analysis(AnalysisResult::default(), "demo".into());
        assert!(app.breakdowns.is_none());
    }

    #[test]
    fn request_code_needs_an_analysis() {
        let (mut app, rx) = test_app();
        app.request_code();
        assert!(rx.try_recv().is_err());
        assert!(!app.loading);
    }

    #[test]
    fn save_report_writes_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = test_app();
        app.config.report.output_dir = dir.path().to_path_buf();
        assert!(app.save_report().unwrap().is_none());

        app.load_analysis(
            AnalysisResult {
                trades: vec![raw(1, "BUY", 3.0, "2024-01-01T10:00:00")],
                ..Default::default()
            },
            "demo".into(),
        );
        let path = app.save_report().unwrap().unwrap();
        assert_eq!(path, dir.path().join("strategy_report.md"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("# MT5 Strategy Analysis Report"));
    }

    #[test]
    fn trades_cursor_follows_window() {
        let mut state = TradesPanelState::default();
        for _ in 0..12 {
            state.down(20);
        }
        state.follow(5);
        assert_eq!(state.cursor, 12);
        assert_eq!(state.scroll_offset, 8);
        for _ in 0..12 {
            state.up();
        }
        state.follow(5);
        assert_eq!(state.scroll_offset, 0);
    }
}

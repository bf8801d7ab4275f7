//! Background worker thread: all network calls run here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. The HTTP
//! client and its circuit breaker live for the whole session, so repeated
//! failures keep counting across retries from the UI.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::Utc;

use tradelens_core::config::ApiConfig;
use tradelens_core::{
    AnalysisResult, AnalysisSource, AnalyzerError, Breakdown, CircuitBreaker, CodeLanguage,
    DemoSource, HistoryQuery, HttpAnalyzer, RiskAnalysis, StrategyCode, TradeHistory,
};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    FetchAnalysis { demo: bool },
    /// `language` is the one selected when the request was made; the code is saved in it.
    FetchStrategyCode {
        strategy: String,
        demo: bool,
        language: CodeLanguage,
    },
    FetchBreakdowns { demo: bool },
    Shutdown,
}

/// Risk, session, symbol and history views of the account.
/// Each is fetched independently; failures are collected in `errors`.
#[derive(Debug, Default)]
pub struct Breakdowns {
    pub source: String,
    pub risk: Option<RiskAnalysis>,
    pub sessions: Option<Breakdown>,
    pub symbols: Option<Breakdown>,
    pub history: Option<TradeHistory>,
    pub errors: Vec<String>,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    AnalysisLoaded {
        result: Box<AnalysisResult>,
        source: String,
    },
    AnalysisFailed {
        error: String,
        /// True when the backend could not be reached; the UI offers demo data.
        connectivity: bool,
    },
    CodeLoaded {
        code: Box<StrategyCode>,
        language: CodeLanguage,
    },
    CodeFailed {
        error: String,
    },
    BreakdownsLoaded {
        breakdowns: Box<Breakdowns>,
    },
    BreakdownsFailed {
        error: String,
    },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    api: ApiConfig,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("tradelens-worker".into())
        .spawn(move || worker_loop(rx, tx, api))
}

fn worker_loop(rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>, api: ApiConfig) {
    let backend = HttpAnalyzer::new(&api, Arc::new(CircuitBreaker::default_backend()));
    if let Err(e) = &backend {
        tracing::error!(error = %e, "HTTP client unavailable; only demo data will work");
    }

    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(cmd) => {
                let source: Result<Box<dyn AnalysisSource>, String> = match (&cmd, &backend) {
                    (WorkerCommand::FetchAnalysis { demo: true }, _)
                    | (WorkerCommand::FetchStrategyCode { demo: true, .. }, _)
                    | (WorkerCommand::FetchBreakdowns { demo: true }, _) => Ok(Box::new(demo_source())),
                    (_, Ok(analyzer)) => Ok(Box::new(analyzer.clone())),
                    (_, Err(e)) => Err(e.to_string()),
                };
                let response = handle_command(cmd, source);
                if tx.send(response).is_err() {
                    break;
                }
            }
        }
    }
    tracing::debug!("worker stopped");
}

fn demo_source() -> DemoSource {
    DemoSource::new(Utc::now().timestamp_millis().unsigned_abs())
}

fn handle_command(cmd: WorkerCommand, source: Result<Box<dyn AnalysisSource>, String>) -> WorkerResponse {
    match cmd {
        WorkerCommand::FetchAnalysis { .. } => match source {
            Ok(source) => analysis_response(source.name().to_string(), source.fetch_analysis()),
            Err(error) => WorkerResponse::AnalysisFailed {
                error,
                connectivity: false,
            },
        },
        WorkerCommand::FetchStrategyCode {
            strategy, language, ..
        } => match source.and_then(|s| s.fetch_strategy_code(&strategy).map_err(|e| e.to_string())) {
            Ok(code) => WorkerResponse::CodeLoaded {
                code: Box::new(code),
                language,
            },
            Err(error) => WorkerResponse::CodeFailed { error },
        },
        WorkerCommand::FetchBreakdowns { .. } => match source {
            Ok(source) => breakdowns_response(fetch_breakdowns(source.as_ref())),
            Err(error) => WorkerResponse::BreakdownsFailed { error },
        },
        WorkerCommand::Shutdown => WorkerResponse::AnalysisFailed {
            error: "worker shutting down".into(),
            connectivity: false,
        },
    }
}

fn analysis_response(source: String, result: Result<AnalysisResult, AnalyzerError>) -> WorkerResponse {
    match result {
        Ok(result) => WorkerResponse::AnalysisLoaded {
            result: Box::new(result),
            source,
        },
        Err(e) => {
            tracing::warn!(error = %e, source = %source, "analysis request failed");
            WorkerResponse::AnalysisFailed {
                connectivity: e.is_connectivity(),
                error: e.to_string(),
            }
        }
    }
}

fn fetch_breakdowns(source: &dyn AnalysisSource) -> Breakdowns {
    let mut errors = Vec::new();
    Breakdowns {
        source: source.name().to_string(),
        risk: keep(source.fetch_risk(), "risk", &mut errors),
        sessions: keep(source.fetch_sessions(), "sessions", &mut errors),
        symbols: keep(source.fetch_symbols(), "symbols", &mut errors),
        history: keep(
            source.fetch_trade_history(HistoryQuery::default()),
            "history",
            &mut errors,
        ),
        errors,
    }
}

fn keep<T>(result: Result<T, AnalyzerError>, what: &str, errors: &mut Vec<String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, what, "breakdown request failed");
            errors.push(format!("{what}: {e}"));
            None
        }
    }
}

/// Fails only when every view failed.
fn breakdowns_response(breakdowns: Breakdowns) -> WorkerResponse {
    let nothing = breakdowns.risk.is_none()
        && breakdowns.sessions.is_none()
        && breakdowns.symbols.is_none()
        && breakdowns.history.is_none();
    if nothing {
        WorkerResponse::BreakdownsFailed {
            error: breakdowns
                .errors
                .first()
                .cloned()
                .unwrap_or_else(|| "no breakdown data".into()),
        }
    } else {
        WorkerResponse::BreakdownsLoaded {
            breakdowns: Box::new(breakdowns),
        }
    }
}

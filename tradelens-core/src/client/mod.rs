//! Analysis backend client.
//!
//! The `AnalysisSource` trait abstracts over where analysis results come from
//! (the HTTP backend, or generated demo data) so surfaces can swap them and
//! tests can run offline.

pub mod circuit_breaker;
pub mod demo;
pub mod http;

use serde_json::Value;
use thiserror::Error;

use crate::domain::{
    AnalysisResult, Breakdown, HistoryQuery, RiskAnalysis, StrategyCode, TradeHistory,
};

pub use circuit_breaker::CircuitBreaker;
pub use demo::DemoSource;
pub use http::HttpAnalyzer;

/// Errors talking to the analysis backend.
///
/// Displayable in both CLI and TUI contexts.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("backend unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// The backend answered but reported a failure (e.g. MT5 not connected).
    #[error("backend error: {0}")]
    Backend(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("backend temporarily blocked after repeated failures (circuit breaker open)")]
    CircuitBreakerTripped,

    #[error("client setup failed: {0}")]
    Client(String),
}

impl AnalyzerError {
    /// True when the failure is about reaching the backend rather than its content.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            AnalyzerError::NetworkUnreachable(_)
                | AnalyzerError::Http { .. }
                | AnalyzerError::CircuitBreakerTripped
                | AnalyzerError::Backend(_)
        )
    }
}

/// Source of analysis results and strategy code.
pub trait AnalysisSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the account analysis (`/analyze`).
    fn fetch_analysis(&self) -> Result<AnalysisResult, AnalyzerError>;

    /// Fetch implementation templates for a detected strategy (`/strategy/template`).
    fn fetch_strategy_code(&self, strategy: &str) -> Result<StrategyCode, AnalyzerError>;

    /// `/analyze/risk`
    fn fetch_risk(&self) -> Result<RiskAnalysis, AnalyzerError>;

    /// `/analyze/sessions`
    fn fetch_sessions(&self) -> Result<Breakdown, AnalyzerError>;

    /// `/analyze/symbols`, highest profit first.
    fn fetch_symbols(&self) -> Result<Breakdown, AnalyzerError>;

    /// `/trades/history`, newest first.
    fn fetch_trade_history(&self, query: HistoryQuery) -> Result<TradeHistory, AnalyzerError>;
}

/// Parse an `/analyze` body, turning `{"error": ...}` payloads into `AnalyzerError::Backend`.
pub fn parse_analysis(body: &str) -> Result<AnalysisResult, AnalyzerError> {
    let value = parse_checked(body)?;
    serde_json::from_value(value).map_err(|e| AnalyzerError::MalformedResponse(e.to_string()))
}

/// Parse a `/strategy/template` body.
pub fn parse_strategy_code(body: &str) -> Result<StrategyCode, AnalyzerError> {
    let value = parse_checked(body)?;
    serde_json::from_value(value).map_err(|e| AnalyzerError::MalformedResponse(e.to_string()))
}

pub fn parse_risk(body: &str) -> Result<RiskAnalysis, AnalyzerError> {
    let value = parse_checked(body)?;
    serde_json::from_value(value).map_err(|e| AnalyzerError::MalformedResponse(e.to_string()))
}

/// Parse a flat breakdown body; `kind` names the `best_`/`worst_` keys.
pub fn parse_breakdown(body: &str, kind: &str) -> Result<Breakdown, AnalyzerError> {
    match parse_checked(body)? {
        Value::Object(object) => Ok(Breakdown::from_object(object, kind)),
        _ => Err(AnalyzerError::MalformedResponse("expected a JSON object".into())),
    }
}

pub fn parse_trade_history(body: &str) -> Result<TradeHistory, AnalyzerError> {
    let value = parse_checked(body)?;
    serde_json::from_value(value).map_err(|e| AnalyzerError::MalformedResponse(e.to_string()))
}

fn parse_checked(body: &str) -> Result<Value, AnalyzerError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| AnalyzerError::MalformedResponse(e.to_string()))?;
    if let Some(err) = value.get("error") {
        let message = match err {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(AnalyzerError::Backend(message));
    }
    if !value.is_object() {
        return Err(AnalyzerError::MalformedResponse("expected a JSON object".into()));
    }
    Ok(value)
}

//! TradeLens Core: domain types, boundary validation, backend client, configuration.
//!
//! This crate owns everything that touches the outside world before the
//! report aggregator runs:
//! - Domain types (trades, backend payloads, strategy code bundles, breakdowns)
//! - Ingestion: validation of raw backend records into well-formed trades
//! - `AnalysisSource` trait with HTTP and demo-data implementations
//! - TOML configuration with environment override

pub mod client;
pub mod config;
pub mod domain;
pub mod ingest;

pub use client::{AnalysisSource, AnalyzerError, CircuitBreaker, DemoSource, HttpAnalyzer};
pub use config::{ChartConfig, ConfigError, DashboardConfig, TradeOrdering};
pub use domain::{
    AnalysisResult, AnalysisSummary, Breakdown, CodeLanguage, Direction, GroupStats, HistoryQuery,
    NamedGroup, RawTrade, RewardQuality, RiskAnalysis, RiskLevel, StrategyCode, Trade, TradeHistory,
};
pub use ingest::{ingest_trades, IngestError, IngestOutcome, Rejection};

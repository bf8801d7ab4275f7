//! Domain types for TradeLens

pub mod analysis;
pub mod breakdown;
pub mod trade;

pub use analysis::{AnalysisResult, AnalysisSummary, CodeLanguage, RawTrade, StrategyCode};
pub use breakdown::{
    session_for_hour, Breakdown, GroupStats, HistoryQuery, NamedGroup, RewardQuality, RiskAnalysis,
    RiskLevel, TradeHistory,
};
pub use trade::{Direction, Trade};

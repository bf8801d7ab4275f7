//! Backend payloads: the `/analyze` result and `/strategy/template` code bundle.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// A trade record exactly as the backend sends it, before validation.
///
/// Every field is optional: a null, missing or mistyped value becomes `None`
/// and the record is rejected at ingestion instead of failing the payload.
/// `/trades/history` sends `price` instead of `price_open`, plus costs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawTrade {
    #[serde(default, deserialize_with = "lenient")]
    pub ticket: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub symbol: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub volume: Option<f64>,
    #[serde(alias = "price", default, deserialize_with = "lenient")]
    pub price_open: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub profit: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub commission: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub swap: Option<f64>,
}

impl RawTrade {
    /// A fully populated record without commission or swap.
    pub fn new(
        ticket: i64,
        symbol: &str,
        kind: &str,
        volume: f64,
        price_open: f64,
        profit: f64,
        time: &str,
    ) -> Self {
        Self {
            ticket: Some(ticket),
            symbol: Some(symbol.to_string()),
            kind: Some(kind.to_string()),
            volume: Some(volume),
            price_open: Some(price_open),
            profit: Some(profit),
            time: Some(time.to_string()),
            commission: None,
            swap: None,
        }
    }
}

/// Accept any JSON value; keep it only if it converts to `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// The backend's own summary of the account.
///
/// Only the strategy labels are guaranteed; everything else falls back to a
/// neutral default when absent (the backend omits metrics for empty accounts).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default)]
    pub total_trades: usize,
    #[serde(default)]
    pub net_profit: f64,
    #[serde(default)]
    pub avg_profit: f64,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub strategy_description: String,
    #[serde(default)]
    pub timeframe: String,
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(default)]
    pub explanation: String,

    // ── Optional backend metrics ──
    #[serde(default)]
    pub win_rate: Option<f64>,
    #[serde(default)]
    pub profit_factor: Option<f64>,
    #[serde(default)]
    pub max_drawdown: Option<f64>,
    #[serde(default)]
    pub sharpe_ratio: Option<f64>,
    #[serde(default)]
    pub account_balance: Option<f64>,
    #[serde(default)]
    pub account_equity: Option<f64>,
    #[serde(default)]
    pub last_update: Option<String>,
}

/// Full `/analyze` response body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub summary: AnalysisSummary,
    #[serde(default)]
    pub trades: Vec<RawTrade>,
}

/// Strategy implementation templates returned by `/strategy/template`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrategyCode {
    #[serde(default)]
    pub mql4: String,
    #[serde(default)]
    pub mql5: String,
    #[serde(default)]
    pub python: String,
    #[serde(default)]
    pub typescript: String,
    #[serde(default)]
    pub explanation: String,
}

impl StrategyCode {
    pub fn source(&self, language: CodeLanguage) -> &str {
        match language {
            CodeLanguage::Mql4 => &self.mql4,
            CodeLanguage::Mql5 => &self.mql5,
            CodeLanguage::Python => &self.python,
            CodeLanguage::TypeScript => &self.typescript,
        }
    }
}

/// Target language for a strategy-code download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    Mql4,
    #[default]
    Mql5,
    Python,
    TypeScript,
}

impl CodeLanguage {
    pub const ALL: [CodeLanguage; 4] = [
        CodeLanguage::Mql4,
        CodeLanguage::Mql5,
        CodeLanguage::Python,
        CodeLanguage::TypeScript,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            CodeLanguage::Mql4 => "mq4",
            CodeLanguage::Mql5 => "mq5",
            CodeLanguage::Python => "py",
            CodeLanguage::TypeScript => "ts",
        }
    }

    /// Download file name, e.g. `strategy.mq5`.
    pub fn file_name(self) -> String {
        format!("strategy.{}", self.extension())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mql4" | "mq4" => Some(CodeLanguage::Mql4),
            "mql5" | "mq5" => Some(CodeLanguage::Mql5),
            "python" | "py" => Some(CodeLanguage::Python),
            "typescript" | "ts" => Some(CodeLanguage::TypeScript),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&l| l == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            CodeLanguage::Mql4 => "MQL4",
            CodeLanguage::Mql5 => "MQL5",
            CodeLanguage::Python => "Python",
            CodeLanguage::TypeScript => "TypeScript",
        }
    }
}

impl fmt::Display for CodeLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

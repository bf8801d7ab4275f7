//! Account breakdowns served next to the main analysis: risk profile,
//! per-session and per-symbol performance, and the closed-trade history.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::analysis::RawTrade;

// ── Risk ──

/// `/analyze/risk` response body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskAnalysis {
    #[serde(default)]
    pub avg_win: f64,
    #[serde(default)]
    pub avg_loss: f64,
    #[serde(default)]
    pub risk_reward_ratio: f64,
    #[serde(default)]
    pub risk_per_trade_pct: f64,
    /// Newer backends report per-trade averages; preferred when non-zero.
    #[serde(default)]
    pub avg_rr: Option<f64>,
    #[serde(default)]
    pub avg_risk_percent: Option<f64>,
}

impl RiskAnalysis {
    pub fn reward_ratio(&self) -> f64 {
        self.avg_rr.filter(|v| *v != 0.0).unwrap_or(self.risk_reward_ratio)
    }

    /// Percent of the account risked per trade.
    pub fn risk_percent(&self) -> f64 {
        self.avg_risk_percent
            .filter(|v| *v != 0.0)
            .unwrap_or(self.risk_per_trade_pct)
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::classify(self.risk_percent())
    }

    pub fn reward_quality(&self) -> RewardQuality {
        RewardQuality::classify(self.reward_ratio())
    }

    /// Share of `|avg_win| + |avg_loss|` taken by the average win, in percent.
    /// An even split when both are zero.
    pub fn win_share(&self) -> f64 {
        let total = self.avg_win.abs() + self.avg_loss.abs();
        if total > 0.0 {
            self.avg_win.abs() / total * 100.0
        } else {
            50.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Conservative,
    Moderate,
    Aggressive,
    VeryAggressive,
}

impl RiskLevel {
    pub fn classify(risk_pct: f64) -> Self {
        match risk_pct {
            p if p <= 1.0 => RiskLevel::Conservative,
            p if p <= 2.0 => RiskLevel::Moderate,
            p if p <= 3.0 => RiskLevel::Aggressive,
            _ => RiskLevel::VeryAggressive,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Conservative => "Conservative",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::Aggressive => "Aggressive",
            RiskLevel::VeryAggressive => "Very aggressive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardQuality {
    Excellent,
    Good,
    Acceptable,
    Low,
    Negative,
}

impl RewardQuality {
    pub fn classify(ratio: f64) -> Self {
        match ratio {
            r if r >= 3.0 => RewardQuality::Excellent,
            r if r >= 2.0 => RewardQuality::Good,
            r if r >= 1.5 => RewardQuality::Acceptable,
            r if r >= 1.0 => RewardQuality::Low,
            _ => RewardQuality::Negative,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RewardQuality::Excellent => "Excellent",
            RewardQuality::Good => "Good",
            RewardQuality::Acceptable => "Acceptable",
            RewardQuality::Low => "Low",
            RewardQuality::Negative => "Negative",
        }
    }
}

// ── Sessions and symbols ──

/// Performance of one session or one symbol.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupStats {
    #[serde(default)]
    pub total_profit: f64,
    #[serde(default)]
    pub trade_count: usize,
    /// Sent for sessions only.
    #[serde(default)]
    pub avg_profit: Option<f64>,
    #[serde(default)]
    pub win_rate: f64,
}

impl GroupStats {
    pub fn from_profits(profits: &[f64]) -> Self {
        let total_profit: f64 = profits.iter().sum();
        let trade_count = profits.len();
        let wins = profits.iter().filter(|&&p| p > 0.0).count();
        let (avg_profit, win_rate) = if trade_count == 0 {
            (0.0, 0.0)
        } else {
            (
                total_profit / trade_count as f64,
                wins as f64 / trade_count as f64 * 100.0,
            )
        };
        Self {
            total_profit,
            trade_count,
            avg_profit: Some(avg_profit),
            win_rate,
        }
    }

    pub fn average(&self) -> f64 {
        match (self.avg_profit, self.trade_count) {
            (Some(avg), _) => avg,
            (None, 0) => 0.0,
            (None, n) => self.total_profit / n as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedGroup {
    pub name: String,
    pub stats: GroupStats,
}

/// Grouped performance (`/analyze/sessions`, `/analyze/symbols`).
///
/// The wire format is one flat object: group name to stats, plus
/// `best_<kind>` / `worst_<kind>` name fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Breakdown {
    pub groups: Vec<NamedGroup>,
    pub best: Option<String>,
    pub worst: Option<String>,
}

impl Breakdown {
    /// Split a flat object; `kind` is `"session"` or `"symbol"`.
    /// Entries that are not stats objects are skipped.
    pub fn from_object(object: Map<String, Value>, kind: &str) -> Self {
        let best_key = format!("best_{kind}");
        let worst_key = format!("worst_{kind}");
        let mut breakdown = Breakdown::default();

        for (name, value) in object {
            if name == best_key {
                breakdown.best = value.as_str().map(str::to_string);
            } else if name == worst_key {
                breakdown.worst = value.as_str().map(str::to_string);
            } else if value.is_object() {
                match serde_json::from_value::<GroupStats>(value) {
                    Ok(stats) => breakdown.groups.push(NamedGroup { name, stats }),
                    Err(e) => tracing::warn!(group = %name, error = %e, "skipping {kind} entry"),
                }
            } else {
                tracing::debug!(key = %name, "ignoring non-stats {kind} field");
            }
        }
        breakdown
    }

    /// Highest total profit first.
    pub fn sorted_by_profit(mut self) -> Self {
        self.groups
            .sort_by(|a, b| b.stats.total_profit.total_cmp(&a.stats.total_profit));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_trades(&self) -> usize {
        self.groups.iter().map(|g| g.stats.trade_count).sum()
    }

    pub fn total_profit(&self) -> f64 {
        self.groups.iter().map(|g| g.stats.total_profit).sum()
    }

    /// Largest absolute total profit, used to scale bars. At least 1.
    pub fn profit_scale(&self) -> f64 {
        self.groups
            .iter()
            .map(|g| g.stats.total_profit.abs())
            .fold(0.0_f64, f64::max)
            .max(1.0)
    }
}

/// Market session for a UTC hour.
pub fn session_for_hour(hour: u32) -> &'static str {
    match hour {
        0..=7 => "Asian",
        8..=12 => "London",
        13..=21 => "New York",
        _ => "Sydney",
    }
}

// ── History ──

/// `/trades/history` response body. Records are newest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TradeHistory {
    #[serde(default)]
    pub trades: Vec<RawTrade>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub days_back: Option<u32>,
}

impl TradeHistory {
    pub fn total_commission(&self) -> f64 {
        self.trades.iter().filter_map(|t| t.commission).sum()
    }

    pub fn total_swap(&self) -> f64 {
        self.trades.iter().filter_map(|t| t.swap).sum()
    }
}

/// Query parameters for `/trades/history`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    pub limit: u32,
    pub days_back: u32,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            limit: 100,
            days_back: 30,
        }
    }
}

//! Trade: one closed position record, validated at ingestion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// Parse the backend's `type` field. Case-insensitive.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BUY" => Some(Direction::Buy),
            "SELL" => Some(Direction::Sell),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A closed trade as consumed by the report aggregator.
///
/// Every `Trade` has passed boundary validation: volume is finite and
/// non-negative, price and profit are finite, and the timestamp parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub ticket: i64,
    pub symbol: String,
    pub direction: Direction,
    pub volume: f64,
    pub price_open: f64,
    pub profit: f64,
    pub time: DateTime<Utc>,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.profit > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.profit < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_trade(profit: f64) -> Trade {
        Trade {
            ticket: 1001,
            symbol: "EURUSD".into(),
            direction: Direction::Buy,
            volume: 0.05,
            price_open: 1.0953,
            profit,
            time: Utc.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn winner_and_loser_are_exclusive() {
        assert!(sample_trade(12.5).is_winner());
        assert!(!sample_trade(12.5).is_loser());
        assert!(sample_trade(-3.0).is_loser());
        let flat = sample_trade(0.0);
        assert!(!flat.is_winner() && !flat.is_loser());
    }

    #[test]
    fn direction_parse_is_case_insensitive() {
        assert_eq!(Direction::parse("buy"), Some(Direction::Buy));
        assert_eq!(Direction::parse(" SELL "), Some(Direction::Sell));
        assert_eq!(Direction::parse("hold"), None);
    }

    #[test]
    fn direction_serializes_uppercase() {
        let json = serde_json::to_string(&Direction::Sell).unwrap();
        assert_eq!(json, "\"SELL\"");
    }
}

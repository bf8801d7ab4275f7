//! Summary statistics: pure functions over an ordered trade slice.
//!
//! Every metric is a pure function: trades in, value out. Nothing here
//! reorders its input; durations and the cumulative series follow the order
//! the caller provides. Empty input degrades to neutral values (0 / `None`)
//! rather than NaN or infinities.

use std::fmt;

use serde::{Deserialize, Serialize};
use tradelens_core::domain::Trade;

const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_MINUTE: f64 = 60_000.0;

/// Derived statistics for one render. Recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    /// Percentage in [0, 100]; 0 when there are no trades.
    pub win_rate: f64,
    pub largest_win: Option<f64>,
    pub largest_loss: Option<f64>,
    pub total_volume: f64,
    pub net_profit: f64,
    pub avg_profit: f64,
    /// Gross gains / |gross losses|. `None` when there are no losing trades.
    pub profit_factor: Option<f64>,
    /// `None` for fewer than two trades.
    pub avg_duration: Option<AvgDuration>,
    pub cumulative_profit: Vec<f64>,
    /// Whether the timestamps were non-decreasing in the order given.
    pub chronological: bool,
}

/// Mean gap between consecutive trade timestamps.
///
/// Negative when the input was not in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvgDuration {
    pub millis: f64,
}

impl AvgDuration {
    /// Whole hours of the absolute duration.
    pub fn hours(&self) -> u64 {
        (self.millis.abs() / MS_PER_HOUR).floor() as u64
    }

    /// Remaining whole minutes of the absolute duration.
    pub fn minutes(&self) -> u64 {
        ((self.millis.abs() % MS_PER_HOUR) / MS_PER_MINUTE).floor() as u64
    }

    pub fn is_negative(&self) -> bool {
        self.millis < 0.0
    }
}

impl fmt::Display for AvgDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() && (self.hours() > 0 || self.minutes() > 0) {
            "-"
        } else {
            ""
        };
        write!(f, "{sign}{}h {}m", self.hours(), self.minutes())
    }
}

/// Compute every summary statistic in one pass over the metric functions.
pub fn summarize(trades: &[Trade]) -> ReportSummary {
    let net = net_profit(trades);
    ReportSummary {
        total_trades: trades.len(),
        winning_trades: winning_trades(trades),
        losing_trades: losing_trades(trades),
        breakeven_trades: trades.iter().filter(|t| t.profit == 0.0).count(),
        win_rate: win_rate(trades),
        largest_win: largest_win(trades),
        largest_loss: largest_loss(trades),
        total_volume: total_volume(trades),
        net_profit: net,
        avg_profit: if trades.is_empty() { 0.0 } else { net / trades.len() as f64 },
        profit_factor: profit_factor(trades),
        avg_duration: avg_duration(trades),
        cumulative_profit: cumulative_profit(trades),
        chronological: is_chronological(trades),
    }
}

// ─── Individual metric functions ────────────────────────────────────

pub fn winning_trades(trades: &[Trade]) -> usize {
    trades.iter().filter(|t| t.is_winner()).count()
}

pub fn losing_trades(trades: &[Trade]) -> usize {
    trades.iter().filter(|t| t.is_loser()).count()
}

/// Percentage of trades with strictly positive profit. 0 for no trades.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    winning_trades(trades) as f64 / trades.len() as f64 * 100.0
}

/// Maximum profit over all trades (may be negative if every trade lost).
pub fn largest_win(trades: &[Trade]) -> Option<f64> {
    trades.iter().map(|t| t.profit).reduce(f64::max)
}

/// Minimum profit over all trades (may be positive if every trade won).
pub fn largest_loss(trades: &[Trade]) -> Option<f64> {
    trades.iter().map(|t| t.profit).reduce(f64::min)
}

pub fn total_volume(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.volume).sum()
}

pub fn net_profit(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.profit).sum()
}

pub fn profit_factor(trades: &[Trade]) -> Option<f64> {
    let gains: f64 = trades.iter().filter(|t| t.profit > 0.0).map(|t| t.profit).sum();
    let losses: f64 = trades.iter().filter(|t| t.profit < 0.0).map(|t| t.profit.abs()).sum();
    if losses == 0.0 {
        None
    } else {
        Some(gains / losses)
    }
}

/// Average of the gaps between adjacent timestamps, in input order.
pub fn avg_duration(trades: &[Trade]) -> Option<AvgDuration> {
    if trades.len() < 2 {
        return None;
    }
    let total_ms: i64 = trades
        .windows(2)
        .map(|w| (w[1].time - w[0].time).num_milliseconds())
        .sum();
    Some(AvgDuration {
        millis: total_ms as f64 / (trades.len() - 1) as f64,
    })
}

/// Running sum of profit, one entry per trade.
pub fn cumulative_profit(trades: &[Trade]) -> Vec<f64> {
    trades
        .iter()
        .scan(0.0, |acc, t| {
            *acc += t.profit;
            Some(*acc)
        })
        .collect()
}

pub fn is_chronological(trades: &[Trade]) -> bool {
    trades.windows(2).all(|w| w[0].time <= w[1].time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use tradelens_core::domain::Direction;

    fn make_trades(profits: &[f64]) -> Vec<Trade> {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        profits
            .iter()
            .enumerate()
            .map(|(i, &p)| Trade {
                ticket: i as i64 + 1,
                symbol: "EURUSD".into(),
                direction: Direction::Buy,
                volume: 0.1,
                price_open: 1.08,
                profit: p,
                time: start + Duration::minutes(90 * i as i64),
            })
            .collect()
    }

    #[test]
    fn counts_skip_breakeven() {
        let trades = make_trades(&[10.0, 0.0, -5.0, 0.0]);
        assert_eq!(winning_trades(&trades), 1);
        assert_eq!(losing_trades(&trades), 1);
        let s = summarize(&trades);
        assert_eq!(s.breakeven_trades, 2);
        assert!((s.win_rate - 25.0).abs() < 1e-10);
    }

    #[test]
    fn empty_input_is_neutral() {
        let s = summarize(&[]);
        assert_eq!(s.win_rate, 0.0);
        assert_eq!(s.largest_win, None);
        assert_eq!(s.largest_loss, None);
        assert_eq!(s.avg_duration, None);
        assert_eq!(s.profit_factor, None);
        assert_eq!(s.avg_profit, 0.0);
        assert!(s.cumulative_profit.is_empty());
        assert!(s.chronological);
    }

    #[test]
    fn largest_win_and_loss_follow_extremes() {
        let all_losers = make_trades(&[-3.0, -8.0]);
        assert_eq!(largest_win(&all_losers), Some(-3.0));
        assert_eq!(largest_loss(&all_losers), Some(-8.0));
    }

    #[test]
    fn profit_factor_ratio() {
        let trades = make_trades(&[30.0, -10.0, 10.0, -10.0]);
        assert!((profit_factor(&trades).unwrap() - 2.0).abs() < 1e-10);
        assert_eq!(profit_factor(&make_trades(&[5.0])), None);
    }

    #[test]
    fn avg_duration_hours_and_minutes() {
        let d = avg_duration(&make_trades(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(d.hours(), 1);
        assert_eq!(d.minutes(), 30);
        assert_eq!(d.to_string(), "1h 30m");
    }

    #[test]
    fn avg_duration_negative_when_reversed() {
        let mut trades = make_trades(&[1.0, 2.0]);
        trades.reverse();
        let d = avg_duration(&trades).unwrap();
        assert!(d.is_negative());
        assert_eq!(d.to_string(), "-1h 30m");
        assert!(!is_chronological(&trades));
    }

    #[test]
    fn zero_duration_has_no_sign() {
        let d = AvgDuration { millis: -0.0 };
        assert_eq!(d.to_string(), "0h 0m");
    }

    #[test]
    fn cumulative_is_prefix_sum() {
        let series = cumulative_profit(&make_trades(&[10.0, -5.0, 20.0]));
        assert_eq!(series, vec![10.0, 5.0, 25.0]);
    }
}

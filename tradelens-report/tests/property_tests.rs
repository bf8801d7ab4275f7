//! Property tests for aggregator invariants.
//!
//! Uses proptest to verify:
//! 1. Counts: winning + losing never exceeds total; win rate stays in [0, 100]
//! 2. Idempotence: summarizing twice yields identical output
//! 3. Chart shape: always `height + 1` value rows plus one axis row
//! 4. Chart markers: at most one marker per column

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use tradelens_core::config::ChartConfig;
use tradelens_core::domain::{Direction, Trade};
use tradelens_report::chart::MARKER;
use tradelens_report::{render_cumulative_chart, summarize};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_profit() -> impl Strategy<Value = f64> {
    prop_oneof![
        1 => Just(0.0),
        4 => (-500.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0),
    ]
}

fn arb_trades(max_len: usize) -> impl Strategy<Value = Vec<Trade>> {
    prop::collection::vec((arb_profit(), 0.01..5.0_f64, 0..600_i64), 0..max_len).prop_map(|rows| {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(i, (profit, volume, offset))| Trade {
                ticket: i as i64,
                symbol: "EURUSD".into(),
                direction: if i % 3 == 0 { Direction::Sell } else { Direction::Buy },
                volume,
                price_open: 1.1,
                profit,
                time: start + Duration::minutes(offset),
            })
            .collect()
    })
}

fn arb_chart_config() -> impl Strategy<Value = ChartConfig> {
    (0..25_usize, 1..=50_usize).prop_map(|(height, max_width)| ChartConfig { height, max_width })
}

// ── 1. Counts ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn winning_plus_losing_at_most_total(trades in arb_trades(80)) {
        let s = summarize(&trades);
        prop_assert!(s.winning_trades + s.losing_trades <= s.total_trades);
        prop_assert_eq!(
            s.winning_trades + s.losing_trades + s.breakeven_trades,
            s.total_trades
        );
        prop_assert!((0.0..=100.0).contains(&s.win_rate));
        prop_assert!(s.win_rate.is_finite());
    }

    #[test]
    fn extremes_bracket_every_profit(trades in arb_trades(80)) {
        let s = summarize(&trades);
        match (s.largest_win, s.largest_loss) {
            (Some(win), Some(loss)) => {
                prop_assert!(loss <= win);
                for t in &trades {
                    prop_assert!(t.profit <= win && t.profit >= loss);
                }
            }
            (None, None) => prop_assert!(trades.is_empty()),
            _ => prop_assert!(false, "largest win/loss must both be present or both absent"),
        }
    }
}

// ── 2. Idempotence ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn summarize_is_idempotent(trades in arb_trades(80)) {
        prop_assert_eq!(summarize(&trades), summarize(&trades));
    }

    #[test]
    fn cumulative_ends_at_net_profit(trades in arb_trades(80)) {
        let s = summarize(&trades);
        prop_assert_eq!(s.cumulative_profit.len(), trades.len());
        if let Some(last) = s.cumulative_profit.last() {
            prop_assert!((last - s.net_profit).abs() < 1e-6);
        }
    }
}

// ── 3. Chart shape ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn chart_row_count_is_fixed(trades in arb_trades(120), config in arb_chart_config()) {
        let chart = render_cumulative_chart(&trades, &config);
        prop_assert_eq!(chart.lines().count(), config.height + 2);
    }

    #[test]
    fn chart_is_reproducible(trades in arb_trades(60), config in arb_chart_config()) {
        prop_assert_eq!(
            render_cumulative_chart(&trades, &config),
            render_cumulative_chart(&trades, &config)
        );
    }
}

// ── 4. Chart markers ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn at_most_one_marker_per_column(trades in arb_trades(120), config in arb_chart_config()) {
        let chart = render_cumulative_chart(&trades, &config);
        let rows: Vec<Vec<char>> = chart
            .lines()
            .take(config.height + 1)
            .map(|l| l.chars().skip(8).collect())
            .collect();
        let columns = trades.len().min(config.max_width);
        for col in 0..columns {
            let markers = rows.iter().filter(|r| r.get(col) == Some(&MARKER)).count();
            prop_assert!(markers <= 1, "column {} has {} markers", col, markers);
        }
    }
}

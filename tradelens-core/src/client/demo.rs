//! Demonstration data for running without a backend.
//!
//! Fifteen EURUSD trades an hour apart, every third one a SELL, with random
//! volume, price and a profit skewed slightly positive. Seeded, so the same
//! seed and clock always produce the same account.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, SecondsFormat, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{AnalysisSource, AnalyzerError};
use crate::domain::{
    session_for_hour, AnalysisResult, AnalysisSummary, Breakdown, GroupStats, HistoryQuery,
    NamedGroup, RawTrade, RiskAnalysis, StrategyCode, TradeHistory,
};

pub const DEMO_TRADE_COUNT: usize = 15;
pub const DEMO_STRATEGY: &str = "Grid/Scalping (DEMO)";
pub const DEMO_SYMBOL: &str = "EURUSD";
/// Account size the demo risk figures are measured against.
pub const DEMO_BALANCE: f64 = 10_000.0;
/// Commission per lot charged on demo history records.
const DEMO_COMMISSION_PER_LOT: f64 = 7.0;

pub struct DemoSource {
    seed: u64,
    now: DateTime<Utc>,
}

impl DemoSource {
    pub fn new(seed: u64) -> Self {
        Self::with_clock(seed, Utc::now())
    }

    /// Fixed clock, for reproducible output.
    pub fn with_clock(seed: u64, now: DateTime<Utc>) -> Self {
        Self { seed, now }
    }

    fn demo_trades(&self) -> Vec<DemoTrade> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        // Oldest first, so the demo satisfies the chronological-order precondition.
        (0..DEMO_TRADE_COUNT)
            .map(|i| {
                let hours_ago = (DEMO_TRADE_COUNT - 1 - i) as i64;
                DemoTrade {
                    ticket: 1000 + i as i64,
                    kind: if i % 3 == 0 { "SELL" } else { "BUY" },
                    volume: 0.01 + rng.gen::<f64>() * 0.09,
                    price: 1.0950 + rng.gen::<f64>() * 0.01,
                    profit: (rng.gen::<f64>() - 0.4) * 50.0,
                    time: self.now - Duration::hours(hours_ago),
                }
            })
            .collect()
    }

    pub fn generate(&self) -> AnalysisResult {
        let demo = self.demo_trades();
        let net_profit: f64 = demo.iter().map(|t| t.profit).sum();
        let wins = demo.iter().filter(|t| t.profit > 0.0).count();
        let count = demo.len();

        AnalysisResult {
            summary: AnalysisSummary {
                total_trades: count,
                net_profit,
                avg_profit: net_profit / count as f64,
                strategy: DEMO_STRATEGY.into(),
                strategy_description:
                    "Demonstration strategy with multiple positions across price levels".into(),
                timeframe: "M15-H1".into(),
                indicators: vec![
                    "Support/Resistance levels".into(),
                    "Moving Averages".into(),
                    "Bollinger Bands".into(),
                ],
                explanation: "Demonstration data for exploring the analyzer without an MT5 connection."
                    .into(),
                win_rate: Some(wins as f64 / count as f64 * 100.0),
                ..AnalysisSummary::default()
            },
            trades: demo.iter().map(DemoTrade::to_raw).collect(),
        }
    }

    fn grouped<F>(&self, kind: &str, key: F) -> Breakdown
    where
        F: Fn(&DemoTrade) -> String,
    {
        let mut by_key: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for t in self.demo_trades() {
            by_key.entry(key(&t)).or_default().push(t.profit);
        }
        let groups: Vec<NamedGroup> = by_key
            .into_iter()
            .map(|(name, profits)| NamedGroup {
                name,
                stats: GroupStats::from_profits(&profits),
            })
            .collect();
        let by_profit = |a: &&NamedGroup, b: &&NamedGroup| {
            a.stats.total_profit.total_cmp(&b.stats.total_profit)
        };
        let best = groups.iter().max_by(by_profit).map(|g| g.name.clone());
        let worst = groups.iter().min_by(by_profit).map(|g| g.name.clone());
        tracing::debug!(kind, groups = groups.len(), "demo breakdown");
        Breakdown { groups, best, worst }
    }
}

struct DemoTrade {
    ticket: i64,
    kind: &'static str,
    volume: f64,
    price: f64,
    profit: f64,
    time: DateTime<Utc>,
}

impl DemoTrade {
    fn to_raw(&self) -> RawTrade {
        RawTrade::new(
            self.ticket,
            DEMO_SYMBOL,
            self.kind,
            self.volume,
            self.price,
            self.profit,
            &self.time.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }
}

impl AnalysisSource for DemoSource {
    fn name(&self) -> &str {
        "demo"
    }

    fn fetch_analysis(&self) -> Result<AnalysisResult, AnalyzerError> {
        Ok(self.generate())
    }

    fn fetch_strategy_code(&self, strategy: &str) -> Result<StrategyCode, AnalyzerError> {
        let header = format!("Template for {strategy} (demo data, not generated by the backend)");
        Ok(StrategyCode {
            mql4: format!("// {header}\nint start() {{ return(0); }}\n"),
            mql5: format!("// {header}\nint OnInit() {{ return(INIT_SUCCEEDED); }}\nvoid OnTick() {{}}\n"),
            python: format!("# {header}\n\ndef on_tick():\n    pass\n"),
            typescript: format!("// {header}\nexport function onTick(): void {{}}\n"),
            explanation: format!(
                "### Implementation Notes\n\n{header}. Connect the backend to receive a real implementation."
            ),
        })
    }

    fn fetch_risk(&self) -> Result<RiskAnalysis, AnalyzerError> {
        let profits: Vec<f64> = self.demo_trades().iter().map(|t| t.profit).collect();
        let mean = |values: Vec<f64>| {
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        };
        let avg_win = mean(profits.iter().copied().filter(|p| *p > 0.0).collect());
        let avg_loss = mean(profits.iter().copied().filter(|p| *p < 0.0).collect());
        let risk_reward_ratio = if avg_loss < 0.0 { avg_win / avg_loss.abs() } else { 0.0 };

        Ok(RiskAnalysis {
            avg_win,
            avg_loss,
            risk_reward_ratio,
            risk_per_trade_pct: avg_loss.abs() / DEMO_BALANCE * 100.0,
            avg_rr: None,
            avg_risk_percent: None,
        })
    }

    fn fetch_sessions(&self) -> Result<Breakdown, AnalyzerError> {
        Ok(self.grouped("session", |t| session_for_hour(t.time.hour()).to_string()))
    }

    fn fetch_symbols(&self) -> Result<Breakdown, AnalyzerError> {
        Ok(self.grouped("symbol", |_| DEMO_SYMBOL.to_string()).sorted_by_profit())
    }

    fn fetch_trade_history(&self, query: HistoryQuery) -> Result<TradeHistory, AnalyzerError> {
        let cutoff = self.now - Duration::days(i64::from(query.days_back));
        let trades: Vec<RawTrade> = self
            .demo_trades()
            .iter()
            .rev()
            .filter(|t| t.time >= cutoff)
            .take(query.limit as usize)
            .map(|t| {
                let mut raw = t.to_raw();
                raw.commission = Some(-(t.volume * DEMO_COMMISSION_PER_LOT));
                raw.swap = Some(0.0);
                raw
            })
            .collect();
        Ok(TradeHistory {
            total: trades.len(),
            trades,
            days_back: Some(query.days_back),
        })
    }
}

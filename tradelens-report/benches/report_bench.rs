//! Criterion benchmarks for the report aggregator.
//!
//! Run with: `cargo bench -p tradelens-report`
//!
//! Measures the three pure stages over growing trade histories:
//! summary statistics, chart rendering, full Markdown composition.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tradelens_core::config::ChartConfig;
use tradelens_core::domain::{AnalysisSummary, Direction, Trade};
use tradelens_report::{render_cumulative_chart, render_markdown_report, summarize, ReportMeta};

/// Deterministic synthetic trade history.
fn generate_trades(count: usize) -> Vec<Trade> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| Trade {
            ticket: i as i64,
            symbol: "EURUSD".to_string(),
            direction: if i % 3 == 0 { Direction::Sell } else { Direction::Buy },
            volume: 0.01 + (i % 10) as f64 * 0.01,
            price_open: 1.095 + (i % 100) as f64 * 0.0001,
            profit: ((i * 37) % 100) as f64 - 40.0,
            time: start + Duration::minutes(45 * i as i64),
        })
        .collect()
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");
    for size in [10, 100, 1000, 10000].iter() {
        let trades = generate_trades(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| summarize(black_box(&trades)));
        });
    }
    group.finish();
}

fn bench_chart(c: &mut Criterion) {
    let trades = generate_trades(50);
    let config = ChartConfig::default();
    c.bench_function("render_cumulative_chart_50", |b| {
        b.iter(|| render_cumulative_chart(black_box(&trades), black_box(&config)));
    });
}

fn bench_markdown(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_markdown_report");
    let analysis = AnalysisSummary {
        strategy: "Grid/Scalping".to_string(),
        timeframe: "M15-H1".to_string(),
        indicators: vec!["Bollinger Bands".to_string(), "RSI".to_string()],
        ..Default::default()
    };
    let meta = ReportMeta {
        analysis: &analysis,
        code_explanation: None,
        generated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        chart: ChartConfig::default(),
    };
    for size in [15, 500].iter() {
        let trades = generate_trades(*size);
        let summary = summarize(&trades);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| render_markdown_report(black_box(&summary), black_box(&trades), &meta));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_summarize, bench_chart, bench_markdown);
criterion_main!(benches);

use chrono::{TimeZone, Utc};
use tradelens_core::config::ChartConfig;
use tradelens_core::domain::{AnalysisSummary, CodeLanguage, Direction, StrategyCode, Trade};
use tradelens_report::metrics::ReportSummary;
use tradelens_report::{
    export_summary_json, export_trades_csv, render_markdown_report, save_report,
    save_strategy_code, summarize, ReportMeta,
};

fn make_trades() -> Vec<Trade> {
    vec![
        Trade {
            ticket: 5001,
            symbol: "XAUUSD".to_string(),
            direction: Direction::Buy,
            volume: 0.1,
            price_open: 2031.45,
            profit: 42.5,
            time: Utc.with_ymd_and_hms(2024, 6, 3, 8, 15, 0).unwrap(),
        },
        Trade {
            ticket: 5002,
            symbol: "XAUUSD".to_string(),
            direction: Direction::Sell,
            volume: 0.2,
            price_open: 2040.1,
            profit: -12.0,
            time: Utc.with_ymd_and_hms(2024, 6, 3, 11, 45, 0).unwrap(),
        },
    ]
}

#[test]
fn test_save_report_creates_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let out = temp_dir.path().join("nested").join("reports");
    let trades = make_trades();
    let analysis = AnalysisSummary {
        strategy: "Breakout".to_string(),
        timeframe: "M1-M5".to_string(),
        ..Default::default()
    };
    let meta = ReportMeta {
        analysis: &analysis,
        code_explanation: None,
        generated_at: Utc.with_ymd_and_hms(2024, 6, 4, 0, 0, 0).unwrap(),
        chart: ChartConfig::default(),
    };
    let report = render_markdown_report(&summarize(&trades), &trades, &meta);

    let path = save_report(&out, "strategy_report.md", &report).unwrap();
    assert_eq!(path, out.join("strategy_report.md"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, report);
    assert!(written.contains("- Market volatility: High frequency/scalping"));
}

#[test]
fn test_save_strategy_code_uses_language_extension() {
    let temp_dir = tempfile::tempdir().unwrap();
    let code = StrategyCode {
        mql4: "// mq4 body".to_string(),
        mql5: "// mq5 body".to_string(),
        python: "print('hi')".to_string(),
        typescript: "export {}".to_string(),
        explanation: String::new(),
    };

    for language in CodeLanguage::ALL {
        let path = save_strategy_code(temp_dir.path(), &code, language).unwrap();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), language.file_name());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), code.source(language));
    }
}

#[test]
fn test_csv_export_rows() {
    let csv = export_trades_csv(&make_trades()).unwrap();
    let mut reader = csv::Reader::from_reader(csv.as_bytes());
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "5001");
    assert_eq!(&rows[1][2], "SELL");
    assert_eq!(&rows[1][6], "30.50");
    assert_eq!(&rows[0][7], "2024-06-03T08:15:00+00:00");
}

#[test]
fn test_summary_json_fields() {
    let summary = summarize(&make_trades());
    let json = export_summary_json(&summary).unwrap();
    let parsed: ReportSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.total_trades, summary.total_trades);
    assert_eq!(parsed.largest_loss, Some(-12.0));
    assert_eq!(parsed.cumulative_profit, vec![42.5, 30.5]);
    assert!((parsed.total_volume - 0.3).abs() < 1e-9);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["winning_trades"], 1);
    assert_eq!(value["avg_duration"]["millis"], 12_600_000.0);
}

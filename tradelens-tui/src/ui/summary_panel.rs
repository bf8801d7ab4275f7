//! Summary panel: backend strategy detection plus local statistics.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use tradelens_report::{money, optional_money, or_not_applicable};

use crate::app::{AppState, LoadedAnalysis};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(analysis) = &app.analysis else {
        super::render_no_data(f, area, app);
        return;
    };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    f.render_widget(
        Paragraph::new(strategy_lines(analysis)).wrap(Wrap { trim: true }),
        cols[0],
    );
    f.render_widget(Paragraph::new(stats_lines(analysis)), cols[1]);
}

fn strategy_lines(analysis: &LoadedAnalysis) -> Vec<Line<'_>> {
    let b = &analysis.backend;
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Strategy   ", theme::muted()),
            Span::styled(b.strategy.as_str(), theme::accent_bold()),
        ]),
        Line::from(vec![
            Span::styled("Timeframe  ", theme::muted()),
            Span::styled(b.timeframe.as_str(), theme::text()),
        ]),
        Line::from(vec![
            Span::styled("Source     ", theme::muted()),
            Span::styled(analysis.source.as_str(), theme::neutral()),
        ]),
        Line::from(""),
        Line::from(Span::styled(b.strategy_description.as_str(), theme::text())),
        Line::from(""),
        Line::from(Span::styled("Indicators", theme::accent_bold())),
    ];
    for indicator in &b.indicators {
        lines.push(Line::from(Span::styled(format!("  • {indicator}"), theme::text())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Analysis", theme::accent_bold())));
    lines.push(Line::from(Span::styled(b.explanation.as_str(), theme::muted())));

    if let (Some(balance), Some(equity)) = (b.account_balance, b.account_equity) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Balance ${balance:.2}  Equity ${equity:.2}"),
            theme::muted(),
        )));
    }
    lines
}

fn stats_lines(analysis: &LoadedAnalysis) -> Vec<Line<'_>> {
    let s = &analysis.summary;
    let mut lines = vec![
        Line::from(Span::styled("Statistics", theme::accent_bold())),
        row("Total trades", s.total_trades.to_string(), theme::text()),
        row("Winning", s.winning_trades.to_string(), theme::positive()),
        row("Losing", s.losing_trades.to_string(), theme::negative()),
        row("Win rate", format!("{:.1}%", s.win_rate), theme::win_rate(s.win_rate)),
        row("Net profit", money(s.net_profit), theme::pnl(s.net_profit)),
        row("Avg profit", money(s.avg_profit), theme::pnl(s.avg_profit)),
        row("Largest win", optional_money(s.largest_win), theme::positive()),
        row("Largest loss", optional_money(s.largest_loss), theme::negative()),
        row(
            "Profit factor",
            or_not_applicable(s.profit_factor, |pf| format!("{pf:.2}")),
            theme::text(),
        ),
        row(
            "Avg duration",
            or_not_applicable(s.avg_duration, |d| d.to_string()),
            theme::text(),
        ),
        row("Total volume", format!("{:.2} lots", s.total_volume), theme::text()),
    ];
    if analysis.rejected > 0 {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{} malformed record(s) skipped (e: details)", analysis.rejected),
            theme::warning(),
        )));
    }
    if !s.chronological {
        lines.push(Line::from(Span::styled(
            "Trades not in chronological order",
            theme::warning(),
        )));
    }
    lines
}

pub(super) fn row(label: &str, value: String, style: ratatui::style::Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label:<14}"), theme::muted()),
        Span::styled(value, style),
    ])
}

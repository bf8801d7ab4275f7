//! Breakdown panel: risk profile, session and symbol performance, recent history costs.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use tradelens_core::{Breakdown, RewardQuality, RiskAnalysis, RiskLevel, TradeHistory};
use tradelens_report::money;

use super::summary_panel::row;
use crate::app::AppState;
use crate::theme;

const BAR_WIDTH: usize = 20;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    if app.analysis.is_none() {
        super::render_no_data(f, area, app);
        return;
    }
    let Some(breakdowns) = &app.breakdowns else {
        let hint = if app.loading {
            "Loading..."
        } else {
            "Press b to fetch risk, session, symbol and history breakdowns."
        };
        f.render_widget(
            Paragraph::new(vec![Line::from(""), Line::from(Span::styled(hint, theme::muted()))]),
            area,
        );
        return;
    };

    let mut lines: Vec<Line<'static>> = vec![Line::from(vec![
        Span::styled("Source ", theme::muted()),
        Span::styled(breakdowns.source.clone(), theme::neutral()),
    ])];

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Risk", theme::accent_bold())));
    match &breakdowns.risk {
        Some(risk) => lines.extend(risk_lines(risk)),
        None => lines.push(unavailable()),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Sessions", theme::accent_bold())));
    match &breakdowns.sessions {
        Some(sessions) => lines.extend(group_lines(sessions)),
        None => lines.push(unavailable()),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Symbols", theme::accent_bold())));
    match &breakdowns.symbols {
        Some(symbols) => lines.extend(group_lines(symbols)),
        None => lines.push(unavailable()),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("History", theme::accent_bold())));
    match &breakdowns.history {
        Some(history) => lines.extend(history_lines(history)),
        None => lines.push(unavailable()),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  [j/k]scroll [b]refresh", theme::muted())));

    f.render_widget(Paragraph::new(lines).scroll((app.breakdown_scroll, 0)), area);
}

fn risk_lines(risk: &RiskAnalysis) -> Vec<Line<'static>> {
    let level = risk.risk_level();
    let quality = risk.reward_quality();
    let win_cells = (risk.win_share() / 100.0 * BAR_WIDTH as f64).round() as usize;
    vec![
        row(
            "Risk/trade",
            format!("{:.2}%  {}", risk.risk_percent(), level.label()),
            risk_style(level),
        ),
        row(
            "Reward:risk",
            format!("1:{:.2}  {}", risk.reward_ratio(), quality.label()),
            reward_style(quality),
        ),
        row("Avg win", money(risk.avg_win), theme::positive()),
        row("Avg loss", money(risk.avg_loss), theme::negative()),
        Line::from(vec![
            Span::styled(format!("  {:<14}", "Win/loss"), theme::muted()),
            Span::styled("█".repeat(win_cells), theme::positive()),
            Span::styled("█".repeat(BAR_WIDTH.saturating_sub(win_cells)), theme::negative()),
        ]),
    ]
}

fn group_lines(breakdown: &Breakdown) -> Vec<Line<'static>> {
    if breakdown.is_empty() {
        return vec![Line::from(Span::styled("  No data", theme::muted()))];
    }
    let scale = breakdown.profit_scale();
    let mut lines: Vec<Line<'static>> = breakdown
        .groups
        .iter()
        .map(|group| {
            let s = &group.stats;
            let cells = ((s.total_profit.abs() / scale) * BAR_WIDTH as f64).round() as usize;
            Line::from(vec![
                Span::styled(format!("  {:<12}", group.name), theme::text()),
                Span::styled(format!("{:<w$} ", "█".repeat(cells), w = BAR_WIDTH), theme::pnl(s.total_profit)),
                Span::styled(format!("{:>11} ", money(s.total_profit)), theme::pnl(s.total_profit)),
                Span::styled(format!("{:>4} trades ", s.trade_count), theme::muted()),
                Span::styled(format!("{:>5.1}% ", s.win_rate), theme::win_rate(s.win_rate)),
                Span::styled(format!("avg {}", money(s.average())), theme::muted()),
            ])
        })
        .collect();
    if let (Some(best), Some(worst)) = (&breakdown.best, &breakdown.worst) {
        lines.push(Line::from(vec![
            Span::styled("  Best ", theme::muted()),
            Span::styled(best.clone(), theme::positive()),
            Span::styled("  Worst ", theme::muted()),
            Span::styled(worst.clone(), theme::negative()),
        ]));
    }
    lines
}

fn history_lines(history: &TradeHistory) -> Vec<Line<'static>> {
    let window = history
        .days_back
        .map_or_else(String::new, |days| format!(" in the last {days} days"));
    vec![
        row("Closed deals", format!("{}{window}", history.total), theme::text()),
        row("Commission", money(history.total_commission()), theme::pnl(history.total_commission())),
        row("Swap", money(history.total_swap()), theme::pnl(history.total_swap())),
    ]
}

fn unavailable() -> Line<'static> {
    Line::from(Span::styled("  Unavailable (e: details)", theme::warning()))
}

fn risk_style(level: RiskLevel) -> Style {
    match level {
        RiskLevel::Conservative => theme::positive(),
        RiskLevel::Moderate => theme::accent(),
        RiskLevel::Aggressive => theme::warning(),
        RiskLevel::VeryAggressive => theme::negative(),
    }
}

fn reward_style(quality: RewardQuality) -> Style {
    match quality {
        RewardQuality::Excellent | RewardQuality::Good => theme::positive(),
        RewardQuality::Acceptable => theme::accent(),
        RewardQuality::Low => theme::warning(),
        RewardQuality::Negative => theme::negative(),
    }
}

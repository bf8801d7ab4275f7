//! Trades panel: scrollable trade table with running total.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &mut AppState) {
    let visible_height = area.height.saturating_sub(2) as usize;
    app.trades.follow(visible_height);

    let Some(analysis) = &app.analysis else {
        super::render_no_data(f, area, app);
        return;
    };

    let mut lines: Vec<Line> = vec![Line::from(Span::styled(
        format!(
            "{:>4} {:>10} {:<8} {:<4} {:>6} {:>10} {:>10} {:>11}  {}",
            "#", "Ticket", "Symbol", "Type", "Lots", "Price", "Profit", "Cumulative", "Time"
        ),
        theme::accent_bold(),
    ))];

    if analysis.trades.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("No trades in this account.", theme::muted())));
    }

    let start = app.trades.scroll_offset;
    let end = (start + visible_height).min(analysis.trades.len());
    for i in start..end {
        let t = &analysis.trades[i];
        let cumulative = analysis.summary.cumulative_profit.get(i).copied().unwrap_or(0.0);
        let is_cursor = i == app.trades.cursor;
        let base = if is_cursor {
            theme::accent().add_modifier(Modifier::REVERSED)
        } else {
            theme::text()
        };
        let pick = |style| if is_cursor { base } else { style };

        lines.push(Line::from(vec![
            Span::styled(format!("{:>4} {:>10} {:<8} ", i + 1, t.ticket, truncate(&t.symbol, 8)), base),
            Span::styled(format!("{:<4} ", t.direction.as_str()), pick(theme::direction(t.direction.as_str()))),
            Span::styled(format!("{:>6.2} {:>10.5} ", t.volume, t.price_open), base),
            Span::styled(format!("{:>10.2} ", t.profit), pick(theme::pnl(t.profit))),
            Span::styled(format!("{:>11.2}  ", cumulative), pick(theme::pnl(cumulative))),
            Span::styled(t.time.format("%Y-%m-%d %H:%M").to_string(), pick(theme::muted())),
        ]));
    }

    if !analysis.trades.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {}/{}  [j/k]scroll [g/G]top/bottom", app.trades.cursor + 1, analysis.trades.len()),
            theme::muted(),
        )));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 1).collect();
        format!("{head}.")
    }
}

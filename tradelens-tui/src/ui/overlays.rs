//! Popups drawn over the active panel.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;
use crate::ui::centered_rect;

/// Clear a centered popup, draw its frame and return the inner area.
fn popup(f: &mut Frame, area: Rect, size: (u16, u16), title: String, color: Style) -> Rect {
    let rect = centered_rect(size.0, size.1, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(color)
        .title(Span::styled(title, color.add_modifier(Modifier::BOLD)));
    let inner = block.inner(rect);
    f.render_widget(block, rect);
    inner
}

fn key_hint(key: &'static str, action: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(format!("  [{key}] "), theme::accent_bold()),
        Span::styled(action, theme::text()),
    ]
}

pub fn render_welcome(f: &mut Frame, area: Rect) {
    let inner = popup(f, area, (60, 45), " Welcome to TradeLens ".into(), theme::accent());

    let steps = [
        "Start the analysis backend on the machine running MT5.",
        "Press a to analyze the account, or d to try demo data.",
        "Switch between Summary, Chart and Trades with 1-3.",
        "Press r to save the Markdown report and c for strategy code.",
    ];
    let mut text = vec![Line::from(Span::styled("Getting started", theme::accent_bold())), Line::from("")];
    text.extend(steps.iter().enumerate().map(|(i, step)| {
        Line::from(vec![
            Span::styled(format!(" {}. ", i + 1), theme::accent()),
            Span::styled(*step, theme::muted()),
        ])
    }));
    text.push(Line::from(""));
    text.push(Line::from(Span::styled("Any key closes this window.", theme::neutral())));

    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
}

pub fn render_connection_error(f: &mut Frame, area: Rect, message: &str) {
    let inner = popup(f, area, (64, 40), " Backend unreachable ".into(), theme::negative());

    let mut actions = Vec::new();
    actions.extend(key_hint("a", "Retry"));
    actions.extend(key_hint("d", "Demo data"));
    actions.extend(key_hint("Esc", "Dismiss"));

    let text = vec![
        Line::from(Span::styled(message, theme::negative())),
        Line::from(""),
        Line::from(Span::styled(
            "Check that the analysis backend is running and that MT5 is logged in.",
            theme::muted(),
        )),
        Line::from(""),
        Line::from(actions),
    ];
    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
}

/// Newest first; the selected row follows `error_scroll`.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let title = format!(" Errors: {}  [j/k] move  [Esc] close ", app.error_history.len());
    let inner = popup(f, area, (80, 70), title, theme::negative());

    if app.error_history.is_empty() {
        f.render_widget(Paragraph::new(Span::styled("Nothing has failed yet.", theme::muted())), inner);
        return;
    }

    // Header row takes one line.
    let rows_visible = (inner.height as usize).saturating_sub(1).max(1);
    let first = app.error_scroll.saturating_sub(rows_visible - 1);

    let rows = app
        .error_history
        .iter()
        .enumerate()
        .skip(first)
        .take(rows_visible)
        .map(|(i, record)| {
            let message = if record.context.is_empty() {
                record.message.clone()
            } else {
                format!("{} ({})", record.message, record.context)
            };
            let row = Row::new(vec![
                Cell::from(record.timestamp.format("%H:%M:%S").to_string()).style(theme::muted()),
                Cell::from(record.category.label()).style(theme::warning()),
                Cell::from(message),
            ]);
            if i == app.error_scroll {
                row.style(theme::negative().add_modifier(Modifier::BOLD))
            } else {
                row.style(theme::text())
            }
        });

    let table = Table::new(
        rows,
        [Constraint::Length(8), Constraint::Length(4), Constraint::Min(10)],
    )
    .header(Row::new(vec!["Time", "Kind", "Message"]).style(theme::accent_bold()))
    .column_spacing(2);

    f.render_widget(table, inner);
}

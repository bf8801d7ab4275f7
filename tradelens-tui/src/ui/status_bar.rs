//! Bottom status bar: panel hints, code language, last status message.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = vec![
        Span::styled(" 1:Summary 2:Chart 3:Trades 4:Breakdown 5:Help", theme::muted()),
        Span::raw(" | "),
        Span::styled(format!("code: {}", app.code_language), theme::neutral()),
        Span::raw(" | "),
    ];

    if app.loading {
        spans.push(Span::styled("⟳ ", theme::warning()));
    }

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

//! Help panel: keyboard shortcuts.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Navigation");
    key(&mut lines, "1-5", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Analysis");
    key(&mut lines, "a", "Analyze the connected MT5 account");
    key(&mut lines, "d", "Load demonstration data");
    key(&mut lines, "b", "Fetch risk, session, symbol and history breakdowns");
    key(&mut lines, "e", "Open error history");
    lines.push(Line::from(""));

    section(&mut lines, "Export");
    key(&mut lines, "r", "Save the Markdown report");
    key(&mut lines, "c", "Fetch strategy code and save the selected language");
    key(&mut lines, "l", "Cycle code language (MQL4 → MQL5 → Python → TypeScript)");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 3: Trades");
    key(&mut lines, "j / k", "Scroll trades");
    key(&mut lines, "g / G", "Jump to first / last trade");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 4: Breakdown");
    key(&mut lines, "j / k", "Scroll");
    lines.push(Line::from(""));

    section(&mut lines, "Output");
    key(
        &mut lines,
        "Directory",
        &app.config.report.output_dir.display().to_string(),
    );
    key(&mut lines, "Report file", &app.config.report.file_name);
    key(&mut lines, "Backend", &app.config.api.base_url);

    f.render_widget(Paragraph::new(lines), area);
}

fn section<'a>(lines: &mut Vec<Line<'a>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key<'a>(lines: &mut Vec<Line<'a>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>18}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}

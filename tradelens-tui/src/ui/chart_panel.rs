//! Chart panel: cumulative profit as a line chart, plus the plain-text
//! rendering that goes into the exported report.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use tradelens_report::render_cumulative_chart;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(analysis) = &app.analysis else {
        super::render_no_data(f, area, app);
        return;
    };
    let curve = &analysis.summary.cumulative_profit;
    if curve.is_empty() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("No trades to plot.", theme::muted())),
        ];
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    let ascii = render_cumulative_chart(&analysis.trades, &app.config.chart);
    let ascii_height = ascii.lines().count() as u16 + 2;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(ascii_height)])
        .split(area);

    render_line_chart(f, rows[0], curve);

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(theme::muted())
        .title(Span::styled(" Report preview ", theme::muted()));
    f.render_widget(Paragraph::new(ascii).style(theme::text()).block(block), rows[1]);
}

fn render_line_chart(f: &mut Frame, area: Rect, curve: &[f64]) {
    // Include zero so the baseline is always on screen.
    let min_y = curve.iter().copied().fold(0.0_f64, f64::min);
    let max_y = curve.iter().copied().fold(0.0_f64, f64::max);
    let padding = ((max_y - min_y).abs() * 0.05).max(1.0);
    let y_min = min_y - padding;
    let y_max = max_y + padding;
    let x_max = curve.len() as f64;

    let data: Vec<(f64, f64)> = curve
        .iter()
        .enumerate()
        .map(|(i, &v)| ((i + 1) as f64, v))
        .collect();

    let last = curve.last().copied().unwrap_or(0.0);
    let dataset = Dataset::default()
        .name(format!("Cumulative P/L ${last:.2}"))
        .marker(symbols::Marker::Braille)
        .style(theme::pnl(last))
        .graph_type(GraphType::Line)
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .title(Span::styled("Trade #", theme::muted()))
                .style(theme::muted())
                .bounds([1.0, x_max.max(2.0)])
                .labels(vec![
                    Span::styled("1", theme::muted()),
                    Span::styled(format!("{}", curve.len()), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("$", theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.0}"), theme::muted()),
                    Span::styled("0", theme::muted()),
                    Span::styled(format!("{y_max:.0}"), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}

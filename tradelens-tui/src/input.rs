//! Keyboard input dispatch: overlays, then global keys, then panel-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, ErrorCategory, Overlay, Panel};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match &app.overlay {
        Overlay::Welcome => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::ConnectionError(_) => {
            handle_connection_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        KeyCode::Char('1') => { app.active_panel = Panel::Summary; return; }
        KeyCode::Char('2') => { app.active_panel = Panel::Chart; return; }
        KeyCode::Char('3') => { app.active_panel = Panel::Trades; return; }
        KeyCode::Char('4') => { app.active_panel = Panel::Breakdown; return; }
        KeyCode::Char('5') => { app.active_panel = Panel::Help; return; }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Char('a') => {
            app.request_analysis(false);
            return;
        }
        KeyCode::Char('d') => {
            app.request_analysis(true);
            return;
        }
        KeyCode::Char('r') => {
            save_report(app);
            return;
        }
        KeyCode::Char('c') => {
            app.request_code();
            return;
        }
        KeyCode::Char('l') => {
            app.cycle_language();
            return;
        }
        KeyCode::Char('b') => {
            app.request_breakdowns();
            return;
        }
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Trades => handle_trades_key(app, key),
        Panel::Breakdown => handle_breakdown_key(app, key),
        _ => {}
    }
}

fn save_report(app: &mut AppState) {
    match app.save_report() {
        Ok(Some(path)) => app.set_status(format!("Report saved to {}", path.display())),
        Ok(None) => app.set_warning("Nothing to export yet (a: analyze, d: demo)"),
        Err(e) => app.push_error(ErrorCategory::Export, format!("{e:#}"), "save report".into()),
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_connection_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('a') | KeyCode::Char('r') | KeyCode::Enter => app.request_analysis(false),
        KeyCode::Char('d') => app.request_analysis(true),
        KeyCode::Esc => app.overlay = Overlay::None,
        KeyCode::Char('q') => app.running = false,
        _ => {}
    }
}

fn handle_trades_key(app: &mut AppState, key: KeyEvent) {
    let len = app.trade_count();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.trades.down(len),
        KeyCode::Char('k') | KeyCode::Up => app.trades.up(),
        KeyCode::Char('g') | KeyCode::Home => app.trades.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.trades.cursor = len.saturating_sub(1),
        _ => {}
    }
}

fn handle_breakdown_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.breakdown_scroll = app.breakdown_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => app.breakdown_scroll = app.breakdown_scroll.saturating_sub(1),
        KeyCode::Char('g') | KeyCode::Home => app.breakdown_scroll = 0,
        _ => {}
    }
}

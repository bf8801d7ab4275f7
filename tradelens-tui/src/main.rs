//! TradeLens TUI: five-panel terminal dashboard for MT5 trade analysis.
//!
//! Panels:
//! 1. Summary: detected strategy and local statistics
//! 2. Chart: cumulative profit curve
//! 3. Trades: scrollable trade table
//! 4. Breakdown: risk profile, sessions, symbols, history costs
//! 5. Help: keyboard shortcuts and output locations

mod app;
mod input;
mod persistence;
mod theme;
mod ui;
mod worker;

use std::fs::File;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::EnvFilter;

use tradelens_core::DashboardConfig;

use crate::app::{AppState, ErrorCategory, Overlay};
use crate::worker::{WorkerCommand, WorkerResponse};

const CONFIG_ENV: &str = "TRADELENS_CONFIG";
const TICK: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        // Leave raw mode first or the panic message is unreadable.
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        previous_hook(info);
    }));

    let app_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tradelens");
    let state_path = app_dir.join("state.json");

    init_logging(&app_dir);

    let config = load_config(&app_dir)?;
    let persisted = persistence::load(&state_path);

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(cmd_rx, resp_tx, config.api.clone())
        .context("failed to spawn worker thread")?;

    let mut app = AppState::new(cmd_tx.clone(), resp_rx, config);
    persistence::apply(&mut app, persisted);

    let mut terminal = enter_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    let restored = leave_terminal(&mut terminal);

    // Save state before exit
    let persisted = persistence::extract(&app);
    if let Err(e) = persistence::save(&state_path, &persisted) {
        tracing::warn!(error = %e, "failed to save UI state");
    }

    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    result.and(restored)
}

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

fn enter_terminal() -> Result<Tui> {
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;
    Ok(terminal)
}

fn leave_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Log to a file next to the state file; the terminal belongs to the UI.
fn init_logging(app_dir: &Path) {
    if std::fs::create_dir_all(app_dir).is_err() {
        return;
    }
    let Ok(file) = File::create(app_dir.join("tradelens-tui.log")) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

/// `$TRADELENS_CONFIG`, then `<config dir>/tradelens/config.toml`, then env defaults.
fn load_config(app_dir: &Path) -> Result<DashboardConfig> {
    let path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| app_dir.join("config.toml"));
    let config = if path.exists() {
        DashboardConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?
    } else {
        DashboardConfig::from_env()
    };
    config.validate().context("invalid configuration")?;
    tracing::info!(backend = %config.api.base_url, "configuration loaded");
    Ok(config)
}

/// Draw, apply worker results, then wait up to one tick for a key.
fn run_app(terminal: &mut Tui, app: &mut AppState) -> Result<()> {
    while app.running {
        terminal.draw(|f| ui::draw(f, app))?;

        while let Ok(resp) = app.worker_rx.try_recv() {
            handle_worker_response(app, resp);
        }

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            input::handle_key(app, key);
        }
    }
    Ok(())
}

fn handle_worker_response(app: &mut AppState, resp: WorkerResponse) {
    app.loading = false;
    match resp {
        WorkerResponse::AnalysisLoaded { result, source } => {
            app.load_analysis(*result, source);
        }
        WorkerResponse::AnalysisFailed {
            error,
            connectivity: true,
        } => {
            app.push_error(ErrorCategory::Network, error.clone(), "analyze account".into());
            app.overlay = Overlay::ConnectionError(error);
        }
        WorkerResponse::AnalysisFailed { error, .. } => {
            app.push_error(ErrorCategory::Backend, error, "analyze account".into());
        }
        WorkerResponse::CodeLoaded { code, language } => match app.save_code(*code, language) {
            Ok(path) => app.set_status(format!("{language} code saved to {}", path.display())),
            Err(e) => app.push_error(ErrorCategory::Export, format!("{e:#}"), "save strategy code".into()),
        },
        WorkerResponse::CodeFailed { error } => {
            app.push_error(ErrorCategory::Backend, error, "fetch strategy code".into());
        }
        WorkerResponse::BreakdownsLoaded { breakdowns } => app.load_breakdowns(*breakdowns),
        WorkerResponse::BreakdownsFailed { error } => {
            app.push_error(ErrorCategory::Backend, error, "fetch breakdowns".into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use tradelens_core::{CodeLanguage, StrategyCode};

    #[test]
    fn connectivity_failure_opens_overlay() {
        let (mut app, _rx) = test_app();
        app.loading = true;
        handle_worker_response(
            &mut app,
            WorkerResponse::AnalysisFailed {
                error: "backend unreachable".into(),
                connectivity: true,
            },
        );
        assert!(!app.loading);
        assert_eq!(app.overlay, Overlay::ConnectionError("backend unreachable".into()));
        assert_eq!(app.error_history[0].category, ErrorCategory::Network);
    }

    #[test]
    fn backend_failure_only_records_error() {
        let (mut app, _rx) = test_app();
        handle_worker_response(
            &mut app,
            WorkerResponse::AnalysisFailed {
                error: "HTTP 500".into(),
                connectivity: false,
            },
        );
        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(app.error_history[0].category, ErrorCategory::Backend);
    }

    #[test]
    fn code_is_saved_in_the_requested_language() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = test_app();
        app.config.report.output_dir = dir.path().to_path_buf();
        // Cycled after pressing c; the response still names the original choice.
        app.code_language = CodeLanguage::Python;
        let code = StrategyCode {
            mql5: "// ea".into(),
            python: "# bot".into(),
            ..StrategyCode::default()
        };
        handle_worker_response(
            &mut app,
            WorkerResponse::CodeLoaded {
                code: Box::new(code),
                language: CodeLanguage::Mql5,
            },
        );
        let written: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(written.len(), 1);
        assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "// ea");
        assert!(app.last_code.is_some());
    }
}

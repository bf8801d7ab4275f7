//! UI preferences kept between sessions as a small JSON file.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use tradelens_core::CodeLanguage;

use crate::app::{AppState, Overlay, Panel};

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub active_panel: Panel,
    pub code_language: CodeLanguage,
    pub welcome_dismissed: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            active_panel: Panel::Summary,
            code_language: CodeLanguage::default(),
            welcome_dismissed: false,
        }
    }
}

/// Read the state file. A missing or unreadable file yields the defaults.
pub fn load(path: &Path) -> PersistedState {
    let Ok(content) = std::fs::read_to_string(path) else {
        return PersistedState::default();
    };
    match serde_json::from_str(&content) {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt state file");
            PersistedState::default()
        }
    }
}

/// Written to a sibling temp file, then renamed into place.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_vec_pretty(state)?)
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        active_panel: app.active_panel,
        code_language: app.code_language,
        welcome_dismissed: app.overlay != Overlay::Welcome,
    }
}

pub fn apply(app: &mut AppState, state: PersistedState) {
    app.active_panel = state.active_panel;
    app.code_language = state.code_language;
    if !state.welcome_dismissed {
        app.overlay = Overlay::Welcome;
    }
}

//! Paths and configuration for the player.
//!
//! Every singleton file the system touches (identity record, lock file,
//! daemon log, selection state, cue assets) is resolved once into a
//! [`Paths`] value and passed to the components that need it; nothing
//! re-derives locations from the environment at call sites.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, PlayerError, Result};
use crate::types::CueKind;

/// Environment variable overriding the config directory (used by tests
/// and by users who relocate their configuration).
pub const CONFIG_DIR_ENV: &str = "AI_BGM_CONFIG_DIR";

/// Name of the selection that applies when none has been saved.
pub const DEFAULT_SELECTION: &str = "default";

/// Built-in cue library compiled into the binary.
const BUILTIN_CUES: &str = include_str!("builtin_cues.json");

/// File lists for one sound-set, keyed by cue name.
pub type CueSet = HashMap<String, Vec<String>>;

/// All known sound-sets, keyed by selection name.
pub type CueLibrary = HashMap<String, CueSet>;

/// Filesystem locations for the player's singleton state.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Per-user configuration directory holding all player state.
    pub config_dir: PathBuf,
}

impl Paths {
    /// Resolves the per-user configuration directory.
    ///
    /// `AI_BGM_CONFIG_DIR` wins when set; otherwise the platform config
    /// directory (`~/.config/ai-bgm` on Linux) is used.
    pub fn resolve() -> Self {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Self::from_dir(PathBuf::from(dir));
        }

        let base = directories::BaseDirs::new()
            .map(|d| d.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".config"));

        Self::from_dir(base.join("ai-bgm"))
    }

    /// Creates a Paths rooted at an explicit directory.
    pub fn from_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Creates the configuration directory if it does not exist yet.
    pub fn ensure_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)
            .map_err(|e| PlayerError::io(e, self.config_dir.display().to_string()))
    }

    /// Returns the path to the identity record (current player pid).
    pub fn pid_file(&self) -> PathBuf {
        self.config_dir.join("bgm_player.pid")
    }

    /// Returns the path to the lifecycle lock file.
    pub fn lock_file(&self) -> PathBuf {
        self.config_dir.join("bgm_player.lock")
    }

    /// Returns the path to the daemon log.
    pub fn log_file(&self) -> PathBuf {
        self.config_dir.join("bgm_player.log")
    }

    /// Returns the path to the persisted selection state.
    pub fn selection_file(&self) -> PathBuf {
        self.config_dir.join("selection.json")
    }

    /// Returns the path to the user's cue library extension.
    pub fn cue_ext_file(&self) -> PathBuf {
        self.config_dir.join("config_ext.json")
    }

    /// Returns the directory holding sound assets for all selections.
    pub fn sounds_dir(&self) -> PathBuf {
        self.config_dir.join("sounds")
    }

    /// Returns the full path of one sound file within a selection.
    pub fn cue_asset(&self, selection: &str, file: &str) -> PathBuf {
        self.sounds_dir().join(selection).join(file)
    }
}

/// Persisted selection state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    /// Name of the active sound-set.
    #[serde(default = "default_selection_name")]
    pub selected: String,
    /// Global kill-switch consulted by the play command.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_selection_name() -> String {
    DEFAULT_SELECTION.to_string()
}

fn default_enabled() -> bool {
    true
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            selected: default_selection_name(),
            enabled: true,
        }
    }
}

/// Loads the selection state, falling back to the default sound-set when
/// the file is missing or unreadable.
pub fn load_selection(paths: &Paths) -> Selection {
    let path = paths.selection_file();
    match std::fs::read_to_string(&path) {
        Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!("ignoring malformed {}: {}", path.display(), e);
            Selection::default()
        }),
        Err(_) => Selection::default(),
    }
}

/// Persists the selection state.
pub fn save_selection(paths: &Paths, selection: &Selection) -> Result<()> {
    paths.ensure_exists()?;
    let path = paths.selection_file();
    let text = serde_json::to_string_pretty(selection)
        .map_err(|e| PlayerError::new(ErrorCode::Io, e.to_string()))?;
    std::fs::write(&path, text).map_err(|e| PlayerError::io(e, path.display().to_string()))
}

/// Flips the enabled flag, preserving the selected sound-set.
pub fn set_enabled(paths: &Paths, enabled: bool) -> Result<()> {
    let mut selection = load_selection(paths);
    selection.enabled = enabled;
    save_selection(paths, &selection)
}

/// Loads the cue library: the built-in table merged with the user's
/// `config_ext.json`, where an extension entry replaces the built-in
/// sound-set of the same name.
pub fn load_cue_library(paths: &Paths) -> Result<CueLibrary> {
    let mut library: CueLibrary = serde_json::from_str(BUILTIN_CUES)
        .map_err(|e| PlayerError::new(ErrorCode::Io, format!("built-in cue library: {}", e)))?;

    let ext_path = paths.cue_ext_file();
    if ext_path.exists() {
        let text = std::fs::read_to_string(&ext_path)
            .map_err(|e| PlayerError::io(e, ext_path.display().to_string()))?;
        let ext: CueLibrary = serde_json::from_str(&text).map_err(|e| {
            PlayerError::with_context(
                ErrorCode::Io,
                format!("malformed cue extension: {}", e),
                ext_path.display().to_string(),
            )
        })?;
        library.extend(ext);
    }

    Ok(library)
}

/// Resolves the file list for one cue within one selection.
///
/// An empty list is a valid result ("nothing to play"); unknown selection
/// or cue names are configuration errors.
pub fn resolve_cue_files(
    library: &CueLibrary,
    selection: &str,
    cue: CueKind,
) -> Result<Vec<String>> {
    let set = library
        .get(selection)
        .ok_or_else(|| PlayerError::selection_not_found(selection))?;
    let files = set
        .get(cue.as_str())
        .ok_or_else(|| PlayerError::cue_not_configured(cue.as_str(), selection))?;
    Ok(files.clone())
}

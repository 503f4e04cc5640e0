use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::model::{Settings, ViewMode};

const APP_DIR: &str = "todo";
const CONFIG_FILE: &str = "config.toml";

/// Error type for writing the config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml_edit::TomlError,
    },
}

/// Raw view of the config file. Every value is kept as an untyped TOML value
/// so one bad entry never invalidates the others.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    todo_path: Option<toml::Value>,
    /// Key used by older versions of the tool
    #[serde(default, rename = "TODO_PATH")]
    legacy_todo_path: Option<toml::Value>,
    #[serde(default)]
    view_mode: Option<toml::Value>,
}

/// Get the user's home directory
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// `$<var>/todo` if the XDG variable is set, else `~/<fallback>/todo`
fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| dirs_home().join(fallback))
        .join(APP_DIR)
}

/// Config file path, respecting XDG_CONFIG_HOME
pub fn config_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config").join(CONFIG_FILE)
}

/// Default directory for the task file, respecting XDG_DATA_HOME
pub fn default_todo_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

/// Directory for the diagnostic log, respecting XDG_STATE_HOME
pub fn state_dir() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", ".local/state")
}

/// Expand a leading `~/` against `home`
pub fn expand_home(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        return home.to_path_buf();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Resolve settings from config text. Each value that is missing or
/// malformed falls back to its default independently.
pub fn parse_settings(text: &str, default_dir: &Path, home: &Path) -> Settings {
    let raw: ConfigFile = match toml::from_str(text) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "config is not valid TOML, using defaults");
            ConfigFile::default()
        }
    };

    let path_value = raw.todo_path.or(raw.legacy_todo_path);
    let todo_dir = match path_value {
        None => default_dir.to_path_buf(),
        Some(toml::Value::String(s)) if !s.trim().is_empty() => expand_home(s.trim(), home),
        Some(other) => {
            tracing::warn!(value = %other, "ignoring unusable todo_path");
            default_dir.to_path_buf()
        }
    };

    let view_mode = match raw.view_mode {
        None => ViewMode::default(),
        Some(value) => match value.as_integer().and_then(ViewMode::from_index) {
            Some(mode) => mode,
            None => {
                tracing::warn!(value = %value, "ignoring unusable view_mode");
                ViewMode::default()
            }
        },
    };

    Settings {
        todo_dir,
        view_mode,
    }
}

/// Read settings from `path`. A missing or unreadable file yields defaults.
pub fn read_settings(path: &Path) -> Settings {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "could not read config");
            }
            String::new()
        }
    };
    parse_settings(&text, &default_todo_dir(), &dirs_home())
}

/// Contents written on first start
pub fn default_config_text(todo_dir: &Path) -> String {
    let mut doc = toml_edit::DocumentMut::new();
    doc["todo_path"] = toml_edit::value(todo_dir.display().to_string());
    doc["view_mode"] = toml_edit::value(ViewMode::default().as_index());
    doc.to_string()
}

/// Read settings, creating a default config file and the todo directory when
/// they do not exist yet. Creation failures are logged, never fatal.
pub fn load_or_init(path: &Path) -> Settings {
    if !path.exists() {
        let text = default_config_text(&default_todo_dir());
        let created = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|_| fs::write(path, text));
        if let Err(e) = created {
            tracing::warn!(path = %path.display(), error = %e, "could not create default config");
        }
    }

    let settings = read_settings(path);
    if let Err(e) = fs::create_dir_all(&settings.todo_dir) {
        tracing::warn!(
            path = %settings.todo_dir.display(),
            error = %e,
            "could not create todo directory"
        );
    }
    settings
}

/// Set `view_mode` in config text, preserving comments and other keys
pub fn set_view_mode(doc: &mut toml_edit::DocumentMut, mode: ViewMode) {
    doc["view_mode"] = toml_edit::value(mode.as_index());
}

/// Remember the view mode in the config file at `path`
pub fn write_view_mode(path: &Path, mode: ViewMode) -> Result<(), ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    let mut doc: toml_edit::DocumentMut =
        text.parse().map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
    set_view_mode(&mut doc, mode);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(path, doc.to_string()).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

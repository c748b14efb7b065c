//! Playroom configuration
//!
//! Handles loading and saving the host-level configuration: which widths and
//! themes the preview renders, the component registry, and timing.
//! Stored in `{config_dir}/playroom/config.json`.
//!
//! Editor options are deliberately absent; see [`crate::editor::EditorOptions`].

use crate::host::{ComponentRef, HostProps, ThemeRef};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Host configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayroomConfig {
    /// Viewport widths to preview, in pixels
    pub widths: Vec<u32>,
    /// Themes by name, in display order
    pub themes: IndexMap<String, ThemeRef>,
    /// Components available to the preview, by tag name
    pub components: IndexMap<String, ComponentRef>,
    /// Editor height used until one has been persisted
    pub default_height: f64,
    /// Quiet window for code changes and resize events
    pub debounce_ms: u64,
    /// File holding the playground code (None = scratch buffer)
    pub code_path: Option<PathBuf>,
}

impl Default for PlayroomConfig {
    fn default() -> Self {
        let mut themes = IndexMap::new();
        themes.insert(
            "light".to_string(),
            ThemeRef(json!({ "background": "#ffffff", "color": "#1f2430" })),
        );
        themes.insert(
            "dark".to_string(),
            ThemeRef(json!({ "background": "#1f2430", "color": "#f1f4ff" })),
        );

        Self {
            widths: vec![320, 768, 1024],
            themes,
            components: IndexMap::new(),
            default_height: 200.0,
            debounce_ms: 200,
            code_path: None,
        }
    }
}

impl PlayroomConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// The props handed to the playroom shell
    pub fn host_props(&self) -> HostProps {
        HostProps {
            components: self.components.clone(),
            themes: self.themes.clone(),
            widths: self.widths.clone(),
        }
    }
}

/// Get the path to the config file
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("playroom").join("config.json"))
}

/// Load config from the default location, falling back to defaults
pub fn load_config() -> PlayroomConfig {
    config_path().map_or_else(PlayroomConfig::default, |path| load_config_from(&path))
}

/// Load config from `path`, falling back to defaults if missing or invalid
pub fn load_config_from(path: &Path) -> PlayroomConfig {
    if !path.exists() {
        return PlayroomConfig::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!("Ignoring invalid config {}: {}", path.display(), e);
            PlayroomConfig::default()
        }),
        Err(e) => {
            warn!("Could not read config {}: {}", path.display(), e);
            PlayroomConfig::default()
        }
    }
}

/// Save config to the default location
pub fn save_config(config: &PlayroomConfig) -> Result<()> {
    let path = config_path()
        .ok_or_else(|| Error::Store("Could not determine config directory".to_string()))?;
    save_config_to(config, &path)
}

/// Save config to `path`, creating parent directories
pub fn save_config_to(config: &PlayroomConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayroomConfig::default();
        assert_eq!(config.widths, vec![320, 768, 1024]);
        let names: Vec<_> = config.themes.keys().cloned().collect();
        assert_eq!(names, vec!["light", "dark"]);
        assert_eq!(config.debounce_window(), Duration::from_millis(200));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("nope.json"));
        assert_eq!(config, PlayroomConfig::default());
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config_from(&path), PlayroomConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "widths": [375] }"#).unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.widths, vec![375]);
        assert_eq!(config.default_height, 200.0);
        assert_eq!(config.themes.len(), 2);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.json");

        let mut config = PlayroomConfig::default();
        config.widths = vec![480];
        config
            .themes
            .insert("brand".to_string(), ThemeRef(json!({ "background": "#ff0" })));
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path);
        assert_eq!(loaded, config);
        assert_eq!(loaded.themes.keys().last().unwrap(), "brand");
    }

    #[test]
    fn test_host_props_follow_config() {
        let config = PlayroomConfig::default();
        let props = config.host_props();
        assert_eq!(props.widths, config.widths);
        assert_eq!(props.theme_names(), vec!["light", "dark"]);
    }
}

//! Application state
//!
//! One [`AppState`] lives in a `Signal` provided at the root. It owns the
//! playroom shell plus the editor handle and shortcut registry the shell was
//! mounted with.

use crate::log_layer::LogBuffer;
use crate::undock::DesktopPortal;
use anyhow::{Context, Result};
use playroom_core::prelude::*;
use tracing::{info, warn};

/// DOM id of the docked editor textarea
pub const EDITOR_ID: &str = "playroom-editor";

/// Code shown when no code file is configured
pub const STARTER_CODE: &str = "<Stack space=\"medium\">\n  <Heading>Welcome to Playroom</Heading>\n  <Text>Edit this code to see it rendered in every theme and width.</Text>\n  <Button>Click me</Button>\n</Stack>";

/// Global application state
pub struct AppState {
    pub playroom: Playroom,
    /// Editor handle the playroom writes formatted and synced code through
    pub editor: Arc<BufferEditor>,
    /// Document-level shortcuts, shared by every window
    pub registry: ShortcutRegistry,
    /// Opens the undocked editor window
    pub portal: DesktopPortal,
    /// File name of the code being edited, for the title
    pub source_name: String,
    /// Why the initial code could not be loaded
    pub load_error: Option<String>,
    /// Cursor of whichever editor view is focused
    pub cursor: Position,
    /// Recent log lines (shared with the tracing layer)
    pub logs: LogBuffer,
}

impl AppState {
    pub fn new(config: &PlayroomConfig, logs: LogBuffer) -> Self {
        let (host, source_name): (Arc<dyn PlayroomHost>, String) = match &config.code_path {
            Some(path) => {
                info!("Editing {}", path.display());
                let name = path
                    .file_name()
                    .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
                (Arc::new(FileHost::new(path)), name)
            }
            None => (Arc::new(StaticHost::new(STARTER_CODE)), "Scratch".to_string()),
        };

        let store: Arc<dyn PreferenceStore> = match open_store() {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!("Preferences will not persist: {:#}", e);
                Arc::new(MemoryStore::new())
            }
        };

        let registry = ShortcutRegistry::new();
        let portal = DesktopPortal::new(registry.clone());
        let playroom = Playroom::from_config(host, store, config).with_portal(Arc::new(portal.clone()));

        Self {
            playroom,
            editor: Arc::new(BufferEditor::new(EditorModel::new())),
            registry,
            portal,
            source_name,
            load_error: None,
            cursor: Position::default(),
            logs,
        }
    }

    pub fn model(&self) -> EditorModel {
        self.editor.model()
    }

    /// Whether the current code fails the syntax check
    pub fn has_error(&self) -> bool {
        matches!(self.playroom.validation(), Some(Validation::Invalid { .. }))
    }

    /// Status line text for the latest check
    pub fn status_text(&self) -> String {
        if let Some(error) = &self.load_error {
            return format!("Could not load code: {error}");
        }
        if !self.playroom.is_ready() {
            return "Loading...".to_string();
        }
        match self.playroom.validation() {
            Some(Validation::Invalid { message, .. }) => message.clone(),
            _ => "Ready".to_string(),
        }
    }
}

fn open_store() -> Result<JsonFileStore> {
    JsonFileStore::open_default().context("Could not locate the preferences file")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_code_is_valid() {
        assert!(validate_fragment(STARTER_CODE).is_ok());
    }

    #[test]
    fn test_source_name_from_code_path() {
        let config = PlayroomConfig {
            code_path: Some(std::path::PathBuf::from("/tmp/play/card.jsx")),
            ..PlayroomConfig::default()
        };
        assert_eq!(AppState::new(&config, LogBuffer::new()).source_name, "card.jsx");
        assert_eq!(
            AppState::new(&PlayroomConfig::default(), LogBuffer::new()).source_name,
            "Scratch"
        );
    }

    #[test]
    fn test_status_before_and_after_load() {
        let mut state = AppState::new(&PlayroomConfig::default(), LogBuffer::new());
        assert_eq!(state.status_text(), "Loading...");

        state.playroom.initialise_code("<A />".to_string());
        assert_eq!(state.status_text(), "Ready");
        assert!(!state.has_error());

        state.playroom.update_code("<A".to_string());
        assert!(state.has_error());
        assert!(state.status_text().contains("(1:"));
    }
}

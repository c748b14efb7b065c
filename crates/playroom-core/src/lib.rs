//! # Playroom Core
//!
//! Live component playground logic, independent of any UI toolkit.
//!
//! A playroom pairs a code editor with a preview. The user writes component
//! markup; every edit is syntax-checked and only code that parses is handed
//! to the preview, which renders it once per (theme, width) frame.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use playroom_core::prelude::*;
//!
//! let host = Arc::new(StaticHost::new("<Button>Hello</Button>"));
//! let store = Arc::new(MemoryStore::new());
//! let mut playroom = Playroom::new(host, store, HostProps::default());
//!
//! let editor = Arc::new(BufferEditor::new(EditorModel::new()));
//! playroom.mount(editor, &ShortcutRegistry::new()).await?;
//!
//! playroom.update_code("<Button>Hi".to_string()); // invalid, preview keeps old code
//! assert_eq!(playroom.render_code(), Some("<Button>Hello</Button>"));
//! ```
//!
//! ## Conventions
//!
//! - **Positions**: editor positions are 1-based (`line_number`, `column`)
//! - **Syntax errors**: lines are 1-based, columns 0-based, reported in the
//!   user's coordinates
//! - **Heights**: pixels, as `f64`

pub mod config;
pub mod debounce;
pub mod dock;
pub mod editor;
pub mod format;
pub mod frames;
pub mod host;
pub mod keyboard;
pub mod playroom;
pub mod resize;
pub mod store;
pub mod validate;

mod error;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{PlayroomConfig, load_config, save_config};
    pub use crate::debounce::{DEBOUNCE_WINDOW, Debouncer};
    pub use crate::dock::{
        DockController, DockState, HeadlessPortal, PortalHandle, PortalWindow, WindowPortal,
        WindowSize,
    };
    pub use crate::editor::{BufferEditor, EditorModel, EditorOptions, EditorWidget, Position};
    pub use crate::format::{CodeFormatter, Formatted, IndentFormatter};
    pub use crate::frames::{Frame, frame_matrix};
    pub use crate::host::{
        ComponentRef, FileHost, FrameRenderer, HostProps, PlayroomHost, PreviewRequest,
        StaticHost, ThemeRef,
    };
    pub use crate::keyboard::{
        KeyEvent, KeyOutcome, ListenerGuard, Platform, SaveShortcut, ShortcutRegistry,
    };
    pub use crate::playroom::{
        DEFAULT_EDITOR_HEIGHT, InitialState, Playroom, PlayroomState, Validation, load_initial,
    };
    pub use crate::resize::{MIN_EDITOR_HEIGHT, ResizeController, ResizeEvent};
    pub use crate::store::{
        EDITOR_SIZE_KEY, JsonFileStore, MemoryStore, PreferenceStore, load_editor_size,
        save_editor_size,
    };
    pub use crate::validate::{
        ErrorMarker, NoopMarker, SyntaxError, error_line, fragment_tags,
        validate_fragment,
    };
    pub use crate::{Error, Result};
    pub use std::sync::Arc;
}

//! The playroom shell
//!
//! Owns the code state and wires the editor, the syntax check, the preview
//! request, the save shortcut, resizing and docking together.
//!
//! Lifecycle:
//! 1. [`Playroom::new`] with the host, the preference store and the props
//! 2. [`Playroom::mount`] attaches an editor, installs the save shortcut,
//!    then loads the initial code and the persisted editor height together
//! 3. [`Playroom::update_code`] for every (debounced) edit
//! 4. [`Playroom::unmount`] or drop releases the shortcut and any window
//!
//! Code flows one way into the editor: [`Playroom::sync_editor`] pushes the
//! render code only when it changed and the editor does not already show it.

use crate::config::PlayroomConfig;
use crate::debounce::{DEBOUNCE_WINDOW, Debouncer};
use crate::dock::{DockController, DockState, HeadlessPortal, WindowPortal, WindowSize};
use crate::editor::{EditorOptions, EditorWidget};
use crate::format::{CodeFormatter, IndentFormatter};
use crate::frames::Frame;
use crate::host::{HostProps, PlayroomHost, PreviewRequest};
use crate::keyboard::{ListenerGuard, Platform, SaveShortcut, ShortcutRegistry};
use crate::resize::ResizeController;
use crate::store::{PreferenceStore, load_editor_size};
use crate::validate::{ErrorMarker, NoopMarker, error_line, validate_fragment};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Editor height until one is persisted
pub const DEFAULT_EDITOR_HEIGHT: f64 = 200.0;

/// Observable playroom state
#[derive(Debug, Clone, PartialEq)]
pub struct PlayroomState {
    /// Initial code has been loaded
    pub code_ready: bool,
    /// What the user typed, valid or not
    pub code: Option<String>,
    /// Last code that passed the syntax check
    pub render_code: Option<String>,
    /// Editor pane height in pixels
    pub height: f64,
    pub dock: DockState,
}

/// Outcome of a syntax check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid {
        /// Line recovered from the message, if any
        line: Option<u32>,
        message: String,
    },
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Result of the mount-time loads
#[derive(Debug, Clone, PartialEq)]
pub struct InitialState {
    pub code: String,
    /// Persisted editor height, if there is a usable one
    pub height: Option<f64>,
}

/// Load the initial code and the persisted height concurrently
///
/// A failing code loader fails the load. A failing store only costs the
/// persisted height.
pub async fn load_initial(
    host: &dyn PlayroomHost,
    store: &dyn PreferenceStore,
) -> Result<InitialState> {
    let (code, height) = tokio::join!(host.get_code(), load_editor_size(store));

    let height = height.unwrap_or_else(|e| {
        warn!("Could not read persisted editor height: {}", e);
        None
    });
    let code = code.inspect_err(|e| warn!("Could not load initial code: {}", e))?;

    Ok(InitialState { code, height })
}

/// Live component playground shell
pub struct Playroom {
    host: Arc<dyn PlayroomHost>,
    store: Arc<dyn PreferenceStore>,
    props: HostProps,
    formatter: Arc<dyn CodeFormatter>,
    marker: Arc<dyn ErrorMarker>,
    platform: Platform,
    dock: DockController,
    resize: ResizeController,
    changes: Debouncer<String>,

    code_ready: bool,
    code: Option<String>,
    render_code: Option<String>,
    validation: Option<Validation>,

    editor: Option<Arc<dyn EditorWidget>>,
    /// Render code the editor was last synced to
    synced: Option<String>,
    shortcut: Option<ListenerGuard>,
}

impl Playroom {
    pub fn new(host: Arc<dyn PlayroomHost>, store: Arc<dyn PreferenceStore>, props: HostProps) -> Self {
        let resize = ResizeController::new(Arc::clone(&store), DEFAULT_EDITOR_HEIGHT, DEBOUNCE_WINDOW);
        Self {
            host,
            store,
            props,
            formatter: Arc::new(IndentFormatter::new()),
            marker: Arc::new(NoopMarker),
            platform: Platform::current(),
            dock: DockController::new(Arc::new(HeadlessPortal::new())),
            resize,
            changes: Debouncer::new(DEBOUNCE_WINDOW),
            code_ready: false,
            code: None,
            render_code: None,
            validation: None,
            editor: None,
            synced: None,
            shortcut: None,
        }
    }

    /// Build from a loaded config: its registries, widths, height and timing
    pub fn from_config(
        host: Arc<dyn PlayroomHost>,
        store: Arc<dyn PreferenceStore>,
        config: &PlayroomConfig,
    ) -> Self {
        let playroom = Self::new(host, store, config.host_props())
            .with_debounce(config.debounce_window());
        playroom.resize.set_height(config.default_height);
        playroom
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn CodeFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_marker(mut self, marker: Arc<dyn ErrorMarker>) -> Self {
        self.marker = marker;
        self
    }

    pub fn with_portal(mut self, portal: Arc<dyn WindowPortal>) -> Self {
        self.dock = DockController::new(portal);
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Quiet window for both code changes and resize events
    pub fn with_debounce(mut self, window: Duration) -> Self {
        let height = self.resize.height();
        self.resize = ResizeController::new(Arc::clone(&self.store), height, window);
        self.changes = Debouncer::new(window);
        self
    }

    /// Attach the editor and load the initial state
    ///
    /// On a loader failure the playroom stays not ready and the error is
    /// returned; the editor and shortcut stay attached.
    pub async fn mount(&mut self, editor: Arc<dyn EditorWidget>, registry: &ShortcutRegistry) -> Result<()> {
        self.attach(editor, registry);
        let initial = load_initial(self.host.as_ref(), self.store.as_ref()).await?;
        self.apply_initial(initial);
        Ok(())
    }

    /// Attach the editor and install the save shortcut, without loading
    pub fn attach(&mut self, editor: Arc<dyn EditorWidget>, registry: &ShortcutRegistry) {
        let shortcut = SaveShortcut::new(Arc::clone(&editor), Arc::clone(&self.formatter), self.platform);
        self.shortcut = Some(shortcut.install(registry));
        self.editor = Some(editor);
        self.synced = None;
        debug!("Editor attached ({:?})", self.platform);
        self.sync_editor();
    }

    /// Host and store, for loading outside a borrow of the playroom
    pub fn loaders(&self) -> (Arc<dyn PlayroomHost>, Arc<dyn PreferenceStore>) {
        (Arc::clone(&self.host), Arc::clone(&self.store))
    }

    /// Apply the result of [`load_initial`]
    pub fn apply_initial(&mut self, initial: InitialState) {
        if let Some(height) = initial.height {
            self.resize.set_height(height);
        }
        self.initialise_code(initial.code);
    }

    /// Mark the playroom ready with `code` and run the syntax check once
    ///
    /// The initial code is the render code even when it fails the check, so
    /// the editor always opens on what the host supplied. The host is not
    /// notified; it supplied the code.
    pub fn initialise_code(&mut self, code: String) {
        self.code_ready = true;
        self.render_code = Some(code.clone());
        let validation = self.validate_code(&code);
        self.code = Some(code);
        info!("Playroom ready, initial code {}", if validation.is_valid() { "valid" } else { "invalid" });
        self.sync_editor();
    }

    /// Detach the editor, remove the shortcut and close any editor window
    pub fn unmount(&mut self) {
        self.shortcut = None;
        self.changes.cancel();
        self.resize.cancel();
        self.dock.redock();
        self.editor = None;
        self.synced = None;
        debug!("Playroom unmounted");
    }

    /// Record a code change: notify the host and re-check
    pub fn update_code(&mut self, code: String) -> Validation {
        self.host.update_code(&code);
        let validation = self.validate_code(&code);
        self.code = Some(code);
        self.sync_editor();
        validation
    }

    /// Syntax-check `code`; advances render code only when it parses
    pub fn validate_code(&mut self, code: &str) -> Validation {
        let validation = self.check(code);
        self.validation = Some(validation.clone());
        validation
    }

    fn check(&mut self, code: &str) -> Validation {
        match validate_fragment(code) {
            Ok(()) => {
                self.render_code = Some(code.to_string());
                self.marker.clear();
                Validation::Valid
            }
            Err(e) => {
                let message = e.to_string();
                let line = error_line(&message);
                if let Some(line) = line {
                    self.marker.mark(line, &e.message);
                }
                debug!("Code rejected: {}", message);
                Validation::Invalid { line, message }
            }
        }
    }

    /// Push render code into the editor if it changed since the last sync
    ///
    /// Returns whether the editor was written.
    pub fn sync_editor(&mut self) -> bool {
        let (Some(editor), Some(render_code)) = (&self.editor, &self.render_code) else {
            return false;
        };
        if self.synced.as_ref() == Some(render_code) {
            return false;
        }

        let written = editor.get_value() != *render_code;
        if written {
            editor.set_value(render_code);
        }
        self.synced = Some(render_code.clone());
        written
    }

    /// Preview frames, widths outer and themes inner
    pub fn frames(&self) -> Vec<Frame> {
        self.props.frames()
    }

    /// What the preview should render; `None` until there is render code
    pub fn preview_request(&self) -> Option<PreviewRequest<'_>> {
        if !self.code_ready {
            return None;
        }
        let code = self.render_code.as_deref()?;
        Some(PreviewRequest {
            code,
            frames: self.frames(),
            themes: &self.props.themes,
            components: &self.props.components,
        })
    }

    pub fn state(&self) -> PlayroomState {
        PlayroomState {
            code_ready: self.code_ready,
            code: self.code.clone(),
            render_code: self.render_code.clone(),
            height: self.resize.height(),
            dock: self.dock.state(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.code_ready
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn render_code(&self) -> Option<&str> {
        self.render_code.as_deref()
    }

    pub fn height(&self) -> f64 {
        self.resize.height()
    }

    /// Outcome of the latest syntax check
    pub fn validation(&self) -> Option<&Validation> {
        self.validation.as_ref()
    }

    pub fn props(&self) -> &HostProps {
        &self.props
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions::FIXED
    }

    /// Debouncer for editor change events, shared with this playroom
    pub fn change_debouncer(&self) -> Debouncer<String> {
        self.changes.clone()
    }

    /// Resize controller, shared with this playroom
    pub fn resize_controller(&self) -> ResizeController {
        self.resize.clone()
    }

    /// Move the editor into its own window, sized like the main one
    pub fn undock(&mut self, size: WindowSize) -> Result<()> {
        let Some(editor) = &self.editor else {
            return Err(Error::NotReady);
        };
        self.dock.undock(self.code_ready, editor.model(), size)
    }

    pub fn redock(&mut self) {
        self.dock.redock();
    }

    /// The editor window was closed from outside
    pub fn on_portal_closed(&mut self) {
        self.dock.on_portal_closed();
    }

    pub fn dock_state(&self) -> DockState {
        self.dock.state()
    }
}

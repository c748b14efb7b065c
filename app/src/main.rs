//! Playroom Studio - Desktop playground for component markup

mod editor;
mod js_interop;
mod log_layer;
mod preview;
mod state;
mod statusbar;
mod toolbar;
mod undock;

use dioxus::desktop::{Config, LogicalSize, WindowBuilder};
use dioxus::prelude::*;
use editor::{CodeEditor, dispatch_shortcut};
use log_layer::{LogBuffer, LogLayer};
use playroom_core::prelude::*;
use state::{AppState, EDITOR_ID};
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let logs = LogBuffer::new();
    init_tracing(logs.clone());

    let config = load_config();

    let window = WindowBuilder::new()
        .with_title("Playroom Studio")
        .with_inner_size(LogicalSize::new(1280.0, 860.0));

    dioxus::LaunchBuilder::desktop()
        .with_cfg(Config::new().with_window(window))
        .with_context(AppConfig { config, logs })
        .launch(App);
}

/// Console output plus the status bar's log buffer
fn init_tracing(logs: LogBuffer) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(LogLayer::new(logs))
        .init();
}

/// Startup inputs handed to the root component
#[derive(Clone)]
struct AppConfig {
    config: PlayroomConfig,
    logs: LogBuffer,
}

#[component]
fn App() -> Element {
    let startup = use_context::<AppConfig>();
    use_context_provider(|| Signal::new(AppState::new(&startup.config, startup.logs.clone())));

    let mut state = use_context::<Signal<AppState>>();

    // Attach the editor, then load the code and the persisted height
    use_effect(move || {
        spawn(async move {
            let (host, store) = {
                let mut s = state.write();
                let editor: Arc<dyn EditorWidget> = s.editor.clone();
                let registry = s.registry.clone();
                s.playroom.attach(editor, &registry);
                s.playroom.loaders()
            };

            match load_initial(host.as_ref(), store.as_ref()).await {
                Ok(initial) => state.write().playroom.apply_initial(initial),
                Err(e) => {
                    error!("Playroom failed to start: {}", e);
                    state.write().load_error = Some(e.to_string());
                }
            }
        });
    });

    use_drop(move || state.write().playroom.unmount());

    let (registry, model, docked) = {
        let s = state.read();
        (
            s.registry.clone(),
            s.model(),
            s.playroom.dock_state() == DockState::Docked,
        )
    };

    rsx! {
        style { {include_str!("../assets/style.css")} }

        div {
            class: "app-container",
            onkeydown: move |evt| dispatch_shortcut(&evt, &registry, &model, EDITOR_ID),

            toolbar::Toolbar {}

            div { class: "main-content",
                preview::PreviewPane {}

                if docked {
                    EditorPane {}
                }
            }

            statusbar::StatusBar {}
        }
    }
}

/// Drag state of the editor's top edge
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct DragState {
    active: bool,
    /// Moved since the controller last settled the height
    moved: bool,
    /// Released, waiting for the controller to settle the height
    settling: bool,
    last_y: f64,
    /// Height shown while dragging or settling
    live_height: f64,
}

impl DragState {
    fn start(y: f64, height: f64) -> Self {
        Self {
            active: true,
            moved: false,
            settling: false,
            last_y: y,
            live_height: height,
        }
    }

    /// Follow the pointer to `y`; returns the new state and the height change
    /// actually applied after clamping
    fn step(self, y: f64) -> (Self, f64) {
        // Dragging up grows the pane
        let live_height = (self.live_height + self.last_y - y).max(MIN_EDITOR_HEIGHT);
        let next = Self {
            moved: true,
            last_y: y,
            live_height,
            ..self
        };
        (next, live_height - self.live_height)
    }

    fn release(self) -> Self {
        Self {
            active: false,
            settling: self.moved,
            ..self
        }
    }

    /// The controller settled the height
    fn settled(self) -> Self {
        if self.active {
            Self {
                moved: false,
                ..self
            }
        } else {
            Self::default()
        }
    }

    fn shows_live_height(self) -> bool {
        self.active || self.settling
    }
}

/// Bottom editor pane with a resize handle on its top edge
#[component]
fn EditorPane() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let mut drag = use_signal(DragState::default);

    let (model, settled_height) = {
        let s = state.read();
        (s.model(), s.playroom.height())
    };
    let height = if drag.read().shows_live_height() {
        drag.read().live_height
    } else {
        settled_height
    };
    let revision = model.revision();

    rsx! {
        div {
            class: "editor-resize-handle",
            onmousedown: move |evt| {
                evt.prevent_default();
                drag.set(DragState::start(evt.client_coordinates().y, height));
            },
        }

        if drag.read().active {
            div {
                class: "resize-overlay",
                onmousemove: move |evt| {
                    let current = *drag.read();
                    if !current.active {
                        return;
                    }
                    let (next, applied) = current.step(evt.client_coordinates().y);
                    drag.set(next);

                    let resize = state.read().playroom.resize_controller();
                    spawn(async move {
                        let event = ResizeEvent { delta_height: applied, offset_height: next.live_height };
                        if resize.on_resize(event).await.is_some() {
                            let current = *drag.read();
                            drag.set(current.settled());
                            mark_changed(state);
                        }
                    });
                },
                onmouseup: move |_| {
                    let released = drag.read().release();
                    drag.set(released);
                },
            }
        }

        div {
            class: "editor-pane",
            style: "height: {height}px;",
            CodeEditor {
                editor_id: EDITOR_ID.to_string(),
                model,
                revision,
                on_edit: move |code: String| {
                    let changes = state.read().playroom.change_debouncer();
                    spawn(async move {
                        if let Some(code) = changes.call(code).await {
                            state.write().playroom.update_code(code);
                        }
                    });
                },
                on_cursor: move |position: Position| state.write().cursor = position,
            }
        }
    }
}

/// Re-render readers of `state` after a change made behind its back
///
/// The settled editor height lives in the resize controller, not the signal.
fn mark_changed(mut state: Signal<AppState>) {
    drop(state.write());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_step_reports_applied_delta() {
        let drag = DragState::start(500.0, 200.0);

        let (drag, applied) = drag.step(450.0);
        assert_eq!(drag.live_height, 250.0);
        assert_eq!(applied, 50.0);

        // Clamped at the minimum: only the part that moved the pane counts
        let (drag, applied) = drag.step(900.0);
        assert_eq!(drag.live_height, MIN_EDITOR_HEIGHT);
        assert_eq!(applied, MIN_EDITOR_HEIGHT - 250.0);

        let (_, applied) = drag.step(1000.0);
        assert_eq!(applied, 0.0);
    }

    #[test]
    fn test_release_keeps_live_height_until_settled() {
        let (drag, _) = DragState::start(500.0, 200.0).step(400.0);
        let released = drag.release();

        assert!(!released.active);
        assert!(released.shows_live_height());
        assert_eq!(released.live_height, 300.0);
        assert_eq!(released.settled(), DragState::default());
    }

    #[test]
    fn test_release_without_pending_resize_shows_settled_height() {
        let click = DragState::start(500.0, 200.0).release();
        assert!(!click.shows_live_height());

        // Settled mid-drag, then released without moving again
        let (drag, _) = DragState::start(500.0, 200.0).step(400.0);
        let released = drag.settled().release();
        assert!(!released.shows_live_height());
    }
}

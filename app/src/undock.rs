//! Undocked editor window
//!
//! [`DesktopPortal`] opens the editor in a separate OS window over the same
//! text model. The two windows talk through a [`PortalLink`]: the undocked
//! window posts edits and its closure, the main window posts close requests.
//! Both sides poll the link, like the preview process watcher.

// Closure is required for Dioxus signals
#![allow(clippy::redundant_closure)]

use crate::editor::{CodeEditor, dispatch_shortcut};
use crate::state::AppState;
use dioxus::desktop::{Config, LogicalSize, WindowBuilder, window};
use dioxus::prelude::*;
use parking_lot::Mutex;
use playroom_core::prelude::*;
use std::time::Duration;
use tracing::warn;

/// DOM id of the undocked editor textarea
pub const UNDOCKED_EDITOR_ID: &str = "playroom-editor-undocked";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct LinkState {
    /// Latest unsent edit
    edit: Option<String>,
    close_requested: bool,
    closed: bool,
}

/// Mailbox shared by the main window and one undocked window
#[derive(Clone, Default)]
pub struct PortalLink(Arc<Mutex<LinkState>>);

impl PartialEq for PortalLink {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PortalLink {
    fn post_edit(&self, code: String) {
        self.0.lock().edit = Some(code);
    }

    fn take_edit(&self) -> Option<String> {
        self.0.lock().edit.take()
    }

    fn request_close(&self) {
        self.0.lock().close_requested = true;
    }

    fn close_requested(&self) -> bool {
        self.0.lock().close_requested
    }

    fn mark_closed(&self) {
        self.0.lock().closed = true;
    }

    fn is_closed(&self) -> bool {
        self.0.lock().closed
    }
}

/// Opens undocked editor windows through dioxus-desktop
#[derive(Clone)]
pub struct DesktopPortal {
    registry: ShortcutRegistry,
    current: Arc<Mutex<Option<PortalLink>>>,
}

impl DesktopPortal {
    pub fn new(registry: ShortcutRegistry) -> Self {
        Self {
            registry,
            current: Arc::new(Mutex::new(None)),
        }
    }

    fn current(&self) -> Option<PortalLink> {
        self.current.lock().clone()
    }
}

/// Main-window side of an open editor window
struct DesktopWindow {
    link: PortalLink,
}

impl PortalWindow for DesktopWindow {
    fn close(&mut self) {
        self.link.request_close();
    }
}

impl WindowPortal for DesktopPortal {
    fn open(&self, model: EditorModel, size: WindowSize) -> playroom_core::Result<Box<dyn PortalWindow>> {
        let link = PortalLink::default();

        let dom = VirtualDom::new_with_props(
            UndockedEditor,
            UndockedEditorProps {
                model,
                registry: self.registry.clone(),
                link: link.clone(),
            },
        );

        let window_builder = WindowBuilder::new()
            .with_title("Editor - Playroom Studio")
            .with_inner_size(LogicalSize::new(size.width, size.height))
            .with_resizable(true);

        let config = Config::new()
            .with_window(window_builder)
            .with_menu(None::<dioxus::desktop::muda::Menu>);

        window().new_window(dom, config);
        *self.current.lock() = Some(link.clone());
        Ok(Box::new(DesktopWindow { link }))
    }
}

/// Undock the editor into a window the size of the main one
pub fn undock_editor(mut state: Signal<AppState>) {
    let main = window();
    let size = main.outer_size().to_logical::<f64>(main.scale_factor());

    let result = state.write().playroom.undock(WindowSize {
        width: size.width,
        height: size.height,
    });
    match result {
        Ok(()) => {
            spawn(async move {
                watch_portal(state).await;
            });
        }
        Err(e) => warn!("Could not undock editor: {}", e),
    }
}

/// Forward edits from the undocked window and redock when it closes
async fn watch_portal(mut state: Signal<AppState>) {
    let Some(link) = state.read().portal.current() else {
        return;
    };

    loop {
        tokio::time::sleep(POLL_INTERVAL).await;

        if let Some(code) = link.take_edit() {
            let changes = state.read().playroom.change_debouncer();
            spawn(async move {
                if let Some(code) = changes.call(code).await {
                    state.write().playroom.update_code(code);
                }
            });
        }

        if link.is_closed() {
            state.write().playroom.on_portal_closed();
            break;
        }
        if state.read().playroom.dock_state() == DockState::Docked {
            break;
        }
    }
}

#[derive(Clone, PartialEq, Props)]
struct UndockedEditorProps {
    model: EditorModel,
    registry: ShortcutRegistry,
    link: PortalLink,
}

/// Root of the undocked editor window
#[component]
fn UndockedEditor(props: UndockedEditorProps) -> Element {
    let model = props.model.clone();
    let mut revision = use_signal(|| model.revision());

    // Close on request; pick up text written from the main window
    {
        let link = props.link.clone();
        let model = model.clone();
        use_effect(move || {
            let link = link.clone();
            let model = model.clone();
            spawn(async move {
                loop {
                    tokio::time::sleep(POLL_INTERVAL).await;
                    if link.close_requested() {
                        window().close();
                        break;
                    }
                    let current = model.revision();
                    if current != *revision.peek() {
                        revision.set(current);
                    }
                }
            });
        });
    }

    {
        let link = props.link.clone();
        use_drop(move || link.mark_closed());
    }

    let link = props.link.clone();
    let registry = props.registry.clone();
    rsx! {
        style { {include_str!("../assets/style.css")} }
        div {
            class: "undocked-root",
            onkeydown: move |evt| dispatch_shortcut(&evt, &registry, &model, UNDOCKED_EDITOR_ID),
            CodeEditor {
                editor_id: UNDOCKED_EDITOR_ID.to_string(),
                model: props.model.clone(),
                revision: revision(),
                on_edit: move |code: String| link.post_edit(code),
                on_cursor: None,
            }
        }
    }
}

//! Bottom status bar component

use crate::state::AppState;
use dioxus::prelude::*;
use playroom_core::prelude::*;

/// Application version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bottom status bar showing application state
#[component]
pub fn StatusBar() -> Element {
    let state = use_context::<Signal<AppState>>();

    let (status_text, has_error, cursor_info, dock_info, frame_info, last_log) = {
        let s = state.read();
        let cursor = format!("Ln {}, Col {}", s.cursor.line_number, s.cursor.column);
        let dock = match s.playroom.dock_state() {
            DockState::Docked => "Docked".to_string(),
            DockState::Undocked => "Undocked".to_string(),
        };
        let frames = format!("{} frames", s.playroom.frames().len());
        (
            s.status_text(),
            s.has_error() || s.load_error.is_some(),
            cursor,
            dock,
            frames,
            s.logs.last().map(|line| (format!("status-item status-log {}", line.css_class()), line.message)),
        )
    };

    let status_class = if has_error {
        "status-item error"
    } else {
        "status-item"
    };

    rsx! {
        div { class: "status-bar",
            span { class: "{status_class}", "{status_text}" }
            span { class: "status-item", "{cursor_info}" }
            span { class: "status-item", "{dock_info}" }
            span { class: "status-item", "{frame_info}" }
            if let Some((log_class, log_message)) = last_log {
                span { class: "{log_class}", "{log_message}" }
            }
            span { class: "status-item version", "v{VERSION}" }
        }
    }
}

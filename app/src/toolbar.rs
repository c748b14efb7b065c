//! Top toolbar: format and dock controls

use crate::editor::run_shortcut;
use crate::state::{AppState, EDITOR_ID};
use crate::undock::undock_editor;
use dioxus::prelude::*;
use playroom_core::prelude::*;

/// Top toolbar
#[component]
pub fn Toolbar() -> Element {
    let state = use_context::<Signal<AppState>>();

    let (ready, docked, source) = {
        let s = state.read();
        (
            s.playroom.is_ready(),
            s.playroom.dock_state() == DockState::Docked,
            s.source_name.clone(),
        )
    };

    let format_title = match Platform::current() {
        Platform::Apple => "Format code (Cmd+S)",
        Platform::Other => "Format code (Ctrl+S)",
    };

    rsx! {
        div { class: "toolbar",
            div { class: "toolbar-group",
                ToolbarButton {
                    title: format_title,
                    label: "Format",
                    disabled: !ready,
                    onclick: move |_| format_code(state),
                }
            }

            div { class: "toolbar-title", "Playroom Studio - {source}" }

            div { class: "toolbar-group",
                if docked {
                    ToolbarButton {
                        title: "Open the editor in its own window",
                        label: "Undock editor",
                        disabled: !ready,
                        onclick: move |_| undock_editor(state),
                    }
                } else {
                    ToolbarButton {
                        title: "Close the editor window and dock the editor",
                        label: "Redock editor",
                        class: "active",
                        onclick: move |_| {
                            let mut state = state;
                            state.write().playroom.redock();
                        },
                    }
                }
            }
        }
    }
}

/// Run the save chord as if it had been pressed in the editor
fn format_code(mut state: Signal<AppState>) {
    let (registry, model, docked) = {
        let s = state.read();
        (
            s.registry.clone(),
            s.model(),
            s.playroom.dock_state() == DockState::Docked,
        )
    };
    let chord = Platform::current().save_chord();

    if docked {
        // The textarea's input event carries the result to the playroom
        run_shortcut(&chord, &registry, &model, EDITOR_ID);
    } else if registry.dispatch(&chord) == KeyOutcome::Handled {
        // The undocked window re-renders from the model on its own
        state.write().playroom.update_code(model.text());
    }
}

/// Reusable toolbar button component
#[component]
fn ToolbarButton(
    title: &'static str,
    label: &'static str,
    onclick: EventHandler<MouseEvent>,
    #[props(default = "")] class: &'static str,
    #[props(default = false)] disabled: bool,
) -> Element {
    let button_class = if class.is_empty() {
        "toolbar-button".to_string()
    } else {
        format!("toolbar-button {}", class)
    };

    rsx! {
        button {
            class: "{button_class}",
            title: "{title}",
            disabled,
            onclick: move |evt| onclick.call(evt),
            "{label}"
        }
    }
}

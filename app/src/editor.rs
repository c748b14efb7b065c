//! Code editor view
//!
//! A textarea over a shared [`EditorModel`]. Typing writes straight into the
//! model and reports the text through `on_edit`; text written into the
//! model from elsewhere reaches the textarea on the next render, which the
//! `revision` prop triggers.

use crate::js_interop;
use dioxus::prelude::*;
use playroom_core::editor::offset_to_position;
use playroom_core::prelude::*;

/// Editor textarea bound to a model
#[component]
pub fn CodeEditor(
    editor_id: String,
    model: EditorModel,
    revision: u64,
    on_edit: EventHandler<String>,
    on_cursor: Option<EventHandler<Position>>,
) -> Element {
    let options = EditorOptions::FIXED;
    let text = model.text();
    let class = format!("code-input theme-{}", options.theme);
    let style = format!("font-size: {}px; tab-size: {};", options.font_size, options.tab_size);
    let language = options.language;

    rsx! {
        div { class: "editor-content",
            textarea {
                id: "{editor_id}",
                class: "{class}",
                style: "{style}",
                spellcheck: false,
                "data-language": "{language}",
                "data-revision": "{revision}",
                value: "{text}",
                oninput: {
                    let model = model.clone();
                    let editor_id = editor_id.clone();
                    move |evt: FormEvent| {
                        let code = evt.value();
                        model.set_text(&code);
                        track_cursor(model.clone(), &editor_id, on_cursor);
                        on_edit.call(code);
                    }
                },
                onkeyup: {
                    let model = model.clone();
                    let editor_id = editor_id.clone();
                    move |_| track_cursor(model.clone(), &editor_id, on_cursor)
                },
                onclick: {
                    let model = model.clone();
                    let editor_id = editor_id.clone();
                    move |_| track_cursor(model.clone(), &editor_id, on_cursor)
                },
                onkeydown: {
                    let editor_id = editor_id.clone();
                    move |evt: KeyboardEvent| handle_editing_keys(&evt, &editor_id)
                },
            }
        }
    }
}

/// Read the DOM cursor into the model
fn track_cursor(model: EditorModel, editor_id: &str, on_cursor: Option<EventHandler<Position>>) {
    let editor_id = editor_id.to_string();
    spawn(async move {
        if let Some(offset) = js_interop::get_cursor_offset(&editor_id).await {
            let position = offset_to_position(&model.text(), offset);
            model.set_position(position);
            if let Some(on_cursor) = on_cursor {
                on_cursor.call(position);
            }
        }
    });
}

/// Tab indents; Enter keeps the current line's indentation
fn handle_editing_keys(evt: &KeyboardEvent, editor_id: &str) {
    let options = EditorOptions::FIXED;
    let modifiers = evt.modifiers();

    if evt.key() == Key::Tab && !modifiers.shift() {
        evt.prevent_default();
        let editor_id = editor_id.to_string();
        let unit = options.indent_unit();
        spawn(async move {
            js_interop::insert_indent(&editor_id, &unit).await;
        });
    } else if evt.key() == Key::Enter && options.auto_indent && !modifiers.ctrl() && !modifiers.meta() {
        evt.prevent_default();
        let editor_id = editor_id.to_string();
        spawn(async move {
            js_interop::insert_newline_keeping_indent(&editor_id).await;
        });
    }
}

/// Document-level key handling: offer the press to the shortcut registry
///
/// When a shortcut handled it, the default action is suppressed.
pub fn dispatch_shortcut(
    evt: &KeyboardEvent,
    registry: &ShortcutRegistry,
    model: &EditorModel,
    editor_id: &str,
) {
    if run_shortcut(&key_event(evt), registry, model, editor_id) == KeyOutcome::Handled {
        evt.prevent_default();
        evt.stop_propagation();
    }
}

/// Dispatch a key press and, if handled, mirror the model's (formatted)
/// text and cursor into the textarea
pub fn run_shortcut(
    event: &KeyEvent,
    registry: &ShortcutRegistry,
    model: &EditorModel,
    editor_id: &str,
) -> KeyOutcome {
    let outcome = registry.dispatch(event);
    if outcome == KeyOutcome::Handled {
        let text = model.text();
        let offset = model.cursor_offset();
        let editor_id = editor_id.to_string();
        spawn(async move {
            js_interop::set_editor_content(&editor_id, &text, offset).await;
        });
    }
    outcome
}

/// Convert a DOM key press
pub fn key_event(evt: &KeyboardEvent) -> KeyEvent {
    let modifiers = evt.modifiers();
    KeyEvent {
        code: evt.code().to_string(),
        key: evt.key().to_string(),
        meta: modifiers.meta(),
        ctrl: modifiers.ctrl(),
        shift: modifiers.shift(),
        alt: modifiers.alt(),
    }
}

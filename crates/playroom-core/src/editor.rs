//! Editor widget handle and shared text model
//!
//! The code editor is an externally owned, mutable widget. The playroom only
//! talks to it through [`EditorWidget`]; methods take `&self` because the
//! handle points at state the playroom does not own.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A cursor position, 1-based in both coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line_number: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line_number: u32, column: u32) -> Self {
        Self {
            line_number,
            column,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Convert a char offset to a position, clamping to the end of the text
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    let mut line = 1u32;
    let mut column = 1u32;
    for c in text.chars().take(offset) {
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    Position::new(line, column)
}

/// Convert a position to a char offset, clamping to the text
///
/// A line past the end maps to the end of the text; a column past the end
/// of its line maps to the end of that line.
pub fn position_to_offset(text: &str, position: Position) -> usize {
    let target_line = position.line_number.max(1);
    let mut offset = 0usize;
    let mut line = 1u32;
    let mut chars = text.chars();

    while line < target_line {
        match chars.next() {
            Some('\n') => {
                line += 1;
                offset += 1;
            }
            Some(_) => offset += 1,
            None => return offset,
        }
    }

    let mut column = 1u32;
    for c in chars {
        if column >= position.column.max(1) || c == '\n' {
            break;
        }
        column += 1;
        offset += 1;
    }
    offset
}

/// Fixed editor configuration
///
/// These are not user settings; every editor instance gets the same options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorOptions {
    pub language: &'static str,
    pub theme: &'static str,
    pub font_size: u32,
    pub auto_indent: bool,
    pub tab_size: u32,
}

impl EditorOptions {
    pub const FIXED: EditorOptions = EditorOptions {
        language: "javascript",
        theme: "vs-dark",
        font_size: 16,
        auto_indent: true,
        tab_size: 2,
    };

    /// One level of indentation
    pub fn indent_unit(&self) -> String {
        " ".repeat(self.tab_size as usize)
    }
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self::FIXED
    }
}

/// Handle to an editor widget
pub trait EditorWidget: Send + Sync {
    fn get_value(&self) -> String;
    fn set_value(&self, value: &str);
    fn get_position(&self) -> Position;
    fn set_position(&self, position: Position);
    /// The text model backing this widget, shareable with other mount points
    fn model(&self) -> EditorModel;
}

#[derive(Debug, Default)]
struct ModelState {
    text: String,
    position: Position,
    revision: u64,
}

/// Shared text model
///
/// Clones refer to the same text, so a docked and an undocked view over one
/// model always agree.
#[derive(Debug, Clone, Default)]
pub struct EditorModel {
    state: Arc<RwLock<ModelState>>,
}

impl EditorModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let model = Self::new();
        model.set_text(&text.into());
        model
    }

    pub fn text(&self) -> String {
        self.state.read().text.clone()
    }

    /// Replace the text; bumps the revision
    pub fn set_text(&self, text: &str) {
        let mut state = self.state.write();
        state.text = text.to_string();
        state.revision += 1;
        let clamped = position_to_offset(&state.text, state.position);
        state.position = offset_to_position(&state.text, clamped);
    }

    pub fn position(&self) -> Position {
        self.state.read().position
    }

    /// Move the cursor, clamped to the text
    pub fn set_position(&self, position: Position) {
        let mut state = self.state.write();
        let offset = position_to_offset(&state.text, position);
        state.position = offset_to_position(&state.text, offset);
    }

    /// Cursor as a char offset
    pub fn cursor_offset(&self) -> usize {
        let state = self.state.read();
        position_to_offset(&state.text, state.position)
    }

    /// Incremented on every text change
    pub fn revision(&self) -> u64 {
        self.state.read().revision
    }

    /// Whether two handles share the same underlying model
    pub fn same_model(&self, other: &EditorModel) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl PartialEq for EditorModel {
    fn eq(&self, other: &Self) -> bool {
        self.same_model(other)
    }
}

/// In-process editor widget over an [`EditorModel`]
#[derive(Debug, Clone)]
pub struct BufferEditor {
    model: EditorModel,
    options: EditorOptions,
}

impl BufferEditor {
    pub fn new(model: EditorModel) -> Self {
        Self {
            model,
            options: EditorOptions::FIXED,
        }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }
}

impl EditorWidget for BufferEditor {
    fn get_value(&self) -> String {
        self.model.text()
    }

    fn set_value(&self, value: &str) {
        self.model.set_text(value);
    }

    fn get_position(&self) -> Position {
        self.model.position()
    }

    fn set_position(&self, position: Position) {
        self.model.set_position(position);
    }

    fn model(&self) -> EditorModel {
        self.model.clone()
    }
}

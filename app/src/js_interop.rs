//! JavaScript interop utilities for the editor textarea
//!
//! Consolidates the document::eval calls the editor needs. Each call runs in
//! the window of the component that issues it.

use dioxus::prelude::document;

/// Get the current cursor offset from a textarea element
pub async fn get_cursor_offset(editor_id: &str) -> Option<usize> {
    let js = format!("return document.getElementById('{editor_id}')?.selectionStart ?? 0");

    match document::eval(&js).await {
        Ok(result) => result
            .as_u64()
            .or_else(|| result.as_f64().map(|n| n.max(0.0) as u64))
            .map(|n| n as usize),
        Err(_) => None,
    }
}

/// Set editor content and place the cursor
///
/// Fires an `input` event so the change flows through the normal edit path.
pub async fn set_editor_content(editor_id: &str, content: &str, cursor_offset: usize) {
    let content_json = serde_json::to_string(content).unwrap_or_default();
    let js = format!(
        r#"
        (function() {{
            var editor = document.getElementById('{editor_id}');
            if (editor) {{
                editor.value = {content_json};
                editor.focus();
                var pos = Math.min({cursor_offset}, editor.value.length);
                editor.selectionStart = editor.selectionEnd = pos;
                editor.dispatchEvent(new Event('input', {{ bubbles: true }}));
            }}
        }})();
        "#
    );

    let _ = document::eval(&js).await;
}

/// Insert one indent unit at the cursor, or indent the selected lines
pub async fn insert_indent(editor_id: &str, unit: &str) {
    let unit_json = serde_json::to_string(unit).unwrap_or_default();
    let js = format!(
        r#"
        (function() {{
            var editor = document.getElementById('{editor_id}');
            if (!editor) return;
            var start = editor.selectionStart;
            var end = editor.selectionEnd;
            var value = editor.value;
            var indent = {unit_json};

            if (start === end) {{
                editor.value = value.substring(0, start) + indent + value.substring(end);
                editor.selectionStart = editor.selectionEnd = start + indent.length;
            }} else {{
                var lineStart = value.lastIndexOf('\n', start - 1) + 1;
                var lineEnd = value.indexOf('\n', end);
                if (lineEnd === -1) lineEnd = value.length;

                var selected = value.substring(lineStart, lineEnd);
                var indented = selected.split('\n').map(function(line) {{
                    return indent + line;
                }}).join('\n');

                editor.value = value.substring(0, lineStart) + indented + value.substring(lineEnd);
                editor.selectionStart = start + indent.length;
                editor.selectionEnd = end + selected.split('\n').length * indent.length;
            }}
            editor.focus();
            editor.dispatchEvent(new Event('input', {{ bubbles: true }}));
        }})();
        "#
    );

    let _ = document::eval(&js).await;
}

/// Break the line at the cursor, carrying the current line's indentation
pub async fn insert_newline_keeping_indent(editor_id: &str) {
    let js = format!(
        r#"
        (function() {{
            var editor = document.getElementById('{editor_id}');
            if (!editor) return;
            var start = editor.selectionStart;
            var end = editor.selectionEnd;
            var value = editor.value;
            var lineStart = value.lastIndexOf('\n', start - 1) + 1;
            var indent = value.substring(lineStart, start).match(/^[ \t]*/)[0];
            var insert = '\n' + indent;

            editor.value = value.substring(0, start) + insert + value.substring(end);
            editor.selectionStart = editor.selectionEnd = start + insert.length;
            editor.dispatchEvent(new Event('input', {{ bubbles: true }}));
        }})();
        "#
    );

    let _ = document::eval(&js).await;
}

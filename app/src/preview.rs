//! Preview pane
//!
//! Renders the last valid code once per frame. Each frame is a standalone
//! HTML document shown in an `iframe` at the frame's width, styled from the
//! frame's theme payload.

use crate::state::AppState;
use dioxus::prelude::*;
use playroom_core::prelude::*;
use serde_json::Value;

/// Renders a frame as a self-contained HTML document
///
/// Components are plain tags in the document. A component whose payload has
/// a `"style"` string gets that string as its CSS rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlFrameRenderer;

impl FrameRenderer for HtmlFrameRenderer {
    fn render_frame(&self, request: &PreviewRequest<'_>, frame: &Frame) -> String {
        let theme = request.theme(frame);
        let background = css_text(theme.and_then(|t| t.get_str("background")).unwrap_or("#ffffff"));
        let color = css_text(theme.and_then(|t| t.get_str("color")).unwrap_or("#000000"));

        let mut css = format!(
            "body {{ margin: 0; padding: 12px; background: {background}; color: {color}; \
             font-family: system-ui, sans-serif; }}\n"
        );
        for (name, component) in request.components {
            if !is_tag_name(name) {
                continue;
            }
            if let Some(rule) = component.0.get("style").and_then(Value::as_str) {
                css.push_str(&format!("{name} {{ {} }}\n", css_text(rule)));
            }
        }

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width={width}\">\n\
             <style>\n{css}</style>\n</head>\n<body data-theme=\"{theme}\">\n{body}\n</body>\n</html>\n",
            width = frame.width,
            theme = escape_attr(&frame.theme),
            body = strip_fragments(request.code),
        )
    }
}

/// Drop fragment tags; the document body holds siblings anyway
fn strip_fragments(code: &str) -> String {
    let mut body = String::with_capacity(code.len());
    let mut from = 0;
    for tag in fragment_tags(code) {
        body.push_str(&code[from..tag.start]);
        from = tag.end;
    }
    body.push_str(&code[from..]);
    body
}

/// Component names usable as CSS type selectors
fn is_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// CSS text with anything that could leave its declaration block removed
fn css_text(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '<' | '{' | '}')).collect()
}

fn escape_attr(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Preview frames for the current render code
#[component]
pub fn PreviewPane() -> Element {
    let state = use_context::<Signal<AppState>>();

    let frames: Vec<(Frame, String)> = {
        let s = state.read();
        match s.playroom.preview_request() {
            Some(request) => HtmlFrameRenderer.render_all(&request),
            None => Vec::new(),
        }
    };

    if frames.is_empty() {
        return rsx! {
            div { class: "preview-container",
                div { class: "preview-empty", "Waiting for code..." }
            }
        };
    }

    rsx! {
        div { class: "preview-container",
            for (frame, html) in frames {
                div {
                    key: "{frame.theme}-{frame.width}",
                    class: "preview-frame",
                    div { class: "preview-frame-label", "{frame.theme} \u{b7} {frame.width}px" }
                    iframe {
                        class: "preview-frame-content",
                        style: "width: {frame.width}px;",
                        srcdoc: "{html}",
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn request<'a>(
        code: &'a str,
        themes: &'a IndexMap<String, ThemeRef>,
        components: &'a IndexMap<String, ComponentRef>,
    ) -> PreviewRequest<'a> {
        let names: Vec<&str> = themes.keys().map(String::as_str).collect();
        PreviewRequest {
            code,
            frames: frame_matrix(&[320, 768], &names),
            themes,
            components,
        }
    }

    #[test]
    fn test_frame_uses_theme_colors_and_width() {
        let mut themes = IndexMap::new();
        themes.insert("dark".to_string(), ThemeRef(json!({ "background": "#111", "color": "#eee" })));
        let components = IndexMap::new();
        let request = request("<Text>Hi</Text>", &themes, &components);

        let rendered = HtmlFrameRenderer.render_all(&request);
        assert_eq!(rendered.len(), 2);
        let (frame, html) = &rendered[1];
        assert_eq!(frame.width, 768);
        assert!(html.contains("background: #111"));
        assert!(html.contains("color: #eee"));
        assert!(html.contains("width=768"));
        assert!(html.contains("<Text>Hi</Text>"));
    }

    #[test]
    fn test_unknown_theme_falls_back_to_plain_colors() {
        let themes = IndexMap::new();
        let components = IndexMap::new();
        let request = request("<A />", &themes, &components);
        let frame = Frame {
            theme: "missing".to_string(),
            width: 320,
        };

        let html = HtmlFrameRenderer.render_frame(&request, &frame);
        assert!(html.contains("background: #ffffff"));
        assert!(html.contains("data-theme=\"missing\""));
    }

    #[test]
    fn test_component_styles_become_rules() {
        let mut themes = IndexMap::new();
        themes.insert("light".to_string(), ThemeRef(json!({})));
        let mut components = IndexMap::new();
        components.insert("Button".to_string(), ComponentRef(json!({ "style": "padding: 4px;" })));
        components.insert("Text".to_string(), ComponentRef(json!(null)));
        let request = request("<><Button>Go</Button></>", &themes, &components);

        let html = HtmlFrameRenderer.render_frame(&request, &request.frames[0]);
        assert!(html.contains("Button { padding: 4px; }"));
        assert!(!html.contains("Text {"));
        assert!(html.contains("\n<Button>Go</Button>\n"));
    }

    #[test]
    fn test_only_fragment_tags_are_stripped() {
        let themes = IndexMap::new();
        let components = IndexMap::new();
        let code = "<>\n<Text title=\"<>\">{'</>'}</Text>\n</>";
        let request = request(code, &themes, &components);
        let frame = Frame {
            theme: "light".to_string(),
            width: 320,
        };

        let html = HtmlFrameRenderer.render_frame(&request, &frame);
        assert!(html.contains("\n\n<Text title=\"<>\">{'</>'}</Text>\n\n"));
    }

    #[test]
    fn test_theme_and_component_names_are_escaped() {
        let mut themes = IndexMap::new();
        themes.insert(
            "x\"><script>".to_string(),
            ThemeRef(json!({ "background": "red</style>" })),
        );
        let mut components = IndexMap::new();
        components.insert("Box".to_string(), ComponentRef(json!({ "style": "color: red; } body { x" })));
        components.insert("a, body".to_string(), ComponentRef(json!({ "style": "display: none;" })));
        let request = request("<Box />", &themes, &components);

        let html = HtmlFrameRenderer.render_frame(&request, &request.frames[0]);
        assert!(html.contains("data-theme=\"x&quot;&gt;&lt;script&gt;\""));
        assert!(!html.contains("<script>"));
        assert!(html.contains("background: red/style>;"));
        assert!(html.contains("Box { color: red;  body  x }"));
        assert!(!html.contains("display: none"));
    }
}

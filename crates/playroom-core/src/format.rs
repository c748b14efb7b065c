//! Code formatting
//!
//! The save shortcut hands the editor's text and cursor to a [`CodeFormatter`]
//! and writes back whatever it returns. [`IndentFormatter`] is the built-in
//! one: it re-indents markup by nesting depth and keeps the cursor on the
//! same character.

use crate::editor::{EditorOptions, Position};
use crate::validate::{ParsedFragment, WRAP_OPEN, parse_fragment};
use crate::Result;
use tree_sitter::Node;

/// Formatter output: new code and the cursor position inside it (1-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub code: String,
    pub line: u32,
    pub ch: u32,
}

/// Reformats code, carrying the cursor along
pub trait CodeFormatter: Send + Sync {
    fn format(&self, code: &str, cursor: Position) -> Result<Formatted>;
}

/// Re-indents JSX by nesting depth
///
/// Nesting comes from the syntax tree, so a line sits one unit deeper than
/// the line that opened its innermost enclosing construct:
/// - one indent unit per open element, opening tag spanning lines, or open
///   bracket in an embedded expression (brackets opened on the same line
///   count once)
/// - trailing whitespace trimmed, runs of blank lines collapsed to one,
///   leading and trailing blank lines removed
/// - lines inside multi-line strings, template literals and block comments
///   are left untouched
///
/// Code that fails the syntax check is rejected.
#[derive(Debug, Clone, Default)]
pub struct IndentFormatter {
    options: EditorOptions,
}

impl IndentFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CodeFormatter for IndentFormatter {
    fn format(&self, code: &str, cursor: Position) -> Result<Formatted> {
        let parsed = parse_fragment(code)?;
        let layout = Layout::new(&parsed, code);

        let unit = self.options.indent_unit();
        let mut levels: Vec<usize> = Vec::new();
        let mut output: Vec<String> = Vec::new();
        let mut maps: Vec<LineMap> = Vec::new();
        let mut pending_blank = false;
        let mut unresolved: Vec<usize> = Vec::new();

        for (index, line) in code.split('\n').enumerate() {
            let line_start = layout.line_starts[index];
            let old_lead = line.chars().take_while(|c| c.is_whitespace()).count();

            if layout.in_literal(line_start) {
                levels.push(old_lead / unit.len().max(1));
                maps.push(LineMap::Kept {
                    new_line: output.len(),
                    old_lead: 0,
                    new_lead: 0,
                });
                output.push(line.to_string());
                continue;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                levels.push(0);
                if !output.is_empty() {
                    pending_blank = true;
                }
                unresolved.push(maps.len());
                maps.push(LineMap::Dropped);
                continue;
            }

            if pending_blank {
                output.push(String::new());
                pending_blank = false;
            }

            let first = line_start + (line.len() - line.trim_start().len());
            let level = layout.level(first, &levels);
            levels.push(level);

            let new_line = output.len();
            let new_lead = level * unit.len();
            for index in unresolved.drain(..) {
                maps[index] = LineMap::Kept {
                    new_line,
                    old_lead: 0,
                    new_lead,
                };
            }
            maps.push(LineMap::Kept {
                new_line,
                old_lead,
                new_lead,
            });
            output.push(format!("{}{}", unit.repeat(level), trimmed));
        }

        let (line, ch) = map_cursor(&maps, &output, cursor);
        Ok(Formatted {
            code: output.join("\n"),
            line,
            ch,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum LineMap {
    Kept {
        new_line: usize,
        old_lead: usize,
        new_lead: usize,
    },
    /// Blank line removed with nothing after it
    Dropped,
}

fn map_cursor(maps: &[LineMap], output: &[String], cursor: Position) -> (u32, u32) {
    let end_of_text = || {
        let last = output.len().max(1);
        let len = output.last().map_or(0, |l| l.chars().count());
        (last as u32, len as u32 + 1)
    };

    let index = cursor.line_number.max(1) as usize - 1;
    match maps.get(index) {
        Some(LineMap::Kept {
            new_line,
            old_lead,
            new_lead,
        }) => {
            let col0 = cursor.column.max(1) as usize - 1;
            let mapped = if col0 <= *old_lead {
                *new_lead
            } else {
                new_lead + (col0 - old_lead)
            };
            let line_len = output.get(*new_line).map_or(0, |l| l.chars().count());
            (*new_line as u32 + 1, mapped.min(line_len) as u32 + 1)
        }
        Some(LineMap::Dropped) | None => end_of_text(),
    }
}

/// Line geometry over the parsed fragment
struct Layout<'a> {
    parsed: &'a ParsedFragment,
    /// Byte offset of each user line in the wrapped source
    line_starts: Vec<usize>,
}

impl<'a> Layout<'a> {
    fn new(parsed: &'a ParsedFragment, code: &str) -> Self {
        let mut line_starts = vec![WRAP_OPEN.len()];
        line_starts.extend(
            code.match_indices('\n')
                .map(|(i, _)| WRAP_OPEN.len() + i + 1),
        );
        Self {
            parsed,
            line_starts,
        }
    }

    fn line_of(&self, byte: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= byte)
            .saturating_sub(1)
    }

    /// Whether a line begins inside a string, template literal or comment
    fn in_literal(&self, line_start: usize) -> bool {
        let mut node = self
            .parsed
            .root()
            .descendant_for_byte_range(line_start, line_start);
        while let Some(current) = node {
            if matches!(current.kind(), "string" | "template_string" | "comment")
                && current.start_byte() < line_start
                && line_start < current.end_byte()
            {
                return true;
            }
            node = current.parent();
        }
        false
    }

    /// Indent level of a line whose first character is at byte `first`
    fn level(&self, first: usize, levels: &[usize]) -> usize {
        let Some(container) = self.container(first) else {
            return 0;
        };
        let opened_at = levels
            .get(self.line_of(container.start_byte()))
            .copied()
            .unwrap_or(0);
        if closes(container, first) {
            opened_at
        } else {
            opened_at + 1
        }
    }

    /// Innermost construct that opened before `first` and is still open
    ///
    /// The wrapper element and everything above it start at byte zero and
    /// never count.
    fn container(&self, first: usize) -> Option<Node<'a>> {
        let mut node = self.parsed.root().descendant_for_byte_range(first, first)?;
        loop {
            if node.start_byte() == 0 {
                return None;
            }
            if is_container(node.kind()) && node.start_byte() < first && first < node.end_byte() {
                return Some(node);
            }
            node = node.parent()?;
        }
    }
}

fn is_container(kind: &str) -> bool {
    matches!(
        kind,
        "jsx_element"
            | "jsx_opening_element"
            | "jsx_self_closing_element"
            | "jsx_expression"
            | "parenthesized_expression"
            | "arguments"
            | "array"
            | "object"
            | "statement_block"
            | "formal_parameters"
            | "object_pattern"
            | "array_pattern"
            | "template_substitution"
            | "class_body"
            | "switch_body"
    )
}

/// Whether the line at `first` starts with the container's closing token
fn closes(container: Node<'_>, first: usize) -> bool {
    match container.kind() {
        "jsx_element" => {
            let mut cursor = container.walk();
            container
                .named_children(&mut cursor)
                .filter(|n| n.kind() == "jsx_closing_element")
                .last()
                .is_some_and(|close| first >= close.start_byte())
        }
        "jsx_self_closing_element" => first + 2 >= container.end_byte(),
        _ => first + 1 >= container.end_byte(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Error;

    fn format(code: &str) -> String {
        IndentFormatter::new()
            .format(code, Position::default())
            .unwrap()
            .code
    }

    #[test]
    fn test_indents_children() {
        assert_eq!(
            format("<Box>\n<Text>Hi</Text>\n</Box>"),
            "<Box>\n  <Text>Hi</Text>\n</Box>"
        );
    }

    #[test]
    fn test_multiline_opening_tag() {
        let code = "<Box\npadding=\"small\"\n    tone=\"critical\"\n>\nchild\n</Box>";
        assert_eq!(
            format(code),
            "<Box\n  padding=\"small\"\n  tone=\"critical\"\n>\n  child\n</Box>"
        );
    }

    #[test]
    fn test_self_closing_on_own_line() {
        let code = "<Stack>\n<Icon\nsize=\"large\"\n/>\n</Stack>";
        assert_eq!(
            format(code),
            "<Stack>\n  <Icon\n    size=\"large\"\n  />\n</Stack>"
        );
    }

    #[test]
    fn test_brackets_on_one_line_count_once() {
        let code = "<List>\n{items.map(item => (\n<Item />\n))}\n</List>";
        assert_eq!(
            format(code),
            "<List>\n  {items.map(item => (\n    <Item />\n  ))}\n</List>"
        );
    }

    #[test]
    fn test_blank_lines() {
        let code = "\n\n<A />\n\n\n\n<B />   \n\n";
        assert_eq!(format(code), "<A />\n\n<B />");
    }

    #[test]
    fn test_template_literal_lines_untouched() {
        let code = "<Text>\n{`first\n      second`}\n</Text>";
        assert_eq!(format(code), "<Text>\n  {`first\n      second`}\n</Text>");
    }

    #[test]
    fn test_idempotent() {
        let code = "<Card\ntitle=\"x\">\n<List>\n{items.map(i => <Item key={i} />)}\n</List>\n\n\n<Footer/></Card>";
        let once = format(code);
        assert_eq!(format(&once), once);
    }

    #[test]
    fn test_object_and_array_literals() {
        let code = "<Chart\ndata={[\n{ x: 1 },\n{\ny: 2,\n},\n]}\n/>";
        assert_eq!(
            format(code),
            "<Chart\n  data={[\n    { x: 1 },\n    {\n      y: 2,\n    },\n  ]}\n/>"
        );
    }

    #[test]
    fn test_angle_brackets_in_strings_do_not_nest() {
        let code = "<Text>\n{\"<Box>\" + '<'}\n</Text>\n<Text>After</Text>";
        assert_eq!(
            format(code),
            "<Text>\n  {\"<Box>\" + '<'}\n</Text>\n<Text>After</Text>"
        );
    }

    #[test]
    fn test_rejects_invalid_code() {
        let result = IndentFormatter::new().format("<Box>", Position::default());
        assert!(matches!(result, Err(Error::Syntax(_))));

        let result = IndentFormatter::new().format("<Text>{a b}</Text>", Position::default());
        assert!(matches!(result, Err(Error::Syntax(_))));
    }

    #[test]
    fn test_cursor_follows_indentation() {
        let formatted = IndentFormatter::new()
            .format("<Box>\n<Text>Hi</Text>\n</Box>", Position::new(2, 3))
            .unwrap();
        // Same character, shifted by the new indent
        assert_eq!((formatted.line, formatted.ch), (2, 5));
    }

    #[test]
    fn test_cursor_in_leading_whitespace_snaps_to_indent() {
        let formatted = IndentFormatter::new()
            .format("<Box>\n        <Text />\n</Box>", Position::new(2, 3))
            .unwrap();
        assert_eq!((formatted.line, formatted.ch), (2, 3));
    }

    #[test]
    fn test_cursor_on_removed_blank_line() {
        let formatted = IndentFormatter::new()
            .format("\n\n<A />", Position::new(1, 1))
            .unwrap();
        assert_eq!((formatted.line, formatted.ch), (1, 1));

        let formatted = IndentFormatter::new()
            .format("<A />\n\n", Position::new(3, 1))
            .unwrap();
        assert_eq!((formatted.line, formatted.ch), (1, 6));
    }
}

//! JSX fragment syntax checking
//!
//! Code typed into the playroom is a JSX fragment: a sequence of elements,
//! text and `{expression}` children. Before it reaches the preview it is
//! wrapped in `<div>` … `</div>` and parsed with the tree-sitter JavaScript
//! grammar, which includes JSX. Only syntax is checked; nothing is evaluated.
//!
//! The grammar recovers from errors, so a parse always yields a tree. The
//! check reports the earliest of:
//! - an `ERROR` or missing node
//! - a closing tag that does not match its opening tag
//! - an empty `{}` attribute value, or a bare `{}` where an attribute belongs
//! - user code that closes the wrapper and continues after it

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use thiserror::Error;
use tree_sitter::{Language, Node, Parser, Tree, TreeCursor};

pub(crate) const WRAP_OPEN: &str = "<div>";
const WRAP_CLOSE: &str = "</div>";

/// A syntax error, positioned in the user's code
///
/// Displays as `message (line:column)`, the shape [`error_line`] expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} ({line}:{column})")]
pub struct SyntaxError {
    /// Human readable description
    pub message: String,
    /// 1-based line
    pub line: u32,
    /// 0-based column
    pub column: u32,
}

/// Extension point for surfacing syntax errors in the editor
///
/// On a failed check with a recoverable line the playroom calls `mark`;
/// after a successful check it calls `clear`.
pub trait ErrorMarker: Send + Sync {
    /// Flag `line` in the editor gutter with `message` as its tooltip
    fn mark(&self, line: u32, message: &str);
    /// Remove any flag set by `mark`
    fn clear(&self);
}

/// Marker that shows nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMarker;

impl ErrorMarker for NoopMarker {
    fn mark(&self, _line: u32, _message: &str) {}
    fn clear(&self) {}
}

static LINE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\(([0-9]+):").ok());

/// Pull the line number out of a parser error message
///
/// Looks for the first `(<digits>:`. Returns `None` when there is no match
/// or the line is zero.
pub fn error_line(message: &str) -> Option<u32> {
    let captures = LINE_PATTERN.as_ref()?.captures(message)?;
    let line: u32 = captures.get(1)?.as_str().parse().ok()?;
    (line > 0).then_some(line)
}

/// Check that `code` is a syntactically valid JSX fragment
pub fn validate_fragment(code: &str) -> Result<(), SyntaxError> {
    parse_fragment(code).map(|_| ())
}

/// A fragment that passed the check, with its syntax tree
///
/// Byte offsets into the tree are offsets into the wrapped code; user byte
/// `b` sits at `WRAP_OPEN.len() + b`.
pub(crate) struct ParsedFragment {
    tree: Tree,
}

impl ParsedFragment {
    pub(crate) fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }
}

/// Byte ranges of the `<>` and `</>` tags in `code`
///
/// Ranges are in the user's coordinates, in source order. Code that fails
/// the syntax check has none.
pub fn fragment_tags(code: &str) -> Vec<Range<usize>> {
    let Ok(parsed) = parse_fragment(code) else {
        return Vec::new();
    };
    let mut tags = Vec::new();
    collect_fragment_tags(&mut parsed.root().walk(), &mut tags);
    tags.into_iter()
        .map(|tag| tag.start - WRAP_OPEN.len()..tag.end - WRAP_OPEN.len())
        .collect()
}

fn collect_fragment_tags(cursor: &mut TreeCursor<'_>, tags: &mut Vec<Range<usize>>) {
    let node = cursor.node();
    if matches!(node.kind(), "jsx_opening_element" | "jsx_closing_element")
        && node.child_by_field_name("name").is_none()
    {
        tags.push(node.byte_range());
        return;
    }
    if cursor.goto_first_child() {
        loop {
            collect_fragment_tags(cursor, tags);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}

/// Parse `code` as a JSX fragment, failing on the first syntax problem
pub(crate) fn parse_fragment(code: &str) -> Result<ParsedFragment, SyntaxError> {
    let source = format!("{WRAP_OPEN}{code}{WRAP_CLOSE}");

    let mut parser = Parser::new();
    let language: Language = tree_sitter_javascript::LANGUAGE.into();
    let tree = parser
        .set_language(&language)
        .ok()
        .and_then(|()| parser.parse(&source, None));
    let Some(tree) = tree else {
        return Err(SyntaxError {
            message: "JavaScript grammar unavailable".to_string(),
            line: 1,
            column: 0,
        });
    };

    let problem = {
        let root = tree.root_node();
        let mut found = None;
        find_problems(&mut root.walk(), &source, &mut found);
        found
            .or_else(|| wrapper_problem(root, &source))
            .or_else(|| root.has_error().then(|| Problem::new(0, "Unexpected token")))
    };

    match problem {
        Some(problem) => Err(locate(&source, problem)),
        None => Ok(ParsedFragment { tree }),
    }
}

/// A problem at a byte offset of the wrapped source
struct Problem {
    pos: usize,
    message: String,
}

impl Problem {
    fn new(pos: usize, message: impl Into<String>) -> Self {
        Self {
            pos,
            message: message.into(),
        }
    }
}

/// Keep the earliest problem
fn report(found: &mut Option<Problem>, problem: Problem) {
    if found.as_ref().is_none_or(|current| problem.pos < current.pos) {
        *found = Some(problem);
    }
}

fn find_problems(cursor: &mut TreeCursor<'_>, source: &str, found: &mut Option<Problem>) {
    let node = cursor.node();

    if node.is_missing() {
        report(
            found,
            Problem::new(node.start_byte(), format!("Unexpected token, expected `{}`", node.kind())),
        );
        return;
    }
    if node.is_error() {
        report(found, Problem::new(node.start_byte(), unexpected_token(node, source)));
        return;
    }

    match node.kind() {
        "jsx_element" => check_closing_tag(node, source, found),
        "jsx_attribute" => {
            let value = named_children(node).into_iter().nth(1);
            if let Some(value) = value.filter(|v| v.kind() == "jsx_expression" && is_empty_expression(*v)) {
                report(
                    found,
                    Problem::new(
                        value.start_byte(),
                        "JSX attributes must only be assigned a non-empty expression",
                    ),
                );
            }
        }
        "jsx_expression" => {
            let in_tag = node
                .parent()
                .is_some_and(|p| matches!(p.kind(), "jsx_opening_element" | "jsx_self_closing_element"));
            let spread = named_children(node).iter().any(|n| n.kind() == "spread_element");
            if in_tag && !spread {
                report(found, Problem::new(node.start_byte(), "Unexpected token `{`"));
            }
        }
        _ => {}
    }

    if cursor.goto_first_child() {
        loop {
            find_problems(cursor, source, found);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}

fn check_closing_tag(element: Node<'_>, source: &str, found: &mut Option<Problem>) {
    let children = named_children(element);
    let open = children.iter().find(|n| n.kind() == "jsx_opening_element");
    let close = children.iter().rev().find(|n| n.kind() == "jsx_closing_element");
    let (Some(open), Some(close)) = (open, close) else {
        return;
    };

    let open_name = tag_name(*open, source);
    if open_name != tag_name(*close, source) {
        report(
            found,
            Problem::new(
                close.start_byte(),
                format!(
                    "Expected corresponding JSX closing tag for <{}>",
                    open_name.unwrap_or_default()
                ),
            ),
        );
    }
}

/// Tag name with whitespace removed; `None` for fragments
fn tag_name(tag: Node<'_>, source: &str) -> Option<String> {
    let name = tag.child_by_field_name("name")?;
    let text = source.get(name.start_byte()..name.end_byte())?;
    Some(text.chars().filter(|c| !c.is_whitespace()).collect())
}

/// `{}` holding nothing but comments
fn is_empty_expression(expression: Node<'_>) -> bool {
    named_children(expression).iter().all(|n| n.kind() == "comment")
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Message for an `ERROR` node, naming its first token
fn unexpected_token(node: Node<'_>, source: &str) -> String {
    let mut leaf = node;
    while let Some(child) = leaf.child(0) {
        leaf = child;
    }
    let token = source
        .get(leaf.start_byte()..leaf.end_byte())
        .map(str::trim)
        .unwrap_or_default();
    if token.is_empty() {
        "Unexpected token".to_string()
    } else {
        format!("Unexpected token `{token}`")
    }
}

/// The tree must be a single statement: the wrapper element, end to end
fn wrapper_problem(root: Node<'_>, source: &str) -> Option<Problem> {
    let statements: Vec<Node<'_>> = named_children(root)
        .into_iter()
        .filter(|n| n.kind() != "comment")
        .collect();
    let first = statements.first()?;
    let spans_all = statements.len() == 1
        && first.named_child(0).is_some_and(|element| {
            element.kind() == "jsx_element" && element.start_byte() == 0 && element.end_byte() == source.len()
        });
    (!spans_all).then(|| {
        let pos = first.named_child(0).map_or(first.end_byte(), |n| n.end_byte());
        Problem::new(pos, "Adjacent JSX elements must be wrapped in an enclosing tag")
    })
}

/// Turn a wrapped-source offset into a user-code position
fn locate(source: &str, problem: Problem) -> SyntaxError {
    let before = source.get(..problem.pos).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count();
    // The wrapper only shifts the first line
    let column = if line == 1 {
        column.saturating_sub(WRAP_OPEN.len())
    } else {
        column
    };

    SyntaxError {
        message: problem.message,
        line: u32::try_from(line).unwrap_or(u32::MAX),
        column: u32::try_from(column).unwrap_or(u32::MAX),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn err(code: &str) -> SyntaxError {
        validate_fragment(code).unwrap_err()
    }

    #[test]
    fn test_valid_fragments() {
        let valid = [
            "",
            "Hello world",
            "<Foo/>",
            "<Button primary>Submit</Button>",
            "<Card title=\"Hi\" size='large'>\n  <Text>Body</Text>\n</Card>",
            "<>\n  <A />\n  <B />\n</>",
            "<Icon.Star />",
            "<svg:rect width=\"10\" />",
            "<input disabled data-test-id=\"x\" aria-label='y' />",
            "<Foo {...props} bar={1} />",
            "<Foo render={() => <Bar />} />",
            "<List>{items.map(item => <Item key={item.id}>{item.label}</Item>)}</List>",
            "<Text>{a < b ? 'yes' : \"no\"}</Text>",
            "<Text>{`template ${value} here`}</Text>",
            "<Text>{/* comment */}</Text>",
            "<Text>{}</Text>",
            "<Text>{ /a}b/.test(x) }</Text>",
            "<Box\n  // line comment between attributes\n  padding=\"small\"\n/>",
            "<Label icon=<Icon /> />",
            "<Text>a // not a comment in text</Text>",
        ];
        for code in valid {
            assert!(validate_fragment(code).is_ok(), "expected valid: {code:?}");
        }
    }

    #[test]
    fn test_unclosed_element() {
        let e = err("<Button>Submit");
        assert_eq!(e.line, 1);
    }

    #[test]
    fn test_mismatched_closing_tag_reports_line() {
        let e = err("<Stack>\n  <Text>Hi</Text>\n</Stak>");
        assert_eq!(e.message, "Expected corresponding JSX closing tag for <Stack>");
        assert_eq!(e.line, 3);
        assert_eq!(e.column, 0);
    }

    #[test]
    fn test_column_is_relative_to_user_code() {
        // `</B>` starts at column 3 of the user's first line
        let e = err("<A></B>");
        assert_eq!(e.message, "Expected corresponding JSX closing tag for <A>");
        assert_eq!((e.line, e.column), (1, 3));
    }

    #[test]
    fn test_mismatched_fragment_close() {
        let e = err("<>\n  <A />\n</A>");
        assert_eq!(e.message, "Expected corresponding JSX closing tag for <>");
        assert_eq!(e.line, 3);
    }

    #[test]
    fn test_unterminated_string_attribute() {
        let e = err("<Foo bar=\"baz />");
        assert_eq!(e.line, 1);
    }

    #[test]
    fn test_empty_attribute_expression() {
        let e = err("<Foo bar={} />");
        assert_eq!(
            e.message,
            "JSX attributes must only be assigned a non-empty expression"
        );
    }

    #[test]
    fn test_invalid_expressions() {
        let invalid = [
            "<Text>{a b}</Text>",
            "<Foo bar={1 +} />",
            "<Text>{let x = 1}</Text>",
            "{,}",
            "<Foo {bar} />",
            "<Text>{items.map(item => )}</Text>",
        ];
        for code in invalid {
            assert!(validate_fragment(code).is_err(), "expected invalid: {code:?}");
        }
    }

    #[test]
    fn test_invalid_expression_reports_its_line() {
        let e = err("<Card>\n  <Text>{a b}</Text>\n</Card>");
        assert_eq!(e.line, 2);
        assert!(e.message.starts_with("Unexpected token"), "{}", e.message);
    }

    #[test]
    fn test_unbalanced_expression() {
        assert!(validate_fragment("<Text>{foo(}</Text>").is_err());
        assert!(validate_fragment("<Text>{[1, 2}</Text>").is_err());
        assert!(validate_fragment("<Text>{'abc</Text>").is_err());
    }

    #[test]
    fn test_code_closing_the_wrapper_is_rejected() {
        assert!(validate_fragment("</div><div>").is_err());
    }

    #[test]
    fn test_display_matches_line_pattern() {
        let e = err("<A>\n<B>\n</A>");
        let message = e.to_string();
        assert!(message.ends_with(&format!("({}:{})", e.line, e.column)));
        assert_eq!(error_line(&message), Some(e.line));
    }

    #[test]
    fn test_fragment_tags() {
        let code = "<>\n  <Text title=\"<>\">{'</>'}</Text>\n</>";
        let tags = fragment_tags(code);
        assert_eq!(tags.len(), 2);
        assert_eq!(&code[tags[0].clone()], "<>");
        assert_eq!(&code[tags[1].clone()], "</>");
        assert_eq!(tags[1].start, code.len() - 3);
    }

    #[test]
    fn test_fragment_tags_of_invalid_code() {
        assert!(fragment_tags("<>\n<A>").is_empty());
        assert!(fragment_tags("<Text>no fragments</Text>").is_empty());
    }

    #[test]
    fn test_error_line_extraction() {
        assert_eq!(error_line("Unexpected token (12:4)"), Some(12));
        assert_eq!(error_line("Unexpected token"), None);
        assert_eq!(error_line("Weird (0:1)"), None);
        assert_eq!(error_line("(abc:1) then (3:2)"), Some(3));
    }
}

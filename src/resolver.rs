//! Recovers source positions for logical paths.
//!
//! The document tree carries no positions, so the resolver re-reads the raw
//! text and follows indentation. It is a heuristic: a single forward pass,
//! no backtracking, and a miss degrades to the end-of-document sentinel
//! (`line_count`, 0) rather than an error.

use crate::ast::{LogicalPath, PathSegment, Position};
use crate::utils::{
    indentation, is_ignorable, line_key, list_item_body, to_u32, utf16_len, SourceText,
};

/// Maps logical paths to positions in the raw text.
///
/// The validator only talks to this trait, so a position-preserving parser
/// can replace the indentation scan without touching any rule.
pub trait PositionResolver {
    /// Position just past the separator of the last key in `path`, or the
    /// list marker's column when `path` ends with an index.
    fn resolve(&self, source: &SourceText<'_>, path: &LogicalPath) -> Position;

    /// Position of the `index`-th item of the list introduced by `array_name:`.
    fn resolve_list_item(
        &self,
        source: &SourceText<'_>,
        array_name: &str,
        index: usize,
    ) -> Position;

    /// Start of the line following the first `key:` line.
    fn position_after_key(&self, source: &SourceText<'_>, key: &str) -> Position;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IndentationResolver;

/// Items of the list currently being walked.
#[derive(Debug, Default)]
struct ItemCursor {
    /// Column of the list markers; fixed by the first marker seen.
    column: Option<u32>,
    seen: usize,
}

impl PositionResolver for IndentationResolver {
    fn resolve(&self, source: &SourceText<'_>, path: &LogicalPath) -> Position {
        let segments = path.segments();
        if segments.is_empty() {
            return source.end_position();
        }

        let mut matched = 0;
        let mut anchor = 0;
        // Indentation of the anchor's direct children, fixed by the first
        // line below it. Deeper lines belong to nested blocks.
        let mut child: Option<u32> = None;
        let mut items = ItemCursor::default();

        for (line_index, line) in source.lines() {
            let trimmed = line.trim();
            if is_ignorable(trimmed) {
                continue;
            }
            let indent = indentation(line);

            if matched > 0 {
                // List items may sit at the same column as the key that owns them.
                let wants_item = matches!(segments[matched], PathSegment::Index(_));
                let continues_list = wants_item && list_item_body(trimmed).is_some();
                if indent < anchor || (indent == anchor && !continues_list) {
                    matched = 0;
                    child = None;
                    items = ItemCursor::default();
                } else if !wants_item && indent > *child.get_or_insert(indent) {
                    continue;
                }
            }

            let mut content = trimmed;
            let mut column = indent;
            while matched < segments.len() {
                match &segments[matched] {
                    PathSegment::Key(key) => {
                        let Some((found, colon)) = line_key(content) else {
                            break;
                        };
                        if found != key {
                            break;
                        }
                        matched += 1;
                        anchor = column;
                        child = None;
                        items = ItemCursor::default();
                        if matched == segments.len() {
                            return Position::new(
                                to_u32(line_index),
                                column + utf16_len(&content[..=colon]),
                            );
                        }
                        break;
                    }
                    PathSegment::Index(index) => {
                        let Some((body, body_offset)) = list_item_body(content) else {
                            break;
                        };
                        if *items.column.get_or_insert(column) != column {
                            break;
                        }
                        if items.seen < *index {
                            items.seen += 1;
                            break;
                        }
                        matched += 1;
                        anchor = column;
                        items = ItemCursor::default();
                        if matched == segments.len() {
                            return Position::new(to_u32(line_index), column);
                        }
                        // `- key: value` also opens the item's first key.
                        column += utf16_len(&content[..body_offset]);
                        child = (!body.is_empty()).then_some(column);
                        content = body;
                    }
                }
            }
        }

        log::trace!("path `{path}` not found; falling back to end of document");
        source.end_position()
    }

    fn resolve_list_item(
        &self,
        source: &SourceText<'_>,
        array_name: &str,
        index: usize,
    ) -> Position {
        list_items(source, array_name)
            .get(index)
            .map(|item| Position::new(to_u32(item.line), item.column))
            .unwrap_or_else(|| {
                log::trace!("item {index} of `{array_name}` not found; using end of document");
                source.end_position()
            })
    }

    fn position_after_key(&self, source: &SourceText<'_>, key: &str) -> Position {
        source
            .lines()
            .find(|(_, line)| line_key(line.trim()).is_some_and(|(found, _)| found == key))
            .map(|(line_index, _)| Position::new(to_u32(line_index) + 1, 0))
            .unwrap_or_else(|| {
                log::trace!("key `{key}` not found; falling back to end of document");
                source.end_position()
            })
    }
}

/// One entry of a block sequence as laid out in the text.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ListItem {
    pub index: usize,
    /// Line holding the item's `-` marker.
    pub line: usize,
    /// Column of the `-` marker.
    pub column: u32,
    /// First line after the item (exclusive end).
    pub end_line: usize,
}

/// Items of the first list introduced by a bare `array_name:` line.
///
/// Items are the `-` lines at the column of the first marker; deeper markers
/// belong to nested lists. The list ends at a line indented less than the
/// `array_name:` line, or at a non-item line indented no deeper than it.
pub fn list_items(source: &SourceText<'_>, array_name: &str) -> Vec<ListItem> {
    let mut items: Vec<ListItem> = Vec::new();
    let mut array_indent = None;
    let mut item_column = None;
    let mut end_line = source.line_count();

    for (line_index, line) in source.lines() {
        let trimmed = line.trim();
        if is_ignorable(trimmed) {
            continue;
        }
        let indent = indentation(line);

        let Some(array_indent) = array_indent else {
            if opens_block(trimmed, array_name) {
                array_indent = Some(indent);
            }
            continue;
        };

        let is_item = list_item_body(trimmed).is_some();
        if indent < array_indent || (!is_item && indent <= array_indent) {
            end_line = line_index;
            break;
        }
        if !is_item || *item_column.get_or_insert(indent) != indent {
            continue;
        }
        if let Some(previous) = items.last_mut() {
            previous.end_line = line_index;
        }
        items.push(ListItem {
            index: items.len(),
            line: line_index,
            column: indent,
            end_line: source.line_count(),
        });
    }

    if let Some(last) = items.last_mut() {
        last.end_line = last.end_line.min(end_line);
    }
    items
}

/// `name:` with nothing after the separator but an optional comment.
fn opens_block(trimmed: &str, name: &str) -> bool {
    line_key(trimmed).is_some_and(|(key, colon)| {
        let rest = trimmed[colon + 1..].trim();
        key == name && (rest.is_empty() || rest.starts_with('#'))
    })
}

/// Resolves `path` in `text` with the indentation resolver.
pub fn resolve(text: &str, path: &LogicalPath) -> Position {
    IndentationResolver.resolve(&SourceText::new(text), path)
}

/// Resolves the `index`-th item of the `array_name:` list in `text`.
pub fn resolve_list_item(text: &str, array_name: &str, index: usize) -> Position {
    IndentationResolver.resolve_list_item(&SourceText::new(text), array_name, index)
}

/// Start of the line after the first `key:` line of `text`.
pub fn position_after_key(text: &str, key: &str) -> Position {
    IndentationResolver.position_after_key(&SourceText::new(text), key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
apiVersion: kro.run/v1alpha1
kind: ResourceGraphDefinition
metadata:
  name: demo
spec:
  schema:
    spec:
      name: string | required

      replicas: integer | default=1
  resources:
    - id: deployment
      type: apps/v1
    - id: service
      type: v1
";

    #[test]
    fn test_resolve_nested_key() {
        let path = LogicalPath::from_dotted("spec.schema.spec.replicas");
        assert_eq!(resolve(DOC, &path), Position::new(9, 15));
    }

    #[test]
    fn test_resolve_skips_blank_lines() {
        let path = LogicalPath::from_dotted("spec.schema.spec.name");
        assert_eq!(resolve(DOC, &path), Position::new(7, 11));
    }

    #[test]
    fn test_resolve_list_index() {
        let path = LogicalPath::from_dotted("spec.resources").index(1).key("id");
        assert_eq!(resolve(DOC, &path), Position::new(13, 9));
        let item = LogicalPath::from_dotted("spec.resources").index(0);
        assert_eq!(resolve(DOC, &item), Position::new(11, 4));
    }

    #[test]
    fn test_resolve_missing_path_returns_sentinel() {
        let path = LogicalPath::from_dotted("spec.schema.status.ready");
        assert_eq!(resolve(DOC, &path), Position::new(15, 0));
        let empty = LogicalPath::new();
        assert_eq!(resolve(DOC, &empty), Position::new(15, 0));
    }

    #[test]
    fn test_list_items() {
        let source = SourceText::new(DOC);
        let items = list_items(&source, "resources");
        assert_eq!(items.len(), 2);
        assert_eq!((items[0].line, items[0].column, items[0].end_line), (11, 4, 13));
        assert_eq!((items[1].line, items[1].end_line), (13, 15));
    }

    #[test]
    fn test_position_after_key() {
        assert_eq!(position_after_key(DOC, "kind"), Position::new(2, 0));
        assert_eq!(position_after_key(DOC, "missing"), Position::new(15, 0));
    }
}

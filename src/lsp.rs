use crate::ast::{LogicalPath, PathSegment, Position, Range};
use crate::lexer::{find_expressions, tokenize_document, ExpressionToken};
use crate::resolver::{IndentationResolver, PositionResolver};
use crate::utils::SourceText;
use serde::Serialize;
use std::fmt::Display;

/// Token type names, indexed by [`crate::lexer::TokenRole::legend_index`].
pub const SEMANTIC_TOKEN_LEGEND: [&str; 5] =
    ["celDollar", "celBrace", "celRoot", "celMiddle", "celLeaf"];

/// Root segment of expressions that point into the document's own schema.
pub const SCHEMA_ROOT: &str = "schema";

/// Every `${...}` token of a document, in line order.
pub fn semantic_tokens(text: &str) -> Vec<ExpressionToken> {
    tokenize_document(text)
}

/// Relative LSP encoding: `[deltaLine, deltaStart, length, tokenType, 0]`
/// per token. `deltaStart` is relative to the previous token only when both
/// sit on the same line.
pub fn encode_semantic_tokens(tokens: &[ExpressionToken]) -> Vec<u32> {
    let mut data = Vec::with_capacity(tokens.len() * 5);
    let mut previous_line = 0;
    let mut previous_start = 0;

    for token in tokens {
        let delta_line = token.line - previous_line;
        let delta_start = if delta_line == 0 {
            token.start_column - previous_start
        } else {
            token.start_column
        };
        data.extend_from_slice(&[
            delta_line,
            delta_start,
            token.length,
            token.role.legend_index(),
            0,
        ]);
        previous_line = token.line;
        previous_start = token.start_column;
    }
    data
}

/// Where the expression path `path` (the text between `${` and `}`) points.
///
/// `schema.spec.name` resolves under `spec.schema`. Any other root names a
/// resource by its `id`; the rest of the path is looked up inside that
/// resource, directly or under its `template`, and falls back to the `id`
/// value when the field is not written down (runtime `status` fields).
pub fn find_reference(text: &str, path: &str) -> Option<Position> {
    let source = SourceText::new(text);
    ReferenceFinder {
        source: &source,
        resolver: &IndentationResolver,
    }
    .find(path)
}

struct ReferenceFinder<'a, R> {
    source: &'a SourceText<'a>,
    resolver: &'a R,
}

impl<R: PositionResolver> ReferenceFinder<'_, R> {
    fn find(&self, path: &str) -> Option<Position> {
        let mut segments = path.split('.').map(str::trim);
        let root = segments.next().filter(|root| !root.is_empty())?;
        let rest: Vec<&str> = segments.collect();
        if rest.iter().any(|segment| segment.is_empty()) {
            return None;
        }

        if root == SCHEMA_ROOT {
            return self.resolve(&extend(&LogicalPath::from_dotted("spec.schema"), &rest));
        }

        let (index, id_value) = self.find_resource(root)?;
        if rest.is_empty() {
            return Some(id_value);
        }
        let item = LogicalPath::from_dotted("spec.resources").child(index);
        [item.clone(), item.child("template")]
            .iter()
            .find_map(|base| self.resolve(&extend(base, &rest)))
            .or(Some(id_value))
    }

    /// Index of the resource whose `id` is `id`, and where that value starts.
    fn find_resource(&self, id: &str) -> Option<(usize, Position)> {
        let resources = LogicalPath::from_dotted("spec.resources");
        (0..)
            .map_while(|index| self.resolve(&resources.child(index)).map(|_| index))
            .find_map(|index| {
                let after_key = self.resolve(&resources.child(index).key("id"))?;
                let (start, value) = self.source.value_at(after_key)?;
                (unquote(value) == id).then_some((index, start))
            })
    }

    fn resolve(&self, path: &LogicalPath) -> Option<Position> {
        let position = self.resolver.resolve(self.source, path);
        (position != self.source.end_position()).then_some(position)
    }
}

fn extend(base: &LogicalPath, keys: &[&str]) -> LogicalPath {
    base.segments()
        .iter()
        .cloned()
        .chain(keys.iter().map(|key| PathSegment::from(*key)))
        .collect()
}

fn unquote(value: &str) -> &str {
    ['"', '\'']
        .iter()
        .find_map(|quote| value.strip_prefix(*quote)?.strip_suffix(*quote))
        .unwrap_or(value)
}

/// A navigable `${...}` occurrence.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct DocumentLink {
    /// Covers the whole `${...}` text.
    pub range: Range,
    pub target: Position,
}

impl DocumentLink {
    /// `L<line>,<column>` fragment, one-based, for appending to a document URI.
    pub fn fragment(&self) -> String {
        format!("L{},{}", self.target.line + 1, self.target.character + 1)
    }
}

impl Display for DocumentLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.range.start, self.target)
    }
}

/// Links for every expression whose target can be found.
pub fn document_links(text: &str) -> Vec<DocumentLink> {
    find_expressions(text)
        .into_iter()
        .filter_map(|expression| {
            let target = find_reference(text, &expression.path)?;
            Some(DocumentLink {
                range: Range::new(
                    Position::new(expression.line, expression.start_column),
                    Position::new(expression.line, expression.end_column()),
                ),
                target,
            })
        })
        .collect()
}

/// The expression under `position`, if any, and its target.
pub fn reference_at(text: &str, position: Position) -> Option<Position> {
    find_expressions(text)
        .into_iter()
        .find(|expression| {
            expression.line == position.line
                && (expression.start_column..expression.end_column()).contains(&position.character)
        })
        .and_then(|expression| find_reference(text, &expression.path))
}

use crate::utils::{to_u32, utf16_len, SourceText};
use serde::Serialize;

/// Classification of a piece of a `${...}` expression.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenRole {
    /// The leading `$`.
    Sigil,
    /// The opening `{` or the closing `}`.
    Brace,
    /// First dot-separated segment of the path, e.g. `schema` in `${schema.spec.name}`.
    RootSegment,
    /// Any segment between the first and the last one.
    MiddleSegment,
    /// Last segment of a path with more than one segment.
    LeafSegment,
}

impl TokenRole {
    /// Index of this role in [`crate::lsp::SEMANTIC_TOKEN_LEGEND`].
    pub const fn legend_index(self) -> u32 {
        match self {
            TokenRole::Sigil => 0,
            TokenRole::Brace => 1,
            TokenRole::RootSegment => 2,
            TokenRole::MiddleSegment => 3,
            TokenRole::LeafSegment => 4,
        }
    }
}

/// A highlighted span on one line. Columns are UTF-16 offsets.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionToken {
    pub line: u32,
    pub start_column: u32,
    pub length: u32,
    pub role: TokenRole,
}

impl ExpressionToken {
    pub fn new(line: u32, start_column: u32, length: u32, role: TokenRole) -> Self {
        Self {
            line,
            start_column,
            length,
            role,
        }
    }

    pub fn end_column(&self) -> u32 {
        self.start_column + self.length
    }
}

/// One `${...}` occurrence.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ExpressionMatch {
    pub line: u32,
    /// Column of the `$`.
    pub start_column: u32,
    /// Width of the whole `${...}` text, braces included.
    pub length: u32,
    /// The text between the braces, e.g. `schema.spec.name`.
    pub path: String,
}

impl ExpressionMatch {
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('.')
    }

    pub fn end_column(&self) -> u32 {
        self.start_column + self.length
    }

    /// Sigil, opening brace, one token per path segment, closing brace.
    /// Empty segments (as in `${a..b}`) take no token but still shift the
    /// columns of the ones after them.
    pub fn tokens(&self) -> Vec<ExpressionToken> {
        let segment_count = self.segments().count();
        let mut tokens = Vec::with_capacity(segment_count + 3);
        tokens.push(ExpressionToken::new(self.line, self.start_column, 1, TokenRole::Sigil));
        tokens.push(ExpressionToken::new(self.line, self.start_column + 1, 1, TokenRole::Brace));

        let mut column = self.start_column + 2;
        for (index, segment) in self.segments().enumerate() {
            let role = if index == 0 {
                TokenRole::RootSegment
            } else if index == segment_count - 1 {
                TokenRole::LeafSegment
            } else {
                TokenRole::MiddleSegment
            };
            let width = utf16_len(segment);
            if width > 0 {
                tokens.push(ExpressionToken::new(self.line, column, width, role));
            }
            column += width + 1;
        }

        tokens.push(ExpressionToken::new(
            self.line,
            self.end_column() - 1,
            1,
            TokenRole::Brace,
        ));
        tokens
    }
}

/// Scans one line for `${...}` expressions.
///
/// An expression needs a non-empty body and a closing `}` on the same line;
/// there is no nesting, so `${a${b}` is a single expression with body `a${b`.
pub struct Lexer<'a> {
    input: &'a str,
    line: u32,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(line: u32, input: &'a str) -> Self {
        Self {
            input,
            line,
            position: 0,
        }
    }

    pub fn next_expression(&mut self) -> Option<ExpressionMatch> {
        loop {
            let start = self.position + self.input.get(self.position..)?.find("${")?;
            let body_start = start + 2;
            let Some(body_len) = self.input[body_start..].find('}') else {
                self.position = self.input.len();
                return None;
            };
            if body_len == 0 {
                // `${}` never forms a match; a later `${` still can.
                self.position = start + 1;
                continue;
            }

            let body_end = body_start + body_len;
            self.position = body_end + 1;
            return Some(ExpressionMatch {
                line: self.line,
                start_column: utf16_len(&self.input[..start]),
                length: utf16_len(&self.input[start..self.position]),
                path: self.input[body_start..body_end].to_string(),
            });
        }
    }

    pub fn expressions(&mut self) -> Vec<ExpressionMatch> {
        std::iter::from_fn(|| self.next_expression()).collect()
    }

    pub fn lex(&mut self) -> Vec<ExpressionToken> {
        self.expressions()
            .iter()
            .flat_map(ExpressionMatch::tokens)
            .collect()
    }
}

/// Tokenizes a single line. Tokens report line 0.
pub fn tokenize(line_text: &str) -> Vec<ExpressionToken> {
    Lexer::new(0, line_text).lex()
}

/// Every `${...}` occurrence in a document, in line order.
pub fn find_expressions(text: &str) -> Vec<ExpressionMatch> {
    SourceText::new(text)
        .lines()
        .flat_map(|(index, line)| Lexer::new(to_u32(index), line).expressions())
        .collect()
}

/// Tokens for every line of a document.
pub fn tokenize_document(text: &str) -> Vec<ExpressionToken> {
    find_expressions(text)
        .iter()
        .flat_map(ExpressionMatch::tokens)
        .collect()
}

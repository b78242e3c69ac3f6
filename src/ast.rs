use serde::Serialize;
use std::fmt::Display;

/// A node of the generic document tree.
///
/// Mappings keep the key order of the source text. The tree carries no
/// source positions; those are recovered from the raw text by the resolver.
#[derive(Debug, PartialEq, Clone)]
pub enum Node {
    Mapping(Vec<(String, Node)>),
    Sequence(Vec<Node>),
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
}

impl Node {
    /// Looks up `key` when this node is a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Mapping(entries) => entries
                .iter()
                .find(|(entry_key, _)| entry_key == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Looks up `key` and drops values that count as absent
    /// (`null`, `false`, `0`, empty string).
    #[must_use]
    pub fn get_present(&self, key: &str) -> Option<&Node> {
        self.get(key).filter(|value| value.is_present())
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Node::Mapping(_) | Node::Sequence(_) => true,
            Node::String(s) => !s.is_empty(),
            Node::Number(n) => *n != 0.0 && !n.is_nan(),
            Node::Boolean(b) => *b,
            Node::Null => false,
        }
    }

    /// Text form of a scalar, used when a scalar is compared or quoted in a message.
    #[must_use]
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Node::String(s) => Some(s.clone()),
            Node::Number(n) => Some(n.to_string()),
            Node::Boolean(b) => Some(b.to_string()),
            Node::Null | Node::Mapping(_) | Node::Sequence(_) => None,
        }
    }
}

/// One step of a [`LogicalPath`].
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum PathSegment {
    Key(String),
    /// The i-th element of a sequence (zero-based).
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key}"),
            PathSegment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Ordered key/index segments locating a value inside the document tree.
#[derive(Debug, PartialEq, Eq, Clone, Default, Hash)]
pub struct LogicalPath {
    segments: Vec<PathSegment>,
}

impl LogicalPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a path of plain keys from a dotted string such as `spec.schema.spec`.
    pub fn from_dotted(dotted: &str) -> Self {
        dotted
            .split('.')
            .filter(|part| !part.is_empty())
            .map(PathSegment::from)
            .collect()
    }

    #[must_use]
    pub fn key(mut self, key: &str) -> Self {
        self.segments.push(PathSegment::from(key));
        self
    }

    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    /// Returns a new path with `segment` appended, leaving `self` untouched.
    #[must_use]
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromIterator<PathSegment> for LogicalPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl Display for LogicalPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i > 0 => write!(f, ".{key}")?,
                _ => write!(f, "{segment}")?,
            }
        }
        Ok(())
    }
}

/// Zero-based line and UTF-16 character offset.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }

    /// The same position moved `delta` characters to the right.
    #[must_use]
    pub const fn translate(self, delta: u32) -> Self {
        Self {
            line: self.line,
            character: self.character + delta,
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Hash, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Zero-width range at `position`.
    pub const fn at(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.start.line == self.end.line && self.start.character == self.end.character
    }
}

//! Grammar for the compact schema field types used under `spec.schema`.
//!
//! ```text
//! TypeExpr ::= BaseType { "|" Modifier }
//! BaseType ::= "string" | "integer" | "boolean" | "number"
//!            | "[]" Inner
//!            | "map[" Key "]" Value
//! Modifier ::= "required" | Name "=" Value
//! ```
//!
//! Segments are trimmed; a `|` preceded by a backslash does not split.

use serde::ser::{Serialize, SerializeMap, Serializer};

pub const PRIMITIVE_TYPES: [&str; 4] = ["string", "integer", "boolean", "number"];

pub const KNOWN_MODIFIERS: [&str; 6] = [
    "required",
    "default",
    "description",
    "minimum",
    "maximum",
    "enum",
];

/// Parsed form of a schema field type such as `string | required | default=foo`.
#[derive(Debug, PartialEq, Eq, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeExpression {
    pub base_type: String,
    pub modifiers: Modifiers,
    pub is_valid: bool,
    pub is_required: bool,
}

impl TypeExpression {
    pub fn base_kind(&self) -> BaseTypeKind {
        BaseTypeKind::of(&self.base_type)
    }

    /// Modifier names outside [`KNOWN_MODIFIERS`], in source order.
    pub fn unknown_modifiers(&self) -> impl Iterator<Item = &str> {
        self.modifiers.names().filter(|name| !is_known_modifier(name))
    }
}

/// Modifiers in the order they were first written. A repeated name keeps its
/// first slot and takes the last value.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Modifiers(Vec<(String, String)>);

impl Modifiers {
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.0.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = value.to_string(),
            None => self.0.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Modifiers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BaseTypeKind {
    Primitive,
    /// `[]T`; the element type is not checked.
    Array,
    /// `map[K]V`; key and value types are not checked.
    Map,
    Unknown,
}

impl BaseTypeKind {
    pub fn of(base_type: &str) -> Self {
        if PRIMITIVE_TYPES.contains(&base_type) {
            BaseTypeKind::Primitive
        } else if is_array_type(base_type) {
            BaseTypeKind::Array
        } else if is_map_type(base_type) {
            BaseTypeKind::Map
        } else {
            BaseTypeKind::Unknown
        }
    }
}

pub fn is_known_modifier(name: &str) -> bool {
    KNOWN_MODIFIERS.contains(&name)
}

fn is_array_type(base_type: &str) -> bool {
    base_type.strip_prefix("[]").is_some_and(|inner| !inner.is_empty())
}

// `map[K]V` with non-empty K and V. K may itself contain brackets, so any `]`
// that leaves text on both sides closes the key.
fn is_map_type(base_type: &str) -> bool {
    let Some(rest) = base_type.strip_prefix("map[") else {
        return false;
    };
    rest.char_indices()
        .any(|(i, c)| c == ']' && i > 0 && i + 1 < rest.len())
}

/// Parses a type expression. Never fails: grammar problems are reported
/// through `is_valid`.
///
/// Parsing stops at the first malformed modifier segment, so modifiers
/// written after it are not recorded.
pub fn parse_type_expression(text: &str) -> TypeExpression {
    let mut result = TypeExpression::default();
    if text.trim().is_empty() {
        return result;
    }

    let mut segments = split_segments(text).into_iter();
    result.base_type = segments.next().unwrap_or_default();
    let base_is_valid = BaseTypeKind::of(&result.base_type) != BaseTypeKind::Unknown;

    for segment in segments {
        if segment == "required" {
            result.is_required = true;
            result.modifiers.insert("required", "true");
            continue;
        }
        match parse_named_modifier(&segment) {
            Some((name, value)) => {
                if name == "required" {
                    result.is_required = value == "true";
                }
                result.modifiers.insert(name, value);
            }
            None => return result,
        }
    }

    result.is_valid = base_is_valid;
    result
}

/// `name=value` where `name` is a word and `value` is non-empty.
fn parse_named_modifier(segment: &str) -> Option<(&str, &str)> {
    let (name, value) = segment.split_once('=')?;
    let name = name.trim_end();
    let value = value.trim_start();
    let is_word = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    (is_word && !value.is_empty()).then_some((name, value))
}

fn split_segments(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => segments.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    segments.push(current.trim().to_string());
    segments
}

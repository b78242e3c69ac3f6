use crate::ast::{Node, Position};
use crate::error::{KroError, ParserError};
use crate::utils::offset_at;
use miette::{NamedSource, SourceSpan};
use serde_yaml::Value;

/// Turns YAML text into the position-free [`Node`] tree the validator walks.
#[derive(Debug)]
pub struct Parser<'a> {
    source_text: &'a str,
    name: String,
}

impl<'a> Parser<'a> {
    pub fn new(source_text: &'a str) -> Self {
        Self::new_with_name(source_text, "document.yaml".to_string())
    }

    pub fn new_with_name(source_text: &'a str, name: String) -> Self {
        Self { source_text, name }
    }

    /// Parses the whole text as a single YAML document.
    ///
    /// # Errors
    /// Returns `ParserError::InvalidYaml` when the text is not well-formed YAML
    /// or holds more than one document.
    pub fn parse_document(&self) -> Result<Node, KroError> {
        let value: Value = serde_yaml::from_str(self.source_text).map_err(|err| self.error(&err))?;
        Ok(to_node(value))
    }

    fn error(&self, err: &serde_yaml::Error) -> ParserError {
        let position = err.location().map(|location| {
            Position::new(
                u32::try_from(location.line().saturating_sub(1)).unwrap_or(u32::MAX),
                u32::try_from(location.column().saturating_sub(1)).unwrap_or(u32::MAX),
            )
        });
        let offset = position.map_or(0, |p| offset_at(self.source_text, p));
        let width = self.source_text[offset..]
            .chars()
            .next()
            .map_or(0, char::len_utf8);

        ParserError::InvalidYaml {
            message: err.to_string(),
            position,
            src: NamedSource::new(self.name.clone(), self.source_text.to_string()),
            span: SourceSpan::new(offset.into(), width),
        }
    }
}

fn to_node(value: Value) -> Node {
    match value {
        Value::Null => Node::Null,
        Value::Bool(b) => Node::Boolean(b),
        Value::Number(n) => Node::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => Node::String(s),
        Value::Sequence(items) => Node::Sequence(items.into_iter().map(to_node).collect()),
        Value::Mapping(mapping) => Node::Mapping(
            mapping
                .into_iter()
                .filter_map(|(key, value)| Some((key_text(key)?, to_node(value))))
                .collect(),
        ),
        Value::Tagged(tagged) => to_node(tagged.value),
    }
}

// Collection keys have no place in the documents this crate validates; they are dropped.
fn key_text(key: Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Tagged(tagged) => key_text(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Parses `source_text` with a default document name.
///
/// # Errors
/// See [`Parser::parse_document`].
pub fn parse_document(source_text: &str) -> Result<Node, KroError> {
    Parser::new(source_text).parse_document()
}

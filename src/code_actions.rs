//! Quick fixes for header diagnostics.
//!
//! Fixes are offered only for diagnostics stamped with the configured source
//! tag; anything else is left to whoever produced it.

use crate::ast::{Position, Range};
use crate::config::ValidatorConfig;
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::utils::{offset_at, SourceText};
use serde::Serialize;

#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

impl TextEdit {
    pub fn insert(at: Position, new_text: impl Into<String>) -> Self {
        Self {
            range: Range::at(at),
            new_text: new_text.into(),
        }
    }

    pub fn replace(range: Range, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct CodeAction {
    pub title: String,
    /// The diagnostic this action resolves.
    pub diagnostic: Diagnostic,
    pub edits: Vec<TextEdit>,
}

/// One action per fixable diagnostic, in diagnostic order.
pub fn quick_fixes(
    text: &str,
    diagnostics: &[Diagnostic],
    config: &ValidatorConfig,
) -> Vec<CodeAction> {
    let source = SourceText::new(text);
    diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.source == config.source)
        .filter_map(|diagnostic| fix_for(&source, diagnostic, config))
        .collect()
}

fn fix_for(
    source: &SourceText<'_>,
    diagnostic: &Diagnostic,
    config: &ValidatorConfig,
) -> Option<CodeAction> {
    let api_version_line = format!("apiVersion: {}", config.api_version);
    let kind_line = format!("kind: {}", config.kind);

    let (title, edit) = match diagnostic.code {
        DiagnosticCode::EmptyDocument => (
            "Add schema template",
            TextEdit::insert(Position::default(), config.header_template()),
        ),
        DiagnosticCode::InvalidApiVersion => (
            "Add correct apiVersion",
            TextEdit::replace(line_range(source, 0), api_version_line),
        ),
        DiagnosticCode::MissingApiVersion => (
            "Add correct apiVersion",
            TextEdit::insert(Position::default(), format!("{api_version_line}\n")),
        ),
        DiagnosticCode::InvalidKind => (
            "Add correct kind",
            TextEdit::replace(line_range(source, 1), kind_line),
        ),
        // A lone header line may lack a trailing newline, so the new line is
        // opened from the end of line 0 instead of inserted at line 1.
        DiagnosticCode::MissingKind if source.line_count() < 2 => (
            "Add correct kind",
            TextEdit::insert(source.line_end(0), format!("\n{kind_line}")),
        ),
        DiagnosticCode::MissingKind => (
            "Add correct kind",
            TextEdit::insert(Position::new(1, 0), format!("{kind_line}\n")),
        ),
        _ => return None,
    };

    log::trace!("offering `{title}` for {}", diagnostic.code);
    Some(CodeAction {
        title: title.to_string(),
        diagnostic: diagnostic.clone(),
        edits: vec![edit],
    })
}

fn line_range(source: &SourceText<'_>, line: u32) -> Range {
    Range::new(Position::new(line, 0), source.line_end(line as usize))
}

/// Applies non-overlapping `edits` to `text`.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.range.start.cmp(&a.range.start));

    let mut result = text.to_string();
    for edit in ordered {
        let start = offset_at(text, edit.range.start);
        let end = offset_at(text, edit.range.end).max(start);
        result.replace_range(start..end, &edit.new_text);
    }
    result
}

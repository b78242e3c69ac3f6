use crate::ast::Range;
use crate::utils::offset_at;
use miette::{LabeledSpan, NamedSource, Report, SourceCode, SourceSpan};
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        };
        write!(f, "{name}")
    }
}

/// Stable identity of each rule the validator can fire.
///
/// Serializes as its [`as_str`](Self::as_str) form, the same code `miette`
/// reports carry.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum DiagnosticCode {
    EmptyDocument,
    MissingApiVersion,
    InvalidApiVersion,
    MissingKind,
    InvalidKind,
    MissingMetadata,
    MissingMetadataName,
    MissingSpec,
    InvalidTypeDefinition,
    InvalidBaseType,
    UnknownModifier,
    InvalidResources,
    MissingResourceId,
    DuplicateResourceId,
    MissingResourceType,
    InvalidResourceProperties,
}

impl DiagnosticCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyDocument => "kro::empty_document",
            Self::MissingApiVersion => "kro::missing_api_version",
            Self::InvalidApiVersion => "kro::invalid_api_version",
            Self::MissingKind => "kro::missing_kind",
            Self::InvalidKind => "kro::invalid_kind",
            Self::MissingMetadata => "kro::missing_metadata",
            Self::MissingMetadataName => "kro::missing_metadata_name",
            Self::MissingSpec => "kro::missing_spec",
            Self::InvalidTypeDefinition => "kro::invalid_type_definition",
            Self::InvalidBaseType => "kro::invalid_base_type",
            Self::UnknownModifier => "kro::unknown_modifier",
            Self::InvalidResources => "kro::invalid_resources",
            Self::MissingResourceId => "kro::missing_resource_id",
            Self::DuplicateResourceId => "kro::duplicate_resource_id",
            Self::MissingResourceType => "kro::missing_resource_type",
            Self::InvalidResourceProperties => "kro::invalid_resource_properties",
        }
    }

    /// Header rules short-circuit all deeper checks when they fire.
    pub const fn is_header(self) -> bool {
        matches!(
            self,
            Self::EmptyDocument
                | Self::MissingApiVersion
                | Self::InvalidApiVersion
                | Self::MissingKind
                | Self::InvalidKind
        )
    }
}

impl Serialize for DiagnosticCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single finding of a validation pass.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub message: String,
    pub range: Range,
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub source: String,
}

impl Diagnostic {
    pub fn error(
        code: DiagnosticCode,
        message: impl Into<String>,
        range: Range,
        source: &str,
    ) -> Self {
        Self::new(Severity::Error, code, message, range, source)
    }

    pub fn warning(
        code: DiagnosticCode,
        message: impl Into<String>,
        range: Range,
        source: &str,
    ) -> Self {
        Self::new(Severity::Warning, code, message, range, source)
    }

    pub fn new(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        range: Range,
        source: &str,
    ) -> Self {
        Self {
            message: message.into(),
            range,
            severity,
            code,
            source: source.to_string(),
        }
    }

    /// Renders this diagnostic against the document it was produced for.
    pub fn to_report(&self, file_name: &str, text: &str) -> Report {
        Report::new(DiagnosticReport::new(self, file_name, text))
    }
}

/// `miette` view of a [`Diagnostic`], with its range mapped to a byte span.
#[derive(Debug)]
pub struct DiagnosticReport {
    message: String,
    code: DiagnosticCode,
    severity: Severity,
    src: NamedSource<String>,
    span: SourceSpan,
}

impl DiagnosticReport {
    pub fn new(diagnostic: &Diagnostic, file_name: &str, text: &str) -> Self {
        let start = offset_at(text, diagnostic.range.start);
        let end = offset_at(text, diagnostic.range.end).max(start);
        Self {
            message: diagnostic.message.clone(),
            code: diagnostic.code,
            severity: diagnostic.severity,
            src: NamedSource::new(file_name, text.to_string()),
            span: SourceSpan::new(start.into(), end - start),
        }
    }

    pub fn span(&self) -> SourceSpan {
        self.span
    }
}

impl Display for DiagnosticReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DiagnosticReport {}

impl miette::Diagnostic for DiagnosticReport {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
            Severity::Info | Severity::Hint => miette::Severity::Advice,
        })
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(self.severity.to_string()),
            self.span,
        ))))
    }
}

use crate::ast::{Node, Position};
use crate::code_actions::{quick_fixes, CodeAction};
use crate::config::ValidatorConfig;
use crate::diagnostic::{Diagnostic, Severity};
use crate::error::KroError;
use crate::lexer::ExpressionToken;
use crate::lsp::{self, DocumentLink};
use crate::parser::Parser;
use crate::utils::SourceText;
use crate::validator::Validator;
use miette::Report;
use serde::{Serialize, Serializer};

/// The outcome of one validation pass over a document.
///
/// Besides the diagnostics it keeps the parsed tree and the text, so editor
/// queries (links, tokens, go to definition) can be answered from it.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub diagnostics: Vec<Diagnostic>,
    pub root: Node,
    source: String,
    file_name: String,
    config: ValidatorConfig,
}

impl Serialize for AnalysisResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.root.serialize(serializer)
    }
}

impl AnalysisResult {
    /// Serializes the parsed document into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self)
    }

    /// Serializes the parsed document into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self)
    }

    /// Serializes the diagnostics into a pretty-printed JSON array.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn diagnostics_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.diagnostics)
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Target of the `${...}` expression under `position`.
    /// This is the core of "go to definition".
    #[must_use]
    pub fn definition_at(&self, position: Position) -> Option<Position> {
        lsp::reference_at(&self.source, position)
    }

    pub fn semantic_tokens(&self) -> Vec<ExpressionToken> {
        lsp::semantic_tokens(&self.source)
    }

    pub fn document_links(&self) -> Vec<DocumentLink> {
        lsp::document_links(&self.source)
    }

    pub fn quick_fixes(&self) -> Vec<CodeAction> {
        quick_fixes(&self.source, &self.diagnostics, &self.config)
    }

    /// One renderable `miette` report per diagnostic.
    pub fn reports(&self) -> Vec<Report> {
        self.diagnostics
            .iter()
            .map(|diagnostic| diagnostic.to_report(&self.file_name, &self.source))
            .collect()
    }
}

/// Parses and validates a ResourceGraphDefinition with the default settings.
///
/// This is the primary entry point. Structural problems come back as
/// diagnostics in the `AnalysisResult`; only text that is not YAML at all is
/// an error.
///
/// # Errors
///
/// Returns `KroError::Parser` if `source` is not well-formed YAML.
pub fn analyze(source: &str, file_name: &str) -> Result<AnalysisResult, KroError> {
    analyze_with_config(source, file_name, &ValidatorConfig::default())
}

/// Like [`analyze`], with explicit settings.
///
/// # Errors
///
/// Returns `KroError::Parser` if `source` is not well-formed YAML.
pub fn analyze_with_config(
    source: &str,
    file_name: &str,
    config: &ValidatorConfig,
) -> Result<AnalysisResult, KroError> {
    // An empty document is a validation finding, not a parse failure.
    let root = if SourceText::new(source).is_empty() {
        Node::Null
    } else {
        Parser::new_with_name(source, file_name.to_string()).parse_document()?
    };

    let diagnostics = Validator::with_config(config.clone()).validate(&root, source);
    log::debug!("analyzed {file_name}: {} diagnostic(s)", diagnostics.len());

    Ok(AnalysisResult {
        diagnostics,
        root,
        source: source.to_string(),
        file_name: file_name.to_string(),
        config: config.clone(),
    })
}

use crate::ast::Position;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum KroError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParserError {
    #[error("Invalid YAML: {message}")]
    #[diagnostic(
        code(parser::invalid_yaml),
        help("The document is not well-formed YAML, so no structural validation was run.")
    )]
    InvalidYaml {
        message: String,
        /// Where the YAML parser stopped, when it reported a location.
        position: Option<Position>,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
    },
}

#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Could not read validator configuration from {path}")]
    #[diagnostic(code(config::io), help("Check that the file exists and is readable."))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid validator configuration: {message}")]
    #[diagnostic(
        code(config::invalid),
        help("Expected a YAML mapping with optional apiVersion, kind, source and debounceMs keys.")
    )]
    Invalid { message: String },
}

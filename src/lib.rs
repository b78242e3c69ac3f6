pub mod api;
pub mod ast;
pub mod code_actions;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod host;
pub mod lexer;
pub mod lsp;
pub mod parser;
pub mod resolver;
pub mod type_expr;
pub mod utils;
pub mod validator;
mod serialization;

pub use api::{analyze, analyze_with_config, AnalysisResult};
pub use ast::{LogicalPath, Node, PathSegment, Position, Range};
pub use config::ValidatorConfig;
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use error::KroError;
pub use lexer::{tokenize, ExpressionToken, TokenRole};
pub use resolver::{resolve, resolve_list_item, IndentationResolver, PositionResolver};
pub use type_expr::{parse_type_expression, TypeExpression};
pub use validator::{validate, Validator};

use crate::ast::{LogicalPath, Node, Position, Range};
use crate::config::ValidatorConfig;
use crate::diagnostic::{Diagnostic, DiagnosticCode, Severity};
use crate::resolver::{IndentationResolver, PositionResolver};
use crate::type_expr::{parse_type_expression, BaseTypeKind, KNOWN_MODIFIERS, PRIMITIVE_TYPES};
use crate::utils::{to_u32, utf16_len, SourceText};
use std::collections::HashSet;

/// Structural validator for ResourceGraphDefinition documents.
///
/// Rules run top-down: header, metadata, spec, schema fields, resources. A
/// broken header stops the pass so its errors do not cascade.
#[derive(Debug, Clone, Default)]
pub struct Validator<R = IndentationResolver> {
    config: ValidatorConfig,
    resolver: R,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self::with_resolver(config, IndentationResolver)
    }
}

impl<R: PositionResolver> Validator<R> {
    pub fn with_resolver(config: ValidatorConfig, resolver: R) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Runs every rule against `tree`, using `text` only to place diagnostics.
    /// Neither input is modified; each call returns a fresh list.
    pub fn validate(&self, tree: &Node, text: &str) -> Vec<Diagnostic> {
        let mut pass = ValidationPass {
            config: &self.config,
            resolver: &self.resolver,
            source: SourceText::new(text),
            diagnostics: Vec::new(),
        };
        pass.run(tree);
        log::debug!(
            "validation finished with {} diagnostic(s) over {} line(s)",
            pass.diagnostics.len(),
            pass.source.line_count()
        );
        pass.diagnostics
    }
}

/// Validates with the default configuration and the indentation resolver.
pub fn validate(tree: &Node, text: &str) -> Vec<Diagnostic> {
    Validator::new().validate(tree, text)
}

struct ValidationPass<'a, R> {
    config: &'a ValidatorConfig,
    resolver: &'a R,
    source: SourceText<'a>,
    diagnostics: Vec<Diagnostic>,
}

impl<R: PositionResolver> ValidationPass<'_, R> {
    fn run(&mut self, tree: &Node) {
        if self.source.is_empty() {
            let message = format!(
                "Empty document. Expected 'apiVersion: {}' on the first line and 'kind: {}' on the second line.",
                self.config.api_version, self.config.kind
            );
            self.push(Severity::Error, DiagnosticCode::EmptyDocument, message, Range::default());
            return;
        }

        if !self.validate_header(tree) {
            return;
        }
        self.validate_metadata(tree);
        self.validate_spec(tree);
    }

    /// Returns `false` when any header rule fired.
    fn validate_header(&mut self, tree: &Node) -> bool {
        let api_version = self.config.api_version.clone();
        let kind = self.config.kind.clone();

        if !self.line_starts_with(0, "apiVersion:") {
            self.push(
                Severity::Error,
                DiagnosticCode::MissingApiVersion,
                format!("First line must be 'apiVersion: {api_version}'."),
                self.line_range(0),
            );
            return false;
        }
        if !scalar_equals(tree.get("apiVersion"), &api_version) {
            self.push(
                Severity::Error,
                DiagnosticCode::InvalidApiVersion,
                format!("Invalid apiVersion. Expected '{api_version}'."),
                self.line_range(0),
            );
        }

        if self.source.line_count() < 2 {
            self.push(
                Severity::Error,
                DiagnosticCode::MissingKind,
                format!("Missing kind. Expected 'kind: {kind}' on the second line."),
                Range::at(self.source.line_end(0)),
            );
            return false;
        }
        if !self.line_starts_with(1, "kind:") {
            self.push(
                Severity::Error,
                DiagnosticCode::MissingKind,
                format!("Second line must be 'kind: {kind}'."),
                self.line_range(1),
            );
            return false;
        }
        if !scalar_equals(tree.get("kind"), &kind) {
            self.push(
                Severity::Error,
                DiagnosticCode::InvalidKind,
                format!("Invalid kind. Expected '{kind}'."),
                self.line_range(1),
            );
        }

        self.diagnostics.is_empty()
    }

    fn validate_metadata(&mut self, tree: &Node) {
        let Some(metadata) = tree.get_present("metadata") else {
            let at = self.resolver.position_after_key(&self.source, "kind");
            let message = format!(
                "Missing 'metadata' section. {} must have a metadata section with a name.",
                self.config.kind
            );
            self.push(Severity::Error, DiagnosticCode::MissingMetadata, message, Range::at(at));
            return;
        };

        if metadata.get_present("name").is_none() {
            let at = self.resolver.position_after_key(&self.source, "metadata");
            let message = format!(
                "Missing 'name' in metadata. {} must have a name defined in metadata.",
                self.config.kind
            );
            self.push(Severity::Error, DiagnosticCode::MissingMetadataName, message, Range::at(at));
        }
    }

    fn validate_spec(&mut self, tree: &Node) {
        let Some(spec) = tree.get_present("spec") else {
            let at = self.resolver.position_after_key(&self.source, "metadata");
            let message = format!(
                "Missing 'spec' section. {} must have a spec section.",
                self.config.kind
            );
            self.push(Severity::Error, DiagnosticCode::MissingSpec, message, Range::at(at));
            return;
        };

        if let Some(schema) = spec.get_present("schema") {
            let schema_path = LogicalPath::from_dotted("spec.schema");
            for section in ["spec", "status"] {
                if let Some(fields) = schema.get_present(section) {
                    self.validate_schema_fields(fields, &schema_path.child(section));
                }
            }
        }

        if let Some(resources) = spec.get_present("resources") {
            self.validate_resources(resources);
        }
    }

    fn validate_schema_fields(&mut self, fields: &Node, path: &LogicalPath) {
        let Node::Mapping(entries) = fields else {
            return;
        };
        for (name, value) in entries {
            let field_path = path.child(name.as_str());
            match value {
                Node::String(type_text) => self.validate_field_type(name, type_text, &field_path),
                Node::Mapping(_) => self.validate_schema_fields(value, &field_path),
                // Only type strings and nested field groups carry type information.
                Node::Sequence(_) | Node::Number(_) | Node::Boolean(_) | Node::Null => {}
            }
        }
    }

    fn validate_field_type(&mut self, name: &str, type_text: &str, path: &LogicalPath) {
        let parsed = parse_type_expression(type_text);

        if !parsed.is_valid {
            self.push(
                Severity::Error,
                DiagnosticCode::InvalidTypeDefinition,
                format!(
                    "Invalid type definition for field '{name}': {type_text}. Expected a valid type pattern."
                ),
                self.value_range(path, type_text),
            );
            return;
        }

        if parsed.base_kind() == BaseTypeKind::Unknown {
            self.push(
                Severity::Error,
                DiagnosticCode::InvalidBaseType,
                format!(
                    "Invalid base type '{}' for field '{name}'. Expected one of: {}, array ([]), or map.",
                    parsed.base_type,
                    PRIMITIVE_TYPES.join(", ")
                ),
                self.value_range(path, type_text),
            );
        }

        for modifier in parsed.unknown_modifiers() {
            self.push(
                Severity::Warning,
                DiagnosticCode::UnknownModifier,
                format!(
                    "Unknown modifier '{modifier}' for field '{name}'. Valid modifiers are: {}.",
                    KNOWN_MODIFIERS.join(", ")
                ),
                self.value_range(path, type_text),
            );
        }
    }

    fn validate_resources(&mut self, resources: &Node) {
        let Node::Sequence(items) = resources else {
            let at = self.resolver.position_after_key(&self.source, "resources");
            self.push(
                Severity::Error,
                DiagnosticCode::InvalidResources,
                "Invalid 'resources' section. Expected an array of resources.",
                Range::at(at),
            );
            return;
        };

        let resources_path = LogicalPath::from_dotted("spec.resources");
        let mut seen_ids = HashSet::new();

        for (index, resource) in items.iter().enumerate() {
            let item_path = resources_path.child(index);
            let id = resource.get_present("id").and_then(Node::scalar_text);

            match &id {
                None => {
                    let at = self.resolver.resolve(&self.source, &item_path);
                    self.push(
                        Severity::Error,
                        DiagnosticCode::MissingResourceId,
                        format!(
                            "Missing 'id' in resource at index {index}. Each resource must have an ID."
                        ),
                        Range::at(at),
                    );
                }
                Some(id) if !seen_ids.insert(id.clone()) => {
                    self.push(
                        Severity::Error,
                        DiagnosticCode::DuplicateResourceId,
                        format!("Duplicate resource ID '{id}'. Resource IDs must be unique."),
                        self.value_range(&item_path.child("id"), id),
                    );
                }
                Some(_) => {}
            }

            let label = id
                .as_deref()
                .map_or_else(|| format!("at index {index}"), |id| format!("'{id}'"));

            if resource.get_present("type").is_none() {
                let at = self.resolver.resolve(&self.source, &item_path);
                self.push(
                    Severity::Error,
                    DiagnosticCode::MissingResourceType,
                    format!("Missing 'type' in resource {label}. Each resource must have a type."),
                    Range::at(at),
                );
            }

            match resource.get_present("properties") {
                None | Some(Node::Mapping(_)) => {}
                Some(_) => {
                    let at = self.resolver.resolve(&self.source, &item_path.child("properties"));
                    self.push(
                        Severity::Error,
                        DiagnosticCode::InvalidResourceProperties,
                        format!(
                            "Invalid 'properties' in resource {label}. Properties must be an object."
                        ),
                        Range::at(at),
                    );
                }
            }
        }
    }

    fn push(
        &mut self,
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        range: Range,
    ) {
        self.diagnostics
            .push(Diagnostic::new(severity, code, message, range, &self.config.source));
    }

    fn line_starts_with(&self, line: usize, prefix: &str) -> bool {
        self.source
            .line(line)
            .is_some_and(|text| text.trim().starts_with(prefix))
    }

    fn line_range(&self, line: usize) -> Range {
        Range::new(Position::new(to_u32(line), 0), self.source.line_end(line))
    }

    /// Span of the text written after the separator `path` resolves to,
    /// quotes included. `value` sizes the span when that text is not found.
    fn value_range(&self, path: &LogicalPath, value: &str) -> Range {
        let after_separator = self.resolver.resolve(&self.source, path);
        let (start, raw) = self
            .source
            .value_at(after_separator)
            .unwrap_or((after_separator, value));
        Range::new(start, start.translate(utf16_len(raw)))
    }
}

fn scalar_equals(node: Option<&Node>, expected: &str) -> bool {
    node.and_then(Node::scalar_text).is_some_and(|text| text == expected)
}

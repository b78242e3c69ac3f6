use kro_core::parser::parse_document;
use kro_core::utils::SourceText;
use kro_core::{
    validate, Diagnostic, DiagnosticCode, LogicalPath, Node, Position, PositionResolver, Range,
    Severity, Validator, ValidatorConfig,
};

fn run(text: &str) -> Vec<Diagnostic> {
    let tree = parse_document(text).unwrap();
    validate(&tree, text)
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<DiagnosticCode> {
    diagnostics.iter().map(|d| d.code).collect()
}

const VALID: &str = r#"apiVersion: kro.run/v1alpha1
kind: ResourceGraphDefinition
metadata:
  name: web-app
spec:
  schema:
    apiVersion: v1alpha1
    kind: WebApp
    spec:
      name: string | required
      replicas: integer | default=3 | minimum=1
      labels: map[string]string
      ports: "[]integer"
      ingress:
        enabled: boolean | default=false
    status:
      availableReplicas: integer
  resources:
    - id: deployment
      type: apps/v1
      properties:
        replicas: ${schema.spec.replicas}
    - id: service
      type: v1
"#;

#[test]
fn test_valid_document_has_no_diagnostics() {
    assert_eq!(run(VALID), Vec::new());
}

#[test]
fn test_validate_is_repeatable() {
    assert_eq!(run(VALID), run(VALID));
}

#[test]
fn test_empty_document() {
    let diagnostics = validate(&Node::Null, "");
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.code, DiagnosticCode::EmptyDocument);
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.range, Range::default());
    assert!(diagnostic.message.contains("apiVersion: kro.run/v1alpha1"));
    assert!(diagnostic.message.contains("kind: ResourceGraphDefinition"));
    assert_eq!(diagnostic.source, "kro-schema-validation");
}

#[test]
fn test_missing_kind_on_single_line_document() {
    let diagnostics = run("apiVersion: kro.run/v1alpha1");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::MissingKind);
    assert_eq!(diagnostics[0].range, Range::at(Position::new(0, 28)));
    assert_eq!(
        diagnostics[0].message,
        "Missing kind. Expected 'kind: ResourceGraphDefinition' on the second line."
    );
}

#[test]
fn test_second_line_must_be_kind() {
    let diagnostics = run("apiVersion: kro.run/v1alpha1\nmetadata:\n  name: x\n");
    assert_eq!(codes(&diagnostics), vec![DiagnosticCode::MissingKind]);
    assert_eq!(
        diagnostics[0].range,
        Range::new(Position::new(1, 0), Position::new(1, 9))
    );
}

#[test]
fn test_correct_header_and_metadata_raise_nothing_above_spec() {
    let text = "apiVersion: kro.run/v1alpha1\nkind: ResourceGraphDefinition\nmetadata:\n  name: demo\n";
    let diagnostics = run(text);
    assert!(diagnostics.iter().all(|d| !d.code.is_header()));
    assert_eq!(codes(&diagnostics), vec![DiagnosticCode::MissingSpec]);
    assert_eq!(diagnostics[0].range, Range::at(Position::new(3, 0)));
}

#[test]
fn test_missing_metadata() {
    let text = "apiVersion: kro.run/v1alpha1\nkind: ResourceGraphDefinition\nspec:\n  resources: []\n";
    let diagnostics = run(text);
    assert_eq!(codes(&diagnostics), vec![DiagnosticCode::MissingMetadata]);
    assert_eq!(diagnostics[0].range, Range::at(Position::new(2, 0)));
}

#[test]
fn test_missing_metadata_name() {
    let text = "\
apiVersion: kro.run/v1alpha1
kind: ResourceGraphDefinition
metadata:
  labels:
    team: platform
spec:
  resources: []
";
    let diagnostics = run(text);
    assert_eq!(codes(&diagnostics), vec![DiagnosticCode::MissingMetadataName]);
    assert_eq!(diagnostics[0].range, Range::at(Position::new(3, 0)));
}

#[test]
fn test_duplicate_resource_id_points_at_second_occurrence() {
    let text = "\
apiVersion: kro.run/v1alpha1
kind: ResourceGraphDefinition
metadata:
  name: dup
spec:
  resources:
    - id: a
      type: v1
    - id: a
      type: v1
";
    let diagnostics = run(text);
    assert_eq!(codes(&diagnostics), vec![DiagnosticCode::DuplicateResourceId]);
    assert_eq!(
        diagnostics[0].range,
        Range::new(Position::new(8, 10), Position::new(8, 11))
    );
    assert_eq!(
        diagnostics[0].message,
        "Duplicate resource ID 'a'. Resource IDs must be unique."
    );
}

#[test]
fn test_missing_resource_id_and_type() {
    let text = "\
apiVersion: kro.run/v1alpha1
kind: ResourceGraphDefinition
metadata:
  name: partial
spec:
  resources:
    - type: v1
    - id: b
";
    let diagnostics = run(text);
    assert_eq!(
        codes(&diagnostics),
        vec![DiagnosticCode::MissingResourceId, DiagnosticCode::MissingResourceType]
    );
    assert_eq!(diagnostics[0].range, Range::at(Position::new(6, 4)));
    assert_eq!(
        diagnostics[0].message,
        "Missing 'id' in resource at index 0. Each resource must have an ID."
    );
    assert_eq!(diagnostics[1].range, Range::at(Position::new(7, 4)));
    assert_eq!(
        diagnostics[1].message,
        "Missing 'type' in resource 'b'. Each resource must have a type."
    );
}

#[test]
fn test_schema_group_named_resources_does_not_hide_resource_items() {
    let text = "\
apiVersion: kro.run/v1alpha1
kind: ResourceGraphDefinition
metadata:
  name: sized
spec:
  schema:
    spec:
      resources:
        cpu: string
  resources:
    - type: v1
    - id: deployment
";
    let diagnostics = run(text);
    assert_eq!(
        codes(&diagnostics),
        vec![DiagnosticCode::MissingResourceId, DiagnosticCode::MissingResourceType]
    );
    assert_eq!(diagnostics[0].range, Range::at(Position::new(10, 4)));
    assert_eq!(diagnostics[1].range, Range::at(Position::new(11, 4)));
}

#[test]
fn test_resources_must_be_a_sequence() {
    let text = "\
apiVersion: kro.run/v1alpha1
kind: ResourceGraphDefinition
metadata:
  name: web
spec:
  resources: web
";
    let diagnostics = run(text);
    assert_eq!(codes(&diagnostics), vec![DiagnosticCode::InvalidResources]);
    assert_eq!(diagnostics[0].range, Range::at(Position::new(6, 0)));
}

#[test]
fn test_properties_must_be_a_mapping() {
    let text = "\
apiVersion: kro.run/v1alpha1
kind: ResourceGraphDefinition
metadata:
  name: web
spec:
  resources:
    - id: a
      type: v1
      properties: [1, 2]
";
    let diagnostics = run(text);
    assert_eq!(codes(&diagnostics), vec![DiagnosticCode::InvalidResourceProperties]);
    assert_eq!(diagnostics[0].range, Range::at(Position::new(8, 17)));
    assert!(diagnostics[0].message.contains("resource 'a'"));
}

#[test]
fn test_nested_schema_fields_are_checked() {
    let text = "\
apiVersion: kro.run/v1alpha1
kind: ResourceGraphDefinition
metadata:
  name: web
spec:
  schema:
    spec:
      ingress:
        host: string | =x
    status:
      ready: boolean | flag
";
    let diagnostics = run(text);
    assert_eq!(
        codes(&diagnostics),
        vec![DiagnosticCode::InvalidTypeDefinition, DiagnosticCode::InvalidTypeDefinition]
    );
    assert_eq!(
        diagnostics[0].message,
        "Invalid type definition for field 'host': string | =x. Expected a valid type pattern."
    );
    assert_eq!(
        diagnostics[0].range,
        Range::new(Position::new(8, 14), Position::new(8, 25))
    );
    assert_eq!(
        diagnostics[1].range,
        Range::new(Position::new(10, 13), Position::new(10, 27))
    );
}

#[test]
fn test_sibling_field_is_not_confused_with_nested_namesake() {
    let text = "\
apiVersion: kro.run/v1alpha1
kind: ResourceGraphDefinition
metadata:
  name: web
spec:
  schema:
    spec:
      ingress:
        host: string
      host: strin | bad
";
    let diagnostics = run(text);
    assert_eq!(codes(&diagnostics), vec![DiagnosticCode::InvalidTypeDefinition]);
    assert_eq!(
        diagnostics[0].range,
        Range::new(Position::new(9, 12), Position::new(9, 23))
    );
}

#[test]
fn test_quoted_type_span_covers_the_quotes() {
    let text = "\
apiVersion: kro.run/v1alpha1
kind: ResourceGraphDefinition
metadata:
  name: web
spec:
  schema:
    spec:
      q: \"strin | default=x\"
";
    let diagnostics = run(text);
    assert_eq!(codes(&diagnostics), vec![DiagnosticCode::InvalidTypeDefinition]);
    assert_eq!(
        diagnostics[0].range,
        Range::new(Position::new(7, 9), Position::new(7, 28))
    );
}

#[test]
fn test_unknown_modifiers_are_reported_in_source_order() {
    let text = "\
apiVersion: kro.run/v1alpha1
kind: ResourceGraphDefinition
metadata:
  name: web
spec:
  schema:
    spec:
      name: string | zeta=1 | alpha=2
";
    let diagnostics = run(text);
    assert_eq!(
        codes(&diagnostics),
        vec![DiagnosticCode::UnknownModifier, DiagnosticCode::UnknownModifier]
    );
    assert!(diagnostics[0].message.starts_with("Unknown modifier 'zeta'"));
    assert!(diagnostics[1].message.starts_with("Unknown modifier 'alpha'"));
}

#[test]
fn test_unknown_modifier_is_a_single_warning() {
    let text = "\
apiVersion: kro.run/v1alpha1
kind: ResourceGraphDefinition
metadata:
  name: web
spec:
  schema:
    spec:
      name: string | foo=bar
";
    let diagnostics = run(text);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::UnknownModifier);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert!(diagnostics[0].message.starts_with("Unknown modifier 'foo' for field 'name'."));
}

#[test]
fn test_configured_header_literals() {
    let config = ValidatorConfig {
        api_version: "example.dev/v1".to_string(),
        kind: "Blueprint".to_string(),
        ..ValidatorConfig::default()
    };
    let text = "apiVersion: example.dev/v1\nkind: Blueprint\nmetadata:\n  name: a\nspec:\n  resources: []\n";
    let tree = parse_document(text).unwrap();
    assert!(Validator::with_config(config.clone()).validate(&tree, text).is_empty());

    let diagnostics = validate(&tree, text);
    assert_eq!(
        codes(&diagnostics),
        vec![DiagnosticCode::InvalidApiVersion, DiagnosticCode::InvalidKind]
    );
}

/// Places everything at one spot, standing in for a position-aware parser.
struct FixedResolver(Position);

impl PositionResolver for FixedResolver {
    fn resolve(&self, _: &SourceText<'_>, _: &LogicalPath) -> Position {
        self.0
    }

    fn resolve_list_item(&self, _: &SourceText<'_>, _: &str, _: usize) -> Position {
        self.0
    }

    fn position_after_key(&self, _: &SourceText<'_>, _: &str) -> Position {
        self.0
    }
}

#[test]
fn test_resolver_can_be_replaced() {
    let text = "apiVersion: kro.run/v1alpha1\nkind: ResourceGraphDefinition\nspec: {}\n";
    let tree = parse_document(text).unwrap();
    let resolver = FixedResolver(Position::new(42, 7));
    let validator = Validator::with_resolver(ValidatorConfig::default(), resolver);
    let diagnostics = validator.validate(&tree, text);
    assert_eq!(codes(&diagnostics), vec![DiagnosticCode::MissingMetadata]);
    assert_eq!(diagnostics[0].range, Range::at(Position::new(42, 7)));
}

use kro_core::resolver::{list_items, position_after_key};
use kro_core::utils::SourceText;
use kro_core::{resolve, resolve_list_item, LogicalPath, Position};

const DOC: &str = "\
apiVersion: kro.run/v1alpha1
kind: ResourceGraphDefinition
metadata:
  name: nested
spec:
  resources:
  - id: first
    template:
      spec:
        containers:
          - name: app
            image: nginx:1.27
          - name: sidecar
            image: envoy
  - id: second
    template:
      spec: {}
  # trailing comment
status: {}
";

#[test]
fn test_resolve_is_idempotent() {
    let path = LogicalPath::from_dotted("spec.resources").index(1).key("id");
    let first = resolve(DOC, &path);
    assert_eq!(first, resolve(DOC, &path));
    assert_eq!(first, Position::new(14, 7));
}

#[test]
fn test_list_items_at_key_indentation() {
    assert_eq!(resolve_list_item(DOC, "resources", 0), Position::new(6, 2));
    assert_eq!(resolve_list_item(DOC, "resources", 1), Position::new(14, 2));
    assert_eq!(resolve_list_item(DOC, "resources", 2), Position::new(19, 0));
}

#[test]
fn test_nested_list_items_do_not_count() {
    let items = list_items(&SourceText::new(DOC), "resources");
    assert_eq!(items.len(), 2);
    assert_eq!((items[0].line, items[0].end_line), (6, 14));
    assert_eq!(items[1].end_line, 18);
}

#[test]
fn test_resolve_inside_nested_list() {
    let path = LogicalPath::from_dotted("spec.resources")
        .index(0)
        .key("template")
        .key("spec")
        .key("containers")
        .index(1)
        .key("image");
    assert_eq!(resolve(DOC, &path), Position::new(13, 18));
}

#[test]
fn test_value_colons_are_not_separators() {
    let path = LogicalPath::from_dotted("spec.resources")
        .index(0)
        .key("template")
        .key("spec")
        .key("containers")
        .index(0)
        .key("image");
    assert_eq!(resolve(DOC, &path), Position::new(11, 18));
}

#[test]
fn test_exiting_a_block_resets_matching() {
    let path = LogicalPath::from_dotted("metadata.status");
    assert_eq!(resolve(DOC, &path), Position::new(19, 0));
    assert_eq!(resolve(DOC, &LogicalPath::from_dotted("status")), Position::new(18, 7));
}

#[test]
fn test_position_after_key() {
    assert_eq!(position_after_key(DOC, "metadata"), Position::new(3, 0));
    assert_eq!(position_after_key(DOC, "nowhere"), Position::new(19, 0));
}

#[test]
fn test_empty_text() {
    let path = LogicalPath::from_dotted("spec");
    assert_eq!(resolve("", &path), Position::new(0, 0));
    assert_eq!(resolve_list_item("", "resources", 0), Position::new(0, 0));
}

#[test]
fn test_key_matches_only_direct_children() {
    let text = "\
spec:
  schema:
    spec:
      resources:
        cpu: string
  resources:
    - id: web
";
    let path = LogicalPath::from_dotted("spec.resources").index(0).key("id");
    assert_eq!(resolve(text, &path), Position::new(6, 9));
    let nested = LogicalPath::from_dotted("spec.cpu");
    assert_eq!(resolve(text, &nested), Position::new(7, 0));
}

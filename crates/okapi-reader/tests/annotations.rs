use okapi_model::{Annotated, AttributeValue, QualifiedName};
use okapi_reader::read_class;
use okapi_test_utils::{access, AnnotationSpec, ClassFileBuilder, MemberSpec, ValueSpec};
use pretty_assertions::assert_eq;

fn class_with_annotation(annotation: AnnotationSpec) -> Vec<u8> {
    ClassFileBuilder::new("com/example/Annotated")
        .annotation(annotation)
        .build()
}

#[test]
fn sole_value_attribute_renders_with_the_shorthand() {
    let bytes = class_with_annotation(
        AnnotationSpec::new("Lcom/example/Endpoint;")
            .element("value", ValueSpec::Str("/users".to_string())),
    );
    let class = read_class(&bytes).unwrap();

    let annotation = &class.annotations()[0];
    assert_eq!(annotation.name().as_str(), "com.example.Endpoint");
    assert_eq!(annotation.to_string(), "@com.example.Endpoint(\"/users\")");
}

#[test]
fn multiple_attributes_render_in_declaration_order() {
    let bytes = class_with_annotation(
        AnnotationSpec::new("Lcom/example/Route;")
            .element("path", ValueSpec::Str("/users".to_string()))
            .element("limit", ValueSpec::Int(10))
            .element(
                "method",
                ValueSpec::Enum {
                    type_descriptor: "Lcom/example/HttpMethod;".to_string(),
                    const_name: "GET".to_string(),
                },
            ),
    );
    let class = read_class(&bytes).unwrap();

    assert_eq!(
        class.annotations()[0].to_string(),
        "@com.example.Route(path=\"/users\", limit=10, method=com.example.HttpMethod.GET)"
    );
}

#[test]
fn string_values_escape_embedded_quotes() {
    let bytes = class_with_annotation(
        AnnotationSpec::new("Lcom/example/Doc;")
            .element("value", ValueSpec::Str("say \"hi\"".to_string())),
    );
    let class = read_class(&bytes).unwrap();

    assert_eq!(
        class.annotations()[0].to_string(),
        "@com.example.Doc(\"say \\\"hi\\\"\")"
    );
}

#[test]
fn one_element_arrays_render_as_the_scalar() {
    let bytes = class_with_annotation(
        AnnotationSpec::new("Lcom/example/Endpoint;").element(
            "value",
            ValueSpec::Array(vec![ValueSpec::Str("/users".to_string())]),
        ),
    );
    let class = read_class(&bytes).unwrap();

    assert_eq!(
        class.annotations()[0].to_string(),
        "@com.example.Endpoint(\"/users\")"
    );
}

#[test]
fn multi_element_arrays_render_as_a_brace_list() {
    let bytes = class_with_annotation(
        AnnotationSpec::new("Lcom/example/Endpoint;").element(
            "value",
            ValueSpec::Array(vec![
                ValueSpec::Str("/users".to_string()),
                ValueSpec::Str("/people".to_string()),
            ]),
        ),
    );
    let class = read_class(&bytes).unwrap();

    assert_eq!(
        class.annotations()[0].to_string(),
        "@com.example.Endpoint({/users,/people})"
    );
}

#[test]
fn nested_annotations_and_class_literals_decode() {
    let bytes = class_with_annotation(
        AnnotationSpec::new("Lcom/example/Route;")
            .element(
                "header",
                ValueSpec::Annotation(
                    AnnotationSpec::new("Lcom/example/Header;")
                        .element("value", ValueSpec::Str("X-Id".to_string())),
                ),
            )
            .element("type", ValueSpec::Class("Ljava/lang/String;".to_string()))
            .element("primitive", ValueSpec::Class("I".to_string())),
    );
    let class = read_class(&bytes).unwrap();
    let annotation = &class.annotations()[0];

    match annotation.attribute("header").unwrap() {
        AttributeValue::Nested(nested) => {
            assert_eq!(nested.name().as_str(), "com.example.Header");
        }
        other => panic!("expected a nested annotation, got {other:?}"),
    }
    assert_eq!(
        annotation.attribute("type").unwrap(),
        &AttributeValue::ClassLiteral(QualifiedName::new("java.lang.String"))
    );
    assert_eq!(
        annotation.attribute("primitive").unwrap(),
        &AttributeValue::ClassLiteral(QualifiedName::new("int"))
    );
    assert_eq!(
        annotation.to_string(),
        "@com.example.Route(header=@com.example.Header(\"X-Id\"), type=java.lang.String, primitive=int)"
    );
}

#[test]
fn scalar_kinds_decode_faithfully() {
    let bytes = class_with_annotation(
        AnnotationSpec::new("Lcom/example/Limits;")
            .element("flag", ValueSpec::Boolean(true))
            .element("b", ValueSpec::Byte(-3))
            .element("c", ValueSpec::Char('x'))
            .element("s", ValueSpec::Short(7))
            .element("max", ValueSpec::Long(1 << 40))
            .element("ratio", ValueSpec::Float(0.5))
            .element("factor", ValueSpec::Double(2.5)),
    );
    let class = read_class(&bytes).unwrap();
    let annotation = &class.annotations()[0];

    assert_eq!(annotation.attribute("flag").unwrap(), &AttributeValue::Boolean(true));
    assert_eq!(annotation.attribute("b").unwrap(), &AttributeValue::Byte(-3));
    assert_eq!(annotation.attribute("c").unwrap(), &AttributeValue::Char('x'));
    assert_eq!(annotation.attribute("s").unwrap(), &AttributeValue::Short(7));
    assert_eq!(annotation.attribute("max").unwrap(), &AttributeValue::Long(1 << 40));
    assert_eq!(annotation.attribute("ratio").unwrap(), &AttributeValue::Float(0.5));
    assert_eq!(annotation.attribute("factor").unwrap(), &AttributeValue::Double(2.5));
    assert_eq!(
        annotation.to_string(),
        "@com.example.Limits(flag=true, b=-3, c=x, s=7, max=1099511627776, ratio=0.5, factor=2.5)"
    );
}

#[test]
fn attribute_values_normalization_is_a_contract() {
    let bytes = class_with_annotation(
        AnnotationSpec::new("Lcom/example/Route;")
            .element("path", ValueSpec::Str("/users".to_string()))
            .element(
                "methods",
                ValueSpec::Array(vec![
                    ValueSpec::Str("GET".to_string()),
                    ValueSpec::Str("POST".to_string()),
                ]),
            ),
    );
    let class = read_class(&bytes).unwrap();
    let annotation = &class.annotations()[0];

    // Scalar: a one-element view. Array: its elements. Absent: empty.
    assert_eq!(annotation.attribute_values("path").len(), 1);
    assert_eq!(annotation.attribute_values("methods").len(), 2);
    assert_eq!(annotation.attribute_values("absent").len(), 0);
}

#[test]
fn field_and_method_annotations_merge_visible_then_invisible() {
    let bytes = ClassFileBuilder::new("com/example/Payload")
        .field(
            MemberSpec::new(access::PUBLIC, "name", "Ljava/lang/String;")
                .annotation(AnnotationSpec::new("Lcom/example/Visible;"))
                .invisible_annotation(AnnotationSpec::new("Lcom/example/Hidden;")),
        )
        .build();
    let class = read_class(&bytes).unwrap();

    let field = class.field("name").unwrap();
    let names: Vec<_> = field
        .annotations()
        .iter()
        .map(|a| a.name().as_str())
        .collect();
    assert_eq!(names, vec!["com.example.Visible", "com.example.Hidden"]);

    let visible = QualifiedName::new("com.example.Visible");
    assert!(field.has_annotation(&visible));
    assert!(field.find_annotation(&visible).is_some());
}

#[test]
fn decode_and_render_are_deterministic() {
    let build = || {
        class_with_annotation(
            AnnotationSpec::new("Lcom/example/Route;")
                .element("path", ValueSpec::Str("/users".to_string()))
                .element(
                    "methods",
                    ValueSpec::Array(vec![
                        ValueSpec::Str("GET".to_string()),
                        ValueSpec::Str("POST".to_string()),
                    ]),
                ),
        )
    };

    let first = read_class(&build()).unwrap();
    let second = read_class(&build()).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first.annotations()[0].to_string(),
        second.annotations()[0].to_string()
    );
}

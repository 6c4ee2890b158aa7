use okapi_model::{modifiers, JavaType, TypeSchema};
use okapi_reader::{read_class, ClassMetadataReader, Error};
use okapi_test_utils::{access, ClassFileBuilder, MemberSpec};
use pretty_assertions::assert_eq;

#[test]
fn loading_fields() {
    let bytes = ClassFileBuilder::new("com/example/TestClass")
        .signature("<T::Ljava/lang/CharSequence;>Ljava/lang/Object;")
        .field(MemberSpec::new(access::PUBLIC, "field1", "Ljava/lang/String;"))
        .field(
            MemberSpec::new(access::PUBLIC, "field2", "Ljava/util/List;")
                .signature("Ljava/util/List<Ljava/lang/String;>;"),
        )
        .field(
            MemberSpec::new(access::PRIVATE, "field3", "Ljava/lang/CharSequence;")
                .signature("TT;"),
        )
        .build();
    let class = read_class(&bytes).unwrap();

    assert_eq!(class.name().as_str(), "com.example.TestClass");

    let mut expected_schema = TypeSchema::new();
    expected_schema.add("T", JavaType::basic("java.lang.CharSequence"));
    assert_eq!(class.schema(), &expected_schema);

    // Declaration order and count are preserved exactly.
    assert_eq!(class.fields().len(), 3);
    assert_eq!(
        class.fields().iter().map(|f| f.name()).collect::<Vec<_>>(),
        vec!["field1", "field2", "field3"]
    );

    // A descriptor-only field keeps its erased type; a signature supersedes
    // the descriptor; a type variable stays a variable, not its erasure.
    assert_eq!(
        class.field("field1").unwrap().ty().to_string(),
        "java.lang.String"
    );
    assert_eq!(
        class.field("field2").unwrap().ty().to_string(),
        "java.util.List<java.lang.String>"
    );
    assert_eq!(
        class.field("field3").unwrap().ty(),
        &JavaType::variable("T")
    );
}

#[test]
fn missing_field_lookup_fails_with_context() {
    let bytes = ClassFileBuilder::new("com/example/TestClass").build();
    let class = read_class(&bytes).unwrap();

    let error = class.field("nope").unwrap_err();
    assert_eq!(error.class.as_str(), "com.example.TestClass");
    assert_eq!(error.field, "nope");
}

#[test]
fn superclass_and_interfaces_without_signature() {
    let bytes = ClassFileBuilder::new("com/example/Child")
        .super_class("com/example/Parent")
        .interface("java/io/Serializable")
        .build();
    let class = read_class(&bytes).unwrap();

    assert_eq!(
        class.super_class(),
        Some(&JavaType::basic("com.example.Parent"))
    );
    assert_eq!(
        class.interfaces(),
        &[JavaType::basic("java.io.Serializable")]
    );
}

#[test]
fn generic_superclass_and_interfaces_come_from_the_signature() {
    let bytes = ClassFileBuilder::new("com/example/Names")
        .super_class("java/util/AbstractList")
        .interface("java/lang/Comparable")
        .signature(
            "Ljava/util/AbstractList<Ljava/lang/String;>;Ljava/lang/Comparable<Lcom/example/Names;>;",
        )
        .build();
    let class = read_class(&bytes).unwrap();

    assert_eq!(
        class.super_class().unwrap().to_string(),
        "java.util.AbstractList<java.lang.String>"
    );
    assert_eq!(
        class.interfaces()[0].to_string(),
        "java.lang.Comparable<com.example.Names>"
    );
}

#[test]
fn method_types_and_own_schema() {
    let bytes = ClassFileBuilder::new("com/example/Repo")
        .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
        .method(
            MemberSpec::new(
                access::PUBLIC,
                "map",
                "(Ljava/util/function/Function;)Ljava/util/List;",
            )
            .signature(
                "<R:Ljava/lang/Object;>(Ljava/util/function/Function<TT;TR;>;)Ljava/util/List<TR;>;",
            ),
        )
        .method(MemberSpec::new(access::PUBLIC, "clear", "()V"))
        .build();
    let class = read_class(&bytes).unwrap();

    let map = class.find_method("map").unwrap();
    assert_eq!(
        map.parameter_types().map(|t| t.to_string()).collect::<Vec<_>>(),
        vec!["java.util.function.Function<T, R>"]
    );
    assert_eq!(map.return_type().to_string(), "java.util.List<R>");
    assert_eq!(map.schema().local_names().collect::<Vec<_>>(), vec!["R"]);
    // The method scope chains up to the class scope.
    assert!(map.schema().declares("T"));

    let clear = class.find_method("clear").unwrap();
    assert!(clear.return_type().is_void());
    assert_eq!(clear.parameters().len(), 0);
}

#[test]
fn method_type_parameters_shadow_class_type_parameters() {
    let bytes = ClassFileBuilder::new("com/example/Holder")
        .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
        .method(
            MemberSpec::new(
                access::PUBLIC,
                "narrow",
                "(Ljava/lang/Number;)Ljava/lang/Number;",
            )
            .signature("<T:Ljava/lang/Number;>(TT;)TT;"),
        )
        .build();
    let class = read_class(&bytes).unwrap();

    let method = class.find_method("narrow").unwrap();
    assert_eq!(
        method.schema().upper_bound("T"),
        Some(&JavaType::basic("java.lang.Number"))
    );
    assert_eq!(
        class.schema().upper_bound("T"),
        Some(&JavaType::basic("java.lang.Object"))
    );
    assert_eq!(method.parameters()[0].ty(), &JavaType::variable("T"));
    assert_eq!(method.return_type(), &JavaType::variable("T"));
}

#[test]
fn self_referential_bound_resolves() {
    let bytes = ClassFileBuilder::new("com/example/Node")
        .signature("<T:Ljava/lang/Object;:Ljava/lang/Comparable<TT;>;>Ljava/lang/Object;")
        .build();
    let class = read_class(&bytes).unwrap();

    // The stored upper bound is the first (class) bound.
    assert_eq!(
        class.schema().upper_bound("T"),
        Some(&JavaType::basic("java.lang.Object"))
    );
}

#[test]
fn interface_only_bound_becomes_the_upper_bound() {
    let bytes = ClassFileBuilder::new("com/example/Tagged")
        .signature("<T::Ljava/io/Serializable;>Ljava/lang/Object;")
        .build();
    let class = read_class(&bytes).unwrap();

    assert_eq!(
        class.schema().upper_bound("T"),
        Some(&JavaType::basic("java.io.Serializable"))
    );
}

#[test]
fn wildcards_and_arrays_translate() {
    let bytes = ClassFileBuilder::new("com/example/Buckets")
        .field(
            MemberSpec::new(access::PUBLIC, "anything", "Ljava/util/List;")
                .signature("Ljava/util/List<*>;"),
        )
        .field(
            MemberSpec::new(access::PUBLIC, "numbers", "Ljava/util/List;")
                .signature("Ljava/util/List<+Ljava/lang/Number;>;"),
        )
        .field(
            MemberSpec::new(access::PUBLIC, "sinks", "Ljava/util/List;")
                .signature("Ljava/util/List<-Ljava/lang/Number;>;"),
        )
        .field(MemberSpec::new(access::PUBLIC, "grid", "[[I"))
        .build();
    let class = read_class(&bytes).unwrap();

    assert_eq!(
        class.field("anything").unwrap().ty().to_string(),
        "java.util.List<?>"
    );
    assert_eq!(
        class.field("numbers").unwrap().ty().to_string(),
        "java.util.List<? extends java.lang.Number>"
    );
    assert_eq!(
        class.field("sinks").unwrap().ty().to_string(),
        "java.util.List<? super java.lang.Number>"
    );
    assert_eq!(class.field("grid").unwrap().ty().to_string(), "int[][]");
}

#[test]
fn nested_class_signatures_flatten_with_outer_arguments_first() {
    let bytes = ClassFileBuilder::new("com/example/User")
        .signature("<T:Ljava/lang/Object;U:Ljava/lang/Object;>Ljava/lang/Object;")
        .field(
            MemberSpec::new(access::PUBLIC, "entry", "Lcom/example/Outer$Inner;")
                .signature("Lcom/example/Outer<TT;>.Inner<TU;>;"),
        )
        .build();
    let class = read_class(&bytes).unwrap();

    assert_eq!(
        class.field("entry").unwrap().ty(),
        &JavaType::parameterized(
            "com.example.Outer$Inner",
            vec![JavaType::variable("T"), JavaType::variable("U")]
        )
    );
}

#[test]
fn anonymous_class_inherits_enclosing_type_parameters() {
    // An anonymous Comparator<T> created inside a generic factory method:
    // its own signature references T, declared only by the (separately
    // compiled) enclosing method.
    let bytes = ClassFileBuilder::new("com/example/Factory$1")
        .access_flags(access::SUPER)
        .signature("Ljava/lang/Object;Ljava/util/Comparator<TT;>;")
        .interface("java/util/Comparator")
        .enclosing_method(
            "com/example/Factory",
            Some(("createComparator", "()Ljava/util/Comparator;")),
        )
        .inner_class("com/example/Factory$1", None, None, 0)
        .method(
            MemberSpec::new(
                access::PUBLIC,
                "compare",
                "(Ljava/lang/Object;Ljava/lang/Object;)I",
            )
            .signature("(TT;TT;)I"),
        )
        .build();
    let class = read_class(&bytes).unwrap();

    // T resolved through the synthetic enclosing scope, with the root bound.
    assert!(class.schema().is_empty());
    assert!(class.schema().declares("T"));
    assert_eq!(
        class.schema().parent().unwrap().upper_bound("T"),
        Some(&JavaType::basic("java.lang.Object"))
    );
    assert_eq!(
        class.interfaces()[0],
        JavaType::parameterized("java.util.Comparator", vec![JavaType::variable("T")])
    );

    let compare = class.find_method("compare").unwrap();
    assert_eq!(compare.parameters()[0].ty(), &JavaType::variable("T"));
    assert!(compare.schema().declares("T"));
}

#[test]
fn explicit_enclosing_schema_takes_precedence() {
    let mut enclosing = TypeSchema::new();
    enclosing.add("T", JavaType::basic("java.lang.CharSequence"));

    let bytes = ClassFileBuilder::new("com/example/Outer$Inner")
        .inner_class("com/example/Outer$Inner", Some("com/example/Outer"), Some("Inner"), 0)
        .field(
            MemberSpec::new(access::PUBLIC, "value", "Ljava/lang/CharSequence;")
                .signature("TT;"),
        )
        .build();
    let class = ClassMetadataReader::with_enclosing_schema(enclosing)
        .read(&bytes)
        .unwrap();

    assert_eq!(
        class.schema().upper_bound("T"),
        Some(&JavaType::basic("java.lang.CharSequence"))
    );
    assert_eq!(class.field("value").unwrap().ty(), &JavaType::variable("T"));
}

#[test]
fn top_level_class_with_unknown_variable_is_unresolved() {
    let bytes = ClassFileBuilder::new("com/example/Broken")
        .field(
            MemberSpec::new(access::PUBLIC, "value", "Ljava/lang/Object;").signature("TT;"),
        )
        .build();

    assert_eq!(
        read_class(&bytes).unwrap_err(),
        Error::UnresolvedTypeVariable {
            name: "T".to_string(),
            class: "com.example.Broken".to_string(),
        }
    );
}

#[test]
fn parameter_names_and_annotations_attach_to_trailing_parameters() {
    use okapi_test_utils::AnnotationSpec;

    let bytes = ClassFileBuilder::new("com/example/Controller")
        .method(
            MemberSpec::new(
                access::PUBLIC,
                "find",
                "(Ljava/lang/String;I)Ljava/lang/String;",
            )
            .parameter_names(&["id", "limit"])
            // One group for two parameters: it belongs to the last one.
            .parameter_annotations(vec![vec![AnnotationSpec::new("Lcom/example/Limit;")]]),
        )
        .build();
    let class = read_class(&bytes).unwrap();

    let method = class.find_method("find").unwrap();
    let parameters = method.parameters();
    assert_eq!(parameters.len(), 2);
    assert_eq!(parameters[0].name(), Some("id"));
    assert_eq!(parameters[1].name(), Some("limit"));

    assert!(parameters[0].annotations().is_empty());
    assert_eq!(parameters[1].annotations().len(), 1);
    assert_eq!(
        parameters[1].annotations()[0].name().as_str(),
        "com.example.Limit"
    );
}

#[test]
fn enum_classes_expose_their_constants() {
    let bytes = ClassFileBuilder::new("com/example/Color")
        .access_flags(access::PUBLIC | access::FINAL | access::ENUM)
        .super_class("java/lang/Enum")
        .signature("Ljava/lang/Enum<Lcom/example/Color;>;")
        .field(MemberSpec::new(
            access::PUBLIC | access::STATIC | access::FINAL | access::ENUM,
            "RED",
            "Lcom/example/Color;",
        ))
        .field(MemberSpec::new(
            access::PUBLIC | access::STATIC | access::FINAL | access::ENUM,
            "GREEN",
            "Lcom/example/Color;",
        ))
        .field(MemberSpec::new(
            access::PRIVATE | access::STATIC | access::FINAL | access::SYNTHETIC,
            "$VALUES",
            "[Lcom/example/Color;",
        ))
        .build();
    let class = read_class(&bytes).unwrap();

    assert!(class.is_enum());
    assert!(!class.is_interface());
    assert_eq!(
        class.enum_constants().collect::<Vec<_>>(),
        vec!["RED", "GREEN"]
    );
    assert_eq!(
        class.super_class().unwrap().to_string(),
        "java.lang.Enum<com.example.Color>"
    );
}

#[test]
fn modifiers_are_carried_through() {
    let bytes = ClassFileBuilder::new("com/example/Mixed")
        .field(MemberSpec::new(
            access::PUBLIC | access::STATIC,
            "shared",
            "I",
        ))
        .field(MemberSpec::new(access::PRIVATE, "own", "I"))
        .method(MemberSpec::new(
            access::PUBLIC,
            "getOwn",
            "()I",
        ))
        .build();
    let class = read_class(&bytes).unwrap();

    assert!(class.field("shared").unwrap().is_public());
    assert!(class.field("shared").unwrap().is_static());
    assert!(!class.field("own").unwrap().is_public());
    assert!(class.find_method("getOwn").unwrap().is_getter());
    assert_eq!(class.modifiers() & modifiers::PUBLIC, modifiers::PUBLIC);
}

#[test]
fn malformed_member_descriptor_fails_the_whole_class() {
    let bytes = ClassFileBuilder::new("com/example/Broken")
        .field(MemberSpec::new(access::PUBLIC, "value", "Q"))
        .build();

    assert!(matches!(
        read_class(&bytes).unwrap_err(),
        Error::ClassFile(okapi_classfile::Error::MalformedDescriptor { .. })
    ));
}

#[test]
fn malformed_member_signature_fails_the_whole_class() {
    let bytes = ClassFileBuilder::new("com/example/Broken")
        .field(
            MemberSpec::new(access::PUBLIC, "value", "Ljava/util/List;")
                .signature("Ljava/util/List<"),
        )
        .build();

    assert!(matches!(
        read_class(&bytes).unwrap_err(),
        Error::ClassFile(okapi_classfile::Error::MalformedSignature { .. })
    ));
}

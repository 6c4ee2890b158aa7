#![forbid(unsafe_code)]

//! Synthetic classfile byte sequences for tests.
//!
//! Emits just enough of the container format to exercise the decoder:
//! a deduplicated constant pool, member tables, and the attributes the
//! reader understands. Strings are written as plain UTF-8, which matches
//! modified UTF-8 for everything tests put in names and literals.

use std::collections::HashMap;

/// Classfile access flags used by tests.
pub mod access {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const SUPER: u16 = 0x0020;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;
}

/// An annotation to embed in a `RuntimeVisibleAnnotations`-style attribute.
#[derive(Debug, Clone)]
pub struct AnnotationSpec {
    type_descriptor: String,
    elements: Vec<(String, ValueSpec)>,
}

impl AnnotationSpec {
    pub fn new(type_descriptor: &str) -> Self {
        Self {
            type_descriptor: type_descriptor.to_string(),
            elements: Vec::new(),
        }
    }

    pub fn element(mut self, name: &str, value: ValueSpec) -> Self {
        self.elements.push((name.to_string(), value));
        self
    }
}

/// An element value to embed in an annotation.
#[derive(Debug, Clone)]
pub enum ValueSpec {
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    Enum {
        type_descriptor: String,
        const_name: String,
    },
    Class(String),
    Annotation(AnnotationSpec),
    Array(Vec<ValueSpec>),
}

/// One field or method to emit.
#[derive(Debug, Clone)]
pub struct MemberSpec {
    access_flags: u16,
    name: String,
    descriptor: String,
    signature: Option<String>,
    annotations: Vec<AnnotationSpec>,
    invisible_annotations: Vec<AnnotationSpec>,
    parameter_annotations: Vec<Vec<AnnotationSpec>>,
    parameter_names: Vec<Option<String>>,
}

impl MemberSpec {
    pub fn new(access_flags: u16, name: &str, descriptor: &str) -> Self {
        Self {
            access_flags,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            annotations: Vec::new(),
            invisible_annotations: Vec::new(),
            parameter_annotations: Vec::new(),
            parameter_names: Vec::new(),
        }
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn invisible_annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.invisible_annotations.push(annotation);
        self
    }

    /// One group per parameter, in order.
    pub fn parameter_annotations(mut self, groups: Vec<Vec<AnnotationSpec>>) -> Self {
        self.parameter_annotations = groups;
        self
    }

    pub fn parameter_names(mut self, names: &[&str]) -> Self {
        self.parameter_names = names.iter().map(|n| Some(n.to_string())).collect();
        self
    }
}

/// Builds one classfile byte sequence.
#[derive(Debug, Clone)]
pub struct ClassFileBuilder {
    minor_version: u16,
    major_version: u16,
    access_flags: u16,
    this_class: String,
    super_class: Option<String>,
    interfaces: Vec<String>,
    signature: Option<String>,
    annotations: Vec<AnnotationSpec>,
    inner_classes: Vec<InnerClassSpec>,
    enclosing_method: Option<(String, Option<(String, String)>)>,
    raw_class_attributes: Vec<(String, Vec<u8>)>,
    fields: Vec<MemberSpec>,
    methods: Vec<MemberSpec>,
}

#[derive(Debug, Clone)]
struct InnerClassSpec {
    inner_class: String,
    outer_class: Option<String>,
    inner_name: Option<String>,
    access_flags: u16,
}

impl ClassFileBuilder {
    pub fn new(internal_name: &str) -> Self {
        Self {
            minor_version: 0,
            major_version: 61, // Java 17
            access_flags: access::PUBLIC | access::SUPER,
            this_class: internal_name.to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            signature: None,
            annotations: Vec::new(),
            inner_classes: Vec::new(),
            enclosing_method: None,
            raw_class_attributes: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.major_version = major;
        self.minor_version = minor;
        self
    }

    pub fn access_flags(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    pub fn super_class(mut self, internal_name: &str) -> Self {
        self.super_class = Some(internal_name.to_string());
        self
    }

    pub fn interface(mut self, internal_name: &str) -> Self {
        self.interfaces.push(internal_name.to_string());
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn inner_class(
        mut self,
        inner_class: &str,
        outer_class: Option<&str>,
        inner_name: Option<&str>,
        access_flags: u16,
    ) -> Self {
        self.inner_classes.push(InnerClassSpec {
            inner_class: inner_class.to_string(),
            outer_class: outer_class.map(str::to_string),
            inner_name: inner_name.map(str::to_string),
            access_flags,
        });
        self
    }

    pub fn enclosing_method(mut self, class_name: &str, method: Option<(&str, &str)>) -> Self {
        self.enclosing_method = Some((
            class_name.to_string(),
            method.map(|(name, descriptor)| (name.to_string(), descriptor.to_string())),
        ));
        self
    }

    /// Emits an attribute with an arbitrary payload, for exercising the
    /// unknown-attribute and malformed-attribute paths.
    pub fn raw_class_attribute(mut self, name: &str, payload: Vec<u8>) -> Self {
        self.raw_class_attributes.push((name.to_string(), payload));
        self
    }

    pub fn field(mut self, field: MemberSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MemberSpec) -> Self {
        self.methods.push(method);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = Pool::default();
        let this_index = pool.class(&self.this_class);
        let super_index = match &self.super_class {
            Some(name) => pool.class(name),
            None => 0,
        };
        let interface_indexes: Vec<u16> =
            self.interfaces.iter().map(|name| pool.class(name)).collect();
        let field_bytes: Vec<Vec<u8>> = self
            .fields
            .iter()
            .map(|member| member_bytes(member, &mut pool))
            .collect();
        let method_bytes: Vec<Vec<u8>> = self
            .methods
            .iter()
            .map(|member| member_bytes(member, &mut pool))
            .collect();

        let mut class_attributes: Vec<(u16, Vec<u8>)> = Vec::new();
        if let Some(signature) = &self.signature {
            let mut payload = Vec::new();
            let index = pool.utf8(signature);
            push_u2(&mut payload, index);
            class_attributes.push((pool.utf8("Signature"), payload));
        }
        if !self.annotations.is_empty() {
            let payload = annotation_list_bytes(&self.annotations, &mut pool);
            class_attributes.push((pool.utf8("RuntimeVisibleAnnotations"), payload));
        }
        if !self.inner_classes.is_empty() {
            let mut payload = Vec::new();
            push_u2(&mut payload, self.inner_classes.len() as u16);
            for inner in &self.inner_classes {
                let inner_index = pool.class(&inner.inner_class);
                let outer_index = match &inner.outer_class {
                    Some(name) => pool.class(name),
                    None => 0,
                };
                let name_index = match &inner.inner_name {
                    Some(name) => pool.utf8(name),
                    None => 0,
                };
                push_u2(&mut payload, inner_index);
                push_u2(&mut payload, outer_index);
                push_u2(&mut payload, name_index);
                push_u2(&mut payload, inner.access_flags);
            }
            class_attributes.push((pool.utf8("InnerClasses"), payload));
        }
        if let Some((class_name, method)) = &self.enclosing_method {
            let mut payload = Vec::new();
            let class_index = pool.class(class_name);
            let method_index = match method {
                Some((name, descriptor)) => pool.name_and_type(name, descriptor),
                None => 0,
            };
            push_u2(&mut payload, class_index);
            push_u2(&mut payload, method_index);
            class_attributes.push((pool.utf8("EnclosingMethod"), payload));
        }
        for (name, payload) in &self.raw_class_attributes {
            class_attributes.push((pool.utf8(name), payload.clone()));
        }

        let mut out = Vec::new();
        push_u4(&mut out, 0xCAFE_BABE);
        push_u2(&mut out, self.minor_version);
        push_u2(&mut out, self.major_version);
        push_u2(&mut out, pool.count());
        pool.serialize(&mut out);
        push_u2(&mut out, self.access_flags);
        push_u2(&mut out, this_index);
        push_u2(&mut out, super_index);
        push_u2(&mut out, interface_indexes.len() as u16);
        for index in interface_indexes {
            push_u2(&mut out, index);
        }
        push_u2(&mut out, field_bytes.len() as u16);
        for bytes in field_bytes {
            out.extend_from_slice(&bytes);
        }
        push_u2(&mut out, method_bytes.len() as u16);
        for bytes in method_bytes {
            out.extend_from_slice(&bytes);
        }
        push_attributes(&mut out, &class_attributes);
        out
    }
}

fn member_bytes(member: &MemberSpec, pool: &mut Pool) -> Vec<u8> {
    let mut attributes: Vec<(u16, Vec<u8>)> = Vec::new();
    if let Some(signature) = &member.signature {
        let mut payload = Vec::new();
        let index = pool.utf8(signature);
        push_u2(&mut payload, index);
        attributes.push((pool.utf8("Signature"), payload));
    }
    if !member.annotations.is_empty() {
        let payload = annotation_list_bytes(&member.annotations, pool);
        attributes.push((pool.utf8("RuntimeVisibleAnnotations"), payload));
    }
    if !member.invisible_annotations.is_empty() {
        let payload = annotation_list_bytes(&member.invisible_annotations, pool);
        attributes.push((pool.utf8("RuntimeInvisibleAnnotations"), payload));
    }
    if !member.parameter_annotations.is_empty() {
        let mut payload = Vec::new();
        push_u1(&mut payload, member.parameter_annotations.len() as u8);
        for group in &member.parameter_annotations {
            push_u2(&mut payload, group.len() as u16);
            for annotation in group {
                annotation_bytes(annotation, pool, &mut payload);
            }
        }
        attributes.push((pool.utf8("RuntimeVisibleParameterAnnotations"), payload));
    }
    if !member.parameter_names.is_empty() {
        let mut payload = Vec::new();
        push_u1(&mut payload, member.parameter_names.len() as u8);
        for name in &member.parameter_names {
            let index = match name {
                Some(name) => pool.utf8(name),
                None => 0,
            };
            push_u2(&mut payload, index);
            push_u2(&mut payload, 0); // parameter access flags
        }
        attributes.push((pool.utf8("MethodParameters"), payload));
    }

    let mut out = Vec::new();
    push_u2(&mut out, member.access_flags);
    push_u2(&mut out, pool.utf8(&member.name));
    push_u2(&mut out, pool.utf8(&member.descriptor));
    push_attributes(&mut out, &attributes);
    out
}

fn annotation_list_bytes(annotations: &[AnnotationSpec], pool: &mut Pool) -> Vec<u8> {
    let mut payload = Vec::new();
    push_u2(&mut payload, annotations.len() as u16);
    for annotation in annotations {
        annotation_bytes(annotation, pool, &mut payload);
    }
    payload
}

fn annotation_bytes(annotation: &AnnotationSpec, pool: &mut Pool, out: &mut Vec<u8>) {
    let type_index = pool.utf8(&annotation.type_descriptor);
    push_u2(out, type_index);
    push_u2(out, annotation.elements.len() as u16);
    for (name, value) in &annotation.elements {
        let name_index = pool.utf8(name);
        push_u2(out, name_index);
        value_bytes(value, pool, out);
    }
}

fn value_bytes(value: &ValueSpec, pool: &mut Pool, out: &mut Vec<u8>) {
    match value {
        ValueSpec::Boolean(v) => tagged_u2(out, b'Z', pool.integer(i32::from(*v))),
        ValueSpec::Byte(v) => tagged_u2(out, b'B', pool.integer(i32::from(*v))),
        ValueSpec::Char(v) => tagged_u2(out, b'C', pool.integer(*v as i32)),
        ValueSpec::Short(v) => tagged_u2(out, b'S', pool.integer(i32::from(*v))),
        ValueSpec::Int(v) => tagged_u2(out, b'I', pool.integer(*v)),
        ValueSpec::Long(v) => tagged_u2(out, b'J', pool.long(*v)),
        ValueSpec::Float(v) => tagged_u2(out, b'F', pool.float(*v)),
        ValueSpec::Double(v) => tagged_u2(out, b'D', pool.double(*v)),
        ValueSpec::Str(v) => tagged_u2(out, b's', pool.utf8(v)),
        ValueSpec::Enum {
            type_descriptor,
            const_name,
        } => {
            push_u1(out, b'e');
            let type_index = pool.utf8(type_descriptor);
            push_u2(out, type_index);
            let name_index = pool.utf8(const_name);
            push_u2(out, name_index);
        }
        ValueSpec::Class(descriptor) => tagged_u2(out, b'c', pool.utf8(descriptor)),
        ValueSpec::Annotation(nested) => {
            push_u1(out, b'@');
            annotation_bytes(nested, pool, out);
        }
        ValueSpec::Array(values) => {
            push_u1(out, b'[');
            push_u2(out, values.len() as u16);
            for value in values {
                value_bytes(value, pool, out);
            }
        }
    }
}

fn tagged_u2(out: &mut Vec<u8>, tag: u8, index: u16) {
    push_u1(out, tag);
    push_u2(out, index);
}

fn push_attributes(out: &mut Vec<u8>, attributes: &[(u16, Vec<u8>)]) {
    push_u2(out, attributes.len() as u16);
    for (name_index, payload) in attributes {
        push_u2(out, *name_index);
        push_u4(out, payload.len() as u32);
        out.extend_from_slice(payload);
    }
}

fn push_u1(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

fn push_u2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn push_u4(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Constant pool under construction. Entries are append-only, so indices
/// handed out stay valid; `Long`/`Double` push an extra unusable slot per
/// the format's two-slot rule.
#[derive(Debug, Clone, Default)]
struct Pool {
    entries: Vec<Entry>,
    utf8_cache: HashMap<String, u16>,
    class_cache: HashMap<String, u16>,
    integer_cache: HashMap<i32, u16>,
}

#[derive(Debug, Clone)]
enum Entry {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    NameAndType(u16, u16),
    Wide,
}

impl Pool {
    fn push(&mut self, entry: Entry) -> u16 {
        self.entries.push(entry);
        self.entries.len() as u16
    }

    fn utf8(&mut self, text: &str) -> u16 {
        if let Some(&index) = self.utf8_cache.get(text) {
            return index;
        }
        let index = self.push(Entry::Utf8(text.to_string()));
        self.utf8_cache.insert(text.to_string(), index);
        index
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        if let Some(&index) = self.class_cache.get(internal_name) {
            return index;
        }
        let name_index = self.utf8(internal_name);
        let index = self.push(Entry::Class(name_index));
        self.class_cache.insert(internal_name.to_string(), index);
        index
    }

    fn integer(&mut self, value: i32) -> u16 {
        if let Some(&index) = self.integer_cache.get(&value) {
            return index;
        }
        let index = self.push(Entry::Integer(value));
        self.integer_cache.insert(value, index);
        index
    }

    fn long(&mut self, value: i64) -> u16 {
        let index = self.push(Entry::Long(value));
        self.push(Entry::Wide);
        index
    }

    fn float(&mut self, value: f32) -> u16 {
        self.push(Entry::Float(value))
    }

    fn double(&mut self, value: f64) -> u16 {
        let index = self.push(Entry::Double(value));
        self.push(Entry::Wide);
        index
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.push(Entry::NameAndType(name_index, descriptor_index))
    }

    fn count(&self) -> u16 {
        self.entries.len() as u16 + 1
    }

    fn serialize(&self, out: &mut Vec<u8>) {
        for entry in &self.entries {
            match entry {
                Entry::Utf8(text) => {
                    push_u1(out, 1);
                    push_u2(out, text.len() as u16);
                    out.extend_from_slice(text.as_bytes());
                }
                Entry::Integer(value) => {
                    push_u1(out, 3);
                    push_u4(out, *value as u32);
                }
                Entry::Float(value) => {
                    push_u1(out, 4);
                    push_u4(out, value.to_bits());
                }
                Entry::Long(value) => {
                    push_u1(out, 5);
                    out.extend_from_slice(&(*value as u64).to_be_bytes());
                }
                Entry::Double(value) => {
                    push_u1(out, 6);
                    out.extend_from_slice(&value.to_bits().to_be_bytes());
                }
                Entry::Class(name_index) => {
                    push_u1(out, 7);
                    push_u2(out, *name_index);
                }
                Entry::NameAndType(name_index, descriptor_index) => {
                    push_u1(out, 12);
                    push_u2(out, *name_index);
                    push_u2(out, *descriptor_index);
                }
                Entry::Wide => {}
            }
        }
    }
}

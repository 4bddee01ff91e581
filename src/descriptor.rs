//! The flat, flag-discriminated type model handed to templates.
//!
//! Templates cannot compare strings, so every case distinction they need is a
//! boolean here. The flags are derived from `ts_type` by [`TypeDescriptor::finish`]
//! and never set by hand, except `is_atomic` which the enum branch may raise early.
use serde::Serialize;
use serde_json::Value;

use crate::schema::Node;
use crate::shape::{self, Primitive};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub ts_type: String,
    /// Definition name for references.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub is_enum: bool,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    pub is_nullable: bool,
    pub required_property_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_type: Option<Box<TypeDescriptor>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<TypeDescriptor>,

    // set only on properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,

    pub is_ref: bool,
    pub is_object: bool,
    pub is_array: bool,
    pub is_dictionary: bool,
    pub is_atomic: bool,
}

/// What a node says about itself regardless of its shape.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Header {
    description: Option<String>,
    is_nullable: bool,
    required_property_names: Vec<String>,
}

impl Header {
    pub(crate) fn of(node: Node<'_>) -> Self {
        let required_property_names = if node.is_type("object") {
            node.required_names().into_iter().map(str::to_owned).collect()
        } else {
            Vec::new()
        };
        Header {
            description: node.description().map(str::to_owned),
            is_nullable: !node.required_flag(),
            required_property_names,
        }
    }

    pub(crate) fn requires(&self, name: &str) -> bool {
        self.required_property_names.iter().any(|r| r == name)
    }
}

impl TypeDescriptor {
    fn with_type(header: Header, ts_type: String) -> Self {
        TypeDescriptor {
            description: header.description,
            ts_type,
            target: None,
            is_enum: false,
            enum_values: None,
            is_nullable: header.is_nullable,
            required_property_names: header.required_property_names,
            element_type: None,
            properties: Vec::new(),
            name: None,
            is_required: None,
            is_ref: false,
            is_object: false,
            is_array: false,
            is_dictionary: false,
            is_atomic: false,
        }
    }

    pub(crate) fn reference(header: Header, target: &str) -> Self {
        let mut out = Self::with_type(header, shape::REF.to_owned());
        out.target = Some(target.to_owned());
        out
    }

    /// Inline union of the JSON-encoded literals, e.g. `"a" | "b" | 3`.
    pub(crate) fn enumeration(header: Header, values: &[Value]) -> Self {
        let ts_type = if values.is_empty() {
            shape::NEVER.to_owned()
        } else {
            values.iter().map(literal).collect::<Vec<_>>().join(" | ")
        };
        let mut out = Self::with_type(header, ts_type);
        out.is_atomic = true;
        out.is_enum = true;
        out.enum_values = Some(values.to_vec());
        out
    }

    pub(crate) fn primitive(header: Header, primitive: Primitive) -> Self {
        Self::with_type(header, primitive.ts_name().to_owned())
    }

    pub(crate) fn array(header: Header, element: TypeDescriptor) -> Self {
        let ts_type = format!("{}{}>", shape::ARRAY_OPEN, element.element_name());
        let mut out = Self::with_type(header, ts_type);
        out.element_type = Some(Box::new(element));
        out
    }

    pub(crate) fn dictionary(header: Header, element: TypeDescriptor) -> Self {
        let ts_type = format!("{}{}>", shape::DICTIONARY_OPEN, element.element_name());
        let mut out = Self::with_type(header, ts_type);
        out.element_type = Some(Box::new(element));
        out
    }

    pub(crate) fn any(header: Header) -> Self {
        Self::with_type(header, shape::ANY.to_owned())
    }

    pub(crate) fn object(header: Header, properties: Vec<TypeDescriptor>) -> Self {
        let mut out = Self::with_type(header, shape::OBJECT.to_owned());
        out.properties = properties;
        out
    }

    /// Name used when this descriptor is the parameter of `Array<…>` or
    /// `Dictionary<…>`: reference target, then rendered type, then `any`.
    pub fn element_name(&self) -> &str {
        match &self.target {
            Some(target) if !target.is_empty() => target.as_str(),
            _ if !self.ts_type.is_empty() => self.ts_type.as_str(),
            _ => shape::ANY,
        }
    }

    /// Mark this descriptor as the property `name` of an enclosing object.
    /// Nullability follows the parent's required list.
    pub(crate) fn attach(&mut self, name: &str, is_required: bool) {
        self.name = Some(name.to_owned());
        self.is_required = Some(is_required);
        self.is_nullable = !is_required;
    }

    /// Derive the discriminator flags from the rendered type name.
    pub(crate) fn finish(mut self) -> Self {
        let ts = self.ts_type.as_str();
        self.is_ref = ts == shape::REF;
        self.is_object = ts == shape::OBJECT;
        // prefix, not substring: `Array<Dictionary<X>>` is only an array, and
        // an enum literal such as `"Array<x>"` is neither
        self.is_array = ts.starts_with(shape::ARRAY_OPEN);
        self.is_dictionary = ts.starts_with(shape::DICTIONARY_OPEN);
        self.is_atomic = self.is_atomic
            || matches!(ts, "string" | "number" | "boolean")
            || ts == shape::ANY;
        self
    }
}

/// JSON text of an enum literal; whole floats render like `JSON.stringify`
/// (`1.0` → `1`).
fn literal(value: &Value) -> String {
    match value.as_f64().filter(|_| value.is_f64()) {
        Some(f) if f == 0.0 => "0".to_owned(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        _ => value.to_string(),
    }
}

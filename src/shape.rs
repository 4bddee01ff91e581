// Shape classification. Decides which branch a node takes before any recursion.

use serde_json::Value;
use crate::schema::Node;

/// Rendered names the template layer tests against.
pub const REF: &str = "ref";
pub const OBJECT: &str = "object";
pub const ANY: &str = "any";
pub const ARRAY_OPEN: &str = "Array<";
pub const DICTIONARY_OPEN: &str = "Dictionary<";

/// Rendered name of an `enum: []`, which admits no value.
pub const NEVER: &str = "never";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,   // `number` and `integer` alike
    Boolean,
}

impl Primitive {
    pub fn ts_name(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
        }
    }

    fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Primitive::String),
            "number" | "integer" => Some(Primitive::Number),
            "boolean" => Some(Primitive::Boolean),
            _ => None,
        }
    }
}

/// One per resolver branch, in precedence order.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    /// `schema` indirection; the outer node is dropped.
    Wrapper(Node<'a>),
    Reference { target: &'a str },
    Enum(&'a [Value]),
    Primitive(Primitive),
    Array { items: Node<'a> },
    Dictionary { values: Node<'a> },
    /// Loosely specified fragment: `minItems` + `title` on a non-reference.
    Any,
    /// Fallthrough, including `allOf` merges and malformed nodes.
    Object,
}

impl<'a> Shape<'a> {
    pub fn label(&self) -> &'static str {
        match self {
            Shape::Wrapper(_) => "wrapper",
            Shape::Reference { .. } => "ref",
            Shape::Enum(_) => "enum",
            Shape::Primitive(_) => "primitive",
            Shape::Array { .. } => "array",
            Shape::Dictionary { .. } => "dictionary",
            Shape::Any => "any",
            Shape::Object => "object",
        }
    }
}

/// First matching rule wins; the order below is load-bearing.
pub fn classify(node: Node<'_>) -> Shape<'_> {
    if let Some(inner) = node.wrapped() {
        return Shape::Wrapper(inner);
    }
    if let Some(reference) = node.reference() {
        return Shape::Reference { target: crate::schema::last_segment(reference) };
    }
    if let Some(values) = node.enum_values() {
        return Shape::Enum(values);
    }
    if let Some(primitive) = node.type_name().and_then(Primitive::from_type_name) {
        return Shape::Primitive(primitive);
    }
    if node.is_type("array") {
        return Shape::Array { items: node.items() };
    }
    if node.is_type("object") {
        if let Some(values) = node.additional_properties() {
            return Shape::Dictionary { values };
        }
    }
    // only a non-string `$ref` can still be present here
    let loose = node.min_items().is_some_and(|n| n >= 0.0)
        && node.has("title")
        && !node.has("$ref");
    if loose {
        return Shape::Any;
    }
    Shape::Object
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn label_of(v: serde_json::Value) -> &'static str {
        classify(Node::new(&v)).label()
    }

    #[test]
    fn wrapper_beats_everything() {
        let v = json!({ "schema": { "type": "string" }, "$ref": "#/definitions/X", "enum": ["a"] });
        assert_eq!(label_of(v), "wrapper");
    }

    #[test]
    fn reference_beats_enum_and_type() {
        assert_eq!(label_of(json!({ "$ref": "#/definitions/X", "enum": ["a"], "type": "string" })), "ref");
    }

    #[test]
    fn enum_ignores_declared_type() {
        assert_eq!(label_of(json!({ "type": "integer", "enum": [1, 2] })), "enum");
        assert_eq!(label_of(json!({ "type": "array", "enum": [] })), "enum");
    }

    #[test]
    fn integer_is_number() {
        let v = json!({ "type": "integer" });
        assert!(matches!(classify(Node::new(&v)), Shape::Primitive(Primitive::Number)));
    }

    #[test]
    fn additional_properties_needs_object_type() {
        assert_eq!(label_of(json!({ "type": "object", "additionalProperties": { "type": "string" } })), "dictionary");
        assert_eq!(label_of(json!({ "additionalProperties": { "type": "string" } })), "object");
    }

    #[test]
    fn loose_fragment_needs_min_items_and_title() {
        assert_eq!(label_of(json!({ "type": "object", "title": "T", "minItems": 0 })), "any");
        assert_eq!(label_of(json!({ "title": "T", "minItems": 2 })), "any");
        assert_eq!(label_of(json!({ "title": "T", "minItems": -1 })), "object");
        assert_eq!(label_of(json!({ "title": "T" })), "object");
        assert_eq!(label_of(json!({ "minItems": 1 })), "object");
        assert_eq!(label_of(json!({ "$ref": 5, "title": "T", "minItems": 0 })), "object");
    }

    #[test]
    fn unknown_type_falls_through_to_object() {
        assert_eq!(label_of(json!({ "type": "file" })), "object");
        assert_eq!(label_of(json!(true)), "object");
    }
}

//! Read-only views over untyped schema nodes and the definition context.
//!
//! Schema fragments arrive as plain `serde_json::Value` trees. Which fields are
//! *present* decides how a node is classified, so every accessor here checks the
//! JSON shape of the field and treats a mismatch (e.g. `"enum": 3`) the same as
//! absence. Nothing in this module allocates or copies the underlying tree.
use serde_json::{Map, Value};

// ————————————————————————————————————————————————————————————————————————————
// NODE
// ————————————————————————————————————————————————————————————————————————————

/// A borrowed schema fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node<'a>(&'a Value);

/// Stand-in for a missing nested node (e.g. an array without `items`).
static EMPTY: Value = Value::Null;

impl Node<'static> {
    /// A node with no fields at all.
    pub fn empty() -> Self { Node(&EMPTY) }
}

impl<'a> Node<'a> {
    pub fn new(value: &'a Value) -> Self { Self(value) }

    pub fn value(&self) -> &'a Value { self.0 }

    fn field(&self, key: &str) -> Option<&'a Value> {
        self.0.as_object()?.get(key)
    }

    /// Key present, whatever its value.
    pub fn has(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    pub fn str_field(&self, key: &str) -> Option<&'a str> {
        self.field(key)?.as_str()
    }

    /// `true` only for a literal JSON `true`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.field(key), Some(Value::Bool(true)))
    }

    /// The `schema` wrapper target, if the key is present.
    pub fn wrapped(&self) -> Option<Node<'a>> {
        self.field("schema").map(Node)
    }

    /// `$ref`, when it is a string.
    pub fn reference(&self) -> Option<&'a str> {
        self.str_field("$ref")
    }

    pub fn enum_values(&self) -> Option<&'a [Value]> {
        self.field("enum")?.as_array().map(Vec::as_slice)
    }

    pub fn type_name(&self) -> Option<&'a str> {
        self.str_field("type")
    }

    pub fn is_type(&self, name: &str) -> bool {
        self.type_name() == Some(name)
    }

    /// `items`, or an empty node when the array declares none.
    pub fn items(&self) -> Node<'a> {
        self.field("items").map(Node).unwrap_or(Node(&EMPTY))
    }

    /// `additionalProperties` when present. `true`/`false` are kept as nodes;
    /// they carry no fields and so resolve to the generic object shape.
    pub fn additional_properties(&self) -> Option<Node<'a>> {
        self.field("additionalProperties").map(Node)
    }

    pub fn properties(&self) -> Option<&'a Map<String, Value>> {
        self.field("properties")?.as_object()
    }

    /// Names listed in a `required` array; non-string entries are skipped.
    pub fn required_names(&self) -> Vec<&'a str> {
        match self.field("required") {
            Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether `required` is set to anything truthy. Parameters use a boolean
    /// here, object schemas an array of names; both count as "required".
    pub fn required_flag(&self) -> bool {
        match self.field("required") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|x| x != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        }
    }

    pub fn all_of(&self) -> &'a [Value] {
        self.field("allOf")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn description(&self) -> Option<&'a str> {
        self.str_field("description")
    }

    pub fn min_items(&self) -> Option<f64> {
        self.field("minItems")?.as_f64()
    }
}

/// Segment after the last `/` of a JSON pointer such as `#/definitions/Pet`.
pub fn last_segment(reference: &str) -> &str {
    match reference.rfind('/') {
        Some(ix) => &reference[ix + 1..],
        None => reference,
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CONTEXT
// ————————————————————————————————————————————————————————————————————————————

/// Named definitions available to `allOf` merges.
///
/// Entries are kept as an ordered list rather than a map: lookups scan every
/// entry and yield all that share a name.
#[derive(Debug, Clone, Default)]
pub struct Context<'a> {
    entries: Vec<(&'a str, &'a Value)>,
}

impl<'a> Context<'a> {
    pub fn empty() -> Self { Self::default() }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        Self { entries: entries.into_iter().collect() }
    }

    /// Context built from a document's top-level `definitions` object.
    pub fn from_document(document: &'a Value) -> Self {
        match document.get("definitions").and_then(Value::as_object) {
            Some(definitions) => Self::from_definitions(definitions),
            None => Self::empty(),
        }
    }

    pub fn from_definitions(definitions: &'a Map<String, Value>) -> Self {
        Self::from_entries(definitions.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + '_ {
        self.entries.iter().copied()
    }

    /// Every definition registered under `name`, in registration order.
    pub fn matching<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'a Value> + 's {
        self.entries
            .iter()
            .filter(move |(entry, _)| *entry == name)
            .map(|(_, value)| *value)
    }

    /// First definition registered under `name`.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.matching(name).next()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mismatched_field_shapes_read_as_absent() {
        let v = json!({ "enum": 3, "$ref": 7, "allOf": {}, "properties": [] });
        let node = Node::new(&v);
        assert!(node.enum_values().is_none());
        assert!(node.reference().is_none());
        assert!(node.all_of().is_empty());
        assert!(node.properties().is_none());
    }

    #[test]
    fn required_flag_follows_truthiness() {
        assert!(Node::new(&json!({ "required": true })).required_flag());
        assert!(Node::new(&json!({ "required": [] })).required_flag());
        assert!(!Node::new(&json!({ "required": false })).required_flag());
        assert!(!Node::new(&json!({ "required": "" })).required_flag());
        assert!(!Node::new(&json!({})).required_flag());
    }

    #[test]
    fn required_names_skip_non_strings() {
        let v = json!({ "required": ["a", 1, "b", null] });
        assert_eq!(Node::new(&v).required_names(), vec!["a", "b"]);
    }

    #[test]
    fn missing_items_is_an_empty_node() {
        let v = json!({ "type": "array" });
        let items = Node::new(&v).items();
        assert!(items.type_name().is_none());
        assert!(!items.has("properties"));
    }

    #[test]
    fn last_segment_of_pointer() {
        assert_eq!(last_segment("#/definitions/Pet"), "Pet");
        assert_eq!(last_segment("Pet"), "Pet");
        assert_eq!(last_segment("#/definitions/"), "");
    }

    #[test]
    fn context_matching_yields_every_duplicate() {
        let a = json!({ "title": "first" });
        let b = json!({ "title": "other" });
        let c = json!({ "title": "second" });
        let ctx = Context::from_entries([("Base", &a), ("Other", &b), ("Base", &c)]);
        let found: Vec<_> = ctx.matching("Base").collect();
        assert_eq!(found, vec![&a, &c]);
        assert_eq!(ctx.get("Base"), Some(&a));
        assert_eq!(ctx.get("Missing"), None);
    }

    #[test]
    fn context_from_document_keeps_declaration_order() {
        let doc = json!({ "definitions": { "Zeta": {}, "Alpha": {}, "Mid": {} } });
        let ctx = Context::from_document(&doc);
        let names: Vec<_> = ctx.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }
}

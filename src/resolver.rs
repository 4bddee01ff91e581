//! Schema node → [`TypeDescriptor`].
//!
//! Pure and recursive: the node and the definition context are only read, and
//! every call builds a fresh descriptor. The only state carried through the
//! recursion is the current depth and the chain of definitions being merged
//! through `allOf`, both used to refuse cyclic or runaway input.
use serde_json::Value;
use thiserror::Error;

use crate::descriptor::{Header, TypeDescriptor};
use crate::schema::{Context, Node, last_segment};
use crate::shape::{Shape, classify};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Deepest nesting (wrappers, items, properties, merges) accepted.
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("cyclic allOf merge: {}", chain.join(" -> "))]
    CyclicSchema { chain: Vec<String> },
    #[error("schema nesting exceeds the maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },
}

pub struct Resolver<'c, 'a> {
    context: &'c Context<'a>,
    options: ResolveOptions,
}

/// Per-call recursion bookkeeping.
#[derive(Default)]
struct Walk {
    depth: usize,
    merging: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// API
// ————————————————————————————————————————————————————————————————————————————

/// Resolve `node` against `context` with default options.
pub fn resolve(node: &Value, context: &Context<'_>) -> Result<TypeDescriptor, ResolveError> {
    Resolver::new(context).resolve(node)
}

impl<'c, 'a> Resolver<'c, 'a> {
    pub fn new(context: &'c Context<'a>) -> Self {
        Self { context, options: ResolveOptions::default() }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn resolve(&self, node: &Value) -> Result<TypeDescriptor, ResolveError> {
        let mut walk = Walk::default();
        self.resolve_node(Node::new(node), &mut walk)
    }

    /// Resolve the definition registered under `name`, if any. When several
    /// entries share the name the first one wins.
    pub fn resolve_definition(&self, name: &str) -> Option<Result<TypeDescriptor, ResolveError>> {
        let definition = self.context.get(name)?;
        Some(self.resolve_named(name, definition))
    }

    /// Resolve `node` as the definition `name`, so that an `allOf` leading
    /// back to `name` is reported as a cycle.
    pub fn resolve_named(&self, name: &str, node: &Value) -> Result<TypeDescriptor, ResolveError> {
        let mut walk = Walk::default();
        walk.merging.push(name.to_owned());
        self.resolve_node(Node::new(node), &mut walk)
    }

    // ————————————————————————————————————————————————————————————————————————
    // INTERNALS
    // ————————————————————————————————————————————————————————————————————————

    fn resolve_node(&self, node: Node<'_>, walk: &mut Walk) -> Result<TypeDescriptor, ResolveError> {
        if walk.depth >= self.options.max_depth {
            return Err(ResolveError::DepthExceeded { max_depth: self.options.max_depth });
        }
        walk.depth += 1;
        let out = self.resolve_shape(node, walk);
        walk.depth -= 1;
        out
    }

    fn resolve_shape(&self, node: Node<'_>, walk: &mut Walk) -> Result<TypeDescriptor, ResolveError> {
        // captured before the shape is known; a wrapper throws it away
        let header = Header::of(node);
        let shape = classify(node);
        tracing::trace!(shape = shape.label(), depth = walk.depth, "classified schema node");

        let descriptor = match shape {
            Shape::Wrapper(inner) => return self.resolve_node(inner, walk),
            Shape::Reference { target } => TypeDescriptor::reference(header, target),
            Shape::Enum(values) => TypeDescriptor::enumeration(header, values),
            Shape::Primitive(primitive) => TypeDescriptor::primitive(header, primitive),
            Shape::Array { items } => {
                let element = self.resolve_node(items, walk)?;
                TypeDescriptor::array(header, element)
            }
            Shape::Dictionary { values } => {
                let element = self.resolve_node(values, walk)?;
                TypeDescriptor::dictionary(header, element)
            }
            Shape::Any => TypeDescriptor::any(header),
            Shape::Object => {
                let properties = self.collect_properties(node, &header, walk)?;
                TypeDescriptor::object(header, properties)
            }
        };
        Ok(descriptor.finish())
    }

    /// `allOf` contributions first, in order, then the node's own properties.
    fn collect_properties(
        &self,
        node: Node<'_>,
        header: &Header,
        walk: &mut Walk,
    ) -> Result<Vec<TypeDescriptor>, ResolveError> {
        let mut properties = Vec::new();

        for entry in node.all_of() {
            let entry = Node::new(entry);
            match entry.reference() {
                Some(reference) => {
                    self.merge_definitions(last_segment(reference), &mut properties, walk)?;
                }
                None => {
                    let merged = self.resolve_node(entry, walk)?;
                    properties.extend(merged.properties);
                }
            }
        }

        if let Some(own) = node.properties() {
            for (name, sub) in own {
                let mut property = self.resolve_node(Node::new(sub), walk)?;
                property.attach(name, header.requires(name));
                properties.push(property);
            }
        }

        Ok(properties)
    }

    /// Splice in the properties of every definition named `name`.
    fn merge_definitions(
        &self,
        name: &str,
        properties: &mut Vec<TypeDescriptor>,
        walk: &mut Walk,
    ) -> Result<(), ResolveError> {
        if walk.merging.iter().any(|m| m == name) {
            let mut chain = walk.merging.clone();
            chain.push(name.to_owned());
            return Err(ResolveError::CyclicSchema { chain });
        }

        let mut matched = 0usize;
        walk.merging.push(name.to_owned());
        for definition in self.context.matching(name) {
            matched += 1;
            match self.resolve_node(Node::new(definition), walk) {
                Ok(base) => properties.extend(base.properties),
                Err(error) => {
                    walk.merging.pop();
                    return Err(error);
                }
            }
        }
        walk.merging.pop();

        if matched == 0 {
            tracing::warn!(definition = name, "allOf reference matches no definition; nothing merged");
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

//! Swagger 2.0 schema → flat, template-ready TypeScript type model.
//!
//! ```text
//! schema node ─> shape::classify ─> resolver ─> TypeDescriptor (flags + tsType)
//!                                       ^
//!                    definitions ───────┘ (allOf merges only)
//! ```
//!
//! The [`resolver`] is the core: a pure recursive function from a schema node
//! and its document's definitions to a [`TypeDescriptor`]. The [`document`]
//! module runs it over a whole document (definitions, parameters, responses).
//!
//! ```
//! use swagger_typespec::{resolve, schema::Context};
//!
//! let node = serde_json::json!({ "type": "array", "items": { "$ref": "#/definitions/Pet" } });
//! let ty = resolve(&node, &Context::empty()).unwrap();
//! assert_eq!(ty.ts_type, "Array<Pet>");
//! assert!(ty.is_array);
//! ```
pub mod descriptor;
pub mod document;
pub mod naming;
pub mod path_de;
pub mod resolver;
pub mod schema;
pub mod shape;

pub use descriptor::TypeDescriptor;
pub use document::{DocumentError, DocumentModel, ModelOptions, build_model, resolve_definition};
pub use resolver::{ResolveError, ResolveOptions, Resolver, resolve};
pub use schema::Context;

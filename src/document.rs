//! Document-level model: every definition and every operation of a Swagger 2.0
//! document, with each schema run through the resolver.
//!
//! This is the value a template engine receives. It never exposes the raw
//! schema nodes, only [`TypeDescriptor`]s and plain strings/flags.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::descriptor::TypeDescriptor;
use crate::naming::{camel_case, method_name};
use crate::path_de::{PathError, from_value_with_path};
use crate::resolver::{ResolveError, ResolveOptions, Resolver};
use crate::schema::{Context, Node, last_segment};

// ————————————————————————————————————————————————————————————————————————————
// OUTPUT MODEL
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `scheme://host/basePath`, or empty when any part is missing.
    pub domain: String,
    pub definitions: Vec<DefinitionModel>,
    pub methods: Vec<MethodModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionModel {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub ts_type: TypeDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodModel {
    pub path: String,
    /// Upper case verb.
    pub method: String,
    pub method_name: String,
    #[serde(rename = "isGET")]
    pub is_get: bool,
    #[serde(rename = "isPOST")]
    pub is_post: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub parameters: Vec<ParameterModel>,
    pub responses: Vec<ResponseModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_type: Option<TypeDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterModel {
    pub name: String,
    pub camel_case_name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub is_body_parameter: bool,
    pub is_path_parameter: bool,
    pub is_query_parameter: bool,
    pub is_header_parameter: bool,
    pub is_form_parameter: bool,
    pub is_singleton: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub singleton: Option<Value>,
    pub is_required: bool,
    /// `""` for required parameters, `"?"` otherwise.
    pub cardinality: &'static str,
    pub ts_type: TypeDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseModel {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub ts_type: TypeDescriptor,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelOptions {
    pub resolve: ResolveOptions,
    /// Keep parameters flagged `x-exclude-from-bindings: true`.
    pub include_excluded: bool,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unsupported document version {found:?}; expected swagger \"2.0\"")]
    UnsupportedVersion { found: Option<String> },
    #[error("malformed {location}: {source}")]
    Malformed { location: String, source: PathError },
    #[error("failed to resolve {location}: {source}")]
    Resolve { location: String, source: ResolveError },
    #[error("no definition named {name:?}")]
    UnknownDefinition { name: String },
}

// ————————————————————————————————————————————————————————————————————————————
// INPUT ENVELOPE
// ————————————————————————————————————————————————————————————————————————————

/// Verbs that produce a method; anything else under a path is ignored.
const HTTP_METHODS: &[&str] = &[
    "GET", "POST", "PUT", "DELETE", "PATCH", "COPY", "HEAD", "OPTIONS",
    "LINK", "UNLINK", "PURGE", "LOCK", "UNLOCK", "PROPFIND",
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    info: Info,
    host: Option<String>,
    base_path: Option<String>,
    #[serde(default)]
    schemes: Vec<String>,
    #[serde(default)]
    definitions: Map<String, Value>,
    #[serde(default)]
    parameters: IndexMap<String, Value>,
    #[serde(default)]
    paths: IndexMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Info {
    title: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Operation {
    operation_id: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    #[serde(default)]
    parameters: Vec<Value>,
    #[serde(default)]
    responses: IndexMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Response {
    description: Option<String>,
    schema: Option<Value>,
}

// ————————————————————————————————————————————————————————————————————————————
// API
// ————————————————————————————————————————————————————————————————————————————

/// Build the template model of a Swagger 2.0 document.
pub fn build_model(document: &Value, options: &ModelOptions) -> Result<DocumentModel, DocumentError> {
    check_version(document)?;
    let envelope: Envelope = from_value_with_path(document).map_err(|source| {
        DocumentError::Malformed { location: "document".to_owned(), source }
    })?;
    let context = Context::from_definitions(&envelope.definitions);
    let builder = Builder {
        envelope: &envelope,
        resolver: Resolver::new(&context).with_options(options.resolve),
        options,
    };

    let definitions = builder.definitions()?;
    let methods = builder.methods()?;
    tracing::debug!(
        definitions = definitions.len(),
        methods = methods.len(),
        "built document model"
    );

    Ok(DocumentModel {
        title: envelope.info.title.clone(),
        description: envelope.info.description.clone(),
        domain: builder.domain(),
        definitions,
        methods,
    })
}

/// Resolve one named definition of `document`.
pub fn resolve_definition(
    document: &Value,
    name: &str,
    options: &ResolveOptions,
) -> Result<TypeDescriptor, DocumentError> {
    let context = Context::from_document(document);
    Resolver::new(&context)
        .with_options(*options)
        .resolve_definition(name)
        .ok_or_else(|| DocumentError::UnknownDefinition { name: name.to_owned() })?
        .map_err(|source| DocumentError::Resolve { location: format!("definition {name}"), source })
}

/// Vendor extension keys (`x-...`) may sit next to paths and response codes.
fn is_extension(key: &str) -> bool {
    key.starts_with("x-")
}

fn check_version(document: &Value) -> Result<(), DocumentError> {
    match document.get("swagger") {
        Some(Value::String(v)) if v == "2.0" => Ok(()),
        Some(Value::String(v)) => Err(DocumentError::UnsupportedVersion { found: Some(v.clone()) }),
        Some(other) => Err(DocumentError::UnsupportedVersion { found: Some(other.to_string()) }),
        None => Err(DocumentError::UnsupportedVersion { found: None }),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// BUILDER
// ————————————————————————————————————————————————————————————————————————————

struct Builder<'e, 'c> {
    envelope: &'e Envelope,
    resolver: Resolver<'c, 'e>,
    options: &'c ModelOptions,
}

impl Builder<'_, '_> {
    fn domain(&self) -> String {
        let e = self.envelope;
        match (e.schemes.first(), e.host.as_deref(), e.base_path.as_deref()) {
            (Some(scheme), Some(host), Some(base)) => {
                format!("{scheme}://{host}{}", base.trim_end_matches('/'))
            }
            _ => String::new(),
        }
    }

    fn definitions(&self) -> Result<Vec<DefinitionModel>, DocumentError> {
        let mut out = Vec::with_capacity(self.envelope.definitions.len());
        for (name, definition) in &self.envelope.definitions {
            tracing::trace!(definition = %name, "resolving definition");
            let ts_type = self
                .resolver
                .resolve_named(name, definition)
                .map_err(|source| DocumentError::Resolve { location: format!("definition {name}"), source })?;
            out.push(DefinitionModel {
                name: name.clone(),
                description: Node::new(definition).description().map(str::to_owned),
                ts_type,
            });
        }
        Ok(out)
    }

    fn methods(&self) -> Result<Vec<MethodModel>, DocumentError> {
        let mut out = Vec::new();
        for (path, item) in &self.envelope.paths {
            let Some(item) = item.as_object().filter(|_| !is_extension(path)) else {
                continue;
            };
            let shared: &[Value] = item
                .get("parameters")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            for (verb, raw) in item {
                let upper = verb.to_uppercase();
                if !HTTP_METHODS.contains(&upper.as_str()) {
                    continue;
                }
                out.push(self.method(path, &upper, raw, shared)?);
            }
        }
        Ok(out)
    }

    fn method(
        &self,
        path: &str,
        verb: &str,
        raw: &Value,
        shared: &[Value],
    ) -> Result<MethodModel, DocumentError> {
        let location = format!("{verb} {path}");
        tracing::debug!(operation = %location, "building method");
        let operation: Operation = from_value_with_path(raw)
            .map_err(|source| DocumentError::Malformed { location: location.clone(), source })?;

        let mut parameters = Vec::new();
        for raw_parameter in operation.parameters.iter().chain(shared) {
            if let Some(parameter) = self.parameter(raw_parameter, &location)? {
                parameters.push(parameter);
            }
        }

        let mut responses = Vec::new();
        for (code, raw_response) in &operation.responses {
            if is_extension(code) || !raw_response.is_object() {
                continue;
            }
            let response: Response = from_value_with_path(raw_response).map_err(|source| {
                DocumentError::Malformed { location: format!("{location} response {code}"), source }
            })?;
            let Some(schema) = &response.schema else { continue };
            let ts_type = self.resolver.resolve(schema).map_err(|source| DocumentError::Resolve {
                location: format!("{location} response {code}"),
                source,
            })?;
            responses.push(ResponseModel {
                code: code.clone(),
                description: response.description,
                ts_type,
            });
        }
        let success_type = responses
            .iter()
            .find(|r| r.code.starts_with('2'))
            .or_else(|| responses.iter().find(|r| r.code == "default"))
            .map(|r| r.ts_type.clone());

        Ok(MethodModel {
            path: path.to_owned(),
            method: verb.to_owned(),
            method_name: method_name(verb, path, operation.operation_id.as_deref()),
            is_get: verb == "GET",
            is_post: verb == "POST",
            summary: operation.description.or(operation.summary),
            parameters,
            responses,
            success_type,
        })
    }

    /// `None` when the parameter is skipped (unknown `$ref`, excluded from bindings).
    fn parameter(&self, raw: &Value, location: &str) -> Result<Option<ParameterModel>, DocumentError> {
        let node = match Node::new(raw).reference() {
            None => Node::new(raw),
            Some(reference) => match self.envelope.parameters.get(last_segment(reference)) {
                Some(shared) => Node::new(shared),
                None => {
                    tracing::warn!(operation = location, parameter = reference, "unknown parameter reference; skipped");
                    return Ok(None);
                }
            },
        };

        if node.flag("x-exclude-from-bindings") && !self.options.include_excluded {
            tracing::debug!(operation = location, parameter = ?node.str_field("name"), "parameter excluded from bindings");
            return Ok(None);
        }

        let name = node.str_field("name").unwrap_or_default().to_owned();
        let location_in = node.str_field("in").unwrap_or_default().to_owned();
        let singleton = node
            .enum_values()
            .filter(|values| values.len() == 1)
            .map(|values| values[0].clone());
        let is_required = node.required_flag();
        let ts_type = self.resolver.resolve(node.value()).map_err(|source| DocumentError::Resolve {
            location: format!("{location} parameter {name}"),
            source,
        })?;

        Ok(Some(ParameterModel {
            camel_case_name: camel_case(&name),
            is_body_parameter: location_in == "body",
            is_path_parameter: location_in == "path",
            is_query_parameter: location_in == "query",
            is_header_parameter: location_in == "header",
            is_form_parameter: location_in == "formData",
            is_singleton: singleton.is_some(),
            singleton,
            is_required,
            cardinality: if is_required { "" } else { "?" },
            ts_type,
            name,
            location: location_in,
        }))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

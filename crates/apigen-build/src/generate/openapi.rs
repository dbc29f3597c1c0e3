//! OpenAPI document extraction from a route map.
//!
//! A route map is the dump of a web framework's URL-to-controller table:
//!
//! ```yaml
//! service_type: compute
//! version: '2.1'
//! routes:
//!   - path: /v2.1/servers/{server_id}/action
//!     method: post
//!     action: _action_start
//!     action_name: os-start
//!     request_schema: {type: object, properties: {os-start: {type: 'null'}}}
//!     status: 202
//! ```
//!
//! Routes sharing a `(path, method)` pair become one operation: action
//! routes are combined into an action-discriminated `oneOf`, versioned
//! routes into a microversion-discriminated one.

use std::path::Path;

use apigen_core::spec::{
    Extensions, MediaType, Operation, PathItem, RequestBody, Response, SchemaType, MEDIA_JSON,
    X_OPENSTACK,
};
use apigen_core::{Method, Parameter, ParameterLocation, Spec, TypeSchema};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{Language, RenderedFile};
use crate::error::Result;
use crate::resource::is_version_segment;

/// Route map of one service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteMap {
    /// Service type (`compute`).
    pub service_type: String,
    /// API version (`2.1`, `v3`).
    pub version: String,
    /// Routes in declaration order.
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// One route of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Path template.
    pub path: String,
    /// HTTP method.
    pub method: Method,
    /// Controller action handling the route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Server action dispatched through the body (`os-start`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,
    /// Body validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_schema: Option<TypeSchema>,
    /// Response validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<TypeSchema>,
    /// First microversion served.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
    /// Last microversion served.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_version: Option<String>,
    /// Success status code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Human-written prose merged into operations, keyed by operation id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProseFile {
    /// Prose per operation id.
    #[serde(default)]
    pub operations: IndexMap<String, OperationProse>,
}

/// Prose of one operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationProse {
    /// Summary line.
    #[serde(default)]
    pub summary: Option<String>,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Parameter descriptions keyed by parameter name.
    #[serde(default)]
    pub parameters: IndexMap<String, String>,
}

impl RouteMap {
    /// Load a route map (YAML or JSON).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml_ng::from_str(&content)?)
    }

    /// Major API version (`2.1` → `2`, `v3` → `3`).
    #[must_use]
    pub fn major_version(&self) -> &str {
        let version = self.version.trim_start_matches('v');
        version.split('.').next().unwrap_or(version)
    }
}

impl ProseFile {
    /// Load a prose file (YAML or JSON).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml_ng::from_str(&content)?)
    }
}

/// Operation id of a route: the path without its version segment, holes
/// unbraced, followed by `:` and the method (`servers/id:get`).
#[must_use]
pub fn operation_id(path: &str, method: Method) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .enumerate()
        .filter(|(index, s)| !(*index == 0 && is_version_segment(s)))
        .map(|(_, s)| s.trim_start_matches('{').trim_end_matches('}'))
        .collect();
    let stem = if segments.is_empty() {
        "root".to_string()
    } else {
        segments.join("/")
    };
    format!("{stem}:{}", method.as_str())
}

/// Build the OpenAPI document of a route map.
#[must_use]
pub fn extract(map: &RouteMap, prose: Option<&ProseFile>) -> Spec {
    let mut groups: IndexMap<(String, Method), Vec<&Route>> = IndexMap::new();
    for route in &map.routes {
        groups
            .entry((normalize_path(&route.path), route.method))
            .or_default()
            .push(route);
    }

    let mut paths: IndexMap<String, PathItem> = IndexMap::new();
    for ((path, method), routes) in groups {
        let id = operation_id(&path, method);
        let prose = prose.and_then(|p| p.operations.get(&id));
        let operation = build_operation(&path, &id, &routes, prose);
        tracing::debug!(operation_id = %id, routes = routes.len(), "extracted operation");
        *paths.entry(path).or_default().operation_mut(method) = Some(operation);
    }

    Spec {
        openapi: "3.1.0".to_string(),
        info: json!({
            "title": map.service_type,
            "version": map.version,
        }),
        paths,
        ..Spec::default()
    }
}

/// Extract and render the document as `<service>/v<major>.yaml`.
///
/// # Errors
///
/// Returns a serialization error.
pub fn render(map: &RouteMap, prose: Option<&ProseFile>) -> Result<RenderedFile> {
    let spec = extract(map, prose);
    let contents = serde_yaml_ng::to_string(&spec)?;
    Ok(RenderedFile::new(
        format!(
            "{}/v{}.yaml",
            crate::naming::module_name(&map.service_type),
            map.major_version()
        ),
        Language::Yaml,
        contents,
    ))
}

fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn build_operation(
    path: &str,
    id: &str,
    routes: &[&Route],
    prose: Option<&OperationProse>,
) -> Operation {
    let parameters = path
        .split('/')
        .filter_map(|s| s.strip_prefix('{')?.strip_suffix('}'))
        .map(|name| Parameter {
            name: name.to_string(),
            location: ParameterLocation::Path,
            description: prose.and_then(|p| p.parameters.get(name).cloned()),
            required: true,
            style: None,
            explode: None,
            schema: Some(TypeSchema::of_type("string")),
            extensions: Extensions::default(),
        })
        .collect();

    let mut extensions = Extensions::default();
    if let [route] = routes {
        if route.action_name.is_none() {
            if let Some(min) = &route.min_version {
                set_openstack(&mut extensions, "min-ver", json!(min));
            }
            if let Some(max) = &route.max_version {
                set_openstack(&mut extensions, "max-ver", json!(max));
            }
        }
    }
    let controllers: Vec<&str> = routes.iter().filter_map(|r| r.action.as_deref()).collect();
    if let [controller] = controllers.as_slice() {
        set_openstack(&mut extensions, "controller", json!(controller));
    }

    let request_body = request_schema(routes).map(|schema| RequestBody {
        content: IndexMap::from([(MEDIA_JSON.to_string(), json_media(schema))]),
        required: true,
        ..RequestBody::default()
    });

    let response_schema = response_schema(routes);
    let status = routes
        .iter()
        .find_map(|r| r.status)
        .unwrap_or(if response_schema.is_some() { 200 } else { 204 });
    let response = Response {
        description: Some(status_description(status).to_string()),
        content: response_schema
            .map(|schema| IndexMap::from([(MEDIA_JSON.to_string(), json_media(schema))]))
            .unwrap_or_default(),
        ..Response::default()
    };

    Operation {
        operation_id: Some(id.to_string()),
        summary: prose.and_then(|p| p.summary.clone()),
        description: prose.and_then(|p| p.description.clone()),
        parameters,
        request_body,
        responses: IndexMap::from([(status.to_string(), response)]),
        extensions,
        ..Operation::default()
    }
}

fn request_schema(routes: &[&Route]) -> Option<TypeSchema> {
    let with_schema: Vec<(&Route, &TypeSchema)> = routes
        .iter()
        .filter_map(|r| Some((*r, r.request_schema.as_ref()?)))
        .collect();

    if with_schema.iter().any(|(r, _)| r.action_name.is_some()) {
        let branches = with_schema
            .iter()
            .map(|(route, schema)| {
                let mut branch = versioned_branch(route, schema);
                if let Some(name) = &route.action_name {
                    set_openstack(&mut branch.extensions, "action-name", json!(name));
                }
                branch
            })
            .collect();
        return Some(union(branches, "action"));
    }
    combine(&with_schema)
}

fn response_schema(routes: &[&Route]) -> Option<TypeSchema> {
    let with_schema: Vec<(&Route, &TypeSchema)> = routes
        .iter()
        .filter_map(|r| Some((*r, r.response_schema.as_ref()?)))
        .collect();
    combine(&with_schema)
}

/// One schema as-is; distinct schemas as a microversion union.
fn combine(with_schema: &[(&Route, &TypeSchema)]) -> Option<TypeSchema> {
    let mut distinct: Vec<&(&Route, &TypeSchema)> = Vec::new();
    for entry in with_schema {
        if !distinct.iter().any(|(_, seen)| *seen == entry.1) {
            distinct.push(entry);
        }
    }
    match distinct.as_slice() {
        [] => None,
        [(_, schema)] => Some((*schema).clone()),
        _ => Some(union(
            distinct
                .iter()
                .map(|(route, schema)| versioned_branch(route, schema))
                .collect(),
            "microversion",
        )),
    }
}

fn versioned_branch(route: &Route, schema: &TypeSchema) -> TypeSchema {
    let mut branch = schema.clone();
    if let Some(min) = &route.min_version {
        set_openstack(&mut branch.extensions, "min-ver", json!(min));
    }
    if let Some(max) = &route.max_version {
        set_openstack(&mut branch.extensions, "max-ver", json!(max));
    }
    branch
}

fn union(branches: Vec<TypeSchema>, discriminator: &str) -> TypeSchema {
    let mut schema = TypeSchema {
        one_of: branches,
        ..TypeSchema::default()
    };
    if branches_are_objects(&schema.one_of) {
        schema.schema_type = Some(SchemaType::Single("object".to_string()));
    }
    set_openstack(&mut schema.extensions, "discriminator", json!(discriminator));
    schema
}

fn branches_are_objects(branches: &[TypeSchema]) -> bool {
    branches.iter().all(TypeSchema::is_object)
}

fn json_media(schema: TypeSchema) -> MediaType {
    MediaType {
        schema: Some(schema),
        ..MediaType::default()
    }
}

fn set_openstack(extensions: &mut Extensions, key: &str, value: Value) {
    let entry = extensions
        .entry(X_OPENSTACK.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(map) = entry {
        map.insert(key.to_string(), value);
    }
}

fn status_description(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        _ => "Success",
    }
}

//! In-memory OpenAPI document model.
//!
//! Only the fields the generators consume are typed. Everything else
//! (vendor `x-*` keys included) lands in a flattened `extensions` bag on the
//! owning object, so a loaded document keeps unknown fields verbatim.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Vendor extension key carrying OpenStack-specific annotations.
pub const X_OPENSTACK: &str = "x-openstack";

/// `application/json`
pub const MEDIA_JSON: &str = "application/json";
/// Raw binary payload.
pub const MEDIA_OCTET_STREAM: &str = "application/octet-stream";
/// RFC 6902 JSON patch.
pub const MEDIA_JSON_PATCH: &str = "application/json-patch+json";
/// Image service flavor of JSON patch, preferred when offered.
pub const MEDIA_IMAGES_JSON_PATCH: &str = "application/openstack-images-v2.1-json-patch";

/// Extension bag: unknown and vendor (`x-*`) keys, in document order.
pub type Extensions = IndexMap<String, Value>;

/// Root OpenAPI document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    /// OpenAPI version string (e.g. `3.1.0`).
    pub openapi: String,

    /// Free-form `info` object.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub info: Value,

    /// Path templates in document order.
    pub paths: IndexMap<String, PathItem>,

    /// Reusable components.
    #[serde(default, skip_serializing_if = "Components::is_empty")]
    pub components: Components,

    /// Unknown and vendor keys.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A path template and the operations defined on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// Parameters shared by every operation of this path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    /// `GET` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// `PUT` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// `POST` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// `DELETE` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// `PATCH` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// `HEAD` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// `OPTIONS` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// `TRACE` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,

    /// Unknown and vendor keys (`summary`, `servers`, ...).
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `TRACE`
    Trace,
}

impl Method {
    /// Lowercase method name as used for path item keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Patch => "patch",
            Self::Head => "head",
            Self::Options => "options",
            Self::Trace => "trace",
        }
    }

    /// Uppercase method name as sent on the wire.
    #[must_use]
    pub fn as_upper(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PathItem {
    /// Iterate the defined operations in a fixed method order.
    pub fn operations(&self) -> impl Iterator<Item = (Method, &Operation)> {
        [
            (Method::Get, self.get.as_ref()),
            (Method::Put, self.put.as_ref()),
            (Method::Post, self.post.as_ref()),
            (Method::Delete, self.delete.as_ref()),
            (Method::Patch, self.patch.as_ref()),
            (Method::Head, self.head.as_ref()),
            (Method::Options, self.options.as_ref()),
            (Method::Trace, self.trace.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|op| (method, op)))
    }

    /// Mutable access to the slot of one method.
    pub fn operation_mut(&mut self, method: Method) -> &mut Option<Operation> {
        match method {
            Method::Get => &mut self.get,
            Method::Put => &mut self.put,
            Method::Post => &mut self.post,
            Method::Delete => &mut self.delete,
            Method::Patch => &mut self.patch,
            Method::Head => &mut self.head,
            Method::Options => &mut self.options,
            Method::Trace => &mut self.trace,
        }
    }
}

/// A single API operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Stable identity of the operation. Operations without one are skipped.
    #[serde(
        rename = "operationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub operation_id: Option<String>,

    /// One-line summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Long description (Markdown).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Grouping tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Operation-level parameters, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    /// Request body, keyed by media type.
    #[serde(
        rename = "requestBody",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub request_body: Option<RequestBody>,

    /// Responses keyed by status code string.
    #[serde(default)]
    pub responses: IndexMap<String, Response>,

    /// Unknown and vendor keys.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Operation {
    /// Media type → schema mapping of the request body, if any.
    #[must_use]
    pub fn request_content(&self) -> Option<&IndexMap<String, MediaType>> {
        self.request_body.as_ref().map(|body| &body.content)
    }

    /// First 2xx response, in document order.
    #[must_use]
    pub fn success_response(&self) -> Option<(&str, &Response)> {
        self.responses
            .iter()
            .find(|(code, _)| code.starts_with('2'))
            .map(|(code, response)| (code.as_str(), response))
    }

    /// `x-openstack` vendor object of the operation.
    #[must_use]
    pub fn openstack(&self) -> Option<&Map<String, Value>> {
        self.extensions.get(X_OPENSTACK).and_then(Value::as_object)
    }
}

/// Request body object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Body description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Schemas keyed by media type.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,

    /// Whether the body is mandatory.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    /// Unknown and vendor keys.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Media type object (`content.<type>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Payload schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TypeSchema>,

    /// Unknown and vendor keys (`example`, `examples`, ...).
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Response object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Response headers by name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Header>,

    /// Response payload schemas keyed by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    /// Unknown and vendor keys.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Header object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Header description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Header value schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TypeSchema>,

    /// Unknown and vendor keys.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// `{name}` segment of the path template.
    Path,
    /// URL query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
        })
    }
}

/// Parameter object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Wire name.
    pub name: String,

    /// Location (`in`).
    #[serde(rename = "in")]
    pub location: ParameterLocation,

    /// Parameter description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the parameter is mandatory. Path parameters always are.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    /// Serialization style (`form`, `simple`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    /// Whether arrays/objects explode into repeated keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    /// Value schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TypeSchema>,

    /// Unknown and vendor keys.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Parameter {
    /// Whether an array value is sent as one comma-separated query value.
    ///
    /// `style` defaults to `form` for query parameters and `explode`
    /// defaults to `true` for `form`, so only an explicit `explode: false`
    /// yields a comma-separated list.
    #[must_use]
    pub fn is_comma_separated(&self) -> bool {
        self.location == ParameterLocation::Query
            && self.style.as_deref().unwrap_or("form") == "form"
            && self.explode == Some(false)
    }
}

/// Reusable components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Named schemas.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, TypeSchema>,

    /// Named parameters.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Parameter>,

    /// Named headers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Header>,

    /// Other component sections (`responses`, `securitySchemes`, ...).
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Components {
    /// Whether no component of any kind is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
            && self.parameters.is_empty()
            && self.headers.is_empty()
            && self.extensions.is_empty()
    }
}

/// `type` keyword: a single primitive or a list of primitives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `type: string`
    Single(String),
    /// `type: [string, "null"]`
    Multiple(Vec<String>),
}

/// `additionalProperties` keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` / `false`.
    Allowed(bool),
    /// Schema every extra property must satisfy.
    Schema(Box<TypeSchema>),
}

/// JSON Schema node as used by OpenAPI.
///
/// After loading, every local `$ref` is materialized in place. The only
/// `reference` values left are forward references that close a cycle;
/// consumers resolve them by name through [`Spec::get_component_schema`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeSchema {
    /// Unresolved `$ref` (cycle back-edge or external document).
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Primary type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    /// Format hint (`date-time`, `uuid`, `int64`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Array item schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<TypeSchema>>,

    /// Object properties in document order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, TypeSchema>,

    /// Names of mandatory properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// OpenAPI 3.0 nullability flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// Extra object properties.
    #[serde(
        rename = "additionalProperties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,

    /// Exactly-one-of branches.
    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<TypeSchema>,

    /// Any-of branches.
    #[serde(rename = "anyOf", default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<TypeSchema>,

    /// All-of branches (merged before lowering).
    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<TypeSchema>,

    /// Allowed values.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    /// Regex constraint for strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Maximum string length.
    #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    /// Minimum string length.
    #[serde(rename = "minLength", default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    /// Server-assigned, never sent by clients.
    #[serde(rename = "readOnly", default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    /// Unknown and vendor keys, retained verbatim.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl TypeSchema {
    /// Schema with a single primary type.
    #[must_use]
    pub fn of_type(ty: &str) -> Self {
        Self {
            schema_type: Some(SchemaType::Single(ty.to_string())),
            ..Self::default()
        }
    }

    /// Every type named by `type`, `null` included.
    #[must_use]
    pub fn types(&self) -> Vec<&str> {
        match &self.schema_type {
            None => Vec::new(),
            Some(SchemaType::Single(ty)) => vec![ty.as_str()],
            Some(SchemaType::Multiple(types)) => types.iter().map(String::as_str).collect(),
        }
    }

    /// Types other than `null`.
    #[must_use]
    pub fn non_null_types(&self) -> Vec<&str> {
        self.types().into_iter().filter(|ty| *ty != "null").collect()
    }

    /// Whether the value may be `null` (`nullable: true` or a `null` type).
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable == Some(true) || self.types().contains(&"null")
    }

    /// Whether the schema describes an object (explicitly or by having properties).
    #[must_use]
    pub fn is_object(&self) -> bool {
        self.non_null_types() == ["object"]
            || (self.schema_type.is_none() && !self.properties.is_empty())
    }

    /// Whether the schema describes an array.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.non_null_types() == ["array"] || (self.schema_type.is_none() && self.items.is_some())
    }

    /// Whether `name` is listed as a required property.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// `x-openstack` vendor object of this schema.
    #[must_use]
    pub fn openstack(&self) -> Option<&Map<String, Value>> {
        self.extensions.get(X_OPENSTACK).and_then(Value::as_object)
    }

    /// String value of one `x-openstack` key (`discriminator`, `min-ver`, ...).
    #[must_use]
    pub fn openstack_str(&self, key: &str) -> Option<&str> {
        self.openstack()?.get(key)?.as_str()
    }

    /// Component name of a leftover `#/components/schemas/<name>` reference.
    #[must_use]
    pub fn reference_name(&self) -> Option<&str> {
        self.reference
            .as_deref()?
            .strip_prefix("#/components/schemas/")
    }
}

/// Location of one operation inside a [`Spec`].
#[derive(Debug, Clone, Copy)]
pub struct OperationRef<'a> {
    /// Path template owning the operation.
    pub path: &'a str,
    /// HTTP method.
    pub method: Method,
    /// Path item (for path-level parameters and sibling methods).
    pub path_item: &'a PathItem,
    /// The operation itself.
    pub operation: &'a Operation,
}

impl OperationRef<'_> {
    /// Path-level parameters followed by operation-level parameters.
    ///
    /// An operation-level parameter overrides a path-level one with the same
    /// name and location.
    #[must_use]
    pub fn parameters(&self) -> Vec<&Parameter> {
        let mut params: Vec<&Parameter> = self
            .path_item
            .parameters
            .iter()
            .filter(|shared| {
                !self
                    .operation
                    .parameters
                    .iter()
                    .any(|p| p.name == shared.name && p.location == shared.location)
            })
            .collect();
        params.extend(self.operation.parameters.iter());
        params
    }
}

impl Spec {
    /// Iterate every operation as `(path, method, path item, operation)`.
    pub fn operations(&self) -> impl Iterator<Item = OperationRef<'_>> {
        self.paths.iter().flat_map(|(path, item)| {
            item.operations().map(move |(method, operation)| OperationRef {
                path,
                method,
                path_item: item,
                operation,
            })
        })
    }

    /// Locate an operation by its `operationId`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationNotFound`] if no operation carries that id.
    pub fn find_operation(&self, operation_id: &str) -> Result<OperationRef<'_>> {
        self.operations()
            .find(|op| op.operation.operation_id.as_deref() == Some(operation_id))
            .ok_or_else(|| Error::OperationNotFound {
                operation_id: operation_id.to_string(),
            })
    }

    /// Named schema from `components.schemas`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ComponentNotFound`] if the schema does not exist.
    pub fn get_component_schema(&self, name: &str) -> Result<&TypeSchema> {
        self.components
            .schemas
            .get(name)
            .ok_or_else(|| Error::ComponentNotFound {
                kind: "schemas",
                name: name.to_string(),
            })
    }

    /// Named parameter from `components.parameters`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ComponentNotFound`] if the parameter does not exist.
    pub fn get_component_parameter(&self, name: &str) -> Result<&Parameter> {
        self.components
            .parameters
            .get(name)
            .ok_or_else(|| Error::ComponentNotFound {
                kind: "parameters",
                name: name.to_string(),
            })
    }

    /// Whether another path extends `path` with a parameter segment
    /// (`<path>/{...}`), which makes `path` a collection.
    #[must_use]
    pub fn has_child_item(&self, path: &str) -> bool {
        has_child_item(self.paths.keys().map(String::as_str), path)
    }
}

/// Whether any of `siblings` is `path` followed by a `/{` parameter segment.
pub fn has_child_item<'a>(siblings: impl IntoIterator<Item = &'a str>, path: &str) -> bool {
    let prefix = format!("{}/{{", path.trim_end_matches('/'));
    siblings.into_iter().any(|p| p.starts_with(&prefix))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Spec {
        serde_yaml_ng::from_str(indoc! {r"
            openapi: 3.1.0
            info:
              title: Compute
            paths:
              /v2/servers:
                get:
                  operationId: servers:list
                  responses:
                    '200':
                      description: OK
              /v2/servers/{id}:
                parameters:
                  - name: id
                    in: path
                    required: true
                    schema:
                      type: string
                get:
                  operationId: servers:show
                  x-openstack:
                    min-ver: '2.1'
                  responses:
                    '200':
                      description: OK
                delete:
                  operationId: servers:delete
                  responses:
                    '204':
                      description: Gone
            x-tagGroups: []
        "})
        .unwrap()
    }

    #[test]
    fn find_operation_returns_location() {
        let spec = sample();
        let op = spec.find_operation("servers:show").unwrap();
        assert_eq!(op.path, "/v2/servers/{id}");
        assert_eq!(op.method, Method::Get);
        assert_eq!(op.parameters().len(), 1);
        assert_eq!(
            op.operation.openstack().unwrap()["min-ver"],
            Value::String("2.1".to_string())
        );
    }

    #[test]
    fn find_operation_missing_id_errors() {
        let spec = sample();
        let err = spec.find_operation("servers:nope").unwrap_err();
        assert!(matches!(err, Error::OperationNotFound { .. }));
    }

    #[test]
    fn unknown_keys_are_retained() {
        let spec = sample();
        assert!(spec.extensions.contains_key("x-tagGroups"));
        let out = serde_yaml_ng::to_string(&spec).unwrap();
        assert!(out.contains("x-tagGroups"));
    }

    #[test]
    fn operations_iterate_in_document_order() {
        let spec = sample();
        let ids: Vec<_> = spec
            .operations()
            .filter_map(|op| op.operation.operation_id.as_deref())
            .collect();
        assert_eq!(ids, vec!["servers:list", "servers:show", "servers:delete"]);
    }

    #[test]
    fn operation_parameter_overrides_path_parameter() {
        let mut spec = sample();
        let item = spec.paths.get_mut("/v2/servers/{id}").unwrap();
        let mut own = item.parameters[0].clone();
        own.description = Some("own".to_string());
        item.get.as_mut().unwrap().parameters.push(own);

        let op = spec.find_operation("servers:show").unwrap();
        let params = op.parameters();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].description.as_deref(), Some("own"));
    }

    #[test]
    fn nullable_detection() {
        let schema: TypeSchema = serde_yaml_ng::from_str("type: [string, 'null']").unwrap();
        assert!(schema.is_nullable());
        assert_eq!(schema.non_null_types(), vec!["string"]);

        let schema: TypeSchema = serde_yaml_ng::from_str("type: string\nnullable: true").unwrap();
        assert!(schema.is_nullable());
    }

    #[test]
    fn comma_separated_query_parameter() {
        let param: Parameter = serde_yaml_ng::from_str(indoc! {"
            name: tags
            in: query
            style: form
            explode: false
            schema:
              type: array
              items:
                type: string
        "})
        .unwrap();
        assert!(param.is_comma_separated());

        let exploded = Parameter {
            explode: None,
            ..param
        };
        assert!(!exploded.is_comma_separated());
    }

    #[test]
    fn child_item_detection() {
        let spec = sample();
        assert!(spec.has_child_item("/v2/servers"));
        assert!(!spec.has_child_item("/v2/servers/{id}"));
    }
}

//! Per-target generators.
//!
//! Operation-level targets (`sdk`, `cli`) implement [`OperationGenerator`]
//! and receive one [`OperationRequest`] per `(resource, operation)` pair.
//! Resource-level targets (`jsonschema`, `osc`, `ansible`) implement
//! [`ResourceGenerator`] and work from a [`ResourceDescriptor`]. The
//! `openapi-spec` and `metadata` targets produce whole documents and are
//! plain functions ([`openapi::extract`], [`metadata::synthesize`]).
//!
//! Generators never touch the filesystem: they return [`RenderedFile`]s with
//! paths relative to the target's output root.

pub mod ansible;
pub mod cli;
pub mod jsonschema;
pub mod metadata;
pub mod openapi;
pub mod osc;
pub mod sdk;
pub mod verbs;

use std::path::PathBuf;

use apigen_core::spec::{MEDIA_IMAGES_JSON_PATCH, MEDIA_JSON_PATCH, MEDIA_OCTET_STREAM};
use apigen_core::{
    Method, OperationKind, OperationRef, ResourceId, Spec, TargetKind, TargetParams, TypeSchema,
};

use crate::classify::{classify_operation, Classification};
use crate::descriptor::ResourceDescriptor;
use crate::error::{GenerateError, Result};
use crate::naming;
use crate::resource::{locate_resource_schema, path_version};

/// Language of a rendered file, used to pick an external formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// Rust source.
    Rust,
    /// Python source.
    Python,
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

/// A module emitted into the SDK or CLI tree, for the module index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EmittedFile {
    /// Directory segments below the target root.
    pub module_path: Vec<String>,
    /// File stem.
    pub module_name: String,
    /// Path relative to the target root.
    pub source_path: PathBuf,
}

impl EmittedFile {
    /// Record for `<module_path...>/<module_name>.rs`.
    #[must_use]
    pub fn rust(module_path: Vec<String>, module_name: String) -> Self {
        let mut source_path: PathBuf = module_path.iter().collect();
        source_path.push(format!("{module_name}.rs"));
        Self {
            module_path,
            module_name,
            source_path,
        }
    }
}

/// One output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Path relative to the target's output root.
    pub path: PathBuf,
    /// File contents.
    pub contents: String,
    /// Language of the contents.
    pub language: Language,
    /// Module record, for files that take part in the module index.
    pub module: Option<EmittedFile>,
}

impl RenderedFile {
    /// A Rust module taking part in the module index.
    #[must_use]
    pub fn module(module: EmittedFile, contents: String) -> Self {
        Self {
            path: module.source_path.clone(),
            contents,
            language: Language::Rust,
            module: Some(module),
        }
    }

    /// A standalone file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, language: Language, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
            language,
            module: None,
        }
    }
}

/// Generation request for one operation of one resource.
#[derive(Debug, Clone)]
pub struct OperationRequest<'a> {
    /// Spec owning the operation.
    pub spec: &'a Spec,
    /// Resource the operation belongs to.
    pub resource: ResourceId,
    /// `operationId` to generate.
    pub operation_id: String,
    /// Key of the operation in the metadata (`list`, `start`, ...).
    pub operation_key: Option<String>,
    /// Kind recorded in the metadata.
    pub operation_kind: Option<OperationKind>,
    /// API version of the resource (`v2`).
    pub api_version: Option<String>,
    /// Target parameters.
    pub params: TargetParams,
}

impl<'a> OperationRequest<'a> {
    /// Request for `operation_id` of `resource` with default parameters.
    #[must_use]
    pub fn new(spec: &'a Spec, resource: ResourceId, operation_id: &str) -> Self {
        Self {
            spec,
            resource,
            operation_id: operation_id.to_string(),
            operation_key: None,
            operation_kind: None,
            api_version: None,
            params: TargetParams::default(),
        }
    }

    /// Set the metadata key of the operation.
    #[must_use]
    pub fn operation_key(mut self, key: &str) -> Self {
        self.operation_key = Some(key.to_string());
        self
    }

    /// Set the kind recorded in the metadata.
    #[must_use]
    pub fn operation_kind(mut self, kind: Option<OperationKind>) -> Self {
        self.operation_kind = kind;
        self
    }

    /// Set the API version of the resource.
    #[must_use]
    pub fn api_version(mut self, version: Option<&str>) -> Self {
        self.api_version = version.map(ToString::to_string);
        self
    }

    /// Set the target parameters.
    #[must_use]
    pub fn params(mut self, params: TargetParams) -> Self {
        self.params = params;
        self
    }

    /// Locate the operation in the OpenAPI document.
    ///
    /// # Errors
    ///
    /// Returns a core `OperationNotFound` error if the id is absent.
    pub fn operation(&self) -> Result<OperationRef<'a>> {
        Ok(self.spec.find_operation(&self.operation_id)?)
    }

    /// Effective kind: target override, then metadata, then the classifier.
    #[must_use]
    pub fn kind(&self, op: &OperationRef<'_>) -> OperationKind {
        if let Some(kind) = &self.params.operation_type {
            return kind.clone();
        }
        if let Some(kind) = &self.operation_kind {
            return kind.clone();
        }
        match classify_operation(self.spec, op) {
            Classification::Kind(kind) => kind,
            Classification::Skip(reason) => {
                tracing::debug!(operation_id = %self.operation_id, %reason, "unclassified operation");
                OperationKind::from(
                    self.operation_key
                        .clone()
                        .unwrap_or_else(|| op.method.as_str().to_string()),
                )
            }
        }
    }

    /// API version: metadata, then the path's version segment, then `v1`.
    #[must_use]
    pub fn version(&self, op: &OperationRef<'_>) -> String {
        self.api_version
            .clone()
            .or_else(|| path_version(op.path).map(ToString::to_string))
            .unwrap_or_else(|| "v1".to_string())
    }

    /// Module directory: the `module_path` override, else
    /// `<service>/<version>/<resource segments>`.
    #[must_use]
    pub fn module_path(&self, op: &OperationRef<'_>) -> Vec<String> {
        if let Some(path) = &self.params.module_path {
            return path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(naming::module_name)
                .collect();
        }
        let mut path = vec![
            naming::module_name(&self.resource.service_type),
            naming::module_name(&self.version(op)),
        ];
        path.extend(self.resource.segments().map(naming::module_name));
        path
    }

    /// Module (file) name: the `module_name` override, else the metadata
    /// key, else the kind.
    #[must_use]
    pub fn module_name(&self, kind: &OperationKind) -> String {
        self.params
            .module_name
            .clone()
            .or_else(|| self.operation_key.clone())
            .map_or_else(|| naming::module_name(kind.as_str()), |n| naming::module_name(&n))
    }
}

/// Generator invoked once per operation.
pub trait OperationGenerator {
    /// Target served.
    fn target(&self) -> TargetKind;

    /// Render the files of one operation.
    ///
    /// # Errors
    ///
    /// Returns any lowering, media-type or lookup error met while rendering.
    fn generate(&self, request: &OperationRequest<'_>) -> Result<Vec<RenderedFile>>;
}

/// Generation request for one resource class.
#[derive(Debug, Clone, Copy)]
pub struct ResourceRequest<'a> {
    /// Service type (`compute`).
    pub service_type: &'a str,
    /// API version (`v2`).
    pub api_version: &'a str,
    /// Resource descriptor.
    pub descriptor: &'a ResourceDescriptor,
}

/// Generator invoked once per resource class.
pub trait ResourceGenerator {
    /// Target served.
    fn target(&self) -> TargetKind;

    /// Render the files of one resource.
    ///
    /// # Errors
    ///
    /// Returns serialization errors of emitted documents.
    fn generate(&self, request: &ResourceRequest<'_>) -> Result<Vec<RenderedFile>>;
}

/// How an operation's request body travels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RequestMedia<'a> {
    /// No body.
    Empty,
    /// JSON body with an optional schema.
    Json(Option<&'a TypeSchema>),
    /// JSON patch document in the given media type.
    Patch(&'static str),
    /// Raw bytes.
    Binary,
}

/// Pick the request media type of an operation.
///
/// `patch` operations accept the images patch type first, then the standard
/// JSON patch type. Other operations take the first JSON media type, then
/// `application/octet-stream`.
pub(crate) fn request_media<'a>(
    op: &OperationRef<'a>,
    operation_id: &str,
) -> Result<RequestMedia<'a>> {
    let Some(content) = op.operation.request_content().filter(|c| !c.is_empty()) else {
        return Ok(RequestMedia::Empty);
    };
    let unsupported = || GenerateError::UnsupportedMediaType {
        operation_id: operation_id.to_string(),
        media_types: content.keys().cloned().collect(),
    };

    if op.method == Method::Patch {
        return [MEDIA_IMAGES_JSON_PATCH, MEDIA_JSON_PATCH]
            .into_iter()
            .find(|media| content.contains_key(*media))
            .map(RequestMedia::Patch)
            .ok_or_else(unsupported);
    }
    if let Some((_, media)) = content.iter().find(|(name, _)| is_json(name)) {
        return Ok(RequestMedia::Json(media.schema.as_ref()));
    }
    if content.contains_key(MEDIA_OCTET_STREAM) {
        return Ok(RequestMedia::Binary);
    }
    Err(unsupported())
}

/// JSON schema of the first success response, if any.
pub(crate) fn response_schema<'a>(op: &OperationRef<'a>) -> Option<&'a TypeSchema> {
    let (_, response) = op.operation.success_response()?;
    response
        .content
        .iter()
        .find(|(name, _)| is_json(name))
        .and_then(|(_, media)| media.schema.as_ref())
}

pub(crate) fn is_json(media_type: &str) -> bool {
    media_type == apigen_core::spec::MEDIA_JSON || media_type.ends_with("+json")
}

/// Name of an action branch: its `action-name` tag, else its sole
/// property in kebab case.
#[must_use]
pub fn action_name(branch: &TypeSchema) -> Option<String> {
    if let Some(name) = branch.openstack_str("action-name") {
        return Some(name.to_string());
    }
    match branch.properties.keys().collect::<Vec<_>>().as_slice() {
        [sole] => Some(naming::kebab(sole)),
        _ => None,
    }
}

/// Branches of a body union, `null` branches excluded.
pub(crate) fn union_branches(schema: &TypeSchema) -> Vec<&TypeSchema> {
    let branches = if schema.one_of.is_empty() {
        &schema.any_of
    } else {
        &schema.one_of
    };
    branches
        .iter()
        .filter(|branch| branch.types() != ["null"])
        .collect()
}

/// One concrete emission of an operation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Variant<'a> {
    /// File stem.
    pub module_name: String,
    /// JSON body schema of this variant.
    pub body: Option<&'a TypeSchema>,
    /// Minimum microversion.
    pub microversion: Option<String>,
    /// Action name, for action branches.
    pub action: Option<String>,
}

/// Split an operation into variants by its JSON body.
///
/// A microversion-discriminated union yields one variant per branch named
/// `<base>_<version without dots>`. An action-discriminated union yields one
/// variant per action, restricted to `operation_name` when set. Any other
/// union yields one variant per branch suffixed by its `min-ver` or index.
pub(crate) fn variants<'a>(
    body: Option<&'a TypeSchema>,
    base: &str,
    operation_name: Option<&str>,
    operation_min_version: Option<&str>,
) -> Vec<Variant<'a>> {
    let single = |body| {
        vec![Variant {
            module_name: base.to_string(),
            body,
            microversion: operation_min_version.map(ToString::to_string),
            action: None,
        }]
    };
    let Some(schema) = body else {
        return single(None);
    };
    let branches = union_branches(schema);
    if branches.len() < 2 {
        return single(Some(schema));
    }

    match schema.openstack_str("discriminator") {
        Some("microversion") => branches
            .into_iter()
            .enumerate()
            .map(|(index, branch)| {
                let version = branch.openstack_str("min-ver").map(ToString::to_string);
                let suffix = version
                    .as_deref()
                    .map_or_else(|| index.to_string(), naming::microversion_suffix);
                Variant {
                    module_name: format!("{base}_{suffix}"),
                    body: Some(branch),
                    microversion: version,
                    action: None,
                }
            })
            .collect(),
        Some("action") => branches
            .into_iter()
            .filter_map(|branch| {
                let action = action_name(branch)?;
                let module_name = match operation_name {
                    Some(wanted) if naming::module_name(wanted) != naming::module_name(&action) => {
                        return None
                    }
                    Some(_) => base.to_string(),
                    None => naming::module_name(&action),
                };
                Some(Variant {
                    module_name,
                    body: Some(branch),
                    microversion: branch
                        .openstack_str("min-ver")
                        .or(operation_min_version)
                        .map(ToString::to_string),
                    action: Some(action),
                })
            })
            .collect(),
        _ => branches
            .into_iter()
            .enumerate()
            .map(|(index, branch)| {
                let version = branch.openstack_str("min-ver").map(ToString::to_string);
                let suffix = version
                    .as_deref()
                    .map_or_else(|| index.to_string(), naming::microversion_suffix);
                Variant {
                    module_name: format!("{base}_{suffix}"),
                    body: Some(branch),
                    microversion: version,
                    action: None,
                }
            })
            .collect(),
    }
}

/// Resource object of a variant's body and the property wrapping it.
///
/// An action branch with one property is unwrapped by that property
/// (`{"os-start": ...}`); other bodies go through the resource locator.
pub(crate) fn variant_body<'a>(
    variant: &Variant<'a>,
    resource_leaf: &str,
) -> Option<(&'a TypeSchema, Option<&'a str>)> {
    let schema = variant.body?;
    if variant.action.is_some() && schema.properties.len() == 1 {
        if let Some((name, inner)) = schema.properties.first() {
            return Some((inner, Some(name.as_str())));
        }
    }
    let located = locate_resource_schema(schema, resource_leaf);
    Some((located.schema, located.key))
}

/// `"2.19"` → `Some((2, 19))`.
pub(crate) fn parse_microversion(version: &str) -> Option<(u32, u32)> {
    let (major, minor) = version.split_once('.')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}

/// `///` doc lines for `text` at the given indentation.
pub(crate) fn doc_lines(text: Option<&str>, indent: &str) -> String {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return String::new();
    };
    text.lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                format!("{indent}///\n")
            } else {
                format!("{indent}/// {line}\n")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use apigen_core::parse_spec;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn schema(yaml: &str) -> TypeSchema {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    fn spec() -> Spec {
        parse_spec(indoc! {"
            openapi: 3.1.0
            paths:
              /v2/servers:
                get:
                  operationId: servers:get
                  responses:
                    '200':
                      description: OK
              /v2/servers/{id}:
                get:
                  operationId: servers/id:get
                  responses:
                    '200':
                      description: OK
        "})
        .unwrap()
    }

    #[test]
    fn request_defaults_come_from_the_path() {
        let spec = spec();
        let request = OperationRequest::new(&spec, ResourceId::new("compute", "servers"), "servers:get");
        let op = request.operation().unwrap();
        assert_eq!(request.kind(&op), OperationKind::List);
        assert_eq!(request.version(&op), "v2");
        assert_eq!(request.module_path(&op), vec!["compute", "v2", "servers"]);
        assert_eq!(request.module_name(&OperationKind::List), "list");
    }

    #[test]
    fn overrides_win() {
        let spec = spec();
        let request = OperationRequest::new(&spec, ResourceId::new("compute", "servers"), "servers/id:get")
            .operation_key("get")
            .params(TargetParams {
                operation_type: Some(OperationKind::Find),
                module_path: Some("compute/v2/server".to_string()),
                ..TargetParams::default()
            });
        let op = request.operation().unwrap();
        assert_eq!(request.kind(&op), OperationKind::Find);
        assert_eq!(request.module_path(&op), vec!["compute", "v2", "server"]);
        assert_eq!(request.module_name(&OperationKind::Find), "get");
    }

    #[test]
    fn microversion_variants_are_suffixed() {
        let body = schema(indoc! {"
            oneOf:
              - {type: object, x-openstack: {min-ver: '2.1'}}
              - {type: object, x-openstack: {min-ver: '2.47'}}
            x-openstack:
              discriminator: microversion
        "});
        let names: Vec<_> = variants(Some(&body), "create", None, None)
            .into_iter()
            .map(|v| (v.module_name, v.microversion))
            .collect();
        assert_eq!(
            names,
            vec![
                ("create_21".to_string(), Some("2.1".to_string())),
                ("create_247".to_string(), Some("2.47".to_string())),
            ]
        );
    }

    #[test]
    fn action_variants_follow_action_names() {
        let body = schema(indoc! {"
            oneOf:
              - type: object
                properties:
                  os-start: {type: 'null'}
                x-openstack: {action-name: start}
              - type: object
                properties:
                  os-stop: {type: 'null'}
                x-openstack: {action-name: stop}
              - type: object
                properties:
                  createBackup: {type: object}
            x-openstack:
              discriminator: action
        "});
        let all: Vec<_> = variants(Some(&body), "action", None, None)
            .into_iter()
            .map(|v| v.module_name)
            .collect();
        assert_eq!(all, vec!["start", "stop", "create_backup"]);

        let picked = variants(Some(&body), "stop", Some("stop"), None);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].action.as_deref(), Some("stop"));
    }

    #[test]
    fn undiscriminated_union_is_not_treated_as_actions() {
        let body = schema(indoc! {"
            oneOf:
              - type: object
                properties:
                  os-start: {type: 'null'}
              - type: object
                properties:
                  os-stop: {type: 'null'}
        "});
        let names: Vec<_> = variants(Some(&body), "action", None, None)
            .into_iter()
            .map(|v| (v.module_name, v.action))
            .collect();
        assert_eq!(
            names,
            vec![("action_0".to_string(), None), ("action_1".to_string(), None)]
        );
    }

    #[test]
    fn patch_media_preference() {
        let spec = parse_spec(indoc! {"
            openapi: 3.1.0
            paths:
              /v2/images/{id}:
                patch:
                  operationId: images/id:patch
                  requestBody:
                    content:
                      application/json-patch+json: {}
                      application/openstack-images-v2.1-json-patch: {}
                  responses:
                    '200':
                      description: OK
              /v2/images/{id}/file:
                patch:
                  operationId: images/id/file:patch
                  requestBody:
                    content:
                      text/plain: {}
                  responses:
                    '204':
                      description: OK
        "})
        .unwrap();
        let op = spec.find_operation("images/id:patch").unwrap();
        assert_eq!(
            request_media(&op, "images/id:patch").unwrap(),
            RequestMedia::Patch(MEDIA_IMAGES_JSON_PATCH)
        );
        let op = spec.find_operation("images/id/file:patch").unwrap();
        assert!(matches!(
            request_media(&op, "images/id/file:patch"),
            Err(GenerateError::UnsupportedMediaType { .. })
        ));
    }

    #[test]
    fn microversions_parse() {
        assert_eq!(parse_microversion("2.19"), Some((2, 19)));
        assert_eq!(parse_microversion("latest"), None);
    }

    #[test]
    fn doc_lines_keep_paragraphs() {
        assert_eq!(
            doc_lines(Some("First.\n\nSecond.\n"), "    "),
            "    /// First.\n    ///\n    /// Second.\n"
        );
        assert_eq!(doc_lines(None, ""), "");
    }
}

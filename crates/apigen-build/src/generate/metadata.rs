//! Default metadata synthesized from a spec.
//!
//! Every classified operation gets an entry keyed by its kind under the
//! resource derived from its path, with `sdk` and `cli` targets. Composite
//! action endpoints are split into one entry per action. A resource having
//! both `list` and `show` also gets an SDK-only `find`.

use apigen_core::{
    Metadata, OperationKind, OperationMetadata, OperationRef, ResourceId, ResourceMetadata, Spec,
    TargetKind, TargetParams,
};
use indexmap::IndexMap;

use super::{is_json, response_schema, variant_body, variants, Variant};
use crate::classify::{classify_operation, Classification};
use crate::error::{GenerateError, Result};
use crate::naming;
use crate::resource::{locate_resource_schema, path_version, resource_name};

/// Build the metadata of every operation in `spec`.
///
/// `spec_file` is recorded on each resource as given. Without `api_version`
/// each resource takes the version segment of its first path.
///
/// # Errors
///
/// Returns [`GenerateError::OperationNameConflict`] when two operations of
/// one resource map to the same key.
pub fn synthesize(
    spec: &Spec,
    service_type: &str,
    spec_file: &str,
    api_version: Option<&str>,
) -> Result<Metadata> {
    let mut resources: IndexMap<String, ResourceMetadata> = IndexMap::new();

    for op in spec.operations() {
        let Some(operation_id) = op.operation.operation_id.as_deref() else {
            tracing::debug!(path = op.path, method = %op.method, "operation without id skipped");
            continue;
        };
        let kind = match classify_operation(spec, &op) {
            Classification::Kind(kind) => kind,
            Classification::Skip(reason) => {
                tracing::debug!(operation_id, %reason, "operation skipped");
                continue;
            }
        };
        let name = resource_name(op.path);
        if name.is_empty() {
            tracing::debug!(operation_id, "operation outside any resource skipped");
            continue;
        }
        let resource_id = ResourceId::new(service_type, &name);
        let resource = resources
            .entry(resource_id.to_string())
            .or_insert_with(|| ResourceMetadata {
                spec_file: spec_file.to_string(),
                api_version: api_version
                    .map(ToString::to_string)
                    .or_else(|| path_version(op.path).map(ToString::to_string)),
                ..ResourceMetadata::default()
            });

        for (key, entry) in entries(&op, operation_id, &kind, resource_id.leaf()) {
            insert(resource, &resource_id, key, entry)?;
        }
    }

    for (key, resource) in &mut resources {
        add_find(key, resource);
    }
    tracing::info!(
        service_type,
        resources = resources.len(),
        "synthesized metadata"
    );
    Ok(Metadata { resources })
}

fn entries(
    op: &OperationRef<'_>,
    operation_id: &str,
    kind: &OperationKind,
    leaf: &str,
) -> Vec<(String, OperationMetadata)> {
    let body = op
        .operation
        .request_content()
        .and_then(|content| content.iter().find(|(media, _)| is_json(media)))
        .and_then(|(_, media)| media.schema.as_ref());
    let response = response_schema(op).map(|schema| locate_resource_schema(schema, leaf));

    let mut common = TargetParams {
        response_key: response.and_then(|r| r.key).map(ToString::to_string),
        response_list_item_key: response
            .and_then(|r| r.list_item_key)
            .map(ToString::to_string),
        ..TargetParams::default()
    };

    let is_action_union = body.is_some_and(|b| b.openstack_str("discriminator") == Some("action"));
    if *kind == OperationKind::Action && is_action_union {
        return variants(body, kind.as_str(), None, None)
            .into_iter()
            .filter_map(|variant| {
                let action = variant.action.clone()?;
                let params = TargetParams {
                    module_name: Some(variant.module_name.clone()),
                    operation_name: Some(action),
                    request_key: request_key(&variant, leaf),
                    ..common.clone()
                };
                Some((variant.module_name.clone(), entry(operation_id, kind, &params)))
            })
            .collect();
    }

    let key = naming::module_name(kind.as_str());
    common.module_name = Some(key.clone());
    common.request_key = body
        .and_then(|schema| locate_resource_schema(schema, leaf).key)
        .map(ToString::to_string);
    vec![(key, entry(operation_id, kind, &common))]
}

fn request_key(variant: &Variant<'_>, leaf: &str) -> Option<String> {
    variant_body(variant, leaf).and_then(|(_, key)| key.map(ToString::to_string))
}

fn entry(operation_id: &str, kind: &OperationKind, params: &TargetParams) -> OperationMetadata {
    OperationMetadata {
        operation_id: operation_id.to_string(),
        operation_type: Some(kind.clone()),
        targets: IndexMap::from([
            (TargetKind::Sdk, params.clone()),
            (
                TargetKind::Cli,
                TargetParams {
                    module_name: params.module_name.clone(),
                    operation_name: params.operation_name.clone(),
                    ..TargetParams::default()
                },
            ),
        ]),
        ..OperationMetadata::default()
    }
}

fn insert(
    resource: &mut ResourceMetadata,
    resource_id: &ResourceId,
    key: String,
    entry: OperationMetadata,
) -> Result<()> {
    if let Some(existing) = resource.operations.get(&key) {
        return Err(GenerateError::OperationNameConflict {
            resource: resource_id.to_string(),
            name: key,
            first: existing.operation_id.clone(),
            second: entry.operation_id,
        });
    }
    resource.operations.insert(key, entry);
    Ok(())
}

fn add_find(resource_key: &str, resource: &mut ResourceMetadata) {
    let (Some(list), Some(show)) = (
        resource.operations.get(OperationKind::List.as_str()),
        resource.operations.get(OperationKind::Show.as_str()),
    ) else {
        return;
    };
    if resource.operations.contains_key(OperationKind::Find.as_str()) {
        return;
    }
    let params = TargetParams {
        module_name: Some(OperationKind::Find.as_str().to_string()),
        list_operation_id: Some(list.operation_id.clone()),
        ..TargetParams::default()
    };
    let find = OperationMetadata {
        operation_id: show.operation_id.clone(),
        operation_type: Some(OperationKind::Find),
        targets: IndexMap::from([(TargetKind::Sdk, params)]),
        ..OperationMetadata::default()
    };
    tracing::debug!(resource = resource_key, "added find operation");
    resource
        .operations
        .insert(OperationKind::Find.as_str().to_string(), find);
}

#[cfg(test)]
mod tests {
    use apigen_core::parse_spec;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

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
                      content:
                        application/json:
                          schema:
                            type: object
                            properties:
                              servers: {type: array, items: {type: object}}
                post:
                  operationId: servers:post
                  requestBody:
                    content:
                      application/json:
                        schema:
                          type: object
                          properties:
                            server: {type: object, properties: {name: {type: string}}}
                  responses:
                    '202':
                      description: Accepted
              /v2/servers/{id}:
                get:
                  operationId: servers/id:get
                  responses:
                    '200':
                      description: OK
                      content:
                        application/json:
                          schema:
                            type: object
                            properties:
                              server: {type: object}
                head:
                  operationId: servers/id:head
                  responses:
                    '204':
                      description: OK
              /v2/servers/{id}/action:
                post:
                  operationId: servers/id/action:post
                  requestBody:
                    content:
                      application/json:
                        schema:
                          oneOf:
                            - type: object
                              properties:
                                os-start: {type: 'null'}
                              x-openstack: {action-name: start}
                            - type: object
                              properties:
                                os-stop: {type: 'null'}
                              x-openstack: {action-name: stop}
                          x-openstack: {discriminator: action}
                  responses:
                    '202':
                      description: Accepted
        "})
        .unwrap()
    }

    #[test]
    fn operations_are_keyed_by_kind() {
        let metadata = synthesize(&spec(), "compute", "compute/v2.yaml", None).unwrap();
        let servers = &metadata.resources["compute.servers"];
        assert_eq!(servers.api_version.as_deref(), Some("v2"));
        assert_eq!(servers.spec_file, "compute/v2.yaml");
        let keys: Vec<_> = servers.operations.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["list", "create", "show", "start", "stop", "find"]);

        let list = &servers.operations["list"].targets[&TargetKind::Sdk];
        assert_eq!(list.response_key.as_deref(), Some("servers"));
        let create = &servers.operations["create"].targets[&TargetKind::Sdk];
        assert_eq!(create.request_key.as_deref(), Some("server"));
        assert!(servers.operations["create"].targets.contains_key(&TargetKind::Cli));
    }

    #[test]
    fn actions_are_split() {
        let metadata = synthesize(&spec(), "compute", "compute/v2.yaml", None).unwrap();
        let start = &metadata.resources["compute.servers"].operations["start"];
        assert_eq!(start.operation_id, "servers/id/action:post");
        assert_eq!(start.operation_type, Some(OperationKind::Action));
        let sdk = &start.targets[&TargetKind::Sdk];
        assert_eq!(sdk.operation_name.as_deref(), Some("start"));
        assert_eq!(sdk.request_key.as_deref(), Some("os-start"));
    }

    #[test]
    fn find_is_sdk_only() {
        let metadata = synthesize(&spec(), "compute", "compute/v2.yaml", None).unwrap();
        let find = &metadata.resources["compute.servers"].operations["find"];
        assert_eq!(find.operation_id, "servers/id:get");
        assert_eq!(find.targets.len(), 1);
        assert_eq!(
            find.targets[&TargetKind::Sdk].list_operation_id.as_deref(),
            Some("servers:get")
        );
    }

    #[test]
    fn duplicate_kind_is_a_conflict() {
        let spec = parse_spec(indoc! {"
            openapi: 3.1.0
            paths:
              /v2/servers/{id}:
                put:
                  operationId: servers/id:put
                  responses:
                    '200': {description: OK}
                patch:
                  operationId: servers/id:patch
                  responses:
                    '200': {description: OK}
        "})
        .unwrap();
        let err = synthesize(&spec, "compute", "compute/v2.yaml", None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "resource 'compute.servers': operations 'servers/id:put' and 'servers/id:patch' both classify as 'update'"
        );
    }

    #[test]
    fn explicit_api_version_wins() {
        let metadata = synthesize(&spec(), "compute", "compute/v2.yaml", Some("v2.1")).unwrap();
        assert_eq!(
            metadata.resources["compute.servers"].api_version.as_deref(),
            Some("v2.1")
        );
    }
}

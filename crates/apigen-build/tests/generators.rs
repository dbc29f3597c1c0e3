//! End-to-end generator behavior on small service documents.

use std::path::PathBuf;

use indoc::indoc;
use pretty_assertions::assert_eq;

use apigen_build::generate::{cli::CommandShape, sdk};
use apigen_build::lower::RustType;
use apigen_build::{
    classify, descriptor, resource_name, CliGenerator, Classification, ModuleIndexBuilder,
    OperationGenerator, OperationRequest, SdkGenerator,
};
use apigen_core::spec::MEDIA_IMAGES_JSON_PATCH;
use apigen_core::{parse_spec, Method, ResourceId, Spec, TypeSchema};

const COMPUTE: &str = indoc! {"
    openapi: 3.1.0
    info: {title: Compute, version: '2.1'}
    paths:
      /v2/servers:
        get:
          operationId: servers:get
          parameters:
            - name: tags
              in: query
              style: form
              explode: false
              schema:
                type: array
                items: {type: string}
          responses:
            '200':
              description: OK
              content:
                application/json:
                  schema:
                    type: object
                    properties:
                      servers:
                        type: array
                        items:
                          type: object
                          properties:
                            id: {type: string}
                            name: {type: string}
      /v2/servers/{id}:
        get:
          operationId: servers/id:get
          parameters:
            - {name: id, in: path, required: true, schema: {type: string}}
          responses:
            '200':
              description: OK
              content:
                application/json:
                  schema:
                    type: object
                    properties:
                      server:
                        type: object
                        properties:
                          id: {type: string}
                          name: {type: string}
                          created: {type: string, format: date-time}
      /v2/servers/{id}/action:
        post:
          operationId: servers/id/action:post
          parameters:
            - {name: id, in: path, required: true, schema: {type: string}}
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
"};

const IMAGES: &str = indoc! {"
    openapi: 3.1.0
    paths:
      /v2/images/{image_id}:
        get:
          operationId: images/image_id:get
          parameters:
            - {name: image_id, in: path, required: true, schema: {type: string}}
          responses:
            '200':
              description: OK
              content:
                application/json:
                  schema:
                    type: object
                    properties:
                      name: {type: string}
                      visibility: {type: string}
        patch:
          operationId: images/image_id:patch
          parameters:
            - {name: image_id, in: path, required: true, schema: {type: string}}
          requestBody:
            content:
              application/openstack-images-v2.1-json-patch: {}
              application/json-patch+json: {}
          responses:
            '200':
              description: OK
              content:
                application/json:
                  schema:
                    type: object
                    properties:
                      name: {type: string}
                      visibility: {type: string}
"};

const VOLUMES: &str = indoc! {"
    openapi: 3.1.0
    paths:
      /v3/volumes/{id}:
        get:
          operationId: volumes/id:get
          responses:
            '200':
              description: OK
              content:
                application/json:
                  schema:
                    type: object
                    properties:
                      volume:
                        type: object
                        properties:
                          size: {type: integer}
"};

fn spec(yaml: &str) -> Spec {
    parse_spec(yaml).unwrap()
}

fn sdk_files(spec: &Spec, service: &str, resource: &str, operation_id: &str) -> Vec<PathBuf> {
    let request = OperationRequest::new(spec, ResourceId::new(service, resource), operation_id);
    SdkGenerator
        .generate(&request)
        .unwrap()
        .into_iter()
        .map(|file| {
            syn::parse_file(&file.contents).unwrap();
            file.path
        })
        .collect()
}

#[test]
fn list_and_show_modules_with_index() {
    let spec = spec(COMPUTE);
    let mut emitted = Vec::new();
    let mut builder = ModuleIndexBuilder::new();
    for id in ["servers:get", "servers/id:get"] {
        let request = OperationRequest::new(&spec, ResourceId::new("compute", "servers"), id);
        for file in SdkGenerator.generate(&request).unwrap() {
            syn::parse_file(&file.contents).unwrap();
            emitted.push(file.path.clone());
            builder.extend(file.module.as_ref());
        }
    }
    assert_eq!(
        emitted,
        vec![
            PathBuf::from("compute/v2/servers/list.rs"),
            PathBuf::from("compute/v2/servers/show.rs"),
        ]
    );

    let index: Vec<PathBuf> = builder.build().render().into_iter().map(|f| f.path).collect();
    assert_eq!(
        index,
        vec![
            PathBuf::from("compute/mod.rs"),
            PathBuf::from("compute/v2/mod.rs"),
            PathBuf::from("compute/v2/servers/mod.rs"),
        ]
    );
}

#[test]
fn action_branches_become_modules() {
    let spec = spec(COMPUTE);
    assert_eq!(
        sdk_files(&spec, "compute", "servers", "servers/id/action:post"),
        vec![
            PathBuf::from("compute/v2/servers/start.rs"),
            PathBuf::from("compute/v2/servers/stop.rs"),
        ]
    );

    let request = OperationRequest::new(&spec, ResourceId::new("compute", "servers"), "servers/id/action:post");
    let contexts = sdk::contexts(&request).unwrap();
    assert_eq!(contexts[0].request_key.as_deref(), Some("os-start"));
    assert_eq!(contexts[1].action.as_deref(), Some("stop"));
}

#[test]
fn patch_prefers_images_media_type() {
    let spec = spec(IMAGES);
    let request =
        OperationRequest::new(&spec, ResourceId::new("image", "images"), "images/image_id:patch");
    let contexts = sdk::contexts(&request).unwrap();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].media_type.as_deref(), Some(MEDIA_IMAGES_JSON_PATCH));
    assert!(contexts[0].imports().contains(sdk::PATCH_IMPORT));
    syn::parse_file(&contexts[0].render()).unwrap();

    let cli = CliGenerator::new().contexts(&request).unwrap();
    assert_eq!(cli[0].shape, CommandShape::Patch);
    let imports = cli[0].imports();
    assert!(imports.contains("json_patch::diff"));
    assert!(imports.contains("json_patch::Patch"));
    syn::parse_file(&cli[0].render()).unwrap();
}

#[test]
fn form_array_query_is_comma_separated() {
    let spec = spec(COMPUTE);
    let request = OperationRequest::new(&spec, ResourceId::new("compute", "servers"), "servers:get");
    let contexts = sdk::contexts(&request).unwrap();
    let tags = &contexts[0].query_params[0];
    assert_eq!(tags.wire_name, "tags");
    assert!(!tags.required);
    assert_eq!(
        tags.ty,
        RustType::Option(Box::new(RustType::CommaSeparated(Box::new(RustType::String))))
    );
}

#[test]
fn wrapped_resource_sets_response_key() {
    let spec = spec(VOLUMES);
    let request = OperationRequest::new(&spec, ResourceId::new("block-storage", "volumes"), "volumes/id:get");
    let contexts = sdk::contexts(&request).unwrap();
    assert_eq!(contexts[0].response_key.as_deref(), Some("volume"));
    assert_eq!(contexts[0].url, "v3/volumes/{id}");
}

#[test]
fn cli_list_command_is_valid_rust() {
    let spec = spec(COMPUTE);
    let request = OperationRequest::new(&spec, ResourceId::new("compute", "servers"), "servers:get");
    let files = CliGenerator::new().generate(&request).unwrap();
    assert_eq!(files[0].path, PathBuf::from("compute/v2/servers/list.rs"));
    syn::parse_file(&files[0].contents).unwrap();
    assert!(files[0].contents.contains("pub struct ServersCommand"));
}

#[test]
fn classifier_is_total() {
    let paths = ["/v2/servers", "/v2/servers/{id}", "/v2/servers/detail", "/v2/servers/{id}/action", "/v2/os-hosts"];
    for path in paths {
        for method in [Method::Get, Method::Post, Method::Put, Method::Delete] {
            for has_child in [true, false] {
                match classify(path, method, has_child) {
                    Classification::Kind(kind) => assert!(!kind.as_str().is_empty(), "{method} {path}"),
                    Classification::Skip(reason) => assert!(!reason.to_string().is_empty()),
                }
            }
        }
    }
}

#[test]
fn resource_names_are_canonical() {
    let base = resource_name("/v2/servers/{id}/os-interfaces/{port_id}");
    for variant in [
        "/v2.1/servers/{id}/os-interfaces/{port_id}",
        "/servers/{server_id}/os-interfaces/{id}",
        "/v2/servers/{id}/os-interfaces/{port_id}/",
    ] {
        assert_eq!(resource_name(variant), base, "{variant}");
    }
    assert_eq!(resource_name("/v2/servers/detail"), resource_name("/v2/servers"));
}

#[test]
fn descriptor_attributes_round_trip() {
    let attributes: Vec<TypeSchema> = [
        "{type: string, format: uuid, description: Identifier}",
        "{type: integer}",
        "{type: boolean, description: Shared across projects}",
        "{type: object}",
    ]
    .into_iter()
    .map(|yaml| serde_yaml_ng::from_str(yaml).unwrap())
    .collect();
    for schema in attributes {
        let lowered = descriptor::lower_attribute(&schema, "attr").unwrap();
        assert_eq!(descriptor::from_sdk_field(&lowered), schema);
    }
}

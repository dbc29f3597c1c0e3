//! End-to-end runs of the plan executor over fixture files in a temporary
//! work directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use indoc::indoc;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use apigen::{Error, PlanExecutor, PlanRequest, ProjectConfig};
use apigen_core::TargetKind;

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
      /v3/volumes:
        get:
          operationId: volumes:get
          responses:
            '200':
              description: OK
              content:
                application/json:
                  schema:
                    type: object
                    properties:
                      volumes:
                        type: array
                        items: {type: object, properties: {id: {type: string}}}
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
                        required: [size]
                        properties:
                          id: {type: string}
                          size: {type: integer}
                          max_count: {type: string}
                          created_at: {type: string, format: date-time}
                          description:
                            oneOf:
                              - {type: string}
                              - {type: 'null'}
"};

const CYCLIC: &str = indoc! {"
    openapi: 3.1.0
    paths:
      /v1/nodes:
        post:
          operationId: nodes:post
          requestBody:
            content:
              application/json:
                schema:
                  type: object
                  properties:
                    node: {$ref: '#/components/schemas/A'}
          responses:
            '201': {description: Created}
    components:
      schemas:
        A:
          type: object
          properties:
            name: {type: string}
            child: {$ref: '#/components/schemas/B'}
        B:
          type: object
          properties:
            parent: {$ref: '#/components/schemas/A'}
"};

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative))
            .unwrap_or_else(|err| panic!("{relative}: {err}"))
    }

    fn request(&self, target: TargetKind) -> PlanRequest {
        PlanRequest {
            work_dir: self.path().to_path_buf(),
            ..PlanRequest::new(target)
        }
    }

    /// Synthesize metadata for the compute fixture, returning its path.
    fn compute_metadata(&self) -> PathBuf {
        let spec = self.file("specs/compute/v2.yaml", COMPUTE);
        let metadata = self.path().join("compute_metadata.yaml");
        executor()
            .execute(&PlanRequest {
                openapi_spec: Some(spec),
                service_type: Some("compute".to_string()),
                metadata: Some(metadata.clone()),
                ..self.request(TargetKind::Metadata)
            })
            .unwrap();
        metadata
    }
}

fn executor() -> PlanExecutor {
    PlanExecutor::new(ProjectConfig::default().without_formatters())
}

/// Every file below `root`, relative path → contents.
fn tree(root: &Path) -> BTreeMap<PathBuf, String> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let relative = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(relative, fs::read_to_string(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

#[test]
fn synthesized_metadata_names_operations_by_kind() {
    let ws = Workspace::new();
    let metadata = ws.compute_metadata();
    let content = fs::read_to_string(&metadata).unwrap();
    let parsed: apigen_core::Metadata = serde_yaml_ng::from_str(&content).unwrap();
    let servers = &parsed.resources["compute.servers"];
    assert_eq!(servers.spec_file, "specs/compute/v2.yaml");
    let keys: Vec<_> = servers.operations.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["list", "show", "start", "stop", "find"]);
}

#[test]
fn sdk_tree_has_modules_and_aggregators() {
    let ws = Workspace::new();
    let metadata = ws.compute_metadata();
    let report = executor()
        .execute(&PlanRequest {
            metadata: Some(metadata),
            ..ws.request(TargetKind::Sdk)
        })
        .unwrap();
    assert_eq!(report.formatter_failures, 0);

    let root = ws.path().join("openstack_sdk/src/api");
    let files: Vec<PathBuf> = tree(&root).into_keys().collect();
    let expected: Vec<PathBuf> = [
        "compute/mod.rs",
        "compute/v2/mod.rs",
        "compute/v2/servers/find.rs",
        "compute/v2/servers/list.rs",
        "compute/v2/servers/mod.rs",
        "compute/v2/servers/show.rs",
        "compute/v2/servers/start.rs",
        "compute/v2/servers/stop.rs",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect();
    assert_eq!(files, expected);

    assert_eq!(
        ws.read("openstack_sdk/src/api/compute/mod.rs"),
        "//! `compute` modules\n\npub mod v2;\n"
    );
    assert_eq!(
        ws.read("openstack_sdk/src/api/compute/v2/servers/mod.rs"),
        "//! `compute::v2::servers` modules\n\n\
         pub mod find;\npub mod list;\npub mod show;\npub mod start;\npub mod stop;\n"
    );
}

#[test]
fn action_branches_carry_their_request_key() {
    let ws = Workspace::new();
    let metadata = ws.compute_metadata();
    executor()
        .execute(&PlanRequest {
            metadata: Some(metadata),
            ..ws.request(TargetKind::Sdk)
        })
        .unwrap();
    assert!(ws
        .read("openstack_sdk/src/api/compute/v2/servers/start.rs")
        .contains("os-start"));
    assert!(ws
        .read("openstack_sdk/src/api/compute/v2/servers/stop.rs")
        .contains("os-stop"));
}

#[test]
fn comma_separated_query_in_list_module() {
    let ws = Workspace::new();
    let metadata = ws.compute_metadata();
    executor()
        .execute(&PlanRequest {
            metadata: Some(metadata),
            ..ws.request(TargetKind::Sdk)
        })
        .unwrap();
    let list = ws.read("openstack_sdk/src/api/compute/v2/servers/list.rs");
    assert!(list.contains("CommaSeparatedList"));
    assert!(list.contains("\"tags\""));
}

#[test]
fn resource_filter_skips_aggregators() {
    let ws = Workspace::new();
    let metadata = ws.compute_metadata();
    let report = executor()
        .execute(&PlanRequest {
            metadata: Some(metadata),
            resource: Some("servers".to_string()),
            ..ws.request(TargetKind::Sdk)
        })
        .unwrap();
    assert_eq!(report.written.len(), 5);
    assert!(report.written.iter().all(|p| p.file_name().unwrap() != "mod.rs"));
}

#[test]
fn resource_filter_matches_name_prefix() {
    let ws = Workspace::new();
    let metadata = ws.compute_metadata();
    let report = executor()
        .execute(&PlanRequest {
            metadata: Some(metadata),
            service: Some("comp".to_string()),
            resource: Some("serv".to_string()),
            ..ws.request(TargetKind::Sdk)
        })
        .unwrap();
    assert_eq!(report.written.len(), 5);
}

#[test]
fn unknown_resource_filter_fails() {
    let ws = Workspace::new();
    let metadata = ws.compute_metadata();
    let err = executor()
        .execute(&PlanRequest {
            metadata: Some(metadata),
            resource: Some("flavors".to_string()),
            ..ws.request(TargetKind::Sdk)
        })
        .unwrap_err();
    assert!(matches!(err, Error::UnknownResource { .. }));
}

#[test]
fn patch_picks_images_media_type() {
    let ws = Workspace::new();
    let spec = ws.file("specs/image/v2.yaml", IMAGES);
    for target in [TargetKind::Sdk, TargetKind::Cli] {
        executor()
            .execute(&PlanRequest {
                openapi_spec: Some(spec.clone()),
                operation_id: Some("images/image_id:patch".to_string()),
                service_type: Some("image".to_string()),
                ..ws.request(target)
            })
            .unwrap();
    }
    let sdk = ws.read("openstack_sdk/src/api/image/v2/images/update.rs");
    assert!(sdk.contains("application/openstack-images-v2.1-json-patch"));
    assert!(sdk.contains("json_patch::Patch"));

    let cli = ws.read("openstack_cli/src/image/v2/images/update.rs");
    assert!(cli.contains("use json_patch::diff;"));
    assert!(cli.contains("use json_patch::Patch;"));
}

#[test]
fn wrapped_resource_sets_response_key() {
    let ws = Workspace::new();
    let spec = ws.file("specs/block-storage/v3.yaml", VOLUMES);
    executor()
        .execute(&PlanRequest {
            openapi_spec: Some(spec),
            operation_id: Some("volumes/id:get".to_string()),
            service_type: Some("block-storage".to_string()),
            ..ws.request(TargetKind::Sdk)
        })
        .unwrap();
    let show = ws.read("openstack_sdk/src/api/block_storage/v3/volumes/show.rs");
    assert!(show.contains("Some(\"volume\".into())"));
    assert!(show.contains("\"v3/volumes/{id}\""));
}

#[test]
fn cyclic_components_terminate() {
    let ws = Workspace::new();
    let spec = ws.file("specs/baremetal/v1.yaml", CYCLIC);
    executor()
        .execute(&PlanRequest {
            openapi_spec: Some(spec),
            operation_id: Some("nodes:post".to_string()),
            service_type: Some("baremetal".to_string()),
            ..ws.request(TargetKind::Sdk)
        })
        .unwrap();
    let create = ws.read("openstack_sdk/src/api/baremetal/v1/nodes/create.rs");
    assert!(create.contains("Box<"));
}

#[test]
fn every_module_is_reachable_from_its_aggregators() {
    let ws = Workspace::new();
    let metadata = ws.compute_metadata();
    executor()
        .execute(&PlanRequest {
            metadata: Some(metadata),
            ..ws.request(TargetKind::Sdk)
        })
        .unwrap();

    let root = ws.path().join("openstack_sdk/src/api");
    let files = tree(&root);
    for path in files.keys().filter(|p| p.file_name().unwrap() != "mod.rs") {
        let mut child = path.file_stem().unwrap().to_string_lossy().to_string();
        let mut dir = path.parent().unwrap().to_path_buf();
        while !dir.as_os_str().is_empty() {
            let index = &files[&dir.join("mod.rs")];
            assert!(
                index.contains(&format!("pub mod {child};")),
                "{} does not declare {child}",
                dir.display()
            );
            child = dir.file_name().unwrap().to_string_lossy().to_string();
            dir = dir.parent().unwrap().to_path_buf();
        }
    }
}

#[test]
fn identical_input_gives_identical_output() {
    let first = Workspace::new();
    let second = Workspace::new();
    for ws in [&first, &second] {
        let metadata = ws.compute_metadata();
        for target in [TargetKind::Sdk, TargetKind::Cli] {
            executor()
                .execute(&PlanRequest {
                    metadata: Some(metadata.clone()),
                    ..ws.request(target)
                })
                .unwrap();
        }
    }
    for root in ["openstack_sdk", "openstack_cli"] {
        assert_eq!(tree(&first.path().join(root)), tree(&second.path().join(root)));
    }
}

#[test]
fn validation_reports_missing_operations() {
    let ws = Workspace::new();
    ws.file("specs/compute/v2.yaml", COMPUTE);
    let metadata = ws.file(
        "meta.yaml",
        indoc! {"
            resources:
              compute.servers:
                spec_file: specs/compute/v2.yaml
                operations:
                  list:
                    operation_id: servers:get
                    targets: {sdk: {}}
                  show:
                    operation_id: servers/id:list
                    targets: {sdk: {}}
        "},
    );
    let request = PlanRequest {
        metadata: Some(metadata),
        ..ws.request(TargetKind::Sdk)
    };
    let err = executor().validate(&request).unwrap_err();
    assert!(matches!(err, Error::Validation { failed: 1, checked: 2 }));
    assert!(!ws.path().join("openstack_sdk").exists());

    let err = executor().execute(&request).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "operation 'servers/id:list' ({})",
            ws.path().join("specs/compute/v2.yaml").display()
        )
    );
    let cause = std::error::Error::source(&err).unwrap();
    assert_eq!(cause.to_string(), "operation 'servers/id:list' not found in spec");
}

#[test]
fn failed_operation_keeps_earlier_output() {
    let ws = Workspace::new();
    ws.file("specs/compute/v2.yaml", COMPUTE);
    let metadata = ws.file(
        "meta.yaml",
        indoc! {"
            resources:
              compute.servers:
                spec_file: specs/compute/v2.yaml
                operations:
                  list:
                    operation_id: servers:get
                    targets: {sdk: {}}
                  show:
                    operation_id: servers/id:list
                    targets: {sdk: {}}
        "},
    );
    let err = executor()
        .execute(&PlanRequest {
            metadata: Some(metadata),
            ..ws.request(TargetKind::Sdk)
        })
        .unwrap_err();
    assert!(matches!(err, Error::Operation { .. }));

    let root = ws.path().join("openstack_sdk/src/api");
    assert!(root.join("compute/v2/servers/list.rs").is_file());
    assert!(!root.join("compute/v2/servers/show.rs").exists());
    assert!(!root.join("compute/mod.rs").exists());
    assert!(!root.join("compute/v2/servers/mod.rs").exists());
}

#[test]
fn jsonschema_from_metadata_derives_descriptor() {
    let ws = Workspace::new();
    ws.file("specs/block-storage/v3.yaml", VOLUMES);
    let metadata = ws.file(
        "meta.yaml",
        indoc! {"
            resources:
              block-storage.volumes:
                spec_file: specs/block-storage/v3.yaml
                api_version: v3
                operations:
                  list:
                    operation_id: volumes:get
                    targets: {jsonschema: {}}
                  show:
                    operation_id: volumes/id:get
                    targets: {jsonschema: {}}
        "},
    );
    executor()
        .execute(&PlanRequest {
            metadata: Some(metadata),
            ..ws.request(TargetKind::Jsonschema)
        })
        .unwrap();

    let schema: serde_json::Value =
        serde_json::from_str(&ws.read("schemas/block_storage/volume.json")).unwrap();
    let volume = &schema["properties"]["volume"];
    assert_eq!(volume["properties"]["size"]["type"], "integer");
    assert_eq!(volume["properties"]["max_count"]["type"], "integer");
    assert_eq!(volume["properties"]["id"]["readOnly"], true);
    assert_eq!(volume["properties"]["created_at"]["readOnly"], true);
    assert_eq!(volume["properties"]["description"]["type"], "string");
    assert_eq!(volume["required"], serde_json::json!(["size"]));
}

#[test]
fn osc_and_ansible_from_descriptor_file() {
    let ws = Workspace::new();
    let descriptors = ws.file(
        "descriptors/network.yaml",
        indoc! {"
            resources:
              Port:
                name: port
                doc: A network port.
                resource_key: port
                resources_key: ports
                allow_list: true
                allow_fetch: true
                allow_delete: true
                attributes:
                  name: {type: str, doc: Port name.}
                  admin_state_up: {type: bool}
        "},
    );
    for target in [TargetKind::Osc, TargetKind::Ansible] {
        executor()
            .execute(&PlanRequest {
                module: Some(descriptors.clone()),
                class_name: Some("Port".to_string()),
                service_type: Some("network".to_string()),
                api_version: Some("v2".to_string()),
                ..ws.request(target)
            })
            .unwrap();
    }

    let osc: Vec<PathBuf> = tree(&ws.path().join("osc")).into_keys().collect();
    assert_eq!(
        osc,
        [
            "network/v2/port/delete.py",
            "network/v2/port/list.py",
            "network/v2/port/show.py",
            "tests/unit/network/v2/port/test_delete.py",
            "tests/unit/network/v2/port/test_list.py",
            "tests/unit/network/v2/port/test_show.py",
        ]
        .into_iter()
        .map(PathBuf::from)
        .collect::<Vec<_>>()
    );
    assert!(ws
        .path()
        .join("ansible/plugins/modules/network_port_list.py")
        .exists());

    let err = executor()
        .execute(&PlanRequest {
            module: Some(descriptors),
            class_name: Some("Subnet".to_string()),
            service_type: Some("network".to_string()),
            ..ws.request(TargetKind::Osc)
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "resource descriptor 'Subnet' not found");
}

#[test]
fn route_map_becomes_openapi_document() {
    let ws = Workspace::new();
    let routes = ws.file(
        "routes/compute.yaml",
        indoc! {"
            service_type: compute
            version: '2.1'
            routes:
              - path: /v2.1/servers
                method: get
                action: index
                response_schema:
                  type: object
                  properties:
                    servers: {type: array, items: {type: object}}
              - path: /v2.1/servers/{server_id}
                method: get
                action: show
        "},
    );
    let prose = ws.file(
        "routes/compute-prose.yaml",
        indoc! {"
            operations:
              servers:get:
                summary: List Servers
        "},
    );
    executor()
        .execute(&PlanRequest {
            route_map: Some(routes),
            prose: Some(prose),
            ..ws.request(TargetKind::OpenapiSpec)
        })
        .unwrap();

    let spec = apigen_core::load_spec(&ws.path().join("openapi_specs/compute/v2.yaml")).unwrap();
    let list = spec.find_operation("servers:get").unwrap();
    assert_eq!(list.operation.summary.as_deref(), Some("List Servers"));
    let show = spec.find_operation("servers/server_id:get").unwrap();
    assert_eq!(show.parameters()[0].name, "server_id");
}

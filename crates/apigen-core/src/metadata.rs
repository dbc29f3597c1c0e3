//! Generation metadata: which operation of which resource goes to which target.
//!
//! # File format
//!
//! ```yaml
//! resources:
//!   compute.servers:
//!     spec_file: openapi_specs/compute/v2.yaml
//!     api_version: v2
//!     operations:
//!       list:
//!         operation_id: servers:list
//!         operation_type: list
//!         targets:
//!           sdk:
//!             module_name: list
//!             response_key: servers
//!           cli:
//!             module_name: list
//!       start:
//!         operation_id: servers/id/action:post
//!         operation_type: action
//!         targets:
//!           sdk:
//!             module_name: start
//!             operation_name: start
//! ```
//!
//! The model is produced by the metadata synthesizer, edited by hand, and
//! consumed read-only by the plan executor.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::kind::{OperationKind, TargetKind};

/// Root of a metadata document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Resources keyed by `<service_type>.<hierarchical/name>`.
    #[serde(default)]
    pub resources: IndexMap<String, ResourceMetadata>,
}

/// One resource and its operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    /// Spec file, relative to the metadata file's directory.
    pub spec_file: String,

    /// API version (e.g. `v2`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Operations keyed by kind or action name, in generation order.
    #[serde(default)]
    pub operations: IndexMap<String, OperationMetadata>,

    /// Free-form per-target extensions.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extensions: IndexMap<String, Value>,
}

/// One operation of a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// `operationId` in the OpenAPI document.
    pub operation_id: String,

    /// Spec file overriding the resource's, relative to the metadata file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_file: Option<String>,

    /// Abstract kind the classifier assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<OperationKind>,

    /// Per-target rendering parameters.
    #[serde(default)]
    pub targets: IndexMap<TargetKind, TargetParams>,
}

/// Per-target rendering knobs of one operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetParams {
    /// Overrides the operation kind used to pick templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<OperationKind>,

    /// Module path override (`/`-separated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_path: Option<String>,

    /// Module (file) name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,

    /// Property wrapping the request resource object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_key: Option<String>,

    /// Property wrapping the response resource object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_key: Option<String>,

    /// Property wrapping each item of a list response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_list_item_key: Option<String>,

    /// Action branch to emit for composite action operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,

    /// `list` operation backing a `find` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_operation_id: Option<String>,

    /// Unknown keys, retained verbatim.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Metadata {
    /// Load a metadata document from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml_ng::from_str(&content)?)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

/// Identity of a resource: `<service_type>.<hierarchical/name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    /// Service type (e.g. `compute`).
    pub service_type: String,
    /// Hierarchical name (e.g. `servers/os-interfaces`).
    pub name: String,
}

impl ResourceId {
    /// Build from parts.
    #[must_use]
    pub fn new(service_type: &str, name: &str) -> Self {
        Self {
            service_type: service_type.to_string(),
            name: name.to_string(),
        }
    }

    /// Parse a metadata resource key. Keys without a `.` have an empty service.
    #[must_use]
    pub fn parse(key: &str) -> Self {
        match key.split_once('.') {
            Some((service, name)) => Self::new(service, name),
            None => Self::new("", key),
        }
    }

    /// Hierarchy segments of the name.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.name.split('/').filter(|s| !s.is_empty())
    }

    /// Last segment of the name.
    #[must_use]
    pub fn leaf(&self) -> &str {
        self.segments().last().unwrap_or(self.name.as_str())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service_type, self.name)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = indoc! {"
        resources:
          compute.servers:
            spec_file: openapi_specs/compute/v2.yaml
            api_version: v2
            operations:
              list:
                operation_id: servers:list
                operation_type: list
                targets:
                  sdk:
                    module_name: list
                    response_key: servers
                  cli:
                    module_name: list
                    custom_flag: true
              start:
                operation_id: servers/id/action:post
                operation_type: action
                targets:
                  sdk:
                    operation_name: start
    "};

    #[test]
    fn deserialize_full() {
        let metadata: Metadata = serde_yaml_ng::from_str(SAMPLE).unwrap();
        let servers = &metadata.resources["compute.servers"];
        assert_eq!(servers.api_version.as_deref(), Some("v2"));

        let ops: Vec<_> = servers.operations.keys().map(String::as_str).collect();
        assert_eq!(ops, vec!["list", "start"]);

        let list = &servers.operations["list"];
        assert_eq!(list.operation_type, Some(OperationKind::List));
        let sdk = &list.targets[&TargetKind::Sdk];
        assert_eq!(sdk.response_key.as_deref(), Some("servers"));
        let cli = &list.targets[&TargetKind::Cli];
        assert_eq!(cli.extra["custom_flag"], Value::Bool(true));

        let start = &servers.operations["start"];
        assert_eq!(start.operation_type, Some(OperationKind::Action));
        assert_eq!(
            start.targets[&TargetKind::Sdk].operation_name.as_deref(),
            Some("start")
        );
    }

    #[test]
    fn yaml_round_trip_keeps_order() {
        let metadata: Metadata = serde_yaml_ng::from_str(SAMPLE).unwrap();
        let yaml = metadata.to_yaml().unwrap();
        let again: Metadata = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(metadata, again);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compute_metadata.yaml");
        std::fs::write(&path, SAMPLE).unwrap();
        let metadata = Metadata::load(&path).unwrap();
        assert_eq!(metadata.resources.len(), 1);
    }

    #[test]
    fn load_invalid_yaml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "resources: [[[invalid").unwrap();
        assert!(Metadata::load(&path).is_err());
    }

    #[test]
    fn resource_id_parsing() {
        let id = ResourceId::parse("compute.servers/os-interfaces");
        assert_eq!(id.service_type, "compute");
        assert_eq!(id.name, "servers/os-interfaces");
        assert_eq!(id.leaf(), "os-interfaces");
        assert_eq!(id.to_string(), "compute.servers/os-interfaces");
    }
}

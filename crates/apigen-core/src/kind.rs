//! Closed vocabularies shared by the metadata model and the generators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Abstract operation verb, independent of the HTTP method.
///
/// The classifier only produces the named variants, except for `PUT` on a
/// plain path, which is named after the last path segment
/// ([`OperationKind::Other`]). Action branches promoted to operations keep
/// their action name in the metadata key while their kind stays
/// [`OperationKind::Action`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationKind {
    /// `GET` on a collection.
    List,
    /// `GET` on `<collection>/detail`.
    ListDetailed,
    /// `GET` on a single item.
    Show,
    /// `POST` on a collection (or a plain path).
    Create,
    /// `PUT`/`PATCH` on a single item.
    Update,
    /// `PUT` on a collection.
    Replace,
    /// `DELETE` on a single item or a plain path.
    Delete,
    /// `DELETE` on a collection.
    DeleteAll,
    /// `POST` on `<item>/action`.
    Action,
    /// `GET` on a plain (non-collection) path.
    Get,
    /// `GET` returning a binary stream.
    Download,
    /// `PUT` sending a binary stream.
    Upload,
    /// Client-side lookup by name or id (list + show).
    Find,
    /// Any other name, e.g. the last segment of a plain `PUT` path.
    Other(String),
}

impl OperationKind {
    /// Canonical snake-case name used in metadata keys and file names.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::List => "list",
            Self::ListDetailed => "list_detailed",
            Self::Show => "show",
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
            Self::DeleteAll => "delete_all",
            Self::Action => "action",
            Self::Get => "get",
            Self::Download => "download",
            Self::Upload => "upload",
            Self::Find => "find",
            Self::Other(name) => name,
        }
    }

    /// Whether this kind returns a collection of resources.
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List | Self::ListDetailed)
    }
}

impl From<String> for OperationKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "list" => Self::List,
            "list_detailed" => Self::ListDetailed,
            "show" => Self::Show,
            "create" => Self::Create,
            "update" => Self::Update,
            "replace" => Self::Replace,
            "delete" => Self::Delete,
            "delete_all" => Self::DeleteAll,
            "action" => Self::Action,
            "get" => Self::Get,
            "download" => Self::Download,
            "upload" => Self::Upload,
            "find" => Self::Find,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for OperationKind {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<OperationKind> for String {
    fn from(value: OperationKind) -> Self {
        match value {
            OperationKind::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output channel a generator writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// Strongly typed low-level client library.
    Sdk,
    /// Command-line front-end over the SDK.
    Cli,
    /// OpenAPI document extracted from a route map.
    OpenapiSpec,
    /// Per-resource JSON Schema.
    Jsonschema,
    /// Default metadata synthesized from a spec.
    Metadata,
    /// OSC-style Python CLI commands.
    Osc,
    /// Ansible-style modules.
    Ansible,
}

impl TargetKind {
    /// All targets, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Sdk,
        Self::Cli,
        Self::OpenapiSpec,
        Self::Jsonschema,
        Self::Metadata,
        Self::Osc,
        Self::Ansible,
    ];

    /// Identifier used on the command line and in metadata files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sdk => "sdk",
            Self::Cli => "cli",
            Self::OpenapiSpec => "openapi-spec",
            Self::Jsonschema => "jsonschema",
            Self::Metadata => "metadata",
            Self::Osc => "osc",
            Self::Ansible => "ansible",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown target '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

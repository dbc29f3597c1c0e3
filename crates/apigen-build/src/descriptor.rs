//! Resource descriptors: the out-of-band description of a resource class
//! (attributes, documentation, capability flags) consumed by the JSON
//! Schema, OSC and Ansible generators.
//!
//! ```yaml
//! resources:
//!   Server:
//!     name: server
//!     doc: A virtual machine.
//!     resource_key: server
//!     resources_key: servers
//!     allow_list: true
//!     allow_fetch: true
//!     attributes:
//!       name:
//!         type: str
//!         required: true
//!       created_at:
//!         type: str
//!         format: date-time
//! ```

use std::path::Path;

use apigen_core::spec::SchemaType;
use apigen_core::{OperationKind, Spec, TypeSchema};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{GenerateError, Result};
use crate::generate::response_schema;
use crate::naming;
use crate::resource::locate_resource_schema;

/// A descriptor file: resource classes keyed by class name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptorFile {
    /// Descriptors keyed by class name.
    #[serde(default)]
    pub resources: IndexMap<String, ResourceDescriptor>,
}

/// One resource class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Resource name (`server`).
    pub name: String,

    /// Class documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    /// Property wrapping a single resource on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_key: Option<String>,

    /// Property wrapping a collection on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources_key: Option<String>,

    /// Attributes in declaration order.
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeDescriptor>,

    /// Collection can be listed.
    #[serde(default)]
    pub allow_list: bool,
    /// Single resource can be fetched.
    #[serde(default)]
    pub allow_fetch: bool,
    /// Resource can be created.
    #[serde(default)]
    pub allow_create: bool,
    /// Resource can be deleted.
    #[serde(default)]
    pub allow_delete: bool,
    /// Resource attributes can be changed.
    #[serde(default)]
    pub allow_commit: bool,
}

/// Attribute type vocabulary of descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// Text.
    Str,
    /// Integer.
    Int,
    /// Floating point.
    Float,
    /// Boolean.
    Bool,
    /// List.
    List,
    /// Mapping.
    Dict,
    /// Any JSON value (untyped or multi-type schemas).
    Raw,
}

/// One attribute of a resource class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    /// Value type.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,

    /// Format refinement (`date-time`, `uuid`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Attribute documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    /// Whether the attribute must be supplied on create.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
}

impl ResourceDescriptorFile {
    /// Load a descriptor file (YAML or JSON).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml_ng::from_str(&content)?)
    }

    /// Descriptor of a class.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::MissingResourceDescriptor`] if absent.
    pub fn get(&self, class_name: &str) -> Result<&ResourceDescriptor> {
        self.resources
            .get(class_name)
            .ok_or_else(|| GenerateError::MissingResourceDescriptor {
                name: class_name.to_string(),
            })
    }
}

impl ResourceDescriptor {
    /// Derive a descriptor from the object schema of a resource.
    ///
    /// Capability flags are left unset.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::UnsupportedType`] for a property whose type
    /// has no descriptor counterpart.
    pub fn from_schema(name: &str, schema: &TypeSchema) -> Result<Self> {
        let mut attributes = IndexMap::with_capacity(schema.properties.len());
        for (prop_name, prop) in &schema.properties {
            let mut attribute = lower_attribute(prop, prop_name)?;
            attribute.required = schema.is_required(prop_name);
            attributes.insert(prop_name.clone(), attribute);
        }
        Ok(Self {
            name: name.to_string(),
            doc: schema.description.clone(),
            attributes,
            ..Self::default()
        })
    }

    /// Derive a descriptor from the success response of a `show` operation.
    ///
    /// The resource object is unwrapped from its envelope; the envelope key
    /// becomes `resource_key` and its plural `resources_key`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::MissingResourceSchema`] when the response has
    /// no object schema, or any error of [`ResourceDescriptor::from_schema`].
    pub fn from_operation(spec: &Spec, operation_id: &str, resource_leaf: &str) -> Result<Self> {
        let op = spec.find_operation(operation_id)?;
        let missing = || GenerateError::MissingResourceSchema {
            operation_id: operation_id.to_string(),
        };
        let located = response_schema(&op)
            .map(|schema| locate_resource_schema(schema, resource_leaf))
            .filter(|located| located.schema.is_object())
            .ok_or_else(missing)?;

        let name = naming::singularize(&naming::module_name(resource_leaf));
        let mut descriptor = Self::from_schema(&name, located.schema)?;
        descriptor.resource_key = located.key.map(ToString::to_string);
        descriptor.resources_key = located.key.map(|_| naming::pluralize(&name));
        Ok(descriptor)
    }

    /// Enable the capability flags backed by the given operation kinds.
    #[must_use]
    pub fn with_capabilities<'k>(mut self, kinds: impl IntoIterator<Item = &'k OperationKind>) -> Self {
        for kind in kinds {
            match kind {
                OperationKind::List | OperationKind::ListDetailed => self.allow_list = true,
                OperationKind::Show => self.allow_fetch = true,
                OperationKind::Create => self.allow_create = true,
                OperationKind::Delete => self.allow_delete = true,
                OperationKind::Update => self.allow_commit = true,
                _ => {}
            }
        }
        self
    }
}

/// Lower a schema to a descriptor attribute.
///
/// The type, format and description are carried. A nullable type keeps its
/// non-null half, and so does a `oneOf`/`anyOf` with a single non-null
/// branch. `allOf` parts are merged first. Untyped schemas and unions of
/// several types become [`AttributeType::Raw`].
///
/// # Errors
///
/// Returns [`GenerateError::UnsupportedType`] for a single type name that
/// is not a JSON Schema primitive.
pub fn lower_attribute(schema: &TypeSchema, location: &str) -> Result<AttributeDescriptor> {
    if !schema.all_of.is_empty() {
        return lower_attribute(&merge_all_of(schema), location);
    }

    let branches = if schema.one_of.is_empty() {
        &schema.any_of
    } else {
        &schema.one_of
    };
    if !branches.is_empty() {
        let non_null: Vec<&TypeSchema> = branches
            .iter()
            .filter(|branch| branch.types() != ["null"])
            .collect();
        let mut attribute = match non_null.as_slice() {
            [single] => lower_attribute(single, location)?,
            _ => raw_attribute(schema),
        };
        if schema.description.is_some() {
            attribute.doc.clone_from(&schema.description);
        }
        return Ok(attribute);
    }

    let attr_type = match schema.non_null_types().as_slice() {
        ["string"] => AttributeType::Str,
        ["integer"] => AttributeType::Int,
        ["number"] => AttributeType::Float,
        ["boolean"] => AttributeType::Bool,
        ["array"] => AttributeType::List,
        ["object"] => AttributeType::Dict,
        [] if !schema.properties.is_empty() => AttributeType::Dict,
        [] if schema.items.is_some() => AttributeType::List,
        [] | [_, _, ..] => AttributeType::Raw,
        [other] => {
            return Err(GenerateError::UnsupportedType {
                type_name: (*other).to_string(),
                location: location.to_string(),
            })
        }
    };
    Ok(AttributeDescriptor {
        attr_type,
        format: schema.format.clone(),
        doc: schema.description.clone(),
        required: false,
    })
}

fn raw_attribute(schema: &TypeSchema) -> AttributeDescriptor {
    AttributeDescriptor {
        attr_type: AttributeType::Raw,
        format: None,
        doc: schema.description.clone(),
        required: false,
    }
}

/// Fold inline `allOf` parts into one schema. Keys set on the outer schema
/// win over the parts.
fn merge_all_of(schema: &TypeSchema) -> TypeSchema {
    let mut merged = TypeSchema {
        all_of: Vec::new(),
        ..schema.clone()
    };
    for part in &schema.all_of {
        let part = if part.all_of.is_empty() {
            part.clone()
        } else {
            merge_all_of(part)
        };
        if merged.schema_type.is_none() {
            merged.schema_type = part.schema_type;
        }
        if merged.format.is_none() {
            merged.format = part.format;
        }
        if merged.description.is_none() {
            merged.description = part.description;
        }
        if merged.items.is_none() {
            merged.items = part.items;
        }
        if merged.one_of.is_empty() {
            merged.one_of = part.one_of;
        }
        if merged.any_of.is_empty() {
            merged.any_of = part.any_of;
        }
        for (name, property) in part.properties {
            merged.properties.entry(name).or_insert(property);
        }
        for name in part.required {
            if !merged.required.contains(&name) {
                merged.required.push(name);
            }
        }
    }
    merged
}

/// Attributes assigned by the server regardless of their descriptor.
const SERVER_ASSIGNED: &[&str] = &["id", "status", "trunk_details"];

/// Whether an attribute is assigned by the server (identity, status,
/// timestamps) and therefore never sent by clients.
#[must_use]
pub fn is_server_assigned(name: &str) -> bool {
    SERVER_ASSIGNED.contains(&name) || name.ends_with("_at")
}

/// Schema of one descriptor attribute.
#[must_use]
pub fn from_sdk_field(attribute: &AttributeDescriptor) -> TypeSchema {
    let ty = match attribute.attr_type {
        AttributeType::Str => Some("string"),
        AttributeType::Int => Some("integer"),
        AttributeType::Float => Some("number"),
        AttributeType::Bool => Some("boolean"),
        AttributeType::List => Some("array"),
        AttributeType::Dict => Some("object"),
        AttributeType::Raw => None,
    };
    TypeSchema {
        schema_type: ty.map(|ty| SchemaType::Single(ty.to_string())),
        format: attribute.format.clone(),
        description: attribute.doc.clone(),
        ..TypeSchema::default()
    }
}

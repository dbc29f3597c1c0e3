//! JSON Schema of a resource class, derived from its descriptor.

use apigen_core::spec::SchemaType;
use apigen_core::{TargetKind, TypeSchema};
use indexmap::IndexMap;

use super::{Language, RenderedFile, ResourceGenerator, ResourceRequest};
use crate::descriptor::{from_sdk_field, is_server_assigned, ResourceDescriptor};
use crate::error::Result;
use crate::naming;

/// JSON Schema generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaGenerator;

impl ResourceGenerator for JsonSchemaGenerator {
    fn target(&self) -> TargetKind {
        TargetKind::Jsonschema
    }

    fn generate(&self, request: &ResourceRequest<'_>) -> Result<Vec<RenderedFile>> {
        let schema = resource_schema(request.descriptor);
        let mut contents = serde_json::to_string_pretty(&schema)?;
        contents.push('\n');
        let path = format!(
            "{}/{}.json",
            naming::module_name(request.service_type),
            naming::module_name(&request.descriptor.name)
        );
        tracing::debug!(%path, resource = %request.descriptor.name, "rendered json schema");
        Ok(vec![RenderedFile::new(path, Language::Json, contents)])
    }
}

/// Object schema of a resource, nested under its wrapping key when it has one.
#[must_use]
pub fn resource_schema(descriptor: &ResourceDescriptor) -> TypeSchema {
    let mut properties = IndexMap::with_capacity(descriptor.attributes.len());
    let mut required = Vec::new();
    for (name, attribute) in &descriptor.attributes {
        let mut property = from_sdk_field(attribute);
        if is_server_assigned(name) {
            property.read_only = Some(true);
        }
        if is_counter(name) {
            property.schema_type = Some(SchemaType::Single("integer".to_string()));
        }
        if attribute.required {
            required.push(name.clone());
        }
        properties.insert(name.clone(), property);
    }

    let body = TypeSchema {
        schema_type: Some(SchemaType::Single("object".to_string())),
        description: descriptor.doc.clone(),
        properties,
        required,
        ..TypeSchema::default()
    };
    match &descriptor.resource_key {
        Some(key) => TypeSchema {
            schema_type: Some(SchemaType::Single("object".to_string())),
            properties: IndexMap::from([(key.clone(), body)]),
            required: vec![key.clone()],
            ..TypeSchema::default()
        },
        None => body,
    }
}

fn is_counter(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.starts_with("min") || name.starts_with("max") || name.contains("count")
}

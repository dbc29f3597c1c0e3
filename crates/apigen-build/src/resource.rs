//! Resource naming from paths and resource-object discovery inside bodies.

use apigen_core::TypeSchema;

use crate::naming::{pluralize, singularize};

/// Whether a path segment is an API version (`v2`, `v2.1`).
#[must_use]
pub fn is_version_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next() == Some('v') && chars.next().is_some_and(|c| c.is_ascii_digit())
}

/// Canonical resource segments of a path.
///
/// Drops a leading version segment, every `{param}` hole, and a terminal
/// `detail` or `action` segment, then lowercases what is left:
/// `/v2/servers/{id}/os-interfaces/{port_id}` → `["servers", "os-interfaces"]`.
#[must_use]
pub fn resource_segments(path: &str) -> Vec<String> {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.first().is_some_and(|s| is_version_segment(s)) {
        segments.remove(0);
    }
    let mut segments: Vec<String> = segments
        .into_iter()
        .filter(|s| !(s.starts_with('{') && s.ends_with('}')))
        .map(str::to_lowercase)
        .collect();
    if segments
        .last()
        .is_some_and(|s| s == "detail" || s == "action")
    {
        segments.pop();
    }
    segments
}

/// Hierarchical resource name (`servers/os-interfaces`).
#[must_use]
pub fn resource_name(path: &str) -> String {
    resource_segments(path).join("/")
}

/// Leading version segment of a path, if any (`/v2/servers` → `v2`).
#[must_use]
pub fn path_version(path: &str) -> Option<&str> {
    path.split('/')
        .find(|s| !s.is_empty())
        .filter(|s| is_version_segment(s))
}

/// Name of the `{param}` closing the path, if the path ends with one.
#[must_use]
pub fn terminal_parameter(path: &str) -> Option<&str> {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()?
        .strip_prefix('{')?
        .strip_suffix('}')
}

/// The resource object found inside a request or response body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSchema<'a> {
    /// Object schema of one resource.
    pub schema: &'a TypeSchema,
    /// Wrapping property (`{"server": {...}}` → `server`).
    pub key: Option<&'a str>,
    /// Wrapping property of each list item, when items are wrapped again.
    pub list_item_key: Option<&'a str>,
    /// Whether the body carries a collection of resources.
    pub is_list: bool,
}

/// Locate the resource object of `resource_leaf` (last resource segment)
/// inside `schema`.
///
/// A property tagged `x-openstack.resource: true` wins. Otherwise the one
/// property named after the resource (singular or plural, `-` and `_`
/// treated alike) is descended into. When the descended schema is an array
/// whose items wrap the resource once more, that inner property becomes the
/// list item key. Without a match the top-level schema is the resource.
#[must_use]
pub fn locate_resource_schema<'a>(schema: &'a TypeSchema, resource_leaf: &str) -> ResourceSchema<'a> {
    let (schema, key) = match find_wrapping_property(schema, resource_leaf) {
        Some((name, inner)) => (inner, Some(name)),
        None => (schema, None),
    };

    if !schema.is_array() {
        return ResourceSchema {
            schema,
            key,
            list_item_key: None,
            is_list: false,
        };
    }

    let Some(items) = schema.items.as_deref() else {
        return ResourceSchema {
            schema,
            key,
            list_item_key: None,
            is_list: true,
        };
    };
    let (items, list_item_key) = match find_wrapping_property(items, resource_leaf) {
        Some((name, inner)) if items.properties.len() == 1 => (inner, Some(name)),
        _ => (items, None),
    };
    ResourceSchema {
        schema: items,
        key,
        list_item_key,
        is_list: true,
    }
}

fn find_wrapping_property<'a>(
    schema: &'a TypeSchema,
    resource_leaf: &str,
) -> Option<(&'a str, &'a TypeSchema)> {
    if let Some((name, inner)) = schema.properties.iter().find(|(_, prop)| {
        prop.openstack()
            .and_then(|os| os.get("resource"))
            .and_then(serde_json::Value::as_bool)
            == Some(true)
    }) {
        return Some((name.as_str(), inner));
    }

    let leaf = normalize(resource_leaf);
    let singular = singularize(&leaf);
    let plural = pluralize(&singular);
    let mut matches = schema.properties.iter().filter(|(name, _)| {
        let name = normalize(name);
        name == leaf || name == singular || name == plural
    });
    let found = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some((found.0.as_str(), found.1))
}

fn normalize(name: &str) -> String {
    name.to_lowercase().replace('-', "_")
}

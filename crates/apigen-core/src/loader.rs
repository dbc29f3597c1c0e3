//! OpenAPI document loading and `$ref` materialization.
//!
//! Documents are read as YAML (a superset of JSON), every local `$ref` is
//! replaced by the node it points to, and the result is deserialized into a
//! [`Spec`].
//!
//! # Reference resolution
//!
//! Each reference target is resolved at most once and memoized; later
//! encounters reuse the memoized node. A reference met while its own target
//! is still being resolved closes a cycle and is left in place as a forward
//! reference, so resolution always terminates.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::spec::Spec;

/// Component sections resolved as if each entry were referenced by name.
const COMPONENT_SECTIONS: &[&str] = &[
    "schemas",
    "parameters",
    "headers",
    "responses",
    "requestBodies",
];

/// Process-wide spec cache keyed by canonical path. Entries never expire.
static SPEC_CACHE: OnceLock<Mutex<HashMap<PathBuf, Arc<Spec>>>> = OnceLock::new();

/// Load a spec file, reusing an earlier load of the same file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid OpenAPI
/// document (see [`parse_spec`]).
pub fn load_spec(path: &Path) -> Result<Arc<Spec>> {
    let key = std::fs::canonicalize(path)?;
    let cache = SPEC_CACHE.get_or_init(Mutex::default);

    if let Some(spec) = cache
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .get(&key)
    {
        tracing::trace!(path = %key.display(), "spec cache hit");
        return Ok(Arc::clone(spec));
    }

    tracing::debug!(path = %key.display(), "loading spec");
    let content = std::fs::read_to_string(&key)?;
    let spec = Arc::new(parse_spec(&content)?);

    cache
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .entry(key)
        .or_insert_with(|| Arc::clone(&spec));
    Ok(spec)
}

/// Parse and resolve an OpenAPI document from YAML or JSON text.
///
/// # Errors
///
/// Returns [`Error::SpecParse`] if the text is not valid YAML/JSON, lacks the
/// `openapi` or `paths` fields, or does not match the document model, and
/// [`Error::UnresolvedReference`] if a local `$ref` target does not exist.
pub fn parse_spec(content: &str) -> Result<Spec> {
    let yaml: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(content).map_err(|e| Error::spec_parse(e.to_string()))?;
    let raw = yaml_to_json(yaml)?;

    let Some(root) = raw.as_object() else {
        return Err(Error::spec_parse("document root is not a mapping"));
    };
    for field in ["openapi", "paths"] {
        if !root.contains_key(field) {
            return Err(Error::spec_parse(format!(
                "missing required top-level field '{field}'"
            )));
        }
    }

    let resolved = resolve_refs(&raw)?;
    serde_json::from_value(resolved).map_err(|e| Error::spec_parse(e.to_string()))
}

/// Replace every local `$ref` in `doc` by the node it points to.
///
/// # Errors
///
/// Returns [`Error::UnresolvedReference`] if a local reference target is missing.
pub fn resolve_refs(doc: &Value) -> Result<Value> {
    let mut resolver = RefResolver::new(doc);
    let Value::Object(root) = doc else {
        return resolver.resolve(doc);
    };

    let mut out = Map::with_capacity(root.len());
    for (key, value) in root {
        let resolved = if key == "components" {
            resolver.resolve_components(value)?
        } else {
            resolver.resolve(value)?
        };
        out.insert(key.clone(), resolved);
    }
    Ok(Value::Object(out))
}

struct RefResolver<'a> {
    root: &'a Value,
    resolved: HashMap<String, Value>,
    in_progress: HashSet<String>,
}

impl<'a> RefResolver<'a> {
    fn new(root: &'a Value) -> Self {
        Self {
            root,
            resolved: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Resolve each component entry through its own reference so that
    /// `components.<section>.<name>` equals what a `$ref` to it yields.
    fn resolve_components(&mut self, components: &Value) -> Result<Value> {
        let Value::Object(sections) = components else {
            return self.resolve(components);
        };

        let mut out = Map::with_capacity(sections.len());
        for (section, entries) in sections {
            let value = match entries {
                Value::Object(entries) if COMPONENT_SECTIONS.contains(&section.as_str()) => {
                    let mut resolved = Map::with_capacity(entries.len());
                    for name in entries.keys() {
                        let reference = format!("#/components/{section}/{}", escape(name));
                        resolved.insert(name.clone(), self.resolve_reference(&reference)?);
                    }
                    Value::Object(resolved)
                }
                other => self.resolve(other)?,
            };
            out.insert(section.clone(), value);
        }
        Ok(Value::Object(out))
    }

    fn resolve(&mut self, node: &Value) -> Result<Value> {
        match node {
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                    if reference.starts_with('#') {
                        return self.resolve_reference(reference);
                    }
                    // External documents are out of reach; keep the reference.
                    return Ok(node.clone());
                }
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), self.resolve(value)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn resolve_reference(&mut self, reference: &str) -> Result<Value> {
        if let Some(done) = self.resolved.get(reference) {
            return Ok(done.clone());
        }
        if self.in_progress.contains(reference) {
            tracing::trace!(reference, "cyclic reference kept as forward reference");
            let mut forward = Map::new();
            forward.insert("$ref".to_string(), Value::String(reference.to_string()));
            return Ok(Value::Object(forward));
        }

        let root = self.root;
        let target = root
            .pointer(reference.trim_start_matches('#'))
            .ok_or_else(|| Error::UnresolvedReference {
                reference: reference.to_string(),
            })?;

        self.in_progress.insert(reference.to_string());
        let value = self.resolve(target);
        self.in_progress.remove(reference);
        let value = value?;

        self.resolved.insert(reference.to_string(), value.clone());
        Ok(value)
    }
}

/// Convert a YAML tree to JSON, stringifying scalar mapping keys.
///
/// YAML documents commonly write status codes as bare integers (`200:`),
/// which JSON objects cannot hold as keys.
fn yaml_to_json(value: serde_yaml_ng::Value) -> Result<Value> {
    use serde_yaml_ng::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut out = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => {
                        return Err(Error::spec_parse(format!(
                            "unsupported mapping key: {other:?}"
                        )))
                    }
                };
                out.insert(key, yaml_to_json(value)?);
            }
            Value::Object(out)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

/// Escape a component name as a JSON pointer token.
fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    const CYCLIC: &str = indoc! {r"
        openapi: 3.1.0
        info:
          title: Cyclic
        paths:
          /v1/nodes:
            get:
              operationId: nodes:list
              responses:
                '200':
                  description: OK
                  content:
                    application/json:
                      schema:
                        $ref: '#/components/schemas/A'
        components:
          schemas:
            A:
              type: object
              properties:
                b:
                  $ref: '#/components/schemas/B'
            B:
              type: object
              properties:
                a:
                  $ref: '#/components/schemas/A'
                name:
                  type: string
    "};

    #[test]
    fn missing_openapi_field_is_a_parse_error() {
        let err = parse_spec("paths: {}\n").unwrap_err();
        assert!(matches!(err, Error::SpecParse { .. }), "{err}");
        assert!(err.to_string().contains("openapi"));
    }

    #[test]
    fn missing_paths_field_is_a_parse_error() {
        let err = parse_spec("openapi: 3.1.0\n").unwrap_err();
        assert!(err.to_string().contains("paths"));
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let err = parse_spec("openapi: [[[").unwrap_err();
        assert!(matches!(err, Error::SpecParse { .. }));
    }

    #[test]
    fn integer_status_codes_become_string_keys() {
        let spec = parse_spec(indoc! {"
            openapi: 3.1.0
            paths:
              /v2/servers:
                delete:
                  operationId: servers:delete_all
                  responses:
                    204:
                      description: Gone
        "})
        .unwrap();
        let op = spec.find_operation("servers:delete_all").unwrap();
        assert!(op.operation.responses.contains_key("204"));
    }

    #[test]
    fn json_documents_are_accepted() {
        let spec = parse_spec(r#"{"openapi": "3.0.0", "paths": {}}"#).unwrap();
        assert_eq!(spec.openapi, "3.0.0");
    }

    #[test]
    fn refs_are_materialized() {
        let spec = parse_spec(indoc! {r"
            openapi: 3.1.0
            paths:
              /v2/flavors/{id}:
                parameters:
                  - $ref: '#/components/parameters/id'
                get:
                  operationId: flavors:show
                  responses:
                    '200':
                      description: OK
                      content:
                        application/json:
                          schema:
                            $ref: '#/components/schemas/Flavor'
            components:
              parameters:
                id:
                  name: id
                  in: path
                  required: true
                  schema:
                    type: string
              schemas:
                Flavor:
                  type: object
                  properties:
                    ram:
                      type: integer
        "})
        .unwrap();

        let op = spec.find_operation("flavors:show").unwrap();
        assert_eq!(op.parameters()[0].name, "id");
        let schema = op.operation.responses["200"].content["application/json"]
            .schema
            .as_ref()
            .unwrap();
        assert!(schema.reference.is_none());
        assert!(schema.properties.contains_key("ram"));
    }

    #[test]
    fn cyclic_refs_terminate_and_stay_reachable() {
        let spec = parse_spec(CYCLIC).unwrap();

        let a = spec.get_component_schema("A").unwrap();
        let b = spec.get_component_schema("B").unwrap();
        assert!(a.properties.contains_key("b"));
        assert!(b.properties.contains_key("name"));

        // A.b is B materialized, whose `a` closes the cycle.
        let back_edge = &a.properties["b"].properties["a"];
        assert_eq!(back_edge.reference_name(), Some("A"));
    }

    #[test]
    fn resolution_is_idempotent() {
        let first = parse_spec(CYCLIC).unwrap();
        let second = parse_spec(CYCLIC).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn dangling_local_ref_errors() {
        let err = parse_spec(indoc! {r"
            openapi: 3.1.0
            paths:
              /x:
                get:
                  operationId: x
                  parameters:
                    - $ref: '#/components/parameters/missing'
        "})
        .unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { .. }));
    }

    #[test]
    fn load_spec_uses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openapi.yaml");
        std::fs::write(&path, CYCLIC).unwrap();

        let first = load_spec(&path).unwrap();
        // Overwriting the file does not affect the cached entry.
        std::fs::write(&path, "not: a spec\n").unwrap();
        let second = load_spec(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn load_nonexistent_file_errors() {
        let result = load_spec(Path::new("/nonexistent/openapi.yaml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}

//! Type lowering: OpenAPI schemas to Rust type descriptors.
//!
//! A [`TypeLowering`] is created per generated file. Every call unions the
//! imports the produced types need into one set, and inline object schemas
//! become named [`Subtype`]s memoized by name and originating schema. A
//! schema reached again while its own subtype is still being built yields a
//! boxed forward reference, which is what keeps cyclic graphs finite.
//!
//! The JSON Schema target does not lower to Rust types: its attribute
//! lowering lives in [`crate::descriptor::lower_attribute`]. String formats
//! other than `date-time` (`uuid`, `uri`, ...) stay plain strings here; the
//! descriptor lowering keeps the format.

use std::collections::{BTreeSet, HashMap, HashSet};

use apigen_core::spec::{AdditionalProperties, SchemaType};
use apigen_core::{Parameter, ParameterLocation, Spec, TypeSchema};
use indexmap::IndexMap;

use crate::error::{GenerateError, Result};
use crate::naming;

/// Rendering flavor of the lowered types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Request types of the low-level client library. Strings borrow
    /// (`Cow<'a, str>`) and inline objects become builder structs.
    Sdk,
    /// Response rows of CLI commands. Scalars stay typed, everything
    /// structured is kept as JSON.
    Cli,
    /// CLI command arguments. Scalars and lists of scalars are typed,
    /// maps are `key=value` pairs, objects are JSON.
    CliRequest,
}

/// Dialect-independent Rust type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RustType {
    /// Text.
    String,
    /// `date-time` string.
    DateTime,
    /// `integer` (default, `int32`).
    I32,
    /// `integer` with `int64`.
    I64,
    /// `number` (default, `float`).
    F32,
    /// `number` with `double`.
    F64,
    /// `boolean`.
    Bool,
    /// Free-form JSON value.
    Json,
    /// List.
    Vec(Box<RustType>),
    /// List sent as one comma-separated query value.
    CommaSeparated(Box<RustType>),
    /// String-keyed homogeneous map.
    Map(Box<RustType>),
    /// Optional value.
    Option(Box<RustType>),
    /// Generated subtype.
    Named(String),
    /// Indirection closing a cycle.
    Boxed(Box<RustType>),
}

impl RustType {
    /// Wrap in `Option`, unless already optional.
    #[must_use]
    pub fn optional(self) -> Self {
        match self {
            Self::Option(_) => self,
            other => Self::Option(Box::new(other)),
        }
    }

    /// Whether the type is `Option<_>`.
    #[must_use]
    pub fn is_option(&self) -> bool {
        matches!(self, Self::Option(_))
    }

    /// The type without its outer `Option`.
    #[must_use]
    pub fn unwrap_option(&self) -> &Self {
        match self {
            Self::Option(inner) => inner,
            other => other,
        }
    }

    /// Whether the type is a single scalar value.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::String | Self::DateTime | Self::I32 | Self::I64 | Self::F32 | Self::F64 | Self::Bool
        )
    }
}

/// One field of a generated struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Rust binding.
    pub name: String,
    /// Name on the wire.
    pub wire_name: String,
    /// Type, `Option`-wrapped unless required.
    pub ty: RustType,
    /// Whether the owning object lists the property as required.
    pub required: bool,
    /// Documentation.
    pub description: Option<String>,
}

/// Generated struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    /// Type name.
    pub name: String,
    /// Documentation.
    pub description: Option<String>,
    /// Named properties in document order.
    pub fields: Vec<Field>,
    /// Value type of extra properties, when allowed.
    pub additional: Option<RustType>,
}

/// Generated enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    /// Type name.
    pub name: String,
    /// Documentation.
    pub description: Option<String>,
    /// Variant shape.
    pub kind: EnumKind,
}

/// Variant shape of a generated enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumKind {
    /// String enum: `(variant, wire value)`.
    Strings(Vec<(String, String)>),
    /// Microversion-tagged union: `(variant, min version, payload)`.
    Microversion(Vec<(String, String, RustType)>),
    /// Untagged union: `(variant, payload)`.
    Untagged(Vec<(String, RustType)>),
}

/// A named type produced while lowering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subtype {
    /// Struct.
    Struct(StructDef),
    /// Enum.
    Enum(EnumDef),
}

impl Subtype {
    /// Type name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Struct(def) => &def.name,
            Self::Enum(def) => &def.name,
        }
    }
}

/// Lowered path, query or header parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    /// Rust binding.
    pub name: String,
    /// Name on the wire.
    pub wire_name: String,
    /// Where the parameter travels.
    pub location: ParameterLocation,
    /// Type, `Option`-wrapped unless required.
    pub ty: RustType,
    /// Whether the parameter is mandatory.
    pub required: bool,
    /// Documentation.
    pub description: Option<String>,
}

/// Resource facts needed to bind parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterScope<'a> {
    /// Singular snake-case name of the resource (`server`).
    pub resource_singular: &'a str,
    /// `{param}` closing the operation path, if any.
    pub terminal_parameter: Option<&'a str>,
}

/// Import paths induced by lowered types.
pub mod imports {
    /// Borrowed strings of SDK requests.
    pub const COW: &str = "std::borrow::Cow";
    /// Maps.
    pub const BTREE_MAP: &str = "std::collections::BTreeMap";
    /// Free-form JSON.
    pub const JSON_VALUE: &str = "serde_json::Value";
    /// Timestamps.
    pub const DATE_TIME: &str = "chrono::DateTime";
    /// Timestamp zone.
    pub const UTC: &str = "chrono::Utc";
    /// Comma-separated query lists.
    pub const COMMA_SEPARATED_LIST: &str = "crate::api::common::CommaSeparatedList";
}

enum NameClaim {
    New(String),
    Existing(String),
    Forward(String),
}

/// Lowers schemas of one spec in one dialect, collecting imports and subtypes.
#[derive(Debug)]
pub struct TypeLowering<'s> {
    spec: &'s Spec,
    dialect: Dialect,
    imports: BTreeSet<String>,
    subtypes: IndexMap<String, Subtype>,
    origins: HashMap<String, TypeSchema>,
    in_progress: Vec<(String, TypeSchema)>,
    components_visiting: HashSet<String>,
}

impl<'s> TypeLowering<'s> {
    /// Start lowering against `spec`.
    #[must_use]
    pub fn new(spec: &'s Spec, dialect: Dialect) -> Self {
        Self {
            spec,
            dialect,
            imports: BTreeSet::new(),
            subtypes: IndexMap::new(),
            origins: HashMap::new(),
            in_progress: Vec::new(),
            components_visiting: HashSet::new(),
        }
    }

    /// Dialect in use.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Imports induced so far, sorted.
    #[must_use]
    pub fn imports(&self) -> &BTreeSet<String> {
        &self.imports
    }

    /// Record an import needed by the surrounding code.
    pub fn add_import(&mut self, path: &str) {
        self.imports.insert(path.to_string());
    }

    /// Subtypes produced so far, in completion order.
    #[must_use]
    pub fn subtypes(&self) -> &IndexMap<String, Subtype> {
        &self.subtypes
    }

    /// Lower one schema. `hint` names the generated subtype, if one is needed.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::UnsupportedType`] for a `type` outside the
    /// JSON Schema primitives, or a core error for a dangling reference.
    pub fn lower(&mut self, schema: &TypeSchema, hint: &str) -> Result<RustType> {
        if let Some(component) = schema.reference_name() {
            return self.lower_component(component);
        }
        if schema.reference.is_some() {
            return Ok(self.json());
        }
        if !schema.all_of.is_empty() {
            let merged = self.merge_all_of(schema)?;
            return self.lower(&merged, hint);
        }

        let ty = if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
            self.lower_union(schema, hint)?
        } else if is_string_enum(schema) {
            self.lower_string_enum(schema, hint)
        } else {
            match schema.non_null_types().as_slice() {
                [] if !schema.properties.is_empty() || schema.additional_properties.is_some() => {
                    self.lower_object(schema, hint)?
                }
                [] if schema.items.is_some() => self.lower_array(schema, hint)?,
                [] => self.json(),
                [single] => self.lower_primitive(single, schema, hint)?,
                _ => self.json(),
            }
        };
        Ok(if schema.is_nullable() { ty.optional() } else { ty })
    }

    /// Lower the named properties of an object schema.
    ///
    /// # Errors
    ///
    /// Propagates lowering errors of any property.
    pub fn lower_fields(&mut self, schema: &TypeSchema, owner: &str) -> Result<Vec<Field>> {
        let merged;
        let schema = if schema.all_of.is_empty() {
            schema
        } else {
            merged = self.merge_all_of(schema)?;
            &merged
        };

        let mut fields: Vec<Field> = Vec::with_capacity(schema.properties.len());
        for (wire_name, prop) in &schema.properties {
            if self.dialect == Dialect::Sdk && prop.read_only == Some(true) {
                continue;
            }
            let required = schema.is_required(wire_name);
            let hint = if owner.is_empty() {
                wire_name.clone()
            } else {
                format!("{owner}_{wire_name}")
            };
            let ty = self.lower(prop, &hint)?;
            let ty = if required { ty } else { ty.optional() };

            let mut name = naming::field_name(wire_name);
            while fields.iter().any(|f| f.name == name) {
                name.push('_');
            }
            fields.push(Field {
                name,
                wire_name: wire_name.clone(),
                ty,
                required,
                description: prop.description.clone().or_else(|| prop.title.clone()),
            });
        }
        Ok(fields)
    }

    /// Lower a parameter and derive its binding.
    ///
    /// A path parameter named `<resource>_id` that closes the path is bound
    /// as `id`; its wire name is kept.
    ///
    /// # Errors
    ///
    /// Propagates lowering errors of the parameter schema.
    pub fn lower_parameter(
        &mut self,
        param: &Parameter,
        scope: &ParameterScope<'_>,
    ) -> Result<ParamDescriptor> {
        let is_resource_id = param.location == ParameterLocation::Path
            && scope.terminal_parameter == Some(param.name.as_str())
            && param.name == format!("{}_id", scope.resource_singular);
        let name = if is_resource_id {
            "id".to_string()
        } else {
            naming::field_name(&param.name)
        };

        let string_schema;
        let schema = match &param.schema {
            Some(schema) => schema,
            None => {
                string_schema = TypeSchema::of_type("string");
                &string_schema
            }
        };
        let mut ty = self.lower(schema, &param.name)?;
        if param.is_comma_separated() {
            ty = match ty {
                RustType::Vec(inner) => {
                    if self.dialect == Dialect::Sdk {
                        self.add_import(imports::COMMA_SEPARATED_LIST);
                    }
                    RustType::CommaSeparated(inner)
                }
                other => other,
            };
        }
        let required = param.required || param.location == ParameterLocation::Path;
        if !required {
            ty = ty.optional();
        }

        Ok(ParamDescriptor {
            name,
            wire_name: param.name.clone(),
            location: param.location,
            ty,
            required,
            description: param.description.clone(),
        })
    }

    /// Whether values of `ty` borrow (need the `'a` lifetime) in this dialect.
    #[must_use]
    pub fn borrows(&self, ty: &RustType) -> bool {
        self.borrows_inner(ty, &mut HashSet::new())
    }

    /// Whether the named subtype borrows.
    #[must_use]
    pub fn subtype_borrows(&self, subtype: &Subtype) -> bool {
        self.subtype_borrows_inner(subtype, &mut HashSet::new())
    }

    /// Render a type expression.
    #[must_use]
    pub fn render(&self, ty: &RustType) -> String {
        match ty {
            RustType::String => match self.dialect {
                Dialect::Sdk => "Cow<'a, str>".to_string(),
                Dialect::Cli | Dialect::CliRequest => "String".to_string(),
            },
            RustType::DateTime => match self.dialect {
                Dialect::Sdk | Dialect::CliRequest => "DateTime<Utc>".to_string(),
                Dialect::Cli => "String".to_string(),
            },
            RustType::I32 => "i32".to_string(),
            RustType::I64 => "i64".to_string(),
            RustType::F32 => "f32".to_string(),
            RustType::F64 => "f64".to_string(),
            RustType::Bool => "bool".to_string(),
            RustType::Json => "Value".to_string(),
            RustType::Vec(inner) => format!("Vec<{}>", self.render(inner)),
            RustType::CommaSeparated(inner) => match self.dialect {
                Dialect::Sdk => format!("CommaSeparatedList<{}>", self.render(inner)),
                Dialect::Cli | Dialect::CliRequest => format!("Vec<{}>", self.render(inner)),
            },
            RustType::Map(inner) => match self.dialect {
                Dialect::Sdk | Dialect::Cli => format!("BTreeMap<String, {}>", self.render(inner)),
                Dialect::CliRequest => format!("Vec<(String, {})>", self.render(inner)),
            },
            RustType::Option(inner) => format!("Option<{}>", self.render(inner)),
            RustType::Boxed(inner) => format!("Box<{}>", self.render(inner)),
            RustType::Named(name) => {
                if self.borrows(ty) {
                    format!("{name}<'a>")
                } else {
                    name.clone()
                }
            }
        }
    }

    fn json(&mut self) -> RustType {
        self.add_import(imports::JSON_VALUE);
        RustType::Json
    }

    fn lower_component(&mut self, component: &str) -> Result<RustType> {
        let type_name = naming::type_name(component);
        if self.components_visiting.contains(component)
            || self.in_progress.iter().any(|(name, _)| *name == type_name)
        {
            tracing::trace!(component, "forward reference to component");
            return Ok(RustType::Boxed(Box::new(RustType::Named(type_name))));
        }
        let spec = self.spec;
        let schema = spec.get_component_schema(component)?;

        self.components_visiting.insert(component.to_string());
        let lowered = self.lower(schema, component);
        self.components_visiting.remove(component);
        lowered
    }

    fn lower_primitive(&mut self, ty: &str, schema: &TypeSchema, hint: &str) -> Result<RustType> {
        let format = schema.format.as_deref();
        Ok(match ty {
            "string" if format == Some("date-time") => {
                if self.dialect != Dialect::Cli {
                    self.add_import(imports::DATE_TIME);
                    self.add_import(imports::UTC);
                }
                RustType::DateTime
            }
            "string" => {
                if self.dialect == Dialect::Sdk {
                    self.add_import(imports::COW);
                }
                RustType::String
            }
            "integer" if format == Some("int64") => RustType::I64,
            "integer" => RustType::I32,
            "number" if format == Some("double") => RustType::F64,
            "number" => RustType::F32,
            "boolean" => RustType::Bool,
            "array" => self.lower_array(schema, hint)?,
            "object" => self.lower_object(schema, hint)?,
            other => {
                return Err(GenerateError::UnsupportedType {
                    type_name: other.to_string(),
                    location: hint.to_string(),
                })
            }
        })
    }

    fn lower_array(&mut self, schema: &TypeSchema, hint: &str) -> Result<RustType> {
        if self.dialect == Dialect::Cli {
            return Ok(self.json());
        }
        let item = match schema.items.as_deref() {
            Some(items) => self.lower(items, &naming::singularize(hint))?,
            None => self.json(),
        };
        Ok(RustType::Vec(Box::new(item)))
    }

    fn lower_object(&mut self, schema: &TypeSchema, hint: &str) -> Result<RustType> {
        if schema.properties.is_empty() {
            return match &schema.additional_properties {
                Some(AdditionalProperties::Schema(values)) if self.dialect != Dialect::Cli => {
                    let value = self.lower(values, hint)?;
                    if self.dialect != Dialect::CliRequest {
                        self.add_import(imports::BTREE_MAP);
                    }
                    Ok(RustType::Map(Box::new(value)))
                }
                _ => Ok(self.json()),
            };
        }
        if self.dialect != Dialect::Sdk {
            return Ok(self.json());
        }

        let name = match self.claim_name(hint, schema) {
            NameClaim::Existing(name) => return Ok(RustType::Named(name)),
            NameClaim::Forward(name) => {
                return Ok(RustType::Boxed(Box::new(RustType::Named(name))))
            }
            NameClaim::New(name) => name,
        };

        self.in_progress.push((name.clone(), schema.clone()));
        let fields = self.lower_fields(schema, "");
        let additional = match &schema.additional_properties {
            Some(AdditionalProperties::Schema(values)) => Some(self.lower(values, &name)),
            Some(AdditionalProperties::Allowed(true)) => Some(Ok(self.json())),
            _ => None,
        };
        self.in_progress.pop();

        let fields = fields?;
        let additional = match additional.transpose()? {
            Some(value) => {
                self.add_import(imports::BTREE_MAP);
                Some(RustType::Map(Box::new(value)))
            }
            None => None,
        };
        self.finish_subtype(
            schema,
            Subtype::Struct(StructDef {
                name: name.clone(),
                description: schema.description.clone(),
                fields,
                additional,
            }),
        );
        Ok(RustType::Named(name))
    }

    fn lower_string_enum(&mut self, schema: &TypeSchema, hint: &str) -> RustType {
        if self.dialect != Dialect::Sdk {
            return RustType::String;
        }
        let name = match self.claim_name(hint, schema) {
            NameClaim::Existing(name) | NameClaim::Forward(name) => return RustType::Named(name),
            NameClaim::New(name) => name,
        };

        let mut variants: Vec<(String, String)> = Vec::new();
        for wire in schema.enum_values.iter().filter_map(serde_json::Value::as_str) {
            let mut variant = if wire.is_empty() {
                "Empty".to_string()
            } else {
                naming::type_name(wire)
            };
            while variants.iter().any(|(v, _)| *v == variant) {
                variant.push('_');
            }
            variants.push((variant, wire.to_string()));
        }
        self.finish_subtype(
            schema,
            Subtype::Enum(EnumDef {
                name: name.clone(),
                description: schema.description.clone(),
                kind: EnumKind::Strings(variants),
            }),
        );
        RustType::Named(name)
    }

    fn lower_union(&mut self, schema: &TypeSchema, hint: &str) -> Result<RustType> {
        let branches = if schema.one_of.is_empty() {
            &schema.any_of
        } else {
            &schema.one_of
        };
        let non_null: Vec<&TypeSchema> = branches
            .iter()
            .filter(|branch| branch.types() != ["null"])
            .collect();
        let has_null = non_null.len() != branches.len();

        if let [single] = non_null.as_slice() {
            let ty = self.lower(single, hint)?;
            return Ok(if has_null { ty.optional() } else { ty });
        }
        if self.dialect != Dialect::Sdk || non_null.is_empty() {
            return Ok(self.json());
        }

        let name = match self.claim_name(hint, schema) {
            NameClaim::Existing(name) => return Ok(RustType::Named(name)),
            NameClaim::Forward(name) => {
                return Ok(RustType::Boxed(Box::new(RustType::Named(name))))
            }
            NameClaim::New(name) => name,
        };
        self.in_progress.push((name.clone(), schema.clone()));
        let kind = if schema.openstack_str("discriminator") == Some("microversion") {
            self.microversion_variants(&non_null, &name)
                .map(EnumKind::Microversion)
        } else {
            self.untagged_variants(&non_null, &name)
                .map(EnumKind::Untagged)
        };
        self.in_progress.pop();

        self.finish_subtype(
            schema,
            Subtype::Enum(EnumDef {
                name: name.clone(),
                description: schema.description.clone(),
                kind: kind?,
            }),
        );
        let ty = RustType::Named(name);
        Ok(if has_null { ty.optional() } else { ty })
    }

    fn microversion_variants(
        &mut self,
        branches: &[&TypeSchema],
        name: &str,
    ) -> Result<Vec<(String, String, RustType)>> {
        let mut variants = Vec::with_capacity(branches.len());
        for (index, branch) in branches.iter().enumerate() {
            let version = branch
                .openstack_str("min-ver")
                .map_or_else(|| index.to_string(), ToString::to_string);
            let suffix = naming::microversion_suffix(&version);
            let ty = self.lower(branch, &format!("{name}_{suffix}"))?;
            variants.push((format!("V{suffix}"), version, ty));
        }
        Ok(variants)
    }

    fn untagged_variants(
        &mut self,
        branches: &[&TypeSchema],
        name: &str,
    ) -> Result<Vec<(String, RustType)>> {
        let mut variants: Vec<(String, RustType)> = Vec::with_capacity(branches.len());
        for (index, branch) in branches.iter().enumerate() {
            let hint = branch
                .title
                .clone()
                .unwrap_or_else(|| format!("{name}_{index}"));
            let ty = self.lower(branch, &hint)?;
            let mut variant = variant_name(&ty, index);
            while variants.iter().any(|(v, _)| *v == variant) {
                variant = format!("{variant}{index}");
            }
            variants.push((variant, ty));
        }
        Ok(variants)
    }

    fn claim_name(&self, hint: &str, schema: &TypeSchema) -> NameClaim {
        let base = naming::type_name(hint);
        let mut candidate = base.clone();
        let mut counter = 1;
        loop {
            if let Some((_, origin)) = self.in_progress.iter().find(|(n, _)| *n == candidate) {
                if origin == schema {
                    return NameClaim::Forward(candidate);
                }
            } else if let Some(origin) = self.origins.get(&candidate) {
                if origin == schema {
                    return NameClaim::Existing(candidate);
                }
            } else {
                return NameClaim::New(candidate);
            }
            counter += 1;
            candidate = format!("{base}{counter}");
        }
    }

    fn finish_subtype(&mut self, schema: &TypeSchema, subtype: Subtype) {
        let name = subtype.name().to_string();
        self.origins.insert(name.clone(), schema.clone());
        self.subtypes.insert(name, subtype);
    }

    fn merge_all_of(&self, schema: &TypeSchema) -> Result<TypeSchema> {
        let mut merged = TypeSchema {
            all_of: Vec::new(),
            ..schema.clone()
        };
        for part in &schema.all_of {
            let part = match part.reference_name() {
                Some(component) => self.spec.get_component_schema(component)?.clone(),
                None => part.clone(),
            };
            let part = if part.all_of.is_empty() {
                part
            } else {
                self.merge_all_of(&part)?
            };
            if merged.schema_type.is_none() {
                merged.schema_type.clone_from(&part.schema_type);
            }
            if merged.description.is_none() {
                merged.description.clone_from(&part.description);
            }
            if part.nullable == Some(true) {
                merged.nullable = Some(true);
            }
            for (name, prop) in part.properties {
                merged.properties.insert(name, prop);
            }
            for name in part.required {
                if !merged.required.contains(&name) {
                    merged.required.push(name);
                }
            }
            if merged.additional_properties.is_none() {
                merged.additional_properties = part.additional_properties;
            }
        }
        if merged.schema_type.is_none() && !merged.properties.is_empty() {
            merged.schema_type = Some(SchemaType::Single("object".to_string()));
        }
        Ok(merged)
    }

    fn borrows_inner(&self, ty: &RustType, visiting: &mut HashSet<String>) -> bool {
        if self.dialect != Dialect::Sdk {
            return false;
        }
        match ty {
            RustType::String => true,
            RustType::Vec(inner)
            | RustType::CommaSeparated(inner)
            | RustType::Map(inner)
            | RustType::Option(inner)
            | RustType::Boxed(inner) => self.borrows_inner(inner, visiting),
            RustType::Named(name) => {
                if !visiting.insert(name.clone()) {
                    return false;
                }
                self.subtypes
                    .get(name)
                    .is_some_and(|subtype| self.subtype_borrows_inner(subtype, visiting))
            }
            RustType::DateTime
            | RustType::I32
            | RustType::I64
            | RustType::F32
            | RustType::F64
            | RustType::Bool
            | RustType::Json => false,
        }
    }

    fn subtype_borrows_inner(&self, subtype: &Subtype, visiting: &mut HashSet<String>) -> bool {
        match subtype {
            Subtype::Struct(def) => {
                def.fields
                    .iter()
                    .any(|field| self.borrows_inner(&field.ty, visiting))
                    || def
                        .additional
                        .as_ref()
                        .is_some_and(|ty| self.borrows_inner(ty, visiting))
            }
            Subtype::Enum(def) => match &def.kind {
                EnumKind::Strings(_) => false,
                EnumKind::Microversion(variants) => variants
                    .iter()
                    .any(|(_, _, ty)| self.borrows_inner(ty, visiting)),
                EnumKind::Untagged(variants) => {
                    variants.iter().any(|(_, ty)| self.borrows_inner(ty, visiting))
                }
            },
        }
    }
}

fn is_string_enum(schema: &TypeSchema) -> bool {
    matches!(schema.non_null_types().as_slice(), [] | ["string"])
        && schema.enum_values.iter().any(serde_json::Value::is_string)
        && schema
            .enum_values
            .iter()
            .all(|v| v.is_string() || v.is_null())
}

fn variant_name(ty: &RustType, index: usize) -> String {
    match ty.unwrap_option() {
        RustType::String => "String".to_string(),
        RustType::DateTime => "DateTime".to_string(),
        RustType::I32 | RustType::I64 => "Integer".to_string(),
        RustType::F32 | RustType::F64 => "Number".to_string(),
        RustType::Bool => "Bool".to_string(),
        RustType::Vec(_) | RustType::CommaSeparated(_) => "Array".to_string(),
        RustType::Map(_) | RustType::Json => "Object".to_string(),
        RustType::Named(name) => name.clone(),
        RustType::Boxed(inner) => variant_name(inner, index),
        RustType::Option(_) => format!("F{index}"),
    }
}

//! Low-level client library target.
//!
//! Every operation variant becomes one module holding a builder-backed
//! `Request` struct and its `RestEndpoint` implementation. Inline body
//! objects become named structs and enums next to it.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use apigen_core::spec::MEDIA_OCTET_STREAM;
use apigen_core::{Method, OperationKind, OperationRef, ParameterLocation, TargetKind};

use super::{
    doc_lines, parse_microversion, request_media, response_schema, variant_body, variants,
    EmittedFile, OperationGenerator, OperationRequest, RenderedFile, RequestMedia, Variant,
};
use crate::error::Result;
use crate::lower::{
    Dialect, EnumKind, Field, ParamDescriptor, ParameterScope, RustType, Subtype, TypeLowering,
};
use crate::naming::{self, rust_str};
use crate::resource::{locate_resource_schema, terminal_parameter};

/// Import of the JSON patch document type.
pub const PATCH_IMPORT: &str = "json_patch::Patch";

const PAGEABLE_IMPORT: &str = "crate::api::Pageable";
const FINDABLE_IMPORT: &str = "crate::api::find::Findable";
const FIND_ERROR_IMPORT: &str = "crate::api::find::FindError";

/// SDK generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SdkGenerator;

impl OperationGenerator for SdkGenerator {
    fn target(&self) -> TargetKind {
        TargetKind::Sdk
    }

    fn generate(&self, request: &OperationRequest<'_>) -> Result<Vec<RenderedFile>> {
        Ok(contexts(request)?
            .iter()
            .map(|ctx| {
                RenderedFile::module(
                    EmittedFile::rust(ctx.module_path.clone(), ctx.module_name.clone()),
                    ctx.render(),
                )
            })
            .collect())
    }
}

/// Shape of the request body of one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyShape {
    /// No body.
    None,
    /// JSON object built from individual fields.
    Fields(Vec<Field>),
    /// JSON value of a non-object type.
    Value(RustType),
    /// JSON patch document.
    Patch,
    /// Raw bytes.
    Binary,
}

/// Rendering context of one SDK module.
#[derive(Debug)]
pub struct SdkContext<'s> {
    /// Operation id the module is generated from.
    pub operation_id: String,
    /// Summary of the operation.
    pub summary: Option<String>,
    /// Effective kind.
    pub kind: OperationKind,
    /// HTTP method.
    pub method: Method,
    /// Path template without the leading slash.
    pub url: String,
    /// Service type (`compute`).
    pub service_type: String,
    /// Hierarchical resource name.
    pub resource_name: String,
    /// Module directory.
    pub module_path: Vec<String>,
    /// File stem.
    pub module_name: String,
    /// Minimum microversion of the variant.
    pub microversion: Option<String>,
    /// Action name of the variant.
    pub action: Option<String>,
    /// Path parameters in path order.
    pub path_params: Vec<ParamDescriptor>,
    /// Query parameters.
    pub query_params: Vec<ParamDescriptor>,
    /// Header parameters.
    pub header_params: Vec<ParamDescriptor>,
    /// Request body.
    pub body: BodyShape,
    /// Request media type.
    pub media_type: Option<String>,
    /// Property wrapping the request body.
    pub request_key: Option<String>,
    /// Property wrapping the response resource.
    pub response_key: Option<String>,
    /// Property wrapping each list item.
    pub response_list_item_key: Option<String>,
    /// Path parameter identifying the resource for `find`.
    pub find_key: Option<String>,
    lowering: TypeLowering<'s>,
}

/// Build the rendering contexts of an operation, one per variant.
///
/// # Errors
///
/// Returns `OperationNotFound`, `UnsupportedMediaType` or lowering errors.
pub fn contexts<'s>(request: &OperationRequest<'s>) -> Result<Vec<SdkContext<'s>>> {
    let op = request.operation()?;
    let kind = request.kind(&op);
    let base = request.module_name(&kind);
    tracing::debug!(operation_id = %request.operation_id, kind = %kind, "building sdk contexts");

    if kind == OperationKind::Find {
        return Ok(vec![find_context(request, &op, kind, base)?]);
    }

    let media = request_media(&op, &request.operation_id)?;
    let json_body = match media {
        RequestMedia::Json(schema) => schema,
        _ => None,
    };
    let operation_min_version = op
        .operation
        .openstack()
        .and_then(|os| os.get("min-ver"))
        .and_then(serde_json::Value::as_str);

    variants(
        json_body,
        &base,
        request.params.operation_name.as_deref(),
        operation_min_version,
    )
    .into_iter()
    .map(|variant| variant_context(request, &op, kind.clone(), media, variant))
    .collect()
}

fn variant_context<'s>(
    request: &OperationRequest<'s>,
    op: &OperationRef<'s>,
    kind: OperationKind,
    media: RequestMedia<'s>,
    variant: Variant<'s>,
) -> Result<SdkContext<'s>> {
    let leaf = request.resource.leaf().to_string();
    let body = variant_body(&variant, &leaf);
    let mut ctx = base_context(request, op, kind, variant.module_name)?;
    ctx.microversion = variant.microversion;
    ctx.action = variant.action;

    match media {
        RequestMedia::Empty => {}
        RequestMedia::Patch(media_type) => {
            ctx.lowering.add_import(PATCH_IMPORT);
            ctx.body = BodyShape::Patch;
            ctx.media_type = Some(media_type.to_string());
        }
        RequestMedia::Binary => {
            ctx.body = BodyShape::Binary;
            ctx.media_type = Some(MEDIA_OCTET_STREAM.to_string());
        }
        RequestMedia::Json(_) => {
            ctx.media_type = Some(apigen_core::spec::MEDIA_JSON.to_string());
            if let Some((schema, key)) = body {
                ctx.request_key = request
                    .params
                    .request_key
                    .clone()
                    .or_else(|| key.map(ToString::to_string));
                ctx.body = if schema.is_object() || schema.all_of.iter().any(|s| s.is_object()) {
                    BodyShape::Fields(ctx.lowering.lower_fields(schema, "")?)
                } else if schema.schema_type.is_none() && schema.one_of.is_empty() {
                    BodyShape::Fields(Vec::new())
                } else {
                    let hint = naming::singularize(&naming::module_name(&leaf));
                    BodyShape::Value(ctx.lowering.lower(schema, &hint)?)
                };
            }
        }
    }

    if let Some(schema) = response_schema(op) {
        let located = locate_resource_schema(schema, &leaf);
        ctx.response_key = located.key.map(ToString::to_string);
        ctx.response_list_item_key = located.list_item_key.map(ToString::to_string);
    }
    if request.params.response_key.is_some() {
        ctx.response_key.clone_from(&request.params.response_key);
    }
    if request.params.response_list_item_key.is_some() {
        ctx.response_list_item_key
            .clone_from(&request.params.response_list_item_key);
    }
    if ctx.kind.is_list() {
        ctx.lowering.add_import(PAGEABLE_IMPORT);
    }
    Ok(ctx)
}

fn base_context<'s>(
    request: &OperationRequest<'s>,
    op: &OperationRef<'s>,
    kind: OperationKind,
    module_name: String,
) -> Result<SdkContext<'s>> {
    let mut lowering = TypeLowering::new(request.spec, Dialect::Sdk);
    let singular = naming::singularize(&naming::module_name(request.resource.leaf()));
    let scope = ParameterScope {
        resource_singular: &singular,
        terminal_parameter: terminal_parameter(op.path),
    };

    let mut path_params = Vec::new();
    let mut query_params = Vec::new();
    let mut header_params = Vec::new();
    for param in op.parameters() {
        let lowered = lowering.lower_parameter(param, &scope)?;
        match param.location {
            ParameterLocation::Path => path_params.push(lowered),
            ParameterLocation::Query => query_params.push(lowered),
            ParameterLocation::Header => header_params.push(lowered),
            ParameterLocation::Cookie => {
                tracing::debug!(parameter = %param.name, "cookie parameter ignored");
            }
        }
    }
    path_params.sort_by_key(|p| op.path.find(&format!("{{{}}}", p.wire_name)));

    Ok(SdkContext {
        operation_id: request.operation_id.clone(),
        summary: op
            .operation
            .summary
            .clone()
            .or_else(|| op.operation.description.clone()),
        kind,
        method: op.method,
        url: op.path.trim_start_matches('/').to_string(),
        service_type: request.resource.service_type.clone(),
        resource_name: request.resource.name.clone(),
        module_path: request.module_path(op),
        module_name,
        microversion: None,
        action: None,
        path_params,
        query_params,
        header_params,
        body: BodyShape::None,
        media_type: None,
        request_key: None,
        response_key: None,
        response_list_item_key: None,
        find_key: None,
        lowering,
    })
}

fn find_context<'s>(
    request: &OperationRequest<'s>,
    op: &OperationRef<'s>,
    kind: OperationKind,
    module_name: String,
) -> Result<SdkContext<'s>> {
    if let Some(list_id) = &request.params.list_operation_id {
        request.spec.find_operation(list_id)?;
    }
    let mut ctx = base_context(request, op, kind, module_name)?;
    let terminal = terminal_parameter(op.path);
    ctx.find_key = ctx
        .path_params
        .iter()
        .find(|p| Some(p.wire_name.as_str()) == terminal)
        .map(|p| p.name.clone());
    ctx.query_params.clear();
    ctx.header_params.clear();
    ctx.lowering.add_import(FINDABLE_IMPORT);
    ctx.lowering.add_import(FIND_ERROR_IMPORT);
    ctx.lowering.add_import(crate::lower::imports::COW);
    Ok(ctx)
}

impl SdkContext<'_> {
    /// Every import of the module, sorted.
    #[must_use]
    pub fn imports(&self) -> &BTreeSet<String> {
        self.lowering.imports()
    }

    /// Subtypes declared next to the request.
    pub fn subtypes(&self) -> impl Iterator<Item = &Subtype> {
        self.lowering.subtypes().values()
    }

    /// Whether the request borrows and needs the `'a` lifetime.
    #[must_use]
    pub fn lifetime(&self) -> bool {
        if self.find_key.is_some() {
            return true;
        }
        let params = self
            .path_params
            .iter()
            .chain(&self.query_params)
            .any(|p| self.lowering.borrows(&p.ty));
        let body = match &self.body {
            BodyShape::Fields(fields) => fields.iter().any(|f| self.lowering.borrows(&f.ty)),
            BodyShape::Value(ty) => self.lowering.borrows(ty),
            BodyShape::None | BodyShape::Patch | BodyShape::Binary => false,
        };
        params || body
    }

    /// Render the module source.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let title = self
            .summary
            .as_deref()
            .and_then(|s| s.lines().next())
            .map_or_else(
                || format!("{} `{}`", self.method.as_upper(), self.url),
                ToString::to_string,
            );
        let _ = writeln!(out, "//! {}", title.trim());
        let _ = writeln!(out, "//!");
        let _ = writeln!(out, "//! Operation `{}`.", self.operation_id);
        out.push('\n');

        out.push_str("use derive_builder::Builder;\n");
        out.push_str("use http::{HeaderMap, HeaderValue};\n");
        out.push('\n');
        out.push_str("use crate::api::rest_endpoint_prelude::*;\n");
        if !self.lowering.subtypes().is_empty() {
            out.push_str("use serde::{Deserialize, Serialize};\n");
        }
        for import in self.imports() {
            let _ = writeln!(out, "use {import};");
        }
        if self.find_key.is_some() {
            out.push('\n');
            out.push_str("use super::{list, show};\n");
            out.push('\n');
            self.render_find(&mut out);
            return out;
        }

        for subtype in self.subtypes() {
            out.push('\n');
            self.render_subtype(&mut out, subtype);
        }
        out.push('\n');
        self.render_request(&mut out);
        out.push('\n');
        self.render_endpoint(&mut out);
        if self.kind.is_list() {
            out.push('\n');
            let _ = writeln!(out, "impl Pageable for Request{} {{}}", self.elided());
        }
        out
    }

    fn lt(&self) -> &'static str {
        if self.lifetime() {
            "<'a>"
        } else {
            ""
        }
    }

    fn elided(&self) -> &'static str {
        if self.lifetime() {
            "<'_>"
        } else {
            ""
        }
    }

    fn render_subtype(&self, out: &mut String, subtype: &Subtype) {
        let lt = if self.lowering.subtype_borrows(subtype) {
            "<'a>"
        } else {
            ""
        };
        match subtype {
            Subtype::Struct(def) => {
                out.push_str(&doc_lines(def.description.as_deref(), ""));
                out.push_str("#[derive(Builder, Debug, Deserialize, Clone, Serialize)]\n");
                out.push_str("#[builder(setter(strip_option))]\n");
                let _ = writeln!(out, "pub struct {}{lt} {{", def.name);
                for field in &def.fields {
                    out.push_str(&doc_lines(field.description.as_deref(), "    "));
                    let mut serde = Vec::new();
                    if field.name != field.wire_name {
                        serde.push(format!("rename = {}", rust_str(&field.wire_name)));
                    }
                    if field.ty.is_option() {
                        serde.push("default".to_string());
                        serde.push("skip_serializing_if = \"Option::is_none\"".to_string());
                    }
                    if !serde.is_empty() {
                        let _ = writeln!(out, "    #[serde({})]", serde.join(", "));
                    }
                    out.push_str(builder_attr(&field.ty));
                    let _ = writeln!(
                        out,
                        "    pub(crate) {}: {},",
                        field.name,
                        self.lowering.render(&field.ty)
                    );
                }
                if let Some(additional) = &def.additional {
                    out.push_str("\n    #[builder(setter(name = \"_properties\"), default, private)]\n");
                    out.push_str("    #[serde(flatten)]\n");
                    let _ = writeln!(
                        out,
                        "    _properties: {},",
                        self.lowering.render(additional)
                    );
                }
                out.push_str("}\n");
            }
            Subtype::Enum(def) => {
                out.push_str(&doc_lines(def.description.as_deref(), ""));
                out.push_str("#[derive(Debug, Deserialize, Clone, Serialize)]\n");
                match &def.kind {
                    EnumKind::Strings(variants) => {
                        let _ = writeln!(out, "pub enum {} {{", def.name);
                        for (variant, wire) in variants {
                            let _ = writeln!(out, "    #[serde(rename = {})]", rust_str(wire));
                            let _ = writeln!(out, "    {variant},");
                        }
                    }
                    EnumKind::Microversion(variants) => {
                        out.push_str("#[serde(untagged)]\n");
                        let _ = writeln!(out, "pub enum {}{lt} {{", def.name);
                        for (variant, version, ty) in variants {
                            let _ = writeln!(out, "    /// Microversion {version}.");
                            let _ = writeln!(out, "    {variant}({}),", self.lowering.render(ty));
                        }
                    }
                    EnumKind::Untagged(variants) => {
                        out.push_str("#[serde(untagged)]\n");
                        let _ = writeln!(out, "pub enum {}{lt} {{", def.name);
                        for (variant, ty) in variants {
                            let _ = writeln!(out, "    {variant}({}),", self.lowering.render(ty));
                        }
                    }
                }
                out.push_str("}\n");
            }
        }
    }

    fn render_request(&self, out: &mut String) {
        let lt = self.lt();
        let _ = writeln!(
            out,
            "/// Request of `{}` on `{}`.",
            self.module_name, self.resource_name
        );
        out.push_str("#[derive(Builder, Debug, Clone)]\n");
        out.push_str("#[builder(setter(strip_option))]\n");
        let _ = writeln!(out, "pub struct Request{lt} {{");
        for param in self.path_params.iter().chain(&self.query_params) {
            out.push_str(&doc_lines(param.description.as_deref(), "    "));
            out.push_str(builder_attr(&param.ty));
            let _ = writeln!(
                out,
                "    {}: {},\n",
                param.name,
                self.lowering.render(&param.ty)
            );
        }
        match &self.body {
            BodyShape::None => {}
            BodyShape::Fields(fields) => {
                for field in fields {
                    out.push_str(&doc_lines(field.description.as_deref(), "    "));
                    out.push_str(builder_attr(&field.ty));
                    let _ = writeln!(
                        out,
                        "    pub(crate) {}: {},\n",
                        field.name,
                        self.lowering.render(&field.ty)
                    );
                }
            }
            BodyShape::Value(ty) => {
                out.push_str(builder_attr(ty));
                let _ = writeln!(out, "    pub(crate) body: {},\n", self.lowering.render(ty));
            }
            BodyShape::Patch => {
                out.push_str("    /// JSON patch applied to the resource.\n");
                out.push_str("    #[builder(setter(into))]\n");
                out.push_str("    pub(crate) patch: Patch,\n\n");
            }
            BodyShape::Binary => {
                out.push_str("    /// Raw payload.\n");
                out.push_str("    #[builder(setter(into))]\n");
                out.push_str("    pub(crate) body: Vec<u8>,\n\n");
            }
        }
        out.push_str("    #[builder(setter(name = \"_headers\"), default, private)]\n");
        out.push_str("    _headers: Option<HeaderMap>,\n");
        out.push_str("}\n\n");

        let _ = writeln!(out, "impl{lt} Request{lt} {{");
        out.push_str("    /// Create a builder for the endpoint.\n");
        let _ = writeln!(out, "    pub fn builder() -> RequestBuilder{lt} {{");
        out.push_str("        RequestBuilder::default()\n");
        out.push_str("    }\n");
        out.push_str("}\n\n");

        let _ = writeln!(out, "impl{lt} RequestBuilder{lt} {{");
        out.push_str("    /// Add a single header to the request.\n");
        out.push_str(
            "    pub fn header(&mut self, header_name: &'static str, header_value: &'static str) -> &mut Self {\n",
        );
        out.push_str("        self._headers\n");
        out.push_str("            .get_or_insert(None)\n");
        out.push_str("            .get_or_insert_with(HeaderMap::new)\n");
        out.push_str("            .insert(header_name, HeaderValue::from_static(header_value));\n");
        out.push_str("        self\n");
        out.push_str("    }\n");
        for header in &self.header_params {
            out.push('\n');
            out.push_str(&doc_lines(header.description.as_deref(), "    "));
            let _ = writeln!(
                out,
                "    pub fn {}(&mut self, value: &'static str) -> &mut Self {{",
                header.name
            );
            let _ = writeln!(out, "        self.header({}, value)", rust_str(&header.wire_name));
            out.push_str("    }\n");
        }
        out.push_str("}\n");
    }

    fn render_endpoint(&self, out: &mut String) {
        let _ = writeln!(out, "impl RestEndpoint for Request{} {{", self.elided());
        out.push_str("    fn method(&self) -> http::Method {\n");
        let _ = writeln!(out, "        http::Method::{}", self.method.as_upper());
        out.push_str("    }\n\n");

        out.push_str("    fn endpoint(&self) -> Cow<'static, str> {\n");
        let _ = writeln!(out, "        {}", self.endpoint_expr());
        out.push_str("    }\n");

        if !self.query_params.is_empty() {
            out.push_str("\n    fn parameters(&self) -> QueryParams<'_> {\n");
            out.push_str("        let mut params = QueryParams::default();\n");
            for param in &self.query_params {
                if param.ty.is_option() {
                    let _ = writeln!(
                        out,
                        "        params.push_opt({}, self.{}.as_ref());",
                        rust_str(&param.wire_name),
                        param.name
                    );
                } else {
                    let _ = writeln!(
                        out,
                        "        params.push({}, &self.{});",
                        rust_str(&param.wire_name),
                        param.name
                    );
                }
            }
            out.push_str("        params\n");
            out.push_str("    }\n");
        }

        self.render_body(out);

        out.push_str("\n    fn service_type(&self) -> ServiceType {\n");
        let _ = writeln!(
            out,
            "        ServiceType::{}",
            naming::type_name(&self.service_type)
        );
        out.push_str("    }\n\n");

        out.push_str("    fn response_key(&self) -> Option<Cow<'static, str>> {\n");
        match &self.response_key {
            Some(key) => {
                let _ = writeln!(out, "        Some({}.into())", rust_str(key));
            }
            None => out.push_str("        None\n"),
        }
        out.push_str("    }\n");

        if let Some(key) = &self.response_list_item_key {
            out.push_str("\n    fn response_list_item_key(&self) -> Option<Cow<'static, str>> {\n");
            let _ = writeln!(out, "        Some({}.into())", rust_str(key));
            out.push_str("    }\n");
        }

        out.push_str("\n    fn request_headers(&self) -> Option<&HeaderMap> {\n");
        out.push_str("        self._headers.as_ref()\n");
        out.push_str("    }\n");

        if let Some((major, minor)) = self.microversion.as_deref().and_then(parse_microversion) {
            out.push_str("\n    fn api_version(&self) -> Option<ApiVersion> {\n");
            let _ = writeln!(out, "        Some(ApiVersion::new({major}, {minor}))");
            out.push_str("    }\n");
        }
        out.push_str("}\n");
    }

    fn render_body(&self, out: &mut String) {
        let media = self
            .media_type
            .as_deref()
            .unwrap_or(apigen_core::spec::MEDIA_JSON);
        match &self.body {
            BodyShape::None => {}
            BodyShape::Fields(fields) => {
                out.push_str(
                    "\n    fn body(&self) -> Result<Option<(&'static str, Vec<u8>)>, BodyError> {\n",
                );
                out.push_str("        let mut params = JsonBodyParams::default();\n\n");
                for field in fields {
                    let wire = rust_str(&field.wire_name);
                    if field.ty.is_option() {
                        let _ = writeln!(out, "        if let Some(val) = &self.{} {{", field.name);
                        let _ = writeln!(
                            out,
                            "            params.push({wire}, serde_json::to_value(val)?);"
                        );
                        out.push_str("        }\n");
                    } else {
                        let _ = writeln!(
                            out,
                            "        params.push({wire}, serde_json::to_value(&self.{})?);",
                            field.name
                        );
                    }
                }
                out.push('\n');
                match &self.request_key {
                    Some(key) => {
                        let _ = writeln!(
                            out,
                            "        params.into_body_with_root_key({})",
                            rust_str(key)
                        );
                    }
                    None => out.push_str("        params.into_body()\n"),
                }
                out.push_str("    }\n");
            }
            BodyShape::Value(_) => {
                out.push_str(
                    "\n    fn body(&self) -> Result<Option<(&'static str, Vec<u8>)>, BodyError> {\n",
                );
                match &self.request_key {
                    Some(key) => {
                        let _ = writeln!(
                            out,
                            "        let body = serde_json::json!({{ {}: &self.body }});",
                            rust_str(key)
                        );
                        let _ = writeln!(
                            out,
                            "        Ok(Some(({}, serde_json::to_vec(&body)?)))",
                            rust_str(media)
                        );
                    }
                    None => {
                        let _ = writeln!(
                            out,
                            "        Ok(Some(({}, serde_json::to_vec(&self.body)?)))",
                            rust_str(media)
                        );
                    }
                }
                out.push_str("    }\n");
            }
            BodyShape::Patch => {
                out.push_str(
                    "\n    fn body(&self) -> Result<Option<(&'static str, Vec<u8>)>, BodyError> {\n",
                );
                let _ = writeln!(
                    out,
                    "        Ok(Some(({}, serde_json::to_vec(&self.patch)?)))",
                    rust_str(media)
                );
                out.push_str("    }\n");
            }
            BodyShape::Binary => {
                out.push_str(
                    "\n    fn body(&self) -> Result<Option<(&'static str, Vec<u8>)>, BodyError> {\n",
                );
                let _ = writeln!(
                    out,
                    "        Ok(Some(({}, self.body.clone())))",
                    rust_str(media)
                );
                out.push_str("    }\n");
            }
        }
    }

    /// `format!` expression producing the endpoint with path parameters
    /// substituted by their local bindings.
    fn endpoint_expr(&self) -> String {
        if self.path_params.is_empty() {
            return format!("{}.to_string().into()", rust_str(&self.url));
        }
        let mut template = self.url.clone();
        let mut args = Vec::with_capacity(self.path_params.len());
        for param in &self.path_params {
            template = template.replace(
                &format!("{{{}}}", param.wire_name),
                &format!("{{{}}}", param.name),
            );
            let value = if *param.ty.unwrap_option() == RustType::String {
                format!("{} = self.{}.as_ref()", param.name, param.name)
            } else {
                format!("{} = self.{}", param.name, param.name)
            };
            args.push(value);
        }
        format!("format!({}, {}).into()", rust_str(&template), args.join(", "))
    }

    fn render_find(&self, out: &mut String) {
        let key = self.find_key.as_deref().unwrap_or("id");
        let parents: Vec<&ParamDescriptor> = self
            .path_params
            .iter()
            .filter(|p| p.name != key)
            .collect();

        let _ = writeln!(
            out,
            "/// Find a `{}` by name or id.",
            self.resource_name
        );
        out.push_str("#[derive(Builder, Debug, Clone)]\n");
        out.push_str("#[builder(setter(strip_option))]\n");
        out.push_str("pub struct Request<'a> {\n");
        out.push_str("    /// Name or id of the resource.\n");
        out.push_str("    #[builder(setter(into), default)]\n");
        let _ = writeln!(out, "    {key}: Cow<'a, str>,\n");
        for parent in &parents {
            out.push_str(&doc_lines(parent.description.as_deref(), "    "));
            out.push_str("    #[builder(setter(into), default)]\n");
            let _ = writeln!(out, "    {}: Cow<'a, str>,\n", parent.name);
        }
        out.push_str("    #[builder(setter(name = \"_headers\"), default, private)]\n");
        out.push_str("    _headers: Option<HeaderMap>,\n");
        out.push_str("}\n\n");

        out.push_str("impl<'a> Request<'a> {\n");
        out.push_str("    /// Create a builder for the endpoint.\n");
        out.push_str("    pub fn builder() -> RequestBuilder<'a> {\n");
        out.push_str("        RequestBuilder::default()\n");
        out.push_str("    }\n");
        out.push_str("}\n\n");

        out.push_str("impl<'a> Findable for Request<'a> {\n");
        out.push_str("    type G = show::Request<'a>;\n");
        out.push_str("    type L = list::Request<'a>;\n\n");
        out.push_str("    fn get_ep(&self) -> Result<show::Request<'a>, FindError> {\n");
        out.push_str("        let mut ep = show::Request::builder();\n");
        let _ = writeln!(out, "        ep.{key}(self.{key}.clone());");
        for parent in &parents {
            let _ = writeln!(out, "        ep.{0}(self.{0}.clone());", parent.name);
        }
        out.push_str("        ep.build().map_err(|err| FindError::InvalidEndpoint(err.to_string()))\n");
        out.push_str("    }\n\n");
        out.push_str("    fn list_ep(&self) -> Result<list::Request<'a>, FindError> {\n");
        out.push_str("        let mut ep = list::Request::builder();\n");
        for parent in &parents {
            let _ = writeln!(out, "        ep.{0}(self.{0}.clone());", parent.name);
        }
        out.push_str("        ep.build().map_err(|err| FindError::InvalidEndpoint(err.to_string()))\n");
        out.push_str("    }\n");
        out.push_str("}\n");
    }
}

fn builder_attr(ty: &RustType) -> &'static str {
    if ty.is_option() {
        "    #[builder(default, setter(into))]\n"
    } else {
        "    #[builder(setter(into))]\n"
    }
}

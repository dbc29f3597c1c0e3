//! Command-line front-end target.
//!
//! Each SDK module gets one command module: a clap `Args` struct carrying
//! path, query and body arguments, a `ResponseData` row type for tabular
//! output, and a `take_action` driving the SDK endpoint.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use apigen_core::{Method, OperationKind, OperationRef, ParameterLocation, TargetKind};

use super::{
    doc_lines, request_media, response_schema, variant_body, variants, EmittedFile,
    OperationGenerator, OperationRequest, RenderedFile, RequestMedia, Variant,
};
use crate::error::{GenerateError, Result};
use crate::lower::{Dialect, Field, ParamDescriptor, ParameterScope, RustType, TypeLowering};
use crate::naming::{self, rust_str};
use crate::resource::{locate_resource_schema, terminal_parameter};

/// Default crate path of the SDK the commands call into.
pub const DEFAULT_SDK_CRATE: &str = "openstack_sdk";

/// Fields shown in narrow list output; every other list column is wide.
const BASIC_FIELDS: &[&str] = &["id", "name", "created_at", "updated_at"];

/// Arguments reserved by the command struct itself.
const RESERVED_ARGS: &[&str] = &["path", "query", "file"];

/// CLI generator.
#[derive(Debug, Clone)]
pub struct CliGenerator {
    sdk_crate: String,
}

impl Default for CliGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CliGenerator {
    /// Generator calling into [`DEFAULT_SDK_CRATE`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            sdk_crate: DEFAULT_SDK_CRATE.to_string(),
        }
    }

    /// Crate path of the SDK (e.g. `my_sdk`).
    #[must_use]
    pub fn sdk_crate(mut self, path: &str) -> Self {
        self.sdk_crate = path.to_string();
        self
    }

    /// Build the rendering contexts of an operation, one per variant.
    ///
    /// # Errors
    ///
    /// Returns `OperationNotFound`, `UnsupportedMediaType`,
    /// `MissingResourceSchema` or lowering errors.
    pub fn contexts<'s>(&self, request: &OperationRequest<'s>) -> Result<Vec<CliContext<'s>>> {
        let op = request.operation()?;
        let kind = request.kind(&op);
        let base = request.module_name(&kind);
        tracing::debug!(operation_id = %request.operation_id, kind = %kind, "building cli contexts");

        let media = request_media(&op, &request.operation_id)?;
        let json_body = match media {
            RequestMedia::Json(schema) => schema,
            _ => None,
        };
        variants(
            json_body,
            &base,
            request.params.operation_name.as_deref(),
            None,
        )
        .into_iter()
        .map(|variant| self.variant_context(request, &op, kind.clone(), media, variant))
        .collect()
    }

    fn variant_context<'s>(
        &self,
        request: &OperationRequest<'s>,
        op: &OperationRef<'s>,
        kind: OperationKind,
        media: RequestMedia<'s>,
        variant: Variant<'s>,
    ) -> Result<CliContext<'s>> {
        let leaf = naming::module_name(request.resource.leaf());
        let singular = naming::singularize(&leaf);
        let mut request_lowering = TypeLowering::new(request.spec, Dialect::CliRequest);
        let mut response_lowering = TypeLowering::new(request.spec, Dialect::Cli);

        let scope = ParameterScope {
            resource_singular: &singular,
            terminal_parameter: terminal_parameter(op.path),
        };
        let mut path_params = Vec::new();
        let mut query_params = Vec::new();
        for param in op.parameters() {
            match param.location {
                ParameterLocation::Path => {
                    path_params.push(request_lowering.lower_parameter(param, &scope)?);
                }
                ParameterLocation::Query => {
                    query_params.push(request_lowering.lower_parameter(param, &scope)?);
                }
                ParameterLocation::Header | ParameterLocation::Cookie => {}
            }
        }
        path_params.sort_by_key(|p| op.path.find(&format!("{{{}}}", p.wire_name)));

        let response = response_schema(op);
        let shape = if kind == OperationKind::Download {
            CommandShape::Download
        } else if kind == OperationKind::Upload || media == RequestMedia::Binary {
            CommandShape::Upload
        } else if matches!(media, RequestMedia::Patch(_)) {
            CommandShape::Patch
        } else if op.method == Method::Head
            || op
                .operation
                .success_response()
                .is_some_and(|(code, _)| code == "204")
            || response.is_none()
        {
            CommandShape::HeaderOnly
        } else if kind.is_list() {
            CommandShape::List
        } else {
            CommandShape::Single
        };

        let mut response_fields = Vec::new();
        if let (Some(schema), false) = (response, shape == CommandShape::HeaderOnly) {
            let located = locate_resource_schema(schema, &leaf);
            if !located.schema.is_object() && located.schema.all_of.is_empty() {
                return Err(GenerateError::MissingResourceSchema {
                    operation_id: request.operation_id.clone(),
                });
            }
            response_fields = response_lowering
                .lower_fields(located.schema, "")?
                .into_iter()
                .map(|mut field| {
                    field.ty = field.ty.optional();
                    field
                })
                .collect();
        }

        let mut body_fields: Vec<Field> = match shape {
            CommandShape::Patch => response
                .map(|schema| locate_resource_schema(schema, &leaf).schema)
                .map(|schema| request_lowering.lower_fields(schema, ""))
                .transpose()?
                .unwrap_or_default()
                .into_iter()
                .filter(|field| field.name != "id")
                .map(|mut field| {
                    field.ty = field.ty.optional();
                    field
                })
                .collect(),
            _ => match variant_body(&variant, &leaf) {
                Some((schema, _)) if schema.is_object() || !schema.all_of.is_empty() => {
                    request_lowering.lower_fields(schema, "")?
                }
                _ => Vec::new(),
            },
        };
        for field in &mut body_fields {
            if RESERVED_ARGS.contains(&field.name.as_str()) {
                field.name.push('_');
            }
        }

        let header_columns = if shape == CommandShape::HeaderOnly {
            op.operation
                .success_response()
                .map(|(_, response)| {
                    response
                        .headers
                        .keys()
                        .map(|header| (naming::field_name(header), header.clone()))
                        .collect()
                })
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        let module_path = request.module_path(op);
        let mut sdk_module = vec![self.sdk_crate.clone(), "api".to_string()];
        sdk_module.extend(module_path.iter().map(|s| naming::module_ident(s)));
        sdk_module.push(naming::module_ident(&variant.module_name));

        let command_name = if kind.is_list() {
            format!("{}Command", naming::type_name(&naming::pluralize(&singular)))
        } else {
            format!(
                "{}Command",
                naming::type_name(&format!("{singular}_{}", variant.module_name))
            )
        };
        let about = if kind.is_list() {
            format!("List {}", naming::pluralize(&singular).replace('_', " "))
        } else {
            let verb = variant.action.as_deref().unwrap_or(kind.as_str());
            format!(
                "{} {}",
                capitalize(&verb.replace(['_', '-'], " ")),
                singular.replace('_', " ")
            )
        };

        Ok(CliContext {
            operation_id: request.operation_id.clone(),
            kind,
            shape,
            resource_name: request.resource.name.clone(),
            module_path,
            module_name: variant.module_name,
            command_name,
            about,
            summary: op.operation.summary.clone(),
            sdk_crate: self.sdk_crate.clone(),
            sdk_module: sdk_module.join("::"),
            path_params,
            query_params,
            body_fields,
            response_fields,
            header_columns,
            request_lowering,
            response_lowering,
        })
    }
}

impl OperationGenerator for CliGenerator {
    fn target(&self) -> TargetKind {
        TargetKind::Cli
    }

    fn generate(&self, request: &OperationRequest<'_>) -> Result<Vec<RenderedFile>> {
        Ok(self
            .contexts(request)?
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

/// How a command talks to the endpoint and prints the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandShape {
    /// Paginated listing printed as a table.
    List,
    /// Single resource printed as a record.
    Single,
    /// Response headers printed as a record.
    HeaderOnly,
    /// Binary response streamed to a file.
    Download,
    /// File streamed as the request body.
    Upload,
    /// Resource fetched, modified and sent back as a JSON patch.
    Patch,
}

/// Rendering context of one CLI command module.
#[derive(Debug)]
pub struct CliContext<'s> {
    /// Operation id the command wraps.
    pub operation_id: String,
    /// Effective kind.
    pub kind: OperationKind,
    /// Command shape.
    pub shape: CommandShape,
    /// Hierarchical resource name.
    pub resource_name: String,
    /// Module directory.
    pub module_path: Vec<String>,
    /// File stem.
    pub module_name: String,
    /// Name of the `Args` struct.
    pub command_name: String,
    /// One-line help.
    pub about: String,
    /// Operation summary.
    pub summary: Option<String>,
    /// Crate path of the SDK.
    pub sdk_crate: String,
    /// Path of the wrapped SDK module.
    pub sdk_module: String,
    /// Positional path arguments.
    pub path_params: Vec<ParamDescriptor>,
    /// Query flags.
    pub query_params: Vec<ParamDescriptor>,
    /// Body flags.
    pub body_fields: Vec<Field>,
    /// Output columns.
    pub response_fields: Vec<Field>,
    /// Output columns of header-only commands: `(field, header)`.
    pub header_columns: Vec<(String, String)>,
    request_lowering: TypeLowering<'s>,
    response_lowering: TypeLowering<'s>,
}

impl CliContext<'_> {
    /// Every import of the module, sorted.
    #[must_use]
    pub fn imports(&self) -> BTreeSet<String> {
        let sdk = &self.sdk_crate;
        let mut imports: BTreeSet<String> = [
            "clap::Args".to_string(),
            "serde::{Deserialize, Serialize}".to_string(),
            "tracing::info".to_string(),
            "crate::output::OutputProcessor".to_string(),
            "crate::Cli".to_string(),
            "crate::OpenStackCliError".to_string(),
            "crate::StructTable".to_string(),
            "structable_derive::StructTable".to_string(),
            format!("{sdk}::AsyncOpenStack"),
            self.sdk_module.clone(),
        ]
        .into_iter()
        .collect();
        imports.extend(self.request_lowering.imports().iter().cloned());
        imports.extend(self.response_lowering.imports().iter().cloned());

        let shape_imports: Vec<String> = match self.shape {
            CommandShape::List => vec![
                format!("{sdk}::api::QueryAsync"),
                format!("{sdk}::api::paged"),
                format!("{sdk}::api::Pagination"),
            ],
            CommandShape::Single => vec![format!("{sdk}::api::QueryAsync")],
            CommandShape::HeaderOnly => vec![
                format!("{sdk}::api::RawQueryAsync"),
                "bytes::Bytes".to_string(),
                "http::Response".to_string(),
            ],
            CommandShape::Download => vec![
                format!("{sdk}::api::RawQueryAsync"),
                "crate::common::download_file".to_string(),
            ],
            CommandShape::Upload => vec![
                format!("{sdk}::api::RawQueryAsync"),
                "crate::common::build_upload_asyncread".to_string(),
                "bytes::Bytes".to_string(),
                "http::Response".to_string(),
            ],
            CommandShape::Patch => vec![
                format!("{sdk}::api::QueryAsync"),
                "json_patch::diff".to_string(),
                "json_patch::Patch".to_string(),
                "serde_json::json".to_string(),
                self.show_module(),
            ],
        };
        imports.extend(shape_imports);
        imports
    }

    fn show_module(&self) -> String {
        match self.sdk_module.rsplit_once("::") {
            Some((parent, _)) => format!("{parent}::show"),
            None => "show".to_string(),
        }
    }

    fn endpoint_module(&self) -> &str {
        self.sdk_module
            .rsplit("::")
            .next()
            .unwrap_or(self.sdk_module.as_str())
    }

    /// Render the module source.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "//! {} command", self.about);
        let _ = writeln!(out, "//!");
        let _ = writeln!(out, "//! Wraps operation `{}`.", self.operation_id);
        out.push('\n');
        for import in self.imports() {
            let _ = writeln!(out, "use {import};");
        }
        out.push('\n');
        self.render_args(&mut out);
        out.push('\n');
        self.render_response(&mut out);
        out.push('\n');
        self.render_take_action(&mut out);
        out
    }

    fn render_args(&self, out: &mut String) {
        let doc = self.summary.as_deref().unwrap_or(self.about.as_str());
        out.push_str(&doc_lines(Some(doc), ""));
        out.push_str("#[derive(Args)]\n");
        let _ = writeln!(out, "#[command(about = {})]", rust_str(&self.about));
        let _ = writeln!(out, "pub struct {} {{", self.command_name);
        out.push_str("    /// Request query parameters\n");
        out.push_str("    #[command(flatten)]\n");
        out.push_str("    query: QueryParameters,\n\n");
        out.push_str("    /// Path parameters\n");
        out.push_str("    #[command(flatten)]\n");
        out.push_str("    path: PathParameters,\n");
        for field in &self.body_fields {
            out.push('\n');
            out.push_str(&doc_lines(field.description.as_deref(), "    "));
            let _ = writeln!(out, "    {}", self.arg_attr(&field.ty));
            let _ = writeln!(
                out,
                "    {}: {},",
                field.name,
                self.request_lowering.render(&field.ty)
            );
        }
        if matches!(self.shape, CommandShape::Download | CommandShape::Upload) {
            out.push('\n');
            out.push_str("    /// Local file to stream (stdout/stdin when absent)\n");
            out.push_str("    #[arg(long, value_name = \"PATH\")]\n");
            out.push_str("    file: Option<String>,\n");
        }
        out.push_str("}\n\n");

        out.push_str("/// Query parameters\n");
        out.push_str("#[derive(Args)]\n");
        out.push_str("struct QueryParameters {\n");
        for param in &self.query_params {
            out.push_str(&doc_lines(param.description.as_deref(), "    "));
            let _ = writeln!(out, "    {}", self.arg_attr(&param.ty));
            let _ = writeln!(
                out,
                "    {}: {},\n",
                param.name,
                self.request_lowering.render(&param.ty.clone().optional())
            );
        }
        out.push_str("}\n\n");

        out.push_str("/// Path parameters\n");
        out.push_str("#[derive(Args)]\n");
        out.push_str("struct PathParameters {\n");
        for param in &self.path_params {
            out.push_str(&doc_lines(param.description.as_deref(), "    "));
            let _ = writeln!(
                out,
                "    #[arg(id = {}, value_name = {})]",
                rust_str(&format!("path_param_{}", param.name)),
                rust_str(&param.name.trim_start_matches('_').to_uppercase())
            );
            let _ = writeln!(out, "    {}: String,\n", param.name);
        }
        out.push_str("}\n");
    }

    fn arg_attr(&self, ty: &RustType) -> String {
        match ty.unwrap_option() {
            RustType::Bool => "#[arg(action = clap::ArgAction::Set, long)]".to_string(),
            RustType::Vec(_) | RustType::CommaSeparated(_) => {
                "#[arg(action = clap::ArgAction::Append, long)]".to_string()
            }
            RustType::Json => {
                "#[arg(long, value_name = \"JSON\", value_parser = crate::common::parse_json)]"
                    .to_string()
            }
            RustType::Map(inner) => format!(
                "#[arg(long, value_name = \"key=value\", value_parser = crate::common::parse_key_val::<String, {}>)]",
                self.request_lowering.render(inner)
            ),
            _ => "#[arg(long)]".to_string(),
        }
    }

    fn render_response(&self, out: &mut String) {
        let singular = naming::singularize(&naming::module_name(
            self.resource_name.rsplit('/').next().unwrap_or(&self.resource_name),
        ));
        let _ = writeln!(
            out,
            "/// {} response representation",
            naming::type_name(&singular)
        );
        out.push_str("#[derive(Deserialize, Serialize, Clone, Default, StructTable)]\n");
        out.push_str("struct ResponseData {\n");
        if self.shape == CommandShape::HeaderOnly {
            for (field, header) in &self.header_columns {
                let _ = writeln!(out, "    /// `{header}` header");
                let _ = writeln!(out, "    #[serde(rename = {})]", rust_str(header));
                out.push_str("    #[structable(optional)]\n");
                let _ = writeln!(out, "    {field}: Option<String>,\n");
            }
        } else {
            let list = self.shape == CommandShape::List;
            for field in &self.response_fields {
                out.push_str(&doc_lines(field.description.as_deref(), "    "));
                if field.name != field.wire_name {
                    let _ = writeln!(out, "    #[serde(rename = {})]", rust_str(&field.wire_name));
                }
                if list && !BASIC_FIELDS.contains(&field.wire_name.as_str()) {
                    out.push_str("    #[structable(optional, wide)]\n");
                } else {
                    out.push_str("    #[structable(optional)]\n");
                }
                let _ = writeln!(
                    out,
                    "    {}: {},\n",
                    field.name,
                    self.response_lowering.render(&field.ty)
                );
            }
        }
        out.push_str("}\n");
    }

    fn render_take_action(&self, out: &mut String) {
        let endpoint = self.endpoint_module();
        let _ = writeln!(out, "impl {} {{", self.command_name);
        out.push_str("    /// Perform command action\n");
        out.push_str("    pub async fn take_action(\n");
        out.push_str("        &self,\n");
        out.push_str("        parsed_args: &Cli,\n");
        out.push_str("        client: &mut AsyncOpenStack,\n");
        out.push_str("    ) -> Result<(), OpenStackCliError> {\n");
        let _ = writeln!(out, "        info!({});", rust_str(&self.about));
        out.push('\n');
        out.push_str("        let op = OutputProcessor::from_args(parsed_args);\n");
        out.push_str("        op.validate_args(parsed_args)?;\n\n");
        let _ = writeln!(out, "        let mut ep_builder = {endpoint}::Request::builder();");
        for param in &self.path_params {
            let _ = writeln!(out, "        ep_builder.{0}(&self.path.{0});", param.name);
        }
        for param in &self.query_params {
            let _ = writeln!(out, "        if let Some(val) = &self.query.{} {{", param.name);
            let _ = writeln!(
                out,
                "            ep_builder.{}({});",
                param.name,
                setter_value(&param.ty)
            );
            out.push_str("        }\n");
        }

        if self.shape == CommandShape::Patch {
            self.render_patch_body(out);
        } else {
            for field in &self.body_fields {
                let setter = field.name.trim_end_matches('_');
                if field.ty.is_option() {
                    let _ = writeln!(out, "        if let Some(val) = &self.{} {{", field.name);
                    let _ = writeln!(
                        out,
                        "            ep_builder.{setter}({});",
                        setter_value(&field.ty)
                    );
                    out.push_str("        }\n");
                } else {
                    let _ = writeln!(
                        out,
                        "        ep_builder.{setter}({});",
                        setter_value(&field.ty).replace("val", &format!("&self.{}", field.name))
                    );
                }
            }
        }

        out.push_str("\n        let ep = ep_builder\n");
        out.push_str("            .build()\n");
        out.push_str("            .map_err(|x| OpenStackCliError::EndpointBuild(x.to_string()))?;\n\n");

        match self.shape {
            CommandShape::List => {
                out.push_str("        let data: Vec<serde_json::Value> = paged(ep, Pagination::All)\n");
                out.push_str("            .query_async(client)\n");
                out.push_str("            .await?;\n");
                out.push_str("        op.output_list::<ResponseData>(data)?;\n");
            }
            CommandShape::Single | CommandShape::Patch => {
                out.push_str("        let data = ep.query_async(client).await?;\n");
                out.push_str("        op.output_single::<ResponseData>(data)?;\n");
            }
            CommandShape::HeaderOnly => {
                out.push_str("        let rsp: Response<Bytes> = ep.raw_query_async(client).await?;\n");
                out.push_str("        let data = ResponseData {\n");
                for (field, header) in &self.header_columns {
                    let _ = writeln!(out, "            {field}: rsp");
                    out.push_str("                .headers()\n");
                    let _ = writeln!(out, "                .get({})", rust_str(header));
                    out.push_str("                .and_then(|v| v.to_str().ok())\n");
                    out.push_str("                .map(ToString::to_string),\n");
                }
                out.push_str("        };\n");
                out.push_str("        op.output_single::<ResponseData>(serde_json::to_value(data)?)?;\n");
            }
            CommandShape::Download => {
                out.push_str("        let (headers, data) = ep.download_async(client).await?;\n");
                out.push_str("        let size: u64 = headers\n");
                out.push_str("            .get(\"content-length\")\n");
                out.push_str("            .and_then(|x| x.to_str().ok())\n");
                out.push_str("            .and_then(|x| x.parse().ok())\n");
                out.push_str("            .unwrap_or(0);\n");
                out.push_str("        download_file(self.file.clone().unwrap_or_default(), size, data).await?;\n");
            }
            CommandShape::Upload => {
                out.push_str("        let data = build_upload_asyncread(self.file.clone()).await?;\n");
                out.push_str("        let _rsp: Response<Bytes> = ep.raw_query_read_body_async(client, data).await?;\n");
            }
        }
        out.push_str("        Ok(())\n");
        out.push_str("    }\n");
        out.push_str("}\n");
    }

    fn render_patch_body(&self, out: &mut String) {
        out.push_str("\n        let mut find_builder = show::Request::builder();\n");
        for param in &self.path_params {
            let _ = writeln!(out, "        find_builder.{0}(&self.path.{0});", param.name);
        }
        out.push_str("        let find_ep = find_builder\n");
        out.push_str("            .build()\n");
        out.push_str("            .map_err(|x| OpenStackCliError::EndpointBuild(x.to_string()))?;\n");
        out.push_str("        let current: serde_json::Value = find_ep.query_async(client).await?;\n");
        out.push_str("        let mut new = current.clone();\n");
        for field in &self.body_fields {
            let _ = writeln!(out, "        if let Some(val) = &self.{} {{", field.name);
            let _ = writeln!(
                out,
                "            new[{}] = json!(val);",
                rust_str(&field.wire_name)
            );
            out.push_str("        }\n");
        }
        out.push_str("        let patch: Patch = diff(&current, &new);\n");
        out.push_str("        ep_builder.patch(patch);\n");
    }
}

/// Expression passing `val` (a reference to the argument) to an SDK setter.
fn setter_value(ty: &RustType) -> String {
    match ty.unwrap_option() {
        RustType::String => "val".to_string(),
        RustType::DateTime
        | RustType::I32
        | RustType::I64
        | RustType::F32
        | RustType::F64
        | RustType::Bool => "*val".to_string(),
        RustType::Vec(_) | RustType::CommaSeparated(_) => {
            "val.iter().map(Into::into).collect::<Vec<_>>()".to_string()
        }
        RustType::Map(_) => "val.iter().cloned()".to_string(),
        RustType::Json
        | RustType::Named(_)
        | RustType::Boxed(_)
        | RustType::Option(_) => "val.clone()".to_string(),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use apigen_core::{parse_spec, ResourceId, Spec};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn spec() -> Spec {
        parse_spec(indoc! {"
            openapi: 3.1.0
            paths:
              /v2/servers:
                get:
                  operationId: servers:get
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
                                    flavor: {type: object, properties: {id: {type: string}}}
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
                delete:
                  operationId: servers/id:delete
                  parameters:
                    - {name: id, in: path, required: true, schema: {type: string}}
                  responses:
                    '204':
                      description: Deleted
              /v2/images/{id}:
                patch:
                  operationId: images/id:patch
                  parameters:
                    - {name: id, in: path, required: true, schema: {type: string}}
                  requestBody:
                    content:
                      application/openstack-images-v2.1-json-patch: {}
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
              /v2/images/{id}/file:
                get:
                  operationId: images/id/file:get
                  parameters:
                    - {name: id, in: path, required: true, schema: {type: string}}
                  responses:
                    '200':
                      description: OK
                      content:
                        application/octet-stream: {}
                put:
                  operationId: images/id/file:put
                  parameters:
                    - {name: id, in: path, required: true, schema: {type: string}}
                  requestBody:
                    content:
                      application/octet-stream: {}
                  responses:
                    '204':
                      description: Stored
        "})
        .unwrap()
    }

    fn context<'s>(spec: &'s Spec, resource: &str, operation_id: &str) -> CliContext<'s> {
        let request = OperationRequest::new(spec, ResourceId::new("compute", resource), operation_id);
        let mut contexts = CliGenerator::new().contexts(&request).unwrap();
        assert_eq!(contexts.len(), 1);
        contexts.remove(0)
    }

    #[test]
    fn list_command_is_plural_and_paginated() {
        let spec = spec();
        let ctx = context(&spec, "servers", "servers:get");
        assert_eq!(ctx.shape, CommandShape::List);
        assert_eq!(ctx.command_name, "ServersCommand");
        assert_eq!(ctx.about, "List servers");
        let imports = ctx.imports();
        assert!(imports.contains("openstack_sdk::api::paged"));
        assert!(imports.contains("openstack_sdk::api::Pagination"));
        assert!(imports.contains("openstack_sdk::api::compute::v2::servers::list"));

        let source = ctx.render();
        assert!(source.contains("#[structable(optional, wide)]\n    flavor: Option<Value>,"));
        assert!(source.contains("#[structable(optional)]\n    name: Option<String>,"));
        syn::parse_file(&source).unwrap();
    }

    #[test]
    fn no_content_response_prints_headers() {
        let spec = spec();
        let ctx = context(&spec, "servers", "servers/id:delete");
        assert_eq!(ctx.shape, CommandShape::HeaderOnly);
        assert!(ctx.imports().contains("openstack_sdk::api::RawQueryAsync"));
        syn::parse_file(&ctx.render()).unwrap();
    }

    #[test]
    fn patch_imports_diff_and_patch() {
        let spec = spec();
        let ctx = context(&spec, "images", "images/id:patch");
        assert_eq!(ctx.shape, CommandShape::Patch);
        let imports = ctx.imports();
        assert!(imports.contains("json_patch::diff"));
        assert!(imports.contains("json_patch::Patch"));
        let names: Vec<_> = ctx.body_fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "visibility"]);
        syn::parse_file(&ctx.render()).unwrap();
    }

    #[test]
    fn download_and_upload_use_streaming_helpers() {
        let spec = spec();
        let download = context(&spec, "images/file", "images/id/file:get");
        assert_eq!(download.kind, OperationKind::Download);
        assert!(download.imports().contains("crate::common::download_file"));
        syn::parse_file(&download.render()).unwrap();

        let upload = context(&spec, "images/file", "images/id/file:put");
        assert_eq!(upload.kind, OperationKind::Upload);
        assert!(upload.imports().contains("crate::common::build_upload_asyncread"));
        syn::parse_file(&upload.render()).unwrap();
    }

    #[test]
    fn custom_sdk_crate() {
        let spec = spec();
        let request =
            OperationRequest::new(&spec, ResourceId::new("compute", "servers"), "servers/id:get");
        let contexts = CliGenerator::new().sdk_crate("my_sdk").contexts(&request).unwrap();
        assert_eq!(contexts[0].sdk_module, "my_sdk::api::compute::v2::servers::show");
        assert_eq!(contexts[0].command_name, "ServerShowCommand");
    }

    #[test]
    fn non_object_response_is_missing_resource_schema() {
        let spec = parse_spec(indoc! {"
            openapi: 3.1.0
            paths:
              /v2/versions:
                get:
                  operationId: versions:get
                  responses:
                    '200':
                      description: OK
                      content:
                        application/json:
                          schema: {type: string}
        "})
        .unwrap();
        let request = OperationRequest::new(&spec, ResourceId::new("compute", "versions"), "versions:get");
        assert!(matches!(
            CliGenerator::new().contexts(&request),
            Err(GenerateError::MissingResourceSchema { .. })
        ));
    }
}

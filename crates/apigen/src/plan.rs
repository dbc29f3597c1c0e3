//! Plan executor: resolves a request into generator calls, then writes and
//! formats what they render.
//!
//! A request runs in one of five modes, picked from its target and inputs:
//!
//! | Inputs | Mode |
//! |---|---|
//! | target `openapi-spec`, route map | document extraction |
//! | target `metadata`, spec, service type | metadata synthesis |
//! | descriptor file, class name | one resource descriptor |
//! | spec, operation id | one operation, kind from the classifier |
//! | metadata | every matching `(resource, operation)` pair |

use std::path::{Path, PathBuf};

use apigen_build::generate::metadata::synthesize;
use apigen_build::generate::openapi::{self, ProseFile, RouteMap};
use apigen_build::{
    resource_name, AnsibleGenerator, CliGenerator, GenerateError, JsonSchemaGenerator, Language,
    ModuleIndexBuilder, OperationGenerator, OperationRequest, OscGenerator, RenderedFile,
    ResourceDescriptor, ResourceDescriptorFile, ResourceGenerator, ResourceRequest, SdkGenerator,
};
use apigen_core::{load_spec, Metadata, OperationKind, ResourceId, ResourceMetadata, TargetKind};

use crate::config::ProjectConfig;
use crate::error::{Error, Result};
use crate::format;
use crate::output::OutputWriter;

/// Resource extension holding an inline resource descriptor.
pub const DESCRIPTOR_EXTENSION: &str = "descriptor";

/// API version of resource-level output when none is known.
pub const DEFAULT_API_VERSION: &str = "v1";

/// One invocation of the generator.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// Target to generate.
    pub target: TargetKind,
    /// Directory the configured output roots are relative to.
    pub work_dir: PathBuf,
    /// Metadata file: input of metadata mode, output of the `metadata` target.
    pub metadata: Option<PathBuf>,
    /// OpenAPI document of direct operation mode and the `metadata` target.
    pub openapi_spec: Option<PathBuf>,
    /// Operation of direct operation mode.
    pub operation_id: Option<String>,
    /// Service type outside metadata mode.
    pub service_type: Option<String>,
    /// API version outside metadata mode.
    pub api_version: Option<String>,
    /// Only resources whose service type starts with this.
    pub service: Option<String>,
    /// Only resources whose hierarchical name starts with this.
    pub resource: Option<String>,
    /// Resource descriptor file.
    pub module: Option<PathBuf>,
    /// Class in the descriptor file.
    pub class_name: Option<String>,
    /// Route map of the `openapi-spec` target.
    pub route_map: Option<PathBuf>,
    /// Prose file of the `openapi-spec` target.
    pub prose: Option<PathBuf>,
}

impl PlanRequest {
    /// Request for `target` with every input unset and the current
    /// directory as work directory.
    #[must_use]
    pub fn new(target: TargetKind) -> Self {
        Self {
            target,
            work_dir: PathBuf::from("."),
            metadata: None,
            openapi_spec: None,
            operation_id: None,
            service_type: None,
            api_version: None,
            service: None,
            resource: None,
            module: None,
            class_name: None,
            route_map: None,
            prose: None,
        }
    }

    fn required<'a, T: ?Sized>(value: Option<&'a T>, message: &str) -> Result<&'a T> {
        value.ok_or_else(|| Error::usage(message))
    }

    fn matches(&self, id: &ResourceId) -> bool {
        self.service
            .as_deref()
            .is_none_or(|prefix| id.service_type.starts_with(prefix))
            && self
                .resource
                .as_deref()
                .is_none_or(|prefix| id.name.starts_with(prefix))
    }
}

/// Files rendered for one request, relative to `root`.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Output root.
    pub root: PathBuf,
    /// Rendered files in generation order.
    pub files: Vec<RenderedFile>,
}

/// Outcome of a written plan.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Written files, in generation order.
    pub written: Vec<PathBuf>,
    /// Formatter runs that failed (already logged as warnings).
    pub formatter_failures: usize,
}

/// Runs requests against one project config.
#[derive(Debug, Clone, Default)]
pub struct PlanExecutor {
    config: ProjectConfig,
}

impl PlanExecutor {
    /// Executor using `config`.
    #[must_use]
    pub fn new(config: ProjectConfig) -> Self {
        Self { config }
    }

    /// Project config in use.
    #[must_use]
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Render, write and format.
    ///
    /// When an operation fails, the files rendered before it are still
    /// written (module aggregators excluded) and the failure is returned.
    ///
    /// # Errors
    ///
    /// Returns the first planning or write error. Formatter failures are
    /// counted in the report instead.
    pub fn execute(&self, request: &PlanRequest) -> Result<Report> {
        let (plan, outcome) = self.render(request);
        if let Err(err) = outcome {
            if !plan.files.is_empty() {
                tracing::warn!(
                    files = plan.files.len(),
                    "writing output rendered before the failure"
                );
                self.write(&plan)?;
            }
            return Err(err);
        }
        self.write(&plan)
    }

    /// Render every file of a request without touching the output tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] when the request lacks an input of its mode,
    /// [`Error::Operation`] when one operation fails, and load errors of
    /// the inputs.
    pub fn plan(&self, request: &PlanRequest) -> Result<Plan> {
        let (plan, outcome) = self.render(request);
        outcome.map(|()| plan)
    }

    /// Render into a plan, stopping at the first failure. The plan holds
    /// everything rendered up to that point.
    fn render(&self, request: &PlanRequest) -> (Plan, Result<()>) {
        let mut plan = Plan {
            root: request.work_dir.join(self.config.root(request.target)),
            files: Vec::new(),
        };
        let outcome = match request.target {
            TargetKind::OpenapiSpec => match Self::extraction(request) {
                Ok(file) => {
                    plan.files.push(file);
                    Ok(())
                }
                Err(err) => Err(err),
            },
            TargetKind::Metadata => Self::synthesis(request, &mut plan),
            _ => self.generation(request, &mut plan.files),
        };
        (plan, outcome)
    }

    fn generation(&self, request: &PlanRequest, files: &mut Vec<RenderedFile>) -> Result<()> {
        match (&request.module, &request.class_name) {
            (Some(module), Some(class_name)) => {
                files.extend(self.descriptor_mode(request, module, class_name)?);
                Ok(())
            }
            (Some(_), None) | (None, Some(_)) => {
                Err(Error::usage("--module and --class-name go together"))
            }
            (None, None) => match (&request.openapi_spec, &request.operation_id) {
                (Some(spec), Some(operation_id)) => {
                    files.extend(self.operation_mode(request, spec, operation_id)?);
                    Ok(())
                }
                _ => {
                    let metadata = PlanRequest::required(
                        request.metadata.as_deref(),
                        "--metadata is required (or --openapi-yaml-spec with --openapi-operation-id)",
                    )?;
                    self.metadata_mode(request, metadata, files)
                }
            },
        }
    }

    /// Write a plan and run the formatters over what was written.
    ///
    /// # Errors
    ///
    /// Returns the first write error.
    pub fn write(&self, plan: &Plan) -> Result<Report> {
        let writer = OutputWriter::new(&plan.root);
        let mut report = Report::default();
        let mut rust = Vec::new();
        let mut python = Vec::new();
        for file in &plan.files {
            let path = writer.write(file)?;
            match file.language {
                Language::Rust => rust.push(path.clone()),
                Language::Python => python.push(path.clone()),
                Language::Json | Language::Yaml => {}
            }
            report.written.push(path);
        }

        for (language, paths) in [(Language::Rust, rust), (Language::Python, python)] {
            let Some(formatter) = self.config.formatter(language) else {
                continue;
            };
            if let Err(err) = format::run(formatter, &paths) {
                tracing::warn!(%err, "output left unformatted");
                report.formatter_failures += 1;
            }
        }
        tracing::info!(
            root = %plan.root.display(),
            files = report.written.len(),
            "generation finished"
        );
        Ok(report)
    }

    /// Check that every operation of the selected resources resolves to an
    /// operation of its spec file. Nothing is written.
    ///
    /// Returns the number of checked operations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] after logging each unresolved operation.
    pub fn validate(&self, request: &PlanRequest) -> Result<usize> {
        let path = PlanRequest::required(request.metadata.as_deref(), "--validate needs --metadata")?;
        let metadata = Metadata::load(path)?;
        let base = base_dir(path);

        let mut checked = 0;
        let mut failed = 0;
        for (id, resource) in select(&metadata, request)? {
            for (key, op) in &resource.operations {
                let spec_file = base.join(op.spec_file.as_deref().unwrap_or(&resource.spec_file));
                let list_ids = op
                    .targets
                    .values()
                    .filter_map(|params| params.list_operation_id.as_deref());
                for operation_id in std::iter::once(op.operation_id.as_str()).chain(list_ids) {
                    checked += 1;
                    let resolved = load_spec(&spec_file).and_then(|spec| {
                        spec.find_operation(operation_id)?;
                        Ok(())
                    });
                    if let Err(err) = resolved {
                        failed += 1;
                        tracing::error!(
                            resource = %id,
                            operation = key.as_str(),
                            spec_file = %spec_file.display(),
                            %err,
                            "unresolved operation"
                        );
                    }
                }
            }
        }
        if failed > 0 {
            return Err(Error::Validation { failed, checked });
        }
        tracing::info!(checked, "metadata is valid");
        Ok(checked)
    }

    fn operation_generator(&self, target: TargetKind) -> Option<Box<dyn OperationGenerator>> {
        match target {
            TargetKind::Sdk => Some(Box::new(SdkGenerator)),
            TargetKind::Cli => Some(Box::new(
                CliGenerator::new().sdk_crate(&self.config.sdk_crate),
            )),
            _ => None,
        }
    }

    fn resource_generator(target: TargetKind) -> Option<Box<dyn ResourceGenerator>> {
        match target {
            TargetKind::Jsonschema => Some(Box::new(JsonSchemaGenerator)),
            TargetKind::Osc => Some(Box::new(OscGenerator)),
            TargetKind::Ansible => Some(Box::new(AnsibleGenerator)),
            _ => None,
        }
    }

    fn extraction(request: &PlanRequest) -> Result<RenderedFile> {
        let path = PlanRequest::required(
            request.route_map.as_deref(),
            "the openapi-spec target needs --route-map",
        )?;
        let map = RouteMap::load(path)?;
        let prose = request
            .prose
            .as_deref()
            .map(ProseFile::load)
            .transpose()?;
        tracing::debug!(service = %map.service_type, routes = map.routes.len(), "extracting");
        Ok(openapi::render(&map, prose.as_ref())?)
    }

    fn synthesis(request: &PlanRequest, plan: &mut Plan) -> Result<()> {
        let spec_path = PlanRequest::required(
            request.openapi_spec.as_deref(),
            "the metadata target needs --openapi-yaml-spec",
        )?;
        let service_type = PlanRequest::required(
            request.service_type.as_deref(),
            "the metadata target needs --service-type",
        )?;
        let file_name = match &request.metadata {
            Some(path) => {
                let name = path
                    .file_name()
                    .ok_or_else(|| Error::usage("--metadata must name a file"))?;
                plan.root = base_dir(path).to_path_buf();
                PathBuf::from(name)
            }
            None => PathBuf::from(format!("{service_type}_metadata.yaml")),
        };

        let spec = load_spec(spec_path)?;
        let spec_file = relative_to(spec_path, &plan.root);
        let metadata = synthesize(&spec, service_type, &spec_file, request.api_version.as_deref())?;
        plan.files
            .push(RenderedFile::new(file_name, Language::Yaml, metadata.to_yaml()?));
        Ok(())
    }

    fn descriptor_mode(
        &self,
        request: &PlanRequest,
        module: &Path,
        class_name: &str,
    ) -> Result<Vec<RenderedFile>> {
        let generator = Self::resource_generator(request.target).ok_or_else(|| {
            Error::usage(format!(
                "target '{}' does not take a resource descriptor",
                request.target
            ))
        })?;
        let service_type = PlanRequest::required(
            request.service_type.as_deref(),
            "--module needs --service-type",
        )?;
        let file = ResourceDescriptorFile::load(module)?;
        let descriptor = file.get(class_name)?;
        Ok(generator.generate(&ResourceRequest {
            service_type,
            api_version: request.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION),
            descriptor,
        })?)
    }

    fn operation_mode(
        &self,
        request: &PlanRequest,
        spec_path: &Path,
        operation_id: &str,
    ) -> Result<Vec<RenderedFile>> {
        let generator = self.operation_generator(request.target).ok_or_else(|| {
            Error::usage(format!(
                "target '{}' does not generate single operations",
                request.target
            ))
        })?;
        let service_type = PlanRequest::required(
            request.service_type.as_deref(),
            "--openapi-operation-id needs --service-type",
        )?;
        let operation_error = |source: GenerateError| Error::Operation {
            operation_id: operation_id.to_string(),
            spec_file: spec_path.to_path_buf(),
            source,
        };

        let spec = load_spec(spec_path).map_err(|err| operation_error(err.into()))?;
        let op = spec
            .find_operation(operation_id)
            .map_err(|err| operation_error(err.into()))?;
        let resource = ResourceId::new(service_type, &resource_name(op.path));
        let op_request = OperationRequest::new(&spec, resource, operation_id)
            .api_version(request.api_version.as_deref());
        generator.generate(&op_request).map_err(operation_error)
    }

    /// Render every selected `(resource, operation)` pair into `files`.
    /// Aggregators are appended only once every operation has rendered.
    fn metadata_mode(
        &self,
        request: &PlanRequest,
        path: &Path,
        files: &mut Vec<RenderedFile>,
    ) -> Result<()> {
        let metadata = Metadata::load(path)?;
        let base = base_dir(path);
        let selected = select(&metadata, request)?;

        if let Some(generator) = self.operation_generator(request.target) {
            for (id, resource) in &selected {
                for (key, op) in &resource.operations {
                    let Some(params) = op.targets.get(&request.target) else {
                        continue;
                    };
                    let spec_file =
                        base.join(op.spec_file.as_deref().unwrap_or(&resource.spec_file));
                    let operation_error = |source: GenerateError| Error::Operation {
                        operation_id: op.operation_id.clone(),
                        spec_file: spec_file.clone(),
                        source,
                    };
                    let spec = load_spec(&spec_file).map_err(|err| operation_error(err.into()))?;
                    let op_request = OperationRequest::new(&spec, id.clone(), &op.operation_id)
                        .operation_key(key)
                        .operation_kind(op.operation_type.clone())
                        .api_version(resource.api_version.as_deref())
                        .params(params.clone());
                    tracing::debug!(resource = %id, operation = key.as_str(), "generating");
                    files.extend(generator.generate(&op_request).map_err(operation_error)?);
                }
            }
            if request.resource.is_none() {
                let mut index = ModuleIndexBuilder::new();
                index.extend(files.iter().filter_map(|file| file.module.as_ref()));
                let aggregators = index.build().render();
                files.extend(aggregators);
            }
        } else if let Some(generator) = Self::resource_generator(request.target) {
            for (id, resource) in &selected {
                let wanted = resource
                    .operations
                    .values()
                    .any(|op| op.targets.contains_key(&request.target));
                if !wanted {
                    continue;
                }
                let descriptor = resource_descriptor(id, resource, base)?;
                files.extend(generator.generate(&ResourceRequest {
                    service_type: &id.service_type,
                    api_version: resource.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION),
                    descriptor: &descriptor,
                })?);
            }
        } else {
            return Err(Error::usage(format!(
                "target '{}' does not read metadata",
                request.target
            )));
        }
        Ok(())
    }
}

/// Resources matching the request filters, in metadata order.
fn select<'m>(
    metadata: &'m Metadata,
    request: &PlanRequest,
) -> Result<Vec<(ResourceId, &'m ResourceMetadata)>> {
    let selected: Vec<_> = metadata
        .resources
        .iter()
        .map(|(key, resource)| (ResourceId::parse(key), resource))
        .filter(|(id, _)| request.matches(id))
        .collect();
    if selected.is_empty() && (request.service.is_some() || request.resource.is_some()) {
        let filter = [request.service.as_deref(), request.resource.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(".");
        return Err(Error::UnknownResource { filter });
    }
    Ok(selected)
}

/// Descriptor of a metadata resource: the inline extension if present, else
/// derived from its `show` operation with capabilities from its other
/// operations.
fn resource_descriptor(
    id: &ResourceId,
    resource: &ResourceMetadata,
    base: &Path,
) -> Result<ResourceDescriptor> {
    if let Some(value) = resource.extensions.get(DESCRIPTOR_EXTENSION) {
        return Ok(serde_json::from_value(value.clone()).map_err(GenerateError::from)?);
    }

    let kinds: Vec<OperationKind> = resource
        .operations
        .iter()
        .map(|(key, op)| {
            op.operation_type
                .clone()
                .unwrap_or_else(|| OperationKind::from(key.as_str()))
        })
        .collect();
    let show = resource
        .operations
        .values()
        .zip(&kinds)
        .find_map(|(op, kind)| (*kind == OperationKind::Show).then_some(op))
        .ok_or_else(|| GenerateError::MissingResourceDescriptor {
            name: id.to_string(),
        })?;

    let spec_file = base.join(show.spec_file.as_deref().unwrap_or(&resource.spec_file));
    let operation_error = |source: GenerateError| Error::Operation {
        operation_id: show.operation_id.clone(),
        spec_file: spec_file.clone(),
        source,
    };
    let spec = load_spec(&spec_file).map_err(|err| operation_error(err.into()))?;
    let descriptor = ResourceDescriptor::from_operation(&spec, &show.operation_id, id.leaf())
        .map_err(operation_error)?;
    Ok(descriptor.with_capabilities(&kinds))
}

fn base_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

/// `path` relative to `dir` when below it, else absolute.
fn relative_to(path: &Path, dir: &Path) -> String {
    let absolute = |p: &Path| std::path::absolute(p).unwrap_or_else(|_| p.to_path_buf());
    let path = absolute(path);
    let relative = path.strip_prefix(absolute(dir)).unwrap_or(&path);
    relative.to_string_lossy().replace('\\', "/")
}

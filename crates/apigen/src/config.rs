//! Project-level generator configuration loaded from YAML.
//!
//! Every path is relative to the work directory of the run.
//!
//! # File format
//!
//! ```yaml
//! # apigen.yaml
//! sdk_root: openstack_sdk/src/api
//! cli_root: openstack_cli/src
//! jsonschema_root: schemas
//! osc_root: osc
//! ansible_root: ansible
//! openapi_root: openapi_specs
//! metadata_root: metadata
//!
//! # Crate path generated CLI commands import the SDK from.
//! sdk_crate: openstack_sdk
//!
//! # External formatters (both enabled by default).
//! formatters:
//!   rust:
//!     command: [rustfmt, --edition, "2021"]
//!   python:
//!     enabled: false
//! ```

use std::path::{Path, PathBuf};

use apigen_build::generate::cli::DEFAULT_SDK_CRATE;
use apigen_build::Language;
use apigen_core::TargetKind;
use serde::Deserialize;

/// Project-level generator config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Output root of the `sdk` target.
    pub sdk_root: PathBuf,
    /// Output root of the `cli` target.
    pub cli_root: PathBuf,
    /// Output root of the `jsonschema` target.
    pub jsonschema_root: PathBuf,
    /// Output root of the `osc` target.
    pub osc_root: PathBuf,
    /// Output root of the `ansible` target.
    pub ansible_root: PathBuf,
    /// Output root of the `openapi-spec` target.
    pub openapi_root: PathBuf,
    /// Default directory of synthesized metadata.
    pub metadata_root: PathBuf,
    /// Crate path generated CLI commands import the SDK from.
    pub sdk_crate: String,
    /// External formatters.
    pub formatters: FormatterConfig,
}

/// Formatters per output language.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    /// Formatter of Rust output.
    pub rust: Formatter,
    /// Formatter of Python output.
    pub python: Formatter,
}

/// One external formatter: a program and its leading arguments. The paths
/// to format are appended.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Formatter {
    /// Whether the formatter runs.
    #[serde(default = "enabled")]
    pub enabled: bool,
    /// Program followed by its arguments.
    #[serde(default)]
    pub command: Vec<String>,
}

fn enabled() -> bool {
    true
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            sdk_root: PathBuf::from("openstack_sdk/src/api"),
            cli_root: PathBuf::from("openstack_cli/src"),
            jsonschema_root: PathBuf::from("schemas"),
            osc_root: PathBuf::from("osc"),
            ansible_root: PathBuf::from("ansible"),
            openapi_root: PathBuf::from("openapi_specs"),
            metadata_root: PathBuf::from("metadata"),
            sdk_crate: DEFAULT_SDK_CRATE.to_string(),
            formatters: FormatterConfig::default(),
        }
    }
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            rust: Formatter::new(&["rustfmt", "--edition", "2021"]),
            python: Formatter::new(&["black", "--quiet"]),
        }
    }
}

impl Formatter {
    /// Enabled formatter running `command`.
    #[must_use]
    pub fn new(command: &[&str]) -> Self {
        Self {
            enabled: true,
            command: command.iter().map(ToString::to_string).collect(),
        }
    }

    /// Disabled formatter.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            command: Vec::new(),
        }
    }
}

impl ProjectConfig {
    /// Load config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Turn both formatters off.
    #[must_use]
    pub fn without_formatters(mut self) -> Self {
        self.formatters.rust = Formatter::disabled();
        self.formatters.python = Formatter::disabled();
        self
    }

    /// Output root of `target`, relative to the work directory.
    #[must_use]
    pub fn root(&self, target: TargetKind) -> &Path {
        match target {
            TargetKind::Sdk => &self.sdk_root,
            TargetKind::Cli => &self.cli_root,
            TargetKind::OpenapiSpec => &self.openapi_root,
            TargetKind::Jsonschema => &self.jsonschema_root,
            TargetKind::Metadata => &self.metadata_root,
            TargetKind::Osc => &self.osc_root,
            TargetKind::Ansible => &self.ansible_root,
        }
    }

    /// Active formatter of a language, if any.
    #[must_use]
    pub fn formatter(&self, language: Language) -> Option<&Formatter> {
        let formatter = match language {
            Language::Rust => &self.formatters.rust,
            Language::Python => &self.formatters.python,
            Language::Json | Language::Yaml => return None,
        };
        (formatter.enabled && !formatter.command.is_empty()).then_some(formatter)
    }
}

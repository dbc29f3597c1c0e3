//! Typed error enum for the `apigen` driver.
//!
//! Library consumers can match on specific variants. The CLI (`main.rs`)
//! converts these to `anyhow::Error` at the binary boundary.

use std::path::PathBuf;

/// Errors produced while planning, generating or writing output.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Spec or metadata model failure.
    #[error(transparent)]
    Core(#[from] apigen_core::Error),

    /// Generator failure outside of any single operation.
    #[error(transparent)]
    Generate(#[from] apigen_build::GenerateError),

    /// File I/O failure (reading config, writing output).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Generation of one operation failed.
    #[error("operation '{operation_id}' ({})", spec_file.display())]
    Operation {
        /// Operation being generated.
        operation_id: String,
        /// Spec file the operation was resolved from.
        spec_file: PathBuf,
        /// Underlying failure.
        #[source]
        source: apigen_build::GenerateError,
    },

    /// The `--service`/`--resource` filters matched no resource.
    #[error("no resource in metadata matches '{filter}'")]
    UnknownResource {
        /// Filter as given.
        filter: String,
    },

    /// An external formatter exited non-zero. Reported as a warning.
    #[error("formatter '{command}' failed: {status}")]
    FormatterFailure {
        /// Formatter program.
        command: String,
        /// Exit status or spawn failure.
        status: String,
    },

    /// The request lacks an input its target needs.
    #[error("{message}")]
    Usage {
        /// What is missing.
        message: String,
    },

    /// `--validate` found unresolvable operations.
    #[error("{failed} of {checked} operations failed validation")]
    Validation {
        /// Operations that could not be resolved.
        failed: usize,
        /// Operations checked.
        checked: usize,
    },
}

/// Convenience alias used throughout the library's public API.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }
}

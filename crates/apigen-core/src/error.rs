//! Typed error enum for the `apigen-core` model and loader.
//!
//! Library consumers can match on specific variants. The CLI converts these
//! to `anyhow::Error` at the binary boundary.

/// Errors produced while loading or querying specs and metadata.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// File I/O failure (reading a spec, metadata or descriptor file).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure outside of spec loading.
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON parsing or serialization failure outside of spec loading.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The OpenAPI document is malformed or lacks a required top-level field.
    #[error("invalid OpenAPI document: {message}")]
    SpecParse {
        /// What was wrong with the document.
        message: String,
    },

    /// A local `$ref` points at a location that does not exist in the document.
    #[error("unresolved reference '{reference}'")]
    UnresolvedReference {
        /// The `$ref` value.
        reference: String,
    },

    /// No operation in the document carries the requested `operationId`.
    #[error("operation '{operation_id}' not found in spec")]
    OperationNotFound {
        /// The unresolved operation id.
        operation_id: String,
    },

    /// A named component (`#/components/<kind>/<name>`) is missing.
    #[error("component {kind}/{name} not found in spec")]
    ComponentNotFound {
        /// Component section (`schemas`, `parameters`, ...).
        kind: &'static str,
        /// Component name.
        name: String,
    },
}

/// Convenience alias used throughout the crate's public API.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn spec_parse(message: impl Into<String>) -> Self {
        Self::SpecParse {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time assertion that `Error` is `Send + Sync`.
    const _: () = {
        const fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    };

    #[test]
    fn operation_not_found_names_the_id() {
        let err = Error::OperationNotFound {
            operation_id: "servers:list".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'servers:list' not found in spec");
    }
}

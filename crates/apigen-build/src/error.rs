//! Error type for classification, lowering and rendering.

/// Error returned by the generators and their helpers.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GenerateError {
    /// Spec or metadata model failure (parse error, missing operation, ...).
    #[error(transparent)]
    Core(#[from] apigen_core::Error),

    /// File I/O failure while reading a descriptor or route map.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML failure while reading a descriptor or writing an emitted document.
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON failure while writing an emitted document.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A schema uses a type the lowering cannot express.
    #[error("unsupported schema type '{type_name}' at {location}")]
    UnsupportedType {
        /// Offending `type` value.
        type_name: String,
        /// Where the schema was met (type name hint or attribute).
        location: String,
    },

    /// No usable media type in a request body.
    #[error("operation '{operation_id}' has no supported media type (found: {})", media_types.join(", "))]
    UnsupportedMediaType {
        /// Operation being generated.
        operation_id: String,
        /// Media types the body declares.
        media_types: Vec<String>,
    },

    /// The body lacks the resource object the target needs.
    #[error("cannot locate the resource schema of operation '{operation_id}'")]
    MissingResourceSchema {
        /// Operation being generated.
        operation_id: String,
    },

    /// Two operations of one resource map to the same name.
    #[error(
        "resource '{resource}': operations '{first}' and '{second}' both classify as '{name}'"
    )]
    OperationNameConflict {
        /// Resource identity (`service.name`).
        resource: String,
        /// Conflicting operation name.
        name: String,
        /// Operation id that claimed the name first.
        first: String,
        /// Operation id that collided.
        second: String,
    },

    /// The resource descriptor named on the command line or in metadata is missing.
    #[error("resource descriptor '{name}' not found")]
    MissingResourceDescriptor {
        /// Requested descriptor (class) name.
        name: String,
    },
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, GenerateError>;

#[cfg(test)]
mod tests {
    use super::*;

    const _: () = {
        const fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GenerateError>();
    };

    #[test]
    fn media_type_error_lists_found_types() {
        let err = GenerateError::UnsupportedMediaType {
            operation_id: "images/id:patch".to_string(),
            media_types: vec!["text/plain".to_string(), "application/xml".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "operation 'images/id:patch' has no supported media type (found: text/plain, application/xml)"
        );
    }

    #[test]
    fn core_errors_are_transparent() {
        let err: GenerateError = apigen_core::Error::OperationNotFound {
            operation_id: "x".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "operation 'x' not found in spec");
    }
}

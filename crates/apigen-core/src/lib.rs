#![allow(clippy::doc_markdown)] // README uses "OpenAPI" proper noun throughout
#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! ## API Reference

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod kind;
mod loader;
pub mod metadata;
pub mod spec;

pub use error::{Error, Result};
pub use kind::{OperationKind, TargetKind};
pub use loader::{load_spec, parse_spec, resolve_refs};
pub use metadata::{Metadata, OperationMetadata, ResourceId, ResourceMetadata, TargetParams};
pub use spec::{
    Method, Operation, OperationRef, Parameter, ParameterLocation, PathItem, Spec, TypeSchema,
};

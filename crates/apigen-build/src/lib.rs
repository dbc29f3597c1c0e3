#![allow(clippy::doc_markdown)] // README uses "OpenAPI" proper noun throughout
#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! ## API Reference

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod classify;
pub mod descriptor;
mod error;
pub mod generate;
pub mod lower;
pub mod module_index;
pub mod naming;
pub mod resource;

pub use classify::{classify, classify_operation, Classification, SkipReason};
pub use descriptor::{ResourceDescriptor, ResourceDescriptorFile};
pub use error::{GenerateError, Result};
pub use generate::ansible::AnsibleGenerator;
pub use generate::cli::CliGenerator;
pub use generate::jsonschema::JsonSchemaGenerator;
pub use generate::osc::OscGenerator;
pub use generate::sdk::SdkGenerator;
pub use generate::{
    EmittedFile, Language, OperationGenerator, OperationRequest, RenderedFile, ResourceGenerator,
    ResourceRequest,
};
pub use lower::{Dialect, RustType, TypeLowering};
pub use module_index::{ModuleIndex, ModuleIndexBuilder};
pub use resource::{locate_resource_schema, resource_name};

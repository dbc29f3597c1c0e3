#![allow(clippy::doc_markdown)] // README uses "OpenAPI" proper noun throughout
#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! ## API Reference

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod format;
mod output;
mod plan;

pub use config::{Formatter, FormatterConfig, ProjectConfig};
pub use error::{Error, Result};
pub use output::{write_atomic, OutputWriter};
pub use plan::{
    Plan, PlanExecutor, PlanRequest, Report, DEFAULT_API_VERSION, DESCRIPTOR_EXTENSION,
};

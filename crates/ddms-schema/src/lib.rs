#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # ddms-schema
//!
//! Version registry, namespace tables and configuration for DDMS.
//!
//! Each supported DDMS generation is a [`Version`] with one namespace URI per
//! sub-vocabulary ([`NamespaceSlot`]). The [`VersionRegistry`] resolves version
//! strings and namespace URIs back to versions, and [`Config`] carries the
//! properties the rest of the workspace consumes.

pub mod config;
pub mod registry;
pub mod version;

pub use config::{Config, OutputIndexLevel, Prefixes};
pub use registry::VersionRegistry;
pub use version::{NamespaceSlot, Version};

use thiserror::Error;

/// Errors that can occur when working with versions and configuration
#[derive(Error, Debug)]
pub enum Error {
    #[error("DDMS Version {0} is not yet supported.")]
    UnsupportedVersion(String),

    #[error("Invalid configuration format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

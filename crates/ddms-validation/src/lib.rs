#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # ddms-validation
//!
//! Version-aware validation engine shared by every DDMS component.
//!
//! This crate provides the controlled vocabulary index, the attribute group
//! validators (security markings, notices, spatial reference systems), the
//! two-phase component pipeline (fatal errors, then warnings) and the
//! builder/commit layer that stages edits before validation.
//!
//! ## Example Usage
//!
//! ```rust
//! use ddms_validation::{Session, attributes::SecurityAttributes};
//!
//! let session = Session::for_version("3.0").unwrap();
//! let attributes = SecurityAttributes::with_classification(&session, "U", &["USA"]).unwrap();
//! assert!(attributes.require_classification().is_ok());
//! ```

pub mod attributes;
pub mod builder;
pub mod component;
pub mod message;
pub mod output;
pub mod rules;
pub mod session;
pub mod vocabulary;

// Re-export main types
pub use builder::{Builder, BuilderList};
pub use component::{Component, ComponentCore, Validate};
pub use message::{Severity, ValidationMessage};
pub use output::{OutputFormat, Renderer};
pub use session::Session;
pub use vocabulary::{ControlledVocabulary, VocabularyIndex};

pub use ddms_schema::{Config, NamespaceSlot, OutputIndexLevel, Version, VersionRegistry};

use thiserror::Error;

/// Errors that can occur while constructing and validating components
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A version string or namespace does not resolve to a registered version
    #[error("{0}")]
    UnsupportedVersion(String),

    /// Any structural or semantic validation failure
    #[error("{message}")]
    InvalidStructure { message: String, locator: String },

    /// Programmatic misuse: missing argument, unknown key, bad index
    #[error("{0}")]
    Argument(String),

    /// Element tree reading or writing failed
    #[error(transparent)]
    Xml(#[from] ddms_ir::Error),
}

impl Error {
    /// Build a structural error without a locator; the pipeline fills it in.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
            locator: String::new(),
        }
    }

    /// Build a structural error at a locator.
    pub fn invalid_at(message: impl Into<String>, locator: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
            locator: locator.into(),
        }
    }

    /// Build an argument error.
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// Locator of a structural error
    #[must_use]
    pub fn locator(&self) -> Option<&str> {
        match self {
            Self::InvalidStructure { locator, .. } => Some(locator),
            _ => None,
        }
    }

    /// Set the locator of a structural error that does not have one yet.
    #[must_use]
    pub fn located(self, locator: &str) -> Self {
        match self {
            Self::InvalidStructure { message, locator: current } if current.is_empty() => {
                Self::InvalidStructure {
                    message,
                    locator: locator.to_string(),
                }
            }
            other => other,
        }
    }

    /// Re-root a structural error raised by a child under its parent's locator.
    #[must_use]
    pub fn under(self, parent_locator: &str) -> Self {
        match self {
            Self::InvalidStructure { message, locator } => Self::InvalidStructure {
                message,
                locator: format!("{parent_locator}{locator}"),
            },
            other => other,
        }
    }
}

impl From<ddms_schema::Error> for Error {
    fn from(err: ddms_schema::Error) -> Self {
        match err {
            ddms_schema::Error::UnsupportedVersion(version) => {
                Self::UnsupportedVersion(format!("DDMS Version {version} is not yet supported."))
            }
            other => Self::Argument(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # ddms-ir
//!
//! Structural element tree for DDMS metadata records.
//!
//! This crate provides a namespace-aware, library-neutral tree structure
//! (qualified names, ordered attributes, ordered children, text content)
//! together with a writer that serializes it back to XML and a thin reader
//! that builds it from XML text.

/// Parsed record container and source metadata.
pub mod document;
/// Core tree element model: qualified names, attributes and elements.
pub mod element;
/// XML text to element tree.
pub mod reader;
/// Element tree to XML text.
pub mod writer;

/// Primary parsed-record type.
pub use document::{Document, DocumentMetadata};
/// Tree primitives.
pub use element::{Attribute, Element, QName};
/// Reader entry points.
pub use reader::{parse_file, parse_str};
/// Writer entry points.
pub use writer::{escape, to_xml};

use thiserror::Error;

/// Errors that can occur when working with the element tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("XML parse error: {message}")]
    Parse { message: String },

    #[error("The {attribute} attribute already exists on the {element} element.")]
    AttributeCollision { element: String, attribute: String },

    #[error("The prefix '{prefix}' is bound to both {first} and {second}.")]
    NamespaceConflict {
        prefix: String,
        first: String,
        second: String,
    },

    #[error("The {attribute} attribute is in namespace {namespace} but no prefix is bound to it.")]
    UnprefixedAttribute { attribute: String, namespace: String },

    #[error("IO error for '{path}': {message}")]
    Io { path: String, message: String },
}

impl Error {
    /// Build a parse error from a reader message.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Build an attribute collision error for the given element and attribute names.
    pub fn attribute_collision(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::AttributeCollision {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Build an IO error with path context.
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Crate-local result type for element tree operations.
pub type Result<T> = std::result::Result<T, Error>;

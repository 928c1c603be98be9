//! Parsed record container
#![allow(clippy::must_use_candidate)] // Constructor API intentionally omits pervasive #[must_use].
#![allow(clippy::return_self_not_must_use)] // Fluent builder methods return Self for ergonomics.

use crate::element::Element;
use serde::{Deserialize, Serialize};

/// A parsed metadata record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Root element of the record
    pub root: Element,

    /// Record-level metadata
    pub metadata: DocumentMetadata,
}

/// Metadata associated with a parsed record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Source file path or identifier
    pub source: Option<String>,

    /// When the record was read
    pub parsed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Document {
    /// Create a new document with the given root element
    pub fn new(root: Element) -> Self {
        Self {
            root,
            metadata: DocumentMetadata::default(),
        }
    }

    /// Set the source identifier
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.source = Some(source.into());
        self
    }

    /// Namespace URI of the root element
    pub fn root_namespace(&self) -> &str {
        &self.root.name.namespace
    }
}

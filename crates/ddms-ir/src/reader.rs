//! XML text to element tree
//!
//! Reading is delegated to `roxmltree`; this module only maps its read-only
//! DOM onto [`Element`] values.

use crate::document::Document;
use crate::element::{Attribute, Element, QName};
use crate::{Error, Result};
use std::path::Path;
use tracing::{debug, trace};

/// Parse XML text into a document
///
/// # Errors
///
/// Returns [`Error::Parse`] when the text is not well-formed XML.
pub fn parse_str(xml: &str) -> Result<Document> {
    let parsed = roxmltree::Document::parse(xml).map_err(|e| Error::parse(e.to_string()))?;
    let root = convert(parsed.root_element());
    trace!(root = %root.name, "Parsed element tree");

    let mut doc = Document::new(root);
    doc.metadata.parsed_at = Some(chrono::Utc::now());
    Ok(doc)
}

/// Read and parse an XML file
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and [`Error::Parse`]
/// when its content is not well-formed XML.
pub fn parse_file(path: &Path) -> Result<Document> {
    debug!("Reading record from file: {:?}", path);
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::io(path.display().to_string(), e.to_string()))?;
    Ok(parse_str(&content)?.with_source(path.display().to_string()))
}

fn qname(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> QName {
    match namespace {
        Some(uri) => {
            let prefix = node.lookup_prefix(uri).unwrap_or("");
            QName::new(uri, prefix, local)
        }
        None => QName::unqualified(local),
    }
}

/// Attributes never take the default namespace, so a prefix bound to the
/// same URI as the default must win over the empty one.
fn attribute_qname(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> QName {
    let declared = namespace.and_then(|uri| {
        node.namespaces()
            .find(|ns| ns.uri() == uri && ns.name().is_some_and(|prefix| !prefix.is_empty()))
            .and_then(roxmltree::Namespace::name)
    });
    match (namespace, declared) {
        (Some(uri), Some(prefix)) => QName::new(uri, prefix, local),
        _ => qname(node, namespace, local),
    }
}

fn convert(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let mut element = Element::new(qname(node, tag.namespace(), tag.name()));

    element.attributes = node
        .attributes()
        .map(|a| Attribute::new(attribute_qname(node, a.namespace(), a.name()), a.value()))
        .collect();

    element.children = node
        .children()
        .filter(roxmltree::Node::is_element)
        .map(convert)
        .collect();

    let text: String = node
        .children()
        .filter(roxmltree::Node::is_text)
        .filter_map(|n| n.text())
        .collect();
    let ignorable = text.is_empty() || (!element.children.is_empty() && text.trim().is_empty());
    if !ignorable {
        element.text = Some(text);
    }

    element
}

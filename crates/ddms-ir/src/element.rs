//! Element types for the structural tree

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A namespace-qualified name.
///
/// Equality and hashing only consider the namespace URI and the local name.
/// The prefix is presentation detail carried for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QName {
    /// Namespace URI (empty for unqualified names)
    pub namespace: String,

    /// Preferred prefix (empty for the default or no namespace)
    pub prefix: String,

    /// Local part of the name
    pub local: String,
}

impl QName {
    /// Create a qualified name
    pub fn new(
        namespace: impl Into<String>,
        prefix: impl Into<String>,
        local: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            prefix: prefix.into(),
            local: local.into(),
        }
    }

    /// Create a name in no namespace
    pub fn unqualified(local: impl Into<String>) -> Self {
        Self::new("", "", local)
    }

    /// The `prefix:local` form, or just `local` when there is no prefix
    #[must_use]
    pub fn qualified(&self) -> String {
        if self.prefix.is_empty() {
            self.local.clone()
        } else {
            format!("{}:{}", self.prefix, self.local)
        }
    }

    /// Check namespace URI and local name
    #[must_use]
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace == namespace && self.local == local
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.local == other.local
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.local.hash(state);
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

/// A single attribute on an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: QName,

    /// Raw attribute value
    pub value: String,
}

impl Attribute {
    /// Create an attribute
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// An element in the structural tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Element name
    pub name: QName,

    /// Attributes in insertion order
    pub attributes: Vec<Attribute>,

    /// Child elements in document order
    pub children: Vec<Element>,

    /// Text content, if any
    pub text: Option<String>,
}

impl Element {
    /// Create an empty element
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Create an element with text content
    pub fn with_text(name: QName, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.text = Some(text.into());
        element
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Add an attribute, failing if one with the same name is already present
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttributeCollision`] when the name is already used.
    pub fn add_attribute(&mut self, attribute: Attribute) -> Result<&mut Self> {
        if self.attributes.iter().any(|a| a.name == attribute.name) {
            return Err(Error::attribute_collision(
                self.name.qualified(),
                attribute.name.qualified(),
            ));
        }
        self.attributes.push(attribute);
        Ok(self)
    }

    /// Find an attribute by namespace URI and local name
    #[must_use]
    pub fn attribute(&self, namespace: &str, local: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name.is(namespace, local))
    }

    /// Find an attribute value by namespace URI and local name
    #[must_use]
    pub fn attribute_value(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attribute(namespace, local).map(|a| a.value.as_str())
    }

    /// Find all children with the given namespace URI and local name
    pub fn find_children<'a>(
        &'a self,
        namespace: &'a str,
        local: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter(move |c| c.name.is(namespace, local))
    }

    /// Text content, or the empty string
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DDMS: &str = "urn:us:mil:ces:metadata:ddms:5";

    #[test]
    fn test_qname_equality_ignores_prefix() {
        let a = QName::new(DDMS, "ddms", "title");
        let b = QName::new(DDMS, "d", "title");
        assert_eq!(a, b);
        assert_ne!(a, QName::new(DDMS, "ddms", "subtitle"));
        assert_eq!(a.qualified(), "ddms:title");
        assert_eq!(QName::unqualified("srsName").qualified(), "srsName");
    }

    #[test]
    fn test_attribute_lookup() {
        let mut element = Element::new(QName::new(DDMS, "ddms", "identifier"));
        element
            .add_attribute(Attribute::new(QName::new(DDMS, "ddms", "qualifier"), "URI"))
            .unwrap();

        assert_eq!(element.attribute_value(DDMS, "qualifier"), Some("URI"));
        assert!(element.attribute_value(DDMS, "value").is_none());
    }

    #[test]
    fn test_attribute_collision() {
        let mut element = Element::new(QName::new(DDMS, "ddms", "identifier"));
        element
            .add_attribute(Attribute::new(QName::new(DDMS, "ddms", "value"), "a"))
            .unwrap();
        let err = element
            .add_attribute(Attribute::new(QName::new(DDMS, "other", "value"), "b"))
            .unwrap_err();

        assert!(matches!(err, Error::AttributeCollision { .. }));
        assert_eq!(element.attributes.len(), 1);
    }

    #[test]
    fn test_find_children() {
        let mut root = Element::new(QName::new(DDMS, "ddms", "resource"));
        root.add_child(Element::new(QName::new(DDMS, "ddms", "title")));
        root.add_child(Element::new(QName::new(DDMS, "ddms", "identifier")));
        root.add_child(Element::new(QName::new(DDMS, "ddms", "title")));

        assert_eq!(root.find_children(DDMS, "title").count(), 2);
        assert_eq!(root.find_children("urn:other", "title").count(), 0);
    }

    #[test]
    fn test_element_serde() {
        let element = Element::with_text(QName::new(DDMS, "ddms", "title"), "Title");
        let json = serde_json::to_string(&element).unwrap();
        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(element, back);
        assert_eq!(back.text(), "Title");
    }
}

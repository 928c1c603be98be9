#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # ddms-components
//!
//! Concrete DDMS metadata components.
//!
//! Each component can be read from a parsed element or built from raw
//! values, and both paths run the same validation pipeline. Every component
//! has a builder whose `commit` goes through the raw-value constructor.
//!
//! ## Example Usage
//!
//! ```rust
//! use ddms_components::{Identifier, Title};
//! use ddms_validation::{Component, Session};
//! use ddms_validation::attributes::SecurityAttributes;
//!
//! let session = Session::for_version("5.0").unwrap();
//! let identifier = Identifier::new(&session, "URI", "urn:buri:ddmsence:testIdentifier").unwrap();
//! let markings = SecurityAttributes::with_classification(&session, "U", &["USA"]).unwrap();
//! let title = Title::new(&session, "DDMSence", markings).unwrap();
//!
//! assert!(identifier.warnings().is_empty());
//! assert!(title.to_xml().unwrap().starts_with("<ddms:title"));
//! ```

pub mod access;
pub mod gml;
pub mod identifier;
pub mod notice;
pub mod resource;
pub mod security;
pub mod title;

pub use access::{Access, AccessBuilder, ProfileValue, ProfileValueBuilder};
pub use gml::{Point, PointBuilder, Position, PositionBuilder};
pub use identifier::{Identifier, IdentifierBuilder};
pub use notice::{Notice, NoticeBuilder, NoticeList, NoticeListBuilder, NoticeText, NoticeTextBuilder};
pub use resource::{Resource, ResourceBuilder, ResourceHeader};
pub use security::{Security, SecurityBuilder};
pub use title::{Title, TitleBuilder};

use ddms_ir::{Attribute, Element, QName};
use ddms_schema::{NamespaceSlot, Version};

/// Children of `element` with the given local name in a sub-vocabulary's
/// namespace under `version`. Nothing matches when the version has no such
/// namespace.
pub(crate) fn children<'a>(
    element: &'a Element,
    version: Version,
    slot: NamespaceSlot,
    local: &'a str,
) -> impl Iterator<Item = &'a Element> + 'a {
    let namespace = version.namespace(slot);
    element
        .children
        .iter()
        .filter(move |child| namespace.is_some_and(|ns| child.name.is(ns, local)))
}

/// A non-blank attribute in a sub-vocabulary's namespace, as written in the document
pub(crate) fn attribute(
    element: &Element,
    version: Version,
    slot: NamespaceSlot,
    local: &str,
) -> Option<Attribute> {
    let namespace = version.namespace(slot)?;
    element
        .attribute(namespace, local)
        .filter(|a| !a.value.trim().is_empty())
        .cloned()
}

/// Text content of an element
pub(crate) fn text_of(element: &Element) -> String {
    element.text().to_string()
}

/// Value of an optional attribute, or the empty string
pub(crate) fn value_of(attribute: Option<&Attribute>) -> &str {
    attribute.map_or("", |a| a.value.as_str())
}

/// Name of an attribute that shares the prefix of its owning element
pub(crate) fn sibling_name(owner: &QName, local: &str) -> QName {
    QName::new(&owner.namespace, &owner.prefix, local)
}

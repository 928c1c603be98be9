//! XML serialization of the element tree

use crate::element::{Element, QName};
use crate::{Error, Result};
use std::fmt::Write as _;
use tracing::trace;

/// Serialize an element tree to XML text.
///
/// Every namespace used anywhere in the tree is declared once on the root
/// element, in first-use order. Attribute order is preserved.
///
/// A namespaced attribute without a prefix of its own is written with a
/// non-default prefix bound to its namespace elsewhere in the tree, since
/// unprefixed attributes never take the default namespace.
///
/// # Errors
///
/// Returns [`Error::NamespaceConflict`] when one prefix is used for two
/// different namespace URIs, and [`Error::UnprefixedAttribute`] when a
/// namespaced attribute has no prefix and none is bound to its namespace.
pub fn to_xml(root: &Element) -> Result<String> {
    let mut bindings: Vec<(String, String)> = Vec::new();
    collect_bindings(root, &mut bindings)?;
    check_attribute_prefixes(root, &bindings)?;
    trace!(namespaces = bindings.len(), root = %root.name, "Writing element tree");

    let mut out = String::new();
    write_element(root, &bindings, true, &mut out);
    Ok(out)
}

/// Escape text for use in XML content or attribute values
#[must_use]
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn collect_bindings(element: &Element, bindings: &mut Vec<(String, String)>) -> Result<()> {
    bind(&element.name, bindings)?;
    for attribute in element.attributes.iter().filter(|a| !a.name.prefix.is_empty()) {
        bind(&attribute.name, bindings)?;
    }
    for child in &element.children {
        collect_bindings(child, bindings)?;
    }
    Ok(())
}

fn check_attribute_prefixes(element: &Element, bindings: &[(String, String)]) -> Result<()> {
    for attribute in &element.attributes {
        if attribute_prefix(&attribute.name, bindings).is_none() {
            return Err(Error::UnprefixedAttribute {
                attribute: attribute.name.local.clone(),
                namespace: attribute.name.namespace.clone(),
            });
        }
    }
    element
        .children
        .iter()
        .try_for_each(|child| check_attribute_prefixes(child, bindings))
}

/// Prefix an attribute is written with, or `None` when it cannot be written
fn attribute_prefix<'a>(name: &'a QName, bindings: &'a [(String, String)]) -> Option<&'a str> {
    if name.namespace.is_empty() || !name.prefix.is_empty() {
        return Some(&name.prefix);
    }
    bindings
        .iter()
        .find(|(prefix, namespace)| !prefix.is_empty() && *namespace == name.namespace)
        .map(|(prefix, _)| prefix.as_str())
}

fn bind(name: &QName, bindings: &mut Vec<(String, String)>) -> Result<()> {
    if name.namespace.is_empty() {
        return Ok(());
    }
    match bindings.iter().find(|(prefix, _)| *prefix == name.prefix) {
        Some((_, namespace)) if *namespace != name.namespace => Err(Error::NamespaceConflict {
            prefix: name.prefix.clone(),
            first: namespace.clone(),
            second: name.namespace.clone(),
        }),
        Some(_) => Ok(()),
        None => {
            bindings.push((name.prefix.clone(), name.namespace.clone()));
            Ok(())
        }
    }
}

fn tag_name(name: &QName) -> String {
    if name.namespace.is_empty() {
        name.local.clone()
    } else {
        name.qualified()
    }
}

fn write_element(
    element: &Element,
    bindings: &[(String, String)],
    declare: bool,
    out: &mut String,
) {
    let tag = tag_name(&element.name);
    out.push('<');
    out.push_str(&tag);

    if declare {
        for (prefix, namespace) in bindings {
            if prefix.is_empty() {
                let _ = write!(out, " xmlns=\"{}\"", escape(namespace));
            } else {
                let _ = write!(out, " xmlns:{prefix}=\"{}\"", escape(namespace));
            }
        }
    }

    for attribute in &element.attributes {
        let name = match attribute_prefix(&attribute.name, bindings) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", attribute.name.local),
            _ => attribute.name.local.clone(),
        };
        let _ = write!(out, " {name}=\"{}\"", escape(&attribute.value));
    }

    let text = element.text.as_deref().unwrap_or("");
    if text.is_empty() && element.children.is_empty() {
        out.push_str(" />");
        return;
    }

    out.push('>');
    out.push_str(&escape(text));
    for child in &element.children {
        write_element(child, bindings, false, out);
    }
    let _ = write!(out, "</{tag}>");
}

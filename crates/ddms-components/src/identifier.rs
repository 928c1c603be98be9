//! `ddms:identifier`

use crate::sibling_name;
use ddms_ir::{Attribute, Element};
use ddms_schema::NamespaceSlot;
use ddms_validation::component::finish;
use ddms_validation::{Builder, Component, ComponentCore, Renderer, Result, Session, Validate, rules};

const NAME: &str = "identifier";

/// A unique identifier for a resource, as a qualifier and value pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    core: ComponentCore,
    qualifier: String,
    value: String,
}

impl Identifier {
    /// Read an identifier from a parsed element
    ///
    /// # Errors
    ///
    /// Returns [`ddms_validation::Error::InvalidStructure`] when the element
    /// is not a valid identifier.
    pub fn from_element(session: &Session, element: &Element) -> Result<Self> {
        let version = session.current_version()?;
        let namespace = &element.name.namespace;
        finish(
            session,
            Self {
                core: ComponentCore::new(element.name.clone(), version),
                qualifier: element.attribute_value(namespace, "qualifier").unwrap_or_default().to_string(),
                value: element.attribute_value(namespace, "value").unwrap_or_default().to_string(),
            },
        )
    }

    /// Build an identifier from raw values
    ///
    /// # Errors
    ///
    /// Returns [`ddms_validation::Error::InvalidStructure`] when either value is blank.
    pub fn new(session: &Session, qualifier: &str, value: &str) -> Result<Self> {
        finish(
            session,
            Self {
                core: ComponentCore::new(
                    session.current_qname(NamespaceSlot::Core, NAME)?,
                    session.current_version()?,
                ),
                qualifier: qualifier.to_string(),
                value: value.to_string(),
            },
        )
    }

    #[must_use]
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn to_builder(&self) -> IdentifierBuilder {
        IdentifierBuilder {
            qualifier: self.qualifier.clone(),
            value: self.value.clone(),
        }
    }
}

impl Component for Identifier {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn to_element(&self) -> Result<Element> {
        let name = self.core.name();
        let mut element = Element::new(name.clone());
        element.add_attribute(Attribute::new(sibling_name(name, "qualifier"), &self.qualifier))?;
        element.add_attribute(Attribute::new(sibling_name(name, "value"), &self.value))?;
        Ok(element)
    }

    fn render(&self, renderer: &Renderer, prefix: &str, suffix: &str) -> String {
        let key = self.key(prefix, suffix);
        let mut out = renderer.field(&format!("{key}.qualifier"), &self.qualifier);
        out.push_str(&renderer.field(&format!("{key}.value"), &self.value));
        out
    }
}

impl Validate for Identifier {
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn validate(&self, session: &Session) -> Result<()> {
        self.core
            .require_name(&session.qname(self.version(), NamespaceSlot::Core, NAME)?)?;
        rules::require_value(&self.qualifier, "qualifier attribute")?;
        rules::require_value(&self.value, "value attribute")
    }
}

/// Mutable staging area for [`Identifier`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierBuilder {
    pub qualifier: String,
    pub value: String,
}

impl Builder for IdentifierBuilder {
    type Output = Option<Identifier>;

    fn is_empty(&self) -> bool {
        self.qualifier.trim().is_empty() && self.value.trim().is_empty()
    }

    fn commit(&self, session: &Session) -> Result<Option<Identifier>> {
        if self.is_empty() {
            return Ok(None);
        }
        Identifier::new(session, &self.qualifier, &self.value).map(Some)
    }
}

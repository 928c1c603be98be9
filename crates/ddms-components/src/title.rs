//! `ddms:title`

use crate::text_of;
use ddms_ir::Element;
use ddms_schema::NamespaceSlot;
use ddms_validation::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use ddms_validation::component::finish;
use ddms_validation::{Builder, Component, ComponentCore, Renderer, Result, Session, Validate, rules};

const NAME: &str = "title";

/// A name for a resource, with its own security markings
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title {
    core: ComponentCore,
    value: String,
    security: SecurityAttributes,
}

impl Title {
    /// # Errors
    ///
    /// Returns [`ddms_validation::Error::InvalidStructure`] when the element
    /// is not a valid title.
    pub fn from_element(session: &Session, element: &Element) -> Result<Self> {
        let version = session.current_version()?;
        let locator = format!("/{}", element.name.qualified());
        let security =
            SecurityAttributes::from_element(session, element).map_err(|e| e.under(&locator))?;
        finish(
            session,
            Self {
                core: ComponentCore::new(element.name.clone(), version),
                value: text_of(element),
                security,
            },
        )
    }

    /// # Errors
    ///
    /// Returns [`ddms_validation::Error::InvalidStructure`] when the value is
    /// blank or the markings lack a classification.
    pub fn new(session: &Session, value: &str, security: SecurityAttributes) -> Result<Self> {
        finish(
            session,
            Self {
                core: ComponentCore::new(
                    session.current_qname(NamespaceSlot::Core, NAME)?,
                    session.current_version()?,
                ),
                value: value.to_string(),
                security,
            },
        )
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn security_attributes(&self) -> &SecurityAttributes {
        &self.security
    }

    #[must_use]
    pub fn to_builder(&self) -> TitleBuilder {
        TitleBuilder {
            value: self.value.clone(),
            security: self.security.to_builder(),
        }
    }
}

impl Component for Title {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn to_element(&self) -> Result<Element> {
        let mut element = Element::with_text(self.core.name().clone(), &self.value);
        self.security.write_to(&mut element)?;
        Ok(element)
    }

    fn render(&self, renderer: &Renderer, prefix: &str, suffix: &str) -> String {
        let key = self.key(prefix, suffix);
        let mut out = renderer.field(&key, &self.value);
        out.push_str(&self.security.render(renderer, &format!("{key}.")));
        out
    }
}

impl Validate for Title {
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn validate(&self, session: &Session) -> Result<()> {
        self.core
            .require_name(&session.qname(self.version(), NamespaceSlot::Core, NAME)?)?;
        rules::require_value(&self.value, "title value")?;
        self.security.require_classification()?;
        self.security.require_version(self.version())
    }
}

/// Mutable staging area for [`Title`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleBuilder {
    pub value: String,
    pub security: SecurityAttributesBuilder,
}

impl Builder for TitleBuilder {
    type Output = Option<Title>;

    fn is_empty(&self) -> bool {
        self.value.trim().is_empty() && self.security.is_empty()
    }

    fn commit(&self, session: &Session) -> Result<Option<Title>> {
        if self.is_empty() {
            return Ok(None);
        }
        Title::new(session, &self.value, self.security.commit(session)?).map(Some)
    }
}

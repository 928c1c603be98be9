//! Component validation pipeline
//!
//! Every concrete component is built through one of two entry points (from a
//! parsed element or from raw values). Both end in [`finish`], which runs
//! [`Validate::validate`] and then collects warnings: the component's own,
//! followed by each nested child's, re-rooted under this component's locator.

use crate::message::ValidationMessage;
use crate::output::{OutputFormat, Renderer};
use crate::session::Session;
use crate::{Result, rules};
use ddms_ir::{Element, QName};
use ddms_schema::{OutputIndexLevel, Version};
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// State shared by every component: name, version and warnings.
///
/// Equality and hashing only look at the qualified name (namespace and local
/// name); version, prefix and warnings never take part.
#[derive(Debug, Clone)]
pub struct ComponentCore {
    name: QName,
    version: Version,
    warnings: Vec<ValidationMessage>,
}

impl ComponentCore {
    #[must_use]
    pub fn new(name: QName, version: Version) -> Self {
        Self {
            name,
            version,
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &QName {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    #[must_use]
    pub fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    #[must_use]
    pub fn locator(&self) -> String {
        format!("/{}", self.name.qualified())
    }

    /// Fail unless the element name is the expected one
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidStructure`] on a mismatch.
    pub fn require_name(&self, expected: &QName) -> Result<()> {
        rules::require_qualified_name(&self.name, expected)
    }

    /// Fail when this component kind does not exist yet in its version
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidStructure`] naming the element.
    pub fn require_since(&self, since: Version) -> Result<()> {
        rules::require_in_range(
            &format!("{} element", self.name.qualified()),
            self.version,
            since,
            None,
        )
    }

    /// Fail when any child was built under another version
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidStructure`] naming the first mismatching child.
    pub fn require_child_versions(&self, children: &[&dyn Component]) -> Result<()> {
        children.iter().try_for_each(|child| {
            rules::require_compatible_version(self.version, child.version(), &child.qualified_name())
        })
    }
}

impl PartialEq for ComponentCore {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ComponentCore {}

impl Hash for ComponentCore {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// A validated, immutable metadata component
pub trait Component: fmt::Debug {
    fn core(&self) -> &ComponentCore;

    /// Direct child components in document order, excluding attribute groups
    fn nested(&self) -> Vec<&dyn Component> {
        Vec::new()
    }

    /// Rebuild the structural element
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Xml`] on an attribute name collision.
    fn to_element(&self) -> Result<Element>;

    /// Flat projection; keys are `{prefix}{local name}{suffix}`
    fn render(&self, renderer: &Renderer, prefix: &str, suffix: &str) -> String;

    fn name(&self) -> &QName {
        self.core().name()
    }

    fn qualified_name(&self) -> String {
        self.core().name().qualified()
    }

    fn version(&self) -> Version {
        self.core().version()
    }

    /// Warnings of this component and all its descendants, in declared order
    fn warnings(&self) -> &[ValidationMessage] {
        self.core().warnings()
    }

    fn locator(&self) -> String {
        self.core().locator()
    }

    /// Key used by [`Component::render`] for this component
    fn key(&self, prefix: &str, suffix: &str) -> String {
        format!("{prefix}{}{suffix}", self.name().local)
    }

    /// # Errors
    ///
    /// See [`Component::to_element`] and [`ddms_ir::to_xml`].
    fn to_xml(&self) -> Result<String> {
        Ok(ddms_ir::to_xml(&self.to_element()?)?)
    }

    fn to_text(&self, level: OutputIndexLevel) -> String {
        self.render(&Renderer::text(level), "", "")
    }

    fn to_html(&self, level: OutputIndexLevel) -> String {
        self.render(&Renderer::html(level), "", "")
    }

    /// Text projection at the index level configured for `session`
    fn to_text_for(&self, session: &Session) -> String {
        self.render(&Renderer::from_config(session.config(), OutputFormat::Text), "", "")
    }

    fn to_html_for(&self, session: &Session) -> String {
        self.render(&Renderer::from_config(session.config(), OutputFormat::Html), "", "")
    }
}

/// The validation half of a component, used while it is being constructed
pub trait Validate: Component {
    fn core_mut(&mut self) -> &mut ComponentCore;

    /// Fatal checks: name, required values, cardinality, version compatibility,
    /// version introduction
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidStructure`] for the first failing rule.
    fn validate(&self, session: &Session) -> Result<()>;

    /// Texts of this component's own non-fatal findings, in declared order
    fn validate_warnings(&self, _session: &Session) -> Vec<String> {
        Vec::new()
    }
}

/// Run the pipeline on a freshly assembled component
///
/// # Errors
///
/// Returns the error raised by [`Validate::validate`], located at this component.
pub fn finish<C: Validate>(session: &Session, mut component: C) -> Result<C> {
    let locator = component.locator();
    if let Err(err) = component.validate(session) {
        debug!(component = %locator, error = %err, "Component rejected");
        return Err(err.located(&locator));
    }

    let mut warnings: Vec<ValidationMessage> = component
        .validate_warnings(session)
        .into_iter()
        .map(|text| ValidationMessage::warning(text, locator.clone()))
        .collect();
    for child in component.nested() {
        warnings.extend(child.warnings().iter().map(|w| w.under(&locator)));
    }

    debug!(component = %locator, warnings = warnings.len(), "Component validated");
    component.core_mut().warnings = warnings;
    Ok(component)
}

/// Render a list of sibling components with positional suffixes
#[must_use]
pub fn render_all<C: Component>(renderer: &Renderer, prefix: &str, items: &[C]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| item.render(renderer, prefix, &renderer.suffix(i, items.len())))
        .collect()
}

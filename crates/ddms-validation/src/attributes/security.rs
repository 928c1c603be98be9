//! Security marking attributes (`ISM`)

use super::{AttributeRule, AttributeSet, ValueKind};
use crate::builder::Builder;
use crate::output::Renderer;
use crate::session::Session;
use crate::vocabulary as cve;
use crate::{Error, Result};
use ddms_ir::{Element, QName};
use ddms_schema::Version;
use std::collections::BTreeMap;

static RULES: &[AttributeRule] = &[
    AttributeRule::ism("classification", ValueKind::Token(cve::CLASSIFICATIONS)),
    AttributeRule::ism("ownerProducer", ValueKind::TokenSet(cve::OWNER_PRODUCERS)),
    AttributeRule::ism("SCIcontrols", ValueKind::TokenSet(cve::SCI_CONTROLS)),
    AttributeRule::ism("SARIdentifier", ValueKind::TokenSet(cve::SAR_IDENTIFIERS)),
    AttributeRule::ism("atomicEnergyMarkings", ValueKind::TokenSet(cve::ATOMIC_ENERGY_MARKINGS))
        .since(Version::V3_1),
    AttributeRule::ism("disseminationControls", ValueKind::TokenSet(cve::DISSEMINATION_CONTROLS)),
    AttributeRule::ism("displayOnlyTo", ValueKind::TokenSet(cve::DISPLAY_ONLY_TO)).since(Version::V3_1),
    AttributeRule::ism("FGIsourceOpen", ValueKind::TokenSet(cve::FGI_SOURCE_OPEN)),
    AttributeRule::ism("FGIsourceProtected", ValueKind::TokenSet(cve::FGI_SOURCE_PROTECTED)),
    AttributeRule::ism("releasableTo", ValueKind::TokenSet(cve::RELEASABLE_TO)),
    AttributeRule::ism("nonICmarkings", ValueKind::TokenSet(cve::NON_IC_MARKINGS)),
    AttributeRule::ism("nonUSControls", ValueKind::TokenSet(cve::NON_US_CONTROLS)).since(Version::V4_1),
    AttributeRule::ism("classifiedBy", ValueKind::Text),
    AttributeRule::ism("compilationReason", ValueKind::Text).since(Version::V3_0),
    AttributeRule::ism("derivativelyClassifiedBy", ValueKind::Text),
    AttributeRule::ism("classificationReason", ValueKind::Text),
    AttributeRule::ism("derivedFrom", ValueKind::Text),
    AttributeRule::ism("declassDate", ValueKind::Date),
    AttributeRule::ism("declassEvent", ValueKind::Text),
    AttributeRule::ism("declassException", ValueKind::TokenSet(cve::DECLASS_EXCEPTIONS)),
    AttributeRule::ism("typeOfExemptedSource", ValueKind::TokenSet(cve::TYPE_OF_EXEMPTED_SOURCE))
        .until(Version::V3_1),
    AttributeRule::ism("dateOfExemptedSource", ValueKind::Date).until(Version::V3_1),
    AttributeRule::ism("declassManualReview", ValueKind::Boolean).until(Version::V3_0),
];

/// Security markings that decorate a component
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecurityAttributes {
    set: AttributeSet,
}

impl SecurityAttributes {
    /// Read the markings of an element
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] when a marking is illegal or malformed.
    pub fn from_element(session: &Session, element: &Element) -> Result<Self> {
        Self::validated(session, AttributeSet::from_element(RULES, session, element)?)
    }

    /// Build markings from `(local name, value)` pairs
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] for unknown names and
    /// [`Error::InvalidStructure`] for illegal or malformed values.
    pub fn new<'a, I>(session: &Session, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self::validated(session, AttributeSet::from_pairs(RULES, session, pairs)?)
    }

    /// Markings with just a classification and owner-producers
    ///
    /// # Errors
    ///
    /// See [`SecurityAttributes::new`].
    pub fn with_classification(session: &Session, classification: &str, owners: &[&str]) -> Result<Self> {
        let owners = owners.join(" ");
        Self::new(
            session,
            [("classification", classification), ("ownerProducer", owners.as_str())],
        )
    }

    /// Markings with no values, under the session's version
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] when the session has no active version.
    pub fn empty(session: &Session) -> Result<Self> {
        Ok(Self {
            set: AttributeSet::empty(RULES, session.current_version()?),
        })
    }

    fn validated(session: &Session, set: AttributeSet) -> Result<Self> {
        set.validate(session)?;
        if set.contains("dateOfExemptedSource") && !set.contains("typeOfExemptedSource") {
            return Err(Error::invalid(
                "The dateOfExemptedSource attribute can only be used in conjunction with the typeOfExemptedSource attribute.",
            ));
        }
        Ok(Self { set })
    }

    /// Check that a classification and at least one owner-producer are set
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] when either is missing.
    pub fn require_classification(&self) -> Result<()> {
        if !self.set.contains("classification") {
            return Err(Error::invalid("classification is required."));
        }
        if self.set.tokens("ownerProducer").is_empty() {
            return Err(Error::invalid("At least 1 ownerProducer must exist."));
        }
        Ok(())
    }

    /// See [`AttributeSet::require_version`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] on a version mismatch.
    pub fn require_version(&self, version: Version) -> Result<()> {
        self.set.require_version(version)
    }

    #[must_use]
    pub fn classification(&self) -> Option<String> {
        self.set.text("classification")
    }

    #[must_use]
    pub fn owner_producers(&self) -> Vec<&str> {
        self.set.tokens("ownerProducer")
    }

    /// Any marking by local name
    #[must_use]
    pub fn get(&self, local: &str) -> Option<String> {
        self.set.text(local)
    }

    #[must_use]
    pub fn version(&self) -> Version {
        self.set.version()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Add the markings to an element
    ///
    /// # Errors
    ///
    /// Returns [`Error::Xml`] on an attribute name collision.
    pub fn write_to(&self, element: &mut Element) -> Result<()> {
        self.set.write_to(element)
    }

    #[must_use]
    pub fn render(&self, renderer: &Renderer, key_prefix: &str) -> String {
        self.set.render(renderer, key_prefix)
    }

    /// Marking names legal under a version
    #[must_use]
    pub fn reserved_names(session: &Session, version: Version) -> Vec<QName> {
        AttributeSet::reserved_names(RULES, session, version)
    }

    /// Builder seeded from these markings
    #[must_use]
    pub fn to_builder(&self) -> SecurityAttributesBuilder {
        SecurityAttributesBuilder {
            values: self
                .set
                .pairs()
                .into_iter()
                .map(|(local, value)| (local.to_string(), value))
                .collect(),
        }
    }
}

/// Mutable staging area for [`SecurityAttributes`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityAttributesBuilder {
    values: BTreeMap<String, String>,
}

impl SecurityAttributesBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a marking by local name
    pub fn set(&mut self, local: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(local.into(), value.into());
        self
    }

    pub fn set_classification(&mut self, classification: impl Into<String>) -> &mut Self {
        self.set("classification", classification)
    }

    pub fn set_owner_producers(&mut self, owners: &[&str]) -> &mut Self {
        self.set("ownerProducer", owners.join(" "))
    }

    #[must_use]
    pub fn get(&self, local: &str) -> Option<&str> {
        self.values.get(local).map(String::as_str)
    }
}

impl Builder for SecurityAttributesBuilder {
    type Output = SecurityAttributes;

    fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.trim().is_empty())
    }

    fn commit(&self, session: &Session) -> Result<SecurityAttributes> {
        SecurityAttributes::new(
            session,
            self.values.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }
}

//! Notice attributes (`ISM`, DDMS 4.1 and later)

use super::{AttributeRule, AttributeSet, ValueKind};
use crate::builder::Builder;
use crate::output::Renderer;
use crate::session::Session;
use crate::vocabulary::NOTICE_TYPES;
use crate::Result;
use ddms_ir::Element;
use ddms_schema::Version;
use std::collections::BTreeMap;

const MAX_LENGTH: usize = 2048;

static RULES: &[AttributeRule] = &[
    AttributeRule::ism("noticeType", ValueKind::Token(NOTICE_TYPES)).since(Version::V4_1),
    AttributeRule::ism("noticeReason", ValueKind::BoundedText(MAX_LENGTH)).since(Version::V4_1),
    AttributeRule::ism("noticeDate", ValueKind::Date).since(Version::V4_1),
    AttributeRule::ism("unregisteredNoticeType", ValueKind::BoundedText(MAX_LENGTH))
        .since(Version::V4_1),
];

/// Attributes describing a notice
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoticeAttributes {
    set: AttributeSet,
}

impl NoticeAttributes {
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidStructure`] when a value is illegal or malformed.
    pub fn from_element(session: &Session, element: &Element) -> Result<Self> {
        let set = AttributeSet::from_element(RULES, session, element)?;
        set.validate(session)?;
        Ok(Self { set })
    }

    /// # Errors
    ///
    /// Returns [`crate::Error::Argument`] for unknown names and
    /// [`crate::Error::InvalidStructure`] for illegal or malformed values.
    pub fn new<'a, I>(session: &Session, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let set = AttributeSet::from_pairs(RULES, session, pairs)?;
        set.validate(session)?;
        Ok(Self { set })
    }

    /// # Errors
    ///
    /// Returns [`crate::Error::Argument`] when the session has no active version.
    pub fn empty(session: &Session) -> Result<Self> {
        Ok(Self {
            set: AttributeSet::empty(RULES, session.current_version()?),
        })
    }

    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidStructure`] on a version mismatch.
    pub fn require_version(&self, version: Version) -> Result<()> {
        self.set.require_version(version)
    }

    #[must_use]
    pub fn notice_type(&self) -> Option<String> {
        self.set.text("noticeType")
    }

    #[must_use]
    pub fn notice_reason(&self) -> Option<String> {
        self.set.text("noticeReason")
    }

    #[must_use]
    pub fn notice_date(&self) -> Option<String> {
        self.set.text("noticeDate")
    }

    #[must_use]
    pub fn unregistered_notice_type(&self) -> Option<String> {
        self.set.text("unregisteredNoticeType")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// # Errors
    ///
    /// Returns [`crate::Error::Xml`] on an attribute name collision.
    pub fn write_to(&self, element: &mut Element) -> Result<()> {
        self.set.write_to(element)
    }

    #[must_use]
    pub fn render(&self, renderer: &Renderer, key_prefix: &str) -> String {
        self.set.render(renderer, key_prefix)
    }

    #[must_use]
    pub fn to_builder(&self) -> NoticeAttributesBuilder {
        let mut builder = NoticeAttributesBuilder::default();
        for (local, value) in self.set.pairs() {
            builder.values.insert(local.to_string(), value);
        }
        builder
    }
}

/// Mutable staging area for [`NoticeAttributes`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeAttributesBuilder {
    values: BTreeMap<String, String>,
}

impl NoticeAttributesBuilder {
    pub fn set(&mut self, local: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(local.into(), value.into());
        self
    }
}

impl Builder for NoticeAttributesBuilder {
    type Output = NoticeAttributes;

    fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.trim().is_empty())
    }

    fn commit(&self, session: &Session) -> Result<NoticeAttributes> {
        NoticeAttributes::new(
            session,
            self.values.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }
}

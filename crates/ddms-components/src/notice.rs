//! Notices (`ISM:NoticeText`, `ISM:Notice`, `ddms:noticeList`), DDMS 4.1 and later

use crate::{children, sibling_name, text_of};
use ddms_ir::{Attribute, Element};
use ddms_schema::{NamespaceSlot, Version};
use ddms_validation::attributes::{
    NoticeAttributes, NoticeAttributesBuilder, SecurityAttributes, SecurityAttributesBuilder,
};
use ddms_validation::component::{finish, render_all};
use ddms_validation::vocabulary::{POC_TYPES, VocabularyIndex};
use ddms_validation::{
    Builder, BuilderList, Component, ComponentCore, Error, Renderer, Result, Session, Validate,
    rules,
};

const NOTICE_TEXT: &str = "NoticeText";
const NOTICE: &str = "Notice";
const NOTICE_LIST: &str = "noticeList";

/// Text of a notice, optionally tagged with point-of-contact types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoticeText {
    core: ComponentCore,
    value: String,
    poc_types: Vec<String>,
    security: SecurityAttributes,
}

impl NoticeText {
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] when the element is not valid notice text.
    pub fn from_element(session: &Session, element: &Element) -> Result<Self> {
        let version = session.current_version()?;
        let locator = format!("/{}", element.name.qualified());
        let security =
            SecurityAttributes::from_element(session, element).map_err(|e| e.under(&locator))?;
        let poc_types = element
            .attribute_value(&element.name.namespace, "pocType")
            .map(|v| v.split_whitespace().map(ToString::to_string).collect())
            .unwrap_or_default();
        finish(
            session,
            Self {
                core: ComponentCore::new(element.name.clone(), version),
                value: text_of(element),
                poc_types,
                security,
            },
        )
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] when the markings lack a
    /// classification or a point-of-contact type is illegal.
    pub fn new(
        session: &Session,
        value: &str,
        poc_types: &[&str],
        security: SecurityAttributes,
    ) -> Result<Self> {
        finish(
            session,
            Self {
                core: ComponentCore::new(
                    session.current_qname(NamespaceSlot::Security, NOTICE_TEXT)?,
                    session.current_version()?,
                ),
                value: value.to_string(),
                poc_types: poc_types
                    .iter()
                    .filter(|p| !p.trim().is_empty())
                    .map(ToString::to_string)
                    .collect(),
                security,
            },
        )
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn poc_types(&self) -> &[String] {
        &self.poc_types
    }

    #[must_use]
    pub fn security_attributes(&self) -> &SecurityAttributes {
        &self.security
    }

    #[must_use]
    pub fn to_builder(&self) -> NoticeTextBuilder {
        NoticeTextBuilder {
            value: self.value.clone(),
            poc_types: self.poc_types.clone(),
            security: self.security.to_builder(),
        }
    }
}

impl Component for NoticeText {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn to_element(&self) -> Result<Element> {
        let name = self.core.name();
        let mut element = Element::new(name.clone());
        if !self.value.is_empty() {
            element.text = Some(self.value.clone());
        }
        self.security.write_to(&mut element)?;
        if !self.poc_types.is_empty() {
            element.add_attribute(Attribute::new(
                sibling_name(name, "pocType"),
                self.poc_types.join(" "),
            ))?;
        }
        Ok(element)
    }

    fn render(&self, renderer: &Renderer, prefix: &str, suffix: &str) -> String {
        let key = self.key(prefix, suffix);
        let mut out = renderer.field(&key, &self.value);
        out.push_str(&renderer.field(&format!("{key}.pocType"), &self.poc_types.join(" ")));
        out.push_str(&self.security.render(renderer, &format!("{key}.")));
        out
    }
}

impl Validate for NoticeText {
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn validate(&self, session: &Session) -> Result<()> {
        let version = self.version();
        self.core
            .require_name(&session.qname(version, NamespaceSlot::Security, NOTICE_TEXT)?)?;
        self.security.require_classification()?;
        if !self.poc_types.is_empty() {
            rules::require_in_range(
                &format!("{}:pocType attribute", self.core.name().prefix),
                version,
                Version::V5_0,
                None,
            )?;
            for poc_type in &self.poc_types {
                if !session.vocabulary().contains(POC_TYPES, poc_type, version)? {
                    return Err(Error::invalid(VocabularyIndex::invalid_message(POC_TYPES, poc_type)));
                }
            }
        }
        self.security.require_version(version)?;
        self.core.require_since(Version::V4_1)
    }

    fn validate_warnings(&self, _session: &Session) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.value.trim().is_empty() {
            warnings.push(format!(
                "An {} element was found with no value.",
                self.qualified_name()
            ));
        }
        warnings
    }
}

/// Mutable staging area for [`NoticeText`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeTextBuilder {
    pub value: String,
    pub poc_types: Vec<String>,
    pub security: SecurityAttributesBuilder,
}

impl Builder for NoticeTextBuilder {
    type Output = Option<NoticeText>;

    fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
            && self.poc_types.iter().all(|p| p.trim().is_empty())
            && self.security.is_empty()
    }

    fn commit(&self, session: &Session) -> Result<Option<NoticeText>> {
        if self.is_empty() {
            return Ok(None);
        }
        let poc_types: Vec<&str> = self.poc_types.iter().map(String::as_str).collect();
        NoticeText::new(session, &self.value, &poc_types, self.security.commit(session)?).map(Some)
    }
}

/// A notice: one or more texts plus notice and security attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Notice {
    core: ComponentCore,
    texts: Vec<NoticeText>,
    external_notice: Option<String>,
    security: SecurityAttributes,
    notice_attributes: NoticeAttributes,
}

impl Notice {
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] when the element or one of its
    /// texts is invalid.
    pub fn from_element(session: &Session, element: &Element) -> Result<Self> {
        let version = session.current_version()?;
        let locator = format!("/{}", element.name.qualified());
        let security =
            SecurityAttributes::from_element(session, element).map_err(|e| e.under(&locator))?;
        let notice_attributes =
            NoticeAttributes::from_element(session, element).map_err(|e| e.under(&locator))?;
        let texts = children(element, version, NamespaceSlot::Security, NOTICE_TEXT)
            .map(|child| NoticeText::from_element(session, child))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.under(&locator))?;
        finish(
            session,
            Self {
                core: ComponentCore::new(element.name.clone(), version),
                texts,
                external_notice: element
                    .attribute_value(&element.name.namespace, "externalNotice")
                    .filter(|v| !v.trim().is_empty())
                    .map(ToString::to_string),
                security,
                notice_attributes,
            },
        )
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] when there is no text or the
    /// markings lack a classification.
    pub fn new(
        session: &Session,
        texts: Vec<NoticeText>,
        external_notice: Option<bool>,
        security: SecurityAttributes,
        notice_attributes: NoticeAttributes,
    ) -> Result<Self> {
        finish(
            session,
            Self {
                core: ComponentCore::new(
                    session.current_qname(NamespaceSlot::Security, NOTICE)?,
                    session.current_version()?,
                ),
                texts,
                external_notice: external_notice.map(|b| b.to_string()),
                security,
                notice_attributes,
            },
        )
    }

    #[must_use]
    pub fn texts(&self) -> &[NoticeText] {
        &self.texts
    }

    #[must_use]
    pub fn external_notice(&self) -> Option<bool> {
        self.external_notice.as_deref().and_then(rules::parse_boolean)
    }

    #[must_use]
    pub fn security_attributes(&self) -> &SecurityAttributes {
        &self.security
    }

    #[must_use]
    pub fn notice_attributes(&self) -> &NoticeAttributes {
        &self.notice_attributes
    }

    #[must_use]
    pub fn to_builder(&self) -> NoticeBuilder {
        NoticeBuilder {
            texts: self.texts.iter().map(NoticeText::to_builder).collect(),
            external_notice: self.external_notice(),
            security: self.security.to_builder(),
            notice_attributes: self.notice_attributes.to_builder(),
        }
    }
}

impl Component for Notice {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn nested(&self) -> Vec<&dyn Component> {
        self.texts.iter().map(|t| t as &dyn Component).collect()
    }

    fn to_element(&self) -> Result<Element> {
        let name = self.core.name();
        let mut element = Element::new(name.clone());
        self.security.write_to(&mut element)?;
        self.notice_attributes.write_to(&mut element)?;
        if let Some(external) = &self.external_notice {
            element.add_attribute(Attribute::new(sibling_name(name, "externalNotice"), external))?;
        }
        for text in &self.texts {
            element.add_child(text.to_element()?);
        }
        Ok(element)
    }

    fn render(&self, renderer: &Renderer, prefix: &str, suffix: &str) -> String {
        let key = self.key(prefix, suffix);
        let mut out = render_all(renderer, &format!("{key}."), &self.texts);
        out.push_str(&self.security.render(renderer, &format!("{key}.")));
        out.push_str(&self.notice_attributes.render(renderer, &format!("{key}.")));
        if let Some(external) = &self.external_notice {
            out.push_str(&renderer.field(&format!("{key}.externalNotice"), external));
        }
        out
    }
}

impl Validate for Notice {
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn validate(&self, session: &Session) -> Result<()> {
        let version = self.version();
        let prefix = &self.core.name().prefix;
        self.core
            .require_name(&session.qname(version, NamespaceSlot::Security, NOTICE)?)?;
        rules::require_bounded(self.texts.len(), 1, None, &format!("{prefix}:{NOTICE_TEXT}"))?;
        self.security.require_classification()?;
        if let Some(external) = &self.external_notice {
            rules::require_boolean(external, &format!("{prefix}:externalNotice"))?;
        }
        self.core.require_child_versions(&self.nested())?;
        self.security.require_version(version)?;
        self.notice_attributes.require_version(version)?;
        self.core.require_since(Version::V4_1)
    }

    fn validate_warnings(&self, _session: &Session) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.external_notice.is_some() && self.version().is_at_least(Version::V5_0) {
            warnings.push(format!(
                "The {}:externalNotice attribute is deprecated as of DDMS 5.0 and should not be used.",
                self.core.name().prefix
            ));
        }
        warnings
    }
}

/// Mutable staging area for [`Notice`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeBuilder {
    pub texts: BuilderList<NoticeTextBuilder>,
    pub external_notice: Option<bool>,
    pub security: SecurityAttributesBuilder,
    pub notice_attributes: NoticeAttributesBuilder,
}

impl Builder for NoticeBuilder {
    type Output = Option<Notice>;

    fn is_empty(&self) -> bool {
        self.texts.all_empty()
            && self.external_notice.is_none()
            && self.security.is_empty()
            && self.notice_attributes.is_empty()
    }

    fn commit(&self, session: &Session) -> Result<Option<Notice>> {
        if self.is_empty() {
            return Ok(None);
        }
        Notice::new(
            session,
            self.texts.commit(session)?,
            self.external_notice,
            self.security.commit(session)?,
            self.notice_attributes.commit(session)?,
        )
        .map(Some)
    }
}

/// The list of notices that apply to a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoticeList {
    core: ComponentCore,
    notices: Vec<Notice>,
    security: SecurityAttributes,
}

impl NoticeList {
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] when the element or one of its
    /// notices is invalid.
    pub fn from_element(session: &Session, element: &Element) -> Result<Self> {
        let version = session.current_version()?;
        let locator = format!("/{}", element.name.qualified());
        let security =
            SecurityAttributes::from_element(session, element).map_err(|e| e.under(&locator))?;
        let notices = children(element, version, NamespaceSlot::Security, NOTICE)
            .map(|child| Notice::from_element(session, child))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.under(&locator))?;
        finish(
            session,
            Self {
                core: ComponentCore::new(element.name.clone(), version),
                notices,
                security,
            },
        )
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] when there is no notice or the
    /// markings lack a classification.
    pub fn new(session: &Session, notices: Vec<Notice>, security: SecurityAttributes) -> Result<Self> {
        finish(
            session,
            Self {
                core: ComponentCore::new(
                    session.current_qname(NamespaceSlot::Core, NOTICE_LIST)?,
                    session.current_version()?,
                ),
                notices,
                security,
            },
        )
    }

    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    #[must_use]
    pub fn security_attributes(&self) -> &SecurityAttributes {
        &self.security
    }

    #[must_use]
    pub fn to_builder(&self) -> NoticeListBuilder {
        NoticeListBuilder {
            notices: self.notices.iter().map(Notice::to_builder).collect(),
            security: self.security.to_builder(),
        }
    }
}

impl Component for NoticeList {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn nested(&self) -> Vec<&dyn Component> {
        self.notices.iter().map(|n| n as &dyn Component).collect()
    }

    fn to_element(&self) -> Result<Element> {
        let mut element = Element::new(self.core.name().clone());
        self.security.write_to(&mut element)?;
        for notice in &self.notices {
            element.add_child(notice.to_element()?);
        }
        Ok(element)
    }

    fn render(&self, renderer: &Renderer, prefix: &str, suffix: &str) -> String {
        let key = self.key(prefix, suffix);
        let mut out = render_all(renderer, &format!("{key}."), &self.notices);
        out.push_str(&self.security.render(renderer, &format!("{key}.")));
        out
    }
}

impl Validate for NoticeList {
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn validate(&self, session: &Session) -> Result<()> {
        let version = self.version();
        self.core
            .require_name(&session.qname(version, NamespaceSlot::Core, NOTICE_LIST)?)?;
        rules::require_bounded(
            self.notices.len(),
            1,
            None,
            &format!("{}:{NOTICE}", session.prefix(NamespaceSlot::Security)),
        )?;
        self.security.require_classification()?;
        self.core.require_child_versions(&self.nested())?;
        self.security.require_version(version)?;
        self.core.require_since(Version::V4_1)
    }
}

/// Mutable staging area for [`NoticeList`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeListBuilder {
    pub notices: BuilderList<NoticeBuilder>,
    pub security: SecurityAttributesBuilder,
}

impl Builder for NoticeListBuilder {
    type Output = Option<NoticeList>;

    fn is_empty(&self) -> bool {
        self.notices.all_empty() && self.security.is_empty()
    }

    fn commit(&self, session: &Session) -> Result<Option<NoticeList>> {
        if self.is_empty() {
            return Ok(None);
        }
        NoticeList::new(session, self.notices.commit(session)?, self.security.commit(session)?)
            .map(Some)
    }
}

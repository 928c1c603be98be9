//! `ddms:resource`, the root of a metacard

use crate::identifier::{Identifier, IdentifierBuilder};
use crate::notice::{NoticeList, NoticeListBuilder};
use crate::security::{Security, SecurityBuilder};
use crate::title::{Title, TitleBuilder};
use crate::{attribute, children, value_of};
use ddms_ir::{Attribute, Element, QName};
use ddms_schema::{NamespaceSlot, Version};
use ddms_validation::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use ddms_validation::component::{finish, render_all};
use ddms_validation::{
    Builder, BuilderList, Component, ComponentCore, Error, Renderer, Result, Session, Validate,
    rules,
};
use tracing::debug;

const NAME: &str = "resource";
const RESOURCE_ELEMENT: &str = "resourceElement";
const CREATE_DATE: &str = "createDate";
const DES_VERSION: &str = "DESVersion";

/// Typed values of the attributes that decorate a resource root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceHeader {
    /// `ISM:resourceElement`, required from 3.0
    pub resource_element: Option<bool>,
    /// `ISM:createDate` as `YYYY-MM-DD`, required from 3.0
    pub create_date: Option<String>,
    /// `ISM:DESVersion`, required from 3.0
    pub des_version: Option<u64>,
    /// `ntk:DESVersion`, required from 4.1
    pub ntk_des_version: Option<u64>,
}

/// A complete metadata record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    core: ComponentCore,
    identifiers: Vec<Identifier>,
    titles: Vec<Title>,
    securities: Vec<Security>,
    notice_lists: Vec<NoticeList>,
    resource_element: Option<Attribute>,
    create_date: Option<Attribute>,
    des_version: Option<Attribute>,
    ntk_des_version: Option<Attribute>,
    security: SecurityAttributes,
}

/// Build a header attribute, failing when the version has no namespace for it
fn header_attribute(
    session: &Session,
    version: Version,
    slot: NamespaceSlot,
    local: &str,
    value: Option<String>,
) -> Result<Option<Attribute>> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    let Some(namespace) = version.namespace(slot) else {
        let since = Version::ALL
            .into_iter()
            .find(|v| v.namespace(slot).is_some())
            .unwrap_or(Version::V5_0);
        return Err(Error::invalid(rules::since_message(
            &format!("{}:{local} attribute", session.prefix(slot)),
            since,
        )));
    };
    Ok(Some(Attribute::new(
        QName::new(namespace, session.prefix(slot), local),
        value,
    )))
}

impl Resource {
    /// Read a resource and everything beneath it
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] for the first violation found,
    /// located at the offending element.
    pub fn from_element(session: &Session, element: &Element) -> Result<Self> {
        let version = session.current_version()?;
        let locator = format!("/{}", element.name.qualified());
        let nested = |e: Error| e.under(&locator);

        let security = SecurityAttributes::from_element(session, element).map_err(nested)?;
        let identifiers = children(element, version, NamespaceSlot::Core, "identifier")
            .map(|child| Identifier::from_element(session, child))
            .collect::<Result<Vec<_>>>()
            .map_err(nested)?;
        let titles = children(element, version, NamespaceSlot::Core, "title")
            .map(|child| Title::from_element(session, child))
            .collect::<Result<Vec<_>>>()
            .map_err(nested)?;
        let securities = children(element, version, NamespaceSlot::Core, "security")
            .map(|child| Security::from_element(session, child))
            .collect::<Result<Vec<_>>>()
            .map_err(nested)?;
        let notice_lists = children(element, version, NamespaceSlot::Core, "noticeList")
            .map(|child| NoticeList::from_element(session, child))
            .collect::<Result<Vec<_>>>()
            .map_err(nested)?;

        finish(
            session,
            Self {
                core: ComponentCore::new(element.name.clone(), version),
                identifiers,
                titles,
                securities,
                notice_lists,
                resource_element: attribute(element, version, NamespaceSlot::Security, RESOURCE_ELEMENT),
                create_date: attribute(element, version, NamespaceSlot::Security, CREATE_DATE),
                des_version: attribute(element, version, NamespaceSlot::Security, DES_VERSION),
                ntk_des_version: attribute(element, version, NamespaceSlot::AccessControl, DES_VERSION),
                security,
            },
        )
    }

    /// Build a resource from already-validated children
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] when a cardinality, header or
    /// version rule is broken.
    pub fn new(
        session: &Session,
        identifiers: Vec<Identifier>,
        titles: Vec<Title>,
        security: Option<Security>,
        notice_list: Option<NoticeList>,
        header: &ResourceHeader,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let version = session.current_version()?;
        let name = session.qname(version, NamespaceSlot::Core, NAME)?;
        let locator = format!("/{}", name.qualified());
        let located = |e: Error| e.located(&locator);

        let resource_element = header_attribute(
            session,
            version,
            NamespaceSlot::Security,
            RESOURCE_ELEMENT,
            header.resource_element.map(|b| b.to_string()),
        )
        .map_err(located)?;
        let create_date = header_attribute(
            session,
            version,
            NamespaceSlot::Security,
            CREATE_DATE,
            header.create_date.clone(),
        )
        .map_err(located)?;
        let des_version = header_attribute(
            session,
            version,
            NamespaceSlot::Security,
            DES_VERSION,
            header.des_version.map(|n| n.to_string()),
        )
        .map_err(located)?;
        let ntk_des_version = header_attribute(
            session,
            version,
            NamespaceSlot::AccessControl,
            DES_VERSION,
            header.ntk_des_version.map(|n| n.to_string()),
        )
        .map_err(located)?;

        finish(
            session,
            Self {
                core: ComponentCore::new(name, version),
                identifiers,
                titles,
                securities: security.into_iter().collect(),
                notice_lists: notice_list.into_iter().collect(),
                resource_element,
                create_date,
                des_version,
                ntk_des_version,
                security: security_attributes,
            },
        )
    }

    #[must_use]
    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    #[must_use]
    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    #[must_use]
    pub fn security(&self) -> Option<&Security> {
        self.securities.first()
    }

    #[must_use]
    pub fn notice_list(&self) -> Option<&NoticeList> {
        self.notice_lists.first()
    }

    #[must_use]
    pub fn header(&self) -> ResourceHeader {
        ResourceHeader {
            resource_element: self
                .resource_element
                .as_ref()
                .and_then(|a| rules::parse_boolean(&a.value)),
            create_date: self.create_date.as_ref().map(|a| a.value.clone()),
            des_version: self.des_version.as_ref().and_then(|a| a.value.parse().ok()),
            ntk_des_version: self.ntk_des_version.as_ref().and_then(|a| a.value.parse().ok()),
        }
    }

    #[must_use]
    pub fn security_attributes(&self) -> &SecurityAttributes {
        &self.security
    }

    fn header_attributes(&self) -> impl Iterator<Item = &Attribute> {
        [
            &self.resource_element,
            &self.create_date,
            &self.des_version,
            &self.ntk_des_version,
        ]
        .into_iter()
        .flatten()
    }

    #[must_use]
    pub fn to_builder(&self) -> ResourceBuilder {
        ResourceBuilder {
            identifiers: self.identifiers.iter().map(Identifier::to_builder).collect(),
            titles: self.titles.iter().map(Title::to_builder).collect(),
            security: self.security().map(Security::to_builder).unwrap_or_default(),
            notice_list: self.notice_list().map(NoticeList::to_builder).unwrap_or_default(),
            header: self.header(),
            security_attributes: self.security.to_builder(),
        }
    }
}

impl Component for Resource {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn nested(&self) -> Vec<&dyn Component> {
        let mut nested: Vec<&dyn Component> = Vec::new();
        nested.extend(self.identifiers.iter().map(|c| c as &dyn Component));
        nested.extend(self.titles.iter().map(|c| c as &dyn Component));
        nested.extend(self.securities.iter().map(|c| c as &dyn Component));
        nested.extend(self.notice_lists.iter().map(|c| c as &dyn Component));
        nested
    }

    fn to_element(&self) -> Result<Element> {
        let mut element = Element::new(self.core.name().clone());
        for header in self.header_attributes() {
            element.add_attribute(header.clone())?;
        }
        self.security.write_to(&mut element)?;
        for child in self.nested() {
            element.add_child(child.to_element()?);
        }
        Ok(element)
    }

    fn render(&self, renderer: &Renderer, prefix: &str, suffix: &str) -> String {
        let key = self.key(prefix, suffix);
        let mut out = renderer.field(
            &format!("{key}.{RESOURCE_ELEMENT}"),
            value_of(self.resource_element.as_ref()),
        );
        out.push_str(&renderer.field(
            &format!("{key}.{CREATE_DATE}"),
            value_of(self.create_date.as_ref()),
        ));
        out.push_str(&renderer.field(
            &format!("{key}.ism.{DES_VERSION}"),
            value_of(self.des_version.as_ref()),
        ));
        out.push_str(&renderer.field(
            &format!("{key}.ntk.{DES_VERSION}"),
            value_of(self.ntk_des_version.as_ref()),
        ));
        out.push_str(&self.security.render(renderer, &format!("{key}.")));
        let child_prefix = format!("{key}.");
        out.push_str(&render_all(renderer, &child_prefix, &self.identifiers));
        out.push_str(&render_all(renderer, &child_prefix, &self.titles));
        out.push_str(&render_all(renderer, &child_prefix, &self.securities));
        out.push_str(&render_all(renderer, &child_prefix, &self.notice_lists));
        out
    }
}

impl Resource {
    fn validate_header(&self) -> Result<()> {
        let version = self.version();
        if version.is_at_least(Version::V3_0) {
            let resource_element = value_of(self.resource_element.as_ref());
            rules::require_value(resource_element, "resourceElement attribute")?;
            rules::require_boolean(resource_element, RESOURCE_ELEMENT)?;
            let create_date = value_of(self.create_date.as_ref());
            rules::require_value(create_date, "createDate attribute")?;
            rules::require_date(create_date, CREATE_DATE)?;
            let des_version = value_of(self.des_version.as_ref());
            rules::require_value(des_version, "DESVersion attribute")?;
            rules::require_positive_integer(des_version, DES_VERSION)?;
            self.security.require_classification()?;
        } else {
            if let Some(header) = self.header_attributes().next() {
                return Err(Error::invalid(rules::since_message(
                    &format!("{} attribute", header.name.qualified()),
                    Version::V3_0,
                )));
            }
            if !self.security.is_empty() {
                return Err(Error::invalid(rules::since_message(
                    &format!("security attributes on the {}", self.qualified_name()),
                    Version::V3_0,
                )));
            }
        }
        if version.is_at_least(Version::V4_1) {
            let ntk_des_version = value_of(self.ntk_des_version.as_ref());
            rules::require_value(ntk_des_version, "ntk:DESVersion attribute")?;
            rules::require_positive_integer(ntk_des_version, "ntk:DESVersion")?;
        }
        Ok(())
    }
}

impl Validate for Resource {
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn validate(&self, session: &Session) -> Result<()> {
        let version = self.version();
        let core = session.prefix(NamespaceSlot::Core);
        self.core
            .require_name(&session.qname(version, NamespaceSlot::Core, NAME)?)?;
        rules::require_bounded(self.identifiers.len(), 1, None, &format!("{core}:identifier"))?;
        rules::require_bounded(self.titles.len(), 1, None, &format!("{core}:title"))?;
        rules::require_bounded(self.securities.len(), 1, Some(1), &format!("{core}:security"))?;
        rules::require_bounded(self.notice_lists.len(), 0, Some(1), &format!("{core}:noticeList"))?;
        self.core.require_child_versions(&self.nested())?;
        self.security.require_version(version)?;
        self.validate_header()?;
        debug!(
            identifiers = self.identifiers.len(),
            titles = self.titles.len(),
            "Resource structure accepted"
        );
        Ok(())
    }
}

/// Mutable staging area for [`Resource`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceBuilder {
    pub identifiers: BuilderList<IdentifierBuilder>,
    pub titles: BuilderList<TitleBuilder>,
    pub security: SecurityBuilder,
    pub notice_list: NoticeListBuilder,
    pub header: ResourceHeader,
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for ResourceBuilder {
    type Output = Option<Resource>;

    fn is_empty(&self) -> bool {
        self.identifiers.all_empty()
            && self.titles.all_empty()
            && self.security.is_empty()
            && self.notice_list.is_empty()
            && self.header == ResourceHeader::default()
            && self.security_attributes.is_empty()
    }

    fn commit(&self, session: &Session) -> Result<Option<Resource>> {
        if self.is_empty() {
            return Ok(None);
        }
        Resource::new(
            session,
            self.identifiers.commit(session)?,
            self.titles.commit(session)?,
            self.security.commit(session)?,
            self.notice_list.commit(session)?,
            &self.header,
            self.security_attributes.commit(session)?,
        )
        .map(Some)
    }
}

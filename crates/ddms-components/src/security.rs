//! `ddms:security`

use crate::access::{Access, AccessBuilder};
use crate::{attribute, children, value_of};
use ddms_ir::{Attribute, Element};
use ddms_schema::{NamespaceSlot, Version};
use ddms_validation::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use ddms_validation::component::{finish, render_all};
use ddms_validation::{
    Builder, Component, ComponentCore, Error, Renderer, Result, Session, Validate, rules,
};

const NAME: &str = "security";
const EXCLUDE_FROM_ROLLUP: &str = "excludeFromRollup";

/// Resource-level security markings, with optional need-to-know access
/// control from DDMS 4.1 on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Security {
    core: ComponentCore,
    accesses: Vec<Access>,
    exclude_from_rollup: Option<Attribute>,
    security: SecurityAttributes,
}

impl Security {
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] when the element or its access
    /// block is invalid.
    pub fn from_element(session: &Session, element: &Element) -> Result<Self> {
        let version = session.current_version()?;
        let locator = format!("/{}", element.name.qualified());
        let security =
            SecurityAttributes::from_element(session, element).map_err(|e| e.under(&locator))?;
        let accesses = children(element, version, NamespaceSlot::AccessControl, "Access")
            .map(|child| Access::from_element(session, child))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.under(&locator))?;
        finish(
            session,
            Self {
                core: ComponentCore::new(element.name.clone(), version),
                accesses,
                exclude_from_rollup: attribute(element, version, NamespaceSlot::Security, EXCLUDE_FROM_ROLLUP),
                security,
            },
        )
    }

    /// Build from raw values. `excludeFromRollup` is set to `true`
    /// automatically in versions that require it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] when the markings lack a
    /// classification or the access block belongs to another version.
    pub fn new(session: &Session, access: Option<Access>, security: SecurityAttributes) -> Result<Self> {
        let version = session.current_version()?;
        let exclude_from_rollup = if version.is_at_least(Version::V3_0) {
            Some(Attribute::new(
                session.qname(version, NamespaceSlot::Security, EXCLUDE_FROM_ROLLUP)?,
                "true",
            ))
        } else {
            None
        };
        finish(
            session,
            Self {
                core: ComponentCore::new(session.qname(version, NamespaceSlot::Core, NAME)?, version),
                accesses: access.into_iter().collect(),
                exclude_from_rollup,
                security,
            },
        )
    }

    #[must_use]
    pub fn access(&self) -> Option<&Access> {
        self.accesses.first()
    }

    #[must_use]
    pub fn exclude_from_rollup(&self) -> Option<bool> {
        self.exclude_from_rollup
            .as_ref()
            .and_then(|a| rules::parse_boolean(&a.value))
    }

    #[must_use]
    pub fn security_attributes(&self) -> &SecurityAttributes {
        &self.security
    }

    #[must_use]
    pub fn to_builder(&self) -> SecurityBuilder {
        SecurityBuilder {
            access: self.access().map(Access::to_builder).unwrap_or_default(),
            security: self.security.to_builder(),
        }
    }
}

impl Component for Security {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn nested(&self) -> Vec<&dyn Component> {
        self.accesses.iter().map(|a| a as &dyn Component).collect()
    }

    fn to_element(&self) -> Result<Element> {
        let mut element = Element::new(self.core.name().clone());
        if let Some(exclude) = &self.exclude_from_rollup {
            element.add_attribute(exclude.clone())?;
        }
        self.security.write_to(&mut element)?;
        for access in &self.accesses {
            element.add_child(access.to_element()?);
        }
        Ok(element)
    }

    fn render(&self, renderer: &Renderer, prefix: &str, suffix: &str) -> String {
        let key = self.key(prefix, suffix);
        let mut out = renderer.field(
            &format!("{key}.{EXCLUDE_FROM_ROLLUP}"),
            value_of(self.exclude_from_rollup.as_ref()),
        );
        out.push_str(&self.security.render(renderer, &format!("{key}.")));
        out.push_str(&render_all(renderer, &format!("{key}."), &self.accesses));
        out
    }
}

impl Validate for Security {
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn validate(&self, session: &Session) -> Result<()> {
        let version = self.version();
        self.core
            .require_name(&session.qname(version, NamespaceSlot::Core, NAME)?)?;
        rules::require_bounded(
            self.accesses.len(),
            0,
            Some(1),
            &format!("{}:Access", session.prefix(NamespaceSlot::AccessControl)),
        )?;
        self.security.require_classification()?;
        if version.is_at_least(Version::V3_0) {
            match &self.exclude_from_rollup {
                None => {
                    return Err(Error::invalid(format!(
                        "The {EXCLUDE_FROM_ROLLUP} attribute is required."
                    )));
                }
                Some(exclude) if exclude.value != "true" => {
                    return Err(Error::invalid(format!(
                        "The {EXCLUDE_FROM_ROLLUP} attribute must have a fixed value of \"true\"."
                    )));
                }
                Some(_) => {}
            }
        } else if let Some(exclude) = &self.exclude_from_rollup {
            rules::require_in_range(
                &format!("{} attribute", exclude.name.qualified()),
                version,
                Version::V3_0,
                None,
            )?;
        }
        self.core.require_child_versions(&self.nested())?;
        self.security.require_version(version)
    }
}

/// Mutable staging area for [`Security`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityBuilder {
    pub access: AccessBuilder,
    pub security: SecurityAttributesBuilder,
}

impl Builder for SecurityBuilder {
    type Output = Option<Security>;

    fn is_empty(&self) -> bool {
        self.access.is_empty() && self.security.is_empty()
    }

    fn commit(&self, session: &Session) -> Result<Option<Security>> {
        if self.is_empty() {
            return Ok(None);
        }
        Security::new(session, self.access.commit(session)?, self.security.commit(session)?)
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddms_ir::parse_str;
    use ddms_validation::OutputIndexLevel;

    fn markings(session: &Session) -> SecurityAttributes {
        SecurityAttributes::with_classification(session, "U", &["USA"]).unwrap()
    }

    #[test]
    fn test_exclude_from_rollup_set_automatically() {
        let session = Session::for_version("3.0").unwrap();
        let security = Security::new(&session, None, markings(&session)).unwrap();
        assert_eq!(security.exclude_from_rollup(), Some(true));

        let session = session.with_version("2.0").unwrap();
        let security = Security::new(&session, None, markings(&session)).unwrap();
        assert_eq!(security.exclude_from_rollup(), None);
    }

    #[test]
    fn test_exclude_from_rollup_rules() {
        let session = Session::for_version("3.1").unwrap();
        let missing = parse_str(
            r#"<ddms:security xmlns:ddms="http://metadata.dod.mil/mdr/ns/DDMS/3.1/"
                xmlns:ISM="urn:us:gov:ic:ism" ISM:classification="U" ISM:ownerProducer="USA" />"#,
        )
        .unwrap();
        let err = Security::from_element(&session, &missing.root).unwrap_err();
        assert_eq!(err.to_string(), "The excludeFromRollup attribute is required.");
        assert_eq!(err.locator(), Some("/ddms:security"));

        let wrong = parse_str(
            r#"<ddms:security xmlns:ddms="http://metadata.dod.mil/mdr/ns/DDMS/3.1/"
                xmlns:ISM="urn:us:gov:ic:ism" ISM:excludeFromRollup="false"
                ISM:classification="U" ISM:ownerProducer="USA" />"#,
        )
        .unwrap();
        let err = Security::from_element(&session, &wrong.root).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The excludeFromRollup attribute must have a fixed value of \"true\"."
        );
    }

    #[test]
    fn test_exclude_from_rollup_illegal_in_2_0() {
        let session = Session::for_version("2.0").unwrap();
        let doc = parse_str(
            r#"<ddms:security xmlns:ddms="http://metadata.dod.mil/mdr/ns/DDMS/2.0/"
                xmlns:ICISM="urn:us:gov:ic:ism:v2" ICISM:excludeFromRollup="true"
                ICISM:classification="U" ICISM:ownerProducer="USA" />"#,
        )
        .unwrap();
        let err = Security::from_element(&session, &doc.root).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The ICISM:excludeFromRollup attribute cannot be used until DDMS 3.0 or later."
        );
    }

    #[test]
    fn test_at_most_one_access() {
        let session = Session::for_version("4.1").unwrap();
        let doc = parse_str(
            r#"<ddms:security xmlns:ddms="urn:us:mil:ces:metadata:ddms:4"
                xmlns:ISM="urn:us:gov:ic:ism" xmlns:ntk="urn:us:gov:ic:ntk"
                ISM:excludeFromRollup="true" ISM:classification="U" ISM:ownerProducer="USA">
                <ntk:Access ISM:classification="U" ISM:ownerProducer="USA" />
                <ntk:Access ISM:classification="U" ISM:ownerProducer="USA" />
            </ddms:security>"#,
        )
        .unwrap();
        let err = Security::from_element(&session, &doc.root).unwrap_err();
        assert_eq!(err.to_string(), "No more than 1 ntk:Access element can exist.");
    }

    #[test]
    fn test_access_warning_is_rerooted() {
        let session = Session::for_version("4.1").unwrap();
        let access = Access::new(&session, Vec::new(), None, markings(&session)).unwrap();
        let security = Security::new(&session, Some(access), markings(&session)).unwrap();
        assert_eq!(security.warnings().len(), 1);
        assert_eq!(security.warnings()[0].locator, "/ddms:security/ntk:Access");

        let doc = parse_str(&security.to_xml().unwrap()).unwrap();
        assert_eq!(Security::from_element(&session, &doc.root).unwrap(), security);
    }

    #[test]
    fn test_access_output_carries_position() {
        let session = Session::for_version("4.1").unwrap();
        let access = Access::new(&session, Vec::new(), None, markings(&session)).unwrap();
        let security = Security::new(&session, Some(access), markings(&session)).unwrap();

        let always = security.to_text(OutputIndexLevel::Always);
        assert!(always.contains("security.Access[1].classification: U\n"));
        let repeated = security.to_text(OutputIndexLevel::WhenRepeated);
        assert!(repeated.contains("security.Access.classification: U\n"));
    }

    #[test]
    fn test_builder() {
        let session = Session::for_version("5.0").unwrap();
        let mut builder = SecurityBuilder::default();
        assert!(builder.commit(&session).unwrap().is_none());

        builder.security.set_classification("U").set_owner_producers(&["USA"]);
        let security = builder.commit(&session).unwrap().unwrap();
        assert!(security.access().is_none());
        assert_eq!(security.to_builder(), builder);
    }
}

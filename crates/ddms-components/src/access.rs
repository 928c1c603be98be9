//! Need-to-know access controls (`ntk:`, DDMS 4.1 and later)

use crate::{children, sibling_name, text_of};
use ddms_ir::{Attribute, Element};
use ddms_schema::{NamespaceSlot, Version};
use ddms_validation::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use ddms_validation::component::{finish, render_all};
use ddms_validation::{
    Builder, BuilderList, Component, ComponentCore, Renderer, Result, Session, Validate, rules,
};

const PROFILE_VALUE: &str = "AccessProfileValue";
const ACCESS: &str = "Access";

/// One value of an access profile, drawn from a named vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileValue {
    core: ComponentCore,
    value: String,
    vocabulary: String,
    security: SecurityAttributes,
}

impl ProfileValue {
    /// # Errors
    ///
    /// Returns [`ddms_validation::Error::InvalidStructure`] when the element
    /// is not a valid profile value.
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
                vocabulary: element
                    .attribute_value(&element.name.namespace, "vocabulary")
                    .unwrap_or_default()
                    .to_string(),
                security,
            },
        )
    }

    /// # Errors
    ///
    /// Returns [`ddms_validation::Error::InvalidStructure`] when a value is
    /// missing or the version predates access controls.
    pub fn new(
        session: &Session,
        vocabulary: &str,
        value: &str,
        security: SecurityAttributes,
    ) -> Result<Self> {
        finish(
            session,
            Self {
                core: ComponentCore::new(
                    session.current_qname(NamespaceSlot::AccessControl, PROFILE_VALUE)?,
                    session.current_version()?,
                ),
                value: value.to_string(),
                vocabulary: vocabulary.to_string(),
                security,
            },
        )
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn vocabulary(&self) -> &str {
        &self.vocabulary
    }

    #[must_use]
    pub fn security_attributes(&self) -> &SecurityAttributes {
        &self.security
    }

    #[must_use]
    pub fn to_builder(&self) -> ProfileValueBuilder {
        ProfileValueBuilder {
            value: self.value.clone(),
            vocabulary: self.vocabulary.clone(),
            security: self.security.to_builder(),
        }
    }
}

impl Component for ProfileValue {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn to_element(&self) -> Result<Element> {
        let name = self.core.name();
        let mut element = Element::with_text(name.clone(), &self.value);
        element.add_attribute(Attribute::new(sibling_name(name, "vocabulary"), &self.vocabulary))?;
        self.security.write_to(&mut element)?;
        Ok(element)
    }

    fn render(&self, renderer: &Renderer, prefix: &str, suffix: &str) -> String {
        let key = self.key(prefix, suffix);
        let mut out = renderer.field(&key, &self.value);
        out.push_str(&renderer.field(&format!("{key}.vocabulary"), &self.vocabulary));
        out.push_str(&self.security.render(renderer, &format!("{key}.")));
        out
    }
}

impl Validate for ProfileValue {
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn validate(&self, session: &Session) -> Result<()> {
        let version = self.version();
        self.core
            .require_name(&session.qname(version, NamespaceSlot::AccessControl, PROFILE_VALUE)?)?;
        rules::require_value(&self.value, "value")?;
        rules::require_value(&self.vocabulary, "vocabulary attribute")?;
        self.security.require_classification()?;
        self.security.require_version(version)?;
        self.core.require_since(Version::V4_1)
    }
}

/// Mutable staging area for [`ProfileValue`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileValueBuilder {
    pub value: String,
    pub vocabulary: String,
    pub security: SecurityAttributesBuilder,
}

impl Builder for ProfileValueBuilder {
    type Output = Option<ProfileValue>;

    fn is_empty(&self) -> bool {
        self.value.trim().is_empty() && self.vocabulary.trim().is_empty() && self.security.is_empty()
    }

    fn commit(&self, session: &Session) -> Result<Option<ProfileValue>> {
        if self.is_empty() {
            return Ok(None);
        }
        ProfileValue::new(session, &self.vocabulary, &self.value, self.security.commit(session)?)
            .map(Some)
    }
}

/// Access control information for a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Access {
    core: ComponentCore,
    profile_values: Vec<ProfileValue>,
    external_reference: Option<String>,
    security: SecurityAttributes,
}

impl Access {
    /// # Errors
    ///
    /// Returns [`ddms_validation::Error::InvalidStructure`] when the element
    /// or one of its profile values is invalid.
    pub fn from_element(session: &Session, element: &Element) -> Result<Self> {
        let version = session.current_version()?;
        let locator = format!("/{}", element.name.qualified());
        let security =
            SecurityAttributes::from_element(session, element).map_err(|e| e.under(&locator))?;
        let profile_values = children(element, version, NamespaceSlot::AccessControl, PROFILE_VALUE)
            .map(|child| ProfileValue::from_element(session, child))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.under(&locator))?;
        finish(
            session,
            Self {
                core: ComponentCore::new(element.name.clone(), version),
                profile_values,
                external_reference: element
                    .attribute_value(&element.name.namespace, "externalReference")
                    .filter(|v| !v.trim().is_empty())
                    .map(ToString::to_string),
                security,
            },
        )
    }

    /// # Errors
    ///
    /// Returns [`ddms_validation::Error::InvalidStructure`] when the markings
    /// lack a classification or `externalReference` is used before DDMS 5.0.
    pub fn new(
        session: &Session,
        profile_values: Vec<ProfileValue>,
        external_reference: Option<bool>,
        security: SecurityAttributes,
    ) -> Result<Self> {
        finish(
            session,
            Self {
                core: ComponentCore::new(
                    session.current_qname(NamespaceSlot::AccessControl, ACCESS)?,
                    session.current_version()?,
                ),
                profile_values,
                external_reference: external_reference.map(|b| b.to_string()),
                security,
            },
        )
    }

    #[must_use]
    pub fn profile_values(&self) -> &[ProfileValue] {
        &self.profile_values
    }

    #[must_use]
    pub fn external_reference(&self) -> Option<bool> {
        self.external_reference.as_deref().and_then(rules::parse_boolean)
    }

    #[must_use]
    pub fn security_attributes(&self) -> &SecurityAttributes {
        &self.security
    }

    #[must_use]
    pub fn to_builder(&self) -> AccessBuilder {
        AccessBuilder {
            profile_values: self.profile_values.iter().map(ProfileValue::to_builder).collect(),
            external_reference: self.external_reference(),
            security: self.security.to_builder(),
        }
    }
}

impl Component for Access {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn nested(&self) -> Vec<&dyn Component> {
        self.profile_values.iter().map(|p| p as &dyn Component).collect()
    }

    fn to_element(&self) -> Result<Element> {
        let name = self.core.name();
        let mut element = Element::new(name.clone());
        if let Some(reference) = &self.external_reference {
            element.add_attribute(Attribute::new(sibling_name(name, "externalReference"), reference))?;
        }
        self.security.write_to(&mut element)?;
        for value in &self.profile_values {
            element.add_child(value.to_element()?);
        }
        Ok(element)
    }

    fn render(&self, renderer: &Renderer, prefix: &str, suffix: &str) -> String {
        let key = self.key(prefix, suffix);
        let mut out = render_all(renderer, &format!("{key}."), &self.profile_values);
        if let Some(reference) = &self.external_reference {
            out.push_str(&renderer.field(&format!("{key}.externalReference"), reference));
        }
        out.push_str(&self.security.render(renderer, &format!("{key}.")));
        out
    }
}

impl Validate for Access {
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn validate(&self, session: &Session) -> Result<()> {
        let version = self.version();
        self.core
            .require_name(&session.qname(version, NamespaceSlot::AccessControl, ACCESS)?)?;
        self.security.require_classification()?;
        if let Some(reference) = &self.external_reference {
            rules::require_boolean(reference, "ntk:externalReference")?;
        }
        self.core.require_child_versions(&self.nested())?;
        self.security.require_version(version)?;
        if self.external_reference.is_some() {
            rules::require_in_range(
                &format!("{}:externalReference attribute", self.core.name().prefix),
                version,
                Version::V5_0,
                None,
            )?;
        }
        self.core.require_since(Version::V4_1)
    }

    fn validate_warnings(&self, _session: &Session) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.profile_values.is_empty() {
            warnings.push(format!(
                "An {} element was found with no profile information.",
                self.qualified_name()
            ));
        }
        warnings
    }
}

/// Mutable staging area for [`Access`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessBuilder {
    pub profile_values: BuilderList<ProfileValueBuilder>,
    pub external_reference: Option<bool>,
    pub security: SecurityAttributesBuilder,
}

impl Builder for AccessBuilder {
    type Output = Option<Access>;

    fn is_empty(&self) -> bool {
        self.profile_values.all_empty()
            && self.external_reference.is_none()
            && self.security.is_empty()
    }

    fn commit(&self, session: &Session) -> Result<Option<Access>> {
        if self.is_empty() {
            return Ok(None);
        }
        Access::new(
            session,
            self.profile_values.commit(session)?,
            self.external_reference,
            self.security.commit(session)?,
        )
        .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddms_ir::parse_str;

    fn markings(session: &Session) -> SecurityAttributes {
        SecurityAttributes::with_classification(session, "U", &["USA"]).unwrap()
    }

    #[test]
    fn test_empty_access_warns() {
        let session = Session::for_version("5.0").unwrap();
        let access = Access::new(&session, Vec::new(), None, markings(&session)).unwrap();
        assert_eq!(access.warnings().len(), 1);
        assert_eq!(
            access.warnings()[0].text,
            "An ntk:Access element was found with no profile information."
        );
        assert_eq!(access.warnings()[0].locator, "/ntk:Access");
    }

    #[test]
    fn test_not_before_4_1() {
        let session = Session::for_version("3.1").unwrap();
        let err = Access::new(&session, Vec::new(), None, markings(&session)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The ntk:Access element cannot be used until DDMS 4.1 or later."
        );
    }

    #[test]
    fn test_external_reference_gated() {
        let session = Session::for_version("4.1").unwrap();
        let err = Access::new(&session, Vec::new(), Some(true), markings(&session)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The ntk:externalReference attribute cannot be used until DDMS 5.0 or later."
        );

        let session = session.with_version("5.0").unwrap();
        let access = Access::new(&session, Vec::new(), Some(true), markings(&session)).unwrap();
        assert_eq!(access.external_reference(), Some(true));
    }

    #[test]
    fn test_child_error_is_rerooted() {
        let session = Session::for_version("4.1").unwrap();
        let doc = parse_str(
            r#"<ntk:Access xmlns:ntk="urn:us:gov:ic:ntk" xmlns:ISM="urn:us:gov:ic:ism"
                ISM:classification="U" ISM:ownerProducer="USA">
                <ntk:AccessProfileValue ntk:vocabulary="vocab" ISM:classification="U"
                    ISM:ownerProducer="USA"></ntk:AccessProfileValue>
            </ntk:Access>"#,
        )
        .unwrap();
        let err = Access::from_element(&session, &doc.root).unwrap_err();
        assert_eq!(err.to_string(), "value is required.");
        assert_eq!(err.locator(), Some("/ntk:Access/ntk:AccessProfileValue"));
    }

    #[test]
    fn test_round_trip_with_profile_value() {
        let session = Session::for_version("4.1").unwrap();
        let value = ProfileValue::new(&session, "vocab", "profile", markings(&session)).unwrap();
        let access = Access::new(&session, vec![value], None, markings(&session)).unwrap();
        assert!(access.warnings().is_empty());

        let doc = parse_str(&access.to_xml().unwrap()).unwrap();
        let parsed = Access::from_element(&session, &doc.root).unwrap();
        assert_eq!(parsed, access);
        assert_eq!(parsed.nested().len(), 1);
    }

    #[test]
    fn test_builder_drops_empty_profile_values() {
        let session = Session::for_version("4.1").unwrap();
        let mut builder = AccessBuilder::default();
        assert!(builder.is_empty());
        builder.profile_values.ensure_len(3);
        assert!(builder.is_empty());

        let value = builder.profile_values.get_or_grow(1);
        value.value = "profile".to_string();
        value.vocabulary = "vocab".to_string();
        value.security.set_classification("U").set_owner_producers(&["USA"]);
        builder.security.set_classification("U").set_owner_producers(&["USA"]);

        let access = builder.commit(&session).unwrap().unwrap();
        assert_eq!(access.profile_values().len(), 1);
        assert_eq!(access.to_builder().profile_values.len(), 1);
    }
}

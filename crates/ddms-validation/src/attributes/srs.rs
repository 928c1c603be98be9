//! Spatial reference system attributes on GML elements (unqualified)

use super::{AttributeRule, AttributeSet, ValueKind};
use crate::builder::Builder;
use crate::output::Renderer;
use crate::session::Session;
use crate::{Error, Result};
use ddms_ir::Element;
use ddms_schema::Version;
use std::collections::BTreeMap;

static RULES: &[AttributeRule] = &[
    AttributeRule::unqualified("srsName", ValueKind::Text),
    AttributeRule::unqualified("srsDimension", ValueKind::PositiveInteger),
    AttributeRule::unqualified("axisLabels", ValueKind::NameList),
    AttributeRule::unqualified("uomLabels", ValueKind::NameList),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SrsAttributes {
    set: AttributeSet,
}

impl SrsAttributes {
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] when a value is malformed or a
    /// companion attribute is missing.
    pub fn from_element(session: &Session, element: &Element) -> Result<Self> {
        Self::validated(session, AttributeSet::from_element(RULES, session, element)?)
    }

    /// # Errors
    ///
    /// See [`SrsAttributes::from_element`]; unknown names give [`Error::Argument`].
    pub fn new<'a, I>(session: &Session, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self::validated(session, AttributeSet::from_pairs(RULES, session, pairs)?)
    }

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
        if set.contains("uomLabels") && !set.contains("axisLabels") {
            return Err(Error::invalid(
                "The uomLabels attribute can only be used in conjunction with the axisLabels attribute.",
            ));
        }
        if set.contains("axisLabels") && !set.contains("srsName") {
            return Err(Error::invalid(
                "The axisLabels attribute can only be used in conjunction with the srsName attribute.",
            ));
        }
        Ok(Self { set })
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] on a version mismatch.
    pub fn require_version(&self, version: Version) -> Result<()> {
        self.set.require_version(version)
    }

    #[must_use]
    pub fn srs_name(&self) -> Option<String> {
        self.set.text("srsName")
    }

    #[must_use]
    pub fn srs_dimension(&self) -> Option<u64> {
        self.set.text("srsDimension").and_then(|d| d.parse().ok())
    }

    #[must_use]
    pub fn axis_labels(&self) -> Vec<&str> {
        self.set.tokens("axisLabels")
    }

    #[must_use]
    pub fn uom_labels(&self) -> Vec<&str> {
        self.set.tokens("uomLabels")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

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

    #[must_use]
    pub fn to_builder(&self) -> SrsAttributesBuilder {
        let mut builder = SrsAttributesBuilder::default();
        for (local, value) in self.set.pairs() {
            builder.values.insert(local.to_string(), value);
        }
        builder
    }
}

/// Mutable staging area for [`SrsAttributes`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SrsAttributesBuilder {
    values: BTreeMap<String, String>,
}

impl SrsAttributesBuilder {
    pub fn set(&mut self, local: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(local.into(), value.into());
        self
    }

    pub fn set_srs_name(&mut self, srs_name: impl Into<String>) -> &mut Self {
        self.set("srsName", srs_name)
    }
}

impl Builder for SrsAttributesBuilder {
    type Output = SrsAttributes;

    fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.trim().is_empty())
    }

    fn commit(&self, session: &Session) -> Result<SrsAttributes> {
        SrsAttributes::new(
            session,
            self.values.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::for_version("3.0").unwrap()
    }

    #[test]
    fn test_valid_srs() {
        let attributes = SrsAttributes::new(
            &session(),
            [
                ("srsName", "http://metadata.dod.mil/mdr/ns/GSIP/crs/WGS84E_2D"),
                ("srsDimension", "2"),
                ("axisLabels", "A B"),
                ("uomLabels", "Meter Meter"),
            ],
        )
        .unwrap();
        assert_eq!(attributes.srs_dimension(), Some(2));
        assert_eq!(attributes.axis_labels(), vec!["A", "B"]);
    }

    #[test]
    fn test_companions() {
        let err = SrsAttributes::new(&session(), [("uomLabels", "Meter")]).unwrap_err();
        assert!(err.to_string().contains("conjunction with the axisLabels"));

        let err = SrsAttributes::new(&session(), [("axisLabels", "A")]).unwrap_err();
        assert!(err.to_string().contains("conjunction with the srsName"));
    }

    #[test]
    fn test_bad_dimension_and_labels() {
        let err = SrsAttributes::new(&session(), [("srsDimension", "-1")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The srsDimension attribute must be a positive integer."
        );
        assert!(
            SrsAttributes::new(&session(), [("srsName", "x"), ("axisLabels", "1A")]).is_err()
        );
    }

    #[test]
    fn test_unqualified_on_element() {
        let mut builder = SrsAttributesBuilder::default();
        builder.set_srs_name("urn:srs");
        let attributes = builder.commit(&session()).unwrap();

        let mut element = Element::new(ddms_ir::QName::unqualified("pos"));
        attributes.write_to(&mut element).unwrap();
        assert_eq!(element.attribute_value("", "srsName"), Some("urn:srs"));
    }
}

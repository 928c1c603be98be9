//! GML geometry: `gml:Point` and `gml:pos`

use crate::{attribute, children, sibling_name, text_of, value_of};
use ddms_ir::{Attribute, Element};
use ddms_schema::NamespaceSlot;
use ddms_validation::attributes::{SrsAttributes, SrsAttributesBuilder};
use ddms_validation::component::{finish, render_all};
use ddms_validation::{
    Builder, Component, ComponentCore, Error, Renderer, Result, Session, Validate, rules,
};
use tracing::trace;

const POSITION: &str = "pos";
const POINT: &str = "Point";

/// Canonical text of a coordinate; unparseable input is kept for validation to reject
fn canonical(token: &str) -> String {
    token
        .parse::<f64>()
        .map_or_else(|_| token.to_string(), |n| n.to_string())
}

/// A 2D or 3D position
///
/// Coordinates are stored in canonical decimal form, so `40.0` and `40`
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    core: ComponentCore,
    coordinates: Vec<String>,
    srs: SrsAttributes,
}

impl Position {
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] when the coordinates are malformed.
    pub fn from_element(session: &Session, element: &Element) -> Result<Self> {
        let version = session.current_version()?;
        let locator = format!("/{}", element.name.qualified());
        let srs = SrsAttributes::from_element(session, element).map_err(|e| e.under(&locator))?;
        finish(
            session,
            Self {
                core: ComponentCore::new(element.name.clone(), version),
                coordinates: text_of(element).split_whitespace().map(canonical).collect(),
                srs,
            },
        )
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] unless there are 2 or 3 finite coordinates.
    pub fn new(session: &Session, coordinates: &[f64], srs: SrsAttributes) -> Result<Self> {
        finish(
            session,
            Self {
                core: ComponentCore::new(
                    session.current_qname(NamespaceSlot::Geospatial, POSITION)?,
                    session.current_version()?,
                ),
                coordinates: coordinates.iter().map(ToString::to_string).collect(),
                srs,
            },
        )
    }

    #[must_use]
    pub fn coordinates(&self) -> Vec<f64> {
        self.coordinates
            .iter()
            .filter_map(|c| c.parse().ok())
            .collect()
    }

    #[must_use]
    pub fn srs_attributes(&self) -> &SrsAttributes {
        &self.srs
    }

    #[must_use]
    pub fn to_builder(&self) -> PositionBuilder {
        PositionBuilder {
            coordinates: self.coordinates(),
            srs: self.srs.to_builder(),
        }
    }
}

impl Component for Position {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn to_element(&self) -> Result<Element> {
        let mut element = Element::with_text(self.core.name().clone(), self.coordinates.join(" "));
        self.srs.write_to(&mut element)?;
        Ok(element)
    }

    fn render(&self, renderer: &Renderer, prefix: &str, suffix: &str) -> String {
        let key = self.key(prefix, suffix);
        let mut out = renderer.field(&key, &self.coordinates.join(" "));
        out.push_str(&self.srs.render(renderer, &format!("{key}.")));
        out
    }
}

impl Validate for Position {
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn validate(&self, session: &Session) -> Result<()> {
        let version = self.version();
        self.core
            .require_name(&session.qname(version, NamespaceSlot::Geospatial, POSITION)?)?;
        if !(2..=3).contains(&self.coordinates.len()) {
            return Err(Error::invalid(
                "A position must be represented by either 2 or 3 coordinates.",
            ));
        }
        for coordinate in &self.coordinates {
            rules::require_number(coordinate, "coordinate")?;
        }
        self.srs.require_version(version)
    }
}

/// Mutable staging area for [`Position`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionBuilder {
    pub coordinates: Vec<f64>,
    pub srs: SrsAttributesBuilder,
}

impl Builder for PositionBuilder {
    type Output = Option<Position>;

    fn is_empty(&self) -> bool {
        self.coordinates.is_empty() && self.srs.is_empty()
    }

    fn commit(&self, session: &Session) -> Result<Option<Position>> {
        if self.is_empty() {
            return Ok(None);
        }
        Position::new(session, &self.coordinates, self.srs.commit(session)?).map(Some)
    }
}

/// A single point, identified by `gml:id`, in a named reference system
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    core: ComponentCore,
    positions: Vec<Position>,
    id: Option<Attribute>,
    srs: SrsAttributes,
}

impl Point {
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] when the element or its position is invalid.
    pub fn from_element(session: &Session, element: &Element) -> Result<Self> {
        let version = session.current_version()?;
        let locator = format!("/{}", element.name.qualified());
        let srs = SrsAttributes::from_element(session, element).map_err(|e| e.under(&locator))?;
        let positions = children(element, version, NamespaceSlot::Geospatial, POSITION)
            .map(|child| Position::from_element(session, child))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.under(&locator))?;
        finish(
            session,
            Self {
                core: ComponentCore::new(element.name.clone(), version),
                positions,
                id: attribute(element, version, NamespaceSlot::Geospatial, "id"),
                srs,
            },
        )
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] when the id is not an NCName, the
    /// reference system is unnamed, or the position disagrees with it.
    pub fn new(session: &Session, position: Position, srs: SrsAttributes, id: &str) -> Result<Self> {
        let name = session.current_qname(NamespaceSlot::Geospatial, POINT)?;
        let id = (!id.trim().is_empty()).then(|| Attribute::new(sibling_name(&name, "id"), id));
        finish(
            session,
            Self {
                core: ComponentCore::new(name, session.current_version()?),
                positions: vec![position],
                id,
                srs,
            },
        )
    }

    /// The position; every valid point has exactly one
    #[must_use]
    pub fn position(&self) -> Option<&Position> {
        self.positions.first()
    }

    #[must_use]
    pub fn id(&self) -> &str {
        value_of(self.id.as_ref())
    }

    #[must_use]
    pub fn srs_attributes(&self) -> &SrsAttributes {
        &self.srs
    }

    #[must_use]
    pub fn to_builder(&self) -> PointBuilder {
        PointBuilder {
            id: self.id().to_string(),
            position: self.position().map(Position::to_builder).unwrap_or_default(),
            srs: self.srs.to_builder(),
        }
    }
}

impl Component for Point {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn nested(&self) -> Vec<&dyn Component> {
        self.positions.iter().map(|p| p as &dyn Component).collect()
    }

    fn to_element(&self) -> Result<Element> {
        let mut element = Element::new(self.core.name().clone());
        self.srs.write_to(&mut element)?;
        if let Some(id) = &self.id {
            element.add_attribute(id.clone())?;
        }
        for position in &self.positions {
            element.add_child(position.to_element()?);
        }
        Ok(element)
    }

    fn render(&self, renderer: &Renderer, prefix: &str, suffix: &str) -> String {
        let key = self.key(prefix, suffix);
        let mut out = self.srs.render(renderer, &format!("{key}."));
        out.push_str(&renderer.field(&format!("{key}.id"), self.id()));
        out.push_str(&render_all(renderer, &format!("{key}."), &self.positions));
        out
    }
}

impl Validate for Point {
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn validate(&self, session: &Session) -> Result<()> {
        let version = self.version();
        let prefix = &self.core.name().prefix;
        self.core
            .require_name(&session.qname(version, NamespaceSlot::Geospatial, POINT)?)?;
        let srs_name = self.srs.srs_name().unwrap_or_default();
        rules::require_value(&srs_name, "srsName")?;
        rules::require_value(self.id(), &format!("{prefix}:id"))?;
        rules::require_ncname(self.id(), &format!("{prefix}:id"))?;
        rules::require_bounded(self.positions.len(), 1, Some(1), &format!("{prefix}:{POSITION}"))?;
        for position in &self.positions {
            if let Some(position_srs) = position.srs_attributes().srs_name() {
                if position_srs != srs_name {
                    trace!(point = %srs_name, position = %position_srs, "srsName mismatch");
                    return Err(Error::invalid(
                        "The srsName of the position must match the srsName of the Point.",
                    ));
                }
            }
        }
        self.core.require_child_versions(&self.nested())?;
        self.srs.require_version(version)
    }
}

/// Mutable staging area for [`Point`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointBuilder {
    pub id: String,
    pub position: PositionBuilder,
    pub srs: SrsAttributesBuilder,
}

impl Builder for PointBuilder {
    type Output = Option<Point>;

    fn is_empty(&self) -> bool {
        self.id.trim().is_empty() && self.position.is_empty() && self.srs.is_empty()
    }

    fn commit(&self, session: &Session) -> Result<Option<Point>> {
        if self.is_empty() {
            return Ok(None);
        }
        let Some(position) = self.position.commit(session)? else {
            return Err(Error::invalid("Exactly 1 gml:pos element must exist.")
                .located(&format!("/{}:{POINT}", session.prefix(NamespaceSlot::Geospatial))));
        };
        Point::new(session, position, self.srs.commit(session)?, &self.id).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddms_ir::parse_str;

    const FIXTURE: &str = r#"<gml:Point xmlns:gml="http://www.opengis.net/gml/3.2"
        srsName="http://metadata.dod.mil/mdr/ns/GSIP/crs/WGS84E_2D" srsDimension="10"
        axisLabels="A B C" uomLabels="Meter Meter Meter" gml:id="IDValue">
        <gml:pos srsName="http://metadata.dod.mil/mdr/ns/GSIP/crs/WGS84E_2D">32.1 40.0</gml:pos>
    </gml:Point>"#;

    fn srs(session: &Session, name: &str) -> SrsAttributes {
        SrsAttributes::new(session, [("srsName", name)]).unwrap()
    }

    #[test]
    fn test_from_element() {
        let session = Session::for_version("4.1").unwrap();
        let doc = parse_str(FIXTURE).unwrap();
        let point = Point::from_element(&session, &doc.root).unwrap();
        assert_eq!(point.id(), "IDValue");
        assert_eq!(point.srs_attributes().srs_dimension(), Some(10));
        assert_eq!(point.position().unwrap().coordinates(), vec![32.1, 40.0]);
    }

    #[test]
    fn test_canonical_coordinates() {
        let session = Session::for_version("5.0").unwrap();
        let doc = parse_str(
            r#"<gml:pos xmlns:gml="http://www.opengis.net/gml/3.2">32.10 40.0</gml:pos>"#,
        )
        .unwrap();
        let parsed = Position::from_element(&session, &doc.root).unwrap();
        let built = Position::new(&session, &[32.1, 40.0], SrsAttributes::empty(&session).unwrap())
            .unwrap();
        assert_eq!(parsed, built);
        assert_eq!(built.to_xml().unwrap().matches("32.1 40").count(), 1);
    }

    #[test]
    fn test_coordinate_count_and_format() {
        let session = Session::for_version("3.0").unwrap();
        let empty = SrsAttributes::empty(&session).unwrap();
        let err = Position::new(&session, &[1.0], empty).unwrap_err();
        assert_eq!(
            err.to_string(),
            "A position must be represented by either 2 or 3 coordinates."
        );
        assert_eq!(err.locator(), Some("/gml:pos"));

        let doc = parse_str(
            r#"<gml:pos xmlns:gml="http://www.opengis.net/gml/3.2">1.0 north</gml:pos>"#,
        )
        .unwrap();
        let err = Position::from_element(&session, &doc.root).unwrap_err();
        assert_eq!(err.to_string(), "The coordinate value must be a number: north");
    }

    #[test]
    fn test_point_rules() {
        let session = Session::for_version("5.0").unwrap();
        let name = "http://metadata.dod.mil/mdr/ns/GSIP/crs/WGS84E_2D";
        let position = Position::new(&session, &[32.1, 40.0], srs(&session, name)).unwrap();

        let err = Point::new(&session, position.clone(), srs(&session, name), "1abc").unwrap_err();
        assert!(err.to_string().contains("NCName"));

        let err = Point::new(
            &session,
            position.clone(),
            SrsAttributes::empty(&session).unwrap(),
            "IDValue",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "srsName is required.");

        let err = Point::new(&session, position.clone(), srs(&session, "other"), "IDValue")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The srsName of the position must match the srsName of the Point."
        );
        assert_eq!(err.locator(), Some("/gml:Point"));

        assert!(Point::new(&session, position, srs(&session, name), "IDValue").is_ok());
    }

    #[test]
    fn test_round_trip() {
        let session = Session::for_version("4.1").unwrap();
        let doc = parse_str(FIXTURE).unwrap();
        let point = Point::from_element(&session, &doc.root).unwrap();
        let again = parse_str(&point.to_xml().unwrap()).unwrap();
        assert_eq!(Point::from_element(&session, &again.root).unwrap(), point);
    }

    #[test]
    fn test_builder() {
        let session = Session::for_version("5.0").unwrap();
        let mut builder = PointBuilder::default();
        assert!(builder.commit(&session).unwrap().is_none());

        builder.id = "IDValue".to_string();
        builder.srs.set_srs_name("EPSG:4326");
        assert_eq!(
            builder.commit(&session).unwrap_err().to_string(),
            "Exactly 1 gml:pos element must exist."
        );

        builder.position.coordinates = vec![32.1, 40.0];
        let point = builder.commit(&session).unwrap().unwrap();
        assert_eq!(point.to_builder(), builder);
    }
}

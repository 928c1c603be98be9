//! DDMS versions and their namespace tables

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the sub-vocabularies a DDMS version is composed of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespaceSlot {
    /// Core DDMS fields (`ddms:`)
    Core,
    /// Intelligence Community security markings (`ISM:`)
    Security,
    /// Geography Markup Language (`gml:`)
    Geospatial,
    /// Need-To-Know access control (`ntk:`)
    AccessControl,
    /// XLink link typing (`xlink:`)
    Link,
}

impl NamespaceSlot {
    /// Every slot, in declaration order
    pub const ALL: [NamespaceSlot; 5] = [
        NamespaceSlot::Core,
        NamespaceSlot::Security,
        NamespaceSlot::Geospatial,
        NamespaceSlot::AccessControl,
        NamespaceSlot::Link,
    ];
}

/// A DDMS schema generation.
///
/// The derived ordering is the chronological order of the generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Version {
    #[serde(rename = "2.0")]
    V2_0,
    #[serde(rename = "3.0")]
    V3_0,
    #[serde(rename = "3.1")]
    V3_1,
    #[serde(rename = "4.1")]
    V4_1,
    #[serde(rename = "5.0")]
    V5_0,
}

const XLINK: &str = "http://www.w3.org/1999/xlink";
const GML_3_2: &str = "http://www.opengis.net/gml/3.2";
const ISM: &str = "urn:us:gov:ic:ism";
const NTK: &str = "urn:us:gov:ic:ntk";

impl Version {
    /// Every known version, oldest first
    pub const ALL: [Version; 5] = [
        Version::V2_0,
        Version::V3_0,
        Version::V3_1,
        Version::V4_1,
        Version::V5_0,
    ];

    /// Canonical version string
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Version::V2_0 => "2.0",
            Version::V3_0 => "3.0",
            Version::V3_1 => "3.1",
            Version::V4_1 => "4.1",
            Version::V5_0 => "5.0",
        }
    }

    /// Map point releases onto the generation that shares their namespaces
    #[must_use]
    pub fn normalize(version: &str) -> &str {
        match version {
            "3.0.1" => "3.0",
            "4.0" | "4.0.1" => "4.1",
            other => other,
        }
    }

    /// Look up a canonical version string (no alias handling)
    #[must_use]
    pub fn from_canonical(version: &str) -> Option<Version> {
        Self::ALL.into_iter().find(|v| v.as_str() == version)
    }

    /// Namespace URI for a sub-vocabulary, if this version has one
    #[must_use]
    pub const fn namespace(self, slot: NamespaceSlot) -> Option<&'static str> {
        match (slot, self) {
            (NamespaceSlot::Core, Version::V2_0) => Some("http://metadata.dod.mil/mdr/ns/DDMS/2.0/"),
            (NamespaceSlot::Core, Version::V3_0) => Some("http://metadata.dod.mil/mdr/ns/DDMS/3.0/"),
            (NamespaceSlot::Core, Version::V3_1) => Some("http://metadata.dod.mil/mdr/ns/DDMS/3.1/"),
            (NamespaceSlot::Core, Version::V4_1) => Some("urn:us:mil:ces:metadata:ddms:4"),
            (NamespaceSlot::Core, Version::V5_0) => Some("urn:us:mil:ces:metadata:ddms:5"),
            (NamespaceSlot::Security, Version::V2_0) => Some("urn:us:gov:ic:ism:v2"),
            (NamespaceSlot::Security, _) => Some(ISM),
            (NamespaceSlot::Geospatial, Version::V2_0) => Some("http://www.opengis.net/gml"),
            (NamespaceSlot::Geospatial, _) => Some(GML_3_2),
            (NamespaceSlot::AccessControl, Version::V4_1 | Version::V5_0) => Some(NTK),
            (NamespaceSlot::AccessControl, _) => None,
            (NamespaceSlot::Link, _) => Some(XLINK),
        }
    }

    /// All namespace URIs this version declares, in slot order
    pub fn namespaces(self) -> impl Iterator<Item = (NamespaceSlot, &'static str)> {
        NamespaceSlot::ALL
            .into_iter()
            .filter_map(move |slot| self.namespace(slot).map(|ns| (slot, ns)))
    }

    /// True if this version is the same as or newer than `other`
    #[must_use]
    pub fn is_at_least(self, other: Version) -> bool {
        self >= other
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order() {
        let mut shuffled = vec![Version::V4_1, Version::V2_0, Version::V5_0, Version::V3_1, Version::V3_0];
        shuffled.sort();
        assert_eq!(shuffled, Version::ALL.to_vec());
        assert!(Version::V3_1.is_at_least(Version::V3_0));
        assert!(Version::V3_0.is_at_least(Version::V3_0));
        assert!(!Version::V2_0.is_at_least(Version::V3_0));
    }

    #[test]
    fn test_alias_normalization() {
        assert_eq!(Version::normalize("3.0.1"), "3.0");
        assert_eq!(Version::normalize("4.0.1"), "4.1");
        assert_eq!(Version::normalize("5.0"), "5.0");
        assert_eq!(Version::normalize("1.4"), "1.4");
    }

    #[test]
    fn test_from_canonical() {
        assert_eq!(Version::from_canonical("3.1"), Some(Version::V3_1));
        assert_eq!(Version::from_canonical("3.0.1"), None);
    }

    #[test]
    fn test_namespaces() {
        assert_eq!(
            Version::V2_0.namespace(NamespaceSlot::Security),
            Some("urn:us:gov:ic:ism:v2")
        );
        assert_eq!(Version::V3_0.namespace(NamespaceSlot::AccessControl), None);
        assert_eq!(
            Version::V5_0.namespace(NamespaceSlot::AccessControl),
            Some("urn:us:gov:ic:ntk")
        );
        assert_eq!(Version::V3_0.namespaces().count(), 4);
        assert_eq!(Version::V4_1.namespaces().count(), 5);
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(Version::V4_1.to_string(), "4.1");
        let json = serde_json::to_string(&Version::V3_1).unwrap();
        assert_eq!(json, "\"3.1\"");
    }
}

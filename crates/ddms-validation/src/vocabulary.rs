//! Controlled vocabulary validation

use crate::{Error, Result};
use ddms_schema::{Version, VersionRegistry};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub const CLASSIFICATIONS: &str = "classifications";
pub const OWNER_PRODUCERS: &str = "owner-producers";
pub const SCI_CONTROLS: &str = "sci-controls";
pub const SAR_IDENTIFIERS: &str = "sar-identifiers";
pub const ATOMIC_ENERGY_MARKINGS: &str = "atomic-energy-markings";
pub const DISSEMINATION_CONTROLS: &str = "dissemination-controls";
pub const DISPLAY_ONLY_TO: &str = "display-only-to";
pub const FGI_SOURCE_OPEN: &str = "fgi-source-open";
pub const FGI_SOURCE_PROTECTED: &str = "fgi-source-protected";
pub const RELEASABLE_TO: &str = "releasable-to";
pub const NON_IC_MARKINGS: &str = "non-ic-markings";
pub const NON_US_CONTROLS: &str = "non-us-controls";
pub const DECLASS_EXCEPTIONS: &str = "declass-exceptions";
pub const TYPE_OF_EXEMPTED_SOURCE: &str = "type-of-exempted-source";
pub const NOTICE_TYPES: &str = "notice-types";
pub const POC_TYPES: &str = "poc-types";

const COUNTRIES: &[&str] = &[
    "AUS", "CAN", "DEU", "DNK", "FRA", "GBR", "ITA", "JPN", "KOR", "NLD", "NOR", "NZL", "USA",
    "ACGU", "FVEY", "NATO", "TEYE", "ISAF", "KFOR",
];

/// Static definition of one vocabulary over a range of versions
struct Definition {
    key: &'static str,
    since: Version,
    /// First version that no longer carries the vocabulary
    until: Option<Version>,
    tokens: &'static [&'static str],
    patterns: &'static [&'static str],
}

impl Definition {
    fn applies_to(&self, version: Version) -> bool {
        version.is_at_least(self.since) && self.until.is_none_or(|until| version < until)
    }
}

const DEFINITIONS: &[Definition] = &[
    Definition {
        key: CLASSIFICATIONS,
        since: Version::V2_0,
        until: None,
        tokens: &[
            "U", "C", "S", "TS", "R", "CTS", "CTS-B", "CTS-BALK", "NU", "NR", "NC", "NS", "CTSA",
            "NSAT", "NCA",
        ],
        patterns: &[],
    },
    Definition {
        key: OWNER_PRODUCERS,
        since: Version::V2_0,
        until: None,
        tokens: COUNTRIES,
        patterns: &[],
    },
    Definition {
        key: SCI_CONTROLS,
        since: Version::V2_0,
        until: None,
        tokens: &["HCS", "KDK", "SI", "SI-G", "SI-ECI", "TK"],
        patterns: &["SI-G-[A-Z]{4}", "SI-ECI-[A-Z]{3}"],
    },
    Definition {
        key: SAR_IDENTIFIERS,
        since: Version::V2_0,
        until: None,
        tokens: &[],
        patterns: &["SAR-[A-Z0-9]{2,3}"],
    },
    Definition {
        key: ATOMIC_ENERGY_MARKINGS,
        since: Version::V3_1,
        until: None,
        tokens: &["RD", "FRD", "RD-CNWDI", "DCNI", "UCNI", "TFNI"],
        patterns: &["RD-SG-[0-9]{1,2}", "FRD-SG-[0-9]{1,2}"],
    },
    Definition {
        key: DISSEMINATION_CONTROLS,
        since: Version::V2_0,
        until: None,
        tokens: &[
            "RS", "FOUO", "OC", "IMC", "NF", "PR", "REL", "RELIDO", "EYES", "DSEN", "FISA",
            "DISPLAYONLY",
        ],
        patterns: &[],
    },
    Definition {
        key: DISPLAY_ONLY_TO,
        since: Version::V3_1,
        until: None,
        tokens: COUNTRIES,
        patterns: &[],
    },
    Definition {
        key: FGI_SOURCE_OPEN,
        since: Version::V2_0,
        until: None,
        tokens: COUNTRIES,
        patterns: &["UNKNOWN"],
    },
    Definition {
        key: FGI_SOURCE_PROTECTED,
        since: Version::V2_0,
        until: None,
        tokens: COUNTRIES,
        patterns: &["UNKNOWN"],
    },
    Definition {
        key: RELEASABLE_TO,
        since: Version::V2_0,
        until: None,
        tokens: COUNTRIES,
        patterns: &[],
    },
    Definition {
        key: NON_IC_MARKINGS,
        since: Version::V2_0,
        until: None,
        tokens: &[
            "SC", "DS", "XD", "ND", "SBU", "SBU-NF", "LES", "LES-NF", "SSI", "NNPI", "LIMDIS",
        ],
        patterns: &["ACCM-[A-Z0-9_-]{1,61}"],
    },
    Definition {
        key: NON_US_CONTROLS,
        since: Version::V4_1,
        until: None,
        tokens: &["ATOMAL", "BOHEMIA", "BALK"],
        patterns: &[],
    },
    Definition {
        key: DECLASS_EXCEPTIONS,
        since: Version::V2_0,
        until: None,
        tokens: &["25X1-human", "25X1-EO-12951", "50X1-HUM", "50X2-WMD", "AEA", "NATO", "NATO-AEA"],
        patterns: &["25X[1-9]", "50X[1-9]"],
    },
    Definition {
        key: TYPE_OF_EXEMPTED_SOURCE,
        since: Version::V2_0,
        until: Some(Version::V3_1),
        tokens: &["OADR"],
        patterns: &["X[1-8]"],
    },
    Definition {
        key: NOTICE_TYPES,
        since: Version::V4_1,
        until: None,
        tokens: &[
            "DoD-Dist-A", "DoD-Dist-B", "DoD-Dist-C", "DoD-Dist-D", "DoD-Dist-E", "DoD-Dist-F",
            "DoD-Dist-X", "US-Person", "IMC", "FISA", "IC-Pre-Pub", "RD", "FRD", "TFNI", "DS",
            "LES", "LES-NF", "SBU", "SBU-NF", "SSI", "ComSec", "NNPI",
        ],
        patterns: &[],
    },
    Definition {
        key: POC_TYPES,
        since: Version::V5_0,
        until: None,
        tokens: &[
            "ICD-710", "DoD-Dist-B", "DoD-Dist-C", "DoD-Dist-D", "DoD-Dist-E", "DoD-Dist-F",
            "DoD-Dist-X",
        ],
        patterns: &[],
    },
];

/// A controlled vocabulary: an exact token set plus anchored pattern rules
#[derive(Debug, Clone)]
pub struct ControlledVocabulary {
    name: &'static str,
    tokens: HashSet<&'static str>,
    patterns: Vec<Regex>,
}

impl ControlledVocabulary {
    fn compile(definition: &Definition) -> Result<Self> {
        let patterns = definition
            .patterns
            .iter()
            .map(|pattern| {
                Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
                    Error::argument(format!(
                        "Invalid pattern {pattern} in controlled vocabulary {}: {e}",
                        definition.key
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: definition.key,
            tokens: definition.tokens.iter().copied().collect(),
            patterns,
        })
    }

    /// Vocabulary key
    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }

    /// Check a value against the exact tokens, then the patterns
    #[must_use]
    pub fn is_valid(&self, value: &str) -> bool {
        self.tokens.contains(value) || self.patterns.iter().any(|p| p.is_match(value))
    }

    /// Exact tokens as a sorted vector
    #[must_use]
    pub fn tokens(&self) -> Vec<&str> {
        let mut tokens: Vec<_> = self.tokens.iter().copied().collect();
        tokens.sort_unstable();
        tokens
    }

    /// Number of pattern rules
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

/// Per-version index of controlled vocabularies, built once per session
#[derive(Debug, Clone, Default)]
pub struct VocabularyIndex {
    versions: HashMap<Version, HashMap<&'static str, ControlledVocabulary>>,
}

impl VocabularyIndex {
    /// Build the index for every registered version
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] if a pattern fails to compile.
    pub fn new(registry: &VersionRegistry) -> Result<Self> {
        let compiled = DEFINITIONS
            .iter()
            .map(|definition| Ok((definition, ControlledVocabulary::compile(definition)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut versions = HashMap::new();
        for &version in registry.versions() {
            let lists: HashMap<_, _> = compiled
                .iter()
                .filter(|(definition, _)| definition.applies_to(version))
                .map(|(definition, vocabulary)| (definition.key, vocabulary.clone()))
                .collect();
            debug!(%version, count = lists.len(), "Indexed controlled vocabularies");
            versions.insert(version, lists);
        }
        Ok(Self { versions })
    }

    /// Look up the vocabulary for a key under a version
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] when the key is unknown or outside its version range.
    pub fn tokens_for(&self, key: &str, version: Version) -> Result<&ControlledVocabulary> {
        self.versions
            .get(&version)
            .and_then(|lists| lists.get(key))
            .ok_or_else(|| {
                Error::argument(format!(
                    "No controlled vocabulary could be found for this key: {key}"
                ))
            })
    }

    /// Check vocabulary membership
    ///
    /// # Errors
    ///
    /// See [`VocabularyIndex::tokens_for`].
    pub fn contains(&self, key: &str, value: &str, version: Version) -> Result<bool> {
        Ok(self.tokens_for(key, version)?.is_valid(value))
    }

    /// Message used when a value is not a member of a vocabulary
    #[must_use]
    pub fn invalid_message(key: &str, value: &str) -> String {
        format!("{value} is not a valid enumeration token for this attribute, as specified in {key}.")
    }

    /// Keys available under a version, sorted
    #[must_use]
    pub fn keys(&self, version: Version) -> Vec<&str> {
        let mut keys: Vec<_> = self
            .versions
            .get(&version)
            .map(|lists| lists.keys().copied().collect())
            .unwrap_or_default();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> VocabularyIndex {
        VocabularyIndex::new(&VersionRegistry::default()).unwrap()
    }

    #[test]
    fn test_exact_tokens() {
        let index = index();
        assert!(index.contains(CLASSIFICATIONS, "U", Version::V3_1).unwrap());
        assert!(index.contains(CLASSIFICATIONS, "TS", Version::V2_0).unwrap());
        assert!(!index.contains(CLASSIFICATIONS, "u", Version::V3_1).unwrap());
        assert!(index.contains(OWNER_PRODUCERS, "USA", Version::V5_0).unwrap());
    }

    #[test]
    fn test_pattern_tokens() {
        let index = index();
        assert!(index.contains(ATOMIC_ENERGY_MARKINGS, "RD-SG-14", Version::V3_1).unwrap());
        assert!(!index.contains(ATOMIC_ENERGY_MARKINGS, "RD-SG-144", Version::V3_1).unwrap());
        assert!(index.contains(SCI_CONTROLS, "SI-G-ABCD", Version::V3_0).unwrap());
        assert!(!index.contains(SCI_CONTROLS, "SI-G-ABC", Version::V3_0).unwrap());
        assert!(index.contains(SAR_IDENTIFIERS, "SAR-AB1", Version::V4_1).unwrap());
        assert!(index.contains(TYPE_OF_EXEMPTED_SOURCE, "X4", Version::V2_0).unwrap());
        assert!(!index.contains(TYPE_OF_EXEMPTED_SOURCE, "X9", Version::V2_0).unwrap());
    }

    #[test]
    fn test_patterns_are_anchored() {
        let index = index();
        assert!(!index.contains(SAR_IDENTIFIERS, "xSAR-AB1", Version::V4_1).unwrap());
        assert!(!index.contains(SAR_IDENTIFIERS, "SAR-AB12", Version::V4_1).unwrap());
    }

    #[test]
    fn test_version_ranges() {
        let index = index();
        let err = index
            .tokens_for(ATOMIC_ENERGY_MARKINGS, Version::V3_0)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No controlled vocabulary could be found for this key: atomic-energy-markings"
        );
        assert!(index.tokens_for(TYPE_OF_EXEMPTED_SOURCE, Version::V3_1).is_err());
        assert!(index.tokens_for(NOTICE_TYPES, Version::V3_1).is_err());
        assert!(index.tokens_for(NOTICE_TYPES, Version::V4_1).is_ok());
        assert!(index.tokens_for(POC_TYPES, Version::V4_1).is_err());
        assert!(index.tokens_for(POC_TYPES, Version::V5_0).is_ok());
    }

    #[test]
    fn test_unknown_key() {
        let err = index().contains("colors", "red", Version::V5_0).unwrap_err();
        assert!(matches!(err, Error::Argument(_)));
    }

    #[test]
    fn test_invalid_message() {
        assert_eq!(
            VocabularyIndex::invalid_message(CLASSIFICATIONS, "Z"),
            "Z is not a valid enumeration token for this attribute, as specified in classifications."
        );
    }

    #[test]
    fn test_every_key_in_every_version() {
        let index = index();
        for version in Version::ALL {
            let keys = index.keys(version);
            let expected = DEFINITIONS.iter().filter(|d| d.applies_to(version)).count();
            assert_eq!(keys.len(), expected, "version {version}");

            for key in keys {
                let vocabulary = index.tokens_for(key, version).unwrap();
                assert_eq!(vocabulary.name(), key);
                let member = match vocabulary.tokens().first() {
                    Some(token) => (*token).to_string(),
                    None => {
                        assert!(vocabulary.pattern_count() > 0, "{key} has no members");
                        "SAR-AB1".to_string()
                    }
                };
                assert!(index.contains(key, &member, version).unwrap(), "{key} {member} {version}");
                assert!(!index.contains(key, "unknown", version).unwrap(), "{key} {version}");
            }
        }
    }

    #[test]
    fn test_only_registered_versions_indexed() {
        let registry = VersionRegistry::new(&["4.1"]).unwrap();
        let index = VocabularyIndex::new(&registry).unwrap();
        assert!(index.keys(Version::V3_0).is_empty());
        assert!(index.keys(Version::V4_1).contains(&NON_US_CONTROLS));
    }
}

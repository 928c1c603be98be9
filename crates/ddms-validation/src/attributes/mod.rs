//! Attribute groups
//!
//! Every attribute group is a bag of values governed by a static table of
//! [`AttributeRule`]s. The table says which namespace each attribute lives in,
//! how its value is checked and which DDMS versions allow it. Groups are
//! validated when they are constructed; [`AttributeSet::require_version`] is
//! run later by the component they decorate.

pub mod notice;
pub mod security;
pub mod srs;

pub use notice::{NoticeAttributes, NoticeAttributesBuilder};
pub use security::{SecurityAttributes, SecurityAttributesBuilder};
pub use srs::{SrsAttributes, SrsAttributesBuilder};

use crate::output::Renderer;
use crate::session::Session;
use crate::vocabulary::VocabularyIndex;
use crate::{Error, Result, rules};
use ddms_ir::{Attribute, Element, QName};
use ddms_schema::{NamespaceSlot, Version};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::trace;

/// How an attribute value is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    /// Text limited to a number of characters
    BoundedText(usize),
    /// `xs:date`
    Date,
    PositiveInteger,
    Boolean,
    /// Single token from the named vocabulary
    Token(&'static str),
    /// Space-delimited tokens from the named vocabulary, order-independent
    TokenSet(&'static str),
    /// Space-delimited NCNames, order significant
    NameList,
}

impl ValueKind {
    fn is_list(self) -> bool {
        matches!(self, ValueKind::TokenSet(_) | ValueKind::NameList)
    }
}

/// Policy entry for one attribute
#[derive(Debug, Clone, Copy)]
pub struct AttributeRule {
    /// Local name
    pub name: &'static str,
    /// Sub-vocabulary namespace, or `None` for unqualified attributes
    pub slot: Option<NamespaceSlot>,
    pub kind: ValueKind,
    pub since: Version,
    /// First version that no longer allows the attribute
    pub until: Option<Version>,
}

impl AttributeRule {
    pub const fn new(name: &'static str, slot: Option<NamespaceSlot>, kind: ValueKind) -> Self {
        Self {
            name,
            slot,
            kind,
            since: Version::V2_0,
            until: None,
        }
    }

    /// Attribute in the security (`ISM`) namespace
    pub const fn ism(name: &'static str, kind: ValueKind) -> Self {
        Self::new(name, Some(NamespaceSlot::Security), kind)
    }

    /// Attribute in no namespace
    pub const fn unqualified(name: &'static str, kind: ValueKind) -> Self {
        Self::new(name, None, kind)
    }

    #[must_use]
    pub const fn since(mut self, version: Version) -> Self {
        self.since = version;
        self
    }

    #[must_use]
    pub const fn until(mut self, version: Version) -> Self {
        self.until = Some(version);
        self
    }

    /// Whether the attribute is legal under a version
    #[must_use]
    pub fn allows(&self, version: Version) -> bool {
        version.is_at_least(self.since) && self.until.is_none_or(|until| version < until)
    }

    /// Qualified name under a version, using the session's prefixes.
    ///
    /// Returns `None` when the version has no namespace for the rule's slot.
    #[must_use]
    pub fn qname(&self, session: &Session, version: Version) -> Option<QName> {
        match self.slot {
            None => Some(QName::unqualified(self.name)),
            Some(slot) => version
                .namespace(slot)
                .map(|ns| QName::new(ns, session.prefix(slot), self.name)),
        }
    }
}

/// A stored attribute value
#[derive(Debug, Clone, Eq)]
pub enum AttributeValue {
    Single(String),
    Tokens { tokens: Vec<String>, ordered: bool },
}

impl AttributeValue {
    fn parse(raw: &str, kind: ValueKind) -> Self {
        if kind.is_list() {
            AttributeValue::Tokens {
                tokens: raw.split_whitespace().map(ToString::to_string).collect(),
                ordered: matches!(kind, ValueKind::NameList),
            }
        } else {
            AttributeValue::Single(raw.to_string())
        }
    }

    /// Individual values; a single value yields one item
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            AttributeValue::Single(value) => vec![value.as_str()],
            AttributeValue::Tokens { tokens, .. } => tokens.iter().map(String::as_str).collect(),
        }
    }

    fn comparable(&self) -> Vec<&str> {
        let mut values = self.values();
        if let AttributeValue::Tokens { ordered: false, .. } = self {
            values.sort_unstable();
            values.dedup();
        }
        values
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        self.comparable() == other.comparable()
    }
}

impl Hash for AttributeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.comparable().hash(state);
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Single(value) => f.write_str(value),
            AttributeValue::Tokens { tokens, .. } => f.write_str(&tokens.join(" ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Entry {
    name: QName,
    value: AttributeValue,
}

/// Values of one attribute group, keyed by local name
#[derive(Debug, Clone)]
pub struct AttributeSet {
    rules: &'static [AttributeRule],
    version: Version,
    entries: BTreeMap<&'static str, Entry>,
}

impl AttributeSet {
    /// A set with no values
    #[must_use]
    pub fn empty(rules: &'static [AttributeRule], version: Version) -> Self {
        Self {
            rules,
            version,
            entries: BTreeMap::new(),
        }
    }

    /// Read every attribute the rules know about from an element.
    ///
    /// Attributes of a namespace the active version does not declare cannot
    /// be present and are skipped. Blank values are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] when the session has no active version.
    pub fn from_element(
        rules: &'static [AttributeRule],
        session: &Session,
        element: &Element,
    ) -> Result<Self> {
        let version = session.current_version()?;
        let mut set = Self::empty(rules, version);
        for rule in rules {
            let Some(name) = rule.qname(session, version) else {
                continue;
            };
            if let Some(attribute) = element.attribute(&name.namespace, &name.local) {
                // keep the prefix the document used
                let name = QName::new(&name.namespace, &attribute.name.prefix, &name.local);
                set.insert(rule, name, &attribute.value);
            }
        }
        Ok(set)
    }

    /// Build a set from raw `(local name, value)` pairs
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] for a name the rules do not know, and
    /// [`Error::InvalidStructure`] for a name whose namespace the active
    /// version does not declare.
    pub fn from_pairs<'a, I>(rules: &'static [AttributeRule], session: &Session, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let version = session.current_version()?;
        let mut set = Self::empty(rules, version);
        for (local, value) in pairs {
            let rule = rules.iter().find(|r| r.name == local).ok_or_else(|| {
                Error::argument(format!("{local} is not a recognized attribute of this group."))
            })?;
            let name = rule.qname(session, version).ok_or_else(|| {
                let slot = rule.slot.unwrap_or(NamespaceSlot::Core);
                let subject = format!("{}:{local} attribute", session.prefix(slot));
                let since = Version::ALL
                    .into_iter()
                    .find(|v| v.namespace(slot).is_some())
                    .unwrap_or(Version::V5_0);
                Error::invalid(rules::since_message(&subject, since))
            })?;
            set.insert(rule, name, value);
        }
        Ok(set)
    }

    fn insert(&mut self, rule: &AttributeRule, name: QName, raw: &str) {
        if raw.trim().is_empty() {
            return;
        }
        let value = AttributeValue::parse(raw, rule.kind);
        if matches!(&value, AttributeValue::Tokens { tokens, .. } if tokens.is_empty()) {
            return;
        }
        self.entries.insert(rule.name, Entry { name, value });
    }

    /// Check version legality, format and vocabulary of every value, in rule order
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] for the first failing attribute.
    pub fn validate(&self, session: &Session) -> Result<()> {
        for rule in self.rules {
            let Some(entry) = self.entries.get(rule.name) else {
                continue;
            };
            let qualified = entry.name.qualified();
            trace!(attribute = %qualified, version = %self.version, "Checking attribute");
            rules::require_in_range(
                &format!("{qualified} attribute"),
                self.version,
                rule.since,
                rule.until,
            )?;
            check_value(session, self.version, rule.kind, &qualified, &entry.value)?;
        }
        Ok(())
    }

    /// Version the set was built under
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Fail unless the set was built under the decorated component's version
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] on a version mismatch.
    pub fn require_version(&self, version: Version) -> Result<()> {
        if self.version == version {
            Ok(())
        } else {
            Err(Error::invalid(
                "These attributes cannot decorate a DDMS component with a different DDMS version.",
            ))
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, local: &str) -> bool {
        self.entries.contains_key(local)
    }

    #[must_use]
    pub fn value(&self, local: &str) -> Option<&AttributeValue> {
        self.entries.get(local).map(|e| &e.value)
    }

    /// Single value, or tokens joined by spaces
    #[must_use]
    pub fn text(&self, local: &str) -> Option<String> {
        self.value(local).map(ToString::to_string)
    }

    /// Individual tokens of a value, empty when absent
    #[must_use]
    pub fn tokens(&self, local: &str) -> Vec<&str> {
        self.value(local).map(AttributeValue::values).unwrap_or_default()
    }

    /// Qualified name the value was read or built with
    #[must_use]
    pub fn name(&self, local: &str) -> Option<&QName> {
        self.entries.get(local).map(|e| &e.name)
    }

    /// `(local name, value)` pairs in rule order
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        self.rules
            .iter()
            .filter_map(|rule| {
                self.entries
                    .get(rule.name)
                    .map(|entry| (rule.name, entry.value.to_string()))
            })
            .collect()
    }

    /// Add every value to an element, in rule order
    ///
    /// # Errors
    ///
    /// Returns [`Error::Xml`] when an attribute name is already present.
    pub fn write_to(&self, element: &mut Element) -> Result<()> {
        for rule in self.rules {
            if let Some(entry) = self.entries.get(rule.name) {
                element.add_attribute(Attribute::new(entry.name.clone(), entry.value.to_string()))?;
            }
        }
        Ok(())
    }

    /// Flat projection of every value under `key_prefix`
    #[must_use]
    pub fn render(&self, renderer: &Renderer, key_prefix: &str) -> String {
        self.pairs()
            .iter()
            .map(|(local, value)| renderer.field(&format!("{key_prefix}{local}"), value))
            .collect()
    }

    /// Qualified names of every attribute legal under a version
    #[must_use]
    pub fn reserved_names(
        rules: &'static [AttributeRule],
        session: &Session,
        version: Version,
    ) -> Vec<QName> {
        rules
            .iter()
            .filter(|rule| rule.allows(version))
            .filter_map(|rule| rule.qname(session, version))
            .collect()
    }
}

impl PartialEq for AttributeSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for AttributeSet {}

impl Hash for AttributeSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries.hash(state);
    }
}

fn check_value(
    session: &Session,
    version: Version,
    kind: ValueKind,
    qualified: &str,
    value: &AttributeValue,
) -> Result<()> {
    let text = value.to_string();
    match kind {
        ValueKind::Text => Ok(()),
        ValueKind::BoundedText(max) => rules::require_max_length(&text, max, qualified),
        ValueKind::Date => rules::require_date(&text, qualified).map(|_| ()),
        ValueKind::PositiveInteger => rules::require_positive_integer(&text, qualified).map(|_| ()),
        ValueKind::Boolean => rules::require_boolean(&text, qualified).map(|_| ()),
        ValueKind::NameList => rules::require_ncname_list(&text, qualified),
        ValueKind::Token(key) | ValueKind::TokenSet(key) => {
            for token in value.values() {
                if !session.vocabulary().contains(key, token, version)? {
                    return Err(Error::invalid(VocabularyIndex::invalid_message(key, token)));
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary;

    static RULES: &[AttributeRule] = &[
        AttributeRule::ism("classification", ValueKind::Token(vocabulary::CLASSIFICATIONS)),
        AttributeRule::ism("ownerProducer", ValueKind::TokenSet(vocabulary::OWNER_PRODUCERS)),
        AttributeRule::ism("declassDate", ValueKind::Date),
        AttributeRule::ism("compilationReason", ValueKind::Text).since(Version::V3_0),
        AttributeRule::unqualified("axisLabels", ValueKind::NameList),
    ];

    fn session(version: &str) -> Session {
        Session::for_version(version).unwrap()
    }

    #[test]
    fn test_token_sets_compare_unordered() {
        let session = session("3.0");
        let a = AttributeSet::from_pairs(RULES, &session, [("ownerProducer", "USA GBR")]).unwrap();
        let b = AttributeSet::from_pairs(RULES, &session, [("ownerProducer", "GBR  USA")]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.text("ownerProducer").as_deref(), Some("USA GBR"));
    }

    #[test]
    fn test_name_lists_compare_ordered() {
        let session = session("3.0");
        let a = AttributeSet::from_pairs(RULES, &session, [("axisLabels", "X Y")]).unwrap();
        let b = AttributeSet::from_pairs(RULES, &session, [("axisLabels", "Y X")]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_blank_is_absent() {
        let session = session("3.0");
        let set = AttributeSet::from_pairs(RULES, &session, [("classification", "  ")]).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_unknown_name() {
        let session = session("3.0");
        let err = AttributeSet::from_pairs(RULES, &session, [("color", "red")]).unwrap_err();
        assert!(matches!(err, Error::Argument(_)));
    }

    #[test]
    fn test_validate_range_then_format_then_vocabulary() {
        let session = session("2.0");
        let set = AttributeSet::from_pairs(RULES, &session, [("compilationReason", "x")]).unwrap();
        assert_eq!(
            set.validate(&session).unwrap_err().to_string(),
            "The ISM:compilationReason attribute cannot be used until DDMS 3.0 or later."
        );

        let set = AttributeSet::from_pairs(RULES, &session, [("declassDate", "2010")]).unwrap();
        assert!(set.validate(&session).unwrap_err().to_string().contains("xs:date"));

        let set = AttributeSet::from_pairs(RULES, &session, [("classification", "Z")]).unwrap();
        assert_eq!(
            set.validate(&session).unwrap_err().to_string(),
            "Z is not a valid enumeration token for this attribute, as specified in classifications."
        );
    }

    #[test]
    fn test_write_to_preserves_rule_order_and_rejects_collision() {
        let session = session("3.0");
        let set = AttributeSet::from_pairs(
            RULES,
            &session,
            [("ownerProducer", "USA"), ("classification", "U")],
        )
        .unwrap();

        let mut element = Element::new(QName::unqualified("x"));
        set.write_to(&mut element).unwrap();
        let names: Vec<_> = element.attributes.iter().map(|a| a.name.qualified()).collect();
        assert_eq!(names, vec!["ISM:classification", "ISM:ownerProducer"]);

        let err = set.write_to(&mut element).unwrap_err();
        assert!(matches!(err, Error::Xml(ddms_ir::Error::AttributeCollision { .. })));
    }

    #[test]
    fn test_from_element_keeps_document_prefix() {
        let session = session("3.0");
        let mut element = Element::new(QName::unqualified("x"));
        element
            .add_attribute(Attribute::new(
                QName::new("urn:us:gov:ic:ism", "ism", "classification"),
                "U",
            ))
            .unwrap();
        let set = AttributeSet::from_element(RULES, &session, &element).unwrap();
        assert_eq!(set.name("classification").unwrap().qualified(), "ism:classification");
        assert_eq!(set.text("classification").as_deref(), Some("U"));
    }

    #[test]
    fn test_require_version() {
        let set = AttributeSet::empty(RULES, Version::V3_0);
        assert!(set.require_version(Version::V3_0).is_ok());
        assert!(
            set.require_version(Version::V2_0)
                .unwrap_err()
                .to_string()
                .starts_with("These attributes cannot decorate")
        );
    }

    #[test]
    fn test_reserved_names() {
        let session = session("3.0");
        let names = AttributeSet::reserved_names(RULES, &session, Version::V2_0);
        assert_eq!(names.len(), 4);
        let names = AttributeSet::reserved_names(RULES, &session, Version::V3_0);
        assert_eq!(names.len(), 5);
    }
}

//! Request-scoped validation context
//!
//! A [`Session`] carries the version registry, configuration, vocabulary
//! index and the active DDMS version. It is passed explicitly to every
//! component constructor.

use crate::vocabulary::VocabularyIndex;
use crate::{Error, Result, rules};
use ddms_ir::{Element, QName};
use ddms_schema::{Config, NamespaceSlot, Version, VersionRegistry};
use std::sync::Arc;
use tracing::{debug, info};

/// Validation context shared by one unit of work
#[derive(Debug, Clone)]
pub struct Session {
    registry: Arc<VersionRegistry>,
    config: Arc<Config>,
    vocabulary: Arc<VocabularyIndex>,
    current: Option<Version>,
}

impl Session {
    /// Create a session from configuration, with no active version
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] if the configured versions are
    /// not all known, or [`Error::Argument`] if a vocabulary fails to build.
    pub fn new(config: Config) -> Result<Self> {
        let registry = VersionRegistry::from_config(&config)?;
        let vocabulary = VocabularyIndex::new(&registry)?;
        info!(latest = %registry.latest(), "Created validation session");
        Ok(Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
            vocabulary: Arc::new(vocabulary),
            current: None,
        })
    }

    /// Create a session with the default configuration
    ///
    /// # Errors
    ///
    /// See [`Session::new`].
    pub fn with_defaults() -> Result<Self> {
        Self::new(Config::default())
    }

    /// Create a default session already set to a version
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] when the version does not resolve.
    pub fn for_version(version: &str) -> Result<Self> {
        let mut session = Self::with_defaults()?;
        session.set_current_version(version)?;
        Ok(session)
    }

    /// Copy of this session set to another version
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] when the version does not resolve.
    pub fn with_version(&self, version: &str) -> Result<Self> {
        let mut session = self.clone();
        session.set_current_version(version)?;
        Ok(session)
    }

    #[must_use]
    pub fn registry(&self) -> &VersionRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn vocabulary(&self) -> &VocabularyIndex {
        &self.vocabulary
    }

    /// The active version
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] when no version has been set.
    pub fn current_version(&self) -> Result<Version> {
        self.current
            .ok_or_else(|| Error::argument("No current DDMS version has been set."))
    }

    /// Set the active version from a version string (aliases allowed)
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] when the version does not resolve.
    pub fn set_current_version(&mut self, version: &str) -> Result<Version> {
        let resolved = self.registry.resolve(version)?;
        debug!(requested = version, %resolved, "Set current DDMS version");
        self.current = Some(resolved);
        Ok(resolved)
    }

    pub fn clear_current_version(&mut self) {
        self.current = None;
    }

    /// Set the active version from the namespace of a parsed root element
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] when no registered version uses the namespace.
    pub fn set_version_from_element(&mut self, element: &Element) -> Result<Version> {
        let resolved = self.registry.resolve_namespace(&element.name.namespace)?;
        debug!(namespace = %element.name.namespace, %resolved, "Detected DDMS version");
        self.current = Some(resolved);
        Ok(resolved)
    }

    /// Configured prefix for a sub-vocabulary
    #[must_use]
    pub fn prefix(&self, slot: NamespaceSlot) -> &str {
        self.config.prefixes.get(slot)
    }

    /// Namespace URI of a sub-vocabulary under a version
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] naming `local` when the version has
    /// no namespace for the slot.
    pub fn namespace(&self, version: Version, slot: NamespaceSlot, local: &str) -> Result<&'static str> {
        version.namespace(slot).ok_or_else(|| {
            let subject = format!("{}:{local} element", self.prefix(slot));
            let since = Version::ALL
                .into_iter()
                .find(|v| v.namespace(slot).is_some())
                .unwrap_or(Version::V5_0);
            Error::invalid(rules::since_message(&subject, since))
        })
    }

    /// Qualified name in a sub-vocabulary, using the configured prefix
    ///
    /// # Errors
    ///
    /// See [`Session::namespace`].
    pub fn qname(&self, version: Version, slot: NamespaceSlot, local: &str) -> Result<QName> {
        let namespace = self.namespace(version, slot, local)?;
        Ok(QName::new(namespace, self.prefix(slot), local))
    }

    /// Convenience for `qname(current_version()?, ..)`
    ///
    /// # Errors
    ///
    /// See [`Session::current_version`] and [`Session::namespace`].
    pub fn current_qname(&self, slot: NamespaceSlot, local: &str) -> Result<QName> {
        self.qname(self.current_version()?, slot, local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_current_version() {
        let session = Session::with_defaults().unwrap();
        let err = session.current_version().unwrap_err();
        assert!(matches!(err, Error::Argument(_)));
    }

    #[test]
    fn test_set_and_clear() {
        let mut session = Session::with_defaults().unwrap();
        assert_eq!(session.set_current_version("3.0.1").unwrap(), Version::V3_0);
        assert_eq!(session.current_version().unwrap(), Version::V3_0);
        session.clear_current_version();
        assert!(session.current_version().is_err());
    }

    #[test]
    fn test_unsupported_version_leaves_state() {
        let mut session = Session::for_version("4.1").unwrap();
        let err = session.set_current_version("1.4").unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(_)));
        assert_eq!(session.current_version().unwrap(), Version::V4_1);
    }

    #[test]
    fn test_sessions_are_independent() {
        let a = Session::for_version("2.0").unwrap();
        let b = a.with_version("5.0").unwrap();
        assert_eq!(a.current_version().unwrap(), Version::V2_0);
        assert_eq!(b.current_version().unwrap(), Version::V5_0);
    }

    #[test]
    fn test_set_version_from_element() {
        let mut session = Session::with_defaults().unwrap();
        let element = Element::new(QName::new("urn:us:mil:ces:metadata:ddms:4", "ddms", "resource"));
        assert_eq!(session.set_version_from_element(&element).unwrap(), Version::V4_1);

        let element = Element::new(QName::new("urn:example", "x", "resource"));
        assert!(session.set_version_from_element(&element).is_err());
    }

    #[test]
    fn test_qname_uses_configured_prefix() {
        let config = Config::new().prefix(NamespaceSlot::Core, "d");
        let session = Session::new(config).unwrap();
        let name = session.qname(Version::V3_1, NamespaceSlot::Core, "title").unwrap();
        assert_eq!(name.qualified(), "d:title");
        assert_eq!(name.namespace, "http://metadata.dod.mil/mdr/ns/DDMS/3.1/");
    }

    #[test]
    fn test_qname_missing_slot() {
        let session = Session::with_defaults().unwrap();
        let err = session
            .qname(Version::V3_0, NamespaceSlot::AccessControl, "Access")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The ntk:Access element cannot be used until DDMS 4.1 or later."
        );
    }

    #[test]
    fn test_session_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Session>();
    }
}

//! Registry of supported DDMS versions

use crate::config::Config;
use crate::version::Version;
use crate::{Error, Result};
use std::collections::HashMap;
use tracing::{debug, info};

/// Registry of the versions a process supports.
///
/// Built once from the supported-version list and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct VersionRegistry {
    versions: Vec<Version>,
    namespaces: HashMap<&'static str, Vec<Version>>,
}

impl VersionRegistry {
    /// Create a registry from canonical version strings
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] for any string that is not a
    /// canonical known version, or when the list is empty.
    pub fn new<S: AsRef<str>>(supported: &[S]) -> Result<Self> {
        let mut versions = Vec::with_capacity(supported.len());
        for raw in supported {
            let raw = raw.as_ref();
            let version =
                Version::from_canonical(raw).ok_or_else(|| Error::UnsupportedVersion(raw.to_string()))?;
            if !versions.contains(&version) {
                versions.push(version);
            }
        }
        if versions.is_empty() {
            return Err(Error::UnsupportedVersion(String::new()));
        }
        versions.sort();

        let mut namespaces: HashMap<&'static str, Vec<Version>> = HashMap::new();
        for version in &versions {
            for (_, namespace) in version.namespaces() {
                let entry = namespaces.entry(namespace).or_default();
                if !entry.contains(version) {
                    entry.push(*version);
                }
            }
        }

        info!(
            versions = ?versions.iter().map(|v| v.as_str()).collect::<Vec<_>>(),
            "Registered DDMS versions"
        );
        Ok(Self {
            versions,
            namespaces,
        })
    }

    /// Create a registry from the configured supported versions
    ///
    /// # Errors
    ///
    /// See [`VersionRegistry::new`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.supported_versions)
    }

    /// Registered versions, oldest first
    #[must_use]
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    /// Newest registered version
    #[must_use]
    pub fn latest(&self) -> Version {
        // `new` guarantees at least one entry
        self.versions[self.versions.len() - 1]
    }

    /// Check whether a version is registered
    #[must_use]
    pub fn contains(&self, version: Version) -> bool {
        self.versions.contains(&version)
    }

    /// Resolve a version string, applying alias normalization
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] when the normalized string is not registered.
    pub fn resolve(&self, version: &str) -> Result<Version> {
        let normalized = Version::normalize(version);
        Version::from_canonical(normalized)
            .filter(|v| self.contains(*v))
            .ok_or_else(|| Error::UnsupportedVersion(version.to_string()))
    }

    /// Resolve a namespace URI of any sub-vocabulary to a version.
    ///
    /// Matching is exact. When several registered versions share the
    /// namespace, the newest one is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] when no registered version uses the namespace.
    pub fn resolve_namespace(&self, namespace: &str) -> Result<Version> {
        let version = self
            .versions_for_namespace(namespace)
            .last()
            .copied()
            .ok_or_else(|| Error::UnsupportedVersion(format!("namespace {namespace}")))?;
        debug!(namespace, %version, "Resolved namespace");
        Ok(version)
    }

    /// Every registered version that uses a namespace URI, oldest first
    #[must_use]
    pub fn versions_for_namespace(&self, namespace: &str) -> &[Version] {
        self.namespaces.get(namespace).map_or(&[], Vec::as_slice)
    }

    /// Compare a version against a version string (alias-normalized)
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] when `other` does not resolve.
    pub fn is_at_least(&self, version: Version, other: &str) -> Result<bool> {
        Ok(version.is_at_least(self.resolve(other)?))
    }
}

impl Default for VersionRegistry {
    fn default() -> Self {
        Self::new(&Version::ALL.map(Version::as_str))
            .unwrap_or_else(|_| unreachable!("every known version is canonical"))
    }
}

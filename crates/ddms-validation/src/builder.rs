//! Builder / commit layer
//!
//! Builders are mutable staging areas. Committing a builder always goes
//! through the same validating constructor as direct construction.

use crate::session::Session;
use crate::{Error, Result};

/// A mutable shadow of a component or attribute group
pub trait Builder {
    /// `Option<Component>` for components, the group itself for attribute groups
    type Output;

    /// True when no scalar is set and every child builder is empty
    fn is_empty(&self) -> bool;

    /// Validate and produce the immutable value
    ///
    /// # Errors
    ///
    /// Returns whatever the validating constructor returns.
    fn commit(&self, session: &Session) -> Result<Self::Output>;
}

/// Ordered list of child builders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderList<B> {
    items: Vec<B>,
}

impl<B> Default for BuilderList<B> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<B: Builder + Default> BuilderList<B> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the list has no builders at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Read a builder; never grows the list
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&B> {
        self.items.get(index)
    }

    /// Mutable access to a builder, inserting empty placeholders up to `index`
    pub fn get_or_grow(&mut self, index: usize) -> &mut B {
        self.ensure_len(index + 1);
        &mut self.items[index]
    }

    /// Grow the list with empty placeholders to at least `len` builders
    pub fn ensure_len(&mut self, len: usize) {
        if self.items.len() < len {
            self.items.resize_with(len, B::default);
        }
    }

    pub fn push(&mut self, builder: B) {
        self.items.push(builder);
    }

    /// Remove a builder
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] when the index is out of bounds.
    pub fn remove(&mut self, index: usize) -> Result<B> {
        if index >= self.items.len() {
            return Err(Error::argument(format!(
                "No builder exists at index {index}; the list has {} builders.",
                self.items.len()
            )));
        }
        Ok(self.items.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &B> {
        self.items.iter()
    }

    /// True when every builder in the list is empty
    #[must_use]
    pub fn all_empty(&self) -> bool {
        self.items.iter().all(Builder::is_empty)
    }
}

impl<B, T> BuilderList<B>
where
    B: Builder<Output = Option<T>> + Default,
{
    /// Commit every non-empty builder, in order
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a child commit.
    pub fn commit(&self, session: &Session) -> Result<Vec<T>> {
        let mut committed = Vec::with_capacity(self.items.len());
        for builder in self.items.iter().filter(|b| !b.is_empty()) {
            if let Some(value) = builder.commit(session)? {
                committed.push(value);
            }
        }
        Ok(committed)
    }
}

impl<B> FromIterator<B> for BuilderList<B> {
    fn from_iter<I: IntoIterator<Item = B>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    struct NameBuilder {
        name: String,
    }

    impl Builder for NameBuilder {
        type Output = Option<String>;

        fn is_empty(&self) -> bool {
            self.name.trim().is_empty()
        }

        fn commit(&self, _session: &Session) -> Result<Option<String>> {
            if self.is_empty() {
                return Ok(None);
            }
            if self.name.len() > 5 {
                return Err(Error::invalid("name too long"));
            }
            Ok(Some(self.name.clone()))
        }
    }

    #[test]
    fn test_get_is_pure() {
        let list: BuilderList<NameBuilder> = BuilderList::new();
        assert!(list.get(3).is_none());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_get_or_grow_inserts_placeholders() {
        let mut list: BuilderList<NameBuilder> = BuilderList::new();
        list.get_or_grow(2).name = "c".to_string();
        assert_eq!(list.len(), 3);
        assert!(list.get(0).unwrap().is_empty());
        assert!(!list.all_empty());
    }

    #[test]
    fn test_commit_drops_empty() {
        let session = Session::for_version("5.0").unwrap();
        let mut list: BuilderList<NameBuilder> = BuilderList::new();
        list.ensure_len(4);
        list.get_or_grow(1).name = "b".to_string();
        list.get_or_grow(3).name = "d".to_string();
        assert_eq!(list.commit(&session).unwrap(), vec!["b", "d"]);
    }

    #[test]
    fn test_commit_propagates_errors() {
        let session = Session::for_version("5.0").unwrap();
        let list: BuilderList<NameBuilder> = [NameBuilder {
            name: "too long".to_string(),
        }]
        .into_iter()
        .collect();
        assert!(list.commit(&session).is_err());
    }

    #[test]
    fn test_remove_out_of_bounds() {
        let mut list: BuilderList<NameBuilder> = BuilderList::new();
        assert!(matches!(list.remove(0), Err(Error::Argument(_))));
    }
}

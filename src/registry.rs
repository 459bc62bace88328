use alloc::{collections::BTreeMap, vec::Vec};
use core::ops::Index;
use tracing::error;

use crate::{
    entry::{BuildEntry, EntryId},
    errors::RegistryErrorKind,
    key::Key,
};

/// Entries of one scope and the keys they provide.
///
/// The registry owns its entries, [`EntryId`]s are only meaningful for the registry that issued them.
#[derive(Default, Clone, Debug)]
pub struct Registry {
    pub(crate) entries: Vec<BuildEntry>,
    pub(crate) index: BTreeMap<Key, EntryId>,
}

impl Registry {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Adds an entry and makes it reachable under its own key, if any.
    ///
    /// # Errors
    /// Returns [`RegistryErrorKind::DuplicateKey`] if another entry already provides the key
    pub fn provide(&mut self, entry: BuildEntry) -> Result<EntryId, RegistryErrorKind> {
        let keys = entry.key;
        self.provide_as(entry, keys)
    }

    /// Adds an entry reachable under every key of `keys`, ignoring the entry's own key.
    ///
    /// Nothing is added if any key is taken.
    ///
    /// # Errors
    /// Returns [`RegistryErrorKind::DuplicateKey`] if another entry already provides one of the keys
    pub fn provide_as(&mut self, entry: BuildEntry, keys: impl IntoIterator<Item = Key>) -> Result<EntryId, RegistryErrorKind> {
        let keys: Vec<Key> = keys.into_iter().collect();
        if let Some((key, existing)) = keys.iter().find_map(|key| self.index.get(key).map(|existing| (*key, *existing))) {
            let err = RegistryErrorKind::DuplicateKey { key, existing };
            error!("{}", err);
            return Err(err);
        }

        let id = self.insert_detached(entry);
        for key in keys {
            self.index.insert(key, id);
        }
        Ok(id)
    }

    /// Adds an entry without indexing any key
    pub(crate) fn insert_detached(&mut self, entry: BuildEntry) -> EntryId {
        let id = EntryId(self.entries.len());
        self.entries.push(entry);
        id
    }

    #[inline]
    #[must_use]
    pub fn lookup(&self, key: &Key) -> Option<EntryId> {
        self.index.get(key).copied()
    }

    #[inline]
    #[must_use]
    pub fn provides(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<&BuildEntry> {
        self.entries.get(id.0)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: EntryId) -> &mut BuildEntry {
        &mut self.entries[id.0]
    }

    /// Keys provided by the registry, in key order
    pub fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.index.keys()
    }

    /// Entries in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &BuildEntry)> + '_ {
        self.entries.iter().enumerate().map(|(index, entry)| (EntryId(index), entry))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Index<EntryId> for Registry {
    type Output = BuildEntry;

    #[inline]
    fn index(&self, id: EntryId) -> &Self::Output {
        &self.entries[id.0]
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::Registry;
    use crate::{
        dependency::Dependency,
        entry::{BuildEntry, EntryId},
        errors::RegistryErrorKind,
        key::Key,
    };

    use alloc::{vec, vec::Vec};
    use alloc::{format, string::{String, ToString}};
    use tracing_test::traced_test;

    struct A;
    struct B;
    struct C;

    fn entry<T: 'static>() -> BuildEntry {
        BuildEntry::new(Key::of::<T>(), Vec::<Dependency>::new())
    }

    #[test]
    fn test_provide_and_lookup() {
        let mut registry = Registry::new();
        let a = registry.provide(entry::<A>()).unwrap();
        let b = registry.provide(entry::<B>()).unwrap();

        assert_eq!(registry.lookup(&Key::of::<A>()), Some(a));
        assert_eq!(registry.lookup(&Key::of::<B>()), Some(b));
        assert_eq!(registry.lookup(&Key::of::<C>()), None);
        assert_eq!(registry[a].label(), "A");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    #[traced_test]
    fn test_duplicate_key() {
        let mut registry = Registry::new();
        let a = registry.provide(entry::<A>()).unwrap();

        assert_eq!(
            registry.provide(entry::<A>()),
            Err(RegistryErrorKind::DuplicateKey {
                key: Key::of::<A>(),
                existing: a,
            })
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_consumer_not_indexed() {
        let mut registry = Registry::new();
        let root = registry
            .provide(BuildEntry::consumer("root", vec![Dependency::required(Key::of::<A>())]))
            .unwrap();

        assert_eq!(root, EntryId(0));
        assert_eq!(registry.keys().count(), 0);
        assert!(registry.get(root).is_some());
    }

    #[test]
    #[traced_test]
    fn test_provide_as_is_all_or_nothing() {
        let mut registry = Registry::new();
        registry.provide(entry::<B>()).unwrap();

        registry
            .provide_as(BuildEntry::consumer("child", Vec::<Dependency>::new()), [Key::of::<A>(), Key::of::<B>()])
            .unwrap_err();
        assert!(!registry.provides(&Key::of::<A>()));
        assert_eq!(registry.len(), 1);

        let child = registry
            .provide_as(BuildEntry::consumer("child", Vec::<Dependency>::new()), [Key::of::<A>(), Key::of::<C>()])
            .unwrap();
        assert_eq!(registry.lookup(&Key::of::<A>()), Some(child));
        assert_eq!(registry.lookup(&Key::of::<C>()), Some(child));
    }
}

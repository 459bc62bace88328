use alloc::{boxed::Box, sync::Arc, vec, vec::Vec};
use core::fmt::{self, Display, Formatter};

use crate::{
    any::TypeInfo,
    dependency::Dependency,
    descriptor::{dependencies_of, Component},
    key::Key,
};

/// Identity of an entry inside the registry that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(pub(crate) usize);

impl EntryId {
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Resolution state of one dependency slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Unresolved,
    ResolvedTo(EntryId),
    /// Nothing in the scope provides the key. Never changes afterwards.
    Missing,
}

impl Slot {
    #[inline]
    #[must_use]
    pub const fn resolved(self) -> Option<EntryId> {
        match self {
            Slot::ResolvedTo(id) => Some(id),
            Slot::Unresolved | Slot::Missing => None,
        }
    }
}

/// Node of the resolution graph: one declared provider and its dependency slots.
///
/// `slots` is always the same length as `dependencies` and index aligned with it.
#[derive(Debug, Clone)]
pub struct BuildEntry {
    pub(crate) label: &'static str,
    pub(crate) key: Option<Key>,
    pub(crate) dependencies: Arc<[Dependency]>,
    pub(crate) slots: Box<[Slot]>,
    pub(crate) visited: bool,
    pub(crate) synthetic: bool,
}

impl BuildEntry {
    #[must_use]
    pub fn new(key: Key, dependencies: impl Into<Arc<[Dependency]>>) -> Self {
        Self::with_label(key.type_info.short_name(), Some(key), dependencies)
    }

    /// Entry that only consumes, e.g. a synthetic root
    #[must_use]
    pub fn consumer(label: &'static str, dependencies: impl Into<Arc<[Dependency]>>) -> Self {
        Self::with_label(label, None, dependencies)
    }

    #[must_use]
    pub fn with_label(label: &'static str, key: Option<Key>, dependencies: impl Into<Arc<[Dependency]>>) -> Self {
        let dependencies = dependencies.into();
        let slots = vec![Slot::Unresolved; dependencies.len()].into_boxed_slice();
        Self {
            label,
            key,
            dependencies,
            slots,
            visited: false,
            synthetic: false,
        }
    }

    /// Entry for a component, dependency list comes from the process-wide descriptor cache
    #[must_use]
    pub fn of<C: Component>() -> Self {
        let key = C::key();
        let label = key.map_or_else(|| TypeInfo::of::<C>().short_name(), |key| key.type_info.short_name());
        Self::with_label(label, key, dependencies_of::<C>())
    }

    /// Dependency-free entry synthesized for a framework-owned key
    #[must_use]
    pub fn synthetic(key: Key) -> Self {
        let mut entry = Self::new(key, Vec::<Dependency>::new());
        entry.synthetic = true;
        entry
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    #[inline]
    #[must_use]
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    #[inline]
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    #[inline]
    #[must_use]
    pub fn has_unresolved(&self) -> bool {
        self.slots.iter().any(|slot| matches!(slot, Slot::Unresolved))
    }

    /// Targets of resolved slots, in slot order
    pub fn edges(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.slots.iter().filter_map(|slot| slot.resolved())
    }

    #[inline]
    #[must_use]
    pub fn has_edges(&self) -> bool {
        self.edges().next().is_some()
    }

    /// Slots are filled once, a second fill of the same slot is a bug in the caller
    pub(crate) fn fill(&mut self, index: usize, slot: Slot) {
        debug_assert!(matches!(self.slots[index], Slot::Unresolved), "slot {index} of `{}` filled twice", self.label);
        self.slots[index] = slot;
    }
}

impl Display for BuildEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) if key.qualifier.is_some() => write!(f, "{key}"),
            _ => f.write_str(self.label),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{BuildEntry, EntryId, Slot};
    use crate::{dependency::Dependency, key::Key};

    use alloc::{string::ToString as _, vec, vec::Vec};

    struct Service;
    struct Cache;
    struct Clock;

    #[test]
    fn test_slots_aligned_with_dependencies() {
        let entry = BuildEntry::new(
            Key::of::<Service>(),
            vec![Dependency::required(Key::of::<Cache>()), Dependency::emptyable(Key::of::<Clock>())],
        );

        assert_eq!(entry.slots().len(), entry.dependencies().len());
        assert!(entry.slots().iter().all(|slot| *slot == Slot::Unresolved));
        assert!(entry.has_unresolved());
        assert!(!entry.has_edges());
        assert!(!entry.is_visited());
        assert_eq!(entry.label(), "Service");
    }

    #[test]
    fn test_edges_skip_missing() {
        let mut entry = BuildEntry::new(
            Key::of::<Service>(),
            vec![Dependency::required(Key::of::<Cache>()), Dependency::emptyable(Key::of::<Clock>())],
        );
        entry.fill(0, Slot::ResolvedTo(EntryId(3)));
        entry.fill(1, Slot::Missing);

        assert!(!entry.has_unresolved());
        assert_eq!(entry.edges().collect::<Vec<_>>(), vec![EntryId(3)]);
        assert_eq!(entry.slots().len(), entry.dependencies().len());
    }

    #[test]
    fn test_consumer_has_no_key() {
        let entry = BuildEntry::consumer("root", vec![Dependency::required(Key::of::<Service>())]);
        assert!(entry.key().is_none());
        assert_eq!(entry.to_string(), "root");
    }

    #[test]
    fn test_display_qualified() {
        let entry = BuildEntry::new(Key::named::<Cache>("local"), Vec::<Dependency>::new());
        assert_eq!(entry.to_string(), "Cache@\"local\"");
        assert!(BuildEntry::synthetic(Key::of::<Clock>()).is_synthetic());
    }
}

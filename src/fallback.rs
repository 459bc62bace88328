use alloc::collections::BTreeMap;

use crate::{any::TypeInfo, entry::BuildEntry, key::Key};

/// Synthesizes a provider for a framework-owned key
pub type Synthesizer = fn(&Key) -> BuildEntry;

/// Handle to the scope a component is assembled in
pub struct EnclosingScope;

/// Handle to the execution context components run within
pub struct ExecutionContext;

/// Well-known key types resolved when nothing in the registry provides them.
///
/// Lookup is by the key's type, so every qualifier of a well-known type is synthesized too.
#[derive(Clone)]
pub struct Fallbacks {
    synthesizers: BTreeMap<TypeInfo, Synthesizer>,
}

impl Default for Fallbacks {
    fn default() -> Self {
        Self::new()
            .with(TypeInfo::of::<EnclosingScope>(), self_reference)
            .with(TypeInfo::of::<ExecutionContext>(), self_reference)
    }
}

impl Fallbacks {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            synthesizers: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with(mut self, type_info: TypeInfo, synthesizer: Synthesizer) -> Self {
        self.synthesizers.insert(type_info, synthesizer);
        self
    }

    #[must_use]
    pub(crate) fn synthesize(&self, key: &Key) -> Option<BuildEntry> {
        self.synthesizers.get(&key.type_info).map(|synthesizer| synthesizer(key))
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.synthesizers.is_empty()
    }
}

/// Dependency-free node standing for the scope itself
#[must_use]
pub fn self_reference(key: &Key) -> BuildEntry {
    BuildEntry::synthetic(*key)
}

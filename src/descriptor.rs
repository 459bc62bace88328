use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use core::any::TypeId;
use parking_lot::{const_rwlock, RwLock};
use tracing::debug;

use crate::{dependency::Dependency, key::Key};

/// Component whose dependency list was extracted by an upstream collaborator
pub trait Component: 'static {
    /// Dependency slots in declaration order
    fn dependencies() -> Vec<Dependency>;

    /// Key the component provides, `None` for pure consumers
    #[inline]
    #[must_use]
    fn key() -> Option<Key> {
        Some(Key::of::<Self>())
    }
}

static DESCRIPTORS: RwLock<BTreeMap<TypeId, Arc<[Dependency]>>> = const_rwlock(BTreeMap::new());

/// Dependency list of `C`, computed once per process and shared afterwards
#[must_use]
pub fn dependencies_of<C: Component>() -> Arc<[Dependency]> {
    let type_id = TypeId::of::<C>();

    if let Some(dependencies) = DESCRIPTORS.read().get(&type_id) {
        return dependencies.clone();
    }

    let dependencies: Arc<[Dependency]> = C::dependencies().into();
    debug!(component = core::any::type_name::<C>(), count = dependencies.len(), "Descriptor cached");

    // Another thread may have cached it meanwhile, the first value wins
    DESCRIPTORS.write().entry(type_id).or_insert(dependencies).clone()
}

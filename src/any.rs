use core::{
    any::{type_name, TypeId},
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
};

/// Nominal type identity.
///
/// Compared, ordered and hashed by [`TypeId`] only, the name is kept for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    #[cfg(const_type_id)]
    pub const fn new<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            name,
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    #[cfg(not(const_type_id))]
    pub fn new<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            name,
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    /// Type name without its module path, generics are kept as is.
    #[inline]
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let path = self.name.split_once('<').map_or(self.name, |(path, _)| path);
        match path.rsplit_once("::") {
            Some((prefix, _)) => &self.name[prefix.len() + 2..],
            None => self.name,
        }
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::TypeInfo;

    use alloc::{string::ToString as _, vec::Vec};

    struct Service;

    #[test]
    fn test_equality_ignores_name() {
        assert_eq!(TypeInfo::of::<Service>(), TypeInfo::new::<Service>("renamed"));
        assert_ne!(TypeInfo::of::<Service>(), TypeInfo::of::<u8>());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(TypeInfo::of::<Service>().short_name(), "Service");
        assert_eq!(TypeInfo::of::<u8>().short_name(), "u8");
        assert_eq!(TypeInfo::of::<Vec<Service>>().short_name(), "Vec<wiring::any::tests::Service>");
        assert_eq!(TypeInfo::of::<Service>().to_string(), "Service");
    }
}

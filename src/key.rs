use core::fmt::{self, Display, Formatter};

use crate::any::TypeInfo;

/// Tag that distinguishes several bindings of the same type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Qualifier {
    /// Marker type used as an annotation
    Type(TypeInfo),
    Named(&'static str),
}

impl Display for Qualifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::Type(type_info) => write!(f, "{type_info}"),
            Qualifier::Named(name) => write!(f, "\"{name}\""),
        }
    }
}

/// Identity of a thing that can be provided or required.
///
/// Two keys are equal iff both the type and the qualifier match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    pub type_info: TypeInfo,
    pub qualifier: Option<Qualifier>,
}

impl Key {
    #[inline]
    #[must_use]
    pub const fn new(type_info: TypeInfo) -> Self {
        Self {
            type_info,
            qualifier: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeInfo::of::<T>())
    }

    #[inline]
    #[must_use]
    pub fn qualified<T: ?Sized + 'static, Q: ?Sized + 'static>() -> Self {
        Self::of::<T>().with_qualifier(Qualifier::Type(TypeInfo::of::<Q>()))
    }

    #[inline]
    #[must_use]
    pub fn named<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self::of::<T>().with_qualifier(Qualifier::Named(name))
    }

    #[inline]
    #[must_use]
    pub const fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = Some(qualifier);
        self
    }
}

impl From<TypeInfo> for Key {
    fn from(type_info: TypeInfo) -> Self {
        Self::new(type_info)
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}@{qualifier}", self.type_info),
            None => write!(f, "{}", self.type_info),
        }
    }
}

use alloc::{sync::Arc, vec::Vec};
use core::fmt::{self, Display, Formatter};

use crate::{any::TypeInfo, key::Key};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Optionality {
    Required,
    /// Resolves to an empty value when nothing provides the key
    Emptyable,
    /// Resolves to a wrapper that reports whether the key was provided
    Wrapped,
}

impl Optionality {
    #[inline]
    #[must_use]
    pub const fn is_optional(self) -> bool {
        !matches!(self, Optionality::Required)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberKind {
    Constructor,
    Method,
    Field,
}

impl Display for MemberKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MemberKind::Constructor => "constructor",
            MemberKind::Method => "method",
            MemberKind::Field => "field",
        })
    }
}

/// Where a dependency was declared.
///
/// Only used to render diagnostics, resolution never looks inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Site {
    Unknown,
    /// Requirement of a nested scope folded into its parent
    Scope(&'static str),
    Member {
        kind: MemberKind,
        owner: TypeInfo,
        name: &'static str,
    },
    Parameter {
        kind: MemberKind,
        owner: TypeInfo,
        name: &'static str,
        index: usize,
        parameters: Arc<[Key]>,
    },
}

impl Display for Site {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Site::Unknown => f.write_str("unknown site"),
            Site::Scope(name) => write!(f, "scope `{name}`"),
            Site::Member { kind, owner, name } => write!(f, "{kind} `{owner}::{name}`"),
            Site::Parameter {
                kind,
                owner,
                name,
                index,
                parameters,
            } => {
                write!(f, "parameter #{index} of {kind} `{owner}::{name}(")?;
                for (position, key) in parameters.iter().enumerate() {
                    if position > 0 {
                        f.write_str(", ")?;
                    }
                    if position == *index {
                        write!(f, ">{key}<")?;
                    } else {
                        write!(f, "{key}")?;
                    }
                }
                f.write_str(")`")
            }
        }
    }
}

/// One declared input slot of a component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub key: Key,
    pub optionality: Optionality,
    pub site: Site,
}

impl Dependency {
    #[inline]
    #[must_use]
    pub const fn new(key: Key, optionality: Optionality) -> Self {
        Self {
            key,
            optionality,
            site: Site::Unknown,
        }
    }

    #[inline]
    #[must_use]
    pub const fn required(key: Key) -> Self {
        Self::new(key, Optionality::Required)
    }

    #[inline]
    #[must_use]
    pub const fn emptyable(key: Key) -> Self {
        Self::new(key, Optionality::Emptyable)
    }

    #[inline]
    #[must_use]
    pub const fn wrapped(key: Key) -> Self {
        Self::new(key, Optionality::Wrapped)
    }

    #[inline]
    #[must_use]
    pub fn at(mut self, site: Site) -> Self {
        self.site = site;
        self
    }

    #[inline]
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optionality.is_optional()
    }
}

/// Describes every parameter of `owner::name` as a dependency with a [`Site::Parameter`].
///
/// Parameters listed in `optional` get [`Optionality::Emptyable`], the rest are required.
#[must_use]
pub fn parameters_of(kind: MemberKind, owner: TypeInfo, name: &'static str, keys: &[Key], optional: &[usize]) -> Vec<Dependency> {
    let parameters: Arc<[Key]> = Arc::from(keys);
    keys.iter()
        .enumerate()
        .map(|(index, key)| {
            let optionality = if optional.contains(&index) {
                Optionality::Emptyable
            } else {
                Optionality::Required
            };
            Dependency::new(*key, optionality).at(Site::Parameter {
                kind,
                owner,
                name,
                index,
                parameters: parameters.clone(),
            })
        })
        .collect()
}

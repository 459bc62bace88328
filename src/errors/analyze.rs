use alloc::boxed::Box;
use core::fmt::{self, Display, Formatter};

use crate::{dependency::Site, entry::EntryId, key::Key};

/// Required dependency that nothing in the scope provides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    pub entry: EntryId,
    pub label: &'static str,
    pub key: Key,
    pub site: Site,
}

impl Display for MissingDependency {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` required by `{}`", self.key, self.label)?;
        if !matches!(self.site, Site::Unknown | Site::Scope(_)) {
            write!(f, " at {}", self.site)?;
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub struct MissingDependencyError {
    pub missing: Box<[MissingDependency]>,
}

impl Display for MissingDependencyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Missing dependencies: ")?;
        for (index, missing) in self.missing.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{missing}")?;
        }
        Ok(())
    }
}

/// One entry of a cycle trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceItem {
    pub entry: EntryId,
    pub label: &'static str,
    pub key: Option<Key>,
}

impl Display for TraceItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) if key.qualifier.is_some() => write!(f, "{key}"),
            _ => f.write_str(self.label),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub struct CyclicDependencyError {
    pub trace: Box<[TraceItem]>,
}

impl Display for CyclicDependencyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Cyclic dependency detected: ")?;
        for item in self.trace.iter() {
            write!(f, "{item} -> ")?;
        }
        match self.trace.first() {
            Some(first) => write!(f, "{first}"),
            None => Ok(()),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeErrorKind {
    #[error(transparent)]
    Missing(#[from] MissingDependencyError),
    #[error(transparent)]
    Cyclic(#[from] CyclicDependencyError),
}

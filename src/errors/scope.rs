use alloc::boxed::Box;
use core::fmt::{self, Display, Formatter};

use super::{analyze::AnalyzeErrorKind, registry::RegistryErrorKind};
use crate::key::Key;

#[derive(thiserror::Error, Debug)]
pub enum ScopeErrorKind {
    #[error("Analysis of scope `{scope}` failed: {source}")]
    Analyze {
        scope: &'static str,
        #[source]
        source: AnalyzeErrorKind,
    },
    #[error("Scope `{scope}` can't be assembled: {source}")]
    Registry {
        scope: &'static str,
        #[source]
        source: RegistryErrorKind,
    },
    #[error("Scope `{scope}` exposes `{key}`, but nothing in it provides the key")]
    NotProvided { scope: &'static str, key: Key },
    #[error("Root scope `{scope}` leaves requirements unsatisfied: {}", Keys(keys))]
    Unsatisfied { scope: &'static str, keys: Box<[Key]> },
}

struct Keys<'a>(&'a [Key]);

impl Display for Keys<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, key) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "`{key}`")?;
        }
        Ok(())
    }
}

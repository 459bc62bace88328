use alloc::collections::BTreeSet;
use core::fmt::{self, Display, Formatter};

use crate::key::Key;

/// What a scope requires from outside, optionally consumes and exposes.
///
/// A key is never both required and optional, required wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contract {
    required: BTreeSet<Key>,
    optional: BTreeSet<Key>,
    provided: BTreeSet<Key>,
}

impl Contract {
    pub const EMPTY: Contract = Contract {
        required: BTreeSet::new(),
        optional: BTreeSet::new(),
        provided: BTreeSet::new(),
    };

    /// Builder pre-populated with this contract
    #[inline]
    #[must_use]
    pub fn builder(&self) -> ContractBuilder {
        ContractBuilder {
            required: self.required.clone(),
            optional: self.optional.clone(),
            provided: self.provided.clone(),
        }
    }

    #[inline]
    #[must_use]
    pub fn required(&self) -> &BTreeSet<Key> {
        &self.required
    }

    #[inline]
    #[must_use]
    pub fn optional(&self) -> &BTreeSet<Key> {
        &self.optional
    }

    #[inline]
    #[must_use]
    pub fn provided(&self) -> &BTreeSet<Key> {
        &self.provided
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty() && self.provided.is_empty()
    }

    /// Whether consumers of `older` can switch to this contract.
    ///
    /// Holds when this contract requires nothing `older` didn't require and provides everything `older` provided.
    /// Optional keys aren't compared.
    #[must_use]
    pub fn is_backwards_compatible_with(&self, older: &Contract) -> bool {
        self.required.is_subset(&older.required) && self.provided.is_superset(&older.provided)
    }
}

fn write_set(f: &mut Formatter<'_>, name: &str, keys: &BTreeSet<Key>) -> fmt::Result {
    write!(f, "{name}: [")?;
    for (index, key) in keys.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key}")?;
    }
    f.write_str("]")
}

impl Display for Contract {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        write_set(f, "requires", &self.required)?;
        f.write_str(", ")?;
        write_set(f, "optional", &self.optional)?;
        f.write_str(", ")?;
        write_set(f, "provides", &self.provided)?;
        f.write_str(" }")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContractBuilder {
    required: BTreeSet<Key>,
    optional: BTreeSet<Key>,
    provided: BTreeSet<Key>,
}

impl ContractBuilder {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            required: BTreeSet::new(),
            optional: BTreeSet::new(),
            provided: BTreeSet::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn requires(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.required.extend(keys);
        self
    }

    #[inline]
    #[must_use]
    pub fn optional(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.optional.extend(keys);
        self
    }

    #[inline]
    #[must_use]
    pub fn provides(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.provided.extend(keys);
        self
    }

    /// Removes every key of `contract` from the matching set
    #[must_use]
    pub fn remove(mut self, contract: &Contract) -> Self {
        self.required.retain(|key| !contract.required.contains(key));
        self.optional.retain(|key| !contract.optional.contains(key));
        self.provided.retain(|key| !contract.provided.contains(key));
        self
    }

    #[must_use]
    pub fn build(self) -> Contract {
        let Self {
            required,
            mut optional,
            provided,
        } = self;
        optional.retain(|key| !required.contains(key));

        if required.is_empty() && optional.is_empty() && provided.is_empty() {
            return Contract::EMPTY;
        }
        Contract {
            required,
            optional,
            provided,
        }
    }
}

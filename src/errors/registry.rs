use crate::{entry::EntryId, key::Key};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryErrorKind {
    #[error("Key `{key}` is already provided by entry {existing}")]
    DuplicateKey { key: Key, existing: EntryId },
}

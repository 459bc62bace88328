use alloc::{
    collections::{BTreeMap, BTreeSet},
    vec::Vec,
};
use tracing::{debug, error, info_span, warn};

use crate::{
    config::Config,
    contract::ContractBuilder,
    cycle_detector::CycleDetector,
    dependency::Dependency,
    entry::{EntryId, Slot},
    errors::{AnalyzeErrorKind, MissingDependency, MissingDependencyError},
    fallback::Fallbacks,
    key::Key,
    registry::Registry,
};

/// Requirement declared explicitly rather than derived from a missing dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub key: Key,
    pub optional: bool,
}

/// Binds the dependency slots of every entry in one scope and tracks what the scope needs from outside.
///
/// In automatic mode (default) a dependency the registry can't satisfy becomes part of the scope's contract,
/// to be satisfied by whoever assembles the enclosing scope.
/// In manual mode such a dependency must be declared with [`Self::require`], otherwise [`Self::analyze`] fails.
pub struct DependencyManager {
    registry: Registry,
    config: Config,
    fallbacks: Fallbacks,
    synthesized: BTreeMap<Key, EntryId>,
    explicit: Vec<Requirement>,
    missing: Vec<(EntryId, usize)>,
    /// Missing dependencies before this index passed the manual check
    checked: usize,
    /// Entries not yet proven acyclic
    candidates: Vec<EntryId>,
    required: BTreeSet<Key>,
    optional: BTreeSet<Key>,
}

impl DependencyManager {
    #[inline]
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, Config::default())
    }

    #[must_use]
    pub fn with_config(registry: Registry, config: Config) -> Self {
        Self {
            registry,
            config,
            fallbacks: Fallbacks::default(),
            synthesized: BTreeMap::new(),
            explicit: Vec::new(),
            missing: Vec::new(),
            checked: 0,
            candidates: Vec::new(),
            required: BTreeSet::new(),
            optional: BTreeSet::new(),
        }
    }

    /// Replaces the well-known keys synthesized when the registry doesn't provide them
    #[inline]
    #[must_use]
    pub fn with_fallbacks(mut self, fallbacks: Fallbacks) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Entries added after an analysis are picked up by the next one
    #[inline]
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn is_manual(&self) -> bool {
        self.config.manual_requirement_tracking
    }

    /// Declares that the scope needs `key` from outside
    pub fn require(&mut self, key: Key, optional: bool) {
        self.explicit.push(Requirement { key, optional });
    }

    /// Declares that the scope can use `key` from outside.
    ///
    /// In manual mode this covers only optional dependencies on `key`, a required dependency still needs [`Self::require`]
    /// with `optional = false`, since the contract would otherwise promise to run without the key.
    #[inline]
    pub fn require_optionally(&mut self, key: Key) {
        self.require(key, true);
    }

    pub fn enable_manual_requirement_tracking(&mut self) {
        self.config.manual_requirement_tracking = true;
    }

    /// Declared requirements in declaration order
    #[inline]
    #[must_use]
    pub fn requirements(&self) -> &[Requirement] {
        &self.explicit
    }

    /// Dependencies nothing in the scope provides, in discovery order
    pub fn missing(&self) -> impl Iterator<Item = (EntryId, &Dependency)> + '_ {
        self.missing
            .iter()
            .map(|(id, index)| (*id, &self.registry[*id].dependencies[*index]))
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

    /// Binds every unresolved slot, then checks the resolved graph for cycles.
    ///
    /// Running it again without adding entries changes nothing, a failed analysis fails again.
    ///
    /// # Errors
    /// - Returns [`AnalyzeErrorKind::Cyclic`] if providers depend on each other in a cycle
    /// - Returns [`AnalyzeErrorKind::Missing`] in manual mode if required dependencies are neither provided nor declared
    pub fn analyze(&mut self) -> Result<(), AnalyzeErrorKind> {
        let span = info_span!("analyze", entries = self.registry.len(), manual = self.is_manual());
        let _guard = span.enter();

        self.resolve();

        CycleDetector::new(&mut self.registry).detect(self.candidates.iter().copied())?;
        self.candidates.clear();

        self.apply_requirements();
        if self.is_manual() {
            self.check_missing()?;
        }
        self.checked = self.missing.len();

        debug!(required = self.required.len(), optional = self.optional.len(), "Analyzed");
        Ok(())
    }

    /// Copies the accumulated requirements into `builder`
    #[must_use]
    pub fn build_contract(&self, builder: ContractBuilder) -> ContractBuilder {
        builder.requires(self.required.iter().copied()).optional(self.optional.iter().copied())
    }

    /// Fills every unresolved slot, entries that got at least one slot from the registry become cycle candidates
    fn resolve(&mut self) {
        for index in 0..self.registry.entries.len() {
            let id = EntryId(index);
            if !self.registry[id].has_unresolved() {
                continue;
            }

            let mut from_registry = false;
            for slot in 0..self.registry[id].slots.len() {
                if !matches!(self.registry[id].slots[slot], Slot::Unresolved) {
                    continue;
                }
                let dependency = self.registry[id].dependencies[slot].clone();

                if let Some(target) = self.registry.lookup(&dependency.key) {
                    debug!(entry = self.registry[id].label, key = %dependency.key, "Resolved from registry");
                    self.registry.get_mut(id).fill(slot, Slot::ResolvedTo(target));
                    from_registry = true;
                } else if let Some(target) = self.synthesize(&dependency.key) {
                    debug!(entry = self.registry[id].label, key = %dependency.key, "Resolved to synthetic entry");
                    self.registry.get_mut(id).fill(slot, Slot::ResolvedTo(target));
                } else {
                    debug!(entry = self.registry[id].label, key = %dependency.key, "Missing");
                    self.registry.get_mut(id).fill(slot, Slot::Missing);
                    self.missing.push((id, slot));
                    if !self.is_manual() {
                        self.promote(dependency.key, dependency.is_optional());
                    }
                }
            }

            if from_registry {
                self.candidates.push(id);
            }
        }
    }

    /// Synthetic entry for a well-known key, one per key per scope
    fn synthesize(&mut self, key: &Key) -> Option<EntryId> {
        if !self.config.fallbacks {
            return None;
        }
        if let Some(id) = self.synthesized.get(key) {
            return Some(*id);
        }

        let entry = self.fallbacks.synthesize(key)?;
        let id = self.registry.insert_detached(entry);
        self.synthesized.insert(*key, id);
        Some(id)
    }

    /// Adds `key` to the contract sets, required wins over optional
    fn promote(&mut self, key: Key, optional: bool) {
        if optional {
            if !self.required.contains(&key) {
                self.optional.insert(key);
            }
        } else {
            self.optional.remove(&key);
            self.required.insert(key);
        }
    }

    fn apply_requirements(&mut self) {
        for index in 0..self.explicit.len() {
            let Requirement { key, optional } = self.explicit[index];
            if self.registry.provides(&key) {
                debug!(key = %key, "Declared requirement is provided by the scope itself");
                continue;
            }
            self.promote(key, optional);
        }
    }

    /// Reports unchecked missing required dependencies that weren't declared
    fn check_missing(&self) -> Result<(), MissingDependencyError> {
        let mut missing = Vec::new();

        for index in self.checked..self.missing.len() {
            let (id, slot) = self.missing[index];
            let entry = &self.registry[id];
            let dependency = &entry.dependencies[slot];

            let declared = self.explicit.iter().any(|requirement| requirement.key == dependency.key);
            let required = self
                .explicit
                .iter()
                .any(|requirement| requirement.key == dependency.key && !requirement.optional);
            match (dependency.is_optional(), declared, required) {
                (false, _, true) | (true, true, _) => {}
                (true, false, _) => {
                    debug!(entry = entry.label, key = %dependency.key, "Undeclared optional dependency dropped");
                }
                (false, declared, false) => {
                    if declared {
                        warn!(key = %dependency.key, "Key declared optional, but `{}` requires it", entry.label);
                    }
                    missing.push(MissingDependency {
                        entry: id,
                        label: entry.label,
                        key: dependency.key,
                        site: dependency.site.clone(),
                    });
                }
            }
        }

        if missing.is_empty() {
            return Ok(());
        }

        let err = MissingDependencyError {
            missing: missing.into_boxed_slice(),
        };
        error!("{}", err);
        Err(err)
    }
}

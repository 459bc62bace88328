use alloc::{collections::BTreeSet, vec::Vec};
use tracing::{debug, error, info_span};

use crate::{
    config::Config,
    contract::{Contract, ContractBuilder},
    dependency::{Dependency, Site},
    dependency_manager::DependencyManager,
    entry::{BuildEntry, EntryId},
    errors::ScopeErrorKind,
    fallback::Fallbacks,
    key::Key,
    registry::Registry,
};

/// Unit of resolution: entries analyzed together, plus nested scopes analyzed before them.
///
/// A nested scope joins its parent as a single consumer entry that depends on the nested contract's
/// requirements and is reachable under every key the nested contract provides,
/// so cycles running through several scopes are still found.
pub struct Scope {
    name: &'static str,
    manager: DependencyManager,
    exposed: BTreeSet<Key>,
    children: Vec<Scope>,
    /// Children before this index are already folded into the registry
    folded: usize,
}

impl Scope {
    #[inline]
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self::with_config(name, Config::default())
    }

    #[must_use]
    pub fn with_config(name: &'static str, config: Config) -> Self {
        Self {
            name,
            manager: DependencyManager::with_config(Registry::new(), config),
            exposed: BTreeSet::new(),
            children: Vec::new(),
            folded: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_fallbacks(mut self, fallbacks: Fallbacks) -> Self {
        self.manager = self.manager.with_fallbacks(fallbacks);
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub fn manager(&self) -> &DependencyManager {
        &self.manager
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        self.manager.registry()
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Scope] {
        &self.children
    }

    /// # Errors
    /// Returns [`ScopeErrorKind::Registry`] if another entry of the scope already provides the entry's key
    pub fn provide(&mut self, entry: BuildEntry) -> Result<EntryId, ScopeErrorKind> {
        let scope = self.name;
        self.manager
            .registry_mut()
            .provide(entry)
            .map_err(|source| ScopeErrorKind::Registry { scope, source })
    }

    /// Makes `key` part of the scope's provided keys
    pub fn expose(&mut self, key: Key) {
        self.expose_all([key]);
    }

    pub fn expose_all(&mut self, keys: impl IntoIterator<Item = Key>) {
        self.exposed.extend(keys);
    }

    #[inline]
    pub fn require(&mut self, key: Key, optional: bool) {
        self.manager.require(key, optional);
    }

    #[inline]
    pub fn require_optionally(&mut self, key: Key) {
        self.manager.require_optionally(key);
    }

    #[inline]
    pub fn enable_manual_requirement_tracking(&mut self) {
        self.manager.enable_manual_requirement_tracking();
    }

    /// Nests `scope`, it is analyzed before this one
    pub fn child(&mut self, scope: Scope) {
        self.children.push(scope);
    }

    /// Analyzes nested scopes bottom-up, then this one, and returns the scope's contract.
    ///
    /// Requirements nothing in the scope satisfies are left for the enclosing scope.
    ///
    /// # Errors
    /// - Returns [`ScopeErrorKind::Analyze`] if this or a nested scope has a cycle or, in manual mode, a missing dependency
    /// - Returns [`ScopeErrorKind::Registry`] if a nested scope provides a key the scope already provides
    /// - Returns [`ScopeErrorKind::NotProvided`] if the scope exposes a key nothing in it provides
    pub fn analyze(&mut self) -> Result<Contract, ScopeErrorKind> {
        let span = info_span!("scope", scope = self.name);
        let _guard = span.enter();

        while self.folded < self.children.len() {
            let child = &mut self.children[self.folded];
            let name = child.name;
            let contract = child.analyze()?;
            self.fold(name, &contract)?;
            self.folded += 1;
        }

        if let Some(key) = self.exposed.iter().find(|key| !self.registry().provides(key)) {
            let err = ScopeErrorKind::NotProvided { scope: self.name, key: *key };
            error!("{}", err);
            return Err(err);
        }

        let scope = self.name;
        self.manager
            .analyze()
            .map_err(|source| ScopeErrorKind::Analyze { scope, source })?;

        let contract = self
            .manager
            .build_contract(ContractBuilder::new())
            .provides(self.exposed.iter().copied())
            .build();
        debug!(%contract, "Contract built");
        Ok(contract)
    }

    /// Analyzes the outermost scope, whose requirements can't be satisfied by anything else.
    ///
    /// # Errors
    /// Same as [`Self::analyze`], and returns [`ScopeErrorKind::Unsatisfied`] if the contract still requires keys
    pub fn analyze_root(&mut self) -> Result<Contract, ScopeErrorKind> {
        let contract = self.analyze()?;
        if contract.required().is_empty() {
            return Ok(contract);
        }

        let err = ScopeErrorKind::Unsatisfied {
            scope: self.name,
            keys: contract.required().iter().copied().collect(),
        };
        error!("{}", err);
        Err(err)
    }

    fn fold(&mut self, name: &'static str, contract: &Contract) -> Result<EntryId, ScopeErrorKind> {
        let site = Site::Scope(name);
        let dependencies: Vec<Dependency> = contract
            .required()
            .iter()
            .map(|key| Dependency::required(*key).at(site.clone()))
            .chain(contract.optional().iter().map(|key| Dependency::emptyable(*key).at(site.clone())))
            .collect();

        let scope = self.name;
        let id = self
            .manager
            .registry_mut()
            .provide_as(BuildEntry::consumer(name, dependencies), contract.provided().iter().copied())
            .map_err(|source| ScopeErrorKind::Registry { scope, source })?;
        debug!(child = name, provides = contract.provided().len(), "Nested scope folded");
        Ok(id)
    }
}

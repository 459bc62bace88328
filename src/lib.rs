#![no_std]

extern crate alloc;

pub(crate) mod any;
pub(crate) mod config;
pub(crate) mod contract;
pub(crate) mod cycle_detector;
pub(crate) mod dependency;
pub(crate) mod dependency_manager;
pub(crate) mod descriptor;
pub(crate) mod entry;
pub(crate) mod errors;
pub(crate) mod fallback;
pub(crate) mod key;
pub(crate) mod registry;
pub(crate) mod scope;

pub use any::TypeInfo;
pub use config::Config;
pub use contract::{Contract, ContractBuilder};
pub use cycle_detector::CycleDetector;
pub use dependency::{parameters_of, Dependency, MemberKind, Optionality, Site};
pub use dependency_manager::{DependencyManager, Requirement};
pub use descriptor::{dependencies_of, Component};
pub use entry::{BuildEntry, EntryId, Slot};
pub use errors::{
    AnalyzeErrorKind, CyclicDependencyError, MissingDependency, MissingDependencyError, RegistryErrorKind, ScopeErrorKind, TraceItem,
};
pub use fallback::{self_reference, EnclosingScope, ExecutionContext, Fallbacks, Synthesizer};
pub use key::{Key, Qualifier};
pub use registry::Registry;
pub use scope::Scope;

mod analyze;
mod registry;
mod scope;

pub use analyze::{AnalyzeErrorKind, CyclicDependencyError, MissingDependency, MissingDependencyError, TraceItem};
pub use registry::RegistryErrorKind;
pub use scope::ScopeErrorKind;

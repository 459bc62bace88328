/// Config for a dependency manager
/// ## Fields
/// - `manual_requirement_tracking`:
///   If `true`, a required dependency nothing in the scope provides is an error unless it was declared with
///   [`crate::DependencyManager::require`].
///   If `false`, it becomes a requirement of the scope's contract instead.
///
/// - `fallbacks`:
///   If `true`, framework-owned keys (see [`crate::Fallbacks`]) are synthesized when the registry doesn't provide them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub manual_requirement_tracking: bool,
    pub fallbacks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manual_requirement_tracking: false,
            fallbacks: true,
        }
    }
}

use alloc::{collections::BTreeSet, vec::Vec};
use tracing::{debug, error};

use crate::{
    entry::EntryId,
    errors::{CyclicDependencyError, TraceItem},
    registry::Registry,
};

/// Proves the resolved subgraph of a registry acyclic.
///
/// Entries proven acyclic are marked visited and never expanded again,
/// so repeated runs over a growing registry stay linear in total.
/// The walk keeps its own frame stack, chain depth is bounded by memory rather than the call stack.
pub struct CycleDetector<'a> {
    registry: &'a mut Registry,
    /// Current path with the next slot to inspect for each entry on it
    frames: Vec<(EntryId, usize)>,
    on_path: BTreeSet<EntryId>,
}

impl<'a> CycleDetector<'a> {
    #[inline]
    #[must_use]
    pub fn new(registry: &'a mut Registry) -> Self {
        Self {
            registry,
            frames: Vec::new(),
            on_path: BTreeSet::new(),
        }
    }

    /// Walks every candidate that isn't visited yet.
    ///
    /// # Errors
    /// Returns the first cycle found in traversal order
    pub fn detect(mut self, candidates: impl IntoIterator<Item = EntryId>) -> Result<(), CyclicDependencyError> {
        for id in candidates {
            if self.registry[id].visited {
                continue;
            }
            if let Some(trace) = self.visit(id) {
                let err = self.error(&trace);
                error!("{}", err);
                return Err(err);
            }
        }
        Ok(())
    }

    fn visit(&mut self, root: EntryId) -> Option<Vec<EntryId>> {
        self.frames.push((root, 0));
        self.on_path.insert(root);

        while let Some((id, cursor)) = self.frames.last_mut() {
            let id = *id;
            let slots = &self.registry[id].slots;
            let next = slots[*cursor..]
                .iter()
                .enumerate()
                .find_map(|(offset, slot)| slot.resolved().map(|target| (offset, target)));
            let Some((offset, target)) = next else {
                self.frames.pop();
                self.on_path.remove(&id);
                self.registry.get_mut(id).visited = true;
                debug!(entry = self.registry[id].label, "Acyclic");
                continue;
            };
            *cursor += offset + 1;

            let entry = &self.registry[target];
            // Visited entries and entries without resolved edges are leaves
            if entry.visited || !entry.has_edges() {
                continue;
            }
            if self.on_path.contains(&target) {
                let start = self.frames.iter().position(|(on_path, _)| *on_path == target).unwrap_or_default();
                return Some(self.frames[start..].iter().map(|(id, _)| *id).collect());
            }
            self.frames.push((target, 0));
            self.on_path.insert(target);
        }
        None
    }

    fn error(&self, trace: &[EntryId]) -> CyclicDependencyError {
        CyclicDependencyError {
            trace: trace
                .iter()
                .map(|id| {
                    let entry = &self.registry[*id];
                    TraceItem {
                        entry: *id,
                        label: entry.label,
                        key: entry.key,
                    }
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::CycleDetector;
    use crate::{
        dependency::Dependency,
        entry::{BuildEntry, EntryId, Slot},
        key::Key,
        registry::Registry,
    };

    use alloc::{vec, vec::Vec};
    use alloc::{format, string::{String, ToString}};
    use tracing_test::traced_test;

    /// Builds a registry with one entry per label and fills slots from `edges` directly
    fn graph(labels: &[&'static str], edges: &[(usize, usize)]) -> Registry {
        let mut registry = Registry::new();
        for (index, label) in labels.iter().copied().enumerate() {
            let count = edges.iter().filter(|(from, _)| *from == index).count();
            let dependencies: Vec<Dependency> = (0..count).map(|_| Dependency::required(Key::of::<()>())).collect();
            registry.insert_detached(BuildEntry::consumer(label, dependencies));
        }
        for (index, _) in labels.iter().enumerate() {
            let targets: Vec<usize> = edges.iter().filter(|(from, _)| *from == index).map(|(_, to)| *to).collect();
            for (slot, target) in targets.into_iter().enumerate() {
                registry.get_mut(EntryId(index)).fill(slot, Slot::ResolvedTo(EntryId(target)));
            }
        }
        registry
    }

    fn all(registry: &Registry) -> Vec<EntryId> {
        registry.entries().map(|(id, _)| id).collect()
    }

    fn labels(err: &crate::errors::CyclicDependencyError) -> Vec<&'static str> {
        err.trace.iter().map(|item| item.label).collect()
    }

    #[test]
    #[traced_test]
    fn test_acyclic_marks_visited() {
        // A -> B -> C, A -> C
        let mut registry = graph(&["A", "B", "C"], &[(0, 1), (1, 2), (0, 2)]);
        let candidates = all(&registry);
        CycleDetector::new(&mut registry).detect(candidates).unwrap();

        // C has no edges, it is a leaf and never expanded from A or B
        assert!(registry[EntryId(0)].is_visited());
        assert!(registry[EntryId(1)].is_visited());
    }

    #[test]
    #[traced_test]
    fn test_three_cycle_excludes_tail() {
        // D -> A -> B -> C -> A
        let mut registry = graph(&["D", "A", "B", "C"], &[(0, 1), (1, 2), (2, 3), (3, 1)]);
        let candidates = all(&registry);
        let err = CycleDetector::new(&mut registry).detect(candidates).unwrap_err();

        assert_eq!(labels(&err), vec!["A", "B", "C"]);
    }

    #[test]
    #[traced_test]
    fn test_self_loop() {
        let mut registry = graph(&["A"], &[(0, 0)]);
        let candidates = all(&registry);
        let err = CycleDetector::new(&mut registry).detect(candidates).unwrap_err();

        assert_eq!(labels(&err), vec!["A"]);
    }

    #[test]
    #[traced_test]
    fn test_first_cycle_reported() {
        // A <-> B, C <-> D
        let mut registry = graph(&["A", "B", "C", "D"], &[(0, 1), (1, 0), (2, 3), (3, 2)]);
        let candidates = all(&registry);
        let err = CycleDetector::new(&mut registry).detect(candidates).unwrap_err();

        assert_eq!(labels(&err), vec!["A", "B"]);
    }

    /// `node-0 -> node-1 -> ... -> node-{length-1}`, optionally closed back to `node-0`
    fn chain(length: usize, closed: bool) -> Registry {
        let mut registry = Registry::new();
        for index in 0..length {
            let has_next = index + 1 < length || closed;
            let dependencies: Vec<Dependency> = if has_next { vec![Dependency::required(Key::of::<()>())] } else { vec![] };
            registry.insert_detached(BuildEntry::consumer("node", dependencies));
        }
        for index in 0..length {
            if index + 1 < length {
                registry.get_mut(EntryId(index)).fill(0, Slot::ResolvedTo(EntryId(index + 1)));
            } else if closed {
                registry.get_mut(EntryId(index)).fill(0, Slot::ResolvedTo(EntryId(0)));
            }
        }
        registry
    }

    #[test]
    fn test_deep_chain() {
        let mut registry = chain(10_000, false);
        CycleDetector::new(&mut registry).detect([EntryId(0)]).unwrap();

        assert!(registry.entries().take(9_999).all(|(_, entry)| entry.is_visited()));
    }

    #[test]
    fn test_deep_cycle() {
        let mut registry = chain(10_000, true);
        let err = CycleDetector::new(&mut registry).detect([EntryId(0)]).unwrap_err();

        assert_eq!(err.trace.len(), 10_000);
        assert_eq!(err.trace[0].entry, EntryId(0));
        assert_eq!(err.trace[9_999].entry, EntryId(9_999));
        assert!(registry.entries().all(|(_, entry)| !entry.is_visited()));
    }

    #[test]
    #[traced_test]
    fn test_visited_skipped_on_rerun() {
        let mut registry = graph(&["A", "B"], &[(0, 1)]);
        let candidates = all(&registry);
        CycleDetector::new(&mut registry).detect(candidates.clone()).unwrap();
        let snapshot: Vec<bool> = registry.entries().map(|(_, entry)| entry.is_visited()).collect();

        CycleDetector::new(&mut registry).detect(candidates).unwrap();
        let after: Vec<bool> = registry.entries().map(|(_, entry)| entry.is_visited()).collect();
        assert_eq!(snapshot, after);
    }
}

//! Per-cycle spawn deduplication.

use crate::spawn::SpawnCandidate;
use std::collections::HashSet;

/// Tracks the spawn-point IDs seen in the immediately preceding poll cycle.
///
/// The set is replaced wholesale every cycle, never merged: a spawn that
/// drops out for one cycle and reappears counts as new again. Memory
/// horizon is exactly one cycle.
#[derive(Debug, Default)]
pub struct DedupTracker {
    known: HashSet<String>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the candidates not seen last cycle, and remembers every ID
    /// from the current list (new or not) for the next call.
    pub fn filter_new(&mut self, candidates: Vec<SpawnCandidate>) -> Vec<SpawnCandidate> {
        let next: HashSet<String> = candidates
            .iter()
            .map(|c| c.spawn_point_id.clone())
            .collect();
        let previous = std::mem::replace(&mut self.known, next);

        candidates
            .into_iter()
            .filter(|c| !previous.contains(&c.spawn_point_id))
            .collect()
    }

    #[cfg(test)]
    fn knows(&self, spawn_point_id: &str) -> bool {
        self.known.contains(spawn_point_id)
    }
}

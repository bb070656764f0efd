//! Spawn candidate model and snapshot extraction.

use crate::geo::{CompassDirection, LatLng};
use crate::relevance::RarityTier;
use crate::session::Cell;
use crate::species::{self, SpeciesInfo};
use std::collections::HashMap;
use tracing::warn;

/// A wild spawn pulled out of one heartbeat snapshot. Produced fresh each
/// cycle; never persisted.
#[derive(Debug, Clone)]
pub struct SpawnCandidate {
    pub spawn_point_id: String,
    pub species: SpeciesInfo,
    pub position: LatLng,
    pub time_till_hidden_ms: i64,
    /// Unmodelled wire fields, carried along opaquely.
    pub raw: serde_json::Value,
}

/// A candidate annotated with distance/bearing from the poll origin and
/// the rarity the relevance engine assigned.
#[derive(Debug, Clone)]
pub struct EnrichedSpawn {
    pub candidate: SpawnCandidate,
    pub distance_m: f64,
    pub bearing: CompassDirection,
    pub rarity: RarityTier,
}

/// Flatten a snapshot's cells into spawn candidates.
///
/// Duplicate spawn-point IDs within one snapshot resolve last-write-wins:
/// the later record's data replaces the earlier one in place, so the output
/// order stays the encounter order of the first sighting. Records with a
/// species ID outside the lookup table are dropped.
pub fn extract_candidates(cells: &[Cell]) -> Vec<SpawnCandidate> {
    let mut candidates: Vec<SpawnCandidate> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    for cell in cells {
        for record in &cell.wild_spawns {
            let Some(species) = species::lookup(record.pokemon_id) else {
                warn!(
                    species_id = record.pokemon_id,
                    spawn_point = %record.spawn_point_id,
                    "unknown species id in snapshot - skipping record"
                );
                continue;
            };
            let candidate = SpawnCandidate {
                spawn_point_id: record.spawn_point_id.clone(),
                species,
                position: LatLng::new(record.latitude, record.longitude),
                time_till_hidden_ms: record.time_till_hidden_ms,
                raw: record.extra.clone(),
            };
            match index_by_id.get(&record.spawn_point_id) {
                Some(&i) => candidates[i] = candidate,
                None => {
                    index_by_id.insert(record.spawn_point_id.clone(), candidates.len());
                    candidates.push(candidate);
                }
            }
        }
    }

    candidates
}

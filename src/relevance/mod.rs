//! Enrichment and relevance filtering.
//!
//! Candidates get annotated with distance and bearing from the current
//! poll origin, then the relevance engine decides whether each is worth a
//! notification and what rarity tier it carries. Engine thresholds are its
//! own business; the pipeline only sees keep-with-rarity or discard.

use crate::config::RelevanceConfig;
use crate::geo::{self, LatLng};
use crate::spawn::{EnrichedSpawn, SpawnCandidate};
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RarityTier {
    Common,
    Uncommon,
    Rare,
    UltraRare,
}

impl RarityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RarityTier::Common => "common",
            RarityTier::Uncommon => "uncommon",
            RarityTier::Rare => "rare",
            RarityTier::UltraRare => "ultra-rare",
        }
    }

    /// Parse a tier label. Unrecognized labels yield `None`; callers decide
    /// the fallback.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "common" => Some(RarityTier::Common),
            "uncommon" => Some(RarityTier::Uncommon),
            "rare" => Some(RarityTier::Rare),
            "ultra-rare" => Some(RarityTier::UltraRare),
            _ => None,
        }
    }

    /// Whether this tier warrants an attention marker. Covers both `rare`
    /// and `ultra-rare`.
    pub fn is_rare(&self) -> bool {
        matches!(self, RarityTier::Rare | RarityTier::UltraRare)
    }
}

impl std::fmt::Display for RarityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether an enriched candidate is worth reporting, and at which
/// rarity. `None` means discard.
pub trait RelevanceEngine {
    fn assess(&self, candidate: &SpawnCandidate, distance_m: f64) -> Option<RarityTier>;
}

/// Default engine: rarity from configured species name sets, an ignore
/// list, and a distance cutoff for common spawns.
pub struct SpeciesRarityEngine {
    ignored: HashSet<String>,
    uncommon: HashSet<String>,
    rare: HashSet<String>,
    ultra_rare: HashSet<String>,
    max_common_distance_m: f64,
    min_tier: RarityTier,
}

fn lowered(names: &[String]) -> HashSet<String> {
    names.iter().map(|n| n.to_ascii_lowercase()).collect()
}

impl SpeciesRarityEngine {
    pub fn from_config(config: &RelevanceConfig) -> Self {
        let min_tier = RarityTier::from_label(&config.min_report_tier).unwrap_or_else(|| {
            warn!(
                label = %config.min_report_tier,
                "unrecognized min_report_tier label, falling back to common"
            );
            RarityTier::Common
        });
        let engine = Self {
            ignored: lowered(&config.ignore_species),
            uncommon: lowered(&config.uncommon_species),
            rare: lowered(&config.rare_species),
            ultra_rare: lowered(&config.ultra_rare_species),
            max_common_distance_m: config.max_common_distance_m,
            min_tier,
        };
        for name in engine.rare.intersection(&engine.ultra_rare) {
            warn!(species = %name, "species listed as both rare and ultra-rare; ultra-rare wins");
        }
        engine
    }

    fn classify(&self, species_name: &str) -> RarityTier {
        let name = species_name.to_ascii_lowercase();
        if self.ultra_rare.contains(&name) {
            RarityTier::UltraRare
        } else if self.rare.contains(&name) {
            RarityTier::Rare
        } else if self.uncommon.contains(&name) {
            RarityTier::Uncommon
        } else {
            RarityTier::Common
        }
    }
}

impl RelevanceEngine for SpeciesRarityEngine {
    fn assess(&self, candidate: &SpawnCandidate, distance_m: f64) -> Option<RarityTier> {
        let name = candidate.species.name.to_ascii_lowercase();
        if self.ignored.contains(&name) {
            return None;
        }
        let tier = self.classify(candidate.species.name);
        if tier < self.min_tier {
            return None;
        }
        if tier == RarityTier::Common && distance_m > self.max_common_distance_m {
            return None;
        }
        Some(tier)
    }
}

/// Enrich candidates with distance/bearing from `origin` and keep the ones
/// the engine wants reported, in encounter order.
pub fn filter_interesting<R: RelevanceEngine>(
    candidates: Vec<SpawnCandidate>,
    origin: LatLng,
    engine: &R,
) -> Vec<EnrichedSpawn> {
    let mut interesting = Vec::new();

    for candidate in candidates {
        let distance_m = geo::distance_meters(origin, candidate.position);
        let bearing = geo::cardinal_bearing(origin, candidate.position);
        match engine.assess(&candidate, distance_m) {
            Some(rarity) => interesting.push(EnrichedSpawn {
                candidate,
                distance_m,
                bearing,
                rarity,
            }),
            None => debug!(
                species = candidate.species.name,
                spawn_point = %candidate.spawn_point_id,
                distance_m = %format!("{distance_m:.0}"),
                "spawn not worth reporting"
            ),
        }
    }

    interesting
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species;

    fn candidate(species_id: u16, position: LatLng) -> SpawnCandidate {
        SpawnCandidate {
            spawn_point_id: format!("sp-{species_id}"),
            species: species::lookup(species_id).unwrap(),
            position,
            time_till_hidden_ms: 60_000,
            raw: serde_json::Value::Null,
        }
    }

    fn default_engine() -> SpeciesRarityEngine {
        SpeciesRarityEngine::from_config(&RelevanceConfig::default())
    }

    #[test]
    fn test_rarity_labels_round_trip() {
        for tier in [
            RarityTier::Common,
            RarityTier::Uncommon,
            RarityTier::Rare,
            RarityTier::UltraRare,
        ] {
            assert_eq!(RarityTier::from_label(tier.as_str()), Some(tier));
        }
        assert_eq!(RarityTier::from_label("legendary"), None);
        assert_eq!(RarityTier::from_label(""), None);
    }

    #[test]
    fn test_rare_pattern_covers_both_tiers() {
        assert!(!RarityTier::Common.is_rare());
        assert!(!RarityTier::Uncommon.is_rare());
        assert!(RarityTier::Rare.is_rare());
        assert!(RarityTier::UltraRare.is_rare());
    }

    #[test]
    fn test_engine_classification() {
        let engine = default_engine();
        let origin = LatLng::new(51.5, -0.12);
        // Pidgey: not in any tier list
        assert_eq!(
            engine.assess(&candidate(16, origin), 10.0),
            Some(RarityTier::Common)
        );
        // Pikachu: uncommon by default
        assert_eq!(
            engine.assess(&candidate(25, origin), 10.0),
            Some(RarityTier::Uncommon)
        );
        // Dragonite: ultra-rare by default
        assert_eq!(
            engine.assess(&candidate(149, origin), 10.0),
            Some(RarityTier::UltraRare)
        );
    }

    #[test]
    fn test_distant_common_spawns_dropped() {
        let engine = default_engine();
        let origin = LatLng::new(51.5, -0.12);
        assert_eq!(engine.assess(&candidate(16, origin), 1_500.0), None);
        // Rarer tiers survive the distance cutoff
        assert_eq!(
            engine.assess(&candidate(149, origin), 1_500.0),
            Some(RarityTier::UltraRare)
        );
    }

    #[test]
    fn test_min_report_tier_threshold() {
        let config = RelevanceConfig {
            min_report_tier: "rare".to_string(),
            ..RelevanceConfig::default()
        };
        let engine = SpeciesRarityEngine::from_config(&config);
        let origin = LatLng::new(51.5, -0.12);
        assert_eq!(engine.assess(&candidate(16, origin), 10.0), None);
        assert_eq!(engine.assess(&candidate(25, origin), 10.0), None);
        assert_eq!(
            engine.assess(&candidate(131, origin), 10.0),
            Some(RarityTier::Rare)
        );
    }

    #[test]
    fn test_unrecognized_min_tier_falls_back_to_common() {
        let config = RelevanceConfig {
            min_report_tier: "legendary".to_string(),
            ..RelevanceConfig::default()
        };
        let engine = SpeciesRarityEngine::from_config(&config);
        let origin = LatLng::new(51.5, -0.12);
        assert_eq!(
            engine.assess(&candidate(16, origin), 10.0),
            Some(RarityTier::Common)
        );
    }

    #[test]
    fn test_ignored_species_never_reported() {
        let config = RelevanceConfig {
            ignore_species: vec!["Pidgey".to_string()],
            ..RelevanceConfig::default()
        };
        let engine = SpeciesRarityEngine::from_config(&config);
        let origin = LatLng::new(51.5, -0.12);
        assert_eq!(engine.assess(&candidate(16, origin), 5.0), None);
    }

    #[test]
    fn test_filter_preserves_encounter_order() {
        let engine = default_engine();
        let origin = LatLng::new(51.5, -0.12);
        let near = LatLng::new(51.5001, -0.12);
        let spawns = vec![candidate(149, near), candidate(16, near), candidate(25, near)];
        let kept = filter_interesting(spawns, origin, &engine);
        let names: Vec<&str> = kept.iter().map(|s| s.candidate.species.name).collect();
        assert_eq!(names, vec!["Dragonite", "Pidgey", "Pikachu"]);
        assert!(kept.iter().all(|s| s.distance_m < 50.0));
    }
}

//! Poll scheduler and location cycler.
//!
//! Each tick visits the next of five fixed offsets around the origin
//! anchor, moves the session there, polls a heartbeat snapshot, and runs
//! the extracted spawns through dedup -> relevance -> dispatch. Cycles are
//! strictly sequential; the caller awaits `run_cycle` before the next tick
//! is serviced.

use crate::dedup::DedupTracker;
use crate::geo::LatLng;
use crate::notify::Notifier;
use crate::relevance::{self, RelevanceEngine};
use crate::session::{SessionClient, SessionError};
use crate::spawn;
use thiserror::Error;
use tracing::{error, info, warn};

/// Heartbeat failure means the session is desynced, which is unrecoverable
/// without re-authentication. Surfaced so the binary can exit with the
/// documented code instead of limping on.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("heartbeat failed: {0}")]
    Heartbeat(#[source] SessionError),
}

/// The five poll positions, visited in a fixed rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetPosition {
    Base,
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

const OFFSET_CYCLE: [OffsetPosition; 5] = [
    OffsetPosition::Base,
    OffsetPosition::NorthWest,
    OffsetPosition::NorthEast,
    OffsetPosition::SouthWest,
    OffsetPosition::SouthEast,
];

impl OffsetPosition {
    /// Latitude/longitude delta in units of the configured offset step.
    fn delta(&self) -> (f64, f64) {
        match self {
            OffsetPosition::Base => (0.0, 0.0),
            OffsetPosition::NorthWest => (1.0, -1.0),
            OffsetPosition::NorthEast => (1.0, 1.0),
            OffsetPosition::SouthWest => (-1.0, -1.0),
            OffsetPosition::SouthEast => (-1.0, 1.0),
        }
    }

    fn apply(&self, anchor: LatLng, offset_deg: f64) -> LatLng {
        let (dlat, dlon) = self.delta();
        LatLng::new(
            anchor.latitude + dlat * offset_deg,
            anchor.longitude + dlon * offset_deg,
        )
    }
}

impl std::fmt::Display for OffsetPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OffsetPosition::Base => "base",
            OffsetPosition::NorthWest => "NW",
            OffsetPosition::NorthEast => "NE",
            OffsetPosition::SouthWest => "SW",
            OffsetPosition::SouthEast => "SE",
        };
        f.write_str(label)
    }
}

/// Owns the cycling state for the process lifetime: the immutable origin
/// anchor, the per-tick poll origin, the offset index, and the dedup
/// tracker.
pub struct PollScheduler<S, R, N> {
    session: S,
    engine: R,
    notifier: N,
    tracker: DedupTracker,
    /// Origin captured once at session start; offsets are relative to it.
    anchor: LatLng,
    /// Where the current cycle is anchored; refreshed from the resolved
    /// set-location coordinates each tick.
    origin: LatLng,
    offset_deg: f64,
    index: usize,
}

impl<S, R, N> PollScheduler<S, R, N>
where
    S: SessionClient,
    R: RelevanceEngine,
    N: Notifier,
{
    pub fn new(session: S, engine: R, notifier: N, anchor: LatLng, offset_deg: f64) -> Self {
        Self {
            session,
            engine,
            notifier,
            tracker: DedupTracker::new(),
            anchor,
            origin: anchor,
            offset_deg,
            index: 0,
        }
    }

    /// Run one poll cycle. `Ok` covers both completed and aborted cycles;
    /// the next scheduled tick proceeds either way. `Err` is fatal.
    pub async fn run_cycle(&mut self) -> Result<(), CycleError> {
        let offset = OFFSET_CYCLE[self.index];
        self.index = (self.index + 1) % OFFSET_CYCLE.len();

        let target = offset.apply(self.anchor, self.offset_deg);
        info!(offset = %offset, target = %target, "requesting heartbeat");

        match self.session.set_location(target).await {
            Ok(resolved) => {
                self.origin = resolved;
                info!(origin = %resolved, "searching");
            }
            Err(e) => {
                warn!(error = %e, "set location failed - skipping cycle");
                return Ok(());
            }
        }

        let snapshot = self
            .session
            .heartbeat()
            .await
            .map_err(CycleError::Heartbeat)?;

        let Some(cells) = snapshot.cells else {
            error!("heartbeat snapshot has no cell list - aborting cycle");
            return Ok(());
        };

        let candidates = spawn::extract_candidates(&cells);
        info!(count = candidates.len(), "spawns in snapshot");
        if candidates.is_empty() {
            return Ok(());
        }

        let fresh = self.tracker.filter_new(candidates);
        info!(count = fresh.len(), "new spawns");
        if fresh.is_empty() {
            return Ok(());
        }

        let interesting = relevance::filter_interesting(fresh, self.origin, &self.engine);
        info!(count = interesting.len(), "interesting spawns");
        if interesting.is_empty() {
            return Ok(());
        }

        self.notifier.dispatch_all(interesting);
        Ok(())
    }
}

// Calculation context: everything one search is allowed to read.
//
// A `CalculationContext` bundles a world snapshot, the config `Arc` that was
// active when the search started, a frozen failure-memory snapshot, and the
// favoring table (previous-segment reuse and hostile avoidance). It is built
// on the simulation thread and moved into the worker; nothing in it is
// mutated afterwards.
//
// `safe_for_threaded_use` is set for contexts built from a world snapshot.
// Contexts that read a live, non-snapshotted world (the executor's per-tick
// recalculation) are marked single-threaded, and search dispatch refuses
// them.
//
// See also: `moves.rs` (reads blocks and costs through this),
// `provider.rs`, `pathfinding.rs`, `orchestrator.rs` (builds one per search).

use crate::config::PathingConfig;
use crate::failure_memory::FailureSnapshot;
use crate::path::Path;
use crate::types::{BlockPos, BlockState};
use crate::world::WorldView;
use rustc_hash::FxHashSet;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Favoring
// ---------------------------------------------------------------------------

/// Position-dependent cost multipliers applied on top of movement costs.
#[derive(Clone, Debug, Default)]
pub struct Favoring {
    /// Packed positions of the previous segment.
    previous: FxHashSet<u64>,
    backtrack_coefficient: f64,
    hostiles: Vec<BlockPos>,
    mob_radius_sq: i64,
    mob_coefficient: f64,
}

impl Favoring {
    /// No favoring at all; every multiplier is 1.0.
    pub fn none() -> Self {
        Self {
            backtrack_coefficient: 1.0,
            mob_coefficient: 1.0,
            ..Self::default()
        }
    }

    pub fn new(previous: Option<&Path>, hostiles: Vec<BlockPos>, config: &PathingConfig) -> Self {
        let previous = previous
            .map(|path| path.positions().iter().map(|p| p.pack()).collect())
            .unwrap_or_default();
        let radius = i64::from(config.mob_avoidance_radius.max(0));
        Self {
            previous,
            backtrack_coefficient: config.backtrack_cost_favoring_coefficient,
            hostiles,
            mob_radius_sq: radius * radius,
            mob_coefficient: config.mob_avoidance_coefficient,
        }
    }

    /// Multiplier for entering `pos`.
    pub fn multiplier(&self, pos: BlockPos) -> f64 {
        let mut m = 1.0;
        if !self.previous.is_empty() && self.previous.contains(&pos.pack()) {
            m *= self.backtrack_coefficient;
        }
        if self.mob_coefficient != 1.0 {
            let near_hostile = self.hostiles.iter().any(|h| {
                let dx = i64::from(h.x - pos.x);
                let dy = i64::from(h.y - pos.y);
                let dz = i64::from(h.z - pos.z);
                dx * dx + dy * dy + dz * dz <= self.mob_radius_sq
            });
            if near_hostile {
                m *= self.mob_coefficient;
            }
        }
        m
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_empty() && self.hostiles.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct CalculationContext {
    pub world: Arc<dyn WorldView>,
    pub config: Arc<PathingConfig>,
    pub failures: FailureSnapshot,
    pub favoring: Favoring,
    safe_for_threaded_use: bool,
}

impl CalculationContext {
    /// A context over a world snapshot, with no failure penalties and no
    /// favoring.
    pub fn new(world: Arc<dyn WorldView>, config: Arc<PathingConfig>) -> Self {
        Self {
            world,
            config,
            failures: FailureSnapshot::empty(),
            favoring: Favoring::none(),
            safe_for_threaded_use: true,
        }
    }

    pub fn with_failures(mut self, failures: FailureSnapshot) -> Self {
        self.failures = failures;
        self
    }

    pub fn with_favoring(mut self, favoring: Favoring) -> Self {
        self.favoring = favoring;
        self
    }

    /// Mark this context as unfit for the search worker.
    pub fn single_threaded(mut self) -> Self {
        self.safe_for_threaded_use = false;
        self
    }

    pub fn is_safe_for_threaded_use(&self) -> bool {
        self.safe_for_threaded_use
    }

    #[inline]
    pub fn block(&self, pos: BlockPos) -> BlockState {
        self.world.block_at(pos)
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.world.height()
    }

    #[inline]
    pub fn chunk_loaded(&self, x: i32, z: i32) -> bool {
        self.world.chunk_loaded(x, z)
    }
}

impl std::fmt::Debug for CalculationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalculationContext")
            .field("height", &self.world.height())
            .field("failures", &self.failures.len())
            .field("safe_for_threaded_use", &self.safe_for_threaded_use)
            .finish_non_exhaustive()
    }
}

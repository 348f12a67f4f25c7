// Path executor: drives one path forward a tick at a time.
//
// The executor keeps a cursor into its path (`position`, the index of the
// movement in progress) and, every tick, reconciles the cursor with where
// the agent actually is before asking the active movement for intents:
//
// 1. Resync. If the agent stands on an earlier path position it has slipped
//    back and the cursor moves back with it; if it stands three or more
//    positions ahead, the cursor jumps forward.
// 2. Drift. Being more than `MAX_DIST_FROM_PATH` from every path position
//    for `MAX_TICKS_AWAY` ticks, or more than `MAX_MAX_DIST_FROM_PATH` at
//    any time, fails the path. A falling agent is measured horizontally
//    against the landing spot.
// 3. Verification. When the cursor reaches a new movement, the next few
//    movements are re-costed against the live world; if one has become
//    impossible the path fails. The active movement is re-costed on its
//    first tick and fails if it became impossible or much more expensive.
// 4. Update. The movement runs; success advances the cursor (and the next
//    movement starts in the same tick), failure fails the path, and a
//    movement running far past its estimate times out.
//
// Every failure other than cancellation is recorded into the failure memory
// before it is reported, so the replacement search already avoids it.
//
// See also: `movement.rs` (per-tick movement logic), `orchestrator.rs`
// (owns the current and next executors), `failure_memory.rs`.

use crate::agent::{AgentState, Intents};
use crate::config::PathingConfig;
use crate::context::CalculationContext;
use crate::costs::COST_INF;
use crate::failure_memory::FailureMemory;
use crate::movement::{FailureReason, Movement, MovementKind, MovementStatus};
use crate::path::Path;
use crate::types::BlockPos;
use crate::world::WorldView;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Drift tolerated for up to `MAX_TICKS_AWAY` ticks.
pub const MAX_DIST_FROM_PATH: f64 = 2.0;

/// Drift that fails the path immediately.
pub const MAX_MAX_DIST_FROM_PATH: f64 = 3.0;

pub const MAX_TICKS_AWAY: u32 = 200;

/// Where and why a segment was abandoned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentFailure {
    pub at: BlockPos,
    pub kind: MovementKind,
    pub reason: FailureReason,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutorStatus {
    Running,
    Finished,
    Failed(SegmentFailure),
}

/// Result of one executor tick.
#[derive(Clone, Debug)]
pub struct ExecutorTick {
    pub status: ExecutorStatus,
    pub intents: Intents,
    /// Whether the agent may be interrupted right now.
    pub safe_to_cancel: bool,
}

#[derive(Debug)]
pub struct PathExecutor {
    path: Arc<Path>,
    position: usize,
    status: ExecutorStatus,
    ticks_away: u32,
    ticks_on_current: u32,
    /// Cursor value the lookahead verification last ran for.
    cost_estimate_index: Option<usize>,
    /// Planned cost of the active movement, captured when it started.
    original_cost: f64,
    safe_to_cancel: bool,
}

impl PathExecutor {
    pub fn new(path: Path) -> Self {
        Self::from_arc(Arc::new(path))
    }

    fn from_arc(path: Arc<Path>) -> Self {
        Self {
            path,
            position: 0,
            status: ExecutorStatus::Running,
            ticks_away: 0,
            ticks_on_current: 0,
            cost_estimate_index: None,
            original_cost: 0.0,
            safe_to_cancel: true,
        }
    }

    pub fn path(&self) -> &Arc<Path> {
        &self.path
    }

    /// Index of the movement in progress.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn status(&self) -> ExecutorStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == ExecutorStatus::Finished
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ExecutorStatus::Failed(_))
    }

    /// As reported by the last tick.
    pub fn safe_to_cancel(&self) -> bool {
        self.safe_to_cancel
    }

    /// Stop without recording anything in the failure memory.
    pub fn cancel(&mut self) {
        if self.status == ExecutorStatus::Running {
            let (at, kind) = self
                .path
                .movements()
                .get(self.position)
                .map_or((self.path.dest(), MovementKind::Traverse), |m| (m.src, m.kind));
            self.status = ExecutorStatus::Failed(SegmentFailure {
                at,
                kind,
                reason: FailureReason::Cancelled,
            });
        }
    }

    /// Estimated ticks left, optionally counting the movement in progress.
    pub fn ticks_remaining(&self, include_current: bool) -> f64 {
        let from = if include_current {
            self.position
        } else {
            self.position + 1
        };
        self.path.ticks_remaining_from(from)
    }

    /// Advance one tick.
    pub fn tick(
        &mut self,
        agent: &AgentState,
        ctx: &CalculationContext,
        failures: &mut FailureMemory,
        now: Instant,
    ) -> ExecutorTick {
        let path = Arc::clone(&self.path);
        let config = &ctx.config;
        let world = ctx.world.as_ref();

        loop {
            if self.status != ExecutorStatus::Running {
                return self.report(Intents::new());
            }
            if self.position >= path.len() {
                self.status = ExecutorStatus::Finished;
                continue;
            }
            if self.resync(agent) {
                continue;
            }

            let movement = &path.movements()[self.position];
            self.safe_to_cancel = movement.safe_to_cancel(agent, world);

            if self.off_path(agent.feet, movement, MAX_DIST_FROM_PATH) {
                self.ticks_away += 1;
                if self.ticks_away > MAX_TICKS_AWAY {
                    debug!(feet = %agent.feet, "too far from path for too long");
                    return self.fail(movement, FailureReason::OffPath, failures, now);
                }
            } else {
                self.ticks_away = 0;
            }
            if self.off_path(agent.feet, movement, MAX_MAX_DIST_FROM_PATH) {
                debug!(feet = %agent.feet, "too far from path");
                return self.fail(movement, FailureReason::OffPath, failures, now);
            }

            if self.cost_estimate_index != Some(self.position) {
                self.cost_estimate_index = Some(self.position);
                self.original_cost = movement.cost;
                let upcoming = (1..config.cost_verification_lookahead)
                    .map(|i| self.position + i)
                    .take_while(|&i| i < path.len());
                for i in upcoming {
                    let later = &path.movements()[i];
                    if self.safe_to_cancel && later.recalculate_cost(ctx) >= COST_INF {
                        debug!(movement = %later, "upcoming movement became impossible");
                        return self.fail(movement, FailureReason::WorldChanged, failures, now);
                    }
                }
            }

            if self.ticks_on_current == 0 && agent.feet == movement.src && self.safe_to_cancel {
                let current = movement.recalculate_cost(ctx);
                if current >= COST_INF {
                    debug!(%movement, "movement became impossible");
                    return self.fail(movement, FailureReason::WorldChanged, failures, now);
                }
                if current - self.original_cost > config.max_cost_increase {
                    debug!(%movement, current, "movement cost increased");
                    return self.fail(movement, FailureReason::CostIncreased, failures, now);
                }
            }

            let (status, intents) =
                movement.update(agent, world, config.allow_overshoot, config.allow_sprint);
            match status {
                MovementStatus::Success => {
                    self.position += 1;
                    self.ticks_on_current = 0;
                }
                MovementStatus::Failed(reason) => {
                    debug!(%movement, ?reason, "movement failed");
                    return self.fail(movement, reason, failures, now);
                }
                MovementStatus::Running => {
                    self.ticks_on_current += 1;
                    if f64::from(self.ticks_on_current) > self.original_cost + f64::from(config.movement_timeout_ticks) {
                        debug!(%movement, ticks = self.ticks_on_current, "movement timed out");
                        return self.fail(movement, FailureReason::Timeout, failures, now);
                    }
                    return self.report(intents);
                }
            }
        }
    }

    fn report(&self, intents: Intents) -> ExecutorTick {
        ExecutorTick {
            status: self.status,
            intents,
            safe_to_cancel: self.safe_to_cancel || self.status != ExecutorStatus::Running,
        }
    }

    fn fail(
        &mut self,
        movement: &Movement,
        reason: FailureReason,
        failures: &mut FailureMemory,
        now: Instant,
    ) -> ExecutorTick {
        if reason != FailureReason::Cancelled {
            failures.record_failure(movement.src, movement.kind, now);
        }
        self.status = ExecutorStatus::Failed(SegmentFailure {
            at: movement.src,
            kind: movement.kind,
            reason,
        });
        self.report(Intents::new())
    }

    /// Move the cursor to match an agent that slipped back or ran ahead.
    /// Returns whether the cursor moved.
    fn resync(&mut self, agent: &AgentState) -> bool {
        let positions = self.path.positions();
        if !agent.on_ground || positions[self.position] == agent.feet {
            return false;
        }
        let behind = positions[..self.position.saturating_sub(1)]
            .iter()
            .position(|&p| p == agent.feet);
        if let Some(i) = behind {
            debug!(from = self.position, to = i, "agent slipped back along path");
            self.jump_to(i);
            return true;
        }
        let ahead = (self.position + 3..positions.len().saturating_sub(1))
            .find(|&i| positions[i] == agent.feet);
        if let Some(i) = ahead {
            debug!(from = self.position, to = i, "agent ran ahead along path");
            // Movement i - 1 ends where the agent is and completes at once.
            self.jump_to(i - 1);
            return true;
        }
        false
    }

    fn jump_to(&mut self, position: usize) {
        self.position = position;
        self.ticks_on_current = 0;
    }

    fn off_path(&self, feet: BlockPos, movement: &Movement, leniency: f64) -> bool {
        let closest = self
            .path
            .positions()
            .iter()
            .map(|p| p.distance_sq(feet))
            .fold(f64::INFINITY, f64::min)
            .sqrt();
        if closest <= leniency {
            return false;
        }
        if movement.kind == MovementKind::Fall {
            return feet.flat_distance(movement.dest) >= leniency;
        }
        true
    }

    /// Jump the cursor to the agent's position if it stands on this path
    /// and is not mid-air. Returns whether it did.
    pub fn snap_to(&mut self, agent: &AgentState, world: &dyn WorldView) -> bool {
        if !agent.on_ground && !world.block_at(agent.feet).is_water() {
            return false;
        }
        match self.path.index_of(agent.feet) {
            Some(index) => {
                self.jump_to(index);
                true
            }
            None => false,
        }
    }

    /// Splice `next` onto this executor's path, keeping the cursor. Without a
    /// splice, cut old history once it grows past the configured length.
    /// Returns `None` when neither applies.
    pub fn try_splice(&self, next: Option<&PathExecutor>, config: &PathingConfig) -> Option<Self> {
        if let Some(next) = next
            && let Some(spliced) = self.path.splice(&next.path, false)
        {
            debug_assert_eq!(spliced.dest(), next.path.dest());
            let mut executor = self.carry_over(spliced);
            executor.position = self.position;
            executor.cost_estimate_index = self.cost_estimate_index;
            return Some(executor);
        }
        self.cut_if_too_long(config)
    }

    fn cut_if_too_long(&self, config: &PathingConfig) -> Option<Self> {
        let amount = config.path_history_cutoff_amount;
        if self.position <= config.max_path_history_length || amount == 0 || amount > self.position {
            return None;
        }
        let cut = self.path.cut_history(amount);
        debug!(
            from = self.path.len(),
            to = cut.len(),
            "discarding earliest segment movements"
        );
        let mut executor = self.carry_over(cut);
        executor.position = self.position - amount;
        executor.cost_estimate_index = self.cost_estimate_index.map(|i| i - amount);
        Some(executor)
    }

    fn carry_over(&self, path: Path) -> Self {
        let mut executor = Self::new(path);
        executor.original_cost = self.original_cost;
        executor.ticks_on_current = self.ticks_on_current;
        executor.ticks_away = self.ticks_away;
        executor.safe_to_cancel = self.safe_to_cancel;
        executor
    }
}

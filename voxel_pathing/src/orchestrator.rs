// Pathing orchestrator: goal lifecycle, background search, segment handoff.
//
// The orchestrator is driven by one call per simulation tick. It owns the
// `current` executor, an optional precomputed `next` executor, and at most
// one in-flight search running on a rayon pool. Each tick it:
//
// 1. Purges expired failure records every `failure_cleanup_interval_ticks`.
// 2. Applies a pending segment cancel once the agent is safe to interrupt.
// 3. Cancels the in-flight search if it no longer starts anywhere near the
//    agent (the worker notices at its next expansion).
// 4. Ticks `current`. When it ends, the orchestrator either declares the
//    goal reached, adopts `next` (dropping it first if it does not contain
//    the agent), waits for the lookahead search, or starts a recovery
//    search from the resume position.
// 5. While `current` runs: jumps onto `next` early if the agent already
//    stands on it, splices `next` onto `current` (or trims old history), and
//    starts planning the next segment once fewer than
//    `planning_tick_lookahead` ticks remain.
// 6. Drains the event queue, hands the events to listeners, and returns
//    them together with the agent's intents.
//
// Two mutexes guard shared state. `plan` holds everything about paths and
// the goal; `calc` holds the in-flight search handle. Both the simulation
// thread and search completions take them in plan-then-calc order, never
// the reverse. Search dispatch takes the locked `CalcSlot` by `&mut`, so it
// cannot be called without holding the calc lock.
//
// A search's result is adopted by the worker itself, under the plan lock:
// an initial search becomes `current` only if its path contains the
// expected segment start; a lookahead search becomes `next` only if it
// starts where `current` ends. Anything else is discarded with a warning.
//
// See also: `executor.rs`, `pathfinding.rs`, `event.rs`,
// `failure_memory.rs`.
//
// **Critical constraint: lock order.** plan, then calc. Taking calc and
// then plan anywhere would deadlock against a completing search.

use crate::agent::{AgentState, Intents};
use crate::config::PathingConfig;
use crate::context::{CalculationContext, Favoring};
use crate::error::PathingResult;
use crate::event::{EventQueue, PathEvent, PathEventListener};
use crate::executor::{ExecutorStatus, PathExecutor};
use crate::failure_memory::{FailureMemory, FailureParams};
use crate::goal::Goal;
use crate::movement::FailureReason;
use crate::path::Path;
use crate::pathfinding::{OutcomeKind, SearchHandle, SearchOutcome, Timeouts, search};
use crate::provider::MovementProvider;
use crate::types::BlockPos;
use crate::world::{WorldSource, WorldView};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Coarse state derived from the current, next and in-flight slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathingState {
    Idle,
    CalculatingInitial,
    Executing,
    ExecutingWithLookahead,
    Recovering,
    AtGoal,
}

/// What one tick produced.
#[derive(Clone, Debug, Default)]
pub struct TickOutput {
    pub intents: Intents,
    pub events: Vec<PathEvent>,
}

/// Where a new segment should start for an agent in `agent`'s state: its
/// feet, or the block below while it is mid-jump over solid ground.
pub fn path_start(agent: &AgentState, world: &dyn WorldView) -> BlockPos {
    let feet = agent.feet;
    if !agent.on_ground
        && !world.block_at(feet.down()).can_walk_on()
        && world.block_at(feet.down_by(2)).can_walk_on()
    {
        return feet.down();
    }
    feet
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

struct Plan {
    current: Option<PathExecutor>,
    next: Option<PathExecutor>,
    goal: Option<Goal>,
    /// Where the next segment should start, refreshed every tick.
    expected_segment_start: BlockPos,
    /// The last segment failed and a replacement is being computed.
    recovering: bool,
    at_goal: bool,
    /// Start of the segment the ETA is measured from.
    start_position: Option<BlockPos>,
    ticks_elapsed: u64,
}

/// Why the current segment is being dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CancelCause {
    /// The host stopped pathing; reported as `Canceled`.
    Requested,
    /// A new goal replaced the old one. Not reported.
    GoalChanged,
}

struct CalcSlot {
    in_progress: Option<Arc<SearchHandle>>,
}

struct Shared {
    plan: Mutex<Plan>,
    calc: Mutex<CalcSlot>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Background search
// ---------------------------------------------------------------------------

/// Everything a worker needs to run one search and publish its result.
struct SearchJob {
    shared: Arc<Shared>,
    handle: Arc<SearchHandle>,
    ctx: CalculationContext,
    provider: MovementProvider,
    timeouts: Timeouts,
    source: Arc<dyn WorldSource>,
    events: Sender<PathEvent>,
}

impl SearchJob {
    fn run(self) {
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            search(&self.handle, &self.ctx, &self.provider, self.timeouts)
        }))
        .unwrap_or_else(|_| {
            warn!(start = %self.handle.start(), "search panicked");
            self.handle.mark_finished();
            SearchOutcome::exception(started.elapsed())
        });
        let path = outcome.path.map(|path| self.post_process(path));
        self.complete(outcome.kind, path);
    }

    fn post_process(&self, path: Path) -> Path {
        let config = &self.ctx.config;
        let world = self.source.snapshot();
        let path = path.cutoff_at_loaded_chunks(world.as_ref());
        if config.cut_off_path {
            path.static_cutoff(
                self.handle.goal(),
                config.path_cutoff_minimum_length,
                config.path_cutoff_factor,
            )
        } else {
            path
        }
    }

    fn emit(&self, event: PathEvent) {
        // The orchestrator may already be gone; then nobody is listening.
        let _ = self.events.send(event);
    }

    fn complete(&self, kind: OutcomeKind, path: Option<Path>) {
        let mut plan = lock(&self.shared.plan);
        let start = self.handle.start();

        if self.handle.is_cancelled() || plan.goal.is_none() {
            debug!(%start, "discarding result of cancelled search");
        } else if plan.current.is_none() {
            match path {
                Some(path) if path.contains(plan.expected_segment_start) => {
                    self.emit(PathEvent::CalcFinishedNowExecuting);
                    plan.current = Some(PathExecutor::new(path));
                    plan.recovering = false;
                    plan.start_position = Some(start);
                    plan.ticks_elapsed = 0;
                }
                Some(_) => {
                    warn!(%start, expected = %plan.expected_segment_start, "discarding orphan path segment with incorrect start");
                }
                None if matches!(kind, OutcomeKind::Cancellation | OutcomeKind::Exception) => {}
                None => {
                    info!(%start, "no path found, giving up on goal");
                    self.emit(PathEvent::CalcFailed);
                    plan.goal = None;
                    plan.recovering = false;
                }
            }
        } else if plan.next.is_none() {
            let current_dest = plan.current.as_ref().map(|c| c.path().dest());
            match path {
                Some(path) if Some(path.src()) == current_dest => {
                    self.emit(PathEvent::NextSegmentCalcFinished);
                    plan.next = Some(PathExecutor::new(path));
                }
                Some(_) => warn!(%start, "discarding orphan next segment with incorrect start"),
                None if kind == OutcomeKind::Cancellation => {}
                None => self.emit(PathEvent::NextCalcFailed),
            }
        } else {
            warn!(%start, "both segments already planned, discarding search result");
        }

        let mut calc = lock(&self.shared.calc);
        if calc
            .in_progress
            .as_ref()
            .is_some_and(|h| Arc::ptr_eq(h, &self.handle))
        {
            calc.in_progress = None;
        }
    }
}

fn build_pool(threads: usize) -> PathingResult<rayon::ThreadPool> {
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|i| format!("path-search-{i}"))
        .build()?)
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct PathingOrchestrator {
    shared: Arc<Shared>,
    config: Arc<PathingConfig>,
    source: Arc<dyn WorldSource>,
    pool: rayon::ThreadPool,
    events: EventQueue,
    failures: FailureMemory,
    listeners: Vec<Box<dyn PathEventListener>>,
    tick_count: u64,
    /// Drop the current segment at the next safe point.
    pending_cancel: Option<CancelCause>,
    safe_to_cancel: bool,
}

impl PathingOrchestrator {
    pub fn new(config: PathingConfig, source: Arc<dyn WorldSource>) -> PathingResult<Self> {
        config.validate()?;
        let pool = build_pool(config.worker_threads)?;
        let failures = FailureMemory::new(FailureParams::from_config(&config));
        Ok(Self {
            shared: Arc::new(Shared {
                plan: Mutex::new(Plan {
                    current: None,
                    next: None,
                    goal: None,
                    expected_segment_start: BlockPos::new(0, 0, 0),
                    recovering: false,
                    at_goal: false,
                    start_position: None,
                    ticks_elapsed: 0,
                }),
                calc: Mutex::new(CalcSlot { in_progress: None }),
            }),
            config: Arc::new(config),
            source,
            pool,
            events: EventQueue::new(),
            failures,
            listeners: Vec::new(),
            tick_count: 0,
            pending_cancel: None,
            safe_to_cancel: true,
        })
    }

    pub fn config(&self) -> &PathingConfig {
        &self.config
    }

    /// Replace the config. Searches already running keep the one they
    /// started with.
    pub fn set_config(&mut self, config: PathingConfig) -> PathingResult<()> {
        config.validate()?;
        if config.worker_threads != self.config.worker_threads {
            self.pool = build_pool(config.worker_threads)?;
        }
        self.failures.set_params(FailureParams::from_config(&config));
        self.config = Arc::new(config);
        Ok(())
    }

    pub fn add_listener(&mut self, listener: Box<dyn PathEventListener>) {
        self.listeners.push(listener);
    }

    pub fn failure_memory(&self) -> &FailureMemory {
        &self.failures
    }

    pub fn goal(&self) -> Option<Goal> {
        lock(&self.shared.plan).goal.clone()
    }

    /// Set or clear the goal. A changed goal cancels the in-flight search,
    /// drops the planned next segment, and replaces the current one at the
    /// next safe point. Only clearing the goal reports `Canceled`.
    pub fn set_goal(&mut self, goal: Option<Goal>) {
        let mut plan = lock(&self.shared.plan);
        if plan.goal == goal {
            return;
        }
        let cause = if goal.is_some() {
            CancelCause::GoalChanged
        } else {
            CancelCause::Requested
        };
        plan.goal = goal;
        plan.at_goal = false;
        plan.recovering = false;
        plan.next = None;
        if let Some(handle) = &lock(&self.shared.calc).in_progress {
            handle.cancel();
        }
        if plan.current.is_some() {
            // A pending host cancel is still reported.
            self.pending_cancel = Some(match self.pending_cancel {
                Some(CancelCause::Requested) => CancelCause::Requested,
                _ => cause,
            });
        }
    }

    /// Set the goal and start the initial search right away. Returns false
    /// if no search was started: the agent is already in the goal, a path
    /// is executing, or a search is already running.
    pub fn set_goal_and_path(&mut self, goal: Goal, agent: &AgentState) -> bool {
        self.set_goal(Some(goal.clone()));
        let world = self.source.snapshot();
        let shared = Arc::clone(&self.shared);
        let mut plan = lock(&shared.plan);
        plan.expected_segment_start = path_start(agent, world.as_ref());
        if goal.is_in_goal(agent.feet) || goal.is_in_goal(plan.expected_segment_start) {
            return false;
        }
        if plan.current.is_some() {
            return false;
        }
        let mut calc = lock(&shared.calc);
        if calc.in_progress.is_some() {
            return false;
        }
        self.events.push(PathEvent::CalcStarted);
        let start = plan.expected_segment_start;
        self.dispatch(&mut calc, start, goal, None, false);
        true
    }

    /// Advance one simulation tick.
    pub fn tick(&mut self, agent: &AgentState) -> TickOutput {
        self.tick_count += 1;
        let tick = self.tick_count;
        let now = Instant::now();

        let interval = self.config.failure_cleanup_interval_ticks;
        if interval > 0 && tick % interval == 0 {
            let removed = self.failures.cleanup(now);
            if removed > 0 {
                debug!(removed, remaining = self.failures.len(), "purged expired failure records");
            }
        }

        let ctx = CalculationContext::new(self.source.snapshot(), Arc::clone(&self.config))
            .single_threaded();
        let intents = self.tick_path(agent, &ctx, now);
        lock(&self.shared.plan).ticks_elapsed += 1;

        let events = self.events.drain();
        for listener in &mut self.listeners {
            for event in &events {
                listener.on_event(tick, event);
            }
            listener.on_drained(tick, events.len());
        }
        TickOutput { intents, events }
    }

    fn tick_path(&mut self, agent: &AgentState, ctx: &CalculationContext, now: Instant) -> Intents {
        let shared = Arc::clone(&self.shared);
        let mut plan = lock(&shared.plan);
        plan.expected_segment_start = path_start(agent, ctx.world.as_ref());

        if let Some(cause) = self.pending_cancel
            && (plan.current.is_none() || self.safe_to_cancel)
        {
            self.pending_cancel = None;
            self.segment_cancel(&mut plan, cause);
        }

        {
            let calc = lock(&shared.calc);
            if let Some(handle) = &calc.in_progress
                && !search_still_relevant(handle, &plan, agent.feet)
            {
                debug!(start = %handle.start(), feet = %agent.feet, "cancelling stale search");
                handle.cancel();
            }
        }

        let Some(mut current) = plan.current.take() else {
            self.start_if_idle(&mut plan, agent);
            return Intents::new();
        };

        let out = current.tick(agent, ctx, &mut self.failures, now);
        self.safe_to_cancel = out.safe_to_cancel;
        match out.status {
            ExecutorStatus::Running => {}
            ExecutorStatus::Finished => return self.on_segment_end(&mut plan, agent, ctx, now, false),
            ExecutorStatus::Failed(failure) => {
                if failure.reason != FailureReason::Cancelled {
                    self.events.push(PathEvent::SegmentFailed {
                        at: failure.at,
                        kind: failure.kind,
                        reason: failure.reason,
                    });
                }
                return self.on_segment_end(&mut plan, agent, ctx, now, true);
            }
        }

        if out.safe_to_cancel
            && let Some(mut next) = plan.next.take()
        {
            if next.snap_to(agent, ctx.world.as_ref()) {
                debug!(feet = %agent.feet, "splicing into planned next path early");
                self.events.push(PathEvent::SplicingOntoNextEarly);
                return self.adopt(&mut plan, next, agent, ctx, now);
            }
            plan.next = Some(next);
        }

        if self.config.splice_path
            && let Some(spliced) = current.try_splice(plan.next.as_ref(), &self.config)
        {
            current = spliced;
        }
        if plan
            .next
            .as_ref()
            .is_some_and(|next| next.path().dest() == current.path().dest())
        {
            plan.next = None;
        }

        let mut calc = lock(&shared.calc);
        let dest = current.path().dest();
        let plan_ahead = calc.in_progress.is_none()
            && plan.next.is_none()
            && plan.goal.as_ref().is_some_and(|goal| !goal.is_in_goal(dest))
            && current.ticks_remaining(false) < f64::from(self.config.planning_tick_lookahead);
        if plan_ahead && let Some(goal) = plan.goal.clone() {
            debug!(%dest, "path almost over, planning ahead");
            self.events.push(PathEvent::NextSegmentCalcStarted);
            self.dispatch(&mut calc, dest, goal, Some(current.path().as_ref()), true);
        }
        drop(calc);

        plan.current = Some(current);
        out.intents
    }

    /// `current` just finished or failed and has already been taken out of
    /// the plan.
    fn on_segment_end(
        &mut self,
        plan: &mut Plan,
        agent: &AgentState,
        ctx: &CalculationContext,
        now: Instant,
        failed: bool,
    ) -> Intents {
        let Some(goal) = plan.goal.clone() else {
            plan.next = None;
            return Intents::new();
        };
        if goal.is_in_goal(agent.feet) {
            info!(%goal, feet = %agent.feet, "at goal");
            self.events.push(PathEvent::AtGoal);
            plan.at_goal = true;
            plan.recovering = false;
            plan.next = None;
            return Intents::new();
        }

        if plan.next.as_ref().is_some_and(|next| {
            !next.path().contains(agent.feet) && !next.path().contains(plan.expected_segment_start)
        }) {
            debug!(feet = %agent.feet, "discarding next path as it does not contain current position");
            self.events.push(PathEvent::DiscardNext);
            plan.next = None;
        }
        if let Some(next) = plan.next.take() {
            debug!("continuing on to planned next path");
            self.events.push(PathEvent::ContinuingOntoPlannedNext);
            return self.adopt(plan, next, agent, ctx, now);
        }

        plan.recovering = failed;
        let shared = Arc::clone(&self.shared);
        let mut calc = lock(&shared.calc);
        if calc.in_progress.is_some() {
            self.events.push(PathEvent::PathFinishedNextStillCalculating);
            return Intents::new();
        }
        self.events.push(PathEvent::CalcStarted);
        let start = plan.expected_segment_start;
        self.dispatch(&mut calc, start, goal, None, false);
        Intents::new()
    }

    /// Make `next` current and give it this tick.
    fn adopt(
        &mut self,
        plan: &mut Plan,
        mut next: PathExecutor,
        agent: &AgentState,
        ctx: &CalculationContext,
        now: Instant,
    ) -> Intents {
        let out = next.tick(agent, ctx, &mut self.failures, now);
        self.safe_to_cancel = out.safe_to_cancel;
        plan.current = Some(next);
        out.intents
    }

    /// No path is executing: note arrival, or start the initial search.
    fn start_if_idle(&mut self, plan: &mut Plan, agent: &AgentState) {
        let Some(goal) = plan.goal.clone() else {
            return;
        };
        if plan.at_goal {
            return;
        }
        if goal.is_in_goal(agent.feet) {
            info!(%goal, feet = %agent.feet, "at goal");
            self.events.push(PathEvent::AtGoal);
            plan.at_goal = true;
            return;
        }
        if goal.is_in_goal(plan.expected_segment_start) {
            return;
        }
        let shared = Arc::clone(&self.shared);
        let mut calc = lock(&shared.calc);
        if calc.in_progress.is_some() {
            return;
        }
        self.events.push(PathEvent::CalcStarted);
        let start = plan.expected_segment_start;
        self.dispatch(&mut calc, start, goal, None, false);
    }

    /// Start a search on the worker pool. Holding the calc lock is the
    /// caller's proof that nothing else is being dispatched.
    fn dispatch(
        &self,
        calc: &mut CalcSlot,
        start: BlockPos,
        goal: Goal,
        previous: Option<&Path>,
        plan_ahead: bool,
    ) {
        assert!(
            calc.in_progress.is_none(),
            "search dispatched while another is in progress"
        );
        let config = &self.config;
        let world = self.source.snapshot();
        let favoring = Favoring::new(previous, world.hostile_positions(), config);
        let ctx = CalculationContext::new(world, Arc::clone(config))
            .with_failures(self.failures.snapshot(Instant::now()))
            .with_favoring(favoring);
        assert!(
            ctx.is_safe_for_threaded_use(),
            "search context is not safe to hand to the worker"
        );
        let timeouts = if plan_ahead {
            Timeouts::from_millis(
                config.plan_ahead_primary_timeout_ms,
                config.plan_ahead_failure_timeout_ms,
            )
        } else {
            Timeouts::from_millis(config.primary_timeout_ms, config.failure_timeout_ms)
        };

        debug!(%start, %goal, plan_ahead, "dispatching search");
        let handle = Arc::new(SearchHandle::new(start, goal));
        calc.in_progress = Some(Arc::clone(&handle));
        let job = SearchJob {
            shared: Arc::clone(&self.shared),
            handle,
            ctx,
            provider: MovementProvider::from_config(config),
            timeouts,
            source: Arc::clone(&self.source),
            events: self.events.sender(),
        };
        self.pool.spawn(move || job.run());
    }

    /// Drop both segments and the in-flight search.
    fn segment_cancel(&mut self, plan: &mut Plan, cause: CancelCause) {
        match cause {
            CancelCause::Requested => self.events.push(PathEvent::Canceled),
            CancelCause::GoalChanged => debug!("dropping segment for the new goal"),
        }
        if let Some(handle) = &lock(&self.shared.calc).in_progress {
            handle.cancel();
        }
        plan.current = None;
        plan.next = None;
        plan.recovering = false;
        self.safe_to_cancel = true;
    }

    // -- Queries --

    pub fn has_path(&self) -> bool {
        lock(&self.shared.plan).current.is_some()
    }

    pub fn is_pathing(&self) -> bool {
        self.has_path() && self.pending_cancel.is_none()
    }

    /// Whether a search is running.
    pub fn is_calculating(&self) -> bool {
        lock(&self.shared.calc).in_progress.is_some()
    }

    pub fn current_path(&self) -> Option<Arc<Path>> {
        lock(&self.shared.plan)
            .current
            .as_ref()
            .map(|c| Arc::clone(c.path()))
    }

    pub fn next_path(&self) -> Option<Arc<Path>> {
        lock(&self.shared.plan)
            .next
            .as_ref()
            .map(|n| Arc::clone(n.path()))
    }

    pub fn in_progress_start(&self) -> Option<BlockPos> {
        lock(&self.shared.calc)
            .in_progress
            .as_ref()
            .map(|h| h.start())
    }

    pub fn best_path_so_far(&self) -> Option<Arc<Path>> {
        lock(&self.shared.calc)
            .in_progress
            .as_ref()
            .and_then(|h| h.best_path_so_far())
    }

    pub fn is_safe_to_cancel(&self) -> bool {
        !self.has_path() || self.safe_to_cancel
    }

    /// Ticks left in the current segment, if there is one.
    pub fn ticks_remaining_in_segment(&self, include_current: bool) -> Option<f64> {
        lock(&self.shared.plan)
            .current
            .as_ref()
            .map(|c| c.ticks_remaining(include_current))
    }

    /// Extrapolated ticks until the goal, from heuristic progress since the
    /// current segment was adopted.
    pub fn estimated_ticks_to_goal(&self, feet: BlockPos) -> Option<f64> {
        let mut plan = lock(&self.shared.plan);
        let goal = plan.goal.clone()?;
        let start = plan.start_position?;
        if goal.is_in_goal(feet) {
            plan.start_position = Some(feet);
            plan.ticks_elapsed = 0;
            return Some(0.0);
        }
        if plan.ticks_elapsed == 0 {
            return None;
        }
        let now = goal.heuristic(feet);
        let then = goal.heuristic(start);
        if now == then {
            return None;
        }
        Some((now - goal.baseline_heuristic()).abs() * plan.ticks_elapsed as f64 / (then - now).abs())
    }

    pub fn state(&self) -> PathingState {
        let plan = lock(&self.shared.plan);
        match (&plan.current, &plan.next) {
            (Some(_), Some(_)) => PathingState::ExecutingWithLookahead,
            (Some(_), None) => PathingState::Executing,
            (None, _) if plan.goal.is_none() => PathingState::Idle,
            (None, _) if plan.at_goal => PathingState::AtGoal,
            (None, _) if plan.recovering => PathingState::Recovering,
            (None, _) => PathingState::CalculatingInitial,
        }
    }

    /// Clear the goal and stop. The current segment is dropped now if the
    /// agent is safe to interrupt, otherwise at the next safe point.
    /// Returns whether it was dropped now.
    pub fn cancel_everything(&mut self) -> bool {
        let shared = Arc::clone(&self.shared);
        let mut plan = lock(&shared.plan);
        plan.goal = None;
        plan.at_goal = false;
        if let Some(handle) = &lock(&shared.calc).in_progress {
            handle.cancel();
        }
        if plan.current.is_none() || self.safe_to_cancel {
            self.pending_cancel = None;
            self.segment_cancel(&mut plan, CancelCause::Requested);
            true
        } else {
            self.pending_cancel = Some(CancelCause::Requested);
            false
        }
    }

    /// Drop everything immediately, even mid-movement. The agent may be
    /// left wherever the interrupted movement put it.
    pub fn force_cancel(&mut self) {
        let shared = Arc::clone(&self.shared);
        let mut plan = lock(&shared.plan);
        plan.goal = None;
        plan.at_goal = false;
        self.pending_cancel = None;
        self.segment_cancel(&mut plan, CancelCause::Requested);
        lock(&shared.calc).in_progress = None;
    }
}

impl Drop for PathingOrchestrator {
    fn drop(&mut self) {
        if let Some(handle) = &lock(&self.shared.calc).in_progress {
            handle.cancel();
        }
    }
}

/// Whether an in-flight search still starts somewhere useful.
fn search_still_relevant(handle: &SearchHandle, plan: &Plan, feet: BlockPos) -> bool {
    let from = handle.start();
    if plan
        .current
        .as_ref()
        .is_some_and(|c| c.path().dest() == from)
    {
        return true;
    }
    if from == feet || from == plan.expected_segment_start {
        return true;
    }
    handle
        .best_path_so_far()
        .is_some_and(|best| best.contains(feet) || best.contains(plan.expected_segment_start))
}

// A* search over movements, with dual timeouts and best-so-far segments.
//
// Nodes live in an arena (`Vec<Node>`) indexed by `usize`; a `FxHashMap`
// from packed position to arena index stands in for the closed set. There is
// no closed set proper: a node whose cost improves by more than
// `MIN_IMPROVEMENT` is pushed again and re-expanded. The open set is a
// `BinaryHeap` (min-heap via reversed ordering) with lazy deletion: entries
// whose recorded cost no longer matches their node are skipped on pop.
//
// Alongside the optimal search, the engine tracks for each coefficient in
// `COEFFICIENTS` the node minimizing `h + g / coefficient`. When the search
// stops without reaching the goal, the first of those nodes that is more
// than `MIN_DIST_PATH` blocks from the start becomes a partial segment.
//
// Two deadlines bound a search. Past the primary deadline it stops as soon
// as an adequate partial segment exists; past the failure deadline it stops
// unconditionally. The clock is read every `TIME_CHECK_INTERVAL` expansions.
// Cancellation is polled on every pop and wins over any partial result.
//
// See also: `provider.rs` (edges), `goal.rs` (heuristics), `path.rs`
// (result type), `orchestrator.rs` (runs searches on the worker pool).
//
// **Critical constraint: the worker never shares mutable state.** The only
// cross-thread data is the `SearchHandle`: two atomics and a mutex around
// the published best-so-far path.

use crate::context::CalculationContext;
use crate::goal::Goal;
use crate::movement::Movement;
use crate::path::Path;
use crate::provider::{Candidate, MovementProvider};
use crate::types::BlockPos;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Cost improvements at or below this are treated as noise.
pub const MIN_IMPROVEMENT: f64 = 0.01;

/// Weights for best-so-far tracking, from goal-greedy to nearly uniform.
pub const COEFFICIENTS: [f64; 7] = [1.5, 2.0, 2.5, 3.0, 4.0, 5.0, 10.0];

/// A partial segment must end more than this many blocks from the start.
pub const MIN_DIST_PATH: f64 = 5.0;

const TIME_CHECK_INTERVAL: usize = 64;

// ---------------------------------------------------------------------------
// Handle and outcome
// ---------------------------------------------------------------------------

/// Shared view of one in-flight search.
#[derive(Debug)]
pub struct SearchHandle {
    start: BlockPos,
    goal: Goal,
    cancelled: AtomicBool,
    finished: AtomicBool,
    best_so_far: Mutex<Option<Arc<Path>>>,
}

impl SearchHandle {
    pub fn new(start: BlockPos, goal: Goal) -> Self {
        Self {
            start,
            goal,
            cancelled: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            best_so_far: Mutex::new(None),
        }
    }

    pub fn start(&self) -> BlockPos {
        self.start
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    /// Ask the search to stop at its next expansion. Never blocks.
    pub fn cancel(&self) {
        self.cancelled.store(true, AtomicOrdering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(AtomicOrdering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(AtomicOrdering::Acquire)
    }

    /// The most recently published partial segment, if one reaches far
    /// enough from the start.
    pub fn best_path_so_far(&self) -> Option<Arc<Path>> {
        self.best_so_far
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// For callers that end a search abnormally, e.g. after a panic.
    pub(crate) fn mark_finished(&self) {
        self.finished.store(true, AtomicOrdering::Release);
    }

    fn publish(&self, path: Path) {
        *self
            .best_so_far
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(path));
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Timeouts {
    pub primary: Duration,
    pub failure: Duration,
}

impl Timeouts {
    pub fn from_millis(primary: u64, failure: u64) -> Self {
        Self {
            primary: Duration::from_millis(primary),
            failure: Duration::from_millis(failure.max(primary)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The path ends inside the goal.
    SuccessToGoal,
    /// The search stopped early; the path makes progress but does not
    /// reach the goal.
    SuccessSegment,
    /// No usable path.
    Failure,
    Cancellation,
    /// The search panicked. Produced by the worker wrapper, never by
    /// `search` itself.
    Exception,
}

#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub kind: OutcomeKind,
    pub path: Option<Path>,
    pub nodes_considered: usize,
    pub elapsed: Duration,
}

impl SearchOutcome {
    pub fn exception(elapsed: Duration) -> Self {
        Self {
            kind: OutcomeKind::Exception,
            path: None,
            nodes_considered: 0,
            elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.kind,
            OutcomeKind::SuccessToGoal | OutcomeKind::SuccessSegment
        )
    }
}

// ---------------------------------------------------------------------------
// Arena and open set
// ---------------------------------------------------------------------------

struct Node {
    pos: BlockPos,
    /// Best known cost from the start.
    cost: f64,
    /// Heuristic to the goal, computed once.
    estimate: f64,
    parent: Option<usize>,
    /// Movement from `parent` into this node.
    via: Option<Movement>,
}

/// Entry in the open set (min-heap via reversed ordering).
struct OpenEntry {
    node: usize,
    priority: f64,
    /// The node's cost when pushed; stale if the node has since improved.
    cost: f64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority.total_cmp(&other.priority) == Ordering::Equal && self.node == other.node
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest priority is "greatest".
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Walk parent links from `end` back to the start.
fn reconstruct(nodes: &[Node], end: usize, nodes_considered: usize) -> Path {
    let mut movements = Vec::new();
    let mut cursor = end;
    while let Some(parent) = nodes[cursor].parent {
        if let Some(movement) = &nodes[cursor].via {
            movements.push(movement.clone());
        }
        cursor = parent;
    }
    movements.reverse();
    Path::from_parts(nodes[cursor].pos, movements, nodes_considered)
}

/// The first best-so-far node, in coefficient order, far enough from the
/// start to be worth executing.
fn best_segment_end(nodes: &[Node], best: &[usize; COEFFICIENTS.len()], start: BlockPos) -> Option<usize> {
    best.iter()
        .copied()
        .find(|&i| nodes[i].pos.distance_sq(start) > MIN_DIST_PATH * MIN_DIST_PATH)
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Run one search to completion on the calling thread.
///
/// Panics if a movement reports a non-positive or NaN cost; the worker
/// wrapper turns that into an `Exception` outcome.
pub fn search(
    handle: &SearchHandle,
    ctx: &CalculationContext,
    provider: &MovementProvider,
    timeouts: Timeouts,
) -> SearchOutcome {
    let started = Instant::now();
    let primary_deadline = started + timeouts.primary;
    let failure_deadline = started + timeouts.failure;
    let config = &ctx.config;
    let goal = &handle.goal;
    let start = handle.start;
    let weight = config.heuristic_weight;
    let min_improvement = if config.minimum_improvement_repropagation {
        MIN_IMPROVEMENT
    } else {
        0.0
    };
    let border_limit = config.pathing_max_chunk_border_fetch as usize;

    let start_estimate = goal.heuristic(start);
    let mut nodes = vec![Node {
        pos: start,
        cost: 0.0,
        estimate: start_estimate,
        parent: None,
        via: None,
    }];
    let mut index: FxHashMap<u64, usize> = FxHashMap::default();
    index.insert(start.pack(), 0);
    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        node: 0,
        priority: weight * start_estimate,
        cost: 0.0,
    });

    let mut best = [0usize; COEFFICIENTS.len()];
    let mut best_score = [start_estimate; COEFFICIENTS.len()];
    // Still no partial segment long enough to stop at the primary deadline.
    let mut failing = true;
    let mut published = None;
    let mut nodes_considered = 0usize;
    let mut border_hits = 0usize;
    let mut candidates: Vec<Candidate> = Vec::new();

    while let Some(entry) = open.pop() {
        if handle.is_cancelled() {
            break;
        }
        if nodes_considered % TIME_CHECK_INTERVAL == 0 {
            let now = Instant::now();
            if now >= failure_deadline || (!failing && now >= primary_deadline) {
                break;
            }
            if let Some(end) = best_segment_end(&nodes, &best, start)
                && published != Some(end)
            {
                handle.publish(reconstruct(&nodes, end, nodes_considered));
                published = Some(end);
            }
        }

        let (pos, g) = {
            let node = &nodes[entry.node];
            if entry.cost > node.cost {
                continue;
            }
            (node.pos, node.cost)
        };
        nodes_considered += 1;

        if goal.is_in_goal(pos) {
            let path = reconstruct(&nodes, entry.node, nodes_considered);
            return finish(handle, OutcomeKind::SuccessToGoal, Some(path), nodes_considered, started);
        }

        candidates.clear();
        border_hits += provider.candidates(ctx, pos, &mut candidates);
        if border_hits > border_limit {
            debug!(%start, border_hits, "search stopped at chunk border fetch limit");
            break;
        }

        for Candidate { movement, cost } in candidates.drain(..) {
            let dest = movement.dest;
            let cost = cost * ctx.favoring.multiplier(dest);
            assert!(
                cost > 0.0 && !cost.is_nan(),
                "movement {movement} has non-positive cost {cost}"
            );
            let tentative = g + cost;

            let idx = match index.get(&dest.pack()) {
                Some(&i) => {
                    if nodes[i].cost - tentative <= min_improvement {
                        continue;
                    }
                    i
                }
                None => {
                    nodes.push(Node {
                        pos: dest,
                        cost: f64::INFINITY,
                        estimate: goal.heuristic(dest),
                        parent: None,
                        via: None,
                    });
                    index.insert(dest.pack(), nodes.len() - 1);
                    nodes.len() - 1
                }
            };

            let node = &mut nodes[idx];
            node.cost = tentative;
            node.parent = Some(entry.node);
            node.via = Some(movement);
            let estimate = node.estimate;
            open.push(OpenEntry {
                node: idx,
                priority: tentative + weight * estimate,
                cost: tentative,
            });

            for (i, coefficient) in COEFFICIENTS.iter().enumerate() {
                let score = estimate + tentative / coefficient;
                if best_score[i] - score > min_improvement {
                    best_score[i] = score;
                    best[i] = idx;
                    if failing && dest.distance_sq(start) > MIN_DIST_PATH * MIN_DIST_PATH {
                        failing = false;
                    }
                }
            }
        }

        if nodes.len() >= config.max_nodes {
            debug!(%start, nodes = nodes.len(), "search stopped at node limit");
            break;
        }
    }

    if handle.is_cancelled() {
        return finish(handle, OutcomeKind::Cancellation, None, nodes_considered, started);
    }
    match best_segment_end(&nodes, &best, start) {
        Some(end) => {
            let path = reconstruct(&nodes, end, nodes_considered);
            finish(handle, OutcomeKind::SuccessSegment, Some(path), nodes_considered, started)
        }
        None => finish(handle, OutcomeKind::Failure, None, nodes_considered, started),
    }
}

fn finish(
    handle: &SearchHandle,
    kind: OutcomeKind,
    path: Option<Path>,
    nodes_considered: usize,
    started: Instant,
) -> SearchOutcome {
    let elapsed = started.elapsed();
    if let Some(path) = &path {
        handle.publish(path.clone());
    }
    handle.mark_finished();
    debug!(
        start = %handle.start,
        goal = %handle.goal,
        ?kind,
        nodes_considered,
        elapsed_ms = elapsed.as_millis() as u64,
        "search finished"
    );
    SearchOutcome {
        kind,
        path,
        nodes_considered,
        elapsed,
    }
}

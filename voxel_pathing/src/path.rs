// Paths: contiguous, immutable movement sequences.
//
// A `Path` owns its movements plus the derived vertex list `positions`
// (the source followed by every movement's destination). Every constructor
// guarantees `movements[i].dest == movements[i + 1].src`; public callers go
// through `Path::new`, which checks it and returns `PathingError` on a gap,
// while the search's reconstruction (contiguous by construction) uses a
// debug-checked internal constructor.
//
// Operations never mutate a path in place. Cutoffs, splices and history
// trimming each return a new `Path`.
//
// See also: `pathfinding.rs` (produces paths), `executor.rs` (consumes
// them), `orchestrator.rs` (post-processing and splicing).
//
// **Critical constraint: contiguity.** Everything downstream indexes
// `positions` and `movements` in lockstep; `positions.len()` is always
// `movements.len() + 1`.

use crate::error::{PathingError, PathingResult};
use crate::goal::Goal;
use crate::movement::Movement;
use crate::types::BlockPos;
use crate::world::WorldView;
use rustc_hash::FxHashSet;

#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    src: BlockPos,
    movements: Vec<Movement>,
    positions: Vec<BlockPos>,
    nodes_considered: usize,
}

impl Path {
    /// Build a path from `src`, checking that the movements chain up.
    pub fn new(src: BlockPos, movements: Vec<Movement>) -> PathingResult<Self> {
        if let Some(first) = movements.first()
            && first.src != src
        {
            return Err(PathingError::WrongSource {
                expected: src,
                actual: first.src,
            });
        }
        for (index, pair) in movements.windows(2).enumerate() {
            if pair[0].dest != pair[1].src {
                return Err(PathingError::Discontiguous {
                    index,
                    end: pair[0].dest,
                    start: pair[1].src,
                });
            }
        }
        Ok(Self::from_parts(src, movements, 0))
    }

    /// Used by the search, whose parent links are contiguous by construction.
    pub(crate) fn from_parts(src: BlockPos, movements: Vec<Movement>, nodes_considered: usize) -> Self {
        debug_assert!(movements.first().is_none_or(|m| m.src == src));
        debug_assert!(movements.windows(2).all(|w| w[0].dest == w[1].src));
        let mut positions = Vec::with_capacity(movements.len() + 1);
        positions.push(src);
        positions.extend(movements.iter().map(|m| m.dest));
        Self {
            src,
            movements,
            positions,
            nodes_considered,
        }
    }

    /// A path that is already at its destination.
    pub fn trivial(pos: BlockPos) -> Self {
        Self::from_parts(pos, Vec::new(), 0)
    }

    pub fn src(&self) -> BlockPos {
        self.src
    }

    pub fn dest(&self) -> BlockPos {
        *self.positions.last().unwrap_or(&self.src)
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn positions(&self) -> &[BlockPos] {
        &self.positions
    }

    /// Number of movements.
    pub fn len(&self) -> usize {
        self.movements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    /// Nodes the search expanded to produce this path (diagnostic).
    pub fn nodes_considered(&self) -> usize {
        self.nodes_considered
    }

    pub fn total_cost(&self) -> f64 {
        self.movements.iter().map(|m| m.cost).sum()
    }

    /// Estimated ticks for movements `index..`.
    pub fn ticks_remaining_from(&self, index: usize) -> f64 {
        self.movements
            .get(index..)
            .map(|rest| rest.iter().map(|m| m.cost).sum())
            .unwrap_or(0.0)
    }

    /// Index of the first occurrence of `pos` in `positions`.
    pub fn index_of(&self, pos: BlockPos) -> Option<usize> {
        self.positions.iter().position(|&p| p == pos)
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.positions.contains(&pos)
    }

    /// Positions `first..=last` and the movements between them.
    fn slice(&self, first: usize, last: usize) -> Self {
        debug_assert!(first <= last && last < self.positions.len());
        Self::from_parts(
            self.positions[first],
            self.movements[first..last].to_vec(),
            self.nodes_considered,
        )
    }

    /// Truncate at the first position whose chunk is not loaded (that
    /// position is kept as the new destination).
    pub fn cutoff_at_loaded_chunks(&self, world: &dyn WorldView) -> Self {
        match self
            .positions
            .iter()
            .position(|p| !world.chunk_loaded(p.x, p.z))
        {
            Some(i) => self.slice(0, i),
            None => self.clone(),
        }
    }

    /// Drop the tail of a long segment that does not reach `goal`: its end
    /// was planned with the least information and is the most likely to
    /// change.
    pub fn static_cutoff(&self, goal: &Goal, minimum_length: usize, factor: f64) -> Self {
        let length = self.positions.len();
        if length < minimum_length.max(1) || goal.is_in_goal(self.dest()) {
            return self.clone();
        }
        let kept = ((length - minimum_length) as f64 * factor) as usize + minimum_length;
        let last = kept.saturating_sub(1).min(length - 1);
        self.slice(0, last)
    }

    /// Join `next` onto the end of this path. Requires `self.dest() ==
    /// next.src()`. If the two overlap anywhere besides that joint, the
    /// loop is cut out when `allow_overlap_cutoff` is set and the splice is
    /// refused otherwise.
    pub fn splice(&self, next: &Path, allow_overlap_cutoff: bool) -> Option<Self> {
        if self.dest() != next.src() {
            return None;
        }
        let in_next: FxHashSet<BlockPos> = next.positions.iter().copied().collect();
        let overlap = self.positions[..self.positions.len() - 1]
            .iter()
            .position(|p| in_next.contains(p));
        let join = match overlap {
            Some(_) if !allow_overlap_cutoff => return None,
            Some(i) => i,
            None => self.positions.len() - 1,
        };
        let join_in_next = next.index_of(self.positions[join])?;

        let mut movements = Vec::with_capacity(join + next.len() - join_in_next);
        movements.extend_from_slice(&self.movements[..join]);
        movements.extend_from_slice(&next.movements[join_in_next..]);
        Some(Self::from_parts(
            self.src,
            movements,
            self.nodes_considered + next.nodes_considered,
        ))
    }

    /// Forget the first `amount` movements.
    pub fn cut_history(&self, amount: usize) -> Self {
        let first = amount.min(self.movements.len());
        self.slice(first, self.positions.len() - 1)
    }
}

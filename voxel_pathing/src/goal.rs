// Navigation goals.
//
// A `Goal` is a predicate over feet positions (`is_in_goal`) paired with an
// estimate of the remaining cost to satisfy it (`heuristic`), expressed in the
// same tick units as movement costs. The search is only optimal when the
// estimate never exceeds the true cost, so every heuristic here is built from
// per-block lower bounds:
//
// - Horizontal: octile distance (straight + sqrt(2) * diagonal) times
//   `COST_HEURISTIC`, which sits just below the cost of sprinting one block.
// - Upward: one jump per block.
// - Downward: a quarter of a four-block fall per block. Fall cost per block
//   shrinks as falls get longer, so this bound only holds for falls of up to
//   `MAX_ADMISSIBLE_FALL` blocks. Config validation caps
//   `max_fall_height_no_water` there.
//
// A teleport covers up to `teleport_max_distance` blocks for a flat cost, so
// config validation also requires that cost to be at least the horizontal
// estimate for its longest hop.
//
// `heuristic()` without a position is the goal's own baseline, used only to
// turn raw estimates into ETA ratios. It is 0 for ordinary goals, negated for
// `Inverted`, and the member minimum for `Composite`.
//
// See also: `pathfinding.rs` (consumer), `costs.rs` (the constants these
// bounds are derived from), `orchestrator.rs` (ETA calculation).
//
// **Critical constraint: admissibility.** A heuristic that overestimates
// silently breaks path optimality. The property tests in
// `tests/search_properties.rs` compare these bounds against exhaustive search.

use crate::costs::{fall_n_blocks_cost, jump_one_block_cost};
use crate::types::BlockPos;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-block horizontal lower bound, slightly below `SPRINT_ONE_BLOCK_COST`.
pub const COST_HEURISTIC: f64 = 3.563;

/// A target region for navigation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
    /// Feet exactly at the block.
    Block(BlockPos),
    /// Feet within `range` blocks (euclidean) of `pos`.
    Near { pos: BlockPos, range: i32 },
    /// Adjacent to the block, close enough to interact with it.
    GetToBlock(BlockPos),
    /// Feet or head at the block.
    TwoBlocks(BlockPos),
    /// Any y in the given column.
    Xz { x: i32, z: i32 },
    /// Any position at this feet y-level.
    YLevel(i32),
    /// On an axis-aligned or 45-degree line through the x/z origin, at `y`.
    Axis { y: i32 },
    /// At least `distance` blocks (horizontal) from every position in
    /// `from`, optionally also at feet level `maintain_y`.
    RunAway {
        from: Vec<BlockPos>,
        distance: i32,
        maintain_y: Option<i32>,
    },
    /// Never satisfied; the search drifts toward increasing the inner goal's
    /// estimate.
    Inverted(Box<Goal>),
    /// Satisfied by any member.
    Composite(Vec<Goal>),
}

/// Longest fall the downward estimate is a lower bound for.
pub const MAX_ADMISSIBLE_FALL: u32 = 4;

/// Octile horizontal estimate for offsets `(dx, dz)`.
pub fn xz_heuristic(dx: i32, dz: i32) -> f64 {
    let x = f64::from(dx.unsigned_abs());
    let z = f64::from(dz.unsigned_abs());
    let (straight, diagonal) = if x < z { (z - x, x) } else { (x - z, z) };
    (straight + diagonal * std::f64::consts::SQRT_2) * COST_HEURISTIC
}

/// Vertical estimate for needing to climb `up` blocks (negative = descend).
pub fn y_heuristic(up: i32) -> f64 {
    if up > 0 {
        f64::from(up) * jump_one_block_cost()
    } else if up < 0 {
        let n = MAX_ADMISSIBLE_FALL;
        f64::from(-up) * fall_n_blocks_cost(n as usize) / f64::from(n)
    } else {
        0.0
    }
}

/// Shrink `diff` toward zero by `by`, never crossing zero.
fn shrink(diff: i32, by: i32) -> i32 {
    if diff > by {
        diff - by
    } else if diff < -by {
        diff + by
    } else {
        0
    }
}

impl Goal {
    pub fn is_in_goal(&self, pos: BlockPos) -> bool {
        match self {
            Goal::Block(goal) => pos == *goal,
            Goal::Near { pos: center, range } => {
                pos.distance_sq(*center) <= f64::from(*range) * f64::from(*range)
            }
            Goal::GetToBlock(goal) => {
                let mut dy = pos.y - goal.y;
                if dy < 0 {
                    dy += 1;
                }
                (pos.x - goal.x).abs() + dy.abs() + (pos.z - goal.z).abs() <= 1
            }
            Goal::TwoBlocks(goal) => pos == *goal || pos == goal.down(),
            Goal::Xz { x, z } => pos.x == *x && pos.z == *z,
            Goal::YLevel(y) => pos.y == *y,
            Goal::Axis { y } => {
                pos.y == *y && (pos.x == 0 || pos.z == 0 || pos.x.abs() == pos.z.abs())
            }
            Goal::RunAway {
                from,
                distance,
                maintain_y,
            } => {
                if maintain_y.is_some_and(|y| y != pos.y) {
                    return false;
                }
                let min_sq = i64::from(*distance) * i64::from(*distance);
                from.iter().all(|f| {
                    let dx = i64::from(pos.x - f.x);
                    let dz = i64::from(pos.z - f.z);
                    dx * dx + dz * dz >= min_sq
                })
            }
            Goal::Inverted(_) => false,
            Goal::Composite(goals) => goals.iter().any(|g| g.is_in_goal(pos)),
        }
    }

    /// Estimated cost from `pos` to the goal, in ticks.
    pub fn heuristic(&self, pos: BlockPos) -> f64 {
        match self {
            Goal::Block(goal) => {
                xz_heuristic(goal.x - pos.x, goal.z - pos.z) + y_heuristic(goal.y - pos.y)
            }
            Goal::Near { pos: center, range } => {
                xz_heuristic(
                    shrink(center.x - pos.x, *range),
                    shrink(center.z - pos.z, *range),
                ) + y_heuristic(shrink(center.y - pos.y, *range))
            }
            Goal::GetToBlock(goal) => {
                // Feet may end up to two blocks below the block (head level
                // with it) or one above (standing on it).
                let up = goal.y - pos.y;
                let up = if up > 2 {
                    up - 2
                } else if up < -1 {
                    up + 1
                } else {
                    0
                };
                xz_heuristic(shrink(goal.x - pos.x, 1), shrink(goal.z - pos.z, 1)) + y_heuristic(up)
            }
            Goal::TwoBlocks(goal) => {
                let up = goal.y - pos.y;
                let up = if up > 0 { up - 1 } else { up };
                xz_heuristic(goal.x - pos.x, goal.z - pos.z) + y_heuristic(up)
            }
            Goal::Xz { x, z } => xz_heuristic(x - pos.x, z - pos.z),
            Goal::YLevel(y) => y_heuristic(y - pos.y),
            Goal::Axis { y } => {
                let x = pos.x.unsigned_abs();
                let z = pos.z.unsigned_abs();
                let diff = f64::from(x.max(z) - x.min(z));
                let flat = f64::from(x)
                    .min(f64::from(z))
                    .min(diff * std::f64::consts::FRAC_1_SQRT_2);
                flat * COST_HEURISTIC + y_heuristic(y - pos.y)
            }
            Goal::RunAway {
                from, maintain_y, ..
            } => {
                let nearest = from
                    .iter()
                    .map(|f| xz_heuristic(f.x - pos.x, f.z - pos.z))
                    .fold(f64::INFINITY, f64::min);
                let nearest = if nearest.is_finite() { nearest } else { 0.0 };
                match maintain_y {
                    Some(y) => -nearest * 0.6 + y_heuristic(y - pos.y) * 1.5,
                    None => -nearest,
                }
            }
            Goal::Inverted(inner) => -inner.heuristic(pos),
            Goal::Composite(goals) => goals
                .iter()
                .map(|g| g.heuristic(pos))
                .fold(f64::INFINITY, f64::min)
                .min(f64::MAX),
        }
    }

    /// The estimate at the goal's own reference point. Only meaningful as an
    /// ETA baseline.
    pub fn baseline_heuristic(&self) -> f64 {
        match self {
            Goal::RunAway {
                distance,
                maintain_y,
                ..
            } => {
                let far = -xz_heuristic(*distance, 0);
                if maintain_y.is_some() { far * 0.6 } else { far }
            }
            Goal::Inverted(inner) => -inner.baseline_heuristic(),
            Goal::Composite(goals) if !goals.is_empty() => goals
                .iter()
                .map(Goal::baseline_heuristic)
                .fold(f64::INFINITY, f64::min),
            _ => 0.0,
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Block(p) => write!(f, "Block{p}"),
            Goal::Near { pos, range } => write!(f, "Near{pos} within {range}"),
            Goal::GetToBlock(p) => write!(f, "GetToBlock{p}"),
            Goal::TwoBlocks(p) => write!(f, "TwoBlocks{p}"),
            Goal::Xz { x, z } => write!(f, "Xz({x}, {z})"),
            Goal::YLevel(y) => write!(f, "YLevel({y})"),
            Goal::Axis { y } => write!(f, "Axis(y = {y})"),
            Goal::RunAway { from, distance, .. } => {
                write!(f, "RunAway({distance} from {} positions)", from.len())
            }
            Goal::Inverted(inner) => write!(f, "Inverted({inner})"),
            Goal::Composite(goals) => write!(f, "Composite({} goals)", goals.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costs::{SPRINT_ONE_BLOCK_COST, WALK_ONE_BLOCK_COST};

    fn p(x: i32, y: i32, z: i32) -> BlockPos {
        BlockPos::new(x, y, z)
    }

    #[test]
    fn block_goal_is_zero_at_target() {
        let goal = Goal::Block(p(3, 0, 0));
        assert!(goal.is_in_goal(p(3, 0, 0)));
        assert!(!goal.is_in_goal(p(3, 1, 0)));
        assert_eq!(goal.heuristic(p(3, 0, 0)), 0.0);
    }

    #[test]
    fn horizontal_estimate_is_below_walking_and_sprinting() {
        let goal = Goal::Block(p(3, 0, 0));
        let h = goal.heuristic(p(0, 0, 0));
        assert!(h <= 3.0 * SPRINT_ONE_BLOCK_COST);
        assert!(h < 3.0 * WALK_ONE_BLOCK_COST);
        assert!((h - 3.0 * COST_HEURISTIC).abs() < 1e-9);
    }

    #[test]
    fn diagonal_estimate_uses_octile_distance() {
        let h = xz_heuristic(2, 2);
        let expected = 2.0 * std::f64::consts::SQRT_2 * COST_HEURISTIC;
        assert!((h - expected).abs() < 1e-9);
        assert!(xz_heuristic(5, 2) > xz_heuristic(5, 0));
    }

    #[test]
    fn vertical_estimates_are_cheaper_than_their_movements() {
        assert!(y_heuristic(1) <= jump_one_block_cost());
        for n in 1..=MAX_ADMISSIBLE_FALL as i32 {
            assert!(y_heuristic(-n) <= fall_n_blocks_cost(n as usize) + 1e-9, "n = {n}");
        }
        // Well past the cap the per-block bound no longer holds.
        let n = MAX_ADMISSIBLE_FALL as i32 + 4;
        assert!(y_heuristic(-n) > fall_n_blocks_cost(n as usize));
    }

    #[test]
    fn near_goal_is_zero_inside_range() {
        let goal = Goal::Near {
            pos: p(10, 5, 10),
            range: 2,
        };
        assert!(goal.is_in_goal(p(11, 5, 11)));
        assert!(!goal.is_in_goal(p(13, 5, 10)));
        assert_eq!(goal.heuristic(p(12, 5, 10)), 0.0);
        assert!(goal.heuristic(p(20, 5, 10)) > 0.0);
    }

    #[test]
    fn get_to_block_accepts_adjacent_and_below() {
        let goal = Goal::GetToBlock(p(5, 5, 5));
        assert!(goal.is_in_goal(p(6, 5, 5)));
        assert!(goal.is_in_goal(p(5, 4, 5)));
        assert!(goal.is_in_goal(p(5, 3, 5)));
        assert!(goal.is_in_goal(p(5, 6, 5)));
        assert!(!goal.is_in_goal(p(7, 5, 5)));
        for pos in [p(6, 5, 5), p(5, 4, 5), p(5, 3, 5), p(5, 6, 5), p(4, 4, 5)] {
            if goal.is_in_goal(pos) {
                assert_eq!(goal.heuristic(pos), 0.0, "pos {pos}");
            }
        }
    }

    #[test]
    fn two_blocks_accepts_feet_or_head() {
        let goal = Goal::TwoBlocks(p(0, 5, 0));
        assert!(goal.is_in_goal(p(0, 5, 0)));
        assert!(goal.is_in_goal(p(0, 4, 0)));
        assert!(!goal.is_in_goal(p(0, 3, 0)));
        assert_eq!(goal.heuristic(p(0, 4, 0)), 0.0);
    }

    #[test]
    fn xz_and_y_level_goals_ignore_other_axes() {
        let xz = Goal::Xz { x: 4, z: -2 };
        assert!(xz.is_in_goal(p(4, 100, -2)));
        assert_eq!(xz.heuristic(p(4, 0, -2)), 0.0);

        let y = Goal::YLevel(7);
        assert!(y.is_in_goal(p(-50, 7, 99)));
        assert!(y.heuristic(p(0, 3, 0)) > 0.0);
        assert!(y.heuristic(p(0, 9, 0)) > 0.0);
    }

    #[test]
    fn axis_goal_accepts_axes_and_diagonals() {
        let goal = Goal::Axis { y: 10 };
        assert!(goal.is_in_goal(p(0, 10, 55)));
        assert!(goal.is_in_goal(p(-8, 10, 0)));
        assert!(goal.is_in_goal(p(6, 10, -6)));
        assert!(!goal.is_in_goal(p(6, 10, 5)));
        assert!(!goal.is_in_goal(p(0, 11, 0)));
        assert_eq!(goal.heuristic(p(6, 10, -6)), 0.0);
        assert!(goal.heuristic(p(10, 10, 4)) > 0.0);
    }

    #[test]
    fn run_away_prefers_distance() {
        let goal = Goal::RunAway {
            from: vec![p(0, 0, 0)],
            distance: 10,
            maintain_y: None,
        };
        assert!(!goal.is_in_goal(p(5, 0, 0)));
        assert!(goal.is_in_goal(p(10, 0, 0)));
        assert!(goal.heuristic(p(8, 0, 0)) < goal.heuristic(p(2, 0, 0)));
        assert!(goal.baseline_heuristic() < 0.0);
    }

    #[test]
    fn run_away_with_maintained_level() {
        let goal = Goal::RunAway {
            from: vec![p(0, 0, 0)],
            distance: 3,
            maintain_y: Some(0),
        };
        assert!(goal.is_in_goal(p(5, 0, 0)));
        assert!(!goal.is_in_goal(p(5, 1, 0)));
    }

    #[test]
    fn inverted_negates_and_never_satisfies() {
        let inner = Goal::Block(p(5, 0, 0));
        let goal = Goal::Inverted(Box::new(inner.clone()));
        assert!(!goal.is_in_goal(p(5, 0, 0)));
        assert_eq!(goal.heuristic(p(0, 0, 0)), -inner.heuristic(p(0, 0, 0)));
    }

    #[test]
    fn composite_is_union_with_min_heuristic() {
        let a = Goal::Block(p(10, 0, 0));
        let b = Goal::Block(p(-3, 0, 0));
        let goal = Goal::Composite(vec![a.clone(), b.clone()]);
        assert!(goal.is_in_goal(p(-3, 0, 0)));
        assert!(goal.is_in_goal(p(10, 0, 0)));
        let origin = p(0, 0, 0);
        assert_eq!(goal.heuristic(origin), b.heuristic(origin));
        assert!(goal.heuristic(origin) < a.heuristic(origin));
    }

    #[test]
    fn empty_composite_is_never_satisfied() {
        let goal = Goal::Composite(Vec::new());
        assert!(!goal.is_in_goal(p(0, 0, 0)));
        assert!(goal.heuristic(p(0, 0, 0)).is_finite());
        assert_eq!(goal.baseline_heuristic(), 0.0);
    }
}

// Action costs, in simulation ticks.
//
// Every movement cost and every goal heuristic is expressed in ticks so the
// search's `g` values double as time estimates (used for lookahead planning
// and ETA reporting). The walking and sprinting constants come from the
// agent's top speeds; the falling costs come from integrating the agent's
// per-tick falling velocity (`v(t) = 3.92 * (1 - 0.98^t)` blocks per tick).
//
// See also: `moves.rs` which combines these into per-movement costs,
// `goal.rs` whose heuristics must stay below them to remain admissible.

use std::sync::LazyLock;

/// Sentinel cost for "cannot be done". Anything at or above this is dropped
/// from the candidate set rather than merely penalized.
pub const COST_INF: f64 = 1_000_000.0;

/// Walking one block on flat ground (4.317 blocks/second at 20 ticks/second).
pub const WALK_ONE_BLOCK_COST: f64 = 20.0 / 4.317;

/// Moving one block through water (2.2 blocks/second).
pub const WALK_ONE_IN_WATER_COST: f64 = 20.0 / 2.2;

/// Sneaking one block (1.3 blocks/second).
pub const SNEAK_ONE_BLOCK_COST: f64 = 20.0 / 1.3;

/// Sprinting one block (5.612 blocks/second).
pub const SPRINT_ONE_BLOCK_COST: f64 = 20.0 / 5.612;

pub const SPRINT_MULTIPLIER: f64 = SPRINT_ONE_BLOCK_COST / WALK_ONE_BLOCK_COST;

/// Walking off the edge of a block; the agent starts falling before it
/// reaches the center of the next column.
pub const WALK_OFF_BLOCK_COST: f64 = WALK_ONE_BLOCK_COST * 0.8;

/// Re-centering after landing from a fall.
pub const CENTER_AFTER_FALL_COST: f64 = WALK_ONE_BLOCK_COST - WALK_OFF_BLOCK_COST;

/// Number of entries in the fall table; falls further than this are never
/// generated.
pub const MAX_TABULATED_FALL: usize = 256;

static FALL_N_BLOCKS_COST: LazyLock<[f64; MAX_TABULATED_FALL + 1]> = LazyLock::new(|| {
    let mut table = [0.0; MAX_TABULATED_FALL + 1];
    for (n, slot) in table.iter_mut().enumerate() {
        *slot = distance_to_ticks(n as f64);
    }
    table
});

static JUMP_ONE_BLOCK_COST: LazyLock<f64> =
    LazyLock::new(|| distance_to_ticks(1.25) - distance_to_ticks(0.25));

/// Ticks to fall `n` whole blocks. Clamps at the table end.
pub fn fall_n_blocks_cost(n: usize) -> f64 {
    FALL_N_BLOCKS_COST[n.min(MAX_TABULATED_FALL)]
}

/// Ticks spent in the air to clear one block of height: rising 1.25 blocks
/// and falling the last 0.25 back onto the step.
pub fn jump_one_block_cost() -> f64 {
    *JUMP_ONE_BLOCK_COST
}

/// Downward velocity (blocks/tick) after `ticks` ticks of free fall.
fn velocity(ticks: u32) -> f64 {
    (0.98f64.powi(ticks as i32) - 1.0) * -3.92
}

/// Ticks needed to fall `distance` blocks from rest, with linear
/// interpolation inside the final tick.
pub fn distance_to_ticks(distance: f64) -> f64 {
    if distance <= 0.0 {
        return 0.0;
    }
    let mut remaining = distance;
    let mut ticks = 0u32;
    loop {
        let fall = velocity(ticks);
        if remaining <= fall {
            return f64::from(ticks) + remaining / fall;
        }
        remaining -= fall;
        ticks += 1;
    }
}

/// Cost of a parkour jump covering `distance` blocks horizontally (2 = one
/// block gap). Longer jumps need a sprint.
pub fn parkour_cost(distance: i32) -> f64 {
    match distance {
        2 => WALK_ONE_BLOCK_COST * 2.0,
        3 => WALK_ONE_BLOCK_COST * 3.0,
        4 => SPRINT_ONE_BLOCK_COST * 4.0,
        _ => COST_INF,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falling_zero_blocks_is_free() {
        assert_eq!(distance_to_ticks(0.0), 0.0);
        assert_eq!(fall_n_blocks_cost(0), 0.0);
    }

    #[test]
    fn fall_costs_increase_with_height_but_per_block_cost_falls() {
        for n in 1..20 {
            assert!(fall_n_blocks_cost(n + 1) > fall_n_blocks_cost(n));
            let per_block = fall_n_blocks_cost(n) / n as f64;
            let next_per_block = fall_n_blocks_cost(n + 1) / (n + 1) as f64;
            assert!(next_per_block < per_block, "n = {n}");
        }
    }

    #[test]
    fn known_fall_values() {
        // Integrated free fall: one block takes a little over 5.6 ticks.
        assert!((fall_n_blocks_cost(1) - 5.615).abs() < 0.01);
        assert!((fall_n_blocks_cost(2) - 7.788).abs() < 0.01);
    }

    #[test]
    fn jump_cost_is_positive_and_below_walking_a_block() {
        let jump = jump_one_block_cost();
        assert!(jump > 3.0 && jump < WALK_ONE_BLOCK_COST, "jump = {jump}");
    }

    #[test]
    fn sprinting_is_cheaper_than_walking() {
        assert!(SPRINT_ONE_BLOCK_COST < WALK_ONE_BLOCK_COST);
        assert!(SPRINT_MULTIPLIER < 1.0);
        assert!(parkour_cost(4) < WALK_ONE_BLOCK_COST * 4.0);
        assert_eq!(parkour_cost(5), COST_INF);
    }
}

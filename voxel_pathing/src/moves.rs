// Per-kind movement cost evaluation.
//
// `evaluate(ctx, kind, src, dest)` decides whether a movement of `kind`
// from `src` to `dest` is possible in the context's world and, if so, builds
// the `Movement` with its raw cost and its break/place lists. The same
// function serves the search (through `provider.rs`) and the executor's
// per-tick re-costing, so a planned movement and its recalculation can never
// disagree about the rules.
//
// Cost is built from the kinematic constants in `costs.rs` plus:
// - breaking: break ticks * `break_cost_multiplier` +
//   `block_break_additional_penalty` (+ `falling_block_penalty` when a
//   gravity block sits on top). Blocks on the avoid list, unbreakable blocks,
//   liquids, and blocks holding back a liquid cannot be broken.
// - placing: `block_place_cost`, only into air or water with a solid face to
//   place against.
// - hazards: `lava_proximity_penalty` when the agent's body would touch lava.
//
// Anything impossible comes back as `None`, and so does anything whose cost
// reaches `COST_INF`.
//
// See also: `provider.rs` (enumerates candidate destinations),
// `movement.rs` (`Movement`, `MovementKind`), `costs.rs`.
//
// **Critical constraint: every cost is positive and finite.** The search
// asserts this; a zero-cost movement would let it loop forever.

use crate::context::CalculationContext;
use crate::costs::{
    CENTER_AFTER_FALL_COST, COST_INF, SNEAK_ONE_BLOCK_COST, WALK_OFF_BLOCK_COST,
    WALK_ONE_BLOCK_COST, WALK_ONE_IN_WATER_COST, fall_n_blocks_cost, jump_one_block_cost,
    parkour_cost,
};
use crate::movement::{Movement, MovementKind, SwimDirection};
use crate::types::BlockPos;

// ---------------------------------------------------------------------------
// Block-level helpers
// ---------------------------------------------------------------------------

#[inline]
pub fn passable(ctx: &CalculationContext, pos: BlockPos) -> bool {
    ctx.block(pos).can_walk_through()
}

#[inline]
pub fn can_walk_on(ctx: &CalculationContext, pos: BlockPos) -> bool {
    ctx.block(pos).can_walk_on()
}

/// Feet and head both clear.
#[inline]
pub fn body_clear(ctx: &CalculationContext, feet: BlockPos) -> bool {
    passable(ctx, feet) && passable(ctx, feet.up())
}

/// Cost of clearing `pos`: 0 if it is already passable, `COST_INF` if it
/// cannot be broken.
pub fn break_cost(ctx: &CalculationContext, pos: BlockPos) -> f64 {
    let block = ctx.block(pos);
    if block.can_walk_through() {
        return 0.0;
    }
    let config = &ctx.config;
    if !config.allow_break || block.is_liquid() || config.avoid_breaking.contains(&block) {
        return COST_INF;
    }
    let Some(ticks) = block.break_ticks() else {
        return COST_INF;
    };
    // Liquid above or beside would flow into the hole.
    let holds_liquid = [
        pos.up(),
        pos.offset(1, 0, 0),
        pos.offset(-1, 0, 0),
        pos.offset(0, 0, 1),
        pos.offset(0, 0, -1),
    ]
    .iter()
    .any(|&n| ctx.block(n).is_liquid());
    if holds_liquid {
        return COST_INF;
    }
    let mut cost = ticks * config.break_cost_multiplier + config.block_break_additional_penalty;
    if ctx.block(pos.up()).falls() {
        cost += config.falling_block_penalty;
    }
    cost
}

/// Cost of placing a block at `pos`. `assumed_support` is an adjacent
/// position the movement's own plan guarantees is solid by the time the
/// block is placed (the floor under the source of a bridging step).
pub fn place_cost(ctx: &CalculationContext, pos: BlockPos, assumed_support: Option<BlockPos>) -> f64 {
    if !ctx.config.allow_place {
        return COST_INF;
    }
    let block = ctx.block(pos);
    if !(block.can_walk_through() || block.is_water()) {
        return COST_INF;
    }
    let supported = pos
        .face_neighbors()
        .iter()
        .any(|&n| Some(n) == assumed_support || ctx.block(n).can_walk_on());
    if !supported {
        return COST_INF;
    }
    ctx.config.block_place_cost
}

/// Lava surcharge for a body at `feet`.
pub fn hazard_cost(ctx: &CalculationContext, feet: BlockPos) -> f64 {
    let near_lava = feet
        .face_neighbors()
        .iter()
        .chain(feet.up().face_neighbors().iter())
        .any(|&n| ctx.block(n).is_lava());
    if near_lava {
        ctx.config.lava_proximity_penalty
    } else {
        0.0
    }
}

/// Break cost for each of `positions` in order, recording the ones that need
/// breaking. Returns `COST_INF` as soon as one is unbreakable.
fn clear_all(ctx: &CalculationContext, m: &mut Movement, positions: &[BlockPos]) -> f64 {
    let mut total = 0.0;
    for &pos in positions {
        let cost = break_cost(ctx, pos);
        if cost >= COST_INF {
            return COST_INF;
        }
        if cost > 0.0 {
            m.to_break.push(pos);
            total += cost;
        }
    }
    total
}

/// Distance along a single horizontal axis, or `None` for anything else.
fn straight_distance(dx: i32, dz: i32) -> Option<i32> {
    match (dx, dz) {
        (0, 0) => None,
        (0, d) | (d, 0) => Some(d.abs()),
        _ => None,
    }
}

fn is_cardinal_step(dx: i32, dz: i32) -> bool {
    straight_distance(dx, dz) == Some(1)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Build the movement of `kind` from `src` to `dest`, or `None` if it is
/// impossible or its geometry does not match the kind.
pub fn evaluate(
    ctx: &CalculationContext,
    kind: MovementKind,
    src: BlockPos,
    dest: BlockPos,
) -> Option<Movement> {
    let dx = dest.x - src.x;
    let dy = dest.y - src.y;
    let dz = dest.z - src.z;
    let mut m = Movement::new(src, dest, kind, 0.0);

    let cost = match kind {
        MovementKind::Traverse if dy == 0 && is_cardinal_step(dx, dz) => traverse(ctx, &mut m),
        MovementKind::Diagonal if dx.abs() == 1 && dz.abs() == 1 && dy.abs() <= 1 => {
            diagonal(ctx, &m)
        }
        MovementKind::Ascend if dy == 1 && is_cardinal_step(dx, dz) => ascend(ctx, &mut m),
        MovementKind::Descend if dy == -1 && is_cardinal_step(dx, dz) => descend(ctx, &mut m),
        MovementKind::Fall if dy <= -2 && is_cardinal_step(dx, dz) => fall(ctx, &mut m),
        MovementKind::Pillar if (dx, dy, dz) == (0, 1, 0) => pillar(ctx, &mut m),
        MovementKind::Downward if (dx, dy, dz) == (0, -1, 0) => downward(ctx, &mut m),
        MovementKind::Parkour if dy == 0 => match straight_distance(dx, dz) {
            Some(distance) => parkour(ctx, &mut m, distance, false),
            None => COST_INF,
        },
        MovementKind::ParkourPlace if dy == 0 => match straight_distance(dx, dz) {
            Some(distance) => parkour(ctx, &mut m, distance, true),
            None => COST_INF,
        },
        MovementKind::Swim(dir) if (dx, dy, dz) == dir.offset() => swim(ctx, &m, dir),
        MovementKind::Teleport if dy == 0 => match straight_distance(dx, dz) {
            Some(distance) => teleport(ctx, &m, distance),
            None => COST_INF,
        },
        _ => COST_INF,
    };

    if cost.is_nan() || cost >= COST_INF {
        return None;
    }
    m.cost = cost;
    Some(m)
}

fn traverse(ctx: &CalculationContext, m: &mut Movement) -> f64 {
    let (src, dest) = (m.src, m.dest);
    let breaking = clear_all(ctx, m, &[dest.up(), dest]);
    if breaking >= COST_INF {
        return COST_INF;
    }
    let floor = dest.down();
    let (walk, placing) = if can_walk_on(ctx, floor) {
        (WALK_ONE_BLOCK_COST, 0.0)
    } else {
        // Bridge: sneak to the edge and place against the floor we stand on.
        let place = place_cost(ctx, floor, Some(src.down()));
        if place >= COST_INF {
            return COST_INF;
        }
        m.to_place.push(floor);
        (SNEAK_ONE_BLOCK_COST, place)
    };
    walk + breaking + placing + hazard_cost(ctx, dest)
}

fn diagonal(ctx: &CalculationContext, m: &Movement) -> f64 {
    let (src, dest) = (m.src, m.dest);
    let dx = dest.x - src.x;
    let dz = dest.z - src.z;
    if !body_clear(ctx, dest) || !can_walk_on(ctx, dest.down()) {
        return COST_INF;
    }
    let mut cost = WALK_ONE_BLOCK_COST * std::f64::consts::SQRT_2;
    let top = match dest.y - src.y {
        0 => src.y + 1,
        -1 => {
            // Step into the column at our own level before dropping.
            if !passable(ctx, src.offset(dx, 1, dz)) {
                return COST_INF;
            }
            cost += fall_n_blocks_cost(1);
            src.y + 1
        }
        _ => {
            if !ctx.config.allow_diagonal_ascend || !passable(ctx, src.up_by(2)) {
                return COST_INF;
            }
            cost += jump_one_block_cost();
            src.y + 2
        }
    };
    // The body sweeps past the corner; one of the two sides must be open.
    let side_clear = |side: BlockPos| (src.y..=top).all(|y| passable(ctx, BlockPos::new(side.x, y, side.z)));
    if !side_clear(src.offset(dx, 0, 0)) && !side_clear(src.offset(0, 0, dz)) {
        return COST_INF;
    }
    cost + hazard_cost(ctx, dest)
}

fn ascend(ctx: &CalculationContext, m: &mut Movement) -> f64 {
    let (src, dest) = (m.src, m.dest);
    let mut cost = WALK_ONE_BLOCK_COST + jump_one_block_cost();
    let step = dest.down();
    if !can_walk_on(ctx, step) {
        let place = place_cost(ctx, step, None);
        if place >= COST_INF {
            return COST_INF;
        }
        m.to_place.push(step);
        cost += place;
    }
    let breaking = clear_all(ctx, m, &[src.up_by(2), dest.up(), dest]);
    if breaking >= COST_INF {
        return COST_INF;
    }
    cost + breaking + hazard_cost(ctx, dest)
}

fn descend(ctx: &CalculationContext, m: &mut Movement) -> f64 {
    let dest = m.dest;
    if !can_walk_on(ctx, dest.down()) {
        return COST_INF;
    }
    let breaking = clear_all(ctx, m, &[dest.up_by(2), dest.up(), dest]);
    if breaking >= COST_INF {
        return COST_INF;
    }
    WALK_OFF_BLOCK_COST
        + fall_n_blocks_cost(1).max(CENTER_AFTER_FALL_COST)
        + breaking
        + hazard_cost(ctx, dest)
}

fn fall(ctx: &CalculationContext, m: &mut Movement) -> f64 {
    let (src, dest) = (m.src, m.dest);
    let n = src.y - dest.y;
    let max = i32::try_from(ctx.config.max_fall_height_no_water).unwrap_or(i32::MAX);
    if n > max || !can_walk_on(ctx, dest.down()) {
        return COST_INF;
    }
    let column = |y: i32| BlockPos::new(dest.x, y, dest.z);
    let breaking = clear_all(ctx, m, &[column(src.y + 1), column(src.y)]);
    if breaking >= COST_INF {
        return COST_INF;
    }
    if !(dest.y..src.y).all(|y| passable(ctx, column(y))) {
        return COST_INF;
    }
    WALK_OFF_BLOCK_COST
        + fall_n_blocks_cost(n as usize)
        + CENTER_AFTER_FALL_COST
        + breaking
        + hazard_cost(ctx, dest)
}

fn pillar(ctx: &CalculationContext, m: &mut Movement) -> f64 {
    let src = m.src;
    let here = ctx.block(src);
    if !ctx.config.allow_place || here.is_liquid() {
        return COST_INF;
    }
    let breaking = clear_all(ctx, m, &[src.up_by(2)]);
    if breaking >= COST_INF {
        return COST_INF;
    }
    let mut cost = jump_one_block_cost() + breaking + hazard_cost(ctx, m.dest);
    if !here.can_walk_on() {
        m.to_place.push(src);
        cost += ctx.config.block_place_cost;
    }
    cost
}

fn downward(ctx: &CalculationContext, m: &mut Movement) -> f64 {
    let dest = m.dest;
    if passable(ctx, dest) || !can_walk_on(ctx, dest.down()) {
        return COST_INF;
    }
    let breaking = clear_all(ctx, m, &[dest]);
    if breaking >= COST_INF {
        return COST_INF;
    }
    fall_n_blocks_cost(1) + breaking + hazard_cost(ctx, dest)
}

fn parkour(ctx: &CalculationContext, m: &mut Movement, distance: i32, place: bool) -> f64 {
    let config = &ctx.config;
    let (src, dest) = (m.src, m.dest);
    if !config.allow_parkour {
        return COST_INF;
    }
    if place {
        let enabled = config.allow_parkour_place && config.allow_place && config.allow_sprint;
        if !enabled || distance != 4 {
            return COST_INF;
        }
    } else {
        let max = if config.allow_sprint { 4 } else { 3 };
        if !(2..=max).contains(&distance) {
            return COST_INF;
        }
    }
    if ctx.block(src).is_liquid() || !can_walk_on(ctx, src.down()) || !passable(ctx, src.up_by(2)) {
        return COST_INF;
    }

    let dx = (dest.x - src.x).signum();
    let dz = (dest.z - src.z).signum();
    for j in 1..=distance {
        let col = src.offset(dx * j, 0, dz * j);
        if !body_clear(ctx, col) || !passable(ctx, col.up_by(2)) {
            return COST_INF;
        }
        // Solid ground before the landing spot means a shorter move fits.
        if j < distance && can_walk_on(ctx, col.down()) {
            return COST_INF;
        }
    }

    let mut cost = parkour_cost(distance);
    let landing = dest.down();
    if !can_walk_on(ctx, landing) {
        if !place {
            return COST_INF;
        }
        let placing = place_cost(ctx, landing, None);
        if placing >= COST_INF {
            return COST_INF;
        }
        m.to_place.push(landing);
        cost += placing;
    }
    cost + hazard_cost(ctx, dest)
}

fn swim(ctx: &CalculationContext, m: &Movement, dir: SwimDirection) -> f64 {
    if !ctx.config.allow_swimming {
        return COST_INF;
    }
    let (src, dest) = (m.src, m.dest);
    let into = ctx.block(dest);
    let surfacing = dir == SwimDirection::Up && ctx.block(src).is_water() && into.can_walk_through();
    if !into.is_water() && !surfacing {
        return COST_INF;
    }
    let head = ctx.block(dest.up());
    if !(head.is_water() || head.can_walk_through()) {
        return COST_INF;
    }
    WALK_ONE_IN_WATER_COST + hazard_cost(ctx, dest)
}

fn teleport(ctx: &CalculationContext, m: &Movement, distance: i32) -> f64 {
    let config = &ctx.config;
    if !config.allow_teleport
        || distance < config.teleport_min_distance
        || distance > config.teleport_max_distance
    {
        return COST_INF;
    }
    let dest = m.dest;
    if !body_clear(ctx, dest) || !can_walk_on(ctx, dest.down()) {
        return COST_INF;
    }
    config.teleport_cost + hazard_cost(ctx, dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathingConfig;
    use crate::types::BlockState;
    use crate::world::VoxelWorld;
    use std::sync::Arc;

    fn p(x: i32, y: i32, z: i32) -> BlockPos {
        BlockPos::new(x, y, z)
    }

    fn ctx_with(world: VoxelWorld, config: PathingConfig) -> CalculationContext {
        CalculationContext::new(Arc::new(world), Arc::new(config))
    }

    fn ctx(world: VoxelWorld) -> CalculationContext {
        ctx_with(world, PathingConfig::default())
    }

    fn flat() -> VoxelWorld {
        VoxelWorld::flat(16, 8, 16, BlockState::Stone)
    }

    #[test]
    fn traverse_on_flat_ground_costs_one_walk() {
        let c = ctx(flat());
        let m = evaluate(&c, MovementKind::Traverse, p(1, 1, 1), p(2, 1, 1)).unwrap();
        assert!((m.cost - WALK_ONE_BLOCK_COST).abs() < 1e-9);
        assert!(m.to_break.is_empty());
        assert!(m.to_place.is_empty());
    }

    #[test]
    fn traverse_through_a_wall_breaks_head_then_feet() {
        let mut world = flat();
        world.fill(p(2, 1, 1), p(2, 2, 1), BlockState::Dirt);
        let c = ctx(world);
        let m = evaluate(&c, MovementKind::Traverse, p(1, 1, 1), p(2, 1, 1)).unwrap();
        assert_eq!(m.to_break.as_slice(), &[p(2, 2, 1), p(2, 1, 1)]);
        let per_block = 15.0 + 2.0;
        assert!((m.cost - (WALK_ONE_BLOCK_COST + 2.0 * per_block)).abs() < 1e-9);
    }

    #[test]
    fn breaking_disallowed_or_avoided_blocks_is_impossible() {
        let mut world = flat();
        world.set(p(2, 1, 1), BlockState::Stone);
        let no_break = PathingConfig {
            allow_break: false,
            ..PathingConfig::default()
        };
        assert!(evaluate(&ctx_with(world.clone(), no_break), MovementKind::Traverse, p(1, 1, 1), p(2, 1, 1)).is_none());

        world.set(p(2, 1, 1), BlockState::Bedrock);
        assert!(evaluate(&ctx(world), MovementKind::Traverse, p(1, 1, 1), p(2, 1, 1)).is_none());
    }

    #[test]
    fn blocks_holding_back_water_are_not_broken() {
        let mut world = flat();
        world.set(p(2, 1, 1), BlockState::Dirt);
        world.set(p(3, 1, 1), BlockState::Water);
        assert!(break_cost(&ctx(world), p(2, 1, 1)) >= COST_INF);
    }

    #[test]
    fn bridging_places_the_floor() {
        let mut world = flat();
        world.set(p(2, 0, 1), BlockState::Air);
        let c = ctx(world);
        let m = evaluate(&c, MovementKind::Traverse, p(1, 1, 1), p(2, 1, 1)).unwrap();
        assert_eq!(m.to_place.as_slice(), &[p(2, 0, 1)]);
        assert!((m.cost - (SNEAK_ONE_BLOCK_COST + 20.0)).abs() < 1e-9);
    }

    #[test]
    fn ascend_needs_a_step_and_headroom() {
        let mut world = flat();
        world.set(p(2, 1, 1), BlockState::Stone);
        let c = ctx(world.clone());
        let m = evaluate(&c, MovementKind::Ascend, p(1, 1, 1), p(2, 2, 1)).unwrap();
        assert!((m.cost - (WALK_ONE_BLOCK_COST + jump_one_block_cost())).abs() < 1e-9);

        world.set(p(1, 3, 1), BlockState::Bedrock);
        assert!(evaluate(&ctx(world), MovementKind::Ascend, p(1, 1, 1), p(2, 2, 1)).is_none());
    }

    #[test]
    fn descend_and_fall_land_on_solid_ground() {
        let mut world = flat();
        world.fill(p(0, 1, 0), p(1, 3, 15), BlockState::Stone);
        let c = ctx(world);
        // Standing on top of the ledge at y = 4, ground at y = 1 on the other side.
        assert!(evaluate(&c, MovementKind::Descend, p(1, 4, 1), p(2, 3, 1)).is_none());
        let fall = evaluate(&c, MovementKind::Fall, p(1, 4, 1), p(2, 1, 1)).unwrap();
        assert!(fall.cost > fall_n_blocks_cost(3));

        let shallow = PathingConfig {
            max_fall_height_no_water: 2,
            ..PathingConfig::default()
        };
        let mut world = flat();
        world.fill(p(0, 1, 0), p(1, 3, 15), BlockState::Stone);
        assert!(evaluate(&ctx_with(world, shallow), MovementKind::Fall, p(1, 4, 1), p(2, 1, 1)).is_none());
    }

    #[test]
    fn descend_one_block() {
        let mut world = flat();
        world.fill(p(0, 1, 0), p(1, 1, 15), BlockState::Stone);
        let c = ctx(world);
        let m = evaluate(&c, MovementKind::Descend, p(1, 2, 1), p(2, 1, 1)).unwrap();
        let expected = WALK_OFF_BLOCK_COST + fall_n_blocks_cost(1);
        assert!((m.cost - expected).abs() < 1e-9);
    }

    #[test]
    fn parkour_crosses_a_gap_but_not_flat_ground() {
        let mut world = flat();
        world.set(p(2, 0, 1), BlockState::Air);
        let c = ctx(world);
        let m = evaluate(&c, MovementKind::Parkour, p(1, 1, 1), p(3, 1, 1)).unwrap();
        assert!((m.cost - parkour_cost(2)).abs() < 1e-9);
        assert!(evaluate(&ctx(flat()), MovementKind::Parkour, p(1, 1, 1), p(3, 1, 1)).is_none());
    }

    #[test]
    fn long_parkour_needs_sprint() {
        let mut world = flat();
        world.fill(p(2, 0, 1), p(4, 0, 1), BlockState::Air);
        let no_sprint = PathingConfig {
            allow_sprint: false,
            ..PathingConfig::default()
        };
        assert!(evaluate(&ctx(world.clone()), MovementKind::Parkour, p(1, 1, 1), p(5, 1, 1)).is_some());
        assert!(evaluate(&ctx_with(world, no_sprint), MovementKind::Parkour, p(1, 1, 1), p(5, 1, 1)).is_none());
    }

    #[test]
    fn pillar_places_under_the_agent() {
        let c = ctx(flat());
        let m = evaluate(&c, MovementKind::Pillar, p(1, 1, 1), p(1, 2, 1)).unwrap();
        assert_eq!(m.to_place.as_slice(), &[p(1, 1, 1)]);
        assert!((m.cost - (jump_one_block_cost() + 20.0)).abs() < 1e-9);
    }

    #[test]
    fn downward_breaks_the_floor() {
        let mut world = flat();
        world.fill(p(0, 1, 0), p(15, 1, 15), BlockState::Dirt);
        let c = ctx(world);
        let m = evaluate(&c, MovementKind::Downward, p(1, 2, 1), p(1, 1, 1)).unwrap();
        assert_eq!(m.to_break.as_slice(), &[p(1, 1, 1)]);
    }

    #[test]
    fn swimming_requires_water() {
        let mut world = flat();
        world.fill(p(2, 1, 1), p(3, 2, 1), BlockState::Water);
        let c = ctx(world);
        let east = MovementKind::Swim(SwimDirection::East);
        let m = evaluate(&c, east, p(2, 1, 1), p(3, 1, 1)).unwrap();
        assert!((m.cost - WALK_ONE_IN_WATER_COST).abs() < 1e-9);
        assert!(evaluate(&c, east, p(3, 1, 1), p(4, 1, 1)).is_none());
        // Surfacing from the top water block into air.
        assert!(evaluate(&c, MovementKind::Swim(SwimDirection::Up), p(2, 2, 1), p(2, 3, 1)).is_some());
        // Traverse never enters water.
        assert!(evaluate(&c, MovementKind::Traverse, p(1, 1, 1), p(2, 1, 1)).is_none());
    }

    #[test]
    fn teleport_is_gated_and_ranged() {
        let c = ctx(flat());
        assert!(evaluate(&c, MovementKind::Teleport, p(1, 1, 1), p(9, 1, 1)).is_none());
        let enabled = PathingConfig {
            allow_teleport: true,
            ..PathingConfig::default()
        };
        let c = ctx_with(flat(), enabled);
        assert!(evaluate(&c, MovementKind::Teleport, p(1, 1, 1), p(9, 1, 1)).is_some());
        assert!(evaluate(&c, MovementKind::Teleport, p(1, 1, 1), p(3, 1, 1)).is_none());
    }

    #[test]
    fn lava_nearby_adds_a_surcharge() {
        let mut world = flat();
        world.set(p(2, 1, 2), BlockState::Lava);
        let c = ctx(world);
        let m = evaluate(&c, MovementKind::Traverse, p(1, 1, 1), p(2, 1, 1)).unwrap();
        assert!((m.cost - (WALK_ONE_BLOCK_COST + 20.0)).abs() < 1e-9);
    }

    #[test]
    fn diagonal_needs_one_open_side() {
        let mut world = flat();
        world.fill(p(2, 1, 1), p(2, 2, 1), BlockState::Stone);
        let c = ctx(world.clone());
        assert!(evaluate(&c, MovementKind::Diagonal, p(1, 1, 1), p(2, 1, 2)).is_some());
        world.fill(p(1, 1, 2), p(1, 2, 2), BlockState::Stone);
        assert!(evaluate(&ctx(world), MovementKind::Diagonal, p(1, 1, 1), p(2, 1, 2)).is_none());
    }

    #[test]
    fn mismatched_geometry_is_rejected() {
        let c = ctx(flat());
        assert!(evaluate(&c, MovementKind::Traverse, p(1, 1, 1), p(3, 1, 1)).is_none());
        assert!(evaluate(&c, MovementKind::Ascend, p(1, 1, 1), p(2, 1, 1)).is_none());
        assert!(evaluate(&c, MovementKind::Pillar, p(1, 1, 1), p(2, 2, 1)).is_none());
    }
}

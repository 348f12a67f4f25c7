// Search properties on small random terrain, checked against an exhaustive
// Dijkstra over the same movement provider.
//
// The worlds are tiny (10x7x10) so Dijkstra can settle every reachable
// node. Each seed builds a hilly column map with occasional pits, picks a
// start and goal on the surface, and compares the A* result against the
// true optimum.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use voxel_pathing::context::CalculationContext;
use voxel_pathing::goal::{COST_HEURISTIC, MAX_ADMISSIBLE_FALL};
use voxel_pathing::movement::MovementKind;
use voxel_pathing::pathfinding::{OutcomeKind, SearchHandle, Timeouts, search};
use voxel_pathing::provider::{Candidate, MovementProvider};
use voxel_pathing::world::VoxelWorld;
use voxel_pathing::{BlockPos, BlockState, Goal, PathingConfig};

const SIZE: i32 = 10;
const HEIGHT: i32 = 7;
const SEEDS: u64 = 40;

/// Slack for the search's minimum-improvement threshold, per movement.
const IMPROVEMENT_SLACK: f64 = 0.01;

fn surface(world: &VoxelWorld, x: i32, z: i32) -> BlockPos {
    let y = (1..HEIGHT)
        .find(|&y| world.get(BlockPos::new(x, y, z)) == BlockState::Air)
        .unwrap_or(HEIGHT - 1);
    BlockPos::new(x, y, z)
}

fn random_world(rng: &mut SmallRng) -> VoxelWorld {
    let mut world = VoxelWorld::flat(SIZE as u32, HEIGHT as u32, SIZE as u32, BlockState::Stone);
    for x in 0..SIZE {
        for z in 0..SIZE {
            if rng.gen_bool(0.08) {
                // Pit: remove the floor too.
                world.set(BlockPos::new(x, 0, z), BlockState::Air);
                continue;
            }
            let h = rng.gen_range(0..=3);
            let top = if rng.gen_bool(0.3) { BlockState::Dirt } else { BlockState::Stone };
            for y in 1..=h {
                world.set(BlockPos::new(x, y, z), top);
            }
        }
    }
    world
}

fn context(world: VoxelWorld, config: PathingConfig) -> CalculationContext {
    CalculationContext::new(Arc::new(world), Arc::new(config))
}

/// Exact minimum cost from `start` to any position in `goal`.
fn dijkstra(ctx: &CalculationContext, provider: &MovementProvider, start: BlockPos, goal: &Goal) -> Option<f64> {
    let mut best: FxHashMap<BlockPos, f64> = FxHashMap::default();
    let mut open = BinaryHeap::new();
    let mut candidates: Vec<Candidate> = Vec::new();
    best.insert(start, 0.0);
    // Non-negative floats order the same as their bit patterns.
    open.push(Reverse((0.0f64.to_bits(), start)));

    while let Some(Reverse((bits, pos))) = open.pop() {
        let cost = f64::from_bits(bits);
        if best.get(&pos).is_some_and(|&b| b < cost) {
            continue;
        }
        if goal.is_in_goal(pos) {
            return Some(cost);
        }
        candidates.clear();
        provider.candidates(ctx, pos, &mut candidates);
        for c in &candidates {
            let next = cost + c.cost;
            let dest = c.movement.dest;
            if best.get(&dest).is_none_or(|&b| next < b) {
                best.insert(dest, next);
                open.push(Reverse((next.to_bits(), dest)));
            }
        }
    }
    None
}

fn configs() -> Vec<(&'static str, PathingConfig)> {
    let base = PathingConfig {
        // The world edge counts as unloaded; keep it from ending searches.
        pathing_max_chunk_border_fetch: u32::MAX,
        ..PathingConfig::default()
    };
    let walking_only = PathingConfig {
        allow_break: false,
        allow_place: false,
        allow_parkour: false,
        ..base.clone()
    };
    vec![("default", base), ("walking only", walking_only)]
}

#[test]
fn search_matches_exhaustive_optimum() {
    for (name, config) in configs() {
        for seed in 0..SEEDS {
            let mut rng = SmallRng::seed_from_u64(seed);
            let world = random_world(&mut rng);
            let start = surface(&world, rng.gen_range(0..SIZE), rng.gen_range(0..SIZE));
            let target = surface(&world, rng.gen_range(0..SIZE), rng.gen_range(0..SIZE));
            if world.get(start.down()) == BlockState::Air {
                continue;
            }
            let goal = Goal::Block(target);

            let ctx = context(world, config.clone());
            let provider = MovementProvider::from_config(&ctx.config);
            let optimum = dijkstra(&ctx, &provider, start, &goal);

            let handle = SearchHandle::new(start, goal.clone());
            let outcome = search(&handle, &ctx, &provider, Timeouts::from_millis(10_000, 20_000));

            match optimum {
                Some(optimum) => {
                    assert_eq!(
                        outcome.kind,
                        OutcomeKind::SuccessToGoal,
                        "{name} seed {seed}: {start} -> {target} reachable at cost {optimum}"
                    );
                    let path = outcome.path.unwrap();
                    assert_eq!(path.src(), start);
                    assert!(goal.is_in_goal(path.dest()));
                    let found = path.total_cost();
                    let slack = IMPROVEMENT_SLACK * path.len() as f64 + 1e-6;
                    assert!(
                        found >= optimum - 1e-6 && found <= optimum + slack,
                        "{name} seed {seed}: found {found}, optimum {optimum}"
                    );
                }
                None => assert_ne!(
                    outcome.kind,
                    OutcomeKind::SuccessToGoal,
                    "{name} seed {seed}: search reached an unreachable goal"
                ),
            }
        }
    }
}

#[test]
fn heuristic_never_exceeds_remaining_cost() {
    let (_, config) = configs().remove(0);
    for seed in 0..SEEDS {
        let mut rng = SmallRng::seed_from_u64(1_000 + seed);
        let world = random_world(&mut rng);
        let start = surface(&world, 0, rng.gen_range(0..SIZE));
        let target = surface(&world, SIZE - 1, rng.gen_range(0..SIZE));
        if world.get(start.down()) == BlockState::Air {
            continue;
        }
        let goal = Goal::Block(target);
        let ctx = context(world, config.clone());
        let provider = MovementProvider::from_config(&ctx.config);
        let handle = SearchHandle::new(start, goal.clone());
        let outcome = search(&handle, &ctx, &provider, Timeouts::from_millis(10_000, 20_000));
        let Some(path) = outcome.path.filter(|_| outcome.kind == OutcomeKind::SuccessToGoal) else {
            continue;
        };

        for (i, &pos) in path.positions().iter().enumerate() {
            let remaining = path.ticks_remaining_from(i);
            let estimate = goal.heuristic(pos);
            assert!(
                estimate <= remaining + 1e-6,
                "seed {seed}: h({pos}) = {estimate} exceeds remaining {remaining}"
            );
        }
    }
}

#[test]
fn every_candidate_costs_at_least_its_heuristic_drop() {
    // Consistency along single edges: h(src) <= cost + h(dest) for a goal
    // placed at every column top.
    let (_, config) = configs().remove(0);
    let mut rng = SmallRng::seed_from_u64(7);
    let world = random_world(&mut rng);
    let goals: Vec<Goal> = (0..SIZE)
        .step_by(3)
        .flat_map(|x| (0..SIZE).step_by(3).map(move |z| (x, z)))
        .map(|(x, z)| Goal::Block(surface(&world, x, z)))
        .collect();
    let ctx = context(world, config);
    let provider = MovementProvider::from_config(&ctx.config);
    let mut candidates = Vec::new();

    for x in 0..SIZE {
        for z in 0..SIZE {
            for y in 1..HEIGHT {
                let from = BlockPos::new(x, y, z);
                if ctx.block(from) != BlockState::Air || !ctx.block(from.down()).can_walk_on() {
                    continue;
                }
                candidates.clear();
                provider.candidates(&ctx, from, &mut candidates);
                for c in &candidates {
                    assert!(c.cost > 0.0, "{}: non-positive cost", c.movement);
                    for goal in &goals {
                        let drop = goal.heuristic(from) - goal.heuristic(c.movement.dest);
                        assert!(
                            drop <= c.cost + 1e-6,
                            "{} to {goal}: heuristic drops {drop} but costs {}",
                            c.movement,
                            c.cost
                        );
                    }
                }
            }
        }
    }
}

/// Search `start` to `goal` and check the estimate at every position of the
/// result against the cost still ahead of it.
fn assert_admissible_along_path(ctx: &CalculationContext, start: BlockPos, goal: &Goal) -> Vec<MovementKind> {
    let provider = MovementProvider::from_config(&ctx.config);
    let handle = SearchHandle::new(start, goal.clone());
    let outcome = search(&handle, ctx, &provider, Timeouts::from_millis(10_000, 20_000));
    assert_eq!(outcome.kind, OutcomeKind::SuccessToGoal);
    let path = outcome.path.unwrap();
    for (i, &pos) in path.positions().iter().enumerate() {
        let remaining = path.ticks_remaining_from(i);
        let estimate = goal.heuristic(pos);
        assert!(
            estimate <= remaining + 1e-6,
            "h({pos}) = {estimate} exceeds remaining {remaining}"
        );
    }
    path.movements().iter().map(|m| m.kind).collect()
}

#[test]
fn longest_allowed_fall_stays_above_heuristic() {
    let (_, base) = configs().remove(0);
    let tall = PathingConfig {
        max_fall_height_no_water: 20,
        ..base.clone()
    };
    assert!(tall.validate().is_err());

    // A plateau whose edge drops exactly as far as the config allows.
    let height = MAX_ADMISSIBLE_FALL as i32;
    let mut world = VoxelWorld::flat(8, 24, 8, BlockState::Stone);
    world.fill(BlockPos::new(0, 1, 0), BlockPos::new(1, height, 7), BlockState::Stone);
    let config = PathingConfig {
        max_fall_height_no_water: MAX_ADMISSIBLE_FALL,
        ..base
    };
    config.validate().unwrap();

    let ctx = context(world, config);
    let kinds = assert_admissible_along_path(
        &ctx,
        BlockPos::new(1, height + 1, 2),
        &Goal::Block(BlockPos::new(2, 1, 2)),
    );
    assert!(kinds.contains(&MovementKind::Fall), "{kinds:?}");
}

#[test]
fn longest_allowed_teleport_stays_above_heuristic() {
    let (_, base) = configs().remove(0);
    let cheap = PathingConfig {
        allow_teleport: true,
        teleport_max_distance: 32,
        teleport_cost: 60.0,
        ..base
    };
    assert!(cheap.validate().is_err());

    let config = PathingConfig {
        teleport_cost: 32.0 * COST_HEURISTIC,
        ..cheap
    };
    config.validate().unwrap();

    let ctx = context(VoxelWorld::flat(64, 8, 16, BlockState::Stone), config);
    assert_admissible_along_path(
        &ctx,
        BlockPos::new(2, 1, 8),
        &Goal::Block(BlockPos::new(34, 1, 8)),
    );
}

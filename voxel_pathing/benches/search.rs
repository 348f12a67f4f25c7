// Search throughput on generated terrain.
//
// Three cases: an open flat field, hilly terrain with walls that force
// climbing or breaking, and the same hills with a previous segment to
// favor (the plan-ahead configuration).

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use voxel_pathing::context::{CalculationContext, Favoring};
use voxel_pathing::pathfinding::{SearchHandle, Timeouts, search};
use voxel_pathing::provider::MovementProvider;
use voxel_pathing::world::VoxelWorld;
use voxel_pathing::{BlockPos, BlockState, Goal, PathingConfig};

const SIZE: i32 = 96;

fn hills(seed: u64) -> VoxelWorld {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut world = VoxelWorld::flat(SIZE as u32, 16, SIZE as u32, BlockState::Stone);
    for x in 0..SIZE {
        for z in 0..SIZE {
            let h = 1 + ((x / 6 + z / 5) % 4) + rng.gen_range(0..2);
            world.fill(BlockPos::new(x, 1, z), BlockPos::new(x, h, z), BlockState::Dirt);
        }
    }
    for x in (16..SIZE).step_by(24) {
        world.fill(BlockPos::new(x, 1, 0), BlockPos::new(x, 8, SIZE - 10), BlockState::Stone);
    }
    world
}

fn top(world: &VoxelWorld, x: i32, z: i32) -> BlockPos {
    let y = (1..16)
        .find(|&y| world.get(BlockPos::new(x, y, z)) == BlockState::Air)
        .unwrap_or(15);
    BlockPos::new(x, y, z)
}

fn run(ctx: &CalculationContext, start: BlockPos, goal: &Goal) -> usize {
    let provider = MovementProvider::from_config(&ctx.config);
    let handle = SearchHandle::new(start, goal.clone());
    let outcome = search(&handle, ctx, &provider, Timeouts::from_millis(5_000, 10_000));
    outcome.nodes_considered
}

fn bench_search(c: &mut Criterion) {
    let config = Arc::new(PathingConfig {
        pathing_max_chunk_border_fetch: u32::MAX,
        ..PathingConfig::default()
    });

    let flat = CalculationContext::new(
        Arc::new(VoxelWorld::flat(SIZE as u32, 16, SIZE as u32, BlockState::Stone)),
        Arc::clone(&config),
    );
    let flat_goal = Goal::Block(BlockPos::new(SIZE - 4, 1, SIZE - 4));
    c.bench_function("search_flat_field", |b| {
        b.iter(|| run(black_box(&flat), BlockPos::new(3, 1, 3), &flat_goal));
    });

    let world = hills(42);
    let start = top(&world, 3, 3);
    let goal = Goal::Block(top(&world, SIZE - 4, SIZE - 20));
    let hilly = CalculationContext::new(Arc::new(world), Arc::clone(&config));
    c.bench_function("search_hills_and_walls", |b| {
        b.iter(|| run(black_box(&hilly), start, &goal));
    });

    let provider = MovementProvider::from_config(&config);
    let previous = search(
        &SearchHandle::new(start, goal.clone()),
        &hilly,
        &provider,
        Timeouts::from_millis(5_000, 10_000),
    )
    .path;
    let favoring = Favoring::new(previous.as_ref(), Vec::new(), &config);
    let favored = hilly.clone().with_favoring(favoring);
    c.bench_function("search_hills_favoring_previous", |b| {
        b.iter(|| run(black_box(&favored), start, &goal));
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);

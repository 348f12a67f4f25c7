// Headless pathing demo.
//
// Builds a small generated voxel world (rolling hills, a pond, a wall with
// no gap), puts a kinematic agent in it, and ticks a `PathingOrchestrator`
// until the agent reaches the goal, the goal is abandoned, or the tick
// limit runs out. Path events are logged through `tracing`; with `--json`
// they are also printed to stdout one JSON object per line.
//
// Usage:
//   pathing-demo [OPTIONS]
//     --config <FILE>         JSON PathingConfig (default: built-in defaults)
//     --set <KEY>=<JSON>      Override one config field (repeatable)
//     --size <N>              World width and depth in blocks (default: 64)
//     --start <X,Y,Z>         Agent feet position (default: 2,<surface>,2)
//     --goal <X,Y,Z>          Goal block (default: far corner, on the surface)
//     --max-ticks <N>         Give up after this many ticks (default: 20000)
//     --tick-ms <MS>          Sleep per tick (default: 0)
//     --json                  Print events as JSON lines
//
// Log verbosity follows `RUST_LOG` (default: info).

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use voxel_pathing::agent::KinematicAgent;
use voxel_pathing::world::{LiveWorld, VoxelWorld, WorldSource};
use voxel_pathing::{
    BlockPos, BlockState, Goal, PathEvent, PathingConfig, PathingOrchestrator, TracingListener,
};

const WORLD_HEIGHT: u32 = 24;
const TICKS_PER_BLOCK: u32 = 4;

struct DemoArgs {
    config: PathingConfig,
    size: u32,
    start: Option<BlockPos>,
    goal: Option<BlockPos>,
    max_ticks: u64,
    tick_ms: u64,
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = parse_args();
    let world = build_terrain(args.size);
    let surface = |x: i32, z: i32| surface_y(&world, x, z);

    let start = args
        .start
        .unwrap_or_else(|| BlockPos::new(2, surface(2, 2), 2));
    let far = args.size as i32 - 3;
    let goal_pos = args
        .goal
        .unwrap_or_else(|| BlockPos::new(far, surface(far, far), far));

    let live = Arc::new(LiveWorld::new(world));
    let source: Arc<dyn WorldSource> = live.clone();
    let mut orchestrator = match PathingOrchestrator::new(args.config, source) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("failed to start pathing: {e}");
            return ExitCode::FAILURE;
        }
    };
    orchestrator.add_listener(Box::new(TracingListener));

    let mut agent = KinematicAgent::new(start, TICKS_PER_BLOCK);
    let goal = Goal::Block(goal_pos);
    info!(%start, %goal, size = args.size, "walking to goal");
    orchestrator.set_goal_and_path(goal, &agent.state(&live));

    for tick in 1..=args.max_ticks {
        let output = orchestrator.tick(&agent.state(&live));
        agent.apply(&output.intents, &live);

        if args.json {
            for event in &output.events {
                match serde_json::to_string(event) {
                    Ok(line) => println!("{{\"tick\":{tick},\"event\":{line}}}"),
                    Err(e) => warn!("failed to encode event: {e}"),
                }
            }
        }
        for event in &output.events {
            match event {
                PathEvent::AtGoal => {
                    info!(tick, feet = %agent.feet(), "arrived");
                    return ExitCode::SUCCESS;
                }
                PathEvent::CalcFailed => {
                    warn!(tick, feet = %agent.feet(), "goal unreachable");
                    return ExitCode::FAILURE;
                }
                _ => {}
            }
        }
        if tick % 500 == 0 {
            info!(
                tick,
                feet = %agent.feet(),
                state = ?orchestrator.state(),
                eta = ?orchestrator.estimated_ticks_to_goal(agent.feet()),
                remembered_failures = orchestrator.failure_memory().len(),
                "progress"
            );
        }
        if args.tick_ms > 0 {
            std::thread::sleep(Duration::from_millis(args.tick_ms));
        } else {
            // Give the worker pool a chance to finish searches between ticks.
            std::thread::yield_now();
        }
    }

    warn!(max_ticks = args.max_ticks, feet = %agent.feet(), "tick limit reached");
    orchestrator.force_cancel();
    ExitCode::FAILURE
}

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// Cheap integer hash for deterministic terrain noise.
fn hash2(x: i32, z: i32) -> u32 {
    let mut h = (x as u32).wrapping_mul(0x27d4_eb2d) ^ (z as u32).wrapping_mul(0x1656_67b1);
    h ^= h >> 15;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^ (h >> 13)
}

/// Ground height at a column: a smoothed sum of coarse noise cells.
fn column_height(x: i32, z: i32) -> i32 {
    let cell = |cx: i32, cz: i32| (hash2(cx, cz) % 5) as i32;
    let (cx, cz) = (x.div_euclid(8), z.div_euclid(8));
    let (fx, fz) = (x.rem_euclid(8), z.rem_euclid(8));
    let top = cell(cx, cz) * (8 - fx) + cell(cx + 1, cz) * fx;
    let bottom = cell(cx, cz + 1) * (8 - fx) + cell(cx + 1, cz + 1) * fx;
    3 + (top * (8 - fz) + bottom * fz) / 64
}

fn build_terrain(size: u32) -> VoxelWorld {
    let mut world = VoxelWorld::new(size, WORLD_HEIGHT, size);
    let n = size as i32;
    for x in 0..n {
        for z in 0..n {
            let h = column_height(x, z);
            world.fill(BlockPos::new(x, 0, z), BlockPos::new(x, 0, z), BlockState::Bedrock);
            world.fill(BlockPos::new(x, 1, z), BlockPos::new(x, h - 2, z), BlockState::Stone);
            world.set(BlockPos::new(x, h - 1, z), BlockState::Dirt);
        }
    }

    // A pond in the middle, two blocks deep.
    let mid = n / 2;
    for x in mid - 4..mid + 4 {
        for z in mid - 3..mid + 3 {
            let h = column_height(x, z);
            world.fill(BlockPos::new(x, h - 2, z), BlockPos::new(x, h - 1, z), BlockState::Water);
        }
    }

    // A wall across the map a quarter of the way in. It reaches higher than
    // a single jump, so the agent has to break through or build over it.
    let wall_x = n / 4;
    for z in 0..n {
        let h = column_height(wall_x, z);
        world.fill(
            BlockPos::new(wall_x, h, z),
            BlockPos::new(wall_x, h + 2, z),
            BlockState::Planks,
        );
    }
    world
}

/// Feet y of the first standable position from the top of a column.
fn surface_y(world: &VoxelWorld, x: i32, z: i32) -> i32 {
    (1..WORLD_HEIGHT as i32)
        .rev()
        .find(|&y| {
            world.get(BlockPos::new(x, y - 1, z)).can_walk_on()
                && world.get(BlockPos::new(x, y, z)).can_walk_through()
        })
        .unwrap_or(1)
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// Parse command-line arguments with plain `std::env::args()` matching.
fn parse_args() -> DemoArgs {
    let mut config_path = None;
    let mut overrides = serde_json::Map::new();
    let mut args = DemoArgs {
        config: PathingConfig::default(),
        size: 64,
        start: None,
        goal: None,
        max_ticks: 20_000,
        tick_ms: 0,
        json: false,
    };
    let argv: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < argv.len() {
        match argv[i].as_str() {
            "--config" => {
                i += 1;
                config_path = Some(argv.get(i).cloned().unwrap_or_else(|| fail("--config requires a path")));
            }
            "--set" => {
                i += 1;
                let Some((key, value)) = argv.get(i).and_then(|s| s.split_once('=')) else {
                    fail("--set requires KEY=VALUE");
                };
                // Bare words are taken as strings so `--set foo=bar` works.
                let value = serde_json::from_str(value)
                    .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
                overrides.insert(key.to_string(), value);
            }
            "--size" => {
                i += 1;
                args.size = argv
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .filter(|&n: &u32| n >= 16)
                    .unwrap_or_else(|| fail("--size requires a number of at least 16"));
            }
            "--start" => {
                i += 1;
                args.start = Some(argv.get(i).and_then(|s| parse_pos(s)).unwrap_or_else(|| fail("--start requires X,Y,Z")));
            }
            "--goal" => {
                i += 1;
                args.goal = Some(argv.get(i).and_then(|s| parse_pos(s)).unwrap_or_else(|| fail("--goal requires X,Y,Z")));
            }
            "--max-ticks" => {
                i += 1;
                args.max_ticks = argv
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| fail("--max-ticks requires a valid number"));
            }
            "--tick-ms" => {
                i += 1;
                args.tick_ms = argv
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| fail("--tick-ms requires a valid number"));
            }
            "--json" => args.json = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if let Some(path) = config_path {
        args.config = PathingConfig::load(&path).unwrap_or_else(|e| fail(&e.to_string()));
    }
    if !overrides.is_empty() {
        args.config = args
            .config
            .with_overrides(&overrides)
            .unwrap_or_else(|e| fail(&e.to_string()));
    }
    args
}

fn parse_pos(s: &str) -> Option<BlockPos> {
    let mut parts = s.split(',').map(|p| p.trim().parse::<i32>().ok());
    let pos = BlockPos::new(parts.next()??, parts.next()??, parts.next()??);
    parts.next().is_none().then_some(pos)
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn print_usage() {
    println!("Usage: pathing-demo [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <FILE>         JSON PathingConfig (default: built-in defaults)");
    println!("  --set <KEY>=<JSON>      Override one config field (repeatable)");
    println!("  --size <N>              World width and depth in blocks (default: 64)");
    println!("  --start <X,Y,Z>         Agent feet position (default: 2,<surface>,2)");
    println!("  --goal <X,Y,Z>          Goal block (default: far corner, on the surface)");
    println!("  --max-ticks <N>         Give up after this many ticks (default: 20000)");
    println!("  --tick-ms <MS>          Sleep per tick (default: 0)");
    println!("  --json                  Print events as JSON lines");
    println!("  --help, -h              Show this help");
}

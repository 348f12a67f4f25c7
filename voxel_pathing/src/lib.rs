// voxel_pathing: pathfinding and path execution for agents in a voxel world.
//
// The crate finds routes for a single agent through a grid of blocks with
// per-movement tick costs, then drives the agent along them a tick at a
// time. Searches run on a background worker pool; the simulation thread
// only ever ticks the orchestrator and applies the intents it returns.
// Nothing here owns the world or the agent: both are reached through
// traits and plain state structs.
//
// Module overview:
// - `types.rs`:          BlockPos, BlockState, direction tables.
// - `costs.rs`:          Tick-denominated action cost constants and tables.
// - `world.rs`:          WorldView/WorldSource traits, VoxelWorld, LiveWorld.
// - `config.rs`:         PathingConfig, every tunable, JSON loading, overrides.
// - `error.rs`:          ConfigError and PathingError.
// - `goal.rs`:           Goal predicates and admissible heuristics.
// - `movement.rs`:       Movement, MovementKind, per-tick movement update.
// - `moves.rs`:          Per-kind feasibility and cost evaluation.
// - `provider.rs`:       MovementProvider, candidate generation for a node.
// - `context.rs`:        CalculationContext and backtrack/mob favoring.
// - `failure_memory.rs`: Time-windowed ledger of failed movements.
// - `pathfinding.rs`:    A* with dual timeouts, cancellation, best-so-far.
// - `path.rs`:           Immutable Path plus cutoff, splice, history trim.
// - `executor.rs`:       PathExecutor, follows one path, detects failure.
// - `agent.rs`:          AgentState, MovementIntent, KinematicAgent.
// - `event.rs`:          PathEvent, listeners, the per-tick event queue.
// - `orchestrator.rs`:   PathingOrchestrator: goals, segments, workers.
//
// **Critical constraint: the simulation thread never blocks on a search.**
// Every lock the orchestrator takes on the tick path is held only for
// bookkeeping, and cancellation is a flag the worker polls.

pub mod agent;
pub mod config;
pub mod context;
pub mod costs;
pub mod error;
pub mod event;
pub mod executor;
pub mod failure_memory;
pub mod goal;
pub mod movement;
pub mod moves;
pub mod orchestrator;
pub mod path;
pub mod pathfinding;
pub mod provider;
pub mod types;
pub mod world;

pub use config::PathingConfig;
pub use error::{ConfigError, PathingError, PathingResult};
pub use event::{PathEvent, PathEventListener, TracingListener};
pub use goal::Goal;
pub use orchestrator::{PathingOrchestrator, PathingState, TickOutput};
pub use types::{BlockPos, BlockState};

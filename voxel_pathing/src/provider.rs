// Movement providers: candidate generation for the search.
//
// A provider enumerates, for one node, every movement that could leave it,
// costs each through `moves::evaluate`, and folds in the failure-memory
// multiplier. Candidates whose cost reaches `COST_INF` are dropped here so
// the search never sees them. Favoring multipliers (previous segment, hostile
// avoidance) depend on the destination node and are applied by the search.
//
// Providers compose additively: `Composite` concatenates its members'
// candidates. The final candidate set does not depend on member order, only
// the enumeration order does.
//
// `candidates()` also reports how many neighbours were skipped because their
// chunk is not loaded, which feeds the search's chunk-border fetch limit.
//
// See also: `moves.rs` (per-kind rules), `pathfinding.rs` (consumer),
// `failure_memory.rs` (penalties).

use crate::config::PathingConfig;
use crate::context::CalculationContext;
use crate::costs::COST_INF;
use crate::movement::{Movement, MovementKind, SwimDirection};
use crate::moves;
use crate::types::{BlockPos, CARDINALS, DIAGONALS};

/// One outgoing edge: the movement plus its cost after failure penalties.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub movement: Movement,
    pub cost: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MovementProvider {
    /// Walking, climbing, falling, parkour, pillaring, digging down.
    Terrestrial,
    Swimming,
    /// Long-range teleport along the cardinal axes.
    Teleport,
    Composite(Vec<MovementProvider>),
}

impl MovementProvider {
    /// The providers enabled by `config`.
    pub fn from_config(config: &PathingConfig) -> Self {
        let mut members = vec![MovementProvider::Terrestrial];
        if config.allow_swimming {
            members.push(MovementProvider::Swimming);
        }
        if config.allow_teleport {
            members.push(MovementProvider::Teleport);
        }
        MovementProvider::Composite(members)
    }

    /// Append every viable movement out of `from` to `out`. Returns the
    /// number of neighbours skipped because their chunk is not loaded.
    pub fn candidates(
        &self,
        ctx: &CalculationContext,
        from: BlockPos,
        out: &mut Vec<Candidate>,
    ) -> usize {
        match self {
            MovementProvider::Terrestrial => terrestrial(ctx, from, out),
            MovementProvider::Swimming => swimming(ctx, from, out),
            MovementProvider::Teleport => teleports(ctx, from, out),
            MovementProvider::Composite(members) => members
                .iter()
                .map(|member| member.candidates(ctx, from, out))
                .sum(),
        }
    }
}

/// Evaluate one movement and keep it if it is viable. Returns whether it was
/// kept.
fn offer(
    ctx: &CalculationContext,
    out: &mut Vec<Candidate>,
    kind: MovementKind,
    src: BlockPos,
    dest: BlockPos,
) -> bool {
    if dest.y < 0 || dest.y >= ctx.height() {
        return false;
    }
    let Some(movement) = moves::evaluate(ctx, kind, src, dest) else {
        return false;
    };
    let cost = movement.cost * ctx.failures.penalty_for(src, kind);
    if cost >= COST_INF {
        return false;
    }
    out.push(Candidate { movement, cost });
    true
}

fn terrestrial(ctx: &CalculationContext, from: BlockPos, out: &mut Vec<Candidate>) -> usize {
    let config = &ctx.config;
    let mut unloaded = 0;

    for (dx, dz) in CARDINALS {
        let next = from.offset(dx, 0, dz);
        if !ctx.chunk_loaded(next.x, next.z) {
            unloaded += 1;
            continue;
        }
        offer(ctx, out, MovementKind::Traverse, from, next);
        offer(ctx, out, MovementKind::Ascend, from, next.up());
        if !offer(ctx, out, MovementKind::Descend, from, next.down()) {
            // Longer drop: land on the first solid block below.
            let max_fall = i32::try_from(config.max_fall_height_no_water).unwrap_or(i32::MAX);
            for n in 2..=max_fall {
                let landing = from.offset(dx, -n, dz);
                if landing.y < 0 || !moves::passable(ctx, landing) {
                    break;
                }
                if moves::can_walk_on(ctx, landing.down()) {
                    offer(ctx, out, MovementKind::Fall, from, landing);
                    break;
                }
            }
        }

        if config.allow_parkour {
            let max = if config.allow_sprint { 4 } else { 3 };
            let mut landed = false;
            for i in 2..=max {
                let dest = from.offset(dx * i, 0, dz * i);
                if !ctx.chunk_loaded(dest.x, dest.z) {
                    unloaded += 1;
                    break;
                }
                if offer(ctx, out, MovementKind::Parkour, from, dest) {
                    landed = true;
                    break;
                }
            }
            if !landed && config.allow_parkour_place {
                let dest = from.offset(dx * 4, 0, dz * 4);
                if ctx.chunk_loaded(dest.x, dest.z) {
                    offer(ctx, out, MovementKind::ParkourPlace, from, dest);
                }
            }
        }
    }

    for (dx, dz) in DIAGONALS {
        let next = from.offset(dx, 0, dz);
        if !ctx.chunk_loaded(next.x, next.z) {
            unloaded += 1;
            continue;
        }
        for dy in [0, -1, 1] {
            offer(ctx, out, MovementKind::Diagonal, from, next.offset(0, dy, 0));
        }
    }

    offer(ctx, out, MovementKind::Pillar, from, from.up());
    offer(ctx, out, MovementKind::Downward, from, from.down());
    unloaded
}

fn swimming(ctx: &CalculationContext, from: BlockPos, out: &mut Vec<Candidate>) -> usize {
    let mut unloaded = 0;
    for dir in SwimDirection::ALL {
        let (dx, dy, dz) = dir.offset();
        let dest = from.offset(dx, dy, dz);
        if !ctx.chunk_loaded(dest.x, dest.z) {
            unloaded += 1;
            continue;
        }
        offer(ctx, out, MovementKind::Swim(dir), from, dest);
    }
    unloaded
}

fn teleports(ctx: &CalculationContext, from: BlockPos, out: &mut Vec<Candidate>) -> usize {
    let config = &ctx.config;
    let step = config.teleport_step.max(1);
    let mut unloaded = 0;
    for (dx, dz) in CARDINALS {
        let mut distance = config.teleport_min_distance;
        while distance <= config.teleport_max_distance {
            let dest = from.offset(dx * distance, 0, dz * distance);
            if !ctx.chunk_loaded(dest.x, dest.z) {
                unloaded += 1;
                break;
            }
            offer(ctx, out, MovementKind::Teleport, from, dest);
            distance += step;
        }
    }
    unloaded
}

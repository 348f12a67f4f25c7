// Movements: the atomic transitions a path is made of.
//
// A `Movement` records where it starts and ends, its kind, the cost the
// search assigned to it (raw, before failure or favoring multipliers), and
// the blocks it has to break and place. Costs are computed in `moves.rs`;
// this file holds the data types plus the per-tick runtime logic that turns
// a planned movement into agent intents and reports its status.
//
// Runtime logic keeps no state of its own. Which blocks are still standing
// and where the agent is are read fresh each tick, so a movement can resume
// after any interruption.
//
// See also: `moves.rs` (cost evaluation per kind), `executor.rs` (drives
// `update()` once per tick), `agent.rs` (intent types and the reference
// agent that consumes them).
//
// **Critical constraint: kinds are keys.** `MovementKind` is hashed into the
// failure memory, so it must stay `Copy + Eq + Hash` and must not carry
// per-instance data beyond a direction.

use crate::agent::{AgentState, Intents, MovementIntent};
use crate::context::CalculationContext;
use crate::costs::COST_INF;
use crate::moves;
use crate::types::BlockPos;
use crate::world::WorldView;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwimDirection {
    Up,
    Down,
    /// -z
    North,
    /// +z
    South,
    /// +x
    East,
    /// -x
    West,
}

impl SwimDirection {
    pub const ALL: [SwimDirection; 6] = [
        SwimDirection::Up,
        SwimDirection::Down,
        SwimDirection::North,
        SwimDirection::South,
        SwimDirection::East,
        SwimDirection::West,
    ];

    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            SwimDirection::Up => (0, 1, 0),
            SwimDirection::Down => (0, -1, 0),
            SwimDirection::North => (0, 0, -1),
            SwimDirection::South => (0, 0, 1),
            SwimDirection::East => (1, 0, 0),
            SwimDirection::West => (-1, 0, 0),
        }
    }
}

/// The closed set of movement types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementKind {
    /// One block in a cardinal direction at the same level.
    Traverse,
    /// One block diagonally, optionally one block up or down.
    Diagonal,
    /// Step up one block in a cardinal direction.
    Ascend,
    /// Walk off an edge, landing one block lower.
    Descend,
    /// Walk off an edge, landing two or more blocks lower.
    Fall,
    /// Jump and place a block underneath.
    Pillar,
    /// Break the floor and drop one block.
    Downward,
    /// Jump across a gap of one to three blocks.
    Parkour,
    /// Parkour onto a block placed at the landing spot.
    ParkourPlace,
    Swim(SwimDirection),
    /// Long-range teleport to a standable position.
    Teleport,
}

impl MovementKind {
    /// Whether the agent may be interrupted at any on-ground point of this
    /// movement, rather than only before it starts.
    pub fn interruptible(self) -> bool {
        matches!(
            self,
            MovementKind::Traverse
                | MovementKind::Diagonal
                | MovementKind::Downward
                | MovementKind::Swim(_)
                | MovementKind::Teleport
        )
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementKind::Swim(dir) => write!(f, "Swim({dir:?})"),
            other => write!(f, "{other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// Why a movement (and with it the path) was abandoned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// The world changed so that the movement is now impossible.
    WorldChanged,
    /// The movement became much more expensive than planned.
    CostIncreased,
    /// The movement took too long.
    Timeout,
    /// The agent drifted too far from the path.
    OffPath,
    /// The agent ended up somewhere this movement cannot continue from.
    Unreachable,
    Cancelled,
}

/// Per-tick result of running a movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementStatus {
    Running,
    Success,
    Failed(FailureReason),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub src: BlockPos,
    pub dest: BlockPos,
    pub kind: MovementKind,
    /// Planned cost in ticks, before failure-memory and favoring multipliers.
    pub cost: f64,
    /// Blocks to clear, in the order they should be broken.
    pub to_break: SmallVec<[BlockPos; 4]>,
    /// Blocks to place, in order.
    pub to_place: SmallVec<[BlockPos; 2]>,
}

impl Movement {
    pub fn new(src: BlockPos, dest: BlockPos, kind: MovementKind, cost: f64) -> Self {
        Self {
            src,
            dest,
            kind,
            cost,
            to_break: SmallVec::new(),
            to_place: SmallVec::new(),
        }
    }

    /// Re-cost this movement against `ctx`. Returns `COST_INF` if it has
    /// become impossible.
    pub fn recalculate_cost(&self, ctx: &CalculationContext) -> f64 {
        moves::evaluate(ctx, self.kind, self.src, self.dest)
            .map(|m| m.cost)
            .unwrap_or(COST_INF)
    }

    /// Horizontal unit direction from `src` toward `dest`.
    fn heading(&self) -> (i32, i32) {
        (
            (self.dest.x - self.src.x).signum(),
            (self.dest.z - self.src.z).signum(),
        )
    }

    /// The position one step beyond `dest` along the movement's heading, for
    /// movements that have one.
    pub fn overshoot_position(&self) -> Option<BlockPos> {
        let (dx, dz) = self.heading();
        if (dx, dz) == (0, 0) || self.kind == MovementKind::Teleport {
            return None;
        }
        Some(self.dest.offset(dx, 0, dz))
    }

    /// Whether the agent standing at `pos` is somewhere this movement can
    /// still be completed from.
    pub fn is_valid_position(&self, pos: BlockPos) -> bool {
        if pos == self.src || pos == self.dest {
            return true;
        }
        match self.kind {
            MovementKind::Descend | MovementKind::Fall => {
                pos.x == self.dest.x
                    && pos.z == self.dest.z
                    && pos.y > self.dest.y
                    && pos.y <= self.src.y
            }
            MovementKind::Parkour | MovementKind::ParkourPlace => {
                let (dx, dz) = self.heading();
                let span = (self.dest.x - self.src.x).abs().max((self.dest.z - self.src.z).abs());
                (1..span).any(|j| pos == self.src.offset(dx * j, 0, dz * j))
            }
            MovementKind::Diagonal => {
                let (dx, dz) = self.heading();
                pos == self.src.offset(dx, 0, 0) || pos == self.src.offset(0, 0, dz)
            }
            _ => false,
        }
    }

    /// Whether interrupting here leaves the agent in a stable spot.
    pub fn safe_to_cancel(&self, agent: &AgentState, world: &dyn WorldView) -> bool {
        let in_water = world.block_at(agent.feet).is_water();
        if !agent.on_ground && !in_water {
            return false;
        }
        agent.feet == self.src || self.kind.interruptible()
    }

    /// Run one tick: decide what the agent should do and whether the
    /// movement is done.
    pub fn update(
        &self,
        agent: &AgentState,
        world: &dyn WorldView,
        allow_overshoot: bool,
        allow_sprint: bool,
    ) -> (MovementStatus, Intents) {
        let mut intents = Intents::new();

        if agent.feet == self.dest {
            return (MovementStatus::Success, intents);
        }
        if allow_overshoot && self.overshoot_position() == Some(agent.feet) {
            return (MovementStatus::Success, intents);
        }

        let supported = agent.on_ground || world.block_at(agent.feet).is_water();
        if supported && !self.is_valid_position(agent.feet) {
            return (MovementStatus::Failed(FailureReason::Unreachable), intents);
        }

        // Clear the way first.
        if let Some(&block) = self
            .to_break
            .iter()
            .find(|&&b| !world.block_at(b).can_walk_through())
        {
            intents.push(MovementIntent::LookAt(block));
            intents.push(MovementIntent::Break(block));
            return (MovementStatus::Running, intents);
        }

        // Then build what is missing.
        if let Some(&target) = self
            .to_place
            .iter()
            .find(|&&p| !world.block_at(p).can_walk_on())
        {
            if self.kind == MovementKind::Pillar {
                intents.push(MovementIntent::LookAt(target.down()));
                intents.push(MovementIntent::Jump);
                intents.push(MovementIntent::Place(target));
            } else {
                intents.push(MovementIntent::LookAt(target));
                intents.push(MovementIntent::Sneak);
                intents.push(MovementIntent::Place(target));
            }
            return (MovementStatus::Running, intents);
        }

        match self.kind {
            MovementKind::Teleport => {
                intents.push(MovementIntent::Teleport(self.dest));
            }
            MovementKind::Pillar => {
                // Block already placed below the destination; just hop up.
                intents.push(MovementIntent::Jump);
                intents.push(MovementIntent::MoveToward(self.dest));
            }
            kind => {
                intents.push(MovementIntent::LookAt(self.dest));
                intents.push(MovementIntent::MoveToward(self.dest));
                let climbs = self.dest.y > self.src.y && !matches!(kind, MovementKind::Swim(_));
                let leaps = matches!(kind, MovementKind::Parkour | MovementKind::ParkourPlace);
                if climbs || leaps {
                    intents.push(MovementIntent::Jump);
                }
                let sprintable = matches!(
                    kind,
                    MovementKind::Traverse
                        | MovementKind::Diagonal
                        | MovementKind::Parkour
                        | MovementKind::ParkourPlace
                );
                if allow_sprint && sprintable && agent.feet == self.src {
                    intents.push(MovementIntent::Sprint);
                }
            }
        }
        (MovementStatus::Running, intents)
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} ({:.2})",
            self.kind, self.src, self.dest, self.cost
        )
    }
}

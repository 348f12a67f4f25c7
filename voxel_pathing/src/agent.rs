// Agent state, movement intents, and a headless kinematic agent.
//
// The engine never moves anything itself. Each tick the executor turns the
// active movement into a small list of `MovementIntent`s (look here, walk
// there, jump, break that block) and hands them to whatever drives the
// agent. `KinematicAgent` is the reference consumer used by the demo binary
// and the integration tests: it moves a whole block at a time, applies
// gravity instantly, and mutates a `LiveWorld` when breaking or placing.
//
// See also: `movement.rs` (produces intents), `orchestrator.rs` (returns
// them from `tick`), `world.rs` (`LiveWorld`).

use crate::types::{BlockPos, BlockState};
use crate::world::LiveWorld;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Where the agent is, as seen by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    /// The block the agent's feet occupy.
    pub feet: BlockPos,
    pub on_ground: bool,
}

/// A low-level action requested for the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementIntent {
    LookAt(BlockPos),
    MoveToward(BlockPos),
    Jump,
    Sneak,
    Sprint,
    Break(BlockPos),
    Place(BlockPos),
    Teleport(BlockPos),
}

pub type Intents = SmallVec<[MovementIntent; 4]>;

/// Block the kinematic agent places.
pub const PLACED_BLOCK: BlockState = BlockState::Dirt;

/// A grid-stepping agent that executes intents against a `LiveWorld`.
#[derive(Debug)]
pub struct KinematicAgent {
    feet: BlockPos,
    /// Ticks needed to cross one block horizontally.
    ticks_per_block: u32,
    move_progress: u32,
    move_target: Option<BlockPos>,
    /// Block currently being broken and the ticks spent on it.
    breaking: Option<(BlockPos, u32)>,
}

impl KinematicAgent {
    pub fn new(feet: BlockPos, ticks_per_block: u32) -> Self {
        Self {
            feet,
            ticks_per_block: ticks_per_block.max(1),
            move_progress: 0,
            move_target: None,
            breaking: None,
        }
    }

    pub fn feet(&self) -> BlockPos {
        self.feet
    }

    /// Current state, with `on_ground` read from the world. Resting on a
    /// water surface counts as grounded.
    pub fn state(&self, world: &LiveWorld) -> AgentState {
        let below = world.get(self.feet.down());
        AgentState {
            feet: self.feet,
            on_ground: below.can_walk_on() || below.is_water(),
        }
    }

    /// Move the agent directly, as an external push would.
    pub fn teleport_to(&mut self, feet: BlockPos) {
        self.feet = feet;
        self.move_progress = 0;
        self.move_target = None;
        self.breaking = None;
    }

    /// Apply one tick's intents.
    pub fn apply(&mut self, intents: &[MovementIntent], world: &LiveWorld) {
        let jumping = intents.contains(&MovementIntent::Jump);
        let mut moved_toward = None;

        for intent in intents {
            match *intent {
                MovementIntent::Break(pos) => self.tick_break(pos, world),
                MovementIntent::Place(pos) => self.place(pos, jumping, world),
                MovementIntent::Teleport(pos) => self.teleport_to(pos),
                MovementIntent::MoveToward(target) => moved_toward = Some(target),
                MovementIntent::LookAt(_)
                | MovementIntent::Jump
                | MovementIntent::Sneak
                | MovementIntent::Sprint => {}
            }
        }

        if !intents.iter().any(|i| matches!(i, MovementIntent::Break(_))) {
            self.breaking = None;
        }
        match moved_toward {
            Some(target) => self.tick_move(target, jumping, world),
            None => {
                self.move_progress = 0;
                self.move_target = None;
            }
        }
        self.apply_gravity(world);
    }

    fn tick_break(&mut self, pos: BlockPos, world: &LiveWorld) {
        let block = world.get(pos);
        let Some(needed) = block.break_ticks() else {
            return;
        };
        let spent = match self.breaking {
            Some((current, spent)) if current == pos => spent + 1,
            _ => 1,
        };
        if f64::from(spent) >= needed {
            world.modify(|w| w.set(pos, BlockState::Air));
            self.breaking = None;
        } else {
            self.breaking = Some((pos, spent));
        }
    }

    fn place(&mut self, pos: BlockPos, jumping: bool, world: &LiveWorld) {
        let current = world.get(pos);
        if current.can_walk_on() {
            return;
        }
        if pos == self.feet {
            // Jump-place: only possible with a jump and room overhead.
            if !jumping || !world.get(self.feet.up_by(2)).can_walk_through() {
                return;
            }
            self.feet = self.feet.up();
        }
        world.modify(|w| w.set(pos, PLACED_BLOCK));
    }

    fn tick_move(&mut self, target: BlockPos, jumping: bool, world: &LiveWorld) {
        if self.move_target != Some(target) {
            self.move_target = Some(target);
            self.move_progress = 0;
        }
        self.move_progress += 1;

        let span = (target.x - self.feet.x)
            .abs()
            .max((target.z - self.feet.z).abs())
            .max(1) as u32;
        if self.move_progress < self.ticks_per_block * span {
            return;
        }
        self.move_progress = 0;
        self.move_target = None;

        let in_water = world.get(self.feet).is_water();
        let next_y = if target.y > self.feet.y && (jumping || in_water) {
            self.feet.y + 1
        } else {
            self.feet.y
        };
        let horizontal = target.x != self.feet.x || target.z != self.feet.z;
        let next = if horizontal {
            BlockPos::new(target.x, next_y, target.z)
        } else if target.y < self.feet.y {
            self.feet.down()
        } else {
            BlockPos::new(self.feet.x, next_y, self.feet.z)
        };

        let body_clear = |pos: BlockPos| {
            let feet = world.get(pos);
            let head = world.get(pos.up());
            (feet.can_walk_through() || feet.is_water())
                && (head.can_walk_through() || head.is_water())
        };
        if body_clear(next) {
            self.feet = next;
        }
    }

    fn apply_gravity(&mut self, world: &LiveWorld) {
        while self.feet.y > 0 && world.get(self.feet.down()) == BlockState::Air {
            if world.get(self.feet).is_water() {
                break;
            }
            self.feet = self.feet.down();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::VoxelWorld;

    fn p(x: i32, y: i32, z: i32) -> BlockPos {
        BlockPos::new(x, y, z)
    }

    fn flat() -> LiveWorld {
        LiveWorld::new(VoxelWorld::flat(16, 8, 16, BlockState::Stone))
    }

    #[test]
    fn walks_one_block_after_enough_ticks() {
        let world = flat();
        let mut agent = KinematicAgent::new(p(1, 1, 1), 3);
        let intents = [MovementIntent::MoveToward(p(2, 1, 1))];
        agent.apply(&intents, &world);
        agent.apply(&intents, &world);
        assert_eq!(agent.feet(), p(1, 1, 1));
        agent.apply(&intents, &world);
        assert_eq!(agent.feet(), p(2, 1, 1));
        assert!(agent.state(&world).on_ground);
    }

    #[test]
    fn climbing_needs_a_jump() {
        let world = flat();
        world.modify(|w| w.set(p(2, 1, 1), BlockState::Stone));
        let mut agent = KinematicAgent::new(p(1, 1, 1), 1);
        agent.apply(&[MovementIntent::MoveToward(p(2, 2, 1))], &world);
        assert_eq!(agent.feet(), p(1, 1, 1));
        agent.apply(
            &[MovementIntent::MoveToward(p(2, 2, 1)), MovementIntent::Jump],
            &world,
        );
        assert_eq!(agent.feet(), p(2, 2, 1));
    }

    #[test]
    fn walking_off_an_edge_falls_to_the_floor() {
        let world = flat();
        world.modify(|w| w.fill(p(0, 1, 0), p(1, 3, 15), BlockState::Stone));
        let mut agent = KinematicAgent::new(p(1, 4, 1), 1);
        agent.apply(&[MovementIntent::MoveToward(p(2, 1, 1))], &world);
        assert_eq!(agent.feet(), p(2, 1, 1));
    }

    #[test]
    fn breaking_takes_break_ticks() {
        let world = flat();
        world.modify(|w| w.set(p(2, 1, 1), BlockState::Dirt));
        let mut agent = KinematicAgent::new(p(1, 1, 1), 1);
        let intents = [MovementIntent::Break(p(2, 1, 1))];
        for _ in 0..14 {
            agent.apply(&intents, &world);
        }
        assert_eq!(world.get(p(2, 1, 1)), BlockState::Dirt);
        agent.apply(&intents, &world);
        assert_eq!(world.get(p(2, 1, 1)), BlockState::Air);
    }

    #[test]
    fn jump_place_raises_the_agent() {
        let world = flat();
        let mut agent = KinematicAgent::new(p(1, 1, 1), 1);
        agent.apply(&[MovementIntent::Jump, MovementIntent::Place(p(1, 1, 1))], &world);
        assert_eq!(agent.feet(), p(1, 2, 1));
        assert_eq!(world.get(p(1, 1, 1)), PLACED_BLOCK);
    }

    #[test]
    fn bedrock_cannot_be_broken() {
        let world = flat();
        world.modify(|w| w.set(p(2, 1, 1), BlockState::Bedrock));
        let mut agent = KinematicAgent::new(p(1, 1, 1), 1);
        for _ in 0..500 {
            agent.apply(&[MovementIntent::Break(p(2, 1, 1))], &world);
        }
        assert_eq!(world.get(p(2, 1, 1)), BlockState::Bedrock);
    }
}

// World query interface and the reference voxel world.
//
// The engine never owns the world. It reads it through `WorldView`
// (point-in-time block queries plus chunk-loaded checks) and obtains a view
// for each search through `WorldSource::snapshot()`. A snapshot must stay
// coherent for the whole search even while the simulation thread keeps
// mutating the live world.
//
// `VoxelWorld` is a dense 3D grid stored as a flat `Vec<BlockState>` indexed
// by `x + z * size_x + y * size_x * size_z`, giving O(1) reads. Out-of-bounds
// reads return `Air`; out-of-bounds writes are no-ops. Columns outside the
// x/z bounds, and any chunk explicitly marked unloaded, report
// `chunk_loaded == false` so the search treats them as unknown territory.
//
// `LiveWorld` wraps a `VoxelWorld` in copy-on-write fashion: writers mutate
// through `modify()`, which clones the grid only when a search still holds
// the previous snapshot.
//
// See also: `context.rs` which hands a snapshot to each search,
// `moves.rs` for the walkability helpers that read through `WorldView`.
//
// **Critical constraint: snapshot coherence.** Nothing handed out by
// `snapshot()` may change underneath a running search.

use crate::types::{BlockPos, BlockState};
use rustc_hash::FxHashSet;
use std::sync::{Arc, PoisonError, RwLock};

/// Chunks are 16x16 columns of blocks.
pub const CHUNK_SHIFT: i32 = 4;

/// Read-only access to block state. Implementations must be safe to read
/// from the search worker while the simulation thread runs.
pub trait WorldView: Send + Sync {
    /// The block at `pos`. Positions outside the world read as `Air`.
    fn block_at(&self, pos: BlockPos) -> BlockState;

    /// Whether the chunk containing block column `(x, z)` is loaded.
    fn chunk_loaded(&self, x: i32, z: i32) -> bool;

    /// Exclusive upper bound on feet y-coordinates. Valid y is `0..height()`.
    fn height(&self) -> i32;

    /// Positions of hostile entities the cost model should steer around.
    fn hostile_positions(&self) -> Vec<BlockPos> {
        Vec::new()
    }
}

/// Hands out coherent per-search views of a changing world.
pub trait WorldSource: Send + Sync {
    fn snapshot(&self) -> Arc<dyn WorldView>;
}

/// Dense 3D block grid.
#[derive(Clone, Debug, Default)]
pub struct VoxelWorld {
    /// Flat storage: index = x + z * size_x + y * size_x * size_z.
    blocks: Vec<BlockState>,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
    /// Chunk coordinates `(x >> 4, z >> 4)` that read as unloaded.
    unloaded_chunks: FxHashSet<(i32, i32)>,
    hostiles: Vec<BlockPos>,
}

impl VoxelWorld {
    /// Create a new world filled with `Air`.
    pub fn new(size_x: u32, size_y: u32, size_z: u32) -> Self {
        let total = (size_x as usize) * (size_y as usize) * (size_z as usize);
        Self {
            blocks: vec![BlockState::Air; total],
            size_x,
            size_y,
            size_z,
            unloaded_chunks: FxHashSet::default(),
            hostiles: Vec::new(),
        }
    }

    /// A world whose layer `y = 0` is `floor` and everything above is air.
    pub fn flat(size_x: u32, size_y: u32, size_z: u32, floor: BlockState) -> Self {
        let mut world = Self::new(size_x, size_y, size_z);
        world.fill(
            BlockPos::new(0, 0, 0),
            BlockPos::new(size_x as i32 - 1, 0, size_z as i32 - 1),
            floor,
        );
        world
    }

    /// Check whether a coordinate is within bounds.
    pub fn in_bounds(&self, pos: BlockPos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && (pos.x as u32) < self.size_x
            && (pos.y as u32) < self.size_y
            && (pos.z as u32) < self.size_z
    }

    /// Convert a coordinate to a flat index. Returns `None` if out of bounds.
    fn index(&self, pos: BlockPos) -> Option<usize> {
        if self.in_bounds(pos) {
            let x = pos.x as usize;
            let y = pos.y as usize;
            let z = pos.z as usize;
            let sx = self.size_x as usize;
            let sz = self.size_z as usize;
            Some(x + z * sx + y * sx * sz)
        } else {
            None
        }
    }

    /// Read a block. Returns `Air` for out-of-bounds coordinates.
    pub fn get(&self, pos: BlockPos) -> BlockState {
        self.index(pos)
            .map(|i| self.blocks[i])
            .unwrap_or(BlockState::Air)
    }

    /// Write a block. No-op for out-of-bounds coordinates.
    pub fn set(&mut self, pos: BlockPos, block: BlockState) {
        if let Some(i) = self.index(pos) {
            self.blocks[i] = block;
        }
    }

    /// Fill the inclusive box spanned by `a` and `b`.
    pub fn fill(&mut self, a: BlockPos, b: BlockPos, block: BlockState) {
        for y in a.y.min(b.y)..=a.y.max(b.y) {
            for z in a.z.min(b.z)..=a.z.max(b.z) {
                for x in a.x.min(b.x)..=a.x.max(b.x) {
                    self.set(BlockPos::new(x, y, z), block);
                }
            }
        }
    }

    /// Returns `true` if any of the 6 face-adjacent blocks satisfies `pred`.
    ///
    /// Out-of-bounds neighbors read as `Air`, so boundary positions need no
    /// special casing.
    pub fn has_face_neighbor_matching(
        &self,
        pos: BlockPos,
        pred: impl Fn(BlockState) -> bool,
    ) -> bool {
        pos.face_neighbors().iter().any(|&n| pred(self.get(n)))
    }

    /// Mark the chunk containing block column `(x, z)` loaded or unloaded.
    pub fn set_chunk_loaded(&mut self, x: i32, z: i32, loaded: bool) {
        let key = (x >> CHUNK_SHIFT, z >> CHUNK_SHIFT);
        if loaded {
            self.unloaded_chunks.remove(&key);
        } else {
            self.unloaded_chunks.insert(key);
        }
    }

    pub fn set_hostiles(&mut self, hostiles: Vec<BlockPos>) {
        self.hostiles = hostiles;
    }
}

impl WorldView for VoxelWorld {
    fn block_at(&self, pos: BlockPos) -> BlockState {
        self.get(pos)
    }

    fn chunk_loaded(&self, x: i32, z: i32) -> bool {
        x >= 0
            && z >= 0
            && (x as u32) < self.size_x
            && (z as u32) < self.size_z
            && !self
                .unloaded_chunks
                .contains(&(x >> CHUNK_SHIFT, z >> CHUNK_SHIFT))
    }

    fn height(&self) -> i32 {
        self.size_y as i32
    }

    fn hostile_positions(&self) -> Vec<BlockPos> {
        self.hostiles.clone()
    }
}

/// A `VoxelWorld` shared between the simulation thread (writer) and search
/// workers (readers of snapshots).
#[derive(Debug)]
pub struct LiveWorld {
    current: RwLock<Arc<VoxelWorld>>,
}

impl LiveWorld {
    pub fn new(world: VoxelWorld) -> Self {
        Self {
            current: RwLock::new(Arc::new(world)),
        }
    }

    /// Mutate the world. Snapshots taken before this call keep seeing the old
    /// contents.
    pub fn modify<R>(&self, f: impl FnOnce(&mut VoxelWorld) -> R) -> R {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        f(Arc::make_mut(&mut guard))
    }

    /// The current contents, as a cheap shared handle.
    pub fn current(&self) -> Arc<VoxelWorld> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn get(&self, pos: BlockPos) -> BlockState {
        self.current().get(pos)
    }
}

impl WorldSource for LiveWorld {
    fn snapshot(&self) -> Arc<dyn WorldView> {
        self.current()
    }
}

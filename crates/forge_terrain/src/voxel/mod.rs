//! Voxel data: block types, voxels, chunk coordinates and the chunk map.

mod block;
mod chunk;
mod direction;
mod map;

pub use block::{BlockDef, BlockId, BlockRegistry, BlockShape};
pub use chunk::{Chunk, ChunkCoord, Voxel, CHUNK_SIZE};
pub use direction::{Axis, Direction};
pub use map::ChunkMap;

//! # Memory Management
//!
//! Reusable object pools for allocation-free ticks.
//!
//! ## Design Philosophy
//!
//! Scratch objects are allocated while the pool warms up. After that:
//! - No heap allocations
//! - Slots are reset on acquire, never assumed zeroed

mod pool;

pub use pool::{PoolHandle, Reset, SlotPool};

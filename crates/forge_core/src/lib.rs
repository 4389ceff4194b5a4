//! # FORGE Core
//!
//! Engine-agnostic building blocks shared by the FORGE crates:
//! - [`memory::SlotPool`] - reusable scratch objects addressed by handle
//! - [`timer::ActionTimer`] - fixed-interval tick driver
//!
//! ## Architecture Rules
//!
//! 1. **Single-threaded** - Nothing here synchronizes; owners drive it
//! 2. **Reuse over allocation** - Pools keep memory between uses

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod memory;
pub mod timer;

pub use memory::{PoolHandle, Reset, SlotPool};
pub use timer::ActionTimer;

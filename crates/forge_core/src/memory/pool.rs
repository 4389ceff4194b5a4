//! # Slot Pool
//!
//! Reusable object pool for scratch structs that are acquired and released
//! many times per tick.

use tracing::debug;

/// Objects that can be returned to a pristine state in place.
///
/// Pools call [`Reset::reset`] on every acquire, so callers never observe
/// state left behind by a previous user of the slot.
pub trait Reset {
    /// Restores the object to its freshly-constructed state.
    fn reset(&mut self);
}

/// A slot pool for reusable objects.
///
/// Unlike a plain `Vec`, released slots keep their heap allocations and are
/// handed out again by later acquires. Slots are addressed by [`PoolHandle`],
/// which keeps ownership with the pool and lets callers hold many
/// "references" to pooled objects without borrowing the pool.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Use one pool per thread or wrap in a mutex.
///
/// # Example
///
/// ```rust
/// use forge_core::memory::{Reset, SlotPool};
///
/// #[derive(Default)]
/// struct Run { len: u32 }
///
/// impl Reset for Run {
///     fn reset(&mut self) { self.len = 0; }
/// }
///
/// let mut pool: SlotPool<Run> = SlotPool::with_capacity(16);
/// let handle = pool.acquire();
/// pool.get_mut(handle).unwrap().len = 3;
/// pool.release(handle);
///
/// // Same slot, reset on acquire.
/// let again = pool.acquire();
/// assert_eq!(pool.get(again).unwrap().len, 0);
/// ```
pub struct SlotPool<T> {
    /// The storage array. Slots are never dropped until [`SlotPool::purge`].
    storage: Vec<T>,
    /// Occupancy per slot.
    in_use: Vec<bool>,
    /// Free list - indices of available slots.
    free_list: Vec<usize>,
    /// Number of acquired objects.
    allocated_count: usize,
}

/// Handle to an acquired object in a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    /// Index into the pool.
    index: usize,
}

impl<T: Default + Reset> SlotPool<T> {
    /// Creates a new pool with `capacity` pre-constructed slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let storage: Vec<T> = (0..capacity).map(|_| T::default()).collect();

        Self {
            storage,
            in_use: vec![false; capacity],
            free_list: (0..capacity).rev().collect(),
            allocated_count: 0,
        }
    }

    /// Acquires a slot, growing the pool when every slot is taken.
    ///
    /// The returned object has been reset.
    pub fn acquire(&mut self) -> PoolHandle {
        let index = if let Some(index) = self.free_list.pop() {
            index
        } else {
            let index = self.storage.len();
            self.storage.push(T::default());
            self.in_use.push(false);
            if index.is_power_of_two() {
                debug!("slot pool grew to {} slots", index + 1);
            }
            index
        };

        self.storage[index].reset();
        self.in_use[index] = true;
        self.allocated_count += 1;

        PoolHandle { index }
    }
}

impl<T> SlotPool<T> {
    /// Returns the number of slots, acquired or free.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Returns the number of currently acquired objects.
    #[inline]
    #[must_use]
    pub const fn allocated_count(&self) -> usize {
        self.allocated_count
    }

    /// Returns a slot to the pool.
    ///
    /// Returns false if the handle was not acquired.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        match self.in_use.get_mut(handle.index) {
            Some(used) if *used => {
                *used = false;
                self.free_list.push(handle.index);
                self.allocated_count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Gets a reference to an acquired object.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        if *self.in_use.get(handle.index)? {
            self.storage.get(handle.index)
        } else {
            None
        }
    }

    /// Gets a mutable reference to an acquired object.
    #[inline]
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        if *self.in_use.get(handle.index)? {
            self.storage.get_mut(handle.index)
        } else {
            None
        }
    }

    /// Drops every slot and its memory.
    pub fn purge(&mut self) {
        self.storage = Vec::new();
        self.in_use = Vec::new();
        self.free_list = Vec::new();
        self.allocated_count = 0;
    }
}

impl<T: Default + Reset> Default for SlotPool<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

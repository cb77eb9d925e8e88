//! Write fence between cache population and invalidation.
//!
//! Invalidation advances a generation counter while holding the write lock.
//! A read-through records the generation before fetching and populates only
//! if the generation is unchanged once it holds the read lock. A fetch that
//! overlapped a write therefore cannot re-insert pre-write data after that
//! write's eviction.

use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct WriteFence {
    generation: RwLock<u64>,
}

impl WriteFence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        *self.generation.read()
    }

    /// Run `populate` only if no invalidation happened since `observed`.
    pub fn populate_if_current<R>(&self, observed: u64, populate: impl FnOnce() -> R) -> Option<R> {
        let generation = self.generation.read();
        if *generation != observed {
            return None;
        }
        Some(populate())
    }

    /// Advance the generation and run `evict` before any populate can proceed.
    pub fn advance<R>(&self, evict: impl FnOnce() -> R) -> R {
        let mut generation = self.generation.write();
        *generation = generation.wrapping_add(1);
        evict()
    }
}

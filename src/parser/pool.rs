// this_file: src/parser/pool.rs

//! A small free list of reusable index scratch buffers.
//!
//! Every open array or object needs somewhere to accumulate the indexes of
//! its children while it's being built. Rather than allocate a fresh `Vec`
//! per container (and rather than hand-rolling an unsafe bump allocator the
//! way a from-scratch memory pool would), each open container borrows one
//! from this pool and returns it once it closes, so a deeply-nested or
//! repeatedly-parsed document reuses the same handful of allocations.

#[derive(Default)]
pub(crate) struct TempIndexPool {
    free: Vec<Vec<u32>>,
}

impl TempIndexPool {
    pub fn new() -> Self {
        TempIndexPool { free: Vec::new() }
    }

    pub fn acquire(&mut self) -> Vec<u32> {
        self.free.pop().unwrap_or_default()
    }

    pub fn release(&mut self, mut indices: Vec<u32>) {
        indices.clear();
        self.free.push(indices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_released_buffers() {
        let mut pool = TempIndexPool::new();
        let mut a = pool.acquire();
        a.push(1);
        a.push(2);
        let cap = a.capacity();
        pool.release(a);

        let b = pool.acquire();
        assert!(b.is_empty());
        assert!(b.capacity() >= cap);
    }

    #[test]
    fn acquire_on_empty_pool_allocates_fresh() {
        let mut pool = TempIndexPool::new();
        let v = pool.acquire();
        assert!(v.is_empty());
    }
}

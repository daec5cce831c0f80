//! A LIFO free-list of reusable values.

use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

/// A LIFO pool of reusable values.
///
/// Values are lent out through [`PoolGuard`], which puts them back on drop,
/// so a value returns to the pool on every exit path including early
/// returns and errors. A value is never held by two callers at once. The
/// pool retains at most `capacity` idle values; surplus returns are
/// dropped.
pub struct Pool<T> {
    idle: Mutex<Vec<T>>,
    capacity: usize,
    make: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T> Pool<T> {
    /// Creates a pool that builds fresh values with `make` when empty.
    pub fn new(capacity: usize, make: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            capacity,
            make: Box::new(make),
        }
    }

    /// Takes the most recently returned value, or builds a fresh one.
    pub fn acquire(&self) -> PoolGuard<'_, T> {
        let value = self.idle.lock().pop().unwrap_or_else(|| (self.make)());
        PoolGuard {
            pool: self,
            value: Some(value),
        }
    }

    /// Number of idle values currently pooled.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    fn release(&self, value: T) {
        let mut idle = self.idle.lock();
        if idle.len() < self.capacity {
            idle.push(value);
        }
    }
}

/// Scoped loan of a pooled value.
pub struct PoolGuard<'a, T> {
    pool: &'a Pool<T>,
    value: Option<T>,
}

impl<T> Deref for PoolGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value.as_ref().expect("pool guard already released")
    }
}

impl<T> DerefMut for PoolGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_mut().expect("pool guard already released")
    }
}

impl<T> Drop for PoolGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.pool.release(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_builds_when_empty() {
        let pool = Pool::new(4, || vec![0u8; 8]);
        assert_eq!(pool.idle_count(), 0);
        let guard = pool.acquire();
        assert_eq!(guard.len(), 8);
    }

    #[test]
    fn test_release_on_drop() {
        let pool = Pool::new(4, || 0u32);
        {
            let _guard = pool.acquire();
            assert_eq!(pool.idle_count(), 0);
        }
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_lifo_reuse() {
        let pool = Pool::new(4, || Vec::<u8>::new());
        {
            let mut guard = pool.acquire();
            guard.push(42);
        }
        // the same value comes back, most recent first
        let guard = pool.acquire();
        assert_eq!(*guard, vec![42]);
    }

    #[test]
    fn test_two_loans_are_distinct() {
        let pool = Pool::new(4, || Vec::<u8>::new());
        let mut first = pool.acquire();
        let mut second = pool.acquire();
        first.push(1);
        second.push(2);
        assert_eq!(*first, vec![1]);
        assert_eq!(*second, vec![2]);
    }

    #[test]
    fn test_capacity_bounds_idle_values() {
        let pool = Pool::new(1, || 0u32);
        let first = pool.acquire();
        let second = pool.acquire();
        drop(first);
        drop(second);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_release_on_panic_path() {
        let pool = Pool::new(4, || 0u32);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = pool.acquire();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(pool.idle_count(), 1);
    }
}

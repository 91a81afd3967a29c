//! Bounded per-level parallel execution.
//!
//! Mip levels are independent units of work: each one writes only its own
//! output grid and reads shared immutable input. [`LevelExecutor`] fans one
//! task out per level on a reusable rayon pool and joins before returning,
//! so callers see a plain barrier.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{Result, TextureError};

/// Reusable worker pool that runs one task per mip level.
#[derive(Debug)]
pub struct LevelExecutor {
    pool: ThreadPool,
}

impl LevelExecutor {
    /// Build a pool with `threads` workers, or one per CPU when `None`.
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let mut builder =
            ThreadPoolBuilder::new().thread_name(|i| format!("level-worker-{}", i));

        if let Some(n) = threads {
            if n == 0 {
                return Err(TextureError::configuration(
                    "level executor needs at least one thread",
                ));
            }
            builder = builder.num_threads(n);
        }

        let pool = builder.build().map_err(|e| {
            TextureError::configuration(format!("failed to start level worker pool: {}", e))
        })?;

        tracing::debug!(threads = pool.current_num_threads(), "Level executor ready");
        Ok(Self { pool })
    }

    /// Number of worker threads in the pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `f(level_index, level)` for every level concurrently.
    ///
    /// Returns after all levels finished. If any task fails, the first
    /// error observed is returned.
    pub fn for_each_level<T, F>(&self, levels: &mut [T], f: F) -> Result<()>
    where
        T: Send,
        F: Fn(usize, &mut T) -> Result<()> + Sync,
    {
        self.pool.install(|| {
            levels
                .par_iter_mut()
                .with_max_len(1)
                .enumerate()
                .try_for_each(|(index, level)| f(index, level))
        })
    }

    /// Run `f(level_index)` for `0..count` concurrently and collect the
    /// results in level order.
    pub fn map_levels<R, F>(&self, count: usize, f: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(usize) -> Result<R> + Sync,
    {
        self.pool.install(|| {
            (0..count)
                .into_par_iter()
                .with_max_len(1)
                .map(|index| f(index))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_zero_threads_rejected() {
        assert!(LevelExecutor::new(Some(0)).is_err());
    }

    #[test]
    fn test_each_level_written_once() {
        let executor = LevelExecutor::new(Some(3)).unwrap();
        let mut levels = vec![0usize; 12];
        executor
            .for_each_level(&mut levels, |i, slot| {
                *slot += i * 10;
                Ok(())
            })
            .unwrap();
        let expected: Vec<usize> = (0..12).map(|i| i * 10).collect();
        assert_eq!(levels, expected);
    }

    #[test]
    fn test_join_waits_for_every_level() {
        let executor = LevelExecutor::new(Some(2)).unwrap();
        let done = AtomicUsize::new(0);
        let mut levels = vec![(); 9];
        executor
            .for_each_level(&mut levels, |_, _| {
                std::thread::sleep(std::time::Duration::from_millis(2));
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        assert_eq!(done.load(Ordering::SeqCst), 9);
    }

    #[test]
    fn test_error_propagates() {
        let executor = LevelExecutor::new(Some(2)).unwrap();
        let mut levels = vec![0u8; 4];
        let result = executor.for_each_level(&mut levels, |i, _| {
            if i == 2 {
                Err(TextureError::Cancelled)
            } else {
                Ok(())
            }
        });
        assert!(matches!(result, Err(TextureError::Cancelled)));
    }

    #[test]
    fn test_map_levels_keeps_order() {
        let executor = LevelExecutor::new(None).unwrap();
        let out = executor.map_levels(6, |i| Ok(format!("level_{}", i))).unwrap();
        assert_eq!(out[0], "level_0");
        assert_eq!(out[5], "level_5");
        assert_eq!(out.len(), 6);
    }
}

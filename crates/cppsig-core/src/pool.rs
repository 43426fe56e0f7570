//! Bounded worker pools.
//!
//! Every fan-out in cppsig runs inside a [`WorkerPool`]: a named rayon pool
//! with a fixed number of threads. Work submitted through [`WorkerPool::map`]
//! never has more than [`WorkerPool::threads`] items in flight, which keeps
//! open file descriptors and resident buffers bounded no matter how many
//! files a project contains.

use std::num::NonZeroUsize;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::ScanError;

/// Archive entry extraction is I/O bound, so its pool is this many times
/// larger than the CPU-bound hashing pool.
pub const EXTRACT_CONCURRENCY_MULTIPLIER: usize = 8;

/// Number of CPUs available to this process (at least 1).
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// A fixed-size pool of worker threads.
pub struct WorkerPool {
    name: String,
    pool: ThreadPool,
}

impl WorkerPool {
    /// Start a pool with `threads` workers (clamped to at least one).
    pub fn new(name: impl Into<String>, threads: usize) -> Result<Self, ScanError> {
        let name = name.into();
        let prefix = name.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(move |index| format!("{prefix}-{index}"))
            .build()
            .map_err(|source| ScanError::ThreadPool {
                name: name.clone(),
                source,
            })?;

        tracing::debug!(pool = %name, threads = pool.current_num_threads(), "worker pool started");

        Ok(Self { name, pool })
    }

    /// Pool name, used as the worker thread prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Concurrency ceiling of this pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` on the pool, blocking until it returns.
    pub fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        self.pool.install(op)
    }

    /// Apply `f` to every item with at most `threads()` calls running at once.
    ///
    /// Output order follows input order.
    pub fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        self.pool.install(|| items.into_par_iter().map(f).collect())
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("threads", &self.threads())
            .finish()
    }
}

#![deny(missing_docs)]

//! A bounded worker pool.
//!
//! A fixed number of worker threads pull items of a single type from one
//! shared FIFO queue and run the same work function on each of them. Every
//! worker can run a setup hook before its loop and a teardown hook after it.
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use worker_pools::{Context, WorkerPool};
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = seen.clone();
//! let pool = WorkerPool::builder(move |_ctx: &Context, n: usize| {
//!     counter.fetch_add(n, Ordering::SeqCst);
//! })
//! .pool_size(4)?
//! .queue_capacity(16)?
//! .build();
//!
//! let pool = pool.start(&Context::background())?;
//! for n in 1..=10 {
//!     pool.submit(n).unwrap();
//! }
//! pool.stop()?;
//!
//! assert_eq!(seen.load(Ordering::SeqCst), 55);
//! # Ok::<(), worker_pools::PoolError>(())
//! ```

mod context;
mod error;
/// The worker pool, its builder and its submission handle.
pub mod worker_pool;

pub use context::{CancelHandle, Context};
pub use error::{ContextError, PoolError, Result, SubmitError, SubmitTimeoutError, TrySubmitError};
pub use worker_pool::{
    Builder, Hook, PoolOption, RunningPool, Submitter, WorkFn, WorkerPool, DEFAULT_POOL_SIZE,
    DEFAULT_QUEUE_CAPACITY,
};

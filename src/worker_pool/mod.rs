use std::sync::Arc;

use crate::Context;

/// The function every worker runs on each item it receives.
///
/// It is called concurrently from all workers. Failures are its own business:
/// the pool has no channel for per-item results.
pub type WorkFn<T> = Arc<dyn Fn(&Context, T) + Send + Sync + 'static>;

/// A function run once per worker, before or after its work loop.
pub type Hook = Arc<dyn Fn(&Context) + Send + Sync + 'static>;

/// Number of workers when no size is configured.
pub const DEFAULT_POOL_SIZE: usize = 25;

/// Queue capacity when none is configured.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1;

/// Prefix for worker thread names when none is configured.
const DEFAULT_THREAD_NAME: &str = "pool-worker";

/// Everything a worker needs besides its queue and context.
struct Job<T> {
    work: WorkFn<T>,
    prework: Option<Hook>,
    postwork: Option<Hook>,
}

mod builder;
mod pool;
mod submitter;
mod worker;

pub use self::builder::{Builder, PoolOption};
pub use self::pool::{RunningPool, WorkerPool};
pub use self::submitter::Submitter;

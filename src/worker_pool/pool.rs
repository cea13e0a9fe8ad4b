use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam::channel;
use crossbeam::sync::WaitGroup;
use log::{error, info, warn};

use super::submitter::Submitter;
use super::worker::spawn_worker;
use super::{Builder, Job, PoolOption};
use crate::{Context, PoolError, Result, SubmitError};

/// A worker pool that has been configured but not started.
///
/// [`start`](WorkerPool::start) consumes it, so a pool can only ever be
/// started once.
pub struct WorkerPool<T> {
    job: Arc<Job<T>>,
    pool_size: usize,
    queue_capacity: usize,
    thread_name: String,
    /// Waits until every worker has dropped its token.
    tracker: WaitGroup,
    /// One token per worker, handed out at start.
    tokens: Vec<WaitGroup>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Creates a pool with the default configuration.
    pub fn new<F>(work: F) -> Self
    where
        F: Fn(&Context, T) + Send + Sync + 'static,
    {
        Self::builder(work).build()
    }

    /// Starts configuring a pool around the given work function.
    pub fn builder<F>(work: F) -> Builder<T>
    where
        F: Fn(&Context, T) + Send + Sync + 'static,
    {
        Builder::new(Arc::new(work))
    }

    /// Creates a pool from a list of options, applied in order.
    ///
    /// # Errors
    ///
    /// Returns the error of the first invalid option.
    pub fn with_options<F, I>(work: F, options: I) -> Result<Self>
    where
        F: Fn(&Context, T) + Send + Sync + 'static,
        I: IntoIterator<Item = PoolOption>,
    {
        options
            .into_iter()
            .try_fold(Self::builder(work), Builder::apply)
            .map(Builder::build)
    }

    pub(super) fn from_parts(
        job: Arc<Job<T>>,
        pool_size: usize,
        queue_capacity: usize,
        thread_name: String,
    ) -> Self {
        let tracker = WaitGroup::new();
        let tokens = (0..pool_size).map(|_| tracker.clone()).collect();
        WorkerPool {
            job,
            pool_size,
            queue_capacity,
            thread_name,
            tracker,
            tokens,
        }
    }

    /// Number of workers the pool will run.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Number of items the queue will hold.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Creates the work queue and spawns the workers.
    ///
    /// `ctx` is passed to every hook and every call of the work function.
    /// The pool itself never stops work because `ctx` is done.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Spawn`] if a worker thread cannot be created. The
    /// workers spawned before the failure are stopped and joined first.
    pub fn start(self, ctx: &Context) -> Result<RunningPool<T>> {
        let WorkerPool {
            job,
            pool_size,
            queue_capacity,
            thread_name,
            tracker,
            tokens,
        } = self;

        let (tx, rx) = channel::bounded(queue_capacity);
        let mut running = RunningPool {
            submitter: Submitter::new(tx, queue_capacity),
            tracker: Some(tracker),
            handles: Vec::with_capacity(pool_size),
            pool_size,
        };

        let mut spawn_error = None;
        for (id, token) in tokens.into_iter().enumerate() {
            let name = format!("{thread_name}-{id}");
            match spawn_worker(id, name, rx.clone(), job.clone(), ctx.clone(), token) {
                Ok(handle) => running.handles.push(handle),
                Err(e) => {
                    spawn_error = Some(e);
                    break;
                }
            }
        }

        if let Some(e) = spawn_error {
            error!(
                "Failed to spawn worker {} of {}: {}",
                running.handles.len(),
                pool_size,
                e
            );
            if let Err(stop_err) = running.shutdown() {
                error!("Error stopping partially started pool: {}", stop_err);
            }
            return Err(PoolError::Spawn(e));
        }

        info!(
            "Started worker pool: {} workers, queue capacity {}",
            pool_size, queue_capacity
        );
        Ok(running)
    }
}

/// A started worker pool.
///
/// Submit items through [`submit`](RunningPool::submit) or a
/// [`Submitter`], then call [`stop`](RunningPool::stop) to drain the queue
/// and join the workers. Dropping a running pool stops it as well.
pub struct RunningPool<T> {
    submitter: Submitter<T>,
    tracker: Option<WaitGroup>,
    handles: Vec<JoinHandle<()>>,
    pool_size: usize,
}

impl<T: Send + 'static> RunningPool<T> {
    /// Returns a handle for submitting items, e.g. from other threads.
    pub fn submitter(&self) -> Submitter<T> {
        self.submitter.clone()
    }

    /// Submits an item, blocking while the queue is full.
    ///
    /// Shorthand for `self.submitter().submit(item)`.
    pub fn submit(&self, item: T) -> std::result::Result<(), SubmitError<T>> {
        self.submitter.submit(item)
    }

    /// Number of workers.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Capacity of the work queue.
    pub fn queue_capacity(&self) -> usize {
        self.submitter.capacity()
    }

    /// Number of items waiting in the queue.
    pub fn queued(&self) -> usize {
        self.submitter.len()
    }

    /// Closes the queue and blocks until every worker has finished.
    ///
    /// Items already queued are still processed and every worker runs its
    /// post-work hook before this returns. Submitting through a leftover
    /// [`Submitter`] afterwards fails with [`SubmitError`].
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::WorkerPanicked`] if a worker thread panicked
    /// outside the work function, i.e. in one of the hooks.
    pub fn stop(mut self) -> Result<()> {
        info!("Stopping worker pool: {} queued items", self.queued());
        self.shutdown()?;
        info!("Worker pool stopped");
        Ok(())
    }
}

impl<T> RunningPool<T> {
    fn shutdown(&mut self) -> Result<()> {
        self.submitter.close();

        if let Some(tracker) = self.tracker.take() {
            tracker.wait();
        }

        let panicked = self
            .handles
            .drain(..)
            .map(JoinHandle::join)
            .filter(|r| r.is_err())
            .count();
        if panicked > 0 {
            return Err(PoolError::WorkerPanicked { count: panicked });
        }
        Ok(())
    }
}

impl<T> Drop for RunningPool<T> {
    fn drop(&mut self) {
        if self.tracker.is_some() {
            warn!("Worker pool dropped without stop, stopping now");
            if let Err(e) = self.shutdown() {
                error!("Error stopping dropped worker pool: {}", e);
            }
        }
    }
}

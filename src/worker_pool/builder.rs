use std::fmt;
use std::sync::Arc;

use super::{Hook, Job, WorkFn, WorkerPool, DEFAULT_POOL_SIZE, DEFAULT_QUEUE_CAPACITY, DEFAULT_THREAD_NAME};
use crate::{Context, PoolError, Result};

/// Configures a [`WorkerPool`] before it is built.
///
/// Each setter is validated as it is called, so an invalid value fails at the
/// call that supplied it. Setting the same option twice keeps the last value.
pub struct Builder<T> {
    work: WorkFn<T>,
    prework: Option<Hook>,
    postwork: Option<Hook>,
    pool_size: usize,
    queue_capacity: usize,
    thread_name: String,
}

impl<T: Send + 'static> Builder<T> {
    pub(super) fn new(work: WorkFn<T>) -> Self {
        Builder {
            work,
            prework: None,
            postwork: None,
            pool_size: DEFAULT_POOL_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
        }
    }

    /// Sets the hook each worker runs once before it starts taking items.
    pub fn prework<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context) + Send + Sync + 'static,
    {
        self.prework = Some(Arc::new(hook));
        self
    }

    /// Sets the hook each worker runs once after the queue is closed and
    /// drained.
    pub fn postwork<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context) + Send + Sync + 'static,
    {
        self.postwork = Some(Arc::new(hook));
        self
    }

    /// Sets the number of workers. Defaults to [`DEFAULT_POOL_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidPoolSize`] if `size` is zero.
    pub fn pool_size(mut self, size: usize) -> Result<Self> {
        if size < 1 {
            return Err(PoolError::InvalidPoolSize(size));
        }
        self.pool_size = size;
        Ok(self)
    }

    /// Sets how many items may wait in the queue. Zero means every
    /// submission waits until a worker takes the item. Defaults to
    /// [`DEFAULT_QUEUE_CAPACITY`].
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidQueueCapacity`] if `capacity` is larger
    /// than `isize::MAX`.
    pub fn queue_capacity(mut self, capacity: u64) -> Result<Self> {
        self.queue_capacity = usize::try_from(capacity)
            .ok()
            .filter(|&n| n <= isize::MAX as usize)
            .ok_or(PoolError::InvalidQueueCapacity(capacity))?;
        Ok(self)
    }

    /// Sets the prefix of worker thread names; workers are named
    /// `{prefix}-{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidThreadName`] if `prefix` contains a null
    /// byte.
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.contains('\0') {
            return Err(PoolError::InvalidThreadName(prefix));
        }
        self.thread_name = prefix;
        Ok(self)
    }

    /// Applies a single [`PoolOption`].
    pub fn apply(self, option: PoolOption) -> Result<Self> {
        match option {
            PoolOption::PreWork(hook) => Ok(Builder {
                prework: Some(hook),
                ..self
            }),
            PoolOption::PostWork(hook) => Ok(Builder {
                postwork: Some(hook),
                ..self
            }),
            PoolOption::PoolSize(size) => self.pool_size(size),
            PoolOption::QueueCapacity(capacity) => self.queue_capacity(capacity),
            PoolOption::ThreadName(prefix) => self.thread_name(prefix),
        }
    }

    /// Builds the pool. The configuration is fixed from here on.
    pub fn build(self) -> WorkerPool<T> {
        let job = Job {
            work: self.work,
            prework: self.prework,
            postwork: self.postwork,
        };
        WorkerPool::from_parts(
            Arc::new(job),
            self.pool_size,
            self.queue_capacity,
            self.thread_name,
        )
    }
}

/// A single configuration setting, for building a pool from a list of
/// settings with [`WorkerPool::with_options`].
#[derive(Clone)]
pub enum PoolOption {
    /// See [`Builder::prework`].
    PreWork(Hook),
    /// See [`Builder::postwork`].
    PostWork(Hook),
    /// See [`Builder::pool_size`].
    PoolSize(usize),
    /// See [`Builder::queue_capacity`].
    QueueCapacity(u64),
    /// See [`Builder::thread_name`].
    ThreadName(String),
}

impl PoolOption {
    /// Wraps a pre-work hook.
    pub fn prework<F>(hook: F) -> Self
    where
        F: Fn(&Context) + Send + Sync + 'static,
    {
        PoolOption::PreWork(Arc::new(hook))
    }

    /// Wraps a post-work hook.
    pub fn postwork<F>(hook: F) -> Self
    where
        F: Fn(&Context) + Send + Sync + 'static,
    {
        PoolOption::PostWork(Arc::new(hook))
    }
}

impl fmt::Debug for PoolOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolOption::PreWork(_) => f.write_str("PreWork(..)"),
            PoolOption::PostWork(_) => f.write_str("PostWork(..)"),
            PoolOption::PoolSize(size) => f.debug_tuple("PoolSize").field(size).finish(),
            PoolOption::QueueCapacity(n) => f.debug_tuple("QueueCapacity").field(n).finish(),
            PoolOption::ThreadName(name) => f.debug_tuple("ThreadName").field(name).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> Builder<u32> {
        WorkerPool::builder(|_: &Context, _: u32| {})
    }

    #[test]
    fn defaults() {
        let pool = builder().build();
        assert_eq!(pool.pool_size(), DEFAULT_POOL_SIZE);
        assert_eq!(pool.queue_capacity(), DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let err = builder().pool_size(0).err().unwrap();
        assert!(matches!(err, PoolError::InvalidPoolSize(0)));
        assert_eq!(err.to_string(), "pool size 0 cannot be less than 1");
    }

    #[test]
    fn oversized_queue_capacity_is_rejected() {
        let too_big = isize::MAX as u64 + 1;
        let err = builder().queue_capacity(too_big).err().unwrap();
        assert!(matches!(err, PoolError::InvalidQueueCapacity(n) if n == too_big));
        assert!(builder().queue_capacity(u64::MAX).is_err());
        assert!(builder().queue_capacity(isize::MAX as u64).is_ok());
    }

    #[test]
    fn zero_queue_capacity_is_allowed() {
        let pool = builder().queue_capacity(0).unwrap().build();
        assert_eq!(pool.queue_capacity(), 0);
    }

    #[test]
    fn last_setting_wins() {
        let pool = builder()
            .pool_size(3)
            .unwrap()
            .queue_capacity(7)
            .unwrap()
            .pool_size(9)
            .unwrap()
            .queue_capacity(2)
            .unwrap()
            .build();
        assert_eq!(pool.pool_size(), 9);
        assert_eq!(pool.queue_capacity(), 2);
    }

    #[test]
    fn invalid_setting_keeps_nothing() {
        assert!(builder().pool_size(4).unwrap().pool_size(0).is_err());
    }

    #[test]
    fn apply_matches_setters() {
        let pool = builder()
            .apply(PoolOption::PoolSize(6))
            .unwrap()
            .apply(PoolOption::QueueCapacity(0))
            .unwrap()
            .apply(PoolOption::prework(|_| {}))
            .unwrap()
            .build();
        assert_eq!(pool.pool_size(), 6);
        assert_eq!(pool.queue_capacity(), 0);
        assert!(builder().apply(PoolOption::PoolSize(0)).is_err());
    }

    #[test]
    fn thread_name_with_null_byte_is_rejected() {
        let err = builder().thread_name("bad\0name").err().unwrap();
        assert!(matches!(err, PoolError::InvalidThreadName(ref name) if name == "bad\0name"));
        assert!(builder()
            .apply(PoolOption::ThreadName("x\0".to_owned()))
            .is_err());
        assert!(builder().thread_name("fine").is_ok());
    }

    #[test]
    fn option_debug_hides_hooks() {
        assert_eq!(format!("{:?}", PoolOption::postwork(|_| {})), "PostWork(..)");
        assert_eq!(format!("{:?}", PoolOption::PoolSize(2)), "PoolSize(2)");
    }
}

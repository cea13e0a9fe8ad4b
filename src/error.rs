use std::fmt;
use std::io;
use thiserror::Error;

/// Error type for worker pool construction and lifecycle.
#[derive(Error, Debug)]
pub enum PoolError {
    /// The requested number of workers was zero.
    #[error("pool size {0} cannot be less than 1")]
    InvalidPoolSize(usize),

    /// The requested queue capacity does not fit in an `isize`.
    #[error("queue capacity {0} cannot be larger than {max}", max = isize::MAX)]
    InvalidQueueCapacity(u64),

    /// The worker thread name prefix contains a null byte.
    #[error("thread name {0:?} cannot contain null bytes")]
    InvalidThreadName(String),

    /// The operating system refused to spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),

    /// One or more worker threads ended by panicking.
    #[error("{count} worker thread(s) panicked")]
    WorkerPanicked {
        /// Number of workers whose thread panicked.
        count: usize,
    },
}

/// Result type alias for worker pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;

/// Returned by [`Submitter::submit`](crate::Submitter::submit) once the pool
/// has been stopped. Carries the rejected item.
#[derive(Error, PartialEq, Eq, Clone, Copy)]
#[error("submitting on a stopped worker pool")]
pub struct SubmitError<T>(pub T);

impl<T> SubmitError<T> {
    /// Returns the item that could not be submitted.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for SubmitError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SubmitError { .. }")
    }
}

/// Returned by [`Submitter::try_submit`](crate::Submitter::try_submit).
#[derive(Error, PartialEq, Eq, Clone, Copy)]
pub enum TrySubmitError<T> {
    /// The queue is full.
    #[error("submitting on a full work queue")]
    Full(T),

    /// The pool has been stopped.
    #[error("submitting on a stopped worker pool")]
    Closed(T),
}

impl<T> TrySubmitError<T> {
    /// Returns the item that could not be submitted.
    pub fn into_inner(self) -> T {
        match self {
            TrySubmitError::Full(item) | TrySubmitError::Closed(item) => item,
        }
    }

    /// Returns `true` if the queue was full.
    pub fn is_full(&self) -> bool {
        matches!(self, TrySubmitError::Full(_))
    }

    /// Returns `true` if the pool was stopped.
    pub fn is_closed(&self) -> bool {
        matches!(self, TrySubmitError::Closed(_))
    }
}

impl<T> fmt::Debug for TrySubmitError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrySubmitError::Full(_) => f.write_str("Full(..)"),
            TrySubmitError::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

/// Returned by [`Submitter::submit_timeout`](crate::Submitter::submit_timeout).
#[derive(Error, PartialEq, Eq, Clone, Copy)]
pub enum SubmitTimeoutError<T> {
    /// No slot freed up before the timeout elapsed.
    #[error("timed out submitting on a full work queue")]
    Timeout(T),

    /// The pool has been stopped.
    #[error("submitting on a stopped worker pool")]
    Closed(T),
}

impl<T> SubmitTimeoutError<T> {
    /// Returns the item that could not be submitted.
    pub fn into_inner(self) -> T {
        match self {
            SubmitTimeoutError::Timeout(item) | SubmitTimeoutError::Closed(item) => item,
        }
    }

    /// Returns `true` if the submission timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SubmitTimeoutError::Timeout(_))
    }
}

impl<T> fmt::Debug for SubmitTimeoutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitTimeoutError::Timeout(_) => f.write_str("Timeout(..)"),
            SubmitTimeoutError::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

/// Why a [`Context`](crate::Context) is done.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// The context, or one of its parents, was cancelled.
    #[error("context canceled")]
    Canceled,

    /// The context's deadline has passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

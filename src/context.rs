use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::ContextError;

/// A cancellation and deadline token handed to every hook and work item.
///
/// The pool never acts on a context itself; it only forwards it. Long-running
/// work functions poll [`Context::check`] or [`Context::is_done`] and bail out
/// on their own terms.
///
/// Clones share state: cancelling one cancels them all. Children created with
/// [`Context::with_cancel`] and friends are cancelled with their parent, but
/// not the other way round.
#[derive(Clone, Debug, Default)]
pub struct Context {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    parent: Option<Context>,
    cancelled: AtomicBool,
    deadline: Option<Instant>,
}

/// Cancels the [`Context`] it was created with.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    inner: Arc<Inner>,
}

impl CancelHandle {
    /// Cancels the context and every context derived from it.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }
}

impl Context {
    /// An empty context: never cancelled, no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derives a child context that can be cancelled independently.
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        self.child(None)
    }

    /// Derives a child context that is done once `deadline` passes.
    ///
    /// If the parent's deadline is earlier, the parent's deadline is kept.
    pub fn with_deadline(&self, deadline: Instant) -> (Context, CancelHandle) {
        self.child(Some(deadline))
    }

    /// Derives a child context that is done once `timeout` has elapsed.
    pub fn with_timeout(&self, timeout: Duration) -> (Context, CancelHandle) {
        self.with_deadline(Instant::now() + timeout)
    }

    fn child(&self, deadline: Option<Instant>) -> (Context, CancelHandle) {
        let deadline = match (self.deadline(), deadline) {
            (Some(parent), Some(own)) => Some(parent.min(own)),
            (parent, own) => parent.or(own),
        };
        let inner = Arc::new(Inner {
            parent: Some(self.clone()),
            cancelled: AtomicBool::new(false),
            deadline,
        });
        let handle = CancelHandle {
            inner: inner.clone(),
        };
        (Context { inner }, handle)
    }

    /// The instant after which this context is done, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Time left until the deadline, or `None` if there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Returns why the context is done, or `None` while it is still live.
    ///
    /// Cancellation wins over an expired deadline.
    pub fn err(&self) -> Option<ContextError> {
        if self.is_cancelled() {
            return Some(ContextError::Canceled);
        }
        match self.deadline() {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Like [`Context::err`], shaped for `?`.
    pub fn check(&self) -> Result<(), ContextError> {
        match self.err() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Returns `true` once the context is cancelled or past its deadline.
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    fn is_cancelled(&self) -> bool {
        let mut ctx = Some(self);
        while let Some(c) = ctx {
            if c.inner.cancelled.load(Ordering::Acquire) {
                return true;
            }
            ctx = c.inner.parent.as_ref();
        }
        false
    }
}

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crossbeam::channel::{SendTimeoutError, Sender, TrySendError};

use crate::{SubmitError, SubmitTimeoutError, TrySubmitError};

/// The producer side of a running pool's work queue.
///
/// Cheap to clone; all clones feed the same queue and can be used from any
/// thread. Once the pool is stopped every submission is rejected and the item
/// is handed back inside the error.
pub struct Submitter<T> {
    queue: Arc<Queue<T>>,
}

struct Queue<T> {
    /// `None` once the pool is stopped. The lock is only held to clone or
    /// take the sender, never across a send; an in-flight send holds its own
    /// clone, which keeps the workers running until it lands.
    tx: RwLock<Option<Sender<T>>>,
    capacity: usize,
}

impl<T> Clone for Submitter<T> {
    fn clone(&self) -> Self {
        Submitter {
            queue: self.queue.clone(),
        }
    }
}

impl<T> Submitter<T> {
    pub(super) fn new(tx: Sender<T>, capacity: usize) -> Self {
        Submitter {
            queue: Arc::new(Queue {
                tx: RwLock::new(Some(tx)),
                capacity,
            }),
        }
    }

    fn sender(&self) -> Option<Sender<T>> {
        self.queue
            .tx
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Submits an item, blocking while the queue is full.
    ///
    /// A submission that is blocked when the pool is stopped still lands and
    /// is processed.
    ///
    /// # Errors
    ///
    /// Returns the item in a [`SubmitError`] if the pool has been stopped, or
    /// if every worker has died.
    pub fn submit(&self, item: T) -> Result<(), SubmitError<T>> {
        match self.sender() {
            Some(tx) => tx.send(item).map_err(|e| SubmitError(e.into_inner())),
            None => Err(SubmitError(item)),
        }
    }

    /// Submits an item without blocking.
    pub fn try_submit(&self, item: T) -> Result<(), TrySubmitError<T>> {
        match self.sender() {
            Some(tx) => tx.try_send(item).map_err(|e| match e {
                TrySendError::Full(item) => TrySubmitError::Full(item),
                TrySendError::Disconnected(item) => TrySubmitError::Closed(item),
            }),
            None => Err(TrySubmitError::Closed(item)),
        }
    }

    /// Submits an item, blocking for at most `timeout` while the queue is
    /// full.
    pub fn submit_timeout(&self, item: T, timeout: Duration) -> Result<(), SubmitTimeoutError<T>> {
        match self.sender() {
            Some(tx) => tx.send_timeout(item, timeout).map_err(|e| match e {
                SendTimeoutError::Timeout(item) => SubmitTimeoutError::Timeout(item),
                SendTimeoutError::Disconnected(item) => SubmitTimeoutError::Closed(item),
            }),
            None => Err(SubmitTimeoutError::Closed(item)),
        }
    }

    /// Returns `true` once the pool has been stopped.
    pub fn is_closed(&self) -> bool {
        self.queue
            .tx
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Number of items waiting in the queue. Always zero once the pool has
    /// been stopped.
    pub fn len(&self) -> usize {
        self.queue
            .tx
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, Sender::len)
    }

    /// Returns `true` if no items are waiting in the queue.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity of the queue. Zero means submissions hand items straight to
    /// a waiting worker.
    pub fn capacity(&self) -> usize {
        self.queue.capacity
    }

    /// Drops the sender, which closes the queue for the workers. Returns
    /// `false` if it was already closed.
    pub(super) fn close(&self) -> bool {
        self.queue
            .tx
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel;
    use std::thread;

    #[test]
    fn submit_after_close_returns_item() {
        let (tx, rx) = channel::bounded(4);
        let submitter = Submitter::new(tx, 4);
        submitter.submit(1).unwrap();

        assert!(submitter.close());
        assert!(!submitter.close());
        assert!(submitter.is_closed());

        assert_eq!(submitter.submit(2), Err(SubmitError(2)));
        assert_eq!(submitter.try_submit(3), Err(TrySubmitError::Closed(3)));
        assert_eq!(
            submitter.submit_timeout(4, Duration::from_millis(1)),
            Err(SubmitTimeoutError::Closed(4))
        );

        // The item sent before the close is still delivered, then the queue ends.
        assert_eq!(rx.iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn full_queue() {
        let (tx, _rx) = channel::bounded(1);
        let submitter = Submitter::new(tx, 1);
        assert!(submitter.is_empty());
        submitter.try_submit("a").unwrap();
        assert_eq!(submitter.len(), 1);

        let err = submitter.try_submit("b").unwrap_err();
        assert!(err.is_full());
        assert_eq!(err.into_inner(), "b");

        let err = submitter
            .submit_timeout("c", Duration::from_millis(10))
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(submitter.capacity(), 1);
    }

    #[test]
    fn disconnected_receivers_reject() {
        let (tx, rx) = channel::bounded(1);
        drop(rx);
        let submitter = Submitter::new(tx, 1);
        assert_eq!(submitter.submit(7).unwrap_err().into_inner(), 7);
        assert!(submitter.try_submit(8).unwrap_err().is_closed());
    }

    #[test]
    fn close_does_not_wait_for_blocked_submit() {
        let (tx, rx) = channel::bounded(1);
        let submitter = Submitter::new(tx, 1);
        submitter.submit(1).unwrap();

        let producer = {
            let submitter = submitter.clone();
            thread::spawn(move || submitter.submit(2))
        };
        thread::sleep(Duration::from_millis(50));

        assert!(submitter.close());
        assert!(submitter.is_closed());
        assert_eq!(submitter.len(), 0);

        // The blocked send keeps the queue open until it lands.
        assert_eq!(rx.recv(), Ok(1));
        assert_eq!(rx.recv(), Ok(2));
        producer.join().unwrap().unwrap();
        assert!(rx.recv().is_err());
    }
}

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::Receiver;
use crossbeam::sync::WaitGroup;
use log::{debug, error};

use super::Job;
use crate::Context;

/// Spawns a single worker thread that pulls items from the receiver until
/// the queue is closed and empty.
///
/// A panic in the work function is caught and logged, and the worker moves on
/// to the next item. `done` is dropped when the thread ends, including by
/// panicking in a hook.
pub(super) fn spawn_worker<T: Send + 'static>(
    id: usize,
    name: String,
    rx: Receiver<T>,
    job: Arc<Job<T>>,
    ctx: Context,
    done: WaitGroup,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name(name).spawn(move || {
        let _done = done;
        debug!("Worker {id} starting");

        if let Some(prework) = &job.prework {
            prework(&ctx);
        }

        for item in rx.iter() {
            let work = AssertUnwindSafe(|| (job.work)(&ctx, item));
            if panic::catch_unwind(work).is_err() {
                error!("Worker {id} work item panicked, continuing");
            }
        }

        if let Some(postwork) = &job.postwork {
            postwork(&ctx);
        }
        debug!("Worker {id}: queue closed, shutting down");
    })
}

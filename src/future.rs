//! Integration with `async` programming.
//!
//! This module is only available if the Cargo feature `"async"` is enabled.

use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use crate::TaskQueue;

#[cfg(doc)]
use crate::Scheduler;

// -------------------------------------------------------------------------------------------------

/// Future returned by [`TaskQueue::ready()`].
///
/// It completes when the queue holds at least one task, and does not remove or run any.
#[must_use = "futures do nothing unless polled"]
pub struct Ready<'a> {
    queue: &'a TaskQueue,
}

impl Future for Ready<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let shared = &self.queue.shared;
        // Register before checking, so a task scheduled in between still wakes us.
        shared.waker.register(cx.waker());
        if shared.has_pending() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

impl fmt::Debug for Ready<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ready")
            .field("queue", self.queue)
            .finish()
    }
}

impl TaskQueue {
    /// Returns a future which completes when at least one task is waiting to be run.
    ///
    /// This lets the UI side be an async task rather than a polling loop:
    ///
    /// ```
    /// # futures::executor::block_on(async {
    /// use selective::{Scheduler as _, TaskQueue};
    ///
    /// let queue = TaskQueue::new();
    /// queue.schedule(Box::new(|| {}));
    ///
    /// queue.ready().await;
    /// assert_eq!(queue.run_pending(), 1);
    /// # });
    /// ```
    ///
    /// Only one task should await a given queue at a time; each new poll replaces the
    /// previously registered waker.
    pub fn ready(&self) -> Ready<'_> {
        Ready { queue: self }
    }

    /// Waits until at least one task is waiting, then runs tasks as
    /// [`run_pending()`](Self::run_pending) does, returning how many were run.
    pub async fn run_when_ready(&self) -> usize {
        self.ready().await;
        self.run_pending()
    }
}

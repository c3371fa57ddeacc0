use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::sync::Arc;
use core::fmt;

use crate::maybe_sync::Mutex;

#[cfg(doc)]
use crate::{Consumer, Hub};

// -------------------------------------------------------------------------------------------------

/// A deferred callback invocation, as handed to a [`Scheduler`].
///
/// Tasks are [`Send`] because the state container may deliver states on a different thread
/// than the one which is to run the callbacks.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Accepts callback invocations from [`Consumer`]s, to be run later on the execution context
/// which owns the observers (typically the UI thread).
///
/// # Requirements on implementors
///
/// * Tasks passed to one scheduler must be run in the order they were scheduled.
///   Consumers rely on this to deliver their callbacks in the order of the triggering
///   notifications.
///
/// * Tasks should not be run by `schedule()` itself, except by schedulers which are explicitly
///   documented as running inline (such as [`Immediate`]), because the caller of `schedule()`
///   is usually in the middle of delivering a state transition.
pub trait Scheduler: fmt::Debug {
    /// Arrange for `task` to be run, after every task previously scheduled here.
    fn schedule(&self, task: Task);
}

impl<Q: ?Sized + Scheduler> Scheduler for &Q {
    fn schedule(&self, task: Task) {
        (**self).schedule(task)
    }
}
impl<Q: ?Sized + Scheduler> Scheduler for Box<Q> {
    fn schedule(&self, task: Task) {
        (**self).schedule(task)
    }
}
impl<Q: ?Sized + Scheduler> Scheduler for alloc::rc::Rc<Q> {
    fn schedule(&self, task: Task) {
        (**self).schedule(task)
    }
}
impl<Q: ?Sized + Scheduler> Scheduler for Arc<Q> {
    fn schedule(&self, task: Task) {
        (**self).schedule(task)
    }
}

/// Sends each task down a channel, for hosts whose UI thread already runs a receive loop.
///
/// If the receiver has been dropped, the task is dropped without running, since nothing
/// remains to run it.
#[cfg(feature = "std")]
impl Scheduler for std::sync::mpsc::Sender<Task> {
    fn schedule(&self, task: Task) {
        if self.send(task).is_err() {
            log::trace!("task receiver is gone; task dropped");
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// A [`Scheduler`] which runs every task immediately, inside [`Scheduler::schedule()`].
///
/// This makes callbacks run synchronously on whichever thread delivered the state,
/// which is convenient and deterministic for tests and for hosts that have only one thread.
/// It gives up the guarantee that callbacks never run while the state container is still
/// delivering a transition; [`Hub`] tolerates this, but other containers may not.
#[expect(clippy::exhaustive_structs)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Immediate;

impl Scheduler for Immediate {
    fn schedule(&self, task: Task) {
        task()
    }
}

// -------------------------------------------------------------------------------------------------

/// A [`Scheduler`] which stores tasks in a first-in-first-out queue until
/// [`run_pending()`](Self::run_pending) is called.
///
/// `TaskQueue` is a handle; clones refer to the same queue.
/// The intended use is that every consumer is given a clone of one queue, and the thread
/// which owns the observers (the UI thread) drains it once per turn of its event loop.
/// All tasks then run on that one thread, one at a time, in the order they were scheduled.
///
/// This type is [`Send`] and [`Sync`] only if the `"sync"` crate feature is enabled.
///
/// ```
/// use selective::{Scheduler as _, TaskQueue};
///
/// let queue = TaskQueue::new();
/// queue.schedule(Box::new(|| println!("first")));
/// queue.schedule(Box::new(|| println!("second")));
/// assert_eq!(queue.len(), 2);
///
/// // On the UI thread:
/// assert_eq!(queue.run_pending(), 2);
/// assert!(queue.is_empty());
/// ```
#[derive(Clone)]
pub struct TaskQueue {
    pub(crate) shared: Arc<QueueShared>,
}

pub(crate) struct QueueShared {
    tasks: Mutex<VecDeque<Task>>,

    /// Woken when a task is scheduled.
    #[cfg(feature = "async")]
    pub(crate) waker: futures_util::task::AtomicWaker,
}

impl TaskQueue {
    /// Constructs a new empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(QueueShared {
                tasks: Mutex::new(VecDeque::new()),
                #[cfg(feature = "async")]
                waker: futures_util::task::AtomicWaker::new(),
            }),
        }
    }

    /// Runs queued tasks, in the order they were scheduled, until the queue is empty.
    /// Returns the number of tasks run.
    ///
    /// Tasks scheduled while this is running (for example, by a callback which dispatches
    /// another action) are also run before it returns.
    /// The queue is not locked while a task runs.
    ///
    /// This should only ever be called from one thread, so that the tasks are serialized.
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        loop {
            // The guard must be dropped before running the task, since the task may schedule
            // more tasks.
            let next = self.shared.tasks.lock_unpoisoned().pop_front();
            match next {
                Some(task) => {
                    task();
                    count += 1;
                }
                None => return count,
            }
        }
    }

    /// Returns the number of tasks waiting to be run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.tasks.lock_unpoisoned().len()
    }

    /// Returns whether no tasks are waiting to be run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.tasks.lock_unpoisoned().is_empty()
    }

    /// Discards all waiting tasks without running them, returning how many there were.
    ///
    /// This may be used when the observers are being torn down as a whole and none of their
    /// pending callbacks should run.
    pub fn clear(&self) -> usize {
        let discarded = core::mem::take(&mut *self.shared.tasks.lock_unpoisoned());
        discarded.len()
    }
}

impl QueueShared {
    #[cfg(feature = "async")]
    pub(crate) fn has_pending(&self) -> bool {
        !self.tasks.lock_unpoisoned().is_empty()
    }
}

impl Scheduler for TaskQueue {
    fn schedule(&self, task: Task) {
        self.shared.tasks.lock_unpoisoned().push_back(task);
        #[cfg(feature = "async")]
        self.shared.waker.wake();
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        // not using fmt.debug_tuple() so this is never printed on multiple lines
        write!(fmt, "TaskQueue({})", self.len())
    }
}

// -------------------------------------------------------------------------------------------------

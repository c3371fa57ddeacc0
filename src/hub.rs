use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering::Relaxed};

use crate::maybe_sync::RwLock;
use crate::{
    Consumer, ConsumerId, ConsumerRegistry, IntoDynConsumer, PredicateConsumer, ScalarConsumer,
    Scheduler, SequenceConsumer,
};

#[cfg(doc)]
use crate::{ConsumerBag, TaskQueue};

// -------------------------------------------------------------------------------------------------

#[cfg_attr(not(feature = "sync"), allow(rustdoc::broken_intra_doc_links))]
/// Fans a state container's transitions out to a dynamic set of [`Consumer`]s.
///
/// A `Hub<S, C, Q>` is what the state container (store) talks to: it calls
/// [`notify()`](Self::notify) once per accepted transition, in dispatch order,
/// and [`notify_initial()`](Self::notify_initial) once when it subscribes the hub, if the
/// current state should be delivered eagerly.
/// Observers register consumers with [`add()`](Self::add) or one of the `select*()` methods,
/// and keep the returned [`ConsumerId`] (perhaps in a [`ConsumerBag`]) to remove them later.
///
/// The `select*()` methods build consumers whose callbacks run on a clone of the hub's
/// scheduler `Q`, usually a [`TaskQueue`] drained by the UI thread.
///
/// # Consume instantly
///
/// If [`consume_instantly`](Self::set_consume_instantly) is enabled, a consumer added after
/// the hub has seen a state is brought up to date immediately, by
/// `consumer.consume_seeded(None, Some(&latest_state))`.
/// Its callback is therefore scheduled right away whenever its selection from the current
/// state is present.
///
/// # Removal is cooperative
///
/// Removing a consumer stops any further states from being delivered to it,
/// but callbacks it has already scheduled are not withdrawn and may still run.
/// Observers that must not see such late callbacks should check their own liveness in the
/// callback.
///
/// We recommend that you use the type aliases [`sync::Hub`](crate::sync::Hub)
/// or [`unsync::Hub`](crate::unsync::Hub), to avoid writing the type parameter
/// `C` outside of special cases.
///
/// # Example
///
/// ```
/// use selective::{unsync::Hub, TaskQueue};
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Counter {
///     count: i32,
/// }
///
/// let queue = TaskQueue::new();
/// let hub: Hub<Counter> = Hub::new(queue.clone());
///
/// let label = Arc::new(Mutex::new(String::new()));
/// let label2 = label.clone();
/// hub.select(
///     |state: Option<&Counter>| state.map(|s| s.count),
///     move |_state, _old, new| *label2.lock().unwrap() = format!("count: {new:?}"),
/// );
///
/// // The store dispatches an action:
/// hub.notify(Some(&Counter { count: 0 }), Some(&Counter { count: 1 }));
///
/// // Callbacks are deferred until the UI thread runs them.
/// assert_eq!(*label.lock().unwrap(), "");
/// queue.run_pending();
/// assert_eq!(*label.lock().unwrap(), "count: Some(1)");
/// ```
///
/// # Generic parameters
///
/// * `S` is the type of the state snapshots.
/// * `C` is the type of consumer stored, usually a trait object type.
/// * `Q` is the type of the [`Scheduler`] given to consumers built by this hub.
pub struct Hub<S, C, Q> {
    inner: RwLock<HubInner<S, C>>,
    consume_instantly: AtomicBool,
    scheduler: Q,
}

struct HubInner<S, C> {
    registry: ConsumerRegistry<S, C>,
    /// The most recently delivered state.
    latest: Option<S>,
    /// Set by [`Hub::close()`].
    closed: bool,
}

impl<S, C> HubInner<S, C> {
    #[track_caller]
    fn assert_open(&self) {
        assert!(!self.closed, "cannot deliver states after Hub::close()");
    }
}

impl<S, C, Q> Hub<S, C, Q>
where
    S: Clone,
    C: Consumer<S> + Clone,
    Q: Scheduler,
{
    /// Constructs a new [`Hub`] with no consumers, which has not seen any state,
    /// and with consume-instantly disabled.
    #[must_use]
    pub fn new(scheduler: Q) -> Self {
        Self {
            inner: RwLock::new(HubInner {
                registry: ConsumerRegistry::new(),
                latest: None,
                closed: false,
            }),
            consume_instantly: AtomicBool::new(false),
            scheduler,
        }
    }

    /// Sets whether newly added consumers are immediately given the latest state;
    /// see [the type documentation](Self#consume-instantly).
    #[must_use]
    pub fn with_consume_instantly(self, consume_instantly: bool) -> Self {
        self.set_consume_instantly(consume_instantly);
        self
    }

    /// Sets whether newly added consumers are immediately given the latest state;
    /// see [the type documentation](Self#consume-instantly).
    ///
    /// This affects only consumers added afterward.
    pub fn set_consume_instantly(&self, consume_instantly: bool) {
        self.consume_instantly.store(consume_instantly, Relaxed);
    }

    /// Returns whether newly added consumers are immediately given the latest state.
    #[must_use]
    pub fn consume_instantly(&self) -> bool {
        self.consume_instantly.load(Relaxed)
    }

    /// Returns the scheduler given to consumers built by this hub.
    pub fn scheduler(&self) -> &Q {
        &self.scheduler
    }

    /// Returns a clone of the most recently delivered state, or [`None`] if none has been
    /// delivered or the latest delivered state was absent.
    #[must_use]
    pub fn latest_state(&self) -> Option<S> {
        self.inner.read_unpoisoned().latest.clone()
    }

    /// Registers `consumer` and returns its id.
    ///
    /// If consume-instantly is enabled and the hub has seen a state, the consumer is
    /// immediately given that state via [`Consumer::consume_seeded()`] with no old state.
    ///
    /// If this consumer is already registered, nothing happens.
    ///
    /// # Panics
    ///
    /// Panics if [`close()`](Self::close) has been called.
    pub fn add<C2: IntoDynConsumer<S, C>>(&self, consumer: C2) -> ConsumerId {
        let id = consumer.id();
        let consumer = consumer.into_dyn_consumer();

        let eager_state = {
            let mut inner = self.inner.write_unpoisoned();
            inner.assert_open();
            if !inner.registry.insert(consumer.clone()) {
                return id;
            }
            log::debug!("{id:?} added; {} consumers", inner.registry.len());
            if self.consume_instantly() {
                inner.latest.clone()
            } else {
                None
            }
        };

        // Delivered with the lock released, since with an inline scheduler the callback
        // may be run right here and may call back into the hub.
        if let Some(state) = eager_state {
            consumer.consume_seeded(None, Some(&state));
        }
        id
    }

    /// Registers a new [`ScalarConsumer`] built from `selector` and `callback`, whose callback
    /// is run on this hub's scheduler.
    ///
    /// This is a convenience for [`add()`](Self::add); see its documentation.
    ///
    /// # Panics
    ///
    /// Panics if [`close()`](Self::close) has been called.
    pub fn select<T, Sel, Cb>(&self, selector: Sel, callback: Cb) -> ConsumerId
    where
        Q: Clone,
        T: PartialEq + Clone + Send + 'static,
        Sel: Fn(Option<&S>) -> Option<T>,
        Cb: Fn(Option<S>, Option<T>, Option<T>) + Send + Sync + 'static,
        S: Send + 'static,
        ScalarConsumer<S, T, Sel, Cb, Q>: IntoDynConsumer<S, C>,
    {
        self.add(ScalarConsumer::new(
            selector,
            callback,
            self.scheduler.clone(),
        ))
    }

    /// Registers a new [`SequenceConsumer`] built from `selector` and `callback`, whose
    /// callback is run on this hub's scheduler.
    ///
    /// This is a convenience for [`add()`](Self::add); see its documentation.
    ///
    /// # Panics
    ///
    /// Panics if [`close()`](Self::close) has been called.
    pub fn select_sequence<T, Sel, Cb>(&self, selector: Sel, callback: Cb) -> ConsumerId
    where
        Q: Clone,
        T: PartialEq + Clone + Send + 'static,
        Sel: Fn(Option<&S>) -> Option<Vec<T>>,
        Cb: Fn(Option<S>, Option<Vec<T>>, Option<Vec<T>>) + Send + Sync + 'static,
        S: Send + 'static,
        SequenceConsumer<S, T, Sel, Cb, Q>: IntoDynConsumer<S, C>,
    {
        self.add(SequenceConsumer::new(
            selector,
            callback,
            self.scheduler.clone(),
        ))
    }

    /// Registers a new [`PredicateConsumer`] built from `selector`, the `unchanged`
    /// predicate, and `callback`, whose callback is run on this hub's scheduler.
    ///
    /// This is a convenience for [`add()`](Self::add); see its documentation.
    ///
    /// # Panics
    ///
    /// Panics if [`close()`](Self::close) has been called.
    pub fn select_with<T, Sel, P, Cb>(&self, selector: Sel, unchanged: P, callback: Cb) -> ConsumerId
    where
        Q: Clone,
        T: Send + 'static,
        Sel: Fn(Option<&S>) -> Option<T>,
        P: Fn(Option<&T>, Option<&T>) -> bool,
        Cb: Fn(Option<S>, Option<T>, Option<T>) + Send + Sync + 'static,
        S: Send + 'static,
        PredicateConsumer<S, T, Sel, P, Cb, Q>: IntoDynConsumer<S, C>,
    {
        self.add(PredicateConsumer::new(
            selector,
            unchanged,
            callback,
            self.scheduler.clone(),
        ))
    }

    /// Delivers one state transition to every registered consumer,
    /// via [`Consumer::consume_transition()`].
    ///
    /// The state container must call this once per accepted transition, in dispatch order.
    ///
    /// # Panics
    ///
    /// Panics if [`close()`](Self::close) has been called.
    pub fn notify(&self, old: Option<&S>, new: Option<&S>) {
        for consumer in self.snapshot(new) {
            consumer.consume_transition(old, new);
        }
    }

    /// Delivers the initial state to every registered consumer,
    /// via [`Consumer::consume_seeded()`] with no old state.
    ///
    /// The state container calls this once, when it subscribes this hub, if eager delivery
    /// was requested.
    ///
    /// # Panics
    ///
    /// Panics if [`close()`](Self::close) has been called.
    pub fn notify_initial(&self, state: Option<&S>) {
        for consumer in self.snapshot(state) {
            consumer.consume_seeded(None, state);
        }
    }

    /// Records `latest` and copies out the current consumers, so that they can be driven
    /// without the lock held.
    #[track_caller]
    fn snapshot(&self, latest: Option<&S>) -> Vec<C> {
        let mut inner = self.inner.write_unpoisoned();
        inner.assert_open();
        inner.latest = latest.cloned();
        inner.registry.iter().cloned().collect()
    }

    /// Unregisters the consumer with the given id. Returns whether it was registered.
    ///
    /// Callbacks it has already scheduled may still run.
    pub fn remove(&self, id: ConsumerId) -> bool {
        // The consumer is dropped after the lock is released.
        let removed = self.inner.write_unpoisoned().registry.remove(id);
        if removed.is_some() {
            log::debug!("{id:?} removed");
        }
        removed.is_some()
    }

    /// Unregisters every consumer whose id is in `ids`, returning how many were registered.
    pub fn remove_all<I>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = ConsumerId>,
    {
        // `ids` is caller code, so it is not run with the lock held.
        let ids: Vec<ConsumerId> = ids.into_iter().collect();
        // The removed consumers are dropped after the lock is released.
        let removed = self.inner.write_unpoisoned().registry.take_all(ids);
        log::debug!("{} consumers removed", removed.len());
        removed.len()
    }

    /// Returns whether the consumer with the given id is registered.
    #[must_use]
    pub fn contains(&self, id: ConsumerId) -> bool {
        self.inner.read_unpoisoned().registry.contains(id)
    }

    /// Returns the number of registered consumers.
    ///
    /// This operation is intended for testing and diagnostic purposes.
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.read_unpoisoned().registry.len()
    }

    /// Unregisters all consumers. The hub remains usable.
    pub fn clear(&self) {
        let removed = core::mem::take(&mut self.inner.write_unpoisoned().registry);
        log::debug!("cleared {} consumers", removed.len());
    }

    /// Unregisters all consumers and forbids any further use of the hub.
    ///
    /// Afterward, [`add()`](Self::add), [`notify()`](Self::notify), and
    /// [`notify_initial()`](Self::notify_initial) panic, since calling them indicates that
    /// the state container and the hub's owner disagree about the hub's lifetime.
    pub fn close(&self) {
        let removed = {
            let mut inner = self.inner.write_unpoisoned();
            inner.closed = true;
            inner.latest = None;
            core::mem::take(&mut inner.registry)
        };
        log::debug!("closed; dropping {} consumers", removed.len());
    }
}

impl<S, C, Q> fmt::Debug for Hub<S, C, Q>
where
    Q: fmt::Debug,
{
    #[mutants::skip] // the contended-lock branch is unreachable from tests
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ds = fmt.debug_struct("Hub");
        match self.inner.try_read().map_err(|e| e.into_poisoned()) {
            Ok(inner) | Err(Some(inner)) => {
                ds.field("consumers", &inner.registry.len());
                ds.field("closed", &inner.closed);
            }
            Err(None) => {
                ds.field("consumers", &crate::util::Unquote("?"));
            }
        }
        ds.field("consume_instantly", &self.consume_instantly.load(Relaxed));
        ds.field("scheduler", &self.scheduler);
        ds.finish()
    }
}

// -------------------------------------------------------------------------------------------------

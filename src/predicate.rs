use core::fmt;
use core::marker::PhantomData;

use crate::consumer::{impl_identity, Callback};
use crate::{Consumer, ConsumerId, Scheduler};

#[cfg(doc)]
use crate::{Hub, ScalarConsumer};

/// A [`Consumer`] which lets a caller-supplied predicate decide whether the selected value
/// has changed.
///
/// The predicate is called as `unchanged(old_value, new_value)` and returns `true` when the
/// two should be considered *the same*, suppressing the callback.
/// This supports comparisons other than equality: thresholds, comparing only some fields,
/// or constant "always" and "never" predicates.
///
/// Unlike [`ScalarConsumer`], a `PredicateConsumer` holds no value. Each transition is judged
/// by selecting from both the old and the new state, so it must be driven through
/// [`Consumer::consume_transition()`] (as [`Hub`] does) or
/// [`Consumer::consume_seeded()`].
///
/// ```
/// use selective::{Consumer as _, Immediate, PredicateConsumer};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let fired = Arc::new(AtomicUsize::new(0));
/// let fired2 = fired.clone();
/// let consumer = PredicateConsumer::new(
///     |temperature: Option<&f64>| temperature.copied(),
///     // Changes of less than half a degree do not count.
///     |old: Option<&f64>, new: Option<&f64>| match (old, new) {
///         (Some(old), Some(new)) => (old - new).abs() < 0.5,
///         (old, new) => old.is_none() && new.is_none(),
///     },
///     move |_, _, _| {
///         fired2.fetch_add(1, Ordering::Relaxed);
///     },
///     Immediate,
/// );
///
/// consumer.consume_transition(Some(&20.0), Some(&20.2));
/// assert_eq!(fired.load(Ordering::Relaxed), 0);
/// consumer.consume_transition(Some(&20.2), Some(&21.0));
/// assert_eq!(fired.load(Ordering::Relaxed), 1);
/// ```
///
/// # Generic parameters
///
/// * `S` is the type of the state snapshots.
/// * `T` is the type of the selected value.
/// * `Sel` is the type of the selector function.
/// * `P` is the type of the "unchanged" predicate.
/// * `Cb` is the type of the callback function.
/// * `Q` is the type of the [`Scheduler`] the callback is run on.
pub struct PredicateConsumer<S, T, Sel, P, Cb, Q> {
    id: ConsumerId,
    selector: Sel,
    unchanged: P,
    callback: Callback<Cb>,
    scheduler: Q,
    _phantom: PhantomData<fn(Option<&S>) -> Option<T>>,
}

impl<S, T, Sel, P, Cb, Q> PredicateConsumer<S, T, Sel, P, Cb, Q>
where
    S: Clone + Send + 'static,
    T: Send + 'static,
    Sel: Fn(Option<&S>) -> Option<T>,
    P: Fn(Option<&T>, Option<&T>) -> bool,
    Cb: Fn(Option<S>, Option<T>, Option<T>) + Send + Sync + 'static,
    Q: Scheduler,
{
    /// Constructs a consumer with a new [`ConsumerId`].
    pub fn new(selector: Sel, unchanged: P, callback: Cb, scheduler: Q) -> Self {
        Self {
            id: ConsumerId::next(),
            selector,
            unchanged,
            callback: Callback::new(callback),
            scheduler,
            _phantom: PhantomData,
        }
    }

    fn evaluate(&self, old: Option<&S>, new: Option<&S>) {
        let old_value = (self.selector)(old);
        let new_value = (self.selector)(new);
        if !(self.unchanged)(old_value.as_ref(), new_value.as_ref()) {
            self.callback
                .schedule(self.id, &self.scheduler, new, old_value, new_value);
        }
    }
}

impl<S, T, Sel, P, Cb, Q> Consumer<S> for PredicateConsumer<S, T, Sel, P, Cb, Q>
where
    S: Clone + Send + 'static,
    T: Send + 'static,
    Sel: Fn(Option<&S>) -> Option<T>,
    P: Fn(Option<&T>, Option<&T>) -> bool,
    Cb: Fn(Option<S>, Option<T>, Option<T>) + Send + Sync + 'static,
    Q: Scheduler,
{
    fn id(&self) -> ConsumerId {
        self.id
    }

    /// # Panics
    ///
    /// Always. A `PredicateConsumer` has no previous value to compare a lone state against;
    /// use [`Consumer::consume_transition()`] instead.
    fn consume(&self, _new: Option<&S>) {
        panic!(
            "PredicateConsumer::consume() called on {id:?}; \
            a predicate consumer holds no previous value, so use consume_transition()",
            id = self.id
        );
    }

    fn consume_seeded(&self, old: Option<&S>, new: Option<&S>) {
        self.evaluate(old, new);
    }

    fn consume_transition(&self, old: Option<&S>, new: Option<&S>) {
        self.evaluate(old, new);
    }
}

impl_identity!(PredicateConsumer<S, T, Sel, P, Cb, Q>);

impl<S, T, Sel, P, Cb, Q: fmt::Debug> fmt::Debug for PredicateConsumer<S, T, Sel, P, Cb, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateConsumer")
            .field("id", &self.id)
            .field(
                "selector",
                &crate::util::Unquote::type_name_of(&self.selector),
            )
            .field(
                "unchanged",
                &crate::util::Unquote::type_name_of(&self.unchanged),
            )
            .field("callback", &self.callback)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

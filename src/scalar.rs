use core::fmt;

use crate::consumer::{impl_identity, Callback};
use crate::held::Held;
use crate::{Consumer, ConsumerId, Scheduler};

/// A [`Consumer`] which compares selected values with [`PartialEq`].
///
/// On each [`consume()`](Consumer::consume), the selector is applied to the new state.
/// If the result is unequal to the held value, the callback is scheduled with
/// `(new_state, held_value, new_value)`. "Unequal" is [`Option`]'s equality: `None` to `None`
/// is no change, `None` to `Some` and `Some` to `None` are changes, and two `Some`s are
/// compared with `T::eq`. The new value is held afterward in every case.
///
/// The held value starts out as `None`.
///
/// ```
/// use selective::{Consumer as _, Immediate, ScalarConsumer};
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Clone)]
/// struct AppState {
///     count: i32,
///     title: &'static str,
/// }
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let seen2 = seen.clone();
/// let consumer = ScalarConsumer::new(
///     |state: Option<&AppState>| state.map(|s| s.count),
///     move |_state, old, new| seen2.lock().unwrap().push((old, new)),
///     Immediate,
/// );
///
/// consumer.consume(Some(&AppState { count: 0, title: "a" }));
/// // Unrelated changes do not trigger the callback.
/// consumer.consume(Some(&AppState { count: 0, title: "b" }));
/// consumer.consume(Some(&AppState { count: 1, title: "b" }));
///
/// assert_eq!(*seen.lock().unwrap(), vec![(None, Some(0)), (Some(0), Some(1))]);
/// ```
///
/// # Generic parameters
///
/// * `S` is the type of the state snapshots.
/// * `T` is the type of the selected value.
/// * `Sel` is the type of the selector function.
/// * `Cb` is the type of the callback function.
/// * `Q` is the type of the [`Scheduler`] the callback is run on.
pub struct ScalarConsumer<S, T, Sel, Cb, Q> {
    id: ConsumerId,
    held: Held<S, T, Sel>,
    callback: Callback<Cb>,
    scheduler: Q,
}

impl<S, T, Sel, Cb, Q> ScalarConsumer<S, T, Sel, Cb, Q>
where
    S: Clone + Send + 'static,
    T: PartialEq + Clone + Send + 'static,
    Sel: Fn(Option<&S>) -> Option<T>,
    Cb: Fn(Option<S>, Option<T>, Option<T>) + Send + Sync + 'static,
    Q: Scheduler,
{
    /// Constructs a consumer which holds no value yet, with a new [`ConsumerId`].
    pub fn new(selector: Sel, callback: Cb, scheduler: Q) -> Self {
        Self {
            id: ConsumerId::next(),
            held: Held::new(selector),
            callback: Callback::new(callback),
            scheduler,
        }
    }
}

impl<S, T: Clone, Sel, Cb, Q> ScalarConsumer<S, T, Sel, Cb, Q> {
    /// Returns a clone of the held value: the selection from the most recently consumed state.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        self.held.get()
    }
}

impl<S, T, Sel, Cb, Q> Consumer<S> for ScalarConsumer<S, T, Sel, Cb, Q>
where
    S: Clone + Send + 'static,
    T: PartialEq + Clone + Send + 'static,
    Sel: Fn(Option<&S>) -> Option<T>,
    Cb: Fn(Option<S>, Option<T>, Option<T>) + Send + Sync + 'static,
    Q: Scheduler,
{
    fn id(&self) -> ConsumerId {
        self.id
    }

    fn consume(&self, new: Option<&S>) {
        let change = self.held.advance(new, |held, selected| held != selected);
        if let Some((old_value, new_value)) = change {
            self.callback
                .schedule(self.id, &self.scheduler, new, old_value, new_value);
        }
    }

    fn consume_seeded(&self, old: Option<&S>, new: Option<&S>) {
        self.held.seed(old);
        self.consume(new);
    }
}

impl_identity!(ScalarConsumer<S, T, Sel, Cb, Q>);

impl<S, T, Sel, Cb, Q: fmt::Debug> fmt::Debug for ScalarConsumer<S, T, Sel, Cb, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ds = f.debug_struct("ScalarConsumer");
        ds.field("id", &self.id);
        self.held.fmt_fields(&mut ds);
        ds.field("callback", &self.callback);
        ds.field("scheduler", &self.scheduler);
        ds.finish()
    }
}

use alloc::vec::Vec;
use core::fmt;

use crate::consumer::{impl_identity, Callback};
use crate::held::Held;
use crate::{Consumer, ConsumerId, Scheduler};

/// A [`Consumer`] of an ordered sequence of values, which treats "no sequence" as distinct
/// from "empty sequence".
///
/// Given the held sequence and the newly selected one, the callback is scheduled as follows:
///
/// 1. Both absent: no change.
/// 2. Both present: a change if they differ in length or in any element, in order.
///    `[1, 2, 3]` to `[3, 2, 1]` is a change.
/// 3. One absent and the other present: always a change, even if the present one is empty.
///    This keeps e.g. "not loaded yet" distinguishable from "loaded, and there are none".
///
/// The new sequence is held afterward in every case. The held sequence starts out absent.
///
/// ```
/// use selective::{Consumer as _, Immediate, SequenceConsumer};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// #[derive(Clone)]
/// struct Inbox {
///     messages: Option<Vec<String>>,
/// }
///
/// let fired = Arc::new(AtomicUsize::new(0));
/// let fired2 = fired.clone();
/// let consumer = SequenceConsumer::new(
///     |state: Option<&Inbox>| state.and_then(|s| s.messages.clone()),
///     move |_, _, _| {
///         fired2.fetch_add(1, Ordering::Relaxed);
///     },
///     Immediate,
/// );
///
/// consumer.consume(Some(&Inbox { messages: None }));
/// assert_eq!(fired.load(Ordering::Relaxed), 0);
/// consumer.consume(Some(&Inbox { messages: Some(vec![]) }));
/// assert_eq!(fired.load(Ordering::Relaxed), 1);
/// consumer.consume(Some(&Inbox { messages: Some(vec![]) }));
/// assert_eq!(fired.load(Ordering::Relaxed), 1);
/// ```
///
/// # Generic parameters
///
/// * `S` is the type of the state snapshots.
/// * `T` is the type of the sequence elements.
/// * `Sel` is the type of the selector function.
/// * `Cb` is the type of the callback function.
/// * `Q` is the type of the [`Scheduler`] the callback is run on.
pub struct SequenceConsumer<S, T, Sel, Cb, Q> {
    id: ConsumerId,
    held: Held<S, Vec<T>, Sel>,
    callback: Callback<Cb>,
    scheduler: Q,
}

/// Decides whether a selected sequence has changed.
pub(crate) fn sequence_changed<T: PartialEq>(old: Option<&[T]>, new: Option<&[T]>) -> bool {
    match (old, new) {
        (None, None) => false,
        (Some(old), Some(new)) => !old.iter().eq(new.iter()),
        (None, Some(_)) | (Some(_), None) => true,
    }
}

impl<S, T, Sel, Cb, Q> SequenceConsumer<S, T, Sel, Cb, Q>
where
    S: Clone + Send + 'static,
    T: PartialEq + Clone + Send + 'static,
    Sel: Fn(Option<&S>) -> Option<Vec<T>>,
    Cb: Fn(Option<S>, Option<Vec<T>>, Option<Vec<T>>) + Send + Sync + 'static,
    Q: Scheduler,
{
    /// Constructs a consumer which holds no sequence yet, with a new [`ConsumerId`].
    pub fn new(selector: Sel, callback: Cb, scheduler: Q) -> Self {
        Self {
            id: ConsumerId::next(),
            held: Held::new(selector),
            callback: Callback::new(callback),
            scheduler,
        }
    }
}

impl<S, T: Clone, Sel, Cb, Q> SequenceConsumer<S, T, Sel, Cb, Q> {
    /// Returns a clone of the held sequence: the selection from the most recently consumed
    /// state.
    #[must_use]
    pub fn value(&self) -> Option<Vec<T>> {
        self.held.get()
    }
}

impl<S, T, Sel, Cb, Q> Consumer<S> for SequenceConsumer<S, T, Sel, Cb, Q>
where
    S: Clone + Send + 'static,
    T: PartialEq + Clone + Send + 'static,
    Sel: Fn(Option<&S>) -> Option<Vec<T>>,
    Cb: Fn(Option<S>, Option<Vec<T>>, Option<Vec<T>>) + Send + Sync + 'static,
    Q: Scheduler,
{
    fn id(&self) -> ConsumerId {
        self.id
    }

    fn consume(&self, new: Option<&S>) {
        let change = self.held.advance(new, |held, selected| {
            sequence_changed(held.as_deref(), selected.as_deref())
        });
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

impl_identity!(SequenceConsumer<S, T, Sel, Cb, Q>);

impl<S, T, Sel, Cb, Q: fmt::Debug> fmt::Debug for SequenceConsumer<S, T, Sel, Cb, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ds = f.debug_struct("SequenceConsumer");
        ds.field("id", &self.id);
        self.held.fmt_fields(&mut ds);
        ds.field("callback", &self.callback);
        ds.field("scheduler", &self.scheduler);
        ds.finish()
    }
}

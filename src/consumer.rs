use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;

use crate::{sync, unsync, ConsumerId, Scheduler};

#[cfg(doc)]
use crate::{ConsumerRegistry, Hub, PredicateConsumer, ScalarConsumer, SequenceConsumer};

// -------------------------------------------------------------------------------------------------

#[cfg_attr(not(feature = "sync"), allow(rustdoc::broken_intra_doc_links))]
/// An observer of one derived slice of a state container's state.
///
/// A consumer receives whole-state snapshots of type `S`, projects the slice it is interested
/// in, and when that slice has observably changed, schedules its callback on a [`Scheduler`].
/// It never runs its callback itself.
///
/// The three provided implementations are [`ScalarConsumer`], [`SequenceConsumer`], and
/// [`PredicateConsumer`]. Consumers are usually stored in trait object form, such as
/// [`unsync::DynConsumer`] or [`sync::DynConsumer`], which may be created via
/// [`IntoDynConsumer`].
///
/// # Identity
///
/// Every consumer has a [`ConsumerId`] which is distinct from every other consumer's,
/// even one built from the same selector and callback.
/// [`ConsumerRegistry`] and [`Hub`] identify consumers by this id alone.
///
/// # Requirements on implementors
///
/// * [`id()`](Self::id) must return the same value for the life of the consumer.
/// * Do not run observer code synchronously; hand it to a [`Scheduler`].
/// * Keep whatever "last seen" value the consumer holds private to it; it is updated only
///   by the consumer's own `consume*` methods.
///
/// # Generic parameters
///
/// * `S` is the type of the state snapshots.
pub trait Consumer<S>: fmt::Debug {
    /// Returns the identity of this consumer.
    fn id(&self) -> ConsumerId;

    /// Considers a new state, the steady-state entry point.
    ///
    /// The consumer compares the projection of `new` with its held value, schedules its
    /// callback if they differ, and then holds the new projection whether or not the callback
    /// was scheduled.
    ///
    /// `None` means that the container has no state yet.
    fn consume(&self, new: Option<&S>);

    /// Seeds the held value from `old`, then considers `new` exactly as
    /// [`consume()`](Self::consume) does.
    ///
    /// This is used once, when a consumer is subscribed and should be brought up to date
    /// immediately ("consume instantly"). `old` is typically `None`.
    /// It never schedules the callback except by way of `consume()`.
    fn consume_seeded(&self, old: Option<&S>, new: Option<&S>);

    /// Considers one live state transition, as delivered by a state container.
    ///
    /// The default implementation ignores `old` and calls [`consume()`](Self::consume),
    /// since a consumer which holds a value already knows what it saw last.
    /// Consumers that compare the two states directly override this.
    fn consume_transition(&self, old: Option<&S>, new: Option<&S>) {
        let _ = old;
        self.consume(new)
    }

    /// Convert this consumer into trait object form, allowing it to be stored in
    /// collections or passed non-generically.
    /// The produced trait object does not implement [`Sync`].
    ///
    /// **You should not need to override or call this method;** use [`IntoDynConsumer`] instead.
    #[doc(hidden)]
    fn into_dyn_consumer_unsync(self) -> unsync::DynConsumer<S>
    where
        Self: Sized + 'static,
    {
        alloc::rc::Rc::new(self)
    }

    /// Convert this consumer into trait object form, allowing it to be stored in
    /// collections or passed non-generically.
    /// The produced trait object implements [`Sync`].
    ///
    /// **You should not need to override or call this method;** use [`IntoDynConsumer`] instead.
    #[doc(hidden)]
    fn into_dyn_consumer_sync(self) -> sync::DynConsumer<S>
    where
        Self: Sized + Send + Sync + 'static,
    {
        Arc::new(self)
    }
}

// -------------------------------------------------------------------------------------------------
// Type-erasure related traits and impls.

/// Conversion from a concrete consumer type to (normally) some flavor of shared trait object.
///
/// This trait is a helper for [`Hub::add()`] and generally does not need to be implemented,
/// unless you are using a custom type for your type-erased consumers that is neither
/// [`sync::DynConsumer`] nor [`unsync::DynConsumer`].
///
/// # Generic parameters
///
/// * `Self` is the consumer type being converted from.
/// * `S` is the type of state accepted by the consumer.
/// * `C` is the consumer type being converted to.
pub trait IntoDynConsumer<S, C: Consumer<S>>: Consumer<S> {
    /// Wrap this [`Consumer`] into a type-erased form of type `C`.
    fn into_dyn_consumer(self) -> C;
}

impl<C, S> IntoDynConsumer<S, sync::DynConsumer<S>> for C
where
    C: Consumer<S> + Send + Sync + 'static,
{
    fn into_dyn_consumer(self) -> sync::DynConsumer<S> {
        self.into_dyn_consumer_sync()
    }
}

impl<C, S> IntoDynConsumer<S, unsync::DynConsumer<S>> for C
where
    C: Consumer<S> + 'static,
{
    fn into_dyn_consumer(self) -> unsync::DynConsumer<S> {
        self.into_dyn_consumer_unsync()
    }
}

impl<S> Consumer<S> for unsync::DynConsumer<S> {
    fn id(&self) -> ConsumerId {
        (**self).id()
    }
    fn consume(&self, new: Option<&S>) {
        (**self).consume(new)
    }
    fn consume_seeded(&self, old: Option<&S>, new: Option<&S>) {
        (**self).consume_seeded(old, new)
    }
    fn consume_transition(&self, old: Option<&S>, new: Option<&S>) {
        (**self).consume_transition(old, new)
    }

    fn into_dyn_consumer_unsync(self) -> unsync::DynConsumer<S> {
        self
    }

    // into_dyn_consumer_sync() is unimplementable because its bounds are not met.
}

impl<S> Consumer<S> for sync::DynConsumer<S> {
    fn id(&self) -> ConsumerId {
        (**self).id()
    }
    fn consume(&self, new: Option<&S>) {
        (**self).consume(new)
    }
    fn consume_seeded(&self, old: Option<&S>, new: Option<&S>) {
        (**self).consume_seeded(old, new)
    }
    fn consume_transition(&self, old: Option<&S>, new: Option<&S>) {
        (**self).consume_transition(old, new)
    }

    // into_dyn_consumer_unsync() will result in double-wrapping.

    fn into_dyn_consumer_sync(self) -> sync::DynConsumer<S> {
        self
    }
}

// -------------------------------------------------------------------------------------------------

/// An observer callback, shared between its consumer and the tasks it has scheduled.
pub(crate) struct Callback<F>(Arc<F>);

impl<F> Callback<F> {
    pub(crate) fn new(function: F) -> Self {
        Self(Arc::new(function))
    }

    /// Hands one invocation of the callback to `scheduler`.
    ///
    /// The new state is cloned now, so that the callback sees exactly the state that
    /// triggered it even if the container has moved on by the time it runs.
    pub(crate) fn schedule<S, T, Q>(
        &self,
        id: ConsumerId,
        scheduler: &Q,
        new_state: Option<&S>,
        old_value: Option<T>,
        new_value: Option<T>,
    ) where
        S: Clone + Send + 'static,
        T: Send + 'static,
        F: Fn(Option<S>, Option<T>, Option<T>) + Send + Sync + 'static,
        Q: Scheduler + ?Sized,
    {
        log::trace!("{id:?}: selected value changed; scheduling callback");
        let function = Arc::clone(&self.0);
        let state = new_state.cloned();
        scheduler.schedule(Box::new(move || function(state, old_value, new_value)));
    }
}

impl<F> fmt::Debug for Callback<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&crate::util::Unquote::type_name_of(&*self.0), f)
    }
}

// -------------------------------------------------------------------------------------------------

/// Implements identity equality and hashing for a consumer type with an `id` field.
macro_rules! impl_identity {
    ($name:ident < $($param:ident),* >) => {
        impl<$($param),*> PartialEq for $name<$($param),*> {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }
        impl<$($param),*> Eq for $name<$($param),*> {}
        impl<$($param),*> core::hash::Hash for $name<$($param),*> {
            fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
                core::hash::Hash::hash(&self.id, state)
            }
        }
    };
}
pub(crate) use impl_identity;

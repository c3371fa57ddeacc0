use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use crate::{Consumer, ConsumerId};

#[cfg(doc)]
use crate::Hub;

/// A deduplicating collection of [`Consumer`]s, keyed by their [`ConsumerId`]s.
///
/// Two consumers are the same entry only if they have the same id, which is to say, only if
/// they are the same consumer (or clones of one shared consumer). Consumers built from
/// identical selectors and callbacks are stored, and removed, independently.
///
/// The registry only manages membership. It never delivers states to its consumers; that
/// is [`Hub`]’s job, or the job of whatever container embeds the registry.
///
/// Iteration is in order of consumer construction.
///
/// # Generic parameters
///
/// * `S` is the type of state accepted by the consumers.
/// * `C` is the type of consumer stored, usually a trait object type such as
///   [`unsync::DynConsumer`](crate::unsync::DynConsumer).
pub struct ConsumerRegistry<S, C> {
    consumers: BTreeMap<ConsumerId, C>,
    _phantom: PhantomData<fn(&S)>,
}

impl<S, C> ConsumerRegistry<S, C> {
    /// Constructs an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            consumers: BTreeMap::new(),
            _phantom: PhantomData,
        }
    }

    /// Removes and returns the consumer with the given id, if present.
    pub fn remove(&mut self, id: ConsumerId) -> Option<C> {
        self.consumers.remove(&id)
    }

    /// Removes every consumer whose id is in `ids`, returning how many were removed.
    ///
    /// Ids which are not present are ignored.
    pub fn remove_all<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = ConsumerId>,
    {
        self.take_all(ids).len()
    }

    /// Removes every consumer whose id is in `ids` and returns them, so that the caller
    /// decides where they are dropped.
    pub(crate) fn take_all<I>(&mut self, ids: I) -> Vec<C>
    where
        I: IntoIterator<Item = ConsumerId>,
    {
        ids.into_iter()
            .filter_map(|id| self.consumers.remove(&id))
            .collect()
    }

    /// Returns whether a consumer with the given id is present.
    #[must_use]
    pub fn contains(&self, id: ConsumerId) -> bool {
        self.consumers.contains_key(&id)
    }

    /// Returns the consumer with the given id, if present.
    #[must_use]
    pub fn get(&self, id: ConsumerId) -> Option<&C> {
        self.consumers.get(&id)
    }

    /// Removes all consumers.
    pub fn clear(&mut self) {
        self.consumers.clear();
    }

    /// Returns the number of consumers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    /// Returns whether there are no consumers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    /// Iterates over the consumers.
    pub fn iter(&self) -> impl Iterator<Item = &C> + '_ {
        self.consumers.values()
    }

    /// Iterates over the ids of the consumers.
    pub fn ids(&self) -> impl Iterator<Item = ConsumerId> + '_ {
        self.consumers.keys().copied()
    }
}

impl<S, C: Consumer<S>> ConsumerRegistry<S, C> {
    /// Adds `consumer` to the registry.
    ///
    /// Returns `false`, and leaves the registry unchanged, if a consumer with the same id is
    /// already present.
    pub fn insert(&mut self, consumer: C) -> bool {
        let id = consumer.id();
        if self.consumers.contains_key(&id) {
            return false;
        }
        self.consumers.insert(id, consumer);
        true
    }
}

impl<S, C> Default for ConsumerRegistry<S, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, C: Consumer<S>> Extend<C> for ConsumerRegistry<S, C> {
    fn extend<I: IntoIterator<Item = C>>(&mut self, iter: I) {
        for consumer in iter {
            self.insert(consumer);
        }
    }
}

impl<S, C> fmt::Debug for ConsumerRegistry<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only the count; the consumers themselves are often verbose.
        f.debug_tuple("ConsumerRegistry")
            .field(&self.consumers.len())
            .finish()
    }
}

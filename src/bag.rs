use alloc::collections::BTreeSet;

use crate::{Consumer, ConsumerId, Hub, Scheduler};

/// Collects the [`ConsumerId`]s registered by one observer, so that they can be removed
/// together when that observer goes away.
///
/// A view which subscribes to a shared [`Hub`] typically adds each of its consumers to its
/// own bag, then calls [`remove_all_from()`](Self::remove_all_from) when it is torn down,
/// without disturbing the consumers other views have registered on the same hub.
///
/// Dropping a bag does not remove anything.
///
/// ```
/// use selective::{unsync::Hub, ConsumerBag, Immediate};
///
/// let hub: Hub<i32, Immediate> = Hub::new(Immediate);
/// let other = hub.select(|s: Option<&i32>| s.copied(), |_, _, _| {});
///
/// let mut bag = ConsumerBag::new();
/// bag.insert(hub.select(|s: Option<&i32>| s.copied(), |_, _, _| {}));
/// bag.insert(hub.select(|s: Option<&i32>| s.map(|x| x % 2), |_, _, _| {}));
/// assert_eq!(hub.count(), 3);
///
/// assert_eq!(bag.remove_all_from(&hub), 2);
/// assert!(bag.is_empty());
/// assert!(hub.contains(other));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConsumerBag {
    ids: BTreeSet<ConsumerId>,
}

impl ConsumerBag {
    /// Constructs an empty bag.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ids: BTreeSet::new(),
        }
    }

    /// Adds an id to the bag. Returns `false` if it was already present.
    pub fn insert(&mut self, id: ConsumerId) -> bool {
        self.ids.insert(id)
    }

    /// Returns whether the id is in the bag.
    #[must_use]
    pub fn contains(&self, id: ConsumerId) -> bool {
        self.ids.contains(&id)
    }

    /// Returns the number of ids in the bag.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns whether the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterates over the ids in the bag.
    pub fn ids(&self) -> impl Iterator<Item = ConsumerId> + '_ {
        self.ids.iter().copied()
    }

    /// Removes every collected consumer from `hub` and empties the bag.
    /// Returns how many consumers were actually registered with `hub`.
    pub fn remove_all_from<S, C, Q>(&mut self, hub: &Hub<S, C, Q>) -> usize
    where
        S: Clone,
        C: Consumer<S> + Clone,
        Q: Scheduler,
    {
        hub.remove_all(core::mem::take(&mut self.ids))
    }
}

impl Extend<ConsumerId> for ConsumerBag {
    fn extend<I: IntoIterator<Item = ConsumerId>>(&mut self, iter: I) {
        self.ids.extend(iter);
    }
}

impl FromIterator<ConsumerId> for ConsumerBag {
    fn from_iter<I: IntoIterator<Item = ConsumerId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

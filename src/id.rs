use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

#[cfg(doc)]
use crate::{Consumer, ConsumerRegistry};

/// The identity of one [`Consumer`].
///
/// Every consumer is issued a fresh `ConsumerId` when it is constructed, and keeps it for its
/// whole life; ids are never reused within a process.
/// Two consumers built from identical selectors and callbacks therefore still have distinct
/// ids, and a [`ConsumerRegistry`] keyed by id can tell them apart.
///
/// The ordering of ids is the order in which their consumers were constructed.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ConsumerId(usize);

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

impl ConsumerId {
    /// Issues a new id, distinct from every id issued before.
    ///
    /// # Panics
    ///
    /// Panics if the id counter would overflow, which would require `usize::MAX` consumers.
    #[must_use]
    pub fn next() -> Self {
        // Relaxed is enough: only uniqueness matters, not ordering relative to other memory.
        match NEXT_ID.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| id.checked_add(1)) {
            Ok(id) => Self(id),
            Err(_) => panic!("ConsumerId counter overflowed"),
        }
    }
}

impl fmt::Debug for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never multiline
        write!(f, "ConsumerId({})", self.0)
    }
}

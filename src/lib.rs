#![no_std]

//! Selector-based change notification for immutable state containers.
//!
//! # What `selective` does
//!
//! An application keeps its state in a single container (a “store”), which replaces the whole
//! state snapshot each time an action is dispatched. Observers, typically views, are each
//! interested in only a small slice of that state, and want to be called back only when
//! *their slice* has changed.
//!
//! `selective` sits between the two:
//!
//! * A [`Consumer`] owns a *selector*, which projects the slice of interest out of a state
//!   snapshot, and a *callback*. On each state transition it compares the new projection with
//!   the one it saw last, and if they differ, hands one callback invocation to a [`Scheduler`].
//!   Three kinds are provided: [`ScalarConsumer`] compares with [`PartialEq`],
//!   [`SequenceConsumer`] compares ordered sequences while keeping “absent” distinct from
//!   “empty”, and [`PredicateConsumer`] lets the caller decide what counts as a change.
//!
//! * A [`Hub`] is what the store talks to. It holds a [`ConsumerRegistry`] of consumers,
//!   deduplicated by [`ConsumerId`], and delivers every transition to all of them.
//!
//! * A [`Scheduler`] decides where callbacks run. [`TaskQueue`] defers them until the owning
//!   (UI) thread drains it; [`Immediate`] runs them inline, which is convenient for tests.
//!
//! Consumers never run observer code while a transition is being delivered, unless they were
//! given an inline scheduler. The only work done at delivery time is the selection and
//! comparison, which is why selectors should be cheap and free of side effects.
//!
//! # Getting started
//!
//! The types in this library are generic over how consumers are stored, and in particular
//! whether they are <code>[Send] + [Sync]</code>. For convenience, less-generic type aliases
//! are available in the [`sync`] and [`unsync`] modules.
//!
//! ```
//! use selective::{unsync::Hub, ConsumerBag, TaskQueue};
//!
//! #[derive(Clone)]
//! struct State {
//!     user: Option<String>,
//!     unread: Vec<u32>,
//! }
//!
//! let queue = TaskQueue::new();
//! let hub: Hub<State> = Hub::new(queue.clone());
//!
//! let mut bag = ConsumerBag::new();
//! bag.insert(hub.select(
//!     |s: Option<&State>| s.and_then(|s| s.user.clone()),
//!     |_, _, user| println!("signed in as {user:?}"),
//! ));
//! bag.insert(hub.select_sequence(
//!     |s: Option<&State>| s.map(|s| s.unread.clone()),
//!     |_, _, unread| println!("unread: {unread:?}"),
//! ));
//!
//! let state = State { user: Some("ada".into()), unread: vec![] };
//! hub.notify(None, Some(&state));
//! assert_eq!(queue.run_pending(), 2);
//!
//! // The view goes away.
//! bag.remove_all_from(&hub);
//! assert_eq!(hub.count(), 0);
//! ```
//!
//! # Features and platform requirements
//!
//! `selective` is compatible with `no_std` platforms, given the `alloc` crate and
//! pointer-sized atomics.
//!
//! The following Cargo feature flags are defined:
//!
//! * `"std"`:
//!   Enable implementations of our traits for [`std`] types,
//!   rather than only [`core`] and [`alloc`] types.
//!   Currently this is [`Scheduler`] for [`std::sync::mpsc::Sender<Task>`][Sender],
//!   which hands callbacks to a thread that runs its own receive loop.
//!
//! * `"sync"`:
//!   Makes use of [`std::sync`] to add [`Sync`] to [`Hub`] and [`TaskQueue`],
//!   so that states may be delivered on one thread and callbacks run on another.
//!   Adds the type alias [`sync::Hub`].
//!
//! * `"async"`:
//!   Add functionality for `async` programming,
//!   currently consisting of the
#![cfg_attr(feature = "async", doc = "[`future`]")]
#![cfg_attr(not(feature = "async"), doc = "`future`")]
//!   module.
//!
//! # Logging
//!
//! Registration changes are logged at `debug` level and scheduled callbacks at `trace` level,
//! using the [`log`] facade. No logger is installed by this library.
//!
#![cfg_attr(not(feature = "std"), doc = " [`std`]: https://doc.rust-lang.org/std/")]
#![cfg_attr(
    not(feature = "std"),
    doc = " [`std::sync`]: https://doc.rust-lang.org/std/sync/"
)]
#![cfg_attr(feature = "std", doc = " [Sender]: std::sync::mpsc::Sender")]
#![cfg_attr(
    not(feature = "std"),
    doc = " [Sender]: https://doc.rust-lang.org/std/sync/mpsc/struct.Sender.html"
)]
#![cfg_attr(not(feature = "sync"), allow(rustdoc::broken_intra_doc_links))]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(explicit_outlives_requirements)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(redundant_lifetimes)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unnameable_types)]
#![warn(unused_extern_crates)]
#![warn(unused_lifetimes)]
#![warn(unreachable_pub)]
#![warn(
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc
)]
#![warn(clippy::assigning_clones)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::exhaustive_enums)]
#![warn(clippy::exhaustive_structs)]
#![warn(clippy::inconsistent_struct_constructor)]
#![warn(clippy::large_futures)]
#![warn(clippy::large_stack_frames)]
#![warn(clippy::manual_let_else)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::module_name_repetitions)]
#![warn(clippy::pedantic)]
#![warn(clippy::return_self_not_must_use)]
#![warn(clippy::should_panic_without_expect)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::unnecessary_wraps)]
#![allow(clippy::bool_assert_comparison, reason = "less legible")]
#![allow(clippy::explicit_auto_deref)]
#![allow(clippy::explicit_iter_loop)]
#![allow(clippy::semicolon_if_nothing_returned, reason = "explicit delegation")]
#![cfg_attr(test, allow(clippy::arc_with_non_send_sync))]

// -------------------------------------------------------------------------------------------------

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

// -------------------------------------------------------------------------------------------------

mod bag;
pub use bag::ConsumerBag;

mod consumer;
pub use consumer::{Consumer, IntoDynConsumer};

#[cfg(feature = "async")]
pub mod future;

mod held;

mod hub;
pub use hub::Hub;

mod id;
pub use id::ConsumerId;

mod maybe_sync;

mod predicate;
pub use predicate::PredicateConsumer;

mod registry;
pub use registry::ConsumerRegistry;

mod scalar;
pub use scalar::ScalarConsumer;

mod scheduler;
pub use scheduler::{Immediate, Scheduler, Task, TaskQueue};

mod sequence;
pub use sequence::SequenceConsumer;

mod util;

// -------------------------------------------------------------------------------------------------

/// Type aliases for use in applications where consumers are expected to implement [`Sync`].
///
/// Some of the items in this module are only available with the `"sync"` feature.
pub mod sync {
    use crate::Consumer;
    use alloc::sync::Arc;

    #[cfg(doc)]
    use crate::unsync;

    /// Type-erased form of a [`Consumer`] which accepts states of type `S`.
    ///
    /// This type is [`Send`] and [`Sync`]. When that is not satisfiable, use
    /// [`unsync::DynConsumer`] instead.
    pub type DynConsumer<S> = Arc<dyn Consumer<S> + Send + Sync>;

    /// Delivers state transitions to consumers.
    ///
    /// This type is [`Send`] and [`Sync`] and therefore requires all its [`Consumer`]s to be so.
    /// When this requirement is undesired, use [`unsync::Hub`] instead.
    #[cfg(feature = "sync")]
    pub type Hub<S, Q = crate::TaskQueue> = crate::Hub<S, DynConsumer<S>, Q>;
}

/// Type aliases for use in applications where consumers are not expected to implement [`Sync`].
#[cfg_attr(not(feature = "sync"), allow(rustdoc::broken_intra_doc_links))]
pub mod unsync {
    use crate::Consumer;
    use alloc::rc::Rc;

    #[cfg(doc)]
    use crate::sync;

    /// Type-erased form of a [`Consumer`] which accepts states of type `S`.
    ///
    /// This type is not [`Send`] or [`Sync`]. When that is needed, use
    /// [`sync::DynConsumer`] instead.
    pub type DynConsumer<S> = Rc<dyn Consumer<S>>;

    /// Delivers state transitions to consumers.
    ///
    /// This type is not [`Send`] or [`Sync`]. When that is needed, use
    /// [`sync::Hub`] instead.
    pub type Hub<S, Q = crate::TaskQueue> = crate::Hub<S, DynConsumer<S>, Q>;
}

use std::panic::{RefUnwindSafe, UnwindSafe};

use static_assertions::{assert_impl_all, assert_not_impl_any};

#[allow(dead_code, reason = "only called in const context")]
#[cfg(feature = "sync")]
const fn assert_send_sync_if_cfg<T: Send + Sync>() {}
#[allow(dead_code, reason = "only called in const context")]
#[cfg(not(feature = "sync"))]
const fn assert_send_sync_if_cfg<T>() {}

type ScalarFns = selective::ScalarConsumer<
    i32,
    i32,
    fn(Option<&i32>) -> Option<i32>,
    fn(Option<i32>, Option<i32>, Option<i32>),
    selective::Immediate,
>;

const _: () = {
    // All types of interest in the library are listed here, in alphabetical order.

    assert_impl_all!(selective::ConsumerBag: Send, Sync, RefUnwindSafe, UnwindSafe);

    assert_impl_all!(selective::ConsumerId: Send, Sync, Copy, RefUnwindSafe, UnwindSafe);

    // ConsumerRegistry, sync and unsync flavors
    assert_not_impl_any!(
        selective::ConsumerRegistry<i32, selective::unsync::DynConsumer<i32>>: Send, Sync
    );
    assert_impl_all!(
        selective::ConsumerRegistry<i32, selective::sync::DynConsumer<i32>>: Send, Sync
    );

    // DynConsumer, sync and unsync flavors
    assert_not_impl_any!(selective::unsync::DynConsumer<i32>: Send, Sync);
    assert_impl_all!(selective::sync::DynConsumer<i32>: Send, Sync);

    // Hub, sync and unsync flavors
    assert_not_impl_any!(selective::unsync::Hub<i32>: Send, Sync);
    #[cfg(feature = "sync")]
    {
        assert_impl_all!(selective::sync::Hub<i32>: Send, Sync);
        assert_impl_all!(selective::sync::Hub<i32, selective::Immediate>: Send, Sync);
    }

    assert_impl_all!(selective::Immediate: Send, Sync, Copy, RefUnwindSafe, UnwindSafe);

    // The consumers hold their last value behind a lock of the configured kind.
    assert_send_sync_if_cfg::<ScalarFns>();

    assert_impl_all!(selective::Task: Send);
    assert_not_impl_any!(selective::Task: Sync);

    assert_send_sync_if_cfg::<selective::TaskQueue>();
};

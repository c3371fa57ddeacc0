use core::future::Future as _;
use core::pin::pin;
use core::task::{Context, Poll};

use futures::task::noop_waker_ref; // TODO: we can replace this with Waker::noop() when MSRV is Rust 1.85

use selective::{unsync, Scheduler as _, TaskQueue};

use crate::tools::{yield_now, Recorder};

// -------------------------------------------------------------------------------------------------

/// Basic functionality test using only `poll()` and ignoring wakers.
#[test]
fn ready_polling() {
    let ctx = &mut Context::from_waker(noop_waker_ref());
    let queue = TaskQueue::new();

    {
        let mut future = pin!(queue.ready());
        assert_eq!(future.as_mut().poll(ctx), Poll::Pending);

        // Once a task is scheduled, polling will return Ready.
        queue.schedule(Box::new(|| {}));
        assert_eq!(future.as_mut().poll(ctx), Poll::Ready(()));
    }

    // Still ready, since `ready()` does not consume tasks.
    assert_eq!(pin!(queue.ready()).as_mut().poll(ctx), Poll::Ready(()));
    assert_eq!(queue.run_pending(), 1);
    assert_eq!(pin!(queue.ready()).as_mut().poll(ctx), Poll::Pending);
}

#[test]
fn ui_task_is_woken_by_notification() {
    let queue = TaskQueue::new();
    let hub: unsync::Hub<i32> = unsync::Hub::new(queue.clone());
    let recorder: Recorder<i32> = Recorder::new();
    hub.select(|s: Option<&i32>| s.copied(), recorder.callback());

    futures::executor::block_on(async {
        futures::join!(
            async {
                // UI task.
                assert_eq!(queue.run_when_ready().await, 1);
            },
            async {
                // Store task. Yields first so that the UI task is already waiting.
                yield_now().await;
                hub.notify(None, Some(&1));
            },
        );
    });

    assert_eq!(recorder.drain(), vec![(None, Some(1))]);
}

use std::sync::{Arc, Mutex};
use std::thread;

use selective::{sync, TaskQueue};

use crate::tools::Recorder;

/// The store dispatches on a background thread while this thread, standing in for the UI
/// thread, drains the queue. Every callback must run here, in dispatch order.
#[test]
fn notify_on_background_thread_drain_on_ui_thread() {
    const STATES: i32 = 200;

    let queue = TaskQueue::new();
    let hub: Arc<sync::Hub<i32>> = Arc::new(sync::Hub::new(queue.clone()));
    let recorder: Recorder<i32> = Recorder::new();
    hub.select(|s: Option<&i32>| s.copied(), recorder.callback());

    let ran_on = Arc::new(Mutex::new(Vec::new()));
    hub.select(|s: Option<&i32>| s.map(|x| x % 2), {
        let ran_on = ran_on.clone();
        move |_, _, _| ran_on.lock().unwrap().push(thread::current().id())
    });

    let store = thread::spawn({
        let hub = hub.clone();
        move || {
            let mut old = None;
            for state in 1..=STATES {
                hub.notify(old.as_ref(), Some(&state));
                old = Some(state);
            }
        }
    });

    let mut drained = 0;
    while !store.is_finished() {
        drained += queue.run_pending();
        thread::yield_now();
    }
    store.join().unwrap();
    drained += queue.run_pending();

    let expected: Vec<(Option<i32>, Option<i32>)> = (1..=STATES)
        .map(|state| ((state > 1).then_some(state - 1), Some(state)))
        .collect();
    assert_eq!(recorder.drain(), expected);

    let ran_on = ran_on.lock().unwrap();
    assert_eq!(drained, expected.len() + ran_on.len());
    assert_eq!(ran_on.len(), usize::try_from(STATES).unwrap());
    let ui_thread = thread::current().id();
    assert!(ran_on.iter().all(|&id| id == ui_thread));
}

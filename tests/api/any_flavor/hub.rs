use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};
use std::sync::Arc;

use indoc::indoc;
use pretty_assertions::assert_eq;
use selective::{Consumer, ConsumerId, Immediate, TaskQueue};

use super::flavor;
use crate::tools::{AppState, Recorder, TestStore};

fn count(state: Option<&AppState>) -> Option<i32> {
    state.map(|s| s.count)
}

fn counted(count: i32) -> AppState {
    AppState {
        count,
        ..AppState::default()
    }
}

#[test]
fn debug() {
    let hub: flavor::Hub<AppState> = flavor::Hub::new(TaskQueue::new());
    hub.select(count, |_, _, _| {});
    assert_eq!(
        format!("{hub:#?}"),
        indoc! {"
            Hub {
                consumers: 1,
                closed: false,
                consume_instantly: false,
                scheduler: TaskQueue(0),
            }"
        }
    );
}

#[test]
fn eager_subscription_then_same_projection() {
    let queue = TaskQueue::new();
    let hub: flavor::Hub<AppState> = flavor::Hub::new(queue.clone());
    let recorder: Recorder<i32> = Recorder::new();
    hub.select(count, recorder.callback());

    let s0 = counted(4);
    let s1 = AppState {
        title: "unrelated".into(),
        ..s0.clone()
    };
    hub.notify_initial(Some(&s0));
    queue.run_pending();
    assert_eq!(recorder.drain(), vec![(None, Some(4))]);

    hub.notify(Some(&s0), Some(&s1));
    queue.run_pending();
    assert_eq!(recorder.drain().len(), 0);
}

#[test]
fn eager_subscription_then_different_projection() {
    let queue = TaskQueue::new();
    let hub: flavor::Hub<AppState> = flavor::Hub::new(queue.clone());
    let recorder: Recorder<i32> = Recorder::new();
    hub.select(count, recorder.callback());

    hub.notify_initial(Some(&counted(4)));
    queue.run_pending();
    recorder.drain();

    hub.notify(Some(&counted(4)), Some(&counted(5)));
    queue.run_pending();
    assert_eq!(recorder.drain(), vec![(Some(4), Some(5))]);
}

#[test]
fn consume_instantly_brings_new_consumer_up_to_date() {
    let queue = TaskQueue::new();
    let hub: flavor::Hub<AppState> =
        flavor::Hub::new(queue.clone()).with_consume_instantly(true);
    let mut store = TestStore::new(counted(0));
    store.dispatch(counted(7), |old, new| hub.notify(old, new));
    assert_eq!(hub.latest_state(), Some(counted(7)));

    let recorder: Recorder<i32> = Recorder::new();
    hub.select(count, recorder.callback());
    assert_eq!(queue.len(), 1);
    queue.run_pending();
    assert_eq!(recorder.drain(), vec![(None, Some(7))]);

    // Already up to date, so the next equal state does not fire.
    store.dispatch(counted(7), |old, new| hub.notify(old, new));
    queue.run_pending();
    assert_eq!(recorder.drain().len(), 0);
}

#[test]
fn consume_instantly_disabled_waits_for_next_state() {
    let queue = TaskQueue::new();
    let hub: flavor::Hub<AppState> = flavor::Hub::new(queue.clone());
    hub.notify(None, Some(&counted(7)));

    let recorder: Recorder<i32> = Recorder::new();
    hub.select(count, recorder.callback());
    assert!(queue.is_empty());

    hub.notify(Some(&counted(7)), Some(&counted(7)));
    queue.run_pending();
    assert_eq!(recorder.drain(), vec![(None, Some(7))]);
}

#[test]
fn consume_instantly_before_any_state() {
    let queue = TaskQueue::new();
    let hub: flavor::Hub<AppState> =
        flavor::Hub::new(queue.clone()).with_consume_instantly(true);
    hub.select(count, |_, _, _| panic!("nothing to deliver"));
    assert!(queue.is_empty());
}

#[test]
fn lookalike_consumers_are_removed_independently() {
    let hub: flavor::Hub<AppState, Immediate> = flavor::Hub::new(Immediate);
    let recorder: Recorder<i32> = Recorder::new();
    let first = hub.select(count, recorder.callback());
    let second = hub.select(count, recorder.callback());
    assert_ne!(first, second);
    assert_eq!(hub.count(), 2);

    hub.notify(None, Some(&counted(1)));
    assert_eq!(recorder.drain().len(), 2);

    assert!(hub.remove(first));
    assert!(!hub.remove(first));
    assert!(hub.contains(second));

    // The survivor kept its own held value.
    hub.notify(Some(&counted(1)), Some(&counted(2)));
    assert_eq!(recorder.drain(), vec![(Some(1), Some(2))]);
}

#[test]
fn remove_all_may_consult_hub_while_iterating() {
    let hub: flavor::Hub<AppState, Immediate> = flavor::Hub::new(Immediate);
    let a = hub.select(count, |_, _, _| {});
    let b = hub.select(count, |_, _, _| {});
    let kept = hub.select(count, |_, _, _| {});
    assert!(hub.remove(b));

    let removed = hub.remove_all(
        [a, b]
            .into_iter()
            .filter(|&id| hub.contains(id) && hub.count() > 0),
    );
    assert_eq!(removed, 1);
    assert_eq!(hub.count(), 1);
    assert!(hub.contains(kept));
}

#[test]
fn removal_does_not_withdraw_scheduled_callbacks() {
    let queue = TaskQueue::new();
    let hub: flavor::Hub<AppState> = flavor::Hub::new(queue.clone());
    let recorder: Recorder<i32> = Recorder::new();
    let id = hub.select(count, recorder.callback());

    hub.notify(None, Some(&counted(1)));
    hub.remove(id);
    hub.notify(Some(&counted(1)), Some(&counted(2)));
    queue.run_pending();

    assert_eq!(recorder.drain(), vec![(None, Some(1))]);
}

#[test]
fn callbacks_of_one_consumer_stay_in_order() {
    let queue = TaskQueue::new();
    let hub: flavor::Hub<AppState> = flavor::Hub::new(queue.clone());
    let counts: Recorder<i32> = Recorder::new();
    let titles: Recorder<String> = Recorder::new();
    hub.select(count, counts.callback());
    hub.select(
        |s: Option<&AppState>| s.map(|s| s.title.clone()),
        titles.callback(),
    );

    let mut store = TestStore::new(AppState::default());
    for i in 1..=3 {
        let next = AppState {
            count: i,
            title: format!("#{i}"),
            items: None,
        };
        store.dispatch(next, |old, new| hub.notify(old, new));
    }
    assert_eq!(queue.len(), 6);
    queue.run_pending();

    assert_eq!(
        counts.drain(),
        vec![(None, Some(1)), (Some(1), Some(2)), (Some(2), Some(3))]
    );
    assert_eq!(
        titles.drain(),
        vec![
            (None, Some("#1".to_owned())),
            (Some("#1".to_owned()), Some("#2".to_owned())),
            (Some("#2".to_owned()), Some("#3".to_owned())),
        ]
    );
}

#[test]
fn custom_consumer() {
    #[derive(Debug)]
    struct Tally {
        id: ConsumerId,
        seen: Arc<AtomicUsize>,
    }
    impl Consumer<AppState> for Tally {
        fn id(&self) -> ConsumerId {
            self.id
        }
        fn consume(&self, _: Option<&AppState>) {
            self.seen.fetch_add(1, Relaxed);
        }
        fn consume_seeded(&self, _: Option<&AppState>, new: Option<&AppState>) {
            self.consume(new)
        }
    }

    let hub: flavor::Hub<AppState> = flavor::Hub::new(TaskQueue::new());
    let seen = Arc::new(AtomicUsize::new(0));
    let id = ConsumerId::next();
    assert_eq!(
        hub.add(Tally {
            id,
            seen: seen.clone(),
        }),
        id
    );

    hub.notify_initial(Some(&counted(0)));
    hub.notify(Some(&counted(0)), Some(&counted(0)));
    assert_eq!(seen.load(Relaxed), 2);
}

#[test]
fn clear_keeps_hub_usable() {
    let hub: flavor::Hub<AppState, Immediate> = flavor::Hub::new(Immediate);
    hub.select(count, |_, _, _| {});
    hub.select(count, |_, _, _| {});
    hub.clear();
    assert_eq!(hub.count(), 0);

    let recorder: Recorder<i32> = Recorder::new();
    hub.select(count, recorder.callback());
    hub.notify(None, Some(&counted(1)));
    assert_eq!(recorder.drain(), vec![(None, Some(1))]);
}

#[test]
fn close_drops_consumers() {
    let detector = Arc::new(());
    let hub: flavor::Hub<AppState> = flavor::Hub::new(TaskQueue::new());
    hub.select(count, {
        let detector = detector.clone();
        move |_, _, _| assert!(Arc::strong_count(&detector) > 0)
    });
    assert_eq!(Arc::strong_count(&detector), 2);

    hub.close();
    assert_eq!(hub.count(), 0);
    assert_eq!(Arc::strong_count(&detector), 1);
    assert!(format!("{hub:?}").contains("closed: true"));
}

#[test]
#[should_panic = "cannot deliver states after Hub::close()"]
fn notify_after_close() {
    let hub: flavor::Hub<AppState> = flavor::Hub::new(TaskQueue::new());
    hub.close();
    hub.notify(None, Some(&counted(0)));
}

#[test]
#[should_panic = "cannot deliver states after Hub::close()"]
fn add_after_close() {
    let hub: flavor::Hub<AppState> = flavor::Hub::new(TaskQueue::new());
    hub.close();
    hub.select(count, |_, _, _| {});
}

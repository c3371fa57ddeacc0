use selective::{Consumer as _, Immediate, IntoDynConsumer as _, SequenceConsumer, TaskQueue};

use super::flavor;
use crate::tools::{AppState, Recorder};

fn with_items(items: Option<Vec<u32>>) -> AppState {
    AppState {
        items,
        ..AppState::default()
    }
}

#[test]
fn absent_is_not_empty() {
    let queue = TaskQueue::new();
    let hub: flavor::Hub<AppState> = flavor::Hub::new(queue.clone());
    let recorder: Recorder<Vec<u32>> = Recorder::new();
    hub.select_sequence(
        |s: Option<&AppState>| s.and_then(|s| s.items.clone()),
        recorder.callback(),
    );

    let states = [
        with_items(None),
        with_items(None),
        with_items(Some(vec![])),
        with_items(Some(vec![])),
        with_items(None),
    ];
    let mut old = None;
    for state in &states {
        hub.notify(old, Some(state));
        old = Some(state);
    }
    queue.run_pending();

    assert_eq!(
        recorder.drain(),
        vec![(None, Some(vec![])), (Some(vec![]), None)]
    );
}

#[test]
fn order_sensitive() {
    let recorder: Recorder<Vec<u32>> = Recorder::new();
    let consumer: flavor::DynConsumer<Vec<u32>> = SequenceConsumer::new(
        |s: Option<&Vec<u32>>| s.cloned(),
        recorder.callback(),
        Immediate,
    )
    .into_dyn_consumer();

    consumer.consume(Some(&vec![1, 2, 3]));
    recorder.drain();

    consumer.consume(Some(&vec![1, 2, 3]));
    assert!(recorder.drain().is_empty());
    consumer.consume(Some(&vec![3, 2, 1]));
    assert_eq!(
        recorder.drain(),
        vec![(Some(vec![1, 2, 3]), Some(vec![3, 2, 1]))]
    );
    consumer.consume(Some(&vec![3, 2]));
    assert_eq!(recorder.drain(), vec![(Some(vec![3, 2, 1]), Some(vec![3, 2]))]);
}

#[test]
fn held_value_follows_every_state() {
    let consumer = SequenceConsumer::new(
        |s: Option<&AppState>| s.and_then(|s| s.items.clone()),
        |_, _, _| {},
        Immediate,
    );
    for items in [None, Some(vec![]), Some(vec![4]), None] {
        consumer.consume(Some(&with_items(items.clone())));
        assert_eq!(consumer.value(), items);
    }
}

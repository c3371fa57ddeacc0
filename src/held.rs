use core::fmt;
use core::marker::PhantomData;
use core::mem;

use crate::maybe_sync::Mutex;

/// A selector together with the last value it produced; the state shared by every consumer
/// which compares against a remembered value.
pub(crate) struct Held<S, T, Sel> {
    selector: Sel,
    value: Mutex<Option<T>>,
    _phantom: PhantomData<fn(Option<&S>)>,
}

impl<S, T, Sel> Held<S, T, Sel>
where
    Sel: Fn(Option<&S>) -> Option<T>,
{
    pub(crate) fn new(selector: Sel) -> Self {
        Self {
            selector,
            value: Mutex::new(None),
            _phantom: PhantomData,
        }
    }

    /// Replaces the held value with the selection from `state`, without any comparison.
    pub(crate) fn seed(&self, state: Option<&S>) {
        // The selector runs outside the lock; it is arbitrary caller code.
        let seeded = (self.selector)(state);
        *self.value.lock_unpoisoned() = seeded;
    }

    /// Selects from `state` and makes that the held value.
    ///
    /// If `changed(previous, current)` returns true, returns the former and new values for
    /// delivery to a callback; otherwise returns [`None`].
    /// Either way, the held value afterward is the new selection.
    pub(crate) fn advance(
        &self,
        state: Option<&S>,
        changed: impl FnOnce(&Option<T>, &Option<T>) -> bool,
    ) -> Option<(Option<T>, Option<T>)>
    where
        T: Clone,
    {
        let selected = (self.selector)(state);
        let mut held = self.value.lock_unpoisoned();
        if changed(&held, &selected) {
            let current = selected.clone();
            Some((mem::replace(&mut *held, selected), current))
        } else {
            *held = selected;
            None
        }
    }
}

impl<S, T: Clone, Sel> Held<S, T, Sel> {
    pub(crate) fn get(&self) -> Option<T> {
        self.value.lock_unpoisoned().clone()
    }
}

impl<S, T, Sel> Held<S, T, Sel> {
    pub(crate) fn fmt_fields(&self, ds: &mut fmt::DebugStruct<'_, '_>) {
        ds.field(
            "selector",
            &crate::util::Unquote::type_name_of(&self.selector),
        );
        // Only whether there is a value; printing it would require T: Debug.
        ds.field("has_value", &self.value.lock_unpoisoned().is_some());
    }
}

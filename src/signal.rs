//! Shared observable values with scoped subscriptions.
//!
//! Pointer position and window visibility are process-wide state: they
//! outlive any single viewer and may be observed by several. A [`Signal`]
//! is a cheap cloneable handle to one such value. Consumers either poll the
//! latest value with [`Signal::get`] or register a callback with
//! [`Signal::subscribe`]; dropping the returned [`Subscription`] removes the
//! callback deterministically, so a torn-down viewer can never be called
//! back into.
//!
//! Everything runs on the event-loop thread, matching the rest of the
//! viewer's single-threaded model.

use std::cell::RefCell;
use std::rc::Rc;

struct SignalState<T> {
    value: T,
    next_id: u64,
    listeners: Vec<(u64, Box<dyn FnMut(T)>)>,
    /// Ids unsubscribed while a dispatch had the listener list checked out.
    dead: Vec<u64>,
}

/// A shared, observable value.
pub struct Signal<T: Copy> {
    state: Rc<RefCell<SignalState<T>>>,
}

impl<T: Copy> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: Copy + 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            state: Rc::new(RefCell::new(SignalState {
                value,
                next_id: 0,
                listeners: Vec::new(),
                dead: Vec::new(),
            })),
        }
    }

    /// The most recent published value.
    pub fn get(&self) -> T {
        self.state.borrow().value
    }

    /// Publishes a new value and invokes every live subscriber with it.
    ///
    /// The internal borrow is released during dispatch, so a listener may
    /// read the signal or drop subscriptions, its own included. Publishing
    /// back into the same signal from a listener is not supported.
    pub fn set(&self, value: T) {
        // Check the listener list out of the shared state for the dispatch.
        let mut active = {
            let mut state = self.state.borrow_mut();
            state.value = value;
            std::mem::take(&mut state.listeners)
        };

        for (id, listener) in active.iter_mut() {
            // An earlier listener may have unsubscribed this one.
            if self.state.borrow().dead.contains(id) {
                continue;
            }
            listener(value);
        }

        let mut state = self.state.borrow_mut();
        active.retain(|(id, _)| !state.dead.contains(id));
        state.dead.clear();
        // Listeners subscribed during dispatch landed in the fresh list;
        // they go after the survivors.
        active.append(&mut state.listeners);
        state.listeners = active;
    }

    /// Registers a callback for future publishes.
    ///
    /// The callback stays registered until the returned subscription is
    /// dropped.
    pub fn subscribe(&self, listener: impl FnMut(T) + 'static) -> Subscription<T> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.listeners.push((id, Box::new(listener)));

        Subscription {
            state: Rc::clone(&self.state),
            id,
        }
    }
}

/// Handle to a registered callback; unregisters on drop.
pub struct Subscription<T> {
    state: Rc<RefCell<SignalState<T>>>,
    id: u64,
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.listeners.retain(|(id, _)| *id != self.id);
        // The listener may be checked out by a running dispatch; the id is
        // recorded so the merge discards it.
        state.dead.push(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn get_returns_latest_published_value() {
        let signal = Signal::new(1);
        signal.set(2);
        signal.set(3);
        assert_eq!(signal.get(), 3);
    }

    #[test]
    fn clones_share_the_same_value() {
        let a = Signal::new(0.0f32);
        let b = a.clone();
        a.set(0.5);
        assert_eq!(b.get(), 0.5);
    }

    #[test]
    fn subscribers_see_each_publish() {
        let signal = Signal::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = signal.subscribe(move |v| sink.borrow_mut().push(v));

        signal.set(1);
        signal.set(2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn dropped_subscription_receives_nothing() {
        let signal = Signal::new(0u32);
        let calls = Rc::new(Cell::new(0u32));

        let counter = Rc::clone(&calls);
        let sub = signal.subscribe(move |_| counter.set(counter.get() + 1));

        signal.set(1);
        assert_eq!(calls.get(), 1);

        drop(sub);
        signal.set(2);
        signal.set(3);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn listener_may_read_the_signal_during_dispatch() {
        let signal = Signal::new(1u32);
        let seen = Rc::new(Cell::new(0u32));

        let handle = signal.clone();
        let sink = Rc::clone(&seen);
        let _sub = signal.subscribe(move |_| sink.set(handle.get()));

        signal.set(7);
        assert_eq!(seen.get(), 7);
    }

    #[test]
    fn listener_may_drop_another_subscription_during_dispatch() {
        let signal = Signal::new(0u32);
        let calls = Rc::new(Cell::new(0u32));

        let counter = Rc::clone(&calls);
        let victim = Rc::new(RefCell::new(Some(
            signal.subscribe(move |_| counter.set(counter.get() + 1)),
        )));

        let slot = Rc::clone(&victim);
        let _dropper = signal.subscribe(move |_| {
            slot.borrow_mut().take();
        });

        signal.set(1);
        signal.set(2);
        // The victim ran once, for the publish that removed it, never after.
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn listener_may_drop_its_own_subscription_during_dispatch() {
        let signal = Signal::new(0u32);
        let calls = Rc::new(Cell::new(0u32));
        let slot: Rc<RefCell<Option<Subscription<u32>>>> = Rc::new(RefCell::new(None));

        let counter = Rc::clone(&calls);
        let me = Rc::clone(&slot);
        *slot.borrow_mut() = Some(signal.subscribe(move |_| {
            counter.set(counter.get() + 1);
            me.borrow_mut().take();
        }));

        signal.set(1);
        signal.set(2);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn dropping_one_subscription_leaves_others_live() {
        let signal = Signal::new(0u32);
        let a = Rc::new(Cell::new(0u32));
        let b = Rc::new(Cell::new(0u32));

        let ca = Rc::clone(&a);
        let sub_a = signal.subscribe(move |_| ca.set(ca.get() + 1));
        let cb = Rc::clone(&b);
        let _sub_b = signal.subscribe(move |_| cb.set(cb.get() + 1));

        signal.set(1);
        drop(sub_a);
        signal.set(2);

        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
    }
}

use crate::domain::{merged, State, Update};
use crate::ports::{Listener, StateStore, Subscription};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::trace;

struct StoreInner {
    state: State,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
    commits: u64,
}

/// In-memory implementation of [`StateStore`].
///
/// Every `set_state` call is one physical commit. Listeners run once per
/// commit that changes the state, in registration order.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_state(State::new())
    }

    pub fn with_state(state: State) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                state,
                listeners: Vec::new(),
                next_listener_id: 0,
                commits: 0,
            })),
        }
    }

    /// Number of `set_state` calls received so far.
    pub fn commit_count(&self) -> u64 {
        self.inner.borrow().commits
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for InMemoryStore {
    fn get_state(&self) -> State {
        self.inner.borrow().state.clone()
    }

    fn set_state(&self, update: Update, replace: bool) {
        let previous = self.get_state();
        let partial = update.resolve(&previous);
        let next = if replace {
            partial
        } else {
            merged(&previous, partial)
        };

        let listeners: Vec<Listener> = {
            let mut inner = self.inner.borrow_mut();
            inner.commits += 1;
            if next == previous {
                trace!(commit = inner.commits, "Commit without changes");
                return;
            }
            inner.state = next.clone();
            trace!(commit = inner.commits, keys = next.len(), "State committed");
            inner.listeners.iter().map(|(_, l)| l.clone()).collect()
        };

        for listener in listeners {
            listener(&next, &previous);
        }
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_listener_id;
            inner.next_listener_id += 1;
            inner.listeners.push((id, listener));
            id
        };

        let weak: Weak<RefCell<StoreInner>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
            }
        })
    }
}

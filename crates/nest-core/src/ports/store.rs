//! # Store Port
//!
//! The single-container store the composition layer sits on. Any store that
//! can read, write (merge or replace) and notify listeners works; the core
//! assumes only that one `set_state` call produces at most one notification
//! batch.

use crate::domain::{State, Update};
use std::fmt;
use std::rc::Rc;

/// Change listener, called with `(next, previous)`.
pub type Listener = Rc<dyn Fn(&State, &State)>;

/// The read/write/subscribe contract of the underlying store.
pub trait StateStore {
    /// Current state.
    fn get_state(&self) -> State;

    /// Merge (or replace, when `replace` is set) and notify listeners.
    fn set_state(&self, update: Update, replace: bool);

    /// Register a listener for committed changes.
    fn subscribe(&self, listener: Listener) -> Subscription;
}

/// A subscription handle.
///
/// When dropped, the listener is removed. Call [`Subscription::detach`] to
/// keep it registered for the lifetime of the store.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel.
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    /// Remove the listener now.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keep the listener registered; the handle is consumed.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

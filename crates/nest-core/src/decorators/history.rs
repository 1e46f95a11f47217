//! # Undo/Redo History
//!
//! Records the interface's state before every committed write that changes
//! it. The layer only marks that a write passed through this interface; the
//! step is taken from the commit notification, so what is recorded is what
//! the store held, not a guess at it. A composed write commits once, so one
//! logical write is one history step no matter how many namespaces it
//! touches.

use crate::domain::{State, Update};
use crate::ports::Subscription;
use crate::service::api::{Api, Next, WeakApi, WriteLayer};
use crate::service::unit::Producer;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::{debug, trace};

/// Extension name under which [`History`] is attached.
pub const HISTORY_EXTENSION: &str = "history";

/// History configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of past states kept.
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { limit: 100 }
    }
}

impl HistoryConfig {
    pub fn with_limit(limit: usize) -> Self {
        Self { limit }
    }
}

#[derive(Debug, Default)]
struct Timeline {
    past: VecDeque<State>,
    future: Vec<State>,
}

struct Shared {
    limit: usize,
    timeline: RefCell<Timeline>,
    recording: Cell<bool>,
    pending: Cell<bool>,
}

impl Shared {
    fn record(&self, before: State) {
        let mut timeline = self.timeline.borrow_mut();
        timeline.past.push_back(before);
        if timeline.past.len() > self.limit {
            timeline.past.pop_front();
        }
        timeline.future.clear();
        trace!(past = timeline.past.len(), "History step recorded");
    }
}

/// Suspends recording while undo/redo writes.
struct Paused<'a>(&'a Shared);

impl<'a> Paused<'a> {
    fn new(shared: &'a Shared) -> Self {
        shared.recording.set(false);
        Self(shared)
    }
}

impl Drop for Paused<'_> {
    fn drop(&mut self) {
        self.0.recording.set(true);
    }
}

struct HistoryLayer {
    shared: Rc<Shared>,
}

impl WriteLayer for HistoryLayer {
    fn write(&self, _api: &Api, update: Update, replace: bool, next: Next<'_>) {
        if self.shared.recording.get() {
            self.shared.pending.set(true);
        }
        next.run(update, replace);
    }
}

/// Undo/redo handle attached to a decorated interface.
pub struct History {
    api: WeakApi,
    shared: Rc<Shared>,
    _commits: Subscription,
}

impl History {
    /// Restore the previous state. Returns false when there is nothing to undo.
    pub fn undo(&self) -> bool {
        let Some(api) = self.api.upgrade() else {
            return false;
        };
        let Some(previous) = self.shared.timeline.borrow_mut().past.pop_back() else {
            return false;
        };
        let current = api.get_state();
        self.shared.timeline.borrow_mut().future.push(current);
        let _paused = Paused::new(&self.shared);
        api.set_state(Update::Partial(previous), true);
        debug!(past = self.past_len(), "Undo");
        true
    }

    /// Re-apply the last undone state. Returns false when there is nothing to redo.
    pub fn redo(&self) -> bool {
        let Some(api) = self.api.upgrade() else {
            return false;
        };
        let Some(next) = self.shared.timeline.borrow_mut().future.pop() else {
            return false;
        };
        let current = api.get_state();
        self.shared.timeline.borrow_mut().past.push_back(current);
        let _paused = Paused::new(&self.shared);
        api.set_state(Update::Partial(next), true);
        debug!(future = self.future_len(), "Redo");
        true
    }

    pub fn past_len(&self) -> usize {
        self.shared.timeline.borrow().past.len()
    }

    pub fn future_len(&self) -> usize {
        self.shared.timeline.borrow().future.len()
    }

    pub fn clear(&self) {
        let mut timeline = self.shared.timeline.borrow_mut();
        timeline.past.clear();
        timeline.future.clear();
    }
}

/// Decorate `producer` with undo/redo history.
pub fn with_history(producer: Producer, config: HistoryConfig) -> Producer {
    Rc::new(move |api: &Api| {
        let initial = producer(api)?;
        let shared = Rc::new(Shared {
            limit: config.limit,
            timeline: RefCell::new(Timeline::default()),
            recording: Cell::new(true),
            pending: Cell::new(false),
        });
        let observer = shared.clone();
        let commits = api.subscribe(move |next, previous| {
            if observer.pending.replace(false) && next != previous {
                observer.record(previous.clone());
            }
        });
        api.push_layer(Rc::new(HistoryLayer {
            shared: shared.clone(),
        }));
        api.insert_extension(
            HISTORY_EXTENSION,
            History {
                api: api.downgrade(),
                shared,
                _commits: commits,
            },
        );
        Ok(initial)
    })
}

//! # Write Coalescer
//!
//! Installed by composition on every composed interface. A write arriving at
//! a composed interface is split by child address; each child sees its
//! portion through its own `set_state` (so decorators on that child observe
//! it), and everything the children push back up is collected into one
//! payload and committed once.
//!
//! ## Routing
//!
//! ```text
//! working = resolve(update)
//! for child in registration order:
//!     skip the child that originated this write (in flight)
//!     local = project_down(working)
//!     replace: child.set_state(local, replace), even when local is empty
//!     merge:   stop when working is empty; skip an empty local
//!              local changes nothing → carry the child's current slice
//!              otherwise              → child.set_state(local, merge)
//!     remove the child's keys from working
//! commit working ∪ payload once (outermost session only)
//! ```
//!
//! A replace reaches every child so that keys a child holds but the new
//! state omits are dropped through that child's own write path.

use crate::domain::{is_noop, merge, Update};
use crate::service::api::{absent_keys, Api, Next, PayloadSession, WriteLayer};
use tracing::{debug, trace};

/// The write layer that routes a composed write to its children.
#[derive(Debug, Default)]
pub struct Coalescer;

impl WriteLayer for Coalescer {
    fn write(&self, api: &Api, update: Update, replace: bool, next: Next<'_>) {
        let session = PayloadSession::open(api);

        let current = api.get_state();
        let resolved = update.resolve(&current);
        let removed_by_replace = if replace {
            absent_keys(&current, &resolved)
        } else {
            Vec::new()
        };

        let mut working = resolved;
        let mut routed = 0usize;
        for child in api.children() {
            if working.is_empty() && !replace {
                break;
            }
            if child.api.is_in_flight() {
                trace!(namespace = %child.address.key(), "Skipping originating namespace");
                continue;
            }
            let local = child.address.project_down(&working);
            let consumed = child.address.owned_keys(&working);

            if replace {
                child.api.set_state(Update::Partial(local), true);
                routed += 1;
            } else if local.is_empty() {
                continue;
            } else {
                let child_state = child.api.get_state();
                if is_noop(&child_state, &local) {
                    api.contribute(child.address.project_up(child_state), Vec::new());
                } else {
                    child.api.set_state(Update::Partial(local), false);
                    routed += 1;
                }
            }

            for key in consumed {
                working.remove(&key);
            }
        }

        if !session.is_owner() {
            // Re-entrant write on an interface that is already routing.
            trace!(residual = working.len(), "Folding write into open payload");
            api.contribute(working, removed_by_replace);
            return;
        }

        let (values, removed) = session.take().into_parts();
        let mut out = working;
        merge(&mut out, values);
        debug!(
            routed,
            keys = out.len(),
            removed = removed.len(),
            replace,
            "Coalesced write"
        );

        if replace {
            next.run(Update::Partial(out), true);
        } else if removed.is_empty() {
            next.run(Update::Partial(out), false);
        } else {
            let mut full = current;
            for key in &removed {
                full.remove(key);
            }
            merge(&mut full, out);
            next.run(Update::Partial(full), true);
        }
    }
}

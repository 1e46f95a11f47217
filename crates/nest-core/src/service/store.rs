//! Store construction: run a producer against a root interface and commit
//! its initial state.

use crate::adapters::InMemoryStore;
use crate::domain::{NamespaceError, Update};
use crate::ports::StateStore;
use crate::service::api::Api;
use crate::service::unit::Producer;
use std::rc::Rc;
use tracing::info;

/// Create an in-memory store from `producer` and return its root interface.
pub fn create_store(producer: Producer) -> Result<Api, NamespaceError> {
    create_store_with(Rc::new(InMemoryStore::new()), producer)
}

/// Create a store over an existing [`StateStore`].
///
/// The produced state is merged over whatever `store` already holds, in one
/// commit that bypasses the interface's write layers.
pub fn create_store_with(
    store: Rc<dyn StateStore>,
    producer: Producer,
) -> Result<Api, NamespaceError> {
    let api = Api::root(store.clone());
    let initial = producer(&api)?;
    info!(
        keys = initial.len(),
        namespaces = api.child_keys().len(),
        "Store created"
    );
    store.set_state(Update::Partial(initial), false);
    Ok(api)
}

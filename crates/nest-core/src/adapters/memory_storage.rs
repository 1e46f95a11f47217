use crate::ports::KeyValueStorage;
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory implementation of [`KeyValueStorage`] for testing
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn get_item(&self, name: &str) -> Option<String> {
        self.items.borrow().get(name).cloned()
    }

    fn set_item(&self, name: &str, value: String) {
        self.items.borrow_mut().insert(name.to_string(), value);
    }

    fn remove_item(&self, name: &str) {
        self.items.borrow_mut().remove(name);
    }
}

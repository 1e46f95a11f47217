//! # Decorators Across Namespaces
//!
//! History and persistence applied to a whole composed store and to single
//! namespaces before they are composed.

#[cfg(test)]
mod tests {
    use crate::init_test_logging;
    use nest_core::decorators::{HISTORY_EXTENSION, PERSIST_EXTENSION};
    use nest_core::{
        accessor, create_store, create_store_with, initial, namespaced, namespaced_with,
        persisted, with_history, History, HistoryConfig, InMemoryStorage, InMemoryStore,
        KeyValueStorage, Partializer, PersistHandle, State, Unit,
    };
    use serde_json::{json, Value};
    use std::rc::Rc;

    fn only(field: &'static str) -> Partializer {
        Partializer(Rc::new(move |s: &State| {
            s.iter()
                .filter(|(k, _)| k.as_str() == field)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        }))
    }

    // =============================================================================
    // HISTORY
    // =============================================================================

    #[test]
    fn test_multi_unit_write_is_one_history_step() {
        init_test_logging();
        let a = Unit::builder("A").flatten().build(initial(json!({"x": 0}))).unwrap();
        let b = Unit::new("B", initial(json!({"y": 0}))).unwrap();
        let physical = InMemoryStore::new();
        let store = create_store_with(
            Rc::new(physical.clone()),
            with_history(
                namespaced_with(initial(json!({"title": "t"})), [a.clone(), b.clone()]),
                HistoryConfig::default(),
            ),
        )
        .unwrap();
        let history = store.extension::<History>(HISTORY_EXTENSION).unwrap();
        let original = store.get_state();

        store.set_state(json!({"title": "u", "A_x": 1, "B": {"y": 2}}), false);
        assert_eq!(history.past_len(), 1);

        accessor(&store, &b).unwrap().set_state(json!({"y": 3}), false);
        assert_eq!(history.past_len(), 2);

        assert!(history.undo());
        assert_eq!(store.get_state()["B"], json!({"y": 2}));
        assert!(history.undo());
        assert_eq!(store.get_state(), original);
        assert_eq!(Value::Object(accessor(&store, &a).unwrap().get_state()), json!({"x": 0}));

        let before = physical.commit_count();
        assert!(history.redo());
        assert_eq!(physical.commit_count() - before, 1);
        assert_eq!(store.get_state()["A_x"], json!(1));
    }

    #[test]
    fn test_history_on_nested_unit_sees_routed_writes() {
        init_test_logging();
        let counter = Unit::new(
            "counter",
            with_history(initial(json!({"n": 0})), HistoryConfig::default()),
        )
        .unwrap();
        let group = Unit::builder("group")
            .flatten()
            .build(namespaced([counter.clone()]))
            .unwrap();
        let store = create_store(namespaced([group.clone()])).unwrap();
        let counter_acc = accessor(&store, &group).unwrap().accessor(&counter).unwrap();
        let history = counter_acc.extension::<History>(HISTORY_EXTENSION).unwrap();

        store.set_state(json!({"group_counter": {"n": 4}}), false);
        assert_eq!(history.past_len(), 1);

        assert!(history.undo());
        assert_eq!(store.get_state()["group_counter"], json!({"n": 0}));
    }

    #[test]
    fn test_undo_drops_key_added_at_depth() {
        init_test_logging();
        let counter = Unit::new("counter", initial(json!({"n": 0}))).unwrap();
        let group = Unit::builder("group")
            .flatten()
            .build(namespaced([counter.clone()]))
            .unwrap();
        let store = create_store(with_history(
            namespaced_with(initial(json!({"title": "t"})), [group.clone()]),
            HistoryConfig::default(),
        ))
        .unwrap();
        let history = store.extension::<History>(HISTORY_EXTENSION).unwrap();
        let counter_acc = accessor(&store, &group).unwrap().accessor(&counter).unwrap();

        counter_acc.set_state(json!({"extra": true}), false);
        assert_eq!(history.past_len(), 1);

        assert!(history.undo());
        assert_eq!(Value::Object(counter_acc.get_state()), json!({"n": 0}));
        assert_eq!(
            Value::Object(store.get_state()),
            json!({"title": "t", "group_counter": {"n": 0}})
        );
    }

    // =============================================================================
    // PERSISTENCE
    // =============================================================================

    #[test]
    fn test_persisted_unit_saves_partialized_slice() {
        init_test_logging();
        let storage = Rc::new(InMemoryStorage::new());
        let settings = Unit::builder("settings")
            .options(only("theme"))
            .build(initial(json!({"theme": "light", "volume": 1})))
            .unwrap();
        let settings = persisted(&settings, storage.clone());
        let store = create_store(namespaced_with(
            initial(json!({"session": 1})),
            [settings.clone()],
        ))
        .unwrap();

        store.set_state(json!({"settings": {"theme": "dark", "volume": 3}, "session": 2}), false);

        let raw = storage.get_item("settings").unwrap();
        let saved: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(saved, json!({"state": {"theme": "dark"}, "version": 0}));

        let handle = accessor(&store, &settings)
            .unwrap()
            .extension::<PersistHandle>(PERSIST_EXTENSION)
            .unwrap();
        assert_eq!(handle.name(), "settings");
    }

    #[test]
    fn test_persisted_composition_keeps_fields_the_write_left_alone() {
        init_test_logging();
        let storage = Rc::new(InMemoryStorage::new());
        let build = |storage: Rc<InMemoryStorage>| {
            let b = Unit::new("B", initial(json!({"y": 0, "z": 1}))).unwrap();
            persisted(&Unit::new("app", namespaced([b])).unwrap(), storage)
        };

        let first_unit = build(storage.clone());
        let first = create_store(namespaced([first_unit])).unwrap();
        first.set_state(json!({"app": {"B": {"y": 5}}}), false);

        let saved: Value = serde_json::from_str(&storage.get_item("app").unwrap()).unwrap();
        assert_eq!(saved, json!({"state": {"B": {"y": 5, "z": 1}}, "version": 0}));

        let second = create_store(namespaced([build(storage.clone())])).unwrap();
        assert_eq!(second.get_state()["app"], json!({"B": {"y": 5, "z": 1}}));
    }

    #[test]
    fn test_persisted_unit_rehydrates_in_new_store() {
        init_test_logging();
        let storage = Rc::new(InMemoryStorage::new());
        let build = |storage: Rc<InMemoryStorage>| {
            let unit = Unit::builder("settings")
                .flatten()
                .options(only("theme"))
                .build(initial(json!({"theme": "light", "volume": 1})))
                .unwrap();
            persisted(&unit, storage)
        };

        let first_unit = build(storage.clone());
        let first = create_store(namespaced([first_unit.clone()])).unwrap();
        accessor(&first, &first_unit)
            .unwrap()
            .set_state(json!({"theme": "dark", "volume": 9}), false);

        let second_unit = build(storage.clone());
        let second = create_store(namespaced([second_unit])).unwrap();

        assert_eq!(
            Value::Object(second.get_state()),
            json!({"settings_theme": "dark", "settings_volume": 1})
        );

        first
            .namespace(&first_unit)
            .unwrap()
            .extension::<PersistHandle>(PERSIST_EXTENSION)
            .unwrap()
            .clear_storage();
        assert!(storage.is_empty());
    }
}

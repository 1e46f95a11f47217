/// String key-value storage used by the persistence decorator.
pub trait KeyValueStorage {
    fn get_item(&self, name: &str) -> Option<String>;
    fn set_item(&self, name: &str, value: String);
    fn remove_item(&self, name: &str);
}

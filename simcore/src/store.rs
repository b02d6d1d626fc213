use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::JsonObject;

/// A record held by a [`ResourceStore`]. The ID is a synthetic string
/// assigned by the store's counter ("SUB-1007") or provided by a seed.
pub trait Record: Clone + Send + 'static {
    fn id(&self) -> &str;
}

/// Mutable, ordered collection of records for one resource type, scoped to
/// the lifetime of a test run. Single-threaded access pattern; the mutex
/// only guards the handler/test boundary.
pub struct ResourceStore<R: Record> {
    records: Mutex<Vec<R>>,
    counter: AtomicU64,
    initial_counter: u64,
}

impl<R: Record> ResourceStore<R> {
    pub const fn new() -> Self {
        Self::with_initial_counter(1)
    }

    pub const fn with_initial_counter(initial: u64) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            counter: AtomicU64::new(initial),
            initial_counter: initial,
        }
    }

    /// Replace the collection contents. The auto-increment counter is
    /// re-derived from the maximum numeric suffix found in the seeded IDs
    /// so subsequently created records don't collide with the fixtures.
    pub fn seed(&self, records: Vec<R>) {
        let max_suffix = records
            .iter()
            .filter_map(|r| trailing_number(r.id()))
            .max();
        let next = match max_suffix {
            Some(n) => n + 1,
            None => self.initial_counter,
        };
        self.counter.store(next, Ordering::SeqCst);
        *self.records.lock().unwrap() = records;
    }

    /// Empty the collection and reset the counter to its initial value.
    pub fn clear(&self) {
        self.records.lock().unwrap().clear();
        self.counter.store(self.initial_counter, Ordering::SeqCst);
    }

    /// Produce the next synthetic ID for this store.
    pub fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", prefix, n)
    }

    pub fn insert(&self, record: R) -> R {
        self.records.lock().unwrap().push(record.clone());
        record
    }

    pub fn get(&self, id: &str) -> Option<R> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    /// Mutate the record with the given ID in place, returning the updated
    /// record, or `None` when the lookup misses.
    pub fn update<F>(&self, id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut R),
    {
        let mut records = self.records.lock().unwrap();
        let record = records.iter_mut().find(|r| r.id() == id)?;
        f(record);
        Some(record.clone())
    }

    /// Mutate every record, returning the number touched.
    pub fn update_all<F>(&self, mut f: F) -> usize
    where
        F: FnMut(&mut R),
    {
        let mut records = self.records.lock().unwrap();
        for record in records.iter_mut() {
            f(record);
        }
        records.len()
    }

    pub fn remove(&self, id: &str) -> Option<R> {
        let mut records = self.records.lock().unwrap();
        let index = records.iter().position(|r| r.id() == id)?;
        Some(records.remove(index))
    }

    /// Records in store (insertion) order.
    pub fn snapshot(&self) -> Vec<R> {
        self.records.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

impl<R: Record> Default for ResourceStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Shallow-merge a JSON patch into a record, ignoring any `id` key. Used by
/// the PUT/PATCH handlers; last write wins, no conflict detection.
pub fn apply_patch<R>(record: &R, patch: &JsonObject) -> Result<R, String>
where
    R: Record + Serialize + DeserializeOwned,
{
    let mut value = serde_json::to_value(record).map_err(|e| e.to_string())?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| "record did not serialize to an object".to_string())?;
    for (key, patch_value) in patch {
        if key == "id" {
            continue;
        }
        object.insert(key.clone(), patch_value.clone());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Trailing digit run of an ID ("SUB-1007" -> 1007); `None` when the ID
/// doesn't end in digits.
fn trailing_number(id: &str) -> Option<u64> {
    let digits: String = id
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Widget {
        id: String,
    }

    impl Record for Widget {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn widget(id: &str) -> Widget {
        Widget { id: id.to_string() }
    }

    #[test]
    fn test_trailing_number() {
        assert_eq!(trailing_number("SUB-1007"), Some(1007));
        assert_eq!(trailing_number("3"), Some(3));
        assert_eq!(trailing_number("no-digits-"), None);
        assert_eq!(trailing_number(""), None);
    }

    #[test]
    fn test_counter_follows_seeded_suffixes() {
        let store = ResourceStore::new();
        store.seed(vec![widget("W-3"), widget("W-12"), widget("legacy")]);
        assert_eq!(store.next_id("W"), "W-13");
    }

    #[test]
    fn test_clear_resets_counter() {
        let store = ResourceStore::new();
        store.seed(vec![widget("W-40")]);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.next_id("W"), "W-1");
    }
}

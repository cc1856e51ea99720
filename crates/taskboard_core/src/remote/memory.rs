//! In-memory document store with a write log.
//!
//! # Responsibility
//! - Mirror the HTTP backend's path semantics over a local JSON tree.
//! - Record every write so callers can assert which paths were touched.
//!
//! # Invariants
//! - `replace` creates intermediate objects; `replace(null)` removes.
//! - Numeric segments index into arrays; removing an array element leaves a `null` hole.
//! - While offline, every call fails before touching the tree or the log.

use super::{split_path, RemoteStore, StoreError, StoreResult, StoredDocument};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Kind of recorded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Replace,
    Remove,
}

/// One write observed by the memory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub op: WriteOp,
    pub path: String,
}

impl WriteRecord {
    pub fn replace(path: impl Into<String>) -> Self {
        Self {
            op: WriteOp::Replace,
            path: path.into(),
        }
    }
}

#[derive(Debug)]
pub struct MemoryRemoteStore {
    root: Mutex<Value>,
    writes: Mutex<Vec<WriteRecord>>,
    offline: AtomicBool,
}

impl Default for MemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self {
            root: Mutex::new(Value::Object(Map::new())),
            writes: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Stores `value` at `path` without recording a write.
    pub fn seed(&self, path: &str, value: Value) -> StoreResult<()> {
        let segments = split_path(path)?;
        set_at(&mut self.lock_root(), &segments, value);
        Ok(())
    }

    /// Copy of the whole tree.
    pub fn snapshot(&self) -> Value {
        self.lock_root().clone()
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.lock_writes().clone()
    }

    /// Paths written since the last `clear_writes`, in order.
    pub fn written_paths(&self) -> Vec<String> {
        self.lock_writes()
            .iter()
            .map(|record| record.path.clone())
            .collect()
    }

    pub fn clear_writes(&self) {
        self.lock_writes().clear();
    }

    /// Makes every following call fail with a transport error until reset.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self, method: &'static str, path: &str) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Transport {
                method,
                path: path.to_string(),
                message: "memory store is offline".to_string(),
            });
        }
        Ok(())
    }

    fn record(&self, op: WriteOp, path: &str) {
        self.lock_writes().push(WriteRecord {
            op,
            path: path.trim_matches('/').to_string(),
        });
    }

    fn lock_root(&self) -> MutexGuard<'_, Value> {
        self.root.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_writes(&self) -> MutexGuard<'_, Vec<WriteRecord>> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RemoteStore for MemoryRemoteStore {
    fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        self.check_online("GET", path)?;
        let segments = split_path(path)?;
        let root = self.lock_root();
        Ok(get_at(&root, &segments)
            .filter(|value| !value.is_null())
            .cloned())
    }

    fn create(&self, path: &str, value: &Value) -> StoreResult<StoredDocument> {
        self.check_online("POST", path)?;
        let key = Uuid::new_v4().simple().to_string();
        let full_path = format!("{}/{key}", path.trim_matches('/'));
        set_at(&mut self.lock_root(), &split_path(&full_path)?, value.clone());
        self.record(WriteOp::Create, path);
        Ok(StoredDocument {
            key: Some(key),
            value: value.clone(),
        })
    }

    fn replace(&self, path: &str, value: &Value) -> StoreResult<StoredDocument> {
        self.check_online("PUT", path)?;
        let segments = split_path(path)?;
        {
            let mut root = self.lock_root();
            if value.is_null() {
                remove_at(&mut root, &segments);
            } else {
                set_at(&mut root, &segments, value.clone());
            }
        }
        self.record(WriteOp::Replace, path);
        Ok(StoredDocument {
            key: None,
            value: value.clone(),
        })
    }

    fn remove(&self, path: &str) -> StoreResult<()> {
        self.check_online("DELETE", path)?;
        let segments = split_path(path)?;
        remove_at(&mut self.lock_root(), &segments);
        self.record(WriteOp::Remove, path);
        Ok(())
    }
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn get_at<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(root, |node, segment| child(node, segment))
}

fn child_mut_or_insert<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    match (node, segment.parse::<usize>().ok()) {
        (Value::Array(items), Some(index)) => {
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        (node, _) => {
            if !node.is_object() {
                *node = Value::Object(into_object(std::mem::take(node)));
            }
            &mut node[segment]
        }
    }
}

// Non-numeric keys under an array turn it into an index-keyed object.
fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, item)| !item.is_null())
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        _ => Map::new(),
    }
}

fn set_at(root: &mut Value, segments: &[&str], value: Value) {
    let mut node = root;
    for segment in segments {
        node = child_mut_or_insert(node, segment);
    }
    *node = value;
}

fn remove_at(root: &mut Value, segments: &[&str]) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut node = root;
    for segment in parents {
        let next = match node {
            Value::Object(map) => map.get_mut(*segment),
            Value::Array(items) => match segment.parse::<usize>() {
                Ok(index) => items.get_mut(index),
                Err(_) => None,
            },
            _ => None,
        };
        match next {
            Some(next) => node = next,
            None => return,
        }
    }
    match node {
        Value::Object(map) => {
            map.remove(*last);
        }
        Value::Array(items) => {
            if let Some(item) = last.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                *item = Value::Null;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryRemoteStore, WriteOp};
    use crate::remote::RemoteStore;
    use serde_json::json;

    #[test]
    fn replace_creates_intermediate_objects() {
        let store = MemoryRemoteStore::new();
        store.replace("users/ns/u1/name", &json!("Ada")).unwrap();
        assert_eq!(store.get("users/ns/u1").unwrap(), Some(json!({ "name": "Ada" })));
    }

    #[test]
    fn numeric_segments_index_into_arrays() {
        let store = MemoryRemoteStore::new();
        store.seed("board/todo", json!([{ "t": 1 }, { "t": 2 }])).unwrap();
        store.replace("board/todo/1/t", &json!(5)).unwrap();
        assert_eq!(store.get("board/todo/1/t").unwrap(), Some(json!(5)));
        assert_eq!(store.get("board/todo/7").unwrap(), None);
    }

    #[test]
    fn removing_array_element_leaves_hole() {
        let store = MemoryRemoteStore::new();
        store.seed("list", json!(["a", "b", "c"])).unwrap();
        store.remove("list/1").unwrap();
        assert_eq!(store.get("list").unwrap(), Some(json!(["a", null, "c"])));
    }

    #[test]
    fn replace_null_removes_and_create_generates_keys() {
        let store = MemoryRemoteStore::new();
        let stored = store.create("users/ns", &json!({ "name": "Ada" })).unwrap();
        let key = stored.key.unwrap();
        assert!(store.get(&format!("users/ns/{key}")).unwrap().is_some());

        store.replace(&format!("users/ns/{key}"), &serde_json::Value::Null).unwrap();
        assert_eq!(store.get(&format!("users/ns/{key}")).unwrap(), None);

        let ops = store.writes().into_iter().map(|w| w.op).collect::<Vec<_>>();
        assert_eq!(ops, vec![WriteOp::Create, WriteOp::Replace]);
    }

    #[test]
    fn offline_store_fails_without_writing() {
        let store = MemoryRemoteStore::new();
        store.set_offline(true);
        assert!(store.replace("a", &json!(1)).is_err());
        assert!(store.get("a").is_err());
        assert!(store.writes().is_empty());

        store.set_offline(false);
        assert_eq!(store.get("a").unwrap(), None);
    }
}

use crate::store::{CoordinationStore, KeyValue, OpContext, StoreError};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// MemoryStore is an in-process `CoordinationStore`. It keeps etcd's revision semantics (a global
/// revision bumped on every write, per-key create/mod revisions) so that election ordering
/// behaves the same as against a real cluster.
///
/// Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    entries: BTreeMap<String, StoredValue>,
    revision: i64,
    // Simulates the store's own election being in progress: every call fails with NoLeader.
    leaderless: bool,
}

struct StoredValue {
    value: Bytes,
    create_revision: i64,
    mod_revision: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_leaderless(&self, leaderless: bool) {
        self.lock().leaderless = leaderless;
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().entries.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // No user code runs while the lock is held, so a poisoned lock still holds consistent data.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_leader(&self, op: &'static str, key: &str) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let inner = self.lock();
        if inner.leaderless {
            return Err(StoreError::NoLeader {
                op,
                key: key.to_string(),
            });
        }
        Ok(inner)
    }
}

impl Inner {
    fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a String, &'a StoredValue)> + 'a {
        self.entries
            .range(prefix.to_string()..)
            .take_while(move |(key, _)| key.starts_with(prefix))
    }
}

impl MemoryStore {
    fn get_now(&self, key: &str) -> Result<Option<KeyValue>, StoreError> {
        let inner = self.check_leader("get", key)?;
        Ok(inner.entries.get(key).map(|stored| to_key_value(key, stored)))
    }

    fn put_now(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        let mut inner = self.check_leader("put", key)?;
        inner.revision += 1;
        let revision = inner.revision;

        let create_revision = inner
            .entries
            .get(key)
            .map(|existing| existing.create_revision)
            .unwrap_or(revision);
        inner.entries.insert(
            key.to_string(),
            StoredValue {
                value,
                create_revision,
                mod_revision: revision,
            },
        );
        Ok(())
    }

    fn list_prefix_now(&self, prefix: &str) -> Result<Vec<KeyValue>, StoreError> {
        let inner = self.check_leader("list", prefix)?;
        Ok(inner
            .with_prefix(prefix)
            .map(|(key, stored)| to_key_value(key, stored))
            .collect())
    }

    fn first_created_now(&self, prefix: &str) -> Result<Option<KeyValue>, StoreError> {
        let inner = self.check_leader("first_created", prefix)?;
        Ok(inner
            .with_prefix(prefix)
            .min_by_key(|(_, stored)| stored.create_revision)
            .map(|(key, stored)| to_key_value(key, stored)))
    }

    fn delete_prefix_now(&self, prefix: &str) -> Result<u64, StoreError> {
        let mut inner = self.check_leader("delete_prefix", prefix)?;
        let doomed: Vec<String> = inner.with_prefix(prefix).map(|(key, _)| key.clone()).collect();
        if !doomed.is_empty() {
            inner.revision += 1;
        }
        for key in doomed.iter() {
            inner.entries.remove(key);
        }
        Ok(doomed.len() as u64)
    }
}

#[async_trait::async_trait]
impl CoordinationStore for MemoryStore {
    async fn get(&self, ctx: &OpContext, key: &str) -> Result<Option<KeyValue>, StoreError> {
        ctx.run("get", async { self.get_now(key) }).await
    }

    async fn put(&self, ctx: &OpContext, key: &str, value: Bytes) -> Result<(), StoreError> {
        ctx.run("put", async { self.put_now(key, value) }).await
    }

    async fn list_prefix(&self, ctx: &OpContext, prefix: &str) -> Result<Vec<KeyValue>, StoreError> {
        ctx.run("list", async { self.list_prefix_now(prefix) }).await
    }

    async fn first_created(&self, ctx: &OpContext, prefix: &str) -> Result<Option<KeyValue>, StoreError> {
        ctx.run("first_created", async { self.first_created_now(prefix) }).await
    }

    async fn delete_prefix(&self, ctx: &OpContext, prefix: &str) -> Result<u64, StoreError> {
        ctx.run("delete_prefix", async { self.delete_prefix_now(prefix) }).await
    }
}

fn to_key_value(key: &str, stored: &StoredValue) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: stored.value.clone(),
        create_revision: stored.create_revision,
        mod_revision: stored.mod_revision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> OpContext {
        OpContext::background()
    }

    #[tokio::test]
    async fn put_then_get() {
        let store = MemoryStore::new();
        store.put(&ctx(), "/a", Bytes::from("1")).await.unwrap();

        let kv = store.get(&ctx(), "/a").await.unwrap().expect("key should exist");
        assert_eq!(kv.value, Bytes::from("1"));
        assert_eq!(kv.create_revision, 1);
        assert!(store.get(&ctx(), "/b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn overwrite_keeps_create_revision() {
        let store = MemoryStore::new();
        store.put(&ctx(), "/a", Bytes::from("1")).await.unwrap();
        store.put(&ctx(), "/b", Bytes::from("x")).await.unwrap();
        store.put(&ctx(), "/a", Bytes::from("2")).await.unwrap();

        let kv = store.get(&ctx(), "/a").await.unwrap().unwrap();
        assert_eq!(kv.value, Bytes::from("2"));
        assert_eq!(kv.create_revision, 1);
        assert_eq!(kv.mod_revision, 3);
    }

    #[tokio::test]
    async fn list_prefix_is_bounded_and_sorted() {
        let store = MemoryStore::new();
        for key in &["/p/b", "/p/a", "/q/a", "/p", "/pz"] {
            store.put(&ctx(), key, Bytes::from("v")).await.unwrap();
        }

        let keys: Vec<String> = store
            .list_prefix(&ctx(), "/p/")
            .await
            .unwrap()
            .into_iter()
            .map(|kv| kv.key)
            .collect();
        assert_eq!(keys, vec!["/p/a".to_string(), "/p/b".to_string()]);
    }

    #[tokio::test]
    async fn first_created_orders_by_create_revision() {
        let store = MemoryStore::new();
        store.put(&ctx(), "/e/z", Bytes::from("first")).await.unwrap();
        store.put(&ctx(), "/e/a", Bytes::from("second")).await.unwrap();
        store.put(&ctx(), "/e/z", Bytes::from("first-again")).await.unwrap();

        let leader = store.first_created(&ctx(), "/e/").await.unwrap().unwrap();
        assert_eq!(leader.key, "/e/z");
        assert!(store.first_created(&ctx(), "/none/").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_prefix_counts_removed_keys() {
        let store = MemoryStore::new();
        for key in &["/x/1", "/x/2", "/y/1"] {
            store.put(&ctx(), key, Bytes::from("v")).await.unwrap();
        }

        assert_eq!(store.delete_prefix(&ctx(), "/x/").await.unwrap(), 2);
        assert_eq!(store.keys(), vec!["/y/1".to_string()]);
    }

    #[tokio::test]
    async fn leaderless_store_rejects_calls() {
        let store = MemoryStore::new();
        store.set_leaderless(true);

        let err = store.get(&ctx(), "/a").await.unwrap_err();
        assert!(err.is_no_leader(), "unexpected error {:?}", err);

        store.set_leaderless(false);
        assert!(store.get(&ctx(), "/a").await.unwrap().is_none());
    }
}

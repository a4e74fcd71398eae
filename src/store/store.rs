use crate::store::{ContextError, OpContext};
use bytes::Bytes;

/// KeyValue is a single record read from the coordination store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Bytes,
    // Revision of the store when this key was (last) created. Leader election orders
    // candidates by it.
    pub create_revision: i64,
    pub mod_revision: i64,
}

/// CoordinationStore is the typed-bytes view of the linearizable key-value service shared by
/// every CDC process. Keys are UTF-8.
///
/// Every call runs under the given `OpContext`, so it may fail with `StoreError::Context` when the
/// caller cancels or the deadline passes.
#[async_trait::async_trait]
pub trait CoordinationStore: Send + Sync {
    /// Linearizable read of a single key.
    async fn get(&self, ctx: &OpContext, key: &str) -> Result<Option<KeyValue>, StoreError>;

    async fn put(&self, ctx: &OpContext, key: &str, value: Bytes) -> Result<(), StoreError>;

    /// All records whose key starts with `prefix`, in ascending key order.
    async fn list_prefix(&self, ctx: &OpContext, prefix: &str) -> Result<Vec<KeyValue>, StoreError>;

    /// The record under `prefix` with the lowest create revision. This is how the holder of an
    /// election is found: candidates each own one key under the election prefix, and the oldest
    /// one leads.
    async fn first_created(&self, ctx: &OpContext, prefix: &str) -> Result<Option<KeyValue>, StoreError>;

    /// Atomically deletes every key that starts with `prefix`. Returns the number of deleted keys.
    async fn delete_prefix(&self, ctx: &OpContext, prefix: &str) -> Result<u64, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    // The store itself is electing a leader. Transient, callers decide whether to tolerate it.
    #[error("{op} '{key}': coordination store has no leader")]
    NoLeader { op: &'static str, key: String },

    #[error("{op} '{key}': {status}")]
    Rpc {
        op: &'static str,
        key: String,
        status: tonic::Status,
    },

    #[error("{op} '{key}': store returned a key that is not UTF-8")]
    NonUtf8Key { op: &'static str, key: String },

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl StoreError {
    pub fn is_no_leader(&self) -> bool {
        matches!(self, StoreError::NoLeader { .. })
    }
}

/// `prefix_range_end()` returns the smallest key greater than every key starting with `prefix`,
/// which is how etcd expresses a prefix range.
pub(crate) fn prefix_range_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < 0xff {
            end.push(last + 1);
            return end;
        }
    }

    // Every byte was 0xff (or the prefix was empty): range to the end of the keyspace.
    vec![0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_end_increments_last_byte() {
        assert_eq!(prefix_range_end(b"/tidb/cdc"), b"/tidb/cdd".to_vec());
        assert_eq!(prefix_range_end(b"/a/"), b"/a0".to_vec());
    }

    #[test]
    fn range_end_drops_trailing_max_bytes() {
        assert_eq!(prefix_range_end(&[b'a', 0xff, 0xff]), vec![b'b']);
        assert_eq!(prefix_range_end(&[0xff]), vec![0]);
        assert_eq!(prefix_range_end(b""), vec![0]);
    }
}

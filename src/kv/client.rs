use crate::kv::keys::{
    self, CAPTURE_INFO_PREFIX, CAPTURE_OWNER_PREFIX, CDC_KEY_BASE, CHANGEFEED_INFO_PREFIX, GC_SAFEPOINT_KEY,
    TASK_STATUS_PREFIX,
};
use crate::model::{CaptureInfo, ChangefeedInfo, ChangefeedStatus, TaskStatus};
use crate::store::{CoordinationStore, KeyValue, OpContext, StoreError};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// CdcKvClient reads and writes CDC records at their well-known keys.
pub struct CdcKvClient<S: CoordinationStore> {
    logger: slog::Logger,
    store: S,
}

/// ProcessorInfo is one task status together with the (capture, changefeed) pair it belongs to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProcessorInfo {
    pub capture_id: String,
    pub changefeed_id: String,
    pub status: TaskStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum CdcKvError {
    #[error("{what} '{id}' not found")]
    NotFound { what: &'static str, id: String },
    #[error("malformed {what} at '{key}': {source}")]
    Malformed {
        what: &'static str,
        key: String,
        source: serde_json::Error,
    },
    #[error("unexpected key '{key}' under the {what} prefix")]
    MalformedKey { what: &'static str, key: String },
    #[error("failed to encode {what} '{id}': {source}")]
    Encode {
        what: &'static str,
        id: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CdcKvError {
    pub fn is_no_leader(&self) -> bool {
        matches!(self, CdcKvError::Store(e) if e.is_no_leader())
    }
}

impl<S: CoordinationStore> CdcKvClient<S> {
    pub fn new(logger: slog::Logger, store: S) -> Self {
        CdcKvClient { logger, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persists `info` under its changefeed ID and returns the stored JSON.
    pub async fn save_changefeed_info(&self, ctx: &OpContext, info: &ChangefeedInfo) -> Result<String, CdcKvError> {
        let payload = serde_json::to_string(info).map_err(|source| CdcKvError::Encode {
            what: "changefeed info",
            id: info.id.clone(),
            source,
        })?;

        let key = keys::changefeed_info_key(&info.id);
        self.store.put(ctx, &key, Bytes::from(payload.clone())).await?;
        slog::info!(self.logger, "Saved changefeed info"; "changefeed_id" => info.id.as_str(), "key" => key);

        Ok(payload)
    }

    pub async fn get_changefeed_info(&self, ctx: &OpContext, changefeed_id: &str) -> Result<ChangefeedInfo, CdcKvError> {
        let key = keys::changefeed_info_key(changefeed_id);
        self.get_json(ctx, &key, "changefeed info", changefeed_id).await
    }

    pub async fn get_changefeed_status(
        &self,
        ctx: &OpContext,
        changefeed_id: &str,
    ) -> Result<ChangefeedStatus, CdcKvError> {
        let key = keys::changefeed_status_key(changefeed_id);
        self.get_json(ctx, &key, "changefeed status", changefeed_id).await
    }

    /// IDs of every changefeed, sorted.
    pub async fn get_changefeed_ids(&self, ctx: &OpContext) -> Result<Vec<String>, CdcKvError> {
        let kvs = self.store.list_prefix(ctx, CHANGEFEED_INFO_PREFIX).await?;
        let mut ids = Vec::with_capacity(kvs.len());
        for kv in kvs {
            // An explicit empty ID is stored at the bare prefix and listed as "".
            match kv.key.strip_prefix(CHANGEFEED_INFO_PREFIX) {
                Some(id) => ids.push(id.to_string()),
                None => {
                    return Err(CdcKvError::MalformedKey {
                        what: "changefeed info",
                        key: kv.key,
                    })
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Every registered capture, in key order.
    pub async fn get_captures(&self, ctx: &OpContext) -> Result<Vec<CaptureInfo>, CdcKvError> {
        let kvs = self.store.list_prefix(ctx, CAPTURE_INFO_PREFIX).await?;
        kvs.iter().map(|kv| decode(kv, "capture info")).collect()
    }

    pub async fn get_task_status(
        &self,
        ctx: &OpContext,
        changefeed_id: &str,
        capture_id: &str,
    ) -> Result<TaskStatus, CdcKvError> {
        let key = keys::task_status_key(changefeed_id, capture_id);
        let id = format!("{}/{}", changefeed_id, capture_id);
        self.get_json(ctx, &key, "task status", &id).await
    }

    /// Task status of every (capture, changefeed) pair, in key order.
    pub async fn get_all_processors(&self, ctx: &OpContext) -> Result<Vec<ProcessorInfo>, CdcKvError> {
        let kvs = self.store.list_prefix(ctx, TASK_STATUS_PREFIX).await?;

        let mut processors = Vec::with_capacity(kvs.len());
        for kv in kvs.iter() {
            let (capture_id, changefeed_id) =
                keys::parse_task_status_key(&kv.key).ok_or_else(|| CdcKvError::MalformedKey {
                    what: "task status",
                    key: kv.key.clone(),
                })?;
            processors.push(ProcessorInfo {
                capture_id: capture_id.to_string(),
                changefeed_id: changefeed_id.to_string(),
                status: decode(kv, "task status")?,
            });
        }

        Ok(processors)
    }

    /// Value of the oldest key under the owner election prefix, if any capture is campaigning.
    pub async fn get_owner_candidate(&self, ctx: &OpContext) -> Result<Option<String>, CdcKvError> {
        let leader = self.store.first_created(ctx, CAPTURE_OWNER_PREFIX).await?;
        Ok(leader.map(|kv| String::from_utf8_lossy(&kv.value).into_owned()))
    }

    /// Raw GC safepoint text, or `None` if GC has never run.
    pub async fn get_gc_safepoint(&self, ctx: &OpContext) -> Result<Option<String>, CdcKvError> {
        let kv = self.store.get(ctx, GC_SAFEPOINT_KEY).await?;
        Ok(kv.map(|kv| String::from_utf8_lossy(&kv.value).into_owned()))
    }

    /// Deletes every CDC key in one atomic range delete. Returns how many keys were removed.
    pub async fn clear_all(&self, ctx: &OpContext) -> Result<u64, CdcKvError> {
        let deleted = self.store.delete_prefix(ctx, CDC_KEY_BASE).await?;
        slog::warn!(self.logger, "Cleared all CDC state"; "prefix" => CDC_KEY_BASE, "deleted" => deleted);
        Ok(deleted)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        ctx: &OpContext,
        key: &str,
        what: &'static str,
        id: &str,
    ) -> Result<T, CdcKvError> {
        match self.store.get(ctx, key).await? {
            Some(kv) => decode(&kv, what),
            None => Err(CdcKvError::NotFound {
                what,
                id: id.to_string(),
            }),
        }
    }
}

fn decode<T: DeserializeOwned>(kv: &KeyValue, what: &'static str) -> Result<T, CdcKvError> {
    serde_json::from_slice(&kv.value).map_err(|source| CdcKvError::Malformed {
        what,
        key: kv.key.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReplicaConfig;
    use crate::store::MemoryStore;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn client() -> (CdcKvClient<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        let logger = slog::Logger::root(slog::Discard, slog::o!());
        (CdcKvClient::new(logger, store.clone()), store)
    }

    fn ctx() -> OpContext {
        OpContext::background()
    }

    async fn put(store: &MemoryStore, key: &str, value: &str) {
        store.put(&ctx(), key, Bytes::from(value.to_string())).await.unwrap();
    }

    #[tokio::test]
    async fn changefeed_info_round_trips() {
        let (client, _) = client();
        let mut opts = BTreeMap::new();
        opts.insert("a".to_string(), "1".to_string());
        let info = ChangefeedInfo {
            id: "cf-1".into(),
            sink_uri: "mysql://h/".into(),
            opts,
            create_time: Utc::now(),
            start_ts: 10,
            target_ts: 20,
            config: ReplicaConfig::default(),
        };

        let payload = client.save_changefeed_info(&ctx(), &info).await.unwrap();
        assert!(payload.contains("\"sink-uri\":\"mysql://h/\""));
        assert_eq!(client.get_changefeed_info(&ctx(), "cf-1").await.unwrap(), info);
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let (client, _) = client();
        let err = client.get_changefeed_info(&ctx(), "nope").await.unwrap_err();
        assert!(matches!(err, CdcKvError::NotFound { id, .. } if id == "nope"));

        let err = client.get_task_status(&ctx(), "cf", "cap").await.unwrap_err();
        assert!(matches!(err, CdcKvError::NotFound { what: "task status", .. }));
    }

    #[tokio::test]
    async fn malformed_value_names_the_key() {
        let (client, store) = client();
        put(&store, &keys::changefeed_status_key("cf"), "{not json").await;

        let err = client.get_changefeed_status(&ctx(), "cf").await.unwrap_err();
        assert!(err.to_string().contains("/tidb/cdc/job/cf"), "{}", err);
    }

    #[tokio::test]
    async fn lists_changefeed_ids_sorted() {
        let (client, store) = client();
        put(&store, &keys::changefeed_info_key("b"), "{}").await;
        put(&store, &keys::changefeed_info_key("a"), "{}").await;
        put(&store, &keys::changefeed_status_key("c"), "{}").await;

        assert_eq!(client.get_changefeed_ids(&ctx()).await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn empty_changefeed_id_is_listed() {
        let (client, store) = client();
        put(&store, &keys::changefeed_info_key(""), "{}").await;
        put(&store, &keys::changefeed_info_key("a"), "{}").await;

        assert_eq!(client.get_changefeed_ids(&ctx()).await.unwrap(), vec!["", "a"]);
    }

    #[tokio::test]
    async fn lists_processors_with_their_pair() {
        let (client, store) = client();
        put(&store, &keys::task_status_key("cf-1", "cap-1"), r#"{"tables":{"1":{"start-ts":5}}}"#).await;
        put(&store, &keys::task_status_key("cf-2", "cap-1"), "{}").await;

        let processors = client.get_all_processors(&ctx()).await.unwrap();
        assert_eq!(processors.len(), 2);
        assert_eq!(processors[0].capture_id, "cap-1");
        assert_eq!(processors[0].changefeed_id, "cf-1");
        assert_eq!(processors[0].status.tables[&1].start_ts, 5);
        assert_eq!(processors[1].changefeed_id, "cf-2");
    }

    #[tokio::test]
    async fn owner_candidate_is_oldest_election_key() {
        let (client, store) = client();
        assert_eq!(client.get_owner_candidate(&ctx()).await.unwrap(), None);

        put(&store, &format!("{}b", CAPTURE_OWNER_PREFIX), "cap-b").await;
        put(&store, &format!("{}a", CAPTURE_OWNER_PREFIX), "cap-a").await;
        assert_eq!(client.get_owner_candidate(&ctx()).await.unwrap(), Some("cap-b".to_string()));
    }

    #[tokio::test]
    async fn clear_all_spares_the_gc_safepoint() {
        let (client, store) = client();
        put(&store, &keys::changefeed_info_key("cf"), "{}").await;
        put(&store, &keys::capture_info_key("cap"), "{}").await;
        put(&store, GC_SAFEPOINT_KEY, "100").await;

        assert_eq!(client.clear_all(&ctx()).await.unwrap(), 2);
        assert_eq!(store.keys(), vec![GC_SAFEPOINT_KEY.to_string()]);
    }
}

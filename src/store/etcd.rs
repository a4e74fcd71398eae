use crate::config::{StoreOptions, StoreOptionsValidated};
use crate::grpc::etcdserverpb::kv_client::KvClient;
use crate::grpc::etcdserverpb::{range_request, DeleteRangeRequest, PutRequest, RangeRequest};
use crate::grpc::etcdserverpb::KeyValue as ProtoKeyValue;
use crate::store::dial::{dial, parse_endpoint};
use crate::store::store::prefix_range_end;
use crate::store::{ContextError, CoordinationStore, KeyValue, OpContext, StoreError};
use bytes::Bytes;
use std::convert::TryFrom;
use tonic::codegen::http::uri;
use tonic::transport::Channel;
use tonic::{Request, Status};

/// EtcdStore is the `CoordinationStore` backed by an etcd v3 cluster (PD embeds one).
#[derive(Clone)]
pub struct EtcdStore {
    logger: slog::Logger,
    client: KvClient<Channel>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreConnectError {
    #[error("No coordination store endpoints were given")]
    NoEndpoints,
    #[error("Invalid coordination store endpoint '{endpoint}': {source}")]
    InvalidEndpoint { endpoint: String, source: uri::InvalidUri },
    #[error("Illegal options for connecting to the coordination store: {0}")]
    IllegalOptions(String),
    #[error("Could not connect to any coordination store endpoint: {}", .failures.join("; "))]
    Unreachable { failures: Vec<String> },
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl EtcdStore {
    /// `connect()` dials the first reachable endpoint, cycling through `endpoints` with
    /// exponential backoff and jitter between rounds until the dial timeout elapses.
    pub async fn connect(
        ctx: &OpContext,
        logger: slog::Logger,
        endpoints: &[String],
        options: StoreOptions,
    ) -> Result<Self, StoreConnectError> {
        let options = StoreOptionsValidated::try_from(options)
            .map_err(|e| StoreConnectError::IllegalOptions(e.to_string()))?;
        if endpoints.is_empty() {
            return Err(StoreConnectError::NoEndpoints);
        }

        let mut parsed = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            let endpoint = parse_endpoint(endpoint).map_err(|source| StoreConnectError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                source,
            })?;
            parsed.push(endpoint);
        }

        let channel = ctx
            .run("connect", async {
                dial(&logger, &parsed, &options)
                    .await
                    .map_err(|failures| StoreConnectError::Unreachable { failures })
            })
            .await?;
        Ok(EtcdStore {
            logger,
            client: KvClient::new(channel),
        })
    }

    async fn range(&self, op: &'static str, key: &str, request: RangeRequest) -> Result<Vec<KeyValue>, StoreError> {
        let mut client = self.client.clone();
        let response = client
            .range(Request::new(request))
            .await
            .map_err(|status| map_status(op, key, status))?
            .into_inner();

        response
            .kvs
            .into_iter()
            .map(|kv| convert_key_value(op, kv))
            .collect()
    }
}

#[async_trait::async_trait]
impl CoordinationStore for EtcdStore {
    async fn get(&self, ctx: &OpContext, key: &str) -> Result<Option<KeyValue>, StoreError> {
        let request = RangeRequest {
            key: key.as_bytes().to_vec(),
            ..RangeRequest::default()
        };

        let kvs = ctx.run("get", self.range("get", key, request)).await?;
        Ok(kvs.into_iter().next())
    }

    async fn put(&self, ctx: &OpContext, key: &str, value: Bytes) -> Result<(), StoreError> {
        let request = PutRequest {
            key: key.as_bytes().to_vec(),
            value: value.to_vec(),
            ..PutRequest::default()
        };

        let mut client = self.client.clone();
        ctx.run("put", async move {
            client
                .put(Request::new(request))
                .await
                .map(|_| ())
                .map_err(|status| map_status("put", key, status))
        })
        .await
    }

    async fn list_prefix(&self, ctx: &OpContext, prefix: &str) -> Result<Vec<KeyValue>, StoreError> {
        let request = RangeRequest {
            key: prefix.as_bytes().to_vec(),
            range_end: prefix_range_end(prefix.as_bytes()),
            sort_order: range_request::SortOrder::Ascend as i32,
            sort_target: range_request::SortTarget::Key as i32,
            ..RangeRequest::default()
        };

        ctx.run("list", self.range("list", prefix, request)).await
    }

    async fn first_created(&self, ctx: &OpContext, prefix: &str) -> Result<Option<KeyValue>, StoreError> {
        let request = RangeRequest {
            key: prefix.as_bytes().to_vec(),
            range_end: prefix_range_end(prefix.as_bytes()),
            limit: 1,
            sort_order: range_request::SortOrder::Ascend as i32,
            sort_target: range_request::SortTarget::Create as i32,
            ..RangeRequest::default()
        };

        let kvs = ctx.run("first_created", self.range("first_created", prefix, request)).await?;
        Ok(kvs.into_iter().next())
    }

    async fn delete_prefix(&self, ctx: &OpContext, prefix: &str) -> Result<u64, StoreError> {
        let request = DeleteRangeRequest {
            key: prefix.as_bytes().to_vec(),
            range_end: prefix_range_end(prefix.as_bytes()),
            ..DeleteRangeRequest::default()
        };

        let mut client = self.client.clone();
        let deleted = ctx
            .run("delete_prefix", async move {
                client
                    .delete_range(Request::new(request))
                    .await
                    .map(|response| response.into_inner().deleted)
                    .map_err(|status| map_status("delete_prefix", prefix, status))
            })
            .await?;

        slog::debug!(self.logger, "Deleted prefix"; "prefix" => prefix, "deleted" => deleted);
        Ok(deleted.max(0) as u64)
    }
}

fn map_status(op: &'static str, key: &str, status: Status) -> StoreError {
    // etcd reports its own election in progress as "etcdserver: no leader".
    if status.message().contains("no leader") {
        StoreError::NoLeader {
            op,
            key: key.to_string(),
        }
    } else {
        StoreError::Rpc {
            op,
            key: key.to_string(),
            status,
        }
    }
}

// ------- Conversions --------

fn convert_key_value(op: &'static str, kv: ProtoKeyValue) -> Result<KeyValue, StoreError> {
    let key = String::from_utf8(kv.key).map_err(|e| StoreError::NonUtf8Key {
        op,
        key: String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })?;

    Ok(KeyValue {
        key,
        value: Bytes::from(kv.value),
        create_revision: kv.create_revision,
        mod_revision: kv.mod_revision,
    })
}

use crate::kv::{CdcKvClient, CdcKvError};
use crate::store::{CoordinationStore, OpContext};
use std::num::ParseIntError;

#[derive(Debug, thiserror::Error)]
pub enum SafepointError {
    #[error("start-ts {start_ts} is earlier than GC safepoint {safepoint}")]
    StaleStartTs { start_ts: u64, safepoint: u64 },
    #[error("GC safepoint '{raw}' is not an unsigned integer: {source}")]
    MalformedSafepoint { raw: String, source: ParseIntError },
    #[error("failed to read GC safepoint: {0}")]
    Kv(#[from] CdcKvError),
}

/// `validate_start_ts()` rejects a start timestamp that GC may already have collected past. A
/// cluster where GC never ran has no safepoint, and any start timestamp is fine.
pub async fn validate_start_ts<S: CoordinationStore>(
    ctx: &OpContext,
    client: &CdcKvClient<S>,
    start_ts: u64,
) -> Result<(), SafepointError> {
    let raw = match client.get_gc_safepoint(ctx).await? {
        Some(raw) => raw,
        None => return Ok(()),
    };

    let safepoint = raw
        .parse::<u64>()
        .map_err(|source| SafepointError::MalformedSafepoint { raw: raw.clone(), source })?;

    if start_ts < safepoint {
        return Err(SafepointError::StaleStartTs { start_ts, safepoint });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::GC_SAFEPOINT_KEY;
    use crate::store::MemoryStore;
    use bytes::Bytes;

    async fn client_with_safepoint(safepoint: Option<&str>) -> CdcKvClient<MemoryStore> {
        let store = MemoryStore::new();
        if let Some(value) = safepoint {
            store
                .put(&OpContext::background(), GC_SAFEPOINT_KEY, Bytes::from(value.to_string()))
                .await
                .unwrap();
        }
        CdcKvClient::new(slog::Logger::root(slog::Discard, slog::o!()), store)
    }

    #[tokio::test]
    async fn absent_safepoint_passes() {
        let client = client_with_safepoint(None).await;
        validate_start_ts(&OpContext::background(), &client, 0).await.unwrap();
    }

    #[tokio::test]
    async fn start_ts_at_or_after_safepoint_passes() {
        let client = client_with_safepoint(Some("100")).await;
        let ctx = OpContext::background();
        validate_start_ts(&ctx, &client, 100).await.unwrap();
        validate_start_ts(&ctx, &client, 101).await.unwrap();
    }

    #[tokio::test]
    async fn stale_start_ts_reports_both_values() {
        let client = client_with_safepoint(Some("100")).await;
        let err = validate_start_ts(&OpContext::background(), &client, 99).await.unwrap_err();
        assert!(matches!(
            err,
            SafepointError::StaleStartTs {
                start_ts: 99,
                safepoint: 100
            }
        ));
    }

    #[tokio::test]
    async fn unparsable_safepoint_is_not_a_validation_failure() {
        for raw in &["abc", "-1", " 100", ""] {
            let client = client_with_safepoint(Some(raw)).await;
            let err = validate_start_ts(&OpContext::background(), &client, 1_000).await.unwrap_err();
            assert!(matches!(err, SafepointError::MalformedSafepoint { .. }), "{}", raw);
        }
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let client = client_with_safepoint(None).await;
        client.store().set_leaderless(true);
        let err = validate_start_ts(&OpContext::background(), &client, 1).await.unwrap_err();
        assert!(matches!(err, SafepointError::Kv(e) if e.is_no_leader()));
    }
}

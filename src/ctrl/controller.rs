use crate::ctrl::CtrlCommand;
use crate::kv::{CdcKvClient, CdcKvError, ProcessorInfo};
use crate::model::{ChangefeedInfo, ChangefeedStatus, TaskStatus};
use crate::oracle::{LogicalTime, OracleError, TimestampOracle};
use crate::owner::{self, CurrentOwner};
use crate::store::{CoordinationStore, OpContext};
use serde::Serialize;

/// Controller runs query and admin commands against the CDC state in the coordination store.
pub struct Controller<S: CoordinationStore, O: TimestampOracle> {
    logger: slog::Logger,
    client: CdcKvClient<S>,
    oracle: O,
}

#[derive(Clone, Debug, Default)]
pub struct CtrlInput {
    pub command: CtrlCommand,
    // Used by job-info, job-status and sub-cf.
    pub changefeed_id: String,
    // Used by sub-cf.
    pub capture_id: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CtrlOutput {
    ChangefeedInfo(ChangefeedInfo),
    ChangefeedStatus(ChangefeedStatus),
    ChangefeedIds(Vec<String>),
    Captures(Vec<CaptureEntry>),
    Processors(Vec<ProcessorInfo>),
    // `None` while the store has no leader.
    TaskStatus(Option<TaskStatus>),
    Cleared { deleted: u64 },
    LogicalTime(LogicalTime),
}

/// CaptureEntry is a registered capture as shown to operators.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CaptureEntry {
    pub id: String,
    pub is_owner: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CtrlError {
    #[error("{command} failed: {source}")]
    Kv { command: CtrlCommand, source: CdcKvError },
    #[error("{command} failed: {source}")]
    Oracle { command: CtrlCommand, source: OracleError },
}

impl<S: CoordinationStore, O: TimestampOracle> Controller<S, O> {
    pub fn new(logger: slog::Logger, client: CdcKvClient<S>, oracle: O) -> Self {
        Controller { logger, client, oracle }
    }

    pub async fn execute(&self, ctx: &OpContext, input: CtrlInput) -> Result<CtrlOutput, CtrlError> {
        let command = input.command;
        slog::debug!(self.logger, "Executing command"; "op" => command.token(), "changefeed_id" => &input.changefeed_id, "capture_id" => &input.capture_id);

        let kv_error = |source| CtrlError::Kv { command, source };
        match command {
            CtrlCommand::JobInfo => self
                .client
                .get_changefeed_info(ctx, &input.changefeed_id)
                .await
                .map(CtrlOutput::ChangefeedInfo)
                .map_err(kv_error),
            CtrlCommand::JobStatus => self
                .client
                .get_changefeed_status(ctx, &input.changefeed_id)
                .await
                .map(CtrlOutput::ChangefeedStatus)
                .map_err(kv_error),
            CtrlCommand::JobList => self
                .client
                .get_changefeed_ids(ctx)
                .await
                .map(CtrlOutput::ChangefeedIds)
                .map_err(kv_error),
            CtrlCommand::CaptureList => self.list_captures(ctx).await.map_err(kv_error),
            CtrlCommand::ProcessorList => self
                .client
                .get_all_processors(ctx)
                .await
                .map(CtrlOutput::Processors)
                .map_err(kv_error),
            CtrlCommand::SubCf => self.sub_changefeed(ctx, &input).await.map_err(kv_error),
            CtrlCommand::ClearAll => self
                .client
                .clear_all(ctx)
                .await
                .map(|deleted| CtrlOutput::Cleared { deleted })
                .map_err(kv_error),
            CtrlCommand::GetLogicalTime => self
                .oracle
                .current_time(ctx)
                .await
                .map(CtrlOutput::LogicalTime)
                .map_err(|source| CtrlError::Oracle { command, source }),
        }
    }

    async fn list_captures(&self, ctx: &OpContext) -> Result<CtrlOutput, CdcKvError> {
        let captures = self.client.get_captures(ctx).await?;
        let owner = owner::resolve_owner(ctx, &self.client).await?;
        if owner == CurrentOwner::NoOwner {
            slog::info!(self.logger, "No capture currently owns the cluster");
        }

        let entries = captures
            .into_iter()
            .map(|capture| CaptureEntry {
                is_owner: owner.is(&capture.id),
                id: capture.id,
            })
            .collect();

        Ok(CtrlOutput::Captures(entries))
    }

    async fn sub_changefeed(&self, ctx: &OpContext, input: &CtrlInput) -> Result<CtrlOutput, CdcKvError> {
        match self
            .client
            .get_task_status(ctx, &input.changefeed_id, &input.capture_id)
            .await
        {
            Ok(status) => Ok(CtrlOutput::TaskStatus(Some(status))),
            Err(e) if e.is_no_leader() => {
                slog::warn!(self.logger, "Task status unavailable, store has no leader"; "changefeed_id" => &input.changefeed_id, "capture_id" => &input.capture_id);
                Ok(CtrlOutput::TaskStatus(None))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{capture_info_key, task_status_key, CAPTURE_OWNER_PREFIX};
    use crate::oracle::StaticTimestampOracle;
    use crate::store::MemoryStore;
    use bytes::Bytes;

    fn controller(store: &MemoryStore) -> Controller<MemoryStore, StaticTimestampOracle> {
        let logger = slog::Logger::root(slog::Discard, slog::o!());
        Controller::new(
            logger.clone(),
            CdcKvClient::new(logger, store.clone()),
            StaticTimestampOracle::new(LogicalTime::new(1, 2)),
        )
    }

    async fn put(store: &MemoryStore, key: &str, value: &str) {
        store
            .put(&OpContext::background(), key, Bytes::from(value.to_string()))
            .await
            .unwrap();
    }

    fn input(command: CtrlCommand) -> CtrlInput {
        CtrlInput {
            command,
            changefeed_id: "cf-1".into(),
            capture_id: "cap-1".into(),
        }
    }

    #[tokio::test]
    async fn capture_list_marks_the_owner() {
        let store = MemoryStore::new();
        put(&store, &capture_info_key("cap-1"), r#"{"id":"cap-1","address":"a:1"}"#).await;
        put(&store, &capture_info_key("cap-2"), r#"{"id":"cap-2","address":"a:2"}"#).await;
        put(&store, &format!("{}lease-9", CAPTURE_OWNER_PREFIX), "cap-2").await;

        let output = controller(&store).execute(&OpContext::background(), input(CtrlCommand::CaptureList)).await.unwrap();
        assert_eq!(
            output,
            CtrlOutput::Captures(vec![
                CaptureEntry {
                    id: "cap-1".into(),
                    is_owner: false
                },
                CaptureEntry {
                    id: "cap-2".into(),
                    is_owner: true
                },
            ])
        );
    }

    #[tokio::test]
    async fn capture_list_without_owner() {
        let store = MemoryStore::new();
        put(&store, &capture_info_key("cap-1"), r#"{"id":"cap-1"}"#).await;

        let output = controller(&store).execute(&OpContext::background(), input(CtrlCommand::CaptureList)).await.unwrap();
        match output {
            CtrlOutput::Captures(entries) => assert!(entries.iter().all(|e| !e.is_owner)),
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[tokio::test]
    async fn sub_cf_without_leader_is_unavailable() {
        let store = MemoryStore::new();
        put(&store, &task_status_key("cf-1", "cap-1"), "{}").await;
        store.set_leaderless(true);

        let output = controller(&store).execute(&OpContext::background(), input(CtrlCommand::SubCf)).await.unwrap();
        assert_eq!(output, CtrlOutput::TaskStatus(None));
    }

    #[tokio::test]
    async fn sub_cf_missing_status_is_an_error() {
        let store = MemoryStore::new();
        let err = controller(&store)
            .execute(&OpContext::background(), input(CtrlCommand::SubCf))
            .await
            .unwrap_err();
        assert!(matches!(err, CtrlError::Kv { command: CtrlCommand::SubCf, source: CdcKvError::NotFound { .. } }));
        assert!(err.to_string().starts_with("sub-cf failed"), "{}", err);
    }

    #[tokio::test]
    async fn other_commands_do_not_tolerate_no_leader() {
        let store = MemoryStore::new();
        store.set_leaderless(true);
        let err = controller(&store)
            .execute(&OpContext::background(), input(CtrlCommand::JobList))
            .await
            .unwrap_err();
        assert!(matches!(err, CtrlError::Kv { source, .. } if source.is_no_leader()));
    }

    #[tokio::test]
    async fn logical_time_does_not_touch_the_store() {
        let store = MemoryStore::new();
        store.set_leaderless(true);
        let output = controller(&store)
            .execute(&OpContext::background(), input(CtrlCommand::GetLogicalTime))
            .await
            .unwrap();
        assert_eq!(output, CtrlOutput::LogicalTime(LogicalTime::new(1, 2)));
    }
}

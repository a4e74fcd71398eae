use crate::oracle::LogicalTime;
use crate::store::{ContextError, OpContext};

/// TimestampOracle hands out cluster-wide monotonically increasing logical time.
#[async_trait::async_trait]
pub trait TimestampOracle: Send + Sync {
    async fn current_time(&self, ctx: &OpContext) -> Result<LogicalTime, OracleError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("Illegal options for connecting to the timestamp oracle: {0}")]
    IllegalOptions(String),
    #[error("Invalid timestamp oracle endpoint '{0}'")]
    InvalidEndpoint(String),
    #[error("Could not connect to timestamp oracle: {}", .failures.join("; "))]
    Unreachable { failures: Vec<String> },
    #[error("Timestamp oracle {op} failed: {status}")]
    Rpc { op: &'static str, status: tonic::Status },
    #[error("Timestamp oracle returned an error: {0}")]
    Pd(String),
    #[error("Timestamp oracle closed the stream without a timestamp")]
    EmptyResponse,
    #[error(transparent)]
    Context(#[from] ContextError),
}

/// StaticTimestampOracle always answers with the same time. For tests and dry runs.
#[derive(Clone, Copy, Debug)]
pub struct StaticTimestampOracle {
    time: LogicalTime,
}

impl StaticTimestampOracle {
    pub fn new(time: LogicalTime) -> Self {
        StaticTimestampOracle { time }
    }
}

#[async_trait::async_trait]
impl TimestampOracle for StaticTimestampOracle {
    async fn current_time(&self, ctx: &OpContext) -> Result<LogicalTime, OracleError> {
        let time = self.time;
        ctx.run("current_time", async move { Ok(time) }).await
    }
}

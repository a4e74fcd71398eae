use crate::changefeed::options::parse_opts;
use crate::changefeed::safepoint::{validate_start_ts, SafepointError};
use crate::config::{strict_decode_file, ConfigError};
use crate::kv::{CdcKvClient, CdcKvError};
use crate::model::{ChangefeedInfo, ReplicaConfig};
use crate::oracle::{OracleError, TimestampOracle};
use crate::store::{CoordinationStore, OpContext};
use chrono::Utc;
use std::num::ParseIntError;
use std::path::PathBuf;

/// Component name reported when the replica config file is rejected.
const CONFIG_COMPONENT: &str = "cdc";

/// `create_changefeed()` assembles a new changefeed and persists it with a single write. Nothing
/// is written unless every earlier step succeeded.
pub async fn create_changefeed<S, O>(
    ctx: &OpContext,
    logger: &slog::Logger,
    client: &CdcKvClient<S>,
    oracle: &O,
    input: CreateChangefeedInput,
) -> Result<CreateChangefeedOutput, CreateChangefeedError>
where
    S: CoordinationStore,
    O: TimestampOracle + ?Sized,
{
    let changefeed_id = match input.changefeed_id {
        Some(id) => id,
        None => uuid::Uuid::new_v4().to_string(),
    };

    let start_ts = if input.start_ts == 0 {
        let now = oracle.current_time(ctx).await?;
        slog::info!(logger, "Using current time as start-ts"; "changefeed_id" => &changefeed_id, "start_ts" => %now);
        now.compose()
    } else {
        input.start_ts
    };

    validate_start_ts(ctx, client, start_ts).await?;

    let config = match &input.config_path {
        Some(path) => strict_decode_file::<ReplicaConfig>(path, CONFIG_COMPONENT)?,
        None => ReplicaConfig::default(),
    };

    let options = parse_opts(&input.opts);
    for warning in options.warnings.iter() {
        slog::warn!(logger, "{}", warning; "changefeed_id" => &changefeed_id);
    }

    let info = ChangefeedInfo {
        id: changefeed_id.clone(),
        sink_uri: input.sink_uri,
        opts: options.parsed,
        create_time: Utc::now(),
        start_ts,
        target_ts: input.target_ts,
        config,
    };
    let detail = client.save_changefeed_info(ctx, &info).await?;

    Ok(CreateChangefeedOutput {
        changefeed_id,
        detail,
        option_warnings: options.warnings,
    })
}

#[derive(Clone, Debug, Default)]
pub struct CreateChangefeedInput {
    // Generated when absent.
    pub changefeed_id: Option<String>,
    // 0 means "now", as reported by the timestamp oracle.
    pub start_ts: u64,
    // 0 means unbounded.
    pub target_ts: u64,
    pub sink_uri: String,
    pub config_path: Option<PathBuf>,
    pub opts: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct CreateChangefeedOutput {
    pub changefeed_id: String,
    /// The stored JSON record.
    pub detail: String,
    pub option_warnings: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateChangefeedError {
    #[error("failed to get current time: {0}")]
    Oracle(#[from] OracleError),

    #[error("start-ts {start_ts} is earlier than GC safepoint {safepoint}")]
    StaleStartTs { start_ts: u64, safepoint: u64 },

    #[error("GC safepoint '{raw}' is not an unsigned integer: {source}")]
    MalformedSafepoint { raw: String, source: ParseIntError },

    #[error(
        "component {component}'s config file {path} contained unknown configuration options: {}",
        .fields.join(", ")
    )]
    UnknownConfigField {
        component: String,
        path: PathBuf,
        fields: Vec<String>,
    },

    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Kv(#[from] CdcKvError),
}

// ------- Conversions --------

impl From<SafepointError> for CreateChangefeedError {
    fn from(e: SafepointError) -> Self {
        match e {
            SafepointError::StaleStartTs { start_ts, safepoint } => {
                CreateChangefeedError::StaleStartTs { start_ts, safepoint }
            }
            SafepointError::MalformedSafepoint { raw, source } => {
                CreateChangefeedError::MalformedSafepoint { raw, source }
            }
            SafepointError::Kv(e) => CreateChangefeedError::Kv(e),
        }
    }
}

impl From<ConfigError> for CreateChangefeedError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::UnknownConfigField {
                component,
                path,
                fields,
            } => CreateChangefeedError::UnknownConfigField {
                component,
                path,
                fields,
            },
            other => CreateChangefeedError::Config(other),
        }
    }
}

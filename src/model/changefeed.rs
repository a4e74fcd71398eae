use crate::model::ReplicaConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// ChangefeedInfo describes a replication job. It is written once, when the job is created.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChangefeedInfo {
    pub id: String,
    pub sink_uri: String,
    #[serde(default)]
    pub opts: BTreeMap<String, String>,
    pub create_time: DateTime<Utc>,
    pub start_ts: u64,
    // 0 means the changefeed never stops on its own.
    #[serde(default)]
    pub target_ts: u64,
    #[serde(default)]
    pub config: ReplicaConfig,
}

/// ChangefeedStatus is the replication progress of a job, maintained by the owner capture.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ChangefeedStatus {
    pub resolved_ts: u64,
    pub checkpoint_ts: u64,
    pub admin_job_type: AdminJobType,
}

/// AdminJobType is the last administrative action applied to a job. Stored as an integer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(from = "i32", into = "i32")]
pub enum AdminJobType {
    None,
    Stop,
    Resume,
    Remove,
    // Written by a newer data plane than this client knows about.
    Unknown(i32),
}

impl Default for AdminJobType {
    fn default() -> Self {
        AdminJobType::None
    }
}

// ------- Conversions --------

impl From<i32> for AdminJobType {
    fn from(value: i32) -> Self {
        match value {
            0 => AdminJobType::None,
            1 => AdminJobType::Stop,
            2 => AdminJobType::Resume,
            3 => AdminJobType::Remove,
            other => AdminJobType::Unknown(other),
        }
    }
}

impl From<AdminJobType> for i32 {
    fn from(job_type: AdminJobType) -> Self {
        match job_type {
            AdminJobType::None => 0,
            AdminJobType::Stop => 1,
            AdminJobType::Resume => 2,
            AdminJobType::Remove => 3,
            AdminJobType::Unknown(other) => other,
        }
    }
}

use crate::model::AdminJobType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// TaskStatus is one capture's share of one changefeed: the tables it replicates and any table
/// moves in flight. Written by the capture that runs the task.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TaskStatus {
    pub tables: BTreeMap<i64, TableReplicaInfo>,
    pub operation: BTreeMap<i64, TableOperation>,
    pub admin_job_type: AdminJobType,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TableReplicaInfo {
    pub start_ts: u64,
}

/// TableOperation is a pending add or removal of a table on this capture.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TableOperation {
    pub delete: bool,
    pub boundary_ts: u64,
    pub done: bool,
}

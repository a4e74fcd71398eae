use serde::{Deserialize, Serialize};

/// ReplicaConfig is the replication configuration attached to a changefeed. This crate only
/// decodes, stores and prints it; the data plane interprets it.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReplicaConfig {
    pub filter_case_sensitive: bool,
    pub filter_rules: Option<FilterRules>,
    pub ignore_txn_commit_ts: Vec<u64>,
    pub sink_dispatch_rules: Vec<DispatchRule>,
}

/// Which schemas and tables the changefeed replicates.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FilterRules {
    pub do_tables: Vec<TableName>,
    pub do_dbs: Vec<String>,
    pub ignore_tables: Vec<TableName>,
    pub ignore_dbs: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct TableName {
    #[serde(rename = "db-name")]
    pub schema: String,
    #[serde(rename = "tbl-name")]
    pub table: String,
}

/// DispatchRule selects how rows of the matching tables are spread over sink partitions.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DispatchRule {
    #[serde(rename = "db-name")]
    pub schema_pattern: String,
    #[serde(rename = "tbl-name")]
    pub table_pattern: String,
    pub rule: String,
}

//! Records the control plane reads from and writes to the coordination store.
mod capture;
mod changefeed;
mod replica_config;
mod task;

pub use capture::CaptureInfo;
pub use changefeed::AdminJobType;
pub use changefeed::ChangefeedInfo;
pub use changefeed::ChangefeedStatus;
pub use replica_config::DispatchRule;
pub use replica_config::FilterRules;
pub use replica_config::ReplicaConfig;
pub use replica_config::TableName;
pub use task::TableOperation;
pub use task::TableReplicaInfo;
pub use task::TaskStatus;

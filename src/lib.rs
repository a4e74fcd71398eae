mod changefeed;
mod config;
mod ctrl;
mod kv;
mod model;
mod oracle;
mod owner;
mod store;
mod grpc {
    pub(crate) mod etcdserverpb {
        include!("../generated/etcdserverpb.rs");
    }
    pub(crate) mod pdpb {
        include!("../generated/pdpb.rs");
    }
}

pub use changefeed::create_changefeed;
pub use changefeed::parse_opts;
pub use changefeed::validate_start_ts;
pub use changefeed::CreateChangefeedError;
pub use changefeed::CreateChangefeedInput;
pub use changefeed::CreateChangefeedOutput;
pub use changefeed::ParsedOptions;
pub use changefeed::SafepointError;
pub use config::strict_decode_file;
pub use config::ConfigError;
pub use config::StoreOptions;
pub use ctrl::render;
pub use ctrl::CaptureEntry;
pub use ctrl::Controller;
pub use ctrl::CtrlCommand;
pub use ctrl::CtrlError;
pub use ctrl::CtrlInput;
pub use ctrl::CtrlOutput;
pub use ctrl::UnknownCommand;
pub use kv::capture_info_key;
pub use kv::changefeed_info_key;
pub use kv::changefeed_status_key;
pub use kv::task_status_key;
pub use kv::CdcKvClient;
pub use kv::CdcKvError;
pub use kv::ProcessorInfo;
pub use kv::CAPTURE_OWNER_PREFIX;
pub use kv::CDC_KEY_BASE;
pub use kv::GC_SAFEPOINT_KEY;
pub use model::AdminJobType;
pub use model::CaptureInfo;
pub use model::ChangefeedInfo;
pub use model::ChangefeedStatus;
pub use model::DispatchRule;
pub use model::FilterRules;
pub use model::ReplicaConfig;
pub use model::TableName;
pub use model::TableOperation;
pub use model::TableReplicaInfo;
pub use model::TaskStatus;
pub use oracle::LogicalTime;
pub use oracle::OracleError;
pub use oracle::PdTimestampOracle;
pub use oracle::StaticTimestampOracle;
pub use oracle::TimestampOracle;
pub use owner::resolve_owner;
pub use owner::CurrentOwner;
pub use store::ContextError;
pub use store::CoordinationStore;
pub use store::EtcdStore;
pub use store::KeyValue;
pub use store::MemoryStore;
pub use store::OpContext;
pub use store::StoreConnectError;
pub use store::StoreError;


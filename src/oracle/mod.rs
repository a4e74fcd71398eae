//! Cluster-wide logical time, as allocated by the timestamp oracle (PD's TSO).
mod logical_time;
mod oracle;
mod pd;

pub use logical_time::LogicalTime;
pub use oracle::OracleError;
pub use oracle::StaticTimestampOracle;
pub use oracle::TimestampOracle;
pub use pd::PdTimestampOracle;

//! Creating changefeeds: start-ts admission against the GC safepoint, option parsing, persistence.
mod creator;
mod options;
mod safepoint;

pub use creator::create_changefeed;
pub use creator::CreateChangefeedError;
pub use creator::CreateChangefeedInput;
pub use creator::CreateChangefeedOutput;
pub use options::parse_opts;
pub use options::ParsedOptions;
pub use safepoint::validate_start_ts;
pub use safepoint::SafepointError;

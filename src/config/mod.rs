//! Operator-supplied configuration: strict decoding of config files, and the tuning knobs for
//! connecting to the coordination store.
mod options;
mod strict;

pub use options::StoreOptions;
pub(crate) use options::StoreOptionsValidated;
pub use strict::strict_decode_file;
pub use strict::ConfigError;

//! Typed access to CDC's records in the coordination store.
mod client;
mod keys;

pub use client::CdcKvClient;
pub use client::CdcKvError;
pub use client::ProcessorInfo;
pub use keys::capture_info_key;
pub use keys::changefeed_info_key;
pub use keys::changefeed_status_key;
pub use keys::task_status_key;
pub use keys::CAPTURE_OWNER_PREFIX;
pub use keys::CDC_KEY_BASE;
pub use keys::GC_SAFEPOINT_KEY;

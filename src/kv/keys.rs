//! Where each CDC record lives in the coordination store.

/// Everything under this prefix belongs to CDC and is removed by `clear-all`.
pub const CDC_KEY_BASE: &str = "/tidb/cdc";

pub(crate) const CHANGEFEED_INFO_PREFIX: &str = "/tidb/cdc/changefeed/info/";
pub(crate) const CHANGEFEED_STATUS_PREFIX: &str = "/tidb/cdc/job/";
pub(crate) const CAPTURE_INFO_PREFIX: &str = "/tidb/cdc/capture/info/";
pub(crate) const TASK_STATUS_PREFIX: &str = "/tidb/cdc/task/status/";

/// Election prefix for the owner role. Each campaigning capture holds one key below it whose
/// value is its capture ID; the key with the lowest create revision is the owner.
pub const CAPTURE_OWNER_PREFIX: &str = "/tidb/cdc/capture/owner/";

/// Written by the storage GC worker, outside the CDC prefix: decimal text of the GC safepoint.
pub const GC_SAFEPOINT_KEY: &str = "/tidb/store/gcworker/saved_safe_point";

pub fn changefeed_info_key(changefeed_id: &str) -> String {
    format!("{}{}", CHANGEFEED_INFO_PREFIX, changefeed_id)
}

pub fn changefeed_status_key(changefeed_id: &str) -> String {
    format!("{}{}", CHANGEFEED_STATUS_PREFIX, changefeed_id)
}

pub fn capture_info_key(capture_id: &str) -> String {
    format!("{}{}", CAPTURE_INFO_PREFIX, capture_id)
}

pub fn task_status_key(changefeed_id: &str, capture_id: &str) -> String {
    format!("{}{}/{}", TASK_STATUS_PREFIX, capture_id, changefeed_id)
}

/// Splits a task status key into `(capture_id, changefeed_id)`. Capture IDs never contain '/',
/// changefeed IDs may.
pub(crate) fn parse_task_status_key(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix(TASK_STATUS_PREFIX)?;
    let mut parts = rest.splitn(2, '/');
    let capture_id = parts.next().filter(|id| !id.is_empty())?;
    let changefeed_id = parts.next().filter(|id| !id.is_empty())?;
    Some((capture_id, changefeed_id))
}

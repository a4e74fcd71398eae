use serde::{Deserialize, Serialize};

/// CaptureInfo is the registration a capture process writes while it is alive.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CaptureInfo {
    pub id: String,
    #[serde(rename = "address")]
    pub advertise_addr: String,
}

//! Which capture holds the owner role.
use crate::kv::{CdcKvClient, CdcKvError};
use crate::store::{CoordinationStore, OpContext};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CurrentOwner {
    Capture(String),
    // Nobody is campaigning, or an election is in progress.
    NoOwner,
}

impl CurrentOwner {
    pub fn is(&self, capture_id: &str) -> bool {
        matches!(self, CurrentOwner::Capture(owner) if owner == capture_id)
    }
}

/// `resolve_owner()` reads the owner election. A leaderless window is a normal cluster state, so
/// it resolves to `NoOwner` instead of an error. Any other failure propagates.
pub async fn resolve_owner<S: CoordinationStore>(
    ctx: &OpContext,
    client: &CdcKvClient<S>,
) -> Result<CurrentOwner, CdcKvError> {
    match client.get_owner_candidate(ctx).await {
        Ok(Some(owner)) => Ok(CurrentOwner::Capture(owner)),
        Ok(None) => Ok(CurrentOwner::NoOwner),
        Err(e) if e.is_no_leader() => Ok(CurrentOwner::NoOwner),
        Err(e) => Err(e),
    }
}

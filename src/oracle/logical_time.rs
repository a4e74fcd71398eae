use chrono::{DateTime, TimeZone, Utc};
use std::fmt;

// The low 18 bits of a composed timestamp hold the logical counter.
const PHYSICAL_SHIFT_BITS: u32 = 18;
const LOGICAL_MASK: u64 = (1 << PHYSICAL_SHIFT_BITS) - 1;

/// LogicalTime is a (physical, logical) pair from the timestamp oracle. The physical part is
/// wall-clock milliseconds; the logical part orders timestamps within the same millisecond.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct LogicalTime {
    pub physical_ms: i64,
    pub logical: i64,
}

impl LogicalTime {
    pub fn new(physical_ms: i64, logical: i64) -> Self {
        LogicalTime { physical_ms, logical }
    }

    /// `compose()` packs the pair into one `u64` that sorts the same way the pair does.
    pub fn compose(&self) -> u64 {
        ((self.physical_ms as u64) << PHYSICAL_SHIFT_BITS) + (self.logical as u64)
    }

    pub fn from_composed(ts: u64) -> Self {
        LogicalTime {
            physical_ms: (ts >> PHYSICAL_SHIFT_BITS) as i64,
            logical: (ts & LOGICAL_MASK) as i64,
        }
    }

    /// Wall-clock time of the physical part, if it is representable.
    pub fn physical_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.physical_ms).single()
    }
}

impl fmt::Display for LogicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.compose())
    }
}

use std::time::{SystemTime, UNIX_EPOCH};

use crate::time::TimeSource;

/// The host wall clock, read through [`SystemTime::now`].
///
/// Wall-clock time can move backward (NTP step corrections, manual changes,
/// VM snapshot restore). The allocator detects this against its high-water
/// mark and fails the affected call rather than hiding it.
///
/// A clock reading before 1970 is reported as `0`, which the allocator then
/// rejects as earlier than its epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

use std::time::{SystemTime, UNIX_EPOCH};

use crate::time::TimeSource;

/// The operating system's wall clock.
///
/// Unlike a monotonic timer this clock can move backwards (NTP step
/// corrections, VM migration). Generators detect that and report
/// [`Error::ClockDrift`] instead of hiding it.
///
/// A clock reading before 1970 is reported as `0`, which every generator
/// rejects as out of range.
///
/// [`Error::ClockDrift`]: crate::Error::ClockDrift
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
            })
    }
}

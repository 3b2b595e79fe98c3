use std::sync::Arc;

/// Default fleet epoch: Friday, February 14, 2025 09:44:30 UTC.
///
/// With the reference 41-bit timestamp field this leaves roughly 69 years of
/// range. Every generator in a fleet must share the same epoch for their IDs
/// to remain comparable.
pub const DEFAULT_EPOCH: u64 = 1_739_526_270_000;

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: u64 = 1_288_834_974_657;

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH: u64 = 1_420_070_400_000;

/// A source of wall-clock time.
///
/// This abstraction allows you to plug in the real system clock or a mocked
/// time source in tests to simulate clock advancement, stalls and regression.
///
/// The unit is **milliseconds since 1970-01-01T00:00:00Z**. Generators
/// subtract their own epoch.
///
/// # Example
///
/// ```
/// use flakeforge::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

use std::sync::Arc;

/// Default epoch: Monday, January 1, 2024 00:00:00 UTC, in Unix milliseconds.
pub const DEFAULT_EPOCH_MS: u64 = 1_704_067_200_000;

/// A source of wall-clock time in **Unix milliseconds**.
///
/// The allocator reads this once per generated ID and subtracts its epoch
/// itself, so implementations must not pre-apply any offset. Because the
/// allocator has to detect wall-clock regression, a source that hides
/// regressions (for example a monotonic ticker) changes the failure behavior
/// but not the uniqueness guarantee.
///
/// This abstraction lets tests freeze, step or rewind time.
///
/// # Example
///
/// ```
/// use ferrule::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_704_067_200_123
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1_704_067_200_123);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since 1970-01-01 UTC.
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

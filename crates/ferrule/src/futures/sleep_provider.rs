use core::{future::Future, time::Duration};

/// Abstracts how an async caller waits out an exhausted millisecond.
///
/// This keeps the allocator independent of any particular runtime.
pub trait SleepProvider {
    /// Waits for roughly `dur`. Implementations may return earlier (for
    /// example by yielding once); the caller simply polls again.
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}

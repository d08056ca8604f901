/// Result alias used throughout `ferrule`.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors the allocator and its configuration layer can produce.
///
/// Only two kinds surface in normal operation: [`Error::Configuration`] at
/// construction time, and [`Error::ClockRegression`] when the host clock is
/// observed moving backward. Sequence exhaustion within a millisecond is not
/// an error; the allocator waits for the next millisecond instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A coordinate was outside its valid range.
    ///
    /// Fatal to allocator creation.
    #[error("{field} must be between 0 and {max}, got {value}")]
    Configuration {
        /// Name of the offending coordinate (`worker_id` or `datacenter_id`).
        field: &'static str,
        /// The rejected value.
        value: i64,
        /// Largest accepted value.
        max: u64,
    },

    /// An environment variable was present but not an integer.
    #[error("environment variable {key} is not an integer: {value:?}")]
    InvalidEnv {
        /// Variable name.
        key: &'static str,
        /// Raw value as read.
        value: String,
    },

    /// The wall clock moved backward relative to the allocator's high-water
    /// mark.
    ///
    /// The call that observed this did not produce an ID and did not modify
    /// the allocator state. Whether to retry, alert or halt is up to the
    /// caller.
    #[error(
        "clock moved backwards: refusing to generate id for {drift_ms} milliseconds \
         (last = {last_timestamp}, now = {now})"
    )]
    ClockRegression {
        /// Unix milliseconds of the most recently issued ID.
        last_timestamp: u64,
        /// Unix milliseconds just read from the clock.
        now: u64,
        /// `last_timestamp - now`.
        drift_ms: u64,
    },

    /// The clock reads a time before the configured epoch, so the timestamp
    /// field would be negative.
    #[error("clock reads {now} ms which is before the epoch {epoch} ms")]
    ClockBeforeEpoch {
        /// Unix milliseconds read from the clock.
        now: u64,
        /// Configured epoch in Unix milliseconds.
        epoch: u64,
    },

    /// Milliseconds since the epoch no longer fit in the 41-bit timestamp
    /// field.
    #[error("{elapsed} ms since epoch exceeds the 41-bit timestamp field")]
    TimestampOverflow {
        /// Milliseconds elapsed since the epoch.
        elapsed: u64,
    },

    /// The allocator's lock was poisoned by a panicking holder.
    ///
    /// `parking_lot` mutexes never poison, so this only occurs when the
    /// `parking-lot` feature is disabled.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("allocator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}

/// Errors from parsing a decimal identifier string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ParseIdError {
    /// The input was empty.
    #[error("identifier is empty")]
    Empty,

    /// The input contained something other than ASCII digits, or overflowed
    /// 64 bits.
    #[error("identifier is not a valid unsigned 64-bit decimal: {0:?}")]
    InvalidDigit(String),

    /// The value sets the reserved sign bit.
    #[error("identifier {0} sets the reserved sign bit")]
    SignBitSet(u64),
}

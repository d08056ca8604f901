use core::cmp::Ordering;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    config::AllocatorConfig,
    error::{Error, Result},
    generator::{Mutex, MutexGuard, Poll},
    id::SnowflakeId,
    time::{DEFAULT_EPOCH_MS, SystemClock, TimeSource},
};

/// Mutable allocator state. Only ever touched under the allocator's lock.
#[derive(Debug, Default)]
struct State {
    /// Unix ms of the most recently issued ID; `None` until the first one.
    last_timestamp: Option<u64>,
    /// Sequence of the most recently issued ID within `last_timestamp`.
    sequence: u64,
}

/// A lock-based Snowflake ID allocator for one (datacenter, worker)
/// coordinate pair.
///
/// Every call takes the same mutex for the whole read-clock, compare, bump,
/// commit, encode sequence, so concurrent callers are serialized and never
/// observe a half-updated `{last_timestamp, sequence}` pair.
///
/// ## Guarantees
/// - IDs from one instance strictly increase in call order.
/// - IDs are unique across instances with distinct coordinate pairs.
/// - A backward clock step fails the call with [`Error::ClockRegression`]
///   instead of reusing a timestamp.
/// - When 4096 IDs were already issued in the current millisecond the call
///   waits for the next millisecond; this is not an error.
///
/// Construct exactly one allocator per process (or per logical shard) and
/// share it by reference or `Arc`.
///
/// # Example
///
/// ```
/// use ferrule::{IdAllocator, SystemClock};
///
/// let allocator = IdAllocator::new(1, 1, SystemClock)?;
/// let a: u64 = allocator.next_id()?.parse().unwrap();
/// let b: u64 = allocator.next_id()?.parse().unwrap();
/// assert!(a < b);
/// # Ok::<(), ferrule::Error>(())
/// ```
pub struct IdAllocator<C = SystemClock>
where
    C: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<State>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<State>,
    worker_id: u64,
    datacenter_id: u64,
    epoch_ms: u64,
    clock: C,
}

impl<C> IdAllocator<C>
where
    C: TimeSource,
{
    /// Creates an allocator using [`DEFAULT_EPOCH_MS`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if either coordinate is outside
    /// `0..=31`.
    pub fn new(worker_id: i64, datacenter_id: i64, clock: C) -> Result<Self> {
        Self::with_epoch(worker_id, datacenter_id, DEFAULT_EPOCH_MS, clock)
    }

    /// Creates an allocator counting timestamps from `epoch_ms` (Unix
    /// milliseconds).
    ///
    /// All allocators that share an ID namespace must use the same epoch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if either coordinate is outside
    /// `0..=31`.
    pub fn with_epoch(worker_id: i64, datacenter_id: i64, epoch_ms: u64, clock: C) -> Result<Self> {
        let worker_id = check_coordinate("worker_id", worker_id, SnowflakeId::WORKER_ID_MASK)?;
        let datacenter_id = check_coordinate(
            "datacenter_id",
            datacenter_id,
            SnowflakeId::DATACENTER_ID_MASK,
        )?;

        let state = Mutex::new(State::default());
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(state),
            #[cfg(not(feature = "cache-padded"))]
            state,
            worker_id,
            datacenter_id,
            epoch_ms,
            clock,
        })
    }

    /// Creates an allocator from a loaded [`AllocatorConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if either coordinate is out of range.
    pub fn from_config(config: &AllocatorConfig, clock: C) -> Result<Self> {
        Self::with_epoch(
            config.worker_id,
            config.datacenter_id,
            config.epoch_ms,
            clock,
        )
    }

    /// The worker coordinate encoded in every ID.
    pub const fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// The datacenter coordinate encoded in every ID.
    pub const fn datacenter_id(&self) -> u64 {
        self.datacenter_id
    }

    /// The epoch (Unix ms) timestamps are counted from.
    pub const fn epoch_ms(&self) -> u64 {
        self.epoch_ms
    }

    /// Allocates the next ID and returns it as a base-10 string.
    ///
    /// This is the form persisted as a primary key.
    ///
    /// # Errors
    ///
    /// See [`Self::try_next_id`].
    pub fn next_id(&self) -> Result<String> {
        self.try_next_id().map(|id| id.to_string())
    }

    /// Allocates the next ID, yielding the thread between clock reads while
    /// waiting out an exhausted millisecond.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock reads earlier than the last
    ///   issued timestamp.
    /// - [`Error::ClockBeforeEpoch`] / [`Error::TimestampOverflow`] if the
    ///   clock is outside the representable range.
    /// - [`Error::LockPoisoned`] with the std mutex if a holder panicked.
    ///
    /// No state is modified when an error is returned.
    ///
    /// [`Error::LockPoisoned`]: crate::Error
    pub fn try_next_id(&self) -> Result<SnowflakeId> {
        self.try_next_id_with(std::thread::yield_now)
    }

    /// Like [`Self::try_next_id`], but calls `backoff` between clock reads
    /// while waiting for the next millisecond.
    ///
    /// The lock is held for the entire call, including the wait, so the
    /// allocation is a single critical section.
    ///
    /// # Errors
    ///
    /// See [`Self::try_next_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self, backoff)))]
    pub fn try_next_id_with(&self, mut backoff: impl FnMut()) -> Result<SnowflakeId> {
        let mut state = self.lock()?;
        let mut now = self.clock.current_millis();

        loop {
            match self.step(&mut state, now)? {
                Poll::Ready { id } => break Ok(id),
                Poll::Pending { .. } => {
                    let last = state.last_timestamp.unwrap_or_default();
                    loop {
                        backoff();
                        now = self.clock.current_millis();
                        if now > last {
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Attempts a single allocation without waiting.
    ///
    /// Returns [`Poll::Pending`] instead of waiting when the current
    /// millisecond is exhausted. The lock is released before returning, so a
    /// caller may sleep or yield to its executor before polling again.
    ///
    /// # Errors
    ///
    /// See [`Self::try_next_id`]. Unlike the blocking call, a clock that steps
    /// backward between two polls is reported as [`Error::ClockRegression`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll<SnowflakeId>> {
        let mut state = self.lock()?;
        let now = self.clock.current_millis();
        self.step(&mut state, now)
    }

    fn step(&self, state: &mut State, now: u64) -> Result<Poll<SnowflakeId>> {
        let Some(last) = state.last_timestamp else {
            return self.rollover(state, now);
        };

        match now.cmp(&last) {
            Ordering::Equal => {
                let sequence = (state.sequence + 1) & SnowflakeId::SEQUENCE_MASK;
                if sequence == 0 {
                    return Ok(Poll::Pending { yield_for: 1 });
                }
                let id = self.encode(now, sequence)?;
                state.sequence = sequence;
                Ok(Poll::Ready { id })
            }
            Ordering::Greater => self.rollover(state, now),
            Ordering::Less => Err(Self::cold_clock_behind(last, now)),
        }
    }

    fn rollover(&self, state: &mut State, now: u64) -> Result<Poll<SnowflakeId>> {
        let id = self.encode(now, 0)?;
        state.last_timestamp = Some(now);
        state.sequence = 0;
        Ok(Poll::Ready { id })
    }

    fn encode(&self, now: u64, sequence: u64) -> Result<SnowflakeId> {
        let elapsed = now.checked_sub(self.epoch_ms).ok_or(Error::ClockBeforeEpoch {
            now,
            epoch: self.epoch_ms,
        })?;
        if elapsed > SnowflakeId::TIMESTAMP_MASK {
            return Err(Error::TimestampOverflow { elapsed });
        }
        Ok(SnowflakeId::from_parts(
            elapsed,
            self.datacenter_id,
            self.worker_id,
            sequence,
        ))
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(last_timestamp: u64, now: u64) -> Error {
        Error::ClockRegression {
            last_timestamp,
            now,
            drift_ms: last_timestamp - now,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }
}

impl<C> core::fmt::Debug for IdAllocator<C>
where
    C: TimeSource,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdAllocator")
            .field("worker_id", &self.worker_id)
            .field("datacenter_id", &self.datacenter_id)
            .field("epoch_ms", &self.epoch_ms)
            .finish_non_exhaustive()
    }
}

fn check_coordinate(field: &'static str, value: i64, max: u64) -> Result<u64> {
    match u64::try_from(value) {
        Ok(v) if v <= max => Ok(v),
        _ => Err(Error::Configuration { field, value, max }),
    }
}

/// Outcome of a single non-blocking allocation attempt.
///
/// - [`Poll::Ready`] carries a freshly allocated ID.
/// - [`Poll::Pending`] means all 4096 sequence values of the current
///   millisecond are spent; try again after `yield_for` milliseconds.
///
/// Returned by [`IdAllocator::try_poll_id`], which lets async callers wait
/// without spinning an executor thread.
///
/// [`IdAllocator::try_poll_id`]: crate::IdAllocator::try_poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll<T> {
    /// A unique ID was allocated and is ready to use.
    Ready {
        /// The allocated ID.
        id: T,
    },
    /// The sequence for the current millisecond is exhausted.
    Pending {
        /// Milliseconds to wait before polling again.
        yield_for: u64,
    },
}

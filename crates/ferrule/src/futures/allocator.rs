use core::{future::Future, time::Duration};

use crate::{
    error::Result,
    futures::{SleepProvider, TokioSleep},
    generator::{IdAllocator, Poll},
    id::SnowflakeId,
    time::TimeSource,
};

/// Extension trait for allocating IDs from async code.
///
/// The blocking [`IdAllocator::try_next_id`] spins on the calling thread
/// while a millisecond is exhausted, which on a cooperative executor would
/// stall every other task on that worker. These methods release the lock and
/// await a [`SleepProvider`] instead.
pub trait IdAllocatorAsyncExt {
    /// Returns a future that resolves to the next available ID, awaiting `S`
    /// whenever the current millisecond is exhausted.
    ///
    /// # Errors
    ///
    /// Returns any error produced by [`IdAllocator::try_poll_id`].
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<SnowflakeId>> + Send
    where
        S: SleepProvider;

    /// Returns a future that resolves to the next ID as a base-10 string,
    /// waiting with [`TokioSleep`].
    ///
    /// # Errors
    ///
    /// Returns any error produced by [`IdAllocator::try_poll_id`].
    fn next_id_async(&self) -> impl Future<Output = Result<String>> + Send;
}

impl<C> IdAllocatorAsyncExt for IdAllocator<C>
where
    C: TimeSource + Sync,
{
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<SnowflakeId>> + Send
    where
        S: SleepProvider,
    {
        async move {
            loop {
                let dur = match self.try_poll_id()? {
                    Poll::Ready { id } => return Ok(id),
                    Poll::Pending { yield_for } => Duration::from_millis(yield_for),
                };
                S::sleep_for(dur).await;
            }
        }
    }

    fn next_id_async(&self) -> impl Future<Output = Result<String>> + Send {
        async move {
            self.try_next_id_async::<TokioSleep>()
                .await
                .map(|id| id.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc};

    use ::futures::future::try_join_all;

    use super::*;
    use crate::{futures::TokioYield, time::SystemClock};

    const TASKS: usize = 8;
    const IDS_PER_TASK: usize = 4096 * 2;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn can_call_next_id_async() {
        let allocator = IdAllocator::new(1, 1, SystemClock).unwrap();
        let a: SnowflakeId = allocator.next_id_async().await.unwrap().parse().unwrap();
        let b: SnowflakeId = allocator.next_id_async().await.unwrap().parse().unwrap();
        assert!(a < b);
        assert_eq!(a.worker_id(), 1);
        assert_eq!(a.datacenter_id(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn many_tasks_sleep() {
        generate_unique::<TokioSleep>().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn many_tasks_yield() {
        generate_unique::<TokioYield>().await;
    }

    async fn generate_unique<S: SleepProvider + 'static>() {
        let allocator = Arc::new(IdAllocator::new(3, 7, SystemClock).unwrap());

        let tasks: Vec<_> = (0..TASKS)
            .map(|_| {
                let allocator = Arc::clone(&allocator);
                tokio::spawn(async move {
                    let mut ids = Vec::with_capacity(IDS_PER_TASK);
                    for _ in 0..IDS_PER_TASK {
                        ids.push(allocator.try_next_id_async::<S>().await.unwrap());
                    }
                    ids
                })
            })
            .collect();

        let per_task = try_join_all(tasks).await.unwrap();
        let mut seen = HashSet::with_capacity(TASKS * IDS_PER_TASK);
        for ids in per_task {
            assert!(ids.windows(2).all(|w| w[0] < w[1]), "task ids not increasing");
            for id in ids {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), TASKS * IDS_PER_TASK);
    }
}

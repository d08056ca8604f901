use std::{io::Write, thread::scope, time::Instant};

use anyhow::{Context, bail};
use ferrule::{IdAllocator, SnowflakeId, SystemClock};
use serde::Serialize;

/// Issues `count` IDs from one allocator shared by `threads` threads and
/// writes them to `out`, one per line.
///
/// Each thread's IDs are written as a contiguous block in the order that
/// thread received them.
pub fn generate(
    allocator: &IdAllocator<SystemClock>,
    count: usize,
    threads: usize,
    padded: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    tracing::debug!(?allocator, count, threads, "issuing ids");

    let start = Instant::now();
    let batches = scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                // Spread the remainder over the first threads.
                let n = count / threads + usize::from(i < count % threads);
                s.spawn(move || {
                    (0..n)
                        .map(|_| allocator.try_next_id())
                        .collect::<ferrule::Result<Vec<_>>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| -> anyhow::Result<Vec<SnowflakeId>> {
                match h.join() {
                    Ok(batch) => Ok(batch?),
                    Err(_) => bail!("id worker thread panicked"),
                }
            })
            .collect::<anyhow::Result<Vec<_>>>()
    })?;
    let elapsed = start.elapsed();

    for id in batches.iter().flatten() {
        if padded {
            writeln!(out, "{}", id.to_padded_string())?;
        } else {
            writeln!(out, "{id}")?;
        }
    }
    out.flush()?;

    tracing::info!(count, threads, ?elapsed, "issued ids");
    Ok(())
}

/// Fields packed into one ID.
#[derive(Debug, Serialize)]
pub struct Decoded {
    pub id: SnowflakeId,
    pub timestamp: u64,
    pub unix_millis: u64,
    pub datacenter_id: u64,
    pub worker_id: u64,
    pub sequence: u64,
}

impl Decoded {
    pub fn new(id: SnowflakeId, epoch_ms: u64) -> anyhow::Result<Self> {
        let Some(unix_millis) = id.unix_millis(epoch_ms) else {
            bail!("id {id} is out of range for epoch {epoch_ms} ms");
        };
        Ok(Self {
            id,
            timestamp: id.timestamp(),
            unix_millis,
            datacenter_id: id.datacenter_id(),
            worker_id: id.worker_id(),
            sequence: id.sequence(),
        })
    }
}

/// Parses each of `ids` and writes its fields to `out` as one JSON object per
/// line.
pub fn decode(ids: &[String], epoch_ms: u64, out: &mut impl Write) -> anyhow::Result<()> {
    for raw in ids {
        let id: SnowflakeId = raw
            .parse()
            .with_context(|| format!("invalid id {raw:?}"))?;
        serde_json::to_writer(&mut *out, &Decoded::new(id, epoch_ms)?)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

//! The process-wide allocator.
//!
//! Prefer building one [`IdAllocator`] in your composition root and passing
//! it to the code that needs IDs. This module exists for call sites that
//! cannot be reached by injection, such as ORM hooks invoked by a framework.
//! Both styles must not be mixed with the same coordinates in one process:
//! two independent allocators would each believe they own the
//! `{last_timestamp, sequence}` pair.

use std::sync::OnceLock;

use crate::{
    config::AllocatorConfig,
    error::Result,
    generator::IdAllocator,
    time::SystemClock,
};

static ALLOCATOR: OnceLock<IdAllocator<SystemClock>> = OnceLock::new();

/// Returns the process-wide allocator, building it from the environment on
/// first use.
///
/// Concurrent first calls may each build a candidate; exactly one is
/// installed and every caller gets that one. A candidate that loses the race
/// is dropped before issuing any ID.
///
/// # Errors
///
/// Returns the configuration error if the environment holds invalid
/// coordinates. Nothing is installed in that case, so a later call retries.
pub fn allocator() -> Result<&'static IdAllocator<SystemClock>> {
    if let Some(allocator) = ALLOCATOR.get() {
        return Ok(allocator);
    }
    let config = AllocatorConfig::from_env()?;
    Ok(install(IdAllocator::from_config(&config, SystemClock)?))
}

/// Installs `allocator` as the process-wide instance unless one already
/// exists, and returns the installed instance.
///
/// Call this once at startup to use coordinates from a source other than the
/// environment.
pub fn install(allocator: IdAllocator<SystemClock>) -> &'static IdAllocator<SystemClock> {
    ALLOCATOR.get_or_init(|| allocator)
}

/// Allocates an ID from the process-wide allocator as a base-10 string.
///
/// # Errors
///
/// See [`allocator`] and [`IdAllocator::try_next_id`].
pub fn generate_id() -> Result<String> {
    allocator()?.next_id()
}

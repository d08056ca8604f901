use crate::{
    error::{Error, Result},
    time::DEFAULT_EPOCH_MS,
};

/// Environment variable holding the worker coordinate.
pub const WORKER_ID_ENV: &str = "SNOWFLAKE_WORKER_ID";

/// Environment variable holding the datacenter coordinate.
pub const DATACENTER_ID_ENV: &str = "SNOWFLAKE_DATACENTER_ID";

/// Environment variable overriding the epoch, in Unix milliseconds.
pub const EPOCH_ENV: &str = "SNOWFLAKE_EPOCH_MS";

/// Worker coordinate used when [`WORKER_ID_ENV`] is unset.
pub const DEFAULT_WORKER_ID: i64 = 1;

/// Datacenter coordinate used when [`DATACENTER_ID_ENV`] is unset.
pub const DEFAULT_DATACENTER_ID: i64 = 1;

/// Coordinates and epoch an [`IdAllocator`] is built from.
///
/// Values are kept signed as read so that an out-of-range input such as `-1`
/// reaches [`IdAllocator::new`] and is rejected there with
/// [`Error::Configuration`].
///
/// [`IdAllocator`]: crate::IdAllocator
/// [`IdAllocator::new`]: crate::IdAllocator::new
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocatorConfig {
    /// Worker coordinate, `0..=31`.
    pub worker_id: i64,
    /// Datacenter coordinate, `0..=31`.
    pub datacenter_id: i64,
    /// Epoch in Unix milliseconds.
    pub epoch_ms: u64,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            worker_id: DEFAULT_WORKER_ID,
            datacenter_id: DEFAULT_DATACENTER_ID,
            epoch_ms: DEFAULT_EPOCH_MS,
        }
    }
}

impl AllocatorConfig {
    /// Reads the configuration from the process environment.
    ///
    /// Unset or blank variables fall back to the defaults (worker 1,
    /// datacenter 1, [`DEFAULT_EPOCH_MS`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEnv`] if a variable is set to something other
    /// than an integer. Range checks happen when the allocator is built.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    ///
    /// # Example
    ///
    /// ```
    /// use ferrule::AllocatorConfig;
    ///
    /// let config = AllocatorConfig::from_lookup(|key| match key {
    ///     "SNOWFLAKE_WORKER_ID" => Some("7".to_owned()),
    ///     _ => None,
    /// })?;
    /// assert_eq!(config.worker_id, 7);
    /// assert_eq!(config.datacenter_id, 1);
    /// # Ok::<(), ferrule::Error>(())
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            worker_id: read(&lookup, WORKER_ID_ENV)?.unwrap_or(defaults.worker_id),
            datacenter_id: read(&lookup, DATACENTER_ID_ENV)?.unwrap_or(defaults.datacenter_id),
            epoch_ms: read(&lookup, EPOCH_ENV)?.unwrap_or(defaults.epoch_ms),
        })
    }
}

fn read<T: core::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| Error::InvalidEnv { key, value: raw })
}

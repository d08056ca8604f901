use std::time::SystemTime;

use crate::{
    error::Result,
    generator::IdAllocator,
    time::TimeSource,
};

/// A persistable record whose primary key is a Snowflake ID string.
///
/// Implemented by anything the persistence layer inserts, so that
/// [`assign_id`] can run as the before-insert hook.
pub trait Entity {
    /// The current primary key, if one is set.
    fn id(&self) -> Option<&str>;

    /// Stores a newly allocated primary key.
    fn set_id(&mut self, id: String);
}

/// Fills in the primary key of `entity` before it is inserted.
///
/// If the entity has no ID (or an empty one), exactly one ID is allocated and
/// stored and `Ok(true)` is returned. An entity that already carries an ID is
/// left untouched and `Ok(false)` is returned.
///
/// # Errors
///
/// Propagates allocation failures such as [`Error::ClockRegression`]. The
/// insert must be aborted; the entity is left without an ID.
///
/// [`Error::ClockRegression`]: crate::Error::ClockRegression
///
/// # Example
///
/// ```
/// use ferrule::{assign_id, Entity, IdAllocator, Record, SystemClock};
///
/// let allocator = IdAllocator::new(1, 1, SystemClock)?;
/// let mut record = Record::new();
/// assert!(assign_id(&mut record, &allocator)?);
/// assert!(record.id().is_some());
/// assert!(!assign_id(&mut record, &allocator)?);
/// # Ok::<(), ferrule::Error>(())
/// ```
pub fn assign_id<E, C>(entity: &mut E, allocator: &IdAllocator<C>) -> Result<bool>
where
    E: Entity + ?Sized,
    C: TimeSource,
{
    if entity.id().is_some_and(|id| !id.is_empty()) {
        return Ok(false);
    }

    match allocator.next_id() {
        Ok(id) => {
            entity.set_id(id);
            Ok(true)
        }
        Err(e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %e, "failed to assign primary key, aborting insert");
            Err(e)
        }
    }
}

/// The common base shared by every table: a string primary key plus
/// creation and update timestamps.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    /// Primary key; `None` until the record is first inserted.
    pub id: Option<String>,
    /// When the record was created.
    pub created_at: SystemTime,
    /// When the record was last modified.
    pub updated_at: SystemTime,
}

impl Record {
    /// A fresh record with no ID, stamped with the current time.
    pub fn new() -> Self {
        let now = SystemTime::now();
        Self {
            id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the record as modified now.
    pub fn touch(&mut self) {
        self.updated_at = SystemTime::now();
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Record {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    };

    use super::*;
    use crate::{error::Error, id::SnowflakeId, time::DEFAULT_EPOCH_MS};

    #[derive(Clone, Default)]
    struct SharedTime(Arc<AtomicU64>);

    impl TimeSource for SharedTime {
        fn current_millis(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct RefreshToken {
        id: String,
        value: String,
    }

    impl Entity for RefreshToken {
        fn id(&self) -> Option<&str> {
            Some(self.id.as_str())
        }

        fn set_id(&mut self, id: String) {
            self.id = id;
        }
    }

    #[test]
    fn assigns_once_when_missing() {
        let time = SharedTime::default();
        time.0.store(DEFAULT_EPOCH_MS + 10, Ordering::SeqCst);
        let allocator = IdAllocator::new(4, 2, time).unwrap();

        let mut record = Record::new();
        assert!(assign_id(&mut record, &allocator).unwrap());
        let id: SnowflakeId = record.id().unwrap().parse().unwrap();
        assert_eq!(id.timestamp(), 10);
        assert_eq!(id.worker_id(), 4);
        assert_eq!(id.datacenter_id(), 2);
        assert_eq!(id.sequence(), 0);

        assert!(!assign_id(&mut record, &allocator).unwrap());
        assert_eq!(record.id().unwrap(), id.to_string());

        // The skipped call did not consume a sequence number.
        let next: SnowflakeId = allocator.next_id().unwrap().parse().unwrap();
        assert_eq!(next.sequence(), 1);
    }

    #[test]
    fn empty_id_counts_as_missing() {
        let allocator = IdAllocator::new(0, 0, crate::time::SystemClock).unwrap();
        let mut token = RefreshToken {
            id: String::new(),
            value: "opaque".into(),
        };
        assert!(assign_id(&mut token, &allocator).unwrap());
        assert!(!token.id.is_empty());
        assert_eq!(token.value, "opaque");
    }

    #[test]
    fn clock_regression_aborts_without_assigning() {
        let time = SharedTime::default();
        time.0.store(DEFAULT_EPOCH_MS + 100, Ordering::SeqCst);
        let allocator = IdAllocator::new(1, 1, time.clone()).unwrap();
        allocator.next_id().unwrap();

        time.0.store(DEFAULT_EPOCH_MS + 40, Ordering::SeqCst);
        let mut record = Record::new();
        let err = assign_id(&mut record, &allocator).unwrap_err();
        assert!(matches!(err, Error::ClockRegression { drift_ms: 60, .. }));
        assert!(record.id.is_none());
    }

    #[test]
    fn touch_advances_updated_at() {
        let mut record = Record::new();
        let created = record.created_at;
        record.touch();
        assert!(record.updated_at >= created);
        assert_eq!(record.created_at, created);
    }
}

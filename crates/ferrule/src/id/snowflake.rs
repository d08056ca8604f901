use core::{fmt, str::FromStr};

use crate::error::ParseIdError;

/// A 64-bit Snowflake ID with split datacenter and worker coordinates.
///
/// - 1 bit reserved (sign, always zero)
/// - 41 bits timestamp (ms since the allocator's epoch)
/// - 5 bits datacenter ID
/// - 5 bits worker ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63    62             22 21       17 16       12 11          0
///              +------+----------------+-----------+-----------+-------------+
///  Field:      | sign | timestamp (41) | dc id (5) | wk id (5) | seq (12)    |
///              +------+----------------+-----------+-----------+-------------+
///              |<----------- MSB ---------- 64 bits ----------- LSB -------->|
/// ```
///
/// The sign bit is never set by the allocator, so the value stays
/// non-negative when read back as an `i64` by a database driver.
///
/// # Example
///
/// ```
/// use ferrule::SnowflakeId;
///
/// let id = SnowflakeId::from_parts(1000, 2, 3, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.datacenter_id(), 2);
/// assert_eq!(id.worker_id(), 3);
/// assert_eq!(id.sequence(), 1);
/// assert_eq!(id.to_string().parse::<SnowflakeId>(), Ok(id));
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Width of the timestamp field.
    pub const TIMESTAMP_BITS: u32 = 41;

    /// Width of the datacenter ID field.
    pub const DATACENTER_ID_BITS: u32 = 5;

    /// Width of the worker ID field.
    pub const WORKER_ID_BITS: u32 = 5;

    /// Width of the sequence field.
    pub const SEQUENCE_BITS: u32 = 12;

    /// Bitmask for the 41-bit timestamp field. Occupies bits 22 through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;

    /// Bitmask for the 5-bit datacenter ID field. Occupies bits 17 through 21.
    pub const DATACENTER_ID_MASK: u64 = (1 << Self::DATACENTER_ID_BITS) - 1;

    /// Bitmask for the 5-bit worker ID field. Occupies bits 12 through 16.
    pub const WORKER_ID_MASK: u64 = (1 << Self::WORKER_ID_BITS) - 1;

    /// Bitmask for the 12-bit sequence field. Occupies bits 0 through 11.
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Shift of the timestamp field (22).
    pub const TIMESTAMP_SHIFT: u32 =
        Self::SEQUENCE_BITS + Self::WORKER_ID_BITS + Self::DATACENTER_ID_BITS;

    /// Shift of the datacenter ID field (17).
    pub const DATACENTER_ID_SHIFT: u32 = Self::SEQUENCE_BITS + Self::WORKER_ID_BITS;

    /// Shift of the worker ID field (12).
    pub const WORKER_ID_SHIFT: u32 = Self::SEQUENCE_BITS;

    /// Shift of the sequence field (0).
    pub const SEQUENCE_SHIFT: u32 = 0;

    /// The reserved most-significant bit.
    pub const SIGN_BIT: u64 = 1 << 63;

    /// Number of decimal digits in the largest valid ID (`i64::MAX`).
    pub const MAX_DECIMAL_DIGITS: usize = 19;

    /// Packs the given components. Each value is masked to its field width.
    pub const fn from_parts(
        timestamp: u64,
        datacenter_id: u64,
        worker_id: u64,
        sequence: u64,
    ) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let datacenter_id = (datacenter_id & Self::DATACENTER_ID_MASK) << Self::DATACENTER_ID_SHIFT;
        let worker_id = (worker_id & Self::WORKER_ID_MASK) << Self::WORKER_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | datacenter_id | worker_id | sequence,
        }
    }

    /// Wraps a raw value without validation.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the packed value.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Extracts the timestamp (ms since epoch) from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the datacenter ID from the packed ID.
    pub const fn datacenter_id(&self) -> u64 {
        (self.id >> Self::DATACENTER_ID_SHIFT) & Self::DATACENTER_ID_MASK
    }

    /// Extracts the worker ID from the packed ID.
    pub const fn worker_id(&self) -> u64 {
        (self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Returns `true` if the reserved sign bit is clear.
    pub const fn is_valid(&self) -> bool {
        self.id & Self::SIGN_BIT == 0
    }

    /// Absolute Unix milliseconds encoded by this ID, given the epoch it was
    /// generated against.
    ///
    /// Returns `None` if `epoch_ms` plus the timestamp field overflows `u64`.
    pub const fn unix_millis(&self, epoch_ms: u64) -> Option<u64> {
        epoch_ms.checked_add(self.timestamp())
    }

    /// Returns the ID as a zero-padded 19-digit string, so that string
    /// ordering agrees with numeric ordering.
    pub fn to_padded_string(&self) -> String {
        format!("{:019}", self.id)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl FromStr for SnowflakeId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseIdError::Empty);
        }
        // `u64::from_str` accepts a leading `+`; identifiers are digits only.
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseIdError::InvalidDigit(s.to_owned()));
        }
        let raw: u64 = s
            .parse()
            .map_err(|_| ParseIdError::InvalidDigit(s.to_owned()))?;
        let id = Self::from_raw(raw);
        if !id.is_valid() {
            return Err(ParseIdError::SignBitSet(raw));
        }
        Ok(id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: [(&str, u32, u64); 5] = [
            ("sign", 1, self.id >> 63),
            ("timestamp", Self::TIMESTAMP_BITS, self.timestamp()),
            ("datacenter_id", Self::DATACENTER_ID_BITS, self.datacenter_id()),
            ("worker_id", Self::WORKER_ID_BITS, self.worker_id()),
            ("sequence", Self::SEQUENCE_BITS, self.sequence()),
        ];

        writeln!(f, "SnowflakeId {{")?;
        writeln!(f, "    raw id        : 0x{:016x} ({})", self.id, self.id)?;
        for (name, bits, value) in fields {
            let label = format!("{name} ({bits})");
            writeln!(f, "    {label:<18}: {value:>14} 0x{value:x}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_decode_to_the_values_packed() {
        let id = SnowflakeId::from_parts(SnowflakeId::TIMESTAMP_MASK, 31, 0, 4095);
        assert_eq!(id.timestamp(), SnowflakeId::TIMESTAMP_MASK);
        assert_eq!(id.datacenter_id(), 31);
        assert_eq!(id.worker_id(), 0);
        assert_eq!(id.sequence(), 4095);
        assert!(id.is_valid());
        assert_eq!(id.to_raw(), i64::MAX as u64 & !(0x1f << 12));
    }

    #[test]
    fn shifts_match_the_documented_layout() {
        assert_eq!(SnowflakeId::TIMESTAMP_SHIFT, 22);
        assert_eq!(SnowflakeId::DATACENTER_ID_SHIFT, 17);
        assert_eq!(SnowflakeId::WORKER_ID_SHIFT, 12);
        let id = SnowflakeId::from_parts(1, 1, 1, 1);
        assert_eq!(id.to_raw(), (1 << 22) | (1 << 17) | (1 << 12) | 1);
    }

    #[test]
    fn oversized_components_are_masked() {
        let id = SnowflakeId::from_parts(0, 32, 33, 4096);
        assert_eq!(id.datacenter_id(), 0);
        assert_eq!(id.worker_id(), 1);
        assert_eq!(id.sequence(), 0);
    }

    #[test]
    fn ordering_follows_timestamp_then_sequence() {
        let a = SnowflakeId::from_parts(10, 31, 31, 4095);
        let b = SnowflakeId::from_parts(11, 0, 0, 0);
        let c = SnowflakeId::from_parts(11, 0, 0, 1);
        assert!(a < b && b < c);
    }

    #[test]
    fn parse_accepts_display_output() {
        let id = SnowflakeId::from_parts(123_456_789, 1, 1, 7);
        let s = id.to_string();
        assert!(s.bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(s.parse::<SnowflakeId>(), Ok(id));
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert_eq!("".parse::<SnowflakeId>(), Err(ParseIdError::Empty));
        assert_eq!(
            "+12".parse::<SnowflakeId>(),
            Err(ParseIdError::InvalidDigit("+12".into()))
        );
        assert_eq!(
            "12a".parse::<SnowflakeId>(),
            Err(ParseIdError::InvalidDigit("12a".into()))
        );
        assert_eq!(
            "18446744073709551616".parse::<SnowflakeId>(),
            Err(ParseIdError::InvalidDigit("18446744073709551616".into()))
        );
        assert_eq!(
            u64::MAX.to_string().parse::<SnowflakeId>(),
            Err(ParseIdError::SignBitSet(u64::MAX))
        );
    }

    #[test]
    fn padded_string_is_fixed_width() {
        assert_eq!(SnowflakeId::from_raw(42).to_padded_string(), "0000000000000000042");
        let max = SnowflakeId::from_raw(i64::MAX as u64).to_padded_string();
        assert_eq!(max.len(), SnowflakeId::MAX_DECIMAL_DIGITS);
    }

    #[test]
    fn unix_millis_adds_epoch() {
        let id = SnowflakeId::from_parts(500, 0, 0, 0);
        assert_eq!(id.unix_millis(1_704_067_200_000), Some(1_704_067_200_500));
    }

    #[test]
    fn unix_millis_overflow_is_none() {
        let id = SnowflakeId::from_parts(500, 0, 0, 0);
        assert_eq!(id.unix_millis(u64::MAX - 500), Some(u64::MAX));
        assert_eq!(id.unix_millis(u64::MAX - 499), None);
        assert_eq!(SnowflakeId::from_raw(0).unix_millis(u64::MAX), Some(u64::MAX));
    }

    #[test]
    fn debug_lists_every_field() {
        let out = format!("{:?}", SnowflakeId::from_parts(5, 6, 7, 8));
        for name in ["timestamp (41)", "datacenter_id (5)", "worker_id (5)", "sequence (12)"] {
            assert!(out.contains(name), "missing {name} in {out}");
        }
    }
}

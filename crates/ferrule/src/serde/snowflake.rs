use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::id::SnowflakeId;

/// Serializes as a base-10 string so that clients limited to 53-bit safe
/// integers receive the exact value.
impl Serialize for SnowflakeId {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(self)
    }
}

/// Accepts the base-10 string form. Human-readable formats may also supply a
/// bare unsigned integer from producers that store the key natively; compact
/// formats must carry the string written by [`Serialize`].
impl<'de> Deserialize<'de> for SnowflakeId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DecimalVisitor;

        impl de::Visitor<'_> for DecimalVisitor {
            type Value = SnowflakeId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a decimal snowflake id string or unsigned integer")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse().map_err(de::Error::custom)
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                from_native(v)
            }
        }

        if d.is_human_readable() {
            d.deserialize_any(DecimalVisitor)
        } else {
            d.deserialize_str(DecimalVisitor)
        }
    }
}

fn from_native<E: de::Error>(raw: u64) -> Result<SnowflakeId, E> {
    let id = SnowflakeId::from_raw(raw);
    if !id.is_valid() {
        return Err(E::custom(crate::error::ParseIdError::SignBitSet(raw)));
    }
    Ok(id)
}

/// Use with `#[serde(with = "ferrule::as_native")]` to store the ID as its
/// native integer instead of a string.
pub mod as_native {
    use super::{Deserialize, Deserializer, Serialize, Serializer};
    use crate::id::SnowflakeId;

    /// Serialize a snowflake ID as its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &SnowflakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.to_raw().serialize(s)
    }

    /// Deserialize a snowflake ID from its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying deserializer fails or the value sets
    /// the reserved sign bit.
    pub fn deserialize<'de, D>(d: D) -> Result<SnowflakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::from_native(u64::deserialize(d)?)
    }
}

//! Serde support for [`SnowflakeId`].
//!
//! By default an ID serializes as a plain signed 64-bit integer. Consumers
//! without 64-bit integer precision (JavaScript `Number`, some JSON parsers)
//! silently round large values, so [`as_string`] is provided for
//! `#[serde(with = "...")]` fields that must survive such a hop.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::SnowflakeId;

impl Serialize for SnowflakeId {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.to_i64().serialize(s)
    }
}

impl<'de> Deserialize<'de> for SnowflakeId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        as_i64::deserialize(d)
    }
}

pub mod as_i64 {
    use super::{Deserialize, Deserializer, Serialize, Serializer};
    use crate::SnowflakeId;

    /// Serialize an ID as its signed integer value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S: Serializer>(id: &SnowflakeId, s: S) -> Result<S::Ok, S::Error> {
        id.to_i64().serialize(s)
    }

    /// Deserialize an ID from its signed integer value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying deserializer fails or the value is
    /// negative.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SnowflakeId, D::Error> {
        let n = i64::deserialize(d)?;
        SnowflakeId::try_from(n)
            .map_err(|_| serde::de::Error::custom(format!("negative snowflake id: {n}")))
    }
}

pub mod as_string {
    use super::{Deserialize, Deserializer, Serializer};
    use crate::SnowflakeId;

    /// Serialize an ID as a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S: Serializer>(id: &SnowflakeId, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(id)
    }

    /// Deserialize an ID from a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying deserializer fails or the string is
    /// not a non-negative 64-bit decimal that fits in an `i64`.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SnowflakeId, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(d)?;
        s.parse::<i64>()
            .ok()
            .and_then(|n| SnowflakeId::try_from(n).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid snowflake id: {s:?}")))
    }
}

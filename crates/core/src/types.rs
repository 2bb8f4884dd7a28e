use serde::{Deserialize, Deserializer};

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Deserialize a field that must distinguish "absent" from "explicit null".
///
/// Pair with `#[serde(default)]` on an `Option<Option<T>>` field: a missing
/// key yields `None`, `null` yields `Some(None)`, a value yields
/// `Some(Some(v))`.
pub fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

//! Decoding helpers for lenient backend payloads.

use serde::{Deserialize, Deserializer};

/// Decodes `null` the same as a missing field: as `T::default()`.
///
/// Pair with `#[serde(default)]` so both an absent key and an explicit `null` give an empty
/// collection.
///
/// # Errors
///
/// Returns the deserializer's error when the value is neither `null` nor a valid `T`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

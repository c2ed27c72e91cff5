//! Token encoding for checkpoint values.
//!
//! Every value is one JSON scalar, so integers and booleans read back exactly
//! and a token never contains whitespace. Sequences are tokens joined by
//! single spaces.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Renders `value` as one token.
pub(super) fn encode<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

/// Parses one token as `T`.
pub(super) fn decode<T: DeserializeOwned>(token: &str) -> serde_json::Result<T> {
    serde_json::from_str(token)
}

/// Renders a sequence as space-separated tokens.
pub(super) fn encode_seq<T: Serialize>(values: &[T]) -> serde_json::Result<String> {
    let tokens = values.iter().map(encode).collect::<serde_json::Result<Vec<_>>>()?;
    Ok(tokens.join(" "))
}

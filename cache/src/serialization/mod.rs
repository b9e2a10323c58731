//! Serialization policies decide the byte format of each persisted value.
//!
//! The cache never interprets the format tag it was built with; it forwards
//! the tag verbatim to the policy on every read and write.

#[cfg(feature = "serde")]
pub mod serde_format;
pub mod text;

#[cfg(feature = "serde")]
pub use serde_format::{SerdeFormat, SerdeFormatError};
pub use text::{TextFormat, TextFormatError};

use std::io::{Read, Write};

/// Turns a value into bytes and back.
///
/// Errors are the policy's own concern. The cache wraps them in
/// [`CacheError::Serialization`](crate::error::CacheError::Serialization)
/// without reinterpreting them.
pub trait SerializationPolicy<V>: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Writes `value` to `sink` in the given format.
  fn serialize(&self, sink: &mut dyn Write, value: &V, format: &str) -> Result<(), Self::Error>;

  /// Reads a value of the given format from `source`.
  fn deserialize(&self, source: &mut dyn Read, format: &str) -> Result<V, Self::Error>;
}

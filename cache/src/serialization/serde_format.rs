use crate::serialization::SerializationPolicy;

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A policy backed by `serde`. The format tag picks the encoding.
///
/// Supported tags are [`SerdeFormat::JSON`] and [`SerdeFormat::BINCODE`].
/// Any other tag fails with [`SerdeFormatError::UnsupportedFormat`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SerdeFormat {
  pretty: bool,
}

impl SerdeFormat {
  pub const JSON: &'static str = "json";
  pub const BINCODE: &'static str = "bincode";

  pub fn new() -> Self {
    Self::default()
  }

  /// Pretty-prints JSON output. Has no effect on other formats.
  pub fn pretty(mut self, pretty: bool) -> Self {
    self.pretty = pretty;
    self
  }
}

#[derive(Debug, thiserror::Error)]
pub enum SerdeFormatError {
  #[error("unsupported format tag '{0}'")]
  UnsupportedFormat(String),

  #[error(transparent)]
  Json(#[from] serde_json::Error),

  #[error(transparent)]
  Bincode(#[from] bincode::Error),
}

impl<V> SerializationPolicy<V> for SerdeFormat
where
  V: Serialize + DeserializeOwned,
{
  type Error = SerdeFormatError;

  fn serialize(&self, sink: &mut dyn Write, value: &V, format: &str) -> Result<(), Self::Error> {
    match format {
      Self::JSON if self.pretty => serde_json::to_writer_pretty(sink, value)?,
      Self::JSON => serde_json::to_writer(sink, value)?,
      Self::BINCODE => bincode::serialize_into(sink, value)?,
      other => return Err(SerdeFormatError::UnsupportedFormat(other.to_string())),
    }
    Ok(())
  }

  fn deserialize(&self, source: &mut dyn Read, format: &str) -> Result<V, Self::Error> {
    match format {
      Self::JSON => Ok(serde_json::from_reader(source)?),
      Self::BINCODE => Ok(bincode::deserialize_from(source)?),
      other => Err(SerdeFormatError::UnsupportedFormat(other.to_string())),
    }
  }
}

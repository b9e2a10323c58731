use crate::serialization::SerializationPolicy;

use std::fmt::Display;
use std::io::{self, Read, Write};
use std::str::FromStr;

/// The default policy: values are written with `Display` and read back with
/// `FromStr`. The whole file is one value. The format tag is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextFormat;

#[derive(Debug, thiserror::Error)]
pub enum TextFormatError {
  #[error("text I/O failed: {0}")]
  Io(#[from] io::Error),

  #[error("could not parse stored text: {0}")]
  Parse(String),
}

impl<V> SerializationPolicy<V> for TextFormat
where
  V: Display + FromStr,
  V::Err: Display,
{
  type Error = TextFormatError;

  fn serialize(&self, sink: &mut dyn Write, value: &V, _format: &str) -> Result<(), Self::Error> {
    write!(sink, "{}", value)?;
    Ok(())
  }

  fn deserialize(&self, source: &mut dyn Read, _format: &str) -> Result<V, Self::Error> {
    let mut text = String::new();
    source.read_to_string(&mut text)?;
    text
      .parse::<V>()
      .map_err(|e| TextFormatError::Parse(e.to_string()))
  }
}

use std::fmt;
use std::sync::Arc;

/// The in-memory state of one key.
pub(crate) enum Slot<V> {
  /// The value was loaded from disk or written through the cache.
  Present(Arc<V>),
  /// A negative entry: the key was looked up and its file did not exist.
  /// It stays absent until the key is refreshed, even if the file appears.
  Absent,
}

impl<V> Slot<V> {
  /// Returns a clone of the `Arc` containing the value, if present.
  #[inline]
  pub(crate) fn value(&self) -> Option<Arc<V>> {
    match self {
      Slot::Present(value) => Some(value.clone()),
      Slot::Absent => None,
    }
  }

  #[inline]
  pub(crate) fn is_present(&self) -> bool {
    matches!(self, Slot::Present(_))
  }
}

impl<V> Clone for Slot<V> {
  fn clone(&self) -> Self {
    match self {
      Slot::Present(value) => Slot::Present(value.clone()),
      Slot::Absent => Slot::Absent,
    }
  }
}

impl<V> fmt::Debug for Slot<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Slot::Present(_) => f.write_str("Present"),
      Slot::Absent => f.write_str("Absent"),
    }
  }
}

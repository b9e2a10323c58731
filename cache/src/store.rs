use crate::entry::Slot;

use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// The in-memory table: one [`Slot`] per key ever looked up or inserted.
///
/// The `RwLock` here only keeps the map itself consistent. Every method
/// holds it for a single map operation, never across disk I/O or user code;
/// the logical critical sections belong to the concurrency policy.
pub(crate) struct EntryTable<K, V> {
  map: RwLock<BTreeMap<K, Slot<V>>>,
}

impl<K, V> fmt::Debug for EntryTable<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("EntryTable")
      .field("len", &self.map.read().len())
      .finish()
  }
}

impl<K: Ord + Clone, V> EntryTable<K, V> {
  pub(crate) fn new() -> Self {
    Self {
      map: RwLock::new(BTreeMap::new()),
    }
  }

  pub(crate) fn get(&self, key: &K) -> Option<Slot<V>> {
    self.map.read().get(key).cloned()
  }

  pub(crate) fn contains_key(&self, key: &K) -> bool {
    self.map.read().contains_key(key)
  }

  pub(crate) fn insert(&self, key: K, slot: Slot<V>) -> Option<Slot<V>> {
    self.map.write().insert(key, slot)
  }

  pub(crate) fn remove(&self, key: &K) -> Option<Slot<V>> {
    self.map.write().remove(key)
  }

  /// Drops every entry and returns how many there were.
  pub(crate) fn clear(&self) -> usize {
    let mut guard = self.map.write();
    let dropped = guard.len();
    guard.clear();
    dropped
  }

  pub(crate) fn len(&self) -> usize {
    self.map.read().len()
  }

  pub(crate) fn keys(&self) -> Vec<K> {
    self.map.read().keys().cloned().collect()
  }

  /// Returns every present entry in key order. Absent entries are skipped.
  pub(crate) fn present_entries(&self) -> Vec<(K, Arc<V>)> {
    self
      .map
      .read()
      .iter()
      .filter_map(|(key, slot)| slot.value().map(|value| (key.clone(), value)))
      .collect()
  }
}

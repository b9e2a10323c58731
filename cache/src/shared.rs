use crate::concurrency::ConcurrencyPolicy;
use crate::disk::DiskManager;
use crate::entry::Slot;
use crate::error::{CacheError, Result};
use crate::logging::LogPolicy;
use crate::metrics::Metrics;
use crate::serialization::SerializationPolicy;
use crate::store::EntryTable;

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// The signature of the function that maps a key to the file backing it.
pub type FilenameFn<K> = Arc<dyn Fn(&K) -> PathBuf + Send + Sync>;

/// The internal, thread-safe core of the cache.
///
/// Methods ending in `_locked` assume the caller already holds the entry
/// lock for the key (or the collection lock, for `save_locked`). They never
/// take policy locks themselves, so public operations can compose them
/// without re-entering a non-recursive entry lock.
pub(crate) struct CacheShared<K, V, S, L, C> {
  pub(crate) table: EntryTable<K, V>,
  pub(crate) filename_fn: FilenameFn<K>,
  pub(crate) serialization: S,
  pub(crate) logging: L,
  pub(crate) concurrency: C,
  pub(crate) format: String,
  pub(crate) disk: DiskManager,
  pub(crate) metrics: Metrics,
}

impl<K, V, S, L, C> fmt::Debug for CacheShared<K, V, S, L, C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheShared")
      .field("table", &self.table)
      .field("format", &self.format)
      .field("disk", &self.disk)
      .field("metrics", &self.metrics.snapshot())
      .finish_non_exhaustive()
  }
}

impl<K, V, S, L, C> CacheShared<K, V, S, L, C>
where
  K: Ord + Clone + fmt::Debug + Send + Sync,
  V: Send + Sync,
  S: SerializationPolicy<V>,
  L: LogPolicy,
  C: ConcurrencyPolicy<K>,
{
  #[inline]
  pub(crate) fn filename(&self, key: &K) -> PathBuf {
    (self.filename_fn)(key)
  }

  /// Returns the in-memory entry, loading it from disk on first sight.
  pub(crate) fn lookup_locked(&self, key: &K) -> Result<Option<Arc<V>>> {
    if let Some(slot) = self.table.get(key) {
      if slot.is_present() {
        self.metrics.hits.fetch_add(1, Ordering::Relaxed);
      } else {
        self.metrics.negative_hits.fetch_add(1, Ordering::Relaxed);
      }
      return Ok(slot.value());
    }

    self.metrics.misses.fetch_add(1, Ordering::Relaxed);
    let slot = self.load_from_disk(key)?;
    let value = slot.value();
    self.table.insert(key.clone(), slot);
    Ok(value)
  }

  /// Reloads `key` from disk if it has an in-memory entry, present or absent.
  pub(crate) fn refresh_locked(&self, key: &K) -> Result<()> {
    if !self.table.contains_key(key) {
      return Ok(());
    }
    let slot = self.load_from_disk(key)?;
    self.logging.trace(format_args!(
      "Refreshed {:?}: {:?}",
      key, slot
    ));
    self.table.insert(key.clone(), slot);
    self.metrics.refreshes.fetch_add(1, Ordering::Relaxed);
    Ok(())
  }

  pub(crate) fn erase_locked(&self, key: &K) -> bool {
    self.table.remove(key).is_some()
  }

  /// Writes every present entry to disk. The caller holds the collection lock.
  pub(crate) fn save_locked(&self) -> Result<()> {
    for (key, value) in self.table.present_entries() {
      self.logging.trace(format_args!("Saving object {:?}", key));
      self.write_to_disk(&key, &value)?;
      self.metrics.files_saved.fetch_add(1, Ordering::Relaxed);
    }
    Ok(())
  }

  /// Reads the file for `key`. A missing file yields a negative slot.
  pub(crate) fn load_from_disk(&self, key: &K) -> Result<Slot<V>> {
    let path = self.filename(key);
    self.logging.debug(format_args!(
      "{:?} not found in cache, loading from {}",
      key,
      path.display()
    ));

    let Some(mut reader) = self
      .disk
      .open_for_read(&path)
      .map_err(|e| CacheError::io(&path, e))?
    else {
      self.logging.debug(format_args!("{:?} does not exist on disk", key));
      return Ok(Slot::Absent);
    };

    let value = self
      .serialization
      .deserialize(&mut reader, &self.format)
      .map_err(|e| CacheError::serialization(&path, e))?;
    self.metrics.loads.fetch_add(1, Ordering::Relaxed);
    Ok(Slot::Present(Arc::new(value)))
  }

  /// Overwrites the file for `key` with `value`.
  pub(crate) fn write_to_disk(&self, key: &K, value: &V) -> Result<()> {
    let path = self.filename(key);
    self.logging.debug(format_args!(
      "Saving {:?} to {}",
      key,
      path.display()
    ));

    let mut writer = self
      .disk
      .open_for_write(&path)
      .map_err(|e| CacheError::io(&path, e))?;
    self.serialize_into(&mut writer, &path, value)
  }

  /// Serializes `value` into `writer` and flushes it.
  pub(crate) fn serialize_into<W: Write>(
    &self,
    writer: &mut W,
    path: &Path,
    value: &V,
  ) -> Result<()> {
    self
      .serialization
      .serialize(writer, value, &self.format)
      .map_err(|e| CacheError::serialization(path, e))?;
    writer.flush().map_err(|e| CacheError::io(path, e))
  }

  /// Creates the file for `key` holding `value`.
  ///
  /// Returns `Ok(false)` if the file already exists or its directory cannot
  /// be created; both cases are logged at error level.
  pub(crate) fn create_on_disk(&self, key: &K, path: &Path, value: &V) -> Result<bool> {
    if self.disk.exists(path) {
      self.logging.error(format_args!(
        "Already exists: {:?} at {}",
        key,
        path.display()
      ));
      return Ok(false);
    }

    if let Err(e) = self.disk.ensure_parent(path) {
      self.logging.error(format_args!(
        "Directory for {} cannot be created: {}",
        path.display(),
        e
      ));
      return Ok(false);
    }

    let mut writer = match self.disk.create_new(path) {
      Ok(writer) => writer,
      Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
        self.logging.error(format_args!(
          "Already exists: {:?} at {}",
          key,
          path.display()
        ));
        return Ok(false);
      }
      Err(e) => return Err(CacheError::io(path, e)),
    };

    if let Err(e) = self.serialize_into(&mut writer, path, value) {
      drop(writer);
      // Leave no half-written file behind to block the next create.
      if let Err(cleanup) = self.disk.remove_file(path) {
        self.logging.warn(format_args!(
          "Could not remove partial file {}: {}",
          path.display(),
          cleanup
        ));
      }
      return Err(e);
    }
    Ok(true)
  }
}

use crate::builder::CacheBuilder;
use crate::concurrency::{ConcurrencyPolicy, NoConcurrencyControl};
use crate::entry::Slot;
use crate::error::{CacheError, Result};
use crate::logging::{LogPolicy, TracingLog};
use crate::serialization::{SerializationPolicy, TextFormat};
use crate::shared::CacheShared;
use crate::MetricsSnapshot;

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// A thread-safe, synchronous, file-backed cache.
///
/// Each key maps to one file through the filename function given to the
/// builder. Values are loaded lazily on first access and kept in memory
/// until the cache is cleared or the key is erased. Absence is cached too:
/// a key whose file did not exist stays "not found" until [`refresh`] runs,
/// even if the file appears later.
///
/// Writes are write-behind: [`insert`] and [`update`] change memory only, and
/// [`save`] flushes every present entry. [`create`] and [`remove`] are the
/// only operations that touch disk immediately.
///
/// `Cache` is a cheap handle; clones share the same state.
///
/// [`refresh`]: Cache::refresh
/// [`insert`]: Cache::insert
/// [`update`]: Cache::update
/// [`save`]: Cache::save
/// [`create`]: Cache::create
/// [`remove`]: Cache::remove
pub struct Cache<K, V, S = TextFormat, L = TracingLog, C = NoConcurrencyControl> {
  pub(crate) shared: Arc<CacheShared<K, V, S, L, C>>,
}

impl<K, V, S, L, C> Clone for Cache<K, V, S, L, C> {
  fn clone(&self) -> Self {
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<K, V, S, L, C> fmt::Debug for Cache<K, V, S, L, C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Cache")
      .field("shared", &self.shared)
      .finish()
  }
}

impl<K, V> Cache<K, V> {
  /// Shorthand for [`CacheBuilder::new`].
  pub fn builder() -> CacheBuilder<K, V> {
    CacheBuilder::new()
  }
}

impl<K, V, S, L, C> Cache<K, V, S, L, C>
where
  K: Ord + Clone + fmt::Debug + Send + Sync,
  V: Send + Sync,
  S: SerializationPolicy<V>,
  L: LogPolicy,
  C: ConcurrencyPolicy<K>,
{
  pub fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics.snapshot()
  }

  /// The file backing `key`.
  pub fn filename(&self, key: &K) -> PathBuf {
    self.shared.filename(key)
  }

  /// The format tag handed to the serialization policy.
  pub fn format(&self) -> &str {
    &self.shared.format
  }

  /// Returns the value for `key`, reading its file the first time the key is
  /// seen.
  ///
  /// Returns `Ok(None)` if the file did not exist when the key was first
  /// looked up. The returned `Arc` is a snapshot: later `update` calls
  /// replace the cached value without touching it.
  pub fn lookup(&self, key: &K) -> Result<Option<Arc<V>>> {
    let _guard = self.shared.concurrency.lock_entry(key);
    self.shared.lookup_locked(key)
  }

  /// Places `value` in memory for `key`, replacing any previous entry.
  ///
  /// Nothing is written until the next [`save`](Cache::save).
  pub fn insert(&self, key: K, value: V) {
    let _guard = self.shared.concurrency.lock_entry(&key);
    self.shared.table.insert(key, Slot::Present(Arc::new(value)));
    self.shared.metrics.inserts.fetch_add(1, Ordering::Relaxed);
  }

  /// Writes `value` to a new file for `key`.
  ///
  /// Returns `Ok(false)` without changing anything if the file already
  /// exists or its directory cannot be created. On success an existing
  /// in-memory entry for `key` (present or negative) is reloaded from the
  /// new file; a key never seen before stays out of memory.
  pub fn create(&self, key: K, value: &V) -> Result<bool> {
    let _guard = self.shared.concurrency.lock_entry(&key);
    let path = self.shared.filename(&key);

    if !self.shared.create_on_disk(&key, &path, value)? {
      return Ok(false);
    }
    self.shared.refresh_locked(&key)?;

    self.shared.logging.info(format_args!(
      "Created {:?} at {}",
      key,
      path.display()
    ));
    self.shared.metrics.creates.fetch_add(1, Ordering::Relaxed);
    Ok(true)
  }

  /// Moves the file for `key` into the trash tree and drops its entry.
  ///
  /// Earlier removals of the same key are kept: a repeat removal lands next
  /// to them with a `.1`, `.2`, ... suffix.
  ///
  /// Returns `Ok(false)` if there is no file, leaving memory untouched.
  pub fn remove(&self, key: &K) -> Result<bool> {
    let _guard = self.shared.concurrency.lock_entry(key);
    let path = self.shared.filename(key);

    if !self.shared.disk.exists(&path) {
      self.shared.logging.info(format_args!(
        "Nothing to remove for {:?}: {} does not exist",
        key,
        path.display()
      ));
      return Ok(false);
    }

    let trash = self.shared.disk.trash_path(&path);
    let trash = self
      .shared
      .disk
      .move_to_trash(&path, &trash)
      .map_err(|e| CacheError::io(&path, e))?;
    self.shared.erase_locked(key);

    self.shared.logging.info(format_args!(
      "Removed {:?}: {} moved to {}",
      key,
      path.display(),
      trash.display()
    ));
    self.shared.metrics.removes.fetch_add(1, Ordering::Relaxed);
    Ok(true)
  }

  /// Reloads `key` from disk if it has an in-memory entry.
  ///
  /// This is the only way to clear a negative entry other than `erase`.
  pub fn refresh(&self, key: &K) -> Result<()> {
    let _guard = self.shared.concurrency.lock_entry(key);
    self.shared.refresh_locked(key)
  }

  /// Writes every present entry to its file. Negative entries are skipped.
  pub fn save(&self) -> Result<()> {
    let _guard = self.shared.concurrency.lock_all();
    self.shared.save_locked()
  }

  /// Saves, then drops every entry.
  ///
  /// If saving fails the table is left as it was.
  pub fn clear(&self) -> Result<()> {
    let _guard = self.shared.concurrency.lock_all();
    self.save()?;
    self.force_clear();
    Ok(())
  }

  /// Drops every entry without saving. Unsaved changes are lost.
  pub fn force_clear(&self) {
    let _guard = self.shared.concurrency.lock_all();
    let dropped = self.shared.table.clear();
    self
      .shared
      .logging
      .debug(format_args!("Dropped {} entries", dropped));
  }

  /// Drops the entry for `key` from memory only. The file is untouched, so
  /// the next lookup reads it again.
  ///
  /// Returns whether there was an entry.
  pub fn erase(&self, key: &K) -> bool {
    let _guard = self.shared.concurrency.lock_entry(key);
    self.shared.erase_locked(key)
  }

  /// Applies `f` to a copy of the value for `key` and stores the result.
  ///
  /// Loads the value first if needed. Returns `Ok(false)` if there is no
  /// value. The change stays in memory until [`save`](Cache::save).
  ///
  /// `f` runs while the entry lock for `key` is held. Under
  /// [`EntryLocking`](crate::EntryLocking) it must not call back into this
  /// cache at all: an operation on the same key waits on that lock, and
  /// `save`, `clear` and `force_clear` wait on every known key's lock, so
  /// either deadlocks the calling thread.
  pub fn update<F>(&self, key: &K, f: F) -> Result<bool>
  where
    V: Clone,
    F: FnOnce(&mut V),
  {
    let _guard = self.shared.concurrency.lock_entry(key);
    let Some(current) = self.shared.lookup_locked(key)? else {
      self
        .shared
        .logging
        .debug(format_args!("Cannot update {:?}: not found", key));
      return Ok(false);
    };

    let mut value = V::clone(&current);
    drop(current);
    f(&mut value);
    self
      .shared
      .table
      .insert(key.clone(), Slot::Present(Arc::new(value)));
    self.shared.metrics.updates.fetch_add(1, Ordering::Relaxed);
    Ok(true)
  }

  /// Calls `f` with the value for `key`, loading it first if needed.
  ///
  /// Returns `(false, T::default())` if there is no value. The same
  /// re-entrancy rule as [`update`](Cache::update) applies to `f`.
  pub fn read<F, T>(&self, key: &K, f: F) -> Result<(bool, T)>
  where
    F: FnOnce(&V) -> T,
    T: Default,
  {
    let _guard = self.shared.concurrency.lock_entry(key);
    match self.shared.lookup_locked(key)? {
      Some(value) => Ok((true, f(&value))),
      None => {
        self
          .shared
          .logging
          .debug(format_args!("Cannot read {:?}: not found", key));
        Ok((false, T::default()))
      }
    }
  }

  /// Whether `key` has an in-memory entry, present or negative. Never reads
  /// from disk.
  pub fn contains_key(&self, key: &K) -> bool {
    self.shared.table.contains_key(key)
  }

  /// The number of in-memory entries, negative entries included.
  pub fn len(&self) -> usize {
    self.shared.table.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The keys held in memory, in ascending order.
  pub fn keys(&self) -> Vec<K> {
    self.shared.table.keys()
  }
}

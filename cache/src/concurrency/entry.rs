use crate::concurrency::ConcurrencyPolicy;
use crate::sync::{OwnedLockGuard, RawLock};

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};

/// A concurrency policy that locks the cache at the entry level.
///
/// Each key gets its own lock, created the first time the key is locked and
/// kept for the lifetime of the policy. Readers and writers are not
/// distinguished.
///
/// The collection lock is a two-phase protocol:
///
/// 1. Acquire the collection's own re-entrant exclusion primitive.
/// 2. Snapshot the per-key lock table and acquire every lock in it, in
///    ascending key order.
///
/// Release happens in reverse: per-key locks in descending key order, then
/// the exclusion primitive.
///
/// # Known race
///
/// A key whose lock is created after step 2 takes its snapshot is not covered
/// by that collection lock. `lock_all` only excludes keys that were known when
/// it started acquiring.
pub struct EntryLocking<K, R: RawLock = parking_lot::RawMutex> {
  /// Per-key locks. This mutex only guards the map itself and is never held
  /// while waiting on one of the locks it contains.
  entries: Mutex<BTreeMap<K, Arc<R>>>,
  /// The collection exclusion primitive. The cell counts how many collection
  /// guards the owning thread currently holds.
  collection: ReentrantMutex<Cell<usize>>,
}

impl<K, R: RawLock> fmt::Debug for EntryLocking<K, R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("EntryLocking")
      .field("tracked_keys", &self.entries.lock().len())
      .finish_non_exhaustive()
  }
}

impl<K, R: RawLock> Default for EntryLocking<K, R> {
  fn default() -> Self {
    Self {
      entries: Mutex::new(BTreeMap::new()),
      collection: ReentrantMutex::new(Cell::new(0)),
    }
  }
}

impl<K> EntryLocking<K> {
  /// Creates an entry-locking policy backed by `parking_lot` mutexes.
  pub fn new() -> Self {
    Self::default()
  }
}

impl<K, R: RawLock> EntryLocking<K, R> {
  /// Returns how many keys currently have a lock in the table.
  pub fn tracked_keys(&self) -> usize {
    self.entries.lock().len()
  }
}

impl<K, R> ConcurrencyPolicy<K> for EntryLocking<K, R>
where
  K: Ord + Clone + Send,
  R: RawLock,
{
  type EntryGuard<'a> = OwnedLockGuard<R> where Self: 'a;
  type CollectionGuard<'a> = CollectionLockGuard<'a, R> where Self: 'a;

  fn lock_entry(&self, key: &K) -> Self::EntryGuard<'_> {
    let lock = {
      let mut entries = self.entries.lock();
      match entries.get(key) {
        Some(lock) => lock.clone(),
        None => {
          let lock = Arc::new(R::new());
          entries.insert(key.clone(), lock.clone());
          lock
        }
      }
    }; // Table lock is dropped here, before blocking on the entry.

    OwnedLockGuard::acquire(lock)
  }

  fn lock_all(&self) -> Self::CollectionGuard<'_> {
    let depth = self.collection.lock();
    let outermost = depth.get() == 0;
    depth.set(depth.get() + 1);

    let held = if outermost {
      let snapshot: Vec<Arc<R>> = self.entries.lock().values().cloned().collect();
      snapshot.into_iter().map(OwnedLockGuard::acquire).collect()
    } else {
      // The outermost guard on this thread already holds every entry lock.
      Vec::new()
    };

    CollectionLockGuard { held, depth }
  }
}

/// The guard returned by [`EntryLocking::lock_all`].
#[must_use = "the collection lock is released as soon as the guard is dropped"]
pub struct CollectionLockGuard<'a, R: RawLock> {
  held: Vec<OwnedLockGuard<R>>,
  depth: ReentrantMutexGuard<'a, Cell<usize>>,
}

impl<'a, R: RawLock> fmt::Debug for CollectionLockGuard<'a, R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CollectionLockGuard")
      .field("entry_locks", &self.held.len())
      .field("depth", &self.depth.get())
      .finish()
  }
}

impl<'a, R: RawLock> Drop for CollectionLockGuard<'a, R> {
  fn drop(&mut self) {
    while let Some(entry_guard) = self.held.pop() {
      drop(entry_guard);
    }
    self.depth.set(self.depth.get() - 1);
    // `depth` itself drops after this, releasing the exclusion primitive last.
  }
}

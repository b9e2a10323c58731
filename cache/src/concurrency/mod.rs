pub mod entry;
pub mod null;

pub use entry::{CollectionLockGuard, EntryLocking};
pub use null::NoConcurrencyControl;

/// A strategy deciding how much mutual exclusion the cache enforces.
///
/// The cache brackets every single-key operation with [`lock_entry`] and
/// every whole-table operation (`save`, `clear`, `force_clear`) with
/// [`lock_all`]. Both methods return guards that are already acquired and
/// release on drop.
///
/// [`lock_entry`]: ConcurrencyPolicy::lock_entry
/// [`lock_all`]: ConcurrencyPolicy::lock_all
pub trait ConcurrencyPolicy<K>: Send + Sync {
  /// Guard held for the duration of a single-key operation.
  type EntryGuard<'a>
  where
    Self: 'a;

  /// Guard held for the duration of a whole-collection operation.
  type CollectionGuard<'a>
  where
    Self: 'a;

  /// Acquires the lock scoped to `key`.
  ///
  /// Locks for distinct keys must be independent: holding the lock for one
  /// key never blocks acquiring the lock for another.
  fn lock_entry(&self, key: &K) -> Self::EntryGuard<'_>;

  /// Acquires the lock scoped to the whole cache.
  ///
  /// Must be re-entrant: a thread already holding the collection lock gets a
  /// second guard immediately instead of deadlocking on itself.
  fn lock_all(&self) -> Self::CollectionGuard<'_>;
}

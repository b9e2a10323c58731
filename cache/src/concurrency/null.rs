use crate::concurrency::ConcurrencyPolicy;
use crate::sync::{LockGuard, NoOpMutex};

/// A default "no-op" concurrency policy for single-threaded use.
/// Every lock it hands out is the same [`NoOpMutex`], so nothing ever blocks.
///
/// A cache built with this policy is still memory-safe to share between
/// threads, but compound operations on the same key may interleave: two
/// concurrent `update` calls can lose one of the mutations.
#[derive(Debug, Default)]
pub struct NoConcurrencyControl {
  mutex: NoOpMutex,
}

impl NoConcurrencyControl {
  pub fn new() -> Self {
    Self::default()
  }
}

impl<K> ConcurrencyPolicy<K> for NoConcurrencyControl {
  type EntryGuard<'a> = LockGuard<'a, NoOpMutex>;
  type CollectionGuard<'a> = LockGuard<'a, NoOpMutex>;

  fn lock_entry(&self, _key: &K) -> Self::EntryGuard<'_> {
    LockGuard::acquire(&self.mutex)
  }

  fn lock_all(&self) -> Self::CollectionGuard<'_> {
    LockGuard::acquire(&self.mutex)
  }
}

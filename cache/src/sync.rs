use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

// Guards must be released on the thread that acquired them.
type NotSend = PhantomData<*const ()>;

/// The lockable primitive underneath every entry and collection lock.
///
/// Unlike `lock_api::RawMutex`, implementors are not required to provide real
/// exclusion: [`NoOpMutex`] satisfies this trait while doing nothing at all.
/// For that reason the trait never guards data directly, it only brackets
/// critical sections through [`LockGuard`] and [`OwnedLockGuard`].
pub trait RawLock: Send + Sync {
  /// Creates a new lock in the unlocked state.
  fn new() -> Self
  where
    Self: Sized;

  /// Blocks until the lock is acquired.
  fn lock(&self);

  /// Releases the lock.
  ///
  /// # Safety
  ///
  /// The lock must currently be held by the caller.
  unsafe fn unlock(&self);
}

impl RawLock for parking_lot::RawMutex {
  fn new() -> Self {
    <parking_lot::RawMutex as parking_lot::lock_api::RawMutex>::INIT
  }

  #[inline]
  fn lock(&self) {
    parking_lot::lock_api::RawMutex::lock(self);
  }

  #[inline]
  unsafe fn unlock(&self) {
    parking_lot::lock_api::RawMutex::unlock(self);
  }
}

/// A lock that imposes no synchronization.
///
/// This is what [`NoConcurrencyControl`](crate::concurrency::NoConcurrencyControl)
/// hands out: single-threaded users pay nothing for locking.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMutex;

impl RawLock for NoOpMutex {
  fn new() -> Self {
    NoOpMutex
  }

  #[inline]
  fn lock(&self) {}

  #[inline]
  unsafe fn unlock(&self) {}
}

/// An RAII guard over a borrowed [`RawLock`]. The lock is released on drop.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard<'a, R: RawLock> {
  lock: &'a R,
  _marker: NotSend,
}

impl<'a, R: RawLock> LockGuard<'a, R> {
  /// Blocks until `lock` is acquired and returns a guard owning that acquisition.
  pub fn acquire(lock: &'a R) -> Self {
    lock.lock();
    Self {
      lock,
      _marker: PhantomData,
    }
  }
}

impl<'a, R: RawLock> Drop for LockGuard<'a, R> {
  fn drop(&mut self) {
    // SAFETY: the guard is only constructed by `acquire`, which locked it.
    unsafe { self.lock.unlock() };
  }
}

impl<'a, R: RawLock> fmt::Debug for LockGuard<'a, R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LockGuard").finish_non_exhaustive()
  }
}

/// An RAII guard that shares ownership of its lock.
///
/// Entry locks live in a table that may be mutated while the guard is held,
/// so the guard keeps the lock alive through an `Arc` instead of a borrow.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct OwnedLockGuard<R: RawLock> {
  lock: Arc<R>,
  _marker: NotSend,
}

impl<R: RawLock> OwnedLockGuard<R> {
  /// Blocks until `lock` is acquired.
  pub fn acquire(lock: Arc<R>) -> Self {
    lock.lock();
    Self {
      lock,
      _marker: PhantomData,
    }
  }
}

impl<R: RawLock> Drop for OwnedLockGuard<R> {
  fn drop(&mut self) {
    // SAFETY: the guard is only constructed by `acquire`, which locked it.
    unsafe { self.lock.unlock() };
  }
}

impl<R: RawLock> fmt::Debug for OwnedLockGuard<R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("OwnedLockGuard").finish_non_exhaustive()
  }
}

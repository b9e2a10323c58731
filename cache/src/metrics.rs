use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// A thread-safe, internal metrics collector for the cache.
/// All fields are atomic to allow for lock-free updates.
#[derive(Debug)]
pub(crate) struct Metrics {
  // --- Lookups ---
  pub(crate) hits: CachePadded<AtomicU64>,
  pub(crate) negative_hits: CachePadded<AtomicU64>,
  pub(crate) misses: CachePadded<AtomicU64>,
  pub(crate) loads: CachePadded<AtomicU64>,

  // --- Mutations ---
  pub(crate) inserts: CachePadded<AtomicU64>,
  pub(crate) updates: CachePadded<AtomicU64>,
  pub(crate) refreshes: CachePadded<AtomicU64>,

  // --- Disk ---
  pub(crate) creates: CachePadded<AtomicU64>,
  pub(crate) removes: CachePadded<AtomicU64>,
  pub(crate) files_saved: CachePadded<AtomicU64>,

  created_at: Instant,
}

impl Default for Metrics {
  fn default() -> Self {
    Self {
      hits: CachePadded::new(AtomicU64::new(0)),
      negative_hits: CachePadded::new(AtomicU64::new(0)),
      misses: CachePadded::new(AtomicU64::new(0)),
      loads: CachePadded::new(AtomicU64::new(0)),
      inserts: CachePadded::new(AtomicU64::new(0)),
      updates: CachePadded::new(AtomicU64::new(0)),
      refreshes: CachePadded::new(AtomicU64::new(0)),
      creates: CachePadded::new(AtomicU64::new(0)),
      removes: CachePadded::new(AtomicU64::new(0)),
      files_saved: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Creates a point-in-time snapshot of the current metrics.
  pub(crate) fn snapshot(&self) -> MetricsSnapshot {
    let hits = self.hits.load(Ordering::Relaxed);
    let negative_hits = self.negative_hits.load(Ordering::Relaxed);
    let misses = self.misses.load(Ordering::Relaxed);
    let total_lookups = hits + negative_hits + misses;

    MetricsSnapshot {
      hits,
      negative_hits,
      misses,
      hit_ratio: if total_lookups == 0 {
        0.0
      } else {
        (hits + negative_hits) as f64 / total_lookups as f64
      },
      loads: self.loads.load(Ordering::Relaxed),
      inserts: self.inserts.load(Ordering::Relaxed),
      updates: self.updates.load(Ordering::Relaxed),
      refreshes: self.refreshes.load(Ordering::Relaxed),
      creates: self.creates.load(Ordering::Relaxed),
      removes: self.removes.load(Ordering::Relaxed),
      files_saved: self.files_saved.load(Ordering::Relaxed),
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

/// A point-in-time, public-facing snapshot of the cache's metrics.
#[derive(Clone)]
pub struct MetricsSnapshot {
  /// Lookups answered by a present in-memory entry.
  pub hits: u64,
  /// Lookups answered by a negative (absent) in-memory entry.
  pub negative_hits: u64,
  /// Lookups that had to go to disk.
  pub misses: u64,
  /// The share of lookups answered from memory, negative entries included.
  pub hit_ratio: f64,
  /// Disk reads that found a file and produced a value.
  pub loads: u64,
  /// Values placed in memory with `insert`.
  pub inserts: u64,
  /// Successful `update` calls.
  pub updates: u64,
  /// Entries reloaded by `refresh` (including the refresh inside `create`).
  pub refreshes: u64,
  /// Successful `create` calls.
  pub creates: u64,
  /// Successful `remove` calls.
  pub removes: u64,
  /// Files written by `save`, summed over every call.
  pub files_saved: u64,
  /// The number of seconds the cache has been running.
  pub uptime_secs: u64,
}

impl fmt::Debug for MetricsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MetricsSnapshot")
      .field("hits", &self.hits)
      .field("negative_hits", &self.negative_hits)
      .field("misses", &self.misses)
      .field("hit_ratio", &format!("{:.2}%", self.hit_ratio * 100.0))
      .field("loads", &self.loads)
      .field("inserts", &self.inserts)
      .field("updates", &self.updates)
      .field("refreshes", &self.refreshes)
      .field("creates", &self.creates)
      .field("removes", &self.removes)
      .field("files_saved", &self.files_saved)
      .field("uptime_secs", &self.uptime_secs)
      .finish()
  }
}

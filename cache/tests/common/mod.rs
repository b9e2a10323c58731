#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use fibre_disk_cache::{
  Cache, CacheBuilder, EntryLocking, FilenameLayout, Level, LogPolicy, NoConcurrencyControl,
  TextFormat,
};
use parking_lot::Mutex;
use tempfile::TempDir;

pub const FILE_NAME: &str = "value.txt";

/// A logging policy that keeps every record so tests can assert on it.
#[derive(Default)]
pub struct RecordingLog {
  records: Mutex<Vec<(Level, String)>>,
}

impl RecordingLog {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn records(&self) -> Vec<(Level, String)> {
    self.records.lock().clone()
  }

  /// Whether any record at `level` contains `needle`.
  pub fn contains(&self, level: Level, needle: &str) -> bool {
    self
      .records
      .lock()
      .iter()
      .any(|(l, msg)| *l == level && msg.contains(needle))
  }
}

impl LogPolicy for RecordingLog {
  fn log(&self, level: Level, args: std::fmt::Arguments<'_>) {
    self.records.lock().push((level, args.to_string()));
  }
}

pub type TextCache = Cache<u32, String, TextFormat, Arc<RecordingLog>, NoConcurrencyControl>;
pub type LockingCache = Cache<u32, String, TextFormat, Arc<RecordingLog>, EntryLocking<u32>>;

pub fn layout(root: &Path) -> FilenameLayout {
  FilenameLayout::new(root.join("data"), FILE_NAME)
}

// Helper to build a single-threaded cache over `root/data/<key>/value.txt`.
pub fn build_text_cache(root: &Path, log: Arc<RecordingLog>) -> TextCache {
  CacheBuilder::new()
    .layout(layout(root))
    .logging(log)
    .build()
    .unwrap()
}

pub fn build_locking_cache(root: &Path, log: Arc<RecordingLog>) -> LockingCache {
  CacheBuilder::new()
    .layout(layout(root))
    .logging(log)
    .entry_locking()
    .build()
    .unwrap()
}

pub fn temp_root() -> TempDir {
  tempfile::tempdir().unwrap()
}

/// Writes `content` to the file for `key` without going through a cache.
pub fn write_out_of_band(root: &Path, key: u32, content: &str) {
  let path = layout(root).path_for(&key);
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(path, content).unwrap();
}

pub fn read_on_disk(root: &Path, key: u32) -> Option<String> {
  std::fs::read_to_string(layout(root).path_for(&key)).ok()
}

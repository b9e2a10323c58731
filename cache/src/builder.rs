use crate::concurrency::{ConcurrencyPolicy, EntryLocking, NoConcurrencyControl};
use crate::disk::{DiskManager, DEFAULT_TRASH_DIR_NAME};
use crate::error::BuildError;
use crate::handles::Cache;
use crate::layout::FilenameLayout;
use crate::logging::{LogPolicy, TracingLog};
use crate::metrics::Metrics;
use crate::serialization::{SerializationPolicy, TextFormat};
use crate::shared::{CacheShared, FilenameFn};
use crate::store::EntryTable;

use core::fmt;
use std::fmt::Display;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

/// The format tag used when none is configured.
pub const DEFAULT_FORMAT: &str = "text";

/// A builder for creating [`Cache`] instances.
///
/// The three policy parameters start at their single-threaded, zero-config
/// defaults: [`TextFormat`], [`TracingLog`] and [`NoConcurrencyControl`].
/// Each setter swaps in a different policy type.
pub struct CacheBuilder<K, V, S = TextFormat, L = TracingLog, C = NoConcurrencyControl> {
  filename_fn: Option<FilenameFn<K>>,
  format: String,
  trash_dir_name: String,
  serialization: S,
  logging: L,
  concurrency: C,
  _value_marker: PhantomData<fn() -> V>,
}

// Manual Debug implementation for CacheBuilder.
impl<K, V, S, L, C> fmt::Debug for CacheBuilder<K, V, S, L, C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("has_filename_fn", &self.filename_fn.is_some())
      .field("format", &self.format)
      .field("trash_dir_name", &self.trash_dir_name)
      .finish_non_exhaustive()
  }
}

impl<K, V> CacheBuilder<K, V> {
  /// Creates a new `CacheBuilder` with default policies.
  pub fn new() -> Self {
    Self {
      filename_fn: None,
      format: DEFAULT_FORMAT.to_string(),
      trash_dir_name: DEFAULT_TRASH_DIR_NAME.to_string(),
      serialization: TextFormat,
      logging: TracingLog,
      concurrency: NoConcurrencyControl::new(),
      _value_marker: PhantomData,
    }
  }
}

impl<K, V> Default for CacheBuilder<K, V> {
  fn default() -> Self {
    Self::new()
  }
}

// --- General Configuration Methods ---
// This impl block has no restrictive bounds on K or V.
impl<K, V, S, L, C> CacheBuilder<K, V, S, L, C> {
  /// Sets the function that produces the file path for a key.
  ///
  /// The function must be pure and total: the same key always maps to the
  /// same path, and every key maps to some path.
  pub fn filename_fn<F>(mut self, f: F) -> Self
  where
    F: Fn(&K) -> PathBuf + Send + Sync + 'static,
  {
    self.filename_fn = Some(Arc::new(f));
    self
  }

  /// Uses the `<root>/<key>/<file_name>` layout as the filename function.
  pub fn layout(self, layout: FilenameLayout) -> Self
  where
    K: Display,
  {
    self.filename_fn(move |key| layout.path_for(key))
  }

  /// Sets the format tag forwarded to the serialization policy.
  pub fn format(mut self, format: impl Into<String>) -> Self {
    self.format = format.into();
    self
  }

  /// Sets the name of the directory `remove` moves files into.
  pub fn trash_dir_name(mut self, name: impl Into<String>) -> Self {
    self.trash_dir_name = name.into();
    self
  }

  /// Replaces the serialization policy.
  pub fn serialization<S2>(self, serialization: S2) -> CacheBuilder<K, V, S2, L, C> {
    CacheBuilder {
      filename_fn: self.filename_fn,
      format: self.format,
      trash_dir_name: self.trash_dir_name,
      serialization,
      logging: self.logging,
      concurrency: self.concurrency,
      _value_marker: PhantomData,
    }
  }

  /// Replaces the logging policy.
  pub fn logging<L2>(self, logging: L2) -> CacheBuilder<K, V, S, L2, C> {
    CacheBuilder {
      filename_fn: self.filename_fn,
      format: self.format,
      trash_dir_name: self.trash_dir_name,
      serialization: self.serialization,
      logging,
      concurrency: self.concurrency,
      _value_marker: PhantomData,
    }
  }

  /// Replaces the concurrency policy.
  pub fn concurrency<C2>(self, concurrency: C2) -> CacheBuilder<K, V, S, L, C2> {
    CacheBuilder {
      filename_fn: self.filename_fn,
      format: self.format,
      trash_dir_name: self.trash_dir_name,
      serialization: self.serialization,
      logging: self.logging,
      concurrency,
      _value_marker: PhantomData,
    }
  }

  /// Shorthand for `.concurrency(EntryLocking::new())`.
  pub fn entry_locking(self) -> CacheBuilder<K, V, S, L, EntryLocking<K>> {
    self.concurrency(EntryLocking::new())
  }

  /// Validates the builder's configuration.
  fn validate(&self) -> Result<(), BuildError> {
    if self.filename_fn.is_none() {
      return Err(BuildError::MissingFilenameFn);
    }
    if self.format.is_empty() {
      return Err(BuildError::EmptyFormat);
    }
    let trash = &self.trash_dir_name;
    if trash.is_empty() || trash.contains(&['/', '\\'][..]) || trash == "." || trash == ".." {
      return Err(BuildError::InvalidTrashDirName(trash.clone()));
    }
    Ok(())
  }
}

// --- Build Method ---
impl<K, V, S, L, C> CacheBuilder<K, V, S, L, C>
where
  K: Ord + Clone + fmt::Debug + Send + Sync,
  V: Send + Sync,
  S: SerializationPolicy<V>,
  L: LogPolicy,
  C: ConcurrencyPolicy<K>,
{
  /// Builds a [`Cache`].
  pub fn build(self) -> Result<Cache<K, V, S, L, C>, BuildError> {
    self.validate()?;
    let filename_fn = self.filename_fn.ok_or(BuildError::MissingFilenameFn)?;

    let shared = CacheShared {
      table: EntryTable::new(),
      filename_fn,
      serialization: self.serialization,
      logging: self.logging,
      concurrency: self.concurrency,
      format: self.format,
      disk: DiskManager::new(self.trash_dir_name),
      metrics: Metrics::new(),
    };

    Ok(Cache {
      shared: Arc::new(shared),
    })
  }
}

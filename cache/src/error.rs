use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur when building a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
  /// No filename function was supplied. Every operation needs one to locate
  /// the file backing a key.
  MissingFilenameFn,
  /// The format tag was empty.
  EmptyFormat,
  /// The trash directory name was empty or contained a path separator.
  InvalidTrashDirName(String),
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::MissingFilenameFn => write!(f, "a filename function is required"),
      BuildError::EmptyFormat => write!(f, "the format tag cannot be empty"),
      BuildError::InvalidTrashDirName(name) => {
        write!(f, "'{}' is not a valid trash directory name", name)
      }
    }
  }
}

impl std::error::Error for BuildError {}

/// Errors surfaced by cache operations.
///
/// Conditions the cache detects itself (duplicate create, missing target on
/// remove, directory creation failure) are not errors: they are reported as
/// `Ok(false)` plus a log line. This type only carries failures from the
/// filesystem and from the serialization policy.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
  #[error("I/O failure on {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The serialization policy failed. `source` is the policy's own error,
  /// boxed but otherwise untouched.
  #[error("serialization failure on {}: {source}", .path.display())]
  Serialization {
    path: PathBuf,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl CacheError {
  pub(crate) fn io(path: &Path, source: io::Error) -> Self {
    CacheError::Io {
      path: path.to_path_buf(),
      source,
    }
  }

  pub(crate) fn serialization<E>(path: &Path, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    CacheError::Serialization {
      path: path.to_path_buf(),
      source: Box::new(source),
    }
  }

  /// The file the failing operation was working on.
  pub fn path(&self) -> &Path {
    match self {
      CacheError::Io { path, .. } | CacheError::Serialization { path, .. } => path,
    }
  }
}

/// A specialized `Result` type for cache operations.
pub type Result<T, E = CacheError> = std::result::Result<T, E>;

use std::fmt::Display;
use std::path::{Path, PathBuf};

/// The conventional one-directory-per-key layout: `<root>/<key>/<file_name>`.
///
/// Pass it to [`CacheBuilder::layout`](crate::CacheBuilder::layout) instead of
/// writing a filename function by hand. Keys are rendered with `Display`, so
/// they should not contain path separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameLayout {
  root: PathBuf,
  file_name: String,
}

impl FilenameLayout {
  pub fn new(root: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
    Self {
      root: root.into(),
      file_name: file_name.into(),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn file_name(&self) -> &str {
    &self.file_name
  }

  /// The file backing `key`.
  pub fn path_for<K: Display + ?Sized>(&self, key: &K) -> PathBuf {
    self.root.join(key.to_string()).join(&self.file_name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn key_gets_its_own_directory() {
    let layout = FilenameLayout::new("/var/lib/app", "value.json");
    assert_eq!(
      layout.path_for(&17),
      PathBuf::from("/var/lib/app/17/value.json")
    );
    assert_eq!(layout.root(), Path::new("/var/lib/app"));
    assert_eq!(layout.file_name(), "value.json");
  }
}

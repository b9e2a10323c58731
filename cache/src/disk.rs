use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter};
use std::path::{Component, Path, PathBuf};

/// The default name of the trash directory used by `remove`.
pub const DEFAULT_TRASH_DIR_NAME: &str = "trash";

/// [`DiskManager`] holds every filesystem call the cache makes.
#[derive(Debug, Clone)]
pub(crate) struct DiskManager {
  trash_dir_name: String,
}

impl DiskManager {
  pub(crate) fn new(trash_dir_name: String) -> Self {
    Self { trash_dir_name }
  }

  pub(crate) fn exists(&self, path: &Path) -> bool {
    path.exists()
  }

  /// Creates every missing directory above `path`.
  pub(crate) fn ensure_parent(&self, path: &Path) -> io::Result<()> {
    match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
      _ => Ok(()),
    }
  }

  /// Opens `path` for reading. A missing file is `Ok(None)`, not an error.
  pub(crate) fn open_for_read(&self, path: &Path) -> io::Result<Option<BufReader<File>>> {
    match File::open(path) {
      Ok(file) => Ok(Some(BufReader::new(file))),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e),
    }
  }

  /// Creates `path`, failing with `AlreadyExists` if it is already there.
  pub(crate) fn create_new(&self, path: &Path) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new().write(true).create_new(true).open(path)?;
    Ok(BufWriter::new(file))
  }

  /// Opens `path` for writing, truncating it, and creating it along with any
  /// missing parent directories.
  pub(crate) fn open_for_write(&self, path: &Path) -> io::Result<BufWriter<File>> {
    self.ensure_parent(path)?;
    let file = OpenOptions::new()
      .write(true)
      .create(true)
      .truncate(true)
      .open(path)?;
    Ok(BufWriter::new(file))
  }

  pub(crate) fn remove_file(&self, path: &Path) -> io::Result<()> {
    fs::remove_file(path)
  }

  /// Where `remove` moves the file at `path`.
  ///
  /// The trash directory sits next to the entry's parent directory, and the
  /// full path of the entry is mirrored beneath it with any root or prefix
  /// stripped:
  ///
  /// `/srv/data/42/value.txt` -> `/srv/data/trash/srv/data/42/value.txt`
  pub(crate) fn trash_path(&self, path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new(""));
    let grandparent = parent.parent().unwrap_or(Path::new(""));

    let mirrored: PathBuf = path
      .components()
      .filter_map(|component| match component {
        Component::Normal(part) => Some(part),
        _ => None,
      })
      .collect();

    grandparent.join(&self.trash_dir_name).join(mirrored)
  }

  /// Moves `path` to `trash`, creating the trash directories first, and
  /// returns where the file landed.
  ///
  /// An earlier removal of the same entry is never overwritten: if `trash` is
  /// taken the file goes to `trash.1`, `trash.2` and so on.
  pub(crate) fn move_to_trash(&self, path: &Path, trash: &Path) -> io::Result<PathBuf> {
    if let Some(trash_parent) = trash.parent() {
      if !trash_parent.exists() {
        fs::create_dir_all(trash_parent)?;
      }
    }
    let target = free_trash_slot(trash);
    fs::rename(path, &target)?;
    Ok(target)
  }
}

fn free_trash_slot(trash: &Path) -> PathBuf {
  if !trash.exists() {
    return trash.to_path_buf();
  }
  let mut generation: u64 = 1;
  loop {
    let mut name = trash.as_os_str().to_owned();
    name.push(format!(".{}", generation));
    let candidate = PathBuf::from(name);
    if !candidate.exists() {
      return candidate;
    }
    generation += 1;
  }
}

mod common;

use common::*;
use fibre_disk_cache::{Cache, Level};
use pretty_assertions::assert_eq;

#[test]
fn test_lookup_of_unknown_key_is_not_found() {
  let root = temp_root();
  let log = RecordingLog::new();
  let cache = build_text_cache(root.path(), log.clone());

  assert_eq!(cache.lookup(&7).unwrap(), None);
  assert!(cache.contains_key(&7));
  assert!(!root.path().join("data").exists());
  assert!(log.contains(Level::DEBUG, "does not exist on disk"));

  let metrics = cache.metrics();
  assert_eq!(metrics.misses, 1);
  assert_eq!(metrics.loads, 0);
}

#[test]
fn test_lookup_reads_existing_file_once() {
  let root = temp_root();
  write_out_of_band(root.path(), 5, "five");
  let cache = build_text_cache(root.path(), RecordingLog::new());

  assert_eq!(cache.lookup(&5).unwrap().as_deref(), Some(&"five".to_string()));
  // Served from memory even after the file changes.
  write_out_of_band(root.path(), 5, "changed");
  assert_eq!(cache.lookup(&5).unwrap().as_deref(), Some(&"five".to_string()));

  let metrics = cache.metrics();
  assert_eq!(metrics.misses, 1);
  assert_eq!(metrics.hits, 1);
  assert_eq!(metrics.loads, 1);
}

#[test]
fn test_create_refresh_lookup() {
  let root = temp_root();
  let log = RecordingLog::new();
  let cache = build_text_cache(root.path(), log.clone());

  assert!(cache.create(4, &"four".to_string()).unwrap());
  assert_eq!(read_on_disk(root.path(), 4).as_deref(), Some("four"));
  // Never looked up before, so create does not pull it into memory.
  assert!(!cache.contains_key(&4));
  assert!(log.contains(Level::INFO, "Created 4"));

  cache.refresh(&4).unwrap();
  assert_eq!(cache.lookup(&4).unwrap().as_deref(), Some(&"four".to_string()));
  assert_eq!(cache.metrics().creates, 1);
}

#[test]
fn test_create_reloads_negative_entry() {
  let root = temp_root();
  let cache = build_text_cache(root.path(), RecordingLog::new());

  assert_eq!(cache.lookup(&9).unwrap(), None);
  assert!(cache.create(9, &"nine".to_string()).unwrap());
  assert_eq!(cache.lookup(&9).unwrap().as_deref(), Some(&"nine".to_string()));
}

#[test]
fn test_create_over_existing_file_fails() {
  let root = temp_root();
  write_out_of_band(root.path(), 2, "old");
  let log = RecordingLog::new();
  let cache = build_text_cache(root.path(), log.clone());

  assert!(!cache.create(2, &"two".to_string()).unwrap());
  assert_eq!(read_on_disk(root.path(), 2).as_deref(), Some("old"));
  assert!(!cache.contains_key(&2));
  assert!(log.contains(Level::ERROR, "Already exists"));
  assert_eq!(cache.metrics().creates, 0);
}

#[test]
fn test_create_fails_when_directory_cannot_be_made() {
  let root = temp_root();
  // A regular file where the key's directory should go.
  std::fs::create_dir_all(root.path().join("data")).unwrap();
  std::fs::write(root.path().join("data").join("3"), "in the way").unwrap();
  let log = RecordingLog::new();
  let cache = build_text_cache(root.path(), log.clone());

  assert!(!cache.create(3, &"three".to_string()).unwrap());
  assert!(log.contains(Level::ERROR, "cannot be created"));
}

#[test]
fn test_remove_moves_file_to_trash() {
  let root = temp_root();
  write_out_of_band(root.path(), 1, "one");
  let log = RecordingLog::new();
  let cache = build_text_cache(root.path(), log.clone());
  assert!(cache.lookup(&1).unwrap().is_some());

  let path = cache.filename(&1);
  assert!(cache.remove(&1).unwrap());

  assert!(!path.exists());
  assert!(!cache.contains_key(&1));
  let trash_root = root.path().join("data").join("trash");
  let mirrored: std::path::PathBuf = path
    .components()
    .filter_map(|c| match c {
      std::path::Component::Normal(part) => Some(part),
      _ => None,
    })
    .collect();
  assert_eq!(
    std::fs::read_to_string(trash_root.join(mirrored)).unwrap(),
    "one"
  );
  assert_eq!(cache.lookup(&1).unwrap(), None);
  assert!(log.contains(Level::INFO, "Removed 1"));
  assert_eq!(cache.metrics().removes, 1);
}

#[test]
fn test_remove_missing_file_leaves_table_alone() {
  let root = temp_root();
  let log = RecordingLog::new();
  let cache = build_text_cache(root.path(), log.clone());
  cache.insert(6, "six".to_string());

  assert!(!cache.remove(&6).unwrap());
  assert!(cache.contains_key(&6));
  assert!(log.contains(Level::INFO, "Nothing to remove"));
  assert_eq!(cache.metrics().removes, 0);
}

#[test]
fn test_insert_update_save_then_fresh_cache() {
  let root = temp_root();
  let cache = build_text_cache(root.path(), RecordingLog::new());

  cache.insert(1, "one".to_string());
  assert_eq!(cache.lookup(&1).unwrap().as_deref(), Some(&"one".to_string()));
  assert!(cache.update(&1, |v| v.push('!')).unwrap());
  assert_eq!(cache.lookup(&1).unwrap().as_deref(), Some(&"one!".to_string()));
  // Write-behind: nothing on disk yet.
  assert_eq!(read_on_disk(root.path(), 1), None);

  cache.save().unwrap();
  assert_eq!(read_on_disk(root.path(), 1).as_deref(), Some("one!"));

  let fresh = build_text_cache(root.path(), RecordingLog::new());
  assert_eq!(fresh.lookup(&1).unwrap().as_deref(), Some(&"one!".to_string()));
}

#[test]
fn test_update_keeps_previous_snapshot_intact() {
  let root = temp_root();
  let cache = build_text_cache(root.path(), RecordingLog::new());
  cache.insert(1, "a".to_string());

  let before = cache.lookup(&1).unwrap().unwrap();
  assert!(cache.update(&1, |v| v.push('b')).unwrap());

  assert_eq!(*before, "a");
  assert_eq!(*cache.lookup(&1).unwrap().unwrap(), "ab");
  assert_eq!(cache.metrics().updates, 1);
}

#[test]
fn test_erase_then_lookup_reloads_saved_content() {
  let root = temp_root();
  let cache = build_text_cache(root.path(), RecordingLog::new());
  cache.insert(3, "three".to_string());
  cache.save().unwrap();
  assert!(cache.update(&3, |v| v.push_str(" (unsaved)")).unwrap());

  assert!(cache.erase(&3));
  assert!(!cache.erase(&3));
  assert_eq!(
    cache.lookup(&3).unwrap().as_deref(),
    Some(&"three".to_string())
  );
}

#[test]
fn test_negative_entry_is_stale_until_refresh() {
  let root = temp_root();
  let cache = build_text_cache(root.path(), RecordingLog::new());

  assert_eq!(cache.lookup(&8).unwrap(), None);
  write_out_of_band(root.path(), 8, "eight");
  assert_eq!(cache.lookup(&8).unwrap(), None);
  assert_eq!(cache.metrics().negative_hits, 1);

  cache.refresh(&8).unwrap();
  assert_eq!(cache.lookup(&8).unwrap().as_deref(), Some(&"eight".to_string()));
  assert_eq!(cache.metrics().refreshes, 1);
}

#[test]
fn test_refresh_of_unknown_key_is_a_no_op() {
  let root = temp_root();
  write_out_of_band(root.path(), 10, "ten");
  let cache = build_text_cache(root.path(), RecordingLog::new());

  cache.refresh(&10).unwrap();
  assert!(cache.is_empty());
  assert_eq!(cache.metrics().refreshes, 0);
}

#[test]
fn test_read_and_update_on_absent_key() {
  let root = temp_root();
  let cache = build_text_cache(root.path(), RecordingLog::new());

  let (found, len) = cache.read(&11, |v| v.len()).unwrap();
  assert!(!found);
  assert_eq!(len, 0);

  let mut called = false;
  assert!(!cache.update(&11, |_| called = true).unwrap());
  assert!(!called);
}

#[test]
fn test_read_returns_closure_result() {
  let root = temp_root();
  write_out_of_band(root.path(), 12, "twelve");
  let cache = build_text_cache(root.path(), RecordingLog::new());

  let (found, upper) = cache.read(&12, |v| v.to_uppercase()).unwrap();
  assert!(found);
  assert_eq!(upper, "TWELVE");
}

#[test]
fn test_force_clear_discards_unsaved_changes() {
  let root = temp_root();
  let cache = build_text_cache(root.path(), RecordingLog::new());
  cache.insert(1, "one".to_string());
  cache.insert(2, "two".to_string());
  assert_eq!(cache.len(), 2);

  cache.force_clear();
  assert!(cache.is_empty());
  assert_eq!(read_on_disk(root.path(), 1), None);
  assert_eq!(cache.lookup(&1).unwrap(), None);
}

#[test]
fn test_clear_saves_before_dropping() {
  let root = temp_root();
  let cache = build_text_cache(root.path(), RecordingLog::new());
  cache.insert(1, "one".to_string());
  assert_eq!(cache.lookup(&2).unwrap(), None);

  cache.clear().unwrap();
  assert!(cache.is_empty());
  assert_eq!(read_on_disk(root.path(), 1).as_deref(), Some("one"));
  // Negative entries are never written.
  assert_eq!(read_on_disk(root.path(), 2), None);
}

#[test]
fn test_keys_are_ordered_and_include_negative_entries() {
  let root = temp_root();
  let cache = build_text_cache(root.path(), RecordingLog::new());
  cache.insert(30, "x".to_string());
  cache.insert(10, "y".to_string());
  assert_eq!(cache.lookup(&20).unwrap(), None);

  assert_eq!(cache.keys(), vec![10, 20, 30]);
}

#[test]
fn test_clones_share_state() {
  let root = temp_root();
  let cache = build_text_cache(root.path(), RecordingLog::new());
  let other = cache.clone();

  other.insert(1, "shared".to_string());
  assert_eq!(
    cache.lookup(&1).unwrap().as_deref(),
    Some(&"shared".to_string())
  );
}

#[test]
fn test_builder_shorthand_uses_default_policies() {
  let root = temp_root();
  let cache = Cache::<u32, String>::builder()
    .layout(layout(root.path()))
    .build()
    .unwrap();

  assert_eq!(cache.format(), "text");
  assert!(cache.create(1, &"one".to_string()).unwrap());
  cache.refresh(&1).unwrap();
  assert_eq!(cache.lookup(&1).unwrap().as_deref(), Some(&"one".to_string()));
}

// Every regular file under `dir`, sorted by content.
fn trashed_contents(dir: &std::path::Path) -> Vec<String> {
  let mut found = Vec::new();
  let mut pending = vec![dir.to_path_buf()];
  while let Some(next) = pending.pop() {
    for entry in std::fs::read_dir(next).unwrap() {
      let path = entry.unwrap().path();
      if path.is_dir() {
        pending.push(path);
      } else {
        found.push(std::fs::read_to_string(path).unwrap());
      }
    }
  }
  found.sort();
  found
}

#[test]
fn test_repeated_remove_keeps_every_trashed_version() {
  let root = temp_root();
  let log = RecordingLog::new();
  let cache = build_text_cache(root.path(), log.clone());

  assert!(cache.create(1, &"first".to_string()).unwrap());
  assert!(cache.remove(&1).unwrap());
  assert!(cache.create(1, &"second".to_string()).unwrap());
  assert!(cache.remove(&1).unwrap());
  assert!(cache.create(1, &"third".to_string()).unwrap());
  assert!(cache.remove(&1).unwrap());

  assert_eq!(
    trashed_contents(&root.path().join("data").join("trash")),
    vec!["first", "second", "third"]
  );
  assert!(log.contains(Level::INFO, "value.txt.2"));
  assert_eq!(cache.metrics().removes, 3);
}

#[test]
fn test_create_reuses_directory_left_by_remove() {
  let root = temp_root();
  let cache = build_text_cache(root.path(), RecordingLog::new());

  assert!(cache.create(5, &"five".to_string()).unwrap());
  assert!(cache.remove(&5).unwrap());
  let key_dir = root.path().join("data").join("5");
  assert!(key_dir.is_dir());

  assert!(cache.create(5, &"five again".to_string()).unwrap());
  assert_eq!(read_on_disk(root.path(), 5).as_deref(), Some("five again"));
}

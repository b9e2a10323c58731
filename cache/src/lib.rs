//! A disk-backed object cache: every key maps to one file, and values live in
//! memory once they have been read.
//!
//! # Features
//! - **Read-through**: the first lookup of a key loads its file; later lookups
//!   are answered from memory, including "not found" answers.
//! - **Write-behind**: `insert` and `update` change memory only, `save` flushes.
//! - **Soft delete**: `remove` moves the file into a `trash` tree next to it.
//! - **Pluggable policies**: serialization, logging and concurrency control are
//!   independent generic parameters with zero-config defaults.
//! - **Observability**: exposes lookup and disk counters through `metrics()`.
//!
//! ```no_run
//! use fibre_disk_cache::{Cache, FilenameLayout};
//!
//! let cache = Cache::<u32, String>::builder()
//!   .layout(FilenameLayout::new("/var/lib/app", "value.txt"))
//!   .entry_locking()
//!   .build()
//!   .unwrap();
//!
//! cache.insert(1, "one".to_string());
//! cache.update(&1, |v| v.push('!')).unwrap();
//! cache.save().unwrap();
//! ```

// Public modules that form the API
pub mod builder;
pub mod concurrency;
pub mod error;
pub mod handles;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod serialization;
pub mod sync;

// Internal, crate-only modules
mod disk;
mod entry;
mod shared;
mod store;

// Re-export the primary user-facing types for convenience
pub use builder::{CacheBuilder, DEFAULT_FORMAT};
pub use concurrency::{ConcurrencyPolicy, EntryLocking, NoConcurrencyControl};
pub use disk::DEFAULT_TRASH_DIR_NAME;
pub use error::{BuildError, CacheError, Result};
pub use handles::Cache;
pub use layout::FilenameLayout;
pub use logging::{Level, LogPolicy, NoLogging, StdErrLog, TracingLog};
pub use metrics::MetricsSnapshot;
#[cfg(feature = "serde")]
pub use serialization::SerdeFormat;
pub use serialization::{SerializationPolicy, TextFormat};
pub use shared::FilenameFn;
pub use sync::{NoOpMutex, RawLock};

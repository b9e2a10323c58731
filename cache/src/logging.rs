//! Logging policies receive every message the cache emits.
//!
//! A message is one complete record; there is no separate line terminator.
//! Callers build records with `format_args!`, so a policy that drops a level
//! never pays for formatting it.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

pub use tracing::Level;

/// The target used for every `tracing` event emitted by [`TracingLog`].
pub const LOG_TARGET: &str = "fibre_disk_cache";

/// A sink with five independent severity channels.
pub trait LogPolicy: Send + Sync {
  fn log(&self, level: Level, args: fmt::Arguments<'_>);

  #[inline]
  fn trace(&self, args: fmt::Arguments<'_>) {
    self.log(Level::TRACE, args);
  }

  #[inline]
  fn debug(&self, args: fmt::Arguments<'_>) {
    self.log(Level::DEBUG, args);
  }

  #[inline]
  fn info(&self, args: fmt::Arguments<'_>) {
    self.log(Level::INFO, args);
  }

  #[inline]
  fn warn(&self, args: fmt::Arguments<'_>) {
    self.log(Level::WARN, args);
  }

  #[inline]
  fn error(&self, args: fmt::Arguments<'_>) {
    self.log(Level::ERROR, args);
  }
}

impl<L: LogPolicy + ?Sized> LogPolicy for Arc<L> {
  fn log(&self, level: Level, args: fmt::Arguments<'_>) {
    (**self).log(level, args);
  }
}

/// The default policy. Forwards every record to `tracing` under
/// [`LOG_TARGET`], so whatever subscriber the application installed decides
/// what is kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl LogPolicy for TracingLog {
  fn log(&self, level: Level, args: fmt::Arguments<'_>) {
    // `tracing` macros need the level as a constant.
    if level == Level::ERROR {
      tracing::error!(target: LOG_TARGET, "{}", args);
    } else if level == Level::WARN {
      tracing::warn!(target: LOG_TARGET, "{}", args);
    } else if level == Level::INFO {
      tracing::info!(target: LOG_TARGET, "{}", args);
    } else if level == Level::DEBUG {
      tracing::debug!(target: LOG_TARGET, "{}", args);
    } else {
      tracing::trace!(target: LOG_TARGET, "{}", args);
    }
  }
}

/// Writes one line per record to standard error, for programs that have no
/// `tracing` subscriber.
#[derive(Debug, Clone, Copy)]
pub struct StdErrLog {
  max_level: Level,
}

impl Default for StdErrLog {
  fn default() -> Self {
    Self {
      max_level: Level::TRACE,
    }
  }
}

impl StdErrLog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Drops records more verbose than `level`.
  pub fn max_level(mut self, level: Level) -> Self {
    self.max_level = level;
    self
  }
}

impl LogPolicy for StdErrLog {
  fn log(&self, level: Level, args: fmt::Arguments<'_>) {
    if level > self.max_level {
      return;
    }
    let mut stderr = io::stderr().lock();
    // Logging never fails an operation.
    let _ = writeln!(stderr, "[{}] {}", level, args);
  }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLogging;

impl LogPolicy for NoLogging {
  #[inline]
  fn log(&self, _level: Level, _args: fmt::Arguments<'_>) {}
}

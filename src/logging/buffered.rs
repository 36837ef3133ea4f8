//! Buffered logger for parallel work and for tests.
use std::sync::Mutex;

use super::types::{Log, LogEntry, LogLevel};

/// Implement the display methods of [`Log`] by buffering each message as a
/// [`LogEntry`] with the corresponding level.
macro_rules! buffer_log_methods {
    ($($method:ident => $level:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                if let Ok(mut guard) = self.entries.lock() {
                    guard.push(LogEntry {
                        level: LogLevel::$level,
                        message: msg.to_string(),
                    });
                }
            }
        )+
    };
}

/// Captures log output in memory.
///
/// Source roots are walked in parallel; each walker logs into its own
/// `BufferedLog`, and the buffers are replayed in root order afterwards so
/// the console shows the same sequence as a sequential run.
#[derive(Debug, Default)]
pub struct BufferedLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl BufferedLog {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of every captured entry.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map_or_else(|_| Vec::new(), |g| g.clone())
    }

    /// Messages captured at `level`, in order.
    #[must_use]
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    /// Replay and clear every captured entry into `target`.
    pub fn flush_into(&self, target: &dyn Log) {
        let entries = match self.entries.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return,
        };
        for entry in &entries {
            target.emit(entry);
        }
    }
}

impl Log for BufferedLog {
    buffer_log_methods! {
        stage   => Stage,
        info    => Info,
        debug   => Debug,
        warn    => Warn,
        error   => Error,
        dry_run => DryRun,
    }
}

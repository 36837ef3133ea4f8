//! Core logging types: captured entries and the [`Log`] trait.

/// Severity or category of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Section header.
    Stage,
    /// Informational message.
    Info,
    /// Detail shown only with `--verbose` (always written to the log file).
    Debug,
    /// Recoverable problem, such as a skipped source entry.
    Warn,
    /// Failure.
    Error,
    /// Action that check mode reports instead of performing.
    DryRun,
}

/// One captured log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Message category.
    pub level: LogLevel,
    /// Message text.
    pub message: String,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) writes through `tracing`;
/// [`BufferedLog`](super::buffered::BufferedLog) captures messages so that
/// parallel workers can be replayed in a stable order.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);

    /// Dispatch `entry` to the method matching its level.
    fn emit(&self, entry: &LogEntry) {
        let msg = entry.message.as_str();
        match entry.level {
            LogLevel::Stage => self.stage(msg),
            LogLevel::Info => self.info(msg),
            LogLevel::Debug => self.debug(msg),
            LogLevel::Warn => self.warn(msg),
            LogLevel::Error => self.error(msg),
            LogLevel::DryRun => self.dry_run(msg),
        }
    }
}

//! Deferred diagnostics.
//!
//! Passes never log through global state directly. They record into a
//! [`DiagnosticSink`] handed in by the caller, which decides when (and on
//! which partition) the messages reach `tracing`.

/// Severity of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Receiver for diagnostics produced while evaluating group controls.
pub trait DiagnosticSink {
    fn record(&mut self, level: LogLevel, message: String);

    fn debug(&mut self, message: &str) {
        self.record(LogLevel::Debug, message.to_owned());
    }

    fn info(&mut self, message: &str) {
        self.record(LogLevel::Info, message.to_owned());
    }

    fn warning(&mut self, message: &str) {
        self.record(LogLevel::Warning, message.to_owned());
    }

    fn error(&mut self, message: &str) {
        self.record(LogLevel::Error, message.to_owned());
    }
}

/// Collects diagnostics in memory until [`DeferredLogger::flush`].
#[derive(Debug, Default, Clone)]
pub struct DeferredLogger {
    entries: Vec<LogEntry>,
}

impl DeferredLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move another logger's entries behind ours (e.g. gathered from a partition).
    pub fn merge(&mut self, other: DeferredLogger) {
        self.entries.extend(other.entries);
    }

    /// Emit all collected entries through `tracing` and clear the buffer.
    pub fn flush(&mut self) {
        for entry in self.entries.drain(..) {
            match entry.level {
                LogLevel::Debug => tracing::debug!(target: "wellgroup", "{}", entry.message),
                LogLevel::Info => tracing::info!(target: "wellgroup", "{}", entry.message),
                LogLevel::Warning => tracing::warn!(target: "wellgroup", "{}", entry.message),
                LogLevel::Error => tracing::error!(target: "wellgroup", "{}", entry.message),
            }
        }
    }
}

impl DiagnosticSink for DeferredLogger {
    fn record(&mut self, level: LogLevel, message: String) {
        self.entries.push(LogEntry { level, message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_flushes() {
        let mut logger = DeferredLogger::new();
        logger.warning("group G1 switched to ORAT");
        logger.debug("detail");
        assert_eq!(logger.entries().len(), 2);
        assert_eq!(logger.entries()[0].level, LogLevel::Warning);

        let mut other = DeferredLogger::new();
        other.info("from another partition");
        logger.merge(other);
        assert_eq!(logger.entries().len(), 3);

        logger.flush();
        assert!(logger.is_empty());
    }
}

//! Logging and module capabilities.

use parking_lot::Mutex;
use std::error::Error as StdError;
use std::sync::Arc;

/// The logging capability a host injects into modules.
pub trait LoggerCapability: Send + Sync {
    /// Log a text message.
    fn log(&self, message: &str);

    /// Log an error value.
    fn log_error(&self, error: &(dyn StdError + Send + Sync));
}

/// The capability every module exposes to its host.
pub trait ModuleCapability: Send + Sync {
    /// Report the module's injected dependencies through its logger.
    fn report(&self);
}

/// Destination for lines written by a logger capability.
pub trait LogSink: Send + Sync {
    /// Write one line.
    fn write_line(&self, line: &str);
}

/// A sink that prints to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write_line(&self, line: &str) {
        println!("{}", line);
    }
}

/// A sink that keeps every line in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Remove and return all lines written so far.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_clones_share_lines() {
        let sink = MemorySink::new();
        let writer = sink.clone();
        writer.write_line("first");
        writer.write_line("second");

        assert_eq!(sink.lines(), vec!["first", "second"]);
        assert_eq!(sink.drain().len(), 2);
        assert!(sink.lines().is_empty());
    }
}

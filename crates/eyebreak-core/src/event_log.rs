//! Event Log - human-readable state-transition notifications
//!
//! Consecutive identical messages are collapsed: the filter reports
//! "waiting for confirmation" on every frame while a candidate is pending,
//! and the reader only needs to see it once.

/// Destination for notification messages
pub trait EventSink: Send {
    fn emit(&mut self, message: &str);
}

/// Forwards notifications to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, message: &str) {
        log::info!(target: "eyebreak::events", "{message}");
    }
}

/// Keeps every emitted message in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    messages: Vec<String>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Take the collected messages, leaving the sink empty
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

impl EventSink for MemorySink {
    fn emit(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Deduplicating decorator around any sink.
///
/// Only the last emitted message is remembered. When `enabled` is false
/// nothing reaches the sink.
#[derive(Debug)]
pub struct DedupLog<S> {
    sink: S,
    enabled: bool,
    last_message: Option<String>,
}

impl<S: EventSink> DedupLog<S> {
    pub fn new(sink: S, enabled: bool) -> Self {
        Self {
            sink,
            enabled,
            last_message: None,
        }
    }

    /// Emit `message` unless it repeats the previous one
    pub fn log(&mut self, message: &str) {
        if self.last_message.as_deref() != Some(message) {
            self.write(message);
        }
    }

    /// Emit `message` even if it repeats the previous one
    pub fn log_forced(&mut self, message: &str) {
        self.write(message);
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn write(&mut self, message: &str) {
        if !self.enabled {
            return;
        }
        self.sink.emit(message);
        self.last_message = Some(message.to_string());
    }
}

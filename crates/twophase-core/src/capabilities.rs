//! Narrow capabilities the timer is given by its host.
//!
//! The timer never reaches for ambient globals: persistence, rendering and
//! notifications all come in through these three traits. Failures reported
//! by a sink are logged and otherwise ignored by the timer.

use std::collections::HashMap;

use crate::error::Result;

/// String key-value persistence.
pub trait KeyValueStore {
    /// Read a raw value. Missing keys and backend failures both yield `None`.
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Read an integer, falling back to `default` when missing or unparsable.
    fn get_u64_or(&self, key: &str, default: u64) -> u64 {
        self.get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Read a boolean, falling back to `default` when missing or unparsable.
    fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}

/// Single-line indicator surface.
pub trait DisplaySink {
    fn render(&mut self, text: &str) -> Result<()>;
}

/// One-off user-facing messages.
pub trait Notifier {
    fn notify(&mut self, message: &str) -> Result<()>;

    /// Report a rejected command. Defaults to a regular notice.
    fn notify_error(&mut self, message: &str) -> Result<()> {
        self.notify(message)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn render(&mut self, text: &str) -> Result<()> {
        (**self).render(text)
    }
}

impl<T: Notifier + ?Sized> Notifier for Box<T> {
    fn notify(&mut self, message: &str) -> Result<()> {
        (**self).notify(message)
    }

    fn notify_error(&mut self, message: &str) -> Result<()> {
        (**self).notify_error(message)
    }
}

/// In-memory store. Used by tests and by hosts that opt out of persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Display sink that keeps every rendered frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    frames: Vec<String>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn last(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }
}

impl DisplaySink for RecordingDisplay {
    fn render(&mut self, text: &str) -> Result<()> {
        self.frames.push(text.to_string());
        Ok(())
    }
}

/// Notifier that keeps every message, split by kind.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Vec<String>,
    errors: Vec<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, message: &str) -> Result<()> {
        self.messages.push(message.to_string());
        Ok(())
    }

    fn notify_error(&mut self, message: &str) -> Result<()> {
        self.errors.push(message.to_string());
        Ok(())
    }
}

//! Notification collaborator - user-facing success/failure messages
//!
//! The coordinator calls these hooks on the outcome of every write; display
//! and timing are up to the implementation.

use std::sync::Mutex;

use console::style;

/// Receives outcome messages from the coordinator
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str);

    /// Partial success, e.g. a skill that could not be resolved
    fn warning(&self, message: &str) {
        self.error(message);
    }

    fn info(&self, _message: &str) {}
}

/// Prints styled one-liners to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier {
    quiet: bool,
}

impl ConsoleNotifier {
    /// In quiet mode only warnings and errors are printed
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("✓").green(), message);
        }
    }

    fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    fn warning(&self, message: &str) {
        eprintln!("{} {}", style("!").yellow(), message);
    }

    fn info(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("•").dim(), message);
        }
    }
}

/// Kind of a recorded notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
    Warning,
    Info,
}

/// Keeps every message in memory; used by embedders and tests
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(Level, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((level, message.to_string()));
    }

    /// All messages received so far, oldest first
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, level: Level) -> usize {
        self.messages().iter().filter(|(l, _)| *l == level).count()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.push(Level::Success, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }

    fn warning(&self, message: &str) {
        self.push(Level::Warning, message);
    }

    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.success("created");
        notifier.warning("skill 'Go' dropped");
        notifier.error("failed");

        let messages = notifier.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], (Level::Success, "created".to_string()));
        assert_eq!(notifier.count(Level::Warning), 1);
    }
}

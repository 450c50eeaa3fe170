//! Text outputs of the simulation.
//!
//! The simulation never formats UI itself; it hands plain strings to a
//! [`DisplaySink`] and the host decides how to show them.

/// Receiver for the caption line and the mode label.
pub trait DisplaySink {
    /// Show a cinematic caption. An empty string clears it.
    fn show_caption(&mut self, text: &str);

    /// Show the label of the active view mode.
    fn show_mode(&mut self, label: &str);
}

/// Sink that discards everything.
#[derive(Default, Clone, Copy, Debug)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn show_caption(&mut self, _text: &str) {}

    fn show_mode(&mut self, _label: &str) {}
}

/// Sink that records every message, in order.
#[derive(Default, Clone, Debug)]
pub struct RecordingSink {
    /// Captions received.
    pub captions: Vec<String>,
    /// Mode labels received.
    pub modes: Vec<String>,
}

impl RecordingSink {
    /// The most recent caption, if any was shown.
    #[must_use]
    pub fn last_caption(&self) -> Option<&str> {
        self.captions.last().map(String::as_str)
    }

    /// The most recent mode label, if any was shown.
    #[must_use]
    pub fn last_mode(&self) -> Option<&str> {
        self.modes.last().map(String::as_str)
    }
}

impl DisplaySink for RecordingSink {
    fn show_caption(&mut self, text: &str) {
        self.captions.push(text.to_owned());
    }

    fn show_mode(&mut self, label: &str) {
        self.modes.push(label.to_owned());
    }
}

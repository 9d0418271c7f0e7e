//! Speech-Input Adapter.
//!
//! Speech recognition itself runs in the host (the browser). This tracks the
//! capture contract on the service side: `toggle` starts or stops capture,
//! `on_result` carries the best transcript so far, and `on_end` fires once per
//! capture and hands back the transcript to submit.

use serde::Serialize;

/// Instruction for the host's recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechCommand {
    Start,
    Stop,
}

#[derive(Debug, Clone, Default)]
pub struct SpeechInput {
    supported: bool,
    recording: bool,
    transcript: Option<String>,
}

impl SpeechInput {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            ..Self::default()
        }
    }

    pub fn recording(&self) -> bool {
        self.recording
    }

    /// Host capability changed (e.g. reported on connect). Losing support
    /// drops any capture in progress.
    pub fn set_supported(&mut self, supported: bool) {
        self.supported = supported;
        if !supported {
            self.recording = false;
            self.transcript = None;
        }
    }

    /// Start capture if idle, stop it if recording. No-op when unsupported.
    ///
    /// Stopping does not end the capture; the host reports that via
    /// [`SpeechInput::on_end`].
    pub fn toggle(&mut self) -> Option<SpeechCommand> {
        if !self.supported {
            return None;
        }
        if self.recording {
            Some(SpeechCommand::Stop)
        } else {
            self.recording = true;
            self.transcript = None;
            Some(SpeechCommand::Start)
        }
    }

    /// Best transcript so far; replaces the previous one. Ignored when no
    /// capture is active.
    pub fn on_result(&mut self, text: &str) -> bool {
        if !self.recording {
            return false;
        }
        self.transcript = Some(text.to_string());
        true
    }

    /// Capture finished. Returns the last transcript the first time it is
    /// called for a capture and `None` afterwards.
    pub fn on_end(&mut self) -> Option<Option<String>> {
        if !self.recording {
            return None;
        }
        self.recording = false;
        Some(self.transcript.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_toggle_is_noop() {
        let mut speech = SpeechInput::new(false);
        assert_eq!(speech.toggle(), None);
        assert!(!speech.recording());
        assert!(!speech.on_result("hello"));
        assert_eq!(speech.on_end(), None);
    }

    #[test]
    fn test_toggle_starts_then_stops() {
        let mut speech = SpeechInput::new(true);
        assert_eq!(speech.toggle(), Some(SpeechCommand::Start));
        assert!(speech.recording());
        assert_eq!(speech.toggle(), Some(SpeechCommand::Stop));
        // still recording until the host reports the end
        assert!(speech.recording());
    }

    #[test]
    fn test_results_replace_and_end_fires_once() {
        let mut speech = SpeechInput::new(true);
        speech.toggle();
        assert!(speech.on_result("i had"));
        assert!(speech.on_result("i had a great day"));
        assert_eq!(speech.on_end(), Some(Some("i had a great day".to_string())));
        assert_eq!(speech.on_end(), None);
        assert!(!speech.recording());
    }

    #[test]
    fn test_end_without_results() {
        let mut speech = SpeechInput::new(true);
        speech.toggle();
        assert_eq!(speech.on_end(), Some(None));
    }

    #[test]
    fn test_new_capture_clears_old_transcript() {
        let mut speech = SpeechInput::new(true);
        speech.toggle();
        speech.on_result("first");
        speech.on_end();
        speech.toggle();
        assert_eq!(speech.on_end(), Some(None));
    }

    #[test]
    fn test_losing_support_drops_capture() {
        let mut speech = SpeechInput::new(true);
        speech.toggle();
        speech.on_result("partial");
        speech.set_supported(false);
        assert!(!speech.recording());
        assert_eq!(speech.on_end(), None);
    }
}

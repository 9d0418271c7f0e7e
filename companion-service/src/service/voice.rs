//! Speech-input wiring: host capture events in, speech commands out.

use tracing::debug;

use crate::catalog::names;
use crate::speech::SpeechCommand;

use super::{CompanionSession, SessionEvent};

impl CompanionSession {
    /// Record whether the host can capture speech
    pub async fn set_speech_supported(&self, supported: bool) {
        self.state.lock().await.speech.set_supported(supported);
        debug!(session_id = %self.id, supported, "Speech support reported");
    }

    /// Mic button pressed. Inert when speech is unsupported.
    pub async fn toggle_mic(&self) -> Option<SpeechCommand> {
        let command = self.state.lock().await.speech.toggle();
        if let Some(command) = command {
            self.emit(SessionEvent::Speech { command });
        }
        command
    }

    /// Interim or final transcript from the host recognizer
    pub async fn speech_result(&self, text: &str) {
        let accepted = self.state.lock().await.speech.on_result(text);
        if accepted {
            self.emit(SessionEvent::Transcript {
                text: text.to_string(),
            });
        }
    }

    /// Capture ended. Settles into idle and submits the last transcript as if
    /// typed. Returns whether anything was submitted.
    pub async fn speech_end(&self) -> bool {
        let ended = self.state.lock().await.speech.on_end();
        let Some(transcript) = ended else {
            return false;
        };
        self.apply_pose(names::IDLE).await;
        match transcript {
            Some(text) => self.submit(&text).await,
            None => false,
        }
    }
}

//! Conversation Controller.
//!
//! A [`CompanionSession`] owns one [`ConversationState`] and every timer that
//! mutates it. Observers receive [`SessionEvent`]s over an unbounded channel:
//! transcript messages as they are appended, render frames from the per-tick
//! render loop, and speech-capture updates for the host.

mod exchange;
mod motion;
mod presence;
mod state;
mod voice;

pub use state::{ChatMessage, ConversationSnapshot, ConversationState, Frame, Role};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::CompanionConfig;
use crate::speech::SpeechCommand;

use exchange::PendingExchange;

/// Something observers of a session should know about
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A message was appended to the transcript
    Message { message: ChatMessage },
    /// The figure should be redrawn
    Frame { frame: Frame },
    /// Best speech transcript so far
    Transcript { text: String },
    /// The host should start or stop speech capture
    Speech { command: SpeechCommand },
}

/// One companion conversation and its timers
///
/// Cloning yields another handle to the same session. Timers stop when
/// [`CompanionSession::close`] is called.
#[derive(Clone)]
pub struct CompanionSession {
    id: Uuid,
    catalog: Arc<Catalog>,
    config: Arc<CompanionConfig>,
    state: Arc<Mutex<ConversationState>>,
    events: mpsc::UnboundedSender<SessionEvent>,
    exchanges: mpsc::UnboundedSender<PendingExchange>,
    rng: Arc<Mutex<StdRng>>,
    shutdown: CancellationToken,
}

impl CompanionSession {
    /// Start a session: seed the transcript, then begin the walk-in, the
    /// exchange worker and the render loop. Must be called inside a tokio
    /// runtime.
    pub fn start(
        id: Uuid,
        catalog: Arc<Catalog>,
        config: Arc<CompanionConfig>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self::start_with_rng(id, catalog, config, events, StdRng::from_entropy())
    }

    /// Like [`CompanionSession::start`] with a caller-provided random source
    pub fn start_with_rng(
        id: Uuid,
        catalog: Arc<Catalog>,
        config: Arc<CompanionConfig>,
        events: mpsc::UnboundedSender<SessionEvent>,
        rng: StdRng,
    ) -> Self {
        let state = ConversationState::new(&catalog, Instant::now());
        let (exchanges, queue) = mpsc::unbounded_channel();
        let session = Self {
            id,
            catalog,
            config,
            state: Arc::new(Mutex::new(state)),
            events,
            exchanges,
            rng: Arc::new(Mutex::new(rng)),
            shutdown: CancellationToken::new(),
        };

        info!(session_id = %id, "Companion session started");
        session.spawn_exchange_worker(queue);
        session.spawn_walk_in();
        session.spawn_render_loop();
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Stop every timer and background task of this session
    pub fn close(&self) {
        if !self.shutdown.is_cancelled() {
            info!(session_id = %self.id, "Companion session closed");
        }
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub async fn snapshot(&self) -> ConversationSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Current render frame, regardless of whether anything changed
    #[cfg(test)]
    pub async fn frame(&self) -> Frame {
        self.state
            .lock()
            .await
            .frame(&self.catalog.poses, Instant::now())
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            warn!(session_id = %self.id, "Session event dropped, no receiver");
        }
    }

    /// Sleep for `duration` unless the session closes first. Returns false
    /// if it closed.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.shutdown.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ReplySource, names};
    use crate::speech::SpeechCommand;

    pub(super) fn session(seed: u64) -> (CompanionSession, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = CompanionSession::start_with_rng(
            Uuid::new_v4(),
            Arc::new(Catalog::builtin().unwrap()),
            Arc::new(CompanionConfig::default()),
            tx,
            StdRng::seed_from_u64(seed),
        );
        (session, rx)
    }

    /// Session past its walk-in and greeting bubble, with the events so far
    /// drained
    pub(super) async fn settled_session(
        seed: u64,
    ) -> (CompanionSession, mpsc::UnboundedReceiver<SessionEvent>) {
        let (session, mut rx) = session(seed);
        tokio::time::sleep(Duration::from_secs(4)).await;
        while rx.try_recv().is_ok() {}
        (session, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_starts_seeded_and_offstage() {
        let (session, _rx) = session(1);
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.transcript.len(), 1);
        assert_eq!(snapshot.transcript[0].role, Role::Companion);
        assert_eq!(snapshot.caption, crate::catalog::ARRIVING_CAPTION);
        assert_eq!(snapshot.stage.opacity, 0.0);
        assert!(snapshot.stage.x < 0.0);
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_walk_in_frames_reach_center() {
        let (session, mut rx) = session(2);
        tokio::time::sleep(Duration::from_secs(1)).await;

        let stages: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::Frame { frame } => Some(frame.stage),
                _ => None,
            })
            .collect();
        assert!(stages.len() > 10, "expected a frame per walk tick");
        assert!(stages.iter().any(|s| s.x < 0.0));
        for pair in stages.windows(2) {
            assert!(pair[1].x >= pair[0].x);
            assert!(pair[1].opacity >= pair[0].opacity);
        }
        let last = stages.last().unwrap();
        assert_eq!(last.x, crate::animation::Stage::settled().x);
        assert_eq!(last.opacity, 1.0);
        assert!(!last.is_walking());

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.pose, names::IDLE);
        assert_eq!(snapshot.caption, "waiting for you...");
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_greeting_bubble_after_walk_in() {
        let (session, _rx) = session(3);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let bubble = session.snapshot().await.bubble;
        assert!(bubble.visible);
        assert_eq!(bubble.text, crate::catalog::DEFAULT_WELCOME_BUBBLE);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(!session.snapshot().await.bubble.visible);
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_happy_exchange_end_to_end() {
        let (session, mut rx) = settled_session(4).await;

        assert!(session.submit("I am so happy today, we won!").await);
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.transcript.len(), 2);
        assert_eq!(snapshot.transcript[1].role, Role::User);
        assert_eq!(snapshot.transcript[1].text, "I am so happy today, we won!");
        assert_eq!(snapshot.pose, names::NODDING);
        assert!(snapshot.thinking);

        tokio::time::sleep(Duration::from_millis(1800)).await;
        let snapshot = session.snapshot().await;
        let reply = &snapshot.transcript[2];
        assert_eq!(reply.role, Role::Companion);
        assert_eq!(reply.pose.as_deref(), Some(names::HAPPY));
        assert_eq!(reply.text, ReplySource::builtin().unwrap().select(0).text);
        assert_eq!(snapshot.pose, names::HAPPY);
        assert_eq!(snapshot.emotion, "HAPPY!");
        assert!(!snapshot.thinking);
        assert_eq!(snapshot.reply_counter, 1);
        assert!(snapshot.bubble.visible);
        assert_eq!(
            snapshot.bubble.text,
            ReplySource::builtin().unwrap().select(0).speech
        );

        let messages: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::Message { message } => Some(message.role),
                _ => None,
            })
            .collect();
        assert_eq!(messages, vec![Role::User, Role::Companion]);

        // bubble hides, then the pose settles back to idle
        tokio::time::sleep(Duration::from_millis(3600)).await;
        let snapshot = session.snapshot().await;
        assert!(!snapshot.bubble.visible);
        assert_eq!(snapshot.pose, names::IDLE);
        assert!(!session.state.lock().await.has_pending_timers());
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_submit_is_ignored() {
        let (session, mut rx) = settled_session(5).await;
        for text in ["", "   ", "\n\t "] {
            assert!(!session.submit(text).await);
        }
        let state = session.state.lock().await;
        assert_eq!(state.transcript().len(), 1);
        assert!(!state.is_thinking());
        assert!(!state.has_pending_timers());
        drop(state);
        assert!(
            drain(&mut rx)
                .iter()
                .all(|e| !matches!(e, SessionEvent::Message { .. }))
        );
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_text_is_trimmed() {
        let (session, _rx) = settled_session(6).await;
        assert!(session.submit("  hello  ").await);
        assert_eq!(session.snapshot().await.transcript[1].text, "hello");
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_selection_wraps() {
        let (session, _rx) = settled_session(7).await;
        let replies = ReplySource::builtin().unwrap();
        for _ in 0..9 {
            assert!(session.submit("ok").await);
            tokio::time::sleep(Duration::from_secs(6)).await;
        }
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.reply_counter, 9);

        let companion: Vec<_> = snapshot
            .transcript
            .iter()
            .skip(1)
            .filter(|m| m.role == Role::Companion)
            .collect();
        assert_eq!(companion.len(), 9);
        assert_eq!(companion[8].text, companion[0].text);
        assert_eq!(companion[8].text, replies.select(0).text);
        for (counter, message) in companion.iter().enumerate() {
            assert_eq!(message.text, replies.select(counter as u64).text);
        }
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_speech_restarts_window() {
        let (session, _rx) = settled_session(8).await;
        let window = Duration::from_millis(3200);

        session.show_speech("one", window).await;
        tokio::time::sleep(Duration::from_millis(2000)).await;
        session.show_speech("two", window).await;

        // past the first window, inside the second
        tokio::time::sleep(Duration::from_millis(3000)).await;
        let bubble = session.snapshot().await.bubble;
        assert!(bubble.visible);
        assert_eq!(bubble.text, "two");

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!session.snapshot().await.bubble.visible);
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_submit_supersedes_settle() {
        let (session, _rx) = settled_session(9).await;

        session.submit("hello").await;
        tokio::time::sleep(Duration::from_millis(3800)).await;
        session.submit("hello again").await;

        // the first exchange's idle revert would have fired by now
        tokio::time::sleep(Duration::from_millis(1900)).await;
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.reply_counter, 2);
        assert_eq!(snapshot.pose, names::SURPRISED);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(session.snapshot().await.pose, names::IDLE);
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_submits_are_answered_in_order() {
        let (session, _rx) = settled_session(10).await;
        session.submit("first").await;
        session.submit("second").await;
        assert!(session.snapshot().await.thinking);

        tokio::time::sleep(Duration::from_millis(1799)).await;
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.reply_counter, 1);
        assert!(snapshot.thinking, "second message still awaiting its reply");

        tokio::time::sleep(Duration::from_millis(1800)).await;
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.reply_counter, 2);
        assert!(!snapshot.thinking);
        let roles: Vec<_> = snapshot.transcript.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::Companion,
                Role::User,
                Role::User,
                Role::Companion,
                Role::Companion
            ]
        );
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_stops_timers() {
        let (session, mut rx) = settled_session(11).await;
        session.submit("hello").await;
        session.close();
        assert!(session.is_closed());

        tokio::time::sleep(Duration::from_secs(5)).await;
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.reply_counter, 0);
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_session_event_wire_format() {
        let event = SessionEvent::Speech {
            command: SpeechCommand::Start,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "speech");
        assert_eq!(json["command"], "start");

        let event = SessionEvent::Transcript {
            text: "we won".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "transcript");
        assert_eq!(json["text"], "we won");
    }
}

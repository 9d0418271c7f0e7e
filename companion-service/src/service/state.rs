//! Conversation state owned by a companion session.
//!
//! All mutation goes through [`ConversationState`] methods; the session wraps
//! them with locking and timers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::animation::{FigureGeometry, LimbTransition, Stage, current_limbs, render_figure};
use crate::catalog::{ARRIVING_CAPTION, Catalog, PoseTable, names};
use crate::speech::SpeechInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Companion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: Role,
    pub text: String,
    /// Pose the companion took for this reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pose: Option<String>,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpeechBubble {
    pub text: String,
    pub visible: bool,
}

/// Everything the presentation layer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub pose: String,
    pub emotion: String,
    pub caption: String,
    pub thinking: bool,
    pub stage: Stage,
    pub bubble: SpeechBubble,
    pub figure: FigureGeometry,
}

/// Read-only copy of the conversation state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSnapshot {
    pub transcript: Vec<ChatMessage>,
    pub pose: String,
    pub emotion: String,
    pub caption: String,
    pub bubble: SpeechBubble,
    pub thinking: bool,
    pub reply_counter: u64,
    pub stage: Stage,
    pub recording: bool,
}

#[derive(Debug)]
pub struct ConversationState {
    transcript: Vec<ChatMessage>,
    next_message_id: u64,
    pose: String,
    emotion: String,
    caption: String,
    bubble: SpeechBubble,
    bubble_timer: Option<CancellationToken>,
    settle_timer: Option<CancellationToken>,
    thinking: bool,
    pending_replies: usize,
    reply_counter: u64,
    stage: Stage,
    walk_active: bool,
    limb_transition: LimbTransition,
    transition_started: Instant,
    pub(crate) speech: SpeechInput,
    dirty: bool,
}

impl ConversationState {
    /// Fresh session state: seeded greeting, idle pose, figure off-stage
    pub fn new(catalog: &Catalog, now: Instant) -> Self {
        let idle = catalog.poses.lookup(names::IDLE);
        let mut state = Self {
            transcript: Vec::new(),
            next_message_id: 0,
            pose: idle.name.clone(),
            emotion: idle.emotion.clone(),
            caption: ARRIVING_CAPTION.to_string(),
            bubble: SpeechBubble::default(),
            bubble_timer: None,
            settle_timer: None,
            thinking: false,
            pending_replies: 0,
            reply_counter: 0,
            stage: Stage::offstage(),
            walk_active: false,
            limb_transition: LimbTransition::settled(idle.limbs),
            transition_started: now,
            speech: SpeechInput::new(false),
            dirty: true,
        };
        state.push_message(Role::Companion, &catalog.greeting, None);
        state
    }

    pub fn push_message(&mut self, role: Role, text: &str, pose: Option<String>) -> ChatMessage {
        let message = ChatMessage {
            id: self.next_message_id,
            role,
            text: text.to_string(),
            pose,
            sent_at: Utc::now(),
        };
        self.next_message_id += 1;
        self.transcript.push(message.clone());
        message
    }

    /// Switch to `name` (idle if unknown) and start an eased limb transition
    /// from wherever the limbs currently are. Returns the resolved pose name.
    pub fn apply_pose(
        &mut self,
        poses: &PoseTable,
        name: &str,
        transition: Duration,
        now: Instant,
    ) -> String {
        let from = current_limbs(
            poses.lookup(&self.pose),
            self.stage.walk_progress,
            &self.limb_transition,
            now.saturating_duration_since(self.transition_started),
        );
        let descriptor = poses.lookup(name);
        self.pose = descriptor.name.clone();
        self.emotion = descriptor.emotion.clone();
        self.caption = descriptor.caption.clone();
        self.limb_transition = LimbTransition {
            from,
            duration: transition,
        };
        self.transition_started = now;
        self.dirty = true;
        self.pose.clone()
    }

    /// Show `text` in the bubble, superseding any pending auto-hide. The
    /// returned token identifies this bubble's hide timer.
    pub fn show_speech(&mut self, text: &str) -> CancellationToken {
        if let Some(previous) = self.bubble_timer.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        self.bubble_timer = Some(token.clone());
        self.bubble = SpeechBubble {
            text: text.to_string(),
            visible: true,
        };
        self.dirty = true;
        token
    }

    /// Hide the bubble unless `token`'s window was superseded
    pub fn hide_speech(&mut self, token: &CancellationToken) -> bool {
        if token.is_cancelled() {
            return false;
        }
        self.bubble.visible = false;
        self.bubble_timer = None;
        self.dirty = true;
        true
    }

    /// Arm a fresh idle-revert timer, cancelling the previous one
    pub fn arm_settle_timer(&mut self) -> CancellationToken {
        self.cancel_settle_timer();
        let token = CancellationToken::new();
        self.settle_timer = Some(token.clone());
        token
    }

    pub fn cancel_settle_timer(&mut self) {
        if let Some(previous) = self.settle_timer.take() {
            previous.cancel();
        }
    }

    /// Revert to idle unless `token` was superseded
    pub fn settle(
        &mut self,
        token: &CancellationToken,
        poses: &PoseTable,
        transition: Duration,
        now: Instant,
    ) -> bool {
        if token.is_cancelled() {
            return false;
        }
        self.settle_timer = None;
        self.apply_pose(poses, names::IDLE, transition, now);
        true
    }

    /// A user message is waiting for its reply
    pub fn begin_reply_wait(&mut self) {
        self.pending_replies += 1;
        self.thinking = true;
        self.dirty = true;
    }

    /// The oldest waiting message got past its thinking delay. Returns the
    /// counter value for this exchange and advances the counter.
    pub fn finish_reply_wait(&mut self) -> u64 {
        self.pending_replies = self.pending_replies.saturating_sub(1);
        self.thinking = self.pending_replies > 0;
        let counter = self.reply_counter;
        self.reply_counter += 1;
        self.dirty = true;
        counter
    }

    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
        self.dirty = true;
    }

    /// Claim the stage for a walk. Fails if another walk is running.
    pub fn begin_walk(&mut self) -> bool {
        if self.walk_active {
            return false;
        }
        self.walk_active = true;
        true
    }

    pub fn end_walk(&mut self) {
        self.walk_active = false;
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    /// Whether a submitted message is still waiting for its reply
    pub fn has_pending_replies(&self) -> bool {
        self.pending_replies > 0
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn frame(&self, poses: &PoseTable, now: Instant) -> Frame {
        let elapsed = now.saturating_duration_since(self.transition_started);
        Frame {
            pose: self.pose.clone(),
            emotion: self.emotion.clone(),
            caption: self.caption.clone(),
            thinking: self.thinking,
            stage: self.stage,
            bubble: self.bubble.clone(),
            figure: render_figure(
                poses.lookup(&self.pose),
                self.stage.walk_progress,
                &self.limb_transition,
                elapsed,
            ),
        }
    }

    /// Frame for this tick, if anything visible can have changed since the
    /// last one
    pub fn take_frame(&mut self, poses: &PoseTable, now: Instant) -> Option<Frame> {
        let elapsed = now.saturating_duration_since(self.transition_started);
        let easing = !self.limb_transition.is_complete(elapsed);
        if !(self.dirty || easing || self.stage.is_walking()) {
            return None;
        }
        self.dirty = false;
        Some(self.frame(poses, now))
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            transcript: self.transcript.clone(),
            pose: self.pose.clone(),
            emotion: self.emotion.clone(),
            caption: self.caption.clone(),
            bubble: self.bubble.clone(),
            thinking: self.thinking,
            reply_counter: self.reply_counter,
            stage: self.stage,
            recording: self.speech.recording(),
        }
    }
}

#[cfg(test)]
impl ConversationState {
    pub fn pose(&self) -> &str {
        &self.pose
    }

    pub fn reply_counter(&self) -> u64 {
        self.reply_counter
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_walking(&self) -> bool {
        self.walk_active
    }

    /// Whether any bubble or idle-revert timer is pending
    pub fn has_pending_timers(&self) -> bool {
        self.bubble_timer.is_some() || self.settle_timer.is_some()
    }
}

//! Submit and the reply half of each exchange.
//!
//! `submit` records the user message and goes into the listening pose right
//! away. The reply half (thinking delay, reply selection, optional interlude,
//! reveal) runs on a per-session FIFO worker, so exchanges never overlap and
//! every user message gets exactly one reply, in order.

use rand::Rng;
use std::time::Duration;
use strum::Display;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::catalog::names;
use crate::config::CompanionConfig;

use super::{CompanionSession, Role, SessionEvent};

/// User text waiting for its reply
#[derive(Debug)]
pub(super) struct PendingExchange {
    text: String,
}

/// Scripted movement inserted before some replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Interlude {
    None,
    Stretch,
    Walk,
}

impl Interlude {
    /// Interlude for the exchange that brought the reply counter to
    /// `completed`. A frequency of 0 disables that interlude.
    pub fn for_exchange(completed: u64, config: &CompanionConfig) -> Self {
        let every = |n: u64| n > 0 && completed > 0 && completed % n == 0;
        if every(config.walk_every) {
            Self::Walk
        } else if every(config.stretch_every) {
            Self::Stretch
        } else {
            Self::None
        }
    }
}

impl CompanionSession {
    /// Submit user text. Blank input (after trimming) is ignored and returns
    /// false without touching any state.
    pub async fn submit(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        let message = {
            let mut state = self.state.lock().await;
            let message = state.push_message(Role::User, text, None);
            state.cancel_settle_timer();
            state.apply_pose(
                &self.catalog.poses,
                names::NODDING,
                self.config.limb_transition(),
                Instant::now(),
            );
            state.begin_reply_wait();
            message
        };
        debug!(session_id = %self.id, message_id = message.id, "User message submitted");
        self.emit(SessionEvent::Message { message });

        let pending = PendingExchange {
            text: text.to_string(),
        };
        if self.exchanges.send(pending).is_err() {
            warn!(session_id = %self.id, "Exchange worker gone, message will not be answered");
        }
        true
    }

    pub(super) fn spawn_exchange_worker(
        &self,
        mut queue: mpsc::UnboundedReceiver<PendingExchange>,
    ) {
        let session = self.clone();
        tokio::spawn(async move {
            loop {
                let pending = tokio::select! {
                    _ = session.shutdown.cancelled() => break,
                    pending = queue.recv() => match pending {
                        Some(pending) => pending,
                        None => break,
                    },
                };
                if !session.run_exchange(pending).await {
                    break;
                }
            }
            debug!(session_id = %session.id, "Exchange worker stopped");
        });
    }

    /// Returns false if the session closed midway
    async fn run_exchange(&self, pending: PendingExchange) -> bool {
        let delay = self.thinking_delay().await;
        if !self.pause(delay).await {
            return false;
        }

        let counter = {
            let mut state = self.state.lock().await;
            state.cancel_settle_timer();
            state.finish_reply_wait()
        };

        let reply = self.catalog.replies.select(counter);
        let pose = self
            .catalog
            .keywords
            .classify(&pending.text)
            .unwrap_or(reply.pose.as_str());

        let interlude = Interlude::for_exchange(counter + 1, &self.config);
        debug!(
            session_id = %self.id,
            counter,
            pose,
            interlude = %interlude,
            "Reply selected"
        );
        let completed = match interlude {
            Interlude::None => true,
            Interlude::Stretch => self.stretch().await,
            Interlude::Walk => {
                if self.walk_interlude().await {
                    true
                } else {
                    self.stretch().await
                }
            }
        };
        if !completed || self.is_closed() {
            return false;
        }

        let message = {
            let mut state = self.state.lock().await;
            let resolved = state.apply_pose(
                &self.catalog.poses,
                pose,
                self.config.limb_transition(),
                Instant::now(),
            );
            let message = state.push_message(Role::Companion, &reply.text, Some(resolved));
            let bubble = state.show_speech(&reply.speech);
            self.schedule_hide(bubble, self.config.bubble());
            // a queued exchange takes over the pose instead of an idle revert
            if !state.has_pending_replies() {
                let settle = state.arm_settle_timer();
                self.schedule_settle(settle);
            }
            message
        };
        self.emit(SessionEvent::Message { message });
        true
    }

    async fn thinking_delay(&self) -> Duration {
        let (min, max) = (self.config.thinking_min_ms, self.config.thinking_max_ms);
        let ms = self.rng.lock().await.gen_range(min..max);
        Duration::from_millis(ms)
    }
}

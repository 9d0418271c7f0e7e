//! Pose and speech-bubble changes, with their supersedable timers.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::CompanionSession;

impl CompanionSession {
    /// Switch to pose `name`; unknown names apply idle. Returns the pose that
    /// was actually applied.
    pub async fn apply_pose(&self, name: &str) -> String {
        let mut state = self.state.lock().await;
        state.apply_pose(
            &self.catalog.poses,
            name,
            self.config.limb_transition(),
            Instant::now(),
        )
    }

    /// Show `text` in the bubble for `duration`. Calling again before the
    /// window ends restarts it with the new text.
    pub async fn show_speech(&self, text: &str, duration: Duration) {
        let token = self.state.lock().await.show_speech(text);
        self.schedule_hide(token, duration);
    }

    /// Hide the bubble after `duration` unless `token` is cancelled first
    pub(super) fn schedule_hide(&self, token: CancellationToken, duration: Duration) {
        let session = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = session.shutdown.cancelled() => {}
                _ = tokio::time::sleep(duration) => {
                    session.state.lock().await.hide_speech(&token);
                }
            }
        });
    }

    /// Revert to idle after the settle delay unless a newer exchange arms its
    /// own timer or a submit cancels this one
    pub(super) fn schedule_settle(&self, token: CancellationToken) {
        let session = self.clone();
        let delay = self.config.settle();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = session.shutdown.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let settled = session.state.lock().await.settle(
                        &token,
                        &session.catalog.poses,
                        session.config.limb_transition(),
                        Instant::now(),
                    );
                    if settled {
                        debug!(session_id = %session.id, "Settled back to idle");
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::settled_session;
    use crate::catalog::names;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_apply_unknown_pose_matches_idle() {
        let (session, _rx) = settled_session(21).await;
        session.apply_pose(names::HAPPY).await;
        assert_eq!(session.apply_pose("cartwheel").await, names::IDLE);
        let unknown = session.snapshot().await;

        session.apply_pose(names::HAPPY).await;
        session.apply_pose(names::IDLE).await;
        let idle = session.snapshot().await;

        assert_eq!(unknown.pose, idle.pose);
        assert_eq!(unknown.emotion, idle.emotion);
        assert_eq!(unknown.caption, idle.caption);
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_bubble_hides_after_window() {
        let (session, _rx) = settled_session(22).await;
        session.show_speech("hi", Duration::from_millis(1000)).await;
        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(session.snapshot().await.bubble.visible);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!session.snapshot().await.bubble.visible);
        session.close();
    }
}

//! Tick-driven movement: walk-in, walk interlude, stretching pause and the
//! render loop.

use rand::Rng;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

use crate::animation::{WalkIn, WalkInterlude, interlude_target};
use crate::catalog::names;

use super::{CompanionSession, SessionEvent};

/// Walk interlude turnaround distance from center, percentage points
const INTERLUDE_DISTANCE: std::ops::Range<f32> = 15.0..30.0;

impl CompanionSession {
    pub(super) fn spawn_walk_in(&self) {
        let session = self.clone();
        tokio::spawn(async move {
            session.run_walk_in().await;
        });
    }

    /// Walk from off-stage to center, settle into idle, then greet
    async fn run_walk_in(&self) {
        if !self.state.lock().await.begin_walk() {
            return;
        }
        let tick = self.config.tick();
        let mut ticker = interval_at(Instant::now() + tick, tick);
        let mut walk = WalkIn::new(self.config.walk_in_step, self.config.walk_in_span);

        while !walk.is_done() {
            tokio::select! {
                _ = self.shutdown.cancelled() => return,
                _ = ticker.tick() => {
                    self.state.lock().await.set_stage(walk.step());
                }
            }
        }

        {
            let mut state = self.state.lock().await;
            state.end_walk();
            if !state.is_thinking() {
                state.apply_pose(
                    &self.catalog.poses,
                    names::IDLE,
                    self.config.limb_transition(),
                    Instant::now(),
                );
            }
        }
        debug!(session_id = %self.id, "Walk-in finished");

        if self.pause(self.config.greeting_delay()).await {
            self.show_speech(&self.catalog.welcome_bubble, self.config.greeting())
                .await;
        }
    }

    /// Walk to a random side and back. Returns false without moving if
    /// another walk is running or the session closed.
    pub(super) async fn walk_interlude(&self) -> bool {
        let origin = {
            let mut state = self.state.lock().await;
            if !state.begin_walk() {
                debug!(session_id = %self.id, "Walk already active, skipping interlude walk");
                return false;
            }
            state.apply_pose(
                &self.catalog.poses,
                names::WALKING,
                self.config.limb_transition(),
                Instant::now(),
            );
            state.stage().x
        };

        let target = {
            let mut rng = self.rng.lock().await;
            interlude_target(rng.gen_range(INTERLUDE_DISTANCE), rng.gen_bool(0.5))
        };
        let tick = self.config.tick();
        let mut ticker = interval_at(Instant::now() + tick, tick);
        let mut walk = WalkInterlude::new(origin, target, self.config.walk_leg_ticks());

        let mut completed = true;
        while !walk.is_done() {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    completed = false;
                    break;
                }
                _ = ticker.tick() => {
                    self.state.lock().await.set_stage(walk.step());
                }
            }
        }
        self.state.lock().await.end_walk();
        completed
    }

    /// Hold the stretching pose. Returns false if the session closed.
    pub(super) async fn stretch(&self) -> bool {
        self.apply_pose(names::STRETCHING).await;
        self.pause(self.config.stretch()).await
    }

    pub(super) fn spawn_render_loop(&self) {
        let session = self.clone();
        tokio::spawn(async move {
            let tick = session.config.tick();
            let mut ticker = interval_at(Instant::now(), tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = session.shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let frame = session
                            .state
                            .lock()
                            .await
                            .take_frame(&session.catalog.poses, Instant::now());
                        if let Some(frame) = frame {
                            session.emit(SessionEvent::Frame { frame });
                        }
                    }
                }
            }
            debug!(session_id = %session.id, "Render loop stopped");
        });
    }
}

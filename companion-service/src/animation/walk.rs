//! Tick-driven walk interpolators.
//!
//! Progress runs 0..100 where 100 means settled; anything below 100 makes the
//! figure renderer use the gait instead of the static pose.

use serde::Serialize;

use super::easing::{ease_in_out_sine, lerp};

/// Horizontal position (percent of stage width) where the figure enters
pub const OFFSTAGE_X: f32 = -30.0;
/// Resting horizontal position
pub const CENTER_X: f32 = 50.0;
/// Progress value meaning "not moving"
pub const SETTLED: f32 = 100.0;

/// Gait progress added per tick, shared by walk-in and interlude
const GAIT_STEP: f32 = 2.2;
/// Interlude progress stays below this so it never reads as settled
const MAX_MOVING_PROGRESS: f32 = 99.0;

/// Where the figure stands on stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stage {
    pub x: f32,
    pub opacity: f32,
    pub walk_progress: f32,
}

impl Stage {
    pub fn offstage() -> Self {
        Self {
            x: OFFSTAGE_X,
            opacity: 0.0,
            walk_progress: 0.0,
        }
    }

    pub fn settled() -> Self {
        Self {
            x: CENTER_X,
            opacity: 1.0,
            walk_progress: SETTLED,
        }
    }

    pub fn is_walking(&self) -> bool {
        self.walk_progress < SETTLED
    }
}

/// Entrance from off-stage to center with a fade-in
#[derive(Debug, Clone)]
pub struct WalkIn {
    progress: f32,
    step: f32,
    span: f32,
    done: bool,
}

impl WalkIn {
    pub fn new(step: f32, span: f32) -> Self {
        Self {
            progress: 0.0,
            step,
            span,
            done: false,
        }
    }

    /// Advance one tick. Once finished every call returns the settled stage.
    pub fn step(&mut self) -> Stage {
        if self.done {
            return Stage::settled();
        }
        self.progress += self.step;
        let t = (self.progress / self.span).min(1.0);
        if t >= 1.0 {
            self.done = true;
            return Stage::settled();
        }
        Stage {
            x: lerp(OFFSTAGE_X, CENTER_X, t),
            opacity: (t * 3.0).min(1.0),
            walk_progress: self.progress,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Walk from center to an offset and back, each leg eased sinusoidally
#[derive(Debug, Clone)]
pub struct WalkInterlude {
    origin: f32,
    target: f32,
    leg_ticks: u32,
    tick: u32,
}

impl WalkInterlude {
    pub fn new(origin: f32, target: f32, leg_ticks: u32) -> Self {
        Self {
            origin,
            target,
            leg_ticks: leg_ticks.max(1),
            tick: 0,
        }
    }

    pub fn total_ticks(&self) -> u32 {
        self.leg_ticks * 2
    }

    pub fn is_done(&self) -> bool {
        self.tick >= self.total_ticks()
    }

    /// Advance one tick. The last tick lands on the origin, settled.
    pub fn step(&mut self) -> Stage {
        if self.is_done() {
            return self.finished();
        }
        self.tick += 1;
        if self.is_done() {
            return self.finished();
        }

        let (from, to, leg_tick) = if self.tick <= self.leg_ticks {
            (self.origin, self.target, self.tick)
        } else {
            (self.target, self.origin, self.tick - self.leg_ticks)
        };
        let t = leg_tick as f32 / self.leg_ticks as f32;
        Stage {
            x: lerp(from, to, ease_in_out_sine(t)),
            opacity: 1.0,
            walk_progress: (leg_tick as f32 * GAIT_STEP).min(MAX_MOVING_PROGRESS),
        }
    }

    fn finished(&self) -> Stage {
        Stage {
            x: self.origin,
            opacity: 1.0,
            walk_progress: SETTLED,
        }
    }
}

/// Turnaround point for an interlude: `distance` percentage points to the
/// chosen side of center, kept inside the visible [10, 90] band.
pub fn interlude_target(distance: f32, to_left: bool) -> f32 {
    let offset = if to_left { -distance } else { distance };
    (CENTER_X + offset).clamp(10.0, 90.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_walk_in() -> Vec<Stage> {
        let mut walk = WalkIn::new(2.2, 52.0);
        let mut samples = Vec::new();
        while !walk.is_done() {
            samples.push(walk.step());
        }
        samples
    }

    #[test]
    fn test_walk_in_starts_offstage_and_ends_centered() {
        assert!(!(0.0..=100.0).contains(&Stage::offstage().x));
        let samples = run_walk_in();
        let first = samples.first().unwrap();
        assert!(first.x < 0.0);
        let last = samples.last().unwrap();
        assert_eq!(last.x, CENTER_X);
        assert_eq!(last.opacity, 1.0);
        assert_eq!(last.walk_progress, SETTLED);
        assert_eq!(samples.len(), 24);
    }

    #[test]
    fn test_walk_in_is_monotonic() {
        let samples = run_walk_in();
        for pair in samples.windows(2) {
            assert!(pair[1].x >= pair[0].x);
            assert!(pair[1].opacity >= pair[0].opacity);
            assert!(pair[1].walk_progress >= pair[0].walk_progress);
        }
        assert!(samples[..samples.len() - 1].iter().all(Stage::is_walking));
    }

    #[test]
    fn test_walk_in_saturates() {
        let mut walk = WalkIn::new(2.2, 52.0);
        for _ in 0..100 {
            walk.step();
        }
        assert_eq!(walk.step(), Stage::settled());
    }

    #[test]
    fn test_interlude_goes_out_and_back() {
        let mut walk = WalkInterlude::new(CENTER_X, 75.0, 10);
        let samples: Vec<Stage> = (0..walk.total_ticks()).map(|_| walk.step()).collect();
        assert!(walk.is_done());

        let turnaround = samples[9];
        assert!((turnaround.x - 75.0).abs() < 1e-3);
        assert!(turnaround.is_walking());

        let last = samples.last().unwrap();
        assert_eq!(last.x, CENTER_X);
        assert!(!last.is_walking());
        assert!(samples[..samples.len() - 1].iter().all(Stage::is_walking));
    }

    #[test]
    fn test_interlude_target_clamped() {
        assert_eq!(interlude_target(20.0, false), 70.0);
        assert_eq!(interlude_target(20.0, true), 30.0);
        assert_eq!(interlude_target(60.0, true), 10.0);
        assert_eq!(interlude_target(60.0, false), 90.0);
    }
}

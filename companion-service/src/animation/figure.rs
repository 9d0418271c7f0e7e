//! Figure geometry for one frame.
//!
//! Limbs are quadratic curves from fixed body anchors to the endpoint of the
//! current pose. While walking the endpoints come from the gait function
//! instead; between static poses they ease with a spring overshoot.

use serde::Serialize;
use std::time::Duration;

use crate::catalog::{BodyAnimation, HeadAnimation, Limbs, Point, PoseDescriptor};

use super::easing::{ease_out_back, lerp};

pub const SHOULDER: Point = Point::new(100.0, 125.0);
pub const HIP: Point = Point::new(100.0, 220.0);

/// Sideways bow of a limb curve, in figure units
const LIMB_BEND: f32 = 8.0;
const FOOT_LENGTH: f32 = 22.0;
const FOOT_DROP: f32 = 10.0;

const GAIT_FREQUENCY: f32 = 0.4;
const LEG_SWING: f32 = 18.0;
const LEG_LIFT: f32 = 8.0;
const ARM_SWING: f32 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Curve {
    pub start: Point,
    pub control: Point,
    pub end: Point,
}

impl Curve {
    /// Curve from `start` to `end`, bowed to the left (`bend < 0`) or right
    pub fn bowed(start: Point, end: Point, bend: f32) -> Self {
        let (dx, dy) = (end.x - start.x, end.y - start.y);
        let len = (dx * dx + dy * dy).sqrt().max(f32::EPSILON);
        let mid = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
        Self {
            start,
            control: Point::new(mid.x - dy / len * bend, mid.y + dx / len * bend),
            end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// Renderable description of the figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureGeometry {
    pub arm_left: Curve,
    pub arm_right: Curve,
    pub leg_left: Curve,
    pub leg_right: Curve,
    pub foot_left: Segment,
    pub foot_right: Segment,
    pub mouth: String,
    pub head: HeadAnimation,
    pub body: BodyAnimation,
    pub walking: bool,
}

/// Limb endpoints at a walk-cycle phase derived from walk progress.
/// Arms swing against the legs.
pub fn gait_limbs(base: &Limbs, walk_progress: f32) -> Limbs {
    let swing = (walk_progress * GAIT_FREQUENCY).sin();
    Limbs {
        arm_left: Point::new(base.arm_left.x - swing * ARM_SWING, base.arm_left.y),
        arm_right: Point::new(base.arm_right.x - swing * ARM_SWING, base.arm_right.y),
        leg_left: Point::new(
            base.leg_left.x + swing * LEG_SWING,
            base.leg_left.y - swing.max(0.0) * LEG_LIFT,
        ),
        leg_right: Point::new(
            base.leg_right.x - swing * LEG_SWING,
            base.leg_right.y - (-swing).max(0.0) * LEG_LIFT,
        ),
    }
}

/// Eased move between two sets of static limb endpoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimbTransition {
    pub from: Limbs,
    pub duration: Duration,
}

impl LimbTransition {
    /// A transition that is already complete
    pub fn settled(at: Limbs) -> Self {
        Self {
            from: at,
            duration: Duration::ZERO,
        }
    }

    pub fn is_complete(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }

    pub fn limbs_at(&self, to: &Limbs, elapsed: Duration) -> Limbs {
        if self.is_complete(elapsed) {
            return *to;
        }
        let t = ease_out_back(elapsed.as_secs_f32() / self.duration.as_secs_f32());
        let mix = |a: Point, b: Point| Point::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t));
        Limbs {
            arm_left: mix(self.from.arm_left, to.arm_left),
            arm_right: mix(self.from.arm_right, to.arm_right),
            leg_left: mix(self.from.leg_left, to.leg_left),
            leg_right: mix(self.from.leg_right, to.leg_right),
        }
    }
}

/// Limb endpoints shown for `pose`: the gait while walking (no easing),
/// otherwise the eased transition toward the pose's static endpoints.
pub fn current_limbs(
    pose: &PoseDescriptor,
    walk_progress: f32,
    transition: &LimbTransition,
    elapsed: Duration,
) -> Limbs {
    if walk_progress < super::walk::SETTLED {
        gait_limbs(&pose.limbs, walk_progress)
    } else {
        transition.limbs_at(&pose.limbs, elapsed)
    }
}

/// Geometry for one frame. Pure; safe to call on every tick.
pub fn render_figure(
    pose: &PoseDescriptor,
    walk_progress: f32,
    transition: &LimbTransition,
    elapsed: Duration,
) -> FigureGeometry {
    let limbs = current_limbs(pose, walk_progress, transition, elapsed);
    let foot = |end: Point, dir: f32| Segment {
        start: end,
        end: Point::new(end.x + dir * FOOT_LENGTH, end.y + FOOT_DROP),
    };

    FigureGeometry {
        arm_left: Curve::bowed(SHOULDER, limbs.arm_left, LIMB_BEND),
        arm_right: Curve::bowed(SHOULDER, limbs.arm_right, -LIMB_BEND),
        leg_left: Curve::bowed(HIP, limbs.leg_left, LIMB_BEND),
        leg_right: Curve::bowed(HIP, limbs.leg_right, -LIMB_BEND),
        foot_left: foot(limbs.leg_left, -1.0),
        foot_right: foot(limbs.leg_right, 1.0),
        mouth: pose.mouth.svg_path(),
        head: pose.head,
        body: pose.body,
        walking: walk_progress < super::walk::SETTLED,
    }
}

//! The Pose Table: static limb/mouth/label data keyed by pose name.
//!
//! Coordinates live in a 200x440 figure box. Arm curves start at the shoulder
//! anchor (100,125) and leg curves at the hip anchor (100,220); the mouth is a
//! quadratic curve inside the head (centered near 100,56).

use serde::Serialize;
use std::collections::HashMap;
use strum::{AsRefStr, Display, EnumString};

/// Pose names the controller relies on
pub mod names {
    pub const IDLE: &str = "idle";
    pub const TALKING: &str = "talking";
    pub const NODDING: &str = "nodding";
    pub const THINKING: &str = "thinking";
    pub const HAPPY: &str = "happy";
    pub const SURPRISED: &str = "surprised";
    pub const SAD: &str = "sad";
    pub const STRETCHING: &str = "stretching";
    pub const WALKING: &str = "walking";
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Endpoints of the four limbs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Limbs {
    pub arm_left: Point,
    pub arm_right: Point,
    pub leg_left: Point,
    pub leg_right: Point,
}

impl Limbs {
    pub const fn new(arm_left: Point, arm_right: Point, leg_left: Point, leg_right: Point) -> Self {
        Self {
            arm_left,
            arm_right,
            leg_left,
            leg_right,
        }
    }
}

/// Quadratic mouth curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MouthCurve {
    pub start: Point,
    pub control: Point,
    pub end: Point,
}

impl MouthCurve {
    pub const fn new(start: Point, control: Point, end: Point) -> Self {
        Self {
            start,
            control,
            end,
        }
    }

    /// SVG path data, e.g. `M 88 68 Q 100 78 112 68`
    pub fn svg_path(&self) -> String {
        format!(
            "M {} {} Q {} {} {} {}",
            self.start.x, self.start.y, self.control.x, self.control.y, self.end.x, self.end.y
        )
    }
}

/// Looping head animation played while a pose is held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HeadAnimation {
    /// Slow bob
    Idle,
    /// Side-to-side rock
    Talking,
    /// Down-and-tilt nod
    Nodding,
}

/// Looping body animation played while a pose is held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BodyAnimation {
    Still,
    Bounce,
    Jolt,
    Droop,
    Reach,
    Stride,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseDescriptor {
    pub name: String,
    pub limbs: Limbs,
    pub mouth: MouthCurve,
    pub emotion: String,
    pub caption: String,
    pub head: HeadAnimation,
    pub body: BodyAnimation,
}

/// Pose lookup that always succeeds: names missing from the table resolve to
/// the idle pose, which the table is guaranteed to contain.
#[derive(Debug, Clone)]
pub struct PoseTable {
    poses: HashMap<String, PoseDescriptor>,
    order: Vec<String>,
    fallback: PoseDescriptor,
}

impl PoseTable {
    /// Build a table from descriptors. A later descriptor with the same name
    /// replaces an earlier one. If no idle pose is given the built-in one is
    /// added.
    pub fn new(descriptors: impl IntoIterator<Item = PoseDescriptor>) -> Self {
        let mut poses = HashMap::new();
        let mut order = Vec::new();
        for descriptor in descriptors {
            if !poses.contains_key(&descriptor.name) {
                order.push(descriptor.name.clone());
            }
            poses.insert(descriptor.name.clone(), descriptor);
        }
        let fallback = match poses.get(names::IDLE) {
            Some(descriptor) => descriptor.clone(),
            None => {
                let descriptor = idle();
                order.push(descriptor.name.clone());
                poses.insert(descriptor.name.clone(), descriptor.clone());
                descriptor
            }
        };
        Self {
            poses,
            order,
            fallback,
        }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_poses())
    }

    pub fn lookup(&self, name: &str) -> &PoseDescriptor {
        self.poses.get(name).unwrap_or(&self.fallback)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.poses.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Descriptors in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &PoseDescriptor> {
        self.order.iter().filter_map(|name| self.poses.get(name))
    }
}

fn pose(
    name: &str,
    limbs: Limbs,
    mouth: MouthCurve,
    emotion: &str,
    caption: &str,
    head: HeadAnimation,
    body: BodyAnimation,
) -> PoseDescriptor {
    PoseDescriptor {
        name: name.to_string(),
        limbs,
        mouth,
        emotion: emotion.to_string(),
        caption: caption.to_string(),
        head,
        body,
    }
}

const fn mouth(x1: f32, y1: f32, cx: f32, cy: f32, x2: f32, y2: f32) -> MouthCurve {
    MouthCurve::new(Point::new(x1, y1), Point::new(cx, cy), Point::new(x2, y2))
}

const fn limbs(arm_l: (f32, f32), arm_r: (f32, f32), leg_l: (f32, f32), leg_r: (f32, f32)) -> Limbs {
    Limbs::new(
        Point::new(arm_l.0, arm_l.1),
        Point::new(arm_r.0, arm_r.1),
        Point::new(leg_l.0, leg_l.1),
        Point::new(leg_r.0, leg_r.1),
    )
}

fn idle() -> PoseDescriptor {
    pose(
        names::IDLE,
        limbs((62.0, 175.0), (138.0, 175.0), (72.0, 320.0), (128.0, 320.0)),
        mouth(88.0, 68.0, 100.0, 78.0, 112.0, 68.0),
        "IDLE",
        "waiting for you...",
        HeadAnimation::Idle,
        BodyAnimation::Still,
    )
}

fn builtin_poses() -> Vec<PoseDescriptor> {
    use BodyAnimation as B;
    use HeadAnimation as H;

    vec![
        idle(),
        pose(
            names::TALKING,
            limbs((54.0, 158.0), (148.0, 168.0), (72.0, 320.0), (128.0, 320.0)),
            mouth(86.0, 66.0, 100.0, 80.0, 114.0, 66.0),
            "TALKING",
            "responding...",
            H::Talking,
            B::Still,
        ),
        pose(
            names::NODDING,
            limbs((64.0, 180.0), (136.0, 180.0), (72.0, 320.0), (128.0, 320.0)),
            mouth(89.0, 67.0, 100.0, 75.0, 111.0, 67.0),
            "LISTENING",
            "i hear you...",
            H::Nodding,
            B::Still,
        ),
        // left hand near chin
        pose(
            names::THINKING,
            limbs((84.0, 118.0), (148.0, 175.0), (72.0, 320.0), (128.0, 320.0)),
            mouth(90.0, 70.0, 100.0, 66.0, 110.0, 70.0),
            "THINKING",
            "hmm...",
            H::Idle,
            B::Still,
        ),
        pose(
            names::HAPPY,
            limbs((30.0, 130.0), (170.0, 130.0), (66.0, 318.0), (134.0, 318.0)),
            mouth(85.0, 65.0, 100.0, 82.0, 115.0, 65.0),
            "HAPPY!",
            "love that!",
            H::Idle,
            B::Bounce,
        ),
        pose(
            names::SURPRISED,
            limbs((28.0, 128.0), (172.0, 128.0), (68.0, 322.0), (132.0, 322.0)),
            mouth(90.0, 66.0, 100.0, 82.0, 110.0, 66.0),
            "WOW",
            "no way!",
            H::Idle,
            B::Jolt,
        ),
        pose(
            names::SAD,
            limbs((70.0, 190.0), (130.0, 190.0), (76.0, 320.0), (124.0, 320.0)),
            mouth(88.0, 72.0, 100.0, 64.0, 112.0, 72.0),
            "DOWN",
            "that's rough...",
            H::Nodding,
            B::Droop,
        ),
        pose(
            names::STRETCHING,
            limbs((18.0, 105.0), (182.0, 105.0), (58.0, 330.0), (142.0, 330.0)),
            mouth(88.0, 68.0, 100.0, 78.0, 112.0, 68.0),
            "STRETCHING",
            "lemme stretch...",
            H::Idle,
            B::Reach,
        ),
        // static stance only; the gait function drives limbs while moving
        pose(
            names::WALKING,
            limbs((66.0, 172.0), (134.0, 172.0), (80.0, 318.0), (120.0, 318.0)),
            mouth(88.0, 68.0, 100.0, 76.0, 112.0, 68.0),
            "WALKING",
            "pacing around...",
            H::Idle,
            B::Stride,
        ),
    ]
}

//! Animation Driver math: walk interpolation and figure geometry.
//!
//! Everything here is a pure function of its inputs; the session's timers
//! decide when to call it.

mod easing;
mod figure;
mod walk;

pub use figure::{FigureGeometry, LimbTransition, current_limbs, render_figure};
pub use walk::{Stage, WalkIn, WalkInterlude, interlude_target};

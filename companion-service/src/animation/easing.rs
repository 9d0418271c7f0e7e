//! Interpolation curves.

use std::f32::consts::PI;

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Sinusoidal ease-in-out over `t` in [0, 1]
pub fn ease_in_out_sine(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    -((PI * t).cos() - 1.0) / 2.0
}

/// Spring-like ease-out that overshoots past 1 before settling
pub fn ease_out_back(t: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    if t <= 0.0 {
        return 0.0;
    }
    let t = t.min(1.0) - 1.0;
    1.0 + C3 * t.powi(3) + C1 * t.powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(lerp(-30.0, 50.0, 0.0), -30.0);
        assert_eq!(lerp(-30.0, 50.0, 1.0), 50.0);
        assert!(ease_in_out_sine(0.0).abs() < 1e-6);
        assert!((ease_in_out_sine(1.0) - 1.0).abs() < 1e-6);
        assert!(ease_out_back(0.0).abs() < 1e-6);
        assert!((ease_out_back(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_back_overshoots() {
        let peak = (1..100)
            .map(|i| ease_out_back(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.05, "expected overshoot, peak was {peak}");
    }

    #[test]
    fn test_sine_is_symmetric() {
        assert!((ease_in_out_sine(0.5) - 0.5).abs() < 1e-6);
        assert!((ease_in_out_sine(0.25) + ease_in_out_sine(0.75) - 1.0).abs() < 1e-6);
    }
}

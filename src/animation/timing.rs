//! Timing functions (easing curves) for animations.
//!
//! A timing function maps normalized time in `[0, 1]` to an interpolation
//! factor. Most curves stay inside `[0, 1]`; `BackOut` and `ElasticOut`
//! overshoot on purpose.
//!
//! Springs are listed here so a [`Transition`](super::Transition) can pick
//! one, but they are integrated with real elapsed time by the animation
//! system rather than evaluated through [`TimingFunction::evaluate`].

use std::f32::consts::PI;
use std::sync::Arc;

use super::spring::SpringConfig;

#[derive(Clone)]
pub enum TimingFunction {
    Linear,
    /// Quadratic
    EaseIn,
    EaseOut,
    EaseInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    ExpoOut,
    /// Slight overshoot before settling
    BackOut,
    ElasticOut,
    BounceOut,
    /// CSS cubic-bezier curve (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
    /// Spring physics, driven by elapsed time instead of a duration
    Spring(SpringConfig),
    Custom(Arc<dyn Fn(f32) -> f32 + Send + Sync>),
}

impl TimingFunction {
    /// Evaluate at normalized time `t`, clamped to `[0, 1]`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
        match self {
            TimingFunction::Linear => t,
            TimingFunction::EaseIn => t * t,
            TimingFunction::EaseOut => t * (2.0 - t),
            TimingFunction::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            TimingFunction::CubicIn => t * t * t,
            TimingFunction::CubicOut => 1.0 - (1.0 - t).powi(3),
            TimingFunction::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            TimingFunction::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            TimingFunction::BackOut => back_out(t),
            TimingFunction::ElasticOut => elastic_out(t),
            TimingFunction::BounceOut => bounce_out(t),
            TimingFunction::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, *x1, *y1, *x2, *y2),
            TimingFunction::Spring(_) => t,
            TimingFunction::Custom(f) => f(t),
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f32) -> f32 + Send + Sync + 'static,
    {
        TimingFunction::Custom(Arc::new(f))
    }

    pub fn is_spring(&self) -> bool {
        matches!(self, TimingFunction::Spring(_))
    }
}

impl Default for TimingFunction {
    fn default() -> Self {
        TimingFunction::EaseOut
    }
}

impl std::fmt::Debug for TimingFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimingFunction::Linear => write!(f, "Linear"),
            TimingFunction::EaseIn => write!(f, "EaseIn"),
            TimingFunction::EaseOut => write!(f, "EaseOut"),
            TimingFunction::EaseInOut => write!(f, "EaseInOut"),
            TimingFunction::CubicIn => write!(f, "CubicIn"),
            TimingFunction::CubicOut => write!(f, "CubicOut"),
            TimingFunction::CubicInOut => write!(f, "CubicInOut"),
            TimingFunction::ExpoOut => write!(f, "ExpoOut"),
            TimingFunction::BackOut => write!(f, "BackOut"),
            TimingFunction::ElasticOut => write!(f, "ElasticOut"),
            TimingFunction::BounceOut => write!(f, "BounceOut"),
            TimingFunction::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "CubicBezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
            TimingFunction::Spring(config) => write!(f, "Spring({:?})", config),
            TimingFunction::Custom(_) => write!(f, "Custom"),
        }
    }
}

fn back_out(t: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    let u = t - 1.0;
    1.0 + C3 * u * u * u + C1 * u * u
}

fn elastic_out(t: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let c4 = (2.0 * PI) / 3.0;
    2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// Newton-Raphson on x, then evaluate y. Assumes x1, x2 in [0, 1].
fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let mut current_t = t;
    for _ in 0..8 {
        let current_x = bezier_component(current_t, x1, x2);
        let current_slope = bezier_slope(current_t, x1, x2);
        if current_slope.abs() < 1e-6 {
            break;
        }
        current_t -= (current_x - t) / current_slope;
    }
    bezier_component(current_t, y1, y2)
}

fn bezier_component(t: f32, p1: f32, p2: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

fn bezier_slope(t: f32, p1: f32, p2: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curves() -> Vec<TimingFunction> {
        vec![
            TimingFunction::Linear,
            TimingFunction::EaseIn,
            TimingFunction::EaseOut,
            TimingFunction::EaseInOut,
            TimingFunction::CubicIn,
            TimingFunction::CubicOut,
            TimingFunction::CubicInOut,
            TimingFunction::ExpoOut,
            TimingFunction::BackOut,
            TimingFunction::ElasticOut,
            TimingFunction::BounceOut,
            TimingFunction::CubicBezier(0.25, 0.1, 0.25, 1.0),
        ]
    }

    #[test]
    fn test_endpoints() {
        for f in curves() {
            assert!(f.evaluate(0.0).abs() < 1e-4, "{:?} at 0", f);
            assert!((f.evaluate(1.0) - 1.0).abs() < 1e-4, "{:?} at 1", f);
        }
    }

    #[test]
    fn test_linear() {
        assert_eq!(TimingFunction::Linear.evaluate(0.5), 0.5);
        assert_eq!(TimingFunction::Linear.evaluate(2.0), 1.0);
    }

    #[test]
    fn test_ease_in_out_shape() {
        assert!(TimingFunction::EaseIn.evaluate(0.5) < 0.5);
        assert!(TimingFunction::EaseOut.evaluate(0.5) > 0.5);
        assert!(TimingFunction::CubicIn.evaluate(0.5) < TimingFunction::EaseIn.evaluate(0.5));
        assert!((TimingFunction::CubicInOut.evaluate(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_back_out_overshoots() {
        let peak = (1..100)
            .map(|i| TimingFunction::BackOut.evaluate(i as f32 / 100.0))
            .fold(0.0f32, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_bounce_out_stays_in_range() {
        for i in 0..=100 {
            let v = TimingFunction::BounceOut.evaluate(i as f32 / 100.0);
            assert!((0.0..=1.0001).contains(&v));
        }
    }

    #[test]
    fn test_custom() {
        let f = TimingFunction::custom(|t| t * 0.5);
        assert_eq!(f.evaluate(1.0), 0.5);
    }
}

/// Configuration for spring physics animation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub mass: f32,
    pub stiffness: f32,
    pub damping: f32,
    /// Position and velocity below which the spring counts as settled
    pub threshold: f32,
}

impl SpringConfig {
    /// Close to critically damped; reaches the target without visible overshoot.
    pub const DEFAULT: Self = Self {
        mass: 1.0,
        stiffness: 170.0,
        damping: 26.0,
        threshold: 0.001,
    };

    /// Bouncy spring with more overshoot
    pub const BOUNCY: Self = Self {
        mass: 1.0,
        stiffness: 200.0,
        damping: 10.0,
        threshold: 0.001,
    };

    pub const SNAPPY: Self = Self {
        mass: 1.0,
        stiffness: 250.0,
        damping: 14.0,
        threshold: 0.001,
    };

    pub const GENTLE: Self = Self {
        mass: 1.0,
        stiffness: 120.0,
        damping: 15.0,
        threshold: 0.001,
    };

    pub fn new(stiffness: f32, damping: f32) -> Self {
        Self {
            stiffness,
            damping,
            ..Self::DEFAULT
        }
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Largest integration step; longer frames are split.
const MAX_STEP: f32 = 1.0 / 120.0;

/// Spring simulation in normalized space: 0 is the start value, 1 the target.
#[derive(Clone, Debug, PartialEq)]
pub struct SpringState {
    pub position: f32,
    pub velocity: f32,
}

impl SpringState {
    pub fn new() -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
        }
    }

    /// Advance by `dt` seconds with semi-implicit Euler and return the position.
    ///
    /// May overshoot 1.0 for underdamped configurations.
    pub fn step(&mut self, dt: f32, config: &SpringConfig) -> f32 {
        if !dt.is_finite() || dt <= 0.0 {
            return self.position;
        }
        let mass = if config.mass > 0.0 { config.mass } else { 1.0 };
        let mut remaining = dt;
        while remaining > 0.0 {
            let h = remaining.min(MAX_STEP);
            let displacement = self.position - 1.0;
            let force = -config.stiffness * displacement - config.damping * self.velocity;
            self.velocity += force / mass * h;
            self.position += self.velocity * h;
            remaining -= h;
        }
        self.position
    }

    pub fn is_settled(&self, threshold: f32) -> bool {
        (self.position - 1.0).abs() < threshold && self.velocity.abs() < threshold
    }
}

impl Default for SpringState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spring_reaches_target() {
        let mut state = SpringState::new();
        let config = SpringConfig::DEFAULT;

        let mut position = 0.0;
        for _ in 0..120 {
            position = state.step(1.0 / 60.0, &config);
        }

        assert!(
            (position - 1.0).abs() < 0.01,
            "Spring should settle near target, got {}",
            position
        );
    }

    #[test]
    fn test_spring_overshoots() {
        let mut state = SpringState::new();
        let config = SpringConfig::BOUNCY;

        let mut max_position: f32 = 0.0;
        for _ in 0..120 {
            let pos = state.step(1.0 / 60.0, &config);
            max_position = max_position.max(pos);
        }

        assert!(
            max_position > 1.0,
            "Bouncy spring should overshoot, max was {}",
            max_position
        );
    }

    #[test]
    fn test_long_frame_is_subdivided() {
        let mut a = SpringState::new();
        let mut b = SpringState::new();
        let config = SpringConfig::DEFAULT;
        a.step(0.1, &config);
        for _ in 0..12 {
            b.step(1.0 / 120.0, &config);
        }
        assert!((a.position - b.position).abs() < 0.02);
        assert!(a.position.is_finite());
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut state = SpringState::new();
        assert_eq!(state.step(0.0, &SpringConfig::DEFAULT), 0.0);
        assert_eq!(state.step(f32::NAN, &SpringConfig::DEFAULT), 0.0);
    }
}

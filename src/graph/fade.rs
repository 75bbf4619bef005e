//! Linear participation ramps.
//!
//! When a node is shown, hidden, or starts/stops taking part in the force
//! simulation, its opacity and force multiplier do not switch instantly. A
//! [`Fade`] ramps linearly between 0 and 1 over [`FADE_DURATION`] simulated
//! time units, advanced by the tick's `dt` rather than wall-clock time.

/// Simulated time units a full 0 -> 1 (or 1 -> 0) ramp takes.
pub const FADE_DURATION: f32 = 2.0;

/// A linear ramp toward an on/off target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    target: bool,
    counter: f32,
    animated: bool,
}

impl Fade {
    /// Create a ramp already settled at `target`.
    pub fn settled(target: bool) -> Self {
        Self {
            target,
            counter: FADE_DURATION,
            animated: true,
        }
    }

    /// Current ramp value in `[0, 1]`.
    pub fn value(&self) -> f32 {
        let progress = (self.counter / FADE_DURATION).clamp(0.0, 1.0);
        if self.target { progress } else { 1.0 - progress }
    }

    pub fn target(&self) -> bool {
        self.target
    }

    /// Whether the ramp has reached its target.
    pub fn is_settled(&self) -> bool {
        self.counter >= FADE_DURATION
    }

    /// Enable or disable ramping. Disabling snaps to the current target.
    pub fn set_animated(&mut self, animated: bool) {
        self.animated = animated;
        if !animated {
            self.counter = FADE_DURATION;
        }
    }

    /// Point the ramp at a new target.
    ///
    /// Reversing mid-ramp continues from the current value instead of jumping.
    pub fn set_target(&mut self, target: bool) {
        if target == self.target {
            return;
        }
        self.target = target;
        self.counter = if self.animated {
            FADE_DURATION - self.counter.min(FADE_DURATION)
        } else {
            FADE_DURATION
        };
    }

    /// Advance the ramp by `dt` simulated time units.
    pub fn advance(&mut self, dt: f32) {
        if dt > 0.0 {
            self.counter = (self.counter + dt).min(FADE_DURATION);
        }
    }
}

impl Default for Fade {
    fn default() -> Self {
        Self::settled(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn test_settled_values() {
        assert_eq!(Fade::settled(true).value(), 1.0);
        assert_eq!(Fade::settled(false).value(), 0.0);
    }

    #[test]
    fn test_fade_in_is_linear() {
        let mut fade = Fade::settled(false);
        fade.set_target(true);
        assert_eq!(fade.value(), 0.0);

        fade.advance(0.5);
        assert!(approx_eq!(f32, fade.value(), 0.25));
        fade.advance(1.0);
        assert!(approx_eq!(f32, fade.value(), 0.75));
        fade.advance(10.0);
        assert_eq!(fade.value(), 1.0);
        assert!(fade.is_settled());
    }

    #[test]
    fn test_reverse_mid_ramp_is_continuous() {
        let mut fade = Fade::settled(true);
        fade.set_target(false);
        fade.advance(0.5);
        let before = fade.value();
        assert!(approx_eq!(f32, before, 0.75));

        fade.set_target(true);
        assert!(approx_eq!(f32, fade.value(), before));
    }

    #[test]
    fn test_not_animated_snaps() {
        let mut fade = Fade::settled(true);
        fade.set_animated(false);
        fade.set_target(false);
        assert_eq!(fade.value(), 0.0);
        assert!(fade.is_settled());
    }

    #[test]
    fn test_zero_dt_does_not_advance() {
        let mut fade = Fade::settled(false);
        fade.set_target(true);
        fade.advance(0.0);
        fade.advance(-1.0);
        assert_eq!(fade.value(), 0.0);
    }
}

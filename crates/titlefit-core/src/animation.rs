#![forbid(unsafe_code)]

//! Composable animation primitives.
//!
//! Time-based animations that produce normalized `f32` values (0.0–1.0).
//! Callers map the normalized value onto their own `from`/`to` range.
//!
//! # Modules
//!
//! - [`spring`]: damped harmonic oscillator on raw `f64` positions.
//! - [`timeline`]: offset-scheduled events with forward/backward playback.

pub mod spring;
pub mod timeline;

use std::time::Duration;

pub use spring::{Spring, SpringParams};
pub use timeline::{Direction, PlaybackState, Timeline};

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f32) -> f32;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-in (slow start).
#[inline]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cubic ease-in.
#[inline]
pub fn ease_in_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}

/// Cubic ease-out.
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Quartic ease-out. Fast departure, long soft landing.
#[inline]
pub fn ease_out_quart(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(4)
}

// ---------------------------------------------------------------------------
// Animation trait
// ---------------------------------------------------------------------------

/// A time-based animation producing values in [0.0, 1.0].
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current output value, clamped to [0.0, 1.0].
    fn value(&self) -> f32;

    /// Reset the animation to its initial state.
    fn reset(&mut self);

    /// Time elapsed past completion.
    /// Returns [`Duration::ZERO`] for animations that never complete.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

// ---------------------------------------------------------------------------
// Fade
// ---------------------------------------------------------------------------

/// Linear progression from 0.0 to 1.0 over a duration, with configurable easing.
///
/// Tracks elapsed time as [`Duration`] internally for precise accumulation
/// (no floating-point drift) and accurate overshoot calculation.
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Fade {
    /// Create a fade with the given duration and default linear easing.
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            easing: linear,
        }
    }

    /// Set the easing function.
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Configured duration.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Raw linear progress (before easing), in [0.0, 1.0].
    pub fn raw_progress(&self) -> f32 {
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }
}

impl Animation for Fade {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        (self.easing)(self.raw_progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}

/// Map a normalized value onto `[from, to]`.
#[inline]
pub fn lerp(from: f64, to: f64, t: f32) -> f64 {
    from + (to - from) * f64::from(t)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MS_100: Duration = Duration::from_millis(100);

    #[test]
    fn easing_endpoints() {
        for easing in [
            linear,
            ease_in,
            ease_out,
            ease_in_out,
            ease_in_cubic,
            ease_out_cubic,
            ease_out_quart,
        ] {
            assert!(easing(0.0).abs() < f32::EPSILON);
            assert!((easing(1.0) - 1.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn easing_clamps_out_of_range() {
        assert!((ease_out_quart(-1.0)).abs() < f32::EPSILON);
        assert!((ease_out_quart(2.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn quart_leads_cubic_leads_quadratic() {
        let t = 0.3;
        assert!(ease_out_quart(t) > ease_out_cubic(t));
        assert!(ease_out_cubic(t) > ease_out(t));
    }

    #[test]
    fn fade_progress_and_completion() {
        let mut fade = Fade::new(Duration::from_millis(400));
        fade.tick(MS_100);
        assert!((fade.value() - 0.25).abs() < 0.001);
        assert!(!fade.is_complete());
        fade.tick(Duration::from_millis(350));
        assert!(fade.is_complete());
        assert_eq!(fade.overshoot(), Duration::from_millis(50));
    }

    #[test]
    fn fade_zero_duration_is_immediately_complete_after_tick() {
        let mut fade = Fade::new(Duration::ZERO);
        assert_eq!(fade.duration(), Duration::from_nanos(1));
        fade.tick(Duration::from_nanos(1));
        assert!(fade.is_complete());
        assert!((fade.value() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn fade_easing_applied() {
        let mut fade = Fade::new(MS_100).easing(ease_in);
        fade.tick(Duration::from_millis(50));
        assert!((fade.value() - 0.25).abs() < 0.001);
    }

    #[test]
    fn fade_reset() {
        let mut fade = Fade::new(MS_100);
        fade.tick(MS_100);
        fade.reset();
        assert!(fade.value().abs() < f32::EPSILON);
        assert!(!fade.is_complete());
    }

    #[test]
    fn lerp_maps_range() {
        assert!((lerp(10.0, 20.0, 0.5) - 15.0).abs() < f64::EPSILON);
        assert!((lerp(20.0, 10.0, 1.0) - 10.0).abs() < f64::EPSILON);
    }
}

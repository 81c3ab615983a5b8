#![forbid(unsafe_code)]

//! Spring-driven motion for one scalar.
//!
//! A [`Spring`] pulls a value toward its target with a restoring force
//! proportional to the remaining distance, slowed by drag proportional to
//! its speed:
//!
//! ```text
//! a = -k (x - target) - c v
//! ```
//!
//! Badges use soft springs (`k` 30 to 40). With `c` below `2 sqrt(k)` the
//! value overshoots slightly before it settles; above it, it creeps in.
//!
//! Time is integrated with semi-implicit Euler in slices of at most 4 ms, so
//! a long frame produces the same curve as many short ones.
//!
//! # Invariants
//!
//! 1. A resting spring does not move until `set_target()`, `snap_to()` or
//!    `reset()`.
//! 2. `set_target()` keeps position and velocity: a reversal mid-flight is
//!    continuous.
//! 3. On coming to rest the value is snapped exactly onto the target.
//! 4. Stiffness is at least 0.1 and damping at least 0.

use std::time::Duration;

use super::Animation;

/// Longest integration slice, in seconds.
const SLICE_SECS: f64 = 0.004;

const REST_DISTANCE: f64 = 0.001;
const REST_SPEED: f64 = 0.01;

/// Floor for stiffness; a spring with no pull never settles.
const STIFFNESS_FLOOR: f64 = 0.1;

/// Stiffness/damping pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    /// Pull toward the target.
    pub stiffness: f64,
    /// Drag on velocity.
    pub damping: f64,
}

impl SpringParams {
    /// Soft reveal used by most badge variants.
    pub const STANDARD: Self = Self {
        stiffness: 30.0,
        damping: 10.0,
    };

    /// Slightly firmer spring for rotating/diamond variants.
    pub const FIRM: Self = Self {
        stiffness: 40.0,
        damping: 13.0,
    };

    #[must_use]
    pub const fn new(stiffness: f64, damping: f64) -> Self {
        Self { stiffness, damping }
    }

    /// Damping at which motion stops overshooting.
    #[must_use]
    pub fn critical_damping(&self) -> f64 {
        2.0 * self.stiffness.max(STIFFNESS_FLOOR).sqrt()
    }
}

impl Default for SpringParams {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// One sprung value.
///
/// ```ignore
/// use std::time::Duration;
/// use titlefit_core::animation::{Spring, SpringParams};
///
/// let mut rotation = Spring::new(0.0, 90.0).with_params(SpringParams::STANDARD);
/// while !rotation.is_at_rest() {
///     rotation.advance(Duration::from_millis(16));
/// }
/// assert_eq!(rotation.position(), 90.0);
/// ```
#[derive(Debug, Clone)]
pub struct Spring {
    start: f64,
    x: f64,
    v: f64,
    target: f64,
    params: SpringParams,
    rest_distance: f64,
    at_rest: bool,
}

impl Spring {
    /// A spring at `start`, pulled toward `target` with
    /// [`SpringParams::STANDARD`].
    #[must_use]
    pub fn new(start: f64, target: f64) -> Self {
        Self {
            start,
            x: start,
            v: 0.0,
            target,
            params: SpringParams::STANDARD,
            rest_distance: REST_DISTANCE,
            at_rest: false,
        }
    }

    #[must_use]
    pub fn with_stiffness(mut self, stiffness: f64) -> Self {
        self.params.stiffness = stiffness.max(STIFFNESS_FLOOR);
        self
    }

    #[must_use]
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.params.damping = damping.max(0.0);
        self
    }

    #[must_use]
    pub fn with_params(self, params: SpringParams) -> Self {
        self.with_stiffness(params.stiffness)
            .with_damping(params.damping)
    }

    /// Distance from the target under which the spring may rest.
    #[must_use]
    pub fn with_rest_threshold(mut self, distance: f64) -> Self {
        self.rest_distance = distance.abs();
        self
    }

    /// Current value. May lie past the target while overshooting.
    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.x
    }

    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.v
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    #[must_use]
    pub fn params(&self) -> SpringParams {
        self.params
    }

    /// Pull toward a new target. A change smaller than the rest threshold is
    /// ignored; a larger one wakes a resting spring.
    pub fn set_target(&mut self, target: f64) {
        if (target - self.target).abs() <= self.rest_distance {
            return;
        }
        self.target = target;
        self.at_rest = false;
    }

    /// Place the value at `position` with no velocity. It only counts as
    /// resting if that is the target.
    pub fn snap_to(&mut self, position: f64) {
        self.x = position;
        self.v = 0.0;
        self.at_rest = (position - self.target).abs() < self.rest_distance;
    }

    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Integrate `dt` worth of motion.
    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest || dt.is_zero() {
            return;
        }
        let mut left = dt.as_secs_f64();
        while left > 0.0 {
            let h = left.min(SLICE_SECS);
            let accel = -self.params.stiffness * (self.x - self.target) - self.params.damping * self.v;
            self.v += accel * h;
            self.x += self.v * h;
            left -= h;
        }
        self.settle_if_close();
    }

    fn settle_if_close(&mut self) {
        let close = (self.x - self.target).abs() < self.rest_distance;
        if close && self.v.abs() < REST_SPEED {
            self.x = self.target;
            self.v = 0.0;
            self.at_rest = true;
        }
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.at_rest
    }

    /// Fraction of the way from start to target, clamped to [0, 1].
    fn value(&self) -> f32 {
        let span = self.target - self.start;
        if span.abs() < f64::EPSILON {
            return if self.at_rest { 1.0 } else { 0.0 };
        }
        (((self.x - self.start) / span) as f32).clamp(0.0, 1.0)
    }

    fn reset(&mut self) {
        self.x = self.start;
        self.v = 0.0;
        self.at_rest = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Forbid unsafe in production; deny in tests.
#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Core: interpolation primitives for animated title badges.
//!
//! # Role in titlefit
//! `titlefit-core` is the motion layer. It knows nothing about labels,
//! measurement or open/closed state; it only turns elapsed time into numbers.
//!
//! # Primary responsibilities
//! - **Easing**: `fn(f32) -> f32` curves, including the quartic ease-out used
//!   by keyframe variants.
//! - **Animation**: the [`animation::Animation`] trait and the [`animation::Fade`] tween.
//! - **Spring**: damped harmonic oscillator that can be retargeted mid-flight.
//! - **Timeline**: offset-scheduled tweens with forward and backward playback.
//! - **Geometry**: `f64` rectangles for clip regions.
//!
//! # How it fits in the system
//! The engine crate (`titlefit`) wraps these primitives in its animation
//! drivers. Everything here is deterministic: identical tick sequences give
//! bit-identical values.

pub mod animation;
pub mod geometry;
pub mod logging;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, trace_span, warn};

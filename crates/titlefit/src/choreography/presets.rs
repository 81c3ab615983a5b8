#![forbid(unsafe_code)]

//! The built-in badge variants.
//!
//! | Variant | Backend | Fit | Labels | Motion |
//! |---------|---------|-----|--------|--------|
//! | [`Square`] | spring 30/10 | 0.9 | 1 | box scales in and turns 90°, text rises into place |
//! | [`Diamond`] | spring 40/13 | 0.8 | 1 | diamond stroke draws, text halves slide together |
//! | [`Stacked`] | spring 30/10 | 0.7 | 2 | texts part vertically around a dash underline |
//! | [`Ribbon`] | timeline | 0.75 | 2 | horizontal sweep, second line drops in after 1 s |
//! | [`Cascade`] | timeline | 0.75 | 2 | bar sweep then three overlapping segments |
//! | [`Bars`] | timeline | 0.68 | 2 | bar sweep then everything turns upright |
//!
//! # Invariants
//!
//! 1. Closed values (first `from` per key) never depend on the measured text
//!    except through translations that hide the text outside its clip band.
//! 2. Every preset animates at least one `Text` key, so a swap always has
//!    something to cross-fade.
//! 3. Unmeasured layouts are read as placeholders: zero widths and heights.

use std::time::Duration;

use titlefit_core::animation::{EasingFn, SpringParams, ease_out, ease_out_quart};

use super::{Choreography, frame_at};
use crate::driver::Backend;
use crate::layout::LayoutFrame;
use crate::spec::{AnimationSpec, Channel, Key, Prop, Track};

const fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn center(size: f64) -> f64 {
    size / 2.0
}

fn widest(layout: &[LayoutFrame]) -> f64 {
    layout.iter().map(|f| f.fitted_width).fold(0.0, f64::max)
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A box that scales in while turning a quarter, text rising from below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Square {
    pub fit_factor: f64,
    pub spring: SpringParams,
}

impl Default for Square {
    fn default() -> Self {
        Self {
            fit_factor: 0.9,
            spring: SpringParams::STANDARD,
        }
    }
}

impl Choreography for Square {
    fn name(&self) -> &'static str {
        "square"
    }

    fn fit_factor(&self) -> f64 {
        self.fit_factor
    }

    fn target_widths(&self, size: f64) -> Vec<f64> {
        vec![size]
    }

    fn backend(&self) -> Backend {
        Backend::Spring(self.spring)
    }

    fn open_spec(&self, layout: &[LayoutFrame], _size: f64) -> AnimationSpec {
        let text = frame_at(layout, 0);
        AnimationSpec::new()
            .track(Track::new(Key::decor(Prop::Scale), 0.0, 1.0))
            .track(Track::new(Key::decor(Prop::Rotation), 0.0, 90.0))
            .track(Track::new(Key::text(0, Prop::TranslateY), text.fitted_height, 0.0))
    }

    /// New text rises in while the old text leaves upward, clear of the
    /// taller of the two.
    fn crossfade_spec(
        &self,
        incoming: &[LayoutFrame],
        outgoing: &[LayoutFrame],
        _size: f64,
    ) -> AnimationSpec {
        let h_in = frame_at(incoming, 0).fitted_height;
        let h_out = frame_at(outgoing, 0).fitted_height;
        AnimationSpec::new()
            .track(Track::hold(Key::decor(Prop::Scale), 1.0))
            .track(Track::new(Key::decor(Prop::Rotation), 0.0, 90.0))
            .track(Track::new(Key::text(0, Prop::TranslateY), h_in, 0.0))
            .track(Track::new(
                Key::new(Channel::Leaving(0), Prop::TranslateY),
                0.0,
                -h_in.max(h_out),
            ))
    }
}

// ---------------------------------------------------------------------------
// Diamond
// ---------------------------------------------------------------------------

/// Share of the footprint used by the text and the diamond.
const DIAMOND_WIDTH: f64 = 0.7;

/// A stroked diamond drawn in while the text closes from two halves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diamond {
    pub fit_factor: f64,
    pub spring: SpringParams,
}

impl Default for Diamond {
    fn default() -> Self {
        Self {
            fit_factor: 0.8,
            spring: SpringParams::FIRM,
        }
    }
}

impl Choreography for Diamond {
    fn name(&self) -> &'static str {
        "diamond"
    }

    fn fit_factor(&self) -> f64 {
        self.fit_factor
    }

    fn target_widths(&self, size: f64) -> Vec<f64> {
        vec![size * DIAMOND_WIDTH]
    }

    fn backend(&self) -> Backend {
        Backend::Spring(self.spring)
    }

    fn open_spec(&self, _layout: &[LayoutFrame], size: f64) -> AnimationSpec {
        let c = center(size);
        let half = c * DIAMOND_WIDTH;
        let dash = 4.0 * std::f64::consts::SQRT_2 * half;
        AnimationSpec::new()
            .track(Track::new(Key::decor(Prop::StrokeDash), 0.0, dash))
            .track(Track::new(Key::decor(Prop::Scale), 0.0, 1.0))
            .track(Track::new(Key::decor(Prop::Rotation), 270.0, 45.0))
            .track(Track::new(Key::text(0, Prop::TranslateX), c + half, c))
            .track(Track::new(Key::echo(0, Prop::TranslateX), c - half, c))
    }
}

// ---------------------------------------------------------------------------
// Stacked
// ---------------------------------------------------------------------------

const STACKED_WIDTH: f64 = 0.8;
const STACKED_OFFSET: f64 = 0.075;

/// Two lines that part vertically from the center line, underlined by a dash
/// as wide as the wider line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stacked {
    pub fit_factor: f64,
    pub spring: SpringParams,
}

impl Default for Stacked {
    fn default() -> Self {
        Self {
            fit_factor: 0.7,
            spring: SpringParams::STANDARD,
        }
    }
}

impl Choreography for Stacked {
    fn name(&self) -> &'static str {
        "stacked"
    }

    fn fit_factor(&self) -> f64 {
        self.fit_factor
    }

    fn target_widths(&self, size: f64) -> Vec<f64> {
        vec![size * STACKED_WIDTH]
    }

    fn backend(&self) -> Backend {
        Backend::Spring(self.spring)
    }

    fn label_count(&self) -> usize {
        2
    }

    fn open_spec(&self, layout: &[LayoutFrame], size: f64) -> AnimationSpec {
        let offset = size * STACKED_OFFSET;
        let top = frame_at(layout, 0);
        let bottom = frame_at(layout, 1);
        AnimationSpec::new()
            .track(Track::new(Key::text(0, Prop::TranslateY), 0.0, -(top.gap + offset)))
            .track(Track::new(Key::text(1, Prop::TranslateY), 0.0, bottom.gap + offset))
            .track(Track::new(Key::decor(Prop::StrokeDash), 0.0, widest(layout)))
    }
}

// ---------------------------------------------------------------------------
// Ribbon
// ---------------------------------------------------------------------------

/// A horizontal sweep carrying the first line in; the second line drops
/// below it a second later.
#[derive(Debug, Clone, Copy)]
pub struct Ribbon {
    pub fit_factor: f64,
    pub easing: EasingFn,
}

impl Default for Ribbon {
    fn default() -> Self {
        Self {
            fit_factor: 0.75,
            easing: ease_out_quart,
        }
    }
}

impl Choreography for Ribbon {
    fn name(&self) -> &'static str {
        "ribbon"
    }

    fn fit_factor(&self) -> f64 {
        self.fit_factor
    }

    fn target_widths(&self, size: f64) -> Vec<f64> {
        vec![size]
    }

    fn backend(&self) -> Backend {
        Backend::Timeline
    }

    fn label_count(&self) -> usize {
        2
    }

    fn open_spec(&self, layout: &[LayoutFrame], size: f64) -> AnimationSpec {
        let sweep = ms(700);
        let first = frame_at(layout, 0);
        let second = frame_at(layout, 1);
        AnimationSpec::new()
            .track(
                Track::new(Key::text(0, Prop::TranslateX), size, center(size))
                    .duration(sweep)
                    .easing(self.easing),
            )
            .track(
                Track::new(Key::decor(Prop::ScaleX), 0.0, 1.0)
                    .duration(sweep)
                    .easing(self.easing),
            )
            .then(
                Track::new(Key::decor(Prop::ScaleY), 0.1, 1.0)
                    .duration(ms(500))
                    .easing(self.easing),
                Duration::ZERO,
            )
            .track(
                Track::new(Key::text(1, Prop::TranslateY), 0.0, first.gap * 2.0 + second.gap)
                    .delay(ms(1000))
                    .duration(sweep)
                    .easing(self.easing),
            )
    }
}

// ---------------------------------------------------------------------------
// Cascade
// ---------------------------------------------------------------------------

const CASCADE_WIDTH: f64 = 0.9;

/// A bar sweep followed by three overlapping text segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cascade {
    pub fit_factor: f64,
}

impl Default for Cascade {
    fn default() -> Self {
        Self { fit_factor: 0.75 }
    }
}

impl Cascade {
    /// Bar thickness for a footprint of `size`.
    #[must_use]
    pub fn bar(size: f64) -> f64 {
        (size * 2.5 / 100.0).ceil()
    }
}

impl Choreography for Cascade {
    fn name(&self) -> &'static str {
        "cascade"
    }

    fn fit_factor(&self) -> f64 {
        self.fit_factor
    }

    fn target_widths(&self, size: f64) -> Vec<f64> {
        vec![size * CASCADE_WIDTH]
    }

    fn backend(&self) -> Backend {
        Backend::Timeline
    }

    fn label_count(&self) -> usize {
        2
    }

    fn open_spec(&self, layout: &[LayoutFrame], size: f64) -> AnimationSpec {
        let segment = ms(500);
        let c = center(size);
        let bar = Self::bar(size);
        let second = frame_at(layout, 1);
        AnimationSpec::new()
            .track(
                Track::new(Key::decor(Prop::ScaleX), 0.0, 1.0)
                    .duration(segment)
                    .easing(ease_out),
            )
            .then(
                Track::new(
                    Key::text(1, Prop::TranslateY),
                    second.gap * 3.0 + bar,
                    second.gap,
                )
                .duration(segment)
                .easing(ease_out),
                ms(300),
            )
            .then(
                Track::new(Key::text(0, Prop::TranslateX), size, c)
                    .duration(segment)
                    .easing(ease_out_quart),
                ms(200),
            )
            .then(
                Track::new(Key::echo(0, Prop::TranslateX), 0.0, c)
                    .duration(segment)
                    .easing(ease_out_quart),
                ms(500),
            )
    }
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

/// A bar sweep, then the bar and both lines turn upright.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bars {
    pub fit_factor: f64,
}

impl Default for Bars {
    fn default() -> Self {
        Self { fit_factor: 0.68 }
    }
}

impl Choreography for Bars {
    fn name(&self) -> &'static str {
        "bars"
    }

    fn fit_factor(&self) -> f64 {
        self.fit_factor
    }

    fn target_widths(&self, size: f64) -> Vec<f64> {
        vec![size]
    }

    fn backend(&self) -> Backend {
        Backend::Timeline
    }

    fn label_count(&self) -> usize {
        2
    }

    fn open_spec(&self, _layout: &[LayoutFrame], _size: f64) -> AnimationSpec {
        let second = ms(1000);
        let turn = |key: Key| {
            Track::new(key, 180.0, 0.0)
                .delay(second)
                .duration(second)
                .easing(ease_out_quart)
        };
        AnimationSpec::new()
            .track(
                Track::new(Key::decor(Prop::ScaleX), 0.0, 1.0)
                    .duration(second)
                    .easing(ease_out_quart),
            )
            .then(
                Track::new(Key::decor(Prop::Rotation), 180.0, 0.0)
                    .duration(second)
                    .easing(ease_out_quart),
                Duration::ZERO,
            )
            .track(turn(Key::text(0, Prop::Rotation)))
            .track(turn(Key::text(1, Prop::Rotation)))
    }
}

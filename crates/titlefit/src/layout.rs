#![forbid(unsafe_code)]

//! Fit measured text into a target footprint.
//!
//! Every function here is pure: identical inputs give bit-identical frames.
//!
//! For a box of width `w` and height `h`, target width `t` and fit factor `f`:
//!
//! ```text
//! scale = t / w        (1.0 while w == 0)
//! gap   = h * f * scale / 2
//! ```
//!
//! # Invariants
//!
//! 1. An unmeasured box yields `scale = 1`, `gap = 0` and `measured = false`.
//! 2. Frames are replaced wholesale; scale and gap always come from the same
//!    box and target.
//! 3. Negative or non-finite targets are treated as zero.

use titlefit_core::geometry::Rect;

use crate::measure::MeasuredBox;

/// Scale and spacing derived from one measured label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutFrame {
    /// Uniform scale applied to the text.
    pub scale: f64,
    /// Half-height of the band the scaled text occupies, shrunk by the fit factor.
    pub gap: f64,
    /// Text width after scaling.
    pub fitted_width: f64,
    /// Text height after scaling.
    pub fitted_height: f64,
    /// Whether the frame came from a real measurement.
    pub measured: bool,
}

impl LayoutFrame {
    /// Frame of a label that has not been measured yet.
    pub const PLACEHOLDER: Self = Self {
        scale: 1.0,
        gap: 0.0,
        fitted_width: 0.0,
        fitted_height: 0.0,
        measured: false,
    };

    /// Fit one box to `target` width.
    #[must_use]
    pub fn fit(measured: MeasuredBox, target: f64, fit_factor: f64) -> Self {
        if !measured.is_measured() {
            return Self::PLACEHOLDER;
        }
        let target = if target.is_finite() { target.max(0.0) } else { 0.0 };
        let scale = target / measured.width;
        Self {
            scale,
            gap: measured.height * fit_factor * scale / 2.0,
            fitted_width: measured.width * scale,
            fitted_height: measured.height * scale,
            measured: true,
        }
    }
}

impl Default for LayoutFrame {
    fn default() -> Self {
        Self::PLACEHOLDER
    }
}

/// Compute one frame per box.
///
/// `targets[i]` applies to `boxes[i]`; when there are fewer targets than
/// boxes the last target is reused. With no targets at all every frame is a
/// placeholder.
#[must_use]
pub fn compute_layout(boxes: &[MeasuredBox], targets: &[f64], fit_factor: f64) -> Vec<LayoutFrame> {
    let Some(&last) = targets.last() else {
        return vec![LayoutFrame::PLACEHOLDER; boxes.len()];
    };
    boxes
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let target = targets.get(i).copied().unwrap_or(last);
            LayoutFrame::fit(*b, target, fit_factor)
        })
        .collect()
}

/// True only when every frame came from a real measurement.
///
/// An empty slice is not trusted: there is nothing to animate against.
#[must_use]
pub fn layouts_trusted(frames: &[LayoutFrame]) -> bool {
    !frames.is_empty() && frames.iter().all(|f| f.measured)
}

/// Per-variant layout inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    /// Vertical padding factor.
    pub fit_factor: f64,
    /// Target width per label.
    pub targets: Vec<f64>,
}

impl LayoutParams {
    /// Create layout parameters.
    #[must_use]
    pub fn new(fit_factor: f64, targets: Vec<f64>) -> Self {
        Self {
            fit_factor,
            targets,
        }
    }

    /// Frames for `boxes` under these parameters.
    #[must_use]
    pub fn compute(&self, boxes: &[MeasuredBox]) -> Vec<LayoutFrame> {
        compute_layout(boxes, &self.targets, self.fit_factor)
    }
}

// ---------------------------------------------------------------------------
// Clip bands
// ---------------------------------------------------------------------------

/// Masking regions for one label.
///
/// `inner` is the horizontal band `[center - gap, center + gap]` the text
/// lives in; `outer` are the regions above and below it. All bands are
/// clamped to the footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipBands {
    /// Band holding the text.
    pub inner: Rect,
    /// Region above (`[0]`) and below (`[1]`) the text band.
    pub outer: [Rect; 2],
}

impl ClipBands {
    /// Bands for `frame` around the horizontal line `center_y` of `footprint`.
    #[must_use]
    pub fn around(frame: &LayoutFrame, footprint: Rect, center_y: f64) -> Self {
        let top = (center_y - frame.gap).max(footprint.y);
        let bottom = (center_y + frame.gap).min(footprint.bottom()).max(top);
        let band = |y0: f64, y1: f64| Rect::new(footprint.x, y0, footprint.width, y1 - y0);

        Self {
            inner: band(top, bottom),
            outer: [band(footprint.y, top), band(bottom, footprint.bottom())],
        }
    }

    /// Bands centered vertically in `footprint`.
    #[must_use]
    pub fn centered(frame: &LayoutFrame, footprint: Rect) -> Self {
        Self::around(frame, footprint, footprint.y + footprint.height / 2.0)
    }
}

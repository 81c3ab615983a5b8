#![forbid(unsafe_code)]

//! Text measurement boundary.
//!
//! The renderer owns measurement: a label has to be drawn once before its
//! bounding box is known. The engine asks for boxes through a
//! [`MeasureTicket`] and only accepts results carrying the latest ticket.

use crate::label::{Label, LabelSet};

/// Bounding box of rendered text, in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeasuredBox {
    /// Rendered width.
    pub width: f64,
    /// Rendered height.
    pub height: f64,
}

impl MeasuredBox {
    /// Box of text that has not been rendered yet.
    pub const UNMEASURED: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Create a box. Negative or non-finite extents become zero.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: sanitize(width),
            height: sanitize(height),
        }
    }

    /// Whether the box came from real rendered text.
    #[inline]
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.width > 0.0
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// Measures rendered labels. Implemented by the presentation layer.
pub trait BoundingBoxProvider {
    /// Bounding box of `label` as currently rendered.
    fn measure(&mut self, label: &Label) -> MeasuredBox;

    /// Measure every label of a set, in order.
    fn measure_all(&mut self, labels: &LabelSet) -> Vec<MeasuredBox> {
        labels.iter().map(|label| self.measure(label)).collect()
    }
}

impl<F> BoundingBoxProvider for F
where
    F: FnMut(&Label) -> MeasuredBox,
{
    fn measure(&mut self, label: &Label) -> MeasuredBox {
        self(label)
    }
}

/// Identifies one measurement request for one label slot.
///
/// Tickets are ordered; a result is accepted only for the ticket the state
/// currently waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MeasureTicket(pub(crate) u64);

impl MeasureTicket {
    /// Raw ticket number.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A pending request for the renderer to measure a label set.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureRequest {
    /// Ticket to hand back with the result.
    pub ticket: MeasureTicket,
    /// Labels to measure.
    pub labels: LabelSet,
}

/// What happened to a delivered measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureOutcome {
    /// Boxes were usable and an animation run started.
    Animating,
    /// Boxes were degenerate (zero width); the badge snapped to its target.
    Snapped,
    /// Ticket was superseded; result ignored.
    Stale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_bad_extents() {
        let b = MeasuredBox::new(-3.0, f64::INFINITY);
        assert_eq!(b, MeasuredBox::UNMEASURED);
        assert!(!b.is_measured());
    }

    #[test]
    fn measured_requires_width() {
        assert!(MeasuredBox::new(40.0, 10.0).is_measured());
        assert!(!MeasuredBox::new(0.0, 10.0).is_measured());
    }

    #[test]
    fn closure_provider() {
        let mut provider = |label: &Label| MeasuredBox::new(label.raw().len() as f64 * 8.0, 10.0);
        let boxes = provider.measure_all(&LabelSet::from(["ab", "abcd"]));
        assert_eq!(boxes[0].width, 16.0);
        assert_eq!(boxes[1].width, 32.0);
    }

    #[test]
    fn tickets_order() {
        assert!(MeasureTicket(2) > MeasureTicket(1));
        assert_eq!(MeasureTicket(7).get(), 7);
    }
}

#![forbid(unsafe_code)]

//! Deterministic text measurement.
//!
//! [`GlyphMetrics`] stands in for a renderer: every character has a fixed
//! advance and every non-empty line a fixed height. Emphasized segments can
//! be given a wider advance to mimic a bold face.

use std::collections::BTreeMap;

use titlefit::{BoundingBoxProvider, Label, MeasuredBox};

/// Fixed per-character metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphMetrics {
    advance: f64,
    emphasis_advance: f64,
    line_height: f64,
    overrides: BTreeMap<char, f64>,
    calls: usize,
}

impl GlyphMetrics {
    /// Every character `advance` wide, lines `line_height` tall.
    #[must_use]
    pub fn monospace(advance: f64, line_height: f64) -> Self {
        Self {
            advance,
            emphasis_advance: advance,
            line_height,
            overrides: BTreeMap::new(),
            calls: 0,
        }
    }

    /// Advance used for characters inside an emphasized segment.
    #[must_use]
    pub fn with_emphasis_advance(mut self, advance: f64) -> Self {
        self.emphasis_advance = advance;
        self
    }

    /// Give `ch` its own advance.
    #[must_use]
    pub fn with_glyph(mut self, ch: char, advance: f64) -> Self {
        self.overrides.insert(ch, advance);
        self
    }

    /// Number of labels measured so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls
    }

    fn glyph(&self, ch: char, emphasized: bool) -> f64 {
        match self.overrides.get(&ch) {
            Some(advance) => *advance,
            None if emphasized => self.emphasis_advance,
            None => self.advance,
        }
    }
}

impl Default for GlyphMetrics {
    fn default() -> Self {
        Self::monospace(8.0, 10.0)
    }
}

impl BoundingBoxProvider for GlyphMetrics {
    fn measure(&mut self, label: &Label) -> MeasuredBox {
        self.calls += 1;
        let width: f64 = label
            .segments()
            .iter()
            .flat_map(|seg| seg.text.chars().map(move |ch| (ch, seg.emphasis)))
            .map(|(ch, emphasized)| self.glyph(ch, emphasized))
            .sum();
        if width > 0.0 {
            MeasuredBox::new(width, self.line_height)
        } else {
            MeasuredBox::UNMEASURED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monospace_width_is_char_count_times_advance() {
        let mut m = GlyphMetrics::default();
        assert_eq!(m.measure(&Label::new("Hello")), MeasuredBox::new(40.0, 10.0));
        assert_eq!(m.calls(), 1);
    }

    #[test]
    fn empty_label_is_unmeasured() {
        let mut m = GlyphMetrics::default();
        assert!(!m.measure(&Label::new("")).is_measured());
    }

    #[test]
    fn overrides_and_emphasis_widen_text() {
        let mut m = GlyphMetrics::monospace(5.0, 8.0)
            .with_emphasis_advance(7.0)
            .with_glyph('W', 9.0);
        assert_eq!(m.measure(&Label::new("Wa")).width, 14.0);
        assert_eq!(m.measure(&Label::new("a*bc*")).width, 19.0);
    }
}

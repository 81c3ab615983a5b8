#![forbid(unsafe_code)]

//! Badge variants: how each one fits its text and what it animates.
//!
//! A [`Choreography`] is a pure description. Given layout frames it builds
//! the [`AnimationSpec`] for opening, for swapping text and for collapsing
//! from an arbitrary on-screen frame. The transition machine decides *when*
//! to use each.

pub mod presets;

use std::fmt;
use std::str::FromStr;

use titlefit_core::animation::{Direction, SpringParams};

use crate::driver::Backend;
use crate::layout::{LayoutFrame, LayoutParams};
use crate::spec::{AnimationSpec, Channel, Frame, Key, Track};

pub use presets::{Bars, Cascade, Diamond, Ribbon, Square, Stacked};

/// Per-variant animation design.
pub trait Choreography: fmt::Debug {
    /// Variant name for logs and traces.
    fn name(&self) -> &'static str;

    /// Vertical padding factor used by the layout.
    fn fit_factor(&self) -> f64;

    /// Target text widths for a footprint of `size`.
    fn target_widths(&self, size: f64) -> Vec<f64>;

    /// Interpolation strategy.
    fn backend(&self) -> Backend;

    /// Number of labels shown together.
    fn label_count(&self) -> usize {
        1
    }

    /// Closed-to-open motion for one slot.
    fn open_spec(&self, layout: &[LayoutFrame], size: f64) -> AnimationSpec;

    /// Swap motion: `incoming` opens on the text lanes while `outgoing`
    /// leaves on the leaving lanes.
    fn crossfade_spec(
        &self,
        incoming: &[LayoutFrame],
        outgoing: &[LayoutFrame],
        size: f64,
    ) -> AnimationSpec {
        default_crossfade(self, incoming, outgoing, size)
    }

    /// Motion from `on_screen` to the closed form of `layout`.
    fn collapse_spec(&self, on_screen: &Frame, layout: &[LayoutFrame], size: f64) -> AnimationSpec {
        default_collapse(self, on_screen, layout, size)
    }

    /// Layout inputs for a footprint of `size`.
    fn layout_params(&self, size: f64) -> LayoutParams {
        LayoutParams::new(self.fit_factor(), self.target_widths(size))
    }
}

/// Layout frame `index`, or a placeholder.
pub(crate) fn frame_at(layout: &[LayoutFrame], index: usize) -> LayoutFrame {
    layout.get(index).copied().unwrap_or(LayoutFrame::PLACEHOLDER)
}

fn leaving_key(key: Key) -> Option<Key> {
    key.channel.leaving().map(|channel| Key::new(channel, key.prop))
}

/// Incoming text plays its open motion, outgoing text plays the reversed
/// open motion on the leaving lanes, decoration moves between the two open
/// poses.
pub fn default_crossfade<C: Choreography + ?Sized>(
    choreography: &C,
    incoming: &[LayoutFrame],
    outgoing: &[LayoutFrame],
    size: f64,
) -> AnimationSpec {
    let incoming_open = choreography.open_spec(incoming, size);
    let outgoing_rest = choreography.open_spec(outgoing, size).targets(Direction::Forward);
    let incoming_rest = incoming_open.targets(Direction::Forward);

    let mut spec = AnimationSpec::new();
    for track in incoming_open.tracks() {
        if track.key.channel != Channel::Decor {
            spec.push(*track);
        }
    }
    for (key, to) in incoming_rest.iter().filter(|(k, _)| k.channel == Channel::Decor) {
        let from = outgoing_rest.get(key).copied().unwrap_or(*to);
        let timing = incoming_open
            .tracks()
            .iter()
            .rev()
            .find(|t| t.key == *key)
            .copied()
            .unwrap_or_else(|| Track::hold(*key, *to));
        spec.push(Track {
            from,
            to: *to,
            delay: std::time::Duration::ZERO,
            ..timing
        });
    }

    let leaving = choreography
        .open_spec(outgoing, size)
        .filter_map_keys(leaving_key)
        .reversed();
    spec.merged(leaving)
}

/// Every on-screen key heads to its closed value, reusing the timing of the
/// matching open track. Leaving keys close like their text counterparts.
pub fn default_collapse<C: Choreography + ?Sized>(
    choreography: &C,
    on_screen: &Frame,
    layout: &[LayoutFrame],
    size: f64,
) -> AnimationSpec {
    let open = choreography.open_spec(layout, size);
    let closed = open.targets(Direction::Backward);

    on_screen
        .iter()
        .map(|(key, value)| {
            let lookup = key.channel.incoming().map_or(*key, |c| Key::new(c, key.prop));
            let goal = closed.get(&lookup).copied().unwrap_or(*value);
            let timing = open
                .tracks()
                .iter()
                .rev()
                .find(|t| t.key == lookup)
                .copied()
                .unwrap_or_else(|| Track::new(lookup, *value, goal));
            Track {
                key: *key,
                from: *value,
                to: goal,
                delay: std::time::Duration::ZERO,
                ..timing
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Variant selection
// ---------------------------------------------------------------------------

/// Built-in badge variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Variant {
    /// Rotating box, vertical text swap (spring).
    #[default]
    Square,
    /// Stroke-drawn diamond, split text (spring).
    Diamond,
    /// Two stacked texts with a dash underline (spring).
    Stacked,
    /// Horizontal sweep with a staggered second line (timeline).
    Ribbon,
    /// Bar sweep then overlapping text segments (timeline).
    Cascade,
    /// Bar sweep then rotations (timeline).
    Bars,
}

impl Variant {
    /// Every variant, in declaration order.
    pub const ALL: [Variant; 6] = [
        Self::Square,
        Self::Diamond,
        Self::Stacked,
        Self::Ribbon,
        Self::Cascade,
        Self::Bars,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Diamond => "diamond",
            Self::Stacked => "stacked",
            Self::Ribbon => "ribbon",
            Self::Cascade => "cascade",
            Self::Bars => "bars",
        }
    }

    /// Build the choreography, applying optional overrides.
    ///
    /// A spring override is ignored by timeline variants.
    #[must_use]
    pub fn choreography(
        self,
        fit_factor: Option<f64>,
        spring: Option<SpringParams>,
    ) -> Box<dyn Choreography> {
        match self {
            Self::Square => {
                let mut c = Square::default();
                c.fit_factor = fit_factor.unwrap_or(c.fit_factor);
                c.spring = spring.unwrap_or(c.spring);
                Box::new(c)
            }
            Self::Diamond => {
                let mut c = Diamond::default();
                c.fit_factor = fit_factor.unwrap_or(c.fit_factor);
                c.spring = spring.unwrap_or(c.spring);
                Box::new(c)
            }
            Self::Stacked => {
                let mut c = Stacked::default();
                c.fit_factor = fit_factor.unwrap_or(c.fit_factor);
                c.spring = spring.unwrap_or(c.spring);
                Box::new(c)
            }
            Self::Ribbon => {
                let mut c = Ribbon::default();
                c.fit_factor = fit_factor.unwrap_or(c.fit_factor);
                Box::new(c)
            }
            Self::Cascade => {
                let mut c = Cascade::default();
                c.fit_factor = fit_factor.unwrap_or(c.fit_factor);
                Box::new(c)
            }
            Self::Bars => {
                let mut c = Bars::default();
                c.fit_factor = fit_factor.unwrap_or(c.fit_factor);
                Box::new(c)
            }
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown variant name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown badge variant: {0}")]
pub struct UnknownVariant(pub String);

impl FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

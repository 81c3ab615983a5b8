#![forbid(unsafe_code)]

//! Declarative description of one animation run.
//!
//! An [`AnimationSpec`] is a list of [`Track`]s. Each track moves one
//! [`Key`] from a `from` value to a `to` value, optionally after a delay.
//! Drivers turn a spec into per-tick [`Frame`]s; the spec itself never
//! changes while a run is in flight.
//!
//! A key may carry several tracks (timeline segments). For any key the
//! *first* track (by delay, then insertion order) defines the closed-side
//! value and the *last* track defines the open-side value.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use titlefit_core::animation::{Direction, EasingFn, SpringParams, linear};

/// Which drawn element a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// Box, bars, strokes: everything that is not text.
    Decor,
    /// The `i`-th label of the current slot.
    Text(usize),
    /// A second copy of the `i`-th current label (split or mirrored text).
    Echo(usize),
    /// The `i`-th label of the slot animating out.
    Leaving(usize),
    /// Echo of the `i`-th label of the slot animating out.
    LeavingEcho(usize),
}

impl Channel {
    /// The outgoing counterpart of a current-slot channel.
    #[must_use]
    pub fn leaving(self) -> Option<Self> {
        match self {
            Self::Text(i) => Some(Self::Leaving(i)),
            Self::Echo(i) => Some(Self::LeavingEcho(i)),
            _ => None,
        }
    }

    /// The current-slot counterpart of an outgoing channel.
    #[must_use]
    pub fn incoming(self) -> Option<Self> {
        match self {
            Self::Leaving(i) => Some(Self::Text(i)),
            Self::LeavingEcho(i) => Some(Self::Echo(i)),
            _ => None,
        }
    }

    /// Swap current and outgoing lanes. Decor is unchanged.
    #[must_use]
    pub fn swapped(self) -> Self {
        self.leaving().or_else(|| self.incoming()).unwrap_or(self)
    }

    /// Whether this channel draws outgoing text.
    #[must_use]
    pub fn is_leaving(self) -> bool {
        matches!(self, Self::Leaving(_) | Self::LeavingEcho(_))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decor => f.write_str("decor"),
            Self::Text(i) => write!(f, "text{i}"),
            Self::Echo(i) => write!(f, "echo{i}"),
            Self::Leaving(i) => write!(f, "leaving{i}"),
            Self::LeavingEcho(i) => write!(f, "leaving_echo{i}"),
        }
    }
}

/// An animatable property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Prop {
    Scale,
    ScaleX,
    ScaleY,
    /// Degrees.
    Rotation,
    TranslateX,
    TranslateY,
    /// Visible stroke-dash length.
    StrokeDash,
    Opacity,
}

impl fmt::Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scale => "scale",
            Self::ScaleX => "scale_x",
            Self::ScaleY => "scale_y",
            Self::Rotation => "rotation",
            Self::TranslateX => "translate_x",
            Self::TranslateY => "translate_y",
            Self::StrokeDash => "stroke_dash",
            Self::Opacity => "opacity",
        };
        f.write_str(name)
    }
}

/// Name of one interpolated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    pub channel: Channel,
    pub prop: Prop,
}

impl Key {
    #[must_use]
    pub const fn new(channel: Channel, prop: Prop) -> Self {
        Self { channel, prop }
    }

    #[must_use]
    pub const fn decor(prop: Prop) -> Self {
        Self::new(Channel::Decor, prop)
    }

    #[must_use]
    pub const fn text(index: usize, prop: Prop) -> Self {
        Self::new(Channel::Text(index), prop)
    }

    #[must_use]
    pub const fn echo(index: usize, prop: Prop) -> Self {
        Self::new(Channel::Echo(index), prop)
    }

    /// Same property on the swapped lane.
    #[must_use]
    pub fn swapped(self) -> Self {
        Self::new(self.channel.swapped(), self.prop)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.channel, self.prop)
    }
}

/// Interpolated values for one tick.
pub type Frame = BTreeMap<Key, f64>;

/// Swap current and outgoing lanes of every key in `frame`.
#[must_use]
pub fn swap_lanes(frame: &Frame) -> Frame {
    frame.iter().map(|(k, v)| (k.swapped(), *v)).collect()
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// Default segment length for timeline playback.
pub const DEFAULT_SEGMENT: Duration = Duration::from_millis(500);

/// One key moving between two values.
#[derive(Debug, Clone, Copy)]
pub struct Track {
    pub key: Key,
    pub from: f64,
    pub to: f64,
    /// Start offset from the beginning of the run.
    pub delay: Duration,
    /// Segment length (timeline playback).
    pub duration: Duration,
    /// Segment easing (timeline playback).
    pub easing: EasingFn,
    /// Per-key spring override (spring playback).
    pub spring: Option<SpringParams>,
}

impl Track {
    #[must_use]
    pub fn new(key: Key, from: f64, to: f64) -> Self {
        Self {
            key,
            from,
            to,
            delay: Duration::ZERO,
            duration: DEFAULT_SEGMENT,
            easing: linear,
            spring: None,
        }
    }

    /// A track that stays at `value`.
    #[must_use]
    pub fn hold(key: Key, value: f64) -> Self {
        Self::new(key, value, value).duration(Duration::ZERO)
    }

    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn spring(mut self, params: SpringParams) -> Self {
        self.spring = Some(params);
        self
    }

    /// End offset of the segment.
    #[must_use]
    pub fn end(&self) -> Duration {
        self.delay.saturating_add(self.duration)
    }

    /// Same timing, endpoints exchanged.
    #[must_use]
    pub fn inverted(mut self) -> Self {
        std::mem::swap(&mut self.from, &mut self.to);
        self
    }
}

// ---------------------------------------------------------------------------
// AnimationSpec
// ---------------------------------------------------------------------------

/// An ordered set of tracks describing one run.
#[derive(Debug, Clone, Default)]
pub struct AnimationSpec {
    tracks: Vec<Track>,
}

impl AnimationSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track at its own delay (builder pattern).
    #[must_use]
    pub fn track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    /// Append a track starting `overlap` before the latest segment end.
    ///
    /// `then(t, Duration::ZERO)` runs strictly after everything so far; an
    /// overlap larger than the current end starts the track at zero.
    #[must_use]
    pub fn then(mut self, track: Track, overlap: Duration) -> Self {
        let start = self.total_duration().saturating_sub(overlap);
        self.tracks.push(track.delay(start));
        self
    }

    /// Append a track (non-builder form).
    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Append every track of `other`.
    #[must_use]
    pub fn merged(mut self, other: AnimationSpec) -> Self {
        self.tracks.extend(other.tracks);
        self
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// End of the latest segment.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.tracks
            .iter()
            .map(Track::end)
            .max()
            .unwrap_or(Duration::ZERO)
    }

    /// Tracks sorted by delay; ties keep insertion order.
    #[must_use]
    pub fn sorted_tracks(&self) -> Vec<Track> {
        let mut tracks = self.tracks.clone();
        tracks.sort_by_key(|t| t.delay);
        tracks
    }

    /// Value of every key at the end of a run in `direction`.
    ///
    /// Forward: the `to` of the last track on each key. Backward: the `from`
    /// of the first track on each key.
    #[must_use]
    pub fn targets(&self, direction: Direction) -> Frame {
        let mut frame = Frame::new();
        for track in self.sorted_tracks() {
            match direction {
                Direction::Forward => {
                    frame.insert(track.key, track.to);
                }
                Direction::Backward => {
                    frame.entry(track.key).or_insert(track.from);
                }
            }
        }
        frame
    }

    /// Start the first track of each key from the value it has in `frame`.
    ///
    /// Keys absent from `frame` keep their own `from`.
    #[must_use]
    pub fn rebased(&self, frame: &Frame) -> Self {
        let mut seen = std::collections::BTreeSet::new();
        let mut tracks = self.sorted_tracks();
        for track in &mut tracks {
            if seen.insert(track.key)
                && let Some(&value) = frame.get(&track.key)
            {
                track.from = value;
            }
        }
        Self { tracks }
    }

    /// Remap every key with `map`, dropping tracks it maps to `None`.
    #[must_use]
    pub fn filter_map_keys(&self, mut map: impl FnMut(Key) -> Option<Key>) -> Self {
        let tracks = self
            .tracks
            .iter()
            .filter_map(|t| map(t.key).map(|key| Track { key, ..*t }))
            .collect();
        Self { tracks }
    }

    /// The same motion played backward: endpoints exchanged and timing
    /// mirrored around the total duration.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let total = self.total_duration();
        let tracks = self
            .tracks
            .iter()
            .map(|t| t.inverted().delay(total.saturating_sub(t.end())))
            .collect();
        Self { tracks }
    }
}

impl FromIterator<Track> for AnimationSpec {
    fn from_iter<I: IntoIterator<Item = Track>>(iter: I) -> Self {
        Self {
            tracks: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

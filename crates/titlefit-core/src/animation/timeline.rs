#![forbid(unsafe_code)]

//! Keyframe scheduling with reversible playback.
//!
//! A [`Timeline`] owns a list of [`Animation`]s, each starting at an offset
//! from zero, and one playhead. [`Timeline::play`] moves the playhead toward
//! the end and [`Timeline::reverse`] toward zero; both pick up from wherever
//! the playhead is, so a close that interrupts an open retraces it.
//!
//! ```ignore
//! use std::time::Duration;
//! use titlefit_core::animation::{Fade, Timeline, ease_out_quart};
//!
//! let ms = Duration::from_millis;
//! let mut sweep = Timeline::new()
//!     .add(ms(0), Fade::new(ms(500)))
//!     .add(ms(300), Fade::new(ms(400)).easing(ease_out_quart))
//!     .set_duration(ms(700));
//! sweep.play();
//! ```
//!
//! # Invariants
//!
//! 1. Keyframes stay ordered by offset; equal offsets keep insertion order.
//! 2. Only a `Playing` timeline moves its playhead.
//! 3. Forward playback finishes at `duration`, backward playback at zero.
//! 4. A keyframe's value depends only on the playhead: moving backward (or
//!    seeking) replays every keyframe from its reset state.
//!
//! # Failure Modes
//!
//! - A zero duration is stored as 1ns.
//! - Seeking past the end stops at the end.
//! - With no keyframes, progress reads 1.0.

use std::fmt;
use std::time::Duration;

use super::Animation;

const MIN_DURATION: Duration = Duration::from_nanos(1);

/// Where a timeline is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Never played, or stopped.
    Idle,
    Playing,
    /// Holding the playhead.
    Paused,
    /// Reached the end it was heading for.
    Finished,
}

/// Which end the playhead heads for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

struct Keyframe {
    at: Duration,
    animation: Box<dyn Animation>,
    label: Option<String>,
}

impl Keyframe {
    /// Rewind, then replay up to `time` on the playhead.
    fn replay_to(&mut self, time: Duration) {
        self.animation.reset();
        if time > self.at {
            self.animation.tick(time - self.at);
        }
    }
}

/// Animations scheduled against one reversible playhead.
pub struct Timeline {
    keyframes: Vec<Keyframe>,
    length: Duration,
    fixed_length: bool,
    state: PlaybackState,
    direction: Direction,
    playhead: Duration,
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self
            .keyframes
            .iter()
            .filter_map(|k| k.label.as_deref())
            .collect();
        f.debug_struct("Timeline")
            .field("keyframes", &self.keyframes.len())
            .field("labels", &labels)
            .field("length", &self.length)
            .field("state", &self.state)
            .field("direction", &self.direction)
            .field("playhead", &self.playhead)
            .finish()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            keyframes: Vec::new(),
            length: MIN_DURATION,
            fixed_length: false,
            state: PlaybackState::Idle,
            direction: Direction::Forward,
            playhead: Duration::ZERO,
        }
    }

    /// Schedule `animation` to start at `at`.
    #[must_use]
    pub fn add(mut self, at: Duration, animation: impl Animation + 'static) -> Self {
        self.push(at, Box::new(animation), None);
        self
    }

    /// Schedule a boxed animation; `label` only shows up in debug output.
    pub fn push(&mut self, at: Duration, animation: Box<dyn Animation>, label: Option<String>) {
        let index = self.keyframes.partition_point(|k| k.at <= at);
        self.keyframes.insert(
            index,
            Keyframe {
                at,
                animation,
                label,
            },
        );
        if !self.fixed_length {
            // Without an explicit length the last keyframe's start ends the run.
            self.length = self.keyframes.last().map_or(MIN_DURATION, |k| k.at.max(MIN_DURATION));
        }
    }

    /// Fix the run length instead of deriving it from the latest offset.
    #[must_use]
    pub fn set_duration(mut self, length: Duration) -> Self {
        self.length = length.max(MIN_DURATION);
        self.fixed_length = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Playback
// ---------------------------------------------------------------------------

impl Timeline {
    /// Head for the end from the current playhead.
    pub fn play(&mut self) {
        self.head(Direction::Forward);
    }

    /// Head for zero from the current playhead.
    pub fn reverse(&mut self) {
        self.head(Direction::Backward);
    }

    fn head(&mut self, direction: Direction) {
        self.direction = direction;
        let arrived = match direction {
            Direction::Forward => self.playhead >= self.length,
            Direction::Backward => self.playhead.is_zero(),
        };
        self.state = if arrived {
            PlaybackState::Finished
        } else {
            PlaybackState::Playing
        };
        crate::trace!(
            ?direction,
            at_ms = self.playhead.as_millis() as u64,
            "timeline start"
        );
    }

    /// Hold the playhead. Only affects a playing timeline.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Back to zero, idle, forward.
    pub fn stop(&mut self) {
        self.move_playhead(Duration::ZERO);
        self.state = PlaybackState::Idle;
        self.direction = Direction::Forward;
    }

    /// Jump the playhead to `time` (clamped to the length). An idle or
    /// finished timeline is left paused there.
    pub fn seek(&mut self, time: Duration) {
        self.move_playhead(time);
        if matches!(self.state, PlaybackState::Idle | PlaybackState::Finished) {
            self.state = PlaybackState::Paused;
        }
    }

    fn move_playhead(&mut self, time: Duration) {
        let time = time.min(self.length);
        for keyframe in &mut self.keyframes {
            keyframe.replay_to(time);
        }
        self.playhead = time;
    }

    fn step_forward(&mut self, dt: Duration) {
        let from = self.playhead;
        let to = from.saturating_add(dt).min(self.length);
        for keyframe in &mut self.keyframes {
            if to <= keyframe.at || keyframe.animation.is_complete() {
                continue;
            }
            // A keyframe that starts inside this step only gets the part after its start.
            keyframe.animation.tick(to - from.max(keyframe.at));
        }
        self.playhead = to;
        if to >= self.length {
            self.state = PlaybackState::Finished;
        }
    }

    fn step_backward(&mut self, dt: Duration) {
        self.move_playhead(self.playhead.saturating_sub(dt));
        if self.playhead.is_zero() {
            self.state = PlaybackState::Finished;
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

impl Timeline {
    /// Playhead as a fraction of the length.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.keyframes.is_empty() {
            return 1.0;
        }
        ((self.playhead.as_secs_f64() / self.length.as_secs_f64()) as f32).clamp(0.0, 1.0)
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    #[must_use]
    pub fn current_time(&self) -> Duration {
        self.playhead
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.length
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        self.keyframes.len()
    }

    /// Start offset of keyframe `index`, in offset order.
    #[must_use]
    pub fn event_offset(&self, index: usize) -> Option<Duration> {
        self.keyframes.get(index).map(|k| k.at)
    }

    /// Current value of keyframe `index`, in offset order.
    #[must_use]
    pub fn event_value_at(&self, index: usize) -> Option<f32> {
        self.keyframes.get(index).map(|k| k.animation.value())
    }
}

impl Animation for Timeline {
    fn tick(&mut self, dt: Duration) {
        if self.state != PlaybackState::Playing {
            return;
        }
        match self.direction {
            Direction::Forward => self.step_forward(dt),
            Direction::Backward => self.step_backward(dt),
        }
    }

    fn is_complete(&self) -> bool {
        self.state == PlaybackState::Finished
    }

    fn value(&self) -> f32 {
        self.progress()
    }

    fn reset(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

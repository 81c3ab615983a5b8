#![forbid(unsafe_code)]

//! Timeline-backed driver: keyframes baked from layout values.
//!
//! Each track becomes one [`Fade`] segment on a [`Timeline`]. Segments are
//! baked at `configure` time, so any change to the underlying layout means
//! building a new timeline. Playback in either direction resumes from the
//! current playhead.
//!
//! A key's value is read from the latest segment on that key that has
//! started; before its first segment starts a key sits at that segment's
//! `from`.

use std::time::Duration;

use titlefit_core::animation::{Animation, Direction, Fade, Timeline, lerp};

use super::{AnimationDriver, RunId, RunState, Settled};
use crate::spec::{AnimationSpec, Frame, Key};

#[derive(Debug, Clone, Copy)]
struct Segment {
    key: Key,
    from: f64,
    to: f64,
    offset: Duration,
}

/// Plays an [`AnimationSpec`] as a keyframe timeline.
#[derive(Debug, Default)]
pub struct TimelineDriver {
    timeline: Timeline,
    /// Parallel to the timeline's events (both sorted by offset, stable).
    segments: Vec<Segment>,
    state: RunState,
}

impl TimelineDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Playhead position.
    #[must_use]
    pub fn current_time(&self) -> Duration {
        self.timeline.current_time()
    }

    /// Length of the baked timeline.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.timeline.duration()
    }

    fn bake(spec: &AnimationSpec) -> (Timeline, Vec<Segment>) {
        let tracks = spec.sorted_tracks();
        let mut timeline = Timeline::new().set_duration(spec.total_duration());
        let mut segments = Vec::with_capacity(tracks.len());
        for track in tracks {
            timeline.push(
                track.delay,
                Box::new(Fade::new(track.duration).easing(track.easing)),
                Some(track.key.to_string()),
            );
            segments.push(Segment {
                key: track.key,
                from: track.from,
                to: track.to,
                offset: track.delay,
            });
        }
        (timeline, segments)
    }
}

impl AnimationDriver for TimelineDriver {
    fn configure(&mut self, spec: AnimationSpec) {
        let (timeline, segments) = Self::bake(&spec);
        tracing::trace!(
            segments = segments.len(),
            duration_ms = timeline.duration().as_millis() as u64,
            "timeline baked"
        );
        self.timeline = timeline;
        self.segments = segments;
        self.state.idle(Direction::Forward);
    }

    fn play(&mut self) {
        self.timeline.play();
        self.state.start(Direction::Forward);
    }

    fn reverse(&mut self) {
        self.timeline.reverse();
        self.state.start(Direction::Backward);
    }

    fn cancel(&mut self) {
        self.timeline.pause();
        let direction = self.state.direction();
        self.state.idle(direction);
    }

    fn retarget(&mut self, spec: AnimationSpec) {
        let frame = self.current_frame();
        self.configure(spec.rebased(&frame));
        self.play();
    }

    fn snap(&mut self, direction: Direction) {
        let time = match direction {
            Direction::Forward => self.timeline.duration(),
            Direction::Backward => Duration::ZERO,
        };
        self.timeline.seek(time);
        self.state.idle(direction);
    }

    fn tick(&mut self, dt: Duration) -> Option<Settled> {
        if !self.state.running() {
            return None;
        }
        self.timeline.tick(dt);
        if self.timeline.is_complete() {
            self.state.finish()
        } else {
            None
        }
    }

    fn current_frame(&self) -> Frame {
        let now = self.timeline.current_time();
        let mut frame = Frame::new();
        for (index, segment) in self.segments.iter().enumerate() {
            let started = segment.offset <= now;
            if !started {
                frame.entry(segment.key).or_insert(segment.from);
                continue;
            }
            let t = self.timeline.event_value_at(index).unwrap_or(0.0);
            frame.insert(segment.key, lerp(segment.from, segment.to, t));
        }
        frame
    }

    fn is_running(&self) -> bool {
        self.state.running()
    }

    fn direction(&self) -> Direction {
        self.state.direction()
    }

    fn run(&self) -> RunId {
        self.state.run()
    }
}

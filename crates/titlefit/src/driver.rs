#![forbid(unsafe_code)]

//! Animation drivers.
//!
//! An [`AnimationDriver`] turns an [`AnimationSpec`] into one [`Frame`] per
//! tick. Two strategies exist: [`SpringDriver`] retargets live springs and
//! [`TimelineDriver`] plays baked keyframes. [`PassThroughDriver`] stands in
//! while nothing has been measured.
//!
//! # Run identity
//!
//! Every `configure`, `play`, `reverse`, `retarget`, `snap` and `cancel`
//! starts a new [`RunId`]. A driver reports at most one [`Settled`] per run,
//! so a settle can always be matched against the run that was requested.

pub mod spring;
pub mod timeline;

use std::fmt;
use std::time::Duration;

use titlefit_core::animation::{Direction, SpringParams};

use crate::spec::{AnimationSpec, Frame};

pub use spring::SpringDriver;
pub use timeline::TimelineDriver;

/// Identifies one run of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RunId(u64);

impl RunId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A run reached its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    /// Run that finished.
    pub run: RunId,
    /// Direction it was heading.
    pub direction: Direction,
}

/// Interpolation strategy. Owned by the transition machine; the presentation
/// layer only reads frames.
pub trait AnimationDriver: fmt::Debug {
    /// Load a spec. Keys start at their closed-side values; nothing runs.
    fn configure(&mut self, spec: AnimationSpec);

    /// Run toward the open-side values from wherever keys are now.
    fn play(&mut self);

    /// Run toward the closed-side values from wherever keys are now.
    fn reverse(&mut self);

    /// Stop the current run. Values freeze; no settle will follow.
    fn cancel(&mut self);

    /// Replace the spec and run forward from the current values.
    fn retarget(&mut self, spec: AnimationSpec);

    /// Jump every key to its end value for `direction` without settling.
    fn snap(&mut self, direction: Direction);

    /// Advance by `dt`. Returns the settle of the current run, once.
    fn tick(&mut self, dt: Duration) -> Option<Settled>;

    /// Current value of every key.
    fn current_frame(&self) -> Frame;

    /// Whether a run is in flight.
    fn is_running(&self) -> bool;

    /// Direction of the latest run.
    fn direction(&self) -> Direction;

    /// Identity of the latest run.
    fn run(&self) -> RunId;
}

/// Which driver a badge variant animates with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backend {
    /// Live springs with these default parameters.
    Spring(SpringParams),
    /// Baked keyframe timeline.
    Timeline,
}

impl Backend {
    /// Build a driver for this backend.
    #[must_use]
    pub fn driver(self, rest_threshold: f64) -> Box<dyn AnimationDriver> {
        match self {
            Self::Spring(params) => Box::new(SpringDriver::new(params).rest_threshold(rest_threshold)),
            Self::Timeline => Box::new(TimelineDriver::new()),
        }
    }

    /// Short name for logs and traces.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Spring(_) => "spring",
            Self::Timeline => "timeline",
        }
    }
}

// ---------------------------------------------------------------------------
// Run bookkeeping shared by drivers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RunState {
    run: RunId,
    running: bool,
    direction: Direction,
}

impl RunState {
    /// Begin a new run in `direction`.
    pub(crate) fn start(&mut self, direction: Direction) {
        self.run = RunId(self.run.0 + 1);
        self.running = true;
        self.direction = direction;
    }

    /// Begin a new idle run.
    pub(crate) fn idle(&mut self, direction: Direction) {
        self.run = RunId(self.run.0 + 1);
        self.running = false;
        self.direction = direction;
    }

    /// Close the current run if it is in flight.
    pub(crate) fn finish(&mut self) -> Option<Settled> {
        if !self.running {
            return None;
        }
        self.running = false;
        tracing::trace!(run = self.run.0, direction = ?self.direction, "run settled");
        Some(Settled {
            run: self.run,
            direction: self.direction,
        })
    }

    pub(crate) fn running(&self) -> bool {
        self.running
    }

    pub(crate) fn direction(&self) -> Direction {
        self.direction
    }

    pub(crate) fn run(&self) -> RunId {
        self.run
    }
}

// ---------------------------------------------------------------------------
// PassThroughDriver
// ---------------------------------------------------------------------------

/// Reports target values immediately and never settles.
///
/// Used while layout is unmeasured, so the presentation layer always has a
/// complete frame to read.
#[derive(Debug, Default)]
pub struct PassThroughDriver {
    spec: AnimationSpec,
    state: RunState,
}

impl PassThroughDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnimationDriver for PassThroughDriver {
    fn configure(&mut self, spec: AnimationSpec) {
        self.spec = spec;
        self.state.idle(Direction::Forward);
    }

    fn play(&mut self) {
        self.state.idle(Direction::Forward);
    }

    fn reverse(&mut self) {
        self.state.idle(Direction::Backward);
    }

    fn cancel(&mut self) {
        let direction = self.state.direction();
        self.state.idle(direction);
    }

    fn retarget(&mut self, spec: AnimationSpec) {
        self.configure(spec);
    }

    fn snap(&mut self, direction: Direction) {
        self.state.idle(direction);
    }

    fn tick(&mut self, _dt: Duration) -> Option<Settled> {
        None
    }

    fn current_frame(&self) -> Frame {
        self.spec.targets(self.state.direction())
    }

    fn is_running(&self) -> bool {
        false
    }

    fn direction(&self) -> Direction {
        self.state.direction()
    }

    fn run(&self) -> RunId {
        self.state.run()
    }
}

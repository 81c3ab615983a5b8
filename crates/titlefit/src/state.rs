#![forbid(unsafe_code)]

//! Pure open/close and text-swap state transitions.
//!
//! [`transition`] maps `(state, request)` to a new [`TransitionState`] plus
//! a list of [`Effect`]s for the owner to carry out. It never touches a
//! driver or a renderer, so every rule here is testable in isolation.
//!
//! # State machine
//!
//! ```text
//!            SetOpen(true)          settle
//!   Closed ───────────────▶ Opening ───────▶ Open ──┐ SetText: cross-fade
//!     ▲                      ▲  │              │ ◀──┘ (previous + current)
//!     │ settle / snap        │  │SetOpen(false)│SetOpen(false)
//!     └──────────────── Closing ◀──────────────┘
//!                     SetOpen(true) resumes
//! ```
//!
//! # Invariants
//!
//! 1. `Closed` holds no current slot; nothing is drawn.
//! 2. During a cross-fade the outgoing slot keeps its layout until the run
//!    settles.
//! 3. A slot is reported through [`Effect::Left`] at most once, and only if
//!    it was committed (fully shown at rest).
//! 4. Measurements and settles are matched against the latest ticket and
//!    generation; anything older is ignored.
//! 5. No animation starts from an unmeasured layout.
//!
//! # Failure Modes
//!
//! - Closing before the first measurement snaps straight to `Closed`.
//! - Zero-width measurements (e.g. empty text) snap to the target state.

use std::fmt;

use crate::label::LabelSet;
use crate::layout::{LayoutFrame, LayoutParams, layouts_trusted};
use crate::measure::{MeasureRequest, MeasureTicket, MeasuredBox};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Coarse visibility phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Closing => "closing",
        };
        f.write_str(name)
    }
}

/// Version marker for requested animation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Identity of one displayed label set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(u64);

impl SlotId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Which family of channels a slot is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// `Text` / `Echo` channels.
    Text,
    /// `Leaving` / `LeavingEcho` channels.
    Leaving,
}

/// A label set together with its layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    id: SlotId,
    labels: LabelSet,
    layout: Vec<LayoutFrame>,
    ticket: Option<MeasureTicket>,
    committed: bool,
    lane: Lane,
}

impl Slot {
    #[must_use]
    pub fn id(&self) -> SlotId {
        self.id
    }

    #[must_use]
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Layout frames, one per label. Placeholders until measured.
    #[must_use]
    pub fn layout(&self) -> &[LayoutFrame] {
        &self.layout
    }

    /// Ticket of the outstanding measurement, if any.
    #[must_use]
    pub fn ticket(&self) -> Option<MeasureTicket> {
        self.ticket
    }

    /// Waiting for a measurement.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.ticket.is_some()
    }

    /// Measured with a usable (non-zero) layout.
    #[must_use]
    pub fn is_trusted(&self) -> bool {
        !self.is_pending() && layouts_trusted(&self.layout)
    }

    /// Has been fully shown at rest.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    #[must_use]
    pub fn lane(&self) -> Lane {
        self.lane
    }

    fn measure_request(&self) -> Option<MeasureRequest> {
        self.ticket.map(|ticket| MeasureRequest {
            ticket,
            labels: self.labels.clone(),
        })
    }
}

/// How the owner should move the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Play the open motion of the current slot from its closed form.
    Open,
    /// Bring the current slot in and the previous slot out. With `swap`, the
    /// on-screen lanes are exchanged before rebasing.
    CrossFade { swap: bool },
    /// Play the open motion of the current slot from whatever is on screen.
    Restore { swap: bool },
    /// Drive everything on screen to its closed form.
    Collapse,
}

/// Something the owner of the state must do.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Render the labels and report their boxes.
    RequestMeasure(MeasureRequest),
    /// Configure and start a run.
    Animate {
        generation: Generation,
        motion: Motion,
    },
    /// Run the configured motion backward from the current position.
    Reverse { generation: Generation },
    /// Run the configured motion forward from the current position.
    Resume { generation: Generation },
    /// Stop the current run; no settle is expected.
    Hold,
    /// Load the resting configuration for `open` without interpolating.
    Snap { open: bool },
    /// External completion notification.
    Completed { open: bool },
    /// External leave notification for a retired label set.
    Left { labels: LabelSet },
}

/// Input to [`transition`].
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    SetOpen(bool),
    SetText(LabelSet),
    Measured {
        ticket: MeasureTicket,
        boxes: Vec<MeasuredBox>,
    },
    Settled(Generation),
}

impl Request {
    /// Short name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetOpen(_) => "set_open",
            Self::SetText(_) => "set_text",
            Self::Measured { .. } => "measured",
            Self::Settled(_) => "settled",
        }
    }
}

/// Result of one [`transition`].
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: TransitionState,
    pub effects: Vec<Effect>,
}

/// Complete logical state of one badge.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionState {
    phase: Phase,
    desired: LabelSet,
    current: Option<Slot>,
    previous: Option<Slot>,
    settled: bool,
    collapsing: bool,
    generation: Generation,
    serial: u64,
}

impl TransitionState {
    /// A closed badge that will show `desired` when opened.
    #[must_use]
    pub fn closed(desired: impl Into<LabelSet>) -> Self {
        Self {
            phase: Phase::Closed,
            desired: desired.into(),
            current: None,
            previous: None,
            settled: true,
            collapsing: false,
            generation: Generation::default(),
            serial: 0,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Most recently requested text.
    #[must_use]
    pub fn desired(&self) -> &LabelSet {
        &self.desired
    }

    /// Slot being shown or brought in.
    #[must_use]
    pub fn current(&self) -> Option<&Slot> {
        self.current.as_ref()
    }

    /// Slot being swapped out.
    #[must_use]
    pub fn previous(&self) -> Option<&Slot> {
        self.previous.as_ref()
    }

    /// No run is expected to settle.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// A text swap is pending or in flight.
    #[must_use]
    pub fn is_crossfading(&self) -> bool {
        self.previous.is_some()
    }

    /// Ticket the state currently accepts measurements for.
    #[must_use]
    pub fn awaiting(&self) -> Option<MeasureTicket> {
        self.current.as_ref().and_then(|s| s.ticket)
    }

    fn bump(&mut self) -> Generation {
        self.generation = Generation(self.generation.0 + 1);
        self.generation
    }

    fn fresh_slot(&mut self, labels: LabelSet) -> Slot {
        self.serial += 1;
        let layout = vec![LayoutFrame::PLACEHOLDER; labels.len()];
        Slot {
            id: SlotId(self.serial),
            labels,
            layout,
            ticket: Some(MeasureTicket(self.serial)),
            committed: false,
            lane: Lane::Text,
        }
    }

    /// Replace the current slot with a fresh one for `desired`.
    fn enter_fresh(&mut self, effects: &mut Vec<Effect>) {
        let slot = self.fresh_slot(self.desired.clone());
        effects.extend(slot.measure_request().map(Effect::RequestMeasure));
        self.current = Some(slot);
    }

    fn retire(slot: Option<Slot>, effects: &mut Vec<Effect>) {
        if let Some(slot) = slot
            && slot.committed
        {
            effects.push(Effect::Left {
                labels: slot.labels,
            });
        }
    }

    fn commit_current(&mut self) {
        if let Some(slot) = self.current.as_mut() {
            slot.committed = true;
            slot.lane = Lane::Text;
        }
    }

    fn snap_closed(&mut self, effects: &mut Vec<Effect>) {
        Self::retire(self.previous.take(), effects);
        self.current = None;
        self.phase = Phase::Closed;
        self.settled = true;
        self.collapsing = false;
        self.bump();
        effects.push(Effect::Snap { open: false });
        effects.push(Effect::Completed { open: false });
    }

    fn start_closing(&mut self, motion: Option<Motion>, effects: &mut Vec<Effect>) {
        self.phase = Phase::Closing;
        self.settled = false;
        let generation = self.bump();
        match motion {
            Some(motion) => {
                self.collapsing = true;
                effects.push(Effect::Animate { generation, motion });
            }
            None => {
                self.collapsing = false;
                effects.push(Effect::Reverse { generation });
            }
        }
    }

    /// Whether the lanes on screen must be exchanged so the current slot
    /// reads from `Text` and the previous from `Leaving`.
    fn lanes_swapped(&self) -> bool {
        self.current.as_ref().is_some_and(|s| s.lane == Lane::Leaving)
            || self.previous.as_ref().is_some_and(|s| s.lane == Lane::Text)
    }

    fn assign_crossfade_lanes(&mut self) {
        if let Some(slot) = self.current.as_mut() {
            slot.lane = Lane::Text;
        }
        if let Some(slot) = self.previous.as_mut() {
            slot.lane = Lane::Leaving;
        }
    }
}

// ---------------------------------------------------------------------------
// Transition function
// ---------------------------------------------------------------------------

/// Compute the next state for `request`.
#[must_use]
pub fn transition(state: &TransitionState, request: Request, params: &LayoutParams) -> Transition {
    let mut next = state.clone();
    let mut effects = Vec::new();
    match request {
        Request::SetOpen(true) => next.open(&mut effects),
        Request::SetOpen(false) => next.close(&mut effects),
        Request::SetText(labels) => next.set_text(labels, &mut effects),
        Request::Measured { ticket, boxes } => next.measured(ticket, &boxes, params, &mut effects),
        Request::Settled(generation) => next.run_settled(generation, &mut effects),
    }
    Transition {
        state: next,
        effects,
    }
}

impl TransitionState {
    fn open(&mut self, effects: &mut Vec<Effect>) {
        match self.phase {
            Phase::Opening | Phase::Open => {}
            Phase::Closed => {
                self.previous = None;
                self.phase = Phase::Opening;
                self.settled = false;
                self.bump();
                effects.push(Effect::Hold);
                self.enter_fresh(effects);
            }
            Phase::Closing => {
                let same_text = self
                    .current
                    .as_ref()
                    .is_some_and(|s| s.labels == self.desired);
                self.phase = Phase::Opening;
                self.settled = false;
                let generation = self.bump();

                if !same_text {
                    Self::retire(self.previous.take(), effects);
                    Self::retire(self.current.take(), effects);
                    self.collapsing = false;
                    effects.push(Effect::Hold);
                    self.enter_fresh(effects);
                } else if self.collapsing {
                    // The collapse run has no forward half to resume.
                    Self::retire(self.previous.take(), effects);
                    let swap = self.lanes_swapped();
                    self.move_current_to_text_lane();
                    self.collapsing = false;
                    effects.push(Effect::Animate {
                        generation,
                        motion: Motion::Restore { swap },
                    });
                } else {
                    effects.push(Effect::Resume { generation });
                }
            }
        }
    }

    fn move_current_to_text_lane(&mut self) {
        if let Some(slot) = self.current.as_mut() {
            slot.lane = Lane::Text;
        }
    }

    fn close(&mut self, effects: &mut Vec<Effect>) {
        match self.phase {
            Phase::Closed | Phase::Closing => {}
            Phase::Opening => {
                if self.current.as_ref().is_some_and(Slot::is_trusted) {
                    self.start_closing(None, effects);
                } else {
                    self.snap_closed(effects);
                }
            }
            Phase::Open => {
                if self.previous.is_some() {
                    if self.current.as_ref().is_some_and(Slot::is_pending) {
                        // Swap never started: the committed text is what closes.
                        self.current = self.previous.take();
                    }
                    self.start_closing(Some(Motion::Collapse), effects);
                } else if self.current.as_ref().is_some_and(Slot::is_trusted) {
                    self.start_closing(None, effects);
                } else {
                    self.snap_closed(effects);
                }
            }
        }
    }

    fn set_text(&mut self, labels: LabelSet, effects: &mut Vec<Effect>) {
        self.desired = labels;
        match self.phase {
            Phase::Closed | Phase::Closing => {}
            Phase::Opening => {
                if self.current_shows_desired() {
                    return;
                }
                // Never committed: replaced without a leave notification.
                self.bump();
                effects.push(Effect::Hold);
                self.enter_fresh(effects);
            }
            Phase::Open => {
                if self.current_shows_desired() {
                    return;
                }
                let back_to_previous = self
                    .previous
                    .as_ref()
                    .is_some_and(|s| s.labels == self.desired);
                if back_to_previous {
                    self.swap_back(effects);
                } else {
                    self.begin_swap(effects);
                }
            }
        }
    }

    fn current_shows_desired(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|s| s.labels == self.desired)
    }

    /// Start (or restart) a swap toward `desired`.
    fn begin_swap(&mut self, effects: &mut Vec<Effect>) {
        let current = self.current.take();
        let previous = self.previous.take();
        // Exactly one of the two has been shown at rest; the other is dropped.
        let outgoing = match (current, previous) {
            (Some(c), _) if c.committed => Some(c),
            (c, Some(p)) if p.committed || c.is_none() => Some(p),
            (c, p) => c.or(p),
        };
        self.previous = outgoing;
        self.settled = false;
        self.bump();
        self.enter_fresh(effects);
    }

    /// `desired` equals the outgoing text: bring it back.
    fn swap_back(&mut self, effects: &mut Vec<Effect>) {
        let dropped = self.current.take();
        self.current = self.previous.take();
        self.settled = false;
        let generation = self.bump();

        match dropped {
            Some(slot) if !slot.is_pending() => {
                // Cross-fade was in flight: run it the other way.
                self.previous = Some(slot);
                let swap = self.lanes_swapped();
                self.assign_crossfade_lanes();
                effects.push(Effect::Animate {
                    generation,
                    motion: Motion::CrossFade { swap },
                });
            }
            _ => {
                let swap = self.lanes_swapped();
                self.move_current_to_text_lane();
                effects.push(Effect::Animate {
                    generation,
                    motion: Motion::Restore { swap },
                });
            }
        }
    }

    fn measured(
        &mut self,
        ticket: MeasureTicket,
        boxes: &[MeasuredBox],
        params: &LayoutParams,
        effects: &mut Vec<Effect>,
    ) {
        if self.awaiting() != Some(ticket) {
            tracing::trace!(ticket = ticket.get(), "stale measurement ignored");
            return;
        }
        let Some(slot) = self.current.as_mut() else {
            return;
        };
        let mut boxes = boxes.to_vec();
        boxes.resize(slot.labels.len(), MeasuredBox::UNMEASURED);
        slot.layout = params.compute(&boxes);
        slot.ticket = None;
        let trusted = layouts_trusted(&slot.layout);

        match self.phase {
            Phase::Opening if trusted => {
                let generation = self.bump();
                effects.push(Effect::Animate {
                    generation,
                    motion: Motion::Open,
                });
            }
            Phase::Opening => {
                self.phase = Phase::Open;
                self.settled = true;
                self.commit_current();
                self.bump();
                effects.push(Effect::Snap { open: true });
                effects.push(Effect::Completed { open: true });
            }
            Phase::Open if trusted && self.previous.is_some() => {
                let swap = self.lanes_swapped();
                self.assign_crossfade_lanes();
                let generation = self.bump();
                effects.push(Effect::Animate {
                    generation,
                    motion: Motion::CrossFade { swap },
                });
            }
            Phase::Open => {
                Self::retire(self.previous.take(), effects);
                self.settled = true;
                self.commit_current();
                self.bump();
                effects.push(Effect::Snap { open: true });
            }
            Phase::Closed | Phase::Closing => {}
        }
    }

    fn run_settled(&mut self, generation: Generation, effects: &mut Vec<Effect>) {
        if generation != self.generation || self.settled {
            tracing::trace!(
                generation = generation.get(),
                current = self.generation.get(),
                "stale settle ignored"
            );
            return;
        }
        self.settled = true;
        match self.phase {
            Phase::Opening => {
                self.phase = Phase::Open;
                self.commit_current();
                effects.push(Effect::Completed { open: true });
            }
            Phase::Open => {
                Self::retire(self.previous.take(), effects);
                self.commit_current();
                effects.push(Effect::Snap { open: true });
            }
            Phase::Closing => {
                Self::retire(self.previous.take(), effects);
                self.current = None;
                self.phase = Phase::Closed;
                self.collapsing = false;
                effects.push(Effect::Completed { open: false });
            }
            Phase::Closed => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

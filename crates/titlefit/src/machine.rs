#![forbid(unsafe_code)]

//! Owner of one badge's transition state and animation drivers.
//!
//! [`TransitionMachine`] feeds host input through the pure
//! [`transition`](crate::state::transition) function and carries out the
//! resulting effects: it configures drivers, keeps the pending measurement,
//! matches driver settles to the run that was requested and queues
//! [`BadgeEvent`]s for the host.
//!
//! # Invariants
//!
//! 1. A driver settle is forwarded only if its run is the one recorded when
//!    the current generation's motion started.
//! 2. While the current slot waits for its first measurement during opening,
//!    frames come from the pass-through driver, never from a live run.
//! 3. `frame()` is empty while closed.
//!
//! # Failure Modes
//!
//! - Measurements for a superseded ticket return [`MeasureOutcome::Stale`]
//!   and change nothing.

use std::collections::VecDeque;
use std::time::Duration;

use titlefit_core::animation::Direction;

use crate::choreography::Choreography;
use crate::driver::{AnimationDriver, PassThroughDriver, RunId};
use crate::label::LabelSet;
use crate::layout::{LayoutFrame, LayoutParams};
use crate::measure::{BoundingBoxProvider, MeasureOutcome, MeasureRequest, MeasureTicket, MeasuredBox};
use crate::spec::{Frame, swap_lanes};
use crate::state::{Effect, Generation, Motion, Phase, Request, Transition, TransitionState, transition};

/// Notification for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum BadgeEvent {
    /// The badge came to rest open or closed.
    Completed { open: bool },
    /// A label set that was fully shown is gone from screen.
    Left { labels: LabelSet },
}

/// Host-facing inputs, applied together.
#[derive(Debug, Clone, PartialEq)]
pub struct Props {
    pub open: bool,
    pub labels: LabelSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    run: RunId,
    generation: Generation,
}

/// Drives one badge from host input to per-tick frames.
#[derive(Debug)]
pub struct TransitionMachine {
    state: TransitionState,
    choreography: Box<dyn Choreography>,
    params: LayoutParams,
    size: f64,
    driver: Box<dyn AnimationDriver>,
    fallback: PassThroughDriver,
    pending: Option<MeasureRequest>,
    in_flight: Option<InFlight>,
    events: VecDeque<BadgeEvent>,
}

impl TransitionMachine {
    /// A closed machine that will show `labels` when opened.
    #[must_use]
    pub fn new(
        choreography: Box<dyn Choreography>,
        size: f64,
        rest_threshold: f64,
        labels: impl Into<LabelSet>,
    ) -> Self {
        let params = choreography.layout_params(size);
        let driver = choreography.backend().driver(rest_threshold);
        let labels = labels.into().fit_to(choreography.label_count());
        tracing::debug!(
            variant = choreography.name(),
            backend = choreography.backend().name(),
            size,
            "transition machine created"
        );
        Self {
            state: TransitionState::closed(labels),
            choreography,
            params,
            size,
            driver,
            fallback: PassThroughDriver::new(),
            pending: None,
            in_flight: None,
            events: VecDeque::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn set_open(&mut self, open: bool) {
        self.apply(Request::SetOpen(open));
    }

    /// Show `labels` next. The set is padded with empty labels, or cut, to
    /// the variant's label count.
    pub fn set_text(&mut self, labels: impl Into<LabelSet>) {
        let labels = labels.into().fit_to(self.choreography.label_count());
        self.apply(Request::SetText(labels));
    }

    /// Apply `open` and `labels` together. A close takes effect before the
    /// text change and an open after it, so the text that opens is always
    /// the new one.
    pub fn on_props_changed(&mut self, props: Props) {
        if props.open {
            self.set_text(props.labels);
            self.set_open(true);
        } else {
            self.set_open(false);
            self.set_text(props.labels);
        }
    }

    /// Measurement the host should perform next, if any.
    #[must_use]
    pub fn pending_measure(&self) -> Option<&MeasureRequest> {
        self.pending.as_ref()
    }

    /// Deliver boxes for `ticket`.
    pub fn on_measured(&mut self, ticket: MeasureTicket, boxes: Vec<MeasuredBox>) -> MeasureOutcome {
        if self.state.awaiting() != Some(ticket) {
            tracing::trace!(ticket = ticket.get(), "stale measurement ignored");
            return MeasureOutcome::Stale;
        }
        let effects = self.apply(Request::Measured { ticket, boxes });
        if effects.iter().any(|e| matches!(e, Effect::Animate { .. })) {
            MeasureOutcome::Animating
        } else {
            MeasureOutcome::Snapped
        }
    }

    /// Measure the pending request with `provider`, if there is one.
    pub fn measure_with(&mut self, provider: &mut impl BoundingBoxProvider) -> Option<MeasureOutcome> {
        let request = self.pending.clone()?;
        let boxes = provider.measure_all(&request.labels);
        Some(self.on_measured(request.ticket, boxes))
    }

    /// Advance the live driver by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        let Some(settled) = self.driver.tick(dt) else {
            return;
        };
        match self.in_flight {
            Some(flight) if flight.run == settled.run => {
                self.in_flight = None;
                self.apply(Request::Settled(flight.generation));
            }
            _ => {
                tracing::trace!(run = settled.run.get(), "settle of superseded run ignored");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    /// Values to draw this tick.
    #[must_use]
    pub fn frame(&self) -> Frame {
        match self.state.phase() {
            Phase::Closed => Frame::new(),
            Phase::Opening if self.state.awaiting().is_some() => self.fallback.current_frame(),
            _ => self.driver.current_frame(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    #[must_use]
    pub fn choreography(&self) -> &dyn Choreography {
        self.choreography.as_ref()
    }

    /// Footprint size the layout was computed for.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Whether an animation run is in flight.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.in_flight.is_some() && self.driver.is_running()
    }

    /// Take every queued notification, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = BadgeEvent> + '_ {
        self.events.drain(..)
    }

    // -----------------------------------------------------------------------
    // Effects
    // -----------------------------------------------------------------------

    fn apply(&mut self, request: Request) -> Vec<Effect> {
        let _span = tracing::debug_span!(
            "titlefit.request",
            kind = request.kind(),
            variant = self.choreography.name(),
        )
        .entered();

        let before = self.state.phase();
        let Transition { state, effects } = transition(&self.state, request, &self.params);
        self.state = state;
        if self.state.phase() != before {
            tracing::debug!(
                from = %before,
                to = %self.state.phase(),
                generation = self.state.generation().get(),
                "phase changed"
            );
        }

        for effect in &effects {
            self.perform(effect);
        }
        if self
            .pending
            .as_ref()
            .is_some_and(|p| Some(p.ticket) != self.state.awaiting())
        {
            self.pending = None;
        }
        effects
    }

    fn current_layout(&self) -> Vec<LayoutFrame> {
        self.state
            .current()
            .map(|s| s.layout().to_vec())
            .unwrap_or_default()
    }

    fn on_screen(&self, swap: bool) -> Frame {
        let frame = self.driver.current_frame();
        if swap { swap_lanes(&frame) } else { frame }
    }

    fn perform(&mut self, effect: &Effect) {
        match effect {
            Effect::RequestMeasure(request) => {
                self.pending = Some(request.clone());
                let placeholders = vec![LayoutFrame::PLACEHOLDER; request.labels.len()];
                self.fallback
                    .configure(self.choreography.open_spec(&placeholders, self.size));
                self.fallback.play();
            }
            Effect::Hold => {
                self.driver.cancel();
                self.in_flight = None;
            }
            Effect::Animate { generation, motion } => {
                self.animate(*motion);
                self.in_flight = Some(InFlight {
                    run: self.driver.run(),
                    generation: *generation,
                });
            }
            Effect::Reverse { generation } => {
                self.driver.reverse();
                self.in_flight = Some(InFlight {
                    run: self.driver.run(),
                    generation: *generation,
                });
            }
            Effect::Resume { generation } => {
                self.driver.play();
                self.in_flight = Some(InFlight {
                    run: self.driver.run(),
                    generation: *generation,
                });
            }
            Effect::Snap { open: true } => {
                let spec = self.choreography.open_spec(&self.current_layout(), self.size);
                self.driver.configure(spec);
                self.driver.snap(Direction::Forward);
                self.in_flight = None;
            }
            Effect::Snap { open: false } => {
                self.driver.cancel();
                self.in_flight = None;
            }
            Effect::Completed { open } => {
                self.events.push_back(BadgeEvent::Completed { open: *open });
            }
            Effect::Left { labels } => {
                self.events.push_back(BadgeEvent::Left {
                    labels: labels.clone(),
                });
            }
        }
    }

    fn animate(&mut self, motion: Motion) {
        let layout = self.current_layout();
        match motion {
            Motion::Open => {
                let spec = self.choreography.open_spec(&layout, self.size);
                self.driver.configure(spec);
                self.driver.play();
            }
            Motion::CrossFade { swap } => {
                let outgoing = self
                    .state
                    .previous()
                    .map(|s| s.layout().to_vec())
                    .unwrap_or_default();
                let spec = self
                    .choreography
                    .crossfade_spec(&layout, &outgoing, self.size)
                    .rebased(&self.on_screen(swap));
                if self.driver.is_running() && !swap {
                    self.driver.retarget(spec);
                } else {
                    self.driver.configure(spec);
                    self.driver.play();
                }
            }
            Motion::Restore { swap } => {
                let spec = self
                    .choreography
                    .open_spec(&layout, self.size)
                    .rebased(&self.on_screen(swap));
                self.driver.configure(spec);
                self.driver.play();
            }
            Motion::Collapse => {
                let on_screen = self.driver.current_frame();
                let spec = self.choreography.collapse_spec(&on_screen, &layout, self.size);
                self.driver.configure(spec);
                self.driver.play();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choreography::Variant;
    use crate::label::Label;
    use crate::spec::{Channel, Key, Prop};

    const FRAME: Duration = Duration::from_millis(16);

    fn glyphs(label: &Label) -> MeasuredBox {
        MeasuredBox::new(label.display_text().chars().count() as f64 * 8.0, 12.0)
    }

    fn machine(variant: Variant, text: &str) -> TransitionMachine {
        TransitionMachine::new(variant.choreography(None, None), 120.0, 0.001, text)
    }

    fn run_to_rest(m: &mut TransitionMachine) -> Vec<BadgeEvent> {
        let mut events = Vec::new();
        for _ in 0..2000 {
            m.tick(FRAME);
            events.extend(m.drain_events());
            if m.state().is_settled() {
                break;
            }
        }
        events
    }

    #[test]
    fn open_measures_then_animates_to_rest() {
        let mut m = machine(Variant::Square, "Hello");
        m.set_open(true);
        assert!(m.pending_measure().is_some());
        assert_eq!(m.frame()[&Key::decor(Prop::Rotation)], 90.0);

        assert_eq!(m.measure_with(&mut glyphs), Some(MeasureOutcome::Animating));
        assert!(m.pending_measure().is_none());
        assert_eq!(m.frame()[&Key::decor(Prop::Rotation)], 0.0);

        let events = run_to_rest(&mut m);
        assert_eq!(events, vec![BadgeEvent::Completed { open: true }]);
        assert_eq!(m.state().phase(), Phase::Open);
        assert_eq!(m.frame()[&Key::decor(Prop::Rotation)], 90.0);
    }

    #[test]
    fn close_while_opening_reverses() {
        let mut m = machine(Variant::Square, "Hello");
        m.set_open(true);
        m.measure_with(&mut glyphs);
        for _ in 0..5 {
            m.tick(FRAME);
        }
        m.set_open(false);
        assert_eq!(m.state().phase(), Phase::Closing);
        let events = run_to_rest(&mut m);
        assert_eq!(events, vec![BadgeEvent::Completed { open: false }]);
        assert!(m.frame().is_empty());
    }

    #[test]
    fn stale_measurement_is_reported() {
        let mut m = machine(Variant::Square, "Hello");
        m.set_open(true);
        let ticket = m.pending_measure().map(|r| r.ticket).unwrap();
        m.set_text("World");
        assert_eq!(
            m.on_measured(ticket, vec![MeasuredBox::new(40.0, 12.0)]),
            MeasureOutcome::Stale
        );
        assert_eq!(m.pending_measure().unwrap().labels.to_string(), "World");
    }

    #[test]
    fn swap_draws_both_lanes_then_retires_old_text() {
        let mut m = machine(Variant::Square, "Hello");
        m.set_open(true);
        m.measure_with(&mut glyphs);
        run_to_rest(&mut m);

        m.set_text("Goodbye");
        assert_eq!(m.measure_with(&mut glyphs), Some(MeasureOutcome::Animating));
        let frame = m.frame();
        let leaving = Key::new(Channel::Leaving(0), Prop::TranslateY);
        assert_eq!(frame[&leaving], 0.0);
        assert!(frame[&Key::text(0, Prop::TranslateY)] > 0.0);

        let events = run_to_rest(&mut m);
        assert_eq!(
            events,
            vec![BadgeEvent::Left {
                labels: "Hello".into()
            }]
        );
        assert!(!m.frame().contains_key(&leaving));
    }

    #[test]
    fn zero_width_text_snaps_open() {
        let mut m = machine(Variant::Diamond, "");
        m.set_open(true);
        assert_eq!(m.measure_with(&mut glyphs), Some(MeasureOutcome::Snapped));
        assert_eq!(
            m.drain_events().collect::<Vec<_>>(),
            vec![BadgeEvent::Completed { open: true }]
        );
        assert!(!m.is_animating());
    }

    #[test]
    fn short_label_set_snaps_instead_of_animating_a_placeholder() {
        let mut m = machine(Variant::Stacked, "Hello");
        assert_eq!(m.state().desired().to_string(), "Hello | ");
        m.set_open(true);
        assert_eq!(m.pending_measure().unwrap().labels.len(), 2);

        assert_eq!(m.measure_with(&mut glyphs), Some(MeasureOutcome::Snapped));
        assert!(!m.is_animating());
        assert_eq!(m.state().phase(), Phase::Open);
        assert_eq!(
            m.drain_events().collect::<Vec<_>>(),
            vec![BadgeEvent::Completed { open: true }]
        );
    }

    #[test]
    fn set_text_fits_labels_to_the_variant() {
        let mut m = machine(Variant::Ribbon, "Top");
        m.set_open(true);
        m.measure_with(&mut glyphs);
        m.drain_events().for_each(drop);

        m.set_text(LabelSet::from(["Top", "Bottom"]));
        assert_eq!(m.measure_with(&mut glyphs), Some(MeasureOutcome::Animating));
        run_to_rest(&mut m);

        m.set_text("Solo");
        let request = m.pending_measure().unwrap();
        assert_eq!(request.labels.len(), 2);
        assert!(request.labels.get(1).unwrap().is_empty());
        assert_eq!(m.measure_with(&mut glyphs), Some(MeasureOutcome::Snapped));
        assert!(!m.is_animating());

        m.set_text(LabelSet::from(["A", "B", "C"]));
        assert_eq!(m.pending_measure().unwrap().labels.to_string(), "A | B");
    }

    #[test]
    fn props_close_applies_before_text() {
        let mut m = machine(Variant::Square, "Hello");
        m.set_open(true);
        m.measure_with(&mut glyphs);
        run_to_rest(&mut m);

        m.on_props_changed(Props {
            open: false,
            labels: "World".into(),
        });
        assert_eq!(m.state().phase(), Phase::Closing);
        assert!(m.state().previous().is_none());
        assert_eq!(m.state().current().unwrap().labels().to_string(), "Hello");

        m.on_props_changed(Props {
            open: true,
            labels: "World".into(),
        });
        let events: Vec<_> = m.drain_events().collect();
        assert_eq!(
            events,
            vec![BadgeEvent::Left {
                labels: "Hello".into()
            }]
        );
        assert_eq!(m.pending_measure().unwrap().labels.to_string(), "World");
    }

    #[test]
    fn timeline_variant_runs_full_length() {
        let mut m = TransitionMachine::new(
            Variant::Bars.choreography(None, None),
            120.0,
            0.001,
            LabelSet::from(["Top", "Bottom"]),
        );
        m.set_open(true);
        m.measure_with(&mut glyphs);
        let mut ticks = 0;
        while !m.state().is_settled() && ticks < 1000 {
            m.tick(FRAME);
            ticks += 1;
        }
        assert!(ticks >= 2000 / 16, "settled after {ticks} ticks");
        assert_eq!(m.frame()[&Key::text(1, Prop::Rotation)], 0.0);
    }
}

#![forbid(unsafe_code)]

//! One configured badge: config, choreography and transition machine.
//!
//! [`Badge`] is what a host holds per widget. It forwards input to the
//! machine and, on every [`Badge::tick`], returns a [`BadgeFrame`] with all
//! the presentation layer needs: interpolated values, the render gate and a
//! view of each visible label slot with its clip bands.

use std::time::Duration;

use titlefit_core::geometry::Rect;

use crate::config::BadgeConfig;
use crate::error::Result;
use crate::label::LabelSet;
use crate::layout::{ClipBands, LayoutFrame};
use crate::machine::{BadgeEvent, Props, TransitionMachine};
use crate::measure::{BoundingBoxProvider, MeasureOutcome, MeasureRequest, MeasureTicket, MeasuredBox};
use crate::spec::Frame;
use crate::state::{Lane, Phase, Slot};
use crate::visibility::{RenderMode, VisibilityController};

/// What to draw for one label slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotView {
    pub labels: LabelSet,
    pub layout: Vec<LayoutFrame>,
    /// One entry per label, centered in the footprint.
    pub clips: Vec<ClipBands>,
    /// Channels the slot's values are read from.
    pub lane: Lane,
}

impl SlotView {
    fn of(slot: &Slot, footprint: Rect) -> Self {
        Self {
            labels: slot.labels().clone(),
            layout: slot.layout().to_vec(),
            clips: slot
                .layout()
                .iter()
                .map(|frame| ClipBands::centered(frame, footprint))
                .collect(),
            lane: slot.lane(),
        }
    }
}

/// Everything the presentation layer reads for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeFrame {
    pub values: Frame,
    pub visible: bool,
    pub mode: RenderMode,
    pub phase: Phase,
    pub current: Option<SlotView>,
    pub previous: Option<SlotView>,
}

/// A title badge.
#[derive(Debug)]
pub struct Badge {
    config: BadgeConfig,
    machine: TransitionMachine,
}

impl Badge {
    /// Build a closed badge showing `labels` once opened.
    ///
    /// Fails with [`ConfigError::Validation`](crate::ConfigError::Validation)
    /// if `config` is invalid.
    pub fn new(config: BadgeConfig, labels: impl Into<LabelSet>) -> Result<Self> {
        let config = config.validated()?;
        let machine = TransitionMachine::new(
            config.choreography(),
            config.size,
            config.rest_threshold,
            labels,
        );
        Ok(Self { config, machine })
    }

    #[must_use]
    pub fn config(&self) -> &BadgeConfig {
        &self.config
    }

    #[must_use]
    pub fn machine(&self) -> &TransitionMachine {
        &self.machine
    }

    pub fn set_open(&mut self, open: bool) {
        self.machine.set_open(open);
    }

    pub fn set_text(&mut self, labels: impl Into<LabelSet>) {
        self.machine.set_text(labels);
    }

    pub fn on_props_changed(&mut self, props: Props) {
        self.machine.on_props_changed(props);
    }

    #[must_use]
    pub fn pending_measure(&self) -> Option<&MeasureRequest> {
        self.machine.pending_measure()
    }

    pub fn on_measured(&mut self, ticket: MeasureTicket, boxes: Vec<MeasuredBox>) -> MeasureOutcome {
        self.machine.on_measured(ticket, boxes)
    }

    pub fn measure_with(&mut self, provider: &mut impl BoundingBoxProvider) -> Option<MeasureOutcome> {
        self.machine.measure_with(provider)
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        VisibilityController::is_visible(self.machine.state())
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = BadgeEvent> + '_ {
        self.machine.drain_events()
    }

    /// Advance by `dt` and return the frame to draw.
    pub fn tick(&mut self, dt: Duration) -> BadgeFrame {
        self.machine.tick(dt);
        self.snapshot()
    }

    /// The frame to draw, without advancing time.
    #[must_use]
    pub fn snapshot(&self) -> BadgeFrame {
        let state = self.machine.state();
        let footprint = Rect::from_size(self.config.size, self.config.size);
        BadgeFrame {
            values: self.machine.frame(),
            visible: VisibilityController::is_visible(state),
            mode: VisibilityController::render_mode(state),
            phase: state.phase(),
            current: state.current().map(|s| SlotView::of(s, footprint)),
            previous: state.previous().map(|s| SlotView::of(s, footprint)),
        }
    }
}

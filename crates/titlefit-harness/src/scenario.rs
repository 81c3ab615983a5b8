#![forbid(unsafe_code)]

//! Scripted badge scenarios.
//!
//! A [`Scenario`] is a badge config, an initial text and a list of
//! [`Step`]s. [`ScenarioRunner`] plays the steps against a [`Badge`] with a
//! fixed frame interval and records a [`TraceRecord`](crate::TraceRecord)
//! after every step.
//!
//! Scenarios can be written as JSON:
//!
//! ```json
//! {
//!   "name": "hello",
//!   "config": { "variant": "square", "size": 100.0 },
//!   "text": ["Hello"],
//!   "steps": [{ "op": "open" }, { "op": "measure" }, { "op": "settle" }]
//! }
//! ```
//!
//! # Failure Modes
//!
//! - An invalid config fails before any step runs.
//! - `settle` gives up after `max_settle_frames` and reports
//!   [`HarnessError::SettleTimeout`].

use std::time::Duration;

use serde::Deserialize;
use titlefit::{
    Badge, BadgeConfig, BadgeEvent, BoundingBoxProvider, ConfigError, Label, LabelSet,
    MeasureOutcome, MeasuredBox, Props,
};
use tracing::{debug, info_span};

use crate::trace::Trace;

/// Default frame interval: 60 Hz.
pub const FRAME: Duration = Duration::from_micros(16_667);

/// Upper bound on frames a `settle` step may take.
pub const DEFAULT_MAX_SETTLE_FRAMES: usize = 5_000;

/// Harness failure.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("scenario parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("badge did not settle within {frames} frames")]
    SettleTimeout { frames: usize },
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Open,
    Close,
    /// Replace the text.
    Text { labels: Vec<String> },
    /// Apply open state and text together.
    Props { open: bool, labels: Vec<String> },
    /// Measure the pending slot with the runner's measurer.
    Measure,
    /// Deliver explicit boxes (`[width, height]`) for the pending slot.
    Deliver { boxes: Vec<[f64; 2]> },
    /// Advance `frames` frames.
    Tick { frames: u32 },
    /// Measure and tick until nothing is pending or in flight.
    Settle,
}

impl Step {
    /// Record name of the step.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Text { .. } => "text",
            Self::Props { .. } => "props",
            Self::Measure => "measure",
            Self::Deliver { .. } => "deliver",
            Self::Tick { .. } => "tick",
            Self::Settle => "settle",
        }
    }

    /// Shorthand for a text step.
    #[must_use]
    pub fn text<const N: usize>(labels: [&str; N]) -> Self {
        Self::Text {
            labels: labels.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

fn label_set(labels: &[String]) -> LabelSet {
    labels.iter().map(|s| Label::new(s.as_str())).collect()
}

/// A complete scripted run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub config: BadgeConfig,
    /// Text the badge starts with.
    #[serde(default)]
    pub text: Vec<String>,
    pub steps: Vec<Step>,
}

impl Scenario {
    #[must_use]
    pub fn new(name: impl Into<String>, config: BadgeConfig, text: &[&str]) -> Self {
        Self {
            name: name.into(),
            config,
            text: text.iter().map(|s| (*s).to_string()).collect(),
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self, HarnessError> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Plays scenarios against a badge.
#[derive(Debug)]
pub struct ScenarioRunner<M> {
    measurer: M,
    frame: Duration,
    max_settle_frames: usize,
}

impl<M: BoundingBoxProvider> ScenarioRunner<M> {
    #[must_use]
    pub fn new(measurer: M) -> Self {
        Self {
            measurer,
            frame: FRAME,
            max_settle_frames: DEFAULT_MAX_SETTLE_FRAMES,
        }
    }

    #[must_use]
    pub fn with_frame(mut self, frame: Duration) -> Self {
        self.frame = frame;
        self
    }

    #[must_use]
    pub fn with_max_settle_frames(mut self, frames: usize) -> Self {
        self.max_settle_frames = frames;
        self
    }

    #[must_use]
    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    /// Run every step and return the trace together with the final badge.
    pub fn run(&mut self, scenario: &Scenario) -> Result<(Trace, Badge), HarnessError> {
        let _span = info_span!("titlefit.scenario", name = %scenario.name).entered();
        let mut badge = Badge::new(scenario.config.clone(), label_set(&scenario.text))?;
        let mut trace = Trace::new();
        trace.record("start", &badge.snapshot(), None, &[]);

        for step in &scenario.steps {
            let outcome = self.apply(&mut badge, step)?;
            let events: Vec<BadgeEvent> = badge.drain_events().collect();
            let record = trace.record(step.name(), &badge.snapshot(), outcome, &events);
            debug!(
                seq = record.seq,
                step = step.name(),
                phase = %record.phase,
                events = record.events.len(),
                "step applied"
            );
        }
        Ok((trace, badge))
    }

    fn apply(&mut self, badge: &mut Badge, step: &Step) -> Result<Option<MeasureOutcome>, HarnessError> {
        let outcome = match step {
            Step::Open => {
                badge.set_open(true);
                None
            }
            Step::Close => {
                badge.set_open(false);
                None
            }
            Step::Text { labels } => {
                badge.set_text(label_set(labels));
                None
            }
            Step::Props { open, labels } => {
                badge.on_props_changed(Props {
                    open: *open,
                    labels: label_set(labels),
                });
                None
            }
            Step::Measure => badge.measure_with(&mut self.measurer),
            Step::Deliver { boxes } => {
                let ticket = badge.pending_measure().map(|req| req.ticket);
                ticket.map(|ticket| {
                    let boxes = boxes.iter().map(|&[w, h]| MeasuredBox::new(w, h)).collect();
                    badge.on_measured(ticket, boxes)
                })
            }
            Step::Tick { frames } => {
                for _ in 0..*frames {
                    badge.tick(self.frame);
                }
                None
            }
            Step::Settle => return self.settle(badge),
        };
        Ok(outcome)
    }

    fn settle(&mut self, badge: &mut Badge) -> Result<Option<MeasureOutcome>, HarnessError> {
        let mut last = None;
        for _ in 0..self.max_settle_frames {
            if let Some(outcome) = badge.measure_with(&mut self.measurer) {
                last = Some(outcome);
            }
            let machine = badge.machine();
            if machine.state().is_settled() && machine.pending_measure().is_none() {
                return Ok(last);
            }
            badge.tick(self.frame);
        }
        Err(HarnessError::SettleTimeout {
            frames: self.max_settle_frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyphs::GlyphMetrics;
    use titlefit::Variant;

    #[test]
    fn parses_json_scenario() {
        let scenario = Scenario::from_json_str(
            r#"{
                "name": "hello",
                "config": {"variant": "diamond"},
                "text": ["Hello"],
                "steps": [
                    {"op": "open"},
                    {"op": "deliver", "boxes": [[40.0, 10.0]]},
                    {"op": "tick", "frames": 3},
                    {"op": "text", "labels": ["World"]},
                    {"op": "settle"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(scenario.config.variant, Variant::Diamond);
        assert_eq!(scenario.steps.len(), 5);
        assert_eq!(scenario.steps[3], Step::text(["World"]));
    }

    #[test]
    fn unknown_op_is_rejected() {
        let err = Scenario::from_json_str(r#"{"name": "x", "steps": [{"op": "jump"}]}"#);
        assert!(matches!(err, Err(HarnessError::Json(_))));
    }

    #[test]
    fn invalid_config_fails_before_steps() {
        let config = BadgeConfig {
            size: 0.0,
            ..BadgeConfig::default()
        };
        let scenario = Scenario::new("bad", config, &["A"]).step(Step::Open);
        let mut runner = ScenarioRunner::new(GlyphMetrics::default());
        assert!(matches!(runner.run(&scenario), Err(HarnessError::Config(_))));
        assert_eq!(runner.measurer().calls(), 0);
    }

    #[test]
    fn settle_respects_frame_budget() {
        let never = |_: &Label| MeasuredBox::UNMEASURED;
        let scenario = Scenario::new("stuck", BadgeConfig::default(), &["A"])
            .step(Step::Open)
            .step(Step::Settle);
        // Zero-width text snaps open, so settling still succeeds.
        let mut runner = ScenarioRunner::new(never).with_max_settle_frames(3);
        let (trace, _) = runner.run(&scenario).unwrap();
        assert_eq!(trace.records().last().map(|r| r.phase.as_str()), Some("open"));

        let scenario = Scenario::new("slow", BadgeConfig::default(), &["A"])
            .step(Step::Open)
            .step(Step::Settle);
        let mut runner = ScenarioRunner::new(GlyphMetrics::default()).with_max_settle_frames(2);
        assert!(matches!(
            runner.run(&scenario),
            Err(HarnessError::SettleTimeout { frames: 2 })
        ));
    }
}

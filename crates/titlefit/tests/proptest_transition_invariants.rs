//! Property-based invariant tests for the transition engine.
//!
//! 1. Layout is deterministic: identical inputs give bit-identical frames
//! 2. Each label set is reported as left at most once
//! 3. Last write wins: a trailing close always reaches `Closed`
//! 4. Once closed, a badge stays invisible until it is opened again
//! 5. Nothing animates while the opening slot is unmeasured
//! 6. `Closed` never holds a current slot

use std::collections::HashMap;
use std::time::Duration;

use proptest::prelude::*;
use titlefit::{
    BadgeEvent, Label, LabelSet, MeasuredBox, Phase, TransitionMachine, Variant,
    VisibilityController, compute_layout,
};

const FRAME: Duration = Duration::from_millis(16);

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Open,
    Close,
    /// Switch to a never-seen text.
    NewText,
    /// Switch to the empty text.
    EmptyText,
    Measure,
    Tick(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Open),
        2 => Just(Op::Close),
        3 => Just(Op::NewText),
        1 => Just(Op::EmptyText),
        4 => Just(Op::Measure),
        4 => (1u8..60).prop_map(Op::Tick),
    ]
}

fn variant_strategy() -> impl Strategy<Value = Variant> {
    (0usize..Variant::ALL.len()).prop_map(|i| Variant::ALL[i])
}

fn glyphs(label: &Label) -> MeasuredBox {
    MeasuredBox::new(label.display_text().chars().count() as f64 * 7.0, 11.0)
}

struct Harness {
    machine: TransitionMachine,
    next_text: usize,
    events: Vec<BadgeEvent>,
}

impl Harness {
    fn new(variant: Variant) -> Self {
        Self {
            machine: TransitionMachine::new(variant.choreography(None, None), 120.0, 0.001, "t0"),
            next_text: 1,
            events: Vec::new(),
        }
    }

    fn labels(&mut self, text: &str) -> LabelSet {
        let count = self.machine.choreography().label_count();
        (0..count).map(|i| Label::new(format!("{text}/{i}"))).collect()
    }

    fn apply(&mut self, op: &Op) {
        match op {
            Op::Open => self.machine.set_open(true),
            Op::Close => self.machine.set_open(false),
            Op::NewText => {
                let text = format!("t{}", self.next_text);
                self.next_text += 1;
                let labels = self.labels(&text);
                self.machine.set_text(labels);
            }
            Op::EmptyText => {
                let count = self.machine.choreography().label_count();
                let labels: LabelSet = (0..count).map(|_| Label::new("")).collect();
                self.machine.set_text(labels);
            }
            Op::Measure => {
                self.machine.measure_with(&mut glyphs);
            }
            Op::Tick(n) => {
                for _ in 0..*n {
                    self.machine.tick(FRAME);
                }
            }
        }
        self.events.extend(self.machine.drain_events());
    }

    /// Measure and tick until nothing is pending or in flight.
    fn settle(&mut self) {
        for _ in 0..5000 {
            self.machine.measure_with(&mut glyphs);
            if self.machine.state().is_settled() && self.machine.pending_measure().is_none() {
                break;
            }
            self.machine.tick(FRAME);
        }
        self.events.extend(self.machine.drain_events());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Layout determinism
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn layout_is_bit_identical(
        boxes in prop::collection::vec((0.0f64..500.0, 0.0f64..200.0), 0..4),
        targets in prop::collection::vec(-50.0f64..400.0, 0..3),
        fit in 0.68f64..=0.9,
    ) {
        let boxes: Vec<MeasuredBox> = boxes.into_iter().map(|(w, h)| MeasuredBox::new(w, h)).collect();
        let a = compute_layout(&boxes, &targets, fit);
        let b = compute_layout(&boxes, &targets, fit);
        prop_assert_eq!(a.len(), boxes.len());
        for (x, y) in a.iter().zip(&b) {
            prop_assert_eq!(x.scale.to_bits(), y.scale.to_bits());
            prop_assert_eq!(x.gap.to_bits(), y.gap.to_bits());
            prop_assert_eq!(x.measured, y.measured);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. At-most-once leave
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn each_label_set_leaves_at_most_once(
        variant in variant_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let mut h = Harness::new(variant);
        for op in &ops {
            h.apply(op);
        }
        h.settle();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for event in &h.events {
            if let BadgeEvent::Left { labels } = event {
                let key = labels.to_string();
                // The empty text may be chosen many times.
                if labels.iter().all(Label::is_empty) {
                    continue;
                }
                *counts.entry(key).or_default() += 1;
            }
        }
        for (labels, count) in counts {
            prop_assert_eq!(count, 1, "{} left {} times", labels, count);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Last write wins
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn trailing_close_reaches_closed(
        variant in variant_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let mut h = Harness::new(variant);
        for op in &ops {
            h.apply(op);
        }
        h.apply(&Op::Close);
        h.settle();
        prop_assert_eq!(h.machine.state().phase(), Phase::Closed);
        prop_assert!(h.machine.frame().is_empty());
        // A badge that was never opened has nothing to report.
        let ends_closed = h.events.is_empty()
            || h.events.last() == Some(&BadgeEvent::Completed { open: false });
        prop_assert!(ends_closed, "events: {:?}", h.events);
    }

    #[test]
    fn trailing_open_shows_latest_text(
        variant in variant_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let mut h = Harness::new(variant);
        for op in &ops {
            h.apply(op);
        }
        h.apply(&Op::NewText);
        h.apply(&Op::Open);
        h.settle();
        let state = h.machine.state();
        prop_assert_eq!(state.phase(), Phase::Open);
        prop_assert!(state.previous().is_none());
        prop_assert_eq!(state.current().map(|s| s.labels()), Some(state.desired()));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Visibility monotonicity on close
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn closed_stays_hidden_until_opened(
        variant in variant_strategy(),
        before in prop::collection::vec(op_strategy(), 0..30),
        after in prop::collection::vec(op_strategy(), 0..30),
    ) {
        let mut h = Harness::new(variant);
        for op in &before {
            h.apply(op);
        }
        h.apply(&Op::Close);
        h.settle();
        prop_assert!(!VisibilityController::is_visible(h.machine.state()));

        for op in after.iter().filter(|op| !matches!(op, Op::Open)) {
            h.apply(op);
            prop_assert!(!VisibilityController::is_visible(h.machine.state()));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5–6. Measurement gating and structural invariants
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn structural_invariants_hold_after_every_op(
        variant in variant_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..80),
    ) {
        let mut h = Harness::new(variant);
        for op in &ops {
            h.apply(op);
            let state = h.machine.state();
            if state.phase() == Phase::Closed {
                prop_assert!(state.current().is_none());
                prop_assert!(state.previous().is_none());
            }
            if state.phase() == Phase::Opening && state.awaiting().is_some() {
                prop_assert!(!h.machine.is_animating());
            }
            if state.awaiting().is_some() {
                prop_assert!(h.machine.pending_measure().is_some());
            }
        }
    }
}

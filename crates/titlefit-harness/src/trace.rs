#![forbid(unsafe_code)]

//! JSONL trace records and determinism digests.
//!
//! A [`Trace`] is the ordered list of [`TraceRecord`]s a scenario produced.
//! Each record is one JSON object per line:
//!
//! ```text
//! {"schema_version":1,"seq":0,"event":"open","phase":"opening",...}
//! ```
//!
//! Interpolated values are keyed by their display name (`"decor.scale"`,
//! `"text0.translate_y"`) and stored in key order, so two runs of the same
//! scenario serialize to identical bytes. [`Trace::digest`] hashes those
//! bytes with blake3.

use std::collections::BTreeMap;

use serde::Serialize;
use titlefit::{BadgeEvent, BadgeFrame, MeasureOutcome, RenderMode};

/// Version of the record layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Snapshot of a badge after one scripted step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceRecord {
    pub schema_version: u32,
    pub seq: u64,
    /// Step that produced the record (`open`, `text`, `tick`, ...).
    pub event: String,
    pub phase: String,
    pub mode: String,
    pub visible: bool,
    pub values: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
}

/// Host-visible name of an event.
#[must_use]
pub fn event_name(event: &BadgeEvent) -> String {
    match event {
        BadgeEvent::Completed { open: true } => "completed:open".to_string(),
        BadgeEvent::Completed { open: false } => "completed:closed".to_string(),
        BadgeEvent::Left { labels } => format!("left:{labels}"),
    }
}

fn outcome_name(outcome: MeasureOutcome) -> &'static str {
    match outcome {
        MeasureOutcome::Animating => "animating",
        MeasureOutcome::Snapped => "snapped",
        MeasureOutcome::Stale => "stale",
    }
}

fn mode_name(mode: RenderMode) -> &'static str {
    match mode {
        RenderMode::Hidden => "hidden",
        RenderMode::MeasureOnly => "measure_only",
        RenderMode::Animated => "animated",
        RenderMode::Resting => "resting",
    }
}

/// Records of one scenario run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    records: Vec<TraceRecord>,
}

impl Trace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record built from a badge frame.
    pub fn record(
        &mut self,
        event: &str,
        frame: &BadgeFrame,
        measure: Option<MeasureOutcome>,
        events: &[BadgeEvent],
    ) -> &TraceRecord {
        let seq = self.records.len() as u64;
        self.records.push(TraceRecord {
            schema_version: SCHEMA_VERSION,
            seq,
            event: event.to_string(),
            phase: frame.phase.to_string(),
            mode: mode_name(frame.mode).to_string(),
            visible: frame.visible,
            values: frame
                .values
                .iter()
                .map(|(key, value)| (key.to_string(), *value))
                .collect(),
            current: frame.current.as_ref().map(|s| s.labels.to_string()),
            previous: frame.previous.as_ref().map(|s| s.labels.to_string()),
            measure: measure.map(|o| outcome_name(o).to_string()),
            events: events.iter().map(event_name).collect(),
        });
        &self.records[self.records.len() - 1]
    }

    #[must_use]
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Phases in record order, with consecutive repeats collapsed.
    #[must_use]
    pub fn phases(&self) -> Vec<&str> {
        let mut phases: Vec<&str> = Vec::new();
        for record in &self.records {
            if phases.last() != Some(&record.phase.as_str()) {
                phases.push(&record.phase);
            }
        }
        phases
    }

    /// Every host event, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<&str> {
        self.records
            .iter()
            .flat_map(|r| r.events.iter().map(String::as_str))
            .collect()
    }

    /// Serialize as JSON Lines.
    pub fn to_jsonl(&self) -> serde_json::Result<String> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// blake3 digest of the JSONL form, as `"blake3:<hex>"`.
    pub fn digest(&self) -> serde_json::Result<String> {
        let jsonl = self.to_jsonl()?;
        let hash = blake3::hash(jsonl.as_bytes());
        Ok(format!("blake3:{}", hash.to_hex()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use titlefit::{LabelSet, Phase};

    fn closed_frame() -> BadgeFrame {
        BadgeFrame {
            values: Default::default(),
            visible: false,
            mode: RenderMode::Hidden,
            phase: Phase::Closed,
            current: None,
            previous: None,
        }
    }

    #[test]
    fn records_are_sequenced() {
        let mut trace = Trace::new();
        trace.record("start", &closed_frame(), None, &[]);
        let second = trace.record("tick", &closed_frame(), None, &[]);
        assert_eq!(second.seq, 1);
        assert_eq!(trace.phases(), vec!["closed"]);
    }

    #[test]
    fn jsonl_has_one_line_per_record_and_skips_empty_fields() {
        let mut trace = Trace::new();
        trace.record("start", &closed_frame(), None, &[]);
        trace.record(
            "tick",
            &closed_frame(),
            Some(MeasureOutcome::Stale),
            &[BadgeEvent::Left {
                labels: LabelSet::from("Hi"),
            }],
        );
        let jsonl = trace.to_jsonl().unwrap();
        let lines: Vec<&str> = jsonl.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("{\"schema_version\":1,\"seq\":0,\"event\":\"start\""));
        assert!(!lines[0].contains("events"));
        let parsed: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed["measure"], "stale");
        assert_eq!(parsed["events"][0], "left:Hi");
        assert_eq!(parsed["mode"], "hidden");
    }

    #[test]
    fn digest_tracks_content() {
        let mut a = Trace::new();
        a.record("start", &closed_frame(), None, &[]);
        let b = a.clone();
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
        assert!(a.digest().unwrap().starts_with("blake3:"));

        a.record("tick", &closed_frame(), None, &[]);
        assert_ne!(a.digest().unwrap(), b.digest().unwrap());
    }
}

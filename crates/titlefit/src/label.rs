#![forbid(unsafe_code)]

//! Display text with an optional emphasized word.
//!
//! A label may contain one `*word*` marker. The marked word is rendered as a
//! distinct bold run; everything else is plain. Only the first well-formed
//! marker is honored, later ones stay literal.

use std::fmt;

/// A run of text with uniform emphasis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Text of the run (markers stripped).
    pub text: String,
    /// Whether the run is the emphasized word.
    pub emphasis: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            emphasis: false,
        }
    }
}

/// A piece of text to display. Identity is the raw source text.
#[derive(Debug, Clone)]
pub struct Label {
    raw: String,
    segments: Vec<Segment>,
}

impl Label {
    /// Parse `raw` into plain/emphasis segments.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = parse_segments(&raw);
        Self { raw, segments }
    }

    /// The source text, markers included.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parsed runs. Empty for empty text.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The text as displayed, markers removed.
    #[must_use]
    pub fn display_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// The emphasized word, if any.
    #[must_use]
    pub fn emphasis(&self) -> Option<&str> {
        self.segments
            .iter()
            .find(|s| s.emphasis)
            .map(|s| s.text.as_str())
    }

    /// Whether nothing would be drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Label {}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Label {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Label {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// `[A-Za-z0-9_]`.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Byte range of the first `*word*` marker: (start of `*`, end after closing `*`).
fn find_marker(raw: &str) -> Option<(usize, usize)> {
    let mut search_from = 0;
    while let Some(rel) = raw[search_from..].find('*') {
        let open = search_from + rel;
        let body_start = open + 1;
        let body_len: usize = raw[body_start..]
            .chars()
            .take_while(|&c| is_word_char(c))
            .map(char::len_utf8)
            .sum();
        let close = body_start + body_len;
        if body_len > 0 && raw[close..].starts_with('*') {
            return Some((open, close + 1));
        }
        search_from = body_start;
    }
    None
}

fn parse_segments(raw: &str) -> Vec<Segment> {
    if raw.is_empty() {
        return Vec::new();
    }
    let Some((open, end)) = find_marker(raw) else {
        return vec![Segment::plain(raw)];
    };

    let mut segments = Vec::with_capacity(3);
    if open > 0 {
        segments.push(Segment::plain(&raw[..open]));
    }
    segments.push(Segment {
        text: raw[open + 1..end - 1].to_string(),
        emphasis: true,
    });
    if end < raw.len() {
        segments.push(Segment::plain(&raw[end..]));
    }
    segments
}

/// Ordered labels displayed together by one badge.
///
/// Single-text variants hold one label; two-text variants hold two.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelSet(Vec<Label>);

impl LabelSet {
    /// Build from labels.
    pub fn new(labels: Vec<Label>) -> Self {
        Self(labels)
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set holds no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Label at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Label> {
        self.0.get(index)
    }

    /// Iterate labels in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.0.iter()
    }

    /// Exactly `count` labels: extras are dropped, missing ones are empty.
    #[must_use]
    pub fn fit_to(mut self, count: usize) -> Self {
        self.0.resize_with(count, || Label::new(""));
        self
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, label) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{label}")?;
        }
        Ok(())
    }
}

impl From<&str> for LabelSet {
    fn from(raw: &str) -> Self {
        Self(vec![Label::new(raw)])
    }
}

impl From<Label> for LabelSet {
    fn from(label: Label) -> Self {
        Self(vec![label])
    }
}

impl<const N: usize> From<[&str; N]> for LabelSet {
    fn from(raws: [&str; N]) -> Self {
        raws.into_iter().map(Label::new).collect()
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LabelSet {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_segment() {
        let label = Label::new("Hello");
        assert_eq!(label.segments(), &[Segment::plain("Hello")]);
        assert_eq!(label.emphasis(), None);
    }

    #[test]
    fn emphasis_in_middle() {
        let label = Label::new("Say *hello* world");
        let segs = label.segments();
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0], Segment::plain("Say "));
        assert_eq!(segs[1].text, "hello");
        assert!(segs[1].emphasis);
        assert_eq!(segs[2], Segment::plain(" world"));
        assert_eq!(label.display_text(), "Say hello world");
    }

    #[test]
    fn emphasis_at_edges_omits_empty_runs() {
        let label = Label::new("*Big*");
        assert_eq!(label.segments().len(), 1);
        assert_eq!(label.emphasis(), Some("Big"));
    }

    #[test]
    fn only_first_marker_is_honored() {
        let label = Label::new("*one* and *two*");
        assert_eq!(label.emphasis(), Some("one"));
        assert_eq!(label.segments().last().unwrap().text, " and *two*");
    }

    #[test]
    fn malformed_markers_stay_literal() {
        for raw in ["**", "* spaced *", "open *only", "a*b c*"] {
            let label = Label::new(raw);
            assert_eq!(label.emphasis(), None, "{raw}");
            assert_eq!(label.display_text(), raw);
        }
    }

    #[test]
    fn marker_after_false_start() {
        let label = Label::new("* x *ok*");
        assert_eq!(label.emphasis(), Some("ok"));
    }

    #[test]
    fn non_ascii_word_is_not_a_marker() {
        let label = Label::new("Grüße *Straße*!");
        assert_eq!(label.emphasis(), None);
        assert_eq!(label.display_text(), "Grüße *Straße*!");

        let label = Label::new("Grüße *Strasse_2*!");
        assert_eq!(label.emphasis(), Some("Strasse_2"));
        assert_eq!(label.display_text(), "Grüße Strasse_2!");
    }

    #[test]
    fn empty_text_has_no_segments() {
        let label = Label::new("");
        assert!(label.is_empty());
        assert!(label.segments().is_empty());
    }

    #[test]
    fn identity_is_raw_text() {
        assert_eq!(Label::new("*a*"), Label::new("*a*"));
        assert_ne!(Label::new("*a*"), Label::new("a"));
    }

    #[test]
    fn label_set_from_array() {
        let set = LabelSet::from(["Top", "Bottom"]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).unwrap().raw(), "Bottom");
        assert_eq!(set.to_string(), "Top | Bottom");
    }

    #[test]
    fn fit_to_pads_and_cuts() {
        let padded = LabelSet::from("Top").fit_to(2);
        assert_eq!(padded, LabelSet::from(["Top", ""]));
        let cut = LabelSet::from(["A", "B", "C"]).fit_to(2);
        assert_eq!(cut, LabelSet::from(["A", "B"]));
    }
}

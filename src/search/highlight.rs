use regex::RegexBuilder;

/// A run of text that is either plain or part of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

impl Segment {
    fn new(text: &str, highlighted: bool) -> Self {
        Self {
            text: text.to_string(),
            highlighted,
        }
    }
}

/// Splits `text` into segments, marking every case-insensitive occurrence of
/// `matched`. Concatenating the segments always yields `text` unchanged.
pub fn highlight(text: &str, matched: &str) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }
    let needle = matched.trim();
    let pattern = match RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) if !needle.is_empty() => pattern,
        _ => return vec![Segment::new(text, false)],
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in pattern.find_iter(text) {
        if found.start() > cursor {
            segments.push(Segment::new(&text[cursor..found.start()], false));
        }
        segments.push(Segment::new(found.as_str(), true));
        cursor = found.end();
    }
    if cursor < text.len() {
        segments.push(Segment::new(&text[cursor..], false));
    }
    segments
}

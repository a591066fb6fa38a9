//! Natural ordering for version strings
//!
//! A version is split into alternating runs of ASCII digits and non-digits.
//! Digit runs compare as integers of any length, other runs compare as plain
//! strings, so "9.1" sorts before "10.1" and "18.33.40" before "18.40.34".

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

static SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+|[^0-9]+").expect("segment pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    /// Digit run with leading zeros stripped
    Number(&'a str),
    Text(&'a str),
}

impl<'a> Segment<'a> {
    fn from_run(run: &'a str) -> Self {
        if run.bytes().all(|b| b.is_ascii_digit()) {
            Segment::Number(run.trim_start_matches('0'))
        } else {
            Segment::Text(run)
        }
    }
}

impl Ord for Segment<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // Digits only and no leading zeros: longer means larger
            (Segment::Number(a), Segment::Number(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
            (Segment::Number(_), Segment::Text(_)) => Ordering::Less,
            (Segment::Text(_), Segment::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Segment<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn segments(version: &str) -> impl Iterator<Item = Segment<'_>> {
    SEGMENT_RE
        .find_iter(version)
        .map(|m| Segment::from_run(m.as_str()))
}

/// Compare two version strings in natural order.
///
/// Versions that are equal segment-wise but differ textually (e.g. "1.01"
/// and "1.1") are ordered by plain string comparison, so the result is a
/// total order and `Ordering::Equal` only ever means identical strings.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    segments(a).cmp(segments(b)).then_with(|| a.cmp(b))
}

/// Sort versions in place, lowest first.
pub fn sort_natural(versions: &mut [String]) {
    versions.sort_by(|a, b| natural_cmp(a, b));
}

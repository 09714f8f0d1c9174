//! Dot-delimited paths into the configuration tree.

use std::str::FromStr;

use super::error::PathError;

/// Segment delimiter. There is no escape for a literal dot in a segment.
pub const DELIMITER: char = '.';

/// An ordered, non-empty sequence of path segments.
///
/// Parsed from strings such as `ServiceSettings.SiteURL`. Segments are not
/// otherwise validated: a segment only has meaning once it is matched
/// against a record field or mapping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Split `input` on `.`. An empty input is rejected.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        if input.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self {
            segments: input.split(DELIMITER).map(String::from).collect(),
        })
    }

    /// Build a path from pre-split segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Number of path segments a mapping key spans.
pub(crate) fn segment_count(key: &str) -> usize {
    key.split(DELIMITER).count()
}

/// If `key` is a dot-respecting prefix of `remaining` (rejoined with `.`),
/// return how many segments it consumes.
///
/// Equivalent to checking that the joined remaining path equals `key` or
/// starts with `key` followed by `.`.
pub(crate) fn key_prefix_len(key: &str, remaining: &[String]) -> Option<usize> {
    let mut consumed = 0;
    for part in key.split(DELIMITER) {
        let segment = remaining.get(consumed)?;
        if segment != part {
            return None;
        }
        consumed += 1;
    }
    Some(consumed)
}

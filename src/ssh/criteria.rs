// ABOUTME: Success criteria and output classification.
// ABOUTME: Literal substring and start-anchored regex checks against captured output.

use super::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use std::fmt;
use std::str::FromStr;

/// Marker that tags an encoded criterion string as a regex pattern.
///
/// `"{regex}items=\\d+"` is a pattern with body `items=\d+`. This encoding is
/// stable and shared with config files and the CLI.
pub const REGEX_MARKER: &str = "{regex}";

/// A rule deciding whether captured output indicates success.
#[derive(Debug, Clone)]
pub enum SuccessCriterion {
    /// Output must contain this text.
    Literal(String),
    /// Output must match this pattern from its first character.
    Pattern(Pattern),
}

impl SuccessCriterion {
    /// Literal criterion from any displayable value.
    ///
    /// Numbers compare through their display form, so `literal(14.04)`
    /// matches output containing `14.04`.
    pub fn literal(value: impl fmt::Display) -> Self {
        SuccessCriterion::Literal(value.to_string())
    }

    /// Pattern criterion from a regex body (without the marker).
    pub fn pattern(body: &str) -> Result<Self> {
        Pattern::new(body).map(SuccessCriterion::Pattern)
    }

    /// Decode the marker encoding: text containing [`REGEX_MARKER`] is a
    /// pattern whose body follows the first marker, anything else is literal.
    pub fn parse(encoded: &str) -> Result<Self> {
        match encoded.split(REGEX_MARKER).nth(1) {
            Some(body) => Self::pattern(body),
            None => Ok(Self::literal(encoded)),
        }
    }

    /// Whether `contents` satisfies this criterion.
    pub fn is_satisfied_by(&self, contents: &str) -> bool {
        match self {
            SuccessCriterion::Literal(text) => contents.contains(text.as_str()),
            SuccessCriterion::Pattern(pattern) => pattern.matches(contents),
        }
    }
}

impl FromStr for SuccessCriterion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SuccessCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuccessCriterion::Literal(text) => f.write_str(text),
            SuccessCriterion::Pattern(pattern) => write!(f, "{}{}", REGEX_MARKER, pattern.as_str()),
        }
    }
}

/// Compiled regex anchored at the start of the text, with `.` matching newlines.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self> {
        let regex = RegexBuilder::new(&format!(r"\A(?:{})", source))
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| Error::InvalidPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The regex body as written by the caller.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// `$` also matches just before a single trailing newline.
    pub fn matches(&self, contents: &str) -> bool {
        if self.regex.is_match(contents) {
            return true;
        }
        match contents.strip_suffix('\n') {
            Some(trimmed) => self.regex.is_match(trimmed),
            None => false,
        }
    }
}

/// Return true as soon as any criterion is satisfied by `contents`.
pub fn check_success(contents: &str, criteria: &[SuccessCriterion]) -> bool {
    for criterion in criteria {
        if criterion.is_satisfied_by(contents) {
            tracing::debug!(%criterion, "success response found in output");
            return true;
        }
        tracing::trace!(%criterion, "success response not found in output");
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(encoded: &str) -> SuccessCriterion {
        SuccessCriterion::parse(encoded).unwrap()
    }

    #[test]
    fn pattern_matches_across_text() {
        let criteria = [parsed("{regex}.*items=[1-9][0-9]*.*")];
        assert!(check_success("...items=42 cached=7...", &criteria));
    }

    #[test]
    fn pattern_is_anchored_at_start() {
        let criteria = [parsed("{regex}^items=\\d+$")];
        assert!(!check_success("no match here", &criteria));
        assert!(!check_success("total items=3", &[parsed("{regex}items=\\d+")]));
        assert!(check_success("items=3 total", &[parsed("{regex}items=\\d+")]));
    }

    #[test]
    fn dot_matches_newlines() {
        let criteria = [parsed("{regex}.*done")];
        assert!(check_success("step 1\nstep 2\ndone\n", &criteria));
    }

    #[test]
    fn end_anchor_tolerates_trailing_newline() {
        let criteria = [parsed("{regex}.*Done$")];
        assert!(check_success("step 1\nDone\n", &criteria));
        assert!(check_success("step 1\nDone", &criteria));
        assert!(!check_success("step 1\nDone\n\n", &criteria));
        assert!(!check_success("Done later\n", &criteria));
    }

    #[test]
    fn numeric_literal_uses_display_form() {
        let criteria = [SuccessCriterion::literal(14.04)];
        assert!(check_success("Ubuntu 14.04.5 LTS", &criteria));
        assert!(!check_success("Ubuntu 16.04 LTS", &criteria));
    }

    #[test]
    fn literal_is_substring_check() {
        assert!(check_success("Status: active (running)", &[parsed("active")]));
        assert!(!check_success("Status: inactive", &[parsed("(running)")]));
    }

    #[test]
    fn any_matching_criterion_suffices() {
        let criteria = [parsed("missing"), parsed("{regex}up"), parsed("ok")];
        assert!(check_success("all ok", &criteria));
        assert!(check_success("up since monday", &criteria));
    }

    #[test]
    fn empty_criteria_never_match() {
        assert!(!check_success("anything", &[]));
    }

    #[test]
    fn marker_body_stops_at_second_marker() {
        match parsed("prefix{regex}abc{regex}ignored") {
            SuccessCriterion::Pattern(p) => assert_eq!(p.as_str(), "abc"),
            other => panic!("expected pattern, got {:?}", other),
        }
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = SuccessCriterion::parse("{regex}(unclosed").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }), "got {:?}", err);
    }

    #[test]
    fn display_round_trips_encoding() {
        assert_eq!(parsed("{regex}a+").to_string(), "{regex}a+");
        assert_eq!(parsed("plain").to_string(), "plain");
    }
}

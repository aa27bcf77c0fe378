//! Claim name sanitizing

use regex::Regex;

/// Replaces characters that are invalid in a claim URI with hyphens.
///
/// The pattern is supplied by the URI validator; it must match single
/// characters so that a hyphen never re-matches.
#[derive(Debug, Clone)]
pub struct NameSanitizer {
    invalid_chars: Regex,
}

impl NameSanitizer {
    pub fn new(invalid_uri_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            invalid_chars: Regex::new(invalid_uri_pattern)?,
        })
    }

    /// Replace every invalid character with `-`.
    pub fn sanitize(&self, candidate: &str) -> String {
        self.invalid_chars.replace_all(candidate, "-").into_owned()
    }
}

//! Shared helper for the fixed recognition patterns of this crate.

use regex::Regex;

/// Compile a fixed pattern literal.
#[expect(
    clippy::unwrap_used,
    reason = "patterns are fixed literals exercised by the classifier tests"
)]
pub(crate) fn compile(source: &str) -> Regex {
    Regex::new(source).unwrap()
}

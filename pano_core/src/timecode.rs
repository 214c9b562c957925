//! M:SS timecode text used by the authoring time inputs.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static MSS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):([0-5]\d)$").expect("M:SS pattern compiles"));

/// The text did not parse as M:SS. Callers keep the prior stored value
/// and surface this inline at the editing control.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected a M:SS timestamp, got {0:?}")]
pub struct TimecodeError(pub String);

/// Format seconds in the editor's M:SS display form. Fractional seconds
/// truncate; negative inputs render as 0:00.
pub fn format_mss(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Parse M:SS text into whole seconds.
pub fn parse_mss(text: &str) -> Result<f64, TimecodeError> {
    let trimmed = text.trim();
    let captures = MSS_PATTERN
        .captures(trimmed)
        .ok_or_else(|| TimecodeError(text.to_string()))?;
    let minutes: u64 = captures[1]
        .parse()
        .map_err(|_| TimecodeError(text.to_string()))?;
    let seconds: u64 = captures[2]
        .parse()
        .map_err(|_| TimecodeError(text.to_string()))?;
    Ok((minutes * 60 + seconds) as f64)
}

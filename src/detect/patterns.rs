//! Extraction contracts for the two foreground surfaces.
//!
//! Each pattern documents the line it expects. A miss is reported as
//! [`PatternMiss`] so callers can fall through to their next strategy.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// The expected marker was absent from a tool's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no {pattern} match in output")]
pub struct PatternMiss {
    pub pattern: &'static str,
}

/// `am stack list`: `... topActivity=ComponentInfo{com.example.app/com.example.app.MainActivity}`
static RE_TOP_ACTIVITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"topActivity=ComponentInfo\{([\w.]+)/").unwrap());

/// `dumpsys window windows`: `mFocusedApp=ActivityRecord{9a3c1f u0 com.example.app/.MainActivity t42}`
static RE_FOCUSED_APP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"mFocusedApp=ActivityRecord\{\S+ u\d+ ([\w.]+)/").unwrap());

/// First capture group of `re` in `text`, or a miss named `pattern`.
pub(crate) fn capture<'a>(
    re: &Regex,
    text: &'a str,
    pattern: &'static str,
) -> Result<&'a str, PatternMiss> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(PatternMiss { pattern })
}

/// Package owning the top activity, from `am stack list`.
pub fn top_activity_package(output: &str) -> Result<&str, PatternMiss> {
    capture(&RE_TOP_ACTIVITY, output, "topActivity")
}

/// Package owning window focus, from `dumpsys window windows`.
pub fn focused_app_package(output: &str) -> Result<&str, PatternMiss> {
    capture(&RE_FOCUSED_APP, output, "mFocusedApp")
}

//! Extraction contracts for package-manager and aapt output.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::detect::patterns::{capture, PatternMiss};

/// `pm path <pkg>`: one `package:/data/app/.../base.apk` line per split, base first.
static RE_APK_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^package:(/\S+)").unwrap());

/// `aapt d badging <apk>`: `application: label='Example' icon='res/...'`
static RE_BADGING_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"application: label='([^']+)'").unwrap());

/// On-device path of the base APK, from `pm path`.
pub fn apk_path(output: &str) -> Result<&str, PatternMiss> {
    capture(&RE_APK_PATH, output, "package: path")
}

/// Application label from an aapt badging dump.
pub fn badging_label(output: &str) -> Result<&str, PatternMiss> {
    capture(&RE_BADGING_LABEL, output, "application label")
}

//! Time format token translation
//!
//! Query editors express the timestamp layout with date tokens
//! (`yyyy-MM-dd HH:mm:ss`). The classifier parses with chrono, so the
//! tokens are rewritten into strftime specifiers in a single pass.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// strftime pattern used when the payload does not set a time format
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn token_regex() -> &'static Regex {
    static TOKENS: OnceLock<Regex> = OnceLock::new();
    TOKENS.get_or_init(|| {
        Regex::new(r"yyyy|MM|dd|HH|hh|mm|ss").expect("time format token pattern is valid")
    })
}

/// Translate a token pattern into a strftime pattern.
///
/// | token  | strftime |
/// |--------|----------|
/// | `yyyy` | `%Y`     |
/// | `MM`   | `%m`     |
/// | `dd`   | `%d`     |
/// | `HH`   | `%H`     |
/// | `hh`   | `%I`     |
/// | `mm`   | `%M`     |
/// | `ss`   | `%S`     |
///
/// Anything else passes through unchanged. A pattern that already contains
/// `%` is treated as strftime and returned as-is.
pub fn translate_time_format(pattern: &str) -> String {
    if pattern.contains('%') {
        return pattern.to_string();
    }

    token_regex()
        .replace_all(pattern, |caps: &Captures| {
            match &caps[0] {
                "yyyy" => "%Y",
                "MM" => "%m",
                "dd" => "%d",
                "HH" => "%H",
                "hh" => "%I",
                "mm" => "%M",
                "ss" => "%S",
                other => other,
            }
            .to_string()
        })
        .into_owned()
}

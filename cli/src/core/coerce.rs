//! Coercions from raw environment values to typed settings values.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

/// Boolean coercion used for `CI`.
///
/// Only a value that lowercases to exactly `"true"` is truthy. `"1"`, `"yes"`
/// and `"on"` are all false.
pub fn truthy(raw: &str) -> bool {
    raw.to_lowercase() == "true"
}

/// Parse an integer override, trimming surrounding whitespace.
///
/// Single underscores between digits group them (`5_000`). Values outside
/// `i64` are rejected. `var` is only used to build the error message.
pub fn parse_integer(var: &str, raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if !underscores_between_digits(trimmed) {
        return Err(anyhow!(
            "{var} must be an integer (got '{raw}'): misplaced digit separator"
        ));
    }
    trimmed
        .replace('_', "")
        .parse::<i64>()
        .map_err(|err| anyhow!("{var} must be an integer (got '{raw}'): {err}"))
}

fn underscores_between_digits(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| {
        b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    })
}

/// Make `raw` absolute against `base` without touching the filesystem.
///
/// Absolute inputs are returned unchanged; an empty input resolves to `base`.
pub fn absolutize(base: &Path, raw: &Path) -> PathBuf {
    if raw.is_absolute() {
        return raw.to_path_buf();
    }
    if raw.as_os_str().is_empty() {
        return base.to_path_buf();
    }
    base.join(raw)
}

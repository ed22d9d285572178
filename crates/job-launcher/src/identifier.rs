use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::error::ValidationError;

pub const MAX_DATASET_LEN: usize = 100;

static DATASET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("dataset pattern compiles"));

/// A dataset name proven to match `[A-Za-z0-9_-]{1,100}`.
///
/// The grammar excludes whitespace, quotes, `$`, backticks, `;`, `|`, `&`,
/// newlines and path separators, so the value can be placed into a shell
/// command line as a single token without quoting. Widening the grammar
/// requires re-auditing [`crate::context::inner_command`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafeIdentifier(String);

impl SafeIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SafeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SafeIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Checks a caller-supplied dataset name. Character class is checked before
/// length so oversized input made of allowed characters reports `TooLong`.
pub fn validate(raw: &str) -> Result<SafeIdentifier, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::Empty);
    }
    if !DATASET_PATTERN.is_match(raw) {
        return Err(ValidationError::InvalidCharacters);
    }
    // ASCII only past this point, so bytes == chars.
    if raw.len() > MAX_DATASET_LEN {
        return Err(ValidationError::TooLong {
            len: raw.len(),
            max: MAX_DATASET_LEN,
        });
    }
    Ok(SafeIdentifier(raw.to_string()))
}

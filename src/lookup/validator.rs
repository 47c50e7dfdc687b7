//! ASIN input validation.
//!
//! Runs on every text change, so it must stay cheap and side-effect free.

use serde::Serialize;

/// Maximum length of an Amazon Standard Identification Number.
pub const MAX_ASIN_LEN: usize = 10;

/// Hint shown next to the input while it is invalid.
pub const INVALID_ASIN_HINT: &str = "* Amazon Standard Identification Numbers (ASINs) are unique \
     blocks of 10 letters and/or numbers that identify items.";

/// Verdict for one piece of raw input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    /// The text exactly as entered. Nothing is trimmed here.
    pub text: String,
    pub is_valid: bool,
}

/// Validates raw input text as a (possibly partial) ASIN.
///
/// The empty string is valid: it is the "nothing typed yet" state, not an
/// error. Anything else must be at most [`MAX_ASIN_LEN`] ASCII letters or
/// digits. Whitespace counts as an invalid character, so `" "` is rejected.
pub fn validate(text: &str) -> Validation {
    Validation { text: text.to_string(), is_valid: is_valid_asin(text) }
}

/// Returns whether `text` passes [`validate`].
pub fn is_valid_asin(text: &str) -> bool {
    text.is_empty()
        || (text.len() <= MAX_ASIN_LEN && text.bytes().all(|b| b.is_ascii_alphanumeric()))
}

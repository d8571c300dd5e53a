use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a free-text label for comparison:
/// trim, lowercase, strip accents (NFKD + drop combining marks),
/// collapse whitespace runs to a single space.
pub fn clean_label(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped: String = lowered.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    WHITESPACE_RUN.replace_all(&stripped, " ").into_owned()
}

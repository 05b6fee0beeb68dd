//! Name normalization and Levenshtein distance.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static APOSTROPHE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"['’`´]").expect("valid apostrophe regex"));
static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{M}\p{N}]+").expect("valid separator regex"));

/// Normalizes a restaurant name into its comparison key.
///
/// Rules, applied in order:
/// - lower-case (Unicode aware), then composed to NFC so `e` + U+0300
///   and `è` meet
/// - apostrophes removed, so `McDonald's` and `McDonalds` meet
/// - every other run of characters that are not letters, combining marks
///   or digits becomes one space
/// - leading/trailing spaces trimmed
///
/// Total and idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(name: &str) -> String {
    let lowered: String = name.to_lowercase().nfc().collect();
    let without_apostrophes = APOSTROPHE_RE.replace_all(&lowered, "");
    let separated = SEPARATOR_RE.replace_all(&without_apostrophes, " ");
    separated.trim().to_string()
}

/// Classic edit distance over Unicode scalar values.
///
/// Insertions, deletions and substitutions each cost 1.
pub fn distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0usize; b_chars.len() + 1];

    for (i, a_ch) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let cost = usize::from(a_ch != *b_ch);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

//! URL-safe slug generation

use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap_or_else(|_| unreachable!()));

/// Lowercase `input`, collapse every run of non-alphanumeric ASCII into a
/// single `-` and strip leading/trailing dashes.
///
/// Returns an empty string when nothing slug-worthy remains; callers reject
/// that.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    NON_SLUG_RUN.replace_all(&lowered, "-").trim_matches('-').to_owned()
}

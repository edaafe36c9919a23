use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalizes free text for use as a grouping key.
///
/// Unicode-decomposes (NFKD), drops combining marks (so `"Estándar"` and
/// `"Estandar"` collide), replaces everything that is not a word character,
/// hyphen, or whitespace with a space, collapses whitespace, and lowercases.
///
/// Pure and total: never fails, empty input yields an empty string.
#[must_use]
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

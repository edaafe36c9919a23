//! Lexicon tables consumed by the rewrite-rule pipeline.
//!
//! These are data, not code: extending color or suffix coverage means adding
//! an entry here, not touching the rules. Multi-word colors are matched
//! longest-first by [`crate::rules`], so `"Sky Blue"` wins over `"Blue"`.

/// Color names removed from titles during model-title derivation.
///
/// Mixed Spanish/English because supplier feeds mix both, plus the
/// manufacturer marketing names that show up in phone titles.
pub(crate) const COLORS: &[&str] = &[
    "sky blue",
    "midnight black",
    "phantom black",
    "obsidiana",
    "obsidian",
    "porcelana",
    "porcelain",
    "graphite",
    "grafito",
    "plateado",
    "amarillo",
    "naranja",
    "violeta",
    "lavanda",
    "morado",
    "blanco",
    "negro",
    "verde",
    "crema",
    "plata",
    "azul",
    "gris",
    "rojo",
    "rosa",
    "silver",
    "black",
    "white",
    "green",
    "cream",
    "gold",
    "blue",
    "pink",
    "red",
];

/// Marketing and condition noise words that never belong in a model title.
pub(crate) const FORBIDDEN_WORDS: &[&str] = &[
    "reacondicionado",
    "desbloqueado",
    "precintado",
    "smartphone",
    "seminuevo",
    "original",
    "oferta",
    "outlet",
    "libre",
    "nuevo",
    "usado",
];

/// Known supplier typo / OCR patterns and their fixes.
pub(crate) const TYPO_FIXES: &[(&str, &str)] = &[
    ("galax y", "Galaxy"),
    ("i phone", "iPhone"),
    ("samsumg", "Samsung"),
    ("xiamoi", "Xiaomi"),
];

/// Letter suffixes that suppliers glue onto model numbers (`"S25FE"`).
/// Expanded to a separate token so grouping sees `"S25 FE"`.
pub(crate) const MODEL_SUFFIXES: &[&str] = &["ultra", "plus", "lite", "mini", "pro", "max", "fe"];

/// Standalone numbers treated as residual capacity tokens once the `GB`/`TB`
/// unit has already been stripped.
pub(crate) const BARE_CAPACITIES: &[&str] =
    &["2048", "1024", "512", "256", "128", "64", "32", "16"];

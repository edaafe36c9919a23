//! Ordered rewrite rules applied to raw feed titles.
//!
//! Each rule is a named, independently testable `&str -> String` step; the
//! pipeline order is fixed and load-bearing (colors must be stripped after
//! capacity so `"512Gb Sky Blue"` leaves no partial tokens behind, glued
//! suffixes are expanded only after SKU codes are gone, etc.).

use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon::{
    BARE_CAPACITIES, COLORS, FORBIDDEN_WORDS, MODEL_SUFFIXES, TYPO_FIXES,
};

/// One rewrite step in the model-title pipeline.
pub(crate) struct Rule {
    pub(crate) name: &'static str,
    apply: fn(&str) -> String,
}

impl Rule {
    pub(crate) fn apply(&self, input: &str) -> String {
        (self.apply)(input)
    }
}

/// The fixed derivation pipeline, in application order.
pub(crate) const PIPELINE: &[Rule] = &[
    Rule { name: "strip-parenthesized", apply: strip_parenthesized },
    Rule { name: "strip-capacity", apply: strip_capacity },
    Rule { name: "strip-colors", apply: strip_colors },
    Rule { name: "strip-forbidden", apply: strip_forbidden },
    Rule { name: "fix-typos", apply: fix_typos },
    Rule { name: "normalize-fold-flip", apply: normalize_fold_flip },
    Rule { name: "strip-sku-codes", apply: strip_sku_codes },
    Rule { name: "strip-bare-capacity", apply: strip_bare_capacity },
    Rule { name: "expand-model-suffix", apply: expand_model_suffix },
    Rule { name: "collapse-whitespace", apply: collapse_whitespace },
];

/// Runs the full pipeline over `title`.
pub(crate) fn apply_pipeline(title: &str) -> String {
    PIPELINE
        .iter()
        .fold(title.to_string(), |acc, rule| rule.apply(&acc))
}

static PAREN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));

static CAPACITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d{1,4}\s?(?:gb|tb)\b").expect("valid regex"));

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Longest-first so multi-word names win over their last word
    // ("Sky Blue" before "Blue").
    let mut colors: Vec<&str> = COLORS.to_vec();
    colors.sort_by_key(|c| std::cmp::Reverse(c.len()));
    let alternatives = colors
        .iter()
        .map(|c| regex::escape(c))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternatives})\b")).expect("valid regex")
});

static FORBIDDEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = FORBIDDEN_WORDS
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternatives})\b")).expect("valid regex")
});

static TYPO_RES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    TYPO_FIXES
        .iter()
        .map(|(pattern, replacement)| {
            let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(pattern)))
                .expect("valid regex");
            (re, *replacement)
        })
        .collect()
});

static FLIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bz?\s*flip\s*(\d{1,2})\b").expect("valid regex"));

static FOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bz?\s*fold\s*(\d{1,2})\b").expect("valid regex"));

static SKU_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Manufacturer codes like G975F or SM-S911B: short letter run, 3-4
    // digits, optional letter tail. Model numbers ("S23", "Pixel 8") carry
    // at most two digits and never match.
    Regex::new(r"(?i)\b(?:[a-z]{1,3}-)?[a-z]{1,2}\d{3,4}[a-z]{0,2}\b").expect("valid regex")
});

static BARE_CAPACITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = BARE_CAPACITIES.join("|");
    Regex::new(&format!(r"\b(?:{alternatives})\b")).expect("valid regex")
});

static SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = MODEL_SUFFIXES.join("|");
    Regex::new(&format!(r"(?i)\b([a-z]{{0,4}}\d{{1,3}})({alternatives})\b"))
        .expect("valid regex")
});

fn strip_parenthesized(input: &str) -> String {
    PAREN_RE.replace_all(input, " ").into_owned()
}

fn strip_capacity(input: &str) -> String {
    CAPACITY_RE.replace_all(input, " ").into_owned()
}

fn strip_colors(input: &str) -> String {
    COLOR_RE.replace_all(input, " ").into_owned()
}

fn strip_forbidden(input: &str) -> String {
    FORBIDDEN_RE.replace_all(input, " ").into_owned()
}

fn fix_typos(input: &str) -> String {
    TYPO_RES
        .iter()
        .fold(input.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        })
}

fn normalize_fold_flip(input: &str) -> String {
    let flipped = FLIP_RE.replace_all(input, "Z Flip$1").into_owned();
    FOLD_RE.replace_all(&flipped, "Z Fold$1").into_owned()
}

fn strip_sku_codes(input: &str) -> String {
    SKU_CODE_RE.replace_all(input, " ").into_owned()
}

fn strip_bare_capacity(input: &str) -> String {
    BARE_CAPACITY_RE.replace_all(input, " ").into_owned()
}

fn expand_model_suffix(input: &str) -> String {
    SUFFIX_RE.replace_all(input, "$1 $2").into_owned()
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

use std::str::FromStr;

use rust_decimal::Decimal;

/// Parses a raw feed price string into a positive decimal.
///
/// Handles the formats seen in supplier feeds:
/// - currency suffixes separated by whitespace (`"1.234,56 EUR"`),
/// - comma as the decimal separator (`"569,00"`),
/// - dots as thousands separators (`"1.234,56"` → `1234.56`).
///
/// After stripping everything but digits, dots, and commas, the last comma
/// becomes the decimal dot and any earlier dots are dropped as grouping
/// separators. Non-positive or unparseable values yield `None` — a missing
/// price is a terminal per-item error downstream, never zero.
#[must_use]
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let token = raw.trim().split_whitespace().next()?;

    let cleaned: String = token
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    // Keep only the last dot as the decimal separator.
    let normalized = match cleaned.rfind('.') {
        Some(last) => {
            let mut s = String::with_capacity(cleaned.len());
            for (i, c) in cleaned.char_indices() {
                if c == '.' && i != last {
                    continue;
                }
                s.push(c);
            }
            s
        }
        None => cleaned,
    };

    let value = Decimal::from_str(&normalized).ok()?;
    if value > Decimal::ZERO {
        Some(value)
    } else {
        None
    }
}

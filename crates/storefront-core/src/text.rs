//! Text normalization and number parsing for scraped listing text.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Anything outside word characters, whitespace and `- . , ( ) & + /`.
static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\-.,()&+/]").expect("valid regex"));

static NUMBER_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d[\d.,]*").expect("valid regex"));

/// Collapse internal whitespace and drop characters outside the safe set.
///
/// The safe set is word characters, whitespace and `- . , ( ) & + /`.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text.trim(), " ");
    let cleaned = UNSAFE_CHARS.replace_all(&collapsed, "");
    // Removing a character can leave a double space behind ("S$ 5" -> " 5")
    WHITESPACE
        .replace_all(cleaned.trim(), " ")
        .into_owned()
}

/// Parse the first numeric run in `text`.
///
/// Separators are disambiguated by looking at the digits after the last
/// comma: a single comma followed by one or two digits is a decimal comma
/// (`"12,50"` is 12.5), anything else is a thousands separator
/// (`"1,299"` is 1299). When both commas and dots appear, commas are
/// thousands separators. Several dots with no comma are thousands
/// separators too (`"1.299.000"`).
#[must_use]
pub fn parse_number(text: &str) -> Option<f64> {
    let run = NUMBER_RUN.find(text)?.as_str();
    let run = run.trim_end_matches(['.', ',']);

    let has_comma = run.contains(',');
    let dots = run.matches('.').count();

    let normalized = if has_comma && dots > 0 {
        run.replace(',', "")
    } else if has_comma {
        let commas = run.matches(',').count();
        let tail_len = run.rsplit(',').next().map_or(0, str::len);
        if commas == 1 && tail_len <= 2 {
            run.replace(',', ".")
        } else {
            run.replace(',', "")
        }
    } else if dots > 1 {
        run.replace('.', "")
    } else {
        run.to_string()
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a price, stripping currency symbols and separators.
///
/// Unparsable or empty text yields `0.0`; the result is never negative.
#[must_use]
pub fn parse_price(text: &str) -> f64 {
    parse_number(text).filter(|v| *v >= 0.0).unwrap_or(0.0)
}

/// Title-case a phrase: the first letter after whitespace, `-` or the start
/// is uppercased, every other letter lowercased.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
        at_word_start = ch.is_whitespace() || ch == '-';
    }
    out
}

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

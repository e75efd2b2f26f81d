//! Label keys used to index canonical names and variants.
//!
//! Two labels denote the same entry when their keys are equal: whitespace
//! runs collapse to one space, case is folded, and diacritics are stripped
//! whether they arrive precomposed or as combining marks (`"Cabo  Verde"`,
//! `"cabo verde"` and `"CABO VERDE"` share a key, as do `"Roménia"`,
//! `"Rome\u{301}nia"` and `"Romenia"`).

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Trims the label and collapses internal whitespace runs.
pub fn tidy_label(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lookup key for a label.
pub fn label_key(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for word in value.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        for ch in word.nfd().filter(|ch| !is_combining_mark(*ch)) {
            for lower in ch.to_lowercase() {
                match fold_letter(lower) {
                    Some(base) => out.push_str(base),
                    None => out.push(lower),
                }
            }
        }
    }
    out
}

/// Plain spelling of the letters and signs that have no canonical
/// decomposition: ordinal indicators, the degree sign, `ø` and ligatures.
pub fn fold_letter(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'ª' => "a",
        'º' | '°' | 'ø' => "o",
        'æ' => "ae",
        'œ' => "oe",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}

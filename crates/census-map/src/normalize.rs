//! Label clean-up applied before any matching.

use std::borrow::Cow;
use std::sync::LazyLock;

use census_model::{label_key, tidy_label};
use regex::Regex;

/// UTF-8 text that was decoded once as Latin-1/CP1252 and re-encoded.
/// Longer sequences come first so `Ã` alone is only repaired last.
const MOJIBAKE: &[(&str, &str)] = &[
    ("â€“", "–"),
    ("â€”", "—"),
    ("â€™", "’"),
    ("â€œ", "“"),
    ("â€\u{9d}", "”"),
    ("Ã§", "ç"),
    ("Ã£", "ã"),
    ("Ãµ", "õ"),
    ("Ã©", "é"),
    ("Ã¡", "á"),
    ("Ã³", "ó"),
    ("Ãº", "ú"),
    ("Ã\u{ad}", "í"),
    ("Ãª", "ê"),
    ("Ã´", "ô"),
    ("Ã¢", "â"),
    ("Ã¨", "è"),
    ("Ã¼", "ü"),
    ("Ã±", "ñ"),
    ("Ã\u{a0}", "à"),
    ("Ã‡", "Ç"),
    ("Ã‰", "É"),
    ("Ã“", "Ó"),
    ("Ãš", "Ú"),
    ("Ãƒ", "Ã"),
    ("Ã•", "Õ"),
    ("ÃŠ", "Ê"),
    ("Ã‚", "Â"),
    ("Ã”", "Ô"),
    ("Ã€", "À"),
    ("Ã\u{81}", "Á"),
    ("Ã\u{8d}", "Í"),
    ("Âº", "º"),
    ("Âª", "ª"),
    ("Â°", "°"),
    ("Â\u{a0}", " "),
];

/// Trailing footnote references: `(1)`, `1)`, `*`, `(a)`, superscript digits.
static FOOTNOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\s*(\(\w{1,2}\)|\d\)|\*+|[¹²³⁴⁵⁶⁷⁸⁹⁰]+))+$").expect("Invalid footnote regex")
});

/// Repairs double-encoded text with a fixed substitution table.
pub fn repair_mojibake(text: &str) -> Cow<'_, str> {
    if !text.contains(['Ã', 'Â', 'â']) {
        return Cow::Borrowed(text);
    }
    let mut repaired = text.to_string();
    for (broken, fixed) in MOJIBAKE {
        if repaired.contains(broken) {
            repaired = repaired.replace(broken, fixed);
        }
    }
    Cow::Owned(repaired)
}

/// Removes footnote references at the end of a label.
pub fn strip_footnotes(text: &str) -> &str {
    match FOOTNOTE.find(text) {
        Some(found) if found.start() > 0 => text[..found.start()].trim_end(),
        Some(_) => "",
        None => text,
    }
}

/// Display form of a raw label: mojibake repaired, footnotes removed,
/// whitespace collapsed, surrounding quotes dropped.
pub fn clean_label(raw: &str) -> String {
    let repaired = repair_mojibake(raw);
    let unquoted = strip_footnotes(repaired.trim())
        .trim_matches(|ch| matches!(ch, '"' | '\'' | '“' | '”'));
    tidy_label(unquoted)
}

/// Matching key of a raw label (see [`census_model::label_key`]).
pub fn normalize_label(raw: &str) -> String {
    label_key(&clean_label(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repairs_double_encoded_portuguese() {
        assert_eq!(repair_mojibake("RomÃ©nia"), "Roménia");
        assert_eq!(repair_mojibake("SÃ£o TomÃ© e PrÃ\u{ad}ncipe"), "São Tomé e Príncipe");
        assert_eq!(repair_mojibake("FranÃ§a"), "França");
        assert_eq!(repair_mojibake("BÃ¡sico 3Âº ciclo"), "Básico 3º ciclo");
        assert!(matches!(repair_mojibake("Brasil"), Cow::Borrowed(_)));
    }

    #[test]
    fn footnotes_are_stripped() {
        assert_eq!(strip_footnotes("Brasil (1)"), "Brasil");
        assert_eq!(strip_footnotes("Angola*"), "Angola");
        assert_eq!(strip_footnotes("Ucrânia²"), "Ucrânia");
        assert_eq!(strip_footnotes("(1)"), "");
        assert_eq!(strip_footnotes("Artigo 87 A"), "Artigo 87 A");
    }

    #[test]
    fn clean_and_normalize() {
        assert_eq!(clean_label("  \"Cabo   Verde\" (2) "), "Cabo Verde");
        assert_eq!(normalize_label("CABO  VERDE"), "cabo verde");
        assert_eq!(normalize_label("SÃ£o TomÃ© e PrÃ\u{ad}ncipe"), "sao tome e principe");
    }
}

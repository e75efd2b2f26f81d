//! Recognition of rows that are not entities: header echoes, totals,
//! footers, footnote markers and garbage tokens.

use std::fmt;

use census_model::EntityType;

/// Labels (folded) that repeat a column header of any layout.
const HEADER_WORDS: &[&str] = &[
    "ano",
    "anos",
    "designacao",
    "hm",
    "subtotal",
    "valor",
];

/// Header echoes of the column holding `entity`. Kept per entity type
/// because some are real entries elsewhere (`continente` is a region).
fn entity_header_words(entity: EntityType) -> &'static [&'static str] {
    match entity {
        EntityType::Nationality => &[
            "continente",
            "nacionalidade",
            "nacionalidades",
            "pais",
            "pais de nacionalidade",
            "paises",
        ],
        EntityType::EducationLevel => &["nivel de ensino", "nivel de escolaridade"],
        EntityType::Sector => &["cae", "sector", "setor"],
        EntityType::Occupation => &["profissao", "profissoes"],
        EntityType::EconomicCondition => &["condicao", "condicao perante o trabalho"],
        EntityType::Motive => &["motivo", "motivos"],
        EntityType::Region => &["nuts ii", "regiao", "zona geografica"],
        EntityType::Sex => &["sexo"],
        EntityType::AgeGroup => &["grupo etario", "grupos etarios", "idade"],
        EntityType::ProfessionalSituation => &["situacao na profissao", "situacao profissional"],
    }
}

/// Labels (folded) starting with one of these words are totals or footer
/// lines.
const FOOTER_PREFIXES: &[&str] = &[
    "total",
    "totais",
    "fonte",
    "fontes",
    "nota",
    "notas",
    "legenda",
    "unidade",
    "sinais convencionais",
    "quadro",
    "obs",
    "dados provisorios",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    Empty,
    TooShort,
    NoLetters,
    HeaderWord,
    Footer,
}

impl ExclusionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExclusionReason::Empty => "empty",
            ExclusionReason::TooShort => "too_short",
            ExclusionReason::NoLetters => "no_letters",
            ExclusionReason::HeaderWord => "header_word",
            ExclusionReason::Footer => "footer",
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn starts_with_word(key: &str, prefix: &str) -> bool {
    key.strip_prefix(prefix).is_some_and(|rest| {
        rest.is_empty() || rest.starts_with(|ch: char| !ch.is_alphanumeric())
    })
}

/// Returns why `key` (a folded label) is not an entity, if it is not one.
///
/// Single letters are accepted for sectors (CAE section codes) and sexes
/// (`H`/`M`); age groups may be digits only (`15-64`).
pub fn exclusion_reason(key: &str, entity: EntityType) -> Option<ExclusionReason> {
    if key.is_empty() {
        return Some(ExclusionReason::Empty);
    }
    let meaningful = if entity == EntityType::AgeGroup {
        key.chars().any(char::is_alphanumeric)
    } else {
        key.chars().any(char::is_alphabetic)
    };
    if !meaningful {
        return Some(ExclusionReason::NoLetters);
    }
    let single_letter_code =
        matches!(entity, EntityType::Sector | EntityType::Sex) && key.len() == 1;
    if key.chars().count() < 2 && !single_letter_code {
        return Some(ExclusionReason::TooShort);
    }
    if HEADER_WORDS.contains(&key) || entity_header_words(entity).contains(&key) {
        return Some(ExclusionReason::HeaderWord);
    }
    if FOOTER_PREFIXES
        .iter()
        .any(|prefix| starts_with_word(key, prefix))
    {
        return Some(ExclusionReason::Footer);
    }
    None
}

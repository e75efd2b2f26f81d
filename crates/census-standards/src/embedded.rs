//! Reference tables embedded at compile time.

pub const EDUCATION_LEVELS: &str = include_str!("../data/education.csv");
pub const SECTORS: &str = include_str!("../data/sectors.csv");
pub const OCCUPATIONS: &str = include_str!("../data/occupations.csv");
pub const ECONOMIC_CONDITIONS: &str = include_str!("../data/conditions.csv");
pub const MOTIVES: &str = include_str!("../data/motives.csv");
pub const SEXES: &str = include_str!("../data/sexes.csv");
pub const REGIONS: &str = include_str!("../data/regions.csv");
pub const NATIONALITIES: &str = include_str!("../data/nationalities.csv");
pub const AGE_GROUPS: &str = include_str!("../data/age_groups.csv");
pub const PROFESSIONAL_SITUATIONS: &str = include_str!("../data/situations.csv");

/// `entidade,variante,nome` rows: known alternative spellings.
pub const VARIANTS: &str = include_str!("../data/variants.csv");

/// `entidade,padrao,nome` rows, evaluated in file order per entity.
pub const RULES: &str = include_str!("../data/rules.csv");

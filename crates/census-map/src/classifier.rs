//! Ordered `(pattern, canonical name)` classification, first match wins.

use std::collections::BTreeMap;

use census_model::EntityType;
use census_standards::Catalog;
use regex::Regex;

use crate::error::{MapError, Result};

#[derive(Debug, Clone)]
struct Rule {
    pattern: Regex,
    canonical: String,
}

/// Classifies folded labels into canonical names.
///
/// Rules are evaluated in insertion order per entity type; list the most
/// specific patterns first.
#[derive(Debug, Clone, Default)]
pub struct PatternClassifier {
    rules: BTreeMap<EntityType, Vec<Rule>>,
}

impl PatternClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles every rule of the catalog.
    pub fn from_catalog(catalog: &Catalog) -> Result<Self> {
        let mut classifier = Self::new();
        for entity in EntityType::ALL {
            for rule in catalog.rules(entity) {
                classifier.push(entity, &rule.pattern, &rule.canonical)?;
            }
        }
        Ok(classifier)
    }

    /// Appends a rule after the existing rules for `entity`.
    pub fn push(&mut self, entity: EntityType, pattern: &str, canonical: &str) -> Result<()> {
        let compiled = Regex::new(pattern).map_err(|source| MapError::InvalidPattern {
            entity,
            pattern: pattern.to_string(),
            source,
        })?;
        self.rules.entry(entity).or_default().push(Rule {
            pattern: compiled,
            canonical: canonical.to_string(),
        });
        Ok(())
    }

    pub fn len(&self, entity: EntityType) -> usize {
        self.rules.get(&entity).map_or(0, Vec::len)
    }

    /// Canonical name of the first rule matching `key`.
    pub fn classify(&self, entity: EntityType, key: &str) -> Option<&str> {
        self.rules
            .get(&entity)?
            .iter()
            .find(|rule| rule.pattern.is_match(key))
            .map(|rule| rule.canonical.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin() -> PatternClassifier {
        PatternClassifier::from_catalog(&Catalog::builtin().unwrap()).unwrap()
    }

    #[test]
    fn first_match_wins() {
        let mut classifier = PatternClassifier::new();
        classifier.push(EntityType::Motive, "familiar", "Família").unwrap();
        classifier.push(EntityType::Motive, "outro", "Outros").unwrap();
        assert_eq!(
            classifier.classify(EntityType::Motive, "outro motivo familiar"),
            Some("Família")
        );
        assert_eq!(classifier.classify(EntityType::Sector, "outro"), None);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let mut classifier = PatternClassifier::new();
        let err = classifier.push(EntityType::Motive, "(", "Outros").unwrap_err();
        assert!(matches!(err, MapError::InvalidPattern { .. }));
    }

    #[test]
    fn motive_rules() {
        let classifier = builtin();
        let motive = |key| classifier.classify(EntityType::Motive, key);
        assert_eq!(motive("artigo 89"), Some("Reagrupamento Familiar"));
        assert_eq!(motive("reagrupamento familiar (%)"), Some("Reagrupamento Familiar"));
        assert_eq!(motive("artigo 87a"), Some("Autorização de Residência CPLP"));
        assert_eq!(motive("artigo 87.o-a"), Some("Autorização de Residência CPLP"));
        assert_eq!(motive("ar cplp"), Some("Autorização de Residência CPLP"));
        assert_eq!(motive("estudo"), Some("Estudo"));
        assert_eq!(motive("trabalho por conta de outrem"), Some("Atividade Profissional"));
        assert_eq!(motive("crs"), Some("Outros"));
        assert_eq!(motive("outros motivos"), Some("Outros"));
        assert_eq!(motive("desconhecido"), None);
    }

    #[test]
    fn education_rules_respect_specificity() {
        let classifier = builtin();
        let level = |key| classifier.classify(EntityType::EducationLevel, key);
        assert_eq!(level("ensino superior"), Some("Superior"));
        assert_eq!(level("pos-secundario nao superior"), Some("Secundário e pós-secundário"));
        assert_eq!(level("inferior ao basico 3.o ciclo"), Some("Inferior ao básico 3º ciclo"));
        assert_eq!(level("basico 3.o ciclo"), Some("Básico 3º ciclo"));
        assert_eq!(level("basico - 1.o ciclo"), Some("Inferior ao básico 3º ciclo"));
        assert_eq!(level("nenhum nivel de ensino"), Some("Inferior ao básico 3º ciclo"));
    }

    #[test]
    fn sector_codes_and_keywords() {
        let classifier = builtin();
        let sector = |key| classifier.classify(EntityType::Sector, key);
        assert_eq!(sector("f"), Some("Construção"));
        assert_eq!(sector("f - construcao"), Some("Construção"));
        assert_eq!(sector("comercio por grosso"), Some(
            "Comércio por grosso e a retalho; reparação de veículos automóveis e motociclos"
        ));
        assert_eq!(sector("setor terciario"), Some("Terciário"));
    }

    #[test]
    fn condition_rules() {
        let classifier = builtin();
        let condition = |key| classifier.classify(EntityType::EconomicCondition, key);
        assert_eq!(condition("desempregados"), Some("Desempregada"));
        assert_eq!(condition("empregados"), Some("Empregada"));
        assert_eq!(condition("inativos"), Some("Outros inativos"));
        assert_eq!(condition("populacao ativa"), Some("População ativa"));
    }

    #[test]
    fn age_group_and_situation_rules() {
        let classifier = builtin();
        let age = |key| classifier.classify(EntityType::AgeGroup, key);
        assert_eq!(age("15 - 64 anos"), Some("15-64 anos"));
        assert_eq!(age("0 a 14 anos"), Some("0-14 anos"));
        assert_eq!(age("65 ou mais anos"), Some("65+ anos"));
        assert_eq!(age("25-34 anos"), None);

        let situation = |key| classifier.classify(EntityType::ProfessionalSituation, key);
        assert_eq!(
            situation("trabalhador por conta propria como empregador"),
            Some("Patrão")
        );
        assert_eq!(
            situation("trabalhador por conta propria como isolado"),
            Some("Trabalhador por conta própria")
        );
        assert_eq!(
            situation("trabalhador por conta de outrem"),
            Some("Trabalhador por conta de outrem")
        );
        assert_eq!(
            situation("trabalhador familiar nao remunerado"),
            Some("Trabalhador familiar não remunerado")
        );
        assert_eq!(situation("outra situacao"), Some("Outra situação"));
    }
}

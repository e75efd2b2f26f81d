use census_model::{
    ColumnRole, EntityType, FactColumn, FactTable, RuleKind, Severity, ValidationOptions, Value,
};
use census_standards::Catalog;
use census_validate::{ExportGate, ValidationInput, gate_export, relationships_of, validate};

fn population_table(nationalities: &[i64], percents: &[f64]) -> FactTable {
    let mut table = FactTable::new(
        "Fact_PopulacaoPorNacionalidade",
        vec![
            FactColumn::new("populacao_nacionalidade_id", ColumnRole::PrimaryKey),
            FactColumn::foreign_key(EntityType::Nationality),
            FactColumn::new("populacao_total", ColumnRole::Count),
            FactColumn::new("percentagem_total", ColumnRole::Percent),
        ],
    );
    for (idx, (nationality, percent)) in nationalities.iter().zip(percents).enumerate() {
        table
            .push_row(vec![
                Value::Int(idx as i64 + 1),
                Value::Int(*nationality),
                Value::Float(10.0),
                Value::Float(*percent),
            ])
            .unwrap();
    }
    table
}

#[test]
fn unknown_foreign_key_is_one_fatal_violation() {
    let registry = Catalog::builtin().unwrap().seeded_registry().unwrap();
    let facts = vec![population_table(&[3, 999, 4], &[33.33, 33.33, 33.34])];
    let relationships = relationships_of(&facts);
    let input = ValidationInput {
        registry: &registry,
        facts: &facts,
        mappings: None,
        relationships: &relationships,
    };
    let report = validate("censos_2021", &input, &ValidationOptions::default()).unwrap();

    let orphans: Vec<_> = report.of_rule(RuleKind::OrphanForeignKey).collect();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].severity, Severity::Fatal);
    assert_eq!(orphans[0].column.as_deref(), Some("nacionalidade_id"));
    assert_eq!(orphans[0].count, 1);
    assert_eq!(report.fatal_count(), 1);

    insta::assert_json_snapshot!(report, @r#"
    {
      "scope": "censos_2021",
      "violations": [
        {
          "rule": "orphan_foreign_key",
          "severity": "fatal",
          "table": "Fact_PopulacaoPorNacionalidade",
          "column": "nacionalidade_id",
          "count": 1,
          "message": "1 value(s) of Fact_PopulacaoPorNacionalidade.nacionalidade_id missing from Dim_Nacionalidade.nacionalidade_id",
          "examples": [
            "999"
          ]
        }
      ]
    }
    "#);

    assert_eq!(gate_export(&report, false), ExportGate::Blocked { fatal: 1 });
    assert_eq!(gate_export(&report, true), ExportGate::Forced { fatal: 1 });
    assert!(gate_export(&report, true).allows_export());
}

#[test]
fn out_of_range_percent_is_a_warning_unless_configured_fatal() {
    let registry = Catalog::builtin().unwrap().seeded_registry().unwrap();
    let facts = vec![population_table(&[3, 4], &[120.0, -20.0])];
    let relationships = relationships_of(&facts);
    let input = ValidationInput {
        registry: &registry,
        facts: &facts,
        mappings: None,
        relationships: &relationships,
    };

    let report = validate("censos_2021", &input, &ValidationOptions::default()).unwrap();
    let range: Vec<_> = report.of_rule(RuleKind::Range).collect();
    assert_eq!(range.len(), 1);
    assert_eq!(range[0].count, 2);
    assert_eq!(range[0].severity, Severity::Warning);
    assert!(!report.has_fatal());
    assert_eq!(gate_export(&report, false), ExportGate::Clear);

    let options = ValidationOptions {
        range_fatal: true,
        ..ValidationOptions::default()
    };
    let report = validate("censos_2021", &input, &options).unwrap();
    assert_eq!(report.fatal_count(), 1);
}

#[test]
fn duplicate_keys_and_empty_tables() {
    let registry = Catalog::builtin().unwrap().seeded_registry().unwrap();
    let mut duplicated = population_table(&[3, 4], &[50.0, 50.0]);
    duplicated.rows[1][0] = Value::Int(1);
    let empty = FactTable::new(
        "Fact_ConcessoesMotivo",
        vec![
            FactColumn::new("concessoes_motivo_id", ColumnRole::PrimaryKey),
            FactColumn::new("concessoes", ColumnRole::Count),
        ],
    );
    let facts = vec![duplicated, empty];
    let relationships = relationships_of(&facts);
    let input = ValidationInput {
        registry: &registry,
        facts: &facts,
        mappings: None,
        relationships: &relationships,
    };
    let report = validate("consolidated", &input, &ValidationOptions::default()).unwrap();

    let duplicates: Vec<_> = report.of_rule(RuleKind::Uniqueness).collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].count, 1);
    assert_eq!(duplicates[0].severity, Severity::Fatal);

    let empty: Vec<_> = report.of_rule(RuleKind::EmptyTable).collect();
    assert_eq!(empty.len(), 1);
    assert_eq!(empty[0].table, "Fact_ConcessoesMotivo");
}

#[test]
fn sparse_required_column_is_incomplete() {
    let registry = Catalog::builtin().unwrap().seeded_registry().unwrap();
    let mut table = population_table(&[3, 4, 5, 6], &[25.0; 4]);
    table.rows[0][2] = Value::Null;
    let facts = vec![table];
    let input = ValidationInput {
        registry: &registry,
        facts: &facts,
        mappings: None,
        relationships: &[],
    };
    let report = validate("censos_2021", &input, &ValidationOptions::default()).unwrap();
    let incomplete: Vec<_> = report.of_rule(RuleKind::Completeness).collect();
    assert_eq!(incomplete.len(), 1);
    assert_eq!(incomplete[0].column.as_deref(), Some("populacao_total"));
    assert_eq!(incomplete[0].count, 1);
    assert_eq!(incomplete[0].severity, Severity::Warning);
}

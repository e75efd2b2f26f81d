//! Fact table definitions.

use census_model::{ColumnRole, EntityType, FactColumn, FactTable, SOURCE_COLUMN, YEAR_COLUMN};

/// Shape of a fact table built from one measure and its percentage of
/// group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactSpec {
    pub name: &'static str,
    pub primary_key: &'static str,
    /// Foreign keys, in column order.
    pub keys: &'static [EntityType],
    pub measure: &'static str,
    pub percent: &'static str,
    /// Positions in `keys` forming the percentage group; empty means the
    /// whole source.
    pub group: &'static [usize],
    /// Position in `keys` completed with every non-aggregate entry when
    /// zero rows are kept.
    pub coverage: Option<usize>,
}

impl FactSpec {
    pub fn columns(&self) -> Vec<FactColumn> {
        let mut columns = vec![FactColumn::new(self.primary_key, ColumnRole::PrimaryKey)];
        columns.extend(self.keys.iter().map(|entity| FactColumn::foreign_key(*entity)));
        columns.push(FactColumn::new(self.measure, ColumnRole::Count));
        columns.push(FactColumn::new(self.percent, ColumnRole::Percent));
        columns.extend(provenance_columns());
        columns
    }

    pub fn empty_table(&self) -> FactTable {
        FactTable::new(self.name, self.columns())
    }
}

pub(crate) fn provenance_columns() -> [FactColumn; 2] {
    [
        FactColumn::new(YEAR_COLUMN, ColumnRole::Year),
        FactColumn::new(SOURCE_COLUMN, ColumnRole::Source),
    ]
}

pub const POPULATION_BY_NATIONALITY: FactSpec = FactSpec {
    name: "Fact_PopulacaoPorNacionalidade",
    primary_key: "populacao_nacionalidade_id",
    keys: &[EntityType::Nationality],
    measure: "populacao_total",
    percent: "percentagem_total",
    group: &[],
    coverage: None,
};

pub const POPULATION_BY_SEX: FactSpec = FactSpec {
    name: "Fact_PopulacaoPorNacionalidadeSexo",
    primary_key: "populacao_sexo_id",
    keys: &[EntityType::Nationality, EntityType::Sex],
    measure: "populacao",
    percent: "percentagem_sexo",
    group: &[0],
    coverage: None,
};

pub const PERMITS_BY_SEX: FactSpec = FactSpec {
    name: "Fact_ConcessoesPorNacionalidadeSexo",
    primary_key: "concessoes_sexo_id",
    keys: &[EntityType::Nationality, EntityType::Sex],
    measure: "concessoes",
    percent: "percentual_sexo",
    group: &[0],
    coverage: None,
};

pub const EDUCATION: FactSpec = FactSpec {
    name: "Fact_PopulacaoEducacao",
    primary_key: "populacao_educacao_id",
    keys: &[
        EntityType::Nationality,
        EntityType::EducationLevel,
        EntityType::AgeGroup,
    ],
    measure: "populacao_total",
    percent: "percentual_nivel",
    group: &[0, 2],
    coverage: None,
};

pub const EMPLOYMENT_BY_SECTOR: FactSpec = FactSpec {
    name: "Fact_EmpregadosPorSetor",
    primary_key: "empregados_setor_id",
    keys: &[EntityType::Nationality, EntityType::Sector],
    measure: "empregados",
    percent: "percentual_da_nacionalidade",
    group: &[0],
    coverage: Some(1),
};

pub const EMPLOYMENT_BY_SITUATION: FactSpec = FactSpec {
    name: "Fact_EmpregadosPorSituacao",
    primary_key: "empregados_situacao_id",
    keys: &[EntityType::Nationality, EntityType::ProfessionalSituation],
    measure: "empregados",
    percent: "percentual_situacao",
    group: &[0],
    coverage: Some(1),
};

pub const POPULATION_BY_CONDITION: FactSpec = FactSpec {
    name: "Fact_PopulacaoPorCondicao",
    primary_key: "populacao_condicao_id",
    keys: &[EntityType::Nationality, EntityType::EconomicCondition],
    measure: "populacao",
    percent: "percentual_condicao",
    group: &[0],
    coverage: None,
};

pub const OCCUPATION_BY_SEX: FactSpec = FactSpec {
    name: "Fact_EmpregadosProfissaoSexo",
    primary_key: "empregados_profissao_id",
    keys: &[EntityType::Nationality, EntityType::Occupation, EntityType::Sex],
    measure: "empregados",
    percent: "percentual_sexo",
    group: &[0, 1],
    coverage: None,
};

pub const PERMITS_BY_MOTIVE: FactSpec = FactSpec {
    name: "Fact_ConcessoesMotivo",
    primary_key: "concessoes_motivo_id",
    keys: &[EntityType::Nationality, EntityType::Motive],
    measure: "concessoes",
    percent: "percentual_ano",
    group: &[],
    coverage: None,
};

pub const POPULATION_BY_REGION: FactSpec = FactSpec {
    name: "Fact_PopulacaoPorRegiao",
    primary_key: "populacao_regiao_id",
    keys: &[EntityType::Region, EntityType::Nationality],
    measure: "populacao",
    percent: "percentual_regiao",
    group: &[0],
    coverage: None,
};

/// Per-nationality education summary derived from [`EDUCATION`].
pub const EDUCATION_STATISTICS: &str = "Fact_EstatisticasEducacao";

pub(crate) fn education_statistics_columns() -> Vec<FactColumn> {
    let mut columns = vec![
        FactColumn::new("estatisticas_educacao_id", ColumnRole::PrimaryKey),
        FactColumn::foreign_key(EntityType::Nationality),
        FactColumn::foreign_key(EntityType::AgeGroup),
        FactColumn::new("populacao_total_educacao", ColumnRole::Count),
        FactColumn::new("percentual_ensino_superior", ColumnRole::Percent),
        FactColumn::new("indice_educacional", ColumnRole::Index),
    ];
    columns.extend(provenance_columns());
    columns
}

/// Every single-measure fact definition.
pub const FACT_SPECS: [FactSpec; 10] = [
    POPULATION_BY_NATIONALITY,
    POPULATION_BY_SEX,
    PERMITS_BY_SEX,
    EDUCATION,
    EMPLOYMENT_BY_SECTOR,
    EMPLOYMENT_BY_SITUATION,
    POPULATION_BY_CONDITION,
    OCCUPATION_BY_SEX,
    PERMITS_BY_MOTIVE,
    POPULATION_BY_REGION,
];

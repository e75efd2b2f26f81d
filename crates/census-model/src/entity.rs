//! Entity types backing the dimension tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Kind of canonical entity a dimension table holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Nationality,
    EducationLevel,
    Sector,
    Occupation,
    EconomicCondition,
    Motive,
    Region,
    Sex,
    AgeGroup,
    ProfessionalSituation,
}

impl EntityType {
    pub const ALL: [EntityType; 10] = [
        EntityType::Nationality,
        EntityType::EducationLevel,
        EntityType::Sector,
        EntityType::Occupation,
        EntityType::EconomicCondition,
        EntityType::Motive,
        EntityType::Region,
        EntityType::Sex,
        EntityType::AgeGroup,
        EntityType::ProfessionalSituation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Nationality => "nationality",
            EntityType::EducationLevel => "education_level",
            EntityType::Sector => "sector",
            EntityType::Occupation => "occupation",
            EntityType::EconomicCondition => "economic_condition",
            EntityType::Motive => "motive",
            EntityType::Region => "region",
            EntityType::Sex => "sex",
            EntityType::AgeGroup => "age_group",
            EntityType::ProfessionalSituation => "professional_situation",
        }
    }

    /// Exported table name, without the run prefix.
    pub fn table_name(self) -> &'static str {
        match self {
            EntityType::Nationality => "Dim_Nacionalidade",
            EntityType::EducationLevel => "Dim_NivelEducacao",
            EntityType::Sector => "Dim_SetorEconomico",
            EntityType::Occupation => "Dim_Profissao",
            EntityType::EconomicCondition => "Dim_CondicaoEconomica",
            EntityType::Motive => "Dim_Motivo",
            EntityType::Region => "Dim_Regiao",
            EntityType::Sex => "Dim_Sexo",
            EntityType::AgeGroup => "Dim_GrupoEtario",
            EntityType::ProfessionalSituation => "Dim_SituacaoProfissional",
        }
    }

    /// Surrogate key column, shared by the dimension and every fact FK.
    pub fn key_column(self) -> &'static str {
        match self {
            EntityType::Nationality => "nacionalidade_id",
            EntityType::EducationLevel => "nivel_educacao_id",
            EntityType::Sector => "setor_id",
            EntityType::Occupation => "profissao_id",
            EntityType::EconomicCondition => "condicao_id",
            EntityType::Motive => "motivo_id",
            EntityType::Region => "regiao_id",
            EntityType::Sex => "sexo_id",
            EntityType::AgeGroup => "grupo_etario_id",
            EntityType::ProfessionalSituation => "situacao_id",
        }
    }

    pub fn name_column(self) -> &'static str {
        match self {
            EntityType::Nationality => "nome_nacionalidade",
            EntityType::EducationLevel => "nome_nivel",
            EntityType::Sector => "descricao",
            EntityType::Occupation => "nome_profissao",
            EntityType::EconomicCondition => "nome_condicao",
            EntityType::Motive => "nome_motivo",
            EntityType::Region => "nome_regiao",
            EntityType::Sex => "nome_sexo",
            EntityType::AgeGroup => "faixa_etaria",
            EntityType::ProfessionalSituation => "nome_situacao",
        }
    }

    /// Free-form attribute columns exported after the name column.
    pub fn attribute_columns(self) -> &'static [&'static str] {
        match self {
            EntityType::Nationality => &["codigo_iso", "continente"],
            EntityType::EducationLevel => &["categoria"],
            EntityType::Sector => &["codigo_cae", "grupo"],
            EntityType::Occupation => &["codigo_cnp"],
            EntityType::EconomicCondition => &["grupo"],
            EntityType::Motive => &["codigo", "categoria"],
            EntityType::Region => &["nivel_nuts"],
            EntityType::AgeGroup => &["descricao"],
            EntityType::Sex | EntityType::ProfessionalSituation => &[],
        }
    }

    /// Dimensions ordered by rank export an `ordem` column.
    pub fn is_ranked(self) -> bool {
        matches!(self, EntityType::EducationLevel)
    }

    /// Dimensions with roll-up entries export an `agregado` column.
    pub fn has_aggregates(self) -> bool {
        matches!(self, EntityType::Nationality | EntityType::Sector)
    }

    /// Whether unmatched labels create new entries when the configuration is silent.
    pub fn auto_create_default(self) -> bool {
        matches!(
            self,
            EntityType::Nationality | EntityType::Region | EntityType::AgeGroup
        )
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        EntityType::ALL
            .into_iter()
            .find(|entity| entity.as_str() == wanted)
            .ok_or_else(|| ModelError::UnknownEntityType(value.to_string()))
    }
}

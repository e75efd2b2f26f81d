use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Stable integer identifier of a dimension entry; starts at 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SurrogateKey(u32);

impl SurrogateKey {
    pub const FIRST: SurrogateKey = SurrogateKey(1);

    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<SurrogateKey> for i64 {
    fn from(key: SurrogateKey) -> Self {
        i64::from(key.0)
    }
}

impl TryFrom<i64> for SurrogateKey {
    type Error = ModelError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(SurrogateKey::new)
            .ok_or(ModelError::InvalidKey(value))
    }
}

impl fmt::Display for SurrogateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a source dataset (e.g. `censos_2011_educacao`).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.contains([',', ';', '\n']) {
            return Err(ModelError::InvalidDatasetId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surrogate_key_rejects_zero_and_negative() {
        assert!(SurrogateKey::new(0).is_none());
        assert!(SurrogateKey::try_from(-3).is_err());
        assert_eq!(SurrogateKey::try_from(7).unwrap().get(), 7);
        assert_eq!(SurrogateKey::FIRST.next().get(), 2);
    }

    #[test]
    fn dataset_id_trims_and_validates() {
        assert_eq!(DatasetId::new(" rifa_2020 ").unwrap().as_str(), "rifa_2020");
        assert!(DatasetId::new("   ").is_err());
        assert!(DatasetId::new("a;b").is_err());
    }
}

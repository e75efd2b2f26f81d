//! Loading of the TOML run configuration and CLI overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use census_model::EtlConfig;
use tracing::debug;

/// Values given on the command line; they win over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub prefix: Option<String>,
    pub include_zero_rows: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut EtlConfig) {
        if let Some(dir) = &self.input_dir {
            config.input_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        if self.include_zero_rows {
            config.assembly.include_zero_rows = true;
        }
    }
}

/// Parses `path`; relative directories in the file are taken from the
/// file's own directory, and a missing `input_dir` defaults to it.
pub fn load_config(path: &Path) -> Result<EtlConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let mut config: EtlConfig =
        toml::from_str(&text).with_context(|| format!("parse config {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    config.input_dir = Some(match config.input_dir.take() {
        Some(dir) => anchor(base, dir),
        None => base.to_path_buf(),
    });
    config.output_dir = anchor(base, std::mem::take(&mut config.output_dir));
    debug!(
        config = %path.display(),
        sources = config.sources.len(),
        prefix = %config.prefix,
        "loaded configuration"
    );
    Ok(config)
}

fn anchor(base: &Path, dir: PathBuf) -> PathBuf {
    if dir.is_absolute() { dir } else { base.join(dir) }
}

/// Loads, overrides and checks the configuration of a `run`.
pub fn run_config(path: &Path, overrides: &ConfigOverrides) -> Result<EtlConfig> {
    let mut config = load_config(path)?;
    overrides.apply(&mut config);
    config.validate().context("invalid configuration")?;
    if config.sources.is_empty() {
        bail!("{} declares no [[sources]]", path.display());
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use census_model::{SourceLayout, SourceOrder};
    use tempfile::TempDir;

    use super::*;

    const CONFIG: &str = r#"
prefix = "PT"
output_dir = "saida"
source_order = "declared"

[assembly]
precision = 3

[validation]
range_fatal = true

[weights]
Superior = 5.0

[[sources]]
dataset = "censos_2021"
year = 2021
layout = "population_by_nationality"
candidates = ["populacao_2021.csv", "Populacao 2021.csv"]
required = true
"#;

    #[test]
    fn relative_dirs_follow_the_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etl.toml");
        fs::write(&path, CONFIG).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.prefix, "PT");
        assert_eq!(config.input_dir.as_deref(), Some(dir.path()));
        assert_eq!(config.output_dir, dir.path().join("saida"));
        assert_eq!(config.source_order, SourceOrder::Declared);
        assert_eq!(config.assembly.precision, 3);
        assert!(!config.assembly.include_zero_rows);
        assert!(config.validation.range_fatal);
        assert_eq!(config.weight_for("Superior", Some(4)), 5.0);
        assert_eq!(config.sources[0].layout, SourceLayout::PopulationByNationality);
        assert!(config.sources[0].required);
        assert_eq!(config.sources[0].delimiter, None);
    }

    #[test]
    fn overrides_win_over_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etl.toml");
        fs::write(&path, CONFIG).unwrap();
        let overrides = ConfigOverrides {
            input_dir: Some(PathBuf::from("/dados")),
            output_dir: None,
            prefix: Some("DW".to_string()),
            include_zero_rows: true,
        };

        let config = run_config(&path, &overrides).unwrap();
        assert_eq!(config.input_dir, Some(PathBuf::from("/dados")));
        assert_eq!(config.output_dir, dir.path().join("saida"));
        assert_eq!(config.prefix, "DW");
        assert!(config.assembly.include_zero_rows);
    }

    #[test]
    fn run_requires_sources() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etl.toml");
        fs::write(&path, "prefix = \"DW\"\n").unwrap();
        let error = run_config(&path, &ConfigOverrides::default()).unwrap_err();
        assert!(error.to_string().contains("declares no [[sources]]"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etl.toml");
        fs::write(&path, CONFIG.replace("precision = 3", "precision = 9")).unwrap();
        assert!(run_config(&path, &ConfigOverrides::default()).is_err());
    }
}

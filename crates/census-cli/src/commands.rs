use anyhow::{Context, Result};

use census_cli::config::{ConfigOverrides, run_config};
use census_cli::pipeline::run;
use census_cli::summary::catalog_table;
use census_cli::types::{RunFlags, RunResult};
use census_model::EntityType;
use census_output::{VerifyReport, verify_export};
use census_standards::Catalog;

use crate::cli::{CatalogArgs, RunArgs, VerifyArgs};

pub fn run_etl(args: &RunArgs) -> Result<RunResult> {
    let overrides = ConfigOverrides {
        input_dir: args.input_dir.clone(),
        output_dir: args.output_dir.clone(),
        prefix: args.prefix.clone(),
        include_zero_rows: args.include_zero_rows,
    };
    let config = run_config(&args.config, &overrides)?;
    let flags = RunFlags {
        force: args.force,
        dry_run: args.dry_run,
        verify: args.verify,
    };
    run(&config, flags)
}

pub fn run_catalog(args: &CatalogArgs) -> Result<()> {
    let catalog = Catalog::builtin().context("load reference catalog")?;
    let entities: Vec<EntityType> = match args.entity {
        Some(entity) => vec![entity],
        None => EntityType::ALL.to_vec(),
    };
    for entity in entities {
        let count = catalog.entries(entity).count();
        println!("{} ({}, {count} entries)", entity.table_name(), entity);
        println!("{}", catalog_table(&catalog, entity));
        println!();
    }
    Ok(())
}

pub fn run_verify(args: &VerifyArgs) -> Result<VerifyReport> {
    let report = verify_export(&args.dir, &args.prefix)
        .with_context(|| format!("verify {}", args.dir.display()))?;
    println!("Manifest: {}", report.manifest.display());
    if report.is_ok() {
        println!("{} table(s) match the manifest", report.tables);
    } else {
        println!("{} problem(s):", report.problems.len());
        for problem in &report.problems {
            println!("- {problem}");
        }
    }
    Ok(report)
}

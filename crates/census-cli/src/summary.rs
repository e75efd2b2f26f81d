use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use census_model::{EntityType, MappingStats, Severity};
use census_output::TableKind;
use census_standards::Catalog;
use census_validate::ExportGate;

use crate::pipeline::violation_counts;
use crate::types::RunResult;

pub fn print_summary(result: &RunResult) {
    println!("Prefix: {}", result.prefix);
    println!("Output: {}", result.output_dir.display());
    if let Some(path) = &result.manifest {
        println!("Manifest: {}", path.display());
    }
    match result.gate {
        ExportGate::Clear => {}
        ExportGate::Forced { fatal } => {
            println!("Exported despite {fatal} fatal violation(s) (--force)");
        }
        ExportGate::Blocked { fatal } => {
            println!("Export blocked by {fatal} fatal violation(s)");
        }
    }
    print_sources(result);
    print_tables(result);
    print_mapping_rates(result);
    print_violations(result);
    print_skipped(result);
    if let Some(differences) = &result.round_trip {
        println!();
        if differences.is_empty() {
            println!("Re-import: all tables match");
        } else {
            println!("Re-import: {} difference(s)", differences.len());
            for difference in differences {
                println!("  - {difference}");
            }
        }
    }
    if !result.errors.is_empty() {
        eprintln!();
        eprintln!("Errors:");
        for error in &result.errors {
            eprintln!("- {error}");
        }
    }
}

fn print_sources(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Year"),
        header_cell("Layout"),
        header_cell("File"),
        header_cell("Encoding"),
        header_cell("Rows"),
        header_cell("Kept"),
        header_cell("Facts"),
        header_cell("Fatal"),
        header_cell("Warnings"),
    ]);
    apply_summary_table_style(&mut table);
    for column in [1, 5, 6, 7, 8, 9] {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for source in &result.sources {
        table.add_row(vec![
            Cell::new(&source.dataset).add_attribute(Attribute::Bold),
            Cell::new(source.year),
            Cell::new(source.layout),
            Cell::new(&source.file),
            dim_cell(source.encoding),
            Cell::new(source.rows_read),
            Cell::new(source.records_kept),
            Cell::new(source.fact_rows),
            count_cell(source.fatal, Color::Red),
            count_cell(source.warnings, Color::Yellow),
        ]);
    }
    println!();
    println!("Sources:");
    println!("{table}");
}

fn print_tables(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Kind"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Fatal"),
        header_cell("Warnings"),
    ]);
    apply_summary_table_style(&mut table);
    for column in [2, 3, 4, 5] {
        align_column(&mut table, column, CellAlignment::Right);
    }
    let mut total_rows = 0usize;
    for summary in &result.tables {
        let (fatal, warnings) = violation_counts(&result.report, &summary.name);
        total_rows += summary.rows;
        table.add_row(vec![
            Cell::new(&summary.name),
            kind_cell(summary.kind),
            Cell::new(summary.rows),
            Cell::new(summary.columns),
            count_cell(fatal, Color::Red),
            count_cell(warnings, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        Cell::new(""),
        count_cell(result.report.fatal_count(), Color::Red),
        count_cell(result.report.warning_count(), Color::Yellow),
    ]);
    println!();
    println!("Tables:");
    println!("{table}");
}

fn print_mapping_rates(result: &RunResult) {
    if result.mapping_stats.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Exact"),
        header_cell("Variant"),
        header_cell("New"),
        header_cell("Unmapped"),
        header_cell("Excluded"),
        header_cell("Rate"),
    ]);
    apply_summary_table_style(&mut table);
    for column in 1..=6 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for (entity, stats) in &result.mapping_stats {
        table.add_row(vec![
            Cell::new(entity),
            Cell::new(stats.exact),
            Cell::new(stats.variant),
            Cell::new(stats.new),
            count_cell(stats.unmapped as usize, Color::Yellow),
            dim_cell(stats.excluded),
            rate_cell(stats),
        ]);
    }
    println!();
    println!("Label mapping:");
    println!("{table}");
}

fn print_violations(result: &RunResult) {
    if result.report.violations.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rule"),
        header_cell("Severity"),
        header_cell("Table"),
        header_cell("Column"),
        header_cell("Count"),
        header_cell("Message"),
        header_cell("Examples"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Right);
    for violation in &result.report.violations {
        table.add_row(vec![
            Cell::new(violation.rule),
            severity_cell(violation.severity),
            Cell::new(&violation.table),
            Cell::new(violation.column.as_deref().unwrap_or("-")),
            Cell::new(violation.count),
            Cell::new(&violation.message),
            example_cell(&violation.examples),
        ]);
    }
    println!();
    println!("Violations:");
    println!("{table}");
}

fn print_skipped(result: &RunResult) {
    if result.skipped.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Year"),
        header_cell("Reason"),
    ]);
    apply_issue_table_style(&mut table);
    for skipped in &result.skipped {
        table.add_row(vec![
            Cell::new(&skipped.dataset).fg(Color::Yellow),
            Cell::new(skipped.year),
            Cell::new(&skipped.reason),
        ]);
    }
    println!();
    println!("Skipped sources:");
    println!("{table}");
}

/// Reference dimensions of the built-in catalog.
pub fn catalog_table(catalog: &Catalog, entity: EntityType) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Name"),
        header_cell("Rank"),
        header_cell("Aggregate"),
        header_cell("Attributes"),
        header_cell("Variants"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Center);
    for entry in catalog.entries(entity) {
        let attributes = entry
            .attributes
            .extra
            .iter()
            .map(|(column, value)| format!("{column}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        let variants = catalog
            .variants(entity)
            .filter(|variant| variant.canonical == entry.name)
            .map(|variant| variant.variant.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&entry.name),
            entry.attributes.rank.map_or_else(|| dim_cell("-"), Cell::new),
            if entry.attributes.aggregate {
                Cell::new("✓").fg(Color::Cyan)
            } else {
                dim_cell("-")
            },
            Cell::new(attributes),
            Cell::new(variants),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(180);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn kind_cell(kind: TableKind) -> Cell {
    match kind {
        TableKind::Dimension => Cell::new("dimension").fg(Color::Cyan),
        TableKind::Fact => Cell::new("fact").fg(Color::Green),
        TableKind::Mapping => Cell::new("mapping").fg(Color::Magenta),
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Fatal => Cell::new("fatal")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new("warning").fg(Color::Yellow),
    }
}

fn rate_cell(stats: &MappingStats) -> Cell {
    let rate = stats.mapping_rate();
    let color = if stats.unmapped == 0 {
        Color::Green
    } else if rate >= 90.0 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{rate:.1}%")).fg(color)
}

fn example_cell(examples: &[String]) -> Cell {
    if examples.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(examples.join(", "))
    }
}

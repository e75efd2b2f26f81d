//! Delimiter sniffing and header-row detection for statistical exports.
//!
//! Census and registry exports often start with a title block ("Quadro 3 -
//! População estrangeira residente...", "Unidade: N.º") before the real
//! header. Up to [`MAX_METADATA_ROWS`] such rows are skipped.

use census_common::clean_number;

/// Maximum number of rows allowed above the header.
pub const MAX_METADATA_ROWS: usize = 3;

const SNIFF_LINES: usize = 12;

/// Picks `;` or `,` from the first non-empty lines.
///
/// Semicolons win ties because Portuguese exports use the comma as decimal
/// mark, so a `;`-separated file with decimals carries both characters.
pub fn sniff_delimiter(text: &str) -> u8 {
    let mut semicolons = 0usize;
    let mut commas = 0usize;
    for line in text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
    {
        let mut in_quotes = false;
        for ch in line.chars() {
            match ch {
                '"' => in_quotes = !in_quotes,
                ';' if !in_quotes => semicolons += 1,
                ',' if !in_quotes => commas += 1,
                _ => {}
            }
        }
    }
    if semicolons > 0 && semicolons * 2 >= commas {
        b';'
    } else if commas > 0 {
        b','
    } else {
        b';'
    }
}

/// Trims whitespace and stray BOMs and collapses inner runs of whitespace.
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Default, Clone, Copy)]
struct RowStats {
    total: usize,
    non_empty: usize,
    numeric: usize,
    alpha: usize,
}

impl RowStats {
    fn ratio(part: usize, whole: usize) -> f64 {
        if whole == 0 {
            0.0
        } else {
            part as f64 / whole as f64
        }
    }

    fn non_empty_ratio(self) -> f64 {
        Self::ratio(self.non_empty, self.total)
    }

    fn numeric_share(self) -> f64 {
        Self::ratio(self.numeric, self.non_empty)
    }

    fn alpha_share(self) -> f64 {
        Self::ratio(self.alpha, self.non_empty)
    }
}

fn row_stats(row: &[String]) -> RowStats {
    // trailing empty cells are an artifact of spreadsheet exports
    let used = row
        .iter()
        .rposition(|cell| !cell.trim().is_empty())
        .map_or(0, |idx| idx + 1);
    let mut stats = RowStats {
        total: used,
        ..RowStats::default()
    };
    for cell in &row[..used] {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            continue;
        }
        stats.non_empty += 1;
        if clean_number(trimmed).is_some() {
            stats.numeric += 1;
        }
        if trimmed.chars().any(char::is_alphabetic) {
            stats.alpha += 1;
        }
    }
    stats
}

fn is_metadata_like(stats: RowStats) -> bool {
    stats.non_empty <= 1
}

fn is_data_like(stats: RowStats) -> bool {
    stats.non_empty >= 2 && stats.numeric >= 1 && stats.numeric_share() >= 0.2
}

fn is_header_like(stats: RowStats) -> bool {
    stats.non_empty >= 2
        && stats.non_empty_ratio() >= 0.5
        && stats.alpha_share() >= 0.5
        && stats.numeric_share() <= 0.25
}

/// Returns the index of the header row, or `None` when no header-like row
/// appears within the first `MAX_METADATA_ROWS + 1` rows.
///
/// The last header-like row before the first data row wins, so a two-line
/// header block keeps its second (column name) line.
pub fn detect_header_row(rows: &[Vec<String>]) -> Option<usize> {
    let window = rows.len().min(MAX_METADATA_ROWS + 2);
    let stats: Vec<RowStats> = rows.iter().take(window).map(|row| row_stats(row)).collect();
    let first_data = stats
        .iter()
        .position(|stat| is_data_like(*stat))
        .unwrap_or(window);
    let search_end = first_data.min(MAX_METADATA_ROWS + 1);
    (0..search_end)
        .rev()
        .find(|&idx| is_header_like(stats[idx]))
        .or_else(|| (0..search_end).find(|&idx| !is_metadata_like(stats[idx])))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&[&str]]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|line| line.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn sniff_prefers_semicolon_with_decimal_commas() {
        assert_eq!(sniff_delimiter("Nível;Total;%\nSuperior;100;12,5\n"), b';');
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3\n"), b',');
        assert_eq!(sniff_delimiter("\"x;y\",b\n1,2\n"), b',');
        assert_eq!(sniff_delimiter("single\n"), b';');
    }

    #[test]
    fn header_on_first_row() {
        let table = rows(&[&["Nacionalidade", "Total"], &["Brasil", "9504"]]);
        assert_eq!(detect_header_row(&table), Some(0));
    }

    #[test]
    fn skips_title_block() {
        let table = rows(&[
            &["Quadro 1 - População estrangeira residente, 2011", "", ""],
            &["Unidade: N.º", "", ""],
            &["", "", ""],
            &["Nacionalidade", "HM", "H"],
            &["Brasil", "9 504", "4 000"],
        ]);
        assert_eq!(detect_header_row(&table), Some(3));
    }

    #[test]
    fn two_line_header_keeps_second_line() {
        let table = rows(&[
            &["População", "Sexo", ""],
            &["Nacionalidade", "Homens", "Mulheres"],
            &["Brasil", "10", "12"],
        ]);
        assert_eq!(detect_header_row(&table), Some(1));
    }

    #[test]
    fn data_without_header_is_rejected() {
        let table = rows(&[&["Brasil", "10"], &["Angola", "7"]]);
        assert_eq!(detect_header_row(&table), None);
    }

    #[test]
    fn too_many_title_rows_is_rejected() {
        let table = rows(&[
            &["Título"],
            &["Subtítulo"],
            &["Unidade"],
            &["Fonte"],
            &["Nacionalidade", "Total"],
            &["Brasil", "1"],
        ]);
        assert_eq!(detect_header_row(&table), None);
    }

    #[test]
    fn header_normalization() {
        assert_eq!(normalize_header("\u{feff}  Nível   de  ensino "), "Nível de ensino");
    }
}

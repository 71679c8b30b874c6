//! Spreadsheet cell access for the headerless portfolio workbook.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};

/// Render one cell as trimmed-later text; empty cells become `None`.
/// Whole-number floats render without the trailing `.0` so numeric cells
/// produce the same keys the site already stores.
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                Some(format!("{}", *f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Numeric value of a cell, tolerating numbers stored as text.
pub fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read the first worksheet of a workbook as positional rows with no header.
/// Row 0 of the result corresponds to record id 1.
pub fn read_headerless_rows(path: &Path) -> Result<Vec<Vec<Option<String>>>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("{} has no worksheets", path.display()))?
        .with_context(|| format!("failed to read first sheet of {}", path.display()))?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_floats_lose_the_decimal_point() {
        assert_eq!(cell_text(&Data::Float(3.0)), Some("3".to_string()));
        assert_eq!(cell_text(&Data::Float(2.5)), Some("2.5".to_string()));
        assert_eq!(cell_text(&Data::Empty), None);
    }

    #[test]
    fn numbers_parse_from_text_cells() {
        assert_eq!(cell_number(&Data::String(" 12.5 ".into())), Some(12.5));
        assert_eq!(cell_number(&Data::Int(-3)), Some(-3.0));
        assert_eq!(cell_number(&Data::String("abc".into())), None);
    }
}

//! Positional access to loosely-structured spreadsheet rows
//!
//! The exports carry no header row we can rely on. Values are found either at
//! a fixed column or next to a label cell, so everything here works on column
//! positions within a single row.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};

/// An opened workbook (xlsx, xlsm, xlsb, xls or ods)
pub struct Workbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    pub fn open(path: &Path) -> Result<Self> {
        let sheets = open_workbook_auto(path)
            .with_context(|| format!("Failed to open spreadsheet: {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names().to_vec()
    }

    /// Read a whole sheet into memory
    pub fn range(&mut self, sheet_name: &str) -> Result<Range<Data>> {
        let names = self.sheet_names();
        if !names.iter().any(|n| n == sheet_name) {
            bail!(
                "Sheet '{}' not found in {} (available: {})",
                sheet_name,
                self.path.display(),
                names.join(", ")
            );
        }

        self.sheets
            .worksheet_range(sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))
    }
}

/// A view over one row, addressed by absolute zero-based column index
/// (column A is 0) regardless of where the sheet's used range begins
#[derive(Debug, Clone, Copy)]
pub struct SheetRow<'a> {
    cells: &'a [Data],
    first_col: usize,
}

impl<'a> SheetRow<'a> {
    pub fn new(cells: &'a [Data]) -> Self {
        Self::at(cells, 0)
    }

    /// A row whose first cell sits in column `first_col`
    pub fn at(cells: &'a [Data], first_col: usize) -> Self {
        Self { cells, first_col }
    }

    /// One past the last absolute column of the row
    pub fn width(&self) -> usize {
        self.first_col + self.cells.len()
    }

    /// Trimmed cell text, empty for missing or blank cells
    pub fn text(&self, col: usize) -> String {
        col.checked_sub(self.first_col)
            .and_then(|i| self.cells.get(i))
            .map(cell_text)
            .unwrap_or_default()
    }

    /// Trimmed cell text, `None` when the cell is missing or blank
    pub fn cell(&self, col: usize) -> Option<String> {
        let text = self.text(col);
        if text.is_empty() { None } else { Some(text) }
    }

    /// The value one column right of `label_col`, if that label equals `marker`
    pub fn labeled_value(&self, label_col: usize, marker: &str) -> Option<String> {
        if self.text(label_col) == marker.trim() {
            self.cell(label_col + 1)
        } else {
            None
        }
    }

    pub fn is_blank(&self) -> bool {
        (0..self.width()).all(|col| self.text(col).is_empty())
    }
}

/// Iterate the rows of a sheet as [`SheetRow`]s.
///
/// calamine trims leading empty rows and columns from a range, so the start
/// column is carried into each row to keep positions absolute.
pub fn rows(range: &Range<Data>) -> impl Iterator<Item = SheetRow<'_>> {
    let first_col = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    range.rows().map(move |cells| SheetRow::at(cells, first_col))
}

const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

/// Render a cell the way it reads in the spreadsheet
pub fn cell_text(cell: &Data) -> String {
    let text = match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // Numeric usernames and codes come back as floats. Past 2^53 a
            // float no longer holds every integer, so leave those as written.
            if f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT_INT {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Empty | Data::Error(_) => String::new(),
    };
    text.trim().to_string()
}

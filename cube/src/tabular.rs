//! Tabular input: sheets of cells addressed by absolute (row, column).
//!
//! The cube build only ever asks for a cell at a known position, so sheets are
//! materialised as dense row vectors. [`Workbook::open`] loads every sheet of
//! an xls/xlsx/ods file through calamine; tests build sheets in memory with
//! [`Sheet::from_rows`].

use std::fmt;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::error::{CubeError, Result};

/// A single spreadsheet cell, reduced to what the cube build distinguishes.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// No value.
    Empty,
    /// A text value (already trimmed).
    Text(String),
    /// A numeric value.
    Number(f64),
}

impl Cell {
    /// Returns true if the cell carries no value (blank text counts as empty).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Returns the numeric value, if any.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the cell as a code label, or `None` if it is empty.
    ///
    /// Integral numbers render without a fractional part, so a code typed as
    /// `1` in the sheet becomes `"1"` rather than `"1.0"`.
    #[must_use]
    pub fn as_code(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            Cell::Number(n) => Some(n.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.trim().to_owned()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            other => Cell::Text(format!("{other:?}")),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.trim().to_owned())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

static EMPTY: Cell = Cell::Empty;

/// One sheet, stored as dense rows indexed from absolute row 0.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Builds a sheet from explicit rows. Trailing empty cells are dropped so
    /// that [`Sheet::row_len`] reflects the last populated column.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut row| {
                while row.last().is_some_and(Cell::is_empty) {
                    row.pop();
                }
                row
            })
            .collect();
        Self {
            name: name.into(),
            rows,
        }
    }

    fn from_range(name: &str, range: &Range<Data>) -> Self {
        let (row0, col0) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));
        let mut rows = vec![Vec::new(); row0];
        for row in range.rows() {
            let mut cells = vec![Cell::Empty; col0];
            cells.extend(row.iter().map(Cell::from));
            rows.push(cells);
        }
        Self::from_rows(name, rows)
    }

    /// Sheet name as stored in the workbook.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows, counting leading blank rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of cells up to and including the last populated one in `row`.
    #[must_use]
    pub fn row_len(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    /// Returns the cell at an absolute position; out-of-range positions are empty.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }

    /// Returns true if every cell in `row` is empty.
    #[must_use]
    pub fn is_blank_row(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .map_or(true, |r| r.iter().all(Cell::is_empty))
    }
}

/// Read access to the sheets of a workbook.
pub trait TabularSource {
    /// Returns the sheet at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::MissingSheet`] if there is no such sheet.
    fn sheet(&self, index: usize) -> Result<&Sheet>;

    /// Number of sheets available.
    fn sheet_count(&self) -> usize;
}

/// A fully loaded workbook.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Wraps already built sheets.
    #[must_use]
    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Loads every sheet of the workbook at `path` (format detected from the extension).
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::Workbook`] if the file cannot be opened or a sheet
    /// cannot be decoded.
    pub fn open(path: &Path) -> Result<Self> {
        let wrap = |source| CubeError::Workbook {
            path: path.to_path_buf(),
            source,
        };
        let mut wb = open_workbook_auto(path).map_err(wrap)?;
        let names = wb.sheet_names();
        let mut sheets = Vec::with_capacity(names.len());
        for name in &names {
            let range = wb.worksheet_range(name).map_err(wrap)?;
            sheets.push(Sheet::from_range(name, &range));
        }
        Ok(Self { sheets })
    }

    /// All loaded sheets, in workbook order.
    #[must_use]
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }
}

impl TabularSource for Workbook {
    fn sheet(&self, index: usize) -> Result<&Sheet> {
        self.sheets
            .get(index)
            .ok_or(CubeError::MissingSheet { index })
    }

    fn sheet_count(&self) -> usize {
        self.sheets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_empty_cells_are_dropped() {
        let sheet = Sheet::from_rows(
            "s",
            vec![vec![Cell::from("a"), Cell::Empty, Cell::from(""), Cell::Empty]],
        );
        assert_eq!(sheet.row_len(0), 1);
        assert_eq!(sheet.cell(0, 3), &Cell::Empty);
        assert_eq!(sheet.cell(7, 0), &Cell::Empty);
    }

    #[test]
    fn integral_numbers_render_as_codes_without_fraction() {
        assert_eq!(Cell::Number(1.0).as_code().as_deref(), Some("1"));
        assert_eq!(Cell::Number(2.5).as_code().as_deref(), Some("2.5"));
        assert_eq!(Cell::from("  M ").as_code().as_deref(), Some("M"));
        assert_eq!(Cell::Empty.as_code(), None);
    }

    #[test]
    fn calamine_range_offsets_are_preserved() {
        let mut range = Range::new((2, 1), (2, 2));
        range.set_value((2, 1), Data::String("01001".into()));
        range.set_value((2, 2), Data::Float(4.0));
        let sheet = Sheet::from_range("COM", &range);
        assert_eq!(sheet.row_count(), 3);
        assert!(sheet.is_blank_row(0));
        assert_eq!(sheet.cell(2, 1), &Cell::Text("01001".into()));
        assert_eq!(sheet.cell(2, 2).as_number(), Some(4.0));
    }

    #[test]
    fn missing_sheet_is_reported() {
        let wb = Workbook::from_sheets(vec![Sheet::from_rows("COM", vec![])]);
        assert!(wb.sheet(0).is_ok());
        assert!(matches!(wb.sheet(1), Err(CubeError::MissingSheet { index: 1 })));
    }
}

//! Geographic records: the data rows below the header block.
//!
//! Column 0 holds the geographic code, column 1 a label that is not used, and
//! every header column holds one numeric measure. Cells are looked up by index
//! and checked against the header, so a misaligned row is an error rather than
//! a silent shift of dimension values.

use crate::config::SheetLayout;
use crate::error::{CubeError, Result};
use crate::header::Header;
use crate::tabular::Sheet;

/// Reads the data rows of one sheet.
#[derive(Debug, Clone, Copy)]
pub struct RecordReader<'s> {
    sheet: &'s Sheet,
    first_data_row: usize,
}

impl<'s> RecordReader<'s> {
    /// Creates a reader for `sheet`.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::SheetTooShort`] if the first data row lies beyond
    /// the end of the sheet (a sheet ending right before it simply has no records).
    pub fn new(sheet: &'s Sheet, layout: &SheetLayout) -> Result<Self> {
        if layout.first_data_row > sheet.row_count() {
            return Err(CubeError::SheetTooShort {
                sheet: sheet.name().to_owned(),
                rows: sheet.row_count(),
                needed: layout.first_data_row,
            });
        }
        Ok(Self {
            sheet,
            first_data_row: layout.first_data_row,
        })
    }

    /// Yields `(row, geo_code)` for every non-blank data row.
    ///
    /// A row with cells but no code yields [`CubeError::MissingGeoCode`].
    pub fn geo_codes(&self) -> impl Iterator<Item = Result<(usize, String)>> + 's {
        let sheet = self.sheet;
        (self.first_data_row..sheet.row_count())
            .filter(move |&row| !sheet.is_blank_row(row))
            .map(move |row| {
                sheet
                    .cell(row, SheetLayout::GEO_CODE_COLUMN)
                    .as_code()
                    .map(|code| (row, code))
                    .ok_or_else(|| CubeError::MissingGeoCode {
                        sheet: sheet.name().to_owned(),
                        row,
                    })
            })
    }

    /// Measures of `row`, aligned with [`Header::columns`].
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::RowTooShort`] if the row stops before the last
    /// header column, [`CubeError::UnexpectedColumn`] if a populated cell has
    /// no header, and [`CubeError::NonNumericCell`] if a measure is not a number.
    pub fn measures(&self, row: usize, header: &Header) -> Result<Vec<f64>> {
        let sheet = self.sheet;
        let found = sheet.row_len(row);
        if found < header.width() {
            return Err(CubeError::RowTooShort {
                sheet: sheet.name().to_owned(),
                row,
                expected: header.width(),
                found,
            });
        }
        for column in SheetLayout::FIRST_MEASURE_COLUMN..found {
            if header.column(column).is_none() && !sheet.cell(row, column).is_empty() {
                return Err(CubeError::UnexpectedColumn {
                    sheet: sheet.name().to_owned(),
                    row,
                    column,
                });
            }
        }
        header
            .columns()
            .map(|column| {
                let cell = sheet.cell(row, column.index);
                cell.as_number().ok_or_else(|| CubeError::NonNumericCell {
                    sheet: sheet.name().to_owned(),
                    row,
                    column: column.index,
                    value: cell.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{self, tests::header_rows, tests::layout};
    use crate::naming::InseeNaming;
    use crate::tabular::Cell;

    fn sheet_with(data: Vec<Vec<Cell>>) -> Sheet {
        let mut rows = header_rows();
        rows.extend(data);
        Sheet::from_rows("COM", rows)
    }

    fn row(code: &str, values: &[f64]) -> Vec<Cell> {
        let mut cells = vec![Cell::from(code), Cell::from("label")];
        cells.extend(values.iter().copied().map(Cell::from));
        cells
    }

    #[test]
    fn blank_rows_are_skipped() {
        let sheet = sheet_with(vec![row("01001", &[1.0; 4]), vec![], row("01002", &[2.0; 4])]);
        let reader = RecordReader::new(&sheet, &layout()).unwrap();
        let codes: Vec<_> = reader.geo_codes().collect::<Result<_>>().unwrap();
        assert_eq!(codes, [(4, "01001".to_owned()), (6, "01002".to_owned())]);
    }

    #[test]
    fn row_without_code_is_fatal() {
        let mut bad = row("", &[1.0; 4]);
        bad[0] = Cell::Empty;
        let sheet = sheet_with(vec![bad]);
        let reader = RecordReader::new(&sheet, &layout()).unwrap();
        let first = reader.geo_codes().next().unwrap();
        assert!(matches!(first, Err(CubeError::MissingGeoCode { row: 4, .. })));
    }

    #[test]
    fn measures_follow_header_order() {
        let sheet = sheet_with(vec![row("01001", &[10.0, 20.0, 30.0, 40.0])]);
        let header = header::parse(&sheet, &layout(), &InseeNaming::new("2017")).unwrap();
        let reader = RecordReader::new(&sheet, &layout()).unwrap();
        assert_eq!(reader.measures(4, &header).unwrap(), [10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn misaligned_rows_are_structural_errors() {
        let sheet = sheet_with(vec![
            row("01001", &[10.0, 20.0, 30.0]),
            row("01002", &[1.0, 2.0, 3.0, 4.0, 5.0]),
        ]);
        let header = header::parse(&sheet, &layout(), &InseeNaming::new("2017")).unwrap();
        let reader = RecordReader::new(&sheet, &layout()).unwrap();
        assert!(matches!(
            reader.measures(4, &header),
            Err(CubeError::RowTooShort { expected: 6, found: 5, .. })
        ));
        assert!(matches!(
            reader.measures(5, &header),
            Err(CubeError::UnexpectedColumn { column: 6, .. })
        ));
    }

    #[test]
    fn text_in_measure_cell_is_a_value_error() {
        let mut bad = row("01001", &[1.0; 4]);
        bad[3] = Cell::from("n/a");
        let sheet = sheet_with(vec![bad]);
        let header = header::parse(&sheet, &layout(), &InseeNaming::new("2017")).unwrap();
        let reader = RecordReader::new(&sheet, &layout()).unwrap();
        let err = reader.measures(4, &header).unwrap_err();
        assert!(matches!(err, CubeError::NonNumericCell { column: 3, ref value, .. } if value == "n/a"));
        assert!(!err.is_structural());
    }
}

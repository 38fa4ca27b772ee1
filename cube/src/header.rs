//! Header block parsing.
//!
//! The header block is a contiguous range of rows at the top of the primary
//! sheet. Each row describes one dimension: its concept identifier sits in the
//! label column and its codes run along the measure columns. Reading the block
//! column-wise gives, for every measure column, the vector of codes that
//! positions a cell of that column in the cube.
//!
//! ```text
//!            col 0      col 1    col 2  col 3  col 4  col 5
//! row 9      caption    SEXE     1      1      2      2
//! row 10                AGEQ65   Y      O      Y      O
//! ```

use std::collections::BTreeMap;

use crate::config::SheetLayout;
use crate::error::{CubeError, Result};
use crate::naming::{ComponentKind, Naming};
use crate::tabular::Sheet;

/// One dimension declared by a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    /// Concept identifier, e.g. `SEXE`.
    pub concept: String,
    /// IRI of the dimension property.
    pub property: String,
}

/// Codes positioning one measure column, one per header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderColumn {
    /// Absolute column index.
    pub index: usize,
    /// Code labels, in header-row order.
    pub codes: Vec<String>,
    /// Code item IRIs, aligned with `codes`.
    pub code_iris: Vec<String>,
}

/// The parsed header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Dimensions, in header-row order.
    pub dimensions: Vec<Dimension>,
    columns: BTreeMap<usize, HeaderColumn>,
}

impl Header {
    /// Header column for an absolute column index.
    #[must_use]
    pub fn column(&self, index: usize) -> Option<&HeaderColumn> {
        self.columns.get(&index)
    }

    /// All header columns, by increasing column index.
    pub fn columns(&self) -> impl Iterator<Item = &HeaderColumn> {
        self.columns.values()
    }

    /// Number of measure columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// One past the last measure column: the cell count a data row must reach.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.keys().next_back().map_or(0, |last| last + 1)
    }
}

/// Parses the header block of `sheet` according to `layout`.
///
/// # Errors
///
/// Returns a structural error if the header range is invalid or does not fit
/// the sheet, a header row has no concept, a discovered column misses a code in
/// some row, or the block declares no column at all.
pub fn parse(sheet: &Sheet, layout: &SheetLayout, naming: &dyn Naming) -> Result<Header> {
    layout.validate()?;
    if layout.last_header_row >= sheet.row_count() {
        return Err(CubeError::SheetTooShort {
            sheet: sheet.name().to_owned(),
            rows: sheet.row_count(),
            needed: layout.last_header_row,
        });
    }

    let size = layout.header_size();
    let mut dimensions = Vec::with_capacity(size);
    let mut codes: BTreeMap<usize, Vec<Option<String>>> = BTreeMap::new();

    for (position, row) in layout.header_rows().enumerate() {
        let concept = sheet
            .cell(row, SheetLayout::LABEL_COLUMN)
            .as_code()
            .ok_or_else(|| CubeError::MissingConcept {
                sheet: sheet.name().to_owned(),
                row,
                column: SheetLayout::LABEL_COLUMN,
            })?;
        dimensions.push(Dimension {
            property: naming.component_uri(ComponentKind::Dimension, &concept),
            concept,
        });

        for column in SheetLayout::FIRST_MEASURE_COLUMN..sheet.row_len(row) {
            if let Some(code) = sheet.cell(row, column).as_code() {
                codes.entry(column).or_insert_with(|| vec![None; size])[position] = Some(code);
            }
        }
    }

    if codes.is_empty() {
        return Err(CubeError::EmptyHeader {
            sheet: sheet.name().to_owned(),
        });
    }

    let mut columns = BTreeMap::new();
    for (index, slots) in codes {
        let mut column = HeaderColumn {
            index,
            codes: Vec::with_capacity(size),
            code_iris: Vec::with_capacity(size),
        };
        for (position, slot) in slots.into_iter().enumerate() {
            let code = slot.ok_or_else(|| CubeError::HeaderGap {
                sheet: sheet.name().to_owned(),
                row: layout.first_header_row + position,
                column: index,
            })?;
            column
                .code_iris
                .push(naming.code_item_uri(&dimensions[position].concept, &code));
            column.codes.push(code);
        }
        columns.insert(index, column);
    }

    Ok(Header {
        dimensions,
        columns,
    })
}

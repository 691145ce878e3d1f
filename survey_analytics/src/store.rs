//! The tabular store holding the survey.
//!
//! The survey only relies on a small set of row and column primitives. Any
//! worksheet-like storage offering them can hold a survey: an online
//! spreadsheet, a local file or the in-memory [`MemorySheet`].
//!
//! All the row and column indexes are 1-based, as in spreadsheets.

use std::collections::BTreeMap;

use log::debug;
use snafu::prelude::*;

use crate::config::*;

pub trait TabularStore {
    /// The name of the worksheet.
    fn name(&self) -> &str;

    fn all_rows(&self) -> SurveyResult<Vec<Vec<String>>>;

    /// All the values of a column, from the first row. Rows too short to reach
    /// the column yield an empty value.
    fn column(&self, col: usize) -> SurveyResult<Vec<String>>;

    /// The first row at or below `from_row` whose first cell equals `value`.
    fn find_row(&self, value: &str, from_row: usize) -> SurveyResult<Option<usize>>;

    fn append_row(&mut self, row: &[String]) -> SurveyResult<()>;

    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> SurveyResult<()>;

    /// Inserts a column before `col`, shifting the columns from `col` to the right.
    ///
    /// `values` holds one value per row, starting at the first row.
    fn insert_column(&mut self, col: usize, values: &[String]) -> SurveyResult<()>;

    /// Removes a column, shifting the columns after it to the left.
    fn delete_column(&mut self, col: usize) -> SurveyResult<()>;

    fn delete_row(&mut self, row: usize) -> SurveyResult<()>;

    /// The annotation attached to a cell, if any.
    fn note(&self, row: usize, col: usize) -> SurveyResult<Option<String>>;

    fn set_note(&mut self, row: usize, col: usize, text: &str) -> SurveyResult<()>;

    /// Makes all the changes since the last commit durable.
    ///
    /// Stores that write through immediately have nothing to do here.
    fn commit(&mut self) -> SurveyResult<()> {
        Ok(())
    }
}

/// A worksheet kept in memory.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct MemorySheet {
    name: String,
    rows: Vec<Vec<String>>,
    notes: BTreeMap<(usize, usize), String>,
}

impl MemorySheet {
    pub fn new(name: &str) -> MemorySheet {
        MemorySheet {
            name: name.to_string(),
            rows: Vec::new(),
            notes: BTreeMap::new(),
        }
    }

    pub fn with_rows(name: &str, rows: Vec<Vec<String>>) -> MemorySheet {
        MemorySheet {
            name: name.to_string(),
            rows,
            notes: BTreeMap::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// All the annotations, ordered by row then column.
    pub fn notes(&self) -> impl Iterator<Item = (usize, usize, &str)> {
        self.notes
            .iter()
            .map(|((row, col), text)| (*row, *col, text.as_str()))
    }

    fn check_row(&self, row: usize, col: usize) -> SurveyResult<usize> {
        ensure!(
            row >= 1 && row <= self.rows.len() && col >= 1,
            CellOutOfBoundsSnafu { row, col }
        );
        Ok(row - 1)
    }
}

impl TabularStore for MemorySheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn all_rows(&self) -> SurveyResult<Vec<Vec<String>>> {
        Ok(self.rows.clone())
    }

    fn column(&self, col: usize) -> SurveyResult<Vec<String>> {
        ensure!(col >= 1, CellOutOfBoundsSnafu { row: 1_usize, col });
        Ok(self
            .rows
            .iter()
            .map(|r| r.get(col - 1).cloned().unwrap_or_default())
            .collect())
    }

    fn find_row(&self, value: &str, from_row: usize) -> SurveyResult<Option<usize>> {
        let start = from_row.max(1) - 1;
        Ok(self
            .rows
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, r)| r.first().map(|s| s == value).unwrap_or(false))
            .map(|(idx, _)| idx + 1))
    }

    fn append_row(&mut self, row: &[String]) -> SurveyResult<()> {
        self.rows.push(row.to_vec());
        Ok(())
    }

    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> SurveyResult<()> {
        let r = self.check_row(row, col)?;
        let cells = &mut self.rows[r];
        if cells.len() < col {
            cells.resize(col, String::new());
        }
        cells[col - 1] = value.to_string();
        Ok(())
    }

    fn insert_column(&mut self, col: usize, values: &[String]) -> SurveyResult<()> {
        ensure!(col >= 1, CellOutOfBoundsSnafu { row: 1_usize, col });
        ensure!(
            values.len() == self.rows.len(),
            MalformedSheetSnafu {
                row: values.len(),
                col,
                message: format!(
                    "{} values given for a column of {} rows",
                    values.len(),
                    self.rows.len()
                ),
            }
        );
        debug!("insert_column: {}: col {}", self.name, col);
        for (cells, v) in self.rows.iter_mut().zip(values.iter()) {
            if cells.len() < col - 1 {
                cells.resize(col - 1, String::new());
            }
            cells.insert(col - 1, v.clone());
        }
        // Annotations follow their cells.
        self.notes = std::mem::take(&mut self.notes)
            .into_iter()
            .map(|((r, c), text)| if c >= col { ((r, c + 1), text) } else { ((r, c), text) })
            .collect();
        Ok(())
    }

    fn delete_column(&mut self, col: usize) -> SurveyResult<()> {
        ensure!(col >= 1, CellOutOfBoundsSnafu { row: 1_usize, col });
        debug!("delete_column: {}: col {}", self.name, col);
        for cells in self.rows.iter_mut() {
            if cells.len() >= col {
                cells.remove(col - 1);
            }
        }
        self.notes = std::mem::take(&mut self.notes)
            .into_iter()
            .filter(|((_, c), _)| *c != col)
            .map(|((r, c), text)| if c > col { ((r, c - 1), text) } else { ((r, c), text) })
            .collect();
        Ok(())
    }

    fn delete_row(&mut self, row: usize) -> SurveyResult<()> {
        let r = self.check_row(row, 1)?;
        debug!("delete_row: {}: row {}", self.name, row);
        self.rows.remove(r);
        self.notes = std::mem::take(&mut self.notes)
            .into_iter()
            .filter(|((rr, _), _)| *rr != row)
            .map(|((rr, c), text)| if rr > row { ((rr - 1, c), text) } else { ((rr, c), text) })
            .collect();
        Ok(())
    }

    fn note(&self, row: usize, col: usize) -> SurveyResult<Option<String>> {
        Ok(self.notes.get(&(row, col)).cloned())
    }

    fn set_note(&mut self, row: usize, col: usize, text: &str) -> SurveyResult<()> {
        self.check_row(row, col)?;
        self.notes.insert((row, col), text.to_string());
        Ok(())
    }
}

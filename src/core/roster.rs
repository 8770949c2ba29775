use crate::adapters::docx::{Document, Table};
use crate::core::normalize::normalize_whitespace;
use crate::domain::model::StudentRecord;
use std::fmt;

/// Why a roster row was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSkip {
    TooFewCells(usize),
    MissingId,
    MissingName,
}

impl fmt::Display for RowSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowSkip::TooFewCells(count) => write!(f, "expected at least 2 cells, found {}", count),
            RowSkip::MissingId => f.write_str("first cell (enrollment id) is empty"),
            RowSkip::MissingName => f.write_str("second cell (name) is empty"),
        }
    }
}

/// Reads one data row: id from the first cell, name from the second.
pub fn read_row(cells: &[String]) -> Result<StudentRecord, RowSkip> {
    if cells.len() < 2 {
        return Err(RowSkip::TooFewCells(cells.len()));
    }

    let id = cells[0].trim();
    if id.is_empty() {
        return Err(RowSkip::MissingId);
    }

    let name = normalize_whitespace(&cells[1]);
    if name.is_empty() {
        return Err(RowSkip::MissingName);
    }

    Ok(StudentRecord::new(id, name))
}

/// Reads every row after the header; malformed rows are logged and skipped.
pub fn read_students_from_table(table: &Table) -> Vec<StudentRecord> {
    let mut students = Vec::new();

    for (index, row) in table.rows.iter().enumerate().skip(1) {
        match read_row(&row.cells) {
            Ok(student) => students.push(student),
            Err(reason) => {
                tracing::warn!("Skipping roster row {}: {}", index + 1, reason);
            }
        }
    }

    students
}

/// Concatenates the students of every table, in document order.
pub fn read_students(document: &Document) -> Vec<StudentRecord> {
    let students: Vec<StudentRecord> = document
        .tables
        .iter()
        .flat_map(read_students_from_table)
        .collect();

    tracing::debug!(
        "Read {} students from {} tables",
        students.len(),
        document.tables.len()
    );
    students
}

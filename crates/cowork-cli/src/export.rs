//! Spreadsheet output for scraped rows.
//!
//! Rows are serialized through `serde_json` so the column set and order come
//! from the row type itself. Saves never propagate errors: the caller gets
//! `false` and the failure is logged.

use std::path::PathBuf;

use cowork_core::{CombinedRecord, NOT_AVAILABLE};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Excel's hard limit on characters per cell.
const MAX_CELL_CHARS: usize = 32_767;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("xlsx write failed: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("row serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("could not prepare output directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("row {index} does not serialize to a map of fields")]
    NotARecord { index: usize },

    #[error("table too large for a worksheet: {rows} rows x {columns} columns")]
    TooLarge { rows: usize, columns: usize },
}

/// Destination for the accumulated run state.
pub trait RecordSink {
    /// Writes `rows` to `filename`, replacing any previous file of that name.
    ///
    /// Returns `false` without writing when `rows` is empty or the write fails.
    fn save(&mut self, rows: &[CombinedRecord], filename: &str) -> bool;
}

/// Header plus stringified cells, ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Builds a [`Table`] from serializable rows.
///
/// The header is the union of every row's keys in first-seen order; cells a
/// row does not carry are filled with the sentinel.
///
/// # Errors
///
/// Returns [`ExportError::NotARecord`] if a row is not a struct or map, or
/// [`ExportError::Serialize`] if serialization itself fails.
pub fn tabulate<T: Serialize>(rows: &[T]) -> Result<Table, ExportError> {
    let mut header: Vec<String> = Vec::new();
    let mut maps = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let Value::Object(map) = serde_json::to_value(row)? else {
            return Err(ExportError::NotARecord { index });
        };
        for key in map.keys() {
            if !header.contains(key) {
                header.push(key.clone());
            }
        }
        maps.push(map);
    }

    let rows: Vec<Vec<String>> = maps
        .iter()
        .map(|map| {
            header
                .iter()
                .map(|key| map.get(key).map_or_else(|| NOT_AVAILABLE.to_string(), cell_text))
                .collect()
        })
        .collect();

    Ok(Table { header, rows })
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => NOT_AVAILABLE.to_string(),
        other => other.to_string(),
    }
}

fn clamp_cell(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Writes single-sheet xlsx workbooks into one output directory.
#[derive(Debug, Clone)]
pub struct XlsxSink {
    output_dir: PathBuf,
}

impl XlsxSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Writes `rows` to `filename` inside the output directory with a bold
    /// header row.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the rows cannot be tabulated, the directory
    /// cannot be created, or the workbook cannot be written.
    pub fn write<T: Serialize>(&self, rows: &[T], filename: &str) -> Result<PathBuf, ExportError> {
        let table = tabulate(rows)?;
        let too_large = || ExportError::TooLarge {
            rows: table.rows.len(),
            columns: table.header.len(),
        };

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(filename);

        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let sheet = workbook.add_worksheet();

        for (col, name) in table.header.iter().enumerate() {
            let col = u16::try_from(col).map_err(|_| too_large())?;
            sheet.write_string_with_format(0, col, clamp_cell(name), &bold)?;
        }
        for (index, cells) in table.rows.iter().enumerate() {
            let row = u32::try_from(index + 1).map_err(|_| too_large())?;
            for (col, text) in cells.iter().enumerate() {
                let col = u16::try_from(col).map_err(|_| too_large())?;
                sheet.write_string(row, col, clamp_cell(text))?;
            }
        }

        workbook.save(&path)?;
        Ok(path)
    }
}

impl RecordSink for XlsxSink {
    fn save(&mut self, rows: &[CombinedRecord], filename: &str) -> bool {
        if rows.is_empty() {
            tracing::warn!(filename, "no data to save");
            return false;
        }
        match self.write(rows, filename) {
            Ok(path) => {
                tracing::info!(path = %path.display(), count = rows.len(), "saved workbook");
                true
            }
            Err(err) => {
                tracing::error!(filename, error = %err, "failed to save workbook");
                false
            }
        }
    }
}

/// File name of the checkpoint written after `processed` entries.
#[must_use]
pub fn checkpoint_file_name(processed: usize) -> String {
    format!("checkpoint_{processed}.xlsx")
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;

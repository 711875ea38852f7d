//! CSV export of grid rows
//!
//! Every field, header included, is wrapped in double quotes and embedded
//! double quotes are doubled. Nothing else is escaped.

use backoffice_grid::{ColumnDef, ColumnRegistry, DataGrid, LineEnding, ValuePurpose};
use thiserror::Error;

use crate::value_encoding::stringify_value;

/// Errors during CSV export
#[derive(Debug, Error)]
pub enum CsvExportError {
    #[error("Export is not enabled for this grid")]
    ExportDisabled,

    #[error("No rows are selected for export")]
    NothingSelected,
}

/// Which rows to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportScope {
    /// Every row passing the applied filters, in sort order
    #[default]
    All,
    /// The selected rows, in load order
    Selected,
}

/// A finished export, ready to hand to a download mechanism
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPayload {
    pub file_name: String,
    pub content: String,
    pub row_count: usize,
}

/// Turns rows and columns into CSV text
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSerializer {
    line_ending: LineEnding,
}

impl CsvSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Serialize `rows` with one field per column, header row first.
    ///
    /// Values come from each column's export accessor, then its generic
    /// accessor, then the registry's raw lookup.
    pub fn serialize<T>(
        &self,
        rows: &[&T],
        columns: &[&ColumnDef<T>],
        registry: &ColumnRegistry<T>,
    ) -> String {
        let header = columns
            .iter()
            .map(|c| qualify_field(&c.header))
            .collect::<Vec<_>>()
            .join(",");

        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(header);
        for row in rows {
            let line = columns
                .iter()
                .map(|c| {
                    let value = registry.resolve_value(row, &c.id, ValuePurpose::Export);
                    qualify_field(&stringify_value(&value))
                })
                .collect::<Vec<_>>()
                .join(",");
            lines.push(line);
        }

        lines.join(self.line_ending.as_str())
    }
}

/// Wrap a field in double quotes, doubling any quotes inside it
pub fn qualify_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// `name` with a `.csv` extension
pub fn csv_file_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return "export.csv".to_string();
    }
    if name.to_lowercase().ends_with(".csv") {
        name.to_string()
    } else {
        format!("{}.csv", name)
    }
}

/// CSV export for a [`DataGrid`]
pub trait GridExport {
    /// Export the visible, export-enabled columns for the rows in `scope`
    fn export_csv(&self, scope: ExportScope) -> Result<CsvPayload, CsvExportError>;
}

impl<T> GridExport for DataGrid<T> {
    #[tracing::instrument(skip(self), fields(file_name = %self.export_file_name()))]
    fn export_csv(&self, scope: ExportScope) -> Result<CsvPayload, CsvExportError> {
        if !self.is_export_enabled() {
            return Err(CsvExportError::ExportDisabled);
        }

        let rows = match scope {
            ExportScope::All => self.working_rows(),
            ExportScope::Selected => {
                let selected = self.selected_rows();
                if selected.is_empty() {
                    return Err(CsvExportError::NothingSelected);
                }
                selected
            }
        };
        let columns = self.export_columns();

        let content = CsvSerializer::new()
            .with_line_ending(self.settings().export_line_ending)
            .serialize(&rows, &columns, self.columns());
        let file_name = csv_file_name(self.export_file_name());

        tracing::info!(
            "Exported {} rows and {} columns to {}",
            rows.len(),
            columns.len(),
            file_name
        );

        Ok(CsvPayload {
            file_name,
            content,
            row_count: rows.len(),
        })
    }
}

//! Export of data grid rows
//!
//! Turns the rows of a [`backoffice_grid::DataGrid`] into CSV text. The grid
//! decides which rows and columns take part; this crate only encodes them.
//!
//! # Example
//!
//! ```rust,ignore
//! use backoffice_interchange::{ExportScope, GridExport};
//!
//! let payload = grid.export_csv(ExportScope::Selected)?;
//! download(&payload.file_name, payload.content.as_bytes());
//! ```

mod csv_export;
mod value_encoding;

pub use csv_export::{
    CsvExportError, CsvPayload, CsvSerializer, ExportScope, GridExport, csv_file_name,
    qualify_field,
};
pub use value_encoding::stringify_value;

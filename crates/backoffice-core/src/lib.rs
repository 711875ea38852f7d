//! Backoffice Core - shared types for the data grid engine
//!
//! This crate provides the types every other backoffice crate depends on:
//!
//! - `CellValue` - the value an accessor extracts from a row
//! - `GridError` - configuration and settings errors
//! - `Result` - result alias over `GridError`

mod error;
mod value;

pub use error::*;
pub use value::*;

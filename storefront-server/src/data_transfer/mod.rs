//! Catalog import (CSV/XLSX) and export (CSV)

pub mod export;
pub mod import;
pub mod rows;

pub use export::export_csv;
pub use import::{ImportOptions, MAX_BATCH_SIZE, import_products, preview_import};
pub use rows::{ParsedRow, ProductImportRow, parse_rows};

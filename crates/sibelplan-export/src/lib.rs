//! SibelPlan Export
//!
//! Exports annotated plans out of the editor: a per-page CSV bill of
//! materials for the placed luminaires, and a flattened PDF where every
//! page is rasterized together with its annotation overlay.

pub mod csv;
pub mod pdf;

pub use csv::{csv_filename, export_symbols_csv, CSV_HEADER};
pub use pdf::{export_annotated_pdf, ExportError, EXPORT_PDF_FILENAME};

//! CSV snapshot export.

mod csv_export;

pub use csv_export::SnapshotExporter;

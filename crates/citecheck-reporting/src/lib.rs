pub mod export;

pub use export::{ExportFormat, export_json, export_markdown, export_results, export_text};

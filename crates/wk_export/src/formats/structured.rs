use wk_core::{Result, Snapshot};
use crate::{ExportFormat, Exporter};

/// Writes the snapshot verbatim as pretty-printed JSON.
pub struct StructuredExporter;

impl Exporter for StructuredExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Structured
    }

    fn render(&self, snapshot: &Snapshot) -> Result<String> {
        Ok(serde_json::to_string_pretty(snapshot)?)
    }
}

use wk_core::{Result, Snapshot};
use crate::{ExportFormat, Exporter};

const SEPARATOR_WIDTH: usize = 70;

/// Plain document: header, summary, every category, body and the link count.
/// Sections, link names and references are deliberately left out.
pub struct TextExporter;

impl Exporter for TextExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Text
    }

    fn render(&self, snapshot: &Snapshot) -> Result<String> {
        let rule = "=".repeat(SEPARATOR_WIDTH);
        let mut out = String::with_capacity(snapshot.full_text.len() + 1024);

        out.push_str(&format!("Title: {}\n", snapshot.title));
        out.push_str(&format!("Page ID: {}\n", snapshot.pageid));
        out.push_str(&format!("URL: {}\n", snapshot.url));
        out.push_str(&format!("Language: {}\n", snapshot.language));
        out.push_str(&format!("Retrieved: {}\n", snapshot.timestamp_iso()));
        out.push_str(&format!("{}\n\n", rule));

        out.push_str("[Summary]\n");
        out.push_str(&format!("{}\n\n", snapshot.summary));
        out.push_str(&format!("{}\n\n", rule));

        if !snapshot.categories.is_empty() {
            out.push_str("[Categories]\n");
            for category in &snapshot.categories {
                out.push_str(&format!("  - {}\n", category));
            }
            out.push_str(&format!("\n{}\n\n", rule));
        }

        out.push_str("[Full Text]\n");
        out.push_str(&format!("{}\n\n", snapshot.full_text));
        out.push_str(&format!("{}\n\n", rule));

        out.push_str("[Links]\n");
        out.push_str(&format!(
            "Internal links: {}\n\n",
            snapshot.links.internal_links_count
        ));

        Ok(out)
    }
}

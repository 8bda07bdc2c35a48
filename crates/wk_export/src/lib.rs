use async_trait::async_trait;
use futures::future::join_all;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use wk_core::{Error, Result, Snapshot};

pub mod formats;

pub use formats::{MarkdownExporter, StructuredExporter, TextExporter};

/// One concrete output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Structured,
    Markdown,
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Structured => "json",
            ExportFormat::Markdown => "md",
            ExportFormat::Text => "txt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Structured => "structured",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Text => "text",
        })
    }
}

/// The `--format` choice: one format or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FormatSelection {
    #[value(alias = "json")]
    Structured,
    #[default]
    Markdown,
    Text,
    All,
}

impl FormatSelection {
    pub fn formats(&self) -> Vec<ExportFormat> {
        match self {
            FormatSelection::Structured => vec![ExportFormat::Structured],
            FormatSelection::Markdown => vec![ExportFormat::Markdown],
            FormatSelection::Text => vec![ExportFormat::Text],
            FormatSelection::All => vec![
                ExportFormat::Markdown,
                ExportFormat::Structured,
                ExportFormat::Text,
            ],
        }
    }
}

/// Keeps alphanumerics, space, `-` and `_`; every other character becomes `_`.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn output_path(output_dir: &Path, title: &str, format: ExportFormat) -> PathBuf {
    output_dir.join(format!(
        "{}_complete.{}",
        sanitize_title(title),
        format.extension()
    ))
}

#[async_trait]
pub trait Exporter: Send + Sync {
    fn format(&self) -> ExportFormat;

    /// Renders the whole artifact without touching the filesystem.
    fn render(&self, snapshot: &Snapshot) -> Result<String>;

    /// Renders and writes `{sanitized title}_complete.{ext}` under `output_dir`.
    async fn export(&self, title: &str, snapshot: &Snapshot, output_dir: &Path) -> Result<PathBuf> {
        let format = self.format();
        let path = output_path(output_dir, title, format);
        let wrap = |source: Error| Error::Export {
            format: format.to_string(),
            path: path.clone(),
            source: Box::new(source),
        };

        let rendered = self.render(snapshot).map_err(wrap)?;
        tokio::fs::write(&path, rendered)
            .await
            .map_err(|e| wrap(e.into()))?;

        info!("✓ Saved {} to {}", format, path.display());
        Ok(path)
    }
}

pub fn exporter_for(format: ExportFormat) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Structured => Box::new(StructuredExporter),
        ExportFormat::Markdown => Box::new(MarkdownExporter),
        ExportFormat::Text => Box::new(TextExporter),
    }
}

/// Outcome of one exporter for one title.
#[derive(Debug)]
pub struct ExportReport {
    pub format: ExportFormat,
    pub result: Result<PathBuf>,
}

/// Runs every selected exporter against the same snapshot.
/// A failing exporter never prevents the others from writing.
pub async fn export_selected(
    selection: FormatSelection,
    title: &str,
    snapshot: &Snapshot,
    output_dir: &Path,
) -> Vec<ExportReport> {
    let exports = selection.formats().into_iter().map(|format| async move {
        let result = exporter_for(format).export(title, snapshot, output_dir).await;
        if let Err(e) = &result {
            error!("✗ {}", e);
        }
        ExportReport { format, result }
    });
    join_all(exports).await
}

use futures::future::{self, Future};
use futures::stream::{self, StreamExt};
use kdam::{tqdm, BarExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;
use wk_core::{Error, Result};
use wk_export::{export_selected, FormatSelection};
use crate::builder::SnapshotBuilder;
use crate::logging::Logger;

#[derive(Debug)]
pub enum TitleStatus {
    /// At least one file was written; `failures` exporters did not succeed.
    Exported { paths: Vec<PathBuf>, failures: usize },
    NotFound,
    /// Nothing was written. `export_failures` is zero when the capture itself failed.
    Failed { reason: String, export_failures: usize },
}

#[derive(Debug)]
pub struct TitleReport {
    pub title: String,
    pub status: TitleStatus,
    pub warnings: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub exported: usize,
    pub not_found: usize,
    pub failed: usize,
    pub export_failures: usize,
    /// Titles never started because the run was interrupted
    pub skipped: usize,
}

impl BatchSummary {
    fn record(&mut self, report: &TitleReport) {
        match &report.status {
            TitleStatus::Exported { failures, .. } => {
                self.exported += 1;
                self.export_failures += failures;
            }
            TitleStatus::NotFound => self.not_found += 1,
            TitleStatus::Failed { export_failures, .. } => {
                self.failed += 1;
                self.export_failures += export_failures;
            }
        }
    }

    pub fn processed(&self) -> usize {
        self.exported + self.not_found + self.failed
    }
}

/// Newline-delimited titles; surrounding whitespace trimmed, blank lines skipped.
pub fn parse_titles(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn read_titles(source: &Path) -> Result<Vec<String>> {
    match tokio::fs::read_to_string(source).await {
        Ok(raw) => Ok(parse_titles(&raw)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(Error::InputSourceMissing(source.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Captures and exports titles one snapshot at a time, up to `concurrency` in flight.
pub struct BatchRunner {
    builder: Arc<SnapshotBuilder>,
    output_dir: PathBuf,
    concurrency: usize,
}

impl BatchRunner {
    pub fn new(builder: Arc<SnapshotBuilder>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            builder,
            output_dir: output_dir.into(),
            concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Creates the output directory. Failing here is fatal for the whole run.
    pub async fn prepare_output_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        Ok(())
    }

    pub async fn process_title(&self, title: &str, selection: FormatSelection) -> TitleReport {
        self.process_logged(title, selection, &Logger::new()).await
    }

    async fn process_logged(&self, title: &str, selection: FormatSelection, logger: &Logger) -> TitleReport {
        logger.log(Level::INFO, &format!("Fetching: {}", title));

        let capture = match self.builder.build(title).await {
            Ok(Some(capture)) => capture,
            Ok(None) => {
                logger.log(Level::WARN, &format!("✗ Article '{}' not found", title));
                return TitleReport {
                    title: title.to_string(),
                    status: TitleStatus::NotFound,
                    warnings: Vec::new(),
                };
            }
            Err(e) => {
                logger.log(Level::ERROR, &format!("✗ Failed to capture '{}': {}", title, e));
                return TitleReport {
                    title: title.to_string(),
                    status: TitleStatus::Failed {
                        reason: e.to_string(),
                        export_failures: 0,
                    },
                    warnings: Vec::new(),
                };
            }
        };

        let reports = export_selected(selection, title, &capture.snapshot, &self.output_dir).await;
        let mut paths = Vec::new();
        let mut errors = Vec::new();
        for report in reports {
            match report.result {
                Ok(path) => paths.push(path),
                Err(e) => errors.push(e.to_string()),
            }
        }

        let status = if paths.is_empty() {
            logger.log(Level::ERROR, &format!("✗ No file written for '{}': {}", title, errors.join("; ")));
            TitleStatus::Failed {
                reason: errors.join("; "),
                export_failures: errors.len(),
            }
        } else {
            logger.log(Level::DEBUG, &format!("Wrote {} file(s) for '{}'", paths.len(), title));
            TitleStatus::Exported {
                paths,
                failures: errors.len(),
            }
        };
        TitleReport {
            title: title.to_string(),
            status,
            warnings: capture.warnings,
        }
    }

    pub async fn run(&self, source: &Path, selection: FormatSelection) -> Result<BatchSummary> {
        self.run_until(source, selection, future::pending::<()>()).await
    }

    /// Like [`BatchRunner::run`], but stops starting new titles once `shutdown` resolves.
    /// Titles already in flight are finished.
    pub async fn run_until<F>(&self, source: &Path, selection: FormatSelection, shutdown: F) -> Result<BatchSummary>
    where
        F: Future<Output = ()>,
    {
        let titles = read_titles(source).await?;
        self.prepare_output_dir().await?;
        Ok(self.run_titles(titles, selection, shutdown).await)
    }

    pub async fn run_titles<F>(&self, titles: Vec<String>, selection: FormatSelection, shutdown: F) -> BatchSummary
    where
        F: Future<Output = ()>,
    {
        let total = titles.len();
        let mut summary = BatchSummary {
            total,
            ..BatchSummary::default()
        };
        tracing::info!("Processing {} article(s)...", total);

        let mut bar = tqdm!(total = total, desc = "Fetching articles", unit = "article");
        let reports = stream::iter(titles.into_iter().enumerate())
            .take_until(shutdown)
            .map(|(index, title)| async move {
                let logger = Logger::new().with_prefix(format!("[{}/{}]", index + 1, total));
                self.process_logged(&title, selection, &logger).await
            })
            .buffered(self.concurrency);
        futures::pin_mut!(reports);

        while let Some(report) = reports.next().await {
            summary.record(&report);
            if let Err(e) = bar.update(1) {
                tracing::debug!("Progress bar update failed: {}", e);
            }
        }
        eprintln!();

        summary.skipped = total - summary.processed();
        if summary.skipped > 0 {
            tracing::warn!("Interrupted: {} of {} article(s) were not started", summary.skipped, total);
        }
        tracing::info!(
            "Done! {} exported, {} not found, {} failed ({} export error(s))",
            summary.exported,
            summary.not_found,
            summary.failed,
            summary.export_failures
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wk_core::Config;
    use wk_providers::{MemoryPage, MemoryProvider};

    async fn runner(dir: &Path) -> BatchRunner {
        let provider = MemoryProvider::new();
        provider
            .insert("ja", MemoryPage::new("Rust", 1u64).with_text("Summary", "Body"))
            .await;
        provider
            .insert("ja", MemoryPage::new("Go", 2u64).with_text("Summary", "Body"))
            .await;
        let builder = SnapshotBuilder::new(Arc::new(provider), &Config::default());
        BatchRunner::new(Arc::new(builder), dir)
    }

    fn titles_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_titles_skips_blank_lines() {
        assert_eq!(
            parse_titles("Rust\n\n  \n Go \r\nC++\n"),
            vec!["Rust", "Go", "C++"]
        );
    }

    #[tokio::test]
    async fn test_not_found_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let input = titles_file("Test Article\n\nRust\n");

        let summary = runner(dir.path())
            .await
            .run(input.path(), FormatSelection::Markdown)
            .await
            .unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.not_found, 1);
        assert_eq!(summary.exported, 1);
        assert!(dir.path().join("Rust_complete.md").exists());
        assert!(!dir.path().join("Test Article_complete.md").exists());
    }

    #[tokio::test]
    async fn test_missing_input_source() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out");
        let result = runner(&output)
            .await
            .run(&dir.path().join("missing.txt"), FormatSelection::All)
            .await;

        assert!(matches!(result, Err(Error::InputSourceMissing(_))));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_all_formats_for_each_title() {
        let dir = tempfile::tempdir().unwrap();
        let input = titles_file("Rust\nGo\n");
        let summary = runner(dir.path())
            .await
            .with_concurrency(2)
            .run(input.path(), FormatSelection::All)
            .await
            .unwrap();

        assert_eq!(summary.exported, 2);
        assert_eq!(summary.export_failures, 0);
        for stem in ["Rust", "Go"] {
            for ext in ["json", "md", "txt"] {
                assert!(dir.path().join(format!("{}_complete.{}", stem, ext)).exists());
            }
        }
    }

    #[tokio::test]
    async fn test_shutdown_stops_enqueueing() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(dir.path()).await;
        let summary = runner
            .run_titles(
                vec!["Rust".to_string(), "Go".to_string()],
                FormatSelection::Text,
                future::ready(()),
            )
            .await;

        assert_eq!(summary.processed(), 0);
        assert_eq!(summary.skipped, 2);
        assert!(!dir.path().join("Rust_complete.txt").exists());
    }

    #[tokio::test]
    async fn test_blocked_outputs_count_as_export_failures() {
        let dir = tempfile::tempdir().unwrap();
        for ext in ["json", "md", "txt"] {
            std::fs::create_dir(dir.path().join(format!("Rust_complete.{}", ext))).unwrap();
        }

        let summary = runner(dir.path())
            .await
            .run_titles(vec!["Rust".to_string()], FormatSelection::All, future::pending::<()>())
            .await;

        assert_eq!(summary.exported, 0);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.export_failures, 3);
    }

    #[tokio::test]
    async fn test_process_single_title() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(dir.path()).await;
        runner.prepare_output_dir().await.unwrap();

        let report = runner.process_title("Go", FormatSelection::Structured).await;
        match report.status {
            TitleStatus::Exported { paths, failures } => {
                assert_eq!(failures, 0);
                assert_eq!(paths, vec![dir.path().join("Go_complete.json")]);
            }
            other => panic!("unexpected status: {:?}", other),
        }

        let report = runner.process_title("Nope", FormatSelection::Structured).await;
        assert!(matches!(report.status, TitleStatus::NotFound));
    }
}

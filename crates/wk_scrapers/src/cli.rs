use clap::Args;
use futures::future::{self, Future};
use std::path::PathBuf;
use std::sync::Arc;
use wk_core::{Config, ContentProvider, Error, Result};
use wk_export::FormatSelection;
use crate::builder::SnapshotBuilder;
use crate::manager::{BatchRunner, BatchSummary};

#[derive(Args, Debug, Clone)]
pub struct ScraperArgs {
    /// Title of the article to capture
    pub title: Option<String>,

    /// Text file with one article title per line
    #[arg(long, value_name = "FILE")]
    pub inputs: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = FormatSelection::Markdown)]
    pub format: FormatSelection,

    /// Language code of the Wikipedia edition (defaults to the configured language)
    #[arg(long)]
    pub lang: Option<String>,

    /// Directory the files are written to
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of articles processed at the same time
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl ScraperArgs {
    pub fn has_target(&self) -> bool {
        self.title.is_some() || self.inputs.is_some()
    }

    /// Applies command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(lang) = &self.lang {
            config.language = lang.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
    }
}

pub async fn handle_command(
    args: ScraperArgs,
    config: &Config,
    provider: Arc<dyn ContentProvider>,
) -> Result<BatchSummary> {
    handle_command_until(args, config, provider, future::pending::<()>()).await
}

/// A batch file takes precedence over a single title.
pub async fn handle_command_until<F>(
    args: ScraperArgs,
    config: &Config,
    provider: Arc<dyn ContentProvider>,
    shutdown: F,
) -> Result<BatchSummary>
where
    F: Future<Output = ()>,
{
    let builder = Arc::new(SnapshotBuilder::new(provider, config));
    let runner = BatchRunner::new(builder, config.output_dir.clone())
        .with_concurrency(config.concurrency);

    if let Some(inputs) = &args.inputs {
        return runner.run_until(inputs, args.format, shutdown).await;
    }

    let title = args
        .title
        .ok_or_else(|| Error::Config("an article title or --inputs is required".to_string()))?;
    runner.prepare_output_dir().await?;
    let summary = runner.run_titles(vec![title], args.format, shutdown).await;
    Ok(summary)
}

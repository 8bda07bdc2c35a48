use anyhow::Context;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use tracing::{info, warn};
use wk_core::Config;
use wk_scrapers::logging::init_logging;
use wk_scrapers::{handle_command_until, ScraperArgs};

const EXAMPLES: &str = "\
Examples:
  # Capture one article as Markdown (default)
  wikisnap \"Python\"

  # Capture one article as JSON
  wikisnap \"機械学習\" --format structured

  # Write every format
  wikisnap \"Python\" --format all

  # Capture every title listed in a file
  wikisnap --inputs keywords.txt

  # Read from the English edition
  wikisnap \"Python\" --lang en";

/// Captures Wikipedia articles (summary, text, categories, sections, links) to files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, after_help = EXAMPLES)]
pub struct Cli {
    #[command(flatten)]
    scraper: ScraperArgs,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    cli.scraper.apply(&mut config);
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !cli.scraper.has_target() {
        Cli::command().print_help()?;
        eprintln!("\nerror: pass an article title or --inputs <FILE>");
        return Ok(());
    }

    let config = load_config(&cli)?;
    let provider = wk_providers::create_provider(&config)?;
    info!(
        "🌐 Using {} ({}), writing to {}",
        provider.name(),
        config.language,
        config.output_dir.display()
    );

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing articles already in progress");
        }
    };

    let summary = handle_command_until(cli.scraper, &config, provider, shutdown)
        .await
        .context("wikisnap run failed")?;

    if summary.exported == 0 && summary.total > 0 {
        warn!("No article was exported");
    }
    Ok(())
}

use std::sync::Once;
use tracing::Level;

static INIT: Once = Once::new();

/// Per-title log context. Every line is tagged with the title's position in
/// the batch, e.g. `[3/10]`.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    tags: Vec<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    fn line(&self, message: &str) -> String {
        if self.tags.is_empty() {
            return message.to_string();
        }
        format!("{} {}", self.tags.join(" "), message)
    }

    /// `tracing` macros take their level at compile time.
    pub fn log(&self, level: Level, message: &str) {
        let line = self.line(message);
        match level {
            Level::ERROR => tracing::error!("{}", line),
            Level::WARN => tracing::warn!("{}", line),
            Level::INFO => tracing::info!("{}", line),
            Level::DEBUG => tracing::debug!("{}", line),
            _ => tracing::trace!("{}", line),
        }
    }
}

/// Installs the global `fmt` subscriber once; later calls are no-ops.
pub fn init_logging(verbose: bool) -> Logger {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            let level = if verbose { Level::DEBUG } else { Level::INFO };
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .init();
        });
    }
    Logger::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_stack_in_order() {
        let logger = Logger::new().with_prefix("[1/3]").with_prefix("Rust");
        assert_eq!(logger.line("saved"), "[1/3] Rust saved");
        assert_eq!(Logger::new().line("plain"), "plain");
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(false);
        init_logging(true).log(Level::INFO, "still fine");
    }
}

pub mod builder;
pub mod cli;
pub mod logging;
pub mod manager;
pub mod sections;

pub use builder::{Capture, FieldOutcome, SnapshotBuilder};
pub use cli::{handle_command, handle_command_until, ScraperArgs};
pub use manager::{BatchRunner, BatchSummary, TitleReport, TitleStatus};
pub use sections::SectionTreeExtractor;

pub mod prelude {
    pub use super::builder::SnapshotBuilder;
    pub use super::manager::BatchRunner;
    pub use wk_core::{Result, Error, Snapshot};
}

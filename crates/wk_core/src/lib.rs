pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use provider::{ContentProvider, PageContent, PageInfo, RawSection, SectionLike};
pub use types::{Links, PageId, References, SectionNode, Snapshot};

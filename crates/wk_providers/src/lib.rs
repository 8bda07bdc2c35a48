use std::sync::Arc;
use wk_core::{Config, ContentProvider, Result};

pub mod backends;
pub mod wikitext;

pub use backends::*;

/// Builds the HTTP-backed provider every CLI run uses.
pub fn create_provider(config: &Config) -> Result<Arc<dyn ContentProvider>> {
    let provider = WikipediaProvider::new(config)?;
    tracing::debug!("Created provider {:?}", provider);
    Ok(Arc::new(provider))
}

pub mod prelude {
    pub use super::backends::*;
    pub use wk_core::{ContentProvider, PageContent, PageInfo};
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::types::PageId;
use crate::Result;

/// Metadata of a page that is known to exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub title: String,
    pub pageid: PageId,
    pub url: String,
    pub canonical_url: String,
    pub language: String,
}

/// Text of a page: lead summary, whole body and its section outline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub summary: String,
    pub full_text: String,
    pub sections: Vec<RawSection>,
}

/// A section as the provider returns it, with its own text only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSection {
    pub title: String,
    pub text: String,
    pub subsections: Vec<RawSection>,
}

impl RawSection {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            subsections: Vec::new(),
        }
    }

    pub fn with_subsection(mut self, section: RawSection) -> Self {
        self.subsections.push(section);
        self
    }
}

/// Anything shaped like a section tree node.
pub trait SectionLike {
    fn title(&self) -> &str;

    /// The node's own text, excluding subsections.
    fn text(&self) -> &str;

    fn children(&self) -> &[Self]
    where
        Self: Sized;
}

impl SectionLike for RawSection {
    fn title(&self) -> &str {
        &self.title
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn children(&self) -> &[Self] {
        &self.subsections
    }
}

#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Checks whether `title` exists in the `language` edition.
    /// Returns `Ok(None)` when the page does not exist.
    async fn resolve(&self, title: &str, language: &str) -> Result<Option<PageInfo>>;

    /// Fetches summary, full text and section tree of a resolved page
    async fn page_content(&self, page: &PageInfo) -> Result<PageContent>;

    /// Category keys, in provider order
    async fn categories(&self, page: &PageInfo) -> Result<Vec<String>>;

    /// Every internal link target, in provider order
    async fn links(&self, page: &PageInfo) -> Result<Vec<String>>;
}

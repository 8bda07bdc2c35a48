use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use wk_core::{ContentProvider, Error, PageContent, PageId, PageInfo, RawSection, Result};

/// One page held by [`MemoryProvider`].
#[derive(Debug, Clone)]
pub struct MemoryPage {
    pub title: String,
    pub pageid: PageId,
    pub summary: String,
    pub full_text: String,
    pub sections: Vec<RawSection>,
    pub categories: Vec<String>,
    pub links: Vec<String>,
    pub fail_categories: bool,
    pub fail_links: bool,
}

impl MemoryPage {
    pub fn new(title: &str, pageid: impl Into<PageId>) -> Self {
        Self {
            title: title.to_string(),
            pageid: pageid.into(),
            summary: String::new(),
            full_text: String::new(),
            sections: Vec::new(),
            categories: Vec::new(),
            links: Vec::new(),
            fail_categories: false,
            fail_links: false,
        }
    }

    pub fn with_text(mut self, summary: &str, full_text: &str) -> Self {
        self.summary = summary.to_string();
        self.full_text = full_text.to_string();
        self
    }

    pub fn with_section(mut self, section: RawSection) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.links = links.into_iter().map(Into::into).collect();
        self
    }

    /// Makes category lookups for this page fail.
    pub fn failing_categories(mut self) -> Self {
        self.fail_categories = true;
        self
    }

    /// Makes link lookups for this page fail.
    pub fn failing_links(mut self) -> Self {
        self.fail_links = true;
        self
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pages: HashMap<(String, String), MemoryPage>,
}

impl MemoryStore {
    pub fn insert(&mut self, language: &str, page: MemoryPage) {
        self.pages
            .insert((language.to_string(), page.title.clone()), page);
    }

    pub fn get(&self, language: &str, title: &str) -> Option<&MemoryPage> {
        self.pages.get(&(language.to_string(), title.to_string()))
    }
}

/// In-process provider backed by a page map, for tests and embedding.
#[derive(Clone, Default)]
pub struct MemoryProvider {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, language: &str, page: MemoryPage) {
        self.store.write().await.insert(language, page);
    }

    async fn page(&self, info: &PageInfo) -> Result<MemoryPage> {
        self.store
            .read()
            .await
            .get(&info.language, &info.title)
            .cloned()
            .ok_or_else(|| Error::NotFound(info.title.clone()))
    }
}

fn page_url(language: &str, title: &str) -> String {
    format!(
        "memory://{}/{}",
        language,
        title.replace(' ', "_")
    )
}

#[async_trait]
impl ContentProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn resolve(&self, title: &str, language: &str) -> Result<Option<PageInfo>> {
        let store = self.store.read().await;
        Ok(store.get(language, title).map(|page| PageInfo {
            title: page.title.clone(),
            pageid: page.pageid.clone(),
            url: page_url(language, &page.title),
            canonical_url: page_url(language, &page.title),
            language: language.to_string(),
        }))
    }

    async fn page_content(&self, page: &PageInfo) -> Result<PageContent> {
        let page = self.page(page).await?;
        Ok(PageContent {
            summary: page.summary,
            full_text: page.full_text,
            sections: page.sections,
        })
    }

    async fn categories(&self, page: &PageInfo) -> Result<Vec<String>> {
        let page = self.page(page).await?;
        if page.fail_categories {
            return Err(Error::Provider(format!(
                "category lookup failed for {}",
                page.title
            )));
        }
        Ok(page.categories)
    }

    async fn links(&self, page: &PageInfo) -> Result<Vec<String>> {
        let page = self.page(page).await?;
        if page.fail_links {
            return Err(Error::Provider(format!("link lookup failed for {}", page.title)));
        }
        Ok(page.links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_provider() {
        let provider = MemoryProvider::new();
        provider
            .insert(
                "en",
                MemoryPage::new("Rust", 1u64)
                    .with_text("A language.", "A language. Fast.")
                    .with_categories(["Category:Languages"])
                    .with_links(["C++", "Mozilla"]),
            )
            .await;

        assert!(provider.resolve("Rust", "ja").await.unwrap().is_none());
        assert!(provider.resolve("Missing", "en").await.unwrap().is_none());

        let info = provider.resolve("Rust", "en").await.unwrap().unwrap();
        assert_eq!(info.pageid, PageId::Numeric(1));
        assert_eq!(info.url, "memory://en/Rust");

        let content = provider.page_content(&info).await.unwrap();
        assert_eq!(content.summary, "A language.");
        assert_eq!(provider.links(&info).await.unwrap().len(), 2);
        assert_eq!(
            provider.categories(&info).await.unwrap(),
            vec!["Category:Languages".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let provider = MemoryProvider::new();
        provider
            .insert(
                "en",
                MemoryPage::new("Broken", "b-1")
                    .failing_categories()
                    .failing_links(),
            )
            .await;
        let info = provider.resolve("Broken", "en").await.unwrap().unwrap();
        assert!(matches!(provider.categories(&info).await, Err(Error::Provider(_))));
        assert!(matches!(provider.links(&info).await, Err(Error::Provider(_))));
    }
}

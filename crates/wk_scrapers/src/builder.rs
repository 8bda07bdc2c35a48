use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};
use wk_core::types::{LINK_CAP, REFERENCE_EXCERPT_CAP};
use wk_core::{Config, ContentProvider, Links, References, Result, SectionLike, Snapshot};
use crate::sections::{take_chars, SectionTreeExtractor};

/// Result of extracting one optional field. A failed extraction keeps the
/// field's empty default and carries the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOutcome<T> {
    pub value: T,
    pub degraded: bool,
    pub warning: Option<String>,
}

impl<T: Default> FieldOutcome<T> {
    pub fn from_result(field: &str, result: Result<T>) -> Self {
        match result {
            Ok(value) => Self {
                value,
                degraded: false,
                warning: None,
            },
            Err(e) => Self {
                value: T::default(),
                degraded: true,
                warning: Some(format!("{} extraction failed: {}", field, e)),
            },
        }
    }
}

/// A built snapshot plus the warnings raised while building it.
#[derive(Debug, Clone)]
pub struct Capture {
    pub snapshot: Snapshot,
    pub warnings: Vec<String>,
}

/// Keeps the first [`LINK_CAP`] links and the size of the whole set.
pub fn cap_links(all: Vec<String>) -> Links {
    let internal_links_count = all.len();
    let mut internal_links = all;
    internal_links.truncate(LINK_CAP);
    Links {
        internal_links,
        internal_links_count,
    }
}

/// Excerpt of the first top-level section whose title contains one of `keywords`.
/// Keywords are expected in lower case. A matching section with no text counts
/// as no references section at all.
pub fn find_references<S: SectionLike>(sections: &[S], keywords: &[String]) -> References {
    let Some(section) = sections.iter().find(|section| {
        let title = section.title().to_lowercase();
        keywords.iter().any(|keyword| title.contains(keyword.as_str()))
    }) else {
        return References::default();
    };

    let excerpt = take_chars(section.text(), REFERENCE_EXCERPT_CAP);
    References {
        has_references_section: !excerpt.is_empty(),
        references_text: excerpt,
    }
}

pub struct SnapshotBuilder {
    provider: Arc<dyn ContentProvider>,
    language: String,
    reference_keywords: Vec<String>,
    extractor: SectionTreeExtractor,
}

impl SnapshotBuilder {
    pub fn new(provider: Arc<dyn ContentProvider>, config: &Config) -> Self {
        Self {
            provider,
            language: config.language.clone(),
            reference_keywords: config
                .reference_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            extractor: SectionTreeExtractor::default(),
        }
    }

    /// Captures `title`. Returns `Ok(None)` when the provider has no such page.
    pub async fn build(&self, title: &str) -> Result<Option<Capture>> {
        let Some(page) = self.provider.resolve(title, &self.language).await? else {
            warn!("Article '{}' not found in {} ({})", title, self.provider.name(), self.language);
            return Ok(None);
        };
        debug!("Resolved '{}' to page {} ({})", title, page.pageid, page.url);

        let (content, categories, links) = tokio::join!(
            self.provider.page_content(&page),
            self.provider.categories(&page),
            self.provider.links(&page),
        );
        let content = content?;
        let categories = FieldOutcome::from_result("categories", categories);
        let links = FieldOutcome::from_result("links", links.map(cap_links));

        let warnings: Vec<String> = [&categories.warning, &links.warning]
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        for warning in &warnings {
            warn!("'{}': {}", title, warning);
        }

        let sections = self.extractor.extract(&content.sections);
        let references = find_references(&content.sections, &self.reference_keywords);
        debug!(
            "'{}': {} section node(s), {} categories, {}/{} links",
            title,
            sections.iter().map(|s| s.node_count()).sum::<usize>(),
            categories.value.len(),
            links.value.internal_links.len(),
            links.value.internal_links_count
        );

        let snapshot = Snapshot {
            title: page.title,
            pageid: page.pageid,
            url: page.url,
            canonical_url: page.canonical_url,
            language: page.language,
            timestamp: Utc::now(),
            summary: content.summary,
            full_text: content.full_text,
            categories: categories.value,
            sections,
            links: links.value,
            references,
            backlinks: Vec::new(),
        };
        Ok(Some(Capture { snapshot, warnings }))
    }
}

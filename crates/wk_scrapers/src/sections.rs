use tracing::warn;
use wk_core::types::{ELLIPSIS, MAX_SECTION_DEPTH, SECTION_EXCERPT_CAP};
use wk_core::{SectionLike, SectionNode};

/// First `max` characters of `text`.
pub(crate) fn take_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

/// Verbatim up to 500 characters, otherwise the first 500 plus one ellipsis.
pub fn section_excerpt(text: &str) -> String {
    if text.chars().count() <= SECTION_EXCERPT_CAP {
        return text.to_string();
    }
    let mut excerpt = take_chars(text, SECTION_EXCERPT_CAP);
    excerpt.push_str(ELLIPSIS);
    excerpt
}

/// Walks a provider's section tree into leveled [`SectionNode`]s in document order.
#[derive(Debug, Clone)]
pub struct SectionTreeExtractor {
    max_depth: usize,
}

impl Default for SectionTreeExtractor {
    fn default() -> Self {
        Self {
            max_depth: MAX_SECTION_DEPTH,
        }
    }
}

impl SectionTreeExtractor {
    /// Nodes at `max_depth - 1` keep their own text but lose their subsections.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    pub fn extract<S: SectionLike>(&self, sections: &[S]) -> Vec<SectionNode> {
        self.walk(sections, 0)
    }

    fn walk<S: SectionLike>(&self, sections: &[S], level: usize) -> Vec<SectionNode> {
        sections
            .iter()
            .map(|section| {
                let children = section.children();
                let subsections = if level + 1 < self.max_depth {
                    self.walk(children, level + 1)
                } else {
                    if !children.is_empty() {
                        warn!(
                            "Section '{}' is nested too deep, dropping {} subsection(s)",
                            section.title(),
                            children.len()
                        );
                    }
                    Vec::new()
                };
                SectionNode {
                    title: section.title().to_string(),
                    level,
                    text: section_excerpt(section.text()),
                    subsections,
                }
            })
            .collect()
    }
}

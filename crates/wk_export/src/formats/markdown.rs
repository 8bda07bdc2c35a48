use wk_core::{Result, SectionNode, Snapshot};
use crate::{ExportFormat, Exporter};

const MAX_CATEGORIES_SHOWN: usize = 20;
const MAX_LINKS_SHOWN: usize = 50;
const RULE: &str = "---\n\n";

/// Human-oriented document with a nested section outline.
pub struct MarkdownExporter;

/// One bullet per section, indented two spaces per level.
pub fn outline_lines(sections: &[SectionNode]) -> Vec<String> {
    let mut lines = Vec::new();
    for section in sections {
        lines.push(format!(
            "{}- **{}** (level {})",
            "  ".repeat(section.level),
            section.title,
            section.level
        ));
        lines.extend(outline_lines(&section.subsections));
    }
    lines
}

impl Exporter for MarkdownExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Markdown
    }

    fn render(&self, snapshot: &Snapshot) -> Result<String> {
        let mut md = String::with_capacity(snapshot.full_text.len() + 2048);

        md.push_str(&format!("# {}\n\n", snapshot.title));
        md.push_str(&format!("**Page ID**: {}  \n", snapshot.pageid));
        md.push_str(&format!("**URL**: {}  \n", snapshot.url));
        md.push_str(&format!("**Language**: {}  \n", snapshot.language));
        md.push_str(&format!("**Retrieved**: {}  \n\n", snapshot.timestamp_iso()));
        md.push_str(RULE);

        md.push_str("## Summary\n\n");
        md.push_str(&format!("{}\n\n", snapshot.summary));
        md.push_str(RULE);

        if !snapshot.categories.is_empty() {
            md.push_str("## Categories\n\n");
            for category in snapshot.categories.iter().take(MAX_CATEGORIES_SHOWN) {
                md.push_str(&format!("- {}\n", category));
            }
            if snapshot.categories.len() > MAX_CATEGORIES_SHOWN {
                md.push_str(&format!(
                    "\n({} more)\n",
                    snapshot.categories.len() - MAX_CATEGORIES_SHOWN
                ));
            }
            md.push('\n');
            md.push_str(RULE);
        }

        if !snapshot.sections.is_empty() {
            md.push_str("## Sections\n\n");
            for line in outline_lines(&snapshot.sections) {
                md.push_str(&line);
                md.push('\n');
            }
            md.push('\n');
            md.push_str(RULE);
        }

        md.push_str("## Full Text\n\n");
        md.push_str(&format!("{}\n\n", snapshot.full_text));
        md.push_str(RULE);

        let links = &snapshot.links;
        md.push_str("## Links\n\n");
        md.push_str(&format!("**Total internal links**: {}\n\n", links.internal_links_count));
        if !links.internal_links.is_empty() {
            md.push_str(&format!(
                "### Main internal links (up to {})\n\n",
                wk_core::types::LINK_CAP
            ));
            for link in links.internal_links.iter().take(MAX_LINKS_SHOWN) {
                md.push_str(&format!("- {}\n", link));
            }
            if links.internal_links.len() > MAX_LINKS_SHOWN {
                md.push_str(&format!(
                    "\n({} more)\n",
                    links.internal_links_count.saturating_sub(MAX_LINKS_SHOWN)
                ));
            }
        }
        md.push('\n');
        md.push_str(RULE);

        let references = &snapshot.references;
        if references.has_references_section {
            md.push_str("## References\n\n");
            md.push_str(&format!("{}\n\n", references.references_text));
        }

        Ok(md)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::sample_snapshot;

    #[test]
    fn test_header_and_sections() {
        let md = MarkdownExporter.render(&sample_snapshot()).unwrap();
        assert!(md.starts_with("# Rust\n\n**Page ID**: 42  \n"));
        assert!(md.contains("**Retrieved**: 2024-05-17T08:00:00.000Z"));
        assert!(md.contains("## Sections\n\n- **History** (level 0)\n  - **Mozilla years** (level 1)\n"));
        assert!(md.contains("## References\n\nKlabnik"));
        assert!(md.contains("**Total internal links**: 2"));
    }

    #[test]
    fn test_outline_indentation_follows_level() {
        let deep = SectionNode {
            title: "C".to_string(),
            level: 2,
            text: String::new(),
            subsections: vec![],
        };
        let mid = SectionNode {
            title: "B".to_string(),
            level: 1,
            text: String::new(),
            subsections: vec![deep],
        };
        let top = SectionNode {
            title: "A".to_string(),
            level: 0,
            text: String::new(),
            subsections: vec![mid],
        };
        let sibling = SectionNode {
            title: "D".to_string(),
            level: 0,
            text: String::new(),
            subsections: vec![],
        };
        assert_eq!(
            outline_lines(&[top, sibling]),
            vec![
                "- **A** (level 0)",
                "  - **B** (level 1)",
                "    - **C** (level 2)",
                "- **D** (level 0)",
            ]
        );
    }

    #[test]
    fn test_link_listing_is_limited() {
        let mut snapshot = sample_snapshot();
        snapshot.links.internal_links = (0..100).map(|i| format!("Link {}", i)).collect();
        snapshot.links.internal_links_count = 150;

        let md = MarkdownExporter.render(&snapshot).unwrap();
        assert!(md.contains("**Total internal links**: 150"));
        assert!(md.contains("- Link 49\n"));
        assert!(!md.contains("- Link 50\n"));
        assert!(md.contains("(100 more)"));
    }

    #[test]
    fn test_categories_are_limited() {
        let mut snapshot = sample_snapshot();
        snapshot.categories = (0..25).map(|i| format!("Category:{}", i)).collect();
        let md = MarkdownExporter.render(&snapshot).unwrap();
        assert!(md.contains("- Category:19\n"));
        assert!(!md.contains("- Category:20\n"));
        assert!(md.contains("(5 more)"));
    }

    #[test]
    fn test_empty_optional_blocks_are_omitted() {
        let mut snapshot = sample_snapshot();
        snapshot.categories.clear();
        snapshot.sections.clear();
        snapshot.links = Default::default();
        snapshot.references = Default::default();

        let md = MarkdownExporter.render(&snapshot).unwrap();
        assert!(!md.contains("## Categories"));
        assert!(!md.contains("## Sections"));
        assert!(!md.contains("### Main internal links"));
        assert!(!md.contains("## References"));
        assert!(md.contains("**Total internal links**: 0"));
    }
}

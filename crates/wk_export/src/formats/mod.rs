pub mod markdown;
pub mod structured;
pub mod text;

pub use markdown::MarkdownExporter;
pub use structured::StructuredExporter;
pub use text::TextExporter;

#[cfg(test)]
pub(crate) fn sample_snapshot() -> wk_core::Snapshot {
    use chrono::{TimeZone, Utc};
    use wk_core::{Links, PageId, References, SectionNode, Snapshot};

    Snapshot {
        title: "Rust".to_string(),
        pageid: PageId::Numeric(42),
        url: "https://en.wikipedia.org/wiki/Rust".to_string(),
        canonical_url: "https://en.wikipedia.org/wiki/Rust_(programming_language)".to_string(),
        language: "en".to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 5, 17, 8, 0, 0).unwrap(),
        summary: "Rust is a systems programming language.".to_string(),
        full_text: "Rust is a systems programming language.\nHistory\nStarted in 2006.".to_string(),
        categories: vec![
            "Category:Programming languages".to_string(),
            "Category:Mozilla".to_string(),
        ],
        sections: vec![SectionNode {
            title: "History".to_string(),
            level: 0,
            text: "Started in 2006.".to_string(),
            subsections: vec![SectionNode {
                title: "Mozilla years".to_string(),
                level: 1,
                text: "Sponsored by Mozilla.".to_string(),
                subsections: vec![],
            }],
        }],
        links: Links {
            internal_links: vec!["C++".to_string(), "Go".to_string()],
            internal_links_count: 2,
        },
        references: References {
            has_references_section: true,
            references_text: "Klabnik, Steve. The Rust Programming Language.".to_string(),
        },
        backlinks: vec![],
    }
}

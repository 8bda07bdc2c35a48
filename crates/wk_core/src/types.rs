use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Maximum number of internal links kept in a snapshot.
pub const LINK_CAP: usize = 100;
/// Maximum number of characters kept from a references section.
pub const REFERENCE_EXCERPT_CAP: usize = 1000;
/// Maximum number of characters kept from a section's own text.
pub const SECTION_EXCERPT_CAP: usize = 500;
/// Appended to a section excerpt that was cut at [`SECTION_EXCERPT_CAP`].
pub const ELLIPSIS: &str = "...";
/// Nesting depth past which subsections are dropped.
pub const MAX_SECTION_DEPTH: usize = 64;

/// Page identifiers are numeric on MediaWiki but opaque for other providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageId {
    Numeric(u64),
    Opaque(String),
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageId::Numeric(id) => write!(f, "{}", id),
            PageId::Opaque(id) => f.write_str(id),
        }
    }
}

impl From<u64> for PageId {
    fn from(id: u64) -> Self {
        PageId::Numeric(id)
    }
}

impl From<&str> for PageId {
    fn from(id: &str) -> Self {
        PageId::Opaque(id.to_string())
    }
}

/// A complete capture of one article, built once and shared read-only by every exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub title: String,
    pub pageid: PageId,
    pub url: String,
    pub canonical_url: String,
    pub language: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub summary: String,
    pub full_text: String,
    pub categories: Vec<String>,
    pub sections: Vec<SectionNode>,
    pub links: Links,
    pub references: References,
    pub backlinks: Vec<String>,
}

impl Snapshot {
    /// The capture time as every output format prints it.
    pub fn timestamp_iso(&self) -> String {
        format_timestamp(&self.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionNode {
    pub title: String,
    pub level: usize,
    pub text: String,
    pub subsections: Vec<SectionNode>,
}

impl SectionNode {
    /// Number of nodes in this subtree, the node itself included.
    pub fn node_count(&self) -> usize {
        1 + self.subsections.iter().map(SectionNode::node_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    pub internal_links: Vec<String>,
    pub internal_links_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct References {
    pub has_references_section: bool,
    pub references_text: String,
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(timestamp))
}

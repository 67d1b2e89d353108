//! Work items derived from a project's specification text
//!
//! A specification such as `"[2x Post + 1x Carrousel 4p] spring launch"` is
//! expanded into an ordered list of [`WorkItemSpec`]s, each with a unique
//! label (`Post 1`, `Post 2`, `Carrousel 1`). Items are never stored: they are
//! regenerated from the text on every read.
//!
//! - [`parser`]: the bracketed mini-language
//! - [`pricing`]: the price of each item

pub mod parser;
pub mod pricing;

pub use parser::{parse_specification, ParseOutcome, ParsedSpecification, SpecificationParser};
pub use pricing::PriceList;

use serde::{Deserialize, Serialize};

/// Canonical item type, without per-item data.
///
/// The declaration order is the canonical ordering of items in a parsed
/// specification: posts, then carousels, then miniatures, then logos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Post,
    Carousel,
    Miniature,
    Logo,
}

impl ItemType {
    /// All types in canonical order.
    pub const ORDER: [ItemType; 4] = [
        ItemType::Post,
        ItemType::Carousel,
        ItemType::Miniature,
        ItemType::Logo,
    ];

    /// Name used when building item labels.
    pub fn display_name(&self) -> &'static str {
        match self {
            ItemType::Post => "Post",
            ItemType::Carousel => "Carrousel",
            ItemType::Miniature => "Miniature",
            ItemType::Logo => "Logo",
        }
    }

    /// Map a type token from a specification (case-insensitive).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "post" | "posts" => Some(ItemType::Post),
            "carousel" | "carousels" | "carrousel" | "carrousels" => Some(ItemType::Carousel),
            "miniature" | "miniatures" | "thumbnail" | "thumbnails" => Some(ItemType::Miniature),
            "logo" | "logos" => Some(ItemType::Logo),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The kind of a work item, carrying the data only carousels have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkItemKind {
    Post,
    Miniature,
    Logo,
    Carousel { pages: Option<u32> },
}

impl WorkItemKind {
    pub fn item_type(&self) -> ItemType {
        match self {
            WorkItemKind::Post => ItemType::Post,
            WorkItemKind::Miniature => ItemType::Miniature,
            WorkItemKind::Logo => ItemType::Logo,
            WorkItemKind::Carousel { .. } => ItemType::Carousel,
        }
    }
}

/// One billable unit of design work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemSpec {
    pub kind: WorkItemKind,
    /// 1-based position among items of the same type
    pub sequence_index: u32,
    /// Unique within a project, e.g. "Post 2"
    pub label: String,
}

impl WorkItemSpec {
    pub fn new(kind: WorkItemKind, sequence_index: u32) -> Self {
        let label = format!("{} {}", kind.item_type().display_name(), sequence_index);
        Self {
            kind,
            sequence_index,
            label,
        }
    }

    pub fn item_type(&self) -> ItemType {
        self.kind.item_type()
    }

    /// Page count; only carousels have one.
    pub fn page_count(&self) -> Option<u32> {
        match self.kind {
            WorkItemKind::Carousel { pages } => pages,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tokens_are_case_insensitive() {
        assert_eq!(ItemType::from_token("POST"), Some(ItemType::Post));
        assert_eq!(ItemType::from_token("Carousel"), Some(ItemType::Carousel));
        assert_eq!(ItemType::from_token("carrousels"), Some(ItemType::Carousel));
        assert_eq!(ItemType::from_token("Thumbnail"), Some(ItemType::Miniature));
        assert_eq!(ItemType::from_token("Logos"), Some(ItemType::Logo));
        assert_eq!(ItemType::from_token("reel"), None);
    }

    #[test]
    fn test_canonical_order() {
        let mut types = vec![
            ItemType::Logo,
            ItemType::Miniature,
            ItemType::Post,
            ItemType::Carousel,
        ];
        types.sort();
        assert_eq!(types, ItemType::ORDER.to_vec());
    }

    #[test]
    fn test_labels_and_page_count() {
        let carousel = WorkItemSpec::new(WorkItemKind::Carousel { pages: Some(6) }, 2);
        assert_eq!(carousel.label, "Carrousel 2");
        assert_eq!(carousel.page_count(), Some(6));

        let post = WorkItemSpec::new(WorkItemKind::Post, 1);
        assert_eq!(post.label, "Post 1");
        assert_eq!(post.page_count(), None);
    }
}

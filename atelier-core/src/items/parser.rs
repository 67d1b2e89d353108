//! Specification mini-language parser
//!
//! Grammar of the bracketed prefix (whitespace between tokens is ignored):
//!
//! ```text
//! specification := "[" segment ("+" segment)* "]" free-text?
//! segment       := count "x" type-name (page-count "p")?
//! ```
//!
//! Type names are case-insensitive and accept variants (`Carousel` and
//! `Carrousel`, singular and plural). A page count is only legal on carousels.
//!
//! ## Resilience
//!
//! Parsing never fails. Text without a bracketed prefix yields no items, and
//! a prefix whose contents are malformed yields no items plus a
//! [`ParseOutcome::Malformed`] reason the caller can count.
//!
//! ## Ordering
//!
//! Segments are grouped by type and emitted in [`ItemType::ORDER`]; items of
//! one type are numbered from 1 across all segments of that type, in source
//! order. `[1x Logo + 2x Post + 1x Post]` gives `Post 1, Post 2, Post 3, Logo 1`.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::{ItemType, WorkItemKind, WorkItemSpec};

const PREFIX_PATTERN: &str = r"(?s)^\s*\[([^\[\]]*)\](.*)$";
const SEGMENT_PATTERN: &str = r"(?i)^\s*(\d+)\s*x\s*(\p{L}+)\s*(?:(\d+)\s*p)?\s*$";

/// Default cap on items of a single type.
pub const DEFAULT_MAX_ITEMS_PER_TYPE: u32 = 500;

fn prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PREFIX_PATTERN).expect("prefix pattern compiles"))
}

fn segment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SEGMENT_PATTERN).expect("segment pattern compiles"))
}

/// How the specification text was interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ParseOutcome {
    /// A well-formed bracketed prefix was found
    Parsed,
    /// Empty text, or text without a bracketed prefix
    NoSpecification,
    /// A bracketed prefix was found but could not be interpreted
    Malformed { reason: String },
}

/// Items extracted from a specification, plus whatever text followed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedSpecification {
    pub items: Vec<WorkItemSpec>,
    /// Free prose after the bracketed prefix (or the whole text when there is none)
    pub residual: String,
    pub outcome: ParseOutcome,
}

impl ParsedSpecification {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self.outcome, ParseOutcome::Malformed { .. })
    }

    /// Look up an item by its label.
    pub fn item(&self, label: &str) -> Option<&WorkItemSpec> {
        self.items.iter().find(|item| item.label == label)
    }
}

struct Segment {
    item_type: ItemType,
    count: u32,
    pages: Option<u32>,
}

/// Parser for project specifications.
#[derive(Debug, Clone)]
pub struct SpecificationParser {
    max_items_per_type: u32,
}

impl Default for SpecificationParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITEMS_PER_TYPE)
    }
}

impl SpecificationParser {
    /// Create a parser rejecting specifications with more than
    /// `max_items_per_type` items of one type.
    pub fn new(max_items_per_type: u32) -> Self {
        Self {
            max_items_per_type: max_items_per_type.max(1),
        }
    }

    /// Parse a specification text into its ordered item list.
    pub fn parse(&self, text: &str) -> ParsedSpecification {
        let Some(caps) = prefix_regex().captures(text) else {
            return ParsedSpecification {
                items: Vec::new(),
                residual: text.trim().to_string(),
                outcome: ParseOutcome::NoSpecification,
            };
        };

        let body = caps.get(1).map_or("", |m| m.as_str());
        let residual = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();

        match self.parse_body(body) {
            Ok(items) => ParsedSpecification {
                items,
                residual,
                outcome: ParseOutcome::Parsed,
            },
            Err(reason) => {
                tracing::debug!(body, reason = %reason, "Malformed specification prefix");
                ParsedSpecification {
                    items: Vec::new(),
                    residual,
                    outcome: ParseOutcome::Malformed { reason },
                }
            }
        }
    }

    fn parse_body(&self, body: &str) -> Result<Vec<WorkItemSpec>, String> {
        let segments = body
            .split('+')
            .map(parse_segment)
            .collect::<Result<Vec<_>, _>>()?;

        let mut items = Vec::new();
        for item_type in ItemType::ORDER {
            let of_type: Vec<&Segment> = segments
                .iter()
                .filter(|s| s.item_type == item_type)
                .collect();

            let total: u64 = of_type.iter().map(|s| u64::from(s.count)).sum();
            if total > u64::from(self.max_items_per_type) {
                return Err(format!(
                    "{total} {item_type} items exceed the limit of {}",
                    self.max_items_per_type
                ));
            }

            let mut index = 0u32;
            for segment in of_type {
                for _ in 0..segment.count {
                    index += 1;
                    items.push(WorkItemSpec::new(kind_for(item_type, segment.pages), index));
                }
            }
        }

        Ok(items)
    }
}

fn parse_segment(raw: &str) -> Result<Segment, String> {
    let caps = segment_regex()
        .captures(raw)
        .ok_or_else(|| format!("unrecognised segment {:?}", raw.trim()))?;

    let count: u32 = caps[1]
        .parse()
        .map_err(|_| format!("count out of range in {:?}", raw.trim()))?;

    let item_type =
        ItemType::from_token(&caps[2]).ok_or_else(|| format!("unknown item type {:?}", &caps[2]))?;

    let pages = match caps.get(3) {
        None => None,
        Some(_) if item_type != ItemType::Carousel => {
            return Err(format!(
                "page count is only valid for carousels, found on {item_type}"
            ));
        }
        Some(m) => Some(
            m.as_str()
                .parse::<u32>()
                .map_err(|_| format!("page count out of range in {:?}", raw.trim()))?,
        ),
    };

    Ok(Segment {
        item_type,
        count,
        pages,
    })
}

fn kind_for(item_type: ItemType, pages: Option<u32>) -> WorkItemKind {
    match item_type {
        ItemType::Post => WorkItemKind::Post,
        ItemType::Carousel => WorkItemKind::Carousel { pages },
        ItemType::Miniature => WorkItemKind::Miniature,
        ItemType::Logo => WorkItemKind::Logo,
    }
}

/// Parse with the default item cap.
pub fn parse_specification(text: &str) -> ParsedSpecification {
    SpecificationParser::default().parse(text)
}

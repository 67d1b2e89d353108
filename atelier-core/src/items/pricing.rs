//! Item pricing
//!
//! Posts, miniatures and logos cost one unit price. A carousel costs one
//! unit per two pages, `(pages / 2) * unit`, with the configured rounding
//! applied to the item price. A carousel with no page count costs one unit.

use crate::config::{CarouselRounding, PricingConfig};

use super::{WorkItemKind, WorkItemSpec};

/// Prices work items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceList {
    pub unit_price: f64,
    pub carousel_rounding: CarouselRounding,
}

impl Default for PriceList {
    fn default() -> Self {
        Self::from_config(&PricingConfig::default())
    }
}

impl PriceList {
    pub fn from_config(config: &PricingConfig) -> Self {
        Self {
            unit_price: config.unit_price,
            carousel_rounding: config.carousel_rounding,
        }
    }

    /// Price of a single item.
    pub fn price(&self, item: &WorkItemSpec) -> f64 {
        match item.kind {
            WorkItemKind::Post | WorkItemKind::Miniature | WorkItemKind::Logo => self.unit_price,
            WorkItemKind::Carousel { pages: None } => self.unit_price,
            WorkItemKind::Carousel { pages: Some(pages) } => self
                .carousel_rounding
                .apply(f64::from(pages) / 2.0 * self.unit_price),
        }
    }

    /// Sum of item prices; 0 for an empty list.
    pub fn total(&self, items: &[WorkItemSpec]) -> f64 {
        items.iter().map(|item| self.price(item)).sum()
    }
}

use tracing::info;

use crate::parser::fields::{clean_location, clean_price, clean_shipping};
use crate::record::{CleanedRecord, RawRecord};

/// Title of the promo tile eBay mixes into result lists.
const PLACEHOLDER_TITLE: &str = "shop on ebay";

/// Absent values per output column after cleaning. `title` counts empty
/// titles, `shipping` counts the raw text, the rest count cleaned values.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NullCounts {
    pub title: usize,
    pub price: usize,
    pub location: usize,
    pub shipping: usize,
    pub link: usize,
}

fn is_placeholder(title: &str) -> bool {
    title.trim().to_lowercase() == PLACEHOLDER_TITLE
}

/// Drop placeholder rows and normalize price, location and shipping.
pub fn clean(raw: Vec<RawRecord>) -> Vec<CleanedRecord> {
    clean_with_counts(raw).0
}

pub fn clean_with_counts(raw: Vec<RawRecord>) -> (Vec<CleanedRecord>, NullCounts) {
    let before = raw.len();
    let mut counts = NullCounts::default();

    let cleaned: Vec<CleanedRecord> = raw
        .into_iter()
        .filter(|r| !is_placeholder(&r.title))
        .map(|r| {
            if r.title.trim().is_empty() {
                counts.title += 1;
            }
            if r.shipping.is_none() {
                counts.shipping += 1;
            }
            let rec = CleanedRecord {
                price: clean_price(Some(r.price.as_str())),
                location: clean_location(r.location.as_deref()),
                shipping: clean_shipping(r.shipping.as_deref()),
                title: r.title,
                link: r.link,
            };
            counts.price += rec.price.is_none() as usize;
            counts.location += rec.location.is_none() as usize;
            counts.link += rec.link.is_none() as usize;
            rec
        })
        .collect();

    info!(
        "Cleaned {} rows ({} placeholder rows dropped)",
        cleaned.len(),
        before - cleaned.len()
    );
    info!(
        title = counts.title,
        price = counts.price,
        location = counts.location,
        shipping = counts.shipping,
        link = counts.link,
        "Absent values per column"
    );

    (cleaned, counts)
}

// ── Tests ──

pub mod extract;
pub mod fields;

use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

use crate::record::RawRecord;

/// Records found on one results page, plus how many item units were seen.
pub struct PageRecords {
    pub items: usize,
    pub records: Vec<RawRecord>,
}

fn item_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("li.s-item").unwrap())
}

/// Listing item units in document order.
pub fn listing_items(doc: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    doc.select(item_selector())
}

/// Run the record extractor over every item on the page.
pub fn process_page(doc: &Html) -> PageRecords {
    let mut items = 0;
    let records = listing_items(doc)
        .inspect(|_| items += 1)
        .filter_map(extract::extract)
        .collect();
    PageRecords { items, records }
}

// ── Tests ──

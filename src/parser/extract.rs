use scraper::{ElementRef, Selector};
use std::sync::OnceLock;

use crate::record::RawRecord;

struct ItemSelectors {
    title: Selector,
    price: Selector,
    shipping: Selector,
    location: Selector,
    link: Selector,
}

fn selectors() -> &'static ItemSelectors {
    static SEL: OnceLock<ItemSelectors> = OnceLock::new();
    SEL.get_or_init(|| ItemSelectors {
        title: Selector::parse(".s-item__title").unwrap(),
        price: Selector::parse(".s-item__price").unwrap(),
        shipping: Selector::parse(".s-item__shipping").unwrap(),
        location: Selector::parse(".s-item__location").unwrap(),
        link: Selector::parse(".s-item__link").unwrap(),
    })
}

/// Pull the raw fields out of one listing item. Returns None unless both
/// title and price text are present and non-empty.
pub fn extract(item: ElementRef<'_>) -> Option<RawRecord> {
    let sel = selectors();
    let title = first_text(item, &sel.title).filter(|t| !t.is_empty())?;
    let price = first_text(item, &sel.price).filter(|t| !t.is_empty())?;

    Some(RawRecord {
        title,
        price,
        shipping: first_text(item, &sel.shipping),
        location: first_text(item, &sel.location),
        link: item
            .select(&sel.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string),
    })
}

/// Full descendant text of the first match, untrimmed.
fn first_text(item: ElementRef<'_>, selector: &Selector) -> Option<String> {
    item.select(selector).next().map(|el| el.text().collect())
}

// ── Tests ──

use regex::Regex;
use std::sync::OnceLock;

const LOCATION_PREFIX: &str = "Located in ";

fn price_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$([\d,]+\.?[\d,]*|\.[\d,]+)").unwrap())
}

fn location_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bLocated in \b").unwrap())
}

fn delivery_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\+\$(\d+(?:\.\d{1,2})?)\s*delivery").unwrap())
}

/// First `$` amount in the text, group separators removed.
/// "$1,299.00" → 1299.0, "$10.00 to $20.00" → 10.0, "Best offer" → None.
pub fn clean_price(text: Option<&str>) -> Option<f64> {
    let caps = price_re().captures(text?)?;
    let amount = caps[1].replace(',', "");
    let amount = amount.trim_end_matches('.');
    if !amount.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if amount.starts_with('.') {
        format!("0{}", amount).parse().ok()
    } else {
        amount.parse().ok()
    }
}

/// Place name after "Located in ". Text without the phrase is treated as
/// unparseable and yields None, even when it already looks like a place.
pub fn clean_location(text: Option<&str>) -> Option<String> {
    let text = text?;
    if !location_re().is_match(text) {
        return None;
    }
    Some(text.replace(LOCATION_PREFIX, "").trim().to_string())
}

/// Shipping cost: anything mentioning "Free" is 0.0, otherwise a
/// "+$4.99 delivery" style fee.
pub fn clean_shipping(text: Option<&str>) -> Option<f64> {
    let text = text?;
    if text.contains("Free") {
        return Some(0.0);
    }
    let caps = delivery_re().captures(text)?;
    caps[1].parse().ok()
}

// ── Tests ──

use serde::{Deserialize, Serialize};

/// Row types that know their CSV header, so an empty table still gets one.
pub trait CsvRow: Serialize {
    const HEADERS: &'static [&'static str];
}

/// One listing as found on a results page. Title and price are always present;
/// items missing either never become a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawRecord {
    pub title: String,
    pub price: String,
    pub shipping: Option<String>,
    pub location: Option<String>,
    pub link: Option<String>,
}

/// A listing after normalization, in output column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CleanedRecord {
    pub title: String,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub shipping: Option<f64>,
    pub link: Option<String>,
}

impl CsvRow for RawRecord {
    const HEADERS: &'static [&'static str] = &["Title", "Price", "Shipping", "Location", "Link"];
}

impl CsvRow for CleanedRecord {
    const HEADERS: &'static [&'static str] = &["Title", "Price", "Location", "Shipping", "Link"];
}

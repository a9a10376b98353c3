use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::record::CsvRow;

/// Header row, then one row per record. Absent values become empty fields.
pub fn write_csv<W: Write, T: CsvRow>(writer: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(T::HEADERS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a table to `path`, creating parent directories.
pub fn save_csv<T: CsvRow>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    write_csv(BufWriter::new(file), rows).with_context(|| format!("Failed to write {:?}", path))
}

/// Parse a CSV table with the same header layout `save_csv` writes.
pub fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut rdr =
        csv::Reader::from_path(path).with_context(|| format!("Failed to open {:?}", path))?;
    let rows = rdr
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| format!("Failed to parse {:?}", path))?;
    Ok(rows)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CleanedRecord, RawRecord};

    fn to_string<T: CsvRow>(rows: &[T]) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, rows).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn cleaned_rows_with_blanks() {
        let rows = vec![
            CleanedRecord {
                title: "Widget A".into(),
                price: Some(9.99),
                location: Some("NY".into()),
                shipping: Some(0.0),
                link: Some("/itm/1".into()),
            },
            CleanedRecord {
                title: "Hub, 7-in-1".into(),
                price: None,
                location: None,
                shipping: None,
                link: None,
            },
        ];
        assert_eq!(
            to_string(&rows),
            "Title,Price,Location,Shipping,Link\n\
             Widget A,9.99,NY,0.0,/itm/1\n\
             \"Hub, 7-in-1\",,,,\n"
        );
    }

    #[test]
    fn empty_table_still_has_header() {
        let rows: Vec<CleanedRecord> = Vec::new();
        assert_eq!(to_string(&rows), "Title,Price,Location,Shipping,Link\n");
    }

    #[test]
    fn raw_rows_keep_source_column_order() {
        let rows = vec![RawRecord {
            title: "Widget".into(),
            price: "$5.00".into(),
            shipping: Some("Free Shipping".into()),
            location: None,
            link: Some("/itm/9".into()),
        }];
        assert_eq!(
            to_string(&rows),
            "Title,Price,Shipping,Location,Link\nWidget,$5.00,Free Shipping,,/itm/9\n"
        );
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("listing_scraper_csv_{}", std::process::id()));
        let path = dir.join("nested").join("results.csv");
        let rows = vec![CleanedRecord {
            title: "Widget A".into(),
            price: Some(9.99),
            location: None,
            shipping: Some(4.5),
            link: Some("/itm/1".into()),
        }];

        save_csv(&path, &rows).unwrap();
        let back: Vec<CleanedRecord> = load_csv(&path).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(back, rows);
    }
}

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::record::CleanedRecord;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS listings (
            id          INTEGER PRIMARY KEY,
            search_term TEXT NOT NULL,
            title       TEXT NOT NULL,
            price       REAL,
            location    TEXT,
            shipping    REAL,
            link        TEXT,
            scraped_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_listings_term ON listings(search_term);
        ",
    )?;
    Ok(())
}

// ── Saving ──

pub fn save_listings(conn: &Connection, search_term: &str, rows: &[CleanedRecord]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO listings (search_term, title, price, location, shipping, link)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for r in rows {
            count += stmt.execute(params![
                search_term,
                r.title,
                r.price,
                r.location,
                r.shipping,
                r.link,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

// ── Reading ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoredListing {
    pub id: i64,
    pub search_term: String,
    #[serde(flatten)]
    pub record: CleanedRecord,
    pub scraped_at: String,
}

pub fn fetch_listings(
    conn: &Connection,
    search_term: Option<&str>,
    limit: usize,
) -> Result<Vec<StoredListing>> {
    let mut stmt = conn.prepare(
        "SELECT id, search_term, title, price, location, shipping, link, scraped_at
         FROM listings
         WHERE (?1 IS NULL OR search_term = ?1)
         ORDER BY id
         LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(params![search_term, limit as i64], |row| {
            Ok(StoredListing {
                id: row.get(0)?,
                search_term: row.get(1)?,
                record: CleanedRecord {
                    title: row.get(2)?,
                    price: row.get(3)?,
                    location: row.get(4)?,
                    shipping: row.get(5)?,
                    link: row.get(6)?,
                },
                scraped_at: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub struct ListingStats {
    pub total: i64,
    pub priced: i64,
    pub min_price: Option<f64>,
    pub avg_price: Option<f64>,
    pub max_price: Option<f64>,
    pub free_shipping: i64,
}

pub fn get_stats(conn: &Connection, search_term: Option<&str>) -> Result<ListingStats> {
    let stats = conn.query_row(
        "SELECT COUNT(*), COUNT(price), MIN(price), AVG(price), MAX(price),
                COALESCE(SUM(shipping = 0.0), 0)
         FROM listings
         WHERE (?1 IS NULL OR search_term = ?1)",
        params![search_term],
        |row| {
            Ok(ListingStats {
                total: row.get(0)?,
                priced: row.get(1)?,
                min_price: row.get(2)?,
                avg_price: row.get(3)?,
                max_price: row.get(4)?,
                free_shipping: row.get(5)?,
            })
        },
    )?;
    Ok(stats)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(title: &str, price: Option<f64>, shipping: Option<f64>) -> CleanedRecord {
        CleanedRecord {
            title: title.to_string(),
            price,
            location: None,
            shipping,
            link: None,
        }
    }

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn save_and_fetch_in_order() {
        let conn = memory_db();
        let rows = vec![
            CleanedRecord {
                title: "Widget A".into(),
                price: Some(9.99),
                location: Some("NY".into()),
                shipping: Some(0.0),
                link: Some("/itm/1".into()),
            },
            rec("Widget B", None, None),
        ];
        assert_eq!(save_listings(&conn, "widget", &rows).unwrap(), 2);

        let back = fetch_listings(&conn, None, 10).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].record, rows[0]);
        assert_eq!(back[1].record, rows[1]);
        assert_eq!(back[0].search_term, "widget");
        assert!(!back[0].scraped_at.is_empty());
    }

    #[test]
    fn fetch_filters_and_limits() {
        let conn = memory_db();
        save_listings(&conn, "widget", &[rec("W1", None, None), rec("W2", None, None)]).unwrap();
        save_listings(&conn, "hub", &[rec("H1", None, None)]).unwrap();

        let hubs = fetch_listings(&conn, Some("hub"), 10).unwrap();
        assert_eq!(hubs.len(), 1);
        assert_eq!(hubs[0].record.title, "H1");

        let first = fetch_listings(&conn, None, 2).unwrap();
        let titles: Vec<&str> = first.iter().map(|l| l.record.title.as_str()).collect();
        assert_eq!(titles, ["W1", "W2"]);
    }

    #[test]
    fn stats_aggregate() {
        let conn = memory_db();
        save_listings(
            &conn,
            "widget",
            &[
                rec("A", Some(10.0), Some(0.0)),
                rec("B", Some(30.0), Some(4.99)),
                rec("C", None, Some(0.0)),
                rec("D", Some(20.0), None),
            ],
        )
        .unwrap();
        save_listings(&conn, "hub", &[rec("H", Some(100.0), Some(0.0))]).unwrap();

        let s = get_stats(&conn, Some("widget")).unwrap();
        assert_eq!(s.total, 4);
        assert_eq!(s.priced, 3);
        assert_eq!(s.min_price, Some(10.0));
        assert_eq!(s.avg_price, Some(20.0));
        assert_eq!(s.max_price, Some(30.0));
        assert_eq!(s.free_shipping, 2);

        assert_eq!(get_stats(&conn, None).unwrap().total, 5);
    }

    #[test]
    fn json_keys_share_one_casing() {
        let conn = memory_db();
        save_listings(&conn, "widget", &[rec("A", Some(1.0), None)]).unwrap();
        let rows = fetch_listings(&conn, None, 1).unwrap();

        let value = serde_json::to_value(&rows[0]).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            ["Id", "Link", "Location", "Price", "ScrapedAt", "SearchTerm", "Shipping", "Title"]
        );
    }

    #[test]
    fn stats_on_empty_table() {
        let conn = memory_db();
        let s = get_stats(&conn, None).unwrap();
        assert_eq!(s.total, 0);
        assert_eq!(s.min_price, None);
        assert_eq!(s.avg_price, None);
        assert_eq!(s.free_shipping, 0);
    }
}

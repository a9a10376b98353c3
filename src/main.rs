use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use listing_scraper::{
    clean_with_counts, db, export, scrape, CleanedRecord, HttpFetcher, NullCounts, ScrapeOptions,
    Settings,
};

#[derive(Parser)]
#[command(name = "listing_scraper", about = "eBay search-results scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape result pages for a search term, clean them and save the table
    Scrape {
        /// Search term (prompted for when omitted)
        term: Option<String>,
        /// Number of result pages (prompted for when omitted)
        #[arg(short, long)]
        pages: Option<u32>,
        /// Cleaned CSV output path (default from settings)
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Skip writing the cleaned CSV
        #[arg(long)]
        no_csv: bool,
        /// Also write the uncleaned table here
        #[arg(long)]
        raw_csv: Option<PathBuf>,
        /// Also append the cleaned rows to the SQLite store
        #[arg(long = "db")]
        save_db: bool,
        /// Seconds to wait between pages
        #[arg(long)]
        pacing: Option<f64>,
    },
    /// Stored listings table
    Show {
        /// Only listings scraped for this term
        #[arg(short, long)]
        term: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Price and shipping summary of stored listings
    Stats {
        /// Only listings scraped for this term
        #[arg(short, long)]
        term: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    info!("Settings: {:?}", settings);

    let result = match cli.command {
        Commands::Scrape {
            term,
            pages,
            csv,
            no_csv,
            raw_csv,
            save_db,
            pacing,
        } => {
            if let Some(secs) = pacing {
                settings
                    .set_pacing_secs(secs)
                    .context("Invalid --pacing")?;
            }
            println!("\nWelcome to the eBay scraper.\n");
            let term = match term {
                Some(t) => t.trim().to_string(),
                None => prompt("Enter the search term: ")?,
            };
            let pages = match pages {
                Some(n) => n,
                None => prompt("Enter the number of pages to scrape: ")?
                    .parse()
                    .context("Number of pages must be a whole number")?,
            };
            println!("Searching for: {} on eBay", term);
            println!("Number of pages to scrape: {}", pages);
            println!("{}\n", "-".repeat(29));

            let fetcher = HttpFetcher::new(&settings)?;
            let raw = scrape(&fetcher, &term, pages, &ScrapeOptions::from_settings(&settings))?;
            println!("Scraping completed: {} listings.", raw.len());

            if let Some(path) = raw_csv {
                export::save_csv(&path, &raw)?;
                println!("Raw data saved to {}", path.display());
            }

            println!("\nCleaning the data...\n");
            let (cleaned, counts) = clean_with_counts(raw);
            print_null_counts(&counts);
            print_preview(&cleaned, 5);

            if !no_csv {
                let path = csv.unwrap_or_else(|| settings.csv_path.clone());
                export::save_csv(&path, &cleaned)?;
                println!("Data saved to {}", path.display());
            }
            if save_db {
                let conn = db::connect(&settings.db_path)?;
                db::init_schema(&conn)?;
                let n = db::save_listings(&conn, &term, &cleaned)?;
                println!("Saved {} listings to {}", n, settings.db_path.display());
            }
            Ok(())
        }
        Commands::Show { term, limit, json } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rows = db::fetch_listings(&conn, term.as_deref(), limit)?;
            if rows.is_empty() {
                println!("No listings stored. Run 'scrape --db' first.");
                return Ok(());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }

            println!(
                "{:>4} | {:<40} | {:>9} | {:<18} | {:>8} | {:<12}",
                "#", "Title", "Price", "Location", "Shipping", "Term"
            );
            println!("{}", "-".repeat(106));
            for r in &rows {
                println!(
                    "{:>4} | {:<40} | {:>9} | {:<18} | {:>8} | {:<12}",
                    r.id,
                    truncate(&r.record.title, 40),
                    money(r.record.price),
                    truncate(r.record.location.as_deref().unwrap_or("-"), 18),
                    money(r.record.shipping),
                    truncate(&r.search_term, 12),
                );
            }
            println!("\n{} listings", rows.len());
            Ok(())
        }
        Commands::Stats { term } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn, term.as_deref())?;
            println!("Listings:      {}", s.total);
            println!("With price:    {}", s.priced);
            println!("Min price:     {}", money(s.min_price));
            println!("Avg price:     {}", money(s.avg_price));
            println!("Max price:     {}", money(s.max_price));
            println!("Free shipping: {}", s.free_shipping);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

fn print_null_counts(counts: &NullCounts) {
    println!("Absent values per column:");
    println!("  Title:    {}", counts.title);
    println!("  Price:    {}", counts.price);
    println!("  Location: {}", counts.location);
    println!("  Shipping: {}", counts.shipping);
    println!("  Link:     {}\n", counts.link);
}

fn print_preview(rows: &[CleanedRecord], n: usize) {
    for r in rows.iter().take(n) {
        println!(
            "  {:<40} {:>9} {:>8}  {}",
            truncate(&r.title, 40),
            money(r.price),
            money(r.shipping),
            r.location.as_deref().unwrap_or("-"),
        );
    }
    if rows.len() > n {
        println!("  ... {} more", rows.len() - n);
    }
    println!();
}

fn money(v: Option<f64>) -> String {
    v.map(|p| format!("${:.2}", p)).unwrap_or_else(|| "-".into())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

use anyhow::{bail, Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.ebay.com/sch/i.html";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Runtime settings. Lowest priority first: built-in defaults,
/// `listings.toml` in the working directory, `LISTINGS_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub user_agent: String,
    pub pacing_secs: f64,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::with_name("listings").required(false))
            .add_source(Environment::with_prefix("LISTINGS").try_parsing(true));
        Self::from_builder(builder)
    }

    /// Apply defaults beneath whatever sources the builder already has.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings: Settings = builder
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .set_default("pacing_secs", 4.0)?
            .set_default("timeout_secs", 30_i64)?
            .set_default("max_retries", 0_i64)?
            .set_default("retry_backoff_ms", 2000_i64)?
            .set_default("csv_path", "data/ebay_results.csv")?
            .set_default("db_path", "data/listings.sqlite")?
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }
        if Duration::try_from_secs_f64(self.pacing_secs).is_err() {
            bail!(
                "pacing_secs must be a non-negative number of seconds, got {}",
                self.pacing_secs
            );
        }
        Ok(())
    }

    /// Override the pacing, e.g. from a CLI flag. Rejects values `pacing()`
    /// could not represent.
    pub fn set_pacing_secs(&mut self, secs: f64) -> Result<()> {
        let previous = self.pacing_secs;
        self.pacing_secs = secs;
        if let Err(e) = self.validate() {
            self.pacing_secs = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_secs_f64(self.pacing_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::from_builder(Config::builder()).unwrap();
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(s.pacing(), Duration::from_secs(4));
        assert_eq!(s.max_retries, 0);
        assert_eq!(s.csv_path, PathBuf::from("data/ebay_results.csv"));
    }

    #[test]
    fn overrides_win_over_defaults() {
        let builder = Config::builder()
            .set_override("pacing_secs", 0.5)
            .unwrap()
            .set_override("max_retries", 3_i64)
            .unwrap();
        let s = Settings::from_builder(builder).unwrap();
        assert_eq!(s.pacing(), Duration::from_millis(500));
        assert_eq!(s.max_retries, 3);
    }

    #[test]
    fn negative_pacing_rejected() {
        let builder = Config::builder().set_override("pacing_secs", -1.0).unwrap();
        assert!(Settings::from_builder(builder).is_err());
    }

    #[test]
    fn huge_pacing_rejected() {
        let builder = Config::builder().set_override("pacing_secs", 1e20).unwrap();
        assert!(Settings::from_builder(builder).is_err());
    }

    #[test]
    fn pacing_override_checked() {
        let mut s = Settings::from_builder(Config::builder()).unwrap();
        assert!(s.set_pacing_secs(1e20).is_err());
        assert!(s.set_pacing_secs(f64::NAN).is_err());
        assert!(s.set_pacing_secs(-0.5).is_err());
        assert_eq!(s.pacing(), Duration::from_secs(4));

        s.set_pacing_secs(1.5).unwrap();
        assert_eq!(s.pacing(), Duration::from_millis(1500));
    }

    #[test]
    fn empty_base_url_rejected() {
        let builder = Config::builder().set_override("base_url", "  ").unwrap();
        assert!(Settings::from_builder(builder).is_err());
    }
}

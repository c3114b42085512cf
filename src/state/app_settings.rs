use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use ftcscout_api::client::{DEFAULT_SEARCH_LIMIT, FTCSCOUT_REST};
use log::LevelFilter;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DEBOUNCE_MS: u64 = 250;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: LevelFilter,
    pub api_url: String,
    pub season: u16,
    pub search_limit: u32,
    pub debounce: Duration,
    /// Search to run as soon as the UI is up.
    pub initial_query: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: LevelFilter::Error,
            api_url: FTCSCOUT_REST.to_string(),
            season: ftcscout_api::current_season(Utc::now()),
            search_limit: DEFAULT_SEARCH_LIMIT,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            initial_query: None,
        }
    }
}

impl AppSettings {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut settings = Self::default();

        if let Some(url) = var("FTCSCOUT_API_URL") {
            settings.api_url = url;
        }
        if let Some(season) = var("FTCSCOUT_SEASON") {
            settings.season = parse(&season, "FTCSCOUT_SEASON")?;
        }
        if let Some(limit) = var("FTCSCOUT_SEARCH_LIMIT") {
            settings.search_limit = parse(&limit, "FTCSCOUT_SEARCH_LIMIT")?;
            anyhow::ensure!(settings.search_limit > 0, "FTCSCOUT_SEARCH_LIMIT must be positive");
        }
        if let Some(ms) = var("FTCSCOUT_DEBOUNCE_MS") {
            settings.debounce = Duration::from_millis(parse(&ms, "FTCSCOUT_DEBOUNCE_MS")?);
        }
        if let Some(level) = var("FTCSCOUT_LOG") {
            settings.log_level = level
                .parse()
                .map_err(|_| anyhow!("invalid FTCSCOUT_LOG: {level:?}"))?;
        }

        Ok(settings)
    }
}

fn parse<T>(value: &str, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .with_context(|| format!("invalid {key}: {value:?}"))
}

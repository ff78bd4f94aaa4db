pub mod domain;
pub mod mapper;
pub mod parser;
pub mod presentation;
pub mod remote;
pub mod repository;
pub mod resource;
pub mod storage;

pub use resource::Resource;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    const DEFAULT_DATABASE_URL: &str = "sqlite://stockmarket.db?mode=rwc";
    const DEFAULT_STOCK_API_BASE_URL: &str = "https://alphavantage.co";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: String,
        pub stock_api_base_url: String,
        pub stock_api_key: Option<String>,
        pub stock_api_timeout: Duration,
        pub search_debounce: Duration,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                database_url: DEFAULT_DATABASE_URL.to_string(),
                stock_api_base_url: DEFAULT_STOCK_API_BASE_URL.to_string(),
                stock_api_key: None,
                stock_api_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();

            let timeout_secs = match std::env::var("STOCK_API_TIMEOUT_SECS") {
                Ok(s) => s
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("STOCK_API_TIMEOUT_SECS is not a number: {s}"))?,
                Err(_) => DEFAULT_TIMEOUT_SECS,
            };

            let debounce_ms = match std::env::var("SEARCH_DEBOUNCE_MS") {
                Ok(s) => s
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("SEARCH_DEBOUNCE_MS is not a number: {s}"))?,
                Err(_) => DEFAULT_SEARCH_DEBOUNCE_MS,
            };

            Ok(Self {
                database_url: non_empty_var("DATABASE_URL").unwrap_or(defaults.database_url),
                stock_api_base_url: non_empty_var("STOCK_API_BASE_URL")
                    .unwrap_or(defaults.stock_api_base_url),
                stock_api_key: non_empty_var("STOCK_API_KEY"),
                stock_api_timeout: Duration::from_secs(timeout_secs),
                search_debounce: Duration::from_millis(debounce_ms),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_api_key(&self) -> anyhow::Result<&str> {
            self.stock_api_key
                .as_deref()
                .context("STOCK_API_KEY is required")
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }
}

pub mod domain;
pub mod error;
pub mod metrics;
pub mod places;
pub mod service;
pub mod telemetry;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_FOURSQUARE_BASE_URL: &str = "https://api.foursquare.com/v3";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_RETRIES: u32 = 1;
    pub const DEFAULT_SEARCH_RADIUS: u32 = 1000;
    pub const MAX_SEARCH_RADIUS: u32 = 5000;
    pub const MAX_COMPETITORS: u32 = 20;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub foursquare_api_key: Option<String>,
        pub foursquare_base_url: String,
        pub places_timeout_secs: u64,
        pub places_retries: u32,
        pub default_search_radius: u32,
        pub max_search_radius: u32,
        pub max_competitors: u32,
        pub sentry_dsn: Option<String>,
        pub sentry_environment: Option<String>,
        pub log_dir: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                foursquare_api_key: None,
                foursquare_base_url: DEFAULT_FOURSQUARE_BASE_URL.to_string(),
                places_timeout_secs: DEFAULT_TIMEOUT_SECS,
                places_retries: DEFAULT_RETRIES,
                default_search_radius: DEFAULT_SEARCH_RADIUS,
                max_search_radius: MAX_SEARCH_RADIUS,
                max_competitors: MAX_COMPETITORS,
                sentry_dsn: None,
                sentry_environment: None,
                log_dir: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();
            Ok(Self {
                foursquare_api_key: non_empty_var("FOURSQUARE_API_KEY"),
                foursquare_base_url: non_empty_var("FOURSQUARE_BASE_URL")
                    .unwrap_or(defaults.foursquare_base_url),
                places_timeout_secs: parsed_var("PLACES_TIMEOUT_SECS")?
                    .unwrap_or(defaults.places_timeout_secs),
                // At most one retry.
                places_retries: parsed_var::<u32>("PLACES_RETRIES")?
                    .unwrap_or(defaults.places_retries)
                    .min(1),
                default_search_radius: parsed_var("DEFAULT_SEARCH_RADIUS")?
                    .unwrap_or(defaults.default_search_radius),
                max_search_radius: parsed_var("MAX_SEARCH_RADIUS")?
                    .unwrap_or(defaults.max_search_radius),
                max_competitors: parsed_var("MAX_COMPETITORS")?
                    .unwrap_or(defaults.max_competitors),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                sentry_environment: non_empty_var("SENTRY_ENVIRONMENT"),
                log_dir: non_empty_var("LOCALMIND_LOG_DIR"),
            })
        }

        pub fn require_foursquare_api_key(&self) -> anyhow::Result<&str> {
            self.foursquare_api_key
                .as_deref()
                .context("FOURSQUARE_API_KEY is required")
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    fn parsed_var<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match non_empty_var(key) {
            Some(raw) => {
                let parsed = raw
                    .trim()
                    .parse::<T>()
                    .with_context(|| format!("{key} is not valid: {raw}"))?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

}

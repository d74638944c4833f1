use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::cache::CacheConfig;
use crate::validation::MAX_UPLOAD_BYTES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub run_migrations: bool,
    /// How often the scheduler advances contest phases.
    pub phase_tick: Duration,
    /// Voting stays open this long after a contest's end date.
    pub voting_period: chrono::Duration,
    /// Weekly submission quota given to newly provisioned users.
    pub default_weekly_quota: i32,
    pub max_upload_bytes: usize,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Defaults for everything but the two secrets.
    pub fn with_defaults(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            jwt_secret: jwt_secret.into(),
            port: 8080,
            run_migrations: true,
            phase_tick: Duration::from_secs(60),
            voting_period: chrono::Duration::hours(72),
            default_weekly_quota: 3,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            cache: CacheConfig::default(),
        }
    }

    /// Read configuration from the environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source. Unset variables take
    /// their defaults; set but unparsable ones are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(lookup);

        let database_url = vars.required("DATABASE_URL")?;
        let jwt_secret = vars.required("JWT_SECRET")?;
        let defaults = Self::with_defaults(database_url, jwt_secret);

        Ok(Self {
            port: vars.parsed("PORT", defaults.port)?,
            run_migrations: vars.parsed("RUN_MIGRATIONS", defaults.run_migrations)?,
            phase_tick: Duration::from_secs(
                vars.parsed("PHASE_TICK_SECS", defaults.phase_tick.as_secs())?,
            ),
            voting_period: chrono::Duration::hours(
                vars.parsed("VOTING_PERIOD_HOURS", defaults.voting_period.num_hours())?,
            ),
            default_weekly_quota: vars
                .parsed("DEFAULT_WEEKLY_QUOTA", defaults.default_weekly_quota)?,
            max_upload_bytes: vars.parsed("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            cache: CacheConfig {
                contest_list_ttl: Duration::from_secs(vars.parsed(
                    "CACHE_TTL_CONTESTS",
                    defaults.cache.contest_list_ttl.as_secs(),
                )?),
                photo_list_ttl: Duration::from_secs(
                    vars.parsed("CACHE_TTL_PHOTOS", defaults.cache.photo_list_ttl.as_secs())?,
                ),
            },
            ..defaults
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        (self.0)(name)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(name))
    }

    fn parsed<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match (self.0)(name) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value }),
            None => Ok(default),
        }
    }
}

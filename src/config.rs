use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// `DATABASE_URL` value that selects the in-process store.
pub const MEMORY_DATABASE_URL: &str = "memory://";

const DEV_SECRET_KEY: &str = "dev-secret-key-not-for-prod";

/// Deployment environment. Picks which `.env.<environment>` file is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Test,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Test => "test",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Dev),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Prod),
            other => anyhow::bail!("ENVIRONMENT must be one of dev, test, prod (got {:?})", other),
        }
    }
}

/// Per-IP request budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Sustained requests per second.
    pub per_second: u64,
    /// Requests allowed back to back before throttling starts.
    pub burst: u32,
}

impl RateLimit {
    /// Milliseconds between token refills. Rates above 1000/s refill every millisecond.
    pub fn refill_interval_ms(&self) -> u64 {
        (1000 / self.per_second.max(1)).max(1)
    }
}

/// Process configuration, built once at startup and handed to whatever needs it.
#[derive(Clone)]
pub struct Config {
    pub environment: Environment,
    pub app_name: String,
    pub api_version: String,
    pub debug: bool,
    pub database_url: String,
    pub port: u16,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub allowed_origins: Vec<String>,
    /// `None` disables rate limiting.
    pub rate_limit: Option<RateLimit>,
    pub secret_key: String,
}

// Keeps the secret key and database credentials out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("app_name", &self.app_name)
            .field("api_version", &self.api_version)
            .field("debug", &self.debug)
            .field("database_url", &"<redacted>")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout", &self.db_acquire_timeout)
            .field("allowed_origins", &self.allowed_origins)
            .field("rate_limit", &self.rate_limit)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// `.env.<ENVIRONMENT>` and then `.env` are read first when present; variables already
    /// set in the process take precedence over both files.
    pub fn from_env() -> anyhow::Result<Self> {
        let environment: Environment = std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "dev".to_string())
            .parse()?;

        let env_file = format!(".env.{}", environment);
        if Path::new(&env_file).exists() {
            dotenvy::from_filename(&env_file)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", env_file, e))?;
        }
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment: Environment = var("ENVIRONMENT")
            .unwrap_or_else(|| "dev".to_string())
            .parse()?;

        let database_url = var("DATABASE_URL")
            .or_else(|| var("DB_URL"))
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL or DB_URL environment variable required"))
            .and_then(|url| {
                if url != MEMORY_DATABASE_URL
                    && !url.starts_with("postgresql://")
                    && !url.starts_with("postgres://")
                {
                    anyhow::bail!(
                        "DATABASE_URL must start with postgresql:// or postgres:// (or be {})",
                        MEMORY_DATABASE_URL
                    );
                }
                Ok(url)
            })?;

        let debug = match var("DEBUG") {
            Some(v) => parse_bool("DEBUG", &v)?,
            None => environment == Environment::Dev,
        };

        let per_second: u64 = parse_or("RATE_LIMIT_PER_SECOND", var("RATE_LIMIT_PER_SECOND"), 10)?;
        let burst: u32 = parse_or("RATE_LIMIT_BURST", var("RATE_LIMIT_BURST"), 20)?;
        let rate_limit = if per_second == 0 {
            None
        } else {
            if burst == 0 {
                anyhow::bail!("RATE_LIMIT_BURST must be greater than 0");
            }
            Some(RateLimit { per_second, burst })
        };

        let secret_key = var("SECRET_KEY").unwrap_or_else(|| DEV_SECRET_KEY.to_string());
        if environment == Environment::Prod && secret_key == DEV_SECRET_KEY {
            anyhow::bail!("SECRET_KEY must be set to a non-default value in prod");
        }

        let allowed_origins = var("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let db_max_connections: u32 =
            parse_or("DB_MAX_CONNECTIONS", var("DB_MAX_CONNECTIONS"), 10)?;
        if db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be greater than 0");
        }

        Ok(Self {
            environment,
            app_name: var("APP_NAME").unwrap_or_else(|| "LeadLab API".to_string()),
            api_version: var("API_VERSION")
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            debug,
            database_url,
            port: parse_or("PORT", var("PORT"), 8000)
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            log_level: var("LOG_LEVEL")
                .unwrap_or_else(|| "info".to_string())
                .to_ascii_lowercase(),
            db_max_connections,
            db_acquire_timeout: Duration::from_secs(parse_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                var("DB_ACQUIRE_TIMEOUT_SECS"),
                5,
            )?),
            allowed_origins,
            rate_limit,
            secret_key,
        })
    }

    /// True when leads live in process memory instead of PostgreSQL.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }

    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> String {
        let level = if self.debug { "debug" } else { self.log_level.as_str() };
        format!("leadlab_api={level},tower_http={level}")
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> anyhow::Result<T> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {:?}", key, v)),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("{} must be a boolean (got {:?})", key, value),
    }
}

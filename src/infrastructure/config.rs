use anyhow::{Context, Result};
use sqlx::postgres::PgConnectOptions;
use std::fmt::Display;
use std::str::FromStr;

/// Upper bound for `JWT_EXPIRES_IN` and `CONFIRMATION_EXPIRES_IN` (one year)
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

/// Settings resolved once at startup and shared through the application state.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base URL used in links sent to users, e.g. the confirmation link
    pub public_url: String,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
    /// Comma separated origins, empty or `*` allows any origin
    pub cors_allowed_origins: String,
    pub rate_limit: RateLimitConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub connect_options: PgConnectOptions,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Session token lifetime in seconds
    pub expires_in: i64,
    pub confirmation_secret: String,
    /// Confirmation token lifetime in seconds
    pub confirmation_expires_in: i64,
}

#[derive(Clone)]
pub struct MailConfig {
    /// Without a host, mail is written to the log instead of being sent
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per client within one window, `0` disables limiting
    pub max_requests: u32,
    pub window_secs: u64,
}

impl AppConfig {
    /// Load `.env` and the optional `APP_CONFIG_FILE`, then read the process environment.
    /// Variables already set in the environment are never overridden by either file.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        if let Ok(path) = std::env::var("APP_CONFIG_FILE") {
            dotenvy::from_path(&path)
                .with_context(|| format!("Failed to read config file {}", path))?;
        }

        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse(&get, "APP_PORT", 3000)?;
        let public_url = get("APP_PUBLIC_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let connect_options = match get("DATABASE_URL") {
            Some(url) => PgConnectOptions::from_str(&url).context("Invalid DATABASE_URL")?,
            None => PgConnectOptions::new()
                .host(&get("DB_HOST").unwrap_or_else(|| "localhost".to_string()))
                .port(parse(&get, "DB_PORT", 5432)?)
                .username(&get("DB_USERNAME").unwrap_or_else(|| "postgres".to_string()))
                .password(&get("DB_PASSWORD").unwrap_or_default())
                .database(&get("DB_NAME").unwrap_or_else(|| "crudkit".to_string())),
        };

        let database = DatabaseConfig {
            connect_options,
            max_connections: parse(&get, "DB_MAX_CONNECTIONS", 20)?,
            min_connections: parse(&get, "DB_MIN_CONNECTIONS", 5)?,
            acquire_timeout_secs: parse(&get, "DB_ACQUIRE_TIMEOUT_SECS", 3)?,
            idle_timeout_secs: parse(&get, "DB_IDLE_TIMEOUT_SECS", 600)?,
        };

        let secret = get("JWT_SECRET_KEY").context("JWT_SECRET_KEY must be set")?;
        let jwt = JwtConfig {
            confirmation_secret: get("JWT_CONFIRMATION_SECRET").unwrap_or_else(|| secret.clone()),
            secret,
            expires_in: token_lifetime(&get, "JWT_EXPIRES_IN", 3600)?,
            confirmation_expires_in: token_lifetime(&get, "CONFIRMATION_EXPIRES_IN", 259_200)?,
        };

        let username = get("EMAIL_USER");
        let mail = MailConfig {
            smtp_host: get("SMTP_HOST"),
            smtp_port: parse(&get, "SMTP_PORT", 465)?,
            from: get("FROM_EMAIL")
                .or_else(|| username.clone())
                .unwrap_or_else(|| "no-reply@localhost".to_string()),
            username,
            password: get("EMAIL_PASSWORD"),
        };

        let rate_limit = RateLimitConfig {
            max_requests: parse(&get, "RATE_LIMIT_MAX", 100)?,
            window_secs: parse(&get, "RATE_LIMIT_WINDOW_SECS", 900)?,
        };

        Ok(Self {
            host,
            port,
            public_url,
            database,
            jwt,
            mail,
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
            rate_limit,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        None => Ok(default),
    }
}

/// Token lifetime in seconds, between one second and [`MAX_TOKEN_LIFETIME_SECS`].
fn token_lifetime(get: &impl Fn(&str) -> Option<String>, key: &str, default: i64) -> Result<i64> {
    let seconds = parse(get, key, default)?;
    if !(1..=MAX_TOKEN_LIFETIME_SECS).contains(&seconds) {
        anyhow::bail!(
            "Invalid value for {}: expected 1..={} seconds, got {}",
            key,
            MAX_TOKEN_LIFETIME_SECS,
            seconds
        );
    }
    Ok(seconds)
}

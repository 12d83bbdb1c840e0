use std::fmt::Display;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Runtime settings for the guestbook server, read once at startup.
///
/// Every setting except `JWT_SECRET` and `DATABASE_URL` has a default
/// suited to running the API next to a local front end.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind (`HOST`).
    pub host: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Browser origins allowed to call the API (`CORS_ORIGINS`, comma separated).
    pub cors_origins: Vec<String>,
    /// Upper bound on a whole request, including any wait for a date's
    /// schedule lock (`REQUEST_TIMEOUT_SECS`).
    pub request_timeout_secs: u64,
    /// Size of the Postgres pool (`DB_MAX_CONNECTIONS`). Each in-flight guest
    /// write holds one connection for the length of its transaction.
    pub db_max_connections: u32,
    /// Access and refresh token settings.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `3000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `DB_MAX_CONNECTIONS`   | `20`                    |
    ///
    /// `DATABASE_URL` is read by the binary, `JWT_*` by [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics when a numeric variable is set but does not parse.
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 20),
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Parse `key` from the environment, or fall back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            panic!("{key} must be a valid {}: {e}", std::any::type_name::<T>())
        }),
        Err(_) => default,
    }
}

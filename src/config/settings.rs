//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    MAX_JWT_EXPIRATION_HOURS, MIN_JWT_SECRET_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    ///
    /// # Errors
    /// Returns a configuration error if `JWT_SECRET` is missing or blank,
    /// or if `JWT_EXPIRATION_HOURS` is not a whole number of hours in range.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Database URL alone, for commands that never sign tokens.
    pub fn database_url_from_env() -> String {
        dotenvy::dotenv().ok();
        Self::database_url_from_lookup(|key| env::var(key).ok())
    }

    pub fn database_url_from_lookup<F>(lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::config("JWT_SECRET environment variable must be set"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            tracing::warn!(
                "JWT_SECRET is shorter than {} characters; use a longer secret in production",
                MIN_JWT_SECRET_LENGTH
            );
        }

        let jwt_expiration_hours = match lookup("JWT_EXPIRATION_HOURS") {
            None => DEFAULT_JWT_EXPIRATION_HOURS,
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|h| (1..=MAX_JWT_EXPIRATION_HOURS).contains(h))
                .ok_or_else(|| {
                    AppError::config(format!(
                        "JWT_EXPIRATION_HOURS must be between 1 and {}, got {:?}",
                        MAX_JWT_EXPIRATION_HOURS, raw
                    ))
                })?,
        };

        Ok(Self {
            database_url: Self::database_url_from_lookup(&lookup),
            jwt_secret,
            jwt_expiration_hours,
            server_host: lookup("HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
        })
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_blank_secret_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("JWT_SECRET", "   ")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[("JWT_SECRET", "short")])).unwrap();

        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(config.server_host, DEFAULT_SERVER_HOST);
        assert_eq!(config.jwt_expiration_hours, DEFAULT_JWT_EXPIRATION_HOURS);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.jwt_secret_bytes(), b"short");
    }

    #[test]
    fn test_overrides_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "a-secret-that-is-long-enough-for-prod"),
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("JWT_EXPIRATION_HOURS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr(), "127.0.0.1:8080");
        assert_eq!(config.jwt_expiration_hours, 2);
    }

    #[test]
    fn test_expiration_out_of_range_is_rejected() {
        for hours in ["0", "-5", "10000000000", "soon"] {
            let result = Config::from_lookup(lookup_from(&[
                ("JWT_SECRET", "short"),
                ("JWT_EXPIRATION_HOURS", hours),
            ]));
            assert!(
                matches!(result, Err(AppError::Config(_))),
                "accepted {}",
                hours
            );
        }
    }

    #[test]
    fn test_expiration_upper_bound_accepted() {
        let max = MAX_JWT_EXPIRATION_HOURS.to_string();
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "short"),
            ("JWT_EXPIRATION_HOURS", max.as_str()),
        ]))
        .unwrap();

        assert_eq!(config.jwt_expiration_hours, MAX_JWT_EXPIRATION_HOURS);
    }

    #[test]
    fn test_database_url_needs_no_secret() {
        assert_eq!(
            Config::database_url_from_lookup(lookup_from(&[])),
            DEFAULT_DATABASE_URL
        );
        assert_eq!(
            Config::database_url_from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db/x")])),
            "postgres://db/x"
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_lookup(lookup_from(&[("JWT_SECRET", "top-secret-value")])).unwrap();
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("top-secret-value"));
        assert!(rendered.contains("[REDACTED]"));
    }
}

use std::env;
use std::time::Duration;

use thiserror::Error;

/// bcrypt work factor used when `BCRYPT_COST` is not set.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Work factors bcrypt accepts.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Credentials for the administrator account seeded at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When absent the in-memory store is used.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    pub request_timeout: Duration,
    pub admin_seed: Option<AdminSeed>,
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = non_empty("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let bcrypt_cost = parse_or("BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !BCRYPT_COST_RANGE.contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                reason: format!(
                    "must be between {} and {}",
                    BCRYPT_COST_RANGE.start(),
                    BCRYPT_COST_RANGE.end()
                ),
            });
        }

        let request_timeout_secs: u64 = parse_or("REQUEST_TIMEOUT_SECS", 10)?;
        if request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "REQUEST_TIMEOUT_SECS",
                reason: "must be greater than zero".into(),
            });
        }

        let admin_seed = match (non_empty("ADMIN_USERNAME"), non_empty("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminSeed { username, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("ADMIN_USERNAME")),
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            server_port: parse_or("SERVER_PORT", 8080)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            jwt_secret,
            bcrypt_cost,
            request_timeout: Duration::from_secs(request_timeout_secs),
            admin_seed,
            cors_allowed_origin: non_empty("CORS_ALLOWED_ORIGIN"),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 9] = [
        "JWT_SECRET",
        "DATABASE_URL",
        "SERVER_PORT",
        "SERVER_HOST",
        "BCRYPT_COST",
        "REQUEST_TIMEOUT_SECS",
        "ADMIN_USERNAME",
        "ADMIN_PASSWORD",
        "CORS_ALLOWED_ORIGIN",
    ];

    fn clear() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    // Environment variables are process-wide, so every scenario lives in one test.
    #[test]
    fn test_config_from_env() {
        clear();
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));

        env::set_var("JWT_SECRET", "   ");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));

        env::set_var("JWT_SECRET", "test-secret");
        let config = Config::from_env().unwrap();
        assert_eq!(config.jwt_secret, "test-secret");
        assert!(config.database_url.is_none());
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.bcrypt_cost, DEFAULT_BCRYPT_COST);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.admin_seed.is_none());
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");

        env::set_var("SERVER_PORT", "3000");
        env::set_var("SERVER_HOST", "0.0.0.0");
        env::set_var("DATABASE_URL", "postgres://test");
        env::set_var("BCRYPT_COST", "4");
        let config = Config::from_env().unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.database_url.as_deref(), Some("postgres://test"));
        assert_eq!(config.bcrypt_cost, 4);

        env::set_var("BCRYPT_COST", "2");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid { name: "BCRYPT_COST", .. })
        ));
        env::remove_var("BCRYPT_COST");

        env::set_var("SERVER_PORT", "not-a-port");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid { name: "SERVER_PORT", .. })
        ));
        env::remove_var("SERVER_PORT");

        env::set_var("ADMIN_USERNAME", "root");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("ADMIN_PASSWORD"))
        ));
        env::set_var("ADMIN_PASSWORD", "rootpass");
        let seed = Config::from_env().unwrap().admin_seed.unwrap();
        assert_eq!(seed.username, "root");

        clear();
    }
}

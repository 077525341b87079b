use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::info;

/// Server configuration, read from `HAIKU_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub reader_pool_size: usize,
    pub request_timeout: Duration,
    pub min_password_entropy: f64,
    pub require_email: bool,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            host: lookup("HAIKU_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse(&lookup, "HAIKU_PORT", "8080")?,
            db_path: lookup("HAIKU_DB_PATH")
                .unwrap_or_else(|| "haikuhub.db".into())
                .into(),
            reader_pool_size: parse(&lookup, "HAIKU_READER_POOL_SIZE", "4")?,
            request_timeout: Duration::from_secs(parse(&lookup, "HAIKU_REQUEST_TIMEOUT_SECS", "10")?),
            min_password_entropy: parse(&lookup, "HAIKU_MIN_PASSWORD_ENTROPY", "60")?,
            require_email: parse(&lookup, "HAIKU_REQUIRE_EMAIL", "true")?,
            argon2_memory_kib: parse(&lookup, "HAIKU_ARGON2_MEMORY_KIB", "19456")?,
            argon2_iterations: parse(&lookup, "HAIKU_ARGON2_ITERATIONS", "2")?,
            argon2_parallelism: parse(&lookup, "HAIKU_ARGON2_PARALLELISM", "1")?,
        };

        if config.request_timeout.is_zero() {
            bail!("HAIKU_REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        Ok(config)
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("invalid {key} value '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, PathBuf::from("haikuhub.db"));
        assert_eq!(config.reader_pool_size, 4);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.min_password_entropy, 60.0);
        assert!(config.require_email);
        assert_eq!(config.argon2_memory_kib, 19456);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("HAIKU_PORT", "3000"),
            ("HAIKU_REQUIRE_EMAIL", "false"),
            ("HAIKU_REQUEST_TIMEOUT_SECS", "30"),
        ])
        .unwrap();
        assert_eq!(config.port, 3000);
        assert!(!config.require_email);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn invalid_values_are_errors() {
        let err = config(&[("HAIKU_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("HAIKU_PORT"));

        assert!(config(&[("HAIKU_REQUEST_TIMEOUT_SECS", "0")]).is_err());
    }
}

//! Configuration loading from environment.

use std::env;
use std::time::Duration;

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub customer_directory_url: String,
    pub cart_service_url: String,
    pub scheduling_service_url: String,
    /// Upper bound for every outbound call
    pub remote_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} environment variable is required", name))
        };

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()?;

        let timeout_ms: u64 = lookup("REMOTE_TIMEOUT_MS")
            .unwrap_or_else(|| "3000".to_string())
            .parse()?;
        if timeout_ms == 0 {
            anyhow::bail!("REMOTE_TIMEOUT_MS must be greater than zero");
        }

        Ok(Self {
            port,
            database_url: required("DATABASE_URL")?,
            customer_directory_url: required("CUSTOMER_DIRECTORY_URL")?,
            cart_service_url: required("CART_SERVICE_URL")?,
            scheduling_service_url: required("SCHEDULING_SERVICE_URL")?,
            remote_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub remote_base_url: String,
    pub database_path: String,
    pub cache_ttl: Duration,
    pub cache_max_entries: Option<u64>,
    pub allowed_origins: Vec<String>,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_REMOTE_BASE_URL: &str = "https://dummyjson.com";
    const DEFAULT_DATABASE_PATH: &str = "./data/catalog.db";
    const DEFAULT_CACHE_TTL_SECS: u64 = 300;

    pub fn from_env() -> Self {
        let cache_ttl_secs = parse_var("CATALOG_CACHE_TTL_SECS", Self::DEFAULT_CACHE_TTL_SECS);

        Self {
            host: std::env::var("CATALOG_HOST").unwrap_or_else(|_| Self::DEFAULT_HOST.to_string()),
            http_port: parse_var("CATALOG_HTTP_PORT", Self::DEFAULT_HTTP_PORT),
            remote_base_url: std::env::var("CATALOG_REMOTE_BASE_URL")
                .unwrap_or_else(|_| Self::DEFAULT_REMOTE_BASE_URL.to_string()),
            database_path: std::env::var("CATALOG_DATABASE_PATH")
                .unwrap_or_else(|_| Self::DEFAULT_DATABASE_PATH.to_string()),
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache_max_entries: std::env::var("CATALOG_CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|raw| match raw.trim().parse::<u64>() {
                    Ok(max) => Some(max),
                    Err(_) => {
                        warn!("CATALOG_CACHE_MAX_ENTRIES='{}' is not a number, cache stays unbounded", raw);
                        None
                    }
                }),
            allowed_origins: std::env::var("CATALOG_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warn!("{}='{}' is invalid, falling back to {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_variable_uses_default() {
        assert_eq!(parse_var("CATALOG_TEST_UNSET_PORT", 8080u16), 8080);
    }

    #[test]
    fn test_bind_address() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            http_port: 9000,
            remote_base_url: Config::DEFAULT_REMOTE_BASE_URL.to_string(),
            database_path: Config::DEFAULT_DATABASE_PATH.to_string(),
            cache_ttl: Duration::from_secs(Config::DEFAULT_CACHE_TTL_SECS),
            cache_max_entries: None,
            allowed_origins: vec!["*".to_string()],
        };
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
    }
}

use crate::config::types::{Config, CrawlerConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates target site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "start_url must use http or https scheme, got '{}'",
            url.scheme()
        )));
    }

    if config.currency_symbol.is_empty() {
        return Err(ConfigError::Validation(
            "currency_symbol cannot be empty".to_string(),
        ));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.fetch_workers < 1 || config.fetch_workers > 64 {
        return Err(ConfigError::Validation(format!(
            "fetch_workers must be between 1 and 64, got {}",
            config.fetch_workers
        )));
    }

    if config.queue_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "queue_capacity must be >= 1, got {}",
            config.queue_capacity
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.retry_backoff_ms < 50 {
        return Err(ConfigError::Validation(format!(
            "retry_backoff_ms must be >= 50ms, got {}ms",
            config.retry_backoff_ms
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and 300, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::IngestConfig;

    fn base_config() -> Config {
        Config {
            site: SiteConfig {
                start_url: "https://books.example.com/".to_string(),
                currency_symbol: "£".to_string(),
                user_agent: "shelf-sweep/0.1.0".to_string(),
            },
            crawler: CrawlerConfig {
                fetch_workers: 4,
                queue_capacity: 64,
                max_retries: 3,
                retry_backoff_ms: 500,
                request_timeout_secs: 30,
            },
            output: OutputConfig {
                database_path: "./books.db".to_string(),
            },
            ingest: IngestConfig::default(),
        }
    }

    #[test]
    fn test_validate_accepts_base_config() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn test_validate_start_url_scheme() {
        let mut config = base_config();
        config.site.start_url = "http://127.0.0.1:8080/".to_string();
        assert!(validate(&config).is_ok());

        config.site.start_url = "ftp://books.example.com/".to_string();
        assert!(validate(&config).is_err());

        config.site.start_url = "not a url".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_validate_fetch_workers_range() {
        let mut config = base_config();
        config.crawler.fetch_workers = 0;
        assert!(validate(&config).is_err());

        config.crawler.fetch_workers = 65;
        assert!(validate(&config).is_err());

        config.crawler.fetch_workers = 64;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_retry_backoff_floor() {
        let mut config = base_config();
        config.crawler.retry_backoff_ms = 10;
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_validate_empty_database_path() {
        let mut config = base_config();
        config.output.database_path = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_empty_currency_symbol() {
        let mut config = base_config();
        config.site.currency_symbol = String::new();
        assert!(validate(&config).is_err());
    }
}

use crate::config::types::{Config, CrawlerConfig, OutputConfig, SelectorConfig, SiteConfig, UserAgentConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_selectors(&config.selectors)?;
    validate_labels(config)?;
    Ok(())
}

/// Validates the site description
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", config.base_url, e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    base.join(&config.listing_path).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "listing-path '{}' does not resolve against base-url: {}",
            config.listing_path, e
        ))
    })?;

    if config.page_param.trim().is_empty() {
        return Err(ConfigError::Validation("page-param cannot be empty".to_string()));
    }

    if config.page_size.is_some() && config.page_size_param.trim().is_empty() {
        return Err(ConfigError::Validation(
            "page-size-param cannot be empty when page-size is set".to_string(),
        ));
    }

    if config.page_size == Some(0) {
        return Err(ConfigError::Validation("page-size must be >= 1".to_string()));
    }

    if config.start_page < 1 {
        return Err(ConfigError::Validation(format!(
            "start-page must be >= 1, got {}",
            config.start_page
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.fallback_page_ceiling < 1 {
        return Err(ConfigError::Validation(format!(
            "fallback-page-ceiling must be >= 1, got {}",
            config.fallback_page_ceiling
        )));
    }

    if config.retry_count < 1 || config.retry_count > 10 {
        return Err(ConfigError::Validation(format!(
            "retry-count must be between 1 and 10, got {}",
            config.retry_count
        )));
    }

    if config.politeness_delay_min_ms > config.politeness_delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "politeness-delay-min-ms ({}) must not exceed politeness-delay-max-ms ({})",
            config.politeness_delay_min_ms, config.politeness_delay_max_ms
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation("csv-path cannot be empty".to_string()));
    }

    if matches!(config.database_path.as_deref(), Some("")) {
        return Err(ConfigError::Validation(
            "database-path cannot be empty when given".to_string(),
        ));
    }

    if matches!(config.xlsx_path.as_deref(), Some("")) {
        return Err(ConfigError::Validation(
            "xlsx-path cannot be empty when given".to_string(),
        ));
    }

    Ok(())
}

/// Every selector must parse; a typo should fail at startup, not mid-crawl
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    let selectors = [
        ("card", &config.card),
        ("card-fallback", &config.card_fallback),
        ("card-title", &config.card_title),
        ("card-text", &config.card_text),
        ("card-image", &config.card_image),
        ("pagination", &config.pagination),
        ("block", &config.block),
        ("block-label", &config.block_label),
        ("block-value", &config.block_value),
        ("table-cell", &config.table_cell),
        ("content", &config.content),
    ];

    for (name, selector) in selectors {
        Selector::parse(selector).map_err(|e| {
            ConfigError::InvalidSelector(format!("{} = '{}': {:?}", name, selector, e))
        })?;
    }

    if config.next_labels.iter().any(|l| l.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "next-labels cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Label overrides must map onto a usable column name
fn validate_labels(config: &Config) -> Result<(), ConfigError> {
    for (label, canonical) in &config.labels {
        if label.trim().is_empty() || canonical.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "label mapping '{}' = '{}' has an empty side",
                label, canonical
            )));
        }
    }
    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawler_config() -> CrawlerConfig {
        toml::from_str("").unwrap()
    }

    fn site_config() -> SiteConfig {
        SiteConfig {
            base_url: "https://site.tld".to_string(),
            listing_path: "/list".to_string(),
            page_param: "page".to_string(),
            page_size_param: "per-page".to_string(),
            page_size: Some(12),
            start_page: 1,
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }

    #[test]
    fn test_validate_site() {
        assert!(validate_site_config(&site_config()).is_ok());

        let mut bad = site_config();
        bad.base_url = "ftp://site.tld".to_string();
        assert!(validate_site_config(&bad).is_err());

        let mut bad = site_config();
        bad.base_url = "not a url".to_string();
        assert!(matches!(
            validate_site_config(&bad),
            Err(ConfigError::InvalidUrl(_))
        ));

        let mut bad = site_config();
        bad.page_size = Some(0);
        assert!(validate_site_config(&bad).is_err());

        let mut bad = site_config();
        bad.start_page = 0;
        assert!(validate_site_config(&bad).is_err());
    }

    #[test]
    fn test_validate_crawler_defaults_pass() {
        assert!(validate_crawler_config(&crawler_config()).is_ok());
    }

    #[test]
    fn test_validate_delay_range() {
        let mut config = crawler_config();
        config.politeness_delay_min_ms = 2000;
        config.politeness_delay_max_ms = 1000;
        assert!(validate_crawler_config(&config).is_err());

        config.politeness_delay_min_ms = 0;
        config.politeness_delay_max_ms = 0;
        assert!(validate_crawler_config(&config).is_ok());
    }

    #[test]
    fn test_validate_retry_count() {
        let mut config = crawler_config();
        config.retry_count = 0;
        assert!(validate_crawler_config(&config).is_err());
        config.retry_count = 11;
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_validate_output_paths() {
        let output = OutputConfig {
            csv_path: "out.csv".to_string(),
            database_path: None,
            xlsx_path: Some("out.xlsx".to_string()),
        };
        assert!(validate_output_config(&output).is_ok());

        let bad = OutputConfig {
            xlsx_path: Some(String::new()),
            ..output.clone()
        };
        assert!(validate_output_config(&bad).is_err());

        let bad = OutputConfig {
            csv_path: String::new(),
            ..output
        };
        assert!(validate_output_config(&bad).is_err());
    }

    #[test]
    fn test_validate_selectors() {
        assert!(validate_selectors(&SelectorConfig::default()).is_ok());

        let bad = SelectorConfig {
            card: "div[[".to_string(),
            ..SelectorConfig::default()
        };
        assert!(matches!(
            validate_selectors(&bad),
            Err(ConfigError::InvalidSelector(_))
        ));
    }
}

use super::models::Config;
use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No targets configured (at least one target url is required)")]
    NoTargets,

    #[error("Target {index} is not a valid absolute url: {url}")]
    InvalidTargetUrl { index: usize, url: String },

    #[error("Target {index} uses unsupported scheme '{scheme}', expected 'http' or 'https'")]
    UnsupportedScheme { index: usize, scheme: String },

    #[error("Fetcher timeout must be positive")]
    InvalidTimeout,

    #[error("Fetcher max_body_bytes must be positive")]
    InvalidMaxBodyBytes,

    #[error("Aggregator max_parallelism must be positive when set")]
    InvalidMaxParallelism,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_targets(config)?;
    validate_fetcher(config)?;
    validate_aggregator(config)?;
    Ok(())
}

fn validate_targets(config: &Config) -> Result<(), ValidationError> {
    if config.targets.is_empty() {
        return Err(ValidationError::NoTargets);
    }

    for (index, target) in config.targets.iter().enumerate() {
        let url = Url::parse(target).map_err(|_| ValidationError::InvalidTargetUrl {
            index,
            url: target.clone(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::UnsupportedScheme {
                index,
                scheme: url.scheme().to_string(),
            });
        }
    }

    Ok(())
}

fn validate_fetcher(config: &Config) -> Result<(), ValidationError> {
    if config.fetcher.timeout_ms == 0 {
        return Err(ValidationError::InvalidTimeout);
    }

    if config.fetcher.max_body_bytes.as_u64() == 0 {
        return Err(ValidationError::InvalidMaxBodyBytes);
    }

    Ok(())
}

fn validate_aggregator(config: &Config) -> Result<(), ValidationError> {
    if config.aggregator.max_parallelism == Some(0) {
        return Err(ValidationError::InvalidMaxParallelism);
    }

    Ok(())
}

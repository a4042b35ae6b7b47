//! Configuration validation.

use super::error::{ConfigError, ConfigResult};
use super::schema::{CourierConfig, DeliveryMode, LogOutput};

/// Checks a loaded configuration before anything is started.
///
/// The token is always required. Webhook settings are only checked in
/// webhook mode and polling settings only in polling mode.
pub fn validate_config(config: &CourierConfig) -> ConfigResult<()> {
    match config.bot.api_token.as_deref() {
        Some(token) if !token.trim().is_empty() => {}
        _ => return Err(ConfigError::missing_field("bot.api_token")),
    }

    if let Some(username) = &config.bot.username {
        if username.starts_with('@') {
            return Err(ConfigError::invalid(
                "bot.username must be given without the leading '@'",
            ));
        }
    }

    validate_http_url(&config.bot.api_url)?;
    if config.bot.request_timeout_secs == 0 {
        return Err(ConfigError::invalid("bot.request_timeout_secs must be greater than 0"));
    }

    match config.mode {
        DeliveryMode::Polling => {
            if config.polling.timeout_secs == 0 {
                return Err(ConfigError::invalid("polling.timeout_secs must be greater than 0"));
            }
        }
        DeliveryMode::Webhook => {
            if !config.webhook.path.starts_with('/') {
                return Err(ConfigError::invalid("webhook.path must start with '/'"));
            }
            if let Some(url) = &config.webhook.url {
                validate_http_url(url)?;
            }
        }
    }

    if config.logging.output == LogOutput::File && config.logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    Ok(())
}

fn validate_http_url(url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::missing_field("url"));
    }
    if !["http://", "https://"].iter().any(|scheme| url.starts_with(scheme)) {
        return Err(ConfigError::invalid_url(
            url,
            "URL must start with http:// or https://",
        ));
    }
    Ok(())
}

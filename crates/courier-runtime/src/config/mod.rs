//! Configuration loading and validation.
//!
//! Sources are layered with figment, lowest priority first: defaults,
//! programmatic base values from [`ConfigLoader::merge`], config files, then
//! `COURIER_*` environment variables. See [`loader`] for the full order.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    BotOptions, CourierConfig, DeliveryMode, LogFormat, LogLevel, LogOutput, LoggingConfig,
    PollingConfig, SpanEventConfig, WebhookConfig,
};
pub use validation::validate_config;

//! # Courier Runtime
//!
//! Runs a bot built with `courier-framework`:
//!
//! - [`config`]: figment-based configuration (`courier.toml`, `COURIER_*` variables)
//! - [`logging`]: tracing subscriber setup driven by the `[logging]` section
//! - [`polling`]: the long-polling update source and its supervised task
//! - [`CourierRuntime`]: picks polling or webhook delivery and runs until shutdown
//!
//! ## Features
//!
//! - `toml-config` / `yaml-config`: configuration file formats
//! - `json-log`: JSON log output
//! - `http-client`: default Bot API client
//! - `http-server`: webhook mode

pub mod config;
pub mod error;
pub mod logging;
pub mod polling;
pub mod runtime;

pub use config::{ConfigLoader, CourierConfig, DeliveryMode, Profile, validate_config};
pub use error::{ConfigError, ConfigResult, PollingError, PollingResult, RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use polling::{PollingHandle, PollingOptions, PollingState, UpdatePollingManager};
pub use runtime::{CourierRuntime, RuntimeBuilder};

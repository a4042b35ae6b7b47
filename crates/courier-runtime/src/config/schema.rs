//! Configuration schema definitions.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
///
/// ```toml
/// mode = "polling"
///
/// [bot]
/// username = "my_bot"
/// api_token = "123456:ABC"
///
/// [polling]
/// start_delay_ms = 2000
/// timeout_secs = 500
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourierConfig {
    #[serde(default)]
    pub bot: BotOptions,

    /// How updates are received.
    #[serde(default)]
    pub mode: DeliveryMode,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub webhook: WebhookConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// =============================================================================
// Bot
// =============================================================================

/// Identity and credentials of the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotOptions {
    /// Username without `@`; needed to recognise `/cmd@username`.
    #[serde(default)]
    pub username: Option<String>,

    /// Bot API token.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Bot API endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Timeout of ordinary API requests, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for BotOptions {
    fn default() -> Self {
        Self {
            username: None,
            api_token: None,
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl BotOptions {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// Update delivery mode. A bot uses one or the other, never both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    #[default]
    Polling,
    Webhook,
}

// =============================================================================
// Polling
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay before the first fetch, in milliseconds.
    #[serde(default = "default_start_delay")]
    pub start_delay_ms: u64,

    /// Server-side long-poll timeout, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub timeout_secs: u32,

    /// Update kinds to receive; empty means all.
    #[serde(default)]
    pub allowed_updates: Vec<String>,

    /// Whether removing the webhook also drops updates queued for it.
    #[serde(default = "default_true")]
    pub drop_pending_updates: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            start_delay_ms: default_start_delay(),
            timeout_secs: default_poll_timeout(),
            allowed_updates: Vec::new(),
            drop_pending_updates: true,
        }
    }
}

impl PollingConfig {
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }
}

fn default_start_delay() -> u64 {
    2000
}

fn default_poll_timeout() -> u32 {
    500
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Webhook
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Local address the webhook server binds.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Route updates are posted to.
    #[serde(default = "default_webhook_path")]
    pub path: String,

    /// Public URL registered with `setWebhook`. Left untouched when unset.
    #[serde(default)]
    pub url: Option<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_webhook_path(),
            url: None,
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_webhook_path() -> String {
    "/bot/webhook".to_string()
}

// =============================================================================
// Logging
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, used when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    #[serde(default)]
    pub thread_ids: bool,

    /// Include file and line of each event.
    #[serde(default)]
    pub file_location: bool,

    /// Per-module levels, e.g. `courier_runtime = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            filters: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to `full` without it.
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

//! HTTP transports.

#[cfg(feature = "http-client")]
pub mod client;

#[cfg(feature = "http-server")]
pub mod webhook;

#[cfg(feature = "http-client")]
pub use client::{DEFAULT_API_URL, TelegramClient};

#[cfg(feature = "http-server")]
pub use webhook::{DEFAULT_WEBHOOK_PATH, WebhookServer};

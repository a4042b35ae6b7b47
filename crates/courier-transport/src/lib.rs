//! # Courier Transport
//!
//! Network transports for Courier bots.
//!
//! ## Features
//!
//! - `http-client`: [`TelegramClient`], the Bot API over HTTPS
//! - `http-server`: [`WebhookServer`], an axum endpoint receiving webhook updates
//! - `full`: both
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  courier-runtime     │  (polling loop, webhook mode)
//! ├──────────────────────┤
//! │  courier-transport   │  <- This crate
//! ├──────────────────────┤
//! │  Bot API (HTTPS)     │
//! └──────────────────────┘
//! ```
//!
//! ```rust,ignore
//! use courier_transport::TelegramClient;
//!
//! let client = TelegramClient::new(&token)?;
//! let me = client.get_me().await?;
//! ```

#[cfg(any(feature = "http-client", feature = "http-server"))]
pub mod http;

#[cfg(feature = "http-client")]
pub use http::{DEFAULT_API_URL, TelegramClient};

#[cfg(feature = "http-server")]
pub use http::{DEFAULT_WEBHOOK_PATH, WebhookServer};

//! # Courier
//!
//! A Telegram bot framework built around an ordered chain of handlers.
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌─────────┐   ┌─────────┐
//! │ Polling loop │────▶│ UpdateDelegate │────▶│ handler │──▶│ handler │──▶ ...
//! │ or webhook   │     │   (dispatch)   │     └─────────┘   └─────────┘
//! └──────────────┘     └────────────────┘
//! ```
//!
//! Each handler decides with `can_handle` whether it takes an update. The
//! first one that does runs and receives [`Next`](framework::Next), the rest
//! of the chain, which it may call once or not at all. When nobody takes an
//! update it is logged and dropped.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! struct Ping(CommandName);
//!
//! #[async_trait]
//! impl Command for Ping {
//!     fn name(&self) -> &CommandName {
//!         &self.0
//!     }
//!
//!     async fn handle_command(
//!         &self,
//!         ctx: &mut UpdateContext,
//!         _next: Next<'_>,
//!         _args: Vec<String>,
//!     ) -> HandlerResult {
//!         let chat = ctx.update().message().map(|m| m.chat.id).unwrap_or_default();
//!         ctx.bot().send_message(SendMessage::new(chat, "pong")).await?;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     CourierRuntime::builder()
//!         .handlers(|chain| chain.use_command(Ping(CommandName::new("ping")?)))
//!         .build()?
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*, `yaml-config`: configuration file formats
//! - `http-client` *(default)*: Bot API client over HTTPS
//! - `http-server` *(default)*: webhook mode
//! - `json-log`: JSON log output

pub use courier_core as core;
pub use courier_framework as framework;
pub use courier_runtime as runtime;
pub use courier_transport as transport;

/// Commonly used items for writing bots.
pub mod prelude {
    pub use courier_runtime::{ConfigLoader, CourierConfig, CourierRuntime, DeliveryMode};

    pub use courier_framework::{
        BotBuilder, Command, CommandName, HandlerResult, Next, UpdateContextExt, UpdateDelegate,
        UpdateHandler, parse_args,
    };

    pub use courier_core::{
        AnswerCallbackQuery, ApiError, Bot, BotApi, BoxError, Message, SendMessage, SendSticker,
        ServiceProvider, ServiceScope, Update, UpdateContext,
    };

    pub use courier_core::async_trait;
}

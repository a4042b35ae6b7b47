//! # Courier Core
//!
//! Shared building blocks of the Courier Telegram bot framework.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! - **Update model**: serde types for Bot API updates ([`Update`], [`Message`], [`MessageEntity`])
//! - **Context**: the per-update value handlers work on ([`UpdateContext`])
//! - **Services**: root registry and per-update scope ([`ServiceProvider`], [`ServiceScope`])
//! - **Errors**: [`ConfigurationError`], [`ValidationError`], [`ServiceError`]
//!
//! ### Integration Layer
//!
//! - **Bot API**: the remote calls the framework relies on ([`BotApi`], [`ApiError`])
//! - **Bot identity**: username plus API handle ([`Bot`])
//!
//! Handler composition lives in `courier-framework`; polling and configuration
//! live in `courier-runtime`.

pub mod foundation;
pub mod integration;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use foundation::context::{UpdateContext, WEBHOOK_ORIGIN, WebhookOrigin};
pub use foundation::error::{
    BoxError, ConfigurationError, ConfigurationResult, ServiceError, ServiceResult,
    ValidationError, ValidationResult,
};
pub use foundation::services::{ServiceProvider, ServiceProviderBuilder, ServiceScope};
pub use foundation::update::{
    CallbackQuery, Chat, EntityKind, Location, Message, MessageEntity, Sticker, Update,
    UpdateKind, User, utf16_slice,
};
pub use integration::api::{
    AnswerCallbackQuery, ApiError, ApiResult, BotApi, DeleteWebhook, GetUpdates, SendMessage,
    SendSticker, SetWebhook,
};
pub use integration::bot::Bot;

// Re-export for implementors of `BotApi`.
pub use async_trait::async_trait;

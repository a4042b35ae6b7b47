//! The remote Bot API as seen by the framework.
//!
//! [`BotApi`] lists the calls the framework and typical handlers make. The
//! framework only ever invokes it; `courier-transport` provides the HTTP
//! implementation and tests provide fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::foundation::update::{Message, Update, User};

/// Result type for remote calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No client is available to make the call.
    #[error("bot API is not connected")]
    NotConnected,

    /// The request did not complete in time.
    #[error("bot API call timed out")]
    Timeout,

    /// The API answered with `ok: false`.
    #[error("bot API error ({code}): {description}")]
    Api { code: i32, description: String },

    /// Request or response body could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Network level failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    pub fn api(code: i32, description: impl Into<String>) -> Self {
        Self::Api {
            code,
            description: description.into(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Parameters of `getUpdates`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUpdates {
    /// Identifier of the first update to return.
    pub offset: i64,
    /// Long-poll timeout in seconds.
    pub timeout: u32,
    /// Update kinds to receive. Always sent: an empty list selects every
    /// default kind, while an omitted one keeps the previously set filter.
    #[serde(default)]
    pub allowed_updates: Vec<String>,
}

/// Parameters of `sendMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
}

impl SendMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_to_message_id: None,
            parse_mode: None,
        }
    }

    /// Sends the message as a reply to `message_id`.
    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }

    pub fn parse_mode(mut self, mode: impl Into<String>) -> Self {
        self.parse_mode = Some(mode.into());
        self
    }
}

/// Parameters of `sendSticker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendSticker {
    pub chat_id: i64,
    /// File id of a sticker already on the server.
    pub sticker: String,
}

/// Parameters of `answerCallbackQuery`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCallbackQuery {
    pub callback_query_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub show_alert: bool,
}

/// Parameters of `setWebhook`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetWebhook {
    pub url: String,
    #[serde(default)]
    pub drop_pending_updates: bool,
}

/// Parameters of `deleteWebhook`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteWebhook {
    pub drop_pending_updates: bool,
}

// =============================================================================
// BotApi
// =============================================================================

/// Remote calls available to the framework and handlers.
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Long-polls for updates. Blocks server side for up to `request.timeout`
    /// seconds and returns an empty batch if nothing arrived.
    async fn get_updates(&self, request: &GetUpdates) -> ApiResult<Vec<Update>>;

    /// Removes the webhook so that `getUpdates` can be used.
    async fn delete_webhook(&self, request: DeleteWebhook) -> ApiResult<()>;

    async fn set_webhook(&self, request: SetWebhook) -> ApiResult<()>;

    /// Returns the bot's own account.
    async fn get_me(&self) -> ApiResult<User>;

    async fn send_message(&self, request: SendMessage) -> ApiResult<Message>;

    async fn send_sticker(&self, request: SendSticker) -> ApiResult<Message>;

    async fn answer_callback_query(&self, request: AnswerCallbackQuery) -> ApiResult<()>;
}

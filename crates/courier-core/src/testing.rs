//! Test doubles for code built on the framework.
//!
//! Compiled for this crate's own tests and, for dependants, behind the
//! `testing` feature.

use std::sync::Arc;

use async_trait::async_trait;

use crate::foundation::update::{Message, Update, User};
use crate::integration::api::{
    AnswerCallbackQuery, ApiError, ApiResult, BotApi, DeleteWebhook, GetUpdates, SendMessage,
    SendSticker, SetWebhook,
};
use crate::integration::bot::Bot;

/// API that refuses every call with [`ApiError::NotConnected`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineApi;

#[async_trait]
impl BotApi for OfflineApi {
    async fn get_updates(&self, _request: &GetUpdates) -> ApiResult<Vec<Update>> {
        Err(ApiError::NotConnected)
    }

    async fn delete_webhook(&self, _request: DeleteWebhook) -> ApiResult<()> {
        Err(ApiError::NotConnected)
    }

    async fn set_webhook(&self, _request: SetWebhook) -> ApiResult<()> {
        Err(ApiError::NotConnected)
    }

    async fn get_me(&self) -> ApiResult<User> {
        Err(ApiError::NotConnected)
    }

    async fn send_message(&self, _request: SendMessage) -> ApiResult<Message> {
        Err(ApiError::NotConnected)
    }

    async fn send_sticker(&self, _request: SendSticker) -> ApiResult<Message> {
        Err(ApiError::NotConnected)
    }

    async fn answer_callback_query(&self, _request: AnswerCallbackQuery) -> ApiResult<()> {
        Err(ApiError::NotConnected)
    }
}

/// A [`Bot`] backed by [`OfflineApi`].
pub fn offline_bot(username: Option<&str>) -> Bot {
    Bot::new(Arc::new(OfflineApi), username)
}

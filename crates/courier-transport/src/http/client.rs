//! Bot API client over HTTPS.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use courier_core::{
    AnswerCallbackQuery, ApiError, ApiResult, BotApi, DeleteWebhook, GetUpdates, Message,
    SendMessage, SendSticker, SetWebhook, Update, User,
};

/// Public Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Extra time allowed on top of the long-poll timeout before a `getUpdates`
/// request is abandoned.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// [`BotApi`] implementation backed by `reqwest`.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    /// `{api_url}/bot{token}`; never logged.
    base_url: String,
}

impl TelegramClient {
    /// Creates a client for the public endpoint with a 30 second request timeout.
    pub fn new(token: &str) -> ApiResult<Self> {
        Self::with_options(DEFAULT_API_URL, token, Duration::from_secs(30))
    }

    /// Creates a client for a custom endpoint, such as a local Bot API server.
    pub fn with_options(api_url: &str, token: &str, timeout: Duration) -> ApiResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Calls `method` with a JSON body and unwraps the response envelope.
    pub async fn call<P, R>(&self, method: &str, params: &P) -> ApiResult<R>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        self.call_with_timeout(method, params, None).await
    }

    async fn call_with_timeout<P, R>(
        &self,
        method: &str,
        params: &P,
        timeout: Option<Duration>,
    ) -> ApiResult<R>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        trace!(method, "Calling Bot API");

        let mut request = self.client.post(self.method_url(method)).json(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        let envelope: Envelope<R> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(ApiError::api(
                    i32::from(status.as_u16()),
                    String::from_utf8_lossy(&body),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        envelope.into_result(method)
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient").finish_non_exhaustive()
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        // The URL carries the token.
        ApiError::Transport(err.without_url().to_string())
    }
}

/// `{ ok, result, description, error_code }` wrapper of every response.
#[derive(Debug, serde::Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i32>,
}

impl<T> Envelope<T> {
    fn into_result(self, method: &str) -> ApiResult<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(ApiError::Serialization(format!(
                "{method} returned ok without a result"
            ))),
            (false, _) => {
                let code = self.error_code.unwrap_or_default();
                let description = self.description.unwrap_or_default();
                debug!(method, code, %description, "Bot API call failed");
                Err(ApiError::Api { code, description })
            }
        }
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn get_updates(&self, request: &GetUpdates) -> ApiResult<Vec<Update>> {
        let timeout = Duration::from_secs(u64::from(request.timeout)) + POLL_GRACE;
        self.call_with_timeout("getUpdates", request, Some(timeout))
            .await
    }

    async fn delete_webhook(&self, request: DeleteWebhook) -> ApiResult<()> {
        self.call::<_, Value>("deleteWebhook", &request).await?;
        Ok(())
    }

    async fn set_webhook(&self, request: SetWebhook) -> ApiResult<()> {
        self.call::<_, Value>("setWebhook", &request).await?;
        Ok(())
    }

    async fn get_me(&self) -> ApiResult<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    async fn send_message(&self, request: SendMessage) -> ApiResult<Message> {
        self.call("sendMessage", &request).await
    }

    async fn send_sticker(&self, request: SendSticker) -> ApiResult<Message> {
        self.call("sendSticker", &request).await
    }

    async fn answer_callback_query(&self, request: AnswerCallbackQuery) -> ApiResult<()> {
        self.call::<_, Value>("answerCallbackQuery", &request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: DeserializeOwned>(json: &str) -> ApiResult<T> {
        serde_json::from_str::<Envelope<T>>(json)
            .unwrap()
            .into_result("test")
    }

    #[test]
    fn test_method_url() {
        let client =
            TelegramClient::with_options("http://localhost:8081/", "123:abc", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            client.method_url("getMe"),
            "http://localhost:8081/bot123:abc/getMe"
        );
    }

    #[test]
    fn test_envelope_ok() {
        let updates: Vec<Update> = parse(r#"{"ok": true, "result": [{"update_id": 3}]}"#).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].id, 3);
    }

    #[test]
    fn test_envelope_error() {
        let err = parse::<Value>(
            r#"{"ok": false, "error_code": 409, "description": "Conflict: terminated by other getUpdates request"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Api { code: 409, .. }));
    }

    #[test]
    fn test_envelope_without_result() {
        let err = parse::<Value>(r#"{"ok": true}"#).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = TelegramClient::new("123:secret").unwrap();
        assert!(!format!("{client:?}").contains("secret"));
    }
}

//! Runtime orchestration.
//!
//! ```rust,ignore
//! use courier_runtime::CourierRuntime;
//!
//! let delegate = BotBuilder::new().use_command(PingCommand).build();
//!
//! CourierRuntime::builder()
//!     .config_file("courier.toml")
//!     .delegate(delegate)
//!     .build()?
//!     .run()
//!     .await?;
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use courier_core::{Bot, BotApi, ServiceProvider, SetWebhook};
use courier_framework::{BotBuilder, UpdateDelegate};

use crate::config::{ConfigLoader, CourierConfig, DeliveryMode, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use crate::polling::{PollingOptions, UpdatePollingManager};

/// Runs one bot in polling or webhook mode until shutdown.
pub struct CourierRuntime {
    config: CourierConfig,
    bot: Bot,
    services: Arc<ServiceProvider>,
    delegate: UpdateDelegate,
}

impl CourierRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn delegate(&self) -> &UpdateDelegate {
        &self.delegate
    }

    /// Registers the configured public URL with `setWebhook`.
    ///
    /// Returns `false` without calling the API when no URL is configured,
    /// leaving any existing registration in place.
    pub async fn ensure_webhook_set(&self) -> RuntimeResult<bool> {
        let Some(url) = self.config.webhook.url.clone() else {
            info!("No webhook URL configured, keeping the current registration");
            return Ok(false);
        };

        info!(url = %url, "Registering webhook");
        self.bot
            .set_webhook(SetWebhook {
                url,
                drop_pending_updates: false,
            })
            .await
            .map_err(RuntimeError::Webhook)?;
        Ok(true)
    }

    /// Runs until Ctrl+C or SIGTERM, or until polling fails.
    pub async fn run(self) -> RuntimeResult<()> {
        info!(mode = ?self.config.mode, "Courier runtime is running. Press Ctrl+C to stop.");
        self.run_until(wait_for_shutdown()).await
    }

    /// Runs until `shutdown` completes, or until polling fails.
    ///
    /// A polling fault is returned as [`RuntimeError::Polling`]; a requested
    /// stop returns `Ok`.
    pub async fn run_until<F>(self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let result = match self.config.mode {
            DeliveryMode::Polling => self.run_polling(shutdown).await,
            DeliveryMode::Webhook => self.run_webhook(shutdown).await,
        };
        info!("Courier runtime stopped");
        result
    }

    async fn run_polling<F>(self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let options = PollingOptions::from(&self.config.polling);
        let handle = UpdatePollingManager::new(self.bot, self.services, self.delegate, options)
            .spawn(CancellationToken::new());
        let cancel = handle.cancellation_token();

        let join = handle.join();
        tokio::pin!(join);
        tokio::select! {
            result = &mut join => return result.map_err(RuntimeError::from),
            () = shutdown => cancel.cancel(),
        }
        join.await.map_err(RuntimeError::from)
    }

    #[cfg(feature = "http-server")]
    async fn run_webhook<F>(self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        use courier_transport::http::WebhookServer;

        self.ensure_webhook_set().await?;

        let cancel = CancellationToken::new();
        let server = WebhookServer::new(self.bot, self.services, self.delegate)
            .path(&self.config.webhook.path);

        let serve = server.serve(&self.config.webhook.listen, cancel.clone());
        tokio::pin!(serve);
        tokio::select! {
            result = &mut serve => return result.map_err(RuntimeError::from),
            () = shutdown => cancel.cancel(),
        }
        serve.await.map_err(RuntimeError::from)
    }

    #[cfg(not(feature = "http-server"))]
    async fn run_webhook<F>(self, _shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        Err(RuntimeError::ModeUnavailable(DeliveryMode::Webhook))
    }
}

impl std::fmt::Debug for CourierRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourierRuntime")
            .field("mode", &self.config.mode)
            .field("bot", &self.bot)
            .field("delegate", &self.delegate)
            .finish_non_exhaustive()
    }
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/// Assembles a [`CourierRuntime`] from configuration, handlers and services.
pub struct RuntimeBuilder {
    loader: ConfigLoader,
    config: Option<CourierConfig>,
    api: Option<Arc<dyn BotApi>>,
    services: Option<Arc<ServiceProvider>>,
    delegate: Option<UpdateDelegate>,
    init_logging: bool,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            loader: ConfigLoader::new(),
            config: None,
            api: None,
            services: None,
            delegate: None,
            init_logging: true,
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.loader = self.loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.loader = self.loader.without_env();
        self
    }

    /// Uses `config` as is instead of loading files and environment.
    pub fn config(mut self, config: CourierConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Uses `api` instead of the HTTP client built from `bot.api_url`.
    pub fn api(mut self, api: Arc<dyn BotApi>) -> Self {
        self.api = Some(api);
        self
    }

    pub fn services(mut self, services: Arc<ServiceProvider>) -> Self {
        self.services = Some(services);
        self
    }

    pub fn delegate(mut self, delegate: UpdateDelegate) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Builds the handler chain in place.
    pub fn handlers(self, configure: impl FnOnce(BotBuilder) -> BotBuilder) -> Self {
        self.delegate(configure(BotBuilder::new()).build())
    }

    /// Leaves the global tracing subscriber alone.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    /// Loads and validates configuration, sets up logging and the API client.
    pub fn build(self) -> RuntimeResult<CourierRuntime> {
        let config = match self.config {
            Some(config) => config,
            None => self.loader.load()?,
        };
        validate_config(&config)?;

        if self.init_logging {
            logging::init_from_config(&config.logging);
        }

        let api = match self.api {
            Some(api) => api,
            None => default_api(&config)?,
        };
        let bot = Bot::new(api, config.bot.username.as_deref());
        let delegate = self.delegate.unwrap_or_else(|| {
            warn!("No handlers registered, every update will go unmatched");
            BotBuilder::new().build()
        });

        info!(
            mode = ?config.mode,
            handlers = delegate.handler_count(),
            username = bot.username().unwrap_or("<unknown>"),
            "Runtime initialized from configuration"
        );

        Ok(CourierRuntime {
            config,
            bot,
            services: self.services.unwrap_or_else(ServiceProvider::empty),
            delegate,
        })
    }
}

#[cfg(feature = "http-client")]
fn default_api(config: &CourierConfig) -> RuntimeResult<Arc<dyn BotApi>> {
    use courier_transport::http::TelegramClient;

    let token = config.bot.api_token.as_deref().unwrap_or_default();
    let client = TelegramClient::with_options(&config.bot.api_url, token, config.bot.request_timeout())
        .map_err(RuntimeError::Client)?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "http-client"))]
fn default_api(_config: &CourierConfig) -> RuntimeResult<Arc<dyn BotApi>> {
    Err(RuntimeError::NoApiClient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PollingError;
    use async_trait::async_trait;
    use courier_core::{
        AnswerCallbackQuery, ApiError, ApiResult, DeleteWebhook, GetUpdates, Message, SendMessage,
        SendSticker, Update, User,
    };
    use parking_lot::Mutex;

    /// Records webhook registrations. `getUpdates` fails at once when
    /// `fail_fetch` is set and never completes otherwise.
    #[derive(Default)]
    struct RecordingApi {
        webhooks: Mutex<Vec<SetWebhook>>,
        fail_fetch: bool,
    }

    #[async_trait]
    impl BotApi for RecordingApi {
        async fn get_updates(&self, _request: &GetUpdates) -> ApiResult<Vec<Update>> {
            if self.fail_fetch {
                return Err(ApiError::api(409, "Conflict"));
            }
            std::future::pending().await
        }

        async fn delete_webhook(&self, _request: DeleteWebhook) -> ApiResult<()> {
            Ok(())
        }

        async fn set_webhook(&self, request: SetWebhook) -> ApiResult<()> {
            self.webhooks.lock().push(request);
            Ok(())
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

    fn config() -> CourierConfig {
        let mut config = CourierConfig::default();
        config.bot.api_token = Some("123:abc".to_string());
        config.bot.username = Some("runtime_bot".to_string());
        config.polling.start_delay_ms = 0;
        config
    }

    fn runtime(config: CourierConfig, api: &Arc<RecordingApi>) -> CourierRuntime {
        CourierRuntime::builder()
            .without_logging()
            .config(config)
            .api(Arc::clone(api) as Arc<dyn BotApi>)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let result = CourierRuntime::builder()
            .without_logging()
            .config(CourierConfig::default())
            .api(Arc::new(RecordingApi::default()))
            .build();
        assert!(matches!(result, Err(RuntimeError::Config(_))));
    }

    #[test]
    fn test_build_uses_configured_username() {
        let api = Arc::new(RecordingApi::default());
        let runtime = runtime(config(), &api);
        assert_eq!(runtime.bot().username(), Some("runtime_bot"));
        assert_eq!(runtime.delegate().handler_count(), 0);
    }

    #[tokio::test]
    async fn test_polling_stops_on_shutdown() {
        let api = Arc::new(RecordingApi::default());
        let result = runtime(config(), &api).run_until(async {}).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_polling_fault_is_returned() {
        let api = Arc::new(RecordingApi {
            fail_fetch: true,
            ..Default::default()
        });
        let result = runtime(config(), &api)
            .run_until(std::future::pending())
            .await;

        assert!(matches!(
            result,
            Err(RuntimeError::Polling(PollingError::Fetch(ApiError::Api { code: 409, .. })))
        ));
    }

    #[tokio::test]
    async fn test_ensure_webhook_set() {
        let api = Arc::new(RecordingApi::default());
        assert!(!runtime(config(), &api).ensure_webhook_set().await.unwrap());
        assert!(api.webhooks.lock().is_empty());

        let mut with_url = config();
        with_url.webhook.url = Some("https://example.org/bot/webhook".to_string());
        assert!(runtime(with_url, &api).ensure_webhook_set().await.unwrap());
        assert_eq!(api.webhooks.lock()[0].url, "https://example.org/bot/webhook");
    }
}

//! Long-polling update source.
//!
//! [`UpdatePollingManager`] turns `getUpdates` into a continuous stream:
//!
//! ```text
//! Idle --(start delay, deleteWebhook)--> Running --(cancel | fault)--> Stopped
//! ```
//!
//! While running, each iteration fetches a batch starting at the delivery
//! offset, dispatches the updates one at a time in ascending id order (each
//! with a fresh service scope), then moves the offset past the highest id.
//! A failed fetch or dispatch ends the loop; nothing is retried.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, trace};

use courier_core::{Bot, DeleteWebhook, GetUpdates, ServiceProvider, Update, UpdateContext};
use courier_framework::UpdateDelegate;

use crate::config::PollingConfig;
use crate::error::{PollingError, PollingResult};

/// Lifecycle of a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollingState {
    /// Created, or waiting out the start delay.
    Idle,
    /// Fetching and dispatching.
    Running,
    /// Cancelled or failed. Terminal.
    Stopped,
}

/// Settings of one polling loop.
#[derive(Debug, Clone)]
pub struct PollingOptions {
    pub start_delay: Duration,
    /// Long-poll timeout sent to the server, in seconds.
    pub timeout_secs: u32,
    pub allowed_updates: Vec<String>,
    pub drop_pending_updates: bool,
}

impl Default for PollingOptions {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for PollingOptions {
    fn from(config: &PollingConfig) -> Self {
        Self {
            start_delay: config.start_delay(),
            timeout_secs: config.timeout_secs,
            allowed_updates: config.allowed_updates.clone(),
            drop_pending_updates: config.drop_pending_updates,
        }
    }
}

/// Fetches updates for one bot and feeds them to an [`UpdateDelegate`].
///
/// The manager owns the delivery offset; nothing else reads or writes it.
pub struct UpdatePollingManager {
    bot: Bot,
    services: Arc<ServiceProvider>,
    delegate: UpdateDelegate,
    options: PollingOptions,
    offset: i64,
    state: watch::Sender<PollingState>,
}

impl UpdatePollingManager {
    pub fn new(
        bot: Bot,
        services: Arc<ServiceProvider>,
        delegate: UpdateDelegate,
        options: PollingOptions,
    ) -> Self {
        let (state, _) = watch::channel(PollingState::Idle);
        Self {
            bot,
            services,
            delegate,
            options,
            offset: 0,
            state,
        }
    }

    pub fn state(&self) -> PollingState {
        *self.state.borrow()
    }

    /// Observes state transitions, including the final `Stopped`.
    pub fn subscribe(&self) -> watch::Receiver<PollingState> {
        self.state.subscribe()
    }

    /// Runs until `cancel` fires or an error occurs.
    ///
    /// Never returns `Ok`: a requested stop is reported as
    /// [`PollingError::Cancelled`], anything else is a fault.
    pub async fn run(mut self, cancel: CancellationToken) -> PollingResult<Infallible> {
        let Err(err) = self.poll(&cancel).await;
        self.state.send_replace(PollingState::Stopped);
        debug!(offset = self.offset, reason = %err, "Polling stopped");
        Err(err)
    }

    /// Runs the loop on its own task.
    ///
    /// The returned handle cancels the loop and reports how it ended.
    pub fn spawn(self, cancel: CancellationToken) -> PollingHandle {
        let state = self.subscribe();
        let token = cancel.clone();
        let task = tokio::spawn(
            async move {
                let Err(err) = self.run(token).await;
                if !err.is_cancelled() {
                    error!(error = %err, "Polling failed");
                }
                err
            }
            .instrument(info_span!("polling")),
        );

        PollingHandle {
            cancel,
            state,
            task,
        }
    }

    async fn poll(&mut self, cancel: &CancellationToken) -> PollingResult<Infallible> {
        if !self.options.start_delay.is_zero() {
            debug!(delay = ?self.options.start_delay, "Waiting before polling");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PollingError::Cancelled),
                _ = tokio::time::sleep(self.options.start_delay) => {}
            }
        }

        self.state.send_replace(PollingState::Running);
        info!(timeout_secs = self.options.timeout_secs, "Polling started");

        let delete = DeleteWebhook {
            drop_pending_updates: self.options.drop_pending_updates,
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollingError::Cancelled),
            result = self.bot.delete_webhook(delete) => {
                result.map_err(PollingError::DeleteWebhook)?;
            }
        }

        loop {
            if cancel.is_cancelled() {
                return Err(PollingError::Cancelled);
            }

            let request = GetUpdates {
                offset: self.offset,
                timeout: self.options.timeout_secs,
                allowed_updates: self.options.allowed_updates.clone(),
            };
            trace!(offset = self.offset, "Fetching updates");

            let mut batch = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PollingError::Cancelled),
                result = self.bot.get_updates(&request) => result.map_err(PollingError::Fetch)?,
            };

            batch.sort_by_key(|update| update.id);
            let Some(highest) = batch.last().map(|update| update.id) else {
                continue;
            };
            debug!(count = batch.len(), offset = self.offset, "Received updates");

            for update in batch {
                self.dispatch(update).await?;
            }
            self.offset = self.offset.max(highest + 1);
        }
    }

    async fn dispatch(&self, update: Update) -> PollingResult<()> {
        let update_id = update.id;
        let mut ctx = UpdateContext::with_provider(self.bot.clone(), update, &self.services);
        self.delegate
            .dispatch(&mut ctx)
            .await
            .map_err(|source| PollingError::Dispatch { update_id, source })
    }
}

impl std::fmt::Debug for UpdatePollingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdatePollingManager")
            .field("offset", &self.offset)
            .field("state", &self.state())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Owner's side of a spawned polling loop.
#[derive(Debug)]
pub struct PollingHandle {
    cancel: CancellationToken,
    state: watch::Receiver<PollingState>,
    task: JoinHandle<PollingError>,
}

impl PollingHandle {
    pub fn state(&self) -> PollingState {
        *self.state.borrow()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Requests a stop. The loop notices before its next fetch, or aborts a
    /// pending one; a dispatch in progress is allowed to finish.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the loop to end.
    ///
    /// Returns `Ok` if it was cancelled and the fault otherwise.
    pub async fn join(self) -> PollingResult<()> {
        match self.task.await {
            Ok(PollingError::Cancelled) => Ok(()),
            Ok(err) => Err(err),
            Err(join_err) => Err(PollingError::Aborted(join_err.to_string())),
        }
    }

    /// Cancels the loop and waits for it to end.
    pub async fn shutdown(self) -> PollingResult<()> {
        self.cancel();
        self.join().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use courier_core::{
        AnswerCallbackQuery, ApiError, ApiResult, BotApi, Message, SendMessage, SendSticker,
        SetWebhook, User,
    };
    use courier_framework::{BotBuilder, HandlerResult, Next, UpdateHandler};
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves scripted `getUpdates` results, then cancels `done` and returns
    /// empty batches.
    struct ScriptedApi {
        batches: Mutex<VecDeque<ApiResult<Vec<Update>>>>,
        requests: Mutex<Vec<GetUpdates>>,
        deletes: Mutex<Vec<DeleteWebhook>>,
        done: CancellationToken,
    }

    impl ScriptedApi {
        fn new(batches: Vec<ApiResult<Vec<Update>>>, done: CancellationToken) -> Arc<Self> {
            Arc::new(Self {
                batches: Mutex::new(batches.into()),
                requests: Mutex::new(Vec::new()),
                deletes: Mutex::new(Vec::new()),
                done,
            })
        }

        fn offsets(&self) -> Vec<i64> {
            self.requests.lock().iter().map(|r| r.offset).collect()
        }
    }

    #[async_trait]
    impl BotApi for ScriptedApi {
        async fn get_updates(&self, request: &GetUpdates) -> ApiResult<Vec<Update>> {
            self.requests.lock().push(request.clone());
            let next = self.batches.lock().pop_front();
            match next {
                Some(batch) => batch,
                None => {
                    self.done.cancel();
                    Ok(Vec::new())
                }
            }
        }

        async fn delete_webhook(&self, request: DeleteWebhook) -> ApiResult<()> {
            self.deletes.lock().push(request);
            Ok(())
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

    /// Records update ids; fails on `fail_on`.
    struct Recorder {
        seen: Arc<Mutex<Vec<i64>>>,
        fail_on: Option<i64>,
    }

    #[async_trait]
    impl UpdateHandler for Recorder {
        async fn handle(&self, ctx: &mut UpdateContext, _next: Next<'_>) -> HandlerResult {
            let id = ctx.update().id;
            if self.fail_on == Some(id) {
                return Err(format!("cannot handle {id}").into());
            }
            self.seen.lock().push(id);
            Ok(())
        }
    }

    fn update(id: i64) -> Update {
        Update {
            id,
            ..Default::default()
        }
    }

    fn options() -> PollingOptions {
        PollingOptions {
            start_delay: Duration::ZERO,
            timeout_secs: 5,
            allowed_updates: vec!["message".to_string()],
            drop_pending_updates: true,
        }
    }

    fn manager(
        api: &Arc<ScriptedApi>,
        seen: &Arc<Mutex<Vec<i64>>>,
        fail_on: Option<i64>,
        options: PollingOptions,
    ) -> UpdatePollingManager {
        let delegate = BotBuilder::new()
            .use_handler(Recorder {
                seen: Arc::clone(seen),
                fail_on,
            })
            .build();
        let bot = Bot::new(Arc::clone(api) as Arc<dyn BotApi>, Some("poll_bot"));
        UpdatePollingManager::new(bot, ServiceProvider::empty(), delegate, options)
    }

    /// Identity of one scoped service instance.
    struct Serial(usize);

    /// Resolves [`Serial`] twice per update and records `(update, serial)`.
    struct ScopeRecorder(Arc<Mutex<Vec<(i64, usize)>>>);

    #[async_trait]
    impl UpdateHandler for ScopeRecorder {
        async fn handle(&self, ctx: &mut UpdateContext, _next: Next<'_>) -> HandlerResult {
            let first = ctx.services().require::<Serial>()?;
            let second = ctx.services().require::<Serial>()?;
            assert!(Arc::ptr_eq(&first, &second));
            self.0.lock().push((ctx.update().id, first.0));
            Ok(())
        }
    }

    /// Logs entry, sleeps, then logs exit.
    struct Sleeper(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl UpdateHandler for Sleeper {
        async fn handle(&self, ctx: &mut UpdateContext, _next: Next<'_>) -> HandlerResult {
            let id = ctx.update().id;
            self.0.lock().push(format!("start {id}"));
            tokio::time::sleep(Duration::from_secs(3)).await;
            self.0.lock().push(format!("end {id}"));
            Ok(())
        }
    }

    fn bot_for(api: &Arc<ScriptedApi>) -> Bot {
        Bot::new(Arc::clone(api) as Arc<dyn BotApi>, Some("poll_bot"))
    }

    #[tokio::test]
    async fn test_each_update_gets_a_fresh_scope() {
        let cancel = CancellationToken::new();
        let api = ScriptedApi::new(
            vec![Ok(vec![update(1), update(2)]), Ok(vec![update(3)])],
            cancel.clone(),
        );
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let services = ServiceProvider::builder()
            .scoped(move |_| Ok(Serial(counter.fetch_add(1, Ordering::SeqCst))))
            .build();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let delegate = BotBuilder::new()
            .use_handler(ScopeRecorder(Arc::clone(&seen)))
            .build();

        let err = UpdatePollingManager::new(bot_for(&api), services, delegate, options())
            .run(cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(*seen.lock(), [(1, 0), (2, 1), (3, 2)]);
        assert_eq!(created.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_update_waits_for_suspended_handler() {
        let cancel = CancellationToken::new();
        let api = ScriptedApi::new(vec![Ok(vec![update(1), update(2)])], cancel.clone());
        let events = Arc::new(Mutex::new(Vec::new()));
        let delegate = BotBuilder::new()
            .use_handler(Sleeper(Arc::clone(&events)))
            .build();

        let err = UpdatePollingManager::new(
            bot_for(&api),
            ServiceProvider::empty(),
            delegate,
            options(),
        )
        .run(cancel)
        .await
        .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(*events.lock(), ["start 1", "end 1", "start 2", "end 2"]);
        // The offset only moves once the whole batch is done.
        assert_eq!(api.offsets(), [0, 3]);
    }

    #[tokio::test]
    async fn test_offset_advances_past_highest_id() {
        let cancel = CancellationToken::new();
        let api = ScriptedApi::new(
            vec![
                Ok(vec![update(10), update(11), update(12)]),
                Ok(Vec::new()),
                Ok(vec![update(13)]),
            ],
            cancel.clone(),
        );
        let seen = Arc::new(Mutex::new(Vec::new()));

        let err = manager(&api, &seen, None, options())
            .run(cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(*seen.lock(), [10, 11, 12, 13]);
        // An empty batch keeps the offset.
        assert_eq!(api.offsets(), [0, 13, 13, 14]);
    }

    #[tokio::test]
    async fn test_batch_is_dispatched_in_id_order() {
        let cancel = CancellationToken::new();
        let api = ScriptedApi::new(
            vec![Ok(vec![update(7), update(5), update(6)])],
            cancel.clone(),
        );
        let seen = Arc::new(Mutex::new(Vec::new()));

        let _ = manager(&api, &seen, None, options()).run(cancel).await;

        assert_eq!(*seen.lock(), [5, 6, 7]);
        assert_eq!(api.offsets(), [0, 8]);
    }

    #[tokio::test]
    async fn test_request_carries_options() {
        let cancel = CancellationToken::new();
        let api = ScriptedApi::new(Vec::new(), cancel.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let _ = manager(&api, &seen, None, options()).run(cancel).await;

        assert_eq!(
            *api.deletes.lock(),
            [DeleteWebhook {
                drop_pending_updates: true
            }]
        );
        let request = api.requests.lock()[0].clone();
        assert_eq!(request.timeout, 5);
        assert_eq!(request.allowed_updates, ["message"]);
    }

    #[tokio::test]
    async fn test_cancel_before_start_skips_fetch() {
        let cancel = CancellationToken::new();
        let api = ScriptedApi::new(vec![Ok(vec![update(1)])], CancellationToken::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let manager = manager(&api, &seen, None, options());
        let mut state = manager.subscribe();

        cancel.cancel();
        let err = manager.run(cancel).await.unwrap_err();

        assert!(matches!(err, PollingError::Cancelled));
        assert!(api.requests.lock().is_empty());
        assert!(seen.lock().is_empty());
        assert_eq!(*state.borrow_and_update(), PollingState::Stopped);
    }

    #[tokio::test]
    async fn test_dispatch_error_stops_loop() {
        let cancel = CancellationToken::new();
        let api = ScriptedApi::new(
            vec![Ok(vec![update(1), update(2), update(3)]), Ok(vec![update(4)])],
            cancel.clone(),
        );
        let seen = Arc::new(Mutex::new(Vec::new()));

        let err = manager(&api, &seen, Some(2), options())
            .run(cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PollingError::Dispatch { update_id: 2, .. }));
        assert_eq!(*seen.lock(), [1]);
        assert_eq!(api.offsets(), [0]);
    }

    #[tokio::test]
    async fn test_fetch_error_is_not_retried() {
        let cancel = CancellationToken::new();
        let api = ScriptedApi::new(
            vec![Err(ApiError::api(401, "Unauthorized"))],
            cancel.clone(),
        );
        let seen = Arc::new(Mutex::new(Vec::new()));

        let err = manager(&api, &seen, None, options())
            .run(cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PollingError::Fetch(ApiError::Api { code: 401, .. })));
        assert_eq!(api.requests.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_delay_keeps_idle() {
        let cancel = CancellationToken::new();
        let api = ScriptedApi::new(Vec::new(), CancellationToken::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let options = PollingOptions {
            start_delay: Duration::from_secs(2),
            ..options()
        };

        let handle = manager(&api, &seen, None, options).spawn(cancel);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(handle.state(), PollingState::Idle);
        assert!(api.deletes.lock().is_empty());

        assert!(handle.shutdown().await.is_ok());
        assert!(api.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_handle_reports_fault() {
        let api = ScriptedApi::new(vec![Err(ApiError::Timeout)], CancellationToken::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let handle = manager(&api, &seen, None, options()).spawn(CancellationToken::new());
        let result = handle.join().await;

        assert!(matches!(result, Err(PollingError::Fetch(ApiError::Timeout))));
    }

    #[tokio::test]
    async fn test_handle_join_after_cancel_is_clean() {
        let cancel = CancellationToken::new();
        let api = ScriptedApi::new(vec![Ok(vec![update(1)])], cancel.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let handle = manager(&api, &seen, None, options()).spawn(cancel.clone());
        cancel.cancelled().await;

        assert!(handle.join().await.is_ok());
        assert_eq!(*seen.lock(), [1]);
    }
}

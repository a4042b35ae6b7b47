//! Handler chain construction.
//!
//! [`BotBuilder`] collects handlers in registration order and compiles them
//! into an [`UpdateDelegate`]: the function every update is dispatched through.
//!
//! # Ordering
//!
//! The first registered handler runs first. For each update the delegate walks
//! the chain, skipping handlers whose `can_handle` is false, and hands the
//! update to the first one that claims it. Whether the rest of the chain runs
//! is then up to that handler.
//!
//! ```rust,ignore
//! use courier_framework::BotBuilder;
//!
//! let delegate = BotBuilder::new()
//!     .use_handler(ExceptionHandler)   // wraps everything below
//!     .use_handler(WebhookLogger)
//!     .use_command(StartCommand::new())
//!     .register(
//!         |ctx| ctx.is_sticker_message_update(),
//!         |ctx, _next| Box::pin(async move { reply_with_sticker(ctx).await }),
//!     )
//!     .use_scoped::<TextEchoer>()
//!     .build();
//! ```
//!
//! # Errors
//!
//! Errors returned by a handler propagate out of [`UpdateDelegate::dispatch`]
//! unchanged. To recover from them, register a handler first that wraps
//! `next.run(ctx)` and inspects the result.

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tower::Service;
use tracing::{Instrument, Level, debug, span};

use courier_core::{BoxError, UpdateContext};

use crate::command::{Command, CommandHandler};
use crate::handler::{FnHandler, HandlerResult, Next, Scoped, UpdateHandler};

/// Accumulates handlers in the order they are registered.
#[derive(Default)]
pub struct BotBuilder {
    handlers: Vec<Arc<dyn UpdateHandler>>,
}

impl BotBuilder {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Appends a handler instance.
    pub fn use_handler<H: UpdateHandler>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Appends a handler already shared elsewhere.
    pub fn use_shared(mut self, handler: Arc<dyn UpdateHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Appends a handler resolved from the update scope on every dispatch.
    ///
    /// See [`Scoped`].
    pub fn use_scoped<H: UpdateHandler>(self) -> Self {
        self.use_handler(Scoped::<H>::new())
    }

    /// Appends a command handler.
    pub fn use_command<C: Command>(self, command: C) -> Self {
        self.use_handler(CommandHandler::new(command))
    }

    /// Appends a handler made of a predicate and an action.
    pub fn register<P, A>(self, predicate: P, action: A) -> Self
    where
        P: Fn(&UpdateContext) -> bool + Send + Sync + 'static,
        A: for<'a> Fn(&'a mut UpdateContext, Next<'a>) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.use_handler(FnHandler::new(predicate, action))
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Compiles the chain.
    ///
    /// The builder is consumed, so a compiled chain can never be changed by
    /// later registrations.
    pub fn build(self) -> UpdateDelegate {
        debug!(handlers = self.handlers.len(), "Handler chain compiled");
        UpdateDelegate {
            chain: self.handlers.into(),
        }
    }
}

impl std::fmt::Debug for BotBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotBuilder")
            .field("handler_count", &self.handlers.len())
            .finish()
    }
}

// =============================================================================
// UpdateDelegate
// =============================================================================

/// The compiled handler chain.
///
/// Cloning is cheap; all clones share the same chain.
#[derive(Clone)]
pub struct UpdateDelegate {
    chain: Arc<[Arc<dyn UpdateHandler>]>,
}

impl UpdateDelegate {
    /// Passes one update through the chain.
    ///
    /// Returns once the claiming handler (and whatever it let run after it)
    /// has finished, or after logging that no handler matched.
    pub async fn dispatch(&self, ctx: &mut UpdateContext) -> HandlerResult {
        let update = ctx.update();
        let span = span!(
            Level::DEBUG,
            "dispatch",
            update_id = update.id,
            kind = %update.kind()
        );

        Next::new(&self.chain).run(ctx).instrument(span).await
    }

    /// Returns the number of handlers in the chain.
    pub fn handler_count(&self) -> usize {
        self.chain.len()
    }
}

impl std::fmt::Debug for UpdateDelegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateDelegate")
            .field("handler_count", &self.chain.len())
            .finish()
    }
}

/// Lets the delegate sit behind tower middleware. The context is consumed.
impl Service<UpdateContext> for UpdateDelegate {
    type Response = ();
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<(), BoxError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut ctx: UpdateContext) -> Self::Future {
        let delegate = self.clone();
        Box::pin(async move { delegate.dispatch(&mut ctx).await })
    }
}

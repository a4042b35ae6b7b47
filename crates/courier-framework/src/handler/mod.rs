//! Update handlers and the chain continuation.
//!
//! A handler is a predicate plus an action:
//!
//! - [`UpdateHandler::can_handle`] decides whether the handler claims an update
//! - [`UpdateHandler::handle`] processes a claimed update and receives a
//!   [`Next`] for the rest of the chain
//!
//! A handler that does not claim an update is skipped at the cost of its
//! predicate. A handler that claims one either stops the chain (by dropping
//! `next`) or continues it with [`Next::run`], before or after doing its own
//! work.
//!
//! ```rust,ignore
//! struct Logger;
//!
//! #[async_trait]
//! impl UpdateHandler for Logger {
//!     async fn handle(&self, ctx: &mut UpdateContext, next: Next<'_>) -> HandlerResult {
//!         info!(update_id = ctx.update().id, "Received update");
//!         next.run(ctx).await
//!     }
//! }
//! ```

mod closure;
mod scoped;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, trace};

use courier_core::{BoxError, UpdateContext};

pub use closure::FnHandler;
pub use scoped::Scoped;

/// What a handler action returns.
pub type HandlerResult = Result<(), BoxError>;

/// A link in the handler chain.
#[async_trait]
pub trait UpdateHandler: Send + Sync + 'static {
    /// Whether this handler claims the update. Defaults to `true`.
    fn can_handle(&self, _ctx: &UpdateContext) -> bool {
        true
    }

    /// Processes a claimed update.
    ///
    /// Call `next.run(ctx)` to pass the update on. `Next` is consumed by
    /// `run`, so the rest of the chain runs at most once.
    async fn handle(&self, ctx: &mut UpdateContext, next: Next<'_>) -> HandlerResult;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// The part of the chain after the current handler.
pub struct Next<'a> {
    chain: &'a [Arc<dyn UpdateHandler>],
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [Arc<dyn UpdateHandler>]) -> Self {
        Self { chain }
    }

    /// Runs the first remaining handler that claims the update.
    ///
    /// Handlers that do not claim it are skipped. If none does, the update is
    /// logged as unhandled and `Ok(())` is returned. Errors from the claiming
    /// handler are returned unchanged.
    pub async fn run(self, ctx: &mut UpdateContext) -> HandlerResult {
        let mut remaining = self.chain;

        while let Some((handler, rest)) = remaining.split_first() {
            if handler.can_handle(ctx) {
                trace!(handler = handler.name(), "Handler claimed update");
                return handler.handle(ctx, Next::new(rest)).await;
            }
            remaining = rest;
        }

        no_handler_matched(ctx);
        Ok(())
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.chain.len())
            .finish()
    }
}

/// End of the chain.
fn no_handler_matched(ctx: &UpdateContext) {
    let update = ctx.update();
    info!(
        update_id = update.id,
        kind = %update.kind(),
        "No handler matched update {}",
        update.id
    );
}

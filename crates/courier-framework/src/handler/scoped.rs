//! Handlers resolved from the update scope.

use std::any::type_name;
use std::marker::PhantomData;

use async_trait::async_trait;
use tracing::error;

use courier_core::UpdateContext;

use super::{HandlerResult, Next, UpdateHandler};

/// Chain link that resolves a handler of type `H` from the update's
/// [`ServiceScope`](courier_core::ServiceScope) each time it runs.
///
/// `H` must be registered with the
/// [`ServiceProvider`](courier_core::ServiceProvider). Registered as scoped,
/// the same instance serves both `can_handle` and `handle` of one update.
/// An unregistered handler never claims an update.
pub struct Scoped<H> {
    _handler: PhantomData<fn() -> H>,
}

impl<H: UpdateHandler> Scoped<H> {
    pub fn new() -> Self {
        Self {
            _handler: PhantomData,
        }
    }
}

impl<H: UpdateHandler> Default for Scoped<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<H: UpdateHandler> UpdateHandler for Scoped<H> {
    fn can_handle(&self, ctx: &UpdateContext) -> bool {
        match ctx.services().require::<H>() {
            Ok(handler) => handler.can_handle(ctx),
            Err(e) => {
                error!(error = %e, "Cannot resolve scoped handler");
                false
            }
        }
    }

    async fn handle(&self, ctx: &mut UpdateContext, next: Next<'_>) -> HandlerResult {
        let handler = ctx.services().require::<H>()?;
        handler.handle(ctx, next).await
    }

    fn name(&self) -> &str {
        type_name::<H>()
    }
}

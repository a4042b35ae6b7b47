//! Handlers built from a predicate closure and an action closure.

use async_trait::async_trait;
use futures::future::BoxFuture;

use courier_core::UpdateContext;

use super::{HandlerResult, Next, UpdateHandler};

/// A handler made of two closures.
///
/// Usually created through `BotBuilder::register`:
///
/// ```rust,ignore
/// builder.register(
///     |ctx| ctx.is_sticker_message_update(),
///     |ctx, _next| Box::pin(async move { reply_with_sticker(ctx).await }),
/// )
/// ```
pub struct FnHandler<P, A> {
    predicate: P,
    action: A,
}

impl<P, A> FnHandler<P, A>
where
    P: Fn(&UpdateContext) -> bool + Send + Sync + 'static,
    A: for<'a> Fn(&'a mut UpdateContext, Next<'a>) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    pub fn new(predicate: P, action: A) -> Self {
        Self { predicate, action }
    }
}

#[async_trait]
impl<P, A> UpdateHandler for FnHandler<P, A>
where
    P: Fn(&UpdateContext) -> bool + Send + Sync + 'static,
    A: for<'a> Fn(&'a mut UpdateContext, Next<'a>) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    fn can_handle(&self, ctx: &UpdateContext) -> bool {
        (self.predicate)(ctx)
    }

    async fn handle(&self, ctx: &mut UpdateContext, next: Next<'_>) -> HandlerResult {
        (self.action)(ctx, next).await
    }

    fn name(&self) -> &str {
        "closure"
    }
}

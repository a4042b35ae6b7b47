//! Sample handlers, registered in `main` in this order.

use courier::prelude::*;
use courier::core::ConfigurationResult;
use tracing::{error, info};

/// First link: turns a failure anywhere down the chain into a log line.
pub struct ExceptionHandler;

#[async_trait]
impl UpdateHandler for ExceptionHandler {
    async fn handle(&self, ctx: &mut UpdateContext, next: Next<'_>) -> HandlerResult {
        let update_id = ctx.update().id;
        if let Err(e) = next.run(ctx).await {
            error!(update_id, error = %e, "An error occurred while handling an update");
        }
        Ok(())
    }
}

pub struct WebhookLogger;

#[async_trait]
impl UpdateHandler for WebhookLogger {
    fn can_handle(&self, ctx: &UpdateContext) -> bool {
        ctx.is_webhook_update()
    }

    async fn handle(&self, ctx: &mut UpdateContext, next: Next<'_>) -> HandlerResult {
        if let Some(origin) = ctx.webhook_origin() {
            let remote = origin
                .remote_addr
                .map_or_else(|| "unknown".to_string(), |addr| addr.to_string());
            info!(
                update_id = ctx.update().id,
                path = %origin.path,
                remote = %remote,
                "Received update in a webhook"
            );
        }
        next.run(ctx).await
    }
}

pub struct UpdateMembersList;

#[async_trait]
impl UpdateHandler for UpdateMembersList {
    fn can_handle(&self, ctx: &UpdateContext) -> bool {
        ctx.is_members_changed_update()
    }

    async fn handle(&self, ctx: &mut UpdateContext, next: Next<'_>) -> HandlerResult {
        info!(update_id = ctx.update().id, "Updating chat members list...");
        next.run(ctx).await
    }
}

pub struct StartCommand {
    name: CommandName,
}

impl StartCommand {
    pub fn new() -> ConfigurationResult<Self> {
        Ok(Self {
            name: CommandName::new("start")?,
        })
    }
}

#[async_trait]
impl Command for StartCommand {
    fn name(&self) -> &CommandName {
        &self.name
    }

    async fn handle_command(
        &self,
        ctx: &mut UpdateContext,
        _next: Next<'_>,
        _args: Vec<String>,
    ) -> HandlerResult {
        let Some(chat_id) = ctx.update().message().map(|msg| msg.chat.id) else {
            return Ok(());
        };
        ctx.bot()
            .send_message(SendMessage::new(chat_id, "Hello, World!"))
            .await?;
        Ok(())
    }
}

pub struct PingCommand {
    name: CommandName,
}

impl PingCommand {
    pub fn new() -> ConfigurationResult<Self> {
        Ok(Self {
            name: CommandName::new("ping")?,
        })
    }
}

#[async_trait]
impl Command for PingCommand {
    fn name(&self) -> &CommandName {
        &self.name
    }

    async fn handle_command(
        &self,
        ctx: &mut UpdateContext,
        _next: Next<'_>,
        args: Vec<String>,
    ) -> HandlerResult {
        let Some(msg) = ctx.update().message() else {
            return Ok(());
        };
        let text = match args.first() {
            Some(echo) => format!("*PONG* {echo}"),
            None => "*PONG*".to_string(),
        };
        let request = SendMessage::new(msg.chat.id, text)
            .parse_mode("Markdown")
            .reply_to(msg.message_id);

        ctx.bot().send_message(request).await?;
        Ok(())
    }
}

/// Replies to a sticker with the same sticker.
pub struct StickerHandler;

#[async_trait]
impl UpdateHandler for StickerHandler {
    fn can_handle(&self, ctx: &UpdateContext) -> bool {
        ctx.is_sticker_message_update()
    }

    async fn handle(&self, ctx: &mut UpdateContext, _next: Next<'_>) -> HandlerResult {
        let Some(msg) = ctx.update().message() else {
            return Ok(());
        };
        let Some(sticker) = &msg.sticker else {
            return Ok(());
        };

        ctx.bot()
            .send_sticker(SendSticker {
                chat_id: msg.chat.id,
                sticker: sticker.file_id.clone(),
            })
            .await?;
        Ok(())
    }
}

pub struct CallbackQueryHandler;

#[async_trait]
impl UpdateHandler for CallbackQueryHandler {
    fn can_handle(&self, ctx: &UpdateContext) -> bool {
        ctx.is_callback_query_update()
    }

    async fn handle(&self, ctx: &mut UpdateContext, next: Next<'_>) -> HandlerResult {
        if let Some(query) = &ctx.update().callback_query {
            ctx.bot()
                .answer_callback_query(AnswerCallbackQuery {
                    callback_query_id: query.id.clone(),
                    text: Some("PONG".to_string()),
                    show_alert: true,
                })
                .await?;
        }
        next.run(ctx).await
    }
}

/// Echoes plain text back. Resolved from the update scope, so a fresh
/// instance serves every update.
#[derive(Debug, Default)]
pub struct TextEchoer;

#[async_trait]
impl UpdateHandler for TextEchoer {
    fn can_handle(&self, ctx: &UpdateContext) -> bool {
        ctx.is_text_message_update() && !ctx.is_command_update()
    }

    async fn handle(&self, ctx: &mut UpdateContext, next: Next<'_>) -> HandlerResult {
        if let Some(msg) = ctx.update().message() {
            let text = format!("You said:\n{}", msg.text().unwrap_or_default());
            ctx.bot()
                .send_message(SendMessage::new(msg.chat.id, text))
                .await?;
        }
        next.run(ctx).await
    }
}

//! Command-style handlers.

use async_trait::async_trait;
use tracing::debug;

use courier_core::UpdateContext;

use super::args::parse_args;
use super::name::CommandName;
use crate::handler::{HandlerResult, Next, UpdateHandler};

/// A handler for one `/command`.
///
/// ```rust,ignore
/// struct PingCommand {
///     name: CommandName,
/// }
///
/// #[async_trait]
/// impl Command for PingCommand {
///     fn name(&self) -> &CommandName {
///         &self.name
///     }
///
///     async fn handle_command(
///         &self,
///         ctx: &mut UpdateContext,
///         _next: Next<'_>,
///         _args: Vec<String>,
///     ) -> HandlerResult {
///         let chat_id = ctx.update().message().map_or(0, |m| m.chat.id);
///         ctx.bot().send_message(SendMessage::new(chat_id, "pong")).await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Command: Send + Sync + 'static {
    /// The command this handler answers to.
    fn name(&self) -> &CommandName;

    /// Extra condition checked after the command itself matched.
    fn can_handle_command(&self, _ctx: &UpdateContext) -> bool {
        true
    }

    /// Handles the command. `args` is the output of [`parse_args`].
    async fn handle_command(
        &self,
        ctx: &mut UpdateContext,
        next: Next<'_>,
        args: Vec<String>,
    ) -> HandlerResult;
}

/// Adapts a [`Command`] into an [`UpdateHandler`].
pub struct CommandHandler<C> {
    command: C,
}

impl<C: Command> CommandHandler<C> {
    pub fn new(command: C) -> Self {
        Self { command }
    }
}

#[async_trait]
impl<C: Command> UpdateHandler for CommandHandler<C> {
    fn can_handle(&self, ctx: &UpdateContext) -> bool {
        self.command.name().matches(ctx) && self.command.can_handle_command(ctx)
    }

    async fn handle(&self, ctx: &mut UpdateContext, next: Next<'_>) -> HandlerResult {
        let args = parse_args(ctx.update().message())?;
        debug!(command = %self.command.name(), args = args.len(), "Handling command");
        self.command.handle_command(ctx, next, args).await
    }

    fn name(&self) -> &str {
        self.command.name().as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BotBuilder;
    use crate::testing::{command_message, context, text_update, update_with};
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Echo {
        name: CommandName,
        private_only: bool,
        received: Arc<Mutex<Vec<Vec<String>>>>,
    }

    #[async_trait]
    impl Command for Echo {
        fn name(&self) -> &CommandName {
            &self.name
        }

        fn can_handle_command(&self, ctx: &UpdateContext) -> bool {
            !self.private_only
                || ctx
                    .update()
                    .message()
                    .is_some_and(|m| m.chat.kind == "private")
        }

        async fn handle_command(
            &self,
            _ctx: &mut UpdateContext,
            _next: Next<'_>,
            args: Vec<String>,
        ) -> HandlerResult {
            self.received.lock().push(args);
            Ok(())
        }
    }

    fn echo(private_only: bool) -> (Echo, Arc<Mutex<Vec<Vec<String>>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let command = Echo {
            name: CommandName::new("echo").unwrap(),
            private_only,
            received: Arc::clone(&received),
        };
        (command, received)
    }

    #[tokio::test]
    async fn test_command_receives_parsed_args() {
        let (command, received) = echo(false);
        let delegate = BotBuilder::new().use_command(command).build();

        let update = update_with(1, command_message("/echo@test_bot hello world", 14));
        delegate.dispatch(&mut context(update)).await.unwrap();

        assert_eq!(
            *received.lock(),
            vec![vec!["hello world", "hello", "world"]]
        );
    }

    #[tokio::test]
    async fn test_other_text_is_not_claimed() {
        let (command, received) = echo(false);
        let delegate = BotBuilder::new().use_command(command).build();

        delegate
            .dispatch(&mut context(text_update(1, "/echo without entity")))
            .await
            .unwrap();
        delegate
            .dispatch(&mut context(update_with(2, command_message("/help", 5))))
            .await
            .unwrap();

        assert!(received.lock().is_empty());
    }

    #[tokio::test]
    async fn test_extra_condition_is_checked() {
        let (command, received) = echo(true);
        let handler = CommandHandler::new(command);

        let mut group = command_message("/echo hi", 5);
        group.chat.kind = "group".into();
        assert!(!handler.can_handle(&context(update_with(1, group))));

        let private = context(update_with(2, command_message("/echo hi", 5)));
        assert!(handler.can_handle(&private));
        assert_eq!(handler.name(), "echo");
        assert!(received.lock().is_empty());
    }
}

//! Common predicates over an [`UpdateContext`].
//!
//! ```rust,ignore
//! use courier_framework::UpdateContextExt;
//!
//! builder.register(|ctx| ctx.is_location_message_update(), report_weather);
//! ```

use courier_core::{Message, UpdateContext};

/// Predicates handlers typically use in `can_handle`.
pub trait UpdateContextExt {
    /// Arrived through the webhook endpoint rather than polling.
    fn is_webhook_update(&self) -> bool;

    fn is_message_update(&self) -> bool;

    fn is_text_message_update(&self) -> bool;

    /// A message that replies to another message.
    fn is_reply_message_update(&self) -> bool;

    /// A message replying to a text message.
    fn is_reply_text_message_update(&self) -> bool;

    /// A message whose first entity is a bot command.
    fn is_command_update(&self) -> bool;

    /// Members joined or left, in a chat or a channel.
    fn is_members_changed_update(&self) -> bool;

    fn is_location_message_update(&self) -> bool;

    fn is_sticker_message_update(&self) -> bool;

    fn is_callback_query_update(&self) -> bool;
}

impl UpdateContextExt for UpdateContext {
    fn is_webhook_update(&self) -> bool {
        self.webhook_origin().is_some()
    }

    fn is_message_update(&self) -> bool {
        self.update().message.is_some()
    }

    fn is_text_message_update(&self) -> bool {
        message(self).is_some_and(|m| m.text.is_some())
    }

    fn is_reply_message_update(&self) -> bool {
        message(self).is_some_and(|m| m.reply_to_message.is_some())
    }

    fn is_reply_text_message_update(&self) -> bool {
        message(self)
            .and_then(|m| m.reply_to_message.as_deref())
            .is_some_and(|reply| reply.text.is_some())
    }

    fn is_command_update(&self) -> bool {
        message(self)
            .and_then(Message::first_entity)
            .is_some_and(|entity| entity.is_command())
    }

    fn is_members_changed_update(&self) -> bool {
        let update = self.update();
        [update.message.as_ref(), update.channel_post.as_ref()]
            .into_iter()
            .flatten()
            .any(Message::has_member_changes)
    }

    fn is_location_message_update(&self) -> bool {
        message(self).is_some_and(|m| m.location.is_some())
    }

    fn is_sticker_message_update(&self) -> bool {
        message(self).is_some_and(|m| m.sticker.is_some())
    }

    fn is_callback_query_update(&self) -> bool {
        self.update().callback_query.is_some()
    }
}

fn message(ctx: &UpdateContext) -> Option<&Message> {
    ctx.update().message()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{command_message, context, message as text_message, text_update, update_with};
    use courier_core::{
        CallbackQuery, Location, Sticker, Update, User, WEBHOOK_ORIGIN, WebhookOrigin,
    };

    #[test]
    fn test_text_and_command() {
        let ctx = context(text_update(1, "hello"));
        assert!(ctx.is_message_update());
        assert!(ctx.is_text_message_update());
        assert!(!ctx.is_command_update());

        let ctx = context(update_with(2, command_message("/start", 6)));
        assert!(ctx.is_command_update());
    }

    #[test]
    fn test_reply() {
        let mut msg = text_message(Some("answer"), None);
        msg.reply_to_message = Some(Box::new(text_message(None, None)));
        let ctx = context(update_with(1, msg.clone()));
        assert!(ctx.is_reply_message_update());
        assert!(!ctx.is_reply_text_message_update());

        msg.reply_to_message = Some(Box::new(text_message(Some("question"), None)));
        let ctx = context(update_with(2, msg));
        assert!(ctx.is_reply_text_message_update());
    }

    #[test]
    fn test_members_changed_in_channel_post() {
        let post = courier_core::Message {
            left_chat_member: Some(User::default()),
            ..Default::default()
        };
        let ctx = context(Update {
            id: 1,
            channel_post: Some(post),
            ..Default::default()
        });
        assert!(ctx.is_members_changed_update());
        assert!(!ctx.is_message_update());
    }

    #[test]
    fn test_location_sticker_and_callback() {
        let mut msg = text_message(None, None);
        msg.location = Some(Location {
            longitude: 2.35,
            latitude: 48.85,
        });
        msg.sticker = Some(Sticker {
            file_id: "abc".into(),
            ..Default::default()
        });
        let ctx = context(update_with(1, msg));
        assert!(ctx.is_location_message_update());
        assert!(ctx.is_sticker_message_update());
        assert!(!ctx.is_text_message_update());
        assert!(!ctx.is_callback_query_update());

        let ctx = context(Update {
            id: 2,
            callback_query: Some(CallbackQuery {
                id: "q".into(),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert!(ctx.is_callback_query_update());
        assert!(!ctx.is_message_update());
    }

    #[test]
    fn test_webhook_marker() {
        let mut ctx = context(text_update(1, "hi"));
        assert!(!ctx.is_webhook_update());

        ctx.insert_item(
            WEBHOOK_ORIGIN,
            WebhookOrigin {
                path: "/bot/webhook".into(),
                remote_addr: None,
            },
        );
        assert!(ctx.is_webhook_update());
    }
}

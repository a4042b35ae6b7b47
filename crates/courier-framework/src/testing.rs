//! Fixtures shared by the unit tests of this crate.

use courier_core::testing::offline_bot;
use courier_core::{Bot, Chat, Message, MessageEntity, ServiceProvider, Update, UpdateContext};

pub(crate) const BOT_USERNAME: &str = "Test_Bot";

pub(crate) fn bot() -> Bot {
    offline_bot(Some(BOT_USERNAME))
}

pub(crate) fn context(update: Update) -> UpdateContext {
    UpdateContext::with_provider(bot(), update, &ServiceProvider::empty())
}

pub(crate) fn message(text: Option<&str>, entities: Option<Vec<MessageEntity>>) -> Message {
    Message {
        message_id: 1,
        chat: Chat {
            id: 100,
            kind: "private".into(),
            ..Default::default()
        },
        text: text.map(str::to_owned),
        entities,
        ..Default::default()
    }
}

pub(crate) fn update_with(id: i64, message: Message) -> Update {
    Update {
        id,
        message: Some(message),
        ..Default::default()
    }
}

/// A plain text message without entities.
pub(crate) fn text_update(id: i64, text: &str) -> Update {
    update_with(id, message(Some(text), None))
}

/// A text message whose first entity is a command spanning `length` units.
pub(crate) fn command_message(text: &str, length: usize) -> Message {
    message(Some(text), Some(vec![MessageEntity::bot_command(0, length)]))
}

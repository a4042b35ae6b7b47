//! Telegram update payloads.
//!
//! Only the fields the framework and its handlers look at are modelled; unknown
//! fields in the incoming JSON are ignored by serde.
//!
//! Entity offsets and lengths are measured in UTF-16 code units, as the Bot API
//! defines them. Use [`Message::entity_values`] or [`utf16_slice`] rather than
//! indexing the text by byte.

use serde::{Deserialize, Serialize};

/// An incoming update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Monotonically increasing update identifier.
    #[serde(rename = "update_id")]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_post: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_channel_post: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<CallbackQuery>,
}

/// The payload variant an [`Update`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Message,
    EditedMessage,
    ChannelPost,
    EditedChannelPost,
    CallbackQuery,
    Unknown,
}

impl UpdateKind {
    /// Returns the Bot API name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::EditedMessage => "edited_message",
            Self::ChannelPost => "channel_post",
            Self::EditedChannelPost => "edited_channel_post",
            Self::CallbackQuery => "callback_query",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Update {
    /// Returns which payload this update carries.
    pub fn kind(&self) -> UpdateKind {
        if self.message.is_some() {
            UpdateKind::Message
        } else if self.edited_message.is_some() {
            UpdateKind::EditedMessage
        } else if self.channel_post.is_some() {
            UpdateKind::ChannelPost
        } else if self.edited_channel_post.is_some() {
            UpdateKind::EditedChannelPost
        } else if self.callback_query.is_some() {
            UpdateKind::CallbackQuery
        } else {
            UpdateKind::Unknown
        }
    }

    /// The new incoming message, if any.
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }
}

/// A chat message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<MessageEntity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker: Option<Sticker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message: Option<Box<Message>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_chat_members: Option<Vec<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_chat_member: Option<User>,
}

impl Message {
    /// The message text, if it is a text message.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Entities attached to the text, empty when there are none.
    pub fn entities(&self) -> &[MessageEntity] {
        self.entities.as_deref().unwrap_or_default()
    }

    /// The first entity, which is where a command has to be.
    pub fn first_entity(&self) -> Option<&MessageEntity> {
        self.entities().first()
    }

    /// The literal text covered by each entity, in entity order.
    ///
    /// Entities whose span does not fall on character boundaries of the text
    /// yield `None`.
    pub fn entity_values(&self) -> impl Iterator<Item = Option<&str>> {
        let text = self.text().unwrap_or_default();
        self.entities()
            .iter()
            .map(move |entity| entity.value_in(text))
    }

    /// Whether membership of the chat changed with this message.
    pub fn has_member_changes(&self) -> bool {
        self.new_chat_members.is_some() || self.left_chat_member.is_some()
    }
}

/// An annotated span of message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Offset in UTF-16 code units.
    pub offset: usize,
    /// Length in UTF-16 code units.
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl MessageEntity {
    /// Creates an entity of the given kind.
    pub fn new(kind: EntityKind, offset: usize, length: usize) -> Self {
        Self {
            kind,
            offset,
            length,
            url: None,
        }
    }

    /// Shorthand for a `bot_command` entity.
    pub fn bot_command(offset: usize, length: usize) -> Self {
        Self::new(EntityKind::BotCommand, offset, length)
    }

    pub fn is_command(&self) -> bool {
        self.kind == EntityKind::BotCommand
    }

    /// The slice of `text` this entity covers.
    pub fn value_in<'t>(&self, text: &'t str) -> Option<&'t str> {
        utf16_slice(text, self.offset, self.length)
    }
}

/// Entity type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Mention,
    Hashtag,
    Cashtag,
    BotCommand,
    Url,
    Email,
    PhoneNumber,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Blockquote,
    Code,
    Pre,
    TextLink,
    TextMention,
    CustomEmoji,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
}

/// A button press on an inline keyboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub from: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default)]
    pub chat_instance: String,
}

/// Slices `text` by a span measured in UTF-16 code units.
///
/// Returns `None` if the span runs past the end of the text or splits a
/// surrogate pair.
pub fn utf16_slice(text: &str, offset: usize, length: usize) -> Option<&str> {
    let start = utf16_to_byte(text, offset)?;
    let end = utf16_to_byte(text, offset.checked_add(length)?)?;
    text.get(start..end)
}

/// Byte index of the character that starts at UTF-16 position `units`.
fn utf16_to_byte(text: &str, units: usize) -> Option<usize> {
    let mut seen = 0;
    for (idx, ch) in text.char_indices() {
        if seen == units {
            return Some(idx);
        }
        if seen > units {
            return None;
        }
        seen += ch.len_utf16();
    }
    (seen == units).then_some(text.len())
}

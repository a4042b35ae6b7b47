//! Command names and command recognition.

use std::fmt;
use std::str::FromStr;

use courier_core::{ConfigurationError, ConfigurationResult, Message, UpdateContext};

/// A validated command name such as `start`, stored lowercase and without the
/// leading `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandName(String);

impl CommandName {
    /// Validates `name`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::InvalidCommandName`] if the name is blank or
    /// starts with `/`.
    pub fn new(name: impl Into<String>) -> ConfigurationResult<Self> {
        let name = name.into();
        let reason = if name.trim().is_empty() {
            Some("command name must not be blank")
        } else if name.starts_with('/') {
            Some("command name must not start with '/'")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ConfigurationError::InvalidCommandName { name, reason }),
            None => Ok(Self(name.to_lowercase())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the update in `ctx` is this command addressed to the bot.
    pub fn matches(&self, ctx: &UpdateContext) -> bool {
        self.matches_message(ctx.update().message(), ctx.bot().username())
    }

    /// Whether `message` starts with this command.
    ///
    /// The message must have non-blank text whose first entity is a command.
    /// That entity's text has to be `/<name>` or `/<name>@<bot_username>`,
    /// compared case-insensitively. Commands mentioning a username never match
    /// when `bot_username` is `None`.
    pub fn matches_message(&self, message: Option<&Message>, bot_username: Option<&str>) -> bool {
        let Some(message) = message else {
            return false;
        };
        let Some(text) = message.text().filter(|text| !text.trim().is_empty()) else {
            return false;
        };
        let Some(entity) = message.first_entity().filter(|entity| entity.is_command()) else {
            return false;
        };
        let Some(token) = entity.value_in(text) else {
            return false;
        };

        self.matches_token(token, bot_username)
    }

    fn matches_token(&self, token: &str, bot_username: Option<&str>) -> bool {
        let Some(body) = token.strip_prefix('/') else {
            return false;
        };
        let (name, mention) = match body.split_once('@') {
            Some((name, mention)) => (name, Some(mention)),
            None => (body, None),
        };

        if name.to_lowercase() != self.0 {
            return false;
        }
        match (mention, bot_username) {
            (None, _) => true,
            (Some(mention), Some(username)) => mention.to_lowercase() == username.to_lowercase(),
            (Some(_), None) => false,
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl FromStr for CommandName {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for CommandName {
    type Error = ConfigurationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Checks whether the update in `ctx` is the command `name`.
///
/// # Errors
///
/// Fails if `name` is not a valid [`CommandName`]. Prefer validating the name
/// once with [`CommandName::new`] and calling [`CommandName::matches`].
pub fn can_match(name: &str, ctx: &UpdateContext) -> ConfigurationResult<bool> {
    Ok(CommandName::new(name)?.matches(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BOT_USERNAME, context, message, update_with};
    use courier_core::{EntityKind, MessageEntity, Update};

    fn command() -> CommandName {
        CommandName::new("test").unwrap()
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        for name in ["", "   ", "\t", "/test", "/"] {
            let err = CommandName::new(name).unwrap_err();
            assert!(matches!(err, ConfigurationError::InvalidCommandName { .. }));
        }
        assert!(can_match("/start", &context(Update::default())).is_err());
    }

    #[test]
    fn test_name_is_normalised() {
        let name: CommandName = "StArT".parse().unwrap();
        assert_eq!(name.as_str(), "start");
        assert_eq!(name.to_string(), "/start");
    }

    #[test]
    fn test_should_match_command() {
        let cases = [
            ("/test", "/test"),
            ("/test    ", "/test"),
            ("/test abc", "/test"),
            ("/TesT", "/tESt"),
            ("/test@test_bot", "/test@test_bot"),
            ("/test@test_bot ", "/test@test_bot"),
            ("/test@test_bot  !", "/test@test_bot"),
        ];

        for (text, entity_value) in cases {
            let entity = MessageEntity::bot_command(0, entity_value.len());
            let msg = message(Some(text), Some(vec![entity]));
            let ctx = context(update_with(1, msg));

            assert!(command().matches(&ctx), "{text:?} should match");
            assert!(can_match("test", &ctx).unwrap());
        }
    }

    #[test]
    fn test_should_not_match_without_command_entity() {
        let texts = [
            None,
            Some(" "),
            Some("/\t"),
            Some("    "),
            Some("I AM NOT A COMMAND"),
            Some("/testt"),
            Some("/@test_bot"),
            Some("/tes@test_bot"),
        ];

        for text in texts {
            let ctx = context(update_with(1, message(text, None)));
            assert!(!command().matches(&ctx), "{text:?} should not match");
        }
    }

    #[test]
    fn test_should_not_match_other_commands() {
        for token in ["/testt", "/tes", "/@test_bot", "/tes@test_bot", "/test@other_bot", "/test@"] {
            let msg = message(Some(token), Some(vec![MessageEntity::bot_command(0, token.len())]));
            assert!(
                !command().matches_message(Some(&msg), Some(BOT_USERNAME)),
                "{token:?} should not match"
            );
        }
    }

    #[test]
    fn test_should_not_match_without_text_or_message() {
        let msg = message(None, Some(vec![MessageEntity::bot_command(0, 5)]));
        assert!(!command().matches_message(Some(&msg), Some(BOT_USERNAME)));
        assert!(!command().matches_message(None, Some(BOT_USERNAME)));
        assert!(!command().matches(&context(Update::default())));
    }

    #[test]
    fn test_only_first_entity_is_considered() {
        let msg = message(
            Some("#tag /test"),
            Some(vec![
                MessageEntity::new(EntityKind::Hashtag, 0, 4),
                MessageEntity::bot_command(5, 5),
            ]),
        );
        assert!(!command().matches_message(Some(&msg), Some(BOT_USERNAME)));
    }

    #[test]
    fn test_mention_requires_known_username() {
        let msg = message(
            Some("/test@test_bot"),
            Some(vec![MessageEntity::bot_command(0, 14)]),
        );
        assert!(command().matches_message(Some(&msg), Some("TEST_BOT")));
        assert!(!command().matches_message(Some(&msg), None));

        let bare = message(Some("/test"), Some(vec![MessageEntity::bot_command(0, 5)]));
        assert!(command().matches_message(Some(&bare), None));
    }
}

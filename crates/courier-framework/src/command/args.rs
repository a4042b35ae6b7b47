//! Command argument tokenization.

use courier_core::{Message, ValidationError, ValidationResult, utf16_slice};

/// Splits the arguments following a command.
///
/// The tail is the text after the first entity's length, with leading
/// whitespace removed. The result starts with the whole tail; if the tail
/// contains whitespace, its whitespace-separated pieces follow. Blank entries
/// are dropped.
///
/// | text              | result                          |
/// |-------------------|---------------------------------|
/// | `/start`          | `[]`                            |
/// | `/echo hi`        | `["hi"]`                        |
/// | `/foo bar baz`    | `["bar baz", "bar", "baz"]`     |
///
/// A message that has no entities, or whose first entity is not a command,
/// yields an empty list.
///
/// # Errors
///
/// - [`ValidationError::NullArgument`] naming `message` when it is `None`
/// - [`ValidationError::EntityOutOfRange`] when the entity is longer than the text
pub fn parse_args(message: Option<&Message>) -> ValidationResult<Vec<String>> {
    let message = message.ok_or(ValidationError::null("message"))?;

    let Some(entity) = message.first_entity().filter(|entity| entity.is_command()) else {
        return Ok(Vec::new());
    };

    let text = message.text().unwrap_or_default();
    let command = utf16_slice(text, 0, entity.length).ok_or(ValidationError::EntityOutOfRange {
        offset: entity.offset,
        length: entity.length,
    })?;
    let tail = text[command.len()..].trim_start();

    let mut candidates = vec![tail];
    let pieces: Vec<&str> = tail.split(char::is_whitespace).collect();
    if pieces.len() > 1 {
        candidates.extend(pieces);
    }

    Ok(candidates
        .into_iter()
        .filter(|candidate| !candidate.trim().is_empty())
        .map(str::to_owned)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{command_message, message};
    use courier_core::{EntityKind, MessageEntity};

    fn args(text: &str, length: usize) -> Vec<String> {
        parse_args(Some(&command_message(text, length))).unwrap()
    }

    #[test]
    fn test_null_message() {
        let err = parse_args(None).unwrap_err();
        assert_eq!(err, ValidationError::NullArgument { param: "message" });
    }

    #[test]
    fn test_no_entities() {
        let msg = message(Some("/start"), None);
        assert!(parse_args(Some(&msg)).unwrap().is_empty());

        let msg = message(Some("/start"), Some(Vec::new()));
        assert!(parse_args(Some(&msg)).unwrap().is_empty());

        let msg = message(None, None);
        assert!(parse_args(Some(&msg)).unwrap().is_empty());
    }

    #[test]
    fn test_non_command_first_entity() {
        let msg = message(
            Some("@someone /start now"),
            Some(vec![
                MessageEntity::new(EntityKind::Mention, 0, 8),
                MessageEntity::bot_command(9, 6),
            ]),
        );
        assert!(parse_args(Some(&msg)).unwrap().is_empty());
    }

    #[test]
    fn test_commands_without_args() {
        for text in ["/start", "/_", "/2", "/3_", "/start@ab3BOT", "/1@N_BoT"] {
            assert!(args(text, text.len()).is_empty(), "{text:?}");
        }
    }

    #[test]
    fn test_single_argument() {
        assert_eq!(args("/1 bar", 2), ["bar"]);
        assert_eq!(args("/_@9", 2), ["@9"]);
        assert_eq!(args("/1@T_Bot arg_1", 8), ["arg_1"]);
    }

    #[test]
    fn test_whole_tail_precedes_pieces() {
        let expected = ["bar baz", "bar", "baz"];
        assert_eq!(args("/foo bar baz", 4), expected);
        assert_eq!(args("/foo\tbar baz", 4), expected);
        assert_eq!(args("/foo\nbar baz", 4), expected);

        assert_eq!(args("/1-5 ab cd", 2), ["-5 ab cd", "-5", "ab", "cd"]);
        assert_eq!(
            args("/1@T_Bot arg_1 \"test\"", 8),
            ["arg_1 \"test\"", "arg_1", "\"test\""]
        );
    }

    #[test]
    fn test_whitespace_runs_do_not_produce_blank_args() {
        assert_eq!(args("/foo   bar \t baz", 4), ["bar \t baz", "bar", "baz"]);
        // Trailing whitespace keeps the tail distinct from its only piece.
        assert_eq!(args("/foo abc ", 4), ["abc ", "abc"]);
    }

    #[test]
    fn test_tail_counts_utf16_units() {
        let msg = command_message("/café ☕ hot", 5);
        assert_eq!(parse_args(Some(&msg)).unwrap(), ["☕ hot", "☕", "hot"]);
    }

    #[test]
    fn test_entity_longer_than_text() {
        let msg = command_message("/go", 10);
        assert!(matches!(
            parse_args(Some(&msg)),
            Err(ValidationError::EntityOutOfRange { length: 10, .. })
        ));
    }
}

//! Command recognition and argument parsing.
//!
//! A command is a message whose first entity is a `bot_command` reading
//! `/<name>` or `/<name>@<bot_username>`. [`CommandName`] recognises one,
//! [`parse_args`] splits what follows it, and [`Command`] ties both into a
//! chain link.

mod args;
mod handler;
mod name;

pub use args::parse_args;
pub use handler::{Command, CommandHandler};
pub use name::{CommandName, can_match};

//! # Courier Framework
//!
//! Handler composition for Courier bots.
//!
//! - [`UpdateHandler`] and [`Next`]: a link in the chain and the rest of it
//! - [`BotBuilder`]: registers handlers in order and compiles an [`UpdateDelegate`]
//! - [`command`]: command recognition, argument parsing and [`Command`] handlers
//! - [`UpdateContextExt`]: predicates for `can_handle`
//!
//! ```rust,ignore
//! use courier_framework::prelude::*;
//!
//! let delegate = BotBuilder::new()
//!     .use_handler(ExceptionHandler)
//!     .use_command(PingCommand::new())
//!     .use_scoped::<TextEchoer>()
//!     .build();
//!
//! delegate.dispatch(&mut ctx).await?;
//! ```

pub mod builder;
pub mod command;
pub mod handler;
pub mod predicates;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{BotBuilder, UpdateDelegate};
pub use command::{Command, CommandHandler, CommandName, can_match, parse_args};
pub use handler::{FnHandler, HandlerResult, Next, Scoped, UpdateHandler};
pub use predicates::UpdateContextExt;

/// Commonly used items.
pub mod prelude {
    pub use crate::builder::{BotBuilder, UpdateDelegate};
    pub use crate::command::{Command, CommandName};
    pub use crate::handler::{HandlerResult, Next, UpdateHandler};
    pub use crate::predicates::UpdateContextExt;
    pub use async_trait::async_trait;
    pub use courier_core::{Bot, BoxError, Update, UpdateContext};
}

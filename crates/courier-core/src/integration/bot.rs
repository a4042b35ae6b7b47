//! Bot identity.

use std::ops::Deref;
use std::sync::Arc;

use crate::integration::api::BotApi;

/// A bot account: its username plus the API used to act as it.
///
/// Cloning is cheap. `Bot` dereferences to [`BotApi`], so remote calls can be
/// made directly:
///
/// ```rust,ignore
/// ctx.bot().send_message(SendMessage::new(chat_id, "pong")).await?;
/// ```
#[derive(Clone)]
pub struct Bot {
    username: Option<Arc<str>>,
    api: Arc<dyn BotApi>,
}

impl Bot {
    /// Creates a bot. A leading `@` on the username is stripped.
    pub fn new(api: Arc<dyn BotApi>, username: Option<&str>) -> Self {
        let username = username
            .map(|name| name.trim().trim_start_matches('@'))
            .filter(|name| !name.is_empty())
            .map(Arc::from);
        Self { username, api }
    }

    /// The bot's username without `@`, used to recognise `/cmd@username`.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn api(&self) -> &Arc<dyn BotApi> {
        &self.api
    }
}

impl Deref for Bot {
    type Target = dyn BotApi;

    fn deref(&self) -> &Self::Target {
        self.api.as_ref()
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

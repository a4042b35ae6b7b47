//! Update context passed through the handler chain.
//!
//! An [`UpdateContext`] is created for exactly one update and owned by the
//! dispatch that processes it. It bundles:
//!
//! - the [`Update`] itself
//! - the [`Bot`] that received it (identity plus remote API)
//! - a [`ServiceScope`] for per-update resources
//! - a metadata map handlers use to pass information along the chain
//!
//! # Metadata
//!
//! Metadata entries are keyed by string and hold any `Send + Sync` value:
//!
//! ```rust,ignore
//! ctx.insert_item("started_at", Instant::now());
//!
//! if let Some(started) = ctx.item::<Instant>("started_at") {
//!     debug!(elapsed = ?started.elapsed(), "Handled");
//! }
//! ```
//!
//! The webhook host stores a [`WebhookOrigin`] under [`WEBHOOK_ORIGIN`].

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::services::{ServiceProvider, ServiceScope};
use crate::foundation::update::Update;
use crate::integration::bot::Bot;

/// Metadata key marking an update that arrived through the webhook endpoint.
pub const WEBHOOK_ORIGIN: &str = "courier.webhook";

/// Value stored under [`WEBHOOK_ORIGIN`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookOrigin {
    /// Route the update was posted to.
    pub path: String,
    /// Address of the peer that posted it, when known.
    pub remote_addr: Option<std::net::SocketAddr>,
}

/// Everything a handler can see about the update being processed.
pub struct UpdateContext {
    bot: Bot,
    update: Update,
    services: ServiceScope,
    items: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl UpdateContext {
    /// Creates a context over an already opened scope.
    pub fn new(bot: Bot, update: Update, services: ServiceScope) -> Self {
        Self {
            bot,
            update,
            services,
            items: HashMap::new(),
        }
    }

    /// Creates a context with a fresh scope opened from `provider`.
    pub fn with_provider(bot: Bot, update: Update, provider: &Arc<ServiceProvider>) -> Self {
        Self::new(bot, update, provider.create_scope())
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn update(&self) -> &Update {
        &self.update
    }

    /// The per-update service scope.
    pub fn services(&self) -> &ServiceScope {
        &self.services
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Stores a metadata value, replacing any previous value under `key`.
    pub fn insert_item<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.items.insert(key.into(), Box::new(value));
    }

    /// Gets a metadata value if present and of type `T`.
    pub fn item<T: Send + Sync + 'static>(&self, key: &str) -> Option<&T> {
        self.items.get(key)?.downcast_ref()
    }

    /// Whether any value is stored under `key`.
    pub fn has_item(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Removes and returns a metadata value of type `T`.
    ///
    /// A value of another type is left in place.
    pub fn take_item<T: Send + Sync + 'static>(&mut self, key: &str) -> Option<T> {
        if !self.items.get(key)?.is::<T>() {
            return None;
        }
        let boxed = self.items.remove(key)?;
        boxed.downcast().ok().map(|value| *value)
    }

    /// Origin details if this update came through the webhook.
    pub fn webhook_origin(&self) -> Option<&WebhookOrigin> {
        self.item(WEBHOOK_ORIGIN)
    }
}

impl std::fmt::Debug for UpdateContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateContext")
            .field("update_id", &self.update.id)
            .field("kind", &self.update.kind())
            .field("bot", &self.bot.username())
            .field("items", &self.items.keys().collect::<Vec<_>>())
            .finish()
    }
}

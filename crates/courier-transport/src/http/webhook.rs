//! Webhook endpoint.
//!
//! Receives `POST {path}` requests carrying one update each, marks the
//! context with [`WEBHOOK_ORIGIN`] and dispatches it through the handler chain.
//! The response status reflects the outcome:
//!
//! | outcome                 | status |
//! |-------------------------|--------|
//! | dispatched              | 200    |
//! | body is not an update   | 400    |
//! | handler chain failed    | 500    |

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{ConnectInfo, State},
    http::StatusCode,
    routing::post,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tracing::{debug, error, info, warn};

use courier_core::{Bot, ServiceProvider, Update, UpdateContext, WEBHOOK_ORIGIN, WebhookOrigin};
use courier_framework::UpdateDelegate;

/// Default route for incoming updates.
pub const DEFAULT_WEBHOOK_PATH: &str = "/bot/webhook";

struct WebhookState {
    bot: Bot,
    services: Arc<ServiceProvider>,
    delegate: UpdateDelegate,
    path: String,
}

/// HTTP server feeding webhook updates into an [`UpdateDelegate`].
pub struct WebhookServer {
    bot: Bot,
    services: Arc<ServiceProvider>,
    delegate: UpdateDelegate,
    path: String,
}

impl WebhookServer {
    pub fn new(bot: Bot, services: Arc<ServiceProvider>, delegate: UpdateDelegate) -> Self {
        Self {
            bot,
            services,
            delegate,
            path: DEFAULT_WEBHOOK_PATH.to_string(),
        }
    }

    /// Sets the route updates are posted to. A missing leading `/` is added.
    pub fn path(mut self, path: &str) -> Self {
        self.path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        self
    }

    /// The axum router serving the webhook route.
    pub fn router(&self) -> Router {
        let state = Arc::new(WebhookState {
            bot: self.bot.clone(),
            services: Arc::clone(&self.services),
            delegate: self.delegate.clone(),
            path: self.path.clone(),
        });

        Router::new()
            .route(&self.path, post(receive_update))
            .with_state(state)
    }

    /// Binds `addr` and serves until `shutdown` is cancelled.
    pub async fn serve(self, addr: &str, shutdown: CancellationToken) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_on(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` is cancelled.
    pub async fn serve_on(
        self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> std::io::Result<()> {
        let actual_addr = listener.local_addr()?;
        info!(addr = %actual_addr, path = %self.path, "Webhook server listening");

        let router = self.router();
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

        info!(addr = %actual_addr, "Webhook server stopped");
        Ok(())
    }
}

async fn receive_update(
    State(state): State<Arc<WebhookState>>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    body: Bytes,
) -> StatusCode {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, remote_addr = %remote_addr, "Rejected webhook body");
            return StatusCode::BAD_REQUEST;
        }
    };
    let update_id = update.id;
    debug!(update_id, remote_addr = %remote_addr, "Received webhook update");

    let mut ctx = UpdateContext::with_provider(state.bot.clone(), update, &state.services);
    ctx.insert_item(
        WEBHOOK_ORIGIN,
        WebhookOrigin {
            path: state.path.clone(),
            remote_addr: Some(remote_addr),
        },
    );

    match state.delegate.clone().oneshot(ctx).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            error!(update_id, error = %e, "Failed to handle webhook update");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

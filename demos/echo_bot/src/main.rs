//! Echo Bot
//!
//! A sample Telegram bot wired with every handler style Courier offers:
//! plain handlers, commands and a handler resolved per update from the
//! service scope.
//!
//! # Usage
//!
//! ```bash
//! COURIER_BOT__API_TOKEN=123:abc cargo run --package echo-bot
//! cargo run --package echo-bot -- --config deploy/courier.toml --profile production
//! ```

mod handlers;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use courier::core::ServiceProvider;
use courier::prelude::*;

use handlers::{
    CallbackQueryHandler, ExceptionHandler, PingCommand, StartCommand, StickerHandler,
    TextEchoer, UpdateMembersList, WebhookLogger,
};

#[derive(Debug, Parser)]
#[command(name = "echo-bot", about = "A sample Telegram bot built on Courier")]
struct Cli {
    /// Configuration file; searched in the usual places when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. `production`.
    #[arg(short, long)]
    profile: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = CourierRuntime::builder();
    if let Some(path) = &cli.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &cli.profile {
        builder = builder.profile(profile);
    }

    let services = ServiceProvider::builder()
        .scoped(|_scope| Ok(TextEchoer))
        .build();

    let start = StartCommand::new()?;
    let ping = PingCommand::new()?;

    let runtime = builder
        .services(services)
        .handlers(|chain| {
            chain
                .use_handler(ExceptionHandler)
                .use_handler(WebhookLogger)
                .use_handler(UpdateMembersList)
                .use_command(start)
                .use_command(ping)
                .use_handler(StickerHandler)
                .use_handler(CallbackQueryHandler)
                .use_scoped::<TextEchoer>()
        })
        .build()?;

    runtime.run().await?;
    Ok(())
}

//! `rolodex` binary: parse configuration, install tracing, serve.

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use rolodex::api::{self, AppState};
use rolodex::{Config, Server};

#[tokio::main]
async fn main() -> Result<(), rolodex::Error> {
    init_tracing();

    let config = Config::parse();
    let addr = config.socket_addr()?;
    info!(%addr, "configuration loaded");

    let service = api::app(&config.auth_token, AppState::default());
    Server::bind_addr(addr).serve(service).await
}

/// `RUST_LOG` wins; otherwise info everywhere and debug for this crate.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rolodex=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

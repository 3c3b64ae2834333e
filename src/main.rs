//! # Auth Lab Server
//!
//! Minimal token authentication service built with Rust, Axum, and Tokio.
//! Users log in against a fixed credential list, receive a signed HS256 token
//! with a bounded lifetime, and present it as a bearer token afterwards.
//!
//! ## Architecture
//! - `auth`: credential store, JWT service, middleware and models
//! - `config`: environment variable configuration
//! - `routes`: HTTP route handlers
//! - `server`: router assembly and server startup
//!
//! ## Environment Setup
//! ```bash
//! echo 'SECRET_KEY=change-me' > .env
//! cargo run
//! ```
//!
//! The server listens on `http://0.0.0.0:5000` by default.
//!
//! ## Limitations
//! Tokens are stateless. There is no revocation: a token stays valid until it
//! expires, even after logout.

mod auth;
mod config;
mod error;
mod routes;
mod server;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine, the real environment still applies
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();

    tracing::info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    tracing::info!("Build profile: {}", if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    });

    let config = match Config::from_env().context("Failed to load configuration from environment") {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{:#}", e);
            return Err(e);
        }
    };

    if let Err(e) = server::start(config).await {
        tracing::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

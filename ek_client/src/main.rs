//! A terminal Exploding Kittens client.
//!
//! The client keeps the game state locally, syncs wins and the leaderboard
//! with the score service, and holds a socket connection to the server.

use anyhow::{Context, Result};
use pico_args::Arguments;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::warn;

use ek_client::{
    api_client::ApiClient,
    app::{self, App},
    config::{ClientConfig, ConfigOverrides},
    logging,
    socket_client::SocketClient,
};

const HELP: &str = "\
Play Exploding Kittens against the clock

USAGE:
  ek_client [OPTIONS]

OPTIONS:
  --server URL          Score service URL  [default: env EK_API_URL or http://localhost:8080]
  --username NAME       Username, skips the prompt  [default: env EK_USERNAME]
  --flip-delay MS       Card flip delay in milliseconds  [default: env EK_FLIP_DELAY_MS or 800]
  --no-socket           Don't open the socket connection

FLAGS:
  -h, --help            Print help information

ENVIRONMENT:
  EK_REQUEST_TIMEOUT_SECS   Per-request timeout  [default: 10]
  EK_SOCKET_ENABLED         Open the socket connection  [default: true]
  RUST_LOG                  Log filter
";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = ConfigOverrides {
        api_url: pargs.opt_value_from_str("--server")?,
        username: pargs.opt_value_from_str("--username")?,
        flip_delay_ms: pargs.opt_value_from_str("--flip-delay")?,
        no_socket: pargs.contains("--no-socket"),
    };

    logging::init();

    let config = ClientConfig::from_env(overrides).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    run(config).await
}

async fn run(config: ClientConfig) -> Result<()> {
    let api = Arc::new(
        ApiClient::with_timeout(config.api_url.clone(), config.request_timeout)
            .context("Failed to create API client")?,
    );

    let socket = if config.socket_enabled {
        match SocketClient::for_api(&config.api_url).connect().await {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Socket connection failed: {e}");
                None
            }
        }
    } else {
        None
    };

    let username = match config.username {
        Some(u) => u,
        None => prompt_username()?,
    };

    let (mut app, events) = App::new(api, config.flip_delay);
    app.start_session(&username);

    let result = app::run(app, events).await;

    if let Some(handle) = socket {
        handle.close();
    }
    result
}

/// Ask for a username. An empty answer takes the login name of the
/// current user.
fn prompt_username() -> Result<String> {
    let fallback = whoami::username();
    print!("Enter your name [{fallback}]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let name = input.trim();
    Ok(if name.is_empty() {
        fallback
    } else {
        name.to_string()
    })
}

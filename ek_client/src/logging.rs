//! Structured logging configuration.
//!
//! Log output goes to stderr so it doesn't interleave with the board on
//! stdout. Levels are configured through `RUST_LOG`.

use exploding_kittens::DrawOutcome;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn,ek_client=info,exploding_kittens=info";

/// Initialize structured logging
///
/// Records emitted through the `log` facade (the game engine uses it) are
/// picked up by the subscriber as well.
///
/// # Example
///
/// ```no_run
/// use ek_client::logging;
///
/// logging::init();
/// tracing::info!("Client starting");
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("Structured logging initialized");
}

/// Log a completed score service call
///
/// # Arguments
///
/// * `method` - HTTP method
/// * `endpoint` - Request path
/// * `status_code` - Response status, `None` if the request never got one
/// * `duration_ms` - Request duration in milliseconds
pub fn log_api_call(method: &str, endpoint: &str, status_code: Option<u16>, duration_ms: u64) {
    match status_code {
        Some(status) if (200..300).contains(&status) => tracing::debug!(
            http_method = method,
            http_path = endpoint,
            http_status = status,
            duration_ms = duration_ms,
            "API request completed"
        ),
        _ => tracing::warn!(
            http_method = method,
            http_path = endpoint,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request failed"
        ),
    }
}

/// Log the end of a draw
pub fn log_draw(username: &str, outcome: &DrawOutcome, score: u32, games_lost: u32) {
    match outcome {
        DrawOutcome::Won | DrawOutcome::Lost => tracing::info!(
            username = username,
            outcome = ?outcome,
            score = score,
            games_lost = games_lost,
            "Round finished"
        ),
        _ => tracing::debug!(username = username, outcome = ?outcome, "Card drawn"),
    }
}

//! Internal modules for the Exploding Kittens client.
//!
//! This library provides the score service client, score synchronisation,
//! the socket connection, command parsing, and the game loop used by the
//! ek_client binary.
//!
//! [`api_client::ApiClient`] wraps every score service endpoint. The start,
//! draw and leaderboard-update calls are provided for completeness; the
//! game loop itself never calls them.

pub mod api_client;
pub mod app;
pub mod commands;
pub mod config;
pub mod logging;
pub mod score_sync;
pub mod socket_client;

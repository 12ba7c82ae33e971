//! Exploding Kittens game engine.
//!
//! This module provides:
//! - Card symbols and the deck generator
//! - The round state machine with deferred draws
//! - Sync tickets for folding asynchronous results back into state

pub mod constants;
pub mod entities;
pub mod state_machine;

pub use state_machine::{
    DrawOutcome, GameError, GameResult, GameState, PendingDraw, SyncField, SyncTicket,
};

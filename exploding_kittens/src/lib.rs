//! # Exploding Kittens
//!
//! A small "Exploding Kittens" card game engine.
//!
//! Each round deals five face-down cards: two cats, a diffuser, a shuffle
//! and a bomb. Revealing a card draws it:
//!
//! - **Cat**: the card leaves the deck
//! - **Diffuser**: immediate win
//! - **Bomb**: loss, unless the diffuser was already found
//! - **Shuffle**: the round restarts with a fresh deck
//!
//! ## Core Modules
//!
//! - [`game`]: Deck generator and the round state machine
//! - [`net`]: Request/response bodies for the external score service
//!
//! ## Example
//!
//! ```
//! use exploding_kittens::{Card, DrawOutcome, GameState};
//!
//! let mut game = GameState::with_deck(vec![Card::Cat, Card::Diffuser]);
//! let pending = game.begin_draw(1).unwrap();
//! assert_eq!(game.finish_draw(pending), Ok(DrawOutcome::Won));
//! assert_eq!(game.score(), 1);
//! ```

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    DrawOutcome, GameError, GameResult, GameState, PendingDraw, SyncField, SyncTicket,
    constants::{self, DECK_SIZE, STARTING_DECK},
    entities::{self, Card, LeaderboardEntry, new_deck, shuffle, shuffle_with},
};

/// Score service message types.
pub mod net;
pub use net::messages;

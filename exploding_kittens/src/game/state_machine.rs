//! Exploding Kittens round state machine.
//!
//! [`GameState`] is the single owned aggregate for a session. Every
//! transition is a method taking `&mut self`; there is exactly one writer
//! at a time and no global store.
//!
//! Besides the immediate transitions it provides two guards for callers
//! that apply results later than they request them:
//!
//! - Deferred draws ([`GameState::begin_draw`] / [`GameState::finish_draw`])
//!   capture the drawn card and the deck generation by value, so a restart
//!   or another draw landing in between invalidates the stale one instead
//!   of applying it to whatever card now sits at that index.
//! - Sync tickets ([`GameState::issue_ticket`]) let only the newest request
//!   for a field write its result back.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::constants::DECK_SIZE;
use super::entities::{Card, LeaderboardEntry, new_deck, shuffle};

/// Errors that can occur while applying a transition
#[derive(Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("card index {index} out of bounds for a deck of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("round is finished, restart to keep playing")]
    RoundFinished,
    #[error("deck changed since the card was revealed")]
    StaleDraw,
}

/// Result type for game transitions
pub type GameResult<T> = Result<T, GameError>;

/// What a draw did to the round.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum DrawOutcome {
    /// A cat left the deck.
    Removed(Card),
    Won,
    Lost,
    /// The round was reset with a fresh deck.
    Restarted,
    /// The remaining cards were shuffled in place.
    Reshuffled,
}

impl fmt::Display for DrawOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Removed(card) => format!("{card} removed from the deck"),
            Self::Won => "you won!".to_string(),
            Self::Lost => "game over!".to_string(),
            Self::Restarted => "deck reshuffled, new round".to_string(),
            Self::Reshuffled => "the cards got shuffled around".to_string(),
        };
        write!(f, "{repr}")
    }
}

/// A revealed card waiting for its effect to be applied.
///
/// Holds everything needed to apply the draw, captured at reveal time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PendingDraw {
    pub index: usize,
    pub card: Card,
    generation: u64,
}

/// State fields written back by asynchronous requests.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SyncField {
    Leaderboard,
    Score,
}

/// Identifies one in-flight request for a [`SyncField`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SyncTicket {
    pub field: SyncField,
    seq: u64,
}

impl SyncTicket {
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

/// Session state for one player.
#[derive(Debug)]
pub struct GameState {
    deck: Vec<Card>,
    /// Face-up flags, always the same length as `deck`.
    deck_revealed: Vec<bool>,
    game_won: bool,
    game_over: bool,
    diffuser_discovered: bool,
    score: u32,
    games_lost: u32,
    /// Empty means unset.
    username: String,
    leaderboard: Vec<LeaderboardEntry>,
    /// Bumped on every change to which card sits at which index.
    generation: u64,
    leaderboard_seq: u64,
    score_seq: u64,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Start a session with a freshly shuffled deck.
    #[must_use]
    pub fn new() -> Self {
        Self::with_deck(new_deck())
    }

    /// Start a session with a specific deck, all cards face down.
    #[must_use]
    pub fn with_deck(deck: Vec<Card>) -> Self {
        let deck_revealed = vec![false; deck.len()];
        Self {
            deck,
            deck_revealed,
            game_won: false,
            game_over: false,
            diffuser_discovered: false,
            score: 0,
            games_lost: 0,
            username: String::new(),
            leaderboard: Vec::new(),
            generation: 0,
            leaderboard_seq: 0,
            score_seq: 0,
        }
    }

    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn deck_revealed(&self) -> &[bool] {
        &self.deck_revealed
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn card_at(&self, index: usize) -> Option<Card> {
        self.deck.get(index).copied()
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.deck_revealed.get(index).copied().unwrap_or(false)
    }

    pub const fn game_won(&self) -> bool {
        self.game_won
    }

    pub const fn game_over(&self) -> bool {
        self.game_over
    }

    pub const fn diffuser_discovered(&self) -> bool {
        self.diffuser_discovered
    }

    /// Whether the round reached a terminal state.
    pub const fn is_finished(&self) -> bool {
        self.game_won || self.game_over
    }

    pub const fn score(&self) -> u32 {
        self.score
    }

    pub const fn games_lost(&self) -> u32 {
        self.games_lost
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_username(&mut self, name: impl Into<String>) {
        self.username = name.into();
        debug!("username set to {:?}", self.username);
    }

    /// Mark the round lost. Counts a loss on every call, so call it at
    /// most once per loss.
    pub fn report_game_over(&mut self) {
        self.game_over = true;
        self.games_lost = self.games_lost.saturating_add(1);
    }

    /// Turn the card at `index` face up.
    ///
    /// # Errors
    ///
    /// [`GameError::IndexOutOfRange`] if `index` isn't a deck position.
    pub fn reveal_card(&mut self, index: usize) -> GameResult<()> {
        self.check_index(index)?;
        self.deck_revealed[index] = true;
        Ok(())
    }

    /// Reset the round with a fresh deck. Score, losses, username and
    /// leaderboard are kept.
    pub fn restart_game(&mut self) {
        self.game_over = false;
        self.game_won = false;
        self.diffuser_discovered = false;
        self.deck_revealed = vec![false; DECK_SIZE];
        self.deck = new_deck();
        self.bump_generation();
    }

    /// Apply the effect of drawing `card` from `index`.
    ///
    /// `index` is only consulted for positional cards; shuffles and
    /// unknown symbols act on the whole deck.
    ///
    /// # Errors
    ///
    /// [`GameError::IndexOutOfRange`] if `card` is positional and `index`
    /// isn't a deck position. The state is untouched on error.
    pub fn draw_card(&mut self, index: usize, card: Card) -> GameResult<DrawOutcome> {
        if card.is_positional() {
            self.check_index(index)?;
        }

        let outcome = match card {
            Card::Cat => {
                self.remove_at(index);
                DrawOutcome::Removed(card)
            }
            Card::Bomb => {
                if self.diffuser_discovered {
                    self.win();
                    DrawOutcome::Won
                } else {
                    self.game_over = true;
                    self.games_lost = self.games_lost.saturating_add(1);
                    DrawOutcome::Lost
                }
            }
            Card::Diffuser => {
                self.remove_at(index);
                self.diffuser_discovered = true;
                self.win();
                DrawOutcome::Won
            }
            Card::Shuffle => {
                self.restart_game();
                DrawOutcome::Restarted
            }
            Card::Unknown => {
                self.deck = shuffle(std::mem::take(&mut self.deck));
                self.bump_generation();
                DrawOutcome::Reshuffled
            }
        };

        debug!("drew {card:?} at {index}: {outcome:?}");
        Ok(outcome)
    }

    /// Reveal the card at `index` and capture what drawing it will do.
    ///
    /// # Errors
    ///
    /// - [`GameError::RoundFinished`] once the round is won or lost.
    /// - [`GameError::IndexOutOfRange`] if `index` isn't a deck position.
    pub fn begin_draw(&mut self, index: usize) -> GameResult<PendingDraw> {
        if self.is_finished() {
            return Err(GameError::RoundFinished);
        }
        self.reveal_card(index)?;
        Ok(PendingDraw {
            index,
            card: self.deck[index],
            generation: self.generation,
        })
    }

    /// Apply a draw started with [`GameState::begin_draw`].
    ///
    /// # Errors
    ///
    /// - [`GameError::StaleDraw`] if the deck changed since the reveal.
    /// - [`GameError::RoundFinished`] if another draw ended the round in
    ///   the meantime.
    ///
    /// The state is left as is on error.
    pub fn finish_draw(&mut self, pending: PendingDraw) -> GameResult<DrawOutcome> {
        if pending.generation != self.generation {
            warn!(
                "dropping draw of {:?} at {}: deck generation {} is now {}",
                pending.card, pending.index, pending.generation, self.generation
            );
            return Err(GameError::StaleDraw);
        }
        if self.is_finished() {
            debug!(
                "dropping draw of {:?} at {}: round already over",
                pending.card, pending.index
            );
            return Err(GameError::RoundFinished);
        }
        self.draw_card(pending.index, pending.card)
    }

    /// Hand out a ticket for a new request that will write `field`.
    /// Issuing a ticket invalidates every older ticket for the same field.
    pub fn issue_ticket(&mut self, field: SyncField) -> SyncTicket {
        let seq = match field {
            SyncField::Leaderboard => &mut self.leaderboard_seq,
            SyncField::Score => &mut self.score_seq,
        };
        *seq += 1;
        SyncTicket { field, seq: *seq }
    }

    /// Whether `ticket` is the newest one issued for its field.
    pub fn is_current(&self, ticket: SyncTicket) -> bool {
        let latest = match ticket.field {
            SyncField::Leaderboard => self.leaderboard_seq,
            SyncField::Score => self.score_seq,
        };
        ticket.seq == latest
    }

    /// Overwrite the leaderboard if `ticket` is still current.
    /// Returns whether the result was applied.
    pub fn apply_leaderboard(
        &mut self,
        ticket: SyncTicket,
        entries: Vec<LeaderboardEntry>,
    ) -> bool {
        if ticket.field != SyncField::Leaderboard || !self.is_current(ticket) {
            debug!("discarding stale leaderboard result (ticket {})", ticket.seq);
            return false;
        }
        self.leaderboard = entries;
        true
    }

    /// Overwrite the score if `ticket` is still current.
    /// Returns whether the result was applied.
    pub fn apply_score(&mut self, ticket: SyncTicket, score: u32) -> bool {
        if ticket.field != SyncField::Score || !self.is_current(ticket) {
            debug!("discarding stale score result (ticket {})", ticket.seq);
            return false;
        }
        self.score = score;
        true
    }

    fn check_index(&self, index: usize) -> GameResult<()> {
        let len = self.deck_revealed.len();
        if index >= len {
            return Err(GameError::IndexOutOfRange { index, len });
        }
        Ok(())
    }

    fn remove_at(&mut self, index: usize) {
        self.deck.remove(index);
        self.deck_revealed.remove(index);
        self.bump_generation();
    }

    fn win(&mut self) {
        self.game_won = true;
        self.score = self.score.saturating_add(1);
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (card, revealed)) in self.deck.iter().zip(&self.deck_revealed).enumerate() {
            if *revealed {
                write!(f, "[{i}:{card}] ")?;
            } else {
                write!(f, "[{i}:##] ")?;
            }
        }
        write!(f, "| score {} | lost {}", self.score, self.games_lost)
    }
}

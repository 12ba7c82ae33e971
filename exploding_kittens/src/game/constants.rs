//! Game constants.

use super::entities::Card;

/// Number of cards dealt at the start of every round.
pub const DECK_SIZE: usize = 5;

/// The fixed multiset every round is shuffled from. Cats appear twice.
pub const STARTING_DECK: [Card; DECK_SIZE] =
    [Card::Cat, Card::Diffuser, Card::Shuffle, Card::Bomb, Card::Cat];

/// Default delay between revealing a card and applying its effect.
pub const DEFAULT_FLIP_DELAY_MS: u64 = 800;

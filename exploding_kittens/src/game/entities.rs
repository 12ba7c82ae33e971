use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize};
use std::{convert::Infallible, fmt, str::FromStr};

use super::constants::STARTING_DECK;

const CAT_SYMBOL: &str = "\u{1F63C}";
const DIFFUSER_SYMBOL: &str = "\u{1F645}\u{200D}\u{2642}\u{FE0F}";
const SHUFFLE_SYMBOL: &str = "\u{1F500}";
const BOMB_SYMBOL: &str = "\u{1F4A3}";

/// A card symbol.
///
/// The deck is only ever built from the first four variants. `Unknown`
/// stands in for any symbol the engine doesn't recognize when it arrives
/// as draw input; drawing it reshuffles the deck.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Card {
    Cat,
    Diffuser,
    Shuffle,
    Bomb,
    Unknown,
}

impl Card {
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Cat => CAT_SYMBOL,
            Self::Diffuser => DIFFUSER_SYMBOL,
            Self::Shuffle => SHUFFLE_SYMBOL,
            Self::Bomb => BOMB_SYMBOL,
            Self::Unknown => "?",
        }
    }

    /// Whether drawing this card acts on the drawn position.
    #[must_use]
    pub const fn is_positional(&self) -> bool {
        matches!(self, Self::Cat | Self::Diffuser | Self::Bomb)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Card {
    type Err = Infallible;

    /// Accepts either the emoji symbol or the card's name. The diffuser is
    /// also matched without its gender/variation suffix since terminals
    /// and keyboards tend to drop it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let card = match s {
            CAT_SYMBOL => Self::Cat,
            SHUFFLE_SYMBOL => Self::Shuffle,
            BOMB_SYMBOL => Self::Bomb,
            s if s.starts_with('\u{1F645}') => Self::Diffuser,
            s => match s.to_ascii_lowercase().as_str() {
                "cat" => Self::Cat,
                "diffuser" | "defuse" => Self::Diffuser,
                "shuffle" => Self::Shuffle,
                "bomb" => Self::Bomb,
                _ => Self::Unknown,
            },
        };
        Ok(card)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let Ok(card) = s.parse::<Card>();
        Ok(card)
    }
}

/// One row of the remote leaderboard. The engine never ranks or edits
/// these; it only stores what the score service returns.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: u32,
}

impl fmt::Display for LeaderboardEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<16} {:>5}", self.username, self.score)
    }
}

/// Return a uniformly random permutation of `items` using the thread RNG.
#[must_use]
pub fn shuffle<T>(items: Vec<T>) -> Vec<T> {
    shuffle_with(items, &mut rand::rng())
}

/// Return a uniformly random permutation of `items` drawn from `rng`.
#[must_use]
pub fn shuffle_with<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Vec<T> {
    items.shuffle(rng);
    items
}

/// A freshly shuffled starting deck.
#[must_use]
pub fn new_deck() -> Vec<Card> {
    shuffle(STARTING_DECK.to_vec())
}

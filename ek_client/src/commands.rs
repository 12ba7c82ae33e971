use std::fmt;

/// A command typed at the prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Flip the card at this position.
    Reveal(usize),
    Restart,
    SetName(String),
    Leaderboard,
    Score,
    Register,
    Login,
    /// Give up the current round.
    Forfeit,
    Board,
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Card position isn't a number.
    InvalidIndex(String),
    /// Reveal command missing the card position.
    RevealMissingIndex,
    /// Name command missing the name.
    NameMissing,
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIndex(value) => write!(
                f,
                "Invalid card position '{}'. Must be a number (e.g., 'reveal 2')",
                value
            ),
            Self::RevealMissingIndex => {
                write!(f, "Reveal requires a card position (e.g., 'reveal 0')")
            }
            Self::NameMissing => write!(f, "Name requires a username (e.g., 'name alice')"),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a command string into a [`Command`].
///
/// # Examples
///
/// ```
/// use ek_client::commands::{Command, parse_command};
///
/// assert_eq!(parse_command("reveal 2"), Ok(Command::Reveal(2)));
/// assert_eq!(parse_command("3"), Ok(Command::Reveal(3)));
/// assert_eq!(parse_command("name alice"), Ok(Command::SetName("alice".to_string())));
/// assert_eq!(parse_command("restart"), Ok(Command::Restart));
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();

    match trimmed.to_ascii_lowercase().as_str() {
        "restart" | "new" => return Ok(Command::Restart),
        "leaderboard" | "lb" => return Ok(Command::Leaderboard),
        "score" => return Ok(Command::Score),
        "register" => return Ok(Command::Register),
        "login" => return Ok(Command::Login),
        "forfeit" | "give up" => return Ok(Command::Forfeit),
        "board" | "show" => return Ok(Command::Board),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.first() {
        Some(&("reveal" | "flip" | "r")) => parse_reveal_command(&parts),
        Some(&"name") => parse_name_command(trimmed),
        Some(first) if first.chars().all(|c| c.is_ascii_digit()) && parts.len() == 1 => {
            parse_index(first)
        }
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Parse a reveal command: "reveal INDEX"
fn parse_reveal_command(parts: &[&str]) -> Result<Command, ParseError> {
    match parts.get(1) {
        Some(value) => parse_index(value),
        None => Err(ParseError::RevealMissingIndex),
    }
}

fn parse_index(value: &str) -> Result<Command, ParseError> {
    value
        .parse::<usize>()
        .map(Command::Reveal)
        .map_err(|_| ParseError::InvalidIndex(value.to_string()))
}

/// Parse a name command: "name USERNAME". Everything after the keyword is
/// the name, spaces included.
fn parse_name_command(trimmed: &str) -> Result<Command, ParseError> {
    let name = trimmed["name".len()..].trim();
    if name.is_empty() {
        return Err(ParseError::NameMissing);
    }
    Ok(Command::SetName(name.to_string()))
}

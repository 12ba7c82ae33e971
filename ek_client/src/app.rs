//! Terminal game loop.
//!
//! One task owns the [`GameState`]. Typed commands, flipped cards coming
//! back from their animation delay, and score service completions all
//! arrive as events and are applied one at a time.

use anyhow::Result;
use exploding_kittens::{DrawOutcome, GameError, GameState, PendingDraw, SyncField};
use std::{sync::Arc, time::Duration};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{debug, info};

use crate::{
    api_client::ApiClient,
    commands::{Command, parse_command},
    logging::log_draw,
    score_sync::{ScoreSync, SyncEvent, apply_event},
};

pub const HELP: &str = "\
reveal <N>  (or just <N>)
        Flip card N. Its effect applies once the flip finishes.
restart
        Start a new round with a fresh deck.
name <USERNAME>
        Set your username and load your score.
leaderboard
        Refresh and show the leaderboard.
score
        Refresh your score from the server.
register | login
        Register or log in with the current username.
forfeit
        Give up the current round (counts as a loss).
board
        Show the cards again.
quit
        Leave the game.

Cards: \u{1F63C} is removed, \u{1F4A3} loses unless you found \u{1F645}\u{200D}\u{2642}\u{FE0F} first, \
\u{1F645}\u{200D}\u{2642}\u{FE0F} wins, \u{1F500} restarts.
";

/// Whether the loop should keep running after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Receiving ends of the channels feeding [`App`].
pub struct AppEvents {
    pub draws: mpsc::UnboundedReceiver<PendingDraw>,
    pub syncs: mpsc::UnboundedReceiver<SyncEvent>,
}

pub struct App {
    state: GameState,
    api: Arc<ApiClient>,
    sync: ScoreSync<ApiClient>,
    flip_delay: Duration,
    draw_tx: mpsc::UnboundedSender<PendingDraw>,
}

impl App {
    pub fn new(api: Arc<ApiClient>, flip_delay: Duration) -> (Self, AppEvents) {
        let (draw_tx, draws) = mpsc::unbounded_channel();
        let (sync_tx, syncs) = mpsc::unbounded_channel();
        let app = Self {
            state: GameState::new(),
            sync: ScoreSync::new(Arc::clone(&api), sync_tx),
            api,
            flip_delay,
            draw_tx,
        };
        (app, AppEvents { draws, syncs })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Set the username and load the session's score and leaderboard.
    pub fn start_session(&mut self, username: &str) {
        self.state.set_username(username);
        info!(username = username, "Session started");
        self.sync.refresh_leaderboard(&mut self.state);
        self.sync.refresh_score(&mut self.state);
    }

    pub fn handle_command(&mut self, command: Command) -> Flow {
        match command {
            Command::Reveal(index) => self.reveal(index),
            Command::Restart => {
                self.state.restart_game();
                self.print_board();
            }
            Command::SetName(name) => self.start_session(&name),
            Command::Leaderboard => {
                self.sync.refresh_leaderboard(&mut self.state);
            }
            Command::Score => {
                self.sync.refresh_score(&mut self.state);
            }
            Command::Register => self.register(),
            Command::Login => self.login(),
            Command::Forfeit => {
                if self.state.is_finished() {
                    println!("The round is already over. Type 'restart' to play again.");
                } else {
                    self.state.report_game_over();
                    println!("You gave up. Game over!");
                    self.print_board();
                }
            }
            Command::Board => self.print_board(),
            Command::Help => print!("{HELP}"),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Apply a card whose flip finished.
    pub fn handle_draw(&mut self, pending: PendingDraw) -> Option<DrawOutcome> {
        let score_before = self.state.score();
        let outcome = match self.state.finish_draw(pending) {
            Ok(outcome) => outcome,
            Err(GameError::StaleDraw) => {
                debug!(index = pending.index, "Ignoring flip from an older deck");
                return None;
            }
            Err(GameError::RoundFinished) => {
                debug!(index = pending.index, "Ignoring flip, the round already ended");
                return None;
            }
            Err(e) => {
                println!("{e}");
                return None;
            }
        };

        log_draw(
            self.state.username(),
            &outcome,
            self.state.score(),
            self.state.games_lost(),
        );
        println!("{} {outcome}", pending.card);

        if outcome == DrawOutcome::Won && !self.state.username().is_empty() {
            self.sync.submit_win(&mut self.state, score_before);
            self.sync.refresh_leaderboard(&mut self.state);
        }

        self.print_board();
        Some(outcome)
    }

    /// Fold in a score service completion. Returns whether state changed.
    pub fn handle_sync(&mut self, event: SyncEvent) -> bool {
        let ticket = event.ticket();
        if !apply_event(&mut self.state, event) {
            debug!(field = ?ticket.field, seq = ticket.seq(), "Sync result not applied");
            return false;
        }

        if ticket.field == SyncField::Leaderboard {
            self.print_leaderboard();
        } else {
            println!("Score: {}", self.state.score());
        }
        true
    }

    fn reveal(&mut self, index: usize) {
        match self.state.begin_draw(index) {
            Ok(pending) => {
                self.print_board();
                let tx = self.draw_tx.clone();
                let delay = self.flip_delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if tx.send(pending).is_err() {
                        debug!("Flip dropped, receiver closed");
                    }
                });
            }
            Err(e) => println!("{e}"),
        }
    }

    fn register(&self) {
        let Some(username) = self.username_or_hint() else {
            return;
        };
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            match api.register(&username).await {
                Ok(response) => println!("{}", response.message_or_default()),
                Err(_) => println!("Registration failed."),
            }
        });
    }

    fn login(&self) {
        let Some(username) = self.username_or_hint() else {
            return;
        };
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            match api.login(&username).await {
                Ok(_) => println!("Logged in as {username}"),
                Err(_) => println!("Login failed."),
            }
        });
    }

    fn username_or_hint(&self) -> Option<String> {
        let username = self.state.username();
        if username.is_empty() {
            println!("Set a username first (e.g., 'name alice')");
            return None;
        }
        Some(username.to_string())
    }

    pub fn print_board(&self) {
        println!("\n{}", "═".repeat(48));
        println!("{}", self.state);
        if self.state.diffuser_discovered() {
            println!("You found a bomb diffuser! \u{1F645}\u{200D}\u{2642}\u{FE0F}");
        }
        if self.state.game_over() {
            println!("Game Over!");
        }
        if self.state.game_won() {
            println!("You Won!");
        }
        if self.state.is_finished() {
            println!("Type 'restart' to play again.");
        }
        println!("{}", "═".repeat(48));
    }

    fn print_leaderboard(&self) {
        println!("\nLeaderboard:");
        if self.state.leaderboard().is_empty() {
            println!("  (empty)");
        }
        for (i, entry) in self.state.leaderboard().iter().enumerate() {
            println!("  {:>2}. {entry}", i + 1);
        }
    }
}

/// Run the game until the user quits or stdin closes.
pub async fn run(mut app: App, mut events: AppEvents) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    app.print_board();
    println!("Type 'help' for commands.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break; // EOF
                };
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                match parse_command(input) {
                    Ok(command) => {
                        if app.handle_command(command) == Flow::Quit {
                            println!("Bye!");
                            break;
                        }
                    }
                    Err(e) => eprintln!("Error: {e}"),
                }
            }
            Some(pending) = events.draws.recv() => {
                app.handle_draw(pending);
            }
            Some(event) = events.syncs.recv() => {
                app.handle_sync(event);
            }
        }
    }

    Ok(())
}

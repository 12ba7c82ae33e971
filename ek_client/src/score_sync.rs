//! Score and leaderboard synchronisation.
//!
//! Requests run on spawned tasks and never touch [`GameState`] directly.
//! Each one is tagged with a [`SyncTicket`] when it's issued and reports
//! back as a [`SyncEvent`] over a channel; the task that owns the state
//! folds events in with [`apply_event`]. Only the newest ticket for a field
//! can write it, so a slow response can't clobber a newer one.

use async_trait::async_trait;
use exploding_kittens::{
    GameState, LeaderboardEntry, SyncField, SyncTicket, messages::ScoreResponse,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::api_client::{ApiClient, RequestError, RequestResult};

/// The score service calls the game flow depends on
#[async_trait]
pub trait ScoreApi: Send + Sync {
    /// Fetch the full leaderboard
    async fn fetch_leaderboard(&self) -> RequestResult<Vec<LeaderboardEntry>>;

    /// Fetch the stored score for a user
    async fn fetch_score(&self, username: &str) -> RequestResult<ScoreResponse>;

    /// Store one more win on top of `last_known_score`
    async fn submit_score_increment(
        &self,
        username: &str,
        last_known_score: u32,
    ) -> RequestResult<ScoreResponse>;
}

#[async_trait]
impl ScoreApi for ApiClient {
    async fn fetch_leaderboard(&self) -> RequestResult<Vec<LeaderboardEntry>> {
        ApiClient::fetch_leaderboard(self).await
    }

    async fn fetch_score(&self, username: &str) -> RequestResult<ScoreResponse> {
        ApiClient::fetch_score(self, username).await
    }

    async fn submit_score_increment(
        &self,
        username: &str,
        last_known_score: u32,
    ) -> RequestResult<ScoreResponse> {
        ApiClient::submit_score_increment(self, username, last_known_score).await
    }
}

/// Completion of a sync request
#[derive(Debug)]
pub enum SyncEvent {
    Leaderboard {
        ticket: SyncTicket,
        result: Result<Vec<LeaderboardEntry>, RequestError>,
    },
    Score {
        ticket: SyncTicket,
        result: Result<ScoreResponse, RequestError>,
    },
}

impl SyncEvent {
    pub fn ticket(&self) -> SyncTicket {
        match self {
            Self::Leaderboard { ticket, .. } | Self::Score { ticket, .. } => *ticket,
        }
    }
}

pub async fn fetch_leaderboard<A: ScoreApi + ?Sized>(api: &A, ticket: SyncTicket) -> SyncEvent {
    SyncEvent::Leaderboard {
        ticket,
        result: api.fetch_leaderboard().await,
    }
}

pub async fn fetch_score<A: ScoreApi + ?Sized>(
    api: &A,
    ticket: SyncTicket,
    username: &str,
) -> SyncEvent {
    SyncEvent::Score {
        ticket,
        result: api.fetch_score(username).await,
    }
}

pub async fn submit_score_increment<A: ScoreApi + ?Sized>(
    api: &A,
    ticket: SyncTicket,
    username: &str,
    last_known_score: u32,
) -> SyncEvent {
    SyncEvent::Score {
        ticket,
        result: api.submit_score_increment(username, last_known_score).await,
    }
}

/// Fold a completed request into `state`.
///
/// Failures are logged and leave the state as it was. Returns whether the
/// state changed.
pub fn apply_event(state: &mut GameState, event: SyncEvent) -> bool {
    match event {
        SyncEvent::Leaderboard { ticket, result } => match result {
            Ok(entries) => {
                debug!(entries = entries.len(), "Leaderboard received");
                state.apply_leaderboard(ticket, entries)
            }
            Err(e) => {
                error!("Leaderboard sync failed: {e}");
                false
            }
        },
        SyncEvent::Score { ticket, result } => match result {
            Ok(ScoreResponse { score }) => {
                debug!(score = score, "Score received");
                state.apply_score(ticket, score)
            }
            Err(e) => {
                error!("Score sync failed: {e}");
                false
            }
        },
    }
}

/// Issues sync requests on the tokio runtime and posts their completions
/// to a channel.
pub struct ScoreSync<A> {
    api: Arc<A>,
    tx: mpsc::UnboundedSender<SyncEvent>,
}

impl<A: ScoreApi + 'static> ScoreSync<A> {
    pub fn new(api: Arc<A>, tx: mpsc::UnboundedSender<SyncEvent>) -> Self {
        Self { api, tx }
    }

    /// Refresh the leaderboard in the background
    pub fn refresh_leaderboard(&self, state: &mut GameState) -> SyncTicket {
        let ticket = state.issue_ticket(SyncField::Leaderboard);
        let api = Arc::clone(&self.api);
        self.spawn(async move { fetch_leaderboard(api.as_ref(), ticket).await });
        ticket
    }

    /// Refresh the current user's score in the background
    pub fn refresh_score(&self, state: &mut GameState) -> SyncTicket {
        let ticket = state.issue_ticket(SyncField::Score);
        let api = Arc::clone(&self.api);
        let username = state.username().to_string();
        self.spawn(async move { fetch_score(api.as_ref(), ticket, &username).await });
        ticket
    }

    /// Report a win in the background
    ///
    /// `last_known_score` is the score before the win; the server is sent
    /// that plus one.
    pub fn submit_win(&self, state: &mut GameState, last_known_score: u32) -> SyncTicket {
        let ticket = state.issue_ticket(SyncField::Score);
        let api = Arc::clone(&self.api);
        let username = state.username().to_string();
        info!(username = %username, "Submitting win");
        self.spawn(async move {
            submit_score_increment(api.as_ref(), ticket, &username, last_known_score).await
        });
        ticket
    }

    fn spawn<F>(&self, request: F)
    where
        F: Future<Output = SyncEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = request.await;
            if tx.send(event).is_err() {
                debug!("Sync result dropped, receiver closed");
            }
        });
    }
}

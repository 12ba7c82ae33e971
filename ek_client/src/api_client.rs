//! HTTP API client for the score service.
//!
//! The game loop uses the leaderboard, score, register and login calls.
//! [`ApiClient::start_game`], [`ApiClient::draw`] and
//! [`ApiClient::update_leaderboard`] cover the rest of the service's
//! endpoints for completeness; no prompt command calls them.

use exploding_kittens::{
    LeaderboardEntry,
    messages::{LeaderboardUpdate, RegisterResponse, ScoreResponse, ScoreUpdate, UsernameRequest},
};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::error;

use crate::logging::log_api_call;

/// Errors returned by score service calls
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request never produced a response
    #[error("Failed to send {endpoint} request: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status
    #[error("{endpoint} failed with HTTP {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// The response body wasn't the expected JSON
    #[error("Failed to parse {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl RequestError {
    /// HTTP status of the failed response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } | Self::Decode { source, .. } => {
                source.status().map(|s| s.as_u16())
            }
        }
    }
}

/// Result type for score service calls
pub type RequestResult<T> = Result<T, RequestError>;

/// API client for communicating with the score service
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a client whose requests give up after `timeout`
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client can't be built.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> RequestResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| RequestError::Transport {
                endpoint: "client",
                source,
            })?;
        Ok(Self::with_client(base_url, client))
    }

    fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full leaderboard
    pub async fn fetch_leaderboard(&self) -> RequestResult<Vec<LeaderboardEntry>> {
        let request = self.client.get(self.url("/leaderboard"));
        self.send("GET", "/leaderboard", request).await
    }

    /// Fetch the stored score for `username`
    pub async fn fetch_score(&self, username: &str) -> RequestResult<ScoreResponse> {
        let request = self
            .client
            .post(self.url("/getScore"))
            .json(&UsernameRequest::new(username));
        self.send("POST", "/getScore", request).await
    }

    /// Store one more win for `username`
    ///
    /// The new score is `last_known_score + 1`, computed on this side; the
    /// server just stores what it's sent.
    pub async fn submit_score_increment(
        &self,
        username: &str,
        last_known_score: u32,
    ) -> RequestResult<ScoreResponse> {
        let request = self
            .client
            .post(self.url("/updateScore"))
            .json(&ScoreUpdate::increment(username, last_known_score));
        self.send("POST", "/updateScore", request).await
    }

    /// Register a new user
    pub async fn register(&self, username: &str) -> RequestResult<RegisterResponse> {
        let request = self
            .client
            .post(self.url("/register"))
            .json(&UsernameRequest::new(username));
        self.send("POST", "/register", request).await
    }

    /// Log in as an existing user
    pub async fn login(&self, username: &str) -> RequestResult<serde_json::Value> {
        let request = self
            .client
            .post(self.url("/login"))
            .json(&UsernameRequest::new(username));
        self.send("POST", "/login", request).await
    }

    /// Ask the server to start a game for `username`
    pub async fn start_game(&self, username: &str) -> RequestResult<serde_json::Value> {
        let request = self
            .client
            .post(self.url("/start"))
            .query(&[("username", username)]);
        self.send("POST", "/start", request).await
    }

    /// Ask the server to draw a card for `username`
    pub async fn draw(&self, username: &str) -> RequestResult<serde_json::Value> {
        let request = self
            .client
            .get(self.url("/draw"))
            .query(&[("username", username)]);
        self.send("GET", "/draw", request).await
    }

    /// Add `points` to the leaderboard entry of `username`
    pub async fn update_leaderboard(
        &self,
        username: &str,
        points: u32,
    ) -> RequestResult<serde_json::Value> {
        let request = self
            .client
            .post(self.url("/updateLeaderboard"))
            .json(&LeaderboardUpdate {
                username: username.to_string(),
                points,
            });
        self.send("POST", "/updateLeaderboard", request).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Send `request`, treating every non-2xx response as an error.
    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> RequestResult<T> {
        let start = Instant::now();
        let (status, result) = Self::execute(endpoint, request).await;
        log_api_call(method, endpoint, status, start.elapsed().as_millis() as u64);

        if let Err(e) = &result {
            error!(endpoint = endpoint, "{e}");
        }
        result
    }

    async fn execute<T: DeserializeOwned>(
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> (Option<u16>, RequestResult<T>) {
        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => return (None, Err(RequestError::Transport { endpoint, source })),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {}", e));
            let err = RequestError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            };
            return (Some(status.as_u16()), Err(err));
        }

        let result = response
            .json()
            .await
            .map_err(|source| RequestError::Decode { endpoint, source });
        (Some(status.as_u16()), result)
    }
}

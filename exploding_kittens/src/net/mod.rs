//! Wire types shared with the score service.

/// Request and response bodies of the score service HTTP API.
pub mod messages;

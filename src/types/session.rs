use serde::{Deserialize, Serialize};

use super::TokenSet;

/// Per-chat state, created implicitly on the first `/start` and kept for the
/// lifetime of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    /// The chat was sent an authorize URL and the next free-text message is
    /// treated as an authorization code.
    pub awaiting_code: bool,
    pub tokens: Option<TokenSet>,
    /// Strava athlete id, captured from the token-exchange response and used
    /// by the stats endpoint.
    pub athlete_id: Option<u64>,
}

impl ChatSession {
    pub fn is_authorized(&self) -> bool {
        self.tokens.is_some()
    }
}

use serde::{Deserialize, Serialize};

/// Access/refresh token pair issued by Strava. `expires_at` is the unix
/// timestamp returned by the provider, stored verbatim. The record is only
/// ever replaced as a whole, never field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl TokenSet {
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

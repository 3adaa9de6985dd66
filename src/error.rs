use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong while brokering a command. Each variant maps
/// to exactly one user-facing reply; none of them crash the process.
#[derive(Debug, Error)]
pub enum BotError {
    /// The chat has no stored token set; the user must run `/start`.
    #[error("chat is not authorized")]
    NotAuthorized,

    /// Non-success status on the authorization-code exchange. The chat stays
    /// in the awaiting state so the user can paste the code again.
    #[error("authorization code exchange failed with status {0}")]
    AuthExchangeFailed(StatusCode),

    /// Non-success status on a token refresh. The stale token set is kept,
    /// but the user must re-authorize.
    #[error("token refresh failed with status {0}")]
    RefreshFailed(StatusCode),

    /// Non-success status on one of the read endpoints.
    #[error("strava returned status {0}")]
    Upstream(StatusCode),

    #[error("request to strava failed")]
    Transport(#[from] reqwest::Error),
}

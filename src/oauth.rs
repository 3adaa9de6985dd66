use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::apis::StravaApi;
use crate::error::BotError;
use crate::session_store::SessionStore;
use crate::types::{ChatSession, TokenSet};

/// Outcome of handing a free-text message to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSubmission {
    /// The chat was not awaiting a code; the message is not an authorization
    /// code and no exchange was attempted.
    Ignored,
    /// Code exchanged, token set stored, awaiting state cleared.
    Authorized,
}

/// Authorization coordinator and token refresher, shared by all handlers.
///
/// Per chat the state machine is `Unauthenticated -> AwaitingCode ->
/// Authenticated`, with an `Authenticated -> Refreshing -> Authenticated`
/// loop every time the stored token expires. A failed refresh keeps the
/// stale token set but reports no token, so the caller prompts for `/start`.
#[derive(Clone)]
pub struct AuthService {
    api: Arc<StravaApi>,
    store: Arc<dyn SessionStore>,
    /// Single-flight guards for the check-then-refresh sequence. The
    /// dispatcher may run two commands of the same chat concurrently, and an
    /// unguarded race would let a second refresh overwrite the first.
    refresh_locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl AuthService {
    pub fn new(api: StravaApi, store: Arc<dyn SessionStore>) -> Self {
        Self {
            api: Arc::new(api),
            store,
            refresh_locks: Arc::new(DashMap::new()),
        }
    }

    pub fn api(&self) -> &StravaApi {
        &self.api
    }

    pub async fn is_authorized(&self, chat_id: i64) -> bool {
        self.store
            .get(chat_id)
            .await
            .is_some_and(|session| session.is_authorized())
    }

    pub async fn athlete_id(&self, chat_id: i64) -> Option<u64> {
        self.store.get(chat_id).await.and_then(|s| s.athlete_id)
    }

    pub async fn remember_athlete(&self, chat_id: i64, athlete_id: u64) {
        if let Some(mut session) = self.store.get(chat_id).await {
            session.athlete_id = Some(athlete_id);
            self.store.put(chat_id, session).await;
        }
    }

    /// Marks the chat as awaiting an authorization code and returns the URL
    /// the user must visit. Safe to call again while already awaiting.
    pub async fn begin_authorization(&self, chat_id: i64) -> String {
        let mut session = self.store.get(chat_id).await.unwrap_or_default();
        session.awaiting_code = true;
        self.store.put(chat_id, session).await;

        info!(chat_id, "awaiting authorization code");
        self.api.authorize_url()
    }

    /// Exchanges a pasted authorization code. Only acts when the chat is in
    /// the awaiting state; stray free text never reaches the token endpoint.
    /// On a failed exchange the awaiting state is left untouched so the user
    /// may paste the code again.
    pub async fn submit_code(&self, chat_id: i64, code: &str) -> Result<CodeSubmission, BotError> {
        let Some(mut session) = self.store.get(chat_id).await else {
            return Ok(CodeSubmission::Ignored);
        };
        if !session.awaiting_code {
            return Ok(CodeSubmission::Ignored);
        }

        let grant = self.api.exchange_code(code.trim()).await?;

        session.athlete_id = grant.athlete.map(|a| a.id).or(session.athlete_id);
        session.tokens = Some(TokenSet {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: grant.expires_at,
        });
        session.awaiting_code = false;
        self.store.put(chat_id, session).await;

        info!(chat_id, "authorization complete");
        Ok(CodeSubmission::Authorized)
    }

    /// Returns an access token usable right now.
    ///
    /// `Err(NotAuthorized)` when the chat has no stored token set; no network
    /// call is made in that case. While the stored token is unexpired it is
    /// returned as-is. Once expired, exactly one refresh call runs and the
    /// whole token set is overwritten with the provider's new triple.
    /// `Ok(None)` means the refresh failed: the stale token set stays in the
    /// store and the caller must treat the chat as unauthenticated.
    pub async fn access_token(&self, chat_id: i64) -> Result<Option<String>, BotError> {
        if let TokenState::Valid(token) = self.current_tokens(chat_id).await? {
            return Ok(Some(token));
        }

        let lock = Arc::clone(&self.refresh_locks.entry(chat_id).or_default());
        let _guard = lock.lock().await;

        // A concurrent command may have refreshed while this one waited.
        if let TokenState::Valid(token) = self.current_tokens(chat_id).await? {
            return Ok(Some(token));
        }

        let Some(session) = self.store.get(chat_id).await else {
            return Err(BotError::NotAuthorized);
        };
        let Some(tokens) = session.tokens.clone() else {
            return Err(BotError::NotAuthorized);
        };

        info!(chat_id, "access token expired, refreshing");
        match self.api.refresh_token(&tokens.refresh_token).await {
            Ok(grant) => {
                let refreshed = TokenSet {
                    access_token: grant.access_token.clone(),
                    refresh_token: grant.refresh_token,
                    expires_at: grant.expires_at,
                };
                self.store
                    .put(
                        chat_id,
                        ChatSession {
                            tokens: Some(refreshed),
                            ..session
                        },
                    )
                    .await;
                Ok(Some(grant.access_token))
            }
            Err(err) => {
                warn!(chat_id, error = %err, "token refresh failed");
                Ok(None)
            }
        }
    }

    async fn current_tokens(&self, chat_id: i64) -> Result<TokenState, BotError> {
        let tokens = self
            .store
            .get(chat_id)
            .await
            .and_then(|session| session.tokens)
            .ok_or(BotError::NotAuthorized)?;

        if tokens.is_expired_at(Utc::now().timestamp()) {
            Ok(TokenState::Expired)
        } else {
            Ok(TokenState::Valid(tokens.access_token))
        }
    }
}

enum TokenState {
    Valid(String),
    Expired,
}

use async_trait::async_trait;
use dashmap::DashMap;

use crate::types::ChatSession;

/// Session persistence seam, keyed by chat id. Handlers get this injected so
/// a persistent backend can replace the in-memory map without touching them.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, chat_id: i64) -> Option<ChatSession>;
    async fn put(&self, chat_id: i64, session: ChatSession);
    async fn delete(&self, chat_id: i64);
}

/// Process-lifetime map; sessions are lost on restart.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<i64, ChatSession>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, chat_id: i64) -> Option<ChatSession> {
        self.sessions.get(&chat_id).map(|entry| entry.clone())
    }

    async fn put(&self, chat_id: i64, session: ChatSession) {
        self.sessions.insert(chat_id, session);
    }

    async fn delete(&self, chat_id: i64) {
        self.sessions.remove(&chat_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenSet;

    #[tokio::test]
    async fn put_overwrites_whole_session() {
        let store = InMemorySessionStore::new();

        store.put(42, ChatSession { awaiting_code: true, ..Default::default() }).await;

        let tokens = TokenSet {
            access_token: "A".to_string(),
            refresh_token: "R".to_string(),
            expires_at: 1000,
        };
        store
            .put(42, ChatSession { awaiting_code: false, tokens: Some(tokens.clone()), athlete_id: Some(7) })
            .await;

        let session = store.get(42).await.unwrap();
        assert!(!session.awaiting_code);
        assert_eq!(session.tokens, Some(tokens));
        assert_eq!(session.athlete_id, Some(7));
    }

    #[tokio::test]
    async fn chats_are_isolated() {
        let store = InMemorySessionStore::new();

        store.put(1, ChatSession { awaiting_code: true, ..Default::default() }).await;

        assert!(store.get(2).await.is_none());

        store.delete(1).await;
        assert!(store.get(1).await.is_none());
    }
}

use std::sync::Arc;

use chrono::Utc;
use reqwest::Url;
use serde_json::json;
use wiremock::matchers::{any, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use strava_telegram_bot::apis::{StravaApi, StravaConfig, SCOPE};
use strava_telegram_bot::error::BotError;
use strava_telegram_bot::oauth::{AuthService, CodeSubmission};
use strava_telegram_bot::session_store::{InMemorySessionStore, SessionStore};
use strava_telegram_bot::types::{ChatSession, TokenSet};

const CHAT: i64 = 42;

fn test_api(server: &MockServer) -> StravaApi {
    StravaApi::new(StravaConfig {
        client_id: "test_client".to_string(),
        client_secret: "test_secret".to_string(),
        redirect_uri: "http://localhost:8080/callback".to_string(),
        authorize_url: "https://www.strava.com/oauth/authorize".to_string(),
        token_url: format!("{}/oauth/token", server.uri()),
        api_base_url: server.uri(),
    })
}

fn service(server: &MockServer) -> (AuthService, Arc<InMemorySessionStore>) {
    let store = Arc::new(InMemorySessionStore::new());
    let auth = AuthService::new(test_api(server), store.clone());
    (auth, store)
}

fn tokens(access: &str, refresh: &str, expires_at: i64) -> TokenSet {
    TokenSet {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        expires_at,
    }
}

#[tokio::test]
async fn data_call_without_session_fails_without_network() {
    let server = MockServer::start().await;
    Mock::given(any()).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;

    let (auth, _store) = service(&server);

    let result = auth.access_token(CHAT).await;
    assert!(matches!(result, Err(BotError::NotAuthorized)));
}

#[tokio::test]
async fn session_without_tokens_is_not_authorized() {
    let server = MockServer::start().await;
    Mock::given(any()).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;

    let (auth, store) = service(&server);
    store.put(CHAT, ChatSession { awaiting_code: true, ..Default::default() }).await;

    let result = auth.access_token(CHAT).await;
    assert!(matches!(result, Err(BotError::NotAuthorized)));
}

#[tokio::test]
async fn free_text_outside_awaiting_state_never_reaches_token_endpoint() {
    let server = MockServer::start().await;
    Mock::given(any()).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;

    let (auth, store) = service(&server);

    // No session at all.
    let outcome = auth.submit_code(CHAT, "abc123").await.unwrap();
    assert_eq!(outcome, CodeSubmission::Ignored);

    // Session exists but is not awaiting a code.
    store
        .put(CHAT, ChatSession { tokens: Some(tokens("A", "R", i64::MAX)), ..Default::default() })
        .await;
    let outcome = auth.submit_code(CHAT, "free text").await.unwrap();
    assert_eq!(outcome, CodeSubmission::Ignored);
}

#[tokio::test]
async fn begin_authorization_builds_the_authorize_url() {
    let server = MockServer::start().await;
    let (auth, store) = service(&server);

    let url = auth.begin_authorization(CHAT).await;
    let url = Url::parse(&url).unwrap();

    let query: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let value = |key: &str| {
        query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    assert_eq!(value("client_id"), Some("test_client"));
    assert_eq!(value("scope"), Some(SCOPE));
    assert_eq!(value("response_type"), Some("code"));
    assert_eq!(value("redirect_uri"), Some("http://localhost:8080/callback"));

    let session = store.get(CHAT).await.unwrap();
    assert!(session.awaiting_code);
    assert!(session.tokens.is_none());
}

#[tokio::test]
async fn code_exchange_stores_tokens_and_clears_awaiting_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("code=abc123"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("client_id=test_client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A",
            "refresh_token": "R",
            "expires_at": 1000,
            "athlete": { "id": 9907 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (auth, store) = service(&server);
    auth.begin_authorization(CHAT).await;

    let outcome = auth.submit_code(CHAT, "  abc123  ").await.unwrap();
    assert_eq!(outcome, CodeSubmission::Authorized);

    let session = store.get(CHAT).await.unwrap();
    assert!(!session.awaiting_code);
    assert_eq!(session.tokens, Some(tokens("A", "R", 1000)));
    assert_eq!(session.athlete_id, Some(9907));
    assert!(auth.is_authorized(CHAT).await);
}

#[tokio::test]
async fn failed_exchange_keeps_chat_awaiting_so_the_code_can_be_resubmitted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("code=bad"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("code=good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A",
            "refresh_token": "R",
            "expires_at": 1000
        })))
        .mount(&server)
        .await;

    let (auth, store) = service(&server);
    auth.begin_authorization(CHAT).await;

    let result = auth.submit_code(CHAT, "bad").await;
    assert!(matches!(result, Err(BotError::AuthExchangeFailed(status)) if status.as_u16() == 400));

    let session = store.get(CHAT).await.unwrap();
    assert!(session.awaiting_code);
    assert!(session.tokens.is_none());

    // Still awaiting, so a second paste goes through.
    let outcome = auth.submit_code(CHAT, "good").await.unwrap();
    assert_eq!(outcome, CodeSubmission::Authorized);
}

#[tokio::test]
async fn unexpired_token_is_returned_without_any_network_call() {
    let server = MockServer::start().await;
    Mock::given(any()).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;

    let (auth, store) = service(&server);
    let expires_at = Utc::now().timestamp() + 3600;
    store
        .put(CHAT, ChatSession { tokens: Some(tokens("A", "R", expires_at)), ..Default::default() })
        .await;

    let token = auth.access_token(CHAT).await.unwrap();
    assert_eq!(token.as_deref(), Some("A"));
}

#[tokio::test]
async fn expired_token_triggers_exactly_one_refresh() {
    let server = MockServer::start().await;
    let new_expiry = Utc::now().timestamp() + 3600;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=R"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "B",
            "refresh_token": "R2",
            "expires_at": new_expiry
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (auth, store) = service(&server);
    store
        .put(
            CHAT,
            ChatSession {
                tokens: Some(tokens("A", "R", Utc::now().timestamp() - 10)),
                athlete_id: Some(9907),
                ..Default::default()
            },
        )
        .await;

    let token = auth.access_token(CHAT).await.unwrap();
    assert_eq!(token.as_deref(), Some("B"));

    // The whole token set is replaced with the provider's triple; the rest
    // of the session is untouched.
    let session = store.get(CHAT).await.unwrap();
    assert_eq!(session.tokens, Some(tokens("B", "R2", new_expiry)));
    assert_eq!(session.athlete_id, Some(9907));
}

#[tokio::test]
async fn failed_refresh_reports_no_token_but_keeps_the_stale_set() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let (auth, store) = service(&server);
    let stale = tokens("A", "R", Utc::now().timestamp() - 10);
    store.put(CHAT, ChatSession { tokens: Some(stale.clone()), ..Default::default() }).await;

    let token = auth.access_token(CHAT).await.unwrap();
    assert!(token.is_none());

    let session = store.get(CHAT).await.unwrap();
    assert_eq!(session.tokens, Some(stale));
}

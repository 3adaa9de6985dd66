use oauth2::{
    basic::BasicClient, AuthUrl, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope, TokenUrl,
};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::BotError;
use crate::types::{Activity, AthleteProfile, AthleteStats, AthleteZones, TokenGrant};

pub const SCOPE: &str = "read_all,activity:read_all,profile:read_all";

const AUTHORIZE_URL: &str = "https://www.strava.com/oauth/authorize";
const TOKEN_URL: &str = "https://www.strava.com/oauth/token";
const API_BASE_URL: &str = "https://www.strava.com/api/v3";
const REDIRECT_URI: &str = "http://localhost:8080/callback";

/// Endpoints and credentials for one Strava application. Public fields so
/// tests can point the client at a mock server.
#[derive(Debug, Clone)]
pub struct StravaConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub api_base_url: String,
}

impl StravaConfig {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri: REDIRECT_URI.to_string(),
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
        }
    }
}

pub struct StravaApi {
    config: StravaConfig,
    auth_client: BasicClient,
    client: Client,
}

impl StravaApi {
    pub fn new(config: StravaConfig) -> Self {
        let auth_url =
            AuthUrl::new(config.authorize_url.clone()).expect("Invalid authorization endpoint.");
        let token_url = TokenUrl::new(config.token_url.clone()).expect("Invalid token endpoint.");

        let auth_client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_redirect_uri(
            RedirectUrl::new(config.redirect_uri.clone()).expect("Invalid redirect URL."),
        );

        Self {
            config,
            auth_client,
            client: Client::new(),
        }
    }

    /// Browser URL the user visits to grant access. The code lands on the
    /// redirect URI and the user pastes it back into the chat.
    pub fn authorize_url(&self) -> String {
        let (url, _state) = self
            .auth_client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(SCOPE.to_string()))
            .url();

        url.to_string()
    }

    /// `grant_type=authorization_code` exchange. A raw form POST rather than
    /// the oauth2 crate's exchange: Strava's `expires_at` must be stored
    /// verbatim, and the athlete summary rides along in the same payload.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant, BotError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BotError::AuthExchangeFailed(response.status()));
        }

        Ok(response.json().await?)
    }

    /// `grant_type=refresh_token` exchange.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, BotError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BotError::RefreshFailed(response.status()));
        }

        Ok(response.json().await?)
    }

    pub async fn athlete_activities(&self, access_token: &str) -> Result<Vec<Activity>, BotError> {
        self.api_get("athlete/activities", access_token).await
    }

    pub async fn athlete(&self, access_token: &str) -> Result<AthleteProfile, BotError> {
        self.api_get("athlete", access_token).await
    }

    pub async fn athlete_zones(&self, access_token: &str) -> Result<AthleteZones, BotError> {
        self.api_get("athlete/zones", access_token).await
    }

    pub async fn athlete_stats(
        &self,
        access_token: &str,
        athlete_id: u64,
    ) -> Result<AthleteStats, BotError> {
        self.api_get(&format!("athletes/{athlete_id}/stats"), access_token)
            .await
    }

    async fn api_get<T>(&self, endpoint: &str, access_token: &str) -> Result<T, BotError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.config.api_base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BotError::Upstream(response.status()));
        }

        Ok(response.json().await?)
    }
}

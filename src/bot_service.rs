use std::sync::Arc;

use shuttle_runtime::SecretStore;
use teloxide::prelude::*;

use crate::apis::{StravaApi, StravaConfig};
use crate::handlers;
use crate::oauth::AuthService;
use crate::session_store::InMemorySessionStore;

pub struct BotService {
    pub secrets: SecretStore,
}

#[shuttle_runtime::async_trait]
impl shuttle_runtime::Service for BotService {
    async fn bind(self, _addr: std::net::SocketAddr) -> Result<(), shuttle_runtime::Error> {
        let bot_token = self
            .secrets
            .get("TELEGRAM_BOT_TOKEN")
            .expect("TELEGRAM_BOT_TOKEN secret is missing.");
        let client_id = self
            .secrets
            .get("STRAVA_CLIENT_ID")
            .expect("STRAVA_CLIENT_ID secret is missing.");
        let client_secret = self
            .secrets
            .get("STRAVA_CLIENT_SECRET")
            .expect("STRAVA_CLIENT_SECRET secret is missing.");

        let api = StravaApi::new(StravaConfig::new(client_id, client_secret));
        let auth = AuthService::new(api, Arc::new(InMemorySessionStore::new()));

        let bot = Bot::new(bot_token);
        Dispatcher::builder(bot, handlers::schema())
            .dependencies(dptree::deps![auth])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}
